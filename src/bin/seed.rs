//! Reset the database and load the reference data set.

use diesel::prelude::*;
use diesel::{delete, insert_into};

use cafehub::cafes::{Cafe, CafeData, City};
use cafehub::db;
use cafehub::db::schema::{cafes, cities, likes, users};
use cafehub::likes::Like;
use cafehub::maps;
use cafehub::users::models::{NewUser, User};

fn main() {
    let database_url = db::database_url();
    let mut conn = db::establish(&database_url).expect("Failed to open database");
    db::run_migrations(&mut conn);

    delete(likes::table).execute(&mut conn).expect("clear likes");
    delete(cafes::table).execute(&mut conn).expect("clear cafes");
    delete(users::table).execute(&mut conn).expect("clear users");
    delete(cities::table)
        .execute(&mut conn)
        .expect("clear cities");

    let city_rows = vec![
        City {
            code: "sf".into(),
            name: "San Francisco".into(),
            state: "CA".into(),
        },
        City {
            code: "berk".into(),
            name: "Berkeley".into(),
            state: "CA".into(),
        },
        City {
            code: "oak".into(),
            name: "Oakland".into(),
            state: "CA".into(),
        },
    ];
    insert_into(cities::table)
        .values(&city_rows)
        .execute(&mut conn)
        .expect("insert cities");

    let cafe_rows = vec![
        CafeData {
            name: "Bernie's Cafe".into(),
            description: "Serving locals in Noe Valley. A great place to sit and code and code."
                .into(),
            address: "3966 24th St".into(),
            city_code: "sf".into(),
            url: "https://www.yelp.com/biz/bernies-san-francisco".into(),
            image_url:
                "https://s3-media4.fl.yelpcdn.com/bphoto/bVCa2JefOCqxQsM6yWrC-A/o.jpg".into(),
        },
        CafeData {
            name: "Perch Coffee".into(),
            description: "Hip and sleek place to get cardamom lattés when biking around Oakland."
                .into(),
            address: "440 Grand Ave".into(),
            city_code: "oak".into(),
            url: "https://perchoffee.com".into(),
            image_url:
                "https://s3-media4.fl.yelpcdn.com/bphoto/0vhzcgkzIUIEPIyL2rF_YQ/o.jpg".into(),
        },
        CafeData {
            name: "Cafe du Soleil".into(),
            description:
                "Pastries, Parisian-inspired fare, coffee and wine served in a corner bistro."
                    .into(),
            address: "200 Fillmore St".into(),
            city_code: "sf".into(),
            url: "http://cafe-du-soleil.cafes-city.com/".into(),
            image_url:
                "https://s3-media2.fl.yelpcdn.com/bphoto/l6oeG-xz1sJ5PWDJEG-zHg/o.jpg".into(),
        },
        CafeData {
            name: "Victory Point Cafe".into(),
            description: "Berkeley's board game cafe plus craft coffee and beer.".into(),
            address: "1797 Shattuck Ave".into(),
            city_code: "berk".into(),
            url: "https://www.victorypointcafe.com/".into(),
            image_url:
                "https://s3-media1.fl.yelpcdn.com/bphoto/oZHI0cmzCnUDMP7WPAjEEw/o.jpg".into(),
        },
    ];
    let cafe_records: Vec<Cafe> = insert_into(cafes::table)
        .values(&cafe_rows)
        .get_results(&mut conn)
        .expect("insert cafes");

    let admin = NewUser::register(
        "admin",
        "admin@test.com",
        "Addie",
        "MacAdmin",
        "I am the very model of the modern model administrator.",
        "secret",
        None,
        true,
    )
    .expect("hash admin password");
    let admin: User = insert_into(users::table)
        .values(&admin)
        .get_result(&mut conn)
        .expect("insert admin");

    let user = NewUser::register(
        "test",
        "test@test.com",
        "Testy",
        "MacTest",
        "I am the ultimate representative user.",
        "secret",
        None,
        false,
    )
    .expect("hash user password");
    let user: User = insert_into(users::table)
        .values(&user)
        .get_result(&mut conn)
        .expect("insert user");

    let like_rows = vec![
        Like {
            user_id: user.id,
            cafe_id: cafe_records[0].id,
        },
        Like {
            user_id: user.id,
            cafe_id: cafe_records[1].id,
        },
        Like {
            user_id: admin.id,
            cafe_id: cafe_records[0].id,
        },
    ];
    insert_into(likes::table)
        .values(&like_rows)
        .execute(&mut conn)
        .expect("insert likes");

    rocket::execute(async {
        for cafe in &cafe_records {
            let city = city_rows
                .iter()
                .find(|city| city.code == cafe.city_code)
                .expect("seeded city");
            if let Err(e) = maps::save_map(cafe.id, &cafe.address, &city.name, &city.state).await {
                log::warn!("could not save map for cafe {}: {}", cafe.id, e);
            }
        }
    });

    println!(
        "Seeded {} cities, {} cafes, 2 users.",
        city_rows.len(),
        cafe_records.len()
    );
}
