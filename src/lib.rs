#[macro_use]
extern crate rocket;
#[macro_use]
extern crate lazy_static;

pub mod cafes;
pub mod db;
pub mod likes;
pub mod maps;
pub mod profile;
pub mod types;
pub mod users;

use rocket::fs::{relative, FileServer};
use rocket::request::FlashMessage;
use rocket::{Build, Rocket};
use rocket_dyn_templates::{context, Template};

use crate::types::flash_message;
use crate::users::models::User;

#[get("/")]
fn homepage(user: Option<User>, flash: Option<FlashMessage<'_>>) -> Template {
    Template::render(
        "homepage",
        context! {
            user: user,
            flash: flash_message(flash),
        },
    )
}

#[catch(404)]
fn not_found() -> Template {
    Template::render(
        "404",
        context! {
            user: Option::<User>::None,
            flash: Option::<String>::None,
        },
    )
}

pub fn build(database_url: &str) -> Rocket<Build> {
    let pool = db::init_pool(database_url).expect("Failed to create database pool");
    {
        let mut conn = pool
            .get()
            .expect("Failed to check out a connection for migrations");
        db::run_migrations(&mut conn);
    }

    rocket::build()
        .manage(pool)
        .mount(
            "/",
            routes![
                homepage,
                users::signup_form,
                users::signup,
                users::login_form,
                users::login,
                users::logout_page,
                users::logout,
            ],
        )
        .mount(
            "/cafes",
            routes![
                cafes::list,
                cafes::detail,
                cafes::add_form,
                cafes::add,
                cafes::edit_form,
                cafes::edit,
            ],
        )
        .mount("/profile", routes![profile::detail, profile::edit_form, profile::edit])
        .mount("/api", routes![likes::likes, likes::like, likes::unlike])
        .mount("/static", FileServer::from(relative!("static")))
        .register("/", catchers![not_found])
        .attach(Template::fairing())
}
