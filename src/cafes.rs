use diesel::insert_into;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket_dyn_templates::{context, Template};
use serde::Serialize;

use crate::db::schema::{cafes, cities, likes};
use crate::db::DbConn;
use crate::maps;
use crate::types::{flash_message, AppError, FormErrors, Page, PageResult};
use crate::users::models::User;
use crate::users::utils::{validate_optional_url, validate_required};

pub const DEFAULT_CAFE_IMAGE: &str = "/static/images/default-cafe.jpg";

/// Immutable reference data for the city select.
#[derive(Debug, Queryable, Identifiable, Insertable, Serialize)]
#[diesel(table_name = cities, primary_key(code))]
pub struct City {
    pub code: String,
    pub name: String,
    pub state: String,
}

impl City {
    /// `(code, name)` pairs ordered by city name, for select widgets.
    pub fn get_city_codes(connection: &mut SqliteConnection) -> QueryResult<Vec<(String, String)>> {
        use crate::db::schema::cities::dsl::*;
        cities.order(name.asc()).select((code, name)).load(connection)
    }
}

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = cafes)]
pub struct Cafe {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub url: String,
    pub address: String,
    pub city_code: String,
    pub image_url: String,
}

impl Cafe {
    pub fn all(connection: &mut SqliteConnection) -> QueryResult<Vec<Cafe>> {
        use crate::db::schema::cafes::dsl::*;
        cafes.order(name.asc()).load(connection)
    }

    pub fn find(cafe_id: i32, connection: &mut SqliteConnection) -> QueryResult<Cafe> {
        cafes::table.find(cafe_id).first(connection)
    }

    /// Return "City, ST" for this cafe.
    pub fn city_state(&self, connection: &mut SqliteConnection) -> QueryResult<String> {
        let city: City = cities::table.find(&self.city_code).first(connection)?;
        Ok(format!("{}, {}", city.name, city.state))
    }

    /// Cafes a given user likes, ordered by name.
    pub fn liked_by(user_id: i32, connection: &mut SqliteConnection) -> QueryResult<Vec<Cafe>> {
        likes::table
            .inner_join(cafes::table)
            .filter(likes::user_id.eq(user_id))
            .select(cafes::all_columns)
            .order(cafes::name.asc())
            .load(connection)
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = cafes)]
pub struct CafeData {
    pub name: String,
    pub description: String,
    pub url: String,
    pub address: String,
    pub city_code: String,
    pub image_url: String,
}

#[derive(Debug, Default, FromForm, Serialize)]
pub struct CafeForm {
    name: String,
    description: String,
    url: String,
    address: String,
    city_code: String,
    image_url: String,
}

impl CafeForm {
    fn validate(&self, cities_vocab: &[(String, String)]) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        if let Err(e) = validate_required("name", &self.name) {
            errors.merge(e);
        }
        if let Err(e) = validate_required("address", &self.address) {
            errors.merge(e);
        }
        if let Err(e) = validate_optional_url("url", &self.url) {
            errors.merge(e);
        }
        if let Err(e) = validate_optional_url("image_url", &self.image_url) {
            errors.merge(e);
        }
        if !cities_vocab.iter().any(|(code, _)| code == &self.city_code) {
            errors.add_error("city_code", "Not a valid city");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn data(&self) -> CafeData {
        CafeData {
            name: self.name.clone(),
            description: self.description.clone(),
            url: self.url.clone(),
            address: self.address.clone(),
            city_code: self.city_code.clone(),
            image_url: if self.image_url.is_empty() {
                DEFAULT_CAFE_IMAGE.into()
            } else {
                self.image_url.clone()
            },
        }
    }

    fn from_cafe(cafe: &Cafe) -> CafeForm {
        CafeForm {
            name: cafe.name.clone(),
            description: cafe.description.clone(),
            url: cafe.url.clone(),
            address: cafe.address.clone(),
            city_code: cafe.city_code.clone(),
            image_url: cafe.image_url.clone(),
        }
    }
}

/// Cafe mutation is admin only; everyone else is bounced to the login
/// page with a flash explaining why.
fn admin_gate(user: Option<User>, message: &'static str) -> Result<User, Page> {
    match user {
        Some(user) if user.admin => Ok(user),
        _ => Err(Page::Redirect(Flash::error(
            Redirect::to(uri!("/login")),
            message,
        ))),
    }
}

/// Fetch the static map for a cafe, best effort. A failed fetch never
/// fails the surrounding request.
async fn save_cafe_map(cafe: &Cafe, connection: &mut SqliteConnection) {
    let city: City = match cities::table.find(&cafe.city_code).first(connection) {
        Ok(city) => city,
        Err(e) => {
            log::warn!("no city for cafe {}: {}", cafe.id, e);
            return;
        }
    };
    if let Err(e) = maps::save_map(cafe.id, &cafe.address, &city.name, &city.state).await {
        log::warn!("could not save map for cafe {}: {}", cafe.id, e);
    }
}

#[get("/")]
pub fn list(
    mut conn: DbConn,
    user: Option<User>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, AppError> {
    let all = Cafe::all(&mut conn)?;
    Ok(Template::render(
        "cafe/list",
        context! {
            user: user,
            flash: flash_message(flash),
            cafes: all,
        },
    ))
}

#[get("/<id>")]
pub fn detail(
    mut conn: DbConn,
    user: Option<User>,
    flash: Option<FlashMessage<'_>>,
    id: i32,
) -> Result<Template, AppError> {
    let cafe = Cafe::find(id, &mut conn)?;
    let city_state = cafe.city_state(&mut conn)?;
    Ok(Template::render(
        "cafe/detail",
        context! {
            user: user,
            flash: flash_message(flash),
            cafe: cafe,
            city_state: city_state,
        },
    ))
}

#[get("/add")]
pub fn add_form(
    mut conn: DbConn,
    user: Option<User>,
    flash: Option<FlashMessage<'_>>,
) -> PageResult {
    let user = match admin_gate(user, "Only admins can add cafes.") {
        Ok(user) => user,
        Err(page) => return Ok(page),
    };
    let cities_vocab = City::get_city_codes(&mut conn)?;
    Ok(Page::Template(Template::render(
        "cafe/add-form",
        context! {
            user: user,
            flash: flash_message(flash),
            errors: FormErrors::default(),
            values: CafeForm::default(),
            cities: cities_vocab,
        },
    )))
}

#[post("/add", data = "<form>")]
pub async fn add(mut conn: DbConn, user: Option<User>, form: Form<CafeForm>) -> PageResult {
    let user = match admin_gate(user, "Only admins can add cafes.") {
        Ok(user) => user,
        Err(page) => return Ok(page),
    };
    let form = form.into_inner();
    let cities_vocab = City::get_city_codes(&mut conn)?;
    if let Err(errors) = form.validate(&cities_vocab) {
        return Ok(Page::Template(Template::render(
            "cafe/add-form",
            context! {
                user: user,
                flash: Option::<String>::None,
                errors: errors,
                values: form,
                cities: cities_vocab,
            },
        )));
    }

    let cafe: Cafe = insert_into(cafes::table)
        .values(&form.data())
        .get_result(&mut *conn)?;
    save_cafe_map(&cafe, &mut conn).await;

    Ok(Page::Redirect(Flash::success(
        Redirect::to(uri!("/cafes", detail(cafe.id))),
        format!("{} added.", cafe.name),
    )))
}

#[get("/<id>/edit")]
pub fn edit_form(
    mut conn: DbConn,
    user: Option<User>,
    flash: Option<FlashMessage<'_>>,
    id: i32,
) -> PageResult {
    let user = match admin_gate(user, "Only admins can edit cafes.") {
        Ok(user) => user,
        Err(page) => return Ok(page),
    };
    let cafe = Cafe::find(id, &mut conn)?;
    let cities_vocab = City::get_city_codes(&mut conn)?;
    Ok(Page::Template(Template::render(
        "cafe/edit-form",
        context! {
            user: user,
            flash: flash_message(flash),
            errors: FormErrors::default(),
            values: CafeForm::from_cafe(&cafe),
            cities: cities_vocab,
            id: cafe.id,
            name: cafe.name,
        },
    )))
}

#[post("/<id>/edit", data = "<form>")]
pub async fn edit(
    mut conn: DbConn,
    user: Option<User>,
    id: i32,
    form: Form<CafeForm>,
) -> PageResult {
    let user = match admin_gate(user, "Only admins can edit cafes.") {
        Ok(user) => user,
        Err(page) => return Ok(page),
    };
    let cafe = Cafe::find(id, &mut conn)?;
    let form = form.into_inner();
    let cities_vocab = City::get_city_codes(&mut conn)?;
    if let Err(errors) = form.validate(&cities_vocab) {
        return Ok(Page::Template(Template::render(
            "cafe/edit-form",
            context! {
                user: user,
                flash: Option::<String>::None,
                errors: errors,
                values: form,
                cities: cities_vocab,
                id: cafe.id,
                name: cafe.name,
            },
        )));
    }

    let data = form.data();
    let address_changed = data.address != cafe.address || data.city_code != cafe.city_code;
    let updated: Cafe = diesel::update(&cafe).set(&data).get_result(&mut *conn)?;
    if address_changed {
        save_cafe_map(&updated, &mut conn).await;
    }

    Ok(Page::Redirect(Flash::success(
        Redirect::to(uri!("/cafes", detail(updated.id))),
        format!("{} edited.", updated.name),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use diesel::insert_into;

    fn seed_cities(conn: &mut SqliteConnection) {
        let rows = vec![
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
        ];
        insert_into(cities::table)
            .values(&rows)
            .execute(conn)
            .unwrap();
    }

    fn seed_cafe(conn: &mut SqliteConnection) -> Cafe {
        insert_into(cafes::table)
            .values(&CafeData {
                name: "Test Cafe".into(),
                description: "Test description".into(),
                url: "http://testcafe.com/".into(),
                address: "500 Sansome St".into(),
                city_code: "sf".into(),
                image_url: DEFAULT_CAFE_IMAGE.into(),
            })
            .get_result(conn)
            .unwrap()
    }

    #[test]
    fn city_codes_ordered_by_name() {
        let mut conn = db::test_conn();
        seed_cities(&mut conn);
        let codes = City::get_city_codes(&mut conn).unwrap();
        assert_eq!(
            codes,
            vec![
                ("berk".to_string(), "Berkeley".to_string()),
                ("sf".to_string(), "San Francisco".to_string()),
            ]
        );
    }

    #[test]
    fn city_codes_single_city() {
        let mut conn = db::test_conn();
        insert_into(cities::table)
            .values(&City {
                code: "sf".into(),
                name: "San Francisco".into(),
                state: "CA".into(),
            })
            .execute(&mut conn)
            .unwrap();
        let codes = City::get_city_codes(&mut conn).unwrap();
        assert_eq!(codes, vec![("sf".to_string(), "San Francisco".to_string())]);
    }

    #[test]
    fn city_state_joins_city() {
        let mut conn = db::test_conn();
        seed_cities(&mut conn);
        let cafe = seed_cafe(&mut conn);
        assert_eq!(cafe.city_state(&mut conn).unwrap(), "San Francisco, CA");
    }

    #[test]
    fn all_ordered_by_name() {
        let mut conn = db::test_conn();
        seed_cities(&mut conn);
        for name in ["Perch Coffee", "Cafe du Soleil"] {
            insert_into(cafes::table)
                .values(&CafeData {
                    name: name.into(),
                    description: String::new(),
                    url: String::new(),
                    address: "somewhere".into(),
                    city_code: "sf".into(),
                    image_url: DEFAULT_CAFE_IMAGE.into(),
                })
                .execute(&mut conn)
                .unwrap();
        }
        let names: Vec<String> = Cafe::all(&mut conn)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Cafe du Soleil", "Perch Coffee"]);
    }

    #[test]
    fn cafe_requires_existing_city() {
        let mut conn = db::test_conn();
        let result = insert_into(cafes::table)
            .values(&CafeData {
                name: "Orphan".into(),
                description: String::new(),
                url: String::new(),
                address: "nowhere".into(),
                city_code: "nope".into(),
                image_url: DEFAULT_CAFE_IMAGE.into(),
            })
            .execute(&mut conn);
        assert!(result.is_err());
    }
}
