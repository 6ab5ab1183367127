use diesel::insert_into;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::form::Form;
use rocket::http::{Cookie, CookieJar, Status};
use rocket::request::{self, FlashMessage, FromRequest, Request};
use rocket::response::{Flash, Redirect};
use rocket_dyn_templates::{context, Template};
use serde::Serialize;

pub mod models;
pub mod utils;

use crate::db::schema::users;
use crate::db::DbConn;
use crate::types::{flash_message, FormErrors, Page, PageResult};
use self::models::{NewUser, User};
use self::utils::*;

pub const CURR_USER_COOKIE: &str = "user_id";

/// Resolves the current user from the session cookie. Handlers take
/// `Option<User>`, so a missing or stale cookie simply means "not logged
/// in" rather than an error.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for User {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<User, ()> {
        let user_id = request
            .cookies()
            .get_private(CURR_USER_COOKIE)
            .and_then(|cookie| cookie.value().parse::<i32>().ok());
        let user_id = match user_id {
            Some(user_id) => user_id,
            None => return request::Outcome::Forward(Status::Unauthorized),
        };
        let mut conn = match DbConn::from_request(request).await {
            request::Outcome::Success(conn) => conn,
            _ => return request::Outcome::Error((Status::ServiceUnavailable, ())),
        };
        match User::find(user_id, &mut conn) {
            Ok(user) => request::Outcome::Success(user),
            Err(_) => request::Outcome::Forward(Status::Unauthorized),
        }
    }
}

fn do_login(cookies: &CookieJar<'_>, user: &User) {
    cookies.add_private(Cookie::new(CURR_USER_COOKIE, user.id.to_string()));
}

fn do_logout(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::from(CURR_USER_COOKIE));
}

#[derive(Debug, Default, FromForm, Serialize)]
pub struct SignupForm {
    username: String,
    first_name: String,
    last_name: String,
    description: String,
    email: String,
    #[serde(skip_serializing)]
    password: String,
    image_url: String,
}

impl SignupForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        for (field, value) in [
            ("username", &self.username),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
        ] {
            if let Err(e) = validate_required(field, value) {
                errors.merge(e);
            }
        }
        if let Err(e) = validate_email(&self.email) {
            errors.merge(e);
        }
        if let Err(e) = validate_password(&self.password) {
            errors.merge(e);
        }
        if let Err(e) = validate_optional_url("image_url", &self.image_url) {
            errors.merge(e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn render_signup(values: &SignupForm, errors: FormErrors) -> Template {
    Template::render(
        "auth/signup-form",
        context! {
            user: Option::<User>::None,
            flash: Option::<String>::None,
            errors: errors,
            values: values,
        },
    )
}

#[get("/signup")]
pub fn signup_form(user: Option<User>, flash: Option<FlashMessage<'_>>) -> Template {
    Template::render(
        "auth/signup-form",
        context! {
            user: user,
            flash: flash_message(flash),
            errors: FormErrors::default(),
            values: SignupForm::default(),
        },
    )
}

#[post("/signup", data = "<form>")]
pub fn signup(mut conn: DbConn, cookies: &CookieJar<'_>, form: Form<SignupForm>) -> PageResult {
    let form = form.into_inner();
    if let Err(errors) = form.validate() {
        return Ok(Page::Template(render_signup(&form, errors)));
    }

    let new_user = NewUser::register(
        &form.username,
        &form.email,
        &form.first_name,
        &form.last_name,
        &form.description,
        &form.password,
        Some(form.image_url.as_str()),
        false,
    )?;

    match insert_into(users::table)
        .values(&new_user)
        .get_result::<User>(&mut *conn)
    {
        Ok(user) => {
            do_login(cookies, &user);
            Ok(Page::Redirect(Flash::success(
                Redirect::to(uri!("/cafes")),
                "You are signed up and logged in.",
            )))
        }
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            let errors = FormErrors::from("username", "That username is taken. Try again.");
            Ok(Page::Template(render_signup(&form, errors)))
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Default, FromForm, Serialize)]
pub struct LoginForm {
    username: String,
    #[serde(skip_serializing)]
    password: String,
}

#[get("/login")]
pub fn login_form(user: Option<User>, flash: Option<FlashMessage<'_>>) -> Template {
    Template::render(
        "auth/login-form",
        context! {
            user: user,
            flash: flash_message(flash),
            errors: FormErrors::default(),
            values: LoginForm::default(),
        },
    )
}

#[post("/login", data = "<form>")]
pub fn login(mut conn: DbConn, cookies: &CookieJar<'_>, form: Form<LoginForm>) -> PageResult {
    let form = form.into_inner();
    match User::authenticate(&form.username, &form.password, &mut conn)? {
        Some(user) => {
            do_login(cookies, &user);
            Ok(Page::Redirect(Flash::success(
                Redirect::to(uri!("/cafes")),
                format!("Hello, {}!", user.username),
            )))
        }
        None => Ok(Page::Template(Template::render(
            "auth/login-form",
            context! {
                user: Option::<User>::None,
                flash: Option::<String>::None,
                errors: FormErrors::from("username", "Invalid credentials"),
                values: &form,
            },
        ))),
    }
}

#[get("/logout")]
pub fn logout_page(cookies: &CookieJar<'_>) -> Flash<Redirect> {
    do_logout(cookies);
    Flash::success(Redirect::to(uri!("/")), "successfully logged out")
}

#[post("/logout")]
pub fn logout(cookies: &CookieJar<'_>) -> Flash<Redirect> {
    do_logout(cookies);
    Flash::success(Redirect::to(uri!("/")), "successfully logged out")
}
