use diesel::prelude::*;
use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket_dyn_templates::{context, Template};
use serde::Serialize;

use crate::cafes::Cafe;
use crate::db::schema::users;
use crate::db::DbConn;
use crate::types::{flash_message, FormErrors, Page, PageResult};
use crate::users::models::{User, DEFAULT_USER_IMAGE};
use crate::users::utils::{validate_email, validate_optional_url, validate_required};

fn login_gate(user: Option<User>) -> Result<User, Page> {
    match user {
        Some(user) => Ok(user),
        None => Err(Page::Redirect(Flash::error(
            Redirect::to(uri!("/login")),
            "You are not logged in.",
        ))),
    }
}

#[get("/")]
pub fn detail(
    mut conn: DbConn,
    user: Option<User>,
    flash: Option<FlashMessage<'_>>,
) -> PageResult {
    let user = match login_gate(user) {
        Ok(user) => user,
        Err(page) => return Ok(page),
    };
    let liked_cafes = Cafe::liked_by(user.id, &mut conn)?;
    Ok(Page::Template(Template::render(
        "profile/detail",
        context! {
            full_name: user.full_name(),
            user: user,
            flash: flash_message(flash),
            liked_cafes: liked_cafes,
        },
    )))
}

#[derive(Debug, Default, FromForm, Serialize)]
pub struct EditUserForm {
    first_name: String,
    last_name: String,
    description: String,
    email: String,
    image_url: String,
}

impl EditUserForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        for (field, value) in [
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
        if let Err(e) = validate_optional_url("image_url", &self.image_url) {
            errors.merge(e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn from_user(user: &User) -> EditUserForm {
        EditUserForm {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            description: user.description.clone(),
            email: user.email.clone(),
            image_url: user.image_url.clone(),
        }
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = users)]
struct UserEdit<'a> {
    first_name: &'a str,
    last_name: &'a str,
    description: &'a str,
    email: &'a str,
    image_url: &'a str,
}

#[get("/edit")]
pub fn edit_form(user: Option<User>, flash: Option<FlashMessage<'_>>) -> PageResult {
    let user = match login_gate(user) {
        Ok(user) => user,
        Err(page) => return Ok(page),
    };
    Ok(Page::Template(Template::render(
        "profile/edit-form",
        context! {
            values: EditUserForm::from_user(&user),
            user: user,
            flash: flash_message(flash),
            errors: FormErrors::default(),
        },
    )))
}

#[post("/edit", data = "<form>")]
pub fn edit(mut conn: DbConn, user: Option<User>, form: Form<EditUserForm>) -> PageResult {
    let user = match login_gate(user) {
        Ok(user) => user,
        Err(page) => return Ok(page),
    };
    let form = form.into_inner();
    if let Err(errors) = form.validate() {
        return Ok(Page::Template(Template::render(
            "profile/edit-form",
            context! {
                values: &form,
                user: user,
                flash: Option::<String>::None,
                errors: errors,
            },
        )));
    }

    let image_url = if form.image_url.is_empty() {
        DEFAULT_USER_IMAGE
    } else {
        form.image_url.as_str()
    };
    diesel::update(users::table.find(user.id))
        .set(&UserEdit {
            first_name: &form.first_name,
            last_name: &form.last_name,
            description: &form.description,
            email: &form.email,
            image_url,
        })
        .execute(&mut *conn)?;

    Ok(Page::Redirect(Flash::success(
        Redirect::to(uri!("/profile")),
        format!("{} edited.", form.first_name),
    )))
}
