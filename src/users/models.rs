use crate::db::schema::users;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::Serialize;

pub const DEFAULT_USER_IMAGE: &str = "/static/images/default-pic.png";

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub admin: bool,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub description: String,
    pub image_url: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn find(user_id: i32, connection: &mut SqliteConnection) -> QueryResult<User> {
        users::table.find(user_id).first(connection)
    }

    pub fn load_by_username(
        name: &str,
        connection: &mut SqliteConnection,
    ) -> QueryResult<Option<User>> {
        use crate::db::schema::users::dsl::*;
        users
            .filter(username.eq(name))
            .first::<User>(connection)
            .optional()
    }

    /// Validate that the user exists and the password matches its hash.
    /// An unknown username and a wrong password are indistinguishable to
    /// the caller.
    pub fn authenticate(
        name: &str,
        password: &str,
        connection: &mut SqliteConnection,
    ) -> QueryResult<Option<User>> {
        match User::load_by_username(name, connection)? {
            Some(user) if bcrypt::verify(password, &user.hashed_password).unwrap_or(false) => {
                Ok(Some(user))
            }
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    username: String,
    admin: bool,
    email: String,
    first_name: String,
    last_name: String,
    description: String,
    image_url: String,
    hashed_password: String,
}

impl NewUser {
    /// Build an insertable user with a freshly hashed password. An empty
    /// image URL falls back to the default picture.
    #[allow(clippy::too_many_arguments)]
    pub fn register(
        username: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
        description: &str,
        password: &str,
        image_url: Option<&str>,
        admin: bool,
    ) -> Result<NewUser, bcrypt::BcryptError> {
        let hashed = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        Ok(NewUser {
            username: username.into(),
            admin,
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            description: description.into(),
            image_url: image_url
                .filter(|url| !url.is_empty())
                .unwrap_or(DEFAULT_USER_IMAGE)
                .into(),
            hashed_password: hashed,
        })
    }
}
