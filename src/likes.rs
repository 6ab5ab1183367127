use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel::{delete, insert_into, select};
use rocket::serde::json::{json, Json, Value};
use serde::Deserialize;

use crate::db::schema::likes;
use crate::db::DbConn;
use crate::types::AppError;
use crate::users::models::User;

const NOT_LOGGED_IN: &str = "Not logged in";

/// One user liking one cafe; the composite primary key keeps the pair
/// unique.
#[derive(Debug, Queryable, Insertable)]
#[diesel(table_name = likes)]
pub struct Like {
    pub user_id: i32,
    pub cafe_id: i32,
}

impl Like {
    pub fn exists(user: i32, cafe: i32, connection: &mut SqliteConnection) -> QueryResult<bool> {
        select(exists(likes::table.find((user, cafe)))).get_result(connection)
    }

    /// Plain insert; a duplicate pair is rejected by the store, not
    /// deduplicated here.
    pub fn add(user: i32, cafe: i32, connection: &mut SqliteConnection) -> QueryResult<usize> {
        insert_into(likes::table)
            .values(&Like {
                user_id: user,
                cafe_id: cafe,
            })
            .execute(connection)
    }

    /// Delete by composite key; a no-op if the like is absent.
    pub fn remove(user: i32, cafe: i32, connection: &mut SqliteConnection) -> QueryResult<usize> {
        delete(likes::table.find((user, cafe))).execute(connection)
    }
}

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    cafe_id: i32,
}

pub type ApiResult = Result<Json<Value>, AppError>;

#[get("/likes?<cafe_id>")]
pub fn likes(mut conn: DbConn, user: Option<User>, cafe_id: i32) -> ApiResult {
    let user = match user {
        Some(user) => user,
        None => return Ok(Json(json!({ "error": NOT_LOGGED_IN }))),
    };
    let liked = Like::exists(user.id, cafe_id, &mut conn)?;
    Ok(Json(json!({ "likes": liked })))
}

#[post("/like", format = "json", data = "<body>")]
pub fn like(mut conn: DbConn, user: Option<User>, body: Json<LikeRequest>) -> ApiResult {
    let user = match user {
        Some(user) => user,
        None => return Ok(Json(json!({ "error": NOT_LOGGED_IN }))),
    };
    Like::add(user.id, body.cafe_id, &mut conn)?;
    Ok(Json(json!({ "liked": body.cafe_id })))
}

#[post("/unlike", format = "json", data = "<body>")]
pub fn unlike(mut conn: DbConn, user: Option<User>, body: Json<LikeRequest>) -> ApiResult {
    let user = match user {
        Some(user) => user,
        None => return Ok(Json(json!({ "error": NOT_LOGGED_IN }))),
    };
    Like::remove(user.id, body.cafe_id, &mut conn)?;
    Ok(Json(json!({ "unliked": body.cafe_id })))
}
