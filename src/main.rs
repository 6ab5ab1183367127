#[rocket::launch]
fn rocket() -> _ {
    cafehub::build(&cafehub::db::database_url())
}
