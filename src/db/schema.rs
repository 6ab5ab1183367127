diesel::table! {
    cities (code) {
        code -> Text,
        name -> Text,
        state -> Text,
    }
}

diesel::table! {
    cafes (id) {
        id -> Integer,
        name -> Text,
        description -> Text,
        url -> Text,
        address -> Text,
        city_code -> Text,
        image_url -> Text,
    }
}

diesel::table! {
    users (id) {
        id -> Integer,
        username -> Text,
        admin -> Bool,
        email -> Text,
        first_name -> Text,
        last_name -> Text,
        description -> Text,
        image_url -> Text,
        hashed_password -> Text,
    }
}

diesel::table! {
    likes (user_id, cafe_id) {
        user_id -> Integer,
        cafe_id -> Integer,
    }
}

diesel::joinable!(cafes -> cities (city_code));
diesel::joinable!(likes -> users (user_id));
diesel::joinable!(likes -> cafes (cafe_id));

diesel::allow_tables_to_appear_in_same_query!(cities, cafes, users, likes);
