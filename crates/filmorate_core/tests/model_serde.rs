use chrono::NaiveDate;
use filmorate_core::{Film, Genre, Mpa, User};
use serde_json::json;

#[test]
fn film_serializes_with_nested_rating_and_genres() {
    let mut film = Film::new(
        "Film1",
        "short",
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        30,
        Mpa::new(1, "G", None),
    );
    film.id = 7;
    film.genres = vec![Genre::new(2, "Drama")];

    let value = serde_json::to_value(&film).unwrap();
    assert_eq!(value["id"], 7);
    assert_eq!(value["releaseDate"], "2000-01-01");
    assert_eq!(value["mpa"]["name"], "G");
    assert_eq!(value["genres"][0], json!({ "id": 2, "name": "Drama" }));
}

#[test]
fn film_payload_accepts_id_only_references() {
    let film: Film = serde_json::from_value(json!({
        "name": "Film1",
        "description": "",
        "releaseDate": "2000-01-01",
        "duration": 30,
        "mpa": { "id": 3 },
        "genres": [{ "id": 1 }, { "id": 1 }]
    }))
    .unwrap();

    assert_eq!(film.id, 0);
    assert_eq!(film.mpa.id, 3);
    assert_eq!(film.genre_ids(), vec![1]);
    assert!(film.validate().is_ok());
}

#[test]
fn user_payload_without_name_deserializes_blank() {
    let user: User = serde_json::from_value(json!({
        "email": "neo@matrix.io",
        "login": "neo",
        "birthday": "1964-09-02"
    }))
    .unwrap();

    assert!(user.name.is_empty());
    assert_eq!(user.with_default_name().name, "neo");
}
