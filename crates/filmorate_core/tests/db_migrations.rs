use chrono::NaiveDate;
use filmorate_core::db::migrations::latest_version;
use filmorate_core::db::{open_db, open_db_in_memory, DbError};
use filmorate_core::{Film, Mpa, Storage, StorageConfig, User};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "genres",
        "mpa",
        "films",
        "film_genres",
        "users",
        "likes",
        "friendships",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn fresh_database_is_seeded_with_catalog() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(count_rows(&conn, "genres"), 6);
    assert_eq!(count_rows(&conn, "mpa"), 5);
    assert_eq!(count_rows(&conn, "films"), 0);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filmorate.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_eq!(count_rows(&conn_second, "genres"), 6);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn sqlite_storage_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig::sqlite(dir.path().join("durable.db"));

    let film_id = {
        let storage = Storage::open(&config).unwrap();
        let user = storage
            .users
            .add(&User::new(
                "neo@matrix.io",
                "neo",
                "Neo",
                NaiveDate::from_ymd_opt(1964, 9, 2).unwrap(),
            ))
            .unwrap();
        let film = storage
            .films
            .add(
                &Film::new(
                    "The Matrix",
                    "",
                    NaiveDate::from_ymd_opt(1999, 3, 31).unwrap(),
                    136,
                    Mpa::reference(4),
                )
                .with_genres([6, 4]),
            )
            .unwrap();
        storage.films.add_like(film.id, user.id).unwrap();
        film.id
    };

    let reopened = Storage::open(&config).unwrap();
    let film = reopened.films.get_by_id(film_id).unwrap();
    assert_eq!(film.name, "The Matrix");
    assert_eq!(film.mpa.name, "R");
    assert_eq!(film.genre_ids(), vec![4, 6]);
    assert_eq!(reopened.films.likes(film_id).unwrap().len(), 1);
}

#[test]
fn deleting_a_film_row_cascades_to_edges() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO films (id, name, description, release_date, duration, mpa_id)
         VALUES (1, 'Film1', '', '2000-01-01', 30, 1);
         INSERT INTO users (id, email, login, name, birthday)
         VALUES (1, 'a@b.c', 'a', 'a', '1990-01-01');
         INSERT INTO film_genres (film_id, genre_id) VALUES (1, 2);
         INSERT INTO likes (film_id, user_id) VALUES (1, 1);
         DELETE FROM films WHERE id = 1;",
    )
    .unwrap();

    assert_eq!(count_rows(&conn, "film_genres"), 0);
    assert_eq!(count_rows(&conn, "likes"), 0);
}

#[test]
fn self_friendship_rows_are_rejected_by_schema() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO users (id, email, login, name, birthday)
         VALUES (1, 'a@b.c', 'a', 'a', '1990-01-01');",
    )
    .unwrap();

    let result = conn.execute(
        "INSERT INTO friendships (user_id, friend_id) VALUES (1, 1);",
        [],
    );
    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn count_rows(conn: &Connection, table_name: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table_name};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
