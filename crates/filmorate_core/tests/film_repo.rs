use chrono::NaiveDate;
use filmorate_core::db::open_db_in_memory;
use filmorate_core::{EntityKind, Film, Mpa, RepoError, Storage, User, ValidationError};

fn backends() -> Vec<Storage> {
    vec![Storage::in_memory(), Storage::sqlite_in_memory().unwrap()]
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn film(name: &str) -> Film {
    Film::new(name, "about", date(2000, 1, 1), 30, Mpa::reference(1))
}

fn add_users(storage: &Storage, count: usize) -> Vec<i64> {
    (0..count)
        .map(|n| {
            storage
                .users
                .add(&User::new(
                    format!("user{n}@mail.test"),
                    format!("user{n}"),
                    "",
                    date(1990, 1, 1),
                ))
                .unwrap()
                .id
        })
        .collect()
}

#[test]
fn add_assigns_id_and_roundtrips() {
    for storage in backends() {
        let stored = storage.films.add(&film("Film1")).unwrap();
        assert!(stored.id > 0);
        assert_eq!(stored.mpa.name, "G");

        let loaded = storage.films.get_by_id(stored.id).unwrap();
        assert_eq!(loaded, stored);
        assert_eq!(loaded.id, stored.id);
    }
}

#[test]
fn ids_are_increasing_and_listing_is_ordered() {
    for storage in backends() {
        let first = storage.films.add(&film("A")).unwrap();
        let second = storage.films.add(&film("B")).unwrap();
        assert!(second.id > first.id);

        let all = storage.films.get_all().unwrap();
        let ids: Vec<i64> = all.iter().map(|film| film.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(storage.films.count().unwrap(), 2);
    }
}

#[test]
fn genres_are_deduplicated_and_resolved_with_names() {
    for storage in backends() {
        let stored = storage
            .films
            .add(&film("Genres").with_genres([3, 1, 3]))
            .unwrap();

        assert_eq!(stored.genre_ids(), vec![1, 3]);
        let names: Vec<&str> = stored.genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Comedy", "Cartoon"]);
    }
}

#[test]
fn update_replaces_fields_and_genres_but_not_id() {
    for storage in backends() {
        let stored = storage
            .films
            .add(&film("Before").with_genres([1, 2]))
            .unwrap();

        let mut changed = stored.clone().with_genres([5]);
        changed.name = "After".to_string();
        changed.mpa = Mpa::reference(2);
        let updated = storage.films.update(&changed).unwrap();

        assert_eq!(updated.id, stored.id);
        assert_eq!(updated.name, "After");
        assert_eq!(updated.mpa.name, "PG");
        assert_eq!(updated.genre_ids(), vec![5]);
        assert_eq!(storage.films.get_by_id(stored.id).unwrap(), updated);
    }
}

#[test]
fn update_with_empty_genres_clears_associations() {
    for storage in backends() {
        let stored = storage
            .films
            .add(&film("Genres").with_genres([1, 2]))
            .unwrap();

        let cleared = storage.films.update(&stored.clone().with_genres([])).unwrap();
        assert!(cleared.genres.is_empty());
        assert!(storage
            .films
            .get_by_id(stored.id)
            .unwrap()
            .genres
            .is_empty());
    }
}

#[test]
fn update_of_missing_film_is_not_found() {
    for storage in backends() {
        let mut ghost = film("Ghost");
        ghost.id = 42;
        let err = storage.films.update(&ghost).unwrap_err();
        assert!(matches!(
            err,
            RepoError::NotFound {
                kind: EntityKind::Film,
                id: 42
            }
        ));
    }
}

#[test]
fn unknown_references_are_rejected_without_writing() {
    for storage in backends() {
        let mut bad_rating = film("Bad rating");
        bad_rating.mpa = Mpa::reference(9999);
        let err = storage.films.add(&bad_rating).unwrap_err();
        assert!(matches!(
            err,
            RepoError::NotFound {
                kind: EntityKind::Mpa,
                id: 9999
            }
        ));

        let err = storage
            .films
            .add(&film("Bad genre").with_genres([1, 9999]))
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::NotFound {
                kind: EntityKind::Genre,
                id: 9999
            }
        ));

        assert_eq!(storage.films.count().unwrap(), 0);
    }
}

#[test]
fn failed_update_leaves_film_untouched() {
    for storage in backends() {
        let stored = storage.films.add(&film("A").with_genres([1, 2])).unwrap();

        let mut changed = stored.clone().with_genres([3, 9999]);
        changed.name = "B".to_string();
        let err = storage.films.update(&changed).unwrap_err();
        assert!(matches!(
            err,
            RepoError::NotFound {
                kind: EntityKind::Genre,
                id: 9999
            }
        ));

        let loaded = storage.films.get_by_id(stored.id).unwrap();
        assert_eq!(loaded.name, "A", "backend {}", storage.backend());
        assert_eq!(loaded.genre_ids(), vec![1, 2]);
    }
}

#[test]
fn invalid_fields_are_rejected_before_storage() {
    for storage in backends() {
        let mut blank = film("x");
        blank.name = "  ".to_string();
        assert!(matches!(
            storage.films.add(&blank).unwrap_err(),
            RepoError::Validation(ValidationError::BlankName)
        ));

        let mut early = film("Early");
        early.release_date = date(1895, 12, 27);
        assert!(matches!(
            storage.films.add(&early).unwrap_err(),
            RepoError::Validation(ValidationError::ReleaseDateTooEarly(_))
        ));

        let mut zero = film("Zero");
        zero.duration = 0;
        assert!(matches!(
            storage.films.add(&zero).unwrap_err(),
            RepoError::Validation(ValidationError::NonPositiveDuration)
        ));

        assert_eq!(storage.films.count().unwrap(), 0);
    }
}

#[test]
fn like_edges_report_whether_they_changed() {
    for storage in backends() {
        let film = storage.films.add(&film("Liked")).unwrap();
        let users = add_users(&storage, 2);

        assert!(storage.films.add_like(film.id, users[1]).unwrap());
        assert!(storage.films.add_like(film.id, users[0]).unwrap());
        assert!(!storage.films.add_like(film.id, users[0]).unwrap());
        assert_eq!(storage.films.likes(film.id).unwrap(), users);

        assert!(storage.films.delete_like(film.id, users[0]).unwrap());
        assert!(!storage.films.delete_like(film.id, users[0]).unwrap());
        assert_eq!(storage.films.likes(film.id).unwrap(), vec![users[1]]);
    }
}

#[test]
fn likes_require_existing_film_and_user() {
    for storage in backends() {
        let film = storage.films.add(&film("Lonely")).unwrap();
        let users = add_users(&storage, 1);

        assert!(matches!(
            storage.films.add_like(999, users[0]).unwrap_err(),
            RepoError::NotFound {
                kind: EntityKind::Film,
                id: 999
            }
        ));
        assert!(matches!(
            storage.films.add_like(film.id, 999).unwrap_err(),
            RepoError::NotFound {
                kind: EntityKind::User,
                id: 999
            }
        ));
    }
}

#[test]
fn likes_follow_user_existence_reported_by_user_repository() {
    for storage in backends() {
        let film = storage.films.add(&film("Orphaned")).unwrap();
        let users = add_users(&storage, 1);
        assert!(storage.users.exists(users[0]).unwrap());
        assert!(storage.films.add_like(film.id, users[0]).unwrap());

        storage.users.reset().unwrap();
        assert!(!storage.users.exists(users[0]).unwrap());
        assert!(storage.films.likes(film.id).unwrap().is_empty());
        assert!(matches!(
            storage.films.add_like(film.id, users[0]).unwrap_err(),
            RepoError::NotFound {
                kind: EntityKind::User,
                ..
            }
        ));
    }
}

#[test]
fn stored_rows_are_read_back_without_field_rules() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO films (name, description, release_date, duration, mpa_id)
         VALUES ('Legacy', ?1, '1890-01-01', 12, 1);",
        ["x".repeat(250)],
    )
    .unwrap();
    let storage = Storage::sqlite(conn);
    storage.films.add(&film("Current")).unwrap();

    let all = storage.films.get_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].name, "Legacy");
    assert_eq!(all[0].description.chars().count(), 250);
    assert_eq!(all[0].release_date, date(1890, 1, 1));
    assert_eq!(storage.films.popular(10).unwrap().len(), 2);
}

#[test]
fn popular_ranks_by_likes_then_id() {
    for storage in backends() {
        let a = storage.films.add(&film("A")).unwrap();
        let b = storage.films.add(&film("B")).unwrap();
        let c = storage.films.add(&film("C")).unwrap();
        let users = add_users(&storage, 3);

        for user in &users {
            storage.films.add_like(c.id, *user).unwrap();
        }
        storage.films.add_like(b.id, users[0]).unwrap();

        let ranked: Vec<i64> = storage
            .films
            .popular(10)
            .unwrap()
            .iter()
            .map(|film| film.id)
            .collect();
        assert_eq!(ranked, vec![c.id, b.id, a.id]);

        let top = storage.films.popular(1).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, c.id);
        assert!(storage.films.popular(0).unwrap().is_empty());
    }
}

#[test]
fn popular_breaks_ties_by_ascending_id() {
    for storage in backends() {
        let first = storage.films.add(&film("First")).unwrap();
        let second = storage.films.add(&film("Second")).unwrap();

        let ranked: Vec<i64> = storage
            .films
            .popular(2)
            .unwrap()
            .iter()
            .map(|film| film.id)
            .collect();
        assert_eq!(ranked, vec![first.id, second.id]);
    }
}

#[test]
fn reset_clears_films_and_likes_but_keeps_ids_fresh() {
    for storage in backends() {
        let old = storage.films.add(&film("Old").with_genres([1])).unwrap();
        let users = add_users(&storage, 1);
        storage.films.add_like(old.id, users[0]).unwrap();

        storage.films.reset().unwrap();
        assert!(storage.films.get_all().unwrap().is_empty());
        assert!(matches!(
            storage.films.get_by_id(old.id).unwrap_err(),
            RepoError::NotFound { .. }
        ));

        let new = storage.films.add(&film("New")).unwrap();
        assert!(new.id > old.id);
        assert!(storage.films.likes(new.id).unwrap().is_empty());
        assert_eq!(storage.users.get_all().unwrap().len(), 1);
    }
}
