//! CLI smoke entry point.
//!
//! Opens the storage selected by the environment and prints a one-shot
//! summary, so linkage and configuration can be checked without a server.

use filmorate_core::{
    init_logging_from_env, CatalogService, FilmService, Storage, StorageConfig, UserService,
};
use log::info;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("filmorate: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    init_logging_from_env()?;

    let config = StorageConfig::from_env()?;
    let storage = Storage::open(&config).map_err(|err| err.to_string())?;
    let catalog = CatalogService::new(storage.genres.clone(), storage.mpa.clone());
    let films = FilmService::new(storage.films.clone());
    let users = UserService::new(storage.users.clone());

    let genres = catalog.genres().map_err(|err| err.to_string())?;
    let ratings = catalog.mpas().map_err(|err| err.to_string())?;
    let film_count = films.get_all().map_err(|err| err.to_string())?.len();
    let user_count = users.get_all().map_err(|err| err.to_string())?.len();

    println!("filmorate_core ping={}", filmorate_core::ping());
    println!("filmorate_core version={}", filmorate_core::core_version());
    println!("storage backend={}", storage.backend());
    println!(
        "catalog genres={} mpa={} films={film_count} users={user_count}",
        genres.len(),
        ratings.len()
    );

    info!(
        "event=cli_summary module=cli status=ok backend={} films={film_count} users={user_count}",
        storage.backend()
    );
    Ok(())
}
