pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use std::path::Path;

use crate::error::AppResult;

const DB_FILE_NAME: &str = "metis.sqlite";

/// Initializes logging, storage and the service registry under `data_dir`.
pub fn bootstrap(data_dir: &Path) -> AppResult<api::AppState> {
    utils::logger::init_logging(data_dir)?;

    std::fs::create_dir_all(data_dir)?;
    let db_path = data_dir.join(DB_FILE_NAME);
    let pool = db::DbPool::new(db_path)?;

    api::AppState::new(pool)
}
