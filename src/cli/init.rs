use std::path::PathBuf;

use crate::db::{get_connection, init_db, DB_FILE};
use crate::error::{FinrepError, Result};
use crate::ingest::EntityScope;
use crate::settings::{load_settings, save_settings, shellexpand_path, uploads_dir};

pub fn run(data_dir: Option<String>, entity_scope: Option<&str>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(key) = entity_scope {
        settings.entity_scope = EntityScope::from_key(key).ok_or_else(|| {
            FinrepError::UnknownOption(format!("{key} (expected sheet or entity)"))
        })?;
    }

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    std::fs::create_dir_all(uploads_dir(&resolved))?;
    std::fs::create_dir_all(resolved.join("exports"))?;

    let conn = get_connection(&resolved.join(DB_FILE))?;
    init_db(&conn)?;
    save_settings(&settings)?;

    println!("Initialized finrep at {}", resolved.display());
    println!("Entity scope: {}", settings.entity_scope.key());
    Ok(())
}
