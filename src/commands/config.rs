use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use blocklog::{ConfigError, ConfigStore};

pub(super) fn run_change_db(config: &mut ConfigStore, path: Option<PathBuf>) -> Result<(), String> {
    let path = match path {
        Some(p) => p,
        None => prompt_db_path("New database path (.db): ")?,
    };
    config.set_db_path(&path).map_err(|e| e.to_string())?;
    println!(
        "Database path set to {} (saved in {})",
        path.display(),
        config.path().display()
    );
    Ok(())
}

pub(super) fn run_set_auto_update(config: &mut ConfigStore, enabled: bool) -> Result<(), String> {
    config.set_auto_update(enabled).map_err(|e| e.to_string())?;
    println!(
        "Automatic update check {}.",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

/// Returns the configured database path, asking for one on first run.
pub(super) fn ensure_db_path(config: &mut ConfigStore) -> Result<PathBuf, String> {
    if let Some(path) = config.db_path() {
        return Ok(path.to_path_buf());
    }

    let path = prompt_db_path("Database path (.db): ")?;
    config.set_db_path(&path).map_err(|e| e.to_string())?;
    println!("Configuration saved to {}", config.path().display());
    Ok(path)
}

fn prompt_db_path(prompt: &str) -> Result<PathBuf, String> {
    print!("{}", prompt);
    io::stdout().flush().map_err(|e| e.to_string())?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| format!("failed to read database path: {}", e))?;

    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::NoDatabasePath.to_string());
    }
    Ok(PathBuf::from(trimmed))
}
