use std::thread::{self, JoinHandle};

use blocklog::update::{self, CURRENT_VERSION, DEFAULT_TIMEOUT};
use blocklog::{ConfigError, ConfigStore, UpdateError, UpdateStatus, Updater};
use tracing::{debug, warn};

/// Background update check. The main path never waits on it.
pub(super) struct UpdateCheck {
    handle: Option<JoinHandle<Result<UpdateStatus, UpdateError>>>,
}

impl UpdateCheck {
    pub(super) fn spawn(config: &ConfigStore) -> Self {
        let settings = config.config();
        let url = match (&settings.update_url, settings.auto_update) {
            (Some(url), true) => url.clone(),
            (None, true) => {
                debug!("no update URL configured; skipping update check");
                return Self { handle: None };
            }
            (_, false) => return Self { handle: None },
        };

        let handle = thread::Builder::new()
            .name("update-check".into())
            .spawn(move || Updater::new(url, DEFAULT_TIMEOUT)?.check())
            .map_err(|err| warn!(error = %err, "could not start update check"))
            .ok();
        Self { handle }
    }

    /// Prints the result if the check has already finished.
    pub(super) fn report(self) {
        let Some(handle) = self.handle else {
            return;
        };
        if !handle.is_finished() {
            debug!("update check still running; not waiting for it");
            return;
        }
        match handle.join() {
            Ok(Ok(UpdateStatus::Available(manifest))) => {
                eprintln!(
                    "Update available: {} -> {}. Run with --self-update to download it.",
                    CURRENT_VERSION, manifest.version
                );
            }
            Ok(Ok(UpdateStatus::UpToDate { version })) => {
                debug!(%version, "already up to date");
            }
            Ok(Err(err)) => warn!(error = %err, "update check failed"),
            Err(_) => warn!("update check thread panicked"),
        }
    }
}

pub(super) fn run_self_update(config: &ConfigStore) -> Result<(), String> {
    let url = config
        .config()
        .update_url
        .clone()
        .ok_or_else(|| ConfigError::NoUpdateUrl(config.path()).to_string())?;
    let updater = Updater::new(url, DEFAULT_TIMEOUT).map_err(|e| e.to_string())?;

    match updater.check().map_err(|e| e.to_string())? {
        UpdateStatus::UpToDate { version } => {
            println!(
                "Already up to date (installed {}, latest {}).",
                CURRENT_VERSION, version
            );
        }
        UpdateStatus::Available(manifest) => {
            let dir = update::releases_dir(config.state_dir());
            let path = updater
                .install(&manifest, &dir)
                .map_err(|e| e.to_string())?;
            println!(
                "Downloaded blocklog {} to {}. Replace your installed binary with it when ready.",
                manifest.version,
                path.display()
            );
        }
    }
    Ok(())
}
