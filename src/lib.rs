pub mod modules;

pub use modules::action::{self, ActionFilter, ActionGroup, ActionKind, classify};
pub use modules::config::{self, Config, ConfigStore, validate_db_path};
pub use modules::coords::{PlayerCoordinates, distance3d};
pub use modules::error::{ConfigError, StoreError, TeleportError, UpdateError};
pub use modules::format::{EventView, describe_event, format_timestamp, format_timestamp_in};
pub use modules::query::{BlockEvent, EventQuery, FilterSet, query_events};
pub use modules::store::EventStore;
pub use modules::teleport::{TeleportOutcome, TeleportRequest, WorldDirectory, teleport};
pub use modules::update::{self, ReleaseManifest, UpdateStatus, Updater};
