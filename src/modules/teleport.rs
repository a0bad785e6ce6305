use tracing::{debug, warn};

use crate::modules::config::ConfigStore;
use crate::modules::coords::PlayerCoordinates;
use crate::modules::error::{StoreError, TeleportError};
use crate::modules::store::EventStore;

/// World lookups a teleport needs from the event store.
pub trait WorldDirectory {
    fn world_name(&self, world_id: i64) -> Result<Option<String>, StoreError>;

    /// World to use when neither the request nor the stored position has one.
    fn default_world_id(&self) -> Result<Option<i64>, StoreError>;
}

impl WorldDirectory for EventStore {
    fn world_name(&self, world_id: i64) -> Result<Option<String>, StoreError> {
        EventStore::world_name(self, world_id)
    }

    fn default_world_id(&self) -> Result<Option<i64>, StoreError> {
        self.first_world_id()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeleportRequest {
    /// No values: report the stored position only.
    Show,
    /// `WORLD`: keep x, y, z.
    World { world_id: i64 },
    /// `X Y Z`: keep the current world.
    Position { x: i32, y: i32, z: i32 },
    Full { x: i32, y: i32, z: i32, world_id: i64 },
}

impl TeleportRequest {
    pub fn from_values(values: &[i64]) -> Result<Self, TeleportError> {
        match *values {
            [] => Ok(TeleportRequest::Show),
            [world_id] => Ok(TeleportRequest::World { world_id }),
            [x, y, z] => Ok(TeleportRequest::Position {
                x: coordinate(x)?,
                y: coordinate(y)?,
                z: coordinate(z)?,
            }),
            [x, y, z, world_id] => Ok(TeleportRequest::Full {
                x: coordinate(x)?,
                y: coordinate(y)?,
                z: coordinate(z)?,
                world_id,
            }),
            _ => Err(TeleportError::Arity(values.len())),
        }
    }
}

fn coordinate(value: i64) -> Result<i32, TeleportError> {
    i32::try_from(value).map_err(|_| TeleportError::CoordinateRange(value))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeleportOutcome {
    Current(PlayerCoordinates),
    Applied {
        world_name: String,
        coords: PlayerCoordinates,
        /// Set when persisting failed; the new position is still in effect.
        save_error: Option<String>,
    },
    Rejected { world_id: Option<i64> },
}

/// Resolves `request` against the stored position and applies it when its
/// world is known. Lookup faults propagate; a failed save does not.
pub fn teleport(
    request: TeleportRequest,
    store: &mut ConfigStore,
    worlds: &impl WorldDirectory,
) -> Result<TeleportOutcome, StoreError> {
    let current = store.coordinates();

    let (x, y, z, explicit_world) = match request {
        TeleportRequest::Show => return Ok(TeleportOutcome::Current(current)),
        TeleportRequest::World { world_id } => (current.x, current.y, current.z, Some(world_id)),
        TeleportRequest::Position { x, y, z } => (x, y, z, None),
        TeleportRequest::Full { x, y, z, world_id } => (x, y, z, Some(world_id)),
    };

    let world_id = match explicit_world.or(current.world_id) {
        Some(id) => Some(id),
        None => worlds.default_world_id()?,
    };
    debug!(x, y, z, world = ?world_id, "resolving teleport");

    let Some(world_id) = world_id else {
        return Ok(TeleportOutcome::Rejected { world_id: None });
    };
    let Some(world_name) = worlds.world_name(world_id)? else {
        return Ok(TeleportOutcome::Rejected {
            world_id: Some(world_id),
        });
    };

    let coords = PlayerCoordinates::at(x, y, z).in_world(world_id);
    let save_error = match store.save_coordinates(coords) {
        Ok(()) => None,
        Err(err) => {
            warn!(error = %err, "failed to persist coordinates");
            Some(err.to_string())
        }
    };

    Ok(TeleportOutcome::Applied {
        world_name,
        coords,
        save_error,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use tempfile::TempDir;

    struct Worlds(HashMap<i64, &'static str>);

    impl Worlds {
        fn standard() -> Self {
            Worlds(HashMap::from([(1, "world"), (2, "world_nether"), (3, "world_the_end")]))
        }
    }

    impl WorldDirectory for Worlds {
        fn world_name(&self, world_id: i64) -> Result<Option<String>, StoreError> {
            Ok(self.0.get(&world_id).map(|s| s.to_string()))
        }

        fn default_world_id(&self) -> Result<Option<i64>, StoreError> {
            Ok(self.0.keys().min().copied())
        }
    }

    fn store_at(temp: &TempDir, coords: PlayerCoordinates) -> ConfigStore {
        let mut store = ConfigStore::open(temp.path()).unwrap();
        store.save_coordinates(coords).unwrap();
        store
    }

    #[test]
    fn parses_value_counts() {
        assert_eq!(TeleportRequest::from_values(&[]).unwrap(), TeleportRequest::Show);
        assert_eq!(
            TeleportRequest::from_values(&[5]).unwrap(),
            TeleportRequest::World { world_id: 5 }
        );
        assert_eq!(
            TeleportRequest::from_values(&[1, -2, 3]).unwrap(),
            TeleportRequest::Position { x: 1, y: -2, z: 3 }
        );
        assert_eq!(
            TeleportRequest::from_values(&[100, 200, 300, 5]).unwrap(),
            TeleportRequest::Full {
                x: 100,
                y: 200,
                z: 300,
                world_id: 5
            }
        );
        assert!(matches!(
            TeleportRequest::from_values(&[1, 2]),
            Err(TeleportError::Arity(2))
        ));
        assert!(matches!(
            TeleportRequest::from_values(&[i64::MAX, 0, 0]),
            Err(TeleportError::CoordinateRange(_))
        ));
    }

    #[test]
    fn full_request_updates_position_and_world() {
        let temp = TempDir::new().unwrap();
        let mut store = store_at(&temp, PlayerCoordinates::at(1, 1, 1).in_world(1));

        let outcome = teleport(
            TeleportRequest::Full {
                x: 100,
                y: 64,
                z: -300,
                world_id: 2,
            },
            &mut store,
            &Worlds::standard(),
        )
        .unwrap();

        let expected = PlayerCoordinates::at(100, 64, -300).in_world(2);
        assert_eq!(
            outcome,
            TeleportOutcome::Applied {
                world_name: "world_nether".into(),
                coords: expected,
                save_error: None,
            }
        );
        assert_eq!(ConfigStore::open(temp.path()).unwrap().coordinates(), expected);
    }

    #[test]
    fn world_only_keeps_position() {
        let temp = TempDir::new().unwrap();
        let mut store = store_at(&temp, PlayerCoordinates::at(7, 8, 9).in_world(1));

        teleport(TeleportRequest::World { world_id: 3 }, &mut store, &Worlds::standard()).unwrap();

        assert_eq!(store.coordinates(), PlayerCoordinates::at(7, 8, 9).in_world(3));
    }

    #[test]
    fn position_only_keeps_world() {
        let temp = TempDir::new().unwrap();
        let mut store = store_at(&temp, PlayerCoordinates::at(7, 8, 9).in_world(3));

        teleport(
            TeleportRequest::Position { x: 0, y: 0, z: 0 },
            &mut store,
            &Worlds::standard(),
        )
        .unwrap();

        assert_eq!(store.coordinates(), PlayerCoordinates::at(0, 0, 0).in_world(3));
    }

    #[test]
    fn position_without_stored_world_uses_default() {
        let temp = TempDir::new().unwrap();
        let mut store = ConfigStore::open(temp.path()).unwrap();

        let outcome = teleport(
            TeleportRequest::Position { x: 4, y: 5, z: 6 },
            &mut store,
            &Worlds::standard(),
        )
        .unwrap();

        assert!(matches!(outcome, TeleportOutcome::Applied { ref world_name, .. } if world_name == "world"));
        assert_eq!(store.coordinates().world_id, Some(1));
    }

    #[test]
    fn show_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let mut store = ConfigStore::open(temp.path()).unwrap();

        let outcome = teleport(TeleportRequest::Show, &mut store, &Worlds::standard()).unwrap();

        assert_eq!(outcome, TeleportOutcome::Current(PlayerCoordinates::origin()));
        assert!(!store.path().exists());
    }

    #[test]
    fn unknown_world_is_rejected_without_mutation() {
        let temp = TempDir::new().unwrap();
        let before = PlayerCoordinates::at(1, 2, 3).in_world(1);
        let mut store = store_at(&temp, before);

        let outcome = teleport(
            TeleportRequest::Full {
                x: 9,
                y: 9,
                z: 9,
                world_id: 42,
            },
            &mut store,
            &Worlds::standard(),
        )
        .unwrap();

        assert_eq!(outcome, TeleportOutcome::Rejected { world_id: Some(42) });
        assert_eq!(store.coordinates(), before);
        assert_eq!(ConfigStore::open(temp.path()).unwrap().coordinates(), before);
    }

    #[test]
    fn no_world_anywhere_is_rejected() {
        let temp = TempDir::new().unwrap();
        let mut store = ConfigStore::open(temp.path()).unwrap();

        let outcome = teleport(
            TeleportRequest::Position { x: 1, y: 1, z: 1 },
            &mut store,
            &Worlds(HashMap::new()),
        )
        .unwrap();

        assert_eq!(outcome, TeleportOutcome::Rejected { world_id: None });
        assert_eq!(store.coordinates(), PlayerCoordinates::origin());
    }
}
