use std::path::Path;

use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params, params_from_iter};
use tracing::debug;

use crate::modules::coords::distance3d;
use crate::modules::error::StoreError;
use crate::modules::query::{BlockEvent, EventQuery};

pub const DISTANCE_FN: &str = "distance3d";

pub struct EventStore {
    conn: Connection,
}

impl EventStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let store = Self::from_connection(conn)?;
        debug!(path = %path.display(), "connected to database");
        Ok(store)
    }

    /// Wraps an existing connection (used with in-memory databases in tests).
    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        register_distance_fn(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn block_events(&self, query: &EventQuery) -> Result<Vec<BlockEvent>, StoreError> {
        let mut stmt = self.conn.prepare(query.sql())?;
        let events = stmt
            .query_map(params_from_iter(query.params()), Self::row_to_block_event)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    fn row_to_block_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<BlockEvent> {
        Ok(BlockEvent {
            time: row.get(0)?,
            user_id: row.get(1)?,
            user_name: row.get(2)?,
            x: row.get(3)?,
            y: row.get(4)?,
            z: row.get(5)?,
            action: row.get(6)?,
        })
    }

    pub fn world_name(&self, world_id: i64) -> Result<Option<String>, StoreError> {
        let name = self
            .conn
            .query_row(
                "SELECT world FROM co_world WHERE id = ?1",
                params![world_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(name)
    }

    /// Lowest world id in `co_world`, used when no world was ever recorded.
    pub fn first_world_id(&self) -> Result<Option<i64>, StoreError> {
        let id = self
            .conn
            .query_row("SELECT MIN(id) FROM co_world", [], |row| {
                row.get::<_, Option<i64>>(0)
            })?;
        Ok(id)
    }
}

fn register_distance_fn(conn: &Connection) -> Result<(), StoreError> {
    conn.create_scalar_function(
        DISTANCE_FN,
        6,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let ex = ctx.get::<f64>(0)?;
            let ey = ctx.get::<f64>(1)?;
            let ez = ctx.get::<f64>(2)?;
            let ox = ctx.get::<f64>(3)?;
            let oy = ctx.get::<f64>(4)?;
            let oz = ctx.get::<f64>(5)?;
            Ok(distance3d(ex, ey, ez, ox, oy, oz))
        },
    )?;
    Ok(())
}
