use rusqlite::types::Value;
use serde::Serialize;
use tracing::{debug, warn};

use crate::modules::action::{ActionFilter, ActionKind, classify};
use crate::modules::coords::PlayerCoordinates;
use crate::modules::error::StoreError;
use crate::modules::store::{DISTANCE_FN, EventStore};

// Inner join: events without a `co_user` row never appear.
const BASE_SELECT: &str = "SELECT b.time, u.id, u.user, b.x, b.y, b.z, b.action \
     FROM co_block AS b JOIN co_user AS u ON b.user = u.id";

/// Stable output order: oldest first, insertion order within one second.
const ORDER_BY: &str = " ORDER BY b.time ASC, b.rowid ASC";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    pub radius: Option<f64>,
    pub origin: PlayerCoordinates,
    pub user: Option<String>,
    pub action: Option<String>,
}

impl FilterSet {
    pub fn new(origin: PlayerCoordinates) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_action(mut self, token: impl Into<String>) -> Self {
        self.action = Some(token.into());
        self
    }

    pub fn effective_radius(&self) -> Option<f64> {
        self.radius.filter(|r| r.is_finite() && *r > 0.0)
    }

    pub fn effective_user(&self) -> Option<&str> {
        self.user
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    pub fn effective_action(&self) -> Option<ActionFilter> {
        let token = self.action.as_deref()?;
        let filter = ActionFilter::from_token(token);
        if filter.is_none() {
            warn!(token, "ignoring unrecognized action filter");
        }
        filter
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    sql: String,
    params: Vec<Value>,
}

impl EventQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn build(filters: &FilterSet) -> Self {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(radius) = filters.effective_radius() {
            let origin = filters.origin;
            clauses.push(format!("{}(b.x, b.y, b.z, ?, ?, ?) <= ?", DISTANCE_FN));
            params.push(Value::Integer(i64::from(origin.x)));
            params.push(Value::Integer(i64::from(origin.y)));
            params.push(Value::Integer(i64::from(origin.z)));
            params.push(Value::Real(radius));
        }

        if let Some(user) = filters.effective_user() {
            clauses.push("(u.user = ? OR u.id = ?)".to_string());
            params.push(Value::Text(user.to_string()));
            // A non-numeric value binds NULL, which never equals an id.
            params.push(match user.parse::<i64>() {
                Ok(id) => Value::Integer(id),
                Err(_) => Value::Null,
            });
        }

        if let Some(action) = filters.effective_action() {
            clauses.push(action.sql_predicate("b.action"));
        }

        let mut sql = String::from(BASE_SELECT);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(ORDER_BY);

        Self { sql, params }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockEvent {
    /// Seconds since the Unix epoch.
    pub time: i64,
    pub user_id: i64,
    pub user_name: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub action: i64,
}

impl BlockEvent {
    pub fn kind(&self) -> ActionKind {
        classify(self.action)
    }
}

/// Builds and runs the query for `filters`. Store faults propagate unchanged;
/// no partial result is returned.
pub fn query_events(store: &EventStore, filters: &FilterSet) -> Result<Vec<BlockEvent>, StoreError> {
    let query = EventQuery::build(filters);
    debug!(sql = query.sql(), params = ?query.params(), "running event query");
    let events = store.block_events(&query)?;
    debug!(rows = events.len(), "event query finished");
    Ok(events)
}
