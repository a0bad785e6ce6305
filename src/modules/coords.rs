use std::fmt;

use serde::{Deserialize, Serialize};

/// The operator's declared position; origin for radius queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCoordinates {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_id: Option<i64>,
}

impl PlayerCoordinates {
    pub const fn origin() -> Self {
        Self {
            x: 0,
            y: 0,
            z: 0,
            world_id: None,
        }
    }

    pub const fn at(x: i32, y: i32, z: i32) -> Self {
        Self {
            x,
            y,
            z,
            world_id: None,
        }
    }

    pub const fn in_world(self, world_id: i64) -> Self {
        Self {
            world_id: Some(world_id),
            ..self
        }
    }

}

impl fmt::Display for PlayerCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// `sqrt((ex-ox)^2 + (ey-oy)^2 + (ez-oz)^2)`, shared by the SQL function and
/// in-process checks so both agree at the boundary.
pub fn distance3d(ex: f64, ey: f64, ez: f64, ox: f64, oy: f64, oz: f64) -> f64 {
    let dx = ex - ox;
    let dy = ey - oy;
    let dz = ez - oz;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(distance3d(3.0, 4.0, 0.0, 0.0, 0.0, 0.0), 5.0);
        assert_eq!(distance3d(1.0, 1.0, 1.0, 1.0, 1.0, 1.0), 0.0);
        assert_eq!(distance3d(0.0, 0.0, 0.0, -2.0, 0.0, 0.0), 2.0);
    }

    #[test]
    fn serializes_with_optional_world() {
        let json = serde_json::to_string(&PlayerCoordinates::at(1, 2, 3)).unwrap();
        assert_eq!(json, r#"{"x":1,"y":2,"z":3}"#);

        let json = serde_json::to_string(&PlayerCoordinates::at(1, 2, 3).in_world(7)).unwrap();
        assert_eq!(json, r#"{"x":1,"y":2,"z":3,"worldId":7}"#);

        let parsed: PlayerCoordinates = serde_json::from_str(r#"{"x":-5,"y":64,"z":9}"#).unwrap();
        assert_eq!(parsed, PlayerCoordinates::at(-5, 64, 9));
    }
}
