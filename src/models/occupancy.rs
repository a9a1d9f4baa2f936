use serde::{Deserialize, Serialize};

/// Direction of travel relative to increasing positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Direction of a move from `from` to `to`; `None` when the position does not change
    #[must_use]
    pub fn between(from: f64, to: f64) -> Option<Self> {
        if to > from {
            Some(Self::Up)
        } else if to < from {
            Some(Self::Down)
        } else {
            None
        }
    }
}

/// Interval during which a path sits on (or crosses) a waypoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneInterval {
    pub start_time: i64,
    pub end_time: i64,
    pub start_direction: Option<Direction>,
    pub end_direction: Option<Direction>,
}

impl ZoneInterval {
    #[must_use]
    pub fn duration(&self) -> i64 {
        self.end_time - self.start_time
    }
}

/// A train's occupancy of a track at the selected waypoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyZone {
    pub start_time: i64,
    pub end_time: i64,
    pub start_direction: Option<Direction>,
    pub end_direction: Option<Direction>,
    pub train_id: String,
    pub track_id: String,
    pub color: String,
}
