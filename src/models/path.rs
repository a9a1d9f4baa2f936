use serde::{Deserialize, Serialize};

/// One sample of a train's position over time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    /// Millimeters from the path origin
    pub position: f64,
    /// Milliseconds since the Unix epoch
    pub time: i64,
}

impl PathPoint {
    #[must_use]
    pub fn new(position: f64, time: i64) -> Self {
        Self { position, time }
    }
}

/// A renderable train path: points are monotonic in time, not necessarily in position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathData {
    pub id: String,
    pub label: String,
    pub color: String,
    pub points: Vec<PathPoint>,
}

/// A continuous piece of a train's projection onto the displayed path.
///
/// Both arrays have the same length; times are relative to the train's departure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceTimeCurve {
    pub positions: Vec<f64>,
    pub times: Vec<i64>,
}

/// Projection result for one train, as delivered by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedTrain {
    pub id: String,
    pub name: String,
    /// Milliseconds since the Unix epoch
    pub departure_time: i64,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub space_time_curves: Vec<SpaceTimeCurve>,
}

fn default_color() -> String {
    "#303383".to_string()
}
