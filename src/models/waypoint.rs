use serde::{Deserialize, Serialize};

/// An operational point along the projection path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: String,
    /// Millimeters from the path origin
    pub position: f64,
    pub name: String,
    #[serde(default)]
    pub secondary_code: Option<String>,
    /// Importance level; higher weights keep their label when space runs out
    #[serde(default)]
    pub weight: u32,
}

impl Waypoint {
    #[must_use]
    pub fn new(id: impl Into<String>, position: f64, name: impl Into<String>, weight: u32) -> Self {
        Self {
            id: id.into(),
            position,
            name: name.into(),
            secondary_code: None,
            weight,
        }
    }

    /// Name followed by the secondary code, if any
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.secondary_code {
            Some(code) if !code.is_empty() => format!("{} {code}", self.name),
            _ => self.name.clone(),
        }
    }
}
