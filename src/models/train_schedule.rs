use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use crate::time::option_iso_duration_serde;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Comfort {
    #[default]
    Standard,
    AirConditioning,
    Heating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Distribution {
    #[default]
    Standard,
    Mareco,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrainCategory {
    Main { main_category: String },
    Sub { sub_category_code: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathItem {
    pub id: String,
    /// Operational point reference (id, trigram or track offset), kept opaque
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    /// Id of the path item this entry applies to
    pub at: String,
    #[serde(with = "option_iso_duration_serde", default)]
    pub arrival: Option<Duration>,
    #[serde(with = "option_iso_duration_serde", default)]
    pub stop_for: Option<Duration>,
    #[serde(default)]
    pub on_stop_signal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    pub boundaries: Vec<String>,
    pub values: Vec<String>,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            boundaries: Vec::new(),
            values: vec!["0%".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerRestrictionItem {
    pub from: String,
    pub to: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainScheduleOptions {
    #[serde(default = "default_true")]
    pub use_electrical_profiles: bool,
    #[serde(default = "default_true")]
    pub use_speed_limits_for_simulation: bool,
}

impl Default for TrainScheduleOptions {
    fn default() -> Self {
        Self {
            use_electrical_profiles: true,
            use_speed_limits_for_simulation: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A single train definition. Paced trains use it as their model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainSchedule {
    pub train_name: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub rolling_stock_name: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub path: Vec<PathItem>,
    #[serde(default)]
    pub schedule: Vec<ScheduleItem>,
    #[serde(default)]
    pub margins: Margins,
    #[serde(default)]
    pub initial_speed: f64,
    #[serde(default)]
    pub comfort: Comfort,
    #[serde(default)]
    pub constraint_distribution: Distribution,
    #[serde(default)]
    pub speed_limit_tag: Option<String>,
    #[serde(default)]
    pub power_restrictions: Vec<PowerRestrictionItem>,
    #[serde(default)]
    pub options: TrainScheduleOptions,
    #[serde(default)]
    pub category: Option<TrainCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_schedule() {
        let json = r#"{
            "train_name": "8601",
            "rolling_stock_name": "Z2N",
            "start_time": "2025-03-01T08:00:00Z",
            "schedule": [{"at": "b", "arrival": "PT25M", "stop_for": "PT2M"}]
        }"#;
        let schedule: TrainSchedule = serde_json::from_str(json).expect("valid schedule");
        assert_eq!(schedule.train_name, "8601");
        assert_eq!(schedule.comfort, Comfort::Standard);
        assert_eq!(schedule.margins, Margins::default());
        assert!(schedule.options.use_electrical_profiles);
        assert_eq!(schedule.schedule[0].arrival, Some(Duration::minutes(25)));
        assert_eq!(schedule.schedule[0].stop_for, Some(Duration::minutes(2)));
        assert!(!schedule.schedule[0].on_stop_signal);
    }

    #[test]
    fn test_category_variants() {
        let main: TrainCategory = serde_json::from_str(r#"{"main_category":"FREIGHT_TRAIN"}"#)
            .expect("valid category");
        assert_eq!(main, TrainCategory::Main { main_category: "FREIGHT_TRAIN".to_string() });
        let sub: TrainCategory = serde_json::from_str(r#"{"sub_category_code":"TER"}"#)
            .expect("valid category");
        assert_eq!(sub, TrainCategory::Sub { sub_category_code: "TER".to_string() });
    }
}
