use serde::{Deserialize, Serialize};
use crate::constants::{
    DEFAULT_HISTORY_LEVELS, MANCHETTE_MIN_LABEL_SPACE, MAX_MS_PER_PX, MAX_ZOOM_RATIO, MIN_MS_PER_PX,
    MIN_RECT_ZOOM_SIZE, MIN_ZOOM_RATIO, PATH_HIT_TOLERANCE, WHEEL_PAN_SPEED, WHEEL_ZOOM_FACTOR,
};
use crate::error::Result;
use crate::scale::{SpaceAxis, ZoomLimits};

/// Tunables of the chart engine. Every field has a default, so a partial
/// (or empty) JSON object is a valid configuration.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
pub struct ChartConfig {
    #[serde(default = "default_min_ms_per_px")]
    pub min_ms_per_px: f64,
    #[serde(default = "default_max_ms_per_px")]
    pub max_ms_per_px: f64,
    #[serde(default = "default_wheel_zoom_factor")]
    pub wheel_zoom_factor: f64,
    #[serde(default = "default_wheel_pan_speed")]
    pub wheel_pan_speed: f64,
    #[serde(default = "default_min_zoom_ratio")]
    pub min_zoom_ratio: f64,
    #[serde(default = "default_max_zoom_ratio")]
    pub max_zoom_ratio: f64,
    /// Rect-zoom selections narrower or shorter than this (px) are ignored
    #[serde(default = "default_min_rect_zoom_size")]
    pub min_rect_zoom_size: f64,
    #[serde(default = "default_manchette_min_label_space")]
    pub manchette_min_label_space: f64,
    #[serde(default = "default_hit_tolerance")]
    pub hit_tolerance: f64,
    #[serde(default = "default_history_levels")]
    pub history_levels: usize,
    #[serde(default)]
    pub space_axis: SpaceAxis,
}

fn default_min_ms_per_px() -> f64 {
    MIN_MS_PER_PX
}

fn default_max_ms_per_px() -> f64 {
    MAX_MS_PER_PX
}

fn default_wheel_zoom_factor() -> f64 {
    WHEEL_ZOOM_FACTOR
}

fn default_wheel_pan_speed() -> f64 {
    WHEEL_PAN_SPEED
}

fn default_min_zoom_ratio() -> f64 {
    MIN_ZOOM_RATIO
}

fn default_max_zoom_ratio() -> f64 {
    MAX_ZOOM_RATIO
}

fn default_min_rect_zoom_size() -> f64 {
    MIN_RECT_ZOOM_SIZE
}

fn default_manchette_min_label_space() -> f64 {
    MANCHETTE_MIN_LABEL_SPACE
}

fn default_hit_tolerance() -> f64 {
    PATH_HIT_TOLERANCE
}

fn default_history_levels() -> usize {
    DEFAULT_HISTORY_LEVELS
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            min_ms_per_px: MIN_MS_PER_PX,
            max_ms_per_px: MAX_MS_PER_PX,
            wheel_zoom_factor: WHEEL_ZOOM_FACTOR,
            wheel_pan_speed: WHEEL_PAN_SPEED,
            min_zoom_ratio: MIN_ZOOM_RATIO,
            max_zoom_ratio: MAX_ZOOM_RATIO,
            min_rect_zoom_size: MIN_RECT_ZOOM_SIZE,
            manchette_min_label_space: MANCHETTE_MIN_LABEL_SPACE,
            hit_tolerance: PATH_HIT_TOLERANCE,
            history_levels: DEFAULT_HISTORY_LEVELS,
            space_axis: SpaceAxis::default(),
        }
    }
}

impl ChartConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ChartError::Json`] if the input is not a valid configuration object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Time scale and space ratio bounds shared by every zoom gesture
    #[must_use]
    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits::new((self.min_ms_per_px, self.max_ms_per_px), (self.min_zoom_ratio, self.max_zoom_ratio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = ChartConfig::from_json("{}").expect("valid config");
        assert_eq!(config, ChartConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = ChartConfig::from_json(r#"{"wheel_zoom_factor": 1.25, "space_axis": "x"}"#)
            .expect("valid config");
        assert!((config.wheel_zoom_factor - 1.25).abs() < f64::EPSILON);
        assert_eq!(config.space_axis, SpaceAxis::X);
        assert_eq!(config.history_levels, DEFAULT_HISTORY_LEVELS);
    }

    #[test]
    fn test_zoom_limits_follow_config() {
        let config = ChartConfig::from_json(r#"{"max_ms_per_px": 3600000.0, "max_zoom_ratio": 40.0}"#)
            .expect("valid config");
        let limits = config.zoom_limits();
        assert!((limits.max_ms_per_px() - 3_600_000.0).abs() < f64::EPSILON);
        assert!((limits.min_ms_per_px() - MIN_MS_PER_PX).abs() < f64::EPSILON);
        assert!((limits.clamp_ratio(100.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_config() {
        assert!(ChartConfig::from_json(r#"{"history_levels": "many"}"#).is_err());
        assert!(ChartConfig::from_json("not json").is_err());
    }
}
