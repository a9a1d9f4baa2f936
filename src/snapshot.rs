//! One-shot evaluation of a chart snapshot, as used by the command-line tool.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use crate::config::ChartConfig;
use crate::error::Result;
use crate::geometry::PixelRect;
use crate::manchette::{fit_space_scales, ManchetteLayout};
use crate::models::{OccupancyZone, Occurrence, PacedTrain, PathData, ProjectedTrain, Waypoint};
use crate::occupancy::{compute_occupancy_zones, group_by_track};
use crate::occurrence::occurrences_count;
use crate::paths::{build_paths, path_at_pixel};
use crate::render::{draw_occupancy_zones, draw_paths, draw_split_bands, CommandRecorder, DrawCommand};
use crate::scale::{ChartView, SpaceAxis, SplitPoint};

const OCCUPANCY_BAND_SIZE: f64 = 8.0;

/// Everything needed to derive one frame of the chart
#[derive(Debug, Clone, Deserialize)]
pub struct ChartSnapshot {
    #[serde(default)]
    pub config: ChartConfig,
    pub view: ChartView,
    /// Chart size in pixels, `(width, height)`
    #[serde(default = "default_viewport")]
    pub viewport: (f64, f64),
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
    #[serde(default)]
    pub split_points: Vec<SplitPoint>,
    #[serde(default)]
    pub trains: Vec<ProjectedTrain>,
    #[serde(default)]
    pub paced_trains: Vec<PacedTrain>,
    /// Waypoint whose occupancy is derived
    #[serde(default)]
    pub selected_waypoint: Option<String>,
    /// Replace the view's space scales with one fitted to the waypoints
    #[serde(default)]
    pub fit_waypoints: bool,
    /// Pointer position in pixels; the path under it is highlighted
    #[serde(default)]
    pub hover: Option<(f64, f64)>,
}

fn default_viewport() -> (f64, f64) {
    (1200.0, 800.0)
}

#[derive(Debug, Clone, Serialize)]
pub struct PacedTrainSummary {
    pub id: i64,
    pub occurrences_count: u64,
    pub occurrences: Vec<Occurrence>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartReport {
    pub paths: Vec<PathData>,
    pub occupancy: IndexMap<String, Vec<OccupancyZone>>,
    pub manchette: ManchetteLayout,
    pub paced_trains: Vec<PacedTrainSummary>,
    pub hovered_path: Option<String>,
    pub frame: Vec<DrawCommand>,
}

impl ChartSnapshot {
    /// Parse a snapshot. A view without its own `space_axis` takes the one
    /// from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ChartError::Json`] if the input is not a valid snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let axis_given = value.pointer("/view/space_axis").is_some();
        let mut snapshot: Self = serde_json::from_value(value)?;
        if !axis_given {
            snapshot.view.space_axis = snapshot.config.space_axis;
        }
        Ok(snapshot)
    }

    fn space_extent(&self) -> f64 {
        match self.view.space_axis {
            SpaceAxis::Y => self.viewport.1,
            SpaceAxis::X => self.viewport.0,
        }
    }

    fn time_extent(&self) -> f64 {
        match self.view.space_axis {
            SpaceAxis::Y => self.viewport.0,
            SpaceAxis::X => self.viewport.1,
        }
    }

    /// Derive paths, occupancy, manchette layout, occurrences and the draw commands of the frame.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ChartError::ZeroInterval`] if a paced train has a zero interval.
    pub fn evaluate(&self) -> Result<ChartReport> {
        let mut view = self.view.clone();
        if self.fit_waypoints {
            view.space_scales = fit_space_scales(&self.waypoints, self.space_extent());
            view.space_origin = self.waypoints.iter().map(|w| w.position).reduce(f64::min).unwrap_or(0.0);
        }
        // Shared by the manchette and every drawing call so rows and paths line up
        let view = view.with_split_points(&self.split_points);

        let paths = build_paths(&self.trains);
        let manchette = ManchetteLayout::compute(&view, &self.waypoints, &self.split_points, self.config.manchette_min_label_space);
        let hovered_path = self
            .hover
            .and_then(|pos| path_at_pixel(&view, &paths, pos, self.config.hit_tolerance))
            .map(|path| path.id.clone());

        let selected = self
            .selected_waypoint
            .as_deref()
            .and_then(|id| self.waypoints.iter().find(|w| w.id == id));
        let zones = match selected {
            Some(waypoint) => compute_occupancy_zones(&paths, waypoint.position, &waypoint.id),
            None => {
                if let Some(id) = &self.selected_waypoint {
                    log::warn!("Selected waypoint '{id}' is not part of the snapshot");
                }
                Vec::new()
            }
        };

        let paced_trains = self
            .paced_trains
            .iter()
            .map(|train| {
                Ok(PacedTrainSummary {
                    id: train.id,
                    occurrences_count: occurrences_count(&train.paced)?,
                    occurrences: train.occurrences()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut recorder = CommandRecorder::new();
        let clip = PixelRect::from_corners((0.0, 0.0), self.viewport);
        draw_split_bands(&mut recorder, &view, &manchette, self.time_extent());
        draw_paths(&mut recorder, &view, &paths, clip, hovered_path.as_deref());
        if let Some(row) = selected.and_then(|w| manchette.rows.iter().find(|r| r.waypoint_id == w.id)) {
            draw_occupancy_zones(&mut recorder, &view, &zones, row.px, OCCUPANCY_BAND_SIZE);
        }

        Ok(ChartReport {
            paths,
            occupancy: group_by_track(zones),
            manchette,
            paced_trains,
            hovered_path,
            frame: recorder.commands,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SpaceTimeCurve;

    const SNAPSHOT: &str = r#"{
        "view": {
            "time_origin": 0,
            "time_scale": 1000.0,
            "space_origin": 0.0,
            "space_scales": [{"to": 100000.0, "size": {"coefficient": 0.001}}]
        },
        "viewport": [400.0, 200.0],
        "waypoints": [
            {"id": "a", "position": 0.0, "name": "A", "weight": 2},
            {"id": "b", "position": 50000.0, "name": "B", "weight": 1}
        ],
        "trains": [
            {"id": "t1", "name": "8601", "departure_time": 10000,
             "space_time_curves": [{"positions": [0.0, 100000.0], "times": [0, 100000]}]}
        ],
        "paced_trains": [
            {"id": 7, "train_name": "8601", "rolling_stock_name": "Z2N",
             "start_time": "2025-03-01T08:00:00Z",
             "paced": {"time_window": "PT1H", "interval": "PT20M"}}
        ],
        "selected_waypoint": "b"
    }"#;

    #[test]
    fn test_evaluate_snapshot() {
        let snapshot = ChartSnapshot::from_json(SNAPSHOT).expect("valid snapshot");
        let report = snapshot.evaluate().expect("valid snapshot");

        assert_eq!(report.paths.len(), 1);
        let zones = &report.occupancy["b"];
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].start_time, 60_000);
        assert_eq!(zones[0].train_id, "t1");

        assert_eq!(report.manchette.rows.len(), 2);
        assert_eq!(report.paced_trains[0].occurrences_count, 3);
        assert_eq!(report.paced_trains[0].occurrences[2].train_name, "8605");
        assert!(report.frame.contains(&DrawCommand::Stroke));
        assert!(report.frame.contains(&DrawCommand::Fill));
    }

    #[test]
    fn test_unknown_waypoint_gives_no_occupancy() {
        let mut snapshot = ChartSnapshot::from_json(SNAPSHOT).expect("valid snapshot");
        snapshot.selected_waypoint = Some("nowhere".to_string());
        let report = snapshot.evaluate().expect("valid snapshot");
        assert!(report.occupancy.is_empty());
    }

    #[test]
    fn test_fit_waypoints() {
        let mut snapshot = ChartSnapshot::from_json(SNAPSHOT).expect("valid snapshot");
        snapshot.fit_waypoints = true;
        let report = snapshot.evaluate().expect("valid snapshot");
        let last = report.manchette.rows.last().expect("two rows");
        assert!((last.px - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_interval_is_reported() {
        let json = SNAPSHOT.replace("PT20M", "PT0S");
        let snapshot = ChartSnapshot::from_json(&json).expect("valid snapshot");
        let err = snapshot.evaluate().expect_err("zero interval");
        assert_eq!(err.to_string(), "Interval cannot be 0");
    }

    #[test]
    fn test_paths_follow_split_points() {
        let mut snapshot = ChartSnapshot::from_json(SNAPSHOT).expect("valid snapshot");
        snapshot.split_points = vec![SplitPoint { id: "s".to_string(), position: 25_000.0, size: 50.0 }];
        // Dwells at b for 30 s
        snapshot.trains.push(ProjectedTrain {
            id: "t2".to_string(),
            name: "8603".to_string(),
            departure_time: 0,
            color: "#0000ff".to_string(),
            space_time_curves: vec![SpaceTimeCurve { positions: vec![50_000.0, 50_000.0], times: vec![0, 30_000] }],
        });
        let report = snapshot.evaluate().expect("valid snapshot");

        let row_b = report.manchette.rows.iter().find(|r| r.waypoint_id == "b").expect("row b");
        assert!((row_b.px - 100.0).abs() < 1e-9);

        let on_row = |x: f64, y: f64| (x - 0.0).abs() < 1e-9 && (y - row_b.px).abs() < 1e-9;
        assert!(report.frame.iter().any(|c| matches!(c, DrawCommand::MoveTo { x, y } if on_row(*x, *y))));
        let on_row_end = |x: f64, y: f64| (x - 30.0).abs() < 1e-9 && (y - row_b.px).abs() < 1e-9;
        assert!(report.frame.iter().any(|c| matches!(c, DrawCommand::LineTo { x, y } if on_row_end(*x, *y))));

        // The occupancy band of b sits on its row too
        let band = report.frame.iter().find_map(|c| match c {
            DrawCommand::Rect { y, height, .. } if (*height - OCCUPANCY_BAND_SIZE).abs() < 1e-9 => Some(*y),
            _ => None,
        });
        let band_y = band.expect("occupancy band");
        assert!((band_y + OCCUPANCY_BAND_SIZE / 2.0 - row_b.px).abs() < 1e-9);
    }

    #[test]
    fn test_hover_highlights_path() {
        let mut snapshot = ChartSnapshot::from_json(SNAPSHOT).expect("valid snapshot");
        snapshot.hover = Some((61.0, 50.0));
        let report = snapshot.evaluate().expect("valid snapshot");
        assert_eq!(report.hovered_path.as_deref(), Some("t1"));
        assert!(report.frame.contains(&DrawCommand::LineWidth { width: 3.0 }));

        snapshot.hover = Some((300.0, 10.0));
        let report = snapshot.evaluate().expect("valid snapshot");
        assert_eq!(report.hovered_path, None);
    }

    #[test]
    fn test_space_axis_defaults_to_config() {
        let json = SNAPSHOT.replacen('{', r#"{"config": {"space_axis": "x"},"#, 1);
        let snapshot = ChartSnapshot::from_json(&json).expect("valid snapshot");
        assert_eq!(snapshot.view.space_axis, SpaceAxis::X);

        let explicit = json.replacen(r#""time_origin": 0,"#, r#""time_origin": 0, "space_axis": "y","#, 1);
        let snapshot = ChartSnapshot::from_json(&explicit).expect("valid snapshot");
        assert_eq!(snapshot.view.space_axis, SpaceAxis::Y);

        let snapshot = ChartSnapshot::from_json(SNAPSHOT).expect("valid snapshot");
        assert_eq!(snapshot.view.space_axis, SpaceAxis::Y);
    }
}
