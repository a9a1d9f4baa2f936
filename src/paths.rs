//! Renderable paths built from projection results.

use std::rc::Rc;
use crate::geometry::point_to_polyline_distance;
use crate::models::{PathData, PathPoint, ProjectedTrain};
use crate::scale::ChartView;

/// Convert projected trains into renderable paths.
///
/// Each non-empty space-time curve becomes one path carrying the train's id,
/// name and color, so a train split by the projection yields several paths.
/// Curve times are relative to the departure time. When `positions` and
/// `times` differ in length the extra samples are dropped.
#[must_use]
pub fn build_paths(trains: &[ProjectedTrain]) -> Vec<PathData> {
    crate::timed!("build_paths", {
        let paths: Vec<PathData> = trains
            .iter()
            .flat_map(|train| {
                train.space_time_curves.iter().filter_map(move |curve| {
                    if curve.positions.len() != curve.times.len() {
                        log::warn!(
                            "Train {}: curve has {} positions for {} times, truncating",
                            train.id,
                            curve.positions.len(),
                            curve.times.len()
                        );
                    }
                    let points: Vec<PathPoint> = curve
                        .positions
                        .iter()
                        .zip(&curve.times)
                        .map(|(position, time)| PathPoint::new(*position, train.departure_time + time))
                        .collect();
                    (!points.is_empty()).then(|| PathData {
                        id: train.id.clone(),
                        label: train.name.clone(),
                        color: train.color.clone(),
                        points,
                    })
                })
            })
            .collect();
        crate::log!("Built {} paths from {} trains", paths.len(), trains.len());
        paths
    })
}

/// Caches the last [`build_paths`] result.
///
/// Calling [`PathsMemo::get`] with an input equal to the previous one
/// returns the same `Rc`, so consumers can compare by pointer.
#[derive(Debug, Default)]
pub struct PathsMemo {
    input: Vec<ProjectedTrain>,
    output: Option<Rc<Vec<PathData>>>,
}

impl PathsMemo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, trains: &[ProjectedTrain]) -> Rc<Vec<PathData>> {
        if let Some(output) = &self.output {
            if self.input == trains {
                return Rc::clone(output);
            }
        }
        let output = Rc::new(build_paths(trains));
        self.input = trains.to_vec();
        self.output = Some(Rc::clone(&output));
        output
    }
}

/// Screen polyline of a path under the given view
#[must_use]
pub fn path_to_pixels(view: &ChartView, path: &PathData) -> Vec<(f64, f64)> {
    path.points
        .iter()
        .map(|p| view.point_to_pixel(p.position, p.time))
        .collect()
}

/// The path closest to `pixel`, if within `tolerance` pixels.
///
/// Ties go to the path drawn last (highest index), which is on top.
#[must_use]
pub fn path_at_pixel<'a>(view: &ChartView, paths: &'a [PathData], pixel: (f64, f64), tolerance: f64) -> Option<&'a PathData> {
    let mut best: Option<(f64, &PathData)> = None;
    for path in paths {
        let Some(distance) = point_to_polyline_distance(pixel, &path_to_pixels(view, path)) else {
            continue;
        };
        if distance <= tolerance && best.map_or(true, |(d, _)| distance <= d) {
            best = Some((distance, path));
        }
    }
    best.map(|(_, path)| path)
}
