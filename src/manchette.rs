//! Layout of the manchette, the waypoint rail drawn alongside the chart.
//!
//! Rows are placed with the same view as the chart so both stay aligned.
//! That view must already carry the split points (see
//! [`ChartView::with_split_points`]): they are fixed-size segments of the
//! space scale and push every later row down by their size.

use serde::Serialize;
use crate::models::Waypoint;
use crate::scale::{ChartView, SpaceScale, SplitPoint};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManchetteRow {
    pub waypoint_id: String,
    /// Name and secondary code shown next to the tick
    pub label: String,
    pub position: f64,
    /// Pixel coordinate along the space axis
    pub px: f64,
    /// Whether the row gets a label or only a tick
    pub labelled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitRow {
    pub id: String,
    /// Pixel coordinate where the split band starts
    pub px: f64,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManchetteLayout {
    /// Rows in position order
    pub rows: Vec<ManchetteRow>,
    pub splits: Vec<SplitRow>,
    /// Full space axis length, split sizes included
    pub content_height: f64,
}

/// Pick the waypoints that get a label.
///
/// Greedy by descending weight (ties keep the input order): a waypoint is
/// accepted only if its row lies at least `min_space` pixels from every row
/// already accepted. Returns indices into `waypoints` sorted by position.
#[must_use]
pub fn select_labelled_waypoints(waypoints: &[Waypoint], pixels: &[f64], min_space: f64) -> Vec<usize> {
    let mut by_weight: Vec<usize> = (0..waypoints.len().min(pixels.len())).collect();
    by_weight.sort_by(|a, b| waypoints[*b].weight.cmp(&waypoints[*a].weight));

    // Accepted pixel positions, kept sorted so only the two neighbours need checking
    let mut taken: Vec<f64> = Vec::new();
    let mut accepted = Vec::new();

    for index in by_weight {
        let px = pixels[index];
        let slot = taken.partition_point(|p| *p < px);
        let clear_before = slot == 0 || px - taken[slot - 1] >= min_space;
        let clear_after = slot == taken.len() || taken[slot] - px >= min_space;
        if clear_before && clear_after {
            taken.insert(slot, px);
            accepted.push(index);
        }
    }

    accepted.sort_by(|a, b| waypoints[*a].position.total_cmp(&waypoints[*b].position));
    accepted
}

impl ManchetteLayout {
    /// Lay out `waypoints` against `split_view`, the chart view with
    /// `split_points` already folded in.
    ///
    /// Split points that the view does not carry (dropped as out of range)
    /// get no band.
    #[must_use]
    pub fn compute(split_view: &ChartView, waypoints: &[Waypoint], split_points: &[SplitPoint], min_label_space: f64) -> Self {
        let mut ordered: Vec<&Waypoint> = waypoints.iter().collect();
        ordered.sort_by(|a, b| a.position.total_cmp(&b.position));
        let ordered: Vec<Waypoint> = ordered.into_iter().cloned().collect();

        let pixels: Vec<f64> = ordered.iter().map(|w| split_view.space_to_pixel(w.position)).collect();
        let mut labelled = select_labelled_waypoints(&ordered, &pixels, min_label_space);
        labelled.sort_unstable();

        let rows = ordered
            .iter()
            .zip(&pixels)
            .enumerate()
            .map(|(i, (waypoint, px))| ManchetteRow {
                waypoint_id: waypoint.id.clone(),
                label: waypoint.display_name(),
                position: waypoint.position,
                px: *px,
                labelled: labelled.binary_search(&i).is_ok(),
            })
            .collect();

        let mut splits: Vec<&SplitPoint> = split_points.iter().filter(|s| split_view.has_split_point(s)).collect();
        splits.sort_by(|a, b| a.position.total_cmp(&b.position));
        let splits = splits
            .into_iter()
            .map(|split| SplitRow {
                id: split.id.clone(),
                px: split_view.space_to_pixel(split.position),
                size: split.size,
            })
            .collect();

        crate::log!("Manchette: {} rows, {} labelled", ordered.len(), labelled.len());

        Self {
            rows,
            splits,
            content_height: split_view.space_extent(),
        }
    }
}

/// A single linear scale stretching the waypoint span over `container_height` pixels.
///
/// Returns no scale without waypoints, and a fixed-size scale when every
/// waypoint sits at the same position.
#[must_use]
pub fn fit_space_scales(waypoints: &[Waypoint], container_height: f64) -> Vec<SpaceScale> {
    let positions = waypoints.iter().map(|w| w.position);
    let (Some(min), Some(max)) = (positions.clone().reduce(f64::min), positions.reduce(f64::max)) else {
        return Vec::new();
    };

    let mut scale = if max > min {
        SpaceScale::linear(max, container_height / (max - min))
    } else {
        SpaceScale::fixed(max, container_height)
    };
    scale.from = Some(min);
    vec![scale]
}
