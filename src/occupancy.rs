//! Occupancy zones: when a train sits on, or passes through, a waypoint.

use indexmap::IndexMap;
use crate::interpolate::linear_interpolate;
use crate::models::{Direction, OccupancyZone, PathData, PathPoint, ZoneInterval};

/// Intervals during which a path is on the waypoint at `waypoint_position`.
///
/// Each sample pair falls in exactly one case:
/// * a run of consecutive points on the waypoint gives one zone spanning the
///   run, with directions taken from the points just before and after it
///   (`None` at path boundaries);
/// * an isolated point on the waypoint is the one-point version of that run,
///   a zero-duration zone;
/// * a segment strictly crossing the waypoint gives a zero-duration zone at
///   the interpolated crossing time.
///
/// An empty path yields no zone.
#[must_use]
pub fn occupancy_zones_at_waypoint(points: &[PathPoint], waypoint_position: f64) -> Vec<ZoneInterval> {
    let mut zones = Vec::new();
    let mut i = 0;

    while i < points.len() {
        let point = points[i];

        if point.position == waypoint_position {
            let mut last = i;
            while last + 1 < points.len() && points[last + 1].position == waypoint_position {
                last += 1;
            }
            zones.push(ZoneInterval {
                start_time: point.time,
                end_time: points[last].time,
                start_direction: i
                    .checked_sub(1)
                    .and_then(|prev| Direction::between(points[prev].position, waypoint_position)),
                end_direction: points
                    .get(last + 1)
                    .and_then(|next| Direction::between(waypoint_position, next.position)),
            });
            i = last + 1;
            continue;
        }

        if let Some(next) = points.get(i + 1) {
            let crosses = (point.position < waypoint_position && waypoint_position < next.position)
                || (next.position < waypoint_position && waypoint_position < point.position);
            if crosses {
                let time = crossing_time(point, *next, waypoint_position);
                let direction = Direction::between(point.position, next.position);
                zones.push(ZoneInterval {
                    start_time: time,
                    end_time: time,
                    start_direction: direction,
                    end_direction: direction,
                });
            }
        }
        i += 1;
    }

    zones
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn crossing_time(a: PathPoint, b: PathPoint, position: f64) -> i64 {
    linear_interpolate(a.position, b.position, a.time as f64, b.time as f64, position).round() as i64
}

/// Occupancy zones of every path at a waypoint, sorted by start time
#[must_use]
pub fn compute_occupancy_zones(paths: &[PathData], waypoint_position: f64, track_id: &str) -> Vec<OccupancyZone> {
    crate::timed!("compute_occupancy_zones", {
        let mut zones: Vec<OccupancyZone> = paths
            .iter()
            .flat_map(|path| {
                occupancy_zones_at_waypoint(&path.points, waypoint_position)
                    .into_iter()
                    .map(|zone| OccupancyZone {
                        start_time: zone.start_time,
                        end_time: zone.end_time,
                        start_direction: zone.start_direction,
                        end_direction: zone.end_direction,
                        train_id: path.id.clone(),
                        track_id: track_id.to_string(),
                        color: path.color.clone(),
                    })
            })
            .collect();
        zones.sort_by_key(|z| (z.start_time, z.end_time));
        zones
    })
}

/// Group zones per track, tracks in first-seen order
#[must_use]
pub fn group_by_track(zones: Vec<OccupancyZone>) -> IndexMap<String, Vec<OccupancyZone>> {
    let mut grouped: IndexMap<String, Vec<OccupancyZone>> = IndexMap::new();
    for zone in zones {
        grouped.entry(zone.track_id.clone()).or_default().push(zone);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(samples: &[(f64, i64)]) -> Vec<PathPoint> {
        samples.iter().map(|(p, t)| PathPoint::new(*p, *t)).collect()
    }

    fn path(id: &str, samples: &[(f64, i64)]) -> PathData {
        PathData {
            id: id.to_string(),
            label: id.to_string(),
            color: "#000".to_string(),
            points: points(samples),
        }
    }

    #[test]
    fn test_empty_path() {
        assert!(occupancy_zones_at_waypoint(&[], 10.0).is_empty());
    }

    #[test]
    fn test_stop_on_waypoint() {
        let zones = occupancy_zones_at_waypoint(
            &points(&[(0.0, 0), (100.0, 10), (100.0, 20), (100.0, 30), (200.0, 40)]),
            100.0,
        );
        assert_eq!(
            zones,
            vec![ZoneInterval {
                start_time: 10,
                end_time: 30,
                start_direction: Some(Direction::Up),
                end_direction: Some(Direction::Up),
            }]
        );
    }

    #[test]
    fn test_isolated_point_on_waypoint() {
        let zones = occupancy_zones_at_waypoint(&points(&[(200.0, 0), (100.0, 10), (0.0, 20)]), 100.0);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].duration(), 0);
        assert_eq!(zones[0].start_time, 10);
        assert_eq!(zones[0].start_direction, Some(Direction::Down));
        assert_eq!(zones[0].end_direction, Some(Direction::Down));
    }

    #[test]
    fn test_crossing_segment_interpolates_time() {
        let zones = occupancy_zones_at_waypoint(&points(&[(0.0, 1000), (400.0, 3000)]), 100.0);
        assert_eq!(
            zones,
            vec![ZoneInterval {
                start_time: 1500,
                end_time: 1500,
                start_direction: Some(Direction::Up),
                end_direction: Some(Direction::Up),
            }]
        );
    }

    #[test]
    fn test_path_boundaries_have_no_direction() {
        let zones = occupancy_zones_at_waypoint(&points(&[(50.0, 0), (50.0, 60), (80.0, 90)]), 50.0);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].start_direction, None);
        assert_eq!(zones[0].end_direction, Some(Direction::Up));
    }

    #[test]
    fn test_turnaround_on_waypoint() {
        let zones = occupancy_zones_at_waypoint(&points(&[(0.0, 0), (50.0, 10), (50.0, 20), (0.0, 30)]), 50.0);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].start_direction, Some(Direction::Up));
        assert_eq!(zones[0].end_direction, Some(Direction::Down));
    }

    #[test]
    fn test_back_and_forth_union_matches_dwell_times() {
        // Shuttle between 0 and 100, sampled every 10 ms at 1 mm/ms, dwelling
        // at 50 for a varying number of samples on each pass.
        let waypoint = 50.0;
        let mut samples = Vec::new();
        let mut expected = Vec::new();
        let mut time = 0;
        for (pass, dwell) in [(0, 3), (1, 0), (2, 5), (3, 1)] {
            let forward = pass % 2 == 0;
            for step in 0..=10 {
                let position = if forward { f64::from(step) * 10.0 } else { 100.0 - f64::from(step) * 10.0 };
                if step == 0 && pass > 0 {
                    continue;
                }
                samples.push((position, time));
                if position == waypoint {
                    let start = time;
                    for _ in 0..dwell {
                        time += 10;
                        samples.push((position, time));
                    }
                    expected.push((start, time));
                }
                time += 10;
            }
        }

        let zones = occupancy_zones_at_waypoint(&points(&samples), waypoint);
        let union: Vec<(i64, i64)> = zones.iter().map(|z| (z.start_time, z.end_time)).collect();
        assert_eq!(union, expected);

        // Every sample on the waypoint is covered, every other sample is not
        for (position, t) in &samples {
            let covered = zones.iter().any(|z| z.start_time <= *t && *t <= z.end_time);
            assert_eq!(covered, *position == waypoint, "sample at t={t}");
        }
    }

    #[test]
    fn test_compute_and_group() {
        let paths = vec![
            path("b", &[(0.0, 500), (100.0, 700)]),
            path("a", &[(0.0, 0), (100.0, 200)]),
        ];
        let zones = compute_occupancy_zones(&paths, 50.0, "V1");
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].train_id, "a");
        assert_eq!(zones[0].start_time, 100);
        assert_eq!(zones[1].train_id, "b");

        let mut all = zones;
        all.extend(compute_occupancy_zones(&paths, 50.0, "V2"));
        all.extend(compute_occupancy_zones(&paths[..1], 50.0, "V1"));
        let grouped = group_by_track(all);
        let tracks: Vec<&str> = grouped.keys().map(String::as_str).collect();
        assert_eq!(tracks, vec!["V1", "V2"]);
        assert_eq!(grouped["V1"].len(), 3);
        assert_eq!(grouped["V2"].len(), 2);
    }
}
