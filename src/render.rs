//! Thin paint adapter from chart geometry to a canvas-like surface.
//!
//! All coordinates are computed by [`crate::scale`] and [`crate::paths`];
//! this module only issues drawing primitives.

use serde::Serialize;
use crate::geometry::PixelRect;
use crate::manchette::ManchetteLayout;
use crate::models::{OccupancyZone, PathData};
use crate::paths::path_to_pixels;
use crate::scale::{ChartView, SpaceAxis};

const PATH_LINE_WIDTH: f64 = 1.5;
const HOVERED_PATH_LINE_WIDTH: f64 = 3.0;
const MIN_ZONE_LENGTH: f64 = 2.0; // pixels, so zero-duration zones stay visible
const SPLIT_BAND_COLOR: &str = "#e5e5ea";

/// The subset of a 2D canvas context the chart needs
pub trait DrawingSurface {
    fn set_stroke_style(&mut self, color: &str);
    fn set_fill_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn fill(&mut self);
    fn stroke(&mut self);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    StrokeStyle { color: String },
    FillStyle { color: String },
    LineWidth { width: f64 },
    BeginPath,
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Fill,
    Stroke,
}

/// Records every call, for tests and for dumping a frame as JSON
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommandRecorder {
    pub commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DrawingSurface for CommandRecorder {
    fn set_stroke_style(&mut self, color: &str) {
        self.commands.push(DrawCommand::StrokeStyle { color: color.to_string() });
    }

    fn set_fill_style(&mut self, color: &str) {
        self.commands.push(DrawCommand::FillStyle { color: color.to_string() });
    }

    fn set_line_width(&mut self, width: f64) {
        self.commands.push(DrawCommand::LineWidth { width });
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::LineTo { x, y });
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::Rect { x, y, width, height });
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill);
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke);
    }
}

/// Stroke every path that can be visible in `clip`.
/// The hovered path, if any, is drawn wider.
pub fn draw_paths<S: DrawingSurface>(surface: &mut S, view: &ChartView, paths: &[PathData], clip: PixelRect, hovered: Option<&str>) {
    for path in paths {
        let pixels = path_to_pixels(view, path);
        let visible = match pixels.as_slice() {
            [single] => clip.contains(*single),
            _ => pixels.windows(2).any(|w| clip.may_intersect_segment(w[0], w[1])),
        };
        if !visible {
            continue;
        }

        let width = if hovered == Some(path.id.as_str()) {
            HOVERED_PATH_LINE_WIDTH
        } else {
            PATH_LINE_WIDTH
        };
        surface.set_stroke_style(&path.color);
        surface.set_line_width(width);
        surface.begin_path();
        let mut points = pixels.iter();
        if let Some((x, y)) = points.next() {
            surface.move_to(*x, *y);
        }
        for (x, y) in points {
            surface.line_to(*x, *y);
        }
        surface.stroke();
    }
}

/// Fill one band per zone on the track row centered at `track_px` (space axis)
pub fn draw_occupancy_zones<S: DrawingSurface>(
    surface: &mut S,
    view: &ChartView,
    zones: &[OccupancyZone],
    track_px: f64,
    band_size: f64,
) {
    for zone in zones {
        let start = view.time_to_pixel(zone.start_time);
        let end = view.time_to_pixel(zone.end_time);
        let length = (end - start).max(MIN_ZONE_LENGTH);
        let time_from = if end - start < MIN_ZONE_LENGTH { start - length / 2.0 } else { start };
        let space_from = track_px - band_size / 2.0;

        surface.set_fill_style(&zone.color);
        surface.begin_path();
        match view.space_axis {
            SpaceAxis::Y => surface.rect(time_from, space_from, length, band_size),
            SpaceAxis::X => surface.rect(space_from, time_from, band_size, length),
        }
        surface.fill();
    }
}

/// Fill the split point bands across the whole time extent of the chart
pub fn draw_split_bands<S: DrawingSurface>(surface: &mut S, view: &ChartView, layout: &ManchetteLayout, time_extent: f64) {
    if layout.splits.is_empty() {
        return;
    }
    surface.set_fill_style(SPLIT_BAND_COLOR);
    surface.begin_path();
    for split in &layout.splits {
        match view.space_axis {
            SpaceAxis::Y => surface.rect(view.left_offset, split.px, time_extent, split.size),
            SpaceAxis::X => surface.rect(split.px, view.left_offset, split.size, time_extent),
        }
    }
    surface.fill();
}
