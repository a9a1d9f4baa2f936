//! Conversions between domain units (track position in mm, time in ms) and pixels.
//!
//! The time axis is always linear. The space axis is piecewise: each
//! [`SpaceScale`] segment either maps millimeters to pixels with a coefficient
//! (multiplied by the current space zoom ratio), or renders its interval with
//! a fixed pixel size that does not react to zoom. Split points are folded
//! into the segment list as zero-length fixed segments.

use serde::{Deserialize, Serialize};
use crate::constants::{MAX_MS_PER_PX, MAX_ZOOM_RATIO, MIN_MS_PER_PX, MIN_ZOOM_RATIO, ZOOM_SLIDER_MAX, ZOOM_SLIDER_MIN};
use crate::error::{ChartError, Result};

/// Which screen axis carries space. Time is drawn on the other one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpaceAxis {
    X,
    #[default]
    Y,
}

impl SpaceAxis {
    #[must_use]
    pub fn time_axis(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleSize {
    /// Pixels per millimeter at zoom ratio 1
    Coefficient(f64),
    /// Constant pixel size for the whole interval
    Fixed(f64),
}

/// One leg of the piecewise space axis. `from` defaults to the previous
/// segment's `to` (or to the space origin for the first segment).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpaceScale {
    #[serde(default)]
    pub from: Option<f64>,
    pub to: f64,
    pub size: ScaleSize,
}

impl SpaceScale {
    #[must_use]
    pub fn linear(to: f64, coefficient: f64) -> Self {
        Self { from: None, to, size: ScaleSize::Coefficient(coefficient) }
    }

    #[must_use]
    pub fn fixed(to: f64, size: f64) -> Self {
        Self { from: None, to, size: ScaleSize::Fixed(size) }
    }
}

/// A fixed-position interruption of the space axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitPoint {
    pub id: String,
    pub position: f64,
    /// Pixel height (or width) consumed by the split
    pub size: f64,
}

/// A segment resolved to absolute domain and pixel bounds (at a given zoom ratio)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedScale {
    pub from: f64,
    pub to: f64,
    pub px_from: f64,
    pub px_to: f64,
    pub size: ScaleSize,
}

impl NormalizedScale {
    fn position_to_px(&self, position: f64) -> f64 {
        if self.to == self.from {
            return self.px_from;
        }
        self.px_from + (position - self.from) / (self.to - self.from) * (self.px_to - self.px_from)
    }

    fn px_to_position(&self, px: f64) -> f64 {
        if self.px_to == self.px_from {
            return self.from;
        }
        self.from + (px - self.px_from) / (self.px_to - self.px_from) * (self.to - self.from)
    }
}

/// Resolve a scale list into absolute segments starting at `origin`, with
/// coefficient segments multiplied by `ratio`.
#[must_use]
pub fn normalize_scales(scales: &[SpaceScale], origin: f64, ratio: f64) -> Vec<NormalizedScale> {
    let mut normalized = Vec::with_capacity(scales.len());
    let mut position = origin;
    let mut px = 0.0;

    for scale in scales {
        let from = scale.from.unwrap_or(position);
        let px_size = match scale.size {
            ScaleSize::Coefficient(coefficient) => (scale.to - from) * coefficient * ratio,
            ScaleSize::Fixed(size) => size,
        };
        normalized.push(NormalizedScale {
            from,
            to: scale.to,
            px_from: px,
            px_to: px + px_size,
            size: scale.size,
        });
        position = scale.to;
        px += px_size;
    }

    normalized
}

/// Fold split points into a scale list as zero-length fixed segments.
///
/// Each split splits the segment containing its position in two and inserts
/// `SpaceScale { from: p, to: p, size: Fixed(split.size) }` between the halves.
/// Splits outside the covered range are dropped.
#[must_use]
pub fn insert_split_points(scales: &[SpaceScale], split_points: &[SplitPoint], origin: f64) -> Vec<SpaceScale> {
    let mut splits: Vec<&SplitPoint> = split_points.iter().collect();
    splits.sort_by(|a, b| a.position.total_cmp(&b.position));

    let mut result = Vec::with_capacity(scales.len() + splits.len() * 2);
    let mut pending = splits.into_iter().peekable();
    let mut position = origin;

    for scale in scales {
        let scale_from = scale.from.unwrap_or(position);
        let mut from = scale_from;

        while let Some(dropped) = pending.next_if(|s| s.position < from) {
            log::warn!("Split point '{}' at {} is outside of the space scales", dropped.id, dropped.position);
        }

        while let Some(split) = pending.next_if(|s| s.position <= scale.to) {
            if split.position > from {
                result.push(SpaceScale {
                    from: Some(from),
                    to: split.position,
                    size: partial_size(scale.size, (split.position - from) / (scale.to - scale_from)),
                });
            }
            result.push(SpaceScale {
                from: Some(split.position),
                to: split.position,
                size: ScaleSize::Fixed(split.size),
            });
            from = split.position;
        }

        if scale.to > from {
            result.push(SpaceScale {
                from: Some(from),
                to: scale.to,
                size: partial_size(scale.size, (scale.to - from) / (scale.to - scale_from)),
            });
        } else if scale.to == scale_from {
            result.push(SpaceScale { from: Some(scale_from), ..*scale });
        }
        position = scale.to;
    }

    for dropped in pending {
        log::warn!("Split point '{}' at {} is outside of the space scales", dropped.id, dropped.position);
    }

    result
}

fn partial_size(size: ScaleSize, fraction: f64) -> ScaleSize {
    match size {
        ScaleSize::Coefficient(c) => ScaleSize::Coefficient(c),
        ScaleSize::Fixed(px) => ScaleSize::Fixed(px * fraction),
    }
}

/// Bounds applied to every zoom: the time scale in ms/px and the space ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    min_ms_per_px: f64,
    max_ms_per_px: f64,
    min_ratio: f64,
    max_ratio: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_ms_per_px: MIN_MS_PER_PX,
            max_ms_per_px: MAX_MS_PER_PX,
            min_ratio: MIN_ZOOM_RATIO,
            max_ratio: MAX_ZOOM_RATIO,
        }
    }
}

impl ZoomLimits {
    /// Bounds are reordered if given backwards. A bound that is not a finite
    /// positive number falls back to its default.
    #[must_use]
    pub fn new(ms_per_px: (f64, f64), ratio: (f64, f64)) -> Self {
        let defaults = Self::default();
        let (min_ms_per_px, max_ms_per_px) =
            ordered_positive(ms_per_px, (defaults.min_ms_per_px, defaults.max_ms_per_px));
        let (min_ratio, max_ratio) = ordered_positive(ratio, (defaults.min_ratio, defaults.max_ratio));
        Self { min_ms_per_px, max_ms_per_px, min_ratio, max_ratio }
    }

    #[must_use]
    pub fn min_ms_per_px(&self) -> f64 {
        self.min_ms_per_px
    }

    #[must_use]
    pub fn max_ms_per_px(&self) -> f64 {
        self.max_ms_per_px
    }

    #[must_use]
    pub fn clamp_time_scale(&self, time_scale: f64) -> f64 {
        time_scale.clamp(self.min_ms_per_px, self.max_ms_per_px)
    }

    #[must_use]
    pub fn clamp_ratio(&self, ratio: f64) -> f64 {
        ratio.clamp(self.min_ratio, self.max_ratio)
    }
}

fn ordered_positive(bounds: (f64, f64), fallback: (f64, f64)) -> (f64, f64) {
    let pick = |value: f64, default: f64| if value.is_finite() && value > 0.0 { value } else { default };
    let (a, b) = (pick(bounds.0, fallback.0), pick(bounds.1, fallback.1));
    (a.min(b), a.max(b))
}

/// Map a zoom slider value (0..=100) to a time scale in ms/px on a logarithmic
/// curve spanning the time scale bounds of `limits`
#[must_use]
pub fn slider_to_time_scale(value: f64, limits: &ZoomLimits) -> f64 {
    let v = value.clamp(ZOOM_SLIDER_MIN, ZOOM_SLIDER_MAX);
    let (min, max) = (limits.min_ms_per_px, limits.max_ms_per_px);
    min * (max / min).powf(v / ZOOM_SLIDER_MAX)
}

/// Inverse of [`slider_to_time_scale`]
#[must_use]
pub fn time_scale_to_slider(time_scale: f64, limits: &ZoomLimits) -> f64 {
    let (min, max) = (limits.min_ms_per_px, limits.max_ms_per_px);
    if max <= min {
        return ZOOM_SLIDER_MIN;
    }
    let scale = limits.clamp_time_scale(time_scale);
    ZOOM_SLIDER_MAX * (scale / min).ln() / (max / min).ln()
}

/// New offset keeping the domain value under `anchor` fixed when the scale changes
#[must_use]
pub fn zoom_offset(anchor: f64, old_offset: f64, old_scale: f64, new_scale: f64) -> f64 {
    anchor - (anchor - old_offset) * old_scale / new_scale
}

/// Immutable snapshot of the chart's view state.
///
/// Every transformation returns a new snapshot; nothing is mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartView {
    /// Time (ms since epoch) displayed at the time axis origin
    pub time_origin: i64,
    /// Milliseconds per pixel
    pub time_scale: f64,
    /// Domain position (mm) displayed at the space axis origin
    pub space_origin: f64,
    #[serde(default)]
    pub space_scales: Vec<SpaceScale>,
    #[serde(default)]
    pub x_offset: f64,
    #[serde(default)]
    pub y_offset: f64,
    /// Zoom ratio applied to coefficient space segments
    #[serde(default = "default_ratio")]
    pub space_ratio: f64,
    /// Pixels reserved before the time axis starts (manchette width)
    #[serde(default)]
    pub left_offset: f64,
    #[serde(default)]
    pub space_axis: SpaceAxis,
}

fn default_ratio() -> f64 {
    1.0
}

impl ChartView {
    /// # Errors
    ///
    /// Returns [`ChartError::InvalidTimeScale`] if `time_scale` is not strictly positive.
    pub fn new(time_origin: i64, time_scale: f64, space_origin: f64, space_scales: Vec<SpaceScale>) -> Result<Self> {
        if time_scale <= 0.0 || !time_scale.is_finite() {
            return Err(ChartError::InvalidTimeScale(time_scale));
        }
        Ok(Self {
            time_origin,
            time_scale,
            space_origin,
            space_scales,
            x_offset: 0.0,
            y_offset: 0.0,
            space_ratio: 1.0,
            left_offset: 0.0,
            space_axis: SpaceAxis::default(),
        })
    }

    /// Fold `split_points` into the space scales, see [`insert_split_points`]
    #[must_use]
    pub fn with_split_points(self, split_points: &[SplitPoint]) -> Self {
        if split_points.is_empty() {
            return self;
        }
        let space_scales = insert_split_points(&self.space_scales, split_points, self.space_origin);
        Self { space_scales, ..self }
    }

    /// Whether `split` was folded into the space scales by [`Self::with_split_points`]
    #[must_use]
    pub fn has_split_point(&self, split: &SplitPoint) -> bool {
        self.space_scales.iter().any(|scale| {
            scale.from == Some(split.position) && scale.to == split.position && scale.size == ScaleSize::Fixed(split.size)
        })
    }

    #[must_use]
    pub fn with_space_axis(self, space_axis: SpaceAxis) -> Self {
        Self { space_axis, ..self }
    }

    #[must_use]
    pub fn with_left_offset(self, left_offset: f64) -> Self {
        Self { left_offset, ..self }
    }

    #[must_use]
    pub fn time_offset(&self) -> f64 {
        match self.space_axis {
            SpaceAxis::Y => self.x_offset,
            SpaceAxis::X => self.y_offset,
        }
    }

    #[must_use]
    pub fn space_offset(&self) -> f64 {
        match self.space_axis {
            SpaceAxis::Y => self.y_offset,
            SpaceAxis::X => self.x_offset,
        }
    }

    #[must_use]
    fn with_offsets(self, time_offset: f64, space_offset: f64) -> Self {
        match self.space_axis {
            SpaceAxis::Y => Self { x_offset: time_offset, y_offset: space_offset, ..self },
            SpaceAxis::X => Self { x_offset: space_offset, y_offset: time_offset, ..self },
        }
    }

    #[must_use]
    pub fn normalized_scales(&self) -> Vec<NormalizedScale> {
        normalize_scales(&self.space_scales, self.space_origin, self.space_ratio)
    }

    /// Total pixel length of the space axis at the current ratio
    #[must_use]
    pub fn space_extent(&self) -> f64 {
        self.normalized_scales().last().map_or(0.0, |s| s.px_to)
    }

    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn time_to_pixel(&self, time: i64) -> f64 {
        (time - self.time_origin) as f64 / self.time_scale + self.time_offset() + self.left_offset
    }

    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn pixel_to_time(&self, px: f64) -> i64 {
        self.time_origin + ((px - self.time_offset() - self.left_offset) * self.time_scale).round() as i64
    }

    /// Unrounded variant of [`Self::pixel_to_time`], relative to `time_origin`
    #[must_use]
    pub fn pixel_to_time_delta(&self, px: f64) -> f64 {
        (px - self.time_offset() - self.left_offset) * self.time_scale
    }

    /// Space pixel position without the pan offset
    fn space_to_raw_pixel(&self, scales: &[NormalizedScale], position: f64) -> f64 {
        let (Some(first), Some(last)) = (scales.first(), scales.last()) else {
            return (position - self.space_origin) * self.space_ratio;
        };

        if position < first.from {
            return match first.size {
                ScaleSize::Coefficient(c) => first.px_from - (first.from - position) * c * self.space_ratio,
                ScaleSize::Fixed(_) => first.px_from,
            };
        }
        if position > last.to {
            return match last.size {
                ScaleSize::Coefficient(c) => last.px_to + (position - last.to) * c * self.space_ratio,
                ScaleSize::Fixed(_) => last.px_to,
            };
        }

        let index = scales.partition_point(|s| s.to < position).min(scales.len() - 1);
        scales[index].position_to_px(position)
    }

    #[must_use]
    pub fn space_to_pixel(&self, position: f64) -> f64 {
        self.space_to_raw_pixel(&self.normalized_scales(), position) + self.space_offset()
    }

    #[must_use]
    pub fn pixel_to_space(&self, px: f64) -> f64 {
        let raw = px - self.space_offset();
        let scales = self.normalized_scales();
        let (Some(first), Some(last)) = (scales.first(), scales.last()) else {
            return self.space_origin + raw / self.space_ratio;
        };

        if raw < first.px_from {
            return match first.size {
                ScaleSize::Coefficient(c) => first.from - (first.px_from - raw) / (c * self.space_ratio),
                ScaleSize::Fixed(_) => first.from,
            };
        }
        if raw > last.px_to {
            return match last.size {
                ScaleSize::Coefficient(c) => last.to + (raw - last.px_to) / (c * self.space_ratio),
                ScaleSize::Fixed(_) => last.to,
            };
        }

        let index = scales.partition_point(|s| s.px_to < raw).min(scales.len() - 1);
        scales[index].px_to_position(raw)
    }

    /// Screen coordinates of a (position, time) point, honoring the axis orientation
    #[must_use]
    pub fn point_to_pixel(&self, position: f64, time: i64) -> (f64, f64) {
        let space = self.space_to_pixel(position);
        let time = self.time_to_pixel(time);
        match self.space_axis {
            SpaceAxis::Y => (time, space),
            SpaceAxis::X => (space, time),
        }
    }

    /// Inverse of [`Self::point_to_pixel`]: returns `(position, time)`
    #[must_use]
    pub fn pixel_to_point(&self, x: f64, y: f64) -> (f64, i64) {
        let (time_px, space_px) = match self.space_axis {
            SpaceAxis::Y => (x, y),
            SpaceAxis::X => (y, x),
        };
        (self.pixel_to_space(space_px), self.pixel_to_time(time_px))
    }

    /// Change the time scale while keeping the time under `anchor_px` fixed
    #[must_use]
    pub fn zoom_time_about(self, new_time_scale: f64, anchor_px: f64, limits: &ZoomLimits) -> Self {
        let new_time_scale = limits.clamp_time_scale(new_time_scale);
        let anchor = anchor_px - self.left_offset;
        let offset = zoom_offset(anchor, self.time_offset(), self.time_scale, new_time_scale);
        let space_offset = self.space_offset();
        Self { time_scale: new_time_scale, ..self }.with_offsets(offset, space_offset)
    }

    /// Apply a zoom slider value about an anchor pixel on the time axis
    #[must_use]
    pub fn handle_zoom(self, slider_value: f64, anchor_px: f64, limits: &ZoomLimits) -> Self {
        self.zoom_time_about(slider_to_time_scale(slider_value, limits), anchor_px, limits)
    }

    /// Change the space ratio while keeping the position under `anchor_px` fixed
    #[must_use]
    pub fn zoom_space_about(self, new_ratio: f64, anchor_px: f64) -> Self {
        let position = self.pixel_to_space(anchor_px);
        let rescaled = Self { space_ratio: new_ratio, ..self };
        let raw = rescaled.space_to_raw_pixel(&rescaled.normalized_scales(), position);
        let time_offset = rescaled.time_offset();
        rescaled.with_offsets(time_offset, anchor_px - raw)
    }

    /// Translate the view by a pixel delta in screen coordinates
    #[must_use]
    pub fn panned(self, dx: f64, dy: f64) -> Self {
        Self { x_offset: self.x_offset + dx, y_offset: self.y_offset + dy, ..self }
    }

    /// Fit a domain window into a viewport of `time_extent` × `space_extent` pixels.
    ///
    /// The time scale and the space ratio are clamped to `limits`; offsets are
    /// then chosen so the window starts at the viewport origin.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fit_domain(
        self,
        time_range: (i64, i64),
        space_range: (f64, f64),
        time_extent: f64,
        space_extent: f64,
        limits: &ZoomLimits,
    ) -> Self {
        let (t0, t1) = (time_range.0.min(time_range.1), time_range.0.max(time_range.1));
        let (s0, s1) = (space_range.0.min(space_range.1), space_range.0.max(space_range.1));

        let time_scale = limits.clamp_time_scale((t1 - t0) as f64 / time_extent);

        let scales = self.normalized_scales();
        let current_span = self.space_to_raw_pixel(&scales, s1) - self.space_to_raw_pixel(&scales, s0);
        let space_ratio = if current_span > 0.0 {
            limits.clamp_ratio(self.space_ratio * space_extent / current_span)
        } else {
            self.space_ratio
        };

        let rescaled = Self { time_scale, space_ratio, ..self };
        let time_offset = -((t0 - rescaled.time_origin) as f64) / time_scale;
        let space_offset = -rescaled.space_to_raw_pixel(&rescaled.normalized_scales(), s0);
        rescaled.with_offsets(time_offset, space_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ChartView {
        ChartView::new(
            1_000_000,
            1000.0,
            0.0,
            vec![SpaceScale::linear(10_000.0, 0.01), SpaceScale::linear(30_000.0, 0.005)],
        )
        .expect("valid view")
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_rejects_non_positive_time_scale() {
        assert!(ChartView::new(0, 0.0, 0.0, Vec::new()).is_err());
        assert!(ChartView::new(0, -5.0, 0.0, Vec::new()).is_err());
    }

    #[test]
    fn test_time_pixel_linear() {
        let v = view();
        assert_eq!(v.time_to_pixel(1_000_000), 0.0);
        assert_eq!(v.time_to_pixel(1_060_000), 60.0);
        assert_eq!(v.pixel_to_time(60.0), 1_060_000);
    }

    #[test]
    fn test_time_pixel_with_offsets() {
        let v = view().with_left_offset(100.0).panned(20.0, 0.0);
        assert_eq!(v.time_to_pixel(1_000_000), 120.0);
        assert_eq!(v.pixel_to_time(130.0), 1_010_000);
    }

    #[test]
    fn test_piecewise_space_axis() {
        let v = view();
        assert!(approx(v.space_to_pixel(0.0), 0.0));
        assert!(approx(v.space_to_pixel(10_000.0), 100.0));
        assert!(approx(v.space_to_pixel(20_000.0), 150.0));
        assert!(approx(v.space_to_pixel(30_000.0), 200.0));
        assert!(approx(v.space_extent(), 200.0));
    }

    #[test]
    fn test_space_inverse() {
        let v = view().panned(0.0, 37.0);
        for position in [0.0, 2500.0, 10_000.0, 17_500.0, 30_000.0] {
            let px = v.space_to_pixel(position);
            assert!(approx(v.pixel_to_space(px), position));
        }
    }

    #[test]
    fn test_space_ratio_scales_coefficients() {
        let v = ChartView { space_ratio: 2.0, ..view() };
        assert!(approx(v.space_to_pixel(10_000.0), 200.0));
    }

    #[test]
    fn test_fixed_segments_ignore_ratio() {
        let scales = vec![
            SpaceScale::linear(1000.0, 0.1),
            SpaceScale::fixed(1000.0, 30.0),
            SpaceScale::linear(2000.0, 0.1),
        ];
        let v = ChartView { space_ratio: 3.0, ..ChartView::new(0, 1.0, 0.0, scales).expect("valid view") };
        assert!(approx(v.space_to_pixel(1000.0), 300.0));
        assert!(approx(v.space_to_pixel(1500.0), 480.0));
        assert!(approx(v.space_extent(), 630.0));
        assert!(approx(v.pixel_to_space(315.0), 1000.0));
    }

    #[test]
    fn test_extrapolates_outside_scales() {
        let v = view();
        assert!(approx(v.space_to_pixel(-1000.0), -10.0));
        assert!(approx(v.space_to_pixel(40_000.0), 250.0));
        assert!(approx(v.pixel_to_space(250.0), 40_000.0));
    }

    #[test]
    fn test_insert_split_points() {
        let scales = vec![SpaceScale::linear(1000.0, 0.1)];
        let splits = vec![
            SplitPoint { id: "b".to_string(), position: 600.0, size: 40.0 },
            SplitPoint { id: "a".to_string(), position: 200.0, size: 20.0 },
            SplitPoint { id: "out".to_string(), position: 5000.0, size: 99.0 },
        ];
        let result = insert_split_points(&scales, &splits, 0.0);
        assert_eq!(result.len(), 5);
        assert_eq!(result[1], SpaceScale { from: Some(200.0), to: 200.0, size: ScaleSize::Fixed(20.0) });
        assert_eq!(result[3], SpaceScale { from: Some(600.0), to: 600.0, size: ScaleSize::Fixed(40.0) });

        let v = ChartView::new(0, 1.0, 0.0, result).expect("valid view");
        assert!(approx(v.space_extent(), 160.0));
        assert!(approx(v.space_to_pixel(200.0), 20.0));
        assert!(approx(v.space_to_pixel(300.0), 50.0));
        assert!(approx(v.space_to_pixel(700.0), 130.0));
    }

    #[test]
    fn test_swapped_axes() {
        let v = view().with_space_axis(SpaceAxis::X);
        let (x, y) = v.point_to_pixel(10_000.0, 1_060_000);
        assert!(approx(x, 100.0));
        assert!(approx(y, 60.0));
        let (position, time) = v.pixel_to_point(x, y);
        assert!(approx(position, 10_000.0));
        assert_eq!(time, 1_060_000);
    }

    #[test]
    fn test_slider_bounds() {
        let limits = ZoomLimits::default();
        assert!(approx(slider_to_time_scale(0.0, &limits), MIN_MS_PER_PX));
        assert!(approx(slider_to_time_scale(100.0, &limits), MAX_MS_PER_PX));
        assert!(approx(slider_to_time_scale(150.0, &limits), MAX_MS_PER_PX));
        let v = 42.0;
        assert!(approx(time_scale_to_slider(slider_to_time_scale(v, &limits), &limits), v));
    }

    #[test]
    fn test_zoom_keeps_anchor_time() {
        let v = view().with_left_offset(80.0).panned(-35.0, 0.0);
        for (slider, anchor) in [(10.0, 300.0), (55.5, 81.0), (90.0, 1200.0)] {
            let before = v.pixel_to_time_delta(anchor);
            let zoomed = v.clone().handle_zoom(slider, anchor, &ZoomLimits::default());
            let after = zoomed.pixel_to_time_delta(anchor);
            assert!((before - after).abs() < 1e-6, "slider {slider}: {before} != {after}");
        }
    }

    #[test]
    fn test_zoom_space_keeps_anchor_position() {
        let v = view().panned(0.0, 12.0);
        let anchor = 130.0;
        let before = v.pixel_to_space(anchor);
        let zoomed = v.zoom_space_about(2.5, anchor);
        assert!(approx(zoomed.pixel_to_space(anchor), before));
        assert_eq!(zoomed.space_ratio, 2.5);
    }

    #[test]
    fn test_fit_domain() {
        let v = view();
        let fitted = v.fit_domain((1_120_000, 1_240_000), (10_000.0, 20_000.0), 600.0, 400.0, &ZoomLimits::default());
        assert!(approx(fitted.time_scale, 200.0));
        assert!(approx(fitted.time_to_pixel(1_120_000), 0.0));
        assert!(approx(fitted.time_to_pixel(1_240_000), 600.0));
        assert!(approx(fitted.space_to_pixel(10_000.0), 0.0));
        assert!(approx(fitted.space_to_pixel(20_000.0), 400.0));
    }

    #[test]
    fn test_custom_zoom_limits() {
        let limits = ZoomLimits::new((1_000.0, 5.0), (4.0, 0.5));
        assert!(approx(limits.min_ms_per_px(), 5.0));
        assert!(approx(limits.max_ms_per_px(), 1_000.0));
        assert!(approx(limits.clamp_ratio(10.0), 4.0));
        assert!(approx(slider_to_time_scale(100.0, &limits), 1_000.0));

        let wide = ZoomLimits::new((10.0, 3_600_000.0), (0.1, 25.0));
        let zoomed = view().zoom_time_about(2_000_000.0, 0.0, &wide);
        assert!(approx(zoomed.time_scale, 2_000_000.0));
        let narrowed = view().zoom_time_about(2_000_000.0, 0.0, &ZoomLimits::default());
        assert!(approx(narrowed.time_scale, MAX_MS_PER_PX));

        // Fitting ten hours into 10 px needs 3.6e6 ms/px
        let fitted = view().fit_domain((0, 36_000_000), (10_000.0, 20_000.0), 10.0, 400.0, &wide);
        assert!(approx(fitted.time_scale, 3_600_000.0));
    }

    #[test]
    fn test_zoom_limits_never_collapse() {
        let limits = ZoomLimits::new((0.0, f64::NAN), (-1.0, 2.0));
        assert!(limits.min_ms_per_px() > 0.0);
        assert!(approx(limits.max_ms_per_px(), MAX_MS_PER_PX));
        assert!(limits.clamp_ratio(-5.0) > 0.0);
        assert!(slider_to_time_scale(50.0, &limits).is_finite());
    }

    #[test]
    fn test_with_split_points_drops_out_of_range() {
        let kept = SplitPoint { id: "kept".to_string(), position: 20_000.0, size: 40.0 };
        let dropped = SplitPoint { id: "dropped".to_string(), position: 90_000.0, size: 15.0 };
        let split = view().with_split_points(&[kept.clone(), dropped.clone()]);

        assert!(split.has_split_point(&kept));
        assert!(!split.has_split_point(&dropped));
        assert!(approx(split.space_extent(), view().space_extent() + 40.0));
        assert!(approx(split.space_to_pixel(30_000.0), view().space_to_pixel(30_000.0) + 40.0));
        assert_eq!(view().with_split_points(&[]), view());
    }
}
