//! Pan, zoom and drag gestures over an immutable [`ChartView`].
//!
//! Every transition consumes the controller and returns the next one. Only one
//! gesture runs at a time; starting another while one is active is ignored,
//! and cancelling from idle is a no-op.
//!
//! Train drags end with a [`PendingDragCommit`] that the host performs
//! asynchronously and reports back through
//! [`InteractionController::resolve_drag_commit`]. The preview stays visible
//! until then and is reverted if the host rejects it. Resolutions carrying a
//! superseded request id are ignored.

use std::fmt::Display;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use crate::config::ChartConfig;
use crate::geometry::PixelRect;
use crate::history::History;
use crate::models::PathData;
use crate::paths::path_at_pixel;
use crate::scale::{ChartView, SpaceAxis};
use crate::time::from_epoch_ms;

pub type RequestId = u64;

/// Issues increasing request ids so that late async results can be told apart
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSequencer {
    last_issued: RequestId,
}

impl RequestSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestId {
        self.last_issued += 1;
        self.last_issued
    }
}

/// A train being dragged along the time axis
#[derive(Debug, Clone, PartialEq)]
pub struct DraggingState {
    pub dragged_train: String,
    pub initial_departure_time: i64,
    pub preview_departure_time: i64,
    pub origin: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Panning {
        origin: (f64, f64),
        initial_offset: (f64, f64),
    },
    RectZoomDragging {
        origin: (f64, f64),
        current: (f64, f64),
    },
    DraggingTrain(DraggingState),
}

/// Departure change the host must persist, then report with
/// [`InteractionController::resolve_drag_commit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDragCommit {
    pub request: RequestId,
    pub train_id: String,
    pub departure_time: i64,
}

impl PendingDragCommit {
    /// New departure as an instant, for updating the train's `start_time`
    #[must_use]
    pub fn departure(&self) -> DateTime<Utc> {
        from_epoch_ms(self.departure_time)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PendingDrag {
    request: RequestId,
    /// Override shown before the drag started, restored on rejection
    previous: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WheelModifiers {
    /// Pan along the time axis instead of zooming
    pub shift: bool,
    /// Zoom the space axis instead of the time axis
    pub alt: bool,
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    view: ChartView,
    gesture: Gesture,
    zoom_mode: bool,
    viewport: (f64, f64),
    config: ChartConfig,
    history: History<ChartView>,
    sequencer: RequestSequencer,
    departure_overrides: IndexMap<String, i64>,
    pending: IndexMap<String, PendingDrag>,
}

impl InteractionController {
    /// `viewport` is the chart size in pixels, `(width, height)`
    #[must_use]
    pub fn new(view: ChartView, viewport: (f64, f64), config: ChartConfig) -> Self {
        let mut history = History::new(config.history_levels);
        history.record(view.clone());
        Self {
            view,
            gesture: Gesture::Idle,
            zoom_mode: false,
            viewport,
            config,
            history,
            sequencer: RequestSequencer::new(),
            departure_overrides: IndexMap::new(),
            pending: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn view(&self) -> &ChartView {
        &self.view
    }

    #[must_use]
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    #[must_use]
    pub fn zoom_mode(&self) -> bool {
        self.zoom_mode
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The path under the pointer, within the configured hit tolerance
    #[must_use]
    pub fn path_at<'a>(&self, paths: &'a [PathData], pos: (f64, f64)) -> Option<&'a PathData> {
        path_at_pixel(&self.view, paths, pos, self.config.hit_tolerance)
    }

    /// Departure time to display for a train: the drag preview, then any
    /// optimistic override, `None` meaning "use the host's value"
    #[must_use]
    pub fn displayed_departure(&self, train_id: &str) -> Option<i64> {
        match &self.gesture {
            Gesture::DraggingTrain(drag) if drag.dragged_train == train_id => Some(drag.preview_departure_time),
            _ => self.departure_overrides.get(train_id).copied(),
        }
    }

    /// Number of drag commits still waiting for the host
    #[must_use]
    pub fn pending_commits(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn with_viewport(self, viewport: (f64, f64)) -> Self {
        Self { viewport, ..self }
    }

    /// Replace the view from outside (e.g. host navigation); recorded in history
    #[must_use]
    pub fn with_view(self, view: ChartView) -> Self {
        self.cancel().commit_view(view)
    }

    /// Toggle rect-zoom mode. Any running gesture is cancelled first.
    #[must_use]
    pub fn set_zoom_mode(self, enabled: bool) -> Self {
        Self { zoom_mode: enabled, ..self.cancel() }
    }

    #[must_use]
    pub fn pointer_down(self, pos: (f64, f64)) -> Self {
        if !self.is_idle() {
            crate::log!("Ignoring pointer down during {:?}", self.gesture);
            return self;
        }
        let gesture = if self.zoom_mode {
            Gesture::RectZoomDragging { origin: pos, current: pos }
        } else {
            Gesture::Panning {
                origin: pos,
                initial_offset: (self.view.x_offset, self.view.y_offset),
            }
        };
        Self { gesture, ..self }
    }

    /// Start dragging a train whose current departure is `departure_time`
    #[must_use]
    pub fn start_train_drag(self, train_id: &str, departure_time: i64, pos: (f64, f64)) -> Self {
        if !self.is_idle() || self.zoom_mode {
            return self;
        }
        let gesture = Gesture::DraggingTrain(DraggingState {
            dragged_train: train_id.to_string(),
            initial_departure_time: departure_time,
            preview_departure_time: departure_time,
            origin: pos,
        });
        Self { gesture, ..self }
    }

    #[must_use]
    pub fn pointer_move(self, pos: (f64, f64)) -> Self {
        match self.gesture.clone() {
            Gesture::Idle => self,
            Gesture::Panning { origin, initial_offset } => {
                let view = offset_view(&self.view, initial_offset, origin, pos);
                Self { view, ..self }
            }
            Gesture::RectZoomDragging { origin, .. } => Self {
                gesture: Gesture::RectZoomDragging { origin, current: pos },
                ..self
            },
            Gesture::DraggingTrain(drag) => {
                let preview_departure_time = drag.initial_departure_time + self.time_shift(drag.origin, pos);
                Self {
                    gesture: Gesture::DraggingTrain(DraggingState { preview_departure_time, ..drag }),
                    ..self
                }
            }
        }
    }

    /// Finish the current gesture.
    ///
    /// A train drag that moved the train returns the commit the host must perform.
    #[must_use]
    pub fn pointer_up(self, pos: (f64, f64)) -> (Self, Option<PendingDragCommit>) {
        let gesture = self.gesture.clone();
        let idle = Self { gesture: Gesture::Idle, ..self };
        match gesture {
            Gesture::Idle => (idle, None),
            Gesture::Panning { origin, initial_offset } => {
                let view = offset_view(&idle.view, initial_offset, origin, pos);
                (idle.commit_view(view), None)
            }
            Gesture::RectZoomDragging { origin, .. } => (idle.apply_rect_zoom(PixelRect::from_corners(origin, pos)), None),
            Gesture::DraggingTrain(drag) => {
                let departure_time = drag.initial_departure_time + idle.time_shift(drag.origin, pos);
                if departure_time == drag.initial_departure_time {
                    return (idle, None);
                }
                idle.request_commit(&drag.dragged_train, departure_time)
            }
        }
    }

    /// Abort the current gesture without committing anything.
    ///
    /// Used for Escape and for the pointer leaving the chart. Calling it while
    /// idle leaves the controller unchanged.
    #[must_use]
    pub fn cancel(self) -> Self {
        match self.gesture {
            Gesture::Idle => self,
            Gesture::Panning { initial_offset, .. } => {
                let view = ChartView {
                    x_offset: initial_offset.0,
                    y_offset: initial_offset.1,
                    ..self.view.clone()
                };
                Self { view, gesture: Gesture::Idle, ..self }
            }
            Gesture::RectZoomDragging { .. } | Gesture::DraggingTrain(_) => Self { gesture: Gesture::Idle, ..self },
        }
    }

    #[must_use]
    pub fn pointer_leave(self) -> Self {
        self.cancel()
    }

    /// Wheel handling: zoom the time axis about the cursor, zoom the space
    /// axis with `alt`, or pan along the time axis with `shift`.
    /// Ignored while a gesture is running.
    #[must_use]
    pub fn wheel(self, delta: f64, modifiers: WheelModifiers, pos: (f64, f64)) -> Self {
        if !self.is_idle() || delta == 0.0 {
            return self;
        }
        let (time_px, space_px) = match self.view.space_axis {
            SpaceAxis::Y => (pos.0, pos.1),
            SpaceAxis::X => (pos.1, pos.0),
        };
        let factor = if delta < 0.0 {
            self.config.wheel_zoom_factor
        } else {
            1.0 / self.config.wheel_zoom_factor
        };

        let view = self.view.clone();
        let view = if modifiers.shift && !modifiers.alt {
            let amount = -delta * self.config.wheel_pan_speed;
            match view.space_axis {
                SpaceAxis::Y => view.panned(amount, 0.0),
                SpaceAxis::X => view.panned(0.0, amount),
            }
        } else if modifiers.alt && !modifiers.shift {
            let ratio = self.config.zoom_limits().clamp_ratio(view.space_ratio * factor);
            view.zoom_space_about(ratio, space_px)
        } else if !modifiers.shift {
            let new_time_scale = view.time_scale / factor;
            view.zoom_time_about(new_time_scale, time_px, &self.config.zoom_limits())
        } else {
            return self;
        };
        self.commit_view(view)
    }

    /// Apply a zoom slider value about a pixel of the time axis
    #[must_use]
    pub fn zoom_to_slider(self, slider_value: f64, anchor_px: f64) -> Self {
        if !self.is_idle() {
            return self;
        }
        let view = self.view.clone().handle_zoom(slider_value, anchor_px, &self.config.zoom_limits());
        self.commit_view(view)
    }

    /// Report the host's outcome for a drag commit.
    ///
    /// On success the new departure stays displayed until the host clears it
    /// with [`Self::clear_departure_override`]. On failure the preview is
    /// reverted. Outcomes for superseded or unknown requests are ignored.
    #[must_use]
    pub fn resolve_drag_commit<E: Display>(mut self, request: RequestId, outcome: Result<(), E>) -> Self {
        let Some(index) = self.pending.values().position(|p| p.request == request) else {
            crate::log!("Ignoring stale drag commit {}", request);
            return self;
        };
        let Some((train_id, pending)) = self.pending.shift_remove_index(index) else {
            return self;
        };

        match outcome {
            Ok(()) => {
                crate::log!("Drag commit {} for train {} accepted", request, train_id);
            }
            Err(e) => {
                log::warn!("Drag commit {request} for train {train_id} rejected: {e}");
                match pending.previous {
                    Some(previous) => {
                        self.departure_overrides.insert(train_id, previous);
                    }
                    None => {
                        self.departure_overrides.shift_remove(&train_id);
                    }
                }
            }
        }
        self
    }

    /// Drop the optimistic departure of a train once the host data reflects it
    #[must_use]
    pub fn clear_departure_override(mut self, train_id: &str) -> Self {
        if !self.pending.contains_key(train_id) {
            self.departure_overrides.shift_remove(train_id);
        }
        self
    }

    #[must_use]
    pub fn undo(mut self) -> Self {
        if !self.is_idle() {
            return self;
        }
        match self.history.undo() {
            Some(view) => Self { view, ..self },
            None => self,
        }
    }

    #[must_use]
    pub fn redo(mut self) -> Self {
        if !self.is_idle() {
            return self;
        }
        match self.history.redo() {
            Some(view) => Self { view, ..self },
            None => self,
        }
    }

    fn commit_view(mut self, view: ChartView) -> Self {
        if view != self.view {
            self.history.record(view.clone());
        }
        Self { view, ..self }
    }

    /// Time shift in ms for a pointer move from `origin` to `pos`, along the time axis
    #[allow(clippy::cast_possible_truncation)]
    fn time_shift(&self, origin: (f64, f64), pos: (f64, f64)) -> i64 {
        let delta_px = match self.view.space_axis {
            SpaceAxis::Y => pos.0 - origin.0,
            SpaceAxis::X => pos.1 - origin.1,
        };
        (delta_px * self.view.time_scale).round() as i64
    }

    fn apply_rect_zoom(self, rect: PixelRect) -> Self {
        if rect.width() < self.config.min_rect_zoom_size || rect.height() < self.config.min_rect_zoom_size {
            crate::log!("Ignoring degenerate zoom rectangle {:?}", rect);
            return self;
        }

        let (space_a, time_a) = self.view.pixel_to_point(rect.x0, rect.y0);
        let (space_b, time_b) = self.view.pixel_to_point(rect.x1, rect.y1);
        let (time_extent, space_extent) = match self.view.space_axis {
            SpaceAxis::Y => (self.viewport.0 - self.view.left_offset, self.viewport.1),
            SpaceAxis::X => (self.viewport.1 - self.view.left_offset, self.viewport.0),
        };
        if time_extent <= 0.0 || space_extent <= 0.0 {
            return self;
        }

        let view = self.view.clone().fit_domain(
            (time_a, time_b),
            (space_a, space_b),
            time_extent,
            space_extent,
            &self.config.zoom_limits(),
        );
        self.commit_view(view)
    }

    fn request_commit(mut self, train_id: &str, departure_time: i64) -> (Self, Option<PendingDragCommit>) {
        let request = self.sequencer.issue();
        let previous = match self.pending.get(train_id) {
            // A newer drag supersedes the unresolved one but keeps its fallback
            Some(pending) => pending.previous,
            None => self.departure_overrides.get(train_id).copied(),
        };
        self.pending.insert(train_id.to_string(), PendingDrag { request, previous });
        self.departure_overrides.insert(train_id.to_string(), departure_time);

        let commit = PendingDragCommit {
            request,
            train_id: train_id.to_string(),
            departure_time,
        };
        (self, Some(commit))
    }
}

fn offset_view(view: &ChartView, initial_offset: (f64, f64), origin: (f64, f64), pos: (f64, f64)) -> ChartView {
    ChartView {
        x_offset: initial_offset.0 + pos.0 - origin.0,
        y_offset: initial_offset.1 + pos.1 - origin.1,
        ..view.clone()
    }
}
