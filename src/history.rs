use crate::constants::DEFAULT_HISTORY_LEVELS;

/// Undo/redo stacks of immutable snapshots with a configurable maximum depth.
///
/// Snapshots are recorded *after* each change, so the top of the undo stack
/// is always the current state.
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    undo_stack: Vec<T>,
    redo_stack: Vec<T>,
    max_levels: usize,
}

impl<T: Clone> History<T> {
    /// Create a new `History` with the specified maximum undo levels
    #[must_use]
    pub fn new(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels: max_levels.max(1),
        }
    }

    /// Record a new snapshot.
    /// This clears the redo stack and evicts the oldest entry past the depth limit.
    pub fn record(&mut self, snapshot: T) {
        self.redo_stack.clear();
        push_bounded(&mut self.undo_stack, snapshot, self.max_levels);
    }

    /// Step back, returning the snapshot to restore.
    /// The current state is moved onto the redo stack.
    pub fn undo(&mut self) -> Option<T> {
        if !self.can_undo() {
            return None;
        }
        let current = self.undo_stack.pop()?;
        push_bounded(&mut self.redo_stack, current, self.max_levels);
        self.undo_stack.last().cloned()
    }

    /// Step forward again after an undo
    pub fn redo(&mut self) -> Option<T> {
        let snapshot = self.redo_stack.pop()?;
        push_bounded(&mut self.undo_stack, snapshot.clone(), self.max_levels);
        Some(snapshot)
    }

    /// Need at least 2 items: current state + previous state to restore
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() >= 2
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEVELS)
    }
}

// FIFO eviction
fn push_bounded<T>(stack: &mut Vec<T>, item: T, max_levels: usize) {
    stack.push(item);
    if stack.len() > max_levels {
        stack.remove(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::{ChartView, SpaceScale, ZoomLimits};

    fn view() -> ChartView {
        ChartView::new(0, 1000.0, 0.0, vec![SpaceScale::linear(1000.0, 1.0)]).expect("valid view")
    }

    #[test]
    fn test_undo_redo_view_snapshots() {
        let mut history = History::default();
        let v0 = view();
        let v1 = v0.clone().panned(10.0, 0.0);
        let v2 = v1.clone().handle_zoom(30.0, 100.0, &ZoomLimits::default());
        history.record(v0.clone());
        history.record(v1.clone());
        history.record(v2.clone());

        assert_eq!(history.undo(), Some(v1.clone()));
        assert_eq!(history.undo(), Some(v0.clone()));
        assert_eq!(history.undo(), None);
        assert!(history.can_redo());
        assert_eq!(history.redo(), Some(v1.clone()));
        assert_eq!(history.redo(), Some(v2));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = History::new(10);
        history.record(1);
        history.record(2);
        assert_eq!(history.undo(), Some(1));
        history.record(3);
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some(1));
    }

    #[test]
    fn test_max_levels_evicts_oldest() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.record(i);
        }
        assert_eq!(history.undo(), Some(3));
        assert_eq!(history.undo(), Some(2));
        assert_eq!(history.undo(), None);
    }
}
