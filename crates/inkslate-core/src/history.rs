//! Linear undo/redo history over full element snapshots.

use crate::element::Element;

/// A snapshot of the element sequence at one point in time.
pub type Snapshot = Vec<Element>;

/// Linear history with a movable pointer.
///
/// `entries[index]` is always the active state. Committing while the
/// pointer is not at the end discards every redo-able entry first.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    index: usize,
    /// Maximum number of entries to keep (`None` = unlimited).
    limit: Option<usize>,
}

impl History {
    /// Create a history whose first entry is `initial`.
    pub fn new(initial: Snapshot) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            limit: None,
        }
    }

    /// Cap the number of stored entries. The oldest are dropped first.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.map(|l| l.max(1));
        self.enforce_limit();
        self
    }

    /// Record a new state after a completed edit.
    pub fn commit(&mut self, elements: &[Element]) {
        self.entries.truncate(self.index + 1);
        self.entries.push(elements.to_vec());
        self.index = self.entries.len() - 1;
        self.enforce_limit();
        log::debug!("History commit: {} entries, index {}", self.entries.len(), self.index);
    }

    /// Step back one entry. Returns the new active snapshot, or `None` at
    /// the oldest entry.
    pub fn undo(&mut self) -> Option<&[Element]> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.entries[self.index])
    }

    /// Step forward one entry. Returns the new active snapshot, or `None`
    /// at the newest entry.
    pub fn redo(&mut self) -> Option<&[Element]> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(&self.entries[self.index])
    }

    /// The active snapshot.
    pub fn current(&self) -> &[Element] {
        &self.entries[self.index]
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Number of stored entries (always at least one).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Position of the active entry.
    pub fn index(&self) -> usize {
        self.index
    }

    fn enforce_limit(&mut self) {
        let Some(limit) = self.limit else {
            return;
        };
        if self.entries.len() > limit {
            let excess = self.entries.len() - limit;
            self.entries.drain(..excess);
            self.index = self.index.saturating_sub(excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Brush, ElementStyle};
    use kurbo::Point;

    fn stroke(x: f64) -> Element {
        Element::stroke(
            Brush::Pen,
            vec![Point::new(x, 0.0), Point::new(x, 10.0)],
            ElementStyle::default(),
        )
    }

    /// History after committing `n` states, each one element longer.
    fn history_with(n: usize) -> (History, Vec<Element>) {
        let mut history = History::new(Vec::new());
        let mut elements = Vec::new();
        for i in 0..n {
            elements.push(stroke(i as f64));
            history.commit(&elements);
        }
        (history, elements)
    }

    #[test]
    fn test_initial_state() {
        let history = History::new(vec![stroke(1.0)]);
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert_eq!(history.current().len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo() {
        let (mut history, _) = history_with(2);
        assert_eq!(history.current().len(), 2);

        assert_eq!(history.undo().map(<[Element]>::len), Some(1));
        assert_eq!(history.undo().map(<[Element]>::len), Some(0));
        assert_eq!(history.redo().map(<[Element]>::len), Some(1));
        assert_eq!(history.current().len(), 1);
    }

    #[test]
    fn test_boundaries_are_noops() {
        let (mut history, _) = history_with(1);
        history.undo();
        let before = history.current().to_vec();
        assert!(history.undo().is_none());
        assert_eq!(history.current(), before.as_slice());
        assert_eq!(history.index(), 0);

        history.redo();
        let before = history.current().to_vec();
        assert!(history.redo().is_none());
        assert_eq!(history.current(), before.as_slice());
        assert_eq!(history.index(), history.len() - 1);
    }

    #[test]
    fn test_commit_truncates_redo() {
        let (mut history, _) = history_with(4);
        for _ in 0..3 {
            history.undo();
        }
        assert!(history.can_redo());

        history.commit(&[stroke(99.0)]);
        assert_eq!(history.len(), 3);
        assert!(history.redo().is_none());
        assert_eq!(history.current().len(), 1);
    }

    #[test]
    fn test_index_stays_in_range() {
        let mut history = History::new(Vec::new());
        let ops = [0, 1, 2, 0, 0, 2, 1, 1, 1, 0, 2, 2, 2, 0, 1];
        for (step, op) in ops.iter().enumerate() {
            match op {
                0 => history.commit(&[stroke(step as f64)]),
                1 => {
                    history.undo();
                }
                _ => {
                    history.redo();
                }
            }
            assert!(history.index() < history.len());
        }
    }

    #[test]
    fn test_snapshots_are_deep_copies() {
        let mut history = History::new(Vec::new());
        let mut elements = vec![stroke(0.0)];
        history.commit(&elements);
        elements.clear();
        assert_eq!(history.current().len(), 1);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(Vec::new()).with_limit(Some(3));
        for i in 0..5 {
            history.commit(&vec![stroke(0.0); i + 1]);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        history.undo();
        history.undo();
        assert!(history.undo().is_none());
        assert_eq!(history.current().len(), 3);
    }
}
