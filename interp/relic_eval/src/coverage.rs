//! Program-point coverage recording.
//!
//! The engine records the program point of every executed instruction into a
//! shared hit-set. The set is write-only inside the engine; external
//! harnesses snapshot it between runs.

use rustc_hash::FxHashSet;
use std::cell::RefCell;
use std::rc::Rc;

use relic_ir::ProgPoint;

/// Shared growable set of executed program points.
///
/// Clones share one underlying set, so every context derived from a run
/// records into the same place.
#[derive(Clone, Default)]
pub struct Coverage(Rc<RefCell<FxHashSet<ProgPoint>>>);

impl Coverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a program point as executed.
    pub fn record(&self, point: ProgPoint) {
        self.0.borrow_mut().insert(point);
    }

    pub fn is_hit(&self, point: ProgPoint) -> bool {
        self.0.borrow().contains(&point)
    }

    /// Snapshot of every hit point, sorted for stable output.
    pub fn hits(&self) -> Vec<ProgPoint> {
        let mut points: Vec<ProgPoint> = self.0.borrow().iter().copied().collect();
        points.sort_unstable();
        points
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_hit_set() {
        let cover = Coverage::new();
        let other = cover.clone();
        other.record(ProgPoint::new(7));
        assert!(cover.is_hit(ProgPoint::new(7)));
        assert_eq!(cover.hits(), vec![ProgPoint::new(7)]);
    }

    #[test]
    fn recording_is_idempotent() {
        let cover = Coverage::new();
        cover.record(ProgPoint::new(1));
        cover.record(ProgPoint::new(1));
        assert_eq!(cover.len(), 1);
    }
}
