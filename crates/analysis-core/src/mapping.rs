//! Click-to-target mapping.
//!
//! Every click is attributed to the nearest target. Clicks whose nearest
//! target is not strictly closer than the distance threshold are dropped
//! and take part in no metric.

use serde::{Deserialize, Serialize};

use cancellation_dataset_model::click::{RawClick, TimestampMs};
use cancellation_dataset_model::target::{TargetPosition, TargetSet};

/// A click re-expressed as the target it cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappedClick {
    /// The cancelled target; always a member of the task's target set.
    pub target: TargetPosition,
    /// Capture time of the originating click.
    pub time_ms: TimestampMs,
    /// Index of the originating click in the raw log.
    pub click_index: usize,
}

impl MappedClick {
    pub fn x(&self) -> i64 {
        self.target.x
    }

    pub fn y(&self) -> i64 {
        self.target.y
    }
}

/// Nearest-target mapper with a fixed distance threshold (pixels).
#[derive(Debug, Clone, Copy)]
pub struct ClickMapper {
    threshold: f64,
}

impl ClickMapper {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Nearest target to a pixel and its squared distance.
    ///
    /// Ties go to the target that comes first in the set's iteration order.
    pub fn nearest(targets: &TargetSet, x: i64, y: i64) -> Option<(TargetPosition, i128)> {
        let mut best: Option<(TargetPosition, i128)> = None;
        for target in targets {
            let dist_sq = target.distance_sq_to(x, y);
            match best {
                Some((_, best_sq)) if dist_sq >= best_sq => {}
                _ => best = Some((*target, dist_sq)),
            }
        }
        best
    }

    /// Map one click, or `None` when it is outside the threshold.
    pub fn map_click(&self, click: &RawClick, targets: &TargetSet) -> Option<TargetPosition> {
        let (target, dist_sq) = Self::nearest(targets, click.x, click.y)?;
        ((dist_sq as f64).sqrt() < self.threshold).then_some(target)
    }

    /// Map a click sequence, preserving click order.
    pub fn map(&self, clicks: &[RawClick], targets: &TargetSet) -> Vec<MappedClick> {
        let mapped: Vec<MappedClick> = clicks
            .iter()
            .enumerate()
            .filter_map(|(click_index, click)| {
                self.map_click(click, targets).map(|target| MappedClick {
                    target,
                    time_ms: click.time_ms,
                    click_index,
                })
            })
            .collect();

        tracing::debug!(
            "Mapped {} of {} clicks to targets (threshold {} px)",
            mapped.len(),
            clicks.len(),
            self.threshold
        );
        mapped
    }
}

/// Map clicks to targets with the given threshold.
pub fn map_clicks(clicks: &[RawClick], targets: &TargetSet, threshold: f64) -> Vec<MappedClick> {
    ClickMapper::new(threshold).map(clicks, targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets() -> TargetSet {
        TargetSet::new([TargetPosition::new(110, 105), TargetPosition::new(500, 500)])
    }

    #[test]
    fn test_click_near_target_maps_to_it() {
        let mapped = map_clicks(&[RawClick::new(0, 100, 100)], &targets(), 50.0);
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].target, TargetPosition::new(110, 105));
    }

    #[test]
    fn test_click_far_from_all_targets_is_dropped() {
        let mapped = map_clicks(&[RawClick::new(0, 300, 300)], &targets(), 50.0);
        assert!(mapped.is_empty());
    }

    #[test]
    fn test_distance_equal_to_threshold_is_dropped() {
        let set = TargetSet::new([TargetPosition::new(0, 0)]);
        assert!(map_clicks(&[RawClick::new(0, 30, 40)], &set, 50.0).is_empty());
        assert_eq!(map_clicks(&[RawClick::new(0, 30, 39)], &set, 50.0).len(), 1);
    }

    #[test]
    fn test_ties_resolve_to_first_target_in_order() {
        let left = TargetPosition::new(90, 100);
        let right = TargetPosition::new(110, 100);
        let left_first = TargetSet::new([left, right]);
        let right_first = TargetSet::new([right, left]);
        let click = [RawClick::new(0, 100, 100)];

        assert_eq!(map_clicks(&click, &left_first, 50.0)[0].x(), 90);
        assert_eq!(map_clicks(&click, &right_first, 50.0)[0].x(), 110);
    }

    #[test]
    fn test_mapping_preserves_click_order_and_indices() {
        let clicks = [
            RawClick::new(100, 500, 505),
            RawClick::new(200, 300, 300),
            RawClick::new(300, 112, 100),
        ];
        let mapped = map_clicks(&clicks, &targets(), 50.0);
        assert_eq!(mapped.len(), 2);
        assert_eq!(mapped[0].target, TargetPosition::new(500, 500));
        assert_eq!(mapped[0].click_index, 0);
        assert_eq!(mapped[1].target, TargetPosition::new(110, 105));
        assert_eq!(mapped[1].click_index, 2);
        assert_eq!(mapped[1].time_ms, 300);
    }

    #[test]
    fn test_far_out_click_is_dropped_not_wrapped() {
        let set = TargetSet::new([TargetPosition::new(0, 0)]);
        let clicks = [
            RawClick::new(10, 4_294_967_296, 0),
            RawClick::new(20, i64::MAX, i64::MIN),
            RawClick::new(30, 3, 4),
        ];
        let mapped = map_clicks(&clicks, &set, 50.0);
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].click_index, 2);
    }

    #[test]
    fn test_no_targets_drops_everything() {
        let mapped = map_clicks(&[RawClick::new(0, 1, 1)], &TargetSet::default(), 50.0);
        assert!(mapped.is_empty());
    }
}
