//! Target positions laid out by the task.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use cancellation_common::error::CancellationResult;

use crate::delimited::{parse_records, read_records, Record, TargetRow};

/// Centre of one target stimulus, in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetPosition {
    pub x: i64,
    pub y: i64,
}

impl TargetPosition {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to a pixel.
    ///
    /// Computed in `i128` so any pair of `i64` coordinates is exact or, at
    /// the extreme corners, saturates instead of wrapping.
    pub fn distance_sq_to(&self, x: i64, y: i64) -> i128 {
        let dx = i128::from(self.x) - i128::from(x);
        let dy = i128::from(self.y) - i128::from(y);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Euclidean distance to another target.
    pub fn distance_to(&self, other: &TargetPosition) -> f64 {
        (self.distance_sq_to(other.x, other.y) as f64).sqrt()
    }
}

/// The fixed, duplicate-free set of targets for one task.
///
/// Iteration order is file order; it decides ties when a click is
/// equidistant to several targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSet {
    positions: Vec<TargetPosition>,
}

impl TargetSet {
    /// Build a set, keeping the first occurrence of any repeated position.
    pub fn new(positions: impl IntoIterator<Item = TargetPosition>) -> Self {
        let mut seen = HashSet::new();
        let positions = positions
            .into_iter()
            .filter(|p| seen.insert(*p))
            .collect();
        Self { positions }
    }

    /// Read a target file (`target`, `x`, `y` columns; `target` unused).
    pub fn load(path: impl AsRef<Path>) -> CancellationResult<Self> {
        let path = path.as_ref();
        let rows = read_records::<TargetRow>(path)?;
        Ok(Self::from_rows(path, &rows))
    }

    /// Parse target-file content. `path` is only used in messages.
    pub fn parse(path: impl AsRef<Path>, content: &str) -> CancellationResult<Self> {
        let path = path.as_ref();
        let rows = parse_records::<TargetRow>(path, content)?;
        Ok(Self::from_rows(path, &rows))
    }

    fn from_rows(path: &Path, rows: &[Record<TargetRow>]) -> Self {
        let set = Self::new(
            rows.iter()
                .map(|row| TargetPosition::new(row.value.x, row.value.y)),
        );
        if set.len() < rows.len() {
            tracing::warn!(
                "{} duplicate target position(s) ignored in {}",
                rows.len() - set.len(),
                path.display()
            );
        }
        set
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetPosition> {
        self.positions.iter()
    }

    pub fn as_slice(&self) -> &[TargetPosition] {
        &self.positions
    }

    pub fn contains(&self, position: &TargetPosition) -> bool {
        self.positions.contains(position)
    }

    /// Bounding box as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> Option<(i64, i64, i64, i64)> {
        let first = self.positions.first()?;
        let init = (first.x, first.y, first.x, first.y);
        Some(self.positions.iter().fold(init, |(x0, y0, x1, y1), p| {
            (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y))
        }))
    }
}

impl<'a> IntoIterator for &'a TargetSet {
    type Item = &'a TargetPosition;
    type IntoIter = std::slice::Iter<'a, TargetPosition>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter()
    }
}
