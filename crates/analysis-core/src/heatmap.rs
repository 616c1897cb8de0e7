//! Gaussian density heatmaps over the task display.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use cancellation_common::config::DisplaySize;
use cancellation_dataset_model::target::TargetSet;

use crate::geometry::GaussianKernel;
use crate::mapping::MappedClick;
use crate::metrics::MetricsReport;

/// Which point set a heatmap is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapKind {
    /// Distinct cancelled targets.
    Cancellation,
    /// Omitted targets.
    Omission,
    /// Path self-intersections.
    Intersection,
}

impl HeatmapKind {
    pub const ALL: [HeatmapKind; 3] = [
        HeatmapKind::Cancellation,
        HeatmapKind::Omission,
        HeatmapKind::Intersection,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HeatmapKind::Cancellation => "cancellation",
            HeatmapKind::Omission => "omission",
            HeatmapKind::Intersection => "intersection",
        }
    }

    /// Pixel coordinates this heatmap accumulates.
    pub fn points(
        self,
        targets: &TargetSet,
        mapped: &[MappedClick],
        report: &MetricsReport,
    ) -> Vec<(i64, i64)> {
        match self {
            HeatmapKind::Cancellation => {
                let cancelled: HashSet<_> = mapped.iter().map(|m| m.target).collect();
                targets
                    .iter()
                    .filter(|t| cancelled.contains(*t))
                    .map(|t| (t.x, t.y))
                    .collect()
            }
            HeatmapKind::Omission => report
                .omissions
                .positions
                .iter()
                .map(|t| (t.x, t.y))
                .collect(),
            HeatmapKind::Intersection => {
                report.intersections.iter().map(|p| p.to_pixel()).collect()
            }
        }
    }
}

impl std::fmt::Display for HeatmapKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated density, one cell per display pixel, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<f64>,
    pub max_density: f64,
    /// Number of points splatted onto the grid.
    pub point_count: usize,
}

impl DensityGrid {
    pub fn zeroed(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0.0; width * height],
            max_density: 0.0,
            point_count: 0,
        }
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(self.cells[row * self.width + col])
    }

    pub fn normalized_cell(&self, col: usize, row: usize) -> Option<f64> {
        let value = self.cell(col, row)?;
        if self.max_density <= 0.0 {
            return Some(0.0);
        }
        Some(value / self.max_density)
    }

    /// Sum of all cells.
    pub fn total(&self) -> f64 {
        self.cells.iter().sum()
    }

    /// Drop low-density cells for overlay rendering.
    ///
    /// Cells at or below the mean of the positive cells become `None`. Cell
    /// (0, 0) keeps the grid minimum so a colour scale still spans the full
    /// range. A grid without points (or without any positive cell) is
    /// entirely `None`.
    pub fn sparsify(&self) -> SparseDensityGrid {
        let positive: Vec<f64> = self.cells.iter().copied().filter(|v| *v > 0.0).collect();
        if self.point_count == 0 || positive.is_empty() {
            return SparseDensityGrid {
                width: self.width,
                height: self.height,
                cells: vec![None; self.cells.len()],
            };
        }

        let lowest = self.cells.iter().copied().fold(f64::INFINITY, f64::min);
        let lowbound = positive.iter().sum::<f64>() / positive.len() as f64;

        let mut cells: Vec<Option<f64>> = self
            .cells
            .iter()
            .map(|&v| (v > lowbound).then_some(v))
            .collect();
        if let Some(first) = cells.first_mut() {
            *first = Some(lowest);
        }

        SparseDensityGrid {
            width: self.width,
            height: self.height,
            cells,
        }
    }
}

/// Density grid with low cells removed; `None` renders transparent.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseDensityGrid {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Option<f64>>,
}

impl SparseDensityGrid {
    pub fn cell(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.cells[row * self.width + col]
    }

    /// Smallest and largest present value.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.cells.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

/// Splats a Gaussian kernel sized to the display at each point.
#[derive(Debug, Clone)]
pub struct HeatmapRenderer {
    display: DisplaySize,
    kernel: GaussianKernel,
}

impl HeatmapRenderer {
    /// Kernel width is half the display width, its sd a sixth of that.
    pub fn new(display: DisplaySize) -> Self {
        let size = (display.width / 2) as usize;
        let sd = size as f64 / 6.0;
        Self {
            display,
            kernel: GaussianKernel::new(size, sd),
        }
    }

    pub fn kernel(&self) -> &GaussianKernel {
        &self.kernel
    }

    pub fn render(&self, points: &[(i64, i64)]) -> DensityGrid {
        let width = self.display.width as usize;
        let height = self.display.height as usize;
        let mut grid = DensityGrid::zeroed(width, height);

        for &(x, y) in points {
            self.splat(&mut grid, x, y);
        }
        grid.point_count = points.len();
        grid.max_density = grid.cells.iter().copied().fold(0.0_f64, f64::max);

        tracing::debug!(
            "Rendered {} points onto {}x{} heatmap (kernel {})",
            points.len(),
            width,
            height,
            self.kernel.size()
        );
        grid
    }

    /// Add the kernel centred on (x, y), clipped to the grid.
    fn splat(&self, grid: &mut DensityGrid, x: i64, y: i64) {
        let size = self.kernel.size() as i64;
        let half = size / 2;
        let left = x - half;
        let top = y - half;

        let col_start = left.max(0);
        let col_end = (left + size).min(grid.width as i64);
        let row_start = top.max(0);
        let row_end = (top + size).min(grid.height as i64);
        if col_start >= col_end || row_start >= row_end {
            return;
        }

        for row in row_start..row_end {
            let j = (row - top) as usize;
            let base = row as usize * grid.width;
            for col in col_start..col_end {
                let i = (col - left) as usize;
                grid.cells[base + col as usize] += self.kernel.at(i, j);
            }
        }
    }

    /// Render the heatmap of one kind.
    pub fn render_kind(
        &self,
        kind: HeatmapKind,
        targets: &TargetSet,
        mapped: &[MappedClick],
        report: &MetricsReport,
    ) -> DensityGrid {
        self.render(&kind.points(targets, mapped, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(width: u32, height: u32) -> HeatmapRenderer {
        HeatmapRenderer::new(DisplaySize::new(width, height))
    }

    #[test]
    fn test_kernel_follows_display_width() {
        let r = renderer(200, 100);
        assert_eq!(r.kernel().size(), 100);
        assert!((r.kernel().sd() - 100.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_point_peaks_at_its_own_pixel() {
        let grid = renderer(200, 100).render(&[(100, 50)]);
        assert!((grid.cell(100, 50).unwrap() - 1.0).abs() < 1e-12);
        assert!((grid.max_density - 1.0).abs() < 1e-12);
        assert!((grid.normalized_cell(100, 50).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_clipped_corner_matches_shifted_interior_point() {
        let r = renderer(200, 100);
        let corner = r.render(&[(0, 0)]);
        let inner = r.render(&[(100, 50)]);

        // (0,0) at the corner sees the kernel's bottom-right quadrant, which
        // the interior point places at (100..150, 50..100).
        for row in 0..50 {
            for col in 0..50 {
                let a = corner.cell(col, row).unwrap();
                let b = inner.cell(col + 100, row + 50).unwrap();
                assert!((a - b).abs() < 1e-12, "mismatch at ({col},{row})");
            }
        }
        assert!(corner.total() < inner.total());
    }

    #[test]
    fn test_points_outside_the_canvas_are_clipped_away() {
        let grid = renderer(200, 100).render(&[(-1000, -1000), (5000, 50)]);
        assert_eq!(grid.point_count, 2);
        assert_eq!(grid.total(), 0.0);
    }

    #[test]
    fn test_density_adds_up() {
        let r = renderer(200, 100);
        let single = r.render(&[(100, 50)]);
        let double = r.render(&[(100, 50), (100, 50)]);
        assert!((double.total() - 2.0 * single.total()).abs() < 1e-9);
    }

    #[test]
    fn test_sparsify_without_points_is_blank() {
        let sparse = renderer(40, 20).render(&[]).sparsify();
        assert!(sparse.is_blank());
        assert_eq!(sparse.cells.len(), 40 * 20);
    }

    #[test]
    fn test_sparsify_keeps_peak_and_sentinel_minimum() {
        let grid = renderer(200, 100).render(&[(150, 50)]);
        let sparse = grid.sparsify();

        assert!(sparse.cell(150, 50).is_some());
        assert_eq!(sparse.cell(0, 0), Some(0.0));
        assert!(sparse.cell(199, 0).is_none());
        let (lo, hi) = sparse.range().unwrap();
        assert_eq!(lo, 0.0);
        assert!((hi - 1.0).abs() < 1e-12);
    }
}
