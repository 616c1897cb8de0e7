//! Cancellation Analysis Core
//!
//! Turns a loaded dataset into clinical measures:
//! - **Mapping:** Attribute each click to its nearest target within a threshold
//! - **Metrics:** Omissions, perseverations, centre of cancellation, search
//!   organisation (distance, angle, best R, path intersections) and Q score,
//!   evaluated through a memoized dependency resolver
//! - **Heatmaps:** Gaussian kernel density over the task display
//!
//! This crate is pure computation with no I/O and no rendering backends.
//! All inputs are data; all outputs are data.

pub mod geometry;
pub mod heatmap;
pub mod mapping;
pub mod metrics;

pub use heatmap::{DensityGrid, HeatmapKind, HeatmapRenderer, SparseDensityGrid};
pub use mapping::{map_clicks, ClickMapper, MappedClick};
pub use metrics::{DerivedMetrics, MetricId, MetricValue, MetricsEngine, MetricsReport};
