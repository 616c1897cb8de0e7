//! Metrics engine: clinical measures of one cancellation run.
//!
//! # Evaluation
//!
//! Every measure is a node identified by a [`MetricId`]. Each node declares
//! the nodes it is derived from in [`MetricId::dependencies`]. Asking the
//! engine for a node first resolves its dependencies, then computes the
//! node and caches it in [`DerivedMetrics`]; every node is computed at most
//! once per dataset.
//!
//! # Undefined values
//!
//! A measure whose inputs cannot support it (no cancellations, a single
//! target, zero duration, zero variance) is *absent*: scalar values are
//! `Option<f64>` and `None` means undefined. The engine never produces NaN.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use cancellation_common::error::{CancellationError, CancellationResult};
use cancellation_dataset_model::dataset::Dataset;
use cancellation_dataset_model::target::TargetPosition;

use crate::geometry::{mean, pearson_r, segment_intersection, Point, Segment};
use crate::mapping::MappedClick;

/// Identifier of one node in the metric dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricId {
    Omissions,
    CentreOfCancellation,
    PerseverationsTotal,
    PerseverationsImmediate,
    PerseverationsDelayed,
    InterDistances,
    MeanInterDistance,
    TargetNeighbourDistance,
    StandardizedInterDistance,
    MeanInterTime,
    SearchSpeed,
    QScore,
    Angles,
    MeanAngle,
    StandardizedAngle,
    BestR,
    Intersections,
    IntersectionRate,
}

impl MetricId {
    pub const ALL: [MetricId; 18] = [
        MetricId::Omissions,
        MetricId::CentreOfCancellation,
        MetricId::PerseverationsTotal,
        MetricId::PerseverationsImmediate,
        MetricId::PerseverationsDelayed,
        MetricId::InterDistances,
        MetricId::MeanInterDistance,
        MetricId::TargetNeighbourDistance,
        MetricId::StandardizedInterDistance,
        MetricId::MeanInterTime,
        MetricId::SearchSpeed,
        MetricId::QScore,
        MetricId::Angles,
        MetricId::MeanAngle,
        MetricId::StandardizedAngle,
        MetricId::BestR,
        MetricId::Intersections,
        MetricId::IntersectionRate,
    ];

    /// Nodes that must be evaluated before this one.
    pub fn dependencies(self) -> &'static [MetricId] {
        use MetricId::*;
        match self {
            PerseverationsDelayed => &[PerseverationsTotal, PerseverationsImmediate],
            MeanInterDistance => &[InterDistances],
            StandardizedInterDistance => &[MeanInterDistance, TargetNeighbourDistance],
            SearchSpeed => &[MeanInterDistance, MeanInterTime],
            QScore => &[Omissions],
            Angles => &[InterDistances],
            MeanAngle => &[Angles],
            StandardizedAngle => &[Angles],
            IntersectionRate => &[Intersections, PerseverationsImmediate],
            Omissions
            | CentreOfCancellation
            | PerseverationsTotal
            | PerseverationsImmediate
            | InterDistances
            | TargetNeighbourDistance
            | MeanInterTime
            | BestR
            | Intersections => &[],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MetricId::Omissions => "omissions",
            MetricId::CentreOfCancellation => "centre_of_cancellation",
            MetricId::PerseverationsTotal => "perseverations_total",
            MetricId::PerseverationsImmediate => "perseverations_immediate",
            MetricId::PerseverationsDelayed => "perseverations_delayed",
            MetricId::InterDistances => "inter_distances",
            MetricId::MeanInterDistance => "mean_inter_distance",
            MetricId::TargetNeighbourDistance => "target_neighbour_distance",
            MetricId::StandardizedInterDistance => "standardized_inter_distance",
            MetricId::MeanInterTime => "mean_inter_time",
            MetricId::SearchSpeed => "search_speed",
            MetricId::QScore => "q_score",
            MetricId::Angles => "angles",
            MetricId::MeanAngle => "mean_angle",
            MetricId::StandardizedAngle => "standardized_angle",
            MetricId::BestR => "best_r",
            MetricId::Intersections => "intersections",
            MetricId::IntersectionRate => "intersection_rate",
        }
    }
}

impl std::fmt::Display for MetricId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Omitted targets and their split over the display midline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OmissionSummary {
    /// Omitted targets, in target-set order.
    pub positions: Vec<TargetPosition>,
    pub total: usize,
    /// Omitted targets left of the display midline.
    pub left: usize,
    /// Omitted targets right of the display midline.
    pub right: usize,
}

/// Normalized spatial bias of cancellations, each axis in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentreOfCancellation {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Rank-order correlations with cancellation position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestR {
    pub best: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Value stored for one metric node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    Count(usize),
    Scalar(Option<f64>),
    /// One distance per consecutive cancellation pair.
    Distances(Vec<f64>),
    /// One angle per consecutive pair; `None` for zero-distance pairs.
    Angles(Vec<Option<f64>>),
    Omissions(OmissionSummary),
    Centre(CentreOfCancellation),
    BestR(BestR),
    Intersections(Vec<Point>),
}

/// Memoization table of computed metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    values: BTreeMap<MetricId, MetricValue>,
}

impl DerivedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: MetricId) -> bool {
        self.values.contains_key(&id)
    }

    pub fn get(&self, id: MetricId) -> Option<&MetricValue> {
        self.values.get(&id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricId, &MetricValue)> {
        self.values.iter().map(|(id, v)| (*id, v))
    }

    fn insert(&mut self, id: MetricId, value: MetricValue) {
        self.values.insert(id, value);
    }

    pub fn count(&self, id: MetricId) -> Option<usize> {
        match self.get(id)? {
            MetricValue::Count(n) => Some(*n),
            _ => None,
        }
    }

    /// The scalar stored for `id`. The outer `Option` is presence in the
    /// table, the inner one is whether the measure is defined.
    pub fn scalar(&self, id: MetricId) -> Option<Option<f64>> {
        match self.get(id)? {
            MetricValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn distances(&self) -> Option<&[f64]> {
        match self.get(MetricId::InterDistances)? {
            MetricValue::Distances(d) => Some(d),
            _ => None,
        }
    }

    pub fn angles(&self) -> Option<&[Option<f64>]> {
        match self.get(MetricId::Angles)? {
            MetricValue::Angles(a) => Some(a),
            _ => None,
        }
    }

    pub fn omissions(&self) -> Option<&OmissionSummary> {
        match self.get(MetricId::Omissions)? {
            MetricValue::Omissions(o) => Some(o),
            _ => None,
        }
    }

    pub fn centre(&self) -> Option<CentreOfCancellation> {
        match self.get(MetricId::CentreOfCancellation)? {
            MetricValue::Centre(c) => Some(*c),
            _ => None,
        }
    }

    pub fn best_r(&self) -> Option<BestR> {
        match self.get(MetricId::BestR)? {
            MetricValue::BestR(r) => Some(*r),
            _ => None,
        }
    }

    pub fn intersections(&self) -> Option<&[Point]> {
        match self.get(MetricId::Intersections)? {
            MetricValue::Intersections(p) => Some(p),
            _ => None,
        }
    }
}

/// Perseveration counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perseverations {
    pub total: usize,
    pub immediate: usize,
    pub delayed: usize,
}

/// Typed snapshot of every metric for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub targets: usize,
    pub cancellations: usize,
    pub omissions: OmissionSummary,
    pub centre: CentreOfCancellation,
    pub perseverations: Perseverations,
    pub mean_inter_distance: Option<f64>,
    pub target_neighbour_distance: Option<f64>,
    pub standardized_inter_distance: Option<f64>,
    /// Milliseconds.
    pub mean_inter_time_ms: Option<f64>,
    /// Pixels per millisecond.
    pub search_speed: Option<f64>,
    pub q_score: Option<f64>,
    /// Degrees; 0 is horizontal movement, 90 vertical.
    pub mean_angle: Option<f64>,
    pub standardized_angle: Option<f64>,
    pub best_r: BestR,
    pub intersections: Vec<Point>,
    pub intersection_rate: Option<f64>,
}

impl MetricsReport {
    /// Build a report from a fully populated metrics table.
    pub fn from_metrics(
        metrics: &DerivedMetrics,
        targets: usize,
        cancellations: usize,
    ) -> CancellationResult<Self> {
        let count = |id| metrics.count(id).ok_or_else(|| missing(id));
        let scalar = |id| metrics.scalar(id).ok_or_else(|| missing(id));

        Ok(Self {
            targets,
            cancellations,
            omissions: metrics
                .omissions()
                .cloned()
                .ok_or_else(|| missing(MetricId::Omissions))?,
            centre: metrics
                .centre()
                .ok_or_else(|| missing(MetricId::CentreOfCancellation))?,
            perseverations: Perseverations {
                total: count(MetricId::PerseverationsTotal)?,
                immediate: count(MetricId::PerseverationsImmediate)?,
                delayed: count(MetricId::PerseverationsDelayed)?,
            },
            mean_inter_distance: scalar(MetricId::MeanInterDistance)?,
            target_neighbour_distance: scalar(MetricId::TargetNeighbourDistance)?,
            standardized_inter_distance: scalar(MetricId::StandardizedInterDistance)?,
            mean_inter_time_ms: scalar(MetricId::MeanInterTime)?,
            search_speed: scalar(MetricId::SearchSpeed)?,
            q_score: scalar(MetricId::QScore)?,
            mean_angle: scalar(MetricId::MeanAngle)?,
            standardized_angle: scalar(MetricId::StandardizedAngle)?,
            best_r: metrics.best_r().ok_or_else(|| missing(MetricId::BestR))?,
            intersections: metrics
                .intersections()
                .map(<[Point]>::to_vec)
                .ok_or_else(|| missing(MetricId::Intersections))?,
            intersection_rate: scalar(MetricId::IntersectionRate)?,
        })
    }
}

fn missing(id: MetricId) -> CancellationError {
    CancellationError::processing(format!("metric '{id}' has not been computed"))
}

/// Evaluates metric nodes for one dataset.
pub struct MetricsEngine<'a> {
    dataset: &'a Dataset,
    mapped: &'a [MappedClick],
    metrics: DerivedMetrics,
    resolving: Vec<MetricId>,
    order: Vec<MetricId>,
}

impl<'a> MetricsEngine<'a> {
    /// Create an engine over a dataset and its mapped clicks.
    pub fn new(dataset: &'a Dataset, mapped: &'a [MappedClick]) -> Self {
        Self {
            dataset,
            mapped,
            metrics: DerivedMetrics::new(),
            resolving: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Compute every metric and return the typed report.
    pub fn run(&mut self) -> CancellationResult<MetricsReport> {
        for id in MetricId::ALL {
            self.ensure(id)?;
        }
        let distinct = self
            .mapped
            .iter()
            .map(|m| m.target)
            .collect::<HashSet<_>>()
            .len();
        tracing::debug!(
            "Computed {} metrics for '{}' ({} cancellations, {} distinct)",
            self.metrics.len(),
            self.dataset.name,
            self.mapped.len(),
            distinct
        );
        MetricsReport::from_metrics(
            &self.metrics,
            self.dataset.targets().len(),
            self.mapped.len(),
        )
    }

    /// Value of `id`, computing it and its dependencies on first use.
    pub fn ensure(&mut self, id: MetricId) -> CancellationResult<&MetricValue> {
        if !self.metrics.contains(id) {
            if self.resolving.contains(&id) {
                return Err(CancellationError::processing(format!(
                    "metric dependency cycle through '{id}'"
                )));
            }
            self.resolving.push(id);
            let result = self.resolve(id);
            self.resolving.pop();

            let value = result?;
            tracing::debug!("metric {} = {:?}", id, value);
            self.metrics.insert(id, value);
            self.order.push(id);
        }
        self.metrics.get(id).ok_or_else(|| missing(id))
    }

    fn resolve(&mut self, id: MetricId) -> CancellationResult<MetricValue> {
        for &dep in id.dependencies() {
            self.ensure(dep)?;
        }
        self.compute(id)
    }

    /// The memoization table.
    pub fn metrics(&self) -> &DerivedMetrics {
        &self.metrics
    }

    pub fn into_metrics(self) -> DerivedMetrics {
        self.metrics
    }

    /// Metrics in the order they were computed.
    pub fn evaluation_order(&self) -> &[MetricId] {
        &self.order
    }

    fn compute(&self, id: MetricId) -> CancellationResult<MetricValue> {
        let value = match id {
            MetricId::Omissions => MetricValue::Omissions(self.omissions()),
            MetricId::CentreOfCancellation => MetricValue::Centre(self.centre_of_cancellation()),
            MetricId::PerseverationsTotal => MetricValue::Count(self.total_perseverations()),
            MetricId::PerseverationsImmediate => {
                MetricValue::Count(self.immediate_perseverations())
            }
            MetricId::PerseverationsDelayed => {
                let total = self.require_count(MetricId::PerseverationsTotal)?;
                let immediate = self.require_count(MetricId::PerseverationsImmediate)?;
                MetricValue::Count(total.saturating_sub(immediate))
            }
            MetricId::InterDistances => MetricValue::Distances(self.inter_distances()),
            MetricId::MeanInterDistance => {
                let distances = self
                    .metrics
                    .distances()
                    .ok_or_else(|| missing(MetricId::InterDistances))?;
                MetricValue::Scalar(mean(distances.iter().copied().filter(|d| *d > 0.0)))
            }
            MetricId::TargetNeighbourDistance => {
                MetricValue::Scalar(self.mean_target_neighbour_distance())
            }
            MetricId::StandardizedInterDistance => {
                let mean_dist = self.require_scalar(MetricId::MeanInterDistance)?;
                let neighbour = self.require_scalar(MetricId::TargetNeighbourDistance)?;
                MetricValue::Scalar(ratio(mean_dist, neighbour))
            }
            MetricId::MeanInterTime => MetricValue::Scalar(self.mean_inter_time()),
            MetricId::SearchSpeed => {
                let mean_dist = self.require_scalar(MetricId::MeanInterDistance)?;
                let mean_time = self.require_scalar(MetricId::MeanInterTime)?;
                MetricValue::Scalar(ratio(mean_dist, mean_time))
            }
            MetricId::QScore => {
                let omitted = self
                    .metrics
                    .omissions()
                    .ok_or_else(|| missing(MetricId::Omissions))?
                    .total;
                MetricValue::Scalar(self.q_score(omitted))
            }
            MetricId::Angles => {
                let distances = self
                    .metrics
                    .distances()
                    .ok_or_else(|| missing(MetricId::InterDistances))?;
                MetricValue::Angles(self.angles(distances))
            }
            MetricId::MeanAngle => {
                let angles = self.metrics.angles().ok_or_else(|| missing(MetricId::Angles))?;
                MetricValue::Scalar(mean(angles.iter().flatten().copied()))
            }
            MetricId::StandardizedAngle => {
                let angles = self.metrics.angles().ok_or_else(|| missing(MetricId::Angles))?;
                MetricValue::Scalar(mean(
                    angles
                        .iter()
                        .flatten()
                        .map(|a| (2.0 * (a / 90.0) - 1.0).abs()),
                ))
            }
            MetricId::BestR => MetricValue::BestR(self.best_r()),
            MetricId::Intersections => MetricValue::Intersections(self.path_intersections()),
            MetricId::IntersectionRate => {
                let total = self
                    .metrics
                    .intersections()
                    .ok_or_else(|| missing(MetricId::Intersections))?
                    .len();
                let immediate = self.require_count(MetricId::PerseverationsImmediate)?;
                let path_len = self.mapped.len().saturating_sub(immediate);
                MetricValue::Scalar(ratio(Some(total as f64), Some(path_len as f64)))
            }
        };
        Ok(value)
    }

    fn require_count(&self, id: MetricId) -> CancellationResult<usize> {
        self.metrics.count(id).ok_or_else(|| missing(id))
    }

    fn require_scalar(&self, id: MetricId) -> CancellationResult<Option<f64>> {
        self.metrics.scalar(id).ok_or_else(|| missing(id))
    }

    fn target_counts(&self) -> HashMap<TargetPosition, usize> {
        let mut counts = HashMap::new();
        for click in self.mapped {
            *counts.entry(click.target).or_insert(0) += 1;
        }
        counts
    }

    fn omissions(&self) -> OmissionSummary {
        let counts = self.target_counts();
        let midline = self.dataset.display.half_width();

        let positions: Vec<TargetPosition> = self
            .dataset
            .targets()
            .iter()
            .filter(|t| !counts.contains_key(*t))
            .copied()
            .collect();
        let left = positions.iter().filter(|p| (p.x as f64) < midline).count();
        let right = positions.iter().filter(|p| (p.x as f64) > midline).count();

        OmissionSummary {
            total: positions.len(),
            left,
            right,
            positions,
        }
    }

    fn centre_of_cancellation(&self) -> CentreOfCancellation {
        let Some((min_x, min_y, max_x, max_y)) = self.dataset.targets().bounds() else {
            return CentreOfCancellation { x: None, y: None };
        };

        let axis = |values: Vec<i64>, lo: i64, hi: i64| -> Option<f64> {
            let half_span = (hi as f64 - lo as f64) / 2.0;
            if half_span <= 0.0 {
                return None;
            }
            let distinct: HashSet<i64> = values.into_iter().collect();
            let centre = lo as f64 + half_span;
            mean(distinct.into_iter().map(|v| v as f64)).map(|m| (m - centre) / half_span)
        };

        CentreOfCancellation {
            x: axis(self.mapped.iter().map(MappedClick::x).collect(), min_x, max_x),
            y: axis(self.mapped.iter().map(MappedClick::y).collect(), min_y, max_y),
        }
    }

    fn total_perseverations(&self) -> usize {
        self.target_counts()
            .values()
            .filter(|&&n| n > 1)
            .map(|n| n - 1)
            .sum()
    }

    fn immediate_perseverations(&self) -> usize {
        self.mapped
            .windows(2)
            .filter(|pair| pair[0].x() == pair[1].x() && pair[0].y() == pair[1].y())
            .count()
    }

    fn inter_distances(&self) -> Vec<f64> {
        self.mapped
            .windows(2)
            .map(|pair| pair[0].target.distance_to(&pair[1].target))
            .collect()
    }

    fn mean_target_neighbour_distance(&self) -> Option<f64> {
        let targets = self.dataset.targets().as_slice();
        mean(targets.iter().filter_map(|t| {
            targets
                .iter()
                .map(|other| t.distance_to(other))
                .filter(|d| *d > 0.0)
                .min_by(f64::total_cmp)
        }))
    }

    fn mean_inter_time(&self) -> Option<f64> {
        mean(
            self.dataset
                .clicks()
                .windows(2)
                .map(|pair| pair[1].time_ms as f64 - pair[0].time_ms as f64),
        )
    }

    fn q_score(&self, omitted: usize) -> Option<f64> {
        let total = self.dataset.targets().len();
        // Whole seconds, matching the summary's duration column.
        let secs = self.dataset.duration().whole_seconds();
        if total == 0 || secs == 0 {
            return None;
        }
        let correct = total.saturating_sub(omitted) as f64;
        Some((correct / total as f64) * (correct / secs as f64))
    }

    fn angles(&self, distances: &[f64]) -> Vec<Option<f64>> {
        self.mapped
            .windows(2)
            .zip(distances)
            .map(|(pair, &dist)| {
                if dist > 0.0 {
                    let dy = (pair[0].y() as f64 - pair[1].y() as f64).abs();
                    Some((dy / dist).min(1.0).asin().to_degrees())
                } else {
                    None
                }
            })
            .collect()
    }

    fn best_r(&self) -> BestR {
        let rank: Vec<f64> = (1..=self.mapped.len()).map(|r| r as f64).collect();
        let xs: Vec<f64> = self.mapped.iter().map(|m| m.x() as f64).collect();
        let ys: Vec<f64> = self.mapped.iter().map(|m| m.y() as f64).collect();

        let x = pearson_r(&rank, &xs);
        let y = pearson_r(&rank, &ys);
        let best = [x, y].into_iter().flatten().map(f64::abs).reduce(f64::max);
        BestR { best, x, y }
    }

    fn path_intersections(&self) -> Vec<Point> {
        let segments: Vec<Segment> = self
            .mapped
            .windows(2)
            .map(|pair| {
                Segment::from_coords(
                    pair[0].x() as f64,
                    pair[0].y() as f64,
                    pair[1].x() as f64,
                    pair[1].y() as f64,
                )
            })
            .collect();

        let mut points = Vec::new();
        for (i, first) in segments.iter().enumerate() {
            for second in &segments[i + 1..] {
                if let Some(point) = segment_intersection(first, second) {
                    points.push(point);
                }
            }
        }
        points
    }
}

/// `num / den`, absent when either side is absent or the divisor is zero.
fn ratio(num: Option<f64>, den: Option<f64>) -> Option<f64> {
    match (num, den) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cancellation_common::config::DisplaySize;
    use cancellation_dataset_model::click::RawClick;
    use cancellation_dataset_model::dataset::DatasetMeta;
    use cancellation_dataset_model::target::TargetSet;

    use crate::mapping::map_clicks;

    fn grid_targets() -> TargetSet {
        // 3x2 grid, 100 px apart.
        TargetSet::new([
            TargetPosition::new(100, 100),
            TargetPosition::new(200, 100),
            TargetPosition::new(300, 100),
            TargetPosition::new(100, 200),
            TargetPosition::new(200, 200),
            TargetPosition::new(300, 200),
        ])
    }

    fn dataset(clicks: Vec<RawClick>) -> Dataset {
        Dataset::new(
            "test",
            DatasetMeta::default(),
            clicks,
            grid_targets(),
            DisplaySize::new(400, 300),
        )
    }

    fn clicks_at(points: &[(i64, i64)]) -> Vec<RawClick> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| RawClick::new(1_000 * (i as i64 + 1), x, y))
            .collect()
    }

    fn report(points: &[(i64, i64)]) -> MetricsReport {
        let ds = dataset(clicks_at(points));
        let mapped = map_clicks(ds.clicks(), ds.targets(), 50.0);
        MetricsEngine::new(&ds, &mapped).run().unwrap()
    }

    #[test]
    fn test_omissions_split_by_midline() {
        let r = report(&[(100, 100), (200, 100)]);
        assert_eq!(r.omissions.total, 4);
        // Midline at x=200: (100,200) left, (300,100) and (300,200) right.
        assert_eq!(r.omissions.left, 1);
        assert_eq!(r.omissions.right, 2);
        assert!(!r.omissions.positions.contains(&TargetPosition::new(100, 100)));
    }

    #[test]
    fn test_perseverations() {
        // A A B A C C C
        let r = report(&[
            (100, 100),
            (101, 99),
            (200, 100),
            (100, 100),
            (300, 200),
            (300, 200),
            (302, 198),
        ]);
        assert_eq!(r.perseverations.total, 4);
        assert_eq!(r.perseverations.immediate, 3);
        assert_eq!(r.perseverations.delayed, 1);
    }

    #[test]
    fn test_inter_distance_excludes_perseverations() {
        let r = report(&[(100, 100), (100, 100), (200, 100), (200, 200)]);
        assert_eq!(r.mean_inter_distance, Some(100.0));
        assert_eq!(r.target_neighbour_distance, Some(100.0));
        assert_eq!(r.standardized_inter_distance, Some(1.0));
    }

    #[test]
    fn test_angles_horizontal_and_vertical() {
        let r = report(&[(100, 100), (200, 100), (200, 200)]);
        assert!((r.mean_angle.unwrap() - 45.0).abs() < 1e-9);
        assert!((r.standardized_angle.unwrap() - 1.0).abs() < 1e-9);

        let diagonal = report(&[(100, 100), (200, 200)]);
        assert!((diagonal.mean_angle.unwrap() - 45.0).abs() < 1e-9);
        assert!(diagonal.standardized_angle.unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_timing_and_speed() {
        let r = report(&[(100, 100), (200, 100), (300, 100)]);
        assert_eq!(r.mean_inter_time_ms, Some(1_000.0));
        assert!((r.search_speed.unwrap() - 0.1).abs() < 1e-12);
        // 3 of 6 found in 3 s: (3/6) * (3/3)
        assert!((r.q_score.unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_q_score_uses_whole_seconds() {
        let pair = || TargetSet::new([TargetPosition::new(10, 10), TargetPosition::new(60, 10)]);
        let run = |clicks: Vec<RawClick>| {
            let ds = Dataset::new(
                "q",
                DatasetMeta::default(),
                clicks,
                pair(),
                DisplaySize::new(100, 100),
            );
            let mapped = map_clicks(ds.clicks(), ds.targets(), 20.0);
            MetricsEngine::new(&ds, &mapped).run().unwrap()
        };

        // Both targets found, last click at 1.75 s: (2/2) * (2/1).
        let r = run(vec![RawClick::new(900, 10, 10), RawClick::new(1_750, 60, 10)]);
        assert_eq!(r.q_score, Some(2.0));

        // Under one whole second there is no rate to report.
        let quick = run(vec![RawClick::new(300, 10, 10), RawClick::new(850, 60, 10)]);
        assert_eq!(quick.q_score, None);
    }

    #[test]
    fn test_centre_of_cancellation() {
        let left_only = report(&[(100, 100), (100, 200)]);
        assert_eq!(left_only.centre.x, Some(-1.0));
        assert_eq!(left_only.centre.y, Some(0.0));

        let all = report(&[(100, 100), (200, 100), (300, 100)]);
        assert_eq!(all.centre.x, Some(0.0));
        assert_eq!(all.centre.y, Some(-1.0));
    }

    #[test]
    fn test_best_r_for_row_by_row_search() {
        let r = report(&[(100, 100), (200, 100), (300, 100)]);
        assert!((r.best_r.x.unwrap() - 1.0).abs() < 1e-9);
        assert!(r.best_r.y.is_none());
        assert!((r.best_r.best.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_crossing_path_counts_intersection() {
        // (100,100) -> (300,200) -> (300,100) -> (100,200): first and third segment cross.
        let r = report(&[(100, 100), (300, 200), (300, 100), (100, 200)]);
        assert_eq!(r.intersections.len(), 1);
        let p = r.intersections[0];
        assert!((p.x - 200.0).abs() < 1e-9);
        assert!((p.y - 150.0).abs() < 1e-9);
        assert_eq!(r.intersection_rate, Some(0.25));
    }

    #[test]
    fn test_no_cancellations_yields_absent_values() {
        let r = report(&[(900, 900)]);
        assert_eq!(r.cancellations, 0);
        assert_eq!(r.omissions.total, 6);
        assert_eq!(r.centre.x, None);
        assert_eq!(r.mean_inter_distance, None);
        assert_eq!(r.standardized_inter_distance, None);
        assert_eq!(r.search_speed, None);
        assert_eq!(r.mean_angle, None);
        assert_eq!(r.best_r.best, None);
        assert_eq!(r.intersection_rate, None);
        assert_eq!(r.q_score, Some(0.0));
    }

    #[test]
    fn test_single_target_has_no_neighbour_distance() {
        let ds = Dataset::new(
            "single",
            DatasetMeta::default(),
            clicks_at(&[(10, 10)]),
            TargetSet::new([TargetPosition::new(10, 10)]),
            DisplaySize::new(100, 100),
        );
        let mapped = map_clicks(ds.clicks(), ds.targets(), 50.0);
        let r = MetricsEngine::new(&ds, &mapped).run().unwrap();
        assert_eq!(r.target_neighbour_distance, None);
        assert_eq!(r.centre.x, None);
        assert_eq!(r.mean_inter_time_ms, None);
    }

    #[test]
    fn test_dependencies_are_evaluated_first() {
        let ds = dataset(clicks_at(&[(100, 100), (200, 200)]));
        let mapped = map_clicks(ds.clicks(), ds.targets(), 50.0);
        let mut engine = MetricsEngine::new(&ds, &mapped);
        engine.ensure(MetricId::SearchSpeed).unwrap();

        let order = engine.evaluation_order().to_vec();
        assert_eq!(
            order,
            vec![
                MetricId::InterDistances,
                MetricId::MeanInterDistance,
                MetricId::MeanInterTime,
                MetricId::SearchSpeed,
            ]
        );
        assert!(!engine.metrics().contains(MetricId::Omissions));
    }

    #[test]
    fn test_each_metric_computed_once() {
        let ds = dataset(clicks_at(&[(100, 100), (200, 200), (300, 100)]));
        let mapped = map_clicks(ds.clicks(), ds.targets(), 50.0);
        let mut engine = MetricsEngine::new(&ds, &mapped);
        engine.run().unwrap();
        engine.ensure(MetricId::StandardizedAngle).unwrap();

        let order = engine.evaluation_order();
        assert_eq!(order.len(), MetricId::ALL.len());
        for id in MetricId::ALL {
            let pos = order.iter().position(|o| *o == id).unwrap();
            for dep in id.dependencies() {
                let dep_pos = order.iter().position(|o| o == dep).unwrap();
                assert!(dep_pos < pos, "{dep} should precede {id}");
            }
        }
    }

    #[test]
    fn test_derived_metrics_serialize() {
        let ds = dataset(clicks_at(&[(100, 100)]));
        let mapped = map_clicks(ds.clicks(), ds.targets(), 50.0);
        let mut engine = MetricsEngine::new(&ds, &mapped);
        engine.run().unwrap();
        let json = serde_json::to_string(engine.metrics()).unwrap();
        assert!(json.contains("\"q_score\""));
        assert!(json.contains("\"kind\":\"scalar\""));
    }
}
