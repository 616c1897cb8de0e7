use proptest::prelude::*;

use cancellation_analysis_core::mapping::map_clicks;
use cancellation_analysis_core::metrics::{MetricsEngine, MetricsReport};
use cancellation_common::config::DisplaySize;
use cancellation_dataset_model::click::RawClick;
use cancellation_dataset_model::dataset::{Dataset, DatasetMeta};
use cancellation_dataset_model::target::{TargetPosition, TargetSet};

// Targets sit on a 40 px grid and clicks land within 5 px of one, so every
// click has a single nearest target whatever the file order.
const SPACING: i64 = 40;
const JITTER: i64 = 5;

fn grid_positions() -> impl Strategy<Value = Vec<TargetPosition>> {
    prop::collection::btree_set((0i64..19, 0i64..14), 2..40).prop_map(|cells| {
        cells
            .into_iter()
            .map(|(i, j)| TargetPosition::new(20 + i * SPACING, 20 + j * SPACING))
            .collect()
    })
}

/// Targets in file order, the same targets permuted, and a click log.
type Scenario = (Vec<TargetPosition>, Vec<TargetPosition>, Vec<RawClick>);

fn scenario() -> impl Strategy<Value = Scenario> {
    grid_positions().prop_flat_map(|positions| {
        let n = positions.len();
        let clicks = prop::collection::vec(
            (0..n, -JITTER..=JITTER, -JITTER..=JITTER, 1i64..3_000),
            0..50,
        );
        (Just(positions.clone()), Just(positions).prop_shuffle(), clicks)
    })
    .prop_map(|(ordered, shuffled, picks)| {
        let mut time = 0;
        let clicks = picks
            .into_iter()
            .map(|(k, dx, dy, dt)| {
                time += dt;
                RawClick::new(time, ordered[k].x + dx, ordered[k].y + dy)
            })
            .collect();
        (ordered, shuffled, clicks)
    })
}

fn run(targets: Vec<TargetPosition>, clicks: &[RawClick]) -> MetricsReport {
    let ds = Dataset::new(
        "order",
        DatasetMeta::default(),
        clicks.to_vec(),
        TargetSet::new(targets),
        DisplaySize::new(800, 600),
    );
    let mapped = map_clicks(ds.clicks(), ds.targets(), 50.0);
    MetricsEngine::new(&ds, &mapped).run().unwrap()
}

fn close(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).abs() < 1e-12,
        (None, None) => true,
        _ => false,
    }
}

proptest! {
    #[test]
    fn target_file_order_does_not_change_omissions_or_centre(
        (ordered, shuffled, clicks) in scenario(),
    ) {
        let a = run(ordered, &clicks);
        let b = run(shuffled, &clicks);

        prop_assert_eq!(a.omissions.total, b.omissions.total);
        prop_assert_eq!(a.omissions.left, b.omissions.left);
        prop_assert_eq!(a.omissions.right, b.omissions.right);
        prop_assert!(close(a.centre.x, b.centre.x), "{:?} vs {:?}", a.centre.x, b.centre.x);
        prop_assert!(close(a.centre.y, b.centre.y), "{:?} vs {:?}", a.centre.y, b.centre.y);
    }
}
