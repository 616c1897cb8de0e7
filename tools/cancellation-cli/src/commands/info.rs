//! Show dataset information.

use std::path::PathBuf;

use cancellation_common::config::AnalysisConfig;
use cancellation_dataset_model::dataset::LoadOutcome;
use cancellation_dataset_model::loader::DatasetLoader;
use cancellation_dataset_model::name::DatasetName;

pub fn run(path: PathBuf, config: AnalysisConfig) -> anyhow::Result<()> {
    let outcome = DatasetLoader::new(&config)
        .load(&path)
        .map_err(|e| anyhow::anyhow!("Failed to load dataset: {e}"))?;

    let dataset = match outcome {
        LoadOutcome::Empty(empty) => {
            println!("{}", empty.notice());
            return Ok(());
        }
        LoadOutcome::Ready(dataset) => dataset,
    };

    let name = DatasetName::parse(&dataset.name);
    println!("Dataset: {}", dataset.name);
    if name.has_timestamp() {
        println!("  Stored: {} {}", name.date, name.time);
    }
    println!();

    let meta = &dataset.meta;
    println!("Participant: {}", meta.participant);
    println!("  Task: {}", meta.task);
    println!("  Tested: {} {}", meta.test_date, meta.test_time);
    println!("  Input: {}", meta.input.as_str());
    println!("  Cancellations: {}", meta.visibility.as_str());
    println!();

    println!("Recording:");
    println!(
        "  Display: {}x{}",
        dataset.display.width, dataset.display.height
    );
    println!("  Clicks: {}", dataset.clicks().len());
    println!("  Targets: {}", dataset.targets().len());
    println!(
        "  Duration: {} ({} ms)",
        dataset.duration().hms_string(),
        dataset.duration().total_ms()
    );

    Ok(())
}
