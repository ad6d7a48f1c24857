use crate::config::{OutputFormat, Settings};
use crate::error::AppError;
use crate::hardware::{collect_snapshot, Category, HardwareProbe};
use crate::output::{output_document, render};

/// Collect every enabled category and render the snapshot as one document.
pub fn run<P: HardwareProbe>(probe: &P, settings: &Settings) -> Result<String, AppError> {
    let snapshot = collect_snapshot(probe, &settings.collect);
    render(&snapshot, settings.format)
}

pub fn handle_snapshot_command<P: HardwareProbe>(
    probe: &P,
    settings: &Settings,
) -> Result<(), AppError> {
    let document = run(probe, settings)?;
    output_document(&document)
}

/// Probe a single category. Unlike the snapshot, a failure here is fatal.
pub fn run_category<P: HardwareProbe>(
    probe: &P,
    category: Category,
    format: OutputFormat,
) -> Result<String, AppError> {
    let fail = |source| AppError::Probe { category, source };
    match category {
        Category::Memory => render(&probe.memory().map_err(fail)?, format),
        Category::Cpu => render(&probe.cpu().map_err(fail)?, format),
        Category::Block => render(&probe.block().map_err(fail)?, format),
        Category::Topology => render(&probe.topology().map_err(fail)?, format),
        Category::Network => render(&probe.network().map_err(fail)?, format),
        Category::Gpu => render(&probe.gpu().map_err(fail)?, format),
    }
}

pub fn handle_category_command<P: HardwareProbe>(
    probe: &P,
    category: Category,
    format: OutputFormat,
) -> Result<(), AppError> {
    let document = run_category(probe, category, format)?;
    output_document(&document)
}
