use std::time::Instant;

use tracing::{debug, warn};

use crate::error::ProbeError;
use crate::hardware::probe::HardwareProbe;
use crate::hardware::snapshot::{ErrorSet, Section, Snapshot};
use crate::hardware::types::{
    BlockInfo, Category, CpuInfo, GpuInfo, MemoryInfo, NetworkInfo, TopologyInfo,
};

/// Which categories to probe and how.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub categories: Vec<Category>,
    pub parallel: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            categories: Category::ALL.to_vec(),
            parallel: false,
        }
    }
}

impl CollectOptions {
    fn enabled(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}

type Outcome<T> = Option<Result<T, ProbeError>>;

/// Raw probe results before they are folded into a snapshot.
#[derive(Default)]
struct Outcomes {
    memory: Outcome<MemoryInfo>,
    cpu: Outcome<CpuInfo>,
    block: Outcome<BlockInfo>,
    topology: Outcome<TopologyInfo>,
    network: Outcome<NetworkInfo>,
    gpu: Outcome<GpuInfo>,
}

/// Run every enabled probe once and fold the results into a [`Snapshot`].
///
/// A failing probe never stops the others; its error text is recorded in
/// the snapshot's error set instead.
pub fn collect_snapshot<P: HardwareProbe>(probe: &P, options: &CollectOptions) -> Snapshot {
    let outcomes = if options.parallel {
        run_parallel(probe, options)
    } else {
        run_sequential(probe, options)
    };

    let mut errors = ErrorSet::default();
    let snapshot = Snapshot {
        memory: settle(Category::Memory, outcomes.memory, &mut errors),
        cpu: settle(Category::Cpu, outcomes.cpu, &mut errors),
        block: settle(Category::Block, outcomes.block, &mut errors),
        topology: settle(Category::Topology, outcomes.topology, &mut errors),
        network: settle(Category::Network, outcomes.network, &mut errors),
        gpu: settle(Category::Gpu, outcomes.gpu, &mut errors),
        errors,
    };

    // a category has an error entry exactly when its section failed
    debug_assert!(Category::ALL
        .iter()
        .all(|c| snapshot.is_failed(*c) == snapshot.errors.get(*c).is_some()));
    debug!(clean = snapshot.errors.is_empty(), "snapshot assembled");

    snapshot
}

fn run_sequential<P: HardwareProbe>(probe: &P, options: &CollectOptions) -> Outcomes {
    Outcomes {
        memory: attempt(options, Category::Memory, || probe.memory()),
        cpu: attempt(options, Category::Cpu, || probe.cpu()),
        block: attempt(options, Category::Block, || probe.block()),
        topology: attempt(options, Category::Topology, || probe.topology()),
        network: attempt(options, Category::Network, || probe.network()),
        gpu: attempt(options, Category::Gpu, || probe.gpu()),
    }
}

/// Each task writes a disjoint slot; the scope joins them all before returning.
fn run_parallel<P: HardwareProbe>(probe: &P, options: &CollectOptions) -> Outcomes {
    let mut outcomes = Outcomes::default();
    {
        let Outcomes {
            memory,
            cpu,
            block,
            topology,
            network,
            gpu,
        } = &mut outcomes;

        rayon::scope(|s| {
            s.spawn(move |_| *memory = attempt(options, Category::Memory, || probe.memory()));
            s.spawn(move |_| *cpu = attempt(options, Category::Cpu, || probe.cpu()));
            s.spawn(move |_| *block = attempt(options, Category::Block, || probe.block()));
            s.spawn(move |_| *topology = attempt(options, Category::Topology, || probe.topology()));
            s.spawn(move |_| *network = attempt(options, Category::Network, || probe.network()));
            s.spawn(move |_| *gpu = attempt(options, Category::Gpu, || probe.gpu()));
        });
    }
    outcomes
}

fn attempt<T>(
    options: &CollectOptions,
    category: Category,
    run: impl FnOnce() -> Result<T, ProbeError>,
) -> Outcome<T> {
    if !options.enabled(category) {
        return None;
    }

    let start = Instant::now();
    let result = run();
    debug!(%category, elapsed = ?start.elapsed(), ok = result.is_ok(), "probe finished");
    Some(result)
}

fn settle<T>(category: Category, outcome: Outcome<T>, errors: &mut ErrorSet) -> Section<T> {
    match outcome {
        None => Section::Disabled,
        Some(Ok(value)) => Section::Present(value),
        Some(Err(e)) => {
            warn!(%category, error = %e, "probe failed");
            errors.set(category, e.to_string());
            Section::Failed
        }
    }
}
