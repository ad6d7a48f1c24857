use std::path::{Path, PathBuf};

use crate::error::ProbeError;
use crate::hardware::types::{BlockInfo, CpuInfo, GpuInfo, MemoryInfo, NetworkInfo, TopologyInfo};
use crate::hardware::{
    collect_block_info, collect_cpu_info, collect_gpu_info, collect_memory_info,
    collect_network_info, collect_topology_info,
};

/// Six independent, read-only hardware queries.
///
/// Implementations must be `Sync` so the aggregator can issue the queries
/// from several threads at once.
pub trait HardwareProbe: Sync {
    fn memory(&self) -> Result<MemoryInfo, ProbeError>;
    fn cpu(&self) -> Result<CpuInfo, ProbeError>;
    fn block(&self) -> Result<BlockInfo, ProbeError>;
    fn topology(&self) -> Result<TopologyInfo, ProbeError>;
    fn network(&self) -> Result<NetworkInfo, ProbeError>;
    fn gpu(&self) -> Result<GpuInfo, ProbeError>;
}

#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Directory that stands in for `/` when reading `/proc`, `/sys` and firmware tables.
    pub root: PathBuf,
    /// Demote the facility's degradation notices to debug level.
    pub disable_warnings: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/"),
            disable_warnings: true,
        }
    }
}

/// Probe backed by the running Linux host.
#[derive(Debug, Clone, Default)]
pub struct SystemProbe {
    options: ProbeOptions,
}

impl SystemProbe {
    pub fn new(options: ProbeOptions) -> Self {
        Self { options }
    }

    /// Resolve an absolute host path below the configured root.
    pub(crate) fn path(&self, absolute: impl AsRef<Path>) -> PathBuf {
        let absolute = absolute.as_ref();
        let relative = absolute.strip_prefix("/").unwrap_or(absolute);
        self.options.root.join(relative)
    }

    /// Host-only facilities (NVML, kernel address tables) can't be redirected
    /// to another root, so they are skipped unless probing `/`.
    pub(crate) fn is_live_root(&self) -> bool {
        self.options.root == Path::new("/")
    }

    pub(crate) fn notice(&self, message: &str) {
        if self.options.disable_warnings {
            tracing::debug!("{message}");
        } else {
            tracing::warn!("{message}");
        }
    }
}

impl HardwareProbe for SystemProbe {
    fn memory(&self) -> Result<MemoryInfo, ProbeError> {
        collect_memory_info(self)
    }

    fn cpu(&self) -> Result<CpuInfo, ProbeError> {
        collect_cpu_info(self)
    }

    fn block(&self) -> Result<BlockInfo, ProbeError> {
        collect_block_info(self)
    }

    fn topology(&self) -> Result<TopologyInfo, ProbeError> {
        collect_topology_info(self)
    }

    fn network(&self) -> Result<NetworkInfo, ProbeError> {
        collect_network_info(self)
    }

    fn gpu(&self) -> Result<GpuInfo, ProbeError> {
        collect_gpu_info(self)
    }
}
