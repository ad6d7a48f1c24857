use std::collections::BTreeMap;

use procfs::{CpuInfo as ProcCpuInfo, FromRead};

use crate::error::ProbeError;
use crate::hardware::probe::SystemProbe;
use crate::hardware::types::{CpuInfo, Processor, ProcessorCore};
use crate::hardware::util::read_opt;

#[derive(Default)]
struct Package {
    vendor: Option<String>,
    model: Option<String>,
    capabilities: Vec<String>,
    cores: BTreeMap<u32, Vec<usize>>,
}

pub fn collect_cpu_info(probe: &SystemProbe) -> Result<CpuInfo, ProbeError> {
    let path = probe.path("/proc/cpuinfo");
    let cpuinfo = ProcCpuInfo::from_file(&path)?;

    // procfs always yields at least one entry, even for an empty file, so
    // only entries carrying a processor number count.
    let entries: Vec<(usize, usize)> = (0..cpuinfo.num_cores())
        .filter_map(|index| {
            let logical = cpuinfo.get_field(index, "processor")?.parse().ok()?;
            Some((index, logical))
        })
        .collect();

    if entries.is_empty() {
        return Err(ProbeError::unparseable("no processor entries", &path));
    }

    let mut packages: BTreeMap<u32, Package> = BTreeMap::new();

    for (index, logical) in entries {
        let topology = format!("/sys/devices/system/cpu/cpu{logical}/topology");

        // sysfs is authoritative; cpuinfo lacks topology on some architectures
        let package_id = read_opt::<u32>(probe.path(format!("{topology}/physical_package_id")))
            .or_else(|| cpuinfo.physical_id(index))
            .unwrap_or(0);
        let core_id = read_opt::<u32>(probe.path(format!("{topology}/core_id")))
            .or_else(|| {
                cpuinfo
                    .get_field(index, "core id")
                    .and_then(|v| v.parse().ok())
            })
            .unwrap_or(logical as u32);

        let package = packages.entry(package_id).or_default();

        if package.vendor.is_none() {
            package.vendor = cpuinfo
                .get_field(index, "vendor_id")
                .or_else(|| cpuinfo.get_field(index, "CPU implementer"))
                .map(|s| s.to_string());
        }
        if package.model.is_none() {
            package.model = cpuinfo
                .get_field(index, "model name")
                .or_else(|| cpuinfo.get_field(index, "Processor"))
                .map(|s| s.to_string());
        }
        if package.capabilities.is_empty() {
            package.capabilities = cpuinfo
                .get_field(index, "flags")
                .or_else(|| cpuinfo.get_field(index, "Features"))
                .map(|flags| flags.split_whitespace().map(|s| s.to_string()).collect())
                .unwrap_or_default();
        }

        package.cores.entry(core_id).or_default().push(logical);
    }

    let processors: Vec<Processor> = packages
        .into_iter()
        .map(|(id, package)| {
            let num_threads = package.cores.values().map(|l| l.len() as u32).sum();
            let cores: Vec<ProcessorCore> = package
                .cores
                .into_iter()
                .map(|(id, mut logical_processors)| {
                    logical_processors.sort_unstable();
                    ProcessorCore {
                        id,
                        logical_processors,
                    }
                })
                .collect();

            Processor {
                id,
                vendor: package.vendor,
                model: package.model,
                num_cores: cores.len() as u32,
                num_threads,
                capabilities: package.capabilities,
                cores,
            }
        })
        .collect();

    Ok(CpuInfo {
        total_cores: processors.iter().map(|p| p.num_cores).sum(),
        total_threads: processors.iter().map(|p| p.num_threads).sum(),
        processors,
    })
}
