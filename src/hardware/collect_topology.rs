use std::path::Path;

use crate::error::ProbeError;
use crate::hardware::probe::SystemProbe;
use crate::hardware::types::{Architecture, TopologyInfo, TopologyNode};
use crate::hardware::util::{read_list, read_to_string_trim};

pub fn collect_topology_info(probe: &SystemProbe) -> Result<TopologyInfo, ProbeError> {
    let mut nodes = Vec::new();

    if let Ok(ids) = read_list(probe.path("/sys/devices/system/node/online")) {
        for id in ids {
            let node_path = probe.path(format!("/sys/devices/system/node/node{id}"));
            nodes.push(TopologyNode {
                id,
                logical_processors: read_list(node_path.join("cpulist"))?,
                memory_bytes: node_memory_bytes(&node_path.join("meminfo")),
                distances: read_distances(&node_path.join("distance")),
            });
        }
    }

    if nodes.is_empty() {
        // Some platforms don't expose node topology. Treat every online cpu
        // as part of a single node.
        let online = probe.path("/sys/devices/system/cpu/online");
        let cpus = read_list(&online)?;
        if cpus.is_empty() {
            return Err(ProbeError::Unavailable(format!(
                "no NUMA nodes and {} lists no CPUs",
                online.display()
            )));
        }
        return Ok(TopologyInfo {
            architecture: Architecture::Smp,
            nodes: vec![TopologyNode {
                id: 0,
                logical_processors: cpus,
                memory_bytes: None,
                distances: vec![10],
            }],
        });
    }

    let architecture = if nodes.len() > 1 {
        Architecture::Numa
    } else {
        Architecture::Smp
    };

    Ok(TopologyInfo {
        architecture,
        nodes,
    })
}

/// Per-node meminfo lines look like `Node 0 MemTotal:       32856524 kB`.
fn node_memory_bytes(path: &Path) -> Option<u64> {
    let text = read_to_string_trim(path)?;
    text.lines().find_map(|line| {
        let (_, rest) = line.split_once("MemTotal:")?;
        let kilobytes: u64 = rest.split_whitespace().next()?.parse().ok()?;
        Some(kilobytes * 1024)
    })
}

fn read_distances(path: &Path) -> Vec<u32> {
    read_to_string_trim(path)
        .map(|text| {
            text.split_whitespace()
                .filter_map(|d| d.parse().ok())
                .collect()
        })
        .unwrap_or_default()
}
