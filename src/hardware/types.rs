use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A hardware subsystem the snapshot can cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Memory,
    Cpu,
    Block,
    Topology,
    Network,
    Gpu,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Memory,
        Category::Cpu,
        Category::Block,
        Category::Topology,
        Category::Network,
        Category::Gpu,
    ];

    /// Key used for this category in the snapshot document.
    pub fn key(self) -> &'static str {
        match self {
            Category::Memory => "Memory",
            Category::Cpu => "CPU",
            Category::Block => "Block",
            Category::Topology => "Topology",
            Category::Network => "Network",
            Category::Gpu => "GPU",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MemoryInfo {
    pub total_bytes: u64,
    pub total_usable_bytes: u64,
    pub supported_page_sizes: Vec<u64>,
    pub modules: Vec<MemoryModule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MemoryModule {
    pub label: Option<String>,
    pub size_bytes: u64,
    #[serde(rename = "Type")]
    pub mem_type: Option<String>,
    #[serde(rename = "SpeedMTs")]
    pub speed_mt_s: Option<u32>,
    pub vendor: Option<String>,
    pub serial_number: Option<String>,
    pub part_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CpuInfo {
    pub total_cores: u32,
    pub total_threads: u32,
    pub processors: Vec<Processor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Processor {
    pub id: u32,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub num_cores: u32,
    pub num_threads: u32,
    pub capabilities: Vec<String>,
    pub cores: Vec<ProcessorCore>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessorCore {
    pub id: u32,
    pub logical_processors: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockInfo {
    pub total_physical_bytes: u64,
    pub disks: Vec<Disk>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Disk {
    pub name: String,
    pub size_bytes: u64,
    pub physical_block_size_bytes: Option<u64>,
    pub drive_type: DriveType,
    pub storage_controller: Option<String>, // "nvme", "scsi", "virtio", etc.
    pub removable: bool,
    pub numa_node: Option<u32>,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub wwn: Option<String>,
    pub partitions: Vec<Partition>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveType {
    #[default]
    Unknown,
    #[serde(rename = "HDD")]
    Hdd,
    #[serde(rename = "SSD")]
    Ssd,
    #[serde(rename = "ODD")]
    Odd,
    #[serde(rename = "FDD")]
    Fdd,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Partition {
    pub name: String,
    pub size_bytes: u64,
    pub mount_point: Option<String>,
    #[serde(rename = "Type")]
    pub fs_type: Option<String>,
    pub read_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopologyInfo {
    pub architecture: Architecture,
    pub nodes: Vec<TopologyNode>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Architecture {
    #[default]
    #[serde(rename = "SMP")]
    Smp,
    #[serde(rename = "NUMA")]
    Numa,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopologyNode {
    pub id: usize,
    pub logical_processors: Vec<usize>,
    pub memory_bytes: Option<u64>,
    pub distances: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkInfo {
    pub nics: Vec<Nic>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Nic {
    pub name: String,
    pub mac_address: Option<String>,
    pub is_virtual: bool,
    pub speed_mbps: Option<u32>,
    pub duplex: Option<String>,
    pub mtu: Option<u32>,
    pub driver: Option<String>,
    pub pci_address: Option<String>,
    pub vendor: Option<String>,
    pub product: Option<String>,
    pub addresses: Vec<IpAddress>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpAddress {
    pub family: String, // "IPv4" or "IPv6"
    pub address: String,
    pub prefix: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GpuInfo {
    pub cards: Vec<GraphicsCard>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GraphicsCard {
    pub index: usize,
    pub address: String,
    pub vendor_id: String,
    pub product_id: String,
    pub vendor: Option<String>,
    pub product: Option<String>,
    pub driver: Option<String>,
    pub numa_node: Option<u32>,
    pub vram_bytes: Option<u64>,
    pub driver_version: Option<String>,
    pub uuid: Option<String>,
}
