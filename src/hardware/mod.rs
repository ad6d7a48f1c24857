// Hardware probing and snapshot aggregation
pub mod types;
pub mod snapshot;
pub mod probe;
pub mod collect_memory;
pub mod collect_cpu;
pub mod collect_block;
pub mod collect_topology;
pub mod collect_network;
pub mod collect_gpus;
pub mod collector;
mod pci;
mod util;

// Re-export main collection functions
pub use collect_memory::collect_memory_info;
pub use collect_cpu::collect_cpu_info;
pub use collect_block::collect_block_info;
pub use collect_topology::collect_topology_info;
pub use collect_network::collect_network_info;
pub use collect_gpus::collect_gpu_info;
pub use collector::{collect_snapshot, CollectOptions};
pub use probe::{HardwareProbe, ProbeOptions, SystemProbe};
pub use types::Category;
