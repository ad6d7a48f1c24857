use std::fs;
use std::path::Path;

use procfs::{FromRead, Meminfo};
use smbioslib::*;

use crate::error::ProbeError;
use crate::hardware::probe::SystemProbe;
use crate::hardware::types::{MemoryInfo, MemoryModule};
use crate::hardware::util::dir_names;

const DMI_TABLE: &str = "/sys/firmware/dmi/tables/DMI";
const MIB: u64 = 1024 * 1024;

pub fn collect_memory_info(probe: &SystemProbe) -> Result<MemoryInfo, ProbeError> {
    let meminfo = Meminfo::from_file(probe.path("/proc/meminfo"))?;
    let total_usable_bytes = meminfo.mem_total;

    let modules = match load_smbios(&probe.path(DMI_TABLE)) {
        Some(smbios) => collect_modules(&smbios),
        None => {
            probe.notice("SMBIOS table unavailable; physical memory falls back to usable memory");
            Vec::new()
        }
    };

    // Installed DIMMs describe physical memory better than MemTotal, which
    // excludes firmware and kernel reservations.
    let installed: u64 = modules.iter().map(|m| m.size_bytes).sum();
    let total_bytes = if installed > 0 {
        installed
    } else {
        total_usable_bytes
    };

    Ok(MemoryInfo {
        total_bytes,
        total_usable_bytes,
        supported_page_sizes: supported_page_sizes(probe),
        modules,
    })
}

fn load_smbios(path: &Path) -> Option<SMBiosData> {
    match SMBiosData::try_load_from_file(&path.to_string_lossy(), None) {
        Ok(data) => Some(data),
        Err(_) => fs::read(path)
            .ok()
            .map(|table_data| SMBiosData::from_vec_and_version(table_data, None)),
    }
}

fn collect_modules(smbios: &SMBiosData) -> Vec<MemoryModule> {
    smbios
        .iter()
        .filter_map(|structure| match structure.defined_struct() {
            DefinedStruct::MemoryDevice(device) => memory_module(&device),
            _ => None,
        })
        .collect()
}

/// Empty slots report no size and are skipped.
fn memory_module(device: &SMBiosMemoryDevice) -> Option<MemoryModule> {
    let size_bytes = module_size_bytes(device)?;

    let mem_type = device
        .memory_type()
        .map(|t| format!("{:?}", t.value).to_uppercase())
        .filter(|t| t != "UNKNOWN" && t != "OTHER");

    let speed = device
        .configured_memory_speed()
        .and_then(speed_mt_s)
        .or_else(|| device.speed().and_then(speed_mt_s));

    Some(MemoryModule {
        label: smbios_string(device.device_locator()),
        size_bytes,
        mem_type,
        speed_mt_s: speed,
        vendor: smbios_string(device.manufacturer()),
        serial_number: smbios_string(device.serial_number()),
        part_number: smbios_string(device.part_number()),
    })
}

fn module_size_bytes(device: &SMBiosMemoryDevice) -> Option<u64> {
    let extended = || match device.extended_size() {
        Some(MemorySizeExtended::Megabytes(mb)) if mb > 0 => Some(mb as u64 * MIB),
        _ => None,
    };

    match device.size()? {
        MemorySize::Kilobytes(kb) if kb > 0 => Some(kb as u64 * 1024),
        // 0x7FFF means the real size lives in the extended field
        MemorySize::Megabytes(0x7FFF) | MemorySize::SeeExtendedSize => extended(),
        MemorySize::Megabytes(mb) if mb > 0 => Some(mb as u64 * MIB),
        _ => None,
    }
}

fn speed_mt_s(speed: MemorySpeed) -> Option<u32> {
    match speed {
        MemorySpeed::MTs(mts) if mts > 0 => Some(mts as u32),
        _ => None,
    }
}

fn smbios_string(value: SMBiosString) -> Option<String> {
    value
        .to_utf8_lossy()
        .map(|s| s.trim().to_string())
        .filter(|s| !is_placeholder(s))
}

fn is_placeholder(value: &str) -> bool {
    matches!(
        value,
        "" | "Not Specified" | "Unknown" | "To Be Filled By O.E.M." | "Default string"
    )
}

/// Base page size followed by every huge page size the kernel offers.
fn supported_page_sizes(probe: &SystemProbe) -> Vec<u64> {
    let mut sizes = vec![procfs::page_size()];

    if let Ok(names) = dir_names(probe.path("/sys/kernel/mm/hugepages")) {
        sizes.extend(names.iter().filter_map(|name| parse_hugepage_dir(name)));
    }

    sizes.sort_unstable();
    sizes.dedup();
    sizes
}

/// `hugepages-2048kB` -> 2 MiB in bytes.
fn parse_hugepage_dir(name: &str) -> Option<u64> {
    let kb = name.strip_prefix("hugepages-")?.strip_suffix("kB")?;
    kb.parse::<u64>().ok().map(|kb| kb * 1024)
}
