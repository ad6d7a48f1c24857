use nvml_wrapper::Nvml;

use crate::error::ProbeError;
use crate::hardware::pci::{read_hex_id, PciNames};
use crate::hardware::probe::SystemProbe;
use crate::hardware::types::{GpuInfo, GraphicsCard};
use crate::hardware::util::{dir_names, link_name, read_numa_node, read_opt, read_to_string_trim};

const NVIDIA_VENDOR_ID: &str = "10de";

pub fn collect_gpu_info(probe: &SystemProbe) -> Result<GpuInfo, ProbeError> {
    // Scan PCI devices in /sys/bus/pci/devices for display controllers
    let addresses = dir_names(probe.path("/sys/bus/pci/devices"))?;
    let pci = PciNames::load(probe);

    let mut cards = Vec::new();
    for address in addresses {
        let device_path = probe.path(format!("/sys/bus/pci/devices/{address}"));

        let Some(class_id) = read_to_string_trim(device_path.join("class")) else {
            continue;
        };
        if !is_gpu_class(&class_id) {
            continue;
        }

        let (Some(vendor_id), Some(device_id)) = (
            read_hex_id(device_path.join("vendor")),
            read_hex_id(device_path.join("device")),
        ) else {
            continue;
        };
        let (vendor, product) = pci.lookup(vendor_id, device_id);

        cards.push(GraphicsCard {
            index: cards.len(),
            address,
            vendor_id: format!("{vendor_id:04x}"),
            product_id: format!("{device_id:04x}"),
            vendor,
            product,
            driver: link_name(device_path.join("driver")),
            numa_node: read_numa_node(device_path.join("numa_node")),
            // amdgpu exposes VRAM size directly; NVIDIA needs NVML
            vram_bytes: read_opt(device_path.join("mem_info_vram_total")),
            driver_version: None,
            uuid: None,
        });
    }

    if probe.is_live_root() && cards.iter().any(|c| c.vendor_id == NVIDIA_VENDOR_ID) {
        enhance_with_nvml(probe, &mut cards);
    }

    Ok(GpuInfo { cards })
}

/// GPU PCI classes:
/// 0x0300xx - VGA compatible controller
/// 0x0302xx - 3D controller
/// 0x0380xx - Display controller
fn is_gpu_class(class_id: &str) -> bool {
    class_id.starts_with("0x0300") || class_id.starts_with("0x0302") || class_id.starts_with("0x0380")
}

fn enhance_with_nvml(probe: &SystemProbe, cards: &mut [GraphicsCard]) {
    let nvml = match Nvml::init() {
        Ok(nvml) => nvml,
        Err(e) => {
            probe.notice(&format!("NVML unavailable: {e}"));
            return;
        }
    };

    let driver_version = nvml.sys_driver_version().ok();
    let Ok(device_count) = nvml.device_count() else {
        return;
    };

    for i in 0..device_count {
        let Ok(device) = nvml.device_by_index(i) else {
            continue;
        };
        let Ok(pci_info) = device.pci_info() else {
            continue;
        };

        // NVML pads the domain to eight digits: 00000000:3b:00.0
        let bus_id = pci_info.bus_id.to_lowercase();
        if let Some(card) = cards.iter_mut().find(|c| bus_id.ends_with(&c.address)) {
            card.vram_bytes = device.memory_info().ok().map(|m| m.total);
            card.uuid = device.uuid().ok();
            card.driver_version = driver_version.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::probe::fixture::Fixture;

    #[test]
    fn gpu_classes() {
        assert!(is_gpu_class("0x030000"));
        assert!(is_gpu_class("0x030200"));
        assert!(is_gpu_class("0x038000"));
        assert!(!is_gpu_class("0x020000"));
        assert!(!is_gpu_class("0x010802"));
    }

    #[test]
    fn picks_display_devices_only() {
        let fixture = Fixture::new();
        fixture
            .write("/sys/bus/pci/devices/0000:00:02.0/class", "0x030000\n")
            .write("/sys/bus/pci/devices/0000:00:02.0/vendor", "0x8086\n")
            .write("/sys/bus/pci/devices/0000:00:02.0/device", "0x9a49\n")
            .write("/sys/bus/pci/devices/0000:00:02.0/numa_node", "-1\n")
            .symlink("../../../bus/pci/drivers/i915", "/sys/bus/pci/devices/0000:00:02.0/driver")
            .write("/sys/bus/pci/devices/0000:03:00.0/class", "0x030000\n")
            .write("/sys/bus/pci/devices/0000:03:00.0/vendor", "0x1002\n")
            .write("/sys/bus/pci/devices/0000:03:00.0/device", "0x73bf\n")
            .write("/sys/bus/pci/devices/0000:03:00.0/numa_node", "0\n")
            .write("/sys/bus/pci/devices/0000:03:00.0/mem_info_vram_total", "17163091968\n")
            .write("/sys/bus/pci/devices/0000:3b:00.0/class", "0x020000\n")
            .write("/sys/bus/pci/devices/0000:3b:00.0/vendor", "0x15b3\n")
            .write("/sys/bus/pci/devices/0000:3b:00.0/device", "0x101d\n");

        let gpu = collect_gpu_info(&fixture.probe()).unwrap();

        assert_eq!(gpu.cards.len(), 2);

        let intel = &gpu.cards[0];
        assert_eq!(intel.index, 0);
        assert_eq!(intel.address, "0000:00:02.0");
        assert_eq!(intel.vendor_id, "8086");
        assert_eq!(intel.product_id, "9a49");
        assert_eq!(intel.driver.as_deref(), Some("i915"));
        assert_eq!(intel.numa_node, None);

        let amd = &gpu.cards[1];
        assert_eq!(amd.index, 1);
        assert_eq!(amd.numa_node, Some(0));
        assert_eq!(amd.vram_bytes, Some(17163091968));
        assert_eq!(amd.uuid, None);
    }

    #[test]
    fn missing_pci_bus_fails() {
        let fixture = Fixture::new();
        assert!(collect_gpu_info(&fixture.probe()).is_err());
    }
}
