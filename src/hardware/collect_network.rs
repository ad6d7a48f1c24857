use std::collections::HashMap;
use std::fs;
use std::path::Path;

use sysinfo::Networks;

use crate::error::ProbeError;
use crate::hardware::pci::{is_pci_address, read_hex_id, PciNames};
use crate::hardware::probe::SystemProbe;
use crate::hardware::types::{IpAddress, NetworkInfo, Nic};
use crate::hardware::util::{dir_names, link_name, read_opt, read_to_string_trim};

/// Entry point: every interface under /sys/class/net, virtual ones flagged.
pub fn collect_network_info(probe: &SystemProbe) -> Result<NetworkInfo, ProbeError> {
    let names = dir_names(probe.path("/sys/class/net"))?;

    let pci = PciNames::load(probe);
    let mut addresses = if probe.is_live_root() {
        collect_ip_addrs()
    } else {
        HashMap::new()
    };

    let nics = names
        .into_iter()
        .map(|name| {
            let iface_sys_path = probe.path(format!("/sys/class/net/{name}"));
            let device_path = iface_sys_path.join("device");

            let (vendor, product) = match (
                read_hex_id(device_path.join("vendor")),
                read_hex_id(device_path.join("device")),
            ) {
                (Some(vendor_id), Some(device_id)) => pci.lookup(vendor_id, device_id),
                _ => (None, None),
            };

            Nic {
                mac_address: read_to_string_trim(iface_sys_path.join("address")),
                is_virtual: is_virtual_interface(&iface_sys_path),
                // the kernel reports -1 for links that are down
                speed_mbps: read_opt::<i64>(iface_sys_path.join("speed"))
                    .and_then(|s| u32::try_from(s).ok()),
                duplex: read_to_string_trim(iface_sys_path.join("duplex"))
                    .filter(|d| d != "unknown"),
                mtu: read_opt(iface_sys_path.join("mtu")),
                driver: link_name(device_path.join("driver")),
                pci_address: read_pci_address(&device_path),
                vendor,
                product,
                addresses: addresses.remove(&name).unwrap_or_default(),
                name,
            }
        })
        .collect();

    Ok(NetworkInfo { nics })
}

/// Virtual interfaces live under /sys/devices/virtual and have no backing device.
fn is_virtual_interface(iface_sys_path: &Path) -> bool {
    if let Ok(target) = fs::read_link(iface_sys_path) {
        if target.components().any(|c| c.as_os_str() == "virtual") {
            return true;
        }
    }
    !iface_sys_path.join("device").exists()
}

/// Follow the `device` symlink and pick out the PCI address component.
fn read_pci_address(device_path: &Path) -> Option<String> {
    let link_target = fs::read_link(device_path).ok()?;

    link_target
        .components()
        .filter_map(|component| component.as_os_str().to_str())
        .filter(|name| is_pci_address(name))
        .last()
        .map(|name| name.to_string())
}

fn collect_ip_addrs() -> HashMap<String, Vec<IpAddress>> {
    let networks = Networks::new_with_refreshed_list();

    networks
        .list()
        .iter()
        .map(|(name, data)| {
            let mut addrs: Vec<IpAddress> = data
                .ip_networks()
                .iter()
                .map(|network| IpAddress {
                    family: if network.addr.is_ipv4() { "IPv4" } else { "IPv6" }.to_string(),
                    address: network.addr.to_string(),
                    prefix: network.prefix,
                })
                .collect();
            addrs.sort_by(|a, b| (&a.family, &a.address).cmp(&(&b.family, &b.address)));
            (name.clone(), addrs)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::probe::fixture::Fixture;

    #[test]
    fn physical_and_virtual_interfaces() {
        let fixture = Fixture::new();
        fixture
            .write("/sys/class/net/eth0/address", "52:54:00:12:34:56\n")
            .write("/sys/class/net/eth0/mtu", "1500\n")
            .write("/sys/class/net/eth0/speed", "25000\n")
            .write("/sys/class/net/eth0/duplex", "full\n")
            .symlink("../../../bus/pci/drivers/mlx5_core", "/sys/class/net/eth0/device/driver")
            .write("/sys/class/net/lo/address", "00:00:00:00:00:00\n")
            .write("/sys/class/net/lo/mtu", "65536\n")
            .write("/sys/class/net/lo/speed", "-1\n")
            .write("/sys/class/net/lo/duplex", "unknown\n");

        let network = collect_network_info(&fixture.probe()).unwrap();

        assert_eq!(network.nics.len(), 2);

        let eth0 = &network.nics[0];
        assert_eq!(eth0.name, "eth0");
        assert!(!eth0.is_virtual);
        assert_eq!(eth0.speed_mbps, Some(25000));
        assert_eq!(eth0.duplex.as_deref(), Some("full"));
        assert_eq!(eth0.mtu, Some(1500));
        assert_eq!(eth0.driver.as_deref(), Some("mlx5_core"));
        assert!(eth0.addresses.is_empty());

        let lo = &network.nics[1];
        assert!(lo.is_virtual);
        assert_eq!(lo.speed_mbps, None);
        assert_eq!(lo.duplex, None);
    }

    #[test]
    fn pci_address_from_device_link() {
        let fixture = Fixture::new();
        fixture.symlink(
            "../../../devices/pci0000:00/0000:00:03.0/0000:3b:00.0",
            "/sys/class/net/ens3/device",
        );
        let device_path = fixture.dir.path().join("sys/class/net/ens3/device");

        assert_eq!(
            read_pci_address(&device_path).as_deref(),
            Some("0000:3b:00.0")
        );
    }

    #[test]
    fn missing_class_net_fails() {
        let fixture = Fixture::new();
        assert!(collect_network_info(&fixture.probe()).is_err());
    }
}
