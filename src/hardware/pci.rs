use std::path::Path;

use pciid_parser::Database;

use crate::hardware::probe::SystemProbe;
use crate::hardware::util::read_to_string_trim;

/// PCI ID database, loaded once per probe call.
pub(crate) struct PciNames {
    db: Option<Database>,
}

impl PciNames {
    pub fn load(probe: &SystemProbe) -> Self {
        match Database::read() {
            Ok(db) => Self { db: Some(db) },
            Err(e) => {
                probe.notice(&format!("PCI ID database unavailable: {e:?}"));
                Self { db: None }
            }
        }
    }

    /// Vendor and device names. An unknown device under a known vendor
    /// still reports the vendor.
    pub fn lookup(&self, vendor_id: u16, device_id: u16) -> (Option<String>, Option<String>) {
        let Some(vendor) = self.db.as_ref().and_then(|db| db.vendors.get(&vendor_id)) else {
            return (None, None);
        };

        let device_name = vendor
            .devices
            .get(&device_id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| format!("Unknown Device [0x{:04x}]", device_id));

        (Some(vendor.name.clone()), Some(device_name))
    }
}

/// `0x10de` -> 0x10de
pub(crate) fn read_hex_id(path: impl AsRef<Path>) -> Option<u16> {
    let content = read_to_string_trim(path)?;
    let hex_str = content.strip_prefix("0x").unwrap_or(&content);
    u16::from_str_radix(hex_str, 16).ok()
}

/// PCI address format: 0000:3b:00.0 (domain:bus:device.function)
pub(crate) fn is_pci_address(s: &str) -> bool {
    s.len() >= 12 && s.matches(':').count() == 2 && s.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pci_addresses() {
        assert!(is_pci_address("0000:3b:00.0"));
        assert!(!is_pci_address("pci0000:00"));
        assert!(!is_pci_address("virtual"));
    }

    #[test]
    fn hex_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vendor");
        std::fs::write(&path, "0x10de\n").unwrap();
        assert_eq!(read_hex_id(&path), Some(0x10de));
        std::fs::write(&path, "bogus\n").unwrap();
        assert_eq!(read_hex_id(&path), None);
    }

    #[test]
    fn empty_database_reports_nothing() {
        let names = PciNames { db: None };
        assert_eq!(names.lookup(0x10de, 0x2204), (None, None));
    }
}
