use std::collections::HashMap;
use std::path::Path;

use crate::error::ProbeError;
use crate::hardware::probe::SystemProbe;
use crate::hardware::types::{BlockInfo, Disk, DriveType, Partition};
use crate::hardware::util::{dir_names, link_name, read_numa_node, read_opt, read_to_string_trim};

const SECTOR_SIZE: u64 = 512;

/// Mount point and filesystem type, keyed by device node.
type MountTable = HashMap<String, (String, String)>;

/// Entry point: collect every non-virtual block device.
pub fn collect_block_info(probe: &SystemProbe) -> Result<BlockInfo, ProbeError> {
    let names = dir_names(probe.path("/sys/block"))?;

    let mounts = read_to_string_trim(probe.path("/proc/self/mounts"))
        .map(|text| parse_mounts(&text))
        .unwrap_or_default();

    let disks: Vec<Disk> = names
        .iter()
        .filter(|name| !is_virtual_device(name))
        .map(|name| collect_single_disk(probe, name, &mounts))
        .collect();

    Ok(BlockInfo {
        total_physical_bytes: disks.iter().map(|d| d.size_bytes).sum(),
        disks,
    })
}

fn is_virtual_device(name: &str) -> bool {
    name.starts_with("loop")
        || name.starts_with("ram")
        || name.starts_with("dm-")
        || name.starts_with("zram")
}

fn collect_single_disk(probe: &SystemProbe, name: &str, mounts: &MountTable) -> Disk {
    let sys_path = probe.path(format!("/sys/block/{name}"));
    let device_path = sys_path.join("device");

    let size_bytes = read_opt::<u64>(sys_path.join("size")).unwrap_or(0) * SECTOR_SIZE;
    let rotational = read_opt::<u8>(sys_path.join("queue/rotational")).map(|v| v == 1);

    let mut serial_number = read_to_string_trim(device_path.join("serial"));
    let storage_controller = if name.starts_with("nvme") {
        // namespace "nvme0n1" -> controller "nvme0"
        if let Some(controller) = name.rfind('n').map(|i| &name[..i]) {
            let ctrl_path = probe.path(format!("/sys/class/nvme/{controller}"));
            serial_number = serial_number.or_else(|| read_to_string_trim(ctrl_path.join("serial")));
        }
        Some("nvme".to_string())
    } else {
        detect_bus_type(name, &device_path)
    };

    Disk {
        name: name.to_string(),
        size_bytes,
        physical_block_size_bytes: read_opt(sys_path.join("queue/physical_block_size")),
        drive_type: drive_type(name, rotational),
        storage_controller,
        removable: read_opt::<u8>(sys_path.join("removable")) == Some(1),
        numa_node: read_numa_node(device_path.join("numa_node")),
        vendor: read_to_string_trim(device_path.join("vendor")),
        model: read_to_string_trim(device_path.join("model")),
        serial_number,
        wwn: read_to_string_trim(device_path.join("wwid"))
            .or_else(|| read_to_string_trim(sys_path.join("wwid"))),
        partitions: collect_partitions(&sys_path, name, mounts),
    }
}

fn drive_type(name: &str, rotational: Option<bool>) -> DriveType {
    if name.starts_with("sr") {
        return DriveType::Odd;
    }
    if name.starts_with("fd") {
        return DriveType::Fdd;
    }
    match rotational {
        Some(true) => DriveType::Hdd,
        Some(false) => DriveType::Ssd,
        None => DriveType::Unknown,
    }
}

/// The `subsystem` symlink names the bus: "scsi", "virtio", "mmc", ...
fn detect_bus_type(name: &str, device_path: &Path) -> Option<String> {
    if let Some(subsystem) = link_name(device_path.join("subsystem")) {
        return Some(subsystem);
    }

    if name.starts_with("vd") {
        Some("virtio".to_string())
    } else if name.starts_with("mmcblk") {
        Some("mmc".to_string())
    } else {
        None
    }
}

fn collect_partitions(sys_path: &Path, disk: &str, mounts: &MountTable) -> Vec<Partition> {
    let Ok(names) = dir_names(sys_path) else {
        return Vec::new();
    };

    names
        .into_iter()
        .filter(|name| name.starts_with(disk) && sys_path.join(name).join("partition").exists())
        .map(|name| {
            let part_path = sys_path.join(&name);
            let mount = mounts.get(&format!("/dev/{name}"));

            Partition {
                size_bytes: read_opt::<u64>(part_path.join("size")).unwrap_or(0) * SECTOR_SIZE,
                mount_point: mount.map(|(point, _)| point.clone()),
                fs_type: mount.map(|(_, fs_type)| fs_type.clone()),
                read_only: read_opt::<u8>(part_path.join("ro")) == Some(1),
                name,
            }
        })
        .collect()
}

/// Parse `/proc/self/mounts`. The first mount of a device wins.
fn parse_mounts(text: &str) -> MountTable {
    let mut table = MountTable::new();

    for line in text.lines() {
        let mut fields = line.split_whitespace();
        let (Some(device), Some(point), Some(fs_type)) = (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };

        if !device.starts_with("/dev/") {
            continue;
        }

        table
            .entry(device.to_string())
            .or_insert_with(|| (unescape_mount_field(point), fs_type.to_string()));
    }

    table
}

/// The kernel octal-escapes whitespace and backslashes, e.g. `\040` for a space.
fn unescape_mount_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 4 <= bytes.len() {
            let octal = std::str::from_utf8(&bytes[i + 1..i + 4]).ok();
            if let Some(value) = octal.and_then(|o| u8::from_str_radix(o, 8).ok()) {
                out.push(value);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::probe::fixture::Fixture;

    #[test]
    fn mount_table_unescapes_and_keeps_first() {
        let text = "\
/dev/sda1 / ext4 rw,relatime 0 0
proc /proc proc rw 0 0
/dev/sda2 /mnt/my\\040disk xfs ro 0 0
/dev/sda1 /var/lib/docker ext4 rw 0 0
";
        let table = parse_mounts(text);

        assert_eq!(table.len(), 2);
        assert_eq!(table["/dev/sda1"], ("/".to_string(), "ext4".to_string()));
        assert_eq!(table["/dev/sda2"].0, "/mnt/my disk");
    }

    #[test]
    fn drive_types() {
        assert_eq!(drive_type("sr0", None), DriveType::Odd);
        assert_eq!(drive_type("sda", Some(true)), DriveType::Hdd);
        assert_eq!(drive_type("nvme0n1", Some(false)), DriveType::Ssd);
        assert_eq!(drive_type("vdb", None), DriveType::Unknown);
    }

    #[test]
    fn collects_disks_and_partitions() {
        let fixture = Fixture::new();
        fixture
            .write("/sys/block/nvme0n1/size", "1000215216\n")
            .write("/sys/block/nvme0n1/queue/rotational", "0\n")
            .write("/sys/block/nvme0n1/queue/physical_block_size", "512\n")
            .write("/sys/block/nvme0n1/removable", "0\n")
            .write("/sys/block/nvme0n1/device/model", "Samsung SSD 980 PRO 1TB\n")
            .write("/sys/block/nvme0n1/device/numa_node", "-1\n")
            .write("/sys/block/nvme0n1/nvme0n1p1/partition", "1\n")
            .write("/sys/block/nvme0n1/nvme0n1p1/size", "1048576\n")
            .write("/sys/block/nvme0n1/nvme0n1p1/ro", "0\n")
            .write("/sys/class/nvme/nvme0/serial", "S5GXNF0R123456\n")
            .write("/sys/block/loop0/size", "2048\n")
            .write("/sys/block/sda/size", "3907029168\n")
            .write("/sys/block/sda/queue/rotational", "1\n")
            .write("/sys/block/sda/device/vendor", "ATA\n")
            .symlink("../../../bus/scsi", "/sys/block/sda/device/subsystem")
            .write("/proc/self/mounts", "/dev/nvme0n1p1 /boot/efi vfat rw 0 0\n");

        let block = collect_block_info(&fixture.probe()).unwrap();

        let names: Vec<&str> = block.disks.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["nvme0n1", "sda"]);

        let nvme = &block.disks[0];
        assert_eq!(nvme.size_bytes, 1000215216 * 512);
        assert_eq!(nvme.drive_type, DriveType::Ssd);
        assert_eq!(nvme.storage_controller.as_deref(), Some("nvme"));
        assert_eq!(nvme.serial_number.as_deref(), Some("S5GXNF0R123456"));
        assert_eq!(nvme.numa_node, None);
        assert_eq!(nvme.partitions.len(), 1);
        assert_eq!(nvme.partitions[0].mount_point.as_deref(), Some("/boot/efi"));
        assert_eq!(nvme.partitions[0].fs_type.as_deref(), Some("vfat"));

        let sda = &block.disks[1];
        assert_eq!(sda.drive_type, DriveType::Hdd);
        assert_eq!(sda.storage_controller.as_deref(), Some("scsi"));
        assert_eq!(sda.vendor.as_deref(), Some("ATA"));
        assert!(sda.partitions.is_empty());

        assert_eq!(block.total_physical_bytes, nvme.size_bytes + sda.size_bytes);
    }

    #[test]
    fn missing_sys_block_fails() {
        let fixture = Fixture::new();
        assert!(collect_block_info(&fixture.probe()).is_err());
    }
}
