use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::ProbeError;

pub(crate) fn read_string(path: impl AsRef<Path>) -> Result<String, ProbeError> {
    let path = path.as_ref();

    let raw = fs::read_to_string(path).map_err(|e| ProbeError::unreadable(e, path))?;
    Ok(raw.trim().to_string())
}

/// Best-effort read for optional attributes. Empty files count as absent.
pub(crate) fn read_to_string_trim(path: impl AsRef<Path>) -> Option<String> {
    read_string(path).ok().filter(|s| !s.is_empty())
}

pub(crate) fn read_opt<T: FromStr>(path: impl AsRef<Path>) -> Option<T> {
    read_to_string_trim(path)?.parse().ok()
}

/// Basename of a symlink target, e.g. the driver behind `device/driver`.
pub(crate) fn link_name(path: impl AsRef<Path>) -> Option<String> {
    let link = fs::read_link(path).ok()?;
    link.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
}

/// `numa_node` is -1 when the device has no affinity.
pub(crate) fn read_numa_node(path: impl AsRef<Path>) -> Option<u32> {
    read_opt::<i64>(path).and_then(|n| u32::try_from(n).ok())
}

pub(crate) fn read_list(path: impl AsRef<Path>) -> Result<Vec<usize>, ProbeError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| ProbeError::unreadable(e, path))?;
    parse_list(&raw, path)
}

/// Parse a kernel cpu/node list such as `0-3,8,10-11`.
pub(crate) fn parse_list(raw: &str, path: &Path) -> Result<Vec<usize>, ProbeError> {
    let raw = raw.trim();
    let mut ret = Vec::new();

    if raw.is_empty() {
        return Ok(ret);
    }

    for range in raw.split(',') {
        let bounds = range
            .split('-')
            .map(|text| text.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ProbeError::unparseable(e, path))?;

        match bounds[..] {
            [value] => ret.push(value),
            [start, stop] if start <= stop => ret.extend(start..=stop),
            _ => {
                return Err(ProbeError::unparseable(
                    format!("invalid range '{range}'"),
                    path,
                ))
            }
        }
    }

    Ok(ret)
}

/// Sorted names of the entries in a directory.
pub(crate) fn dir_names(path: impl AsRef<Path>) -> Result<Vec<String>, ProbeError> {
    let path = path.as_ref();
    let entries = fs::read_dir(path).map_err(|e| ProbeError::unreadable(e, path))?;

    let mut names: Vec<String> = entries
        .flatten()
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    Ok(names)
}
