//! Composer release selection.
//!
//! Compatibility is a flat lookup: a Composer release is a candidate for a
//! PHP version when the PHP major.minor key appears in its compatible set.
//! The informational min/max bounds are never consulted.

use crate::catalog::{Catalog, ToolVersion};
use tracing::debug;

/// Major.minor key of a version id.
///
/// The first two dot-separated components; inputs with fewer than two
/// components are returned unchanged.
pub fn extract_major_minor(version: &str) -> String {
    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() >= 2 {
        format!("{}.{}", parts[0], parts[1])
    } else {
        version.to_string()
    }
}

/// Best Composer release for the PHP version `runtime`.
///
/// Picks the candidate with the latest release date. On equal dates the
/// candidate seen first in catalog order is kept. `None` means no release
/// lists this PHP version as compatible.
pub fn resolve_tool<'a>(catalog: &'a Catalog, runtime: &str) -> Option<&'a ToolVersion> {
    let key = extract_major_minor(runtime);

    let best = catalog
        .tools()
        .iter()
        .filter(|tool| tool.supports(&key))
        .fold(None::<&ToolVersion>, |best, tool| match best {
            Some(current) if tool.released <= current.released => Some(current),
            _ => Some(tool),
        });

    match best {
        Some(tool) => debug!("Resolved Composer {} for PHP {}", tool.version, runtime),
        None => debug!("No Composer release lists PHP {} ({})", runtime, key),
    }

    best
}
