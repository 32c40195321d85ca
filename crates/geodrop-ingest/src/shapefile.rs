//! Shapefile component rules
//!
//! A shapefile is a bundle of sibling files sharing one base name. GeoServer
//! needs the four below at minimum; archives missing any of them are
//! rejected before publishing. All matching is ASCII case-insensitive, so
//! `ROOF_A.DBF` satisfies the `.dbf` requirement for base `roof_a`.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

/// Companion extensions required for a publishable shapefile, in report
/// order.
pub const REQUIRED_COMPONENTS: [&str; 4] = [".shp", ".shx", ".dbf", ".prj"];

const DATA_EXTENSION: &str = ".shp";

fn has_suffix(name: &str, suffix: &str) -> bool {
    name.to_ascii_lowercase().ends_with(suffix)
}

/// Find the shapefile base name from extracted member names.
///
/// The first member ending in `.shp` (any case) wins; its name minus the
/// extension, case preserved, becomes the base the companion check uses.
/// `None` means the archive carries no shapefile at all.
pub fn discover_base_name(members: &[String]) -> Option<String> {
    members
        .iter()
        .find(|member| has_suffix(member, DATA_EXTENSION))
        .map(|member| member[..member.len() - DATA_EXTENSION.len()].to_string())
}

/// Report which required companions are absent next to the extracted data.
///
/// `base_name` may carry a relative directory prefix when the archive
/// nested its members; the check then looks inside that subdirectory of
/// `dir`. The returned extensions keep [`REQUIRED_COMPONENTS`] order.
pub fn missing_components(dir: &Path, base_name: &str) -> io::Result<Vec<&'static str>> {
    let base = Path::new(base_name);
    let search_dir = match base.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => dir.join(parent),
        _ => dir.to_path_buf(),
    };
    let stem = base
        .file_name()
        .map(|name| name.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let mut present = HashSet::new();
    for entry in fs::read_dir(&search_dir)? {
        let entry = entry?;
        present.insert(entry.file_name().to_string_lossy().to_ascii_lowercase());
    }

    Ok(REQUIRED_COMPONENTS
        .iter()
        .copied()
        .filter(|extension| !present.contains(&format!("{}{}", stem, extension)))
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    fn members(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_discovers_first_shp_member() {
        let found = discover_base_name(&members(&["readme.txt", "b.shp", "a.shp"]));
        assert_eq!(found.as_deref(), Some("b"));
    }

    #[test]
    fn test_discovery_is_case_insensitive_but_preserves_case() {
        let found = discover_base_name(&members(&["Roof_A.SHP", "roof_a.dbf"]));
        assert_eq!(found.as_deref(), Some("Roof_A"));
    }

    #[test]
    fn test_discovery_keeps_directory_prefix() {
        let found = discover_base_name(&members(&["parcels/lots.shp"]));
        assert_eq!(found.as_deref(), Some("parcels/lots"));
    }

    #[test]
    fn test_no_shp_member_means_no_base() {
        assert_eq!(discover_base_name(&members(&["notes.txt", "a.dbf"])), None);
    }

    #[test]
    fn test_complete_set_reports_nothing_missing() {
        let dir = TempDir::new().unwrap();
        for name in ["roof_a.shp", "roof_a.shx", "roof_a.dbf", "roof_a.prj"] {
            touch(dir.path(), name);
        }

        let missing = missing_components(dir.path(), "roof_a").unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_component_check_ignores_case() {
        let dir = TempDir::new().unwrap();
        for name in ["Roof_A.SHP", "roof_a.shx", "ROOF_A.dbf", "roof_a.PRJ"] {
            touch(dir.path(), name);
        }

        let missing = missing_components(dir.path(), "Roof_A").unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_missing_companions_reported_in_order() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "bad.shp");
        touch(dir.path(), "bad.dbf");

        let missing = missing_components(dir.path(), "bad").unwrap();
        assert_eq!(missing, vec![".shx", ".prj"]);
    }

    #[test]
    fn test_checks_inside_nested_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("parcels");
        fs::create_dir(&nested).unwrap();
        for name in ["lots.shp", "lots.shx", "lots.dbf", "lots.prj"] {
            touch(&nested, name);
        }

        let missing = missing_components(dir.path(), "parcels/lots").unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_unreadable_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = missing_components(&dir.path().join("absent"), "roof_a");
        assert!(result.is_err());
    }
}
