//! Zip archive extraction

use std::fs::{self, File};
use std::io;
use std::path::Path;

use geodrop_common::{GeodropError, Result};
use tracing::debug;
use zip::ZipArchive;

/// Extract a zip archive into its containing directory.
///
/// Returns the member names in archive order; the first `.shp` member
/// determines the shapefile base name downstream. Member paths are
/// validated before writing so an archive cannot place files outside the
/// extraction directory.
pub fn extract_archive(archive_path: &Path) -> Result<Vec<String>> {
    let dest_dir = match archive_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| {
        GeodropError::Archive(format!(
            "{} is not a readable zip archive: {}",
            archive_path.display(),
            e
        ))
    })?;

    let mut members = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| {
            GeodropError::Archive(format!("failed to read zip entry {}: {}", index, e))
        })?;
        let member_name = entry.name().to_string();
        let relative = entry.enclosed_name().ok_or_else(|| {
            GeodropError::Archive(format!(
                "zip entry '{}' escapes the extraction directory",
                member_name
            ))
        })?;

        let target = dest_dir.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut output = File::create(&target)?;
            let bytes = io::copy(&mut entry, &mut output)?;
            debug!(member = %member_name, bytes, "extracted zip member");
        }
        members.push(member_name);
    }

    Ok(members)
}
