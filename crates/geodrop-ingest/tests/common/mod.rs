//! Shared fixtures for integration tests

use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Write a zip archive containing the given members.
pub fn write_archive(path: &Path, members: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    for (name, contents) in members {
        writer
            .start_file(name.to_string(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap();
}

/// Write a zip archive holding all four required components for `base`.
pub fn write_complete_archive(path: &Path, base: &str) {
    let shp = format!("{base}.shp");
    let shx = format!("{base}.shx");
    let dbf = format!("{base}.dbf");
    let prj = format!("{base}.prj");
    write_archive(
        path,
        &[
            (shp.as_str(), b"shp-bytes".as_slice()),
            (shx.as_str(), b"shx-bytes".as_slice()),
            (dbf.as_str(), b"dbf-bytes".as_slice()),
            (prj.as_str(), b"prj-bytes".as_slice()),
        ],
    );
}
