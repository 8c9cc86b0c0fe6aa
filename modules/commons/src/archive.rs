//! Zip a folder / unzip an archive.

use crate::error::Result;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

/// Zip the contents of `source_folder` into `output_filename` + `.zip`.
///
/// `/content/patches64/train` becomes `/content/patches64/train.zip`. Entry
/// names are relative to `source_folder`. Returns the archive path.
pub fn zip_folder(source_folder: impl AsRef<Path>, output_filename: impl AsRef<Path>) -> Result<PathBuf> {
    let source_folder = source_folder.as_ref();
    let output = archive_path(output_filename.as_ref());

    // nothing is written unless the source can be listed
    let entries = sorted_entries(source_folder)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(&output)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default();

    add_dir_entries(&mut zip, entries, "", options)?;
    zip.finish()?;

    info!("Archive written: {}", output.display());
    Ok(output)
}

/// Extract every entry of `zip_filename` into `extract_folder`.
pub fn unzip_folder(zip_filename: impl AsRef<Path>, extract_folder: impl AsRef<Path>) -> Result<()> {
    let file = File::open(zip_filename.as_ref())?;
    let mut archive = ZipArchive::new(file)?;
    fs::create_dir_all(extract_folder.as_ref())?;
    archive.extract(extract_folder.as_ref())?;

    info!(
        "Extracted {} entries into {}",
        archive.len(),
        extract_folder.as_ref().display()
    );
    Ok(())
}

fn archive_path(output_filename: &Path) -> PathBuf {
    match output_filename.extension() {
        Some(ext) if ext == "zip" => output_filename.to_path_buf(),
        _ => {
            let mut name = output_filename.as_os_str().to_owned();
            name.push(".zip");
            PathBuf::from(name)
        }
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

fn add_dir_entries(
    zip: &mut ZipWriter<File>,
    entries: Vec<fs::DirEntry>,
    prefix: &str,
    options: FileOptions,
) -> Result<()> {
    for entry in entries {
        let name = format!("{}{}", prefix, entry.file_name().to_string_lossy());
        if entry.file_type()?.is_dir() {
            let dir_name = format!("{}/", name);
            zip.add_directory(dir_name.as_str(), options)?;
            add_dir_entries(zip, sorted_entries(&entry.path())?, &dir_name, options)?;
        } else {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(&fs::read(entry.path())?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_path_appends_zip_suffix() {
        assert_eq!(archive_path(Path::new("/a/train")), PathBuf::from("/a/train.zip"));
        assert_eq!(archive_path(Path::new("/a/train.zip")), PathBuf::from("/a/train.zip"));
        assert_eq!(archive_path(Path::new("v1.2")), PathBuf::from("v1.2.zip"));
    }
}
