//! Filesystem helpers: listing by extension, file name surgery, directory
//! scaffolding and moving things around.

use crate::error::{CommonsError, Result};
use crate::natsort::natural_cmp;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How two file lists are paired in [`match_fname`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchMethod {
    /// Identical file names.
    Direct,
    /// Identical stems as produced by [`get_fname`] with `_` as separator.
    Split { pattern: String, n: usize },
}

impl Default for MatchMethod {
    fn default() -> Self {
        MatchMethod::Direct
    }
}

/// Get paths from a directory whose names end with `filetype` (e.g. `".png"`).
///
/// The listing is not recursive and comes back in natural order. A missing
/// directory yields an empty list.
pub fn get_filepaths_bytype(
    target_path: impl AsRef<Path>,
    filetype: &str,
    exclude_hidden: bool,
) -> Result<Vec<PathBuf>> {
    let target_path = target_path.as_ref();
    if !target_path.exists() {
        debug!("{} does not exist, no paths collected", target_path.display());
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(target_path)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.ends_with(filetype) {
            continue;
        }
        if exclude_hidden && name.starts_with('.') {
            continue;
        }
        paths.push(entry.path());
    }

    sort_paths_naturally(&mut paths);
    info!("Total paths: {}", paths.len());
    Ok(paths)
}

/// Collect files into a map keyed by the file name up to `filetype`.
pub fn create_filedict<P: AsRef<Path>>(pathlist: &[P], filetype: &str) -> BTreeMap<String, PathBuf> {
    let mut filesdict = BTreeMap::new();
    for path in pathlist {
        let path = path.as_ref();
        let fname = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let fid = if filetype.is_empty() {
            fname
        } else {
            fname.split(filetype).next().unwrap_or_default().to_string()
        };
        filesdict.insert(fid, path.to_path_buf());
    }
    filesdict
}

/// Shorten a file name to its first `n` parts.
///
/// `a_b_c_n.d` with pattern `[._]` and `n = 3` becomes `a_b_c` (joined with
/// `separator`).
pub fn get_fname(filepath: impl AsRef<Path>, pattern: &str, n: usize, separator: &str) -> Result<String> {
    let filepath = filepath.as_ref();
    let filename = filepath
        .file_name()
        .ok_or_else(|| CommonsError::NoFileName {
            path: filepath.to_path_buf(),
        })?
        .to_string_lossy();

    let re = Regex::new(pattern)?;
    let parts: Vec<&str> = re.split(&filename).collect();
    if parts.len() < n {
        return Err(CommonsError::FilenameParts {
            name: filename.to_string(),
            wanted: n,
            found: parts.len(),
        });
    }

    Ok(parts[..n].join(separator))
}

/// Total size in bytes of every file below `folder_path`.
pub fn folder_size(folder_path: impl AsRef<Path>) -> Result<u64> {
    let mut total = 0;
    for entry in fs::read_dir(folder_path)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if meta.is_dir() {
            total += folder_size(entry.path())?;
        } else {
            total += meta.len();
        }
    }
    Ok(total)
}

/// Create a directory (and parents) if it does not exist.
///
/// Returns `true` when the directory was created by this call.
pub fn create_dir(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    if path.exists() {
        debug!("Path already exist: {}", path.display());
        return Ok(false);
    }
    fs::create_dir_all(path)?;
    info!("Path created: {}", path.display());
    Ok(true)
}

/// Create `base/project_dir` and the given sub directories inside it.
///
/// The returned map holds each sub directory by name plus a `project_dir`
/// entry for the project root.
pub fn create_project_dir(
    base: impl AsRef<Path>,
    project_dir: &str,
    sub_dirs: &[&str],
) -> Result<BTreeMap<String, PathBuf>> {
    let project_path = base.as_ref().join(project_dir);

    let mut dirs: BTreeMap<String, PathBuf> = sub_dirs
        .iter()
        .map(|sub| (sub.to_string(), project_path.join(sub)))
        .collect();
    dirs.insert("project_dir".to_string(), project_path);

    for dir in dirs.values() {
        create_dir(dir)?;
    }

    Ok(dirs)
}

/// Move a folder's contents (or a single file) under `targetdir`.
///
/// A directory `src/` ends up as `targetdir/src/...`; a file ends up as
/// `targetdir/<file name>`.
pub fn copycut_dir(sourcedir: impl AsRef<Path>, targetdir: impl AsRef<Path>) -> Result<()> {
    let sourcedir = sourcedir.as_ref();
    let targetdir = targetdir.as_ref();

    if !sourcedir.exists() {
        return Err(CommonsError::NotFound {
            path: sourcedir.to_path_buf(),
        });
    }

    let base_dir = sourcedir.file_name().ok_or_else(|| CommonsError::NoFileName {
        path: sourcedir.to_path_buf(),
    })?;

    if sourcedir.is_dir() {
        let targetdircut = targetdir.join(base_dir);
        create_dir(&targetdircut)?;

        for entry in fs::read_dir(sourcedir)? {
            let entry = entry?;
            let target_path = targetdircut.join(entry.file_name());
            move_path(&entry.path(), &target_path)?;
            info!(
                "Moved '{}' ->>> '{}'",
                entry.file_name().to_string_lossy(),
                targetdircut.display()
            );
        }
    } else {
        create_dir(targetdir)?;
        move_path(sourcedir, &targetdir.join(base_dir))?;
        info!("Moved '{}' ->>> '{}'", sourcedir.display(), targetdir.display());
    }

    Ok(())
}

/// Move the contents of `source_directory` straight into `target_directory`.
#[deprecated(note = "use copycut_dir")]
pub fn move_folders_contents(
    source_directory: impl AsRef<Path>,
    target_directory: impl AsRef<Path>,
) -> Result<()> {
    let source_directory = source_directory.as_ref();
    let target_directory = target_directory.as_ref();

    if !source_directory.exists() {
        return Err(CommonsError::NotFound {
            path: source_directory.to_path_buf(),
        });
    }
    create_dir(target_directory)?;

    for entry in fs::read_dir(source_directory)? {
        let entry = entry?;
        move_path(&entry.path(), &target_directory.join(entry.file_name()))?;
        info!(
            "Moved '{}' to '{}'",
            entry.file_name().to_string_lossy(),
            target_directory.display()
        );
    }
    Ok(())
}

/// Pair files from two lists by name.
///
/// Keys are the matched name (or stem); values hold the path from each list.
/// Only the first match in `list2` is kept for a given entry of `list1`.
pub fn match_fname<P: AsRef<Path>, Q: AsRef<Path>>(
    list1: &[P],
    list2: &[Q],
    method: &MatchMethod,
) -> Result<BTreeMap<String, (PathBuf, PathBuf)>> {
    let key_of = |path: &Path| -> Result<String> {
        match method {
            MatchMethod::Direct => Ok(path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()),
            MatchMethod::Split { pattern, n } => get_fname(path, pattern, *n, "_"),
        }
    };

    let keys2 = list2
        .iter()
        .map(|p| key_of(p.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let mut file_dict = BTreeMap::new();
    for path1 in list1 {
        let path1 = path1.as_ref();
        let key1 = key_of(path1)?;
        if let Some(idx) = keys2.iter().position(|k| *k == key1) {
            file_dict.insert(key1, (path1.to_path_buf(), list2[idx].as_ref().to_path_buf()));
        }
    }

    Ok(file_dict)
}

/// Collect `projectdir/<sub>/[subsubdir/]fname` for every sub directory that
/// has it.
///
/// Sub directories must contain every string in `filter_subdir_names` to be
/// kept. Results are in natural order of the sub directory name.
pub fn collect_same_file_from_subdir(
    projectdir: impl AsRef<Path>,
    subsubdir: Option<&str>,
    fname: &str,
    filter_subdir_names: &[&str],
) -> Result<Vec<(String, PathBuf)>> {
    let projectdir = projectdir.as_ref();
    let mut filepaths = Vec::new();

    for entry in fs::read_dir(projectdir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let subdir = entry.file_name().to_string_lossy().into_owned();
        if !filter_subdir_names.iter().all(|name| subdir.contains(name)) {
            continue;
        }

        let mut filepath = entry.path();
        if let Some(subsub) = subsubdir {
            filepath.push(subsub);
        }
        filepath.push(fname);

        if filepath.exists() {
            filepaths.push((subdir, filepath));
        }
    }

    filepaths.sort_by(|a, b| natural_cmp(&a.0, &b.0));
    Ok(filepaths)
}

fn sort_paths_naturally(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));
}

/// Rename, falling back to copy + delete only across filesystems.
fn move_path(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => return Ok(()),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            debug!("'{}' is on another filesystem, copying", from.display());
        }
        Err(err) => return Err(err.into()),
    }

    if from.is_dir() {
        copy_dir_all(from, to)?;
        fs::remove_dir_all(from)?;
    } else {
        fs::copy(from, to)?;
        fs::remove_file(from)?;
    }
    Ok(())
}

fn copy_dir_all(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), dest)?;
        }
    }
    Ok(())
}
