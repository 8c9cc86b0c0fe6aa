// Filesystem round trips for the commons helpers, run inside scratch dirs.

use anyhow::Result;
use messylib_commons::archive::{unzip_folder, zip_folder};
use messylib_commons::configs::Configs;
#[allow(deprecated)]
use messylib_commons::files::move_folders_contents;
use messylib_commons::files::{
    collect_same_file_from_subdir, copycut_dir, create_dir, create_project_dir, folder_size,
    get_filepaths_bytype,
};
use std::fs;
use tempfile::TempDir;

#[test]
fn filepaths_by_type_are_naturally_sorted() -> Result<()> {
    let temp = TempDir::new()?;
    for name in ["img10.png", "img2.png", "img1.png", ".hidden.png", "notes.txt"] {
        fs::write(temp.path().join(name), b"x")?;
    }

    let paths = get_filepaths_bytype(temp.path(), ".png", true)?;
    let names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["img1.png", "img2.png", "img10.png"]);

    let with_hidden = get_filepaths_bytype(temp.path(), ".png", false)?;
    assert_eq!(with_hidden.len(), 4);

    let missing = get_filepaths_bytype(temp.path().join("nope"), ".png", true)?;
    assert!(missing.is_empty());
    Ok(())
}

#[test]
fn project_dir_creates_every_sub_dir() -> Result<()> {
    let temp = TempDir::new()?;
    let dirs = create_project_dir(temp.path(), "proj", &["data", "models"])?;

    assert_eq!(dirs.len(), 3);
    assert!(dirs["project_dir"].is_dir());
    assert!(dirs["data"].is_dir());
    assert!(dirs["models"].ends_with("proj/models"));

    // second call finds everything in place
    assert!(!create_dir(&dirs["data"])?);
    Ok(())
}

#[test]
fn copycut_moves_folder_under_target() -> Result<()> {
    let temp = TempDir::new()?;
    let source = temp.path().join("run1");
    fs::create_dir_all(source.join("nested"))?;
    fs::write(source.join("a.txt"), b"hello")?;
    fs::write(source.join("nested/b.txt"), b"world")?;

    let target = temp.path().join("archive");
    copycut_dir(&source, &target)?;

    assert_eq!(fs::read_to_string(target.join("run1/a.txt"))?, "hello");
    assert_eq!(fs::read_to_string(target.join("run1/nested/b.txt"))?, "world");
    assert!(!source.join("a.txt").exists());

    let file = temp.path().join("single.csv");
    fs::write(&file, b"1,2")?;
    copycut_dir(&file, temp.path().join("files"))?;
    assert!(temp.path().join("files/single.csv").exists());

    assert!(copycut_dir(temp.path().join("ghost"), &target).is_err());
    Ok(())
}

#[test]
fn zip_then_unzip_restores_contents() -> Result<()> {
    let temp = TempDir::new()?;
    let source = temp.path().join("train");
    fs::create_dir_all(source.join("sub"))?;
    fs::write(source.join("x.txt"), b"12345")?;
    fs::write(source.join("sub/y.txt"), b"abc")?;
    assert_eq!(folder_size(&source)?, 8);

    let archive = zip_folder(&source, temp.path().join("out/train"))?;
    assert!(archive.ends_with("out/train.zip"));

    let extract = temp.path().join("extracted");
    unzip_folder(&archive, &extract)?;
    assert_eq!(fs::read_to_string(extract.join("x.txt"))?, "12345");
    assert_eq!(fs::read_to_string(extract.join("sub/y.txt"))?, "abc");
    Ok(())
}

#[test]
fn configs_round_trip_keeps_tuples() -> Result<()> {
    let temp = TempDir::new()?;
    let mut configs = Configs::new().with_param("lr", 0.001)?;
    configs.add_tuple("img_size", &[128, 128])?;

    let written = configs.save_to_json(temp.path().join("run"))?;
    assert!(written.ends_with("run/config.json"));

    let loaded = Configs::from_json_file(&written)?;
    assert!(loaded.is_tuple("img_size"));
    assert_eq!(loaded.get::<(u32, u32)>("img_size")?, Some((128, 128)));
    assert_eq!(loaded.get::<f64>("lr")?, Some(0.001));

    let explicit = configs.save_to_json(temp.path().join("cfg/params.json"))?;
    assert!(explicit.exists());
    Ok(())
}

#[test]
fn same_file_is_collected_from_filtered_subdirs() -> Result<()> {
    let temp = TempDir::new()?;
    for sub in ["exp10_a", "exp2_a", "exp3_b"] {
        let dir = temp.path().join(sub).join("logs");
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("metrics.csv"), b"")?;
    }
    fs::create_dir_all(temp.path().join("exp4_a"))?;

    let found = collect_same_file_from_subdir(temp.path(), Some("logs"), "metrics.csv", &["_a"])?;
    let keys: Vec<&str> = found.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["exp2_a", "exp10_a"]);
    Ok(())
}

#[test]
fn zip_of_missing_folder_writes_nothing() -> Result<()> {
    let temp = TempDir::new()?;
    let result = zip_folder(temp.path().join("missing"), temp.path().join("train"));
    assert!(result.is_err());
    assert!(!temp.path().join("train.zip").exists());
    Ok(())
}

#[test]
#[allow(deprecated)]
fn folder_contents_move_straight_into_target() -> Result<()> {
    let temp = TempDir::new()?;
    let source = temp.path().join("inbox");
    fs::create_dir_all(source.join("batch"))?;
    fs::write(source.join("a.txt"), b"a")?;
    fs::write(source.join("batch/b.txt"), b"b")?;

    let target = temp.path().join("sorted");
    move_folders_contents(&source, &target)?;

    assert_eq!(fs::read_to_string(target.join("a.txt"))?, "a");
    assert_eq!(fs::read_to_string(target.join("batch/b.txt"))?, "b");
    assert!(source.is_dir());
    assert_eq!(fs::read_dir(&source)?.count(), 0);

    assert!(move_folders_contents(temp.path().join("ghost"), &target).is_err());
    Ok(())
}

#[test]
fn refused_move_keeps_source_and_target_apart() -> Result<()> {
    let temp = TempDir::new()?;
    let source = temp.path().join("run1");
    fs::create_dir_all(source.join("logs"))?;
    fs::write(source.join("logs/new.csv"), b"new")?;

    // same-filesystem rename onto a non-empty directory fails and must not merge
    let target = temp.path().join("archive");
    fs::create_dir_all(target.join("run1/logs"))?;
    fs::write(target.join("run1/logs/old.csv"), b"old")?;

    assert!(copycut_dir(&source, &target).is_err());
    assert!(source.join("logs/new.csv").exists());
    assert!(!target.join("run1/logs/new.csv").exists());
    Ok(())
}
