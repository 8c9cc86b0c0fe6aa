use anyhow::Result;
use messylib::registry::{Registry, MODULES};
use std::fs;
use tempfile::TempDir;

#[test]
fn builtin_manifests_exist() {
    let registry = Registry::builtin();
    assert_eq!(registry.len(), MODULES.len());
    for (name, manifest) in registry.iter() {
        assert!(manifest.is_file(), "{} manifest missing at {}", name, manifest.display());
    }
}

#[test]
fn discover_matches_builtin_for_workspace_modules() -> Result<()> {
    let modules = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("modules");
    let found = Registry::discover(&modules)?;
    assert_eq!(found.names(), Registry::builtin().names());
    Ok(())
}

#[test]
fn discover_skips_hidden_and_manifestless_dirs() -> Result<()> {
    let dir = TempDir::new()?;
    for name in ["zeta", "alpha", "_private", ".cache", "no_manifest"] {
        fs::create_dir(dir.path().join(name))?;
    }
    for name in ["zeta", "alpha", "_private", ".cache"] {
        fs::write(dir.path().join(name).join("Cargo.toml"), "[package]\n")?;
    }
    fs::write(dir.path().join("Cargo.toml"), "[workspace]\n")?;

    let registry = Registry::discover(dir.path())?;
    assert_eq!(registry.names(), vec!["alpha", "zeta"]);
    assert_eq!(
        registry.lookup("alpha"),
        Some(dir.path().join("alpha").join("Cargo.toml").as_path())
    );
    Ok(())
}

#[test]
fn discover_on_missing_dir_is_an_error() {
    assert!(Registry::discover("/definitely/not/here").is_err());
}

#[cfg(all(feature = "commons", feature = "visualisations"))]
#[test]
fn modules_are_reexported() {
    use messylib::commons::configs::Configs;
    use messylib::visualisations::dataframes::plot_df_cols;
    use messylib::visualisations::images::plot_images_from_list;

    let _ = plot_df_cols;
    let _ = plot_images_from_list;
    assert!(Configs::new().is_empty());
}
