//! messylib - a loose collection of helper modules.
//!
//! Each theme lives in its own workspace member under `modules/` with its own
//! `Cargo.toml`. The root crate only knows where those manifests are, and
//! re-exports each module behind a cargo feature of the same name.

pub mod logging;
pub mod registry;

#[cfg(feature = "commons")]
pub use messylib_commons as commons;
#[cfg(feature = "visualisations")]
pub use messylib_visualisations as visualisations;

pub use registry::Registry;
