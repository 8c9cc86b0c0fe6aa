//! messylib visualisations - plotting helpers for data frames, curves and images.
//!
//! Every helper renders into a [`Figure`] (an RGB raster) with `plotters`,
//! optionally saves or opens it according to its [`Output`], and hands the
//! figure back to the caller.

pub mod bubbleplot;
pub mod charts;
pub mod data;
pub mod dataframeplot;
pub mod dataframes;
pub mod datainalistplot;
pub mod error;
pub mod images;
pub mod stats;

pub use charts::{
    register_font_file, Figure, FigureSize, Legend, LineStyle, Marker, Output, Palette, Spine,
    SpineStyle, Spines, Theme, YLim,
};
pub use error::{PlotError, Result};
