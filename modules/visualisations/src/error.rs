use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Column '{column}' is not numeric")]
    NonNumeric { column: String },

    #[error("Unknown {kind}: '{value}'")]
    UnknownStyle { kind: &'static str, value: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No data to plot: {0}")]
    EmptyData(String),

    #[error("Font error: {0}")]
    Font(String),
}

pub type Result<T> = std::result::Result<T, PlotError>;

/// Plotters errors are generic over the backend; keep only the message.
pub(crate) fn render_err<E: std::fmt::Display>(err: E) -> PlotError {
    PlotError::Render(err.to_string())
}
