//! Figure handle: the raster every helper draws into.

use crate::error::{render_err, PlotError, Result};
use image::{ImageFormat, Rgb, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::{BitMapBackend, DrawingArea, IntoDrawingArea};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Root drawing area of a figure.
pub type Area<'b> = DrawingArea<BitMapBackend<'b>, Shift>;

static SHOW_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Figure size in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width: f64,
    pub height: f64,
}

impl FigureSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Pixel dimensions at the given DPI.
    pub fn pixels(&self, dpi: u32) -> (u32, u32) {
        let w = (self.width * dpi as f64).round().max(1.0) as u32;
        let h = (self.height * dpi as f64).round().max(1.0) as u32;
        (w, h)
    }
}

impl Default for FigureSize {
    fn default() -> Self {
        Self::new(10.0, 6.0)
    }
}

/// Where a finished figure goes besides being returned.
#[derive(Debug, Clone, Default)]
pub struct Output {
    /// Save to this path (format from the extension, PNG otherwise).
    pub savepath: Option<PathBuf>,
    /// Open the figure in the system image viewer.
    pub show: bool,
}

impl Output {
    pub fn save_to(path: impl Into<PathBuf>) -> Self {
        Self {
            savepath: Some(path.into()),
            show: false,
        }
    }

    pub(crate) fn apply(&self, figure: &Figure) -> Result<()> {
        if let Some(path) = &self.savepath {
            figure.save(path)?;
        }
        if self.show {
            figure.show()?;
        }
        Ok(())
    }
}

/// A rendered plot.
#[derive(Debug, Clone)]
pub struct Figure {
    image: RgbImage,
    dpi: u32,
}

impl Figure {
    /// White canvas of `size` inches at `dpi`.
    pub fn blank(size: FigureSize, dpi: u32) -> Result<Self> {
        if dpi == 0 {
            return Err(PlotError::InvalidArgument("dpi must be positive".into()));
        }
        if !(size.width > 0.0 && size.height > 0.0) {
            return Err(PlotError::InvalidArgument(format!(
                "figure size must be positive, got {}x{}",
                size.width, size.height
            )));
        }
        let (w, h) = size.pixels(dpi);
        Ok(Self {
            image: RgbImage::from_pixel(w, h, Rgb([255, 255, 255])),
            dpi,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    pub(crate) fn image_mut(&mut self) -> &mut RgbImage {
        &mut self.image
    }

    /// Run plotters drawing code against the figure's pixels.
    pub(crate) fn draw<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&Area<'_>) -> Result<T>,
    {
        let (w, h) = self.image.dimensions();
        let root = BitMapBackend::with_buffer(&mut self.image, (w, h)).into_drawing_area();
        let out = f(&root)?;
        root.present().map_err(render_err)?;
        Ok(out)
    }

    /// Save by file extension; unknown or missing extensions are written as PNG.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        match ImageFormat::from_path(path) {
            Ok(format) => self.image.save_with_format(path, format)?,
            Err(_) => self.image.save_with_format(path, ImageFormat::Png)?,
        }
        info!("Saved plot to {}", path.display());
        Ok(())
    }

    /// PNG-encoded figure.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.image.write_to(&mut cursor, ImageFormat::Png)?;
        Ok(cursor.into_inner())
    }

    /// Write a temporary PNG and open it with the default viewer.
    pub fn show(&self) -> Result<PathBuf> {
        let n = SHOW_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!("messylib-{}-{}.png", std::process::id(), n));
        self.save(&path)?;
        open::that(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixels_follow_dpi() {
        assert_eq!(FigureSize::new(10.0, 6.0).pixels(150), (1500, 900));
        assert_eq!(FigureSize::new(0.001, 1.0).pixels(10), (1, 10));
    }

    #[test]
    fn blank_rejects_bad_sizes() {
        assert!(Figure::blank(FigureSize::new(1.0, 1.0), 0).is_err());
        assert!(Figure::blank(FigureSize::new(-1.0, 1.0), 72).is_err());
        let fig = Figure::blank(FigureSize::new(2.0, 1.0), 50).unwrap();
        assert_eq!((fig.width(), fig.height()), (100, 50));
    }

    #[test]
    fn unknown_extensions_are_saved_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let fig = Figure::blank(FigureSize::new(1.0, 1.0), 20).unwrap();
        for name in ["plot.figure", "plot"] {
            let path = dir.path().join("nested").join(name);
            fig.save(&path).unwrap();
            let bytes = std::fs::read(&path).unwrap();
            assert!(bytes.starts_with(&[137, 80, 78, 71]), "{} is not a PNG", name);
        }
    }

    #[test]
    fn png_bytes_have_signature() {
        let fig = Figure::blank(FigureSize::new(1.0, 1.0), 20).unwrap();
        let bytes = fig.to_png_bytes().unwrap();
        assert!(bytes.starts_with(&[137, 80, 78, 71]));
    }
}
