//! Image display helpers: single images and paged grids.

use crate::charts::axes::{build_axes, draw_spines, AxesLayout, Grid, RenderCtx};
use crate::charts::{Figure, FigureSize, Output, Palette, Spines, Theme};
use crate::error::{render_err, PlotError, Result};
use image::imageops::{self, FilterType};
use image::{ColorType, DynamicImage, Rgb, RgbImage};
use plotters::prelude::*;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Pixel rectangle `(x, y, width, height)` on the figure.
type Slot = (i32, i32, i32, i32);

/// Options for [`plot_image`].
#[derive(Debug, Clone)]
pub struct ImageOptions {
    /// Colormap for single-channel images; color images are drawn as is.
    pub cmap: Option<Palette>,
    pub title: Option<String>,
    pub title_size: f64,
    pub show_axes: bool,
    pub figsize: FigureSize,
    pub dpi: u32,
    pub output: Output,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            cmap: Some(Palette::named("viridis")),
            title: None,
            title_size: 10.0,
            show_axes: false,
            figsize: FigureSize::new(6.4, 4.8),
            dpi: 100,
            output: Output::default(),
        }
    }
}

/// Options for [`plot_images_from_folder`].
#[derive(Debug, Clone)]
pub struct GridOptions {
    pub rows: usize,
    pub cols: usize,
    /// File name suffix to pick up, e.g. `".png"`.
    pub img_format: String,
    pub figsize: FigureSize,
    pub title_size: f64,
    pub cmap: Palette,
    pub cmap_reverse: bool,
    pub dpi: u32,
    pub output: Output,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            rows: 1,
            cols: 1,
            img_format: ".png".to_string(),
            figsize: FigureSize::new(10.0, 10.0),
            title_size: 10.0,
            cmap: Palette::named("binary"),
            cmap_reverse: false,
            dpi: 200,
            output: Output::default(),
        }
    }
}

/// An image file or an already decoded image.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Image(DynamicImage),
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(image: DynamicImage) -> Self {
        ImageSource::Image(image)
    }
}

impl ImageSource {
    fn load(&self) -> Result<DynamicImage> {
        match self {
            ImageSource::Path(path) => Ok(image::open(path)?),
            ImageSource::Image(image) => Ok(image.clone()),
        }
    }
}

/// Options for [`plot_images_from_list`].
#[derive(Debug, Clone)]
pub struct ListGridOptions {
    /// Images per batch (one figure each).
    pub stepsize: usize,
    pub rows: usize,
    pub cols: usize,
    pub figsize: FigureSize,
    pub set_title: bool,
    /// Titles indexed by position in the whole list.
    pub title_list: Option<Vec<String>>,
    pub title_size: f64,
    pub cmap: Option<Palette>,
    pub cmap_reverse: bool,
    /// Each batch is saved here as `summary-img_{start:03}-{end:03}.png`.
    pub savedir: Option<PathBuf>,
    pub dpi: u32,
    pub show: bool,
}

impl Default for ListGridOptions {
    fn default() -> Self {
        Self {
            stepsize: 25,
            rows: 5,
            cols: 5,
            figsize: FigureSize::new(15.0, 15.0),
            set_title: true,
            title_list: None,
            title_size: 10.0,
            cmap: None,
            cmap_reverse: false,
            savedir: None,
            dpi: 200,
            show: false,
        }
    }
}

struct Panel {
    image: RgbImage,
    title: Option<String>,
}

fn is_single_channel(image: &DynamicImage) -> bool {
    matches!(
        image.color(),
        ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16
    )
}

/// Map a single-channel image through `cmap`, normalized to its own min..max.
fn colorize(image: &DynamicImage, cmap: Option<&Palette>) -> Result<RgbImage> {
    let cmap = match cmap {
        Some(cmap) if is_single_channel(image) => cmap,
        _ => return Ok(image.to_rgb8()),
    };

    let luma = image.to_luma32f();
    let (lo, hi) = luma
        .pixels()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.0[0]), hi.max(p.0[0]))
        });
    let span = if hi > lo { hi - lo } else { 1.0 };

    let lut = (0..256)
        .map(|i| cmap.sample(i as f64 / 255.0))
        .collect::<Result<Vec<_>>>()?;
    Ok(RgbImage::from_fn(luma.width(), luma.height(), |x, y| {
        let t = ((luma.get_pixel(x, y).0[0] - lo) / span).clamp(0.0, 1.0);
        let c = lut[(t * 255.0).round() as usize];
        Rgb([c.0, c.1, c.2])
    }))
}

/// Scale `image` into `slot` keeping its aspect ratio, centred.
fn place(canvas: &mut RgbImage, image: &RgbImage, slot: Slot) {
    let (x, y, w, h) = slot;
    if image.width() == 0 || image.height() == 0 || w <= 0 || h <= 0 {
        return;
    }
    let scale = (w as f64 / image.width() as f64).min(h as f64 / image.height() as f64);
    let nw = ((image.width() as f64 * scale).round() as u32).max(1);
    let nh = ((image.height() as f64 * scale).round() as u32).max(1);
    let filter = if scale >= 1.0 {
        FilterType::Nearest
    } else {
        FilterType::Triangle
    };
    let resized = imageops::resize(image, nw, nh, filter);
    let ox = x as i64 + (w as i64 - nw as i64) / 2;
    let oy = y as i64 + (h as i64 - nh as i64) / 2;
    imageops::overlay(canvas, &resized, ox, oy);
}

/// Lay panels out row-major on a `rows x cols` grid, titles above images.
fn render_grid(
    panels: &[Panel],
    rows: usize,
    cols: usize,
    size: FigureSize,
    dpi: u32,
    title_size: f64,
) -> Result<Figure> {
    let ctx = RenderCtx::new(dpi);
    let mut figure = Figure::blank(size, dpi)?;
    let slots: Vec<Slot> = figure.draw(|root| {
        root.fill(&WHITE).map_err(render_err)?;
        let pad = ctx.px(4.0).round() as i32;
        let mut slots = Vec::with_capacity(panels.len());
        for (cell, panel) in root.split_evenly((rows, cols)).iter().zip(panels) {
            let (xr, yr) = match panel.title.as_deref().filter(|_| ctx.text) {
                Some(title) => cell
                    .titled(title, ctx.font(title_size))
                    .map_err(render_err)?
                    .get_pixel_range(),
                None => cell.get_pixel_range(),
            };
            slots.push((
                xr.start + pad,
                yr.start + pad,
                xr.end - xr.start - 2 * pad,
                yr.end - yr.start - 2 * pad,
            ));
        }
        Ok(slots)
    })?;

    for (panel, slot) in panels.iter().zip(slots) {
        place(figure.image_mut(), &panel.image, slot);
    }
    Ok(figure)
}

/// Single image on axes labelled in pixel coordinates, row 0 at the top.
fn render_with_axes(
    image: &RgbImage,
    title: Option<&str>,
    title_size: f64,
    size: FigureSize,
    dpi: u32,
) -> Result<Figure> {
    let ctx = RenderCtx::new(dpi);
    let (w, h) = (image.width().max(1) as f64, image.height().max(1) as f64);
    let mut figure = Figure::blank(size, dpi)?;
    let slot = figure.draw(|root| {
        let mut layout = AxesLayout::new(0.0..w, 0.0..h, Theme::White);
        layout.title = title;
        layout.title_size = title_size;
        layout.y_flipped = true;
        layout.grid = Grid::None;

        // first pass measures the plotting area, second pads the ranges to
        // the image aspect ratio
        let (xr, yr) = build_axes(root, &layout, &ctx)?
            .plotting_area()
            .get_pixel_range();
        let pw = (xr.end - xr.start).max(1) as f64;
        let ph = (yr.end - yr.start).max(1) as f64;
        let scale = (pw / w).min(ph / h);
        let ex = (pw / scale - w) / 2.0;
        let ey = (ph / scale - h) / 2.0;
        layout.x_range = -ex..w + ex;
        layout.y_range = -ey..h + ey;

        let chart = build_axes(root, &layout, &ctx)?;
        draw_spines(root, &chart, &Spines::default(), Theme::White, &ctx)?;
        let (x0, y0) = chart.backend_coord(&(0.0, h));
        let (x1, y1) = chart.backend_coord(&(w, 0.0));
        Ok((x0, y0, x1 - x0, y1 - y0))
    })?;

    place(figure.image_mut(), image, slot);
    Ok(figure)
}

/// Show one image, colormapped when it has a single channel.
pub fn plot_image(image: &DynamicImage, options: &ImageOptions) -> Result<Figure> {
    let rgb = colorize(image, options.cmap.as_ref())?;
    let figure = if options.show_axes {
        render_with_axes(
            &rgb,
            options.title.as_deref(),
            options.title_size,
            options.figsize,
            options.dpi,
        )?
    } else {
        let panel = Panel {
            image: rgb,
            title: options.title.clone(),
        };
        render_grid(
            std::slice::from_ref(&panel),
            1,
            1,
            options.figsize,
            options.dpi,
            options.title_size,
        )?
    };
    options.output.apply(&figure)?;
    Ok(figure)
}

fn check_grid(rows: usize, cols: usize, title_size: f64, dpi: u32) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Err(PlotError::InvalidArgument(
            "`rows` and `cols` must be positive".into(),
        ));
    }
    if !(title_size > 0.0) {
        return Err(PlotError::InvalidArgument(
            "`title_size` must be positive".into(),
        ));
    }
    if dpi == 0 {
        return Err(PlotError::InvalidArgument("`dpi` must be positive".into()));
    }
    Ok(())
}

fn resolve_cmap(cmap: Option<&Palette>, reverse: bool) -> Option<Palette> {
    cmap.map(|c| if reverse { c.reversed() } else { c.clone() })
}

/// Grid of the first `rows * cols` images in `folder`, sorted by file name.
pub fn plot_images_from_folder(folder: impl AsRef<Path>, options: &GridOptions) -> Result<Figure> {
    check_grid(options.rows, options.cols, options.title_size, options.dpi)?;
    let folder = folder.as_ref();

    let mut names: Vec<String> = std::fs::read_dir(folder)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(&options.img_format))
        .collect();
    names.sort();
    names.truncate(options.rows * options.cols);
    debug!("Plotting {} images from {}", names.len(), folder.display());

    let cmap = resolve_cmap(Some(&options.cmap), options.cmap_reverse);
    let panels = names
        .par_iter()
        .map(|name| {
            let image = image::open(folder.join(name))?;
            Ok(Panel {
                image: colorize(&image, cmap.as_ref())?,
                title: Some(name.clone()),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let figure = render_grid(
        &panels,
        options.rows,
        options.cols,
        options.figsize,
        options.dpi,
        options.title_size,
    )?;
    options.output.apply(&figure)?;
    Ok(figure)
}

fn panel_title(
    source: &ImageSource,
    global: usize,
    local: usize,
    options: &ListGridOptions,
) -> Option<String> {
    if !options.set_title {
        return None;
    }
    if let Some(titles) = &options.title_list {
        return titles.get(global).cloned();
    }
    match source {
        ImageSource::Path(path) => path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()),
        ImageSource::Image(_) => Some(local.to_string()),
    }
}

/// Page through `sources` in batches of `stepsize`, one grid figure per batch.
pub fn plot_images_from_list(sources: &[ImageSource], options: &ListGridOptions) -> Result<Vec<Figure>> {
    check_grid(options.rows, options.cols, options.title_size, options.dpi)?;
    if options.stepsize == 0 {
        return Err(PlotError::InvalidArgument("`stepsize` must be positive".into()));
    }
    if let Some(dir) = &options.savedir {
        std::fs::create_dir_all(dir)?;
    }

    let cmap = resolve_cmap(options.cmap.as_ref(), options.cmap_reverse);
    let capacity = options.rows * options.cols;
    let total = sources.len();
    let mut figures = Vec::with_capacity(total.div_ceil(options.stepsize));

    for start in (0..total).step_by(options.stepsize) {
        let end = (start + options.stepsize).min(total);
        let batch = &sources[start..end];
        info!("Plotting batch of {} images", batch.len());

        let panels = batch
            .par_iter()
            .take(capacity)
            .enumerate()
            .map(|(local, source)| {
                let image = source.load()?;
                Ok(Panel {
                    image: colorize(&image, cmap.as_ref())?,
                    title: panel_title(source, start + local, local, options),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let figure = render_grid(
            &panels,
            options.rows,
            options.cols,
            options.figsize,
            options.dpi,
            options.title_size,
        )?;
        let output = Output {
            savepath: options
                .savedir
                .as_ref()
                .map(|dir| dir.join(format!("summary-img_{:03}-{:03}.png", start, end))),
            show: options.show,
        };
        output.apply(&figure)?;
        figures.push(figure);
    }
    Ok(figures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn gradient() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(4, 2, |x, _| Luma([(x * 60) as u8])))
    }

    #[test]
    fn grayscale_is_stretched_through_the_colormap() {
        let rgb = colorize(&gradient(), Some(&Palette::named("gray"))).unwrap();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(rgb.get_pixel(3, 1), &Rgb([255, 255, 255]));
    }

    #[test]
    fn color_images_ignore_the_colormap() {
        let color = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([10, 20, 30])));
        let rgb = colorize(&color, Some(&Palette::named("viridis"))).unwrap();
        assert_eq!(rgb.get_pixel(1, 1), &Rgb([10, 20, 30]));
    }

    #[test]
    fn place_keeps_aspect_and_centres() {
        let mut canvas = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
        let red = RgbImage::from_pixel(2, 1, Rgb([255, 0, 0]));
        place(&mut canvas, &red, (0, 0, 10, 10));
        assert_eq!(canvas.get_pixel(5, 5), &Rgb([255, 0, 0]));
        assert_eq!(canvas.get_pixel(5, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn titles_use_list_index_then_file_name() {
        let options = ListGridOptions {
            title_list: Some(vec!["a".into(), "b".into(), "c".into()]),
            ..Default::default()
        };
        let source = ImageSource::from(PathBuf::from("/data/img_7.png"));
        assert_eq!(panel_title(&source, 2, 0, &options), Some("c".to_string()));

        let plain = ListGridOptions::default();
        assert_eq!(panel_title(&source, 2, 0, &plain), Some("img_7.png".to_string()));
        let array = ImageSource::from(gradient());
        assert_eq!(panel_title(&array, 9, 4, &plain), Some("4".to_string()));
    }

    #[test]
    fn single_image_with_and_without_axes() {
        let options = ImageOptions {
            figsize: FigureSize::new(2.0, 2.0),
            dpi: 30,
            title: Some("digits".into()),
            ..Default::default()
        };
        assert!(plot_image(&gradient(), &options).is_ok());
        let with_axes = ImageOptions {
            show_axes: true,
            ..options
        };
        assert!(plot_image(&gradient(), &with_axes).is_ok());
    }

    #[test]
    fn invalid_grid_options_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let zero_rows = GridOptions {
            rows: 0,
            ..Default::default()
        };
        assert!(plot_images_from_folder(dir.path(), &zero_rows).is_err());
        let zero_title = GridOptions {
            title_size: 0.0,
            ..Default::default()
        };
        assert!(plot_images_from_folder(dir.path(), &zero_title).is_err());
        let zero_dpi = GridOptions {
            dpi: 0,
            ..Default::default()
        };
        assert!(matches!(
            plot_images_from_folder(dir.path(), &zero_dpi),
            Err(PlotError::InvalidArgument(_))
        ));
        let zero_step = ListGridOptions {
            stepsize: 0,
            ..Default::default()
        };
        assert!(plot_images_from_list(&[], &zero_step).is_err());
    }
}
