use anyhow::Result;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use messylib_visualisations::bubbleplot::{plot_bubble, BubbleOptions};
use messylib_visualisations::dataframeplot::{plot_df, CountPlotOptions};
use messylib_visualisations::dataframes::{
    boxplot_df_cols, plot_df_cols, AxesOptions, BoxPlotOptions, LinePlotOptions,
};
use messylib_visualisations::datainalistplot::{plot_data_inalist, CurveOptions, MeanStd};
use messylib_visualisations::images::{
    plot_image, plot_images_from_folder, plot_images_from_list, GridOptions, ImageOptions,
    ImageSource, ListGridOptions,
};
use messylib_visualisations::{Figure, FigureSize, Output};
use polars::prelude::*;
use tempfile::TempDir;

const SMALL: FigureSize = FigureSize::new(3.0, 2.0);
const DPI: u32 = 40;

fn two_by_two() -> DataFrame {
    df!(
        "train_loss" => [0.9f64, 0.4],
        "val_loss" => [1.0f64, 0.6]
    )
    .unwrap()
}

fn small_axes(y_cols: &[&str]) -> AxesOptions {
    AxesOptions {
        y_cols: y_cols.iter().map(|c| c.to_string()).collect(),
        figsize: SMALL,
        dpi: DPI,
        ..Default::default()
    }
}

fn assert_size(fig: &Figure) {
    assert_eq!((fig.width(), fig.height()), SMALL.pixels(DPI));
}

#[test]
fn line_plot_of_minimal_table() -> Result<()> {
    let fig = plot_df_cols(
        &two_by_two(),
        &LinePlotOptions {
            axes: small_axes(&["train_loss", "val_loss"]),
            ..Default::default()
        },
    )?;
    assert_size(&fig);
    Ok(())
}

#[test]
fn box_plot_of_minimal_table() -> Result<()> {
    let df = df!("group" => ["a", "b"], "score" => [1.0f64, 2.0])?;
    let fig = boxplot_df_cols(
        &df,
        &BoxPlotOptions {
            x: "group".into(),
            axes: small_axes(&["score"]),
            ..Default::default()
        },
    )?;
    assert_size(&fig);
    Ok(())
}

#[test]
fn count_plot_of_minimal_table() -> Result<()> {
    let df = df!("label" => ["cat", "dog"], "split" => ["train", "val"])?;
    let fig = plot_df(
        &df,
        &CountPlotOptions {
            x_col: "label".into(),
            color_col: Some("split".into()),
            figsize: SMALL,
            dpi: DPI,
            ..Default::default()
        },
    )?;
    assert_size(&fig);
    Ok(())
}

#[test]
fn bubble_plot_of_minimal_table() -> Result<()> {
    let df = df!("model" => ["cnn", "vit"], "dataset" => ["mnist", "mnist"])?;
    let fig = plot_bubble(
        &df,
        &BubbleOptions {
            groupby: vec!["model".into(), "dataset".into()],
            x_col: "model".into(),
            y_col: "dataset".into(),
            figsize: SMALL,
            dpi: DPI,
            ..Default::default()
        },
    )?;
    assert_size(&fig);
    Ok(())
}

#[test]
fn curves_from_repeated_runs() -> Result<()> {
    let runs = MeanStd::from_runs(&[vec![1.0, 0.5], vec![0.8, 0.3]])?;
    let fig = plot_data_inalist(
        &[runs.mean.clone()],
        &CurveOptions {
            std: Some(vec![runs.std.clone()]),
            figsize: SMALL,
            dpi: DPI,
            ..Default::default()
        },
    )?;
    assert_size(&fig);
    Ok(())
}

#[test]
fn figure_is_saved_where_asked() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("plots").join("loss.png");
    plot_df_cols(
        &two_by_two(),
        &LinePlotOptions {
            axes: AxesOptions {
                output: Output::save_to(&path),
                ..small_axes(&["train_loss", "val_loss"])
            },
            ..Default::default()
        },
    )?;
    let saved = image::open(&path)?;
    assert_eq!((saved.width(), saved.height()), SMALL.pixels(DPI));
    Ok(())
}

fn write_images(dir: &std::path::Path, count: usize) -> Result<()> {
    for i in 0..count {
        let img = GrayImage::from_fn(8, 8, |x, y| Luma([((x + y) * 10 + i as u32) as u8]));
        img.save(dir.join(format!("img_{}.png", i)))?;
    }
    std::fs::write(dir.join("notes.txt"), "not an image")?;
    Ok(())
}

#[test]
fn folder_grid_skips_other_extensions() -> Result<()> {
    let dir = TempDir::new()?;
    write_images(dir.path(), 3)?;
    let fig = plot_images_from_folder(
        dir.path(),
        &GridOptions {
            rows: 2,
            cols: 2,
            figsize: SMALL,
            dpi: DPI,
            ..Default::default()
        },
    )?;
    assert_size(&fig);
    Ok(())
}

#[test]
fn list_grid_saves_one_summary_per_batch() -> Result<()> {
    let src = TempDir::new()?;
    let out = TempDir::new()?;
    write_images(src.path(), 5)?;

    let mut sources: Vec<ImageSource> = (0..4)
        .map(|i| ImageSource::from(src.path().join(format!("img_{}.png", i))))
        .collect();
    sources.push(ImageSource::from(DynamicImage::ImageRgb8(RgbImage::from_pixel(
        4,
        4,
        Rgb([200, 10, 10]),
    ))));

    let figures = plot_images_from_list(
        &sources,
        &ListGridOptions {
            stepsize: 2,
            rows: 1,
            cols: 2,
            figsize: SMALL,
            savedir: Some(out.path().to_path_buf()),
            dpi: DPI,
            ..Default::default()
        },
    )?;

    assert_eq!(figures.len(), 3);
    for name in [
        "summary-img_000-002.png",
        "summary-img_002-004.png",
        "summary-img_004-005.png",
    ] {
        assert!(out.path().join(name).is_file(), "missing {}", name);
    }
    Ok(())
}

#[test]
fn single_image_round_trips_to_png() -> Result<()> {
    let img = DynamicImage::ImageLuma8(GrayImage::from_fn(6, 3, |x, _| Luma([x as u8 * 40])));
    let fig = plot_image(
        &img,
        &ImageOptions {
            figsize: SMALL,
            dpi: DPI,
            ..Default::default()
        },
    )?;
    let png = fig.to_png_bytes()?;
    let decoded = image::load_from_memory(&png)?;
    assert_eq!(decoded.width(), fig.width());
    Ok(())
}
