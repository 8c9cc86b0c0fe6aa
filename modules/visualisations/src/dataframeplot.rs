//! Count plot of a categorical column.

use crate::charts::axes::{build_axes, category_range, draw_spines, AxesLayout, Grid, RenderCtx};
use crate::charts::legend::{draw_legend, LegendEntry, LegendSpec, Swatch};
use crate::charts::{Figure, FigureSize, Legend, Output, Palette, Spines, Theme};
use crate::data::{category_levels, AxisData};
use crate::error::{render_err, PlotError, Result};
use plotters::prelude::*;
use polars::prelude::DataFrame;
use tracing::debug;

const BAR_WIDTH: f64 = 0.8;

/// Options for [`plot_df`].
#[derive(Debug, Clone)]
pub struct CountPlotOptions {
    pub x_col: String,
    /// Split each bar by this column.
    pub color_col: Option<String>,
    /// Explicit category order; categories not listed are left out.
    pub order: Option<Vec<String>>,
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub figsize: FigureSize,
    pub palette: Palette,
    pub theme: Theme,
    /// Multiplies every font size.
    pub font_scale: f64,
    /// Hide the top and right spines.
    pub despine: bool,
    pub legend: Legend,
    pub dpi: u32,
    pub output: Output,
}

impl Default for CountPlotOptions {
    fn default() -> Self {
        Self {
            x_col: String::new(),
            color_col: None,
            order: None,
            title: String::new(),
            xlabel: String::new(),
            ylabel: String::new(),
            figsize: FigureSize::new(8.0, 5.0),
            palette: Palette::named("viridis"),
            theme: Theme::DarkGrid,
            font_scale: 0.9,
            despine: true,
            legend: Legend::Inside,
            dpi: 300,
            output: Output::default(),
        }
    }
}

/// Bar per category of `x_col` with the number of rows in it.
pub fn plot_df(df: &DataFrame, options: &CountPlotOptions) -> Result<Figure> {
    let x_col = options.x_col.as_str();
    let levels = match &options.order {
        Some(order) => order.clone(),
        None => category_levels(df, x_col)?,
    };
    if levels.is_empty() {
        return Err(PlotError::EmptyData(format!("column '{}' has no values", x_col)));
    }
    let x = AxisData::with_levels(df, x_col, levels)?;
    let x_levels = x.categories.clone().unwrap_or_default();

    let hue = match options.color_col.as_deref() {
        Some(color_col) => Some(AxisData::with_levels(
            df,
            color_col,
            category_levels(df, color_col)?,
        )?),
        None => None,
    };
    let hue_levels = hue
        .as_ref()
        .and_then(|h| h.categories.clone())
        .unwrap_or_default();
    let n_hue = hue_levels.len().max(1);

    let mut counts = vec![0usize; x_levels.len() * n_hue];
    for (row, xp) in x.positions.iter().enumerate() {
        let Some(xi) = xp else { continue };
        let hi = match &hue {
            Some(h) => match h.positions[row] {
                Some(hi) => hi as usize,
                None => continue,
            },
            None => 0,
        };
        counts[*xi as usize * n_hue + hi] += 1;
    }
    debug!("Counted {} rows over {} categories", counts.iter().sum::<usize>(), x_levels.len());

    // without a split, bars take one color per category
    let colors = match &hue {
        Some(_) => options.palette.colors(n_hue)?,
        None => options.palette.colors(x_levels.len())?,
    };
    let max_count = counts.iter().copied().max().unwrap_or(0).max(1) as f64;

    let legend = LegendSpec {
        title: options.color_col.as_deref(),
        entries: hue_levels
            .iter()
            .zip(&colors)
            .map(|(level, color)| LegendEntry::new(level.clone(), Swatch::Patch(*color)))
            .collect(),
        placement: options.legend,
        font_size: 11.0 * options.font_scale,
    };
    let spines = if options.despine {
        Spines::despined()
    } else {
        Spines::default()
    };

    let ctx = RenderCtx::new(options.dpi);
    let slot = BAR_WIDTH / n_hue as f64;
    let mut figure = Figure::blank(options.figsize, options.dpi)?;
    figure.draw(|root| {
        let mut layout = AxesLayout::new(
            category_range(x_levels.len()),
            0.0..max_count * 1.05,
            options.theme,
        );
        layout.title = Some(options.title.as_str());
        layout.title_size = 12.0 * options.font_scale;
        layout.xlabel = Some(options.xlabel.as_str());
        layout.ylabel = Some(options.ylabel.as_str());
        layout.label_size = 12.0 * options.font_scale;
        layout.x_tick_size = 11.0 * options.font_scale;
        layout.y_tick_size = 11.0 * options.font_scale;
        layout.x_categories = Some(&x_levels);
        layout.grid = Grid::from_theme(options.theme, true);
        layout.right_reserve = legend.reserve(root, &ctx);
        let mut chart = build_axes(root, &layout, &ctx)?;

        let bars = counts.iter().enumerate().filter(|(_, c)| **c > 0).map(|(idx, count)| {
            let (xi, hi) = (idx / n_hue, idx % n_hue);
            let left = xi as f64 - BAR_WIDTH / 2.0 + slot * hi as f64;
            let color = if hue.is_some() { colors[hi] } else { colors[xi] };
            Rectangle::new([(left, 0.0), (left + slot, *count as f64)], color.filled())
        });
        chart.draw_series(bars).map_err(render_err)?;

        draw_spines(root, &chart, &spines, options.theme, &ctx)?;
        draw_legend(root, chart.plotting_area().get_pixel_range(), &legend, &ctx)
    })?;

    options.output.apply(&figure)?;
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn quick(x_col: &str) -> CountPlotOptions {
        CountPlotOptions {
            x_col: x_col.into(),
            figsize: FigureSize::new(2.0, 2.0),
            dpi: 50,
            ..Default::default()
        }
    }

    #[test]
    fn counts_with_and_without_split() {
        let df = df!(
            "label" => ["cat", "dog", "cat", "bird"],
            "split" => ["train", "train", "val", "val"]
        )
        .unwrap();
        assert!(plot_df(&df, &quick("label")).is_ok());

        let split = CountPlotOptions {
            color_col: Some("split".into()),
            legend: Legend::Outside,
            ..quick("label")
        };
        assert!(plot_df(&df, &split).is_ok());
    }

    #[test]
    fn empty_order_is_rejected() {
        let df = df!("label" => ["a"]).unwrap();
        let options = CountPlotOptions {
            order: Some(Vec::new()),
            ..quick("label")
        };
        assert!(matches!(plot_df(&df, &options), Err(PlotError::EmptyData(_))));
    }

    #[test]
    fn unknown_palette_is_an_error() {
        let df = df!("label" => ["a", "b"]).unwrap();
        let options = CountPlotOptions {
            palette: Palette::named("no_such_map"),
            ..quick("label")
        };
        assert!(plot_df(&df, &options).is_err());
    }
}
