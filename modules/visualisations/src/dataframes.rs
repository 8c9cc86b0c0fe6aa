//! Line and box plots of data frame columns.
//!
//! Both helpers melt the requested `y_cols` into a long `Metric` / `Value`
//! frame first, then draw one series (or one box per hue) per metric.

use crate::charts::axes::{
    build_axes, category_range, clip_polyline, draw_line, draw_marker_clipped, draw_spines,
    padded_range, AxesLayout, Chart, Grid, RenderCtx,
};
use crate::charts::figure::Area;
use crate::charts::legend::{draw_legend, LegendEntry, LegendSpec, Swatch, LEGEND_FONT_SIZE};
use crate::charts::{
    Figure, FigureSize, Legend, LineStyle, Marker, Output, Palette, Spines, Theme, YLim,
};
use crate::data::{
    category_levels, is_numeric_dtype, melt, numeric_values, subset_eq, unique_in_order,
    with_row_index, AxisData, METRIC_COL, VALUE_COL,
};
use crate::error::{render_err, PlotError, Result};
use crate::stats::{box_stats_parallel, mean_by_x, BoxStats};
use plotters::prelude::*;
use polars::prelude::DataFrame;
use std::ops::Range;
use tracing::debug;

/// Name of the x column when plotting against the row index.
pub const INDEX_COL: &str = "index";

/// Share of a category slot covered by its boxes.
const BOX_WIDTH: f64 = 0.8;
const BOX_EDGE: RGBColor = RGBColor(63, 63, 63);

/// Options shared by [`plot_df_cols`] and [`boxplot_df_cols`].
#[derive(Debug, Clone)]
pub struct AxesOptions {
    pub y_cols: Vec<String>,
    /// Palette name or explicit colors, one per metric (or hue level).
    pub colors: Palette,
    /// Defaults to the x column name.
    pub xlabel: Option<String>,
    /// Defaults to `"Value"`.
    pub ylabel: Option<String>,
    pub title: Option<String>,
    pub figsize: FigureSize,
    pub legend: Legend,
    pub theme: Theme,
    pub title_fontsize: f64,
    pub xlabel_fontsize: f64,
    pub ylabel_fontsize: f64,
    pub spines: Spines,
    pub y_lim: Option<YLim>,
    pub show_grid: bool,
    pub dpi: u32,
    pub output: Output,
}

impl Default for AxesOptions {
    fn default() -> Self {
        Self {
            y_cols: vec!["train_loss".to_string(), "val_loss".to_string()],
            colors: Palette::default(),
            xlabel: None,
            ylabel: None,
            title: None,
            figsize: FigureSize::new(10.0, 6.0),
            legend: Legend::Inside,
            theme: Theme::WhiteGrid,
            title_fontsize: 14.0,
            xlabel_fontsize: 12.0,
            ylabel_fontsize: 12.0,
            spines: Spines::default(),
            y_lim: None,
            show_grid: true,
            dpi: 150,
            output: Output::default(),
        }
    }
}

impl AxesOptions {
    fn y_range(&self, data: Option<Range<f64>>) -> Result<Range<f64>> {
        let range = match self.y_lim {
            Some(lim) => {
                let (lo, hi) = lim.bounds();
                lo..hi
            }
            None => data.unwrap_or(0.0..1.0),
        };
        if !(range.start < range.end) {
            return Err(PlotError::InvalidArgument(format!(
                "y limits must be increasing, got {}..{}",
                range.start, range.end
            )));
        }
        Ok(range)
    }

    fn layout<'a>(
        &'a self,
        x_name: &'a str,
        x_range: Range<f64>,
        y_range: Range<f64>,
        grid: Grid,
    ) -> AxesLayout<'a> {
        let mut layout = AxesLayout::new(x_range, y_range, self.theme);
        layout.title = self.title.as_deref();
        layout.title_size = self.title_fontsize;
        layout.xlabel = Some(self.xlabel.as_deref().unwrap_or(x_name));
        layout.ylabel = Some(self.ylabel.as_deref().unwrap_or(VALUE_COL));
        layout.label_size = self.xlabel_fontsize;
        layout.x_tick_size = self.xlabel_fontsize;
        layout.y_tick_size = self.ylabel_fontsize;
        layout.grid = if self.show_grid { grid } else { Grid::None };
        layout
    }
}

/// Options for [`plot_df_cols`].
#[derive(Debug, Clone)]
pub struct LinePlotOptions {
    /// X column; `None` plots against the row index.
    pub x: Option<String>,
    /// Line width in points.
    pub line_width: f64,
    /// Per-metric line styles; missing entries are solid.
    pub line_styles: Vec<LineStyle>,
    /// Per-metric markers; missing entries draw no marker.
    pub markers: Vec<Marker>,
    /// Marker diameter in points.
    pub marker_size: f64,
    pub axes: AxesOptions,
}

impl Default for LinePlotOptions {
    fn default() -> Self {
        Self {
            x: None,
            line_width: 2.0,
            line_styles: Vec::new(),
            markers: Vec::new(),
            marker_size: 5.0,
            axes: AxesOptions::default(),
        }
    }
}

/// Line plot of `y_cols` against `x`, one line per metric.
///
/// Duplicate x values within a metric are averaged and lines run in x order.
/// A non-numeric x column is treated as categorical.
pub fn plot_df_cols(df: &DataFrame, options: &LinePlotOptions) -> Result<Figure> {
    let axes = &options.axes;
    let index_name = free_index_name(df);
    let (frame, x) = match options.x.as_deref() {
        Some(x) => (df.clone(), x),
        None => (with_row_index(df, &index_name)?, index_name.as_str()),
    };

    let melted = melt(&frame, &[x], &axes.y_cols)?;
    let metrics = unique_in_order(axes.y_cols.iter().cloned());
    let colors = axes.colors.colors(metrics.len())?;
    let x_levels = if is_numeric_dtype(frame.column(x)?.dtype()) {
        None
    } else {
        Some(category_levels(&frame, x)?)
    };

    let mut series: Vec<Vec<(f64, f64)>> = Vec::with_capacity(metrics.len());
    for metric in &metrics {
        let subset = subset_eq(&melted, METRIC_COL, metric)?;
        let xs = match &x_levels {
            None => numeric_values(&subset, x)?,
            Some(levels) => AxisData::with_levels(&subset, x, levels.clone())?.positions,
        };
        let ys = numeric_values(&subset, VALUE_COL)?;
        let points: Vec<(f64, f64)> = xs
            .into_iter()
            .zip(ys)
            .filter_map(|(x, y)| Some((x?, y?)))
            .collect();
        series.push(mean_by_x(&points));
    }
    if series.iter().all(Vec::is_empty) {
        return Err(PlotError::EmptyData(format!(
            "no numeric values in {:?}",
            axes.y_cols
        )));
    }
    debug!("Plotting {} metrics against '{}'", metrics.len(), x);

    let x_range = match &x_levels {
        Some(levels) => category_range(levels.len()),
        None => padded_range(series.iter().flatten().map(|p| p.0), 0.05).unwrap_or(0.0..1.0),
    };
    let y_range = axes.y_range(padded_range(series.iter().flatten().map(|p| p.1), 0.05))?;
    let y_bounds = y_range.clone();

    let styles: Vec<LineStyle> = (0..metrics.len())
        .map(|i| options.line_styles.get(i).copied().unwrap_or_default())
        .collect();
    let legend = LegendSpec {
        title: None,
        entries: metrics
            .iter()
            .enumerate()
            .map(|(i, metric)| {
                LegendEntry::new(
                    metric.clone(),
                    Swatch::Line {
                        color: colors[i],
                        width: options.line_width,
                        style: styles[i],
                        marker: options.markers.get(i).copied(),
                    },
                )
            })
            .collect(),
        placement: axes.legend,
        font_size: LEGEND_FONT_SIZE,
    };

    let ctx = RenderCtx::new(axes.dpi);
    let mut figure = Figure::blank(axes.figsize, axes.dpi)?;
    figure.draw(|root| {
        let mut layout = axes.layout(x, x_range, y_range, Grid::Both);
        layout.x_categories = x_levels.as_deref();
        layout.right_reserve = legend.reserve(root, &ctx);
        let mut chart = build_axes(root, &layout, &ctx)?;

        let stroke = ctx.px_u32(options.line_width);
        let radius = (ctx.px(options.marker_size) / 2.0).round() as i32;
        let clip = chart.plotting_area().get_pixel_range();
        for (i, points) in series.iter().enumerate() {
            let color = colors[i];
            draw_line(&mut chart, points, color.stroke_width(stroke), styles[i])?;
            if let Some(marker) = options.markers.get(i).copied() {
                for point in points.iter().filter(|p| y_bounds.contains(&p.1)) {
                    let center = chart.backend_coord(point);
                    draw_marker_clipped(root, &clip, center, marker, radius, color.mix(1.0), None)?;
                }
            }
        }

        draw_spines(root, &chart, &axes.spines, axes.theme, &ctx)?;
        draw_legend(root, chart.plotting_area().get_pixel_range(), &legend, &ctx)
    })?;

    axes.output.apply(&figure)?;
    Ok(figure)
}

/// Row index column name that does not clash with `df`: `index`, then
/// `level_0`, `level_0_1`, ...
fn free_index_name(df: &DataFrame) -> String {
    let taken = |name: &str| df.column(name).is_ok();
    [INDEX_COL.to_string(), "level_0".to_string()]
        .into_iter()
        .chain((1..).map(|i| format!("level_0_{}", i)))
        .find(|name| !taken(name))
        .unwrap_or_else(|| INDEX_COL.to_string())
}

/// Options for [`boxplot_df_cols`].
#[derive(Debug, Clone)]
pub struct BoxPlotOptions {
    /// Categorical x column.
    pub x: String,
    /// Sub-group column; boxes are split by metric when `None`.
    pub hue: Option<String>,
    pub showfliers: bool,
    pub axes: AxesOptions,
}

impl Default for BoxPlotOptions {
    fn default() -> Self {
        Self {
            x: String::new(),
            hue: None,
            showfliers: true,
            axes: AxesOptions::default(),
        }
    }
}

/// Box plots of the melted `y_cols`, grouped by `x` and split by `hue`.
pub fn boxplot_df_cols(df: &DataFrame, options: &BoxPlotOptions) -> Result<Figure> {
    let axes = &options.axes;
    let x = options.x.as_str();
    let mut id_vars = vec![x];
    if let Some(hue) = options.hue.as_deref().filter(|h| *h != x) {
        id_vars.push(hue);
    }
    let melted = melt(df, &id_vars, &axes.y_cols)?;
    let hue_col = options.hue.as_deref().unwrap_or(METRIC_COL);

    let AxisData {
        positions: x_pos,
        categories: x_levels,
    } = AxisData::with_levels(&melted, x, category_levels(&melted, x)?)?;
    let AxisData {
        positions: hue_pos,
        categories: hue_levels,
    } = AxisData::with_levels(&melted, hue_col, category_levels(&melted, hue_col)?)?;
    let x_levels = x_levels.unwrap_or_default();
    let hue_levels = hue_levels.unwrap_or_default();
    let n_hue = hue_levels.len().max(1);

    let values = numeric_values(&melted, VALUE_COL)?;
    let mut groups: Vec<Vec<f64>> = vec![Vec::new(); x_levels.len() * n_hue];
    for ((xp, hp), v) in x_pos.iter().zip(&hue_pos).zip(&values) {
        if let (Some(xi), Some(hi), Some(v)) = (xp, hp, v) {
            groups[*xi as usize * n_hue + *hi as usize].push(*v);
        }
    }
    let stats = box_stats_parallel(&groups);
    if stats.iter().all(Option::is_none) {
        return Err(PlotError::EmptyData(format!(
            "no numeric values in {:?}",
            axes.y_cols
        )));
    }
    debug!(
        "Box plot of {} categories x {} '{}' levels",
        x_levels.len(),
        hue_levels.len(),
        hue_col
    );

    let colors = axes.colors.colors(n_hue)?;
    let y_range = axes.y_range(padded_range(
        stats.iter().flatten().flat_map(|s| {
            let (lo, hi) = s.extent(options.showfliers);
            [lo, hi]
        }),
        0.05,
    ))?;

    let legend_title = match (&options.hue, axes.y_cols.len()) {
        (Some(hue), _) => Some(hue.as_str()),
        (None, n) if n > 1 => Some(METRIC_COL),
        _ => None,
    };
    let legend = LegendSpec {
        title: legend_title,
        entries: match legend_title {
            Some(_) => hue_levels
                .iter()
                .zip(&colors)
                .map(|(level, color)| LegendEntry::new(level.clone(), Swatch::Patch(*color)))
                .collect(),
            None => Vec::new(),
        },
        placement: axes.legend,
        font_size: LEGEND_FONT_SIZE,
    };

    let slot = BOX_WIDTH / n_hue as f64;
    let ctx = RenderCtx::new(axes.dpi);
    let mut figure = Figure::blank(axes.figsize, axes.dpi)?;
    figure.draw(|root| {
        let mut layout = axes.layout(x, category_range(x_levels.len()), y_range, Grid::YOnly);
        layout.x_categories = Some(&x_levels);
        layout.right_reserve = legend.reserve(root, &ctx);
        let mut chart = build_axes(root, &layout, &ctx)?;

        let edge = BOX_EDGE.stroke_width(ctx.px_u32(1.0));
        for (idx, stat) in stats.iter().enumerate() {
            let Some(stat) = stat else {
                continue;
            };
            let (xi, hi) = (idx / n_hue, idx % n_hue);
            let center = xi as f64 - BOX_WIDTH / 2.0 + slot * (hi as f64 + 0.5);
            let glyph = BoxGlyph {
                center,
                half_width: slot * 0.45,
                fill: colors[hi],
                edge,
            };
            glyph.draw(&mut chart, root, stat, options.showfliers, &ctx)?;
        }

        draw_spines(root, &chart, &axes.spines, axes.theme, &ctx)?;
        draw_legend(root, chart.plotting_area().get_pixel_range(), &legend, &ctx)
    })?;

    axes.output.apply(&figure)?;
    Ok(figure)
}

struct BoxGlyph {
    center: f64,
    half_width: f64,
    fill: RGBColor,
    edge: ShapeStyle,
}

impl BoxGlyph {
    fn draw(
        &self,
        chart: &mut Chart<'_, '_>,
        root: &Area<'_>,
        stat: &BoxStats,
        fliers: bool,
        ctx: &RenderCtx,
    ) -> Result<()> {
        let (x_range, y_range) = (chart.x_range(), chart.y_range());
        let (left, right) = (self.center - self.half_width, self.center + self.half_width);
        if stat.q3 >= y_range.start && stat.q1 <= y_range.end {
            let clamp = |v: f64| v.clamp(y_range.start, y_range.end);
            let body = [(left, clamp(stat.q1)), (right, clamp(stat.q3))];
            chart
                .draw_series(std::iter::once(Rectangle::new(body, self.fill.filled())))
                .map_err(render_err)?;
            chart
                .draw_series(std::iter::once(Rectangle::new(body, self.edge)))
                .map_err(render_err)?;
        }

        let cap = self.half_width * 0.5;
        let c = self.center;
        let lines = vec![
            vec![(left, stat.median), (right, stat.median)],
            vec![(c, stat.q3), (c, stat.whisker_high)],
            vec![(c, stat.q1), (c, stat.whisker_low)],
            vec![(c - cap, stat.whisker_high), (c + cap, stat.whisker_high)],
            vec![(c - cap, stat.whisker_low), (c + cap, stat.whisker_low)],
        ];
        let visible = lines
            .iter()
            .flat_map(|pts| clip_polyline(pts, &x_range, &y_range));
        chart
            .draw_series(visible.map(|pts| PathElement::new(pts, self.edge)))
            .map_err(render_err)?;

        if fliers {
            let radius = (ctx.px(5.0) / 2.0).round() as i32;
            let clip = chart.plotting_area().get_pixel_range();
            for v in stat.fliers.iter().filter(|v| y_range.contains(*v)) {
                let center = chart.backend_coord(&(c, *v));
                draw_marker_clipped(
                    root,
                    &clip,
                    center,
                    Marker::Diamond,
                    radius,
                    BOX_EDGE.mix(1.0),
                    None,
                )?;
            }
        }
        Ok(())
    }
}
