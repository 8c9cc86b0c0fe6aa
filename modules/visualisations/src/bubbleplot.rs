//! Bubble chart of how often each group combination occurs.

use crate::charts::axes::{
    build_axes, category_range, draw_marker, draw_spines, format_tick, padded_range, AxesLayout,
    Grid, RenderCtx,
};
use crate::charts::legend::{draw_legend, LegendEntry, LegendSpec, Swatch, LEGEND_FONT_SIZE};
use crate::charts::palette::DEEP;
use crate::charts::{Figure, FigureSize, Legend, Marker, Output, Palette, Spines, Theme};
use crate::data::{count_groups, numeric_values, AxisData, COUNT_COL};
use crate::error::{PlotError, Result};
use plotters::prelude::*;
use polars::prelude::DataFrame;
use std::ops::Range;
use tracing::debug;

const LEGEND_STEPS: usize = 5;
const SIZE_LEGEND_COLOR: RGBColor = RGBColor(110, 110, 110);

/// Options for [`plot_bubble`].
#[derive(Debug, Clone)]
pub struct BubbleOptions {
    pub groupby: Vec<String>,
    pub x_col: String,
    pub y_col: String,
    pub hue_col: Option<String>,
    /// Stable re-sort of the counted groups before plotting.
    pub sort_col: Option<String>,
    pub figsize: FigureSize,
    pub theme: Theme,
    pub palette: Palette,
    /// Smallest and largest marker area in square points.
    pub sizes: (f64, f64),
    pub alpha: f64,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub title: Option<String>,
    /// Draw x tick labels vertically.
    pub rotate_x_labels: bool,
    pub legend: Legend,
    pub dpi: u32,
    pub output: Output,
}

impl Default for BubbleOptions {
    fn default() -> Self {
        Self {
            groupby: Vec::new(),
            x_col: String::new(),
            y_col: String::new(),
            hue_col: None,
            sort_col: None,
            figsize: FigureSize::new(15.0, 3.0),
            theme: Theme::DarkGrid,
            palette: Palette::named("rocket_r"),
            sizes: (50.0, 500.0),
            alpha: 0.8,
            xlabel: None,
            ylabel: None,
            title: None,
            rotate_x_labels: true,
            legend: Legend::Outside,
            dpi: 100,
            output: Output::default(),
        }
    }
}

/// Rows per `groupby` combination in a `Count` column, optionally re-sorted.
pub fn bubble_counts(df: &DataFrame, groupby: &[String], sort_col: Option<&str>) -> Result<DataFrame> {
    count_groups(df, groupby, sort_col)
}

/// Linear map from count to marker area.
struct SizeScale {
    lo: f64,
    hi: f64,
    areas: (f64, f64),
}

impl SizeScale {
    fn new(counts: &[f64], areas: (f64, f64)) -> Self {
        let (lo, hi) = counts
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| (lo.min(*c), hi.max(*c)));
        Self { lo, hi, areas }
    }

    fn area(&self, count: f64) -> f64 {
        let (small, large) = self.areas;
        if !(self.hi - self.lo > f64::EPSILON) {
            return (small + large) / 2.0;
        }
        small + (count - self.lo) / (self.hi - self.lo) * (large - small)
    }

    /// Marker radius in points; the area is that of the bounding square.
    fn radius(&self, count: f64) -> f64 {
        self.area(count).max(0.0).sqrt() / 2.0
    }

    fn legend_levels(&self, counts: &[f64]) -> Vec<f64> {
        let mut distinct: Vec<f64> = counts.to_vec();
        distinct.sort_by(|a, b| a.total_cmp(b));
        distinct.dedup();
        if distinct.len() <= LEGEND_STEPS {
            return distinct;
        }
        let mut levels: Vec<f64> = (0..LEGEND_STEPS)
            .map(|i| (self.lo + (self.hi - self.lo) * i as f64 / (LEGEND_STEPS - 1) as f64).round())
            .collect();
        levels.dedup();
        levels
    }
}

enum HueScale {
    Categorical {
        levels: Vec<String>,
        colors: Vec<RGBColor>,
        positions: Vec<Option<f64>>,
    },
    Numeric {
        values: Vec<Option<f64>>,
        range: Range<f64>,
        palette: Palette,
    },
}

impl HueScale {
    fn new(df: &DataFrame, column: &str, palette: &Palette) -> Result<Self> {
        let axis = AxisData::from_column(df, column)?;
        match axis.categories {
            Some(levels) => Ok(HueScale::Categorical {
                colors: palette.colors(levels.len())?,
                levels,
                positions: axis.positions,
            }),
            None => {
                let range = padded_range(axis.positions.iter().flatten().copied(), 0.0)
                    .unwrap_or(0.0..1.0);
                Ok(HueScale::Numeric {
                    values: axis.positions,
                    range,
                    palette: palette.clone(),
                })
            }
        }
    }

    fn color(&self, row: usize) -> Result<Option<RGBColor>> {
        match self {
            HueScale::Categorical {
                colors, positions, ..
            } => Ok(positions[row].map(|i| colors[i as usize])),
            HueScale::Numeric {
                values,
                range,
                palette,
            } => match values[row] {
                Some(v) => palette.sample(normalize(v, range)).map(Some),
                None => Ok(None),
            },
        }
    }

    fn legend_entries(&self, radius: f64) -> Result<Vec<LegendEntry>> {
        match self {
            HueScale::Categorical { levels, colors, .. } => Ok(levels
                .iter()
                .zip(colors)
                .map(|(level, color)| {
                    LegendEntry::new(level.clone(), Swatch::Dot { color: *color, radius })
                })
                .collect()),
            HueScale::Numeric { range, palette, .. } => (0..LEGEND_STEPS)
                .map(|i| {
                    let v = range.start + (range.end - range.start) * i as f64 / (LEGEND_STEPS - 1) as f64;
                    let color = palette.sample(normalize(v, range))?;
                    Ok(LegendEntry::new(format_tick(v, None), Swatch::Dot { color, radius }))
                })
                .collect(),
        }
    }
}

fn normalize(v: f64, range: &Range<f64>) -> f64 {
    let span = range.end - range.start;
    if span.abs() < f64::EPSILON {
        0.5
    } else {
        (v - range.start) / span
    }
}

fn axis_range(axis: &AxisData) -> Range<f64> {
    match &axis.categories {
        Some(levels) => category_range(levels.len()),
        None => padded_range(axis.positions.iter().flatten().copied(), 0.05).unwrap_or(0.0..1.0),
    }
}

/// Scatter `x_col` against `y_col` over the group counts, bubble area by count.
pub fn plot_bubble(df: &DataFrame, options: &BubbleOptions) -> Result<Figure> {
    let counts = bubble_counts(df, &options.groupby, options.sort_col.as_deref())?;
    if counts.height() == 0 {
        return Err(PlotError::EmptyData("no groups to plot".into()));
    }
    let (small, large) = options.sizes;
    if !(small >= 0.0 && large >= small) {
        return Err(PlotError::InvalidArgument(format!(
            "sizes must satisfy 0 <= min <= max, got ({}, {})",
            small, large
        )));
    }

    let x = AxisData::from_column(&counts, &options.x_col)?;
    let y = AxisData::from_column(&counts, &options.y_col)?;
    let n: Vec<f64> = numeric_values(&counts, COUNT_COL)?
        .into_iter()
        .map(|c| c.unwrap_or(0.0))
        .collect();
    let sizes = SizeScale::new(&n, options.sizes);
    let hue = options
        .hue_col
        .as_deref()
        .map(|h| HueScale::new(&counts, h, &options.palette))
        .transpose()?;
    debug!("Bubble plot over {} groups", counts.height());

    let mut bubbles = Vec::with_capacity(counts.height());
    for row in 0..counts.height() {
        let (Some(bx), Some(by)) = (x.positions[row], y.positions[row]) else {
            continue;
        };
        let color = match &hue {
            Some(hue) => match hue.color(row)? {
                Some(color) => color,
                None => continue,
            },
            None => DEEP[0],
        };
        bubbles.push(((bx, by), sizes.radius(n[row]), color));
    }

    let mut entries = Vec::new();
    if let (Some(hue), Some(name)) = (&hue, options.hue_col.as_deref()) {
        entries.push(LegendEntry::new(name, Swatch::Blank));
        entries.extend(hue.legend_entries(sizes.radius((sizes.lo + sizes.hi) / 2.0))?);
    }
    entries.push(LegendEntry::new(COUNT_COL, Swatch::Blank));
    entries.extend(sizes.legend_levels(&n).into_iter().map(|level| {
        LegendEntry::new(
            format_tick(level, None),
            Swatch::Dot {
                color: SIZE_LEGEND_COLOR,
                radius: sizes.radius(level),
            },
        )
    }));
    let legend = LegendSpec {
        title: None,
        entries,
        placement: options.legend,
        font_size: LEGEND_FONT_SIZE,
    };

    let ctx = RenderCtx::new(options.dpi);
    let mut figure = Figure::blank(options.figsize, options.dpi)?;
    figure.draw(|root| {
        let mut layout = AxesLayout::new(axis_range(&x), axis_range(&y), options.theme);
        layout.title = options.title.as_deref();
        layout.xlabel = options.xlabel.as_deref();
        layout.ylabel = options.ylabel.as_deref();
        layout.x_categories = x.categories.as_deref();
        layout.y_categories = y.categories.as_deref();
        layout.rotate_x_labels = options.rotate_x_labels;
        layout.grid = Grid::from_theme(options.theme, x.is_categorical());
        layout.right_reserve = legend.reserve(root, &ctx);
        let chart = build_axes(root, &layout, &ctx)?;

        // drawn in pixel space so bubbles may overhang the axes
        let edge = BLACK.stroke_width(1);
        for (point, radius, color) in &bubbles {
            let r = ctx.px(*radius).round().max(1.0) as i32;
            draw_marker(
                root,
                chart.backend_coord(point),
                Marker::Circle,
                r,
                color.mix(options.alpha),
                Some(edge),
            )?;
        }

        draw_spines(root, &chart, &Spines::despined(), options.theme, &ctx)?;
        draw_legend(root, chart.plotting_area().get_pixel_range(), &legend, &ctx)
    })?;

    options.output.apply(&figure)?;
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn runs() -> DataFrame {
        df!(
            "model" => ["cnn", "cnn", "vit", "vit", "vit"],
            "dataset" => ["mnist", "mnist", "mnist", "cifar", "cifar"],
            "depth" => [4i64, 4, 12, 12, 24]
        )
        .unwrap()
    }

    fn quick() -> BubbleOptions {
        BubbleOptions {
            groupby: vec!["model".into(), "dataset".into()],
            x_col: "model".into(),
            y_col: "dataset".into(),
            figsize: FigureSize::new(4.0, 2.0),
            dpi: 40,
            ..Default::default()
        }
    }

    #[test]
    fn counts_expose_group_sizes() {
        let counts = bubble_counts(&runs(), &["model".into()], None).unwrap();
        assert_eq!(counts.height(), 2);
        assert_eq!(
            numeric_values(&counts, COUNT_COL).unwrap(),
            vec![Some(2.0), Some(3.0)]
        );
    }

    #[test]
    fn size_scale_maps_counts_linearly() {
        let scale = SizeScale::new(&[1.0, 3.0], (50.0, 450.0));
        assert_eq!(scale.area(1.0), 50.0);
        assert_eq!(scale.area(2.0), 250.0);
        assert_eq!(scale.radius(3.0), 450f64.sqrt() / 2.0);

        let flat = SizeScale::new(&[2.0, 2.0], (50.0, 450.0));
        assert_eq!(flat.area(2.0), 250.0);
        assert_eq!(flat.legend_levels(&[2.0, 2.0]), vec![2.0]);
    }

    #[test]
    fn bubbles_with_categorical_and_numeric_hue() {
        let by_model = BubbleOptions {
            hue_col: Some("model".into()),
            sort_col: Some(COUNT_COL.into()),
            ..quick()
        };
        assert!(plot_bubble(&runs(), &by_model).is_ok());

        let by_depth = BubbleOptions {
            groupby: vec!["model".into(), "dataset".into(), "depth".into()],
            hue_col: Some("depth".into()),
            palette: Palette::named("mako"),
            ..quick()
        };
        assert!(plot_bubble(&runs(), &by_depth).is_ok());
    }

    #[test]
    fn axis_column_must_survive_grouping() {
        let options = BubbleOptions {
            groupby: vec!["model".into()],
            ..quick()
        };
        assert!(plot_bubble(&runs(), &options).is_err());
    }
}
