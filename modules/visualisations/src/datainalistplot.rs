//! Mean curves with optional standard deviation bands.

use crate::charts::axes::{build_axes, draw_line, draw_spines, padded_range, AxesLayout, RenderCtx};
use crate::charts::legend::{draw_legend, LegendEntry, LegendSpec, Swatch};
use crate::charts::{Figure, FigureSize, Legend, LineStyle, Output, Palette, Spines, Theme};
use crate::error::{render_err, PlotError, Result};
use plotters::prelude::*;
use tracing::debug;

pub use crate::stats::MeanStd;

/// Options for [`plot_data_inalist`].
#[derive(Debug, Clone)]
pub struct CurveOptions {
    /// X values per curve; `0..len` when `None`.
    pub x: Option<Vec<Vec<f64>>>,
    /// Standard deviation per curve, shaded as `mean ± std`.
    pub std: Option<Vec<Vec<f64>>>,
    /// Curve labels. The legend is only drawn when labels are given.
    pub labels: Option<Vec<String>>,
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub figsize: FigureSize,
    /// Line width in points.
    pub linewidth: f64,
    pub linealpha: f64,
    pub fill_between: bool,
    pub palette: Palette,
    pub theme: Theme,
    pub font_scale: f64,
    pub despine: bool,
    pub dpi: u32,
    pub output: Output,
}

impl Default for CurveOptions {
    fn default() -> Self {
        Self {
            x: None,
            std: None,
            labels: None,
            title: String::new(),
            xlabel: String::new(),
            ylabel: String::new(),
            figsize: FigureSize::new(8.0, 5.0),
            linewidth: 1.5,
            linealpha: 0.9,
            fill_between: true,
            palette: Palette::named("viridis"),
            theme: Theme::DarkGrid,
            font_scale: 0.9,
            despine: true,
            dpi: 300,
            output: Output::default(),
        }
    }
}

impl CurveOptions {
    /// Curves from a [`MeanStd`] summary with its std as the band.
    pub fn with_mean_std(mut self, summary: &MeanStd) -> Self {
        self.std = Some(vec![summary.std.clone()]);
        self
    }
}

struct Curve {
    points: Vec<(f64, f64)>,
    band: Option<Vec<(f64, f64, f64)>>,
}

fn build_curves(means: &[Vec<f64>], options: &CurveOptions) -> Result<Vec<Curve>> {
    if let Some(xs) = &options.x {
        if xs.len() < means.len() {
            return Err(PlotError::InvalidArgument(format!(
                "{} x series for {} curves",
                xs.len(),
                means.len()
            )));
        }
    }

    means
        .iter()
        .enumerate()
        .map(|(i, mean)| {
            let xs: Vec<f64> = match &options.x {
                Some(xs) => xs[i].clone(),
                None => (0..mean.len()).map(|k| k as f64).collect(),
            };
            if xs.len() != mean.len() {
                return Err(PlotError::InvalidArgument(format!(
                    "curve {} has {} x values and {} means",
                    i,
                    xs.len(),
                    mean.len()
                )));
            }

            let std = options
                .std
                .as_ref()
                .and_then(|s| s.get(i))
                .filter(|_| options.fill_between);
            let band = match std {
                Some(std) if std.len() != mean.len() => {
                    return Err(PlotError::InvalidArgument(format!(
                        "curve {} has {} std values and {} means",
                        i,
                        std.len(),
                        mean.len()
                    )))
                }
                Some(std) => Some(
                    xs.iter()
                        .zip(mean)
                        .zip(std)
                        .map(|((x, m), s)| (*x, m - s, m + s))
                        .collect(),
                ),
                None => None,
            };

            Ok(Curve {
                points: xs.into_iter().zip(mean.iter().copied()).collect(),
                band,
            })
        })
        .collect()
}

/// One line per mean series, with shaded `mean ± std` bands when given.
pub fn plot_data_inalist(means: &[Vec<f64>], options: &CurveOptions) -> Result<Figure> {
    if means.is_empty() || means.iter().all(Vec::is_empty) {
        return Err(PlotError::EmptyData("no curves given".into()));
    }
    let curves = build_curves(means, options)?;
    let colors = options.palette.colors(means.len())?;
    debug!("Plotting {} curves", curves.len());

    let x_range = padded_range(curves.iter().flat_map(|c| c.points.iter().map(|p| p.0)), 0.05)
        .unwrap_or(0.0..1.0);
    let y_values = curves.iter().flat_map(|c| {
        let band = c.band.iter().flatten().flat_map(|(_, lo, hi)| [*lo, *hi]);
        c.points.iter().map(|p| p.1).chain(band)
    });
    let y_range = padded_range(y_values, 0.05).unwrap_or(0.0..1.0);

    let labels: Vec<String> = (0..means.len())
        .map(|i| {
            options
                .labels
                .as_ref()
                .and_then(|l| l.get(i).cloned())
                .unwrap_or_else(|| format!("Line {}", i + 1))
        })
        .collect();
    let legend = LegendSpec {
        title: None,
        entries: match options.labels {
            Some(_) => labels
                .iter()
                .zip(&colors)
                .map(|(label, color)| {
                    LegendEntry::new(
                        label.clone(),
                        Swatch::Line {
                            color: *color,
                            width: options.linewidth,
                            style: LineStyle::Solid,
                            marker: None,
                        },
                    )
                })
                .collect(),
            None => Vec::new(),
        },
        placement: Legend::Inside,
        font_size: 11.0 * options.font_scale,
    };
    let spines = if options.despine {
        Spines::despined()
    } else {
        Spines::default()
    };

    let ctx = RenderCtx::new(options.dpi);
    let mut figure = Figure::blank(options.figsize, options.dpi)?;
    figure.draw(|root| {
        let mut layout = AxesLayout::new(x_range, y_range, options.theme);
        layout.title = Some(options.title.as_str());
        layout.title_size = 12.0 * options.font_scale;
        layout.xlabel = Some(options.xlabel.as_str());
        layout.ylabel = Some(options.ylabel.as_str());
        layout.label_size = 12.0 * options.font_scale;
        layout.x_tick_size = 11.0 * options.font_scale;
        layout.y_tick_size = 11.0 * options.font_scale;
        let mut chart = build_axes(root, &layout, &ctx)?;

        let stroke = ctx.px_u32(options.linewidth);
        for (curve, color) in curves.iter().zip(&colors) {
            if let Some(band) = &curve.band {
                let (xr, yr) = (chart.x_range(), chart.y_range());
                let clamp = |x: f64, y: f64| (x.clamp(xr.start, xr.end), y.clamp(yr.start, yr.end));
                let outline: Vec<(f64, f64)> = band
                    .iter()
                    .map(|(x, _, hi)| clamp(*x, *hi))
                    .chain(band.iter().rev().map(|(x, lo, _)| clamp(*x, *lo)))
                    .collect();
                chart
                    .draw_series(std::iter::once(Polygon::new(outline, color.mix(0.3).filled())))
                    .map_err(render_err)?;
            }
            let style = color.mix(options.linealpha).stroke_width(stroke);
            draw_line(&mut chart, &curve.points, style, LineStyle::Solid)?;
        }

        draw_spines(root, &chart, &spines, options.theme, &ctx)?;
        draw_legend(root, chart.plotting_area().get_pixel_range(), &legend, &ctx)
    })?;

    options.output.apply(&figure)?;
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick() -> CurveOptions {
        CurveOptions {
            figsize: FigureSize::new(2.0, 2.0),
            dpi: 40,
            ..Default::default()
        }
    }

    #[test]
    fn curves_default_to_index_x() {
        let curves = build_curves(&[vec![1.0, 2.0, 3.0]], &quick()).unwrap();
        assert_eq!(curves[0].points, vec![(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
        assert!(curves[0].band.is_none());
    }

    #[test]
    fn bands_follow_std() {
        let options = CurveOptions {
            std: Some(vec![vec![0.5, 0.5]]),
            ..quick()
        };
        let curves = build_curves(&[vec![1.0, 2.0]], &options).unwrap();
        assert_eq!(curves[0].band, Some(vec![(0.0, 0.5, 1.5), (1.0, 1.5, 2.5)]));

        let no_fill = CurveOptions {
            fill_between: false,
            ..options
        };
        assert!(build_curves(&[vec![1.0, 2.0]], &no_fill).unwrap()[0].band.is_none());
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let short_x = CurveOptions {
            x: Some(vec![vec![0.0]]),
            ..quick()
        };
        assert!(plot_data_inalist(&[vec![1.0, 2.0]], &short_x).is_err());

        let missing_x = CurveOptions {
            x: Some(Vec::new()),
            ..quick()
        };
        assert!(plot_data_inalist(&[vec![1.0]], &missing_x).is_err());
        assert!(plot_data_inalist(&[], &quick()).is_err());
    }

    #[test]
    fn plots_runs_summary_with_labels() {
        let summary = MeanStd::from_runs(&[vec![1.0, 0.5, 0.2], vec![1.2, 0.7, 0.3]]).unwrap();
        let options = CurveOptions {
            labels: Some(vec!["loss".into()]),
            ..quick()
        }
        .with_mean_std(&summary);
        assert!(plot_data_inalist(&[summary.mean.clone()], &options).is_ok());
    }
}
