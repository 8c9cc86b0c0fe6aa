//! Legend box drawn in pixel space next to or inside the axes.

use crate::charts::axes::{draw_marker, RenderCtx};
use crate::charts::figure::Area;
use crate::charts::style::{Legend, LineStyle, Marker};
use crate::error::{render_err, Result};
use plotters::prelude::*;
use std::ops::Range;

/// Legend text size in points.
pub(crate) const LEGEND_FONT_SIZE: f64 = 10.0;

#[derive(Debug, Clone)]
pub(crate) enum Swatch {
    Line {
        color: RGBColor,
        /// Width in points.
        width: f64,
        style: LineStyle,
        marker: Option<Marker>,
    },
    Patch(RGBColor),
    /// Bubble of the given radius in points.
    Dot { color: RGBColor, radius: f64 },
    /// Text only; used for section headings.
    Blank,
}

#[derive(Debug, Clone)]
pub(crate) struct LegendEntry {
    pub label: String,
    pub swatch: Swatch,
}

impl LegendEntry {
    pub fn new(label: impl Into<String>, swatch: Swatch) -> Self {
        Self {
            label: label.into(),
            swatch,
        }
    }
}

pub(crate) struct LegendSpec<'a> {
    pub title: Option<&'a str>,
    pub entries: Vec<LegendEntry>,
    pub placement: Legend,
    pub font_size: f64,
}

struct Geometry {
    pad: i32,
    swatch_w: i32,
    row_h: i32,
    width: i32,
    height: i32,
}

impl LegendSpec<'_> {
    fn visible(&self, ctx: &RenderCtx) -> bool {
        ctx.text && self.placement != Legend::Hidden && !self.entries.is_empty()
    }

    /// Pixels the axes must leave free on the right.
    pub fn reserve(&self, root: &Area<'_>, ctx: &RenderCtx) -> u32 {
        if self.placement != Legend::Outside || !self.visible(ctx) {
            return 0;
        }
        let geo = self.geometry(root, ctx);
        (geo.width + geo.pad * 2).max(0) as u32
    }

    fn geometry(&self, root: &Area<'_>, ctx: &RenderCtx) -> Geometry {
        let font_px = ctx.px(self.font_size);
        let font = ctx.font(self.font_size);
        let text_w = |text: &str| -> i32 {
            root.estimate_text_size(text, &font)
                .map(|(w, _)| w as i32)
                .unwrap_or_else(|_| (text.chars().count() as f64 * font_px * 0.6) as i32)
        };

        let largest_dot = self
            .entries
            .iter()
            .filter_map(|e| match e.swatch {
                Swatch::Dot { radius, .. } => Some(ctx.px(radius) * 2.0),
                _ => None,
            })
            .fold(0.0_f64, f64::max);

        let pad = (font_px * 0.5).ceil() as i32;
        let swatch_w = (font_px * 2.0).max(largest_dot).ceil() as i32;
        let row_h = (font_px * 1.4).max(largest_dot + 4.0).ceil() as i32;

        let label_w = self.entries.iter().map(|e| text_w(&e.label)).max().unwrap_or(0);
        let title_w = self.title.map(|t| text_w(t)).unwrap_or(0);
        let width = (swatch_w + pad + label_w).max(title_w) + pad * 2;
        let rows = self.entries.len() as i32 + i32::from(self.title.is_some());
        let height = rows * row_h + pad * 2;

        Geometry {
            pad,
            swatch_w,
            row_h,
            width,
            height,
        }
    }
}

/// Draw the legend relative to the plotting area's pixel range.
pub(crate) fn draw_legend(
    root: &Area<'_>,
    plot: (Range<i32>, Range<i32>),
    spec: &LegendSpec<'_>,
    ctx: &RenderCtx,
) -> Result<()> {
    if !spec.visible(ctx) {
        return Ok(());
    }
    let geo = spec.geometry(root, ctx);
    let (xr, yr) = plot;
    let (x0, y0) = match spec.placement {
        Legend::Outside => (xr.end + geo.pad * 2, yr.start),
        _ => (xr.end - geo.width - geo.pad, yr.start + geo.pad),
    };

    root.draw(&Rectangle::new(
        [(x0, y0), (x0 + geo.width, y0 + geo.height)],
        WHITE.mix(0.85).filled(),
    ))
    .map_err(render_err)?;
    root.draw(&Rectangle::new(
        [(x0, y0), (x0 + geo.width, y0 + geo.height)],
        RGBColor(204, 204, 204).stroke_width(1),
    ))
    .map_err(render_err)?;

    let font = ctx.font(spec.font_size);
    let font_px = ctx.px(spec.font_size) as i32;
    let mut row_top = y0 + geo.pad;

    if let Some(title) = spec.title {
        root.draw(&Text::new(
            title.to_string(),
            (x0 + geo.pad, row_top + (geo.row_h - font_px) / 2),
            font.clone(),
        ))
        .map_err(render_err)?;
        row_top += geo.row_h;
    }

    for entry in &spec.entries {
        let cy = row_top + geo.row_h / 2;
        let sx = x0 + geo.pad;
        draw_swatch(root, &entry.swatch, sx, cy, geo.swatch_w, font_px, ctx)?;
        root.draw(&Text::new(
            entry.label.clone(),
            (sx + geo.swatch_w + geo.pad, cy - font_px / 2),
            font.clone(),
        ))
        .map_err(render_err)?;
        row_top += geo.row_h;
    }
    Ok(())
}

fn draw_swatch(
    root: &Area<'_>,
    swatch: &Swatch,
    sx: i32,
    cy: i32,
    swatch_w: i32,
    font_px: i32,
    ctx: &RenderCtx,
) -> Result<()> {
    match *swatch {
        Swatch::Line {
            color,
            width,
            style,
            marker,
        } => {
            let stroke = color.stroke_width(ctx.px_u32(width));
            let segments: Vec<(i32, i32)> = match style {
                LineStyle::Solid => vec![(sx, sx + swatch_w)],
                _ => {
                    let step = swatch_w / 5;
                    vec![(sx, sx + step), (sx + step * 2, sx + step * 3), (sx + step * 4, sx + swatch_w)]
                }
            };
            for (a, b) in segments {
                root.draw(&PathElement::new(vec![(a, cy), (b, cy)], stroke))
                    .map_err(render_err)?;
            }
            if let Some(marker) = marker {
                let r = (font_px / 4).max(2);
                draw_marker(root, (sx + swatch_w / 2, cy), marker, r, color.mix(1.0), None)?;
            }
        }
        Swatch::Patch(color) => {
            let half = (font_px as f64 * 0.4) as i32;
            root.draw(&Rectangle::new(
                [(sx + swatch_w / 5, cy - half), (sx + swatch_w * 4 / 5, cy + half)],
                color.filled(),
            ))
            .map_err(render_err)?;
        }
        Swatch::Dot { color, radius } => {
            let r = ctx.px(radius).round().max(1.0) as i32;
            draw_marker(
                root,
                (sx + swatch_w / 2, cy),
                Marker::Circle,
                r,
                color.mix(0.8),
                Some(BLACK.stroke_width(1)),
            )?;
        }
        Swatch::Blank => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::axes::{build_axes, AxesLayout};
    use crate::charts::figure::{Figure, FigureSize};
    use crate::charts::style::Theme;

    fn spec(placement: Legend) -> LegendSpec<'static> {
        LegendSpec {
            title: Some("split"),
            entries: vec![
                LegendEntry::new("train", Swatch::Patch(RED)),
                LegendEntry::new("val", Swatch::Dot { color: BLUE, radius: 4.0 }),
            ],
            placement,
            font_size: LEGEND_FONT_SIZE,
        }
    }

    #[test]
    fn figures_render_without_any_font() {
        let ctx = RenderCtx { dpi: 40, text: false };
        let legend = spec(Legend::Outside);
        let categories = vec!["a".to_string(), "b".to_string()];
        let mut fig = Figure::blank(FigureSize::new(3.0, 2.0), ctx.dpi).unwrap();

        let reserved = fig
            .draw(|root| {
                let reserved = legend.reserve(root, &ctx);
                let mut layout = AxesLayout::new(-0.5..1.5, 0.0..1.0, Theme::DarkGrid);
                layout.title = Some("loss");
                layout.xlabel = Some("epoch");
                layout.ylabel = Some("value");
                layout.x_categories = Some(&categories);
                layout.rotate_x_labels = true;
                layout.right_reserve = reserved;
                let chart = build_axes(root, &layout, &ctx)?;
                draw_legend(root, chart.plotting_area().get_pixel_range(), &legend, &ctx)?;
                Ok(reserved)
            })
            .unwrap();
        assert_eq!(reserved, 0);
    }

    #[test]
    fn only_visible_outside_legends_reserve_space() {
        let ctx = RenderCtx { dpi: 40, text: true };
        let mut fig = Figure::blank(FigureSize::new(3.0, 2.0), ctx.dpi).unwrap();
        fig.draw(|root| {
            assert_eq!(spec(Legend::Inside).reserve(root, &ctx), 0);
            assert_eq!(spec(Legend::Hidden).reserve(root, &ctx), 0);
            let empty = LegendSpec {
                entries: Vec::new(),
                ..spec(Legend::Outside)
            };
            assert_eq!(empty.reserve(root, &ctx), 0);
            Ok(())
        })
        .unwrap();
    }
}
