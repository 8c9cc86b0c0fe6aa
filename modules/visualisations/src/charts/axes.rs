//! Axes construction and the drawing primitives the helpers share.
//!
//! All helpers plot on a plain f64 x f64 cartesian grid. Categorical axes put
//! category `i` at position `i` and swap the tick labels for category names.

use crate::charts::figure::Area;
use crate::charts::fonts::{self, FONT_FAMILY};
use crate::charts::style::{LineStyle, Marker, Spine, Spines, Theme};
use crate::error::{render_err, Result};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use std::ops::Range;

pub(crate) type Chart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Pixel scale and text availability for one render.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RenderCtx {
    pub dpi: u32,
    pub text: bool,
}

impl RenderCtx {
    pub fn new(dpi: u32) -> Self {
        Self {
            dpi,
            text: fonts::text_available(),
        }
    }

    /// Points to pixels.
    pub fn px(&self, points: f64) -> f64 {
        points * self.dpi as f64 / 72.0
    }

    pub fn px_u32(&self, points: f64) -> u32 {
        self.px(points).round().max(1.0) as u32
    }

    pub fn font(&self, points: f64) -> TextStyle<'static> {
        (FONT_FAMILY, self.px(points)).into_font().color(&BLACK)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Grid {
    None,
    Both,
    YOnly,
}

impl Grid {
    /// Grid implied by the theme alone.
    pub fn from_theme(theme: Theme, categorical_x: bool) -> Self {
        match (theme.grid_color(), categorical_x) {
            (None, _) => Grid::None,
            (Some(_), true) => Grid::YOnly,
            (Some(_), false) => Grid::Both,
        }
    }
}

pub(crate) struct AxesLayout<'a> {
    pub title: Option<&'a str>,
    pub title_size: f64,
    pub xlabel: Option<&'a str>,
    pub ylabel: Option<&'a str>,
    pub label_size: f64,
    pub x_tick_size: f64,
    pub y_tick_size: f64,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub x_categories: Option<&'a [String]>,
    pub y_categories: Option<&'a [String]>,
    pub rotate_x_labels: bool,
    /// Label y ticks top-down (image rows).
    pub y_flipped: bool,
    pub theme: Theme,
    pub grid: Grid,
    /// Pixels kept free right of the axes (outside legend).
    pub right_reserve: u32,
}

impl<'a> AxesLayout<'a> {
    pub fn new(x_range: Range<f64>, y_range: Range<f64>, theme: Theme) -> Self {
        Self {
            title: None,
            title_size: 12.0,
            xlabel: None,
            ylabel: None,
            label_size: 11.0,
            x_tick_size: 10.0,
            y_tick_size: 10.0,
            x_range,
            y_range,
            x_categories: None,
            y_categories: None,
            rotate_x_labels: false,
            y_flipped: false,
            theme,
            grid: Grid::from_theme(theme, false),
            right_reserve: 0,
        }
    }
}

/// Fill the figure, lay out title and label areas, and draw the mesh.
pub(crate) fn build_axes<'a, 'b>(
    root: &'a Area<'b>,
    layout: &AxesLayout<'_>,
    ctx: &RenderCtx,
) -> Result<Chart<'a, 'b>> {
    root.fill(&WHITE).map_err(render_err)?;

    let margin = ctx.px_u32(8.0);
    let mut builder = ChartBuilder::on(root);
    builder.margin(margin).margin_right(margin + layout.right_reserve);
    if ctx.text {
        if let Some(title) = layout.title.filter(|t| !t.is_empty()) {
            builder.caption(title, ctx.font(layout.title_size));
        }
        builder
            .x_label_area_size(x_label_area(layout, ctx))
            .y_label_area_size(y_label_area(layout, ctx));
    }

    let mut chart = builder
        .build_cartesian_2d(layout.x_range.clone(), layout.y_range.clone())
        .map_err(render_err)?;
    chart
        .plotting_area()
        .fill(&layout.theme.background())
        .map_err(render_err)?;

    let x_categories = layout.x_categories;
    let y_categories = layout.y_categories;
    let x_fmt = move |v: &f64| format_tick(*v, x_categories);
    let y_flip = layout
        .y_flipped
        .then(|| layout.y_range.start + layout.y_range.end);
    let y_fmt = move |v: &f64| format_tick(y_flip.map_or(*v, |sum| sum - *v), y_categories);

    let x_tick_font = if layout.rotate_x_labels {
        (FONT_FAMILY, ctx.px(layout.x_tick_size))
            .into_font()
            .transform(FontTransform::Rotate90)
            .color(&BLACK)
    } else {
        ctx.font(layout.x_tick_size)
    };

    {
        let mut mesh = chart.configure_mesh();
        mesh.x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .x_labels(label_count(x_categories, 8))
            .y_labels(label_count(y_categories, 6))
            .axis_style(TRANSPARENT.stroke_width(1))
            .x_label_style(x_tick_font)
            .y_label_style(ctx.font(layout.y_tick_size))
            .axis_desc_style(ctx.font(layout.label_size));

        if ctx.text {
            if let Some(xlabel) = layout.xlabel.filter(|l| !l.is_empty()) {
                mesh.x_desc(xlabel);
            }
            if let Some(ylabel) = layout.ylabel.filter(|l| !l.is_empty()) {
                mesh.y_desc(ylabel);
            }
        }

        if layout.grid == Grid::None {
            mesh.disable_mesh();
        } else {
            let color = layout.theme.grid_color().unwrap_or(RGBColor(176, 176, 176));
            mesh.bold_line_style(color.stroke_width(ctx.px_u32(0.8)))
                .light_line_style(color.mix(0.5).stroke_width(1))
                .x_max_light_lines(2)
                .y_max_light_lines(2);
            if layout.grid == Grid::YOnly || x_categories.is_some() {
                mesh.disable_x_mesh();
            }
            if y_categories.is_some() {
                mesh.disable_y_mesh();
            }
        }

        mesh.draw().map_err(render_err)?;
    }

    Ok(chart)
}

fn label_count(categories: Option<&[String]>, numeric: usize) -> usize {
    match categories {
        // step 0.5 or finer, so every integer position gets a key point
        Some(cats) => cats.len() * 2 + 1,
        None => numeric,
    }
}

fn x_label_area(layout: &AxesLayout<'_>, ctx: &RenderCtx) -> u32 {
    let tick = ctx.px(layout.x_tick_size);
    let ticks = if layout.rotate_x_labels {
        let longest = longest_label(layout.x_categories).max(4);
        longest as f64 * tick * 0.62 + tick
    } else {
        tick * 2.0
    };
    let desc = if layout.xlabel.is_some_and(|l| !l.is_empty()) {
        ctx.px(layout.label_size) * 1.8
    } else {
        0.0
    };
    (ticks + desc).ceil() as u32
}

fn y_label_area(layout: &AxesLayout<'_>, ctx: &RenderCtx) -> u32 {
    let tick = ctx.px(layout.y_tick_size);
    let longest = longest_label(layout.y_categories).max(6);
    let desc = if layout.ylabel.is_some_and(|l| !l.is_empty()) {
        ctx.px(layout.label_size) * 1.8
    } else {
        0.0
    };
    (longest as f64 * tick * 0.62 + tick + desc).ceil() as u32
}

fn longest_label(categories: Option<&[String]>) -> usize {
    categories
        .map(|cats| cats.iter().map(|c| c.chars().count()).max().unwrap_or(0))
        .unwrap_or(0)
}

/// Tick text: the category name on integer positions, a compact number
/// otherwise.
pub(crate) fn format_tick(v: f64, categories: Option<&[String]>) -> String {
    if let Some(cats) = categories {
        let idx = v.round();
        if (v - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        return cats.get(idx as usize).cloned().unwrap_or_default();
    }

    if v.abs() < 1e-12 {
        return "0".to_string();
    }
    if v.abs() >= 1e5 || v.abs() < 1e-3 {
        return format!("{:.1e}", v);
    }
    let s = format!("{:.3}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Data range padded by `pad` of its span on both sides.
pub(crate) fn padded_range<I: IntoIterator<Item = f64>>(values: I, pad: f64) -> Option<Range<f64>> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return None;
    }
    if (hi - lo).abs() < f64::EPSILON {
        return Some(lo - 0.5..hi + 0.5);
    }
    let span = hi - lo;
    Some(lo - span * pad..hi + span * pad)
}

/// Axis range for `n` categories at positions `0..n`.
pub(crate) fn category_range(n: usize) -> Range<f64> {
    -0.5..(n.max(1) as f64 - 0.5)
}

/// Part of the segment `a`-`b` inside the box (Liang-Barsky).
///
/// Endpoints that are already inside come back bit-identical.
fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    x: &Range<f64>,
    y: &Range<f64>,
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let edges = [
        (-dx, a.0 - x.start),
        (dx, x.end - a.0),
        (-dy, a.1 - y.start),
        (dy, y.end - a.1),
    ];
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            t0 = t0.max(q / p);
        } else {
            t1 = t1.min(q / p);
        }
    }
    if t0 > t1 {
        return None;
    }
    let at = |t: f64| (a.0 + t * dx, a.1 + t * dy);
    let start = if t0 == 0.0 { a } else { at(t0) };
    let end = if t1 == 1.0 { b } else { at(t1) };
    Some((start, end))
}

/// Split a polyline into the runs that lie inside the box.
pub(crate) fn clip_polyline(
    points: &[(f64, f64)],
    x: &Range<f64>,
    y: &Range<f64>,
) -> Vec<Vec<(f64, f64)>> {
    let inside = |p: &(f64, f64)| x.contains(&p.0) && y.contains(&p.1);
    if points.len() == 1 {
        return points.iter().copied().filter(inside).map(|p| vec![p]).collect();
    }

    let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
    for pair in points.windows(2) {
        let Some((start, end)) = clip_segment(pair[0], pair[1], x, y) else {
            continue;
        };
        match runs.last_mut() {
            Some(run) if run.last() == Some(&start) => run.push(end),
            _ => runs.push(vec![start, end]),
        }
    }
    runs
}

/// Draw a polyline in data coordinates with the given dash pattern, clipped
/// to the chart ranges.
pub(crate) fn draw_line(
    chart: &mut Chart<'_, '_>,
    points: &[(f64, f64)],
    style: ShapeStyle,
    line_style: LineStyle,
) -> Result<()> {
    let (x_range, y_range) = (chart.x_range(), chart.y_range());
    for run in clip_polyline(points, &x_range, &y_range) {
        match line_style.pattern() {
            None => {
                chart
                    .draw_series(LineSeries::new(run, style))
                    .map_err(render_err)?;
            }
            Some((dash, gap)) => {
                let width = style.stroke_width.max(1) as f64;
                let dash = (dash * width).round().max(1.0) as i32;
                let gap = (gap * width).round().max(1.0) as i32;
                chart
                    .draw_series(DashedLineSeries::new(run, dash, gap, style))
                    .map_err(render_err)?;
            }
        }
    }
    Ok(())
}

/// Marker outline in pixels; `None` for the round markers.
fn marker_outline(center: (i32, i32), marker: Marker, r: i32) -> Option<Vec<(i32, i32)>> {
    let (x, y) = center;
    let rf = r as f64;
    let outline = match marker {
        Marker::Circle | Marker::Point => return None,
        Marker::Square => vec![(x - r, y - r), (x + r, y - r), (x + r, y + r), (x - r, y + r)],
        Marker::TriangleUp => {
            let h = (rf * 0.8) as i32;
            vec![(x, y - r), (x + r, y + h), (x - r, y + h)]
        }
        Marker::Diamond => {
            let w = (rf * 0.7) as i32;
            vec![(x, y - r), (x + w, y), (x, y + r), (x - w, y)]
        }
        Marker::Star => (0..10)
            .map(|i| {
                let angle = std::f64::consts::PI * i as f64 / 5.0 - std::f64::consts::FRAC_PI_2;
                let len = if i % 2 == 0 { rf } else { rf * 0.45 };
                (x + (angle.cos() * len) as i32, y + (angle.sin() * len) as i32)
            })
            .collect(),
    };
    Some(outline)
}

fn round_radius(marker: Marker, r: i32) -> i32 {
    if marker == Marker::Point {
        (r / 2).max(1)
    } else {
        r
    }
}

/// Draw one marker centred on a pixel position.
pub(crate) fn draw_marker(
    root: &Area<'_>,
    center: (i32, i32),
    marker: Marker,
    radius: i32,
    fill: RGBAColor,
    edge: Option<ShapeStyle>,
) -> Result<()> {
    let r = radius.max(1);
    let Some(outline) = marker_outline(center, marker, r) else {
        let radius = round_radius(marker, r) as u32;
        root.draw(&Circle::new(center, radius, fill.filled()))
            .map_err(render_err)?;
        if let Some(edge) = edge {
            root.draw(&Circle::new(center, radius, edge)).map_err(render_err)?;
        }
        return Ok(());
    };

    root.draw(&Polygon::new(outline.clone(), fill.filled()))
        .map_err(render_err)?;
    if let Some(edge) = edge {
        let mut closed = outline;
        closed.push(closed[0]);
        root.draw(&PathElement::new(closed, edge)).map_err(render_err)?;
    }
    Ok(())
}

/// Like [`draw_marker`], but nothing is painted outside `clip` (a pixel
/// range as returned by `get_pixel_range`).
pub(crate) fn draw_marker_clipped(
    root: &Area<'_>,
    clip: &(Range<i32>, Range<i32>),
    center: (i32, i32),
    marker: Marker,
    radius: i32,
    fill: RGBAColor,
    edge: Option<ShapeStyle>,
) -> Result<()> {
    let r = radius.max(1);
    let (cx, cy) = center;
    let (xs, ys) = clip;
    if xs.start <= cx - r && cx + r < xs.end && ys.start <= cy - r && cy + r < ys.end {
        return draw_marker(root, center, marker, radius, fill, edge);
    }

    let outline: Vec<(f64, f64)> = match marker_outline(center, marker, r) {
        Some(points) => points.into_iter().map(|(x, y)| (x as f64, y as f64)).collect(),
        None => {
            let rf = round_radius(marker, r) as f64;
            (0..32)
                .map(|i| {
                    let angle = std::f64::consts::TAU * i as f64 / 32.0;
                    (cx as f64 + angle.cos() * rf, cy as f64 + angle.sin() * rf)
                })
                .collect()
        }
    };
    // last pixel row / column still inside
    let x = xs.start as f64..(xs.end - 1) as f64;
    let y = ys.start as f64..(ys.end - 1) as f64;
    let to_px = |p: &(f64, f64)| (p.0.round() as i32, p.1.round() as i32);

    let body = clip_polygon(&outline, &x, &y);
    if body.len() >= 3 {
        root.draw(&Polygon::new(body.iter().map(to_px).collect::<Vec<_>>(), fill.filled()))
            .map_err(render_err)?;
    }
    if let Some(edge) = edge {
        let mut closed = outline;
        closed.push(closed[0]);
        for run in clip_polyline(&closed, &x, &y) {
            root.draw(&PathElement::new(run.iter().map(to_px).collect::<Vec<_>>(), edge))
                .map_err(render_err)?;
        }
    }
    Ok(())
}

/// Part of a polygon inside the box (Sutherland-Hodgman).
pub(crate) fn clip_polygon(points: &[(f64, f64)], x: &Range<f64>, y: &Range<f64>) -> Vec<(f64, f64)> {
    // left, right, bottom, top
    let bounds = [x.start, x.end, y.start, y.end];
    let inside = |p: (f64, f64), side: usize| match side {
        0 => p.0 >= bounds[0],
        1 => p.0 <= bounds[1],
        2 => p.1 >= bounds[2],
        _ => p.1 <= bounds[3],
    };
    let cross = |a: (f64, f64), b: (f64, f64), side: usize| {
        let v = bounds[side];
        if side < 2 {
            (v, a.1 + (b.1 - a.1) * (v - a.0) / (b.0 - a.0))
        } else {
            (a.0 + (b.0 - a.0) * (v - a.1) / (b.1 - a.1), v)
        }
    };

    let mut poly = points.to_vec();
    for side in 0..4 {
        if poly.is_empty() {
            break;
        }
        let input = std::mem::take(&mut poly);
        let mut prev = input[input.len() - 1];
        for &cur in &input {
            match (inside(cur, side), inside(prev, side)) {
                (true, true) => poly.push(cur),
                (true, false) => {
                    poly.push(cross(prev, cur, side));
                    poly.push(cur);
                }
                (false, true) => poly.push(cross(prev, cur, side)),
                (false, false) => {}
            }
            prev = cur;
        }
    }
    poly
}

/// Draw the axes frame lines according to theme, removals and highlights.
pub(crate) fn draw_spines(
    root: &Area<'_>,
    chart: &Chart<'_, '_>,
    spines: &Spines,
    theme: Theme,
    ctx: &RenderCtx,
) -> Result<()> {
    let (xr, yr) = chart.plotting_area().get_pixel_range();
    let (left, right, top, bottom) = (xr.start, xr.end - 1, yr.start, yr.end - 1);

    for spine in Spine::ALL {
        if spines.remove.contains(&spine) {
            continue;
        }
        let (color, width) = if spines.highlight.contains(&spine) {
            (
                spines.highlight_style.color,
                ctx.px_u32(spines.highlight_style.linewidth),
            )
        } else {
            match theme.spine_color() {
                Some(color) => (color, ctx.px_u32(0.8)),
                None => continue,
            }
        };
        let points = match spine {
            Spine::Top => vec![(left, top), (right, top)],
            Spine::Right => vec![(right, top), (right, bottom)],
            Spine::Bottom => vec![(left, bottom), (right, bottom)],
            Spine::Left => vec![(left, top), (left, bottom)],
        };
        root.draw(&PathElement::new(points, color.stroke_width(width)))
            .map_err(render_err)?;
    }
    Ok(())
}
