//! Color palettes and colormaps.

use crate::error::{PlotError, Result};
use plotters::style::RGBColor;

/// Seaborn "deep", the default color cycle.
pub const DEEP: [RGBColor; 10] = [
    RGBColor(76, 114, 176),
    RGBColor(221, 132, 82),
    RGBColor(85, 168, 104),
    RGBColor(196, 78, 82),
    RGBColor(129, 114, 179),
    RGBColor(147, 120, 96),
    RGBColor(218, 139, 195),
    RGBColor(140, 140, 140),
    RGBColor(204, 185, 116),
    RGBColor(100, 181, 205),
];

/// Matplotlib "tab10"; also what `C0`..`C9` resolve to.
pub const TAB10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

const VIRIDIS: [RGBColor; 10] = [
    RGBColor(68, 1, 84),
    RGBColor(72, 40, 120),
    RGBColor(62, 74, 137),
    RGBColor(49, 104, 142),
    RGBColor(38, 130, 142),
    RGBColor(31, 158, 137),
    RGBColor(53, 183, 121),
    RGBColor(109, 205, 89),
    RGBColor(180, 222, 44),
    RGBColor(253, 231, 37),
];

const MAGMA: [RGBColor; 9] = [
    RGBColor(0, 0, 4),
    RGBColor(28, 16, 68),
    RGBColor(79, 18, 123),
    RGBColor(129, 37, 129),
    RGBColor(181, 54, 122),
    RGBColor(229, 80, 100),
    RGBColor(251, 135, 97),
    RGBColor(254, 194, 135),
    RGBColor(252, 253, 191),
];

const PLASMA: [RGBColor; 9] = [
    RGBColor(13, 8, 135),
    RGBColor(76, 2, 161),
    RGBColor(126, 3, 168),
    RGBColor(169, 35, 149),
    RGBColor(204, 71, 120),
    RGBColor(229, 107, 93),
    RGBColor(248, 148, 65),
    RGBColor(253, 195, 40),
    RGBColor(240, 249, 33),
];

const ROCKET: [RGBColor; 8] = [
    RGBColor(3, 5, 26),
    RGBColor(54, 25, 62),
    RGBColor(112, 31, 87),
    RGBColor(174, 23, 89),
    RGBColor(225, 51, 66),
    RGBColor(243, 118, 81),
    RGBColor(246, 180, 142),
    RGBColor(250, 235, 221),
];

const MAKO: [RGBColor; 8] = [
    RGBColor(11, 4, 5),
    RGBColor(46, 30, 60),
    RGBColor(65, 61, 123),
    RGBColor(55, 101, 158),
    RGBColor(52, 143, 167),
    RGBColor(64, 183, 173),
    RGBColor(138, 217, 177),
    RGBColor(222, 245, 229),
];

const GRAY: [RGBColor; 2] = [RGBColor(0, 0, 0), RGBColor(255, 255, 255)];
const BINARY: [RGBColor; 2] = [RGBColor(255, 255, 255), RGBColor(0, 0, 0)];

/// Either a named palette/colormap or an explicit list of colors.
#[derive(Debug, Clone, PartialEq)]
pub enum Palette {
    /// `viridis`, `rocket`, `mako`, `magma`, `plasma`, `gray`, `binary`,
    /// `deep`, `tab10`; a trailing `_r` reverses.
    Named(String),
    /// Hex strings (`#4c72b0`, `#abc`), basic color names or `C0`..`C9`.
    Colors(Vec<String>),
}

impl Palette {
    pub fn named(name: impl Into<String>) -> Self {
        Palette::Named(name.into())
    }

    pub fn colors_from<S: AsRef<str>>(colors: &[S]) -> Self {
        Palette::Colors(colors.iter().map(|c| c.as_ref().to_string()).collect())
    }

    /// `n` colors from the palette.
    ///
    /// Continuous maps are sampled like seaborn does, skipping both ends
    /// (`linspace(0, 1, n + 2)[1..=n]`). Lists and categorical palettes cycle.
    pub fn colors(&self, n: usize) -> Result<Vec<RGBColor>> {
        match self {
            Palette::Colors(list) => {
                let parsed = list
                    .iter()
                    .map(|c| parse_color(c))
                    .collect::<Result<Vec<_>>>()?;
                if parsed.is_empty() {
                    return Err(PlotError::InvalidArgument("empty color list".into()));
                }
                Ok(cycle(&parsed, n))
            }
            Palette::Named(name) => {
                let (base, reversed) = split_reversed(name);
                if let Some(categorical) = categorical_palette(base) {
                    let mut colors = categorical.to_vec();
                    if reversed {
                        colors.reverse();
                    }
                    return Ok(cycle(&colors, n));
                }
                let stops = continuous_stops(base).ok_or_else(|| PlotError::UnknownStyle {
                    kind: "palette",
                    value: name.clone(),
                })?;
                Ok((1..=n)
                    .map(|i| {
                        let t = i as f64 / (n + 1) as f64;
                        interpolate(stops, if reversed { 1.0 - t } else { t })
                    })
                    .collect())
            }
        }
    }

    /// Color at `t` in `[0, 1]` for use as a colormap.
    ///
    /// Explicit lists and categorical palettes are treated as evenly spaced
    /// stops.
    pub fn sample(&self, t: f64) -> Result<RGBColor> {
        let t = t.clamp(0.0, 1.0);
        match self {
            Palette::Colors(list) => {
                let stops = list
                    .iter()
                    .map(|c| parse_color(c))
                    .collect::<Result<Vec<_>>>()?;
                if stops.is_empty() {
                    return Err(PlotError::InvalidArgument("empty color list".into()));
                }
                Ok(interpolate(&stops, t))
            }
            Palette::Named(name) => {
                let (base, reversed) = split_reversed(name);
                let stops = continuous_stops(base)
                    .or_else(|| categorical_palette(base))
                    .ok_or_else(|| PlotError::UnknownStyle {
                        kind: "colormap",
                        value: name.clone(),
                    })?;
                Ok(interpolate(stops, if reversed { 1.0 - t } else { t }))
            }
        }
    }

    /// Same palette with its direction flipped.
    pub fn reversed(&self) -> Self {
        match self {
            Palette::Named(name) => match name.strip_suffix("_r") {
                Some(base) => Palette::Named(base.to_string()),
                None => Palette::Named(format!("{}_r", name)),
            },
            Palette::Colors(list) => Palette::Colors(list.iter().rev().cloned().collect()),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::named("deep")
    }
}

impl From<&str> for Palette {
    fn from(name: &str) -> Self {
        Palette::named(name)
    }
}

/// Parse `#rrggbb`, `#rgb`, `C0`..`C9` or a basic color name.
pub fn parse_color(spec: &str) -> Result<RGBColor> {
    let spec = spec.trim();
    let unknown = || PlotError::UnknownStyle {
        kind: "color",
        value: spec.to_string(),
    };

    if let Some(hex) = spec.strip_prefix('#') {
        if !hex.is_ascii() {
            return Err(unknown());
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(unknown()),
        };
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| unknown());
        return Ok(RGBColor(channel(0)?, channel(2)?, channel(4)?));
    }

    if let Some(idx) = spec.strip_prefix('C').and_then(|d| d.parse::<usize>().ok()) {
        return Ok(TAB10[idx % TAB10.len()]);
    }

    let color = match spec.to_ascii_lowercase().as_str() {
        "black" | "k" => RGBColor(0, 0, 0),
        "white" | "w" => RGBColor(255, 255, 255),
        "red" | "r" => RGBColor(255, 0, 0),
        "green" | "g" => RGBColor(0, 128, 0),
        "blue" | "b" => RGBColor(0, 0, 255),
        "orange" => RGBColor(255, 165, 0),
        "purple" => RGBColor(128, 0, 128),
        "gray" | "grey" => RGBColor(128, 128, 128),
        "brown" => RGBColor(165, 42, 42),
        "pink" => RGBColor(255, 192, 203),
        "olive" => RGBColor(128, 128, 0),
        "cyan" | "c" => RGBColor(0, 255, 255),
        "magenta" | "m" => RGBColor(255, 0, 255),
        "yellow" | "y" => RGBColor(255, 255, 0),
        "navy" => RGBColor(0, 0, 128),
        "teal" => RGBColor(0, 128, 128),
        _ => return Err(unknown()),
    };
    Ok(color)
}

fn split_reversed(name: &str) -> (&str, bool) {
    match name.strip_suffix("_r") {
        Some(base) => (base, true),
        None => (name, false),
    }
}

fn categorical_palette(name: &str) -> Option<&'static [RGBColor]> {
    match name.to_ascii_lowercase().as_str() {
        "deep" => Some(&DEEP[..]),
        "tab10" => Some(&TAB10[..]),
        _ => None,
    }
}

fn continuous_stops(name: &str) -> Option<&'static [RGBColor]> {
    match name.to_ascii_lowercase().as_str() {
        "viridis" => Some(&VIRIDIS[..]),
        "magma" => Some(&MAGMA[..]),
        "plasma" => Some(&PLASMA[..]),
        "rocket" => Some(&ROCKET[..]),
        "mako" => Some(&MAKO[..]),
        "gray" | "grey" => Some(&GRAY[..]),
        "binary" | "greys" => Some(&BINARY[..]),
        _ => None,
    }
}

fn cycle(colors: &[RGBColor], n: usize) -> Vec<RGBColor> {
    (0..n).map(|i| colors[i % colors.len()]).collect()
}

fn interpolate(stops: &[RGBColor], t: f64) -> RGBColor {
    if stops.len() == 1 {
        return stops[0];
    }
    let pos = t.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = (lower + 1).min(stops.len() - 1);
    let frac = pos - lower as f64;
    let mix = |a: u8, b: u8| (a as f64 * (1.0 - frac) + b as f64 * frac).round() as u8;
    let (a, b) = (stops[lower], stops[upper]);
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}
