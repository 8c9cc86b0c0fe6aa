//! Styling vocabulary shared by the plotting helpers.
//!
//! Everything parses from the matplotlib/seaborn spelling so option values can
//! come straight from a config file.

use crate::charts::palette::parse_color;
use crate::error::{PlotError, Result};
use plotters::style::RGBColor;
use std::str::FromStr;

/// Seaborn-like axes themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    DarkGrid,
    WhiteGrid,
    Dark,
    White,
    Ticks,
}

impl Theme {
    pub(crate) fn background(&self) -> RGBColor {
        match self {
            Theme::DarkGrid | Theme::Dark => RGBColor(234, 234, 242),
            Theme::WhiteGrid | Theme::White | Theme::Ticks => RGBColor(255, 255, 255),
        }
    }

    pub(crate) fn grid_color(&self) -> Option<RGBColor> {
        match self {
            Theme::DarkGrid => Some(RGBColor(255, 255, 255)),
            Theme::WhiteGrid => Some(RGBColor(204, 204, 204)),
            Theme::Dark | Theme::White | Theme::Ticks => None,
        }
    }

    /// Spine color when not highlighted; `None` hides the spine.
    pub(crate) fn spine_color(&self) -> Option<RGBColor> {
        match self {
            Theme::DarkGrid | Theme::Dark => None,
            Theme::WhiteGrid => Some(RGBColor(204, 204, 204)),
            Theme::White | Theme::Ticks => Some(RGBColor(38, 38, 38)),
        }
    }
}

impl FromStr for Theme {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "darkgrid" => Ok(Theme::DarkGrid),
            "whitegrid" => Ok(Theme::WhiteGrid),
            "dark" => Ok(Theme::Dark),
            "white" => Ok(Theme::White),
            "ticks" => Ok(Theme::Ticks),
            _ => Err(PlotError::UnknownStyle {
                kind: "theme",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    DashDot,
    Dotted,
}

impl LineStyle {
    /// Dash and gap lengths in multiples of the line width.
    pub(crate) fn pattern(&self) -> Option<(f64, f64)> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some((3.7, 1.6)),
            LineStyle::DashDot => Some((6.4, 3.2)),
            LineStyle::Dotted => Some((1.0, 1.65)),
        }
    }
}

impl FromStr for LineStyle {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "-" | "solid" => Ok(LineStyle::Solid),
            "--" | "dashed" => Ok(LineStyle::Dashed),
            "-." | "dashdot" => Ok(LineStyle::DashDot),
            ":" | "dotted" => Ok(LineStyle::Dotted),
            _ => Err(PlotError::UnknownStyle {
                kind: "line style",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Square,
    TriangleUp,
    Diamond,
    Star,
    Point,
}

impl FromStr for Marker {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "o" => Ok(Marker::Circle),
            "s" => Ok(Marker::Square),
            "^" => Ok(Marker::TriangleUp),
            "D" | "d" => Ok(Marker::Diamond),
            "*" => Ok(Marker::Star),
            "." => Ok(Marker::Point),
            _ => Err(PlotError::UnknownStyle {
                kind: "marker",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spine {
    Top,
    Right,
    Bottom,
    Left,
}

impl Spine {
    pub const ALL: [Spine; 4] = [Spine::Top, Spine::Right, Spine::Bottom, Spine::Left];
}

impl FromStr for Spine {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "top" => Ok(Spine::Top),
            "right" => Ok(Spine::Right),
            "bottom" => Ok(Spine::Bottom),
            "left" => Ok(Spine::Left),
            _ => Err(PlotError::UnknownStyle {
                kind: "spine",
                value: s.to_string(),
            }),
        }
    }
}

/// Line parameters for highlighted spines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpineStyle {
    /// Width in points.
    pub linewidth: f64,
    pub color: RGBColor,
}

impl SpineStyle {
    pub fn new(linewidth: f64, color: &str) -> Result<Self> {
        Ok(Self {
            linewidth,
            color: parse_color(color)?,
        })
    }
}

impl Default for SpineStyle {
    fn default() -> Self {
        Self {
            linewidth: 1.0,
            color: RGBColor(0, 0, 0),
        }
    }
}

/// Y axis limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum YLim {
    /// Upper bound with the lower bound at 0.
    Upper(f64),
    Range(f64, f64),
}

impl YLim {
    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            YLim::Upper(upper) => (0.0, upper),
            YLim::Range(lo, hi) => (lo, hi),
        }
    }
}

/// Legend placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Legend {
    Hidden,
    #[default]
    Inside,
    /// Right of the axes, top aligned.
    Outside,
}

impl Legend {
    /// Build from the `show_legend` / `legend_outside` flag pair.
    pub fn from_flags(show: bool, outside: bool) -> Self {
        match (show, outside) {
            (false, _) => Legend::Hidden,
            (true, false) => Legend::Inside,
            (true, true) => Legend::Outside,
        }
    }
}

/// Which spines are hidden or highlighted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spines {
    pub remove: Vec<Spine>,
    pub highlight: Vec<Spine>,
    pub highlight_style: SpineStyle,
}

impl Spines {
    /// Hide the top and right spines.
    pub fn despined() -> Self {
        Self {
            remove: vec![Spine::Top, Spine::Right],
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matplotlib_spellings_parse() {
        assert_eq!("--".parse::<LineStyle>().unwrap(), LineStyle::Dashed);
        assert_eq!(":".parse::<LineStyle>().unwrap(), LineStyle::Dotted);
        assert_eq!("^".parse::<Marker>().unwrap(), Marker::TriangleUp);
        assert_eq!("D".parse::<Marker>().unwrap(), Marker::Diamond);
        assert_eq!("left".parse::<Spine>().unwrap(), Spine::Left);
        assert_eq!("whitegrid".parse::<Theme>().unwrap(), Theme::WhiteGrid);
        assert!("zigzag".parse::<LineStyle>().is_err());
        assert!("x".parse::<Marker>().is_err());
    }

    #[test]
    fn ylim_upper_starts_at_zero() {
        assert_eq!(YLim::Upper(3.0).bounds(), (0.0, 3.0));
        assert_eq!(YLim::Range(-1.0, 1.0).bounds(), (-1.0, 1.0));
    }

    #[test]
    fn legend_flags_map_to_placement() {
        assert_eq!(Legend::from_flags(false, true), Legend::Hidden);
        assert_eq!(Legend::from_flags(true, true), Legend::Outside);
        assert_eq!(Legend::from_flags(true, false), Legend::Inside);
    }
}
