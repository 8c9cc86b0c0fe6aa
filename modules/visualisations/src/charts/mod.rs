pub(crate) mod axes;
pub mod figure;
pub mod fonts;
pub(crate) mod legend;
pub mod palette;
pub mod style;

pub use figure::{Figure, FigureSize, Output};
pub use fonts::{register_font_bytes, register_font_file};
pub use palette::{parse_color, Palette};
pub use style::{Legend, LineStyle, Marker, Spine, SpineStyle, Spines, Theme, YLim};
