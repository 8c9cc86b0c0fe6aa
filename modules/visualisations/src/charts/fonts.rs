//! Font registration for text rendering.
//!
//! Text goes through plotters' `ab_glyph` backend, which only knows fonts that
//! were registered at runtime. The first figure probes `MESSYLIB_FONT` and a
//! few well known system locations. Without any font, figures are still drawn,
//! just without titles, tick labels and legend text.

use crate::error::{PlotError, Result};
use plotters::style::{register_font, FontStyle};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;
use tracing::{debug, warn};

/// Font family every text style in this crate asks for.
pub const FONT_FAMILY: &str = "sans-serif";

/// Environment variable pointing at a TTF/OTF file.
pub const FONT_ENV: &str = "MESSYLIB_FONT";

const SYSTEM_FONTS: [&str; 8] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT_READY: AtomicBool = AtomicBool::new(false);
static PROBE: Once = Once::new();

/// Register a font file as the family used for all text.
pub fn register_font_file(path: impl AsRef<Path>) -> Result<()> {
    let bytes = std::fs::read(path.as_ref())?;
    register_font_bytes(bytes)?;
    debug!("Registered font {}", path.as_ref().display());
    Ok(())
}

/// Register in-memory font data as the family used for all text.
///
/// The bytes are kept for the rest of the process.
pub fn register_font_bytes(bytes: Vec<u8>) -> Result<()> {
    let data: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font(FONT_FAMILY, FontStyle::Normal, data)
        .map_err(|_| PlotError::Font("not a valid TTF/OTF font".to_string()))?;
    FONT_READY.store(true, Ordering::SeqCst);
    Ok(())
}

/// Whether text can be drawn. Probes for a font on first call.
pub fn text_available() -> bool {
    PROBE.call_once(|| {
        if FONT_READY.load(Ordering::SeqCst) {
            return;
        }
        if !probe_fonts() {
            warn!(
                "No usable font found (set {}); figures are rendered without text",
                FONT_ENV
            );
        }
    });
    FONT_READY.load(Ordering::SeqCst)
}

fn probe_fonts() -> bool {
    let from_env = std::env::var(FONT_ENV).ok();
    let candidates = from_env
        .iter()
        .map(String::as_str)
        .chain(SYSTEM_FONTS.iter().copied());

    for candidate in candidates {
        let path = Path::new(candidate);
        if !path.is_file() {
            continue;
        }
        match register_font_file(path) {
            Ok(()) => return true,
            Err(err) => debug!("Skipping font {}: {}", path.display(), err),
        }
    }
    false
}
