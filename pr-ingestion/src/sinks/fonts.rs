use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::anyhow;
use once_cell::sync::OnceCell;
use plotters::style::{register_font, FontStyle};

/// Common locations of a sans-serif TrueType font.
const CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Families the chart asks for. All map onto the one font file.
const FAMILIES: [(&str, FontStyle); 3] = [
    ("sans-serif", FontStyle::Normal),
    ("sans-serif", FontStyle::Bold),
    ("monospace", FontStyle::Normal),
];

static REGISTERED: OnceCell<PathBuf> = OnceCell::new();

/// Registers a TrueType font with the bitmap renderer once per process.
/// `preferred` is tried before the built-in candidate list.
pub(crate) fn ensure_registered(preferred: Option<&Path>) -> anyhow::Result<&'static Path> {
    let path = REGISTERED.get_or_try_init(|| {
        let path = preferred
            .map(Path::to_path_buf)
            .into_iter()
            .chain(CANDIDATES.iter().map(PathBuf::from))
            .find(|p| p.is_file())
            .ok_or_else(|| anyhow!("no TrueType font found; set chart.font_path"))?;

        // Registered fonts must outlive every chart drawn by the process.
        let bytes: &'static [u8] = Box::leak(fs::read(&path)?.into_boxed_slice());
        for (family, style) in FAMILIES {
            register_font(family, style, bytes)
                .map_err(|_| anyhow!("{} is not a usable TrueType font", path.display()))?;
        }

        tracing::debug!(font = %path.display(), "registered chart font");
        Ok::<_, anyhow::Error>(path)
    })?;
    if let Some(ignored) = preferred.filter(|p| *p != path.as_path()) {
        tracing::debug!(
            requested = %ignored.display(),
            font = %path.display(),
            "chart font already registered; keeping it"
        );
    }
    Ok(path.as_path())
}
