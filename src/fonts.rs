use eframe::egui::{self, FontData, FontDefinitions, FontFamily};
use std::path::Path;
use std::sync::Arc;

use crate::error::StartupError;

/// Family name the configured font is registered under
pub const FONT_FAMILY_NAME: &str = "route-viewer";

/// Install the configured font into the egui context and return the family to draw with.
/// `None` keeps egui's built-in proportional font. A configured font that is missing,
/// unreadable or not a font file is fatal.
pub fn install_font(ctx: &egui::Context, path: Option<&Path>) -> Result<FontFamily, StartupError> {
    profiling::scope!("install_font");
    let Some(path) = path else {
        return Ok(FontFamily::Proportional);
    };

    let bytes = load_font_bytes(path)?;
    let mut fonts = FontDefinitions::default();
    fonts.font_data.insert(
        FONT_FAMILY_NAME.to_owned(),
        Arc::new(FontData::from_owned(bytes)),
    );

    // own family first; built-in proportional fonts as fallback for missing glyphs
    let mut family = vec![FONT_FAMILY_NAME.to_owned()];
    if let Some(fallback) = fonts.families.get(&FontFamily::Proportional) {
        family.extend(fallback.iter().cloned());
    }
    fonts
        .families
        .insert(FontFamily::Name(FONT_FAMILY_NAME.into()), family);
    ctx.set_fonts(fonts);

    tracing::info!(path = %path.display(), "font loaded");
    Ok(FontFamily::Name(FONT_FAMILY_NAME.into()))
}

/// Read a font file and check it carries a TrueType/OpenType signature
pub fn load_font_bytes(path: &Path) -> Result<Vec<u8>, StartupError> {
    let bytes = std::fs::read(path).map_err(|source| StartupError::FontRead {
        path: path.to_path_buf(),
        source,
    })?;
    if !has_font_signature(&bytes) {
        return Err(StartupError::FontFormat {
            path: path.to_path_buf(),
        });
    }
    Ok(bytes)
}

fn has_font_signature(bytes: &[u8]) -> bool {
    matches!(
        bytes.get(..4),
        Some([0x00, 0x01, 0x00, 0x00]) | Some(b"OTTO") | Some(b"true") | Some(b"ttcf")
    )
}
