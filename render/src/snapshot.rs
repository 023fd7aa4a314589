//! Surface read-back and PNG serialization.
//!
//! A [`Snapshot`] is the typed result delivered through every render job's
//! result slot. PNG encoding happens on the *caller's* thread after the
//! slot resolves, keeping the engine thread free for the next job.

use tiny_skia::Pixmap;

use crate::error::PngError;

/// Straight-alpha RGBA copy of the panel surface.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Snapshot {
    /// Copy the surface out, demultiplying tiny-skia's premultiplied pixels.
    pub fn from_pixmap(pixmap: &Pixmap) -> Self {
        let mut rgba = Vec::with_capacity(pixmap.pixels().len() * 4);
        for pixel in pixmap.pixels() {
            let c = pixel.demultiply();
            rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Self {
            width: pixmap.width(),
            height: pixmap.height(),
            rgba,
        }
    }
}

/// Serialize a snapshot as an RGBA8 PNG.
pub fn encode_png(snapshot: &Snapshot) -> Result<Vec<u8>, PngError> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, snapshot.width, snapshot.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&snapshot.rgba)?;
    }
    Ok(out)
}
