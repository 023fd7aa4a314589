//! Software raster primitives using tiny-skia and cosmic-text.
//!
//! All drawing happens on the CPU against an RGBA pixel buffer owned by the
//! panel engine. Text shaping results are cached across draw cycles since a
//! panel redraws the same handful of strings.

use std::collections::HashMap;

use cosmic_text::{
    Attrs, Buffer, Color as CosmicColor, Family, FontSystem, LayoutGlyph, Metrics, Shaping,
    SwashCache,
};
use tiny_skia::{Color, Paint, PixmapMut, PixmapPaint, PixmapRef, Rect, Transform};

/// Maximum entries in the text shaping cache; the cache is dropped wholesale
/// when exceeded (a panel cycles through few distinct strings).
const TEXT_CACHE_MAX_ENTRIES: usize = 256;

const FONT_FAMILY: &str = "Noto Sans SC";

/// Cached result of shaping one string at one size.
struct CachedText {
    glyphs: Vec<LayoutGlyph>,
    width: f32,
    height: f32,
}

type TextCacheKey = (String, u32);

/// Drawing primitives plus the font machinery they need. Not thread-safe by
/// construction; lives on the engine thread.
pub struct Raster {
    font_system: FontSystem,
    swash_cache: SwashCache,
    text_cache: HashMap<TextCacheKey, CachedText>,
}

impl Raster {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            text_cache: HashMap::with_capacity(64),
        }
    }

    /// Register an extra font (the bootstrapped panel font). Missing fonts
    /// degrade to whatever the system database resolves.
    pub fn load_font_bytes(&mut self, data: Vec<u8>) {
        self.font_system.db_mut().load_font_data(data);
    }

    /// Clear the whole buffer with a color.
    pub fn clear(&self, buffer: &mut [u8], width: u32, height: u32, color: Color) {
        if let Some(mut pixmap) = PixmapMut::from_bytes(buffer, width, height) {
            pixmap.fill(color);
        }
    }

    /// Draw a filled rectangle.
    pub fn fill_rect(
        &self,
        buffer: &mut [u8],
        width: u32,
        height: u32,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    ) {
        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, width, height) else {
            return;
        };
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Blit a source pixmap at its own size.
    pub fn blit(&self, buffer: &mut [u8], width: u32, height: u32, src: PixmapRef, x: f32, y: f32) {
        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, width, height) else {
            return;
        };
        let transform = Transform::from_translate(x, y);
        pixmap.draw_pixmap(0, 0, src, &PixmapPaint::default(), transform, None);
    }

    /// Blit a source pixmap scaled into an `w`x`h` box at `(x, y)`.
    pub fn blit_scaled(
        &self,
        buffer: &mut [u8],
        width: u32,
        height: u32,
        src: PixmapRef,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    ) {
        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, width, height) else {
            return;
        };
        if src.width() == 0 || src.height() == 0 {
            return;
        }
        let sx = w / src.width() as f32;
        let sy = h / src.height() as f32;
        let transform = Transform::from_row(sx, 0.0, 0.0, sy, x, y);
        let paint = PixmapPaint {
            quality: tiny_skia::FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        pixmap.draw_pixmap(0, 0, src, &paint, transform, None);
    }

    /// Ensure text is cached, shaping if needed. Returns (width, height).
    fn ensure_cached(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        let font_size_key = (font_size * 10.0).round() as u32;

        if let Some(cached) = self
            .text_cache
            .iter()
            .find(|(k, _)| k.0 == text && k.1 == font_size_key)
            .map(|(_, v)| v)
        {
            return (cached.width, cached.height);
        }

        let metrics = Metrics::new(font_size, font_size * 1.2);
        let mut text_buffer = Buffer::new(&mut self.font_system, metrics);
        let attrs = Attrs::new().family(Family::Name(FONT_FAMILY));
        text_buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        text_buffer.shape_until_scroll(&mut self.font_system, false);

        let mut glyphs = Vec::new();
        let mut width = 0.0f32;
        let mut height = 0.0f32;
        for run in text_buffer.layout_runs() {
            width = width.max(run.line_w);
            height += run.line_height;
            for glyph in run.glyphs.iter() {
                glyphs.push(glyph.clone());
            }
        }

        if self.text_cache.len() >= TEXT_CACHE_MAX_ENTRIES {
            self.text_cache.clear();
        }
        self.text_cache.insert(
            (text.to_string(), font_size_key),
            CachedText {
                glyphs,
                width,
                height,
            },
        );

        (width, height)
    }

    fn cached_glyphs(&self, text: &str, font_size: f32) -> Vec<LayoutGlyph> {
        let font_size_key = (font_size * 10.0).round() as u32;
        self.text_cache
            .iter()
            .find(|(k, _)| k.0 == text && k.1 == font_size_key)
            .map(|(_, v)| v.glyphs.clone())
            .unwrap_or_default()
    }

    /// Measure text dimensions without drawing.
    pub fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        self.ensure_cached(text, font_size)
    }

    /// Draw text with `(x, y)` as the baseline origin.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text(
        &mut self,
        buffer: &mut [u8],
        buf_width: u32,
        buf_height: u32,
        text: &str,
        x: f32,
        y: f32,
        font_size: f32,
        color: Color,
    ) {
        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, buf_width, buf_height) else {
            return;
        };

        let _ = self.ensure_cached(text, font_size);
        // Clone is forced by the borrow checker: swash_cache needs &mut self.
        let glyphs = self.cached_glyphs(text, font_size);

        let text_color = CosmicColor::rgba(
            (color.red() * 255.0) as u8,
            (color.green() * 255.0) as u8,
            (color.blue() * 255.0) as u8,
            (color.alpha() * 255.0) as u8,
        );

        for glyph in &glyphs {
            let physical_glyph = glyph.physical((x, y), 1.0);
            if let Some(image) = self
                .swash_cache
                .get_image(&mut self.font_system, physical_glyph.cache_key)
            {
                let glyph_x = physical_glyph.x + image.placement.left;
                let glyph_y = physical_glyph.y - image.placement.top;
                draw_glyph_to_pixmap(
                    &mut pixmap,
                    &image.data,
                    image.placement.width,
                    image.placement.height,
                    glyph_x,
                    glyph_y,
                    text_color,
                );
            }
        }
    }
}

impl Default for Raster {
    fn default() -> Self {
        Self::new()
    }
}

/// Alpha-blend a glyph coverage image onto a premultiplied RGBA pixmap.
fn draw_glyph_to_pixmap(
    pixmap: &mut PixmapMut,
    glyph_data: &[u8],
    glyph_width: u32,
    glyph_height: u32,
    dest_x: i32,
    dest_y: i32,
    color: CosmicColor,
) {
    let pixmap_width = pixmap.width() as i32;
    let pixmap_height = pixmap.height() as i32;
    let data = pixmap.data_mut();

    for gy in 0..glyph_height as i32 {
        let py = dest_y + gy;
        if py < 0 || py >= pixmap_height {
            continue;
        }
        for gx in 0..glyph_width as i32 {
            let px = dest_x + gx;
            if px < 0 || px >= pixmap_width {
                continue;
            }

            let glyph_idx = (gy as u32 * glyph_width + gx as u32) as usize;
            if glyph_idx >= glyph_data.len() {
                continue;
            }
            let alpha = glyph_data[glyph_idx];
            if alpha == 0 {
                continue;
            }

            let pixel_idx = ((py as u32 * pixmap_width as u32 + px as u32) * 4) as usize;
            if pixel_idx + 3 >= data.len() {
                continue;
            }

            let src_a = (alpha as u32 * color.a() as u32) / 255;
            let inv_a = 255 - src_a;

            data[pixel_idx] =
                ((color.r() as u32 * src_a + data[pixel_idx] as u32 * inv_a) / 255) as u8;
            data[pixel_idx + 1] =
                ((color.g() as u32 * src_a + data[pixel_idx + 1] as u32 * inv_a) / 255) as u8;
            data[pixel_idx + 2] =
                ((color.b() as u32 * src_a + data[pixel_idx + 2] as u32 * inv_a) / 255) as u8;
            data[pixel_idx + 3] = (src_a + (data[pixel_idx + 3] as u32 * inv_a) / 255) as u8;
        }
    }
}
