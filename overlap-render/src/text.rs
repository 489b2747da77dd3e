use ab_glyph::{Font, FontVec, Glyph, PxScale, ScaleFont, point};
use bytemuck::{cast_slice, cast_slice_mut};
use std::collections::HashMap;
use std::sync::Arc;
use string_cache::DefaultAtom as Atom;
use tiny_skia::{Pixmap, PremultipliedColorU8};

/// A rasterized line of text and the position of its baseline.
#[derive(Debug, Clone)]
pub struct TextSprite {
    pub pixmap: Pixmap,
    /// Rows from the top of `pixmap` down to the baseline.
    pub baseline: f32,
}

/// Which point of a sprite the y coordinate of a blit refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Baseline,
    /// Vertical middle of the inked area.
    Middle,
}

/// Premultiplied source-over for one RGBA pixel.
pub(crate) fn blend_over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let inv = 255 - src[3] as u32;
    let mix = |s: u8, d: u8| (s as u32 + (d as u32 * inv + 127) / 255).min(255) as u8;
    [
        mix(src[0], dst[0]),
        mix(src[1], dst[1]),
        mix(src[2], dst[2]),
        mix(src[3], dst[3]),
    ]
}

/// `color` (straight alpha) scaled by glyph coverage, premultiplied.
fn premultiply(color: [u8; 4], coverage: f32) -> [u8; 4] {
    let a = (coverage.clamp(0.0, 1.0) * color[3] as f32).round() as u32;
    let scale = |c: u8| ((c as u32 * a + 127) / 255) as u8;
    [scale(color[0]), scale(color[1]), scale(color[2]), a as u8]
}

/// Lays `text` out on one line and rasterizes it. Returns `None` when
/// nothing would be inked (empty or all-whitespace text).
pub fn render_text<F: Font>(
    font: &F,
    text: &str,
    size_px: f32,
    color: [u8; 4],
) -> Option<TextSprite> {
    let scale = PxScale::from(size_px);
    let sf = font.as_scaled(scale);

    // baseline at ascent
    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::new();
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = glyphs.last() {
            pen_x += sf.kern(prev.id, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, sf.ascent()),
        });
        pen_x += sf.h_advance(id);
    }

    let outlines: Vec<_> = glyphs
        .into_iter()
        .filter_map(|g| font.outline_glyph(g))
        .collect();
    if outlines.is_empty() {
        return None;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for out in &outlines {
        let b = out.px_bounds();
        min_x = min_x.min(b.min.x);
        min_y = min_y.min(b.min.y);
        max_x = max_x.max(b.max.x);
        max_y = max_y.max(b.max.y);
    }

    let (left, top) = (min_x.floor(), min_y.floor());
    let w = (max_x.ceil() - left).max(1.0) as u32;
    let h = (max_y.ceil() - top).max(1.0) as u32;
    let mut pixmap = Pixmap::new(w, h)?;
    let stride = w as usize;
    let dst = pixmap.pixels_mut();

    for out in &outlines {
        let bounds = out.px_bounds();
        out.draw(|x, y, coverage| {
            if coverage <= f32::EPSILON {
                return;
            }
            let px = (x as f32 + bounds.min.x - left) as usize;
            let py = (y as f32 + bounds.min.y - top) as usize;
            if px >= stride || py >= h as usize {
                return;
            }
            let i = py * stride + px;
            let bg = dst[i];
            let [r, g, b, a] = blend_over(
                [bg.red(), bg.green(), bg.blue(), bg.alpha()],
                premultiply(color, coverage),
            );
            if let Some(blended) = PremultipliedColorU8::from_rgba(r, g, b, a) {
                dst[i] = blended;
            }
        });
    }

    Some(TextSprite {
        pixmap,
        baseline: sf.ascent() - top,
    })
}

/// Composites `sprite` onto `canvas`, centred horizontally on `x`.
/// Returns the number of canvas pixels touched.
pub fn blit_sprite(
    canvas: &mut Pixmap,
    sprite: &TextSprite,
    x: f32,
    y: f32,
    anchor: TextAnchor,
) -> usize {
    let (w, h) = (sprite.pixmap.width() as i32, sprite.pixmap.height() as i32);
    let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);
    let x0 = (x - w as f32 * 0.5).round() as i32;
    let y0 = match anchor {
        TextAnchor::Baseline => (y - sprite.baseline).round() as i32,
        TextAnchor::Middle => (y - h as f32 * 0.5).round() as i32,
    };

    // fully off-screen
    if x0 + w <= 0 || y0 + h <= 0 || x0 >= cw || y0 >= ch {
        return 0;
    }

    let (sx, sy) = ((-x0).max(0), (-y0).max(0));
    let (dx, dy) = (x0.max(0), y0.max(0));
    let copy_w = (w - sx).min(cw - dx) as usize;
    let copy_h = (h - sy).min(ch - dy) as usize;

    let src: &[[u8; 4]] = cast_slice(sprite.pixmap.data());
    let dst: &mut [[u8; 4]] = cast_slice_mut(canvas.data_mut());
    for row in 0..copy_h {
        let s = (sy as usize + row) * w as usize + sx as usize;
        let d = (dy as usize + row) * cw as usize + dx as usize;
        for (out, px) in dst[d..d + copy_w].iter_mut().zip(&src[s..s + copy_w]) {
            if px[3] != 0 {
                *out = blend_over(*out, *px);
            }
        }
    }
    copy_w * copy_h
}

/// Sprites keyed by text, pixel size and colour. Text is interned, so
/// repeated labels cost one hash lookup per frame.
pub struct TextCache<F: Font = FontVec> {
    font: F,
    sprites: HashMap<(Atom, u32, [u8; 4]), Option<Arc<TextSprite>>>,
}

impl<F: Font> TextCache<F> {
    pub fn new(font: F) -> Self {
        Self {
            font,
            sprites: HashMap::new(),
        }
    }

    pub fn get_or_render(
        &mut self,
        text: &str,
        size_px: f32,
        color: [u8; 4],
    ) -> Option<Arc<TextSprite>> {
        let key = (Atom::from(text), size_px.to_bits(), color);
        let font = &self.font;
        self.sprites
            .entry(key)
            .or_insert_with(|| render_text(font, text, size_px, color).map(Arc::new))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}
