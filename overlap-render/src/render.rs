use crate::error::RenderError;
use crate::text::{TextAnchor, TextCache, blit_sprite};
use ab_glyph::FontVec;
use bytemuck::cast_slice;
use overlap_core::{ButtonView, Circle, Scene, SliderView, TextBlock};
use overlap_timing::{FrameTimingStats, HighPrecisionTimer, Timer};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tiny_skia::{Color, FillRule, Paint, Path as SkPath, PathBuilder, Pixmap, Stroke, Transform};

mod palette {
    pub const WHITE: [u8; 4] = [255, 255, 255, 255];
    pub const BLACK: [u8; 4] = [0, 0, 0, 255];
    pub const BLUE: [u8; 4] = [100, 150, 255, 180];
    pub const RED: [u8; 4] = [255, 100, 100, 180];
    pub const DARK_BLUE: [u8; 4] = [50, 75, 200, 255];
    pub const DARK_RED: [u8; 4] = [200, 50, 50, 255];
    pub const LIGHT_GRAY: [u8; 4] = [220, 220, 220, 255];
    pub const DISABLED_GRAY: [u8; 4] = [200, 200, 200, 255];
    pub const SLIDER: [u8; 4] = [150, 150, 150, 255];
    pub const DARK_GRAY: [u8; 4] = [100, 100, 100, 255];
}

const DEFAULT_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

const HEADING_PX: f32 = 32.0;
const LABEL_PX: f32 = 24.0;
const TITLE_PX: f32 = 28.0;
const VALUE_PX: f32 = 28.0;
const TICK_PX: f32 = 20.0;
const BUTTON_PX: f32 = 24.0;
const WARNING_PX: f32 = 22.0;
const PROGRESS_PX: f32 = 20.0;
const CORNER_RADIUS: f32 = 5.0;

const STAGES: [&str; 3] = ["clear", "draw", "copy"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub clear: Duration,
    pub draw: Duration,
    pub copy: Duration,
    pub total: Duration,
    /// Text sprites held in the cache after this frame.
    pub cached_text: usize,
}

fn paint(rgba: [u8; 4]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]));
    paint.anti_alias = true;
    paint
}

fn stroke(width: f32) -> Stroke {
    Stroke {
        width,
        ..Stroke::default()
    }
}

/// Closed rectangle path with circular corners of radius `r`.
fn rounded_rect(x: f32, y: f32, w: f32, h: f32, r: f32) -> Option<SkPath> {
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    // cubic approximation of a quarter circle
    let k = 0.552_284_8 * r;
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.cubic_to(x + w - r + k, y, x + w, y + r - k, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.cubic_to(x + w, y + h - r + k, x + w - r + k, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.cubic_to(x + r - k, y + h, x, y + h - r + k, x, y + h - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
    pb.close();
    pb.finish()
}

fn blank_canvas(width: u32, height: u32) -> Result<Pixmap, RenderError> {
    let mut canvas = Pixmap::new(width, height).ok_or(RenderError::Canvas { width, height })?;
    canvas.fill(Color::WHITE);
    Ok(canvas)
}

/// Draws a [`Scene`] into an RGBA8 frame buffer of the canvas size.
///
/// Everything is redrawn each frame onto an opaque offscreen canvas, which
/// is then copied out in one go. Text is rasterized once per distinct
/// string, size and colour.
pub struct SkiaRenderer {
    width: u32,
    height: u32,
    canvas: Pixmap,
    clear_buffer: Vec<[u8; 4]>,
    text: TextCache<FontVec>,
    component_timers: HashMap<&'static str, HighPrecisionTimer>,
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32, font: FontVec) -> Result<Self, RenderError> {
        Ok(Self {
            width,
            height,
            canvas: blank_canvas(width, height)?,
            clear_buffer: vec![palette::WHITE; width as usize * height as usize],
            text: TextCache::new(font),
            component_timers: STAGES
                .iter()
                .map(|&stage| (stage, HighPrecisionTimer::new()))
                .collect(),
        })
    }

    /// Renderer with the bundled DejaVu Sans.
    pub fn with_default_font(width: u32, height: u32) -> Result<Self, RenderError> {
        let font = FontVec::try_from_vec(DEFAULT_FONT.to_vec())?;
        Self::new(width, height, font)
    }

    /// Loads a TrueType/OpenType font from disk and builds a renderer with it.
    pub fn from_font_file(width: u32, height: u32, path: &Path) -> Result<Self, RenderError> {
        let bytes = fs_err::read(path)?;
        let font = FontVec::try_from_vec(bytes)?;
        log::debug!("loaded font {}", path.display());
        Self::new(width, height, font)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.canvas = blank_canvas(width, height)?;
        self.clear_buffer = vec![palette::WHITE; width as usize * height as usize];
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Rolling timings of one stage: `"clear"`, `"draw"` or `"copy"`.
    pub fn component_stats(&self, stage: &str) -> Option<FrameTimingStats> {
        self.component_timers.get(stage).map(|t| t.frame_stats())
    }

    pub fn render_frame<T: Timer>(
        &mut self,
        scene: &Scene,
        frame_buffer: &mut [u8],
        timer: &mut T,
    ) -> Result<FrameStats, RenderError> {
        let expected = self.canvas.data().len();
        if frame_buffer.len() != expected {
            return Err(RenderError::FrameSize {
                expected,
                actual: frame_buffer.len(),
            });
        }

        let t_clear = {
            let t = timer.now();
            self.canvas
                .data_mut()
                .copy_from_slice(cast_slice(&self.clear_buffer));
            timer.elapsed(t)
        };

        let t_draw = {
            let t = timer.now();
            self.draw_scene(scene);
            timer.elapsed(t)
        };

        // canvas is opaque, so premultiplied bytes are already straight RGBA
        let t_copy = {
            let t = timer.now();
            frame_buffer.copy_from_slice(self.canvas.data());
            timer.elapsed(t)
        };

        let total = t_clear + t_draw + t_copy;
        for (stage, elapsed) in STAGES.iter().zip([t_clear, t_draw, t_copy]) {
            if let Some(stage_timer) = self.component_timers.get_mut(stage) {
                stage_timer.record_frame(elapsed);
            }
        }
        timer.record_frame(total);

        Ok(FrameStats {
            clear: t_clear,
            draw: t_draw,
            copy: t_copy,
            total,
            cached_text: self.text.len(),
        })
    }

    fn draw_scene(&mut self, scene: &Scene) {
        // adjustable circle first so the reference circle sits on top
        self.draw_circle(&scene.circles.right, palette::RED, palette::DARK_RED);
        self.draw_circle(&scene.circles.left, palette::BLUE, palette::DARK_BLUE);

        self.draw_text_block(&scene.left_label, LABEL_PX, palette::DARK_BLUE);
        self.draw_text_block(&scene.right_label, LABEL_PX, palette::DARK_RED);

        for slider in &scene.sliders {
            self.draw_slider(slider);
        }
        self.draw_button(&scene.confirm);

        if let Some(warning) = &scene.warning {
            self.draw_text_block(warning, WARNING_PX, palette::DARK_RED);
        }
        if let Some(title) = &scene.title {
            self.draw_text_block(title, HEADING_PX, palette::BLACK);
        }
        if let Some(progress) = &scene.progress {
            self.draw_text_block(progress, PROGRESS_PX, palette::DARK_GRAY);
        }
    }

    fn fill(&mut self, path: &SkPath, rgba: [u8; 4]) {
        self.canvas
            .fill_path(path, &paint(rgba), FillRule::Winding, Transform::identity(), None);
    }

    fn outline(&mut self, path: &SkPath, rgba: [u8; 4], width: f32) {
        self.canvas
            .stroke_path(path, &paint(rgba), &stroke(width), Transform::identity(), None);
    }

    fn draw_circle(&mut self, circle: &Circle, fill: [u8; 4], outline: [u8; 4]) {
        let Some(path) =
            PathBuilder::from_circle(circle.x as f32, circle.y as f32, circle.radius as f32)
        else {
            return;
        };
        self.fill(&path, fill);
        self.outline(&path, outline, 3.0);
    }

    fn draw_text(
        &mut self,
        text: &str,
        size_px: f32,
        color: [u8; 4],
        pos: (f64, f64),
        anchor: TextAnchor,
    ) {
        if let Some(sprite) = self.text.get_or_render(text, size_px, color) {
            blit_sprite(&mut self.canvas, &sprite, pos.0 as f32, pos.1 as f32, anchor);
        }
    }

    fn draw_text_block(&mut self, block: &TextBlock, size_px: f32, color: [u8; 4]) {
        for (line, pos) in block.lines.iter().zip(block.line_positions()) {
            self.draw_text(line, size_px, color, pos, TextAnchor::Baseline);
        }
    }

    fn draw_slider(&mut self, slider: &SliderView) {
        let (x, y) = (slider.x as f32, slider.y as f32);
        let (w, h) = (slider.width as f32, slider.height as f32);
        let mid_x = slider.x + slider.width / 2.0;

        if let Some(track) = rounded_rect(x, y, w, h, CORNER_RADIUS) {
            self.fill(&track, palette::LIGHT_GRAY);
            self.outline(&track, palette::DARK_GRAY, 2.0);
        }

        if let Some(rx) = slider.reference_x {
            let mut pb = PathBuilder::new();
            pb.move_to(rx as f32, y);
            pb.line_to(rx as f32, y + h);
            if let Some(mark) = pb.finish() {
                self.outline(&mark, palette::BLACK, 3.0);
            }
        }

        let filled = slider.handle_x as f32 - x;
        if filled > 0.0 {
            if let Some(bar) = rounded_rect(x, y, filled, h, CORNER_RADIUS) {
                self.fill(&bar, palette::SLIDER);
            }
        }

        let cy = y + h / 2.0;
        let radius = slider.handle_radius as f32;
        let rim = if slider.dragging {
            palette::BLACK
        } else {
            palette::DARK_GRAY
        };
        if let Some(outer) = PathBuilder::from_circle(slider.handle_x as f32, cy, radius) {
            self.fill(&outer, rim);
        }
        if let Some(inner) = PathBuilder::from_circle(slider.handle_x as f32, cy, radius - 3.0) {
            self.fill(&inner, palette::WHITE);
        }

        self.draw_text(
            &slider.title,
            TITLE_PX,
            palette::BLACK,
            (mid_x, slider.y - 30.0),
            TextAnchor::Baseline,
        );
        if let Some(value) = &slider.value_text {
            self.draw_text(
                value,
                VALUE_PX,
                palette::BLACK,
                (mid_x, slider.y + slider.height + 25.0),
                TextAnchor::Baseline,
            );
        }
        for tick in &slider.ticks {
            self.draw_text(
                &tick.label,
                TICK_PX,
                palette::BLACK,
                (tick.x, slider.y - 10.0),
                TextAnchor::Baseline,
            );
        }
    }

    fn draw_button(&mut self, button: &ButtonView) {
        let fill = match (button.enabled, button.hovered) {
            (false, _) => palette::DISABLED_GRAY,
            (true, true) => palette::SLIDER,
            (true, false) => palette::LIGHT_GRAY,
        };
        if let Some(body) = rounded_rect(
            button.x as f32,
            button.y as f32,
            button.width as f32,
            button.height as f32,
            CORNER_RADIUS,
        ) {
            self.fill(&body, fill);
            self.outline(&body, palette::DARK_GRAY, 2.0);
        }

        let text_color = if button.enabled {
            palette::BLACK
        } else {
            palette::SLIDER
        };
        self.draw_text(
            &button.label,
            BUTTON_PX,
            text_color,
            (button.x + button.width / 2.0, button.y + button.height / 2.0),
            TextAnchor::Middle,
        );
    }
}
