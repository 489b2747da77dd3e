//! Read-only snapshot of everything one frame draws.
//!
//! Built fresh by the trial controller every frame; the renderer never
//! reaches back into controller state.

use crate::control::Control;
use crate::geometry::CirclePair;

/// Vertically stacked lines of text, centred horizontally on `anchor.0` and
/// spread evenly around `anchor.1`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub anchor: (f64, f64),
    pub line_height: f64,
}

impl TextBlock {
    pub fn single(text: impl Into<String>, anchor: (f64, f64)) -> Self {
        Self {
            lines: vec![text.into()],
            anchor,
            line_height: 0.0,
        }
    }

    /// Horizontal centre and baseline of each line, top to bottom.
    pub fn line_positions(&self) -> Vec<(f64, f64)> {
        let (x, y) = self.anchor;
        let count = self.lines.len();
        let start = y - (count.saturating_sub(1) as f64 * self.line_height) / 2.0;
        (0..count)
            .map(|i| (x, start + i as f64 * self.line_height))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickView {
    pub x: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliderView {
    pub title: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub handle_x: f64,
    pub handle_radius: f64,
    pub reference_x: Option<f64>,
    pub ticks: Vec<TickView>,
    pub value_text: Option<String>,
    pub dragging: bool,
}

impl SliderView {
    pub fn of(control: &Control) -> Self {
        let spec = control.spec();
        let track = control.track();
        Self {
            title: spec.title.clone(),
            x: track.x,
            y: track.y,
            width: track.width,
            height: track.height,
            handle_x: control.handle_x(),
            handle_radius: spec.handle_radius,
            reference_x: control.reference_x(),
            ticks: spec
                .ticks
                .iter()
                .map(|tick| TickView {
                    x: control.x_for(tick.value),
                    label: tick.label.clone(),
                })
                .collect(),
            value_text: spec
                .show_value
                .then(|| format!("{}%", control.value().round())),
            dragging: control.is_dragging(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonView {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label: String,
    pub enabled: bool,
    pub hovered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub circles: CirclePair,
    pub left_label: TextBlock,
    pub right_label: TextBlock,
    pub sliders: Vec<SliderView>,
    pub confirm: ButtonView,
    pub warning: Option<TextBlock>,
    pub title: Option<TextBlock>,
    pub progress: Option<TextBlock>,
}
