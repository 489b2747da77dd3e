use crate::error::ControlError;
use serde::{Deserialize, Serialize};

/// How a track position maps onto the control's value range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mapping {
    Linear,
    Logarithmic,
}

/// Axis-aligned track rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Track {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn clamp_x(&self, x: f64) -> f64 {
        x.clamp(self.x, self.x + self.width)
    }
}

/// A labelled position on the track, e.g. "same" at 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

impl Tick {
    pub fn new(value: f64, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

/// Construction parameters for a [`Control`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSpec {
    pub title: String,
    pub track: Track,
    pub min: f64,
    pub max: f64,
    pub initial: f64,
    pub mapping: Mapping,
    /// Neutral marker drawn across the track; does not constrain the value.
    pub reference: Option<f64>,
    pub handle_radius: f64,
    pub ticks: Vec<Tick>,
    /// Print the rounded value as a percentage under the track.
    pub show_value: bool,
}

impl ControlSpec {
    /// Logarithmic 10..1000 size control with "same" at its midpoint.
    pub fn size() -> Self {
        Self {
            title: "Right Circle Size".to_string(),
            track: Track {
                x: 300.0,
                y: 550.0,
                width: 600.0,
                height: 30.0,
            },
            min: 10.0,
            max: 1000.0,
            initial: 100.0,
            mapping: Mapping::Logarithmic,
            reference: Some(100.0),
            handle_radius: 12.0,
            ticks: vec![
                Tick::new(10.0, "smaller"),
                Tick::new(100.0, "same"),
                Tick::new(1000.0, "larger"),
            ],
            show_value: false,
        }
    }

    /// Linear 0..100 overlap percentage control.
    pub fn overlap() -> Self {
        Self {
            title: "Overlap Percentage".to_string(),
            track: Track {
                x: 300.0,
                y: 650.0,
                width: 600.0,
                height: 30.0,
            },
            min: 0.0,
            max: 100.0,
            initial: 0.0,
            mapping: Mapping::Linear,
            reference: None,
            handle_radius: 12.0,
            ticks: vec![Tick::new(0.0, "0%"), Tick::new(100.0, "100%")],
            show_value: true,
        }
    }

    pub fn validate(&self) -> Result<(), ControlError> {
        let (min, max) = (self.min, self.max);
        // written this way so NaN bounds are rejected too
        if !(min < max) {
            return Err(ControlError::InvalidRange { min, max });
        }
        if self.mapping == Mapping::Logarithmic && min <= 0.0 {
            return Err(ControlError::NonPositiveLogMinimum(min));
        }
        if !(self.track.width > 0.0) {
            return Err(ControlError::EmptyTrack(self.track.width));
        }
        if !(min..=max).contains(&self.initial) {
            return Err(ControlError::InitialOutOfRange {
                value: self.initial,
                min,
                max,
            });
        }
        if let Some(value) = self.reference {
            if !(min..=max).contains(&value) {
                return Err(ControlError::ReferenceOutOfRange { value, min, max });
            }
        }
        Ok(())
    }
}

/// A bounded slider driven by pointer input.
///
/// The value never leaves `[min, max]`. `touched` flips to true on the first
/// accepted pointer-down and stays true for the rest of the trial.
#[derive(Debug, Clone)]
pub struct Control {
    spec: ControlSpec,
    value: f64,
    touched: bool,
    dragging: bool,
}

impl Control {
    pub fn new(spec: ControlSpec) -> Result<Self, ControlError> {
        spec.validate()?;
        Ok(Self {
            value: spec.initial,
            spec,
            touched: false,
            dragging: false,
        })
    }

    pub fn spec(&self) -> &ControlSpec {
        &self.spec
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn touched(&self) -> bool {
        self.touched
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn range(&self) -> (f64, f64) {
        (self.spec.min, self.spec.max)
    }

    pub fn mapping(&self) -> Mapping {
        self.spec.mapping
    }

    pub fn track(&self) -> &Track {
        &self.spec.track
    }

    /// Position of `value` along the track as a fraction in [0, 1].
    pub fn proportion_of(&self, value: f64) -> f64 {
        let (min, max) = self.range();
        match self.spec.mapping {
            Mapping::Linear => (value - min) / (max - min),
            Mapping::Logarithmic => {
                let (lo, hi) = (min.log10(), max.log10());
                (value.log10() - lo) / (hi - lo)
            }
        }
    }

    /// Value at fraction `t` of the track; `t` is clamped to [0, 1].
    pub fn value_at(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let (min, max) = self.range();
        let value = match self.spec.mapping {
            Mapping::Linear => min + t * (max - min),
            Mapping::Logarithmic => {
                let (lo, hi) = (min.log10(), max.log10());
                10f64.powf(lo + t * (hi - lo))
            }
        };
        // powf can land a hair outside the bounds at the ends
        value.clamp(min, max)
    }

    pub fn x_for(&self, value: f64) -> f64 {
        self.spec.track.x + self.proportion_of(value) * self.spec.track.width
    }

    /// Track fraction under pointer x, after clamping x onto the track.
    pub fn proportion_at_x(&self, x: f64) -> f64 {
        let track = &self.spec.track;
        (track.clamp_x(x) - track.x) / track.width
    }

    pub fn handle_x(&self) -> f64 {
        self.x_for(self.value)
    }

    pub fn reference_x(&self) -> Option<f64> {
        self.spec.reference.map(|value| self.x_for(value))
    }

    /// Whether a pointer at (x, y) grabs this control: on the handle, or
    /// anywhere on the track. Uses the raw pointer position.
    pub fn hit_test(&self, x: f64, y: f64) -> bool {
        let dx = x - self.handle_x();
        let dy = y - self.spec.track.center_y();
        (dx * dx + dy * dy).sqrt() <= self.spec.handle_radius || self.spec.track.contains(x, y)
    }

    /// Starts a drag if the pointer hits the control. Returns whether it did.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        if !self.hit_test(x, y) {
            return false;
        }
        self.dragging = true;
        if !self.touched {
            log::debug!("control '{}' touched", self.spec.title);
        }
        self.touched = true;
        self.set_from_x(x);
        true
    }

    pub fn pointer_move(&mut self, x: f64) {
        if self.dragging {
            self.set_from_x(x);
        }
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    fn set_from_x(&mut self, x: f64) {
        self.value = self.value_at(self.proportion_at_x(x));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size_control() -> Control {
        Control::new(ControlSpec::size()).unwrap()
    }

    fn overlap_control() -> Control {
        Control::new(ControlSpec::overlap()).unwrap()
    }

    #[test]
    fn test_defaults_start_untouched() {
        let size = size_control();
        assert_eq!(size.value(), 100.0);
        assert!(!size.touched());
        assert!(!size.is_dragging());
        let overlap = overlap_control();
        assert_eq!(overlap.value(), 0.0);
        assert!(!overlap.touched());
    }

    #[test]
    fn test_log_midpoint_is_equal_size() {
        let size = size_control();
        assert!((size.value_at(0.5) - 100.0).abs() < 1e-9);
        assert!((size.handle_x() - 600.0).abs() < 1e-9);
        assert_eq!(size.reference_x().map(|x| x.round()), Some(600.0));
        assert_eq!(size.value_at(0.0), 10.0);
        assert_eq!(size.value_at(1.0), 1000.0);
    }

    #[test]
    fn test_round_trip_linear_and_log() {
        for control in [size_control(), overlap_control()] {
            let (min, max) = control.range();
            for step in 0..=200 {
                let t = step as f64 / 200.0;
                let v = match control.mapping() {
                    Mapping::Linear => min + t * (max - min),
                    Mapping::Logarithmic => min * (max / min).powf(t),
                };
                let pixel = control.x_for(v);
                let back = control.value_at(control.proportion_at_x(pixel));
                let tolerance = 1e-9 * v.abs().max(1.0);
                assert!((back - v).abs() < tolerance, "{v} came back as {back}");
            }
        }
    }

    #[test]
    fn test_press_on_track_sets_value_and_touched() {
        let mut overlap = overlap_control();
        // a quarter of the way along the 600px track
        assert!(overlap.pointer_down(450.0, 665.0));
        assert!(overlap.touched());
        assert!(overlap.is_dragging());
        assert!((overlap.value() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_press_outside_is_ignored() {
        let mut overlap = overlap_control();
        assert!(!overlap.pointer_down(450.0, 100.0));
        assert!(!overlap.touched());
        assert!(!overlap.is_dragging());
        overlap.pointer_move(900.0);
        assert_eq!(overlap.value(), 0.0);
    }

    #[test]
    fn test_press_on_handle_just_outside_track() {
        let mut overlap = overlap_control();
        // handle sits at the left end, its circle pokes out of the track
        assert!(overlap.pointer_down(292.0, 665.0));
        assert_eq!(overlap.value(), 0.0);
        assert!(overlap.touched());
    }

    #[test]
    fn test_drag_clamps_to_track() {
        let mut size = size_control();
        assert!(size.pointer_down(600.0, 565.0));
        size.pointer_move(5000.0);
        assert_eq!(size.value(), 1000.0);
        size.pointer_move(-5000.0);
        assert_eq!(size.value(), 10.0);
        size.pointer_up();
        assert!(!size.is_dragging());
        size.pointer_move(600.0);
        assert_eq!(size.value(), 10.0);
        assert!(size.touched());
    }

    #[test]
    fn test_touched_is_sticky() {
        let mut size = size_control();
        size.pointer_down(600.0, 565.0);
        size.pointer_up();
        size.pointer_down(0.0, 0.0);
        size.pointer_up();
        assert!(size.touched());
    }

    #[test]
    fn test_rejects_bad_configurations() {
        let mut spec = ControlSpec::size();
        spec.min = 0.0;
        assert_eq!(
            Control::new(spec).unwrap_err(),
            ControlError::NonPositiveLogMinimum(0.0)
        );

        let mut spec = ControlSpec::overlap();
        spec.max = spec.min;
        assert!(matches!(
            Control::new(spec),
            Err(ControlError::InvalidRange { .. })
        ));

        let mut spec = ControlSpec::overlap();
        spec.initial = 150.0;
        assert!(matches!(
            Control::new(spec),
            Err(ControlError::InitialOutOfRange { .. })
        ));

        let mut spec = ControlSpec::overlap();
        spec.track.width = 0.0;
        assert_eq!(Control::new(spec).unwrap_err(), ControlError::EmptyTrack(0.0));

        let mut spec = ControlSpec::size();
        spec.reference = Some(5.0);
        assert!(matches!(
            Control::new(spec),
            Err(ControlError::ReferenceOutOfRange { .. })
        ));
    }
}
