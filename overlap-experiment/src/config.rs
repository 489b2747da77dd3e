use overlap_core::{ControlError, ControlSpec};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Centre of the reference circle; the adjustable circle sits to its right.
    pub circle_anchor: Point,
    pub base_radius: f64,
    pub left_label: Point,
    pub right_label: Point,
    pub label_line_height: f64,
    pub words_per_line: usize,
    pub warning_anchor: Point,
    /// Heading above the progress line; empty hides it.
    pub title: String,
    pub title_anchor: Point,
    pub show_progress: bool,
    pub progress_anchor: Point,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1200,
            canvas_height: 800,
            circle_anchor: Point::new(550.0, 300.0),
            base_radius: overlap_core::BASE_RADIUS,
            left_label: Point::new(400.0, 120.0),
            right_label: Point::new(800.0, 120.0),
            label_line_height: 28.0,
            words_per_line: 5,
            warning_anchor: Point::new(600.0, 500.0),
            title: "Circle Overlap Experiment".to_string(),
            title_anchor: Point::new(600.0, 40.0),
            show_progress: true,
            progress_anchor: Point::new(600.0, 75.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label: String,
}

impl ButtonConfig {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            x: 1050.0,
            y: 720.0,
            width: 120.0,
            height: 50.0,
            label: "Next".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub layout: LayoutConfig,
    pub size: ControlSpec,
    pub overlap: ControlSpec,
    pub confirm: ButtonConfig,
    pub warning_text: String,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            size: ControlSpec::size(),
            overlap: ControlSpec::overlap(),
            confirm: ButtonConfig::default(),
            warning_text: "Please adjust both sliders before continuing".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid {name} control: {source}")]
    Control {
        name: &'static str,
        #[source]
        source: ControlError,
    },
    #[error("canvas must be at least 1x1 (got {0}x{1})")]
    EmptyCanvas(u32, u32),
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layout.canvas_width == 0 || self.layout.canvas_height == 0 {
            return Err(ConfigError::EmptyCanvas(
                self.layout.canvas_width,
                self.layout.canvas_height,
            ));
        }
        self.size
            .validate()
            .map_err(|source| ConfigError::Control {
                name: "size",
                source,
            })?;
        self.overlap
            .validate()
            .map_err(|source| ConfigError::Control {
                name: "overlap",
                source,
            })?;
        Ok(())
    }
}

/// Built-in defaults, then the TOML file (if given), then `OVERLAP_*`
/// environment variables, e.g. `OVERLAP_LAYOUT__WORDS_PER_LINE=3`.
pub fn load_config(path: Option<&Path>) -> Result<ExperimentConfig, ConfigError> {
    let defaults = config::Config::try_from(&ExperimentConfig::default())?;
    let mut builder = config::Config::builder().add_source(defaults);
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }
    let settings = builder
        .add_source(
            config::Environment::with_prefix("OVERLAP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: ExperimentConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
