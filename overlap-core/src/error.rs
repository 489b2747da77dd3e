use thiserror::Error;

/// Rejected control configurations. These are programming or configuration
/// mistakes and are reported before anything is drawn.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error("control range must satisfy min < max (got {min}..{max})")]
    InvalidRange { min: f64, max: f64 },
    #[error("logarithmic control needs a positive minimum (got {0})")]
    NonPositiveLogMinimum(f64),
    #[error("control track must have a positive width (got {0})")]
    EmptyTrack(f64),
    #[error("initial value {value} lies outside {min}..{max}")]
    InitialOutOfRange { value: f64, min: f64, max: f64 },
    #[error("reference mark {value} lies outside {min}..{max}")]
    ReferenceOutOfRange { value: f64, min: f64, max: f64 },
}
