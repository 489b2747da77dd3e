pub mod control;
pub mod error;
pub mod geometry;
pub mod labels;
pub mod scene;
pub mod trial;

pub use control::{Control, ControlSpec, Mapping, Tick, Track};
pub use error::ControlError;
pub use geometry::{BASE_RADIUS, Circle, CirclePair};
pub use labels::{LabelAssignment, wrap_words};
pub use scene::{ButtonView, Scene, SliderView, TextBlock, TickView};
pub use trial::{TrialInputs, TrialLog, TrialResult, round2};
