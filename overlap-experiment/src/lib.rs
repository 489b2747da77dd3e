pub mod config;
pub mod controller;
pub mod input;
pub mod outcome;
pub mod participant;
pub mod plan;
pub mod session;
pub mod store;

pub use config::{ButtonConfig, ConfigError, ExperimentConfig, LayoutConfig, Point, load_config};
pub use controller::{ConfirmOutcome, TrialController, TrialError};
pub use input::PointerEvent;
pub use outcome::{RecordingOutcome, TrialOutcome};
pub use participant::{MAX_PARTICIPANT_ID_LEN, PARTICIPANT_ID, ParticipantError, ParticipantId};
pub use plan::{PlanError, TrialPlan};
pub use session::{Session, SessionStep};
pub use store::{ALL_TRIAL_DATA, FileStore, LogRecorder, MemoryStore, ResultStore, StoreError};
