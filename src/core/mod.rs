pub mod engine;
pub mod pipeline;
pub mod roster;
pub mod session;

pub use crate::domain::model::{BackgroundAsset, Certificate, GenerationOutput, Record, Roster};
pub use crate::domain::ports::{ConfigProvider, Pipeline, ProgressSink, Storage};
pub use crate::utils::error::Result;
