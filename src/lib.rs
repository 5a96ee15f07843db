pub mod error;
pub mod logging;
pub mod models;
pub mod stage;
pub mod stream;

pub use error::*;
pub use models::*;
pub use stage::{FormatConverter, PredecodedData, Predecoder, ResampleStage, Stage};
