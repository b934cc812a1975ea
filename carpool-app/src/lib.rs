pub mod screen;
pub mod screens;
pub mod telemetry;

pub use screen::{ScreenError, ScreenState};
