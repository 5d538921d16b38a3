/// Application state
///
/// - `config.rs` - startup configuration (window, tick rate, sensor source)
/// - `viewer.rs` - per-tick frame acquisition and capture bookkeeping

pub mod config;
pub mod viewer;

pub use config::{SensorSource, ViewerConfig};
pub use viewer::Viewer;
