// Sukashi watermarking library
//
// Core pipeline: settings -> watermark rendering -> resize/export transform,
// driven per-file or through the batch orchestrator.

pub mod export;
pub mod logging;
pub mod resample;
pub mod settings;
pub mod store;
pub mod watermark;

// Re-export the main entry points for convenience
pub use export::{
    batch::{run_batch, spawn_batch, BatchEvent, BatchHandle, BatchSummary},
    single::{export_single, ExportOutcome},
};
pub use settings::{
    AnchorPreset, ExportSettings, ImageStyle, NamingMode, OutputFormat, ResizeMode, TextStyle,
    WatermarkMode, WatermarkSettings,
};
pub use store::{JsonFileStore, MemoryStore, SettingsRecord, SettingsStore};
pub use watermark::apply_watermark;
