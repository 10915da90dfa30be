//! Export pipeline: post-composite resize, output naming, format encoding,
//! and the batch orchestrator.

pub mod batch;
pub mod error;
pub mod resize;
pub mod single;

pub use batch::{run_batch, spawn_batch, BatchEvent, BatchHandle, BatchSummary};
pub use error::ExportError;
pub use resize::apply_resize;
pub use single::{export_single, output_path, ExportOutcome};
