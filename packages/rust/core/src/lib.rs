//! Batch orchestration for the compendium converter.
//!
//! Runs the per-category [`compendium_convert::Convertor`] over a whole dump
//! of categories, in parallel, with one shared corrections tally.

pub mod batch;
pub mod dump;

pub use batch::{BatchReport, after_convert, before_convert, convert_batch};
pub use compendium_convert::{CorrectionTally, ProgressSink, SilentProgress};
pub use dump::{load_categories, save_categories};
