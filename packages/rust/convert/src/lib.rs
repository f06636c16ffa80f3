//! Entry conversion for scraped compendium categories.
//!
//! Turns raw entry markup into compact normalized markup, a source-book
//! abbreviation, and a plain-text projection for search. The work for one
//! category is done by a [`Convertor`], which picks a kind-specific
//! [`ConvertStrategy`] for sorting and computed columns.

pub mod corrections;
pub mod fulltext;
pub mod normalize;
pub mod source_book;
pub mod strategy;
pub mod validator;

mod convertor;

pub use convertor::{Convertor, ProgressSink, SilentProgress};
pub use corrections::{Correction, CorrectionTally};
pub use source_book::{SourceBook, SourceBookResolver};
pub use strategy::{ConvertStrategy, strategy_for};
pub use validator::{Finding, Validator};
