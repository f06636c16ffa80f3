//! Batch conversion: many categories, one corrections tally.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use compendium_convert::{CorrectionTally, Convertor, ProgressSink};
use compendium_shared::{Category, CategoryKind, CompendiumError, ConvertConfig, Result};

/// Result of a batch conversion.
#[derive(Debug)]
pub struct BatchReport {
    /// Converted categories, in input order.
    pub categories: Vec<Category>,
    /// Entries that received a one-off correction.
    pub corrected: usize,
    /// Entries processed across all categories.
    pub entries: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Prepare a batch before any entry is converted.
///
/// The glossary always carries exactly one blacklisted entry, which the source
/// does not report. Also resets `tally`.
pub fn before_convert(categories: &mut [Category], tally: &CorrectionTally) {
    match categories
        .iter_mut()
        .find(|category| category.id == CategoryKind::Glossary)
    {
        Some(glossary) => glossary.blacklisted_entry_count = 1,
        None => warn!("no Glossary category in batch"),
    }
    tally.clear();
}

/// Report the batch's corrections. Returns how many entries were corrected.
pub fn after_convert(tally: &CorrectionTally) -> usize {
    let corrected = tally.len();
    info!(corrected, "corrected {corrected} entries");
    corrected
}

/// Convert every category, up to `config.concurrency` at a time.
///
/// Each category gets its own [`Convertor`] on a blocking task. The first
/// failed category, in input order, fails the batch.
#[instrument(skip_all, fields(categories = categories.len(), debug = config.debug))]
pub async fn convert_batch(
    mut categories: Vec<Category>,
    config: &ConvertConfig,
    progress: Arc<dyn ProgressSink>,
) -> Result<BatchReport> {
    let start = Instant::now();
    let started_at = Utc::now();
    let tally = Arc::new(CorrectionTally::new());

    before_convert(&mut categories, &tally);

    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1) as usize));
    let mut handles = Vec::with_capacity(categories.len());

    for mut category in categories {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| CompendiumError::Task(e.to_string()))?;
        let tally = tally.clone();
        let progress = progress.clone();
        let debug = config.debug;

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let mut convertor = Convertor::for_category(&category, debug);
            debug!(
                category = %category.id,
                strategy = convertor.strategy_name(),
                entries = category.entries.len(),
                "converting category"
            );
            convertor
                .convert(&mut category, progress.as_ref(), &tally)
                .map(|()| category)
        }));
    }

    let mut converted = Vec::with_capacity(handles.len());
    for handle in handles {
        let category = handle
            .await
            .map_err(|e| CompendiumError::Task(e.to_string()))??;
        converted.push(category);
    }

    let corrected = after_convert(&tally);
    let entries = converted.iter().map(|c| c.entries.len()).sum();

    info!(
        categories = converted.len(),
        entries,
        corrected,
        elapsed_ms = start.elapsed().as_millis(),
        "batch conversion complete"
    );

    Ok(BatchReport {
        categories: converted,
        corrected,
        entries,
        started_at,
        finished_at: Utc::now(),
    })
}
