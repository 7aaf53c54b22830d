use crate::table::ResultTable;
use chrono::TimeDelta;
use hubscrape_scanner::{Enumerator, Extractor, HubClient, ScanError};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// What to do with a detail page that yielded no fields at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyRecordPolicy {
    /// Keep it as a row of nulls.
    #[default]
    Keep,
    /// Leave it out of the table.
    Skip,
}

/// Options for configuring a scrape run
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Highest listing page index to read (inclusive).
    pub max_pages: u32,
    /// Pause after each listing page and each detail page.
    pub delay: Duration,
    pub empty_records: EmptyRecordPolicy,
    pub show_progress_bars: bool,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            max_pages: 0,
            delay: Duration::ZERO,
            empty_records: EmptyRecordPolicy::Keep,
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting scrape progress
pub type ScrapeProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Counts gathered while a scrape runs.
#[derive(Debug, Clone, Default)]
pub struct ScrapeStats {
    pub urls_found: usize,
    pub records_kept: usize,
    pub records_skipped: usize,
    pub enumerate_time: Duration,
    pub extract_time: Duration,
}

/// Formats a duration as `H:MM:SS.mmm`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let delta = TimeDelta::from_std(elapsed).unwrap_or(TimeDelta::MAX);
    let hours = delta.num_hours();
    let minutes = delta.num_minutes() % 60;
    let seconds = delta.num_seconds() % 60;
    let millis = delta.subsec_nanos() / 1_000_000;
    format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

fn progress_spinner(show: bool, message: &str) -> Option<ProgressBar> {
    if !show {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    Some(pb)
}

fn progress_bar(show: bool, len: usize) -> Option<ProgressBar> {
    if !show {
        return None;
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    Some(pb)
}

/// Runs the whole pipeline: enumerate listing pages, extract every detail
/// page in order, and collect the records into a table.
///
/// A failed listing page or a transport failure on a detail page aborts the
/// run, and nothing is returned for the pages already processed. Detail
/// pages answered with an error status become empty records.
pub async fn execute_scrape(
    client: HubClient,
    options: &ScrapeOptions,
    progress_callback: Option<ScrapeProgressCallback>,
) -> Result<(ResultTable, ScrapeStats), ScanError> {
    let mut stats = ScrapeStats::default();

    // Stage 1: listing pages
    let started = Instant::now();
    let spinner = progress_spinner(options.show_progress_bars, "Reading listing pages...");
    let mut enumerator = Enumerator::new(client.clone());
    if let Some(ref pb) = spinner {
        let pb = pb.clone();
        enumerator = enumerator.with_page_callback(Arc::new(move |page, total| {
            pb.set_message(format!("Listing page {}: {} model urls", page, total));
        }));
    }

    let urls = match enumerator.enumerate(options.max_pages, options.delay).await {
        Ok(urls) => urls,
        Err(e) => {
            if let Some(ref pb) = spinner {
                pb.abandon_with_message("Listing failed");
            }
            return Err(e);
        }
    };
    if let Some(ref pb) = spinner {
        pb.finish_and_clear();
    }
    stats.urls_found = urls.len();
    stats.enumerate_time = started.elapsed();
    info!("Elapsed time: {}", format_elapsed(stats.enumerate_time));

    if let Some(ref callback) = progress_callback {
        callback(format!("Found {} model urls", urls.len()));
    }

    // Stage 2: detail pages
    let started = Instant::now();
    let extractor = Extractor::new(client);
    let bar = progress_bar(options.show_progress_bars, urls.len());
    let mut table = ResultTable::new();

    for (idx, url) in urls.iter().enumerate() {
        if let Some(ref pb) = bar {
            pb.set_message(url.clone());
        }

        let record = match extractor.extract(url).await {
            Ok(record) => record,
            Err(e) => {
                if let Some(ref pb) = bar {
                    pb.abandon_with_message(format!("Failed on {}", url));
                }
                return Err(e);
            }
        };

        if record.is_empty() && options.empty_records == EmptyRecordPolicy::Skip {
            stats.records_skipped += 1;
        } else {
            table.push(record);
            stats.records_kept += 1;
        }

        if let Some(ref pb) = bar {
            pb.inc(1);
        }
        if let Some(ref callback) = progress_callback {
            callback(format!("Scraped {}/{}: {}", idx + 1, urls.len(), url));
        }

        if !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
    }

    if let Some(ref pb) = bar {
        pb.finish_and_clear();
    }
    stats.extract_time = started.elapsed();

    info!("Number of rows: {}", table.row_count());
    info!("Number of cols: {}", table.columns().len());
    info!("Elapsed time: {}", format_elapsed(stats.extract_time));

    Ok((table, stats))
}
