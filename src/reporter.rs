use crate::error::{FetchError, WriteError};
use crate::pipeline::Abort;
use crate::writers::OutputFormat;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Mutex;

/// Receives progress and outcome notifications from a run.
///
/// All methods default to doing nothing so implementations only override
/// what they care about. Calls may come from several tasks when extraction
/// runs concurrently.
pub trait Reporter: Send + Sync {
    fn sitemap_fetched(&self, _sitemap_url: &str, _bytes: usize) {}

    fn urls_found(&self, _total: usize) {}

    fn selected(&self, _count: usize) {}

    fn page_started(&self, _url: &str) {}

    fn page_finished(&self, _url: &str) {}

    fn page_failed(&self, _url: &str, _error: &FetchError) {}

    fn aborted(&self, _reason: &Abort) {}

    fn finished(&self, _scraped: usize, _skipped: usize) {}

    fn output_written(&self, _format: OutputFormat, _path: &Path) {}

    fn output_failed(&self, _format: OutputFormat, _error: &WriteError) {}
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Reports through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn sitemap_fetched(&self, sitemap_url: &str, bytes: usize) {
        ::log::info!("Fetched sitemap {} ({} bytes)", sitemap_url, bytes);
    }

    fn urls_found(&self, total: usize) {
        ::log::info!("Total pages available: {}", total);
    }

    fn selected(&self, count: usize) {
        ::log::info!("Scraping {} pages", count);
    }

    fn page_started(&self, url: &str) {
        ::log::debug!("Scraping {}", url);
    }

    fn page_finished(&self, url: &str) {
        ::log::debug!("Scraped {}", url);
    }

    fn page_failed(&self, url: &str, error: &FetchError) {
        ::log::warn!("Error scraping {}: {}", url, error);
    }

    fn aborted(&self, reason: &Abort) {
        match reason {
            Abort::SitemapUnavailable(_) => ::log::error!("{}", reason),
            _ => ::log::warn!("{}", reason),
        }
    }

    fn finished(&self, scraped: usize, skipped: usize) {
        ::log::info!(
            "Scraping complete - {} pages scraped, {} skipped",
            scraped,
            skipped
        );
    }

    fn output_written(&self, _format: OutputFormat, path: &Path) {
        ::log::info!("Saved data to {}", path.display());
    }

    fn output_failed(&self, format: OutputFormat, error: &WriteError) {
        ::log::error!("Error saving {} file: {}", format.label(), error);
    }
}

/// Draws a progress bar during extraction and logs everything else
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
    inner: LogReporter,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            inner: LogReporter,
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(bar) = guard.as_ref() {
                f(bar);
            }
        }
    }

    fn take_bar(&self) -> Option<ProgressBar> {
        self.bar.lock().ok().and_then(|mut guard| guard.take())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ProgressReporter {
    fn sitemap_fetched(&self, sitemap_url: &str, bytes: usize) {
        self.inner.sitemap_fetched(sitemap_url, bytes);
    }

    fn urls_found(&self, total: usize) {
        self.inner.urls_found(total);
    }

    fn selected(&self, count: usize) {
        self.inner.selected(count);

        let bar = ProgressBar::new(count as u64);
        match ProgressStyle::default_bar()
            .template("Scraping Progress [{elapsed_precise}] {bar:40} {pos}/{len} pages ({per_sec}, eta {eta})")
        {
            Ok(style) => bar.set_style(style.progress_chars("=> ")),
            Err(e) => ::log::debug!("Falling back to default progress style: {}", e),
        }

        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn page_started(&self, url: &str) {
        self.with_bar(|bar| bar.set_message(url.to_string()));
    }

    fn page_finished(&self, _url: &str) {
        self.with_bar(|bar| bar.inc(1));
    }

    fn page_failed(&self, url: &str, error: &FetchError) {
        self.with_bar(|bar| {
            bar.suspend(|| self.inner.page_failed(url, error));
            bar.inc(1);
        });
    }

    fn aborted(&self, reason: &Abort) {
        if let Some(bar) = self.take_bar() {
            bar.finish_and_clear();
        }
        self.inner.aborted(reason);
    }

    fn finished(&self, scraped: usize, skipped: usize) {
        if let Some(bar) = self.take_bar() {
            bar.finish_and_clear();
        }
        self.inner.finished(scraped, skipped);
    }

    fn output_written(&self, format: OutputFormat, path: &Path) {
        self.inner.output_written(format, path);
    }

    fn output_failed(&self, format: OutputFormat, error: &WriteError) {
        self.inner.output_failed(format, error);
    }
}
