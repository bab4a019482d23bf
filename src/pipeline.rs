use crate::error::{FetchError, ScrapeError};
use crate::fetchers::PageFetcher;
use crate::filter::Selection;
use crate::parsers::extract_page;
use crate::reporter::{LogReporter, Reporter};
use crate::results::{PageRecord, ScrapedCollection};
use crate::sitemap::{fetch_sitemap, resolve_sitemap_url, try_parse_sitemap};
use crate::writers::{ResultWriter, WriteOutcome};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Why a run stopped before scraping anything
#[derive(Debug)]
pub enum Abort {
    /// The sitemap could not be downloaded
    SitemapUnavailable(FetchError),
    /// The sitemap was empty or could not be parsed
    NoUrlsFound { parse_error: Option<String> },
    /// Every URL was removed by the selection
    NoUrlsRemain,
}

impl std::fmt::Display for Abort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Abort::SitemapUnavailable(e) => write!(f, "Error fetching sitemap: {}", e),
            Abort::NoUrlsFound { parse_error: None } => write!(f, "No URLs found in the sitemap."),
            Abort::NoUrlsFound {
                parse_error: Some(e),
            } => write!(f, "No URLs found in the sitemap ({}).", e),
            Abort::NoUrlsRemain => write!(f, "No URLs left after filtering."),
        }
    }
}

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    Completed(ScrapedCollection),
    Aborted(Abort),
}

/// Decides which URLs to scrape once the sitemap size is known
pub trait SelectionPolicy {
    fn choose(&mut self, total: usize) -> Result<Selection, ScrapeError>;
}

/// A fixed selection is used as is, but a page count outside `1..=total` is
/// rejected rather than clamped.
impl SelectionPolicy for Selection {
    fn choose(&mut self, total: usize) -> Result<Selection, ScrapeError> {
        self.validate(total)?;
        Ok(self.clone())
    }
}

/// Fetch one page and extract its record.
///
/// Failures are reported and turned into `None` so the caller can move on.
pub async fn scrape_page<F: PageFetcher>(
    fetcher: &F,
    reporter: &dyn Reporter,
    url: &str,
) -> Option<PageRecord> {
    reporter.page_started(url);
    match fetcher.fetch(url).await {
        Ok(body) => {
            let record = extract_page(url, &body);
            reporter.page_finished(url);
            Some(record)
        }
        Err(e) => {
            reporter.page_failed(url, &e);
            None
        }
    }
}

/// Sitemap-driven scraping run: retrieve, parse, select, extract
pub struct Pipeline<F> {
    fetcher: Arc<F>,
    reporter: Arc<dyn Reporter>,
    concurrency: usize,
}

impl<F: PageFetcher + 'static> Pipeline<F> {
    /// Create a sequential pipeline that reports through the log
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            reporter: Arc::new(LogReporter),
            concurrency: 1,
        }
    }

    /// Send progress notifications to `reporter`
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Allow up to `concurrency` page fetches in flight (minimum 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run every stage for `target`.
    ///
    /// Sitemap problems and empty selections end the run with
    /// [`RunOutcome::Aborted`]; only an invalid target or a rejected
    /// selection are errors.
    pub async fn run<P: SelectionPolicy + ?Sized>(
        &self,
        target: &str,
        policy: &mut P,
    ) -> Result<RunOutcome, ScrapeError> {
        let sitemap_url = resolve_sitemap_url(target)?;

        let document = match fetch_sitemap(self.fetcher.as_ref(), &sitemap_url).await {
            Ok(document) => document,
            Err(e) => return Ok(self.abort(Abort::SitemapUnavailable(e))),
        };
        self.reporter
            .sitemap_fetched(sitemap_url.as_str(), document.len());

        let urls = match try_parse_sitemap(&document) {
            Ok(urls) if urls.is_empty() => {
                return Ok(self.abort(Abort::NoUrlsFound { parse_error: None }));
            }
            Ok(urls) => urls,
            Err(e) => {
                return Ok(self.abort(Abort::NoUrlsFound {
                    parse_error: Some(e.to_string()),
                }));
            }
        };
        self.reporter.urls_found(urls.len());

        let selection = policy.choose(urls.len())?;
        let selected = selection.apply(urls);
        if selected.is_empty() {
            return Ok(self.abort(Abort::NoUrlsRemain));
        }

        Ok(RunOutcome::Completed(self.extract(selected).await))
    }

    /// Scrape `urls`, keeping successful records in URL order
    pub async fn extract(&self, urls: Vec<String>) -> ScrapedCollection {
        self.reporter.selected(urls.len());

        let results = if self.concurrency > 1 {
            self.extract_concurrent(urls).await
        } else {
            let mut results = Vec::with_capacity(urls.len());
            for url in &urls {
                results.push(scrape_page(self.fetcher.as_ref(), self.reporter.as_ref(), url).await);
            }
            results
        };

        let mut collection = ScrapedCollection::default();
        for result in results {
            match result {
                Some(record) => collection.records.push(record),
                None => collection.skipped += 1,
            }
        }

        self.reporter
            .finished(collection.records.len(), collection.skipped);
        collection
    }

    async fn extract_concurrent(&self, urls: Vec<String>) -> Vec<Option<PageRecord>> {
        ::log::debug!(
            "Extracting {} pages with up to {} requests in flight",
            urls.len(),
            self.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(urls.len());

        for url in urls {
            let fetcher = Arc::clone(&self.fetcher);
            let reporter = Arc::clone(&self.reporter);
            let semaphore = Arc::clone(&semaphore);

            handles.push(tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    ::log::error!("Request limiter closed before {} was scraped", url);
                    return None;
                };
                scrape_page(fetcher.as_ref(), reporter.as_ref(), &url).await
            }));
        }

        // Awaiting in spawn order keeps the output in sitemap order
        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    ::log::error!("Scrape task failed: {}", e);
                    results.push(None);
                }
            }
        }
        results
    }

    /// Hand the finished collection to the writer, reporting each format
    pub fn save(
        &self,
        writer: &ResultWriter,
        slug: &str,
        collection: &ScrapedCollection,
    ) -> Vec<WriteOutcome> {
        let outcomes = writer.write_all(slug, &collection.records);
        for outcome in &outcomes {
            match &outcome.result {
                Ok(path) => self.reporter.output_written(outcome.format, path),
                Err(e) => self.reporter.output_failed(outcome.format, e),
            }
        }
        outcomes
    }

    fn abort(&self, reason: Abort) -> RunOutcome {
        self.reporter.aborted(&reason);
        RunOutcome::Aborted(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SelectionError;
    use crate::reporter::NullReporter;
    use crate::sitemap::SITEMAP_NS;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct FakeSite {
        pages: HashMap<String, String>,
        delays: HashMap<String, u64>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        requests: Mutex<Vec<String>>,
    }

    impl FakeSite {
        fn with_page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        fn with_sitemap(self, origin: &str, locs: &[&str]) -> Self {
            let entries: String = locs
                .iter()
                .map(|loc| format!("<url><loc>{}</loc></url>", loc))
                .collect();
            let xml = format!(r#"<urlset xmlns="{}">{}</urlset>"#, SITEMAP_NS, entries);
            self.with_page(&format!("{}/sitemap.xml", origin), &xml)
        }

        fn with_delay(mut self, url: &str, millis: u64) -> Self {
            self.delays.insert(url.to_string(), millis);
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl PageFetcher for FakeSite {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(millis) = self.delays.get(url) {
                tokio::time::sleep(Duration::from_millis(*millis)).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.pages.get(url).cloned().ok_or(FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<String>>,
    }

    impl RecordingReporter {
        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Reporter for RecordingReporter {
        fn urls_found(&self, total: usize) {
            self.push(format!("found {}", total));
        }

        fn selected(&self, count: usize) {
            self.push(format!("selected {}", count));
        }

        fn page_failed(&self, url: &str, _error: &FetchError) {
            self.push(format!("failed {}", url));
        }

        fn aborted(&self, reason: &Abort) {
            self.push(format!("aborted {}", reason));
        }

        fn finished(&self, scraped: usize, skipped: usize) {
            self.push(format!("finished {} {}", scraped, skipped));
        }
    }

    fn page(title: &str, body: &str) -> String {
        format!(
            r#"<html><head><title>{}</title><meta name="description" content="About {}"></head><body><p>{}</p></body></html>"#,
            title, title, body
        )
    }

    fn completed(outcome: RunOutcome) -> ScrapedCollection {
        match outcome {
            RunOutcome::Completed(collection) => collection,
            RunOutcome::Aborted(reason) => panic!("run aborted: {}", reason),
        }
    }

    fn site_of(count: usize) -> FakeSite {
        let locs: Vec<String> = (1..=count).map(|i| format!("https://ex.com/{}", i)).collect();
        let refs: Vec<&str> = locs.iter().map(String::as_str).collect();
        let mut site = FakeSite::default().with_sitemap("https://ex.com", &refs);
        for (i, loc) in locs.iter().enumerate() {
            site = site.with_page(loc, &page(&format!("Page {}", i + 1), "text"));
        }
        site
    }

    #[test]
    fn test_abort_messages() {
        assert_eq!(Abort::NoUrlsRemain.to_string(), "No URLs left after filtering.");
        assert_eq!(
            Abort::NoUrlsFound { parse_error: None }.to_string(),
            "No URLs found in the sitemap."
        );

        let fetch = FetchError::Status {
            url: "https://ex.com/sitemap.xml".to_string(),
            status: 500,
        };
        let message = Abort::SitemapUnavailable(fetch).to_string();
        assert!(message.starts_with("Error fetching sitemap"));
        assert!(message.contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_failed_page_is_skipped_and_run_continues() {
        let site = FakeSite::default()
            .with_sitemap(
                "https://ex.com",
                &["https://ex.com/a", "https://ex.com/missing", "https://ex.com/c"],
            )
            .with_page("https://ex.com/a", &page("A", "Alpha"))
            .with_page("https://ex.com/c", &page("C", "Gamma"));

        let reporter = Arc::new(RecordingReporter::default());
        let pipeline = Pipeline::new(site).with_reporter(reporter.clone());

        let collection = completed(
            pipeline
                .run("https://ex.com", &mut Selection::all())
                .await
                .unwrap(),
        );

        let urls: Vec<_> = collection.records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://ex.com/a", "https://ex.com/c"]);
        assert_eq!(collection.skipped, 1);
        assert_eq!(collection.records[1].title, "C");
        assert_eq!(collection.records[1].meta_description, "About C");
        assert_eq!(collection.records[1].content, "Gamma");

        assert_eq!(
            reporter.events(),
            vec![
                "found 3",
                "selected 3",
                "failed https://ex.com/missing",
                "finished 2 1",
            ]
        );
    }

    #[tokio::test]
    async fn test_pages_fetched_in_sitemap_order() {
        let pipeline = Pipeline::new(site_of(4)).with_reporter(Arc::new(NullReporter));
        completed(
            pipeline
                .run("https://ex.com/", &mut Selection::all())
                .await
                .unwrap(),
        );

        assert_eq!(
            pipeline.fetcher.requests(),
            vec![
                "https://ex.com/sitemap.xml",
                "https://ex.com/1",
                "https://ex.com/2",
                "https://ex.com/3",
                "https://ex.com/4",
            ]
        );
    }

    #[tokio::test]
    async fn test_sitemap_failure_aborts() {
        let reporter = Arc::new(RecordingReporter::default());
        let pipeline = Pipeline::new(FakeSite::default()).with_reporter(reporter.clone());

        let outcome = pipeline
            .run("https://ex.com", &mut Selection::all())
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            RunOutcome::Aborted(Abort::SitemapUnavailable(FetchError::Status { status: 404, .. }))
        ));
        // No page requests after the sitemap failed
        assert_eq!(pipeline.fetcher.requests(), vec!["https://ex.com/sitemap.xml"]);
        assert_eq!(reporter.events().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_sitemap_ends_gracefully() {
        let site = FakeSite::default().with_page("https://ex.com/sitemap.xml", "<urlset><url>");
        let pipeline = Pipeline::new(site).with_reporter(Arc::new(NullReporter));

        let outcome = pipeline
            .run("https://ex.com", &mut Selection::all())
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            RunOutcome::Aborted(Abort::NoUrlsFound {
                parse_error: Some(_)
            })
        ));
    }

    #[tokio::test]
    async fn test_empty_sitemap_aborts_without_error() {
        let site = FakeSite::default().with_sitemap("https://ex.com", &[]);
        let pipeline = Pipeline::new(site).with_reporter(Arc::new(NullReporter));

        let outcome = pipeline
            .run("https://ex.com", &mut Selection::all())
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            RunOutcome::Aborted(Abort::NoUrlsFound { parse_error: None })
        ));
    }

    #[tokio::test]
    async fn test_filtering_everything_aborts() {
        let site = FakeSite::default().with_sitemap("https://ex.com", &["https://ex.com/a.pdf"]);
        let pipeline = Pipeline::new(site).with_reporter(Arc::new(NullReporter));

        let mut selection = Selection::all().with_excluded_extensions(["pdf"]);
        let outcome = pipeline.run("https://ex.com", &mut selection).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Aborted(Abort::NoUrlsRemain)));
    }

    #[tokio::test]
    async fn test_max_count_selects_prefix() {
        let pipeline = Pipeline::new(site_of(5)).with_reporter(Arc::new(NullReporter));

        let collection = completed(
            pipeline
                .run("https://ex.com", &mut Selection::all().with_max_count(2))
                .await
                .unwrap(),
        );
        let urls: Vec<_> = collection.records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://ex.com/1", "https://ex.com/2"]);
    }

    #[tokio::test]
    async fn test_out_of_range_count_is_rejected() {
        let pipeline = Pipeline::new(site_of(5)).with_reporter(Arc::new(NullReporter));

        let result = pipeline
            .run("https://ex.com", &mut Selection::all().with_max_count(6))
            .await;
        assert!(matches!(
            result,
            Err(ScrapeError::Selection(SelectionError::OutOfRange {
                requested: 6,
                total: 5
            }))
        ));
        // Nothing past the sitemap was fetched
        assert_eq!(pipeline.fetcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_target_is_error() {
        let pipeline = Pipeline::new(FakeSite::default());
        let result = pipeline.run("not a url", &mut Selection::all()).await;
        assert!(matches!(result, Err(ScrapeError::InvalidTarget { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_extraction_matches_sequential() {
        let build = || {
            site_of(6)
                .with_delay("https://ex.com/1", 60)
                .with_delay("https://ex.com/2", 40)
                .with_delay("https://ex.com/3", 20)
                .with_page("https://ex.com/4", "<p>four</p>")
                .with_delay("https://ex.com/6", 10)
        };

        let mut site = build();
        site.pages.remove("https://ex.com/5");
        let sequential = Pipeline::new(site).with_reporter(Arc::new(NullReporter));
        let expected = completed(
            sequential
                .run("https://ex.com", &mut Selection::all())
                .await
                .unwrap(),
        );

        let mut site = build();
        site.pages.remove("https://ex.com/5");
        let concurrent = Pipeline::new(site)
            .with_reporter(Arc::new(NullReporter))
            .with_concurrency(3);
        let actual = completed(
            concurrent
                .run("https://ex.com", &mut Selection::all())
                .await
                .unwrap(),
        );

        assert_eq!(actual, expected);
        assert_eq!(actual.skipped, 1);
        assert_eq!(actual.records.len(), 5);
        assert_eq!(actual.records[3].content, "four");
        assert!(concurrent.fetcher.max_in_flight.load(Ordering::SeqCst) <= 3);
        assert_eq!(sequential.fetcher.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrency_never_below_one() {
        let pipeline = Pipeline::new(FakeSite::default()).with_concurrency(0);
        assert_eq!(pipeline.concurrency(), 1);
    }

    #[tokio::test]
    async fn test_save_reports_each_format() {
        use crate::writers::OutputFormat;

        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(site_of(2)).with_reporter(Arc::new(NullReporter));
        let collection = completed(
            pipeline
                .run("https://ex.com", &mut Selection::all())
                .await
                .unwrap(),
        );

        let writer = ResultWriter::new(dir.path(), vec![OutputFormat::Json, OutputFormat::Xml]);
        let outcomes = pipeline.save(&writer, "ex_com", &collection);
        assert!(outcomes.iter().all(|o| o.result.is_ok()));

        let loaded =
            crate::writers::json::read_json(&writer.output_path("ex_com", OutputFormat::Json))
                .unwrap();
        assert_eq!(loaded, collection.records);
    }
}
