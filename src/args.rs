use clap::Parser;
use sitemap_scraper::config::ScrapeConfig;
use sitemap_scraper::filter::normalize_extensions;
use sitemap_scraper::writers::OutputFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sitemap-scraper")]
#[command(about = "Scrape every page listed in a website's sitemap")]
#[command(version)]
pub struct Args {
    /// Website or sitemap URL (asked for when omitted)
    pub url: Option<String>,

    /// Maximum number of pages to scrape
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// File extensions to skip, comma-separated (e.g. pdf,jpg)
    #[arg(short = 'x', long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Output formats, comma-separated
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub format: Vec<OutputFormat>,

    /// Root directory for output files
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of pages fetched at once
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Never prompt; use only flags and the config file
    #[arg(long)]
    pub no_prompt: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Args {
    /// Layer the command-line flags over `config`
    pub fn apply_to(&self, mut config: ScrapeConfig) -> ScrapeConfig {
        if let Some(url) = &self.url {
            config.target = Some(url.clone());
        }
        if let Some(limit) = self.limit {
            config.selection.max_count = Some(limit);
        }
        let exclude = normalize_extensions(&self.exclude);
        if !exclude.is_empty() {
            config.selection.excluded_extensions = exclude;
        }
        if !self.format.is_empty() {
            config.formats = self.format.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if self.no_prompt {
            config.interactive = false;
        }
        if self.no_progress {
            config.progress = false;
        }
        config
    }
}
