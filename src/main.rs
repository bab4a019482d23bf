use clap::Parser;
use sitemap_scraper::config::ScrapeConfig;
use sitemap_scraper::fetchers::HttpFetcher;
use sitemap_scraper::pipeline::{Pipeline, RunOutcome};
use sitemap_scraper::prompt::{InteractiveSelection, Prompter};
use sitemap_scraper::reporter::{LogReporter, ProgressReporter, Reporter};
use sitemap_scraper::sitemap::resolve_sitemap_url;
use sitemap_scraper::utils::domain_slug;
use sitemap_scraper::writers::ResultWriter;
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging, defaulting to info when RUST_LOG is unset
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ::log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let base = match &args.config {
        Some(path) => ScrapeConfig::from_file(path)?,
        None => ScrapeConfig::default(),
    };
    let config = args.apply_to(base);
    config.validate()?;

    let target = match &config.target {
        Some(target) => target.clone(),
        None if config.interactive => Prompter::stdio().site_target()?,
        None => return Err("no website URL given and prompting is disabled".into()),
    };

    let sitemap_url = resolve_sitemap_url(&target)?;
    let slug = domain_slug(&sitemap_url);
    ::log::info!("Starting scrape of {} (output under {})", target, slug);

    let reporter: Arc<dyn Reporter> = if config.progress {
        Arc::new(ProgressReporter::new())
    } else {
        Arc::new(LogReporter)
    };
    let pipeline = Pipeline::new(HttpFetcher::new(config.timeout())?)
        .with_reporter(reporter)
        .with_concurrency(config.concurrency);

    let outcome = if config.interactive {
        let mut policy = InteractiveSelection::new(Prompter::stdio(), config.selection.clone());
        pipeline.run(&target, &mut policy).await?
    } else {
        let mut selection = config.selection.clone();
        pipeline.run(&target, &mut selection).await?
    };

    // Aborted runs have already been reported and produce no output
    let RunOutcome::Completed(collection) = outcome else {
        return Ok(());
    };

    let writer = ResultWriter::new(&config.output_dir, config.formats.clone());
    let outcomes = pipeline.save(&writer, &slug, &collection);

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        return Err(format!("failed to save {} of {} output files", failed, outcomes.len()).into());
    }
    Ok(())
}
