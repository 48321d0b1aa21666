//! This program explores how the top 10 language editions of Wikipedia cover
//! the subtopics of climate change, based on a pre-computed count of
//! articles per (language, subtopic) pair.

mod chart;
mod config;
mod dataset;
mod error;
mod languages;
mod report;
mod selection;
mod subtopics;
mod transform;

use crate::{
    chart::ChartSpec,
    config::Config,
    dataset::{cache, Dataset},
    selection::SelectionRequest,
    transform::Transformed,
};
use anyhow::Context;
use clap::Parser;
use dialoguer::Select;
use log::LevelFilter;
use std::{num::NonZeroUsize, path::PathBuf, sync::Arc};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Explore Wikipedia's coverage of climate change subtopics across languages
///
/// Every run renders the article distribution for one selection of languages
/// and subtopics. In interactive mode, you are then offered to change the
/// selection or reload the data files, and render again.
#[derive(Parser, Debug)]
#[command(version, author)]
struct Args {
    /// Tabular dataset with language_code, subtopic and article_count columns
    ///
    /// CSV with a header row. Files whose name ends with ".gz" are
    /// decompressed on the fly.
    #[arg(long, default_value = "my_data/wiki_cc_subtopics.csv")]
    data: PathBuf,

    /// Keywords that were used to classify articles into subtopics
    ///
    /// JSON object mapping each subtopic to an object that maps language
    /// codes to lists of keywords.
    #[arg(long, default_value = "my_data/subtopic_mapping.json")]
    mapping: PathBuf,

    /// Languages to be displayed
    ///
    /// Either "All Languages", or a comma-separated list of language codes
    /// ("en") or selector labels ("English (en)").
    #[arg(short, long, default_value = languages::ALL_LANGUAGES)]
    language: String,

    /// Subtopics to be displayed
    ///
    /// Either "All Subtopics", or a comma-separated list of subtopics. Case
    /// does not matter.
    #[arg(short, long, default_value = subtopics::ALL_SUBTOPICS)]
    subtopic: String,

    /// Chart type: "Stacked Bar", "Grouped Bar" or "Percentage Stacked"
    ///
    /// Short forms "stacked", "grouped" and "percent" are also accepted.
    #[arg(short, long, default_value = "Stacked Bar")]
    chart: String,

    /// Language order: "Default Order", "Total Articles (Descending)" or
    /// "Total Articles (Ascending)"
    ///
    /// Short forms "default", "desc" and "asc" are also accepted.
    #[arg(short = 'o', long, default_value = "Default Order")]
    sort: String,

    /// Offer to change the selection or reload the data after each render
    #[arg(short, long, default_value_t = false)]
    interactive: bool,

    /// Show the detailed breakdown table
    #[arg(long, default_value_t = false)]
    details: bool,

    /// Show the subtopic classification keywords
    #[arg(long, default_value_t = false)]
    keywords: bool,

    /// Show the raw filtered records
    #[arg(long, default_value_t = false)]
    raw: bool,

    /// Show every optional section
    #[arg(long, default_value_t = false)]
    all_sections: bool,

    /// Also export the chart description as JSON to this file
    #[arg(long)]
    chart_json: Option<PathBuf>,

    /// Width of the text chart's longest bar, in characters
    #[arg(long, default_value = "60")]
    width: NonZeroUsize,
}
//
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Set up logging
    setup_logging();

    // Decode CLI arguments
    let config = Config::new(Args::parse()).context("checking command line arguments")?;
    log::debug!("Running with {config:#?}");

    // Show the page header
    let mut stdout = BufWriter::new(tokio::io::stdout());
    stdout.write_all(report::header().as_bytes()).await?;
    stdout.flush().await?;

    // Render the initial selection, then let the user iterate if requested
    let mut request = config.initial_selection.clone();
    loop {
        let (dataset, rendered) = load_and_render(&config, &request).await;
        if !config.interactive {
            return rendered;
        }
        if let Err(e) = rendered {
            log::error!("Render cycle failed: {e:#}");
            eprintln!("error: {e:#}");
        }

        match Select::new()
            .with_prompt("What next?")
            .items(&NEXT_ACTIONS)
            .default(0)
            .interact()?
        {
            0 => match &dataset {
                Some(dataset) => request = request.prompt(dataset)?,
                None => eprintln!(
                    "The data files could not be loaded, so there is nothing to select from. \
                     Fix them, then reload."
                ),
            },
            1 => {
                let input = &config.input;
                cache::global().invalidate(&input.data_path, &input.mapping_path);
            }
            _ => return Ok(()),
        }
    }
}

/// Actions offered after each interactive render
const NEXT_ACTIONS: [&str; 3] = ["Change the selection", "Reload the data files", "Quit"];

/// Get the dataset from the process-wide cache, loading it if needed
async fn load(config: &Config) -> Result<Arc<Dataset>> {
    let input = &config.input;
    cache::global()
        .get_or_load(&input.data_path, &input.mapping_path)
        .await
        .context("loading the dataset")
}

/// Load the dataset and render a selection of it
///
/// The dataset is returned whenever loading succeeded, even if rendering
/// failed, so that the user can still pick another selection.
async fn load_and_render(
    config: &Config,
    request: &SelectionRequest,
) -> (Option<Arc<Dataset>>, Result<()>) {
    match load(config).await {
        Ok(dataset) => {
            let rendered = render_cycle(config, &dataset, request).await;
            (Some(dataset), rendered)
        }
        Err(e) => (None, Err(e)),
    }
}

/// Render one selection of the dataset to stdout, and optionally export the
/// chart description to a JSON file
async fn render_cycle(config: &Config, dataset: &Dataset, request: &SelectionRequest) -> Result<()> {
    let selection = request.resolve(dataset);
    let transformed =
        transform::transform(dataset.records(), &selection).context("transforming the selection")?;
    let page = report::render(
        dataset.mapping(),
        &selection,
        &transformed,
        config.sections,
        config.width.get(),
    );

    let mut stdout = BufWriter::new(tokio::io::stdout());
    stdout.write_all(page.as_bytes()).await?;
    stdout.flush().await?;

    if let Some(path) = &config.chart_json {
        match &transformed {
            Transformed::Ready(view) => {
                let json = ChartSpec::new(view, selection.chart_mode).to_json()?;
                tokio::fs::write(path, json)
                    .await
                    .with_context(|| format!("exporting the chart to {}", path.display()))?;
                log::info!("Exported chart description to {}", path.display());
            }
            Transformed::Empty(empty) => {
                log::warn!("Not exporting an empty chart ({empty:?})");
            }
        }
    }
    Ok(())
}

/// Use anyhow for Result type erasure
pub use anyhow::Result;

/// Wikipedia language code, e.g. "en"
pub type LanguageCode = Box<str>;

/// Climate change subtopic, e.g. "Policy"
pub type Subtopic = Box<str>;

/// Number of articles for a (language, subtopic) pair
pub type ArticleCount = u64;

/// Set up logging
///
/// Logs go to syslog. The dashboard remains usable without it, so failure to
/// reach syslog is only reported on stderr.
fn setup_logging() {
    let level = if cfg!(feature = "log-trace") {
        LevelFilter::Trace
    } else if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = syslog::init(syslog::Facility::LOG_USER, level, None) {
        eprintln!("warning: logging is disabled, could not connect to syslog ({e})");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::DashboardError, selection::Choice};
    use tempfile::TempDir;

    fn config(dir: &TempDir, csv: &str) -> Config {
        let data = dir.path().join("data.csv");
        let mapping = dir.path().join("mapping.json");
        std::fs::write(&data, csv).unwrap();
        std::fs::write(&mapping, "{}").unwrap();
        let args = Args::try_parse_from([
            "climate-wiki-explorer",
            "--data",
            data.to_str().unwrap(),
            "--mapping",
            mapping.to_str().unwrap(),
        ])
        .unwrap();
        Config::new(args).unwrap()
    }

    fn dashboard_error(rendered: &Result<()>) -> Option<&DashboardError> {
        rendered.as_ref().err()?.downcast_ref()
    }

    #[tokio::test]
    async fn failed_render_keeps_the_dataset_for_reselection() {
        let dir = TempDir::new().unwrap();
        let config = config(
            &dir,
            "language_code,subtopic,article_count\nfr,Policy,4\nfr,Policy,6\nfr,Science,1\n",
        );

        let (dataset, rendered) = load_and_render(&config, &config.initial_selection).await;
        assert!(matches!(
            dashboard_error(&rendered),
            Some(DashboardError::DuplicateKey { .. })
        ));
        let dataset = dataset.expect("loading succeeded, only rendering failed");
        assert_eq!(dataset.records().len(), 3);

        // Narrowing the selection gets past the duplicate
        let request = SelectionRequest {
            subtopics: Choice::one("Science".into()),
            ..config.initial_selection.clone()
        };
        let (dataset, rendered) = load_and_render(&config, &request).await;
        rendered.unwrap();
        assert!(dataset.is_some());
    }

    #[tokio::test]
    async fn failed_load_has_no_dataset() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, "language_code,subtopic\nfr,Policy\n");
        let (dataset, rendered) = load_and_render(&config, &config.initial_selection).await;
        assert!(dataset.is_none());
        assert!(matches!(
            dashboard_error(&rendered),
            Some(DashboardError::DataFormat { .. })
        ));
    }
}
