use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use tripos_core::{
    AspectRatio, Config, FontBook, GeneratedPlan, Language, QrFetcher, SharedPlanStore, TripForm,
    TripSummary, export_share_card, extract_highlights, share_url,
};

const DEFAULT_STORE_DIR: &str = ".tripos/shared";

#[derive(Parser)]
#[command(name = "tripos")]
#[command(about = "Parse itineraries and export share cards")]
struct Cli {
    /// Config file (built-in defaults when omitted or missing)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the block model of an itinerary as JSON
    Parse { input: PathBuf },

    /// Print the highlights found in an itinerary as JSON
    Highlights { input: PathBuf },

    /// Export an itinerary as PDF
    Pdf {
        input: PathBuf,

        /// Output PDF file (defaults to input name with .pdf extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a share card PNG
    Card(CardArgs),

    /// Save or look up shared itineraries
    #[command(subcommand)]
    Share(ShareCommand),
}

#[derive(clap::Args)]
struct CardArgs {
    input: PathBuf,

    /// Destination (taken from the itinerary title when omitted)
    #[arg(long, default_value = "")]
    destination: String,

    /// Trip dates or length, e.g. "5 days" or "2025-04-01 - 2025-04-05"
    #[arg(long, default_value = "")]
    dates: String,

    #[arg(long, default_value = "")]
    travelers: String,

    #[arg(long, default_value = "")]
    budget: String,

    /// Slow, Moderate, Fast or Intense
    #[arg(long, default_value = "")]
    pace: String,

    /// Comma-separated interests, used when no highlights are found
    #[arg(long, default_value = "")]
    interests: String,

    /// Explicit highlight; repeat for more
    #[arg(long = "highlight")]
    highlights: Vec<String>,

    /// square (1x1) or story (9x16)
    #[arg(long, default_value = "square")]
    ratio: AspectRatio,

    #[arg(long, default_value = "en")]
    lang: Language,

    /// Link encoded in the QR code; the plan is saved to the store when omitted
    #[arg(long)]
    share_url: Option<String>,

    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Subcommand)]
enum ShareCommand {
    /// Store an itinerary and print its share link
    Save {
        input: PathBuf,

        #[arg(long, default_value = "en")]
        lang: Language,
    },

    /// Print a stored itinerary as JSON
    Get { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::compiled_default(),
    };

    match cli.command {
        Command::Parse { input } => {
            let blocks = tripos_core::parse(&read_input(&input)?);
            println!("{}", serde_json::to_string_pretty(&blocks)?);
        }
        Command::Highlights { input } => {
            let highlights = extract_highlights(&read_input(&input)?);
            println!("{}", serde_json::to_string_pretty(&highlights)?);
        }
        Command::Pdf { input, output } => {
            let markdown = read_input(&input)?;
            let pdf_bytes = tripos_core::markdown_to_pdf_with_config(&markdown, &config)?;
            let output = output.unwrap_or_else(|| input.with_extension("pdf"));
            write_atomic(&output, &pdf_bytes)?;
            println!("Created {}", output.display());
        }
        Command::Card(args) => run_card(args, &config).await?,
        Command::Share(ShareCommand::Save { input, lang }) => {
            let plan = GeneratedPlan {
                markdown: read_input(&input)?,
                sources: Vec::new(),
            };
            let mut store = open_store(&config)?;
            let id = store.save(&plan, lang)?;
            println!("{}", share_url(&config.store.share_origin, &id, lang));
        }
        Command::Share(ShareCommand::Get { id }) => {
            let store = open_store(&config)?;
            let plan = store
                .get(&id)
                .with_context(|| format!("No shared plan with id {id}"))?;
            println!("{}", serde_json::to_string_pretty(plan)?);
        }
    }

    Ok(())
}

async fn run_card(args: CardArgs, config: &Config) -> Result<()> {
    let markdown = read_input(&args.input)?;

    let url = match args.share_url {
        Some(url) => url,
        None => {
            let mut store = open_store(config)?;
            let plan = GeneratedPlan {
                markdown: markdown.clone(),
                sources: Vec::new(),
            };
            let id = store.save(&plan, args.lang)?;
            share_url(&config.store.share_origin, &id, args.lang)
        }
    };

    let form = TripForm {
        destination: args.destination,
        dates: args.dates,
        travelers: args.travelers,
        budget: args.budget,
        pace: args.pace,
        interests: args.interests,
    };
    let summary = TripSummary::from_form(&form, &markdown, &args.highlights, url);

    let fonts = FontBook::from_config(&config.card)?;
    let fetcher = QrFetcher::new(&config.qr)?;
    let card = export_share_card(&summary, args.ratio, &config.card.labels, &fonts, &fetcher).await?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;
    let output = args.out_dir.join(&card.filename);
    write_atomic(&output, &card.png)?;
    info!(width = card.width, height = card.height, "card written");
    println!("Created {}", output.display());
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Error reading {}", path.display()))
}

fn open_store(config: &Config) -> Result<SharedPlanStore> {
    let dir = config
        .store
        .directory
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR));
    Ok(SharedPlanStore::open(&dir, config.store.capacity)?)
}

/// Write through a temp file in the target directory so a failed export
/// never leaves a partial file behind.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Error creating temp file in {}", dir.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("Error writing {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("Error writing {}", path.display()))?;
    Ok(())
}
