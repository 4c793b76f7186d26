use std::path::PathBuf;

use catalog_convert::{ConvertError, Result, RunConfig, pipeline};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_tracing()?;
    match cli.command {
        Command::Convert(args) => execute_convert(args),
        Command::RefreshSpecifications(args) => {
            let config = load_config(args.config.as_ref())?;
            let path = pipeline::refresh_specifications(&config)?;
            println!("specification document written to {}", path.display());
            Ok(())
        }
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ConvertError::Logging(error.to_string()))
}

fn load_config(path: Option<&PathBuf>) -> Result<RunConfig> {
    match path {
        Some(path) => RunConfig::load(path),
        None => Ok(RunConfig::default()),
    }
}

fn execute_convert(args: ConvertArgs) -> Result<()> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(input_dir) = args.input_dir {
        config.input_dir = input_dir;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if args.article.is_some() {
        config.debug_article = args.article;
    }
    if !config.input_dir.exists() {
        return Err(ConvertError::MissingInput(config.input_dir));
    }

    for summary in pipeline::run_all(&config)? {
        println!(
            "{}: {} articles, {} parents, {} memos",
            summary.suffix, summary.article_rows, summary.grandparent_rows, summary.memo_entries
        );
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert ERP flat-file exports into PIM import workbooks."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert every product line found in the input directory.
    Convert(ConvertArgs),
    /// Fetch the specification document and replace the cached copy.
    RefreshSpecifications(ConfigArgs),
}

#[derive(clap::Args)]
struct ConfigArgs {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the export files.
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Root directory for converted files.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Only convert the article with this number.
    #[arg(long)]
    article: Option<String>,
}
