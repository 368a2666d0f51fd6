use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use remedy_check::analysis::AnalysisResult;
use remedy_check::session::{SessionStatus, StartOutcome, PROGRESS_CAPTIONS};
use remedy_check::share::{copy_to_clipboard, share_text, CopyOutcome, DISCLAIMER};
use remedy_check::{AnalysisClient, AnalysisSession, Config};

/// Check a viral home remedy against clinical evidence.
#[derive(Parser, Debug)]
#[command(name = "remedy-check", version, about)]
struct Cli {
    /// Config file (default: ~/.remedy-check/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze an image or video of a remedy
    Analyze {
        file: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Also print the shareable summary
        #[arg(long)]
        share: bool,
        /// Copy the shareable summary to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Print the shareable summary for a saved JSON result
    Share {
        result: PathBuf,
        #[arg(long)]
        copy: bool,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Effective configuration, API key masked
    Show,
    /// JSON schema of the config file
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(|key| std::env::var(key).ok());

    match cli.command {
        Commands::Analyze {
            file,
            json,
            share,
            copy,
        } => analyze(&config, file, json, share, copy).await,
        Commands::Share { result, copy } => {
            let raw = tokio::fs::read_to_string(&result)
                .await
                .with_context(|| format!("Failed to read {}", result.display()))?;
            let parsed: AnalysisResult =
                serde_json::from_str(&raw).context("File is not an analysis result")?;
            emit_share(&parsed, copy);
            Ok(())
        }
        Commands::Config { command } => {
            match command {
                ConfigCommands::Show => print!("{}", config.redacted().to_toml()?),
                ConfigCommands::Schema => println!("{}", Config::json_schema()?),
            }
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "remedy_check=info",
        1 => "remedy_check=debug",
        _ => "remedy_check=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn analyze(config: &Config, file: PathBuf, json: bool, share: bool, copy: bool) -> Result<()> {
    let client = AnalysisClient::from_config(config).context("Failed to set up the model client")?;
    let session =
        AnalysisSession::new(client, config.ingestor()).with_tick(config.progress_tick());

    session
        .select_file(&file)
        .await
        .with_context(|| format!("Could not load {}", file.display()))?;

    let mut progress = session.subscribe_progress();
    eprintln!("{}", PROGRESS_CAPTIONS[0]);
    let printer = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let idx = *progress.borrow_and_update();
            eprintln!("{}", PROGRESS_CAPTIONS[idx % PROGRESS_CAPTIONS.len()]);
        }
    });

    let outcome = tokio::select! {
        outcome = session.start_analysis() => outcome,
        _ = tokio::signal::ctrl_c() => {
            session.reset();
            printer.abort();
            bail!("Interrupted");
        }
    };
    printer.abort();

    let snapshot = session.snapshot();
    match (outcome, snapshot.status) {
        (StartOutcome::Settled(_), SessionStatus::Succeeded) => {
            let Some(result) = snapshot.result else {
                bail!("Analysis finished without a result");
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                render(&result);
            }
            if share || copy {
                emit_share(&result, copy);
            }
            Ok(())
        }
        (StartOutcome::Settled(_), SessionStatus::Failed) => {
            bail!(snapshot.error_message.unwrap_or_default())
        }
        (other, status) => bail!("Analysis did not run ({other:?}, session {status:?})"),
    }
}

fn render(result: &AnalysisResult) {
    println!("Verdict: {}", result.verdict.safety_rating);
    println!("  {}", result.verdict.risk_level);
    println!();
    println!("Ingredients: {}", result.ingredients.identified.join(", "));
    println!("  \"{}\"", result.ingredients.visual_evidence);
    println!();
    println!("Claim: {}", result.claim);
    println!();
    println!("Traditional knowledge:\n  {}", result.reality_check.traditional_perspective);
    println!("Modern clinical science:\n  {}", result.reality_check.modern_scientific_view);
    println!("The gap:\n  {}", result.reality_check.the_gap);

    if let Some(sources) = &result.grounding_sources {
        println!();
        println!("Sources:");
        for source in sources {
            println!("  - {} <{}>", source.title, source.uri);
        }
    }

    println!();
    println!("English: {}", result.multilingual_summary.english);
    println!("Local:   {}", result.multilingual_summary.local);
    println!();
    println!("{DISCLAIMER}");
}

fn emit_share(result: &AnalysisResult, copy: bool) {
    let text = share_text(result);
    println!();
    println!("{text}");
    if copy {
        match copy_to_clipboard(&text) {
            CopyOutcome::Clipboard => eprintln!("Summary copied to clipboard."),
            CopyOutcome::Terminal => {
                eprintln!("Summary sent to the terminal clipboard (OSC 52).")
            }
            CopyOutcome::Unavailable => {
                eprintln!("No clipboard available; summary not copied.")
            }
        }
    }
}
