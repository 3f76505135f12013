//! CLI tool for converting HTML slide presentations to PowerPoint files.

mod convert;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use convert::{default_output_path, Converter};
use deck_core::RenderConfig;
use deck_pptx::{DeckInspector, InspectedDeck};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Convert HTML slide decks into PowerPoint presentations.
#[derive(Parser, Debug)]
#[command(name = "html2pptx")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an HTML file into a .pptx presentation
    Convert {
        /// Input HTML file
        input: PathBuf,

        /// Output file (default: input with a .pptx extension)
        output: Option<PathBuf>,

        /// JSON file overriding style and layout settings
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the extracted slide content as JSON
    Extract {
        /// Input HTML file
        input: PathBuf,
    },

    /// Summarize the slides and text boxes of a .pptx file
    Inspect {
        /// Presentation to read
        deck: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Convert {
            input,
            output,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let output = output.unwrap_or_else(|| default_output_path(&input));

            let report = Converter::new(&config).convert_file(&input, &output)?;
            log::info!("Wrote {} slides", report.slide_count);
            println!("Presentation created: {}", report.output.display());
        }
        Command::Extract { input } => {
            let slides = Converter::default().extract_file(&input)?;
            let json = serde_json::to_string_pretty(&slides)
                .context("Failed to serialize slide content")?;
            println!("{}", json);
        }
        Command::Inspect { deck, json } => {
            let inspected = DeckInspector::new()
                .open(&deck)
                .with_context(|| format!("Failed to inspect {}", deck.display()))?;

            if json {
                let out = serde_json::to_string_pretty(&inspected)
                    .context("Failed to serialize deck summary")?;
                println!("{}", out);
            } else {
                print!("{}", format_summary(&inspected));
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RenderConfig> {
    let Some(path) = path else {
        return Ok(RenderConfig::default());
    };

    let config = RenderConfig::load_from_path(path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Plain-text listing of every slide and its text boxes.
fn format_summary(deck: &InspectedDeck) -> String {
    let mut out = format!(
        "Slide size: {} x {}\nSlides: {}\n",
        deck.slide_width,
        deck.slide_height,
        deck.slides.len()
    );

    for slide in &deck.slides {
        out.push_str(&format!("\nSlide {}\n", slide.number));
        for shape in &slide.shapes {
            out.push_str(&format!(
                "  [{}, {}] {} x {}\n",
                shape.x, shape.y, shape.width, shape.height
            ));
            for paragraph in &shape.paragraphs {
                out.push_str(&format!("    {}\n", paragraph));
            }
        }
    }

    out
}
