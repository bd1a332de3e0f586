//! Pulseboard CLI - normalize weekly metrics CSV reports
//!
//! # Commands
//!
//! ```bash
//! pulseboard serve                     # Start HTTP server (port 3000)
//! pulseboard normalize weekly.csv      # CSV to category tree JSON
//! pulseboard classify weekly.csv       # Show detected period columns
//! pulseboard template -o example.csv   # Write an example CSV
//! ```

use clap::{Parser, Subcommand};
use pulseboard::transform::{compact_label, ColumnMap};
use pulseboard::{
    classify, dashboard::template_csv, group_periods, normalize_bytes, parse_bytes_auto, Config,
    NormalizeOptions, TextSource,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pulseboard")]
#[command(about = "Normalize weekly metrics CSV reports for the dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and output the category tree as JSON
    Normalize {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for synthesized trend points (default: PULSEBOARD_SEED or random)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show period columns, group size and period groups
    Classify {
        /// Input CSV file
        input: PathBuf,
    },

    /// Write an example CSV in the expected layout
    Template {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: PULSEBOARD_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// File path or URL loaded at startup and on reload (default: PULSEBOARD_SOURCE)
        #[arg(short, long)]
        source: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env();

    let result = match cli.command {
        Commands::Normalize { input, output, seed } => {
            let options = NormalizeOptions {
                seed: seed.or(config.seed),
                ..NormalizeOptions::default()
            };
            cmd_normalize(&input, output.as_deref(), &options, &mut io::stdout().lock())
        }

        Commands::Classify { input } => cmd_classify(&input),

        Commands::Template { output } => {
            cmd_template(output.as_deref(), &mut io::stdout().lock())
        }

        Commands::Serve { port, source } => {
            let mut config = config;
            if let Some(port) = port {
                config = config.with_port(port);
            }
            if let Some(source) = source {
                config = config.with_source(TextSource::parse(&source));
            }
            cmd_serve(config).await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_normalize(
    input: &Path,
    output: Option<&Path>,
    options: &NormalizeOptions,
    stdout: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let bytes = fs::read(input)?;
    let result = normalize_bytes(&bytes, options)?;

    eprintln!("   Encoding: {}", result.csv_info.encoding);
    eprintln!("   Rows: {}", result.csv_info.row_count);
    eprintln!("   Period columns: {}", result.classification.period_columns.join(", "));

    let stats = &result.stats;
    eprintln!("\n📊 {} metrics in {} categories", stats.metric_count, stats.category_count);
    if stats.rows_without_l1 > 0 {
        eprintln!("   ⚠️  {} rows without an L1 label", stats.rows_without_l1);
    }
    if stats.rows_without_name > 0 {
        eprintln!("   ⚠️  {} rows without a name", stats.rows_without_name);
    }

    let json = serde_json::to_string_pretty(&result.categories)?;
    write_output(&json, output, stdout)?;

    Ok(())
}

fn cmd_classify(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(input)?;
    let parsed = parse_bytes_auto(&bytes)?;

    let classification = classify(&parsed.headers);
    let groups = group_periods(&classification.period_columns);

    println!("Identity columns: {}", classification.identity_columns.join(", "));
    println!("Period columns ({}):", classification.period_columns.len());
    for column in &classification.period_columns {
        println!("  {:<20} {}", column, compact_label(column));
    }
    println!("\nGroup size: {}", groups.group_size);
    for (i, group) in groups.groups.iter().enumerate() {
        let labels: Vec<String> = group.iter().map(|c| compact_label(c)).collect();
        println!("  Group {}: {}", i + 1, labels.join(" | "));
    }

    Ok(())
}

fn cmd_template(
    output: Option<&Path>,
    stdout: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let csv = template_csv(&ColumnMap::default())?;
    write_output(csv.trim_end(), output, stdout)
}

async fn cmd_serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    pulseboard::server::start_server(config).await?;
    Ok(())
}

/// Write command output to `path`, or to `stdout` when no path is given.
fn write_output(
    content: &str,
    path: Option<&Path>,
    stdout: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            writeln!(stdout, "{}", content)?;
        }
    }
    Ok(())
}
