//! Shop2Medusa CLI - Convert Shopify product exports to MedusaJS imports
//!
//! # Main Command
//!
//! ```bash
//! shop2medusa convert products_export.csv --currency EUR -o medusa-import.csv
//! shop2medusa convert products_export.csv --currency usd --markdown --sales-channel
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! shop2medusa parse products_export.csv   # Just decode the export to JSON
//! shop2medusa columns                     # Show the fixed Medusa columns
//! ```
//!
//! The currency may also come from `SHOP2MEDUSA_CURRENCY` (a `.env` file
//! is read when present).

use clap::{Parser, Subcommand};
use shop2medusa::models::medusa;
use shop2medusa::{convert_bytes_async, logs, parse_csv_file_auto, ConversionOptions};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "shop2medusa")]
#[command(about = "Convert Shopify product CSV exports to MedusaJS import CSV", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full conversion: Shopify CSV → Medusa CSV
    Convert {
        /// Shopify product export
        input: PathBuf,

        /// Target currency code (e.g. EUR)
        #[arg(short, long, env = "SHOP2MEDUSA_CURRENCY")]
        currency: String,

        /// Convert HTML descriptions to Markdown
        #[arg(long)]
        markdown: bool,

        /// Add products to a sales channel (default: "default")
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        sales_channel: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the summary as JSON on stderr
        #[arg(long)]
        summary_json: bool,

        /// Don't print progress logs
        #[arg(short, long)]
        quiet: bool,
    },

    /// Decode a CSV file and output its records as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the fixed Medusa import columns
    Columns,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            currency,
            markdown,
            sales_channel,
            output,
            summary_json,
            quiet,
        } => {
            let options = ConversionOptions::new(currency)
                .with_markdown(markdown)
                .with_sales_channel(sales_channel);
            cmd_convert(&input, options, output.as_deref(), summary_json, quiet).await
        }

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Columns => cmd_columns(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_convert(
    input: &Path,
    options: ConversionOptions,
    output: Option<&Path>,
    summary_json: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if quiet {
        logs::LOG_BROADCASTER.set_echo(false);
    } else {
        eprintln!("📄 Processing: {}", input.display());
    }

    let bytes = fs::read(input)?;
    let result = convert_bytes_async(&bytes, options).await?;

    write_output(&result.csv, output)?;

    if summary_json {
        eprintln!("{}", serde_json::to_string(&result.summary)?);
    } else {
        eprintln!(
            "✨ Successfully processed {} products and {} variants.",
            result.summary.products, result.summary.variants
        );
    }
    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = parse_csv_file_auto(input)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(result.delimiter));
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("✅ Parsed {} records", result.records.len());

    let json = serde_json::to_string_pretty(&result.records)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_columns() -> Result<(), Box<dyn std::error::Error>> {
    for column in medusa::FIXED_COLUMNS {
        println!("{}", column);
    }
    println!("{}", medusa::price_column("<CODE>"));
    println!("{}", medusa::tag_column(1));
    println!("{}", medusa::image_column(1));
    Ok(())
}

fn format_delimiter(d: u8) -> String {
    match d {
        b'\t' => "\\t".to_string(),
        c => (c as char).to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
