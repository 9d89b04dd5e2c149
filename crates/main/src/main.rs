use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use bill_receipt::config::ReceiptConfig;
use bill_receipt::print::HtmlFileSurfaceProvider;
use bill_receipt::{demo, print_fragment, BillData, PrintOutcome, ReceiptBuilder};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Renders bill receipts and print pages from the command line.
///
/// A JSON config can be passed with `--config` or through the
/// `BILL_RECEIPT_CONFIG` environment variable; defaults are used otherwise.
#[derive(Parser)]
#[command(author, version, about = "Receipt generator for point-of-sale checkouts")]
struct Cli {
    /// Path of a JSON receipt config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a bill stored as JSON into a PDF receipt.
    Render {
        /// Path of the bill JSON file.
        bill: PathBuf,
        /// Directory the PDF is written to.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Wrap an HTML fragment into a print page and send it to the file spooler.
    Print {
        /// Path of the HTML fragment.
        fragment: PathBuf,
        /// Spool directory for print pages.
        #[arg(long, default_value = "target/print-spool")]
        out_dir: PathBuf,
    },

    /// Render a sample bill built from the demo menu.
    #[command(aliases = ["sample"])]
    Demo {
        /// Number of line items on the sample bill.
        #[arg(long, default_value_t = 6)]
        items: usize,
        /// Directory the PDF is written to.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = ReceiptConfig::load(cli.config.as_deref())
        .map_err(Box::<dyn Error>::from)
        .and_then(|config| match cli.command {
            Commands::Render { bill, out_dir } => render(&config, &bill, &out_dir),
            Commands::Print { fragment, out_dir } => print(&config, &fragment, &out_dir),
            Commands::Demo { items, out_dir } => run_demo(&config, items, &out_dir),
        });

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn builder(config: &ReceiptConfig) -> ReceiptBuilder {
    ReceiptBuilder::new()
        .with_branding(config.branding.clone())
        .with_options(config.render.clone())
}

fn render(config: &ReceiptConfig, bill_path: &Path, out_dir: &Path) -> Result<(), Box<dyn Error>> {
    let raw = fs::read_to_string(bill_path)?;
    let bill: BillData = serde_json::from_str(&raw)?;
    write_bill(config, &bill, out_dir)
}

fn run_demo(config: &ReceiptConfig, items: usize, out_dir: &Path) -> Result<(), Box<dyn Error>> {
    let bill = demo::sample_bill(items, chrono::Local::now().fixed_offset());
    write_bill(config, &bill, out_dir)
}

fn write_bill(
    config: &ReceiptConfig,
    bill: &BillData,
    out_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    let document = builder(config).render(bill)?;
    let path = document.save_to_dir(out_dir)?;
    println!(
        "Generated {} ({} bytes, {} page(s))",
        path.display(),
        document.bytes.len(),
        document.page_count
    );
    Ok(())
}

fn print(config: &ReceiptConfig, fragment: &Path, out_dir: &Path) -> Result<(), Box<dyn Error>> {
    let markup = fs::read_to_string(fragment)?;
    let mut provider = HtmlFileSurfaceProvider::new(out_dir, "bill");
    match print_fragment(&mut provider, &markup, &config.print)? {
        PrintOutcome::Printed => println!("Print page spooled under {}", out_dir.display()),
        PrintOutcome::SurfaceUnavailable => {
            println!("No print surface available under {}", out_dir.display())
        }
        PrintOutcome::TargetMissing => println!("Nothing to print"),
    }
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
