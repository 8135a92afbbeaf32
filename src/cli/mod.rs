use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};

use crate::application::{AppError, Extraction, ReceiptService, ServiceConfig};
use crate::domain::{ReceiptEntry, TotalPolicy, format_cents, parse_cents};
use crate::ocr::{DEFAULT_LANGUAGE, TesseractCli};
use crate::storage::{DEFAULT_STORAGE_KEY, SqliteStore};

type Service = ReceiptService<SqliteStore>;

/// Impensa - Receipt Expense Ledger
#[derive(Parser)]
#[command(name = "impensa")]
#[command(about = "Read totals from receipt text and keep a month-by-month spending ledger")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "IMPENSA_DB", default_value = "impensa.db")]
    pub database: String,

    /// How the receipt total is chosen: keyword, sum
    #[arg(short, long, env = "IMPENSA_POLICY", default_value = "keyword", global = true)]
    pub policy: String,

    /// Storage key the ledger is kept under
    #[arg(long, env = "IMPENSA_STORAGE_KEY", default_value = DEFAULT_STORAGE_KEY, global = true)]
    pub storage_key: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Recognize the text of a receipt image
    Scan {
        /// Image file (PNG, JPEG, TIFF, ...)
        image: PathBuf,

        /// OCR language code
        #[arg(short, long, env = "IMPENSA_OCR_LANG", default_value = DEFAULT_LANGUAGE)]
        lang: String,

        /// Path to the tesseract executable
        #[arg(long, env = "IMPENSA_TESSERACT")]
        tesseract: Option<PathBuf>,

        /// Record the recognized text right away
        #[arg(long)]
        save: bool,
    },

    /// Record a receipt from its text
    Record {
        /// Receipt text (reads --file or stdin if omitted)
        #[arg(short, long)]
        text: Option<String>,

        /// File holding the receipt text
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Receipt date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Enter the total by hand instead of extracting it (e.g. "12,50")
        #[arg(long)]
        total: Option<String>,
    },

    /// Show the prices and the total found in a text, without saving
    Preview {
        /// Receipt text (reads --file or stdin if omitted)
        #[arg(short, long)]
        text: Option<String>,

        /// File holding the receipt text
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// List months with their totals, most recent first
    Months {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show the receipts of one month
    Month {
        /// Month (YYYY-MM)
        month: String,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Export the ledger
    Export {
        /// What to export: ledger (JSON), entries (CSV)
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Cli {
    fn config(&self) -> Result<ServiceConfig> {
        let policy = TotalPolicy::from_str(&self.policy).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid policy '{}'. Valid policies: keyword, sum",
                self.policy
            )
        })?;
        Ok(ServiceConfig {
            policy,
            storage_key: self.storage_key.clone(),
        })
    }

    pub async fn run(self) -> Result<()> {
        let config = self.config()?;

        match self.command {
            Commands::Init => {
                ReceiptService::init(&self.database, config).await?;
                println!("Database initialized: {}", self.database);
            }
            command => {
                let mut service = ReceiptService::connect(&self.database, config)
                    .await
                    .with_context(|| {
                        format!(
                            "Cannot open database '{}'. Run 'impensa init' first",
                            self.database
                        )
                    })?;
                run_command(&mut service, command).await?;
            }
        }

        Ok(())
    }
}

async fn run_command(service: &mut Service, command: Commands) -> Result<()> {
    match command {
        Commands::Init => {}

        Commands::Scan {
            image,
            lang,
            tesseract,
            save,
        } => {
            run_scan_command(service, &image, lang, tesseract, save).await?;
        }

        Commands::Record {
            text,
            file,
            date,
            total,
        } => {
            let text = read_text(text, file.as_deref())?;
            let now = match date {
                Some(date_str) => parse_date(&date_str).with_context(|| {
                    format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)
                })?,
                None => Local::now().naive_local(),
            };

            let entry = match total {
                Some(total) => {
                    let cents = parse_cents(&total)
                        .context("Invalid amount format. Use '12.50' or '12,50'")?;
                    service.record_with_total(&text, cents, now).await?
                }
                None => service.record_receipt(&text, now).await?,
            };

            println!(
                "Recorded receipt: {} EUR on {}",
                format_cents(entry.total()),
                entry.date.format("%Y-%m-%d")
            );
        }

        Commands::Preview { text, file, format } => {
            let text = read_text(text, file.as_deref())?;
            print_extraction(&service.preview(&text), &format)?;
        }

        Commands::Months { format } => {
            run_months_command(service, &format)?;
        }

        Commands::Month { month, format } => {
            run_month_command(service, &month, &format)?;
        }

        Commands::Export {
            export_type,
            output,
        } => {
            run_export_command(service, &export_type, output.as_deref())?;
        }
    }

    Ok(())
}

async fn run_scan_command(
    service: &mut Service,
    image: &Path,
    lang: String,
    tesseract: Option<PathBuf>,
    save: bool,
) -> Result<()> {
    let mut engine = TesseractCli::new(lang);
    if let Some(binary) = tesseract {
        engine = engine.with_binary(binary);
    }

    let text = service.scan_image(&engine, image).await?;
    println!("{}", text);

    if save {
        let entry = save_scanned_text(service, &text, Local::now().naive_local()).await?;
        eprintln!(
            "Recorded receipt: {} EUR on {}",
            format_cents(entry.total()),
            entry.date.format("%Y-%m-%d")
        );
    }
    Ok(())
}

/// Record recognized text. When no amount can be taken from it the error
/// carries a hint, so the command still fails after the text was printed.
async fn save_scanned_text(
    service: &mut Service,
    text: &str,
    now: NaiveDateTime,
) -> Result<ReceiptEntry> {
    let policy = service.policy();
    match service.record_receipt(text, now).await {
        Ok(entry) => Ok(entry),
        Err(err @ (AppError::EmptyInput | AppError::NoTotalFound | AppError::NoPricesFound)) => {
            Err(anyhow::Error::new(err).context(format!(
                "Nothing recorded (policy: {}). Fix the text and record it with 'impensa record', or pass --total.",
                policy.as_str()
            )))
        }
        Err(err) => Err(err.into()),
    }
}

fn run_months_command(service: &Service, format: &str) -> Result<()> {
    let months = service.month_overview();

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&months)?);
        }
        _ => {
            if months.is_empty() {
                println!("No receipts recorded.");
                return Ok(());
            }
            println!("{:<10} {:>8} {:>12}", "MONTH", "RECEIPTS", "TOTAL");
            println!("{}", "-".repeat(32));
            for summary in months {
                println!(
                    "{:<10} {:>8} {:>12}",
                    summary.month,
                    summary.entry_count,
                    format_cents(summary.total)
                );
            }
        }
    }
    Ok(())
}

fn run_month_command(service: &Service, month: &str, format: &str) -> Result<()> {
    let detail = service.month_details(month)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
        _ => {
            println!("Receipts for {}", detail.month);
            println!();
            println!("{:<10} {:>10}  {}", "DATE", "TOTAL", "TEXT");
            println!("{}", "-".repeat(64));
            for entry in &detail.entries {
                println!(
                    "{:<10} {:>10}  {}",
                    entry.date.format("%Y-%m-%d"),
                    format_cents(entry.total),
                    truncate(&entry.text, 40)
                );
            }
            println!("{}", "-".repeat(64));
            println!("{:<10} {:>10}", "TOTAL", format_cents(detail.total));
        }
    }
    Ok(())
}

fn print_extraction(extraction: &Extraction, format: &str) -> Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(extraction)?);
        }
        _ => {
            let prices: Vec<String> = extraction.prices.iter().map(|c| format_cents(*c)).collect();
            println!("Policy: {}", extraction.policy.as_str());
            if prices.is_empty() {
                println!("Prices: none");
            } else {
                println!("Prices: {}", prices.join(", "));
            }
            match (&extraction.amount, &extraction.error) {
                (Some(amount), _) => println!("Total:  {}", format_cents(amount.total())),
                (None, Some(error)) => println!("Total:  - ({})", error),
                (None, None) => println!("Total:  -"),
            }
        }
    }
    Ok(())
}

fn run_export_command(service: &Service, export_type: &str, output: Option<&str>) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "ledger" => {
            let ledger = exporter.export_ledger_json(writer)?;
            if output.is_some() {
                eprintln!("Exported ledger: {} receipts", ledger.entry_count());
            }
        }
        "entries" => {
            let count = exporter.export_entries_csv(writer)?;
            if output.is_some() {
                eprintln!("Exported {} receipts", count);
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: ledger, entries",
                export_type
            );
        }
    }

    Ok(())
}

/// Receipt text from --text, --file, or stdin, in that order.
fn read_text(text: Option<String>, file: Option<&Path>) -> Result<String> {
    use std::io::Read;

    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read receipt text from {}", path.display()));
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read receipt text from stdin")?;
    Ok(buffer)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .context("Date must be in YYYY-MM-DD format")?;
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid date"))
}
