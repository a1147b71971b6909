use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use payledger::application::ledger::PaymentLedger;
use payledger::domain::evidence::EvidenceMediaType;
use payledger::domain::payment::{PaymentFilter, PaymentId, PaymentInput, PaymentPatch};
use payledger::domain::ports::{EvidenceStoreBox, PaymentStoreBox};
use payledger::infrastructure::fs::{DEFAULT_EVIDENCE_DIR, FsEvidenceStore};
use payledger::infrastructure::in_memory::InMemoryPaymentStore;
use payledger::interfaces::csv::payment_reader::PaymentReader;
use payledger::interfaces::csv::payment_writer::PaymentWriter;
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Directory where evidence files are stored.
    #[arg(long, global = true, default_value = DEFAULT_EVIDENCE_DIR)]
    evidence_dir: PathBuf,

    /// Restrict payment statuses to this set (repeatable).
    #[arg(long = "allowed-status", global = true)]
    allowed_statuses: Vec<String>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create payments from a CSV file, then print the matching listing.
    Import {
        input: PathBuf,
        #[command(flatten)]
        listing: ListingArgs,
    },
    /// Create one payment from a JSON file.
    Create { input: PathBuf },
    /// List payments as CSV.
    List {
        #[command(flatten)]
        listing: ListingArgs,
    },
    /// Print one payment as JSON.
    Get { id: PaymentId },
    /// Update the due date, due amount or status of a payment.
    Update {
        id: PaymentId,
        #[arg(long)]
        due_date: Option<NaiveDate>,
        #[arg(long)]
        due_amount: Option<Decimal>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a payment.
    Delete { id: PaymentId },
    /// Upload an evidence file (PDF, PNG or JPEG) for a payment.
    AttachEvidence {
        id: PaymentId,
        file: PathBuf,
        /// Declared content type; guessed from the file extension when omitted.
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Retrieve the evidence file of a payment.
    FetchEvidence {
        id: PaymentId,
        /// Write the evidence here instead of printing its stored path.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ListingArgs {
    /// Exact payment status to match.
    #[arg(long)]
    status: Option<String>,
    /// Case-insensitive match on first or last name.
    #[arg(long)]
    search: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: usize,
    #[arg(long, default_value_t = 10)]
    page_size: usize,
}

impl ListingArgs {
    fn filter(&self) -> PaymentFilter {
        PaymentFilter::new(self.status.clone(), self.search.clone())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(io::stderr)
        .init();

    let payments = open_payment_store(cli.db_path.as_deref())?;
    let evidence: EvidenceStoreBox = Box::new(FsEvidenceStore::new(&cli.evidence_dir));
    let ledger = PaymentLedger::new(payments, evidence).with_allowed_statuses(cli.allowed_statuses);

    match cli.command {
        Command::Import { input, listing } => {
            let file = File::open(input).into_diagnostic()?;
            let reader = PaymentReader::new(file);
            let mut created = 0usize;
            for row in reader.payments() {
                match row {
                    Ok(payment) => match ledger.create(payment).await {
                        Ok(_) => created += 1,
                        Err(e) => error!("Error creating payment: {}", e),
                    },
                    Err(e) => error!("Error reading payment: {}", e),
                }
            }
            info!(created, "Import finished");
            print_listing(&ledger, &listing).await?;
        }
        Command::Create { input } => {
            let file = File::open(input).into_diagnostic()?;
            let payment: PaymentInput = serde_json::from_reader(file).into_diagnostic()?;
            let created = ledger.create(payment).await.into_diagnostic()?;
            println!("{}", created.id);
        }
        Command::List { listing } => print_listing(&ledger, &listing).await?,
        Command::Get { id } => {
            let payment = ledger.get(&id).await.into_diagnostic()?;
            let json = serde_json::to_string_pretty(&payment).into_diagnostic()?;
            println!("{json}");
        }
        Command::Update {
            id,
            due_date,
            due_amount,
            status,
        } => {
            let patch = PaymentPatch {
                payee_due_date: due_date,
                due_amount,
                payee_payment_status: status,
            };
            ledger.update(&id, patch).await.into_diagnostic()?;
            println!("Payment updated");
        }
        Command::Delete { id } => {
            ledger.delete(&id).await.into_diagnostic()?;
            println!("Payment deleted");
        }
        Command::AttachEvidence {
            id,
            file,
            content_type,
        } => {
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let content_type = content_type
                .unwrap_or_else(|| EvidenceMediaType::guess_content_type(&file_name).to_string());
            let bytes = tokio::fs::read(&file).await.into_diagnostic()?;
            let path = ledger
                .attach_evidence(&id, &file_name, &bytes, &content_type)
                .await
                .into_diagnostic()?;
            println!("{path}");
        }
        Command::FetchEvidence { id, output } => {
            let evidence = ledger.fetch_evidence(&id).await.into_diagnostic()?;
            match output {
                Some(target) => {
                    tokio::fs::write(&target, &evidence.bytes)
                        .await
                        .into_diagnostic()?;
                    println!("{}", target.display());
                }
                None => println!("{}", evidence.path),
            }
        }
    }

    Ok(())
}

async fn print_listing(ledger: &PaymentLedger, listing: &ListingArgs) -> Result<()> {
    let page = ledger
        .list(&listing.filter(), listing.page, listing.page_size)
        .await
        .into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = PaymentWriter::new(stdout.lock());
    writer.write_payments(&page.data).into_diagnostic()?;
    eprintln!("total={}", page.total);
    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_payment_store(db_path: Option<&Path>) -> Result<PaymentStoreBox> {
    use payledger::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => Ok(Box::new(RocksDBStore::open(path).into_diagnostic()?)),
        None => Ok(Box::new(InMemoryPaymentStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_payment_store(db_path: Option<&Path>) -> Result<PaymentStoreBox> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(Box::new(InMemoryPaymentStore::new()))
}
