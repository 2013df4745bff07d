use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use credcheck_engine::Verifier;
use credcheck_extract::{Extractor, RemoteExtractor, TextExtractor};
use credcheck_store::{
    ClientMeta, DuckStore, MemoryStore, NewCertificate, NewInstitution, Store,
};

mod display;
mod seed;

#[derive(Parser)]
#[command(
    name = "credcheck",
    version,
    about = "Academic credential verification against an issued-certificate registry"
)]
struct Cli {
    /// DuckDB database path; omit for an ephemeral in-memory store.
    #[arg(long, env = "CREDCHECK_DB", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify a credential document and print the verdict.
    Verify {
        /// Document to check (.txt locally; other formats need --extractor-url).
        file: PathBuf,
        /// Base URL of a remote document-to-text extraction service.
        #[arg(long, env = "CREDCHECK_EXTRACTOR_URL")]
        extractor_url: Option<String>,
        /// Print the full report as JSON instead of the card view.
        #[arg(long)]
        json: bool,
    },
    /// Load the demonstration registry (institutions and certificates).
    Seed,
    /// Register an institution.
    AddInstitution {
        #[arg(long)]
        name: String,
        #[arg(long)]
        code: String,
        /// University, College, Institute, Polytechnic.
        #[arg(long, default_value = "University")]
        kind: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        established_year: Option<i32>,
    },
    /// Register an issued certificate.
    AddCertificate {
        #[arg(long)]
        certificate_number: String,
        #[arg(long)]
        student_name: String,
        #[arg(long)]
        roll_number: Option<String>,
        #[arg(long)]
        course_name: String,
        #[arg(long, default_value = "Bachelor")]
        degree_type: String,
        #[arg(long)]
        passing_year: i32,
        #[arg(long)]
        grade: Option<String>,
        #[arg(long)]
        percentage: Option<f64>,
        /// ISO 8601 date, e.g. 2023-06-15.
        #[arg(long)]
        issue_date: Option<String>,
        #[arg(long)]
        institution_id: i64,
    },
    /// List registered institutions.
    Institutions,
    /// List issued certificates.
    Certificates,
    /// Show recent verification logs.
    Logs {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Show one verification log with its suspicious activity.
    Log { id: i64 },
    /// Show suspicious activities awaiting investigation.
    Activities {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Aggregate verification statistics.
    Stats {
        #[arg(long)]
        json: bool,
    },
}

fn open_store(db: Option<&PathBuf>) -> anyhow::Result<Arc<dyn Store>> {
    match db {
        Some(path) => {
            tracing::info!(path = %path.display(), "opening DuckDB store");
            Ok(Arc::new(DuckStore::open_persistent(path)?))
        }
        None => {
            tracing::warn!("no --db given; using an in-memory store that forgets on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("credcheck v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let store = open_store(cli.db.as_ref())?;

    match cli.command {
        Command::Verify {
            file,
            extractor_url,
            json,
        } => {
            let extractor: Box<dyn Extractor> = match extractor_url {
                Some(url) => Box::new(RemoteExtractor::new(url)),
                None => Box::new(TextExtractor),
            };
            let client = ClientMeta {
                ip_address: None,
                user_agent: Some(format!("credcheck-cli/{}", env!("CARGO_PKG_VERSION"))),
            };
            let verifier = Verifier::new(store);
            let report = verifier.verify_file(extractor.as_ref(), &file, &client).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                display::report_card(&report);
            }
        }
        Command::Seed => {
            let (institutions, certificates) = seed::load(store.as_ref())?;
            println!("Seeded {institutions} institutions and {certificates} certificates");
        }
        Command::AddInstitution {
            name,
            code,
            kind,
            address,
            established_year,
        } => {
            let id = store.add_institution(NewInstitution {
                name,
                code,
                kind,
                address,
                contact_email: None,
                phone: None,
                established_year,
            })?;
            println!("Institution registered with id {id}");
        }
        Command::AddCertificate {
            certificate_number,
            student_name,
            roll_number,
            course_name,
            degree_type,
            passing_year,
            grade,
            percentage,
            issue_date,
            institution_id,
        } => {
            let id = store.add_certificate(NewCertificate {
                certificate_number,
                student_name,
                roll_number,
                course_name,
                degree_type,
                passing_year,
                grade,
                percentage,
                issue_date,
                institution_id,
            })?;
            println!("Certificate registered with id {id}");
        }
        Command::Institutions => display::institutions_table(&store.institutions()?),
        Command::Certificates => display::certificates_table(&store.certificates()?),
        Command::Logs { limit } => display::logs_table(&store.recent_logs(limit)?),
        Command::Log { id } => {
            let log = store.log(id)?;
            let activities = store.activities_for(id)?;
            display::log_card(&log, &activities);
        }
        Command::Activities { limit } => {
            display::activities_table(&store.pending_activities(limit)?);
        }
        Command::Stats { json } => {
            let stats = store.stats()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                display::stats_card(&stats);
            }
        }
    }

    Ok(())
}
