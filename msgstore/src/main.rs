mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use msgstore_core::Store;
use output::{GetOutput, IdInfo, LsOutput, OutputWriter, PathOutput, PutOutput, RmOutput};
use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// msgstore - Records stored one file per identifier
#[derive(Parser)]
#[command(name = "msgstore")]
#[command(about = "Inspect and edit a msgstore directory", long_about = None)]
#[command(version)]
struct Cli {
    /// Store directory (defaults to MSGSTORE_ROOT env var or ./msgstore)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Exit code for a missing record.
const EXIT_NOT_FOUND: u8 = 1;

/// Exit code for every other failure.
const EXIT_FAILURE: u8 = 2;

/// A record that does not exist, reported with its own exit code.
#[derive(Debug)]
struct RecordNotFound(String);

impl fmt::Display for RecordNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record not found: {}", self.0)
    }
}

impl std::error::Error for RecordNotFound {}

#[derive(Subcommand)]
enum Commands {
    /// Store a JSON document under an identifier
    Put {
        /// Record identifier
        id: String,

        /// File to read the document from (stdin if omitted)
        file: Option<PathBuf>,
    },

    /// Print the record stored under an identifier
    Get {
        /// Record identifier
        id: String,
    },

    /// List identifiers in the store
    Ls {
        /// Show the backing file name of each record
        #[arg(short, long)]
        long: bool,
    },

    /// Remove a record
    Rm {
        /// Record identifier
        id: String,
    },

    /// Print the file backing an identifier
    Path {
        /// Record identifier
        id: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Determine store root: CLI arg > MSGSTORE_ROOT env var > ./msgstore default
    let root = cli
        .root
        .or_else(|| std::env::var("MSGSTORE_ROOT").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("./msgstore"));

    let out = OutputWriter::new(cli.json);

    let result = match cli.command {
        Commands::Put { id, file } => cmd_put(&out, &root, &id, file.as_deref()),
        Commands::Get { id } => cmd_get(&out, &root, &id),
        Commands::Ls { long } => cmd_ls(&out, &root, long),
        Commands::Rm { id } => cmd_rm(&out, &root, &id),
        Commands::Path { id } => cmd_path(&out, &root, &id),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = if e.downcast_ref::<RecordNotFound>().is_some() {
                EXIT_NOT_FOUND
            } else {
                EXIT_FAILURE
            };
            out.write_error(&e, code);
            ExitCode::from(code)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn open_store(root: &Path) -> Result<Store> {
    Store::open(root).with_context(|| format!("Failed to open store at {}", root.display()))
}

/// Open a store that must already exist, so a mistyped root is not created.
fn open_existing_store(root: &Path) -> Result<Store> {
    if !root.is_dir() {
        anyhow::bail!("No store at {}", root.display());
    }
    open_store(root)
}

fn cmd_put(out: &OutputWriter, root: &Path, id: &str, file: Option<&Path>) -> Result<()> {
    let store = open_store(root)?;

    let input = match file {
        Some(path) => {
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let record: serde_json::Value =
        serde_json::from_slice(&input).context("Input is not a JSON document")?;

    store
        .put(id, &record)
        .with_context(|| format!("Failed to store record: {}", id))?;

    let path = store.path_for(id);
    out.write(
        &PutOutput {
            success: true,
            result_code: 0,
            id: id.to_string(),
            path: path.display().to_string(),
        },
        || format!("Stored {}\n", id),
    )
}

fn cmd_get(out: &OutputWriter, root: &Path, id: &str) -> Result<()> {
    let store = open_existing_store(root)?;

    let record: serde_json::Value = store
        .get(id)
        .with_context(|| format!("Failed to read record: {}", id))?
        .ok_or_else(|| RecordNotFound(id.to_string()))?;
    let text = serde_json::to_string_pretty(&record)?;

    out.write(
        &GetOutput {
            success: true,
            result_code: 0,
            id: id.to_string(),
            record,
        },
        || format!("{}\n", text),
    )
}

fn cmd_ls(out: &OutputWriter, root: &Path, long: bool) -> Result<()> {
    let store = open_existing_store(root)?;

    let mut report = store
        .list_ids_report()
        .context("Failed to list identifiers")?;
    report.ids.sort();

    let ids: Vec<IdInfo> = report
        .ids
        .iter()
        .map(|id| IdInfo {
            id: id.clone(),
            file_name: long.then(|| {
                store
                    .path_for(id)
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default()
            }),
        })
        .collect();

    if report.skipped > 0 {
        tracing::warn!(
            skipped = report.skipped,
            "ignored record files with malformed names"
        );
    }

    out.write(
        &LsOutput {
            success: true,
            result_code: 0,
            ids: ids.clone(),
            skipped: report.skipped,
        },
        || {
            let mut text = String::new();
            if ids.is_empty() {
                text.push_str("No records\n");
            }
            for info in &ids {
                match &info.file_name {
                    Some(name) => text.push_str(&format!("{}\t{}\n", info.id, name)),
                    None => text.push_str(&format!("{}\n", info.id)),
                }
            }
            if report.skipped > 0 {
                text.push_str(&format!("({} malformed entries skipped)\n", report.skipped));
            }
            text
        },
    )
}

fn cmd_rm(out: &OutputWriter, root: &Path, id: &str) -> Result<()> {
    let store = open_existing_store(root)?;

    let removed = store
        .remove(id)
        .with_context(|| format!("Failed to remove record: {}", id))?;
    if !removed {
        return Err(RecordNotFound(id.to_string()).into());
    }

    out.write(
        &RmOutput {
            success: true,
            result_code: 0,
            id: id.to_string(),
        },
        || format!("Removed {}\n", id),
    )
}

fn cmd_path(out: &OutputWriter, root: &Path, id: &str) -> Result<()> {
    let store = open_existing_store(root)?;

    let path = store.path_for(id);
    let exists = store
        .contains(id)
        .with_context(|| format!("Failed to check record: {}", id))?;

    out.write(
        &PathOutput {
            success: true,
            result_code: 0,
            id: id.to_string(),
            path: path.display().to_string(),
            exists,
        },
        || format!("{}\n", path.display()),
    )
}
