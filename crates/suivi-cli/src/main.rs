//! suivi - Suivi des documents techniques et bordereaux d'envoi
//!
//! Command-line front end over suivi-core: document tracking, review
//! lifecycle, bordereau preparation, and the optional remote mirror.

mod commands;
mod output;
mod render;
mod selection_file;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "suivi")]
#[command(about = "Suivi des documents et bordereaux de transmission", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output for scripting
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage tracked documents
    Doc {
        #[command(subcommand)]
        action: DocAction,
    },
    /// Build and archive transmittal slips (bordereaux)
    Slip {
        #[command(subcommand)]
        action: SlipAction,
    },
    /// Show status counts and documents awaiting action
    Stats,
    /// Reconcile with the remote mirror
    Sync,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage letterhead, project and stakeholder settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Export data to files
    Export {
        #[command(subcommand)]
        action: ExportAction,
    },
}

#[derive(Subcommand)]
enum DocAction {
    /// Add a new document with an initial revision
    Add {
        /// Document code (e.g. GC-FND-Z1-001)
        code: String,
        /// Document name
        name: String,
        /// Lot number
        #[arg(long, default_value = "")]
        lot: String,
        /// Classement (filing category)
        #[arg(long, default_value = "")]
        classement: String,
        /// Poste (work item)
        #[arg(long, default_value = "")]
        poste: String,
        /// Initial revision label
        #[arg(long, default_value = "00")]
        index: String,
        /// Transmittal reference of the initial revision
        #[arg(long, default_value = "")]
        transmittal_ref: String,
        /// Transmittal date (YYYY-MM-DD)
        #[arg(long)]
        sent: Option<String>,
    },
    /// List documents (current revision of each)
    List {
        /// Filter by status (pending, approved, approved-with-comments, rejected, no-response)
        #[arg(long)]
        status: Option<String>,
        /// Text filter on code, name, lot, poste
        #[arg(long)]
        filter: Option<String>,
        /// Sort column (lot, code, name, index, status, transmittal-date, ...)
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Show every revision, not just the current one
        #[arg(long)]
        all: bool,
    },
    /// Show a document and its revision history
    Show {
        /// Document id, id prefix, or code
        document: String,
    },
    /// Record a review outcome on a revision
    Review {
        /// Document id, id prefix, or code
        document: String,
        /// New status (pending, approved, approved-with-comments, rejected, no-response)
        status: String,
        /// Revision id or label (defaults to the current revision)
        #[arg(long)]
        revision: Option<String>,
        /// Observation reference
        #[arg(long)]
        observation_ref: Option<String>,
        /// Observation date (YYYY-MM-DD)
        #[arg(long)]
        observation_date: Option<String>,
        /// Approval date (YYYY-MM-DD)
        #[arg(long)]
        approval_date: Option<String>,
        /// Return date (YYYY-MM-DD)
        #[arg(long)]
        return_date: Option<String>,
        /// Review comments
        #[arg(long)]
        comments: Option<String>,
    },
    /// Edit document metadata
    EditMeta {
        /// Document id, id prefix, or code
        document: String,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        lot: Option<String>,
        #[arg(long)]
        classement: Option<String>,
        #[arg(long)]
        poste: Option<String>,
    },
    /// Delete a document and all its revisions
    Delete {
        /// Document id, id prefix, or code
        document: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Search documents by text
    Search {
        /// Query matched against code, name, lot, poste
        query: String,
    },
    /// Attach a file to the current revision
    Attach {
        /// Document id, id prefix, or code
        document: String,
        /// Path to the file to attach
        file: std::path::PathBuf,
        /// Attach as an observation file instead of a transmittal file
        #[arg(long)]
        observation: bool,
    },
    /// Set or clear the follow-up reminder on the current revision
    Remind {
        /// Document id, id prefix, or code
        document: String,
        /// Reminder frequency in days
        #[arg(long, default_value_t = 7)]
        every: u32,
        /// Clear the reminder instead of setting one
        #[arg(long)]
        off: bool,
    },
}

#[derive(Subcommand)]
enum SlipAction {
    /// Add a document to the working selection
    Add {
        /// Document id, id prefix, or code
        document: String,
    },
    /// Remove a document from the working selection
    Remove {
        /// Document id, id prefix, or code
        document: String,
    },
    /// Select all documents matching a filter or status
    Select {
        /// Text filter on code and name
        #[arg(long)]
        filter: Option<String>,
        /// Status filter (pending, approved, ...)
        #[arg(long)]
        status: Option<String>,
    },
    /// Clear the working selection
    Clear,
    /// Show the working selection
    List,
    /// Set the copy count for a selected document
    Copies {
        /// Document id, id prefix, or code
        document: String,
        count: u32,
    },
    /// Set the per-document note for a selected document
    Note {
        /// Document id, id prefix, or code
        document: String,
        text: String,
    },
    /// Finalize the selection into an archived slip and render it
    Finalize {
        /// Recipient override
        #[arg(long)]
        to: Option<String>,
        /// Attention line override
        #[arg(long)]
        attention: Option<String>,
        /// Object line override
        #[arg(long)]
        object: Option<String>,
        /// Output directory for the rendered slip
        #[arg(long, default_value = ".")]
        out: std::path::PathBuf,
    },
    /// List or search archived slips
    History {
        /// Search query over reference, recipient, date, and documents
        #[arg(long)]
        search: Option<String>,
        /// Delete the slip with this reference or id prefix
        #[arg(long)]
        delete: Option<String>,
        /// Show one archived slip in detail
        #[arg(long)]
        show: Option<String>,
        /// Re-render the slip with this reference or id prefix from its snapshot
        #[arg(long)]
        render: Option<String>,
        /// Output directory for --render
        #[arg(long, default_value = ".")]
        out: std::path::PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, sync_url, sync_enabled, sync_debounce_ms)
        key: String,
        /// Value to set
        value: String,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show current settings
    Show,
    /// Set a settings value
    Set {
        /// Settings key (company_name, project_code, slip_prefix,
        /// client_name, client_contacts, ...)
        key: String,
        /// Value to set (contacts keys take a comma-separated list)
        value: String,
    },
}

#[derive(Subcommand)]
enum ExportAction {
    /// Export the tracking table as CSV
    Docs {
        /// Output file path
        #[arg(long, default_value = "suivi_documents.csv")]
        out: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match cli.command {
        Commands::Doc { action } => commands::doc::execute(action, &output).await,
        Commands::Slip { action } => commands::slip::execute(action, &output),
        Commands::Stats => commands::stats::execute(&output),
        Commands::Sync => commands::sync::execute(&output).await,
        Commands::Config { action } => commands::config::execute(action, &output),
        Commands::Settings { action } => commands::settings::execute(action, &output),
        Commands::Export { action } => commands::export::execute(action, &output),
    }
}
