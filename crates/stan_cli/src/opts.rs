#![deny(missing_docs)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use cli::args::{EntityArg, MaxLabware};
use cli::parsers::{max_labware_parser, BarcodeParser, WorkNumberParser};
use labware::{Barcode, WorkNumber};

#[derive(Parser, Debug)]
#[command(name = "stan_cli")]
#[command(bin_name = "stan_cli")]
#[command(version, about, long_about = None)]
pub(crate) struct Opts {
    #[command(subcommand)]
    pub(crate) command: StanCommand,

    /// stan-core GraphQL endpoint
    #[arg(
        long,
        env = "STAN_CORE_URL",
        default_value = "http://localhost:8080/graphql",
        global = true
    )]
    pub(crate) stan_core_url: String,

    /// Session file, shared by consecutive commands (in-memory when absent)
    #[arg(long, env = "STAN_SESSION_FILE", global = true)]
    pub(crate) session_file: Option<PathBuf>,

    /// Trace log file
    #[arg(long, num_args = 0..=1, default_missing_value = "trace.log")]
    pub(crate) trace: Option<PathBuf>,

    #[command(flatten)]
    pub(crate) verbose: Verbosity<InfoLevel>,
}

#[derive(Debug, Subcommand)]
pub(crate) enum StanCommand {
    /// Scan labware, looking each barcode up in stan-core
    Scan {
        /// Labware barcodes, e.g. 'STAN-611'
        #[arg(value_parser = BarcodeParser::default())]
        barcodes: Vec<Barcode>,

        /// Lock the scanner once this many labware have been scanned
        #[arg(long, value_parser = max_labware_parser)]
        max: Option<MaxLabware>,

        /// Start with the labware handed over for storage by a previous command
        #[arg(long)]
        awaiting_storage: bool,
    },

    /// Destroy labware
    Destroy {
        /// Labware barcodes
        #[arg(value_parser = BarcodeParser::default())]
        barcodes: Vec<Barcode>,

        /// Destruction reason id
        #[arg(long)]
        reason_id: i64,

        /// SGP number
        #[arg(long, value_parser = WorkNumberParser::default())]
        work_number: Option<WorkNumber>,
    },

    /// Release labware to a destination
    Release {
        /// Labware barcodes
        #[arg(value_parser = BarcodeParser::default())]
        barcodes: Vec<Barcode>,

        /// Release destination
        #[arg(long, default_value = "")]
        destination: String,

        /// Release recipient
        #[arg(long, default_value = "")]
        recipient: String,

        /// SGP number
        #[arg(long, value_parser = WorkNumberParser::default(), default_value = "")]
        work_number: WorkNumber,
    },

    /// Extract RNA from labware into new labware
    Extract {
        /// Labware barcodes
        #[arg(value_parser = BarcodeParser::default())]
        barcodes: Vec<Barcode>,

        /// Destination labware type, e.g. 'Tube'
        #[arg(long, default_value = "")]
        labware_type: String,

        /// SGP number
        #[arg(long, value_parser = WorkNumberParser::default(), default_value = "")]
        work_number: WorkNumber,

        /// Hand the new labware over to storage
        #[arg(long)]
        store: bool,
    },

    /// Manage an admin lookup table
    Admin {
        /// Lookup table
        #[arg(value_enum)]
        entity: EntityArg,

        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum AdminAction {
    /// List every entry, including disabled ones
    List,

    /// Add an entry
    Add {
        /// Entry value
        value: String,

        /// Extra property value, e.g. the category of a comment
        #[arg(long)]
        extra: Option<String>,
    },

    /// Enable an entry
    Enable {
        /// Entry key, the id for comments and equipment, otherwise the name
        key: String,
    },

    /// Disable an entry
    Disable {
        /// Entry key, the id for comments and equipment, otherwise the name
        key: String,
    },

    /// Change the extra property of an entry
    SetExtra {
        /// Entry key, the id for comments and equipment, otherwise the name
        key: String,

        /// New extra property value
        value: String,
    },
}
