use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use labtrack::formats::InstrumentFormat;
use labtrack::model::{MeasurementKind, Role};

mod config;
mod export;
mod ingest;
mod register;
mod samples;
mod user;

pub use config::Config;

/// labtrack - Laboratory Sample Tracking
#[derive(Parser)]
#[command(name = "labtrack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Load settings from a TOML config file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Instrument format override for ingestion.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    /// CHN elemental analyzer export
    Elemental,
    /// ELTRA TGA proximate analyzer export
    Proximate,
}

impl From<FormatArg> for InstrumentFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Elemental => InstrumentFormat::Elemental,
            FormatArg::Proximate => InstrumentFormat::Proximate,
        }
    }
}

/// Measurement kind selector for export.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindArg {
    /// CHN elemental measurements
    Elemental,
    /// ELTRA TGA proximate measurements
    Proximate,
}

impl From<KindArg> for MeasurementKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Elemental => MeasurementKind::Elemental,
            KindArg::Proximate => MeasurementKind::Proximate,
        }
    }
}

/// User role selector.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RoleArg {
    /// Regular user
    User,
    /// Administrator
    Admin,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::User => Role::User,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new sample and print its generated id
    Register {
        /// Sample id prefix (e.g. "BIO")
        #[arg(short, long)]
        prefix: String,

        /// Sample material type
        #[arg(long, default_value = "")]
        sample_type: String,

        /// Project the sample belongs to
        #[arg(long, default_value = "")]
        project: String,

        /// Sampling date (ISO 8601)
        #[arg(long, default_value = "")]
        sampling_date: String,

        /// Sampling location
        #[arg(long, default_value = "")]
        location: String,

        /// Sample condition on arrival
        #[arg(long, default_value = "")]
        condition: String,

        /// Responsible person
        #[arg(long, default_value = "")]
        responsible: String,
    },

    /// Ingest instrument files into the measurement tables
    Ingest {
        /// Instrument files (decoded UTF-8 text)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Instrument format (auto-detected from headers when omitted)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Print the merged outcome as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List registered samples
    Samples,

    /// Export per-sample means and raw rows as delimited tables
    Export {
        /// Measurement kind to export
        #[arg(short, long, value_enum)]
        kind: KindArg,

        /// Output directory for the two tables
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        out: PathBuf,
    },

    /// Manage application users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Add a user
    Add {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Password (hashed with bcrypt before storage)
        #[arg(short, long)]
        password: String,

        /// Role
        #[arg(short, long, value_enum, default_value = "user")]
        role: RoleArg,
    },

    /// List users and their roles
    List,
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Register {
            prefix,
            sample_type,
            project,
            sampling_date,
            location,
            condition,
            responsible,
        } => register::run(
            &config,
            &prefix,
            &sample_type,
            &project,
            &sampling_date,
            &location,
            &condition,
            &responsible,
        ),
        Commands::Ingest {
            files,
            format,
            json,
        } => ingest::run(&config, &files, format.map(InstrumentFormat::from), json),
        Commands::Samples => samples::run(&config),
        Commands::Export { kind, out } => export::run(&config, kind.into(), &out),
        Commands::User { command } => match command {
            UserCommands::Add {
                username,
                password,
                role,
            } => user::add(&config, &username, &password, role.into()),
            UserCommands::List => user::list(&config),
        },
    }
}
