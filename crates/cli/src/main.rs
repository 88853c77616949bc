//! `matric` -- applicant-side CLI for the admission service.
//!
//! Drives the OTP login flow, local validation of draft applications,
//! submission, the detail view, and attachment management.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default                | Description                  |
//! |------------------------|----------|------------------------|------------------------------|
//! | `API_BASE_URL`         | yes      | --                     | Admission API base URL       |
//! | `SESSION_PATH`         | no       | `.matric/session.json` | Where the session is stored  |
//! | `REQUEST_TIMEOUT_SECS` | no       | `30`                   | HTTP request timeout         |

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use matric_client::api::auth::{OtpChannel, OtpMethod};
use matric_client::api::ApiClient;
use matric_client::config::ClientConfig;
use matric_core::types::EntityId;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "matric", about = "Admission application toolkit", version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Request an OTP and exchange it for a session.
    Login {
        /// Profile code issued with the admission invitation.
        #[arg(long)]
        profile_code: String,
        /// How to identify yourself for the OTP.
        #[arg(long, value_enum, default_value = "profile-code")]
        method: MethodArg,
        /// Delivery channel for the code.
        #[arg(long, value_enum, default_value = "sms")]
        channel: ChannelArg,
        /// Where the code should be delivered (phone number, email, ...).
        #[arg(long)]
        receiver: String,
    },
    /// Clear the stored session.
    Logout,
    /// Validate a draft application JSON file.
    Check { file: PathBuf },
    /// Validate and submit a draft application JSON file.
    Submit { file: PathBuf },
    /// Fetch a submitted application and print a summary.
    Show { id: EntityId },
    /// Manage attachments.
    Files {
        #[command(subcommand)]
        command: FilesCommand,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum FilesCommand {
    /// List attachments in a category.
    List {
        /// Category code (1=personal, 2=undergrad, 3=postgrad, 4=English).
        #[arg(long)]
        category: u8,
        /// Scope to one repeated-section entity.
        #[arg(long)]
        entity: Option<EntityId>,
    },
    /// Upload files into a category.
    Upload {
        #[arg(long)]
        category: u8,
        #[arg(long)]
        entity: Option<EntityId>,
        /// Files to queue; rejected files are skipped, not fatal.
        paths: Vec<PathBuf>,
    },
    /// Delete an attachment by its server local name.
    Delete {
        #[arg(long)]
        category: u8,
        #[arg(long)]
        entity: Option<EntityId>,
        local_name: String,
    },
    /// Download an attachment by file name or local name.
    Download {
        #[arg(long)]
        category: u8,
        #[arg(long)]
        entity: Option<EntityId>,
        file_name: String,
        /// Target path (defaults to the attachment's file name).
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum MethodArg {
    Phone,
    NationalId,
    ProfileCode,
}

impl From<MethodArg> for OtpMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Phone => OtpMethod::Phone,
            MethodArg::NationalId => OtpMethod::NationalId,
            MethodArg::ProfileCode => OtpMethod::ProfileCode,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum ChannelArg {
    Sms,
    Email,
    Zalo,
}

impl From<ChannelArg> for OtpChannel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Sms => OtpChannel::Sms,
            ChannelArg::Email => OtpChannel::Email,
            ChannelArg::Zalo => OtpChannel::Zalo,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "matric_cli=info,matric_client=info,matric_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();

    let client = match ApiClient::new(&config) {
        Ok(client) => client,
        Err(error) => {
            tracing::error!(error = %error, "Failed to build the HTTP client");
            std::process::exit(1);
        }
    };

    if let Err(error) = commands::run(cli.command, &client).await {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}
