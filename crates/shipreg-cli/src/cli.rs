use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "shipreg",
    about = "Shipment registry: ledger-backed shipment records with documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file. Missing file means defaults.
    #[arg(short, long, global = true, default_value = "shipreg.toml")]
    pub config: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Connect to the wallet and show the signer identity
    Connect,
    /// Register a shipment: upload document, write ledger record, index it
    Create(CreateArgs),
    /// Look a shipment up
    Fetch(FetchArgs),
    /// Claim a shipment's document as its receiver
    Claim(ClaimArgs),
    /// Replace a shipment's document (sender only)
    ReplaceDocument(ReplaceDocumentArgs),
    /// Set a shipment's lifecycle status
    Status(StatusArgs),
    /// Rewrite an index entry saved from a partial success
    RetryIndex(RetryIndexArgs),
    /// Check whether a medicine can make the trip (offline)
    Check(CheckArgs),
    /// Show the effective configuration
    Config,
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub source: String,
    #[arg(long)]
    pub destination: String,
    #[arg(long)]
    pub contents: String,
    /// Receiver's account address
    #[arg(long)]
    pub receiver: String,
    #[arg(long)]
    pub expiry_days: Option<u32>,
    /// Document to attach
    #[arg(long)]
    pub document: PathBuf,
}

#[derive(Args)]
pub struct FetchArgs {
    pub id: String,
    /// Skip the wallet; show index fields only
    #[arg(long)]
    pub no_connect: bool,
}

#[derive(Args)]
pub struct ClaimArgs {
    pub id: String,
    /// Confirm an identity-provider login is present
    #[arg(long)]
    pub signed_in: bool,
}

#[derive(Args)]
pub struct ReplaceDocumentArgs {
    pub id: String,
    #[arg(long)]
    pub document: PathBuf,
}

#[derive(Args)]
pub struct StatusArgs {
    pub id: String,
    /// PENDING, IN_TRANSIT, DELIVERED or DELAYED
    pub status: String,
}

#[derive(Args)]
pub struct RetryIndexArgs {
    /// JSON file holding the pending index record
    pub record: PathBuf,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Insulin, Amoxicillin, Vaccine or Aspirin
    #[arg(long)]
    pub medicine: String,
    #[arg(long)]
    pub travel_days: u32,
    /// Expected transit temperature in °C
    #[arg(long, allow_negative_numbers = true)]
    pub temperature: f64,
    /// Manufacture date (YYYY-MM-DD)
    #[arg(long)]
    pub manufactured: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_create() {
        let cli = Cli::try_parse_from([
            "shipreg",
            "--format",
            "json",
            "create",
            "--id",
            "7",
            "--source",
            "Oslo",
            "--destination",
            "Bergen",
            "--contents",
            "Salmon",
            "--receiver",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "--document",
            "bol.pdf",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Command::Create(args) => {
                assert_eq!(args.id, "7");
                assert!(args.expiry_days.is_none());
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn parses_fetch_flags() {
        let cli = Cli::try_parse_from(["shipreg", "fetch", "12", "--no-connect", "-v"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Fetch(args) => assert!(args.no_connect),
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn parses_check_with_freezing_temperature() {
        let cli = Cli::try_parse_from([
            "shipreg",
            "check",
            "--medicine",
            "Vaccine",
            "--travel-days",
            "3",
            "--temperature",
            "-2.5",
            "--manufactured",
            "2025-01-15",
        ])
        .unwrap();
        match cli.command {
            Command::Check(args) => {
                assert_eq!(args.medicine, "Vaccine");
                assert_eq!(args.travel_days, 3);
                assert_eq!(args.temperature, -2.5);
                assert_eq!(args.manufactured, NaiveDate::from_ymd_opt(2025, 1, 15));
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn check_rejects_malformed_date() {
        let result = Cli::try_parse_from([
            "shipreg",
            "check",
            "--medicine",
            "Insulin",
            "--travel-days",
            "1",
            "--temperature",
            "4",
            "--manufactured",
            "15/01/2025",
        ]);
        assert!(result.is_err());
    }
}
