use bytes::Bytes;
use colored::Colorize;
use serde::Serialize;
use shipreg_sync::{
    CreateShipmentRequest, CreateStatus, MedicineCatalog, RegistrySynchronizer, SafetyVerdict,
    ShippingCheck,
};
use shipreg_types::{IndexRecord, ReconciledView, ShipmentStatus};

use crate::app;
use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    let command = match cli.command {
        Command::Check(args) => return cmd_check(args, format),
        command => command,
    };
    let config = app::load_config(&cli.config)?;
    if let Command::Config = command {
        return cmd_config(&config, format);
    }
    let registry = app::build(&config)?;

    match command {
        Command::Connect => cmd_connect(&registry, format).await,
        Command::Create(args) => cmd_create(&registry, args, format).await,
        Command::Fetch(args) => cmd_fetch(&registry, args, format).await,
        Command::Claim(args) => cmd_claim(&registry, args, format).await,
        Command::ReplaceDocument(args) => cmd_replace_document(&registry, args, format).await,
        Command::Status(args) => cmd_status(&registry, args, format).await,
        Command::RetryIndex(args) => cmd_retry_index(&registry, args).await,
        Command::Config | Command::Check(_) => Ok(()),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_document(path: &std::path::Path) -> anyhow::Result<Bytes> {
    let data = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    Ok(Bytes::from(data))
}

fn print_view(view: &ReconciledView) {
    let confirmed = if view.ledger_confirmed {
        "ledger confirmed".green()
    } else {
        "unconfirmed".yellow()
    };
    println!("Shipment {} ({})", view.id.to_string().bold(), confirmed);
    println!("  Route:       {} -> {}", view.source, view.destination);
    println!("  Description: {}", view.description);
    println!("  Status:      {}", view.status.to_string().cyan());
    match (view.expiry_days, view.created_at) {
        (Some(days), Some(created)) => {
            println!("  Expires:     {days} days after {}", created.format("%Y-%m-%d"))
        }
        (Some(days), None) => println!("  Expires:     after {days} days"),
        _ => {}
    }
    if let Some(sender) = view.sender {
        println!("  Sender:      {}", sender.to_string().yellow());
    }
    if let Some(receiver) = view.receiver {
        println!("  Receiver:    {}", receiver.to_string().yellow());
    }
    if let Some(url) = &view.document_url {
        println!("  Document:    {}", url.blue());
    }
    if let Some(tx) = &view.transaction_ref {
        println!("  Transaction: {}", tx.dimmed());
    }
    if let Some(url) = &view.explorer_url {
        println!("  Explorer:    {}", url.blue());
    }
    if let Some(error) = &view.ledger_error {
        println!("  {} {}", "ledger read failed:".red(), error);
    }
}

async fn cmd_connect(registry: &RegistrySynchronizer, format: OutputFormat) -> anyhow::Result<()> {
    let address = registry.session().connect().await?;
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "address": address })),
        OutputFormat::Text => {
            println!("{} Connected as {}", "✓".green().bold(), address.to_string().yellow());
            Ok(())
        }
    }
}

async fn cmd_create(
    registry: &RegistrySynchronizer,
    args: CreateArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let request = CreateShipmentRequest {
        id: args.id,
        source: args.source,
        destination: args.destination,
        contents: args.contents,
        receiver_address: args.receiver,
        expiry_days: args.expiry_days,
        payload: read_document(&args.document)?,
    };
    registry.session().connect().await?;
    let outcome = registry.create_shipment(&request).await?;

    if format == OutputFormat::Json {
        return print_json(&outcome);
    }
    match &outcome.status {
        CreateStatus::Complete => println!("{} Shipment registered", "✓".green().bold()),
        CreateStatus::PartialSuccess { cause, pending } => {
            println!("{} Shipment recorded on the ledger, but the index write failed", "!".yellow().bold());
            println!("  Cause: {}", cause.red());
            println!("  Save this record and run `shipreg retry-index <file>`:");
            println!("{}", serde_json::to_string_pretty(pending)?);
        }
    }
    print_view(&outcome.view);
    Ok(())
}

async fn cmd_fetch(
    registry: &RegistrySynchronizer,
    args: FetchArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if !args.no_connect {
        if let Err(e) = registry.session().connect().await {
            tracing::warn!(error = %e, "wallet unavailable, showing index fields only");
        }
    }
    let view = registry.fetch_shipment(&args.id).await?;
    match format {
        OutputFormat::Json => print_json(&view),
        OutputFormat::Text => {
            print_view(&view);
            Ok(())
        }
    }
}

async fn cmd_claim(
    registry: &RegistrySynchronizer,
    args: ClaimArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    registry.session().connect().await?;
    let claimed = registry.claim_document(&args.id, args.signed_in).await?;
    match format {
        OutputFormat::Json => print_json(&claimed),
        OutputFormat::Text => {
            println!("{} Document for shipment {} claimed", "✓".green().bold(), claimed.id);
            println!("  {}", claimed.document_url.blue());
            Ok(())
        }
    }
}

async fn cmd_replace_document(
    registry: &RegistrySynchronizer,
    args: ReplaceDocumentArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let payload = read_document(&args.document)?;
    registry.session().connect().await?;
    let outcome = registry.replace_document(&args.id, payload).await?;
    match format {
        OutputFormat::Json => print_json(&outcome),
        OutputFormat::Text => {
            println!("{} Document replaced for shipment {}", "✓".green().bold(), outcome.id);
            println!("  Document:    {}", outcome.document.gateway_url.blue());
            println!("  Transaction: {}", outcome.transaction_ref.to_string().dimmed());
            if let Some(warning) = &outcome.index_warning {
                println!("  {} {}", "index not refreshed:".yellow(), warning);
            }
            Ok(())
        }
    }
}

async fn cmd_status(
    registry: &RegistrySynchronizer,
    args: StatusArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let status: ShipmentStatus = args.status.parse().map_err(anyhow::Error::msg)?;
    let record = registry.update_status(&args.id, status).await?;
    match format {
        OutputFormat::Json => print_json(&record),
        OutputFormat::Text => {
            println!("Shipment {} is now {}", record.id.to_string().bold(), record.status.to_string().cyan());
            Ok(())
        }
    }
}

async fn cmd_retry_index(registry: &RegistrySynchronizer, args: RetryIndexArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.record)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", args.record.display()))?;
    let record: IndexRecord = serde_json::from_str(&text)?;
    registry.retry_index_write(&record).await?;
    println!("{} Index entry for shipment {} written", "✓".green().bold(), record.id);
    Ok(())
}

fn cmd_config(config: &shipreg_sync::RegistryConfig, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(config),
        OutputFormat::Text => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn cmd_check(args: CheckArgs, format: OutputFormat) -> anyhow::Result<()> {
    let request = ShippingCheck {
        medicine: args.medicine,
        travel_days: args.travel_days,
        temperature_celsius: args.temperature,
        manufactured_on: args.manufactured,
    };
    let today = chrono::Local::now().date_naive();
    let verdict = MedicineCatalog::default().check(&request, today);
    match format {
        OutputFormat::Json => print_json(&verdict),
        OutputFormat::Text => {
            print_verdict(&verdict);
            Ok(())
        }
    }
}

fn print_verdict(verdict: &SafetyVerdict) {
    if verdict.can_ship {
        println!("{} Safe to ship", "✓".green().bold());
    } else {
        println!("{} Shipment not recommended", "✗".red().bold());
    }
    if let Some(medicine) = &verdict.medicine {
        println!("  Medicine:    {} ({})", medicine.name.bold(), medicine.description);
        println!("  Max temp:    {}°C", medicine.max_temp_celsius);
    }
    if let Some(days) = verdict.remaining_shelf_life_days {
        println!("  Shelf life:  {days} days remaining (use as --expiry-days)");
    }
    for problem in &verdict.problems {
        println!("  {} {problem}", "-".red());
    }
}
