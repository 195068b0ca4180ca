//! Process command - extract a single receipt file.

use std::fs;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use console::style;

use apprec_core::models::config::ApprecConfig;
use apprec_core::{receipt_from_html, Receipt};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input HTML receipt file
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let html = fs::read_to_string(&args.input)?;
    let receipt = receipt_from_html(&html, &config.tax)?;

    let content = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&receipt)?,
        OutputFormat::Csv => format_receipt_csv(&receipt)?,
        OutputFormat::Text => format_receipt_text(&receipt),
    };

    match args.output {
        Some(path) => {
            fs::write(&path, content)?;
            println!("{} Wrote {}", style("✓").green(), path.display());
        }
        None => println!("{content}"),
    }

    Ok(())
}

/// Load the pipeline configuration, falling back to defaults.
pub(crate) fn load_config(config_path: Option<&str>) -> anyhow::Result<ApprecConfig> {
    match config_path {
        Some(path) => Ok(ApprecConfig::from_file(std::path::Path::new(path))?),
        None => Ok(ApprecConfig::default()),
    }
}

pub(crate) fn format_receipt_csv(receipt: &Receipt) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "order_id",
        "receipt_date",
        "item_category",
        "item_type",
        "description_1",
        "description_2",
        "purchase_amount",
        "tax_applied",
        "total_amount",
        "subscription_frequency",
        "next_renewal_date",
        "device",
    ])?;

    for item in &receipt.items {
        wtr.write_record([
            receipt.order_id.as_str(),
            &receipt
                .receipt_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            item.category.as_str(),
            item.item_type.as_str(),
            &item.description_1,
            item.description_2.as_deref().unwrap_or(""),
            &item.purchase_amount.to_string(),
            &item.tax_applied.to_string(),
            &item.total_amount.to_string(),
            item.cadence.map(|c| c.as_str()).unwrap_or(""),
            &item
                .next_renewal_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            item.device.as_deref().unwrap_or(""),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub(crate) fn format_receipt_text(receipt: &Receipt) -> String {
    let mut output = String::new();

    output.push_str(&format!("Order: {}\n", receipt.order_id));
    if let Some(date) = receipt.receipt_date {
        output.push_str(&format!("Date: {}\n", date));
    }
    output.push_str(&format!("Account: {}\n", receipt.apple_account));
    if !receipt.doc_nbr.is_empty() {
        output.push_str(&format!("Document: {}\n", receipt.doc_nbr));
    }
    output.push('\n');

    output.push_str("Items:\n");
    for item in &receipt.items {
        output.push_str(&format!(
            "  {} [{}] {} + {} tax = {}\n",
            item.description_1,
            item.item_type.as_str(),
            item.purchase_amount,
            item.tax_applied,
            item.total_amount,
        ));
        if let Some(renewal) = item.next_renewal_date {
            output.push_str(&format!("    renews {}\n", renewal));
        }
    }
    output.push('\n');

    output.push_str("Summary:\n");
    output.push_str(&format!("  Subtotal: {}\n", receipt.subtotal));
    output.push_str(&format!("  Tax:      {}\n", receipt.tax));
    output.push_str(&format!("  Total:    {}\n", receipt.total));

    if let Some(card) = &receipt.card {
        output.push_str(&format!("\nPaid with {}\n", card));
    }

    output
}
