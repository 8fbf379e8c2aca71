#![deny(clippy::pedantic, clippy::all, clippy::nursery)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use mailout::{batch::BatchDriver, config::Config, delivery::SmtpMailer, logging};

/// Send personalized emails to recipients listed in a CSV file
#[derive(Parser, Debug)]
#[command(name = "mailout")]
#[command(about = "Send personalized emails from a CSV file", long_about = None)]
#[command(version)]
struct Cli {
    /// CSV file with recipient data; requires an `email` column
    csv: PathBuf,

    /// Configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Report what would be processed without sending anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config).with_context(|| {
        format!("Failed to load configuration from {}", cli.config.display())
    })?;

    if cli.dry_run {
        println!("DRY RUN MODE - no emails will be sent");
        println!("Would process CSV file: {}", cli.csv.display());
        println!("Using configuration: {}", cli.config.display());
        println!("Configured senders: {}", config.sender_emails.len());
        return Ok(());
    }

    let mut driver = BatchDriver::from_config(&config, SmtpMailer::new())
        .context("Invalid sender or retry configuration")?;

    println!("Starting email sending process...");
    println!("CSV file: {}", cli.csv.display());
    println!("Configuration: {}", cli.config.display());
    println!("Sender emails: {}", config.sender_emails.len());
    println!("{:-<50}", "");

    let report = driver.run(&cli.csv).await;

    println!("{:-<50}", "");
    println!("Email sending completed!");
    println!("Total recipients: {}", report.total);
    println!("Successfully sent: {}", report.sent);
    println!("Failed: {}", report.failed);
    if report.total > 0 {
        println!("Success rate: {:.1}%", report.success_rate());
    }

    Ok(())
}
