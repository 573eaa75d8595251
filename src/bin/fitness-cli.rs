use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fitness_tracker::client::FitnessClient;
use fitness_tracker::records::FitnessRecord;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "fitness-cli")]
#[command(about = "Command-line client for the fitness tracker API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every record
    List,
    /// Show the record for a date (YYYY-MM-DD)
    Get { date: String },
    /// List records for a year
    Year { year: String },
    /// List records for a month
    Month { year: String, month: String },
    /// Create or replace a record from a JSON file
    Post { file: PathBuf },
    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = FitnessClient::new(&cli.url);

    match cli.command {
        Commands::List => print_json(&client.all().await?)?,
        Commands::Get { date } => match client.by_date(&date).await? {
            Some(record) => print_json(&record)?,
            None => {
                eprintln!("No record for {}", date);
                std::process::exit(1);
            }
        },
        Commands::Year { year } => print_json(&client.by_year(&year).await?)?,
        Commands::Month { year, month } => print_json(&client.by_month(&year, &month).await?)?,
        Commands::Post { file } => {
            let record: FitnessRecord = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
            let (stored, created) = client.upsert(&record).await?;
            eprintln!("{} {}", if created { "Created" } else { "Replaced" }, stored.date);
            print_json(&stored)?;
        }
        Commands::Health => print_json(&client.health().await?)?,
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
