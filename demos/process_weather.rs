//! demos/process_weather.rs
//!
//! Runs the whole pipeline over the bundled sample data and prints the
//! grouped rainfall totals.
//!
//! To run this demo:
//! cargo run --example process_weather

use std::error::Error;
use std::path::PathBuf;
use weather_hero::WeatherHero;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging()?;

    let output_path = PathBuf::from("data/weather_summary.csv");
    let hero = WeatherHero::builder()
        .data_path(PathBuf::from("data/weather_test.csv"))
        .output_path(output_path.clone())
        .build();

    match hero.process().await {
        Ok(report) => {
            println!("Sample data (first 5 rows):");
            println!("{}", report.analyzer.frame().head(Some(5)));

            println!("Total rainfall by location:");
            for (location, total) in report.group_totals.totals() {
                println!("  {location}: {total} mm");
            }

            println!("Summary written to {}", output_path.display());
            println!("Success!");
        }
        Err(e) => {
            eprintln!("Error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

/// Sends log output to an append-only file.
/// Set RUST_LOG=info (or debug, trace) to control the level.
fn init_logging() -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all("logs")?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("logs/weather_hero.log")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
    Ok(())
}
