//! demos/graph_summary.rs
//!
//! Processes the bundled sample data and renders the weather charts to
//! static/plots as standalone HTML files.
//!
//! To run this demo:
//! cargo run --example graph_summary --features charts

use std::error::Error;
use std::path::{Path, PathBuf};
use weather_hero::WeatherHero;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let hero = WeatherHero::builder()
        .data_path(PathBuf::from("data/weather_test.csv"))
        .output_path(PathBuf::from("data/weather_summary.csv"))
        .build();

    println!("Processing weather data...");
    let report = hero.process().await?;

    println!("Generating charts...");
    let paths = hero
        .render_charts(&report, Path::new("static/plots"))
        .await?;
    for path in paths {
        println!("Wrote {}", path.display());
    }

    Ok(())
}
