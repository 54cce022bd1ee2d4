//! Local preview: run the widget session against the built-in sample host
//! (optionally feeding it a dashboard payload from a JSON file) and print
//! the resulting points and diagnostics.
//!
//! ```text
//! cargo run -p geopin-dashboard --example preview -- --state View
//! cargo run -p geopin-dashboard --example preview -- --rows rows.json
//! ```

use anyhow::{Context, Result};
use clap::Parser;

use geopin_dashboard::{DashboardState, SampleHost, WidgetSession};

#[derive(Parser)]
#[command(about = "Preview the geopin widget against sample data")]
struct Args {
    /// Dashboard state to simulate (Create, Config, View, FullScreen).
    #[arg(long, default_value = "Config")]
    state: String,

    /// JSON file with a dashboard payload: a 2-D aggregate (header row
    /// first) or a loose array of objects.
    #[arg(long)]
    rows: Option<std::path::PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut host = SampleHost::new(DashboardState::parse(&args.state));
    if let Some(path) = &args.rows {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading rows file {}", path.display()))?;
        let payload: serde_json::Value =
            serde_json::from_str(&text).context("rows file is not valid JSON")?;
        host.preview = Some(payload.clone());
        host.dashboard_data = Some(payload);
    }

    let mut session = WidgetSession::new(host);
    session.bootstrap();
    let outcome = session.refresh();

    println!("source: {:?}", outcome.source);
    println!(
        "rows: {}  invalid: {}  excluded: {}",
        outcome.result.total,
        outcome.result.invalid,
        outcome.result.excluded.unwrap_or(0)
    );
    if let Some(sample) = &outcome.result.invalid_sample {
        println!("first unparseable location: {}", sample.to_json());
    }
    println!("map center: {}", session.map_center());
    for point in &outcome.result.points {
        println!("  [{}] {} @ {},{}", point.id, point.name, point.lat, point.lng);
    }
    Ok(())
}
