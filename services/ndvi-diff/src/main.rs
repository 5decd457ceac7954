//! Composite difference map generator.
//!
//! Filters the country boundary table, subtracts two Landsat composites,
//! clips the result to the boundary and writes a Leaflet map with the
//! difference as a tile overlay.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ee_client::{ClientConfig, EarthEngineClient};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use ndvi_diff::{Pipeline, Scenario};

#[derive(Parser, Debug)]
#[command(name = "ndvi-diff")]
#[command(about = "Render a country-clipped Landsat composite difference as a web map")]
struct Args {
    /// Scenario file (YAML); built-in defaults are used when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Override the scenario's country name
    #[arg(short, long)]
    country: Option<String>,

    /// Output HTML document
    #[arg(short, long, default_value = "difference.html")]
    output: PathBuf,

    /// Cloud project that owns the requests
    #[arg(long, env = "EE_PROJECT")]
    project: Option<String>,

    /// OAuth2 bearer token
    #[arg(long, env = "EE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Service root URL
    #[arg(long, env = "EE_BASE_URL", default_value = ee_client::DEFAULT_BASE_URL)]
    base_url: String,

    /// Print the request expressions as JSON and exit without network access
    #[arg(long)]
    dry_run: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);
    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    let mut scenario = match &args.scenario {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("Failed to load scenario {}", path.display()))?,
        None => Scenario::default(),
    };
    if let Some(country) = &args.country {
        scenario.country = country.clone();
    }
    scenario.validate().context("Invalid scenario")?;

    if args.dry_run {
        let plan = Pipeline::plan(&scenario);
        println!("{}", serde_json::to_string_pretty(&plan.expressions())?);
        return Ok(());
    }

    let project = args
        .project
        .context("A project is required (--project or EE_PROJECT)")?;
    let access_token = args
        .access_token
        .context("An access token is required (--access-token or EE_ACCESS_TOKEN)")?;
    let config = ClientConfig::new(project, access_token).with_base_url(&args.base_url);
    let client = EarthEngineClient::initialize(config).context("Failed to initialize client")?;

    info!(country = %scenario.country, "Building composite difference map");
    let map = Pipeline::run(&client, &scenario)
        .await
        .context("Pipeline failed")?;

    let html = map.render_html().context("Failed to render map")?;
    tokio::fs::write(&args.output, html)
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        output = %args.output.display(),
        overlays = map.overlays().len(),
        "Map written"
    );
    Ok(())
}
