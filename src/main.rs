use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

use reflectx::adapter;
use reflectx::{Archive, ArchiveProfile, Metric, RecordId, WeightConfig};

/// Ranking and similarity search over a personal experience archive
#[derive(Parser, Debug)]
#[command(name = "reflectx")]
#[command(about = "Ranking and similarity search over a personal experience archive", long_about = None)]
struct Args {
    /// Path to the JSON record snapshot
    #[arg(short, long, default_value = "records.json")]
    records: PathBuf,

    /// Distance metric: euclidean, manhattan, or cosine
    #[arg(long, default_value = "euclidean")]
    metric: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank records by weighted composite score
    Rank {
        /// Feature weight as name=value; repeatable
        #[arg(short, long = "weight")]
        weights: Vec<String>,

        /// Keep only the top N entries
        #[arg(long)]
        top: Option<usize>,
    },
    /// Find the k records most similar to one archived record
    Similar {
        /// Identifier of the archived query record
        #[arg(long)]
        id: String,

        /// Neighbor count
        #[arg(short, default_value_t = 3)]
        k: usize,
    },
    /// Distribution and keyword profile of the archive
    Profile,
    /// 2-D projection map of the encoded population
    Map,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting reflectx v{}", env!("CARGO_PKG_VERSION"));
    info!("Record snapshot: {:?}", args.records);

    let metric = parse_metric(&args.metric)?;
    let records = adapter::load_records(&args.records)?;
    info!("Loaded {} records", records.len());

    let archive = Archive::with_metric(metric);
    for record in records {
        archive.upsert(record)?;
    }
    let snapshot = archive.refit()?;
    info!(
        "Fitted snapshot {} over {} records ({} feature dimensions)",
        snapshot.id(),
        snapshot.len(),
        snapshot.schema().len()
    );

    match args.command {
        Command::Rank { weights, top } => {
            let config = parse_weights(&weights)?;
            let mut ranking = snapshot.rank(&config)?;
            if let Some(top) = top {
                ranking.truncate(top);
            }
            println!("{}", serde_json::to_string_pretty(&ranking)?);
        }
        Command::Similar { id, k } => {
            let query = parse_record_id(&id);
            let neighbors = snapshot.neighbors(&query, k)?;
            println!("{}", serde_json::to_string_pretty(&neighbors)?);
        }
        Command::Profile => {
            let profile = ArchiveProfile::compute(&archive.records());
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Command::Map => {
            let points = snapshot.project_2d();
            println!("{}", serde_json::to_string_pretty(&points)?);
        }
    }

    Ok(())
}

fn parse_metric(raw: &str) -> anyhow::Result<Metric> {
    match raw {
        "euclidean" => Ok(Metric::Euclidean),
        "manhattan" => Ok(Metric::Manhattan),
        "cosine" => Ok(Metric::Cosine),
        other => anyhow::bail!("unknown metric '{other}' (expected euclidean, manhattan, or cosine)"),
    }
}

/// Default weighting mirrors the dashboard sliders at rest: the shared
/// scores count, nothing else does.
fn parse_weights(raw: &[String]) -> anyhow::Result<WeightConfig> {
    if raw.is_empty() {
        return Ok(WeightConfig::new()
            .with("achievement", 1.0)
            .with("interest", 1.0));
    }
    let mut config = WeightConfig::new();
    for spec in raw {
        let (name, value) = spec
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("weight '{spec}' is not of the form name=value"))?;
        let weight: f64 = value
            .parse()
            .map_err(|_| anyhow::anyhow!("weight '{spec}' has a non-numeric value"))?;
        config.set(name, weight);
    }
    Ok(config)
}

fn parse_record_id(raw: &str) -> RecordId {
    if let Ok(n) = raw.parse::<u64>() {
        return RecordId::Integer(n);
    }
    if let Ok(uuid) = raw.parse::<Uuid>() {
        return RecordId::Uuid(uuid);
    }
    RecordId::String(raw.to_string())
}
