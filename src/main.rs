mod dlq;
mod domain;
mod engine;
mod ingestion;
mod store;

use std::{env, fs::File, path::PathBuf};

use crate::dlq::StdErrDLQ;
use crate::domain::LedgerStore;
use crate::engine::Engine;
use crate::ingestion::CsvReader;
use crate::store::{JsonStore, MemoryStore};

const USAGE: &str = "usage: bid-ledger <script.csv> [--store <ledger.json>] [--reset]";

struct Args {
    script: PathBuf,
    store: Option<PathBuf>,
    reset: bool,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut script = None;
        let mut store = None;
        let mut reset = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--store" => {
                    let path = args.next().ok_or_else(|| "--store requires a path".to_string())?;
                    store = Some(PathBuf::from(path));
                }
                "--reset" => reset = true,
                _ => {
                    if script.replace(PathBuf::from(&arg)).is_some() {
                        return Err(format!("Unexpected argument: {}", arg));
                    }
                }
            }
        }

        Ok(Self {
            script: script.ok_or_else(|| USAGE.to_string())?,
            store,
            reset,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bid_ledger=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse(env::args().skip(1))?;
    let script = File::open(&args.script)?;
    let ingestion = CsvReader::new(script)?;

    match args.store {
        Some(path) => {
            let store = if args.reset {
                JsonStore::fresh(path)
            } else {
                JsonStore::open(path)?
            };
            run(ingestion, store).await
        }
        None => run(ingestion, MemoryStore::new()).await,
    }
}

async fn run<S: LedgerStore>(
    ingestion: CsvReader<File>,
    store: S,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::new(ingestion, store, StdErrDLQ::default());
    engine.process().await?;
    engine.flush()?;
    Ok(())
}
