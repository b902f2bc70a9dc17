use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::task::LocalSet;

use viewstore::{DispatchOptions, Effect, StoreConfig, ViewStore};

/// Counter demo: dispatches delayed increments and prints how the mirror
/// and the canonical state move.
#[derive(Parser, Debug)]
#[command(name = "viewstore-demo", version)]
struct Cli {
    /// Number of delayed increments to dispatch.
    #[arg(long, default_value_t = 3)]
    count: u32,

    /// Wait for feedback actions as part of each dispatch.
    #[arg(long)]
    track: bool,

    /// Disable the optimistic local reducer run.
    #[arg(long)]
    no_optimistic: bool,

    /// Optional TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
enum CounterAction {
    /// Bump `requested` now and `count` once the delay elapses.
    IncrementLater(Duration),
    Increment,
}

#[derive(Debug, Clone, Default)]
struct Counter {
    requested: u32,
    count: u32,
}

fn reduce(action: CounterAction, state: &mut Counter, _env: &()) -> anyhow::Result<Effect<CounterAction>> {
    match action {
        CounterAction::IncrementLater(delay) => {
            state.requested += 1;
            Ok(Effect::future(async move {
                tokio::time::sleep(delay).await;
                Some(CounterAction::Increment)
            }))
        }
        CounterAction::Increment => {
            state.count += 1;
            Ok(Effect::none())
        }
    }
}

async fn run(cli: Cli, config: StoreConfig) -> anyhow::Result<()> {
    let store = ViewStore::new(Counter::default(), reduce, (), config);
    let _subscription = store.subscribe(|state| {
        println!("mirror: requested={} count={}", state.requested, state.count);
    });

    let options = if cli.track {
        DispatchOptions::default().tracking_feedbacks()
    } else {
        DispatchOptions::default()
    };

    for n in 0..cli.count {
        let task = store.dispatch_with(
            CounterAction::IncrementLater(Duration::from_millis(20 * u64::from(n + 1))),
            options,
        );
        let mirror = store.state();
        println!(
            "dispatched #{n}: mirror requested={} count={}",
            mirror.requested, mirror.count
        );
        task.finish().await?;
    }

    // Untracked feedback may still be in flight.
    tokio::time::sleep(Duration::from_millis(20 * u64::from(cli.count + 1))).await;

    let canonical = store.canonical_state().await?;
    println!(
        "canonical: requested={} count={}",
        canonical.requested, canonical.count
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    if let Some(path) = viewstore::logging::init_tracing() {
        tracing::info!(path = %path.display(), "viewstore-demo logging enabled");
    }
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => StoreConfig::load_from(path)?,
        None => StoreConfig::default(),
    };
    if cli.no_optimistic {
        config.updates_state_immediately = false;
    }

    LocalSet::new().run_until(run(cli, config)).await
}
