//! HYPE/FLOP matching engine - line-oriented JSON front end
//!
//! Reads one JSON request per line from stdin and writes one JSON response
//! per line to stdout. Logs go to stderr.
//!
//! ```bash
//! echo '{"op":"limit_sell","asset":"HYPE","price":"0.40","shares":"10"}' | hypeflop
//! ```

use std::io::{self, BufRead, Write};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hypeflop::adapter;
use hypeflop::engine::{EngineConfig, MatchingEngine, DEFAULT_CAPACITY};

#[derive(Parser, Debug)]
#[command(author, version, about = "HYPE/FLOP matching engine")]
struct Args {
    /// Number of resting orders to pre-allocate room for
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Log filter directive, e.g. `info` or `hypeflop=debug`. Overrides RUST_LOG
    #[arg(long)]
    log: Option<String>,
}

fn setup_logging(directive: Option<&str>) {
    let env_filter = match directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    setup_logging(args.log.as_deref());

    let mut engine = MatchingEngine::with_config(EngineConfig {
        capacity: args.capacity,
    });
    info!(capacity = args.capacity, "matching engine ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut handled = 0u64;

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = adapter::handle(&mut engine, &line);
        debug!(status = response.status, "request handled");

        let rendered = serde_json::to_string(&response).map_err(io::Error::other)?;
        writeln!(stdout, "{rendered}")?;
        stdout.flush()?;
        handled += 1;
    }

    info!(
        requests = handled,
        open_orders = engine.book().order_count(),
        state_root = %hex::encode(engine.state_root()),
        "input closed"
    );
    Ok(())
}
