//! `hostd` — the nova host daemon.
//!
//! Wires the store, the cron worker, and the TCP command surface
//! together. This binary runs the in-memory store; production
//! deployments swap in a networked store implementation behind the same
//! trait.

use clap::Parser;
use nova_cron::Cron;
use nova_cron::GameArbiter;
use nova_cron::LogRunner;
use nova_game::Config;
use nova_game::Root;
use nova_server::Host;
use nova_store::MemoryStore;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "hostd", about = "nova play-by-email host daemon")]
struct Args {
    /// Address of the command surface.
    #[arg(long, default_value = "127.0.0.1:7777")]
    bind: String,
    /// Cron poll interval in minutes.
    #[arg(long, default_value_t = nova_core::CRON_POLL_INTERVAL)]
    poll_interval: i32,
    /// Seconds per internal minute for user-facing times.
    #[arg(long, default_value_t = 60)]
    user_time_scale: i64,
    /// Directory for the per-launch debug log.
    #[arg(long, default_value = "logs")]
    log_dir: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    nova_core::log_daemon(&args.log_dir)?;

    let config = Config {
        poll_interval: args.poll_interval,
        user_time_scale: args.user_time_scale,
        ..Config::default()
    };
    let root = Arc::new(Root::new(Arc::new(MemoryStore::new()), config));
    let arbiter = Arc::new(GameArbiter::new());

    // Cron worker thread, woken through the root's change line.
    let (tx, rx) = std::sync::mpsc::channel();
    root.subscribe_game_changes(tx);
    let cron = {
        let root = root.clone();
        let arbiter = arbiter.clone();
        std::thread::spawn(move || {
            Cron::new(root, arbiter, Arc::new(LogRunner)).run(rx);
        })
    };

    let host = Arc::new(Host::new(root, arbiter));
    tokio::select! {
        result = nova_server::serve(host, &args.bind) => result?,
        _ = tokio::signal::ctrl_c() => {
            log::info!("[hostd] interrupt received, shutting down");
        }
    }
    drop(cron);
    Ok(())
}
