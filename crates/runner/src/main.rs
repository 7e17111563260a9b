use auth::ApiCredentials;
use auto_saver::{AutoSaver, DailySchedule, RunOutcome};
use coinone_rest::CoinoneRestClient;
use common::AutoSaveConfig;
use notifier::{DiscordNotifier, LogNotifier, Notifier};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

const USAGE: &str = "\
Usage: coinone-autosave [--dry-run] [--daemon]

Buys AMOUNT of HOLD_CURRENCY worth of BUY_CURRENCY on Coinone and reports
the result to DISCORD_WEBHOOK_URL.

  --dry-run   price and report the order without placing it
  --daemon    stay running and buy once a day at SCHEDULE_AT (UTC)";

/// Command-line options.
#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    dry_run: bool,
    daemon: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Option<Options>, String> {
    let mut options = Options::default();
    for arg in args {
        match arg.as_str() {
            "--dry-run" => options.dry_run = true,
            "--daemon" => options.daemon = true,
            "-h" | "--help" => return Ok(None),
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    Ok(Some(options))
}

#[tokio::main]
async fn main() -> ExitCode {
    common::init_logging();

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(Some(options)) => options,
        Ok(None) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    let saver = match build_saver(&options) {
        Ok(saver) => saver,
        Err(e) => {
            error!(error = %e, "Failed to start");
            return ExitCode::FAILURE;
        }
    };

    if options.daemon {
        run_daemon(saver).await
    } else {
        exit_code(run_once(&saver).await)
    }
}

fn build_saver(options: &Options) -> Result<AutoSaver, Box<dyn std::error::Error>> {
    let mut config = AutoSaveConfig::from_env()?;
    config.dry_run |= options.dry_run;

    let credentials = ApiCredentials::from_env()?;
    let client = CoinoneRestClient::new(credentials)?;

    let notifier: Arc<dyn Notifier> = match &config.webhook_url {
        Some(url) => Arc::new(DiscordNotifier::new(url)?),
        None => {
            warn!("DISCORD_WEBHOOK_URL not set, reports go to the log only");
            Arc::new(LogNotifier)
        }
    };

    info!(
        pair = %config.pair,
        amount = %config.amount,
        max_slippage_pct = %config.max_slippage_pct,
        dry_run = config.dry_run,
        "Configuration loaded"
    );

    Ok(AutoSaver::new(client, notifier, config))
}

async fn run_once(saver: &AutoSaver) -> bool {
    match saver.run_once().await {
        Ok(RunOutcome::Filled(detail)) => {
            info!(order_id = %detail.order_id, status = %detail.status, "Order placed");
            true
        }
        Ok(RunOutcome::DryRun(detail)) => {
            info!(executed_qty = %detail.executed_qty, "Dry run finished");
            true
        }
        Ok(RunOutcome::Rejected { reason }) => {
            error!(reason = %reason, "Order rejected");
            false
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            false
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Run at every daily fire time until Ctrl+C.
///
/// A failed run is logged and the loop keeps going.
async fn run_daemon(saver: AutoSaver) -> ExitCode {
    let schedule = DailySchedule::new(saver.config().schedule_at);

    // Create shutdown signal channel
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, initiating shutdown");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!(error = %e, "Failed to listen for Ctrl+C"),
        }
    });

    info!(cron = %schedule.cron_expression(), "Starting auto-save daemon");

    let mut shutdown_armed = true;
    loop {
        let now = chrono::Utc::now();
        let next = schedule.next_after(now);
        info!(next_run = %next, "Waiting for next run");

        tokio::select! {
            _ = tokio::time::sleep(schedule.until_next(now)) => {
                run_once(&saver).await;
            }
            _ = shutdown_requested(&mut shutdown_rx, &mut shutdown_armed) => break,
        }
    }

    info!("Shutdown complete");
    ExitCode::SUCCESS
}

/// Resolves once shutdown is requested.
///
/// If the sender goes away without requesting it, `armed` is cleared and
/// this never resolves, so the daemon keeps to its schedule.
async fn shutdown_requested(shutdown_rx: &mut watch::Receiver<bool>, armed: &mut bool) {
    while *armed {
        if shutdown_rx.changed().await.is_err() {
            warn!("Shutdown signal unavailable, daemon runs until killed");
            *armed = false;
        } else if *shutdown_rx.borrow() {
            return;
        }
    }
    std::future::pending::<()>().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_args_is_single_run() {
        assert_eq!(parse_args(args(&[])), Ok(Some(Options::default())));
    }

    #[test]
    fn test_flags() {
        assert_eq!(
            parse_args(args(&["--daemon", "--dry-run"])),
            Ok(Some(Options {
                dry_run: true,
                daemon: true
            }))
        );
    }

    #[test]
    fn test_help() {
        assert_eq!(parse_args(args(&["--help"])), Ok(None));
    }

    #[test]
    fn test_unknown_arg() {
        assert!(parse_args(args(&["--sell"])).is_err());
    }

    #[tokio::test]
    async fn test_shutdown_requested_on_signal() {
        let (tx, mut rx) = watch::channel(false);
        let mut armed = true;
        tx.send(true).unwrap();

        tokio::time::timeout(
            Duration::from_secs(1),
            shutdown_requested(&mut rx, &mut armed),
        )
        .await
        .unwrap();
        assert!(armed);
    }

    #[tokio::test]
    async fn test_dropped_signal_keeps_daemon_running() {
        let (tx, mut rx) = watch::channel(false);
        let mut armed = true;
        drop(tx);

        let waited = tokio::time::timeout(
            Duration::from_millis(50),
            shutdown_requested(&mut rx, &mut armed),
        )
        .await;
        assert!(waited.is_err());
        assert!(!armed);
    }
}
