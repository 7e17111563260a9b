//! Scheduled auto-save purchases on Coinone.
//!
//! This crate provides the job the runner binary executes:
//!
//! - **AutoSaver**: prices, places and confirms one market buy, then reports it
//! - **DailySchedule**: once-a-day trigger timing for daemon mode
//! - **DryRunExecutor**: simulated fills for rehearsal runs
//! - **report**: the Discord message layout
//!
//! # Flow
//!
//! ```text
//! ┌────────────┐   best ask   ┌──────────────────┐
//! │ AutoSaver  │─────────────>│ CoinoneRest      │
//! │ run_once() │   market buy │ - ticker         │
//! │            │─────────────>│ - order          │
//! │            │ detail, bal. │ - order/detail   │
//! │            │<─────────────│ - balance        │
//! └────────────┘              └──────────────────┘
//!        │ report
//!        v
//! ┌────────────┐
//! │  Notifier  │
//! └────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use auto_saver::AutoSaver;
//!
//! let saver = AutoSaver::new(client, notifier, config);
//! match saver.run_once().await? {
//!     RunOutcome::Filled(detail) => println!("bought {}", detail.executed_qty),
//!     RunOutcome::Rejected { reason } => eprintln!("rejected: {reason}"),
//!     RunOutcome::DryRun(_) => {}
//! }
//! ```

mod dry_run;
mod error;
pub mod report;
mod saver;
mod schedule;

pub use dry_run::DryRunExecutor;
pub use error::SaverError;
pub use saver::{limit_price, AutoSaver, RunOutcome, SaverTiming};
pub use schedule::DailySchedule;
