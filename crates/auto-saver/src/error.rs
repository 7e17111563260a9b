//! Auto-saver error types.

use coinone_rest::CoinoneRestError;
use thiserror::Error;

/// Errors that abort an auto-save run.
#[derive(Debug, Error)]
pub enum SaverError {
    /// Exchange call failed.
    #[error("exchange error: {0}")]
    Exchange(#[from] CoinoneRestError),

    /// The exchange has the order but its detail never came back.
    #[error("order {order_id} placed but detail unavailable: {source}")]
    DetailUnavailable {
        order_id: String,
        #[source]
        source: CoinoneRestError,
    },
}
