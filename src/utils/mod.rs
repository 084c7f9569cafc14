pub mod config;
pub mod poll;
pub mod validation;

pub use config::{ClusterType, Config};
pub use poll::{poll_until, PollConfig};
pub use validation::AddressCodec;

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. Call once at startup; repeated
/// calls are ignored.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("solana_wallet_core=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
