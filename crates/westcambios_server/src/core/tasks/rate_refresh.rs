use crate::core::state::AppState;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info};
use westcambios_sql::base::SqlClient;
use westcambios_sql::schemas::schema::RateRecord;
use westcambios_types::Currency;

/// Background task that periodically pulls the USDT/VES price from the
/// exchange and stores the page average as a fresh rate record.
pub struct RateRefreshTask {
    state: Arc<AppState>,
}

impl RateRefreshTask {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let refresh_interval = Duration::from_secs(self.state.config.rate_refresh_secs);

        info!(
            "Rate refresh task started. Interval: {}s.",
            refresh_interval.as_secs()
        );

        let mut interval = tokio::time::interval(refresh_interval);
        // the first tick completes immediately, consume it so startup does
        // not trigger a fetch
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.refresh_rate().await;
                }
                _ = shutdown_rx.recv() => {
                    info!("Rate refresh task shutting down.");
                    return;
                }
            }
        }
    }

    async fn refresh_rate(&self) {
        let pair = match self.state.market_client.get_usdt_ves_pair().await {
            Ok(pair) => pair,
            Err(e) => {
                error!("Failed to fetch exchange prices: {}", e);
                return;
            }
        };

        info!(
            "Saving exchange rate {} for {}/{}",
            pair.average_price, pair.fiat, pair.asset
        );

        let record = RateRecord::new(Currency::Ves, Currency::Usdt, pair.average_price, None);

        if let Err(e) = self.state.sql_client.insert_rate(&record).await {
            error!("Failed to save exchange rate: {}", e);
        }
    }
}
