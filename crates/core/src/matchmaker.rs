//! Simulated walker search.
//!
//! The search waits a fixed delay and always finds the same partner. It
//! runs as a background task reporting over a channel, with a defined
//! timeout; cancellation is dropping the receiver.

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::AppConfig;

/// Events emitted by the asynchronous walker search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    /// A walker was found nearby.
    Found {
        /// Display name of the matched walker.
        partner: String,
    },
    /// The search exceeded its deadline. Unreachable with default settings,
    /// which keep the timeout well above the simulated delay.
    TimedOut,
}

/// Runs one simulated search for a nearby walker.
pub struct Matchmaker {
    partner: String,
    delay: Duration,
    timeout: Duration,
}

impl Matchmaker {
    /// Create a matchmaker with explicit timings.
    pub fn new(partner: impl Into<String>, delay: Duration, timeout: Duration) -> Self {
        Self {
            partner: partner.into(),
            delay,
            timeout,
        }
    }

    /// Build from application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.partner_name.clone(),
            Duration::from_millis(config.match_delay_ms),
            Duration::from_millis(config.match_timeout_ms),
        )
    }

    /// Run the search, sending the outcome to the provided channel. A send
    /// failure means the caller abandoned the search; the task just exits.
    pub async fn run(self, sender: mpsc::Sender<MatchEvent>) -> Result<()> {
        info!(partner = %self.partner, delay_ms = self.delay.as_millis() as u64, "walker search started");
        match tokio::time::timeout(self.timeout, self.search()).await {
            Ok(partner) => {
                info!(partner = %partner, "walker search succeeded");
                if sender.send(MatchEvent::Found { partner }).await.is_err() {
                    debug!("search abandoned before the result was delivered");
                }
            }
            Err(_) => {
                info!(timeout_ms = self.timeout.as_millis() as u64, "walker search timed out");
                let _ = sender.send(MatchEvent::TimedOut).await;
            }
        }
        Ok(())
    }

    async fn search(&self) -> String {
        // Stands in for a geolocation query; there is no real backend.
        tokio::time::sleep(self.delay).await;
        self.partner.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_the_configured_partner() -> Result<()> {
        let (tx, mut rx) = mpsc::channel(1);
        let matchmaker = Matchmaker::new(
            "Sarah D.",
            Duration::from_millis(5),
            Duration::from_millis(500),
        );
        matchmaker.run(tx).await?;
        let event = rx.recv().await.expect("expected a match event");
        assert_eq!(
            event,
            MatchEvent::Found {
                partner: "Sarah D.".to_string()
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn times_out_when_deadline_undercuts_delay() -> Result<()> {
        let (tx, mut rx) = mpsc::channel(1);
        let matchmaker = Matchmaker::new(
            "Sarah D.",
            Duration::from_millis(200),
            Duration::from_millis(5),
        );
        matchmaker.run(tx).await?;
        let event = rx.recv().await.expect("expected a match event");
        assert_eq!(event, MatchEvent::TimedOut);
        Ok(())
    }

    #[tokio::test]
    async fn dropped_receiver_cancels_silently() -> Result<()> {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let matchmaker = Matchmaker::new(
            "Sarah D.",
            Duration::from_millis(5),
            Duration::from_millis(500),
        );
        matchmaker.run(tx).await?;
        Ok(())
    }
}
