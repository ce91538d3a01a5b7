//! BridgeDriver – fixed-cadence tick loop for hosts without a frame loop.
//!
//! Embedders that render frames call [`Bridge::tick`] themselves; everyone
//! else hands the bridge to a driver, which ticks it on a timer until the
//! bridge is torn down or the process receives ctrl-c.

use crate::bridge::Bridge;
use crate::error::BridgeError;
use anyhow::Result;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Tick cadence in Hz. Must be positive and finite.
    pub tick_rate_hz: f32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { tick_rate_hz: 30.0 }
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

pub struct BridgeDriver {
    config: DriverConfig,
    bridge: Arc<Bridge>,
}

impl BridgeDriver {
    pub fn new(config: DriverConfig, bridge: Arc<Bridge>) -> Self {
        Self { config, bridge }
    }

    /// Run the tick loop until the bridge is torn down or ctrl-c arrives.
    ///
    /// On ctrl-c the driver tears the bridge down itself, then waits for
    /// the loop to stop.
    pub async fn run(self) -> Result<()> {
        if !self.config.tick_rate_hz.is_finite() || self.config.tick_rate_hz <= 0.0 {
            anyhow::bail!(
                "tick_rate_hz must be positive, got {}",
                self.config.tick_rate_hz
            );
        }
        let period = Duration::from_secs_f32(1.0 / self.config.tick_rate_hz);
        info!(
            "BridgeDriver ticking every {:?} ({} Hz)",
            period, self.config.tick_rate_hz
        );

        let bridge = Arc::clone(&self.bridge);
        let mut loop_handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(period);
            loop {
                timer.tick().await;
                match bridge.tick() {
                    Ok(activity) => {
                        if !activity.started.is_empty() {
                            debug!("tick {} started {:?}", activity.tick, activity.started);
                        }
                    }
                    Err(BridgeError::NotInitialized) => {
                        // The host may still be booting the engine.
                        debug!("bridge not initialized yet; skipping tick");
                    }
                    Err(BridgeError::TornDown) => {
                        debug!("bridge torn down; stopping tick loop");
                        break;
                    }
                    Err(e) => warn!("bridge tick failed: {}", e),
                }
            }
        });

        tokio::select! {
            _ = &mut loop_handle => {
                info!("BridgeDriver tick loop stopped");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("BridgeDriver shutting down (ctrl-c)");
                self.bridge.teardown();
                let _ = loop_handle.await;
            }
        }
        Ok(())
    }
}
