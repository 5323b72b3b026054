//! # Bridge Pipeline
//!
//! Per-frame evaluation: the selector channel value runs through the rate
//! gate, the frequency policy and the tuner, in that order.
//!
//! Two independent gates bound VTX traffic: the rate gate here limits
//! how often the mapping is re-evaluated at all, and the tuner's
//! only-if-different check limits how often a command actually goes out.
//! Together the module is retuned at most once per gate interval, and only
//! when the selected frequency changes.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::crsf::protocol::RcChannels;
use crate::error::Result;
use crate::vtx::policy::select_frequency;
use crate::vtx::tuner::VtxTuner;

/// Index of the frequency selector channel (the 12th channel, AUX8).
///
/// External contract with the radio setup; changing this silently would
/// retune off the wrong switch.
pub const FREQUENCY_SELECTOR_CHANNEL: usize = 11;

/// Minimum-interval gate.
///
/// Takes the current time explicitly so tests drive it with synthetic
/// instants. The first call always passes; afterwards a call passes once at
/// least the interval has elapsed since the last passed call.
#[derive(Debug)]
pub struct RateGate {
    interval: Duration,
    last_pass: Option<Instant>,
}

impl RateGate {
    /// Creates a gate with the given minimum interval.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_pass: None,
        }
    }

    /// Returns `true` and arms the gate if enough time has passed.
    pub fn try_pass(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_pass {
            if now.duration_since(last) < self.interval {
                return false;
            }
        }

        self.last_pass = Some(now);
        true
    }
}

/// Connects decoded RC channels to the VTX tuner.
pub struct Bridge {
    tuner: VtxTuner,
    gate: RateGate,
}

impl Bridge {
    /// Creates a bridge evaluating at most once per `update_interval`.
    #[must_use]
    pub fn new(tuner: VtxTuner, update_interval: Duration) -> Self {
        Self {
            tuner,
            gate: RateGate::new(update_interval),
        }
    }

    /// Processes one decoded RC channels frame.
    ///
    /// Reads the selector channel, and if the rate gate passes, maps it to
    /// a frequency and asks the tuner to retune. Frames arriving while the
    /// gate is closed are observed (logged) but not acted on.
    ///
    /// # Arguments
    ///
    /// * `channels` - Decoded channel values from one valid frame
    /// * `now` - Current time, used by the rate gate
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A retune command was dispatched
    /// * `Ok(false)` - Gated, or target frequency unchanged
    ///
    /// # Errors
    ///
    /// Returns error if the tuner cannot enqueue a command
    pub async fn handle_channels(&mut self, channels: &RcChannels, now: Instant) -> Result<bool> {
        let value = channels[FREQUENCY_SELECTOR_CHANNEL];
        trace!(
            "Channel {} (AUX8): {}",
            FREQUENCY_SELECTOR_CHANNEL + 1,
            value
        );

        if !self.gate.try_pass(now) {
            return Ok(false);
        }

        let desired_mhz = select_frequency(value);
        self.tuner.retune(desired_mhz).await
    }

    /// Last commanded target frequency, if any.
    #[must_use]
    pub fn last_commanded_mhz(&self) -> Option<u16> {
        self.tuner.last_commanded_mhz()
    }
}
