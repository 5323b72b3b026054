//! # VTX Tuner
//!
//! Owns the "last commanded frequency" state and decides when a retune
//! command actually goes out.

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::command::{set_frequency_frame, VtxCommandFrame};
use super::table::FrequencyTable;
use crate::error::{Result, VtxBridgeError};

/// Retune state machine.
///
/// A retune request for the frequency that was last commanded is a no-op:
/// nothing is enqueued and the state is untouched. A changed target is
/// resolved through the frequency table, framed, and handed to the sender
/// task. The rate gate that bounds how often requests arrive lives in the
/// caller ([`Bridge`](crate::bridge::Bridge)), not here.
///
/// The state is owned by the instance rather than being process-global, so
/// tests construct a fresh tuner per case.
#[derive(Debug)]
pub struct VtxTuner {
    table: FrequencyTable,
    commands: mpsc::Sender<VtxCommandFrame>,
    /// Last commanded target frequency; `None` until the first retune
    last_commanded_mhz: Option<u16>,
}

impl VtxTuner {
    /// Creates a tuner that enqueues frames on `commands`.
    #[must_use]
    pub fn new(table: FrequencyTable, commands: mpsc::Sender<VtxCommandFrame>) -> Self {
        Self {
            table,
            commands,
            last_commanded_mhz: None,
        }
    }

    /// Retunes the module to `target_mhz` if it differs from the last
    /// commanded frequency.
    ///
    /// The target is snapped to the nearest supported frequency and its
    /// device code; the resulting frame goes to the sender task. The first
    /// call after startup always sends.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A command frame was dispatched
    /// * `Ok(false)` - Target unchanged, nothing sent
    ///
    /// # Errors
    ///
    /// Returns error if the sender task is gone and the frame cannot be
    /// enqueued
    pub async fn retune(&mut self, target_mhz: u16) -> Result<bool> {
        if self.last_commanded_mhz == Some(target_mhz) {
            debug!("VTX already tuned for {} MHz, nothing to do", target_mhz);
            return Ok(false);
        }

        let (frequency, code) = self.table.code_for_nearest(target_mhz);
        let frame = set_frequency_frame(code);

        self.commands
            .send(frame)
            .await
            .map_err(|_| VtxBridgeError::Command("command channel closed".to_string()))?;

        self.last_commanded_mhz = Some(target_mhz);
        info!("Set freq: {} MHz, code: {}", frequency, code);

        Ok(true)
    }

    /// Last commanded target frequency, if any.
    #[must_use]
    pub fn last_commanded_mhz(&self) -> Option<u16> {
        self.last_commanded_mhz
    }
}
