//! # CRSF Stream Decoder
//!
//! Extracts and validates CRSF frames from the receiver's raw byte stream
//! and unpacks RC channels payloads.

use bytes::{Buf, BytesMut};

use super::crc::crc8_dvb_s2;
use super::protocol::*;
use crate::error::{Result, VtxBridgeError};

/// Accumulates raw serial bytes and yields complete CRSF frames.
///
/// The receiver delivers bytes in arbitrary chunks; this buffer scans to the
/// next sync byte, discards anything before it, and hands out one frame at a
/// time once enough bytes have arrived.
///
/// # Examples
///
/// ```
/// use vtx_bridge::crsf::decoder::FrameBuffer;
///
/// let mut frames = FrameBuffer::new();
/// frames.extend(&[0x00, 0xC8]); // garbage + start of a frame
/// assert!(frames.next_frame().is_none()); // incomplete
/// ```
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: BytesMut,
}

impl FrameBuffer {
    /// Creates an empty frame buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Appends raw bytes read from the serial port.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Extracts the next complete frame, if any.
    ///
    /// Bytes preceding a sync byte are discarded silently. A structurally
    /// complete frame that fails validation is consumed and returned as an
    /// error, so the caller can log it and keep going.
    ///
    /// # Returns
    ///
    /// * `None` - Not enough bytes buffered for a complete frame
    /// * `Some(Ok(frame))` - A validated frame
    /// * `Some(Err(_))` - A complete but invalid frame (e.g. CRC mismatch)
    pub fn next_frame(&mut self) -> Option<Result<CrsfFrame>> {
        loop {
            // Seek to the sync byte
            while !self.buf.is_empty() && self.buf[0] != CRSF_SYNC_BYTE {
                self.buf.advance(1);
            }

            if self.buf.len() < 2 {
                return None;
            }

            let length = self.buf[1];

            // An implausible length field means the sync byte was payload
            // data from a corrupted stream. Drop it and rescan.
            if !(CRSF_MIN_FRAME_LENGTH..=CRSF_MAX_FRAME_LENGTH).contains(&length) {
                self.buf.advance(1);
                continue;
            }

            let total = 2 + length as usize;
            if self.buf.len() < total {
                return None;
            }

            let frame = self.buf.split_to(total);
            return Some(decode_frame(&frame));
        }
    }
}

/// Decode a complete CRSF frame
///
/// # Arguments
///
/// * `frame` - Complete CRSF frame bytes (including sync, length, type, payload, crc)
///
/// # Errors
///
/// Returns error if:
/// - Frame is too short
/// - Sync byte is incorrect
/// - CRC check fails
pub fn decode_frame(frame: &[u8]) -> Result<CrsfFrame> {
    // Minimum frame size: sync(1) + length(1) + type(1) + crc(1) = 4 bytes
    if frame.len() < 4 {
        return Err(VtxBridgeError::CrsfProtocol("Frame too short".to_string()));
    }

    if frame[0] != CRSF_SYNC_BYTE {
        return Err(VtxBridgeError::CrsfProtocol(format!(
            "Invalid sync byte: 0x{:02X}",
            frame[0]
        )));
    }

    let length = frame[1] as usize;

    // Frame should be: sync(1) + length(1) + [length bytes]
    // where [length bytes] = type(1) + payload(N) + crc(1)
    if frame.len() < 2 + length {
        return Err(VtxBridgeError::CrsfProtocol(format!(
            "Frame too short: expected {} bytes, got {}",
            2 + length,
            frame.len()
        )));
    }

    let received_crc = frame[1 + length];

    // CRC covers Type + Payload (everything between the length field and the
    // CRC itself); the sync and length bytes are excluded on the wire.
    let data_for_crc = &frame[2..1 + length];
    let calculated_crc = crc8_dvb_s2(data_for_crc);

    if calculated_crc != received_crc {
        return Err(VtxBridgeError::CrsfProtocol(format!(
            "CRC mismatch: expected 0x{:02X}, got 0x{:02X}",
            calculated_crc, received_crc
        )));
    }

    let frame_type = frame[2];
    let payload = frame[3..1 + length].to_vec();

    CrsfFrame::new(frame_type, payload)
}

/// Decode an RC channels payload into 16 channel values
///
/// Unpacks 22 bytes into 16 channels of 11 bits each. Channels are packed
/// as a continuous bitstream, LSB first:
///
/// ```text
/// Byte 0: Ch1[0:7]
/// Byte 1: Ch1[8:10] | Ch2[0:4]
/// Byte 2: Ch2[5:10] | Ch3[0:1]
/// ...
/// ```
///
/// # Arguments
///
/// * `payload` - RC channels payload (exactly 22 bytes)
///
/// # Errors
///
/// Returns error if the payload is not exactly 22 bytes
pub fn decode_rc_channels(payload: &[u8]) -> Result<RcChannels> {
    if payload.len() != CRSF_RC_CHANNELS_PAYLOAD_SIZE {
        return Err(VtxBridgeError::CrsfProtocol(format!(
            "RC channels payload must be {} bytes, got {}",
            CRSF_RC_CHANNELS_PAYLOAD_SIZE,
            payload.len()
        )));
    }

    let mut channels = [0u16; CRSF_NUM_CHANNELS];
    let mut bit_index = 0;

    for channel in channels.iter_mut() {
        let mut value: u16 = 0;

        for bit in 0..11 {
            let byte_index = bit_index / 8;
            let bit_offset = bit_index % 8;

            if (payload[byte_index] >> bit_offset) & 1 == 1 {
                value |= 1 << bit;
            }
            bit_index += 1;
        }

        *channel = value;
    }

    Ok(channels)
}
