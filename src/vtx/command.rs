//! # SteadyView X Command Framing
//!
//! Builds the 6-byte set-frequency command frame the module expects on its
//! serial line:
//!
//! ```text
//! [STX, length, command, code, checksum, ETX]
//! [0x02, 0x06, 0x31, code, 0x06^0x31^code, 0x03]
//! ```
//!
//! The checksum XORs bytes 1..=3 only (length, command and code), not the
//! whole frame. The module rejects frames with any other coverage.

/// Frame start byte (STX)
pub const VTX_FRAME_HEADER: u8 = 0x02;

/// Frame length byte
pub const VTX_FRAME_LENGTH: u8 = 0x06;

/// Set-frequency command id
pub const VTX_CMD_SET_FREQUENCY: u8 = 0x31;

/// Frame end byte (ETX)
pub const VTX_FRAME_FOOTER: u8 = 0x03;

/// Total frame size in bytes
pub const VTX_FRAME_SIZE: usize = 6;

/// A built set-frequency frame, ready for the serial line.
pub type VtxCommandFrame = [u8; VTX_FRAME_SIZE];

/// XOR checksum over the length, command and code bytes.
#[must_use]
pub fn checksum(code: u8) -> u8 {
    VTX_FRAME_LENGTH ^ VTX_CMD_SET_FREQUENCY ^ code
}

/// Builds the set-frequency frame for a device code.
///
/// # Examples
///
/// ```
/// use vtx_bridge::vtx::command::set_frequency_frame;
///
/// // Code 0 selects band A channel 1 (5865 MHz)
/// assert_eq!(set_frequency_frame(0x00), [0x02, 0x06, 0x31, 0x00, 0x37, 0x03]);
/// ```
#[must_use]
pub fn set_frequency_frame(code: u8) -> VtxCommandFrame {
    [
        VTX_FRAME_HEADER,
        VTX_FRAME_LENGTH,
        VTX_CMD_SET_FREQUENCY,
        code,
        checksum(code),
        VTX_FRAME_FOOTER,
    ]
}
