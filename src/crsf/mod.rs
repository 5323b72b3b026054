//! # CRSF Protocol Module
//!
//! Implementation of the Crossfire (CRSF) protocol as spoken by an
//! ExpressLRS receiver on its serial output.
//!
//! This module handles:
//! - Frame synchronization and validation on a raw byte stream
//! - RC channels packet decoding (16 channels, 11-bit resolution)
//! - CRC8-DVB-S2 checksum calculation

pub mod crc;
pub mod decoder;
pub mod protocol;
