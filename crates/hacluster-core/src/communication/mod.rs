//! Remote actions understood by node agents

pub mod booth;
pub mod corosync;
pub mod qdevice;
pub mod services;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encode binary payloads for form parameters
pub(crate) fn encode_binary(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode a base64 response body, ignoring surrounding whitespace
pub(crate) fn decode_binary(data: &str) -> Option<Vec<u8>> {
    STANDARD.decode(data.trim()).ok()
}
