//! Random identifiers handed out to clients: access codes and link tokens.

use rand::RngCore;

/// Hex-encode `len` bytes from the thread-local CSPRNG.
pub fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
