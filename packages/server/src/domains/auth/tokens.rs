//! Opaque refresh tokens: random bytes, hex-encoded, persisted server-side.

use rand::rngs::OsRng;
use rand::RngCore;

/// 32 bytes = 256 bits of entropy.
const REFRESH_TOKEN_BYTES: usize = 32;

pub fn new_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
