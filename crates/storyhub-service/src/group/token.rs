//! Opaque group invite tokens.

use rand::Rng;

/// Generate a hex token from `bytes` random bytes.
pub fn generate_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes.max(16)];
    rand::thread_rng().fill(buf.as_mut_slice());
    hex::encode(buf)
}
