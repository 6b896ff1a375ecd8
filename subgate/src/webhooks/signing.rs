//! HMAC-SHA512 webhook signature verification.
//!
//! The gateway signs each webhook delivery with the account's secret key:
//! the signature header carries the hex-encoded HMAC-SHA512 of the raw
//! request body. Verification depends only on the raw bytes; the payload is
//! not parsed before the signature checks out.

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Compute the hex HMAC-SHA512 signature for a payload.
pub fn sign_payload(secret: &[u8], payload: &[u8]) -> String {
    // HMAC accepts keys of any length, so new_from_slice cannot fail
    let mut mac = HmacSha512::new_from_slice(secret).expect("HMAC-SHA512 accepts any key length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a signature header value against the raw request body.
pub fn verify_signature(secret: &[u8], payload: &[u8], signature: &str) -> bool {
    let expected = sign_payload(secret, payload);
    // Use constant-time comparison to prevent timing attacks
    constant_time_eq(expected.as_bytes(), signature.as_bytes())
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
