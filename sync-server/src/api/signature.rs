//! Storefront webhook signature (HMAC-SHA256, base64)

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Header carrying the base64 HMAC of the raw body
pub const HMAC_HEADER: &str = "x-shopify-hmac-sha256";

/// Verify a storefront webhook signature against the raw request body
pub fn verify_webhook_signature(
    payload: &[u8],
    signature: &str,
    secret: &str,
) -> Result<(), &'static str> {
    let expected = STANDARD
        .decode(signature.trim())
        .map_err(|_| "Invalid signature encoding")?;

    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(payload);

    // constant-time comparison
    mac.verify_slice(&expected)
        .map_err(|_| "Webhook signature mismatch")
}

#[cfg(test)]
pub(crate) fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload);
    STANDARD.encode(mac.finalize().into_bytes())
}
