//! Webhook signature verification.
//!
//! The platform signs each webhook body with HMAC-SHA256 keyed by the channel
//! secret and sends the base64-encoded digest in the `X-Line-Signature`
//! header.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use lynx_core::{WebhookError, WebhookResult};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

fn keyed(secret: &str, body: &[u8]) -> WebhookResult<HmacSha256> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| WebhookError::InvalidSignature)?;
    mac.update(body);
    Ok(mac)
}

/// Computes the signature the platform would send for `body`.
pub fn sign(secret: &str, body: &[u8]) -> WebhookResult<String> {
    let digest = keyed(secret, body)?.finalize().into_bytes();
    Ok(STANDARD.encode(digest))
}

/// Checks `signature` against `body` in constant time.
pub fn verify(secret: &str, body: &[u8], signature: &str) -> WebhookResult<()> {
    let expected = STANDARD
        .decode(signature.trim())
        .map_err(|_| WebhookError::InvalidSignature)?;
    keyed(secret, body)?
        .verify_slice(&expected)
        .map_err(|_| WebhookError::InvalidSignature)
}
