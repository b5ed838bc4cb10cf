//! Prefixed identifier and opaque secret generation
//!
//! Identifiers are Stripe-style prefixed strings (`usr_`, `app_`, `tok_`,
//! `fla_`) with at least 96 bits of entropy, base64 URL-safe encoded without
//! padding. Secrets (token values, API keys) carry at least 256 bits.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};

/// Number of random bytes in a generated identifier (96 bits).
const ID_BYTES: usize = 12;

/// Number of random bytes in a generated secret (256 bits).
const SECRET_BYTES: usize = 32;

/// Generate a prefixed ID with 96 bits of entropy.
///
/// The ID format is `{prefix}_{random}` where the random part is base64
/// URL-safe without padding.
pub fn generate_prefixed_id(prefix: &str) -> String {
    let mut bytes = [0u8; ID_BYTES];
    OsRng.try_fill_bytes(&mut bytes).unwrap();

    let encoded = BASE64_URL_SAFE_NO_PAD.encode(bytes);

    format!("{prefix}_{encoded}")
}

/// Generate an opaque secret suitable for token values and API keys.
///
/// Secrets are unprefixed and carry 256 bits of entropy, base64 URL-safe
/// encoded. They are meant to be stored and compared verbatim, never parsed.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.try_fill_bytes(&mut bytes).unwrap();

    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

/// Validate that a prefixed ID has the expected prefix and enough entropy.
pub fn validate_prefixed_id(id: &str, expected_prefix: &str) -> bool {
    let Some((prefix, random_part)) = id.split_once('_') else {
        return false;
    };

    if prefix != expected_prefix {
        return false;
    }

    match BASE64_URL_SAFE_NO_PAD.decode(random_part) {
        Ok(decoded) => decoded.len() >= ID_BYTES,
        Err(_) => false,
    }
}

/// Extract the prefix from a prefixed ID, if any.
pub fn extract_prefix(id: &str) -> Option<&str> {
    id.split_once('_').map(|(prefix, _)| prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_prefixed_id() {
        let id = generate_prefixed_id("usr");
        assert!(id.starts_with("usr_"));
        assert!(validate_prefixed_id(&id, "usr"));

        // Ensure uniqueness
        let id2 = generate_prefixed_id("usr");
        assert_ne!(id, id2);
    }

    #[test]
    fn test_validate_prefixed_id() {
        let id = generate_prefixed_id("tok");
        assert!(validate_prefixed_id(&id, "tok"));
        assert!(!validate_prefixed_id(&id, "usr"));

        assert!(!validate_prefixed_id("tok", "tok"));
        assert!(!validate_prefixed_id("tok_", "tok"));
        assert!(!validate_prefixed_id("tok_invalid!", "tok"));
        // Too little entropy
        assert!(!validate_prefixed_id("tok_dGVzdA", "tok"));
    }

    #[test]
    fn test_generate_secret() {
        let secret = generate_secret();
        let decoded = BASE64_URL_SAFE_NO_PAD.decode(&secret).unwrap();
        assert_eq!(decoded.len(), SECRET_BYTES);
        assert_ne!(secret, generate_secret());
    }

    #[test]
    fn test_extract_prefix() {
        assert_eq!(extract_prefix("usr_abc123"), Some("usr"));
        assert_eq!(extract_prefix("fla_xyz789"), Some("fla"));
        assert_eq!(extract_prefix("noprefix"), None);
    }

    #[test]
    fn test_id_is_url_safe() {
        let id = generate_prefixed_id("app");
        assert!(
            id.chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        );
    }
}
