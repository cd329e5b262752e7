//! Keyed digests for post passwords and ip cloaks.
//!
//! Post passwords are stored and compared as HMAC-SHA256 digests keyed by a
//! deployment secret, so the store never sees the raw password.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex digest of an author-supplied post password.
pub fn digest_post_password(secret: &str, password: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(password.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Short displayable cloak for a raw address. Ten hex chars is enough to
/// tell reporters apart without exposing the address.
pub fn cloak_ip(secret: &str, raw: &str) -> String {
    let mut digest = digest_post_password(secret, raw);
    digest.truncate(10);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_and_keyed() {
        let a = digest_post_password("secret", "hunter2");
        let b = digest_post_password("secret", "hunter2");
        let c = digest_post_password("other", "hunter2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn cloak_is_short() {
        let cloak = cloak_ip("secret", "203.0.113.9");
        assert_eq!(cloak.len(), 10);
    }
}
