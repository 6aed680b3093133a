//! Password hashing.
//!
//! Salted, iterated HMAC-SHA-256. The stored format is
//! `hmac-sha256$<iterations>$<salt_b64>$<hash_b64>`, so the scheme and cost
//! can be raised later without invalidating existing hashes.
//!
//! Verification recomputes the derivation and compares through the MAC's
//! constant-time `verify_slice`.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD as B64;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SCHEME: &str = "hmac-sha256";
const ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;

/// Run the derivation and return the final MAC, not yet finalized, so the
/// caller can either extract bytes (hashing) or verify in constant time.
fn derive_mac(password: &str, salt: &[u8], iterations: u32) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(password.as_bytes()).expect("HMAC accepts any key length");
    mac.update(salt);

    let mut block: [u8; 32] = mac.finalize().into_bytes().into();
    for _ in 1..iterations {
        let mut mac =
            HmacSha256::new_from_slice(password.as_bytes()).expect("HMAC accepts any key length");
        mac.update(&block);
        block = mac.finalize().into_bytes().into();
    }

    let mut out =
        HmacSha256::new_from_slice(salt).expect("HMAC accepts any key length");
    out.update(&block);
    out
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);

    let hash: [u8; 32] = derive_mac(password, &salt, ITERATIONS)
        .finalize()
        .into_bytes()
        .into();

    format!(
        "{SCHEME}${ITERATIONS}${}${}",
        B64.encode(salt),
        B64.encode(hash)
    )
}

/// Check a password against a stored hash. Any parse failure is a mismatch.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let parts: Vec<&str> = stored.split('$').collect();
    if parts.len() != 4 || parts[0] != SCHEME {
        return false;
    }
    let Ok(iterations) = parts[1].parse::<u32>() else {
        return false;
    };
    if iterations == 0 {
        return false;
    }
    let Ok(salt) = B64.decode(parts[2]) else {
        return false;
    };
    let Ok(expected) = B64.decode(parts[3]) else {
        return false;
    };

    derive_mac(password, &salt, iterations)
        .verify_slice(&expected)
        .is_ok()
}
