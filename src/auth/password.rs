//! Salted password hashing.
//!
//! PBKDF2-HMAC-SHA256 with a 16-byte random salt and a 32-byte output key.
//! Verification compares in constant time.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes.
pub const KEY_LEN: usize = 32;

/// Iteration count used unless configured otherwise.
pub const DEFAULT_ROUNDS: u32 = 100_000;

/// Fresh salt from the operating system's CSPRNG.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive the password key. CPU-bound; call from a blocking context.
pub fn derive_key(password: &str, salt: &[u8], rounds: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut key);
    key
}

/// Re-derive with `salt` and compare against `expected` in constant time.
pub fn verify(password: &str, salt: &[u8], expected: &[u8], rounds: u32) -> bool {
    let derived = derive_key(password, salt, rounds);
    derived.as_slice().ct_eq(expected).into()
}
