//! PKCE verifier/challenge generation and anti-CSRF state tokens.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};

use super::error::AuthError;

/// Unreserved URL characters allowed in a code verifier (RFC 7636 §4.1).
const VERIFIER_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-._~";
pub const VERIFIER_LENGTH: usize = 64;
pub const STATE_BYTES: usize = 32;

/// Per-attempt PKCE state. Consumed by exactly one code exchange.
#[derive(Debug, Clone)]
pub struct PkceSession {
    pub code_verifier: String,
    pub state: String,
}

impl PkceSession {
    /// Generate a fresh verifier and state.
    pub fn generate() -> Result<Self, AuthError> {
        Ok(Self {
            code_verifier: generate_code_verifier(),
            state: generate_state(STATE_BYTES)?,
        })
    }

    pub fn code_challenge(&self) -> String {
        generate_code_challenge(&self.code_verifier)
    }

    /// Compare a returned `state` against the issued one.
    pub fn state_matches(&self, returned: &str) -> bool {
        constant_time_eq(self.state.as_bytes(), returned.as_bytes())
    }
}

pub fn generate_code_verifier() -> String {
    let mut rng = OsRng;
    (0..VERIFIER_LENGTH)
        .map(|_| VERIFIER_ALPHABET[rng.gen_range(0..VERIFIER_ALPHABET.len())] as char)
        .collect()
}

/// `BASE64URL(SHA256(verifier))` without padding.
pub fn generate_code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

pub fn generate_state(byte_count: usize) -> Result<String, AuthError> {
    let mut buf = vec![0u8; byte_count];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|_| AuthError::StateGenerationFailed)?;
    Ok(URL_SAFE_NO_PAD.encode(buf))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
