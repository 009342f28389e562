//! PKCE (Proof Key for Code Exchange) support for OAuth 2.0.
//!
//! Implements RFC 7636 for binding an authorization code to the session that
//! requested it. Only the `S256` transform is ever produced.

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of random bytes behind a verifier. 32 bytes encode to 43 characters.
const VERIFIER_ENTROPY_BYTES: usize = 32;

/// PKCE code verifier (random string).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PkceVerifier(String);

impl PkceVerifier {
    /// Generate a new random PKCE verifier from the thread-local CSPRNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Generate a verifier from the given cryptographically secure source.
    ///
    /// 256 bits of entropy encoded as URL-safe base64 without padding.
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut random_bytes = [0u8; VERIFIER_ENTROPY_BYTES];
        rng.fill_bytes(&mut random_bytes);
        Self(URL_SAFE_NO_PAD.encode(random_bytes))
    }

    /// Create a PKCE verifier from an existing string.
    pub fn from_string(verifier: String) -> Self {
        Self(verifier)
    }

    /// Get the verifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generate the corresponding code challenge.
    pub fn challenge(&self) -> PkceChallenge {
        PkceChallenge::from_verifier(self)
    }
}

// The verifier is the secret half of the pair.
impl fmt::Debug for PkceVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PkceVerifier([REDACTED])")
    }
}

/// PKCE code challenge (SHA256 hash of verifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PkceChallenge(String);

impl PkceChallenge {
    /// Create a code challenge from a verifier.
    ///
    /// Uses SHA256 hashing and base64url encoding as per RFC 7636.
    pub fn from_verifier(verifier: &PkceVerifier) -> Self {
        let hash = Sha256::digest(verifier.as_str().as_bytes());
        Self(URL_SAFE_NO_PAD.encode(hash))
    }

    /// Get the challenge string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters of the challenge, safe to put in logs.
    pub fn preview(&self) -> &str {
        &self.0[..self.0.len().min(20)]
    }
}

/// Code challenge transform. `plain` is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeMethod {
    S256,
}

impl ChallengeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeMethod::S256 => "S256",
        }
    }
}

/// Proof material for one authorization attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkceParameters {
    pub code_verifier: PkceVerifier,
    pub code_challenge: PkceChallenge,
    pub challenge_method: ChallengeMethod,
}

impl PkceParameters {
    /// Generate a fresh verifier/challenge pair.
    pub fn generate() -> Self {
        Self::from_verifier(PkceVerifier::generate())
    }

    /// Generate a fresh pair from the given random source.
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from_verifier(PkceVerifier::generate_with(rng))
    }

    fn from_verifier(code_verifier: PkceVerifier) -> Self {
        let code_challenge = code_verifier.challenge();
        Self {
            code_verifier,
            code_challenge,
            challenge_method: ChallengeMethod::S256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_pkce_verifier_generation() {
        let verifier = PkceVerifier::generate();
        let len = verifier.as_str().len();
        assert!((43..=128).contains(&len), "unexpected verifier length {len}");
        assert!(verifier
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_pkce_challenge_matches_rfc7636_appendix_b() {
        let verifier =
            PkceVerifier::from_string("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_string());
        assert_eq!(
            verifier.challenge().as_str(),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        use rand::{rngs::StdRng, SeedableRng};

        let first = PkceParameters::generate_with(&mut StdRng::seed_from_u64(7));
        let again = PkceParameters::generate_with(&mut StdRng::seed_from_u64(7));
        let other = PkceParameters::generate_with(&mut StdRng::seed_from_u64(8));

        assert_eq!(first, again);
        assert_ne!(first.code_verifier, other.code_verifier);
        assert_eq!(first.code_verifier.as_str().len(), 43);
        assert_eq!(first.code_challenge, first.code_verifier.challenge());
    }

    #[test]
    fn test_pkce_challenge_deterministic() {
        let verifier = PkceVerifier::from_string("test_verifier".to_string());
        let challenge1 = verifier.challenge();
        let challenge2 = verifier.challenge();
        assert_eq!(challenge1.as_str(), challenge2.as_str());
    }

    #[test]
    fn test_generated_parameters_are_consistent() {
        let pkce = PkceParameters::generate();
        let expected = URL_SAFE_NO_PAD.encode(Sha256::digest(pkce.code_verifier.as_str()));
        assert_eq!(pkce.code_challenge.as_str(), expected);
        assert_eq!(pkce.challenge_method, ChallengeMethod::S256);
        assert_eq!(pkce.challenge_method.as_str(), "S256");
    }

    #[test]
    fn test_verifiers_do_not_collide() {
        let verifiers: HashSet<String> = (0..10_000)
            .map(|_| PkceVerifier::generate().as_str().to_string())
            .collect();
        assert_eq!(verifiers.len(), 10_000);
    }

    #[test]
    fn test_debug_output_redacts_verifier() {
        let pkce = PkceParameters::generate();
        let debug = format!("{:?}", pkce);
        assert!(!debug.contains(pkce.code_verifier.as_str()));
        assert!(debug.contains(pkce.code_challenge.as_str()));
    }

    #[test]
    fn test_parameters_survive_session_serialization() {
        let pkce = PkceParameters::generate();
        let value = serde_json::to_value(&pkce).unwrap();
        assert_eq!(value["challenge_method"], "S256");
        let restored: PkceParameters = serde_json::from_value(value).unwrap();
        assert_eq!(restored, pkce);
    }
}
