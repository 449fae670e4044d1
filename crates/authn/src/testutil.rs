//! Test helpers: key generation and error assertions.
//!
//! Enabled by the `testutil` feature so downstream test suites can
//! generate key pairs without shipping keygen in production builds.

use rsa::{
    pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding},
    RsaPrivateKey,
};
use zeroize::Zeroizing;

/// RSA modulus size used for generated test keys.
pub const TEST_KEY_BITS: usize = 2048;

/// A freshly generated RSA key pair in PEM form.
pub struct KeyPair {
    /// PKCS#8 private key PEM.
    pub private_pem: Zeroizing<String>,
    /// SPKI public key PEM, as the server stores it.
    pub public_pem: String,
}

/// Generates a fresh RSA-2048 key pair.
///
/// Keygen is the slowest part of most test suites here; reuse the pair
/// within a test unless the test is specifically about key isolation.
///
/// # Panics
///
/// Panics on keygen or encoding failure, which only happens if the
/// process is out of entropy or memory.
#[must_use]
#[allow(clippy::expect_used)]
pub fn generate_keypair() -> KeyPair {
    let private = RsaPrivateKey::new(&mut rand::thread_rng(), TEST_KEY_BITS).expect("RSA keygen");
    let public_pem =
        private.to_public_key().to_public_key_pem(LineEnding::LF).expect("encode public key");
    let private_pem = Zeroizing::new(
        private.to_pkcs8_pem(LineEnding::LF).expect("encode private key").to_string(),
    );
    KeyPair { private_pem, public_pem }
}

/// Asserts that a result is an `Err` matching the given [`crate::AuthError`]
/// pattern.
///
/// ```
/// use keygate_authn::{assert_auth_error, AuthError, AuthResult};
///
/// let result: AuthResult<()> = Err(AuthError::ChallengeExpired);
/// assert_auth_error!(result, AuthError::ChallengeExpired);
/// ```
#[macro_export]
macro_rules! assert_auth_error {
    ($result:expr, $pattern:pat $(if $guard:expr)? $(,)?) => {
        match $result {
            Err($pattern) $(if $guard)? => {}
            Err(other) => panic!("unexpected error variant: {other:?}"),
            Ok(_) => panic!("expected {}, got Ok", stringify!($pattern)),
        }
    };
}
