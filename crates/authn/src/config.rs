//! Handshake configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Default challenge time-to-live.
pub const DEFAULT_CHALLENGE_TTL: Duration = Duration::from_secs(60);

/// Default bearer token time-to-live.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(4000);

/// Configuration for the API key handshake.
///
/// Durations deserialize from humantime strings (`"60s"`, `"1h 30m"`).
///
/// # Example
///
/// ```
/// use keygate_authn::AuthConfig;
///
/// let config = AuthConfig::builder()
///     .token_secret("a-long-random-hmac-secret".to_owned())
///     .build();
///
/// assert_eq!(config.challenge_ttl.as_secs(), 60);
/// assert_eq!(config.token_ttl.as_secs(), 4000);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// How long an issued challenge stays acceptable.
    #[builder(default = DEFAULT_CHALLENGE_TTL)]
    #[serde(with = "humantime_serde", default = "default_challenge_ttl")]
    pub challenge_ttl: Duration,

    /// How long a minted bearer token stays valid.
    #[builder(default = DEFAULT_TOKEN_TTL)]
    #[serde(with = "humantime_serde", default = "default_token_ttl")]
    pub token_ttl: Duration,

    /// HMAC secret for signing bearer tokens.
    ///
    /// Wrapped in [`Zeroizing`] so the secret is scrubbed from memory
    /// on drop. Never logged; the `Debug` output of this struct must
    /// not be written at levels that reach persistent logs.
    #[builder(into)]
    pub token_secret: Zeroizing<String>,
}

fn default_challenge_ttl() -> Duration {
    DEFAULT_CHALLENGE_TTL
}

fn default_token_ttl() -> Duration {
    DEFAULT_TOKEN_TTL
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = AuthConfig::builder().token_secret("secret".to_owned()).build();
        assert_eq!(config.challenge_ttl, Duration::from_secs(60));
        assert_eq!(config.token_ttl, Duration::from_secs(4000));
    }

    #[rstest::rstest]
    #[case("30s", 30)]
    #[case("1h", 3600)]
    #[case("2m 30s", 150)]
    fn test_deserialize_humantime_durations(#[case] input: &str, #[case] expected_secs: u64) {
        let json = format!(r#"{{"challenge_ttl": "{input}", "token_secret": "secret"}}"#);
        let config: AuthConfig = serde_json::from_str(&json).expect("valid config");
        assert_eq!(config.challenge_ttl, Duration::from_secs(expected_secs));
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: AuthConfig =
            serde_json::from_str(r#"{"token_secret": "secret"}"#).expect("valid config");
        assert_eq!(config.challenge_ttl, DEFAULT_CHALLENGE_TTL);
        assert_eq!(config.token_ttl, DEFAULT_TOKEN_TTL);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<AuthConfig, _> =
            serde_json::from_str(r#"{"token_secret": "secret", "bogus": 1}"#);
        assert!(result.is_err());
    }
}
