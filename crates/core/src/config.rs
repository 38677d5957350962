//! Configuration types shared across crates.

use crate::verify::HashPolicy;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment variable overrides, e.g. `STRATA_CHECK_FIRST=false`
/// or `STRATA_HASH_POLICY__MIN_DIGEST_LEN=32`.
pub const ENV_PREFIX: &str = "STRATA_";

/// Block service configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockServiceConfig {
    /// Skip writes (and network announcements) for blocks the local store
    /// already has. Disable to force every write through to the store.
    #[serde(default = "default_check_first")]
    pub check_first: bool,
    /// Hash security policy applied to every CID.
    #[serde(default)]
    pub hash_policy: HashPolicyConfig,
    /// Local block store settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Hash security policy configuration.
///
/// Values may only tighten the built-in policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HashPolicyConfig {
    /// Minimum digest length in bytes (at least 20).
    #[serde(default = "default_min_digest_len")]
    pub min_digest_len: usize,
    /// Maximum identity digest length in bytes (at most 128).
    #[serde(default = "default_max_identity_len")]
    pub max_identity_len: usize,
    /// Accept SHA1 digests.
    #[serde(default = "default_allow_sha1")]
    pub allow_sha1: bool,
}

/// Local block store configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Re-hash every block read from the store and reject mismatches.
    #[serde(default)]
    pub hash_on_read: bool,
}

fn default_check_first() -> bool {
    true
}

fn default_min_digest_len() -> usize {
    HashPolicy::MIN_DIGEST_LEN
}

fn default_max_identity_len() -> usize {
    HashPolicy::MAX_IDENTITY_LEN
}

fn default_allow_sha1() -> bool {
    true
}

impl Default for BlockServiceConfig {
    fn default() -> Self {
        Self {
            check_first: default_check_first(),
            hash_policy: HashPolicyConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for HashPolicyConfig {
    fn default() -> Self {
        Self {
            min_digest_len: default_min_digest_len(),
            max_identity_len: default_max_identity_len(),
            allow_sha1: default_allow_sha1(),
        }
    }
}

impl HashPolicyConfig {
    /// Build the policy described by this configuration.
    pub fn to_policy(&self) -> crate::Result<HashPolicy> {
        HashPolicy::new(
            self.min_digest_len,
            self.max_identity_len,
            self.allow_sha1,
        )
    }
}

impl BlockServiceConfig {
    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        self.hash_policy
            .to_policy()
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    /// Load configuration from an optional TOML file, then apply
    /// `STRATA_`-prefixed environment overrides (`__` separates sections).
    ///
    /// A missing file is not an error; every field has a default.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let mut figment = Figment::new();

        if let Some(path) = path {
            if path.exists() {
                tracing::info!(config_path = %path.display(), "Loading configuration from file");
                figment = figment.merge(Toml::file(path));
            } else {
                tracing::debug!("No config file found at {}", path.display());
            }
        }

        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| crate::Error::Config(e.to_string()))?;

        config.validate().map_err(crate::Error::Config)?;
        Ok(config)
    }
}
