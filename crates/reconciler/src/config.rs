use std::fmt;
use std::time::Duration;

use product_store::CollectionLayout;
use vec_index::WeaviateSettings;

use crate::policy::MatchPolicy;

pub const MONGO_URI: &str = "MONGO_URI";
pub const WEAVIATE_HOST: &str = "WEAVIATE_HOST";
pub const WEAVIATE_API_KEY: &str = "WEAVIATE_API_KEY";

/// Keys that must be present (and non-empty) before anything connects.
pub const REQUIRED_KEYS: [&str; 3] = [MONGO_URI, WEAVIATE_HOST, WEAVIATE_API_KEY];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("You must set MONGO_URI, WEAVIATE_HOST & WEAVIATE_API_KEY (missing: {})", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Everything one run needs, validated up front.
#[derive(Clone)]
pub struct SyncConfig {
    pub mongo_uri: String,
    pub weaviate: WeaviateSettings,
    pub layout: CollectionLayout,
    /// Vector index class holding the products.
    pub class_name: String,
    pub match_policy: MatchPolicy,
    pub dry_run: bool,
}

impl SyncConfig {
    /// Reads the required keys through `lookup`. Empty values count as
    /// missing, and every missing key is reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mongo_uri = read(MONGO_URI);
        let host = read(WEAVIATE_HOST);
        let api_key = read(WEAVIATE_API_KEY);

        match (mongo_uri, host, api_key) {
            (Some(mongo_uri), Some(host), Some(api_key)) => Ok(Self {
                mongo_uri,
                weaviate: WeaviateSettings::new(host, api_key),
                layout: CollectionLayout::default(),
                class_name: "Product".to_string(),
                match_policy: MatchPolicy::default(),
                dry_run: false,
            }),
            (mongo_uri, host, api_key) => {
                let missing = REQUIRED_KEYS
                    .iter()
                    .zip([mongo_uri.is_none(), host.is_none(), api_key.is_none()])
                    .filter(|(_, absent)| *absent)
                    .map(|(key, _)| *key)
                    .collect();
                Err(ConfigError::Missing(missing))
            }
        }
    }

    /// Reads the required keys from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_layout(mut self, layout: CollectionLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    pub fn with_match_policy(mut self, match_policy: MatchPolicy) -> Self {
        self.match_policy = match_policy;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.weaviate.scheme = scheme.into();
        self
    }

    pub fn with_http_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.weaviate.timeout = timeout;
        self
    }

    /// Checks the optional settings once they have all been applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_empty = [
            ("database", &self.layout.database),
            ("collection", &self.layout.collection),
            ("name-field", &self.layout.name_field),
            ("cross-ref-field", &self.layout.cross_ref_field),
            ("class", &self.class_name),
        ];
        for (key, value) in non_empty {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "must not be empty".to_string(),
                });
            }
        }
        if self.weaviate.scheme != "https" && self.weaviate.scheme != "http" {
            return Err(ConfigError::Invalid {
                key: "scheme",
                reason: format!("expected http or https, got '{}'", self.weaviate.scheme),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("mongo_uri", &"<redacted>")
            .field("weaviate", &self.weaviate)
            .field("layout", &self.layout)
            .field("class_name", &self.class_name)
            .field("match_policy", &self.match_policy)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_all_keys_present() {
        let config = SyncConfig::from_lookup(lookup_from(&[
            (MONGO_URI, "mongodb://localhost:27017/shop"),
            (WEAVIATE_HOST, "demo.weaviate.network"),
            (WEAVIATE_API_KEY, "key"),
        ]))
        .unwrap();

        assert_eq!(config.mongo_uri, "mongodb://localhost:27017/shop");
        assert_eq!(config.weaviate.host, "demo.weaviate.network");
        assert_eq!(config.class_name, "Product");
        assert_eq!(config.layout.cross_ref_field, "weaviateId");
        assert_eq!(config.match_policy, MatchPolicy::FirstReturned);
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reports_every_missing_key() {
        let err = SyncConfig::from_lookup(lookup_from(&[(WEAVIATE_HOST, "h")])).unwrap_err();
        match err {
            ConfigError::Missing(keys) => assert_eq!(keys, vec![MONGO_URI, WEAVIATE_API_KEY]),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_empty_value_is_missing() {
        let err = SyncConfig::from_lookup(lookup_from(&[
            (MONGO_URI, "mongodb://localhost"),
            (WEAVIATE_HOST, "h"),
            (WEAVIATE_API_KEY, "   "),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("missing: WEAVIATE_API_KEY"));
    }

    #[test]
    fn test_validate_rejects_bad_overrides() {
        let config = SyncConfig::from_lookup(lookup_from(&[
            (MONGO_URI, "mongodb://localhost"),
            (WEAVIATE_HOST, "h"),
            (WEAVIATE_API_KEY, "k"),
        ]))
        .unwrap();

        let bad_class = config.clone().with_class_name("");
        assert!(matches!(
            bad_class.validate(),
            Err(ConfigError::Invalid { key: "class", .. })
        ));

        let bad_scheme = config.with_scheme("ftp");
        assert!(matches!(
            bad_scheme.validate(),
            Err(ConfigError::Invalid { key: "scheme", .. })
        ));
    }

    #[test]
    fn test_debug_hides_credentials() {
        let config = SyncConfig::from_lookup(lookup_from(&[
            (MONGO_URI, "mongodb://admin:hunter2@db"),
            (WEAVIATE_HOST, "h"),
            (WEAVIATE_API_KEY, "wv-secret"),
        ]))
        .unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("wv-secret"));
    }
}
