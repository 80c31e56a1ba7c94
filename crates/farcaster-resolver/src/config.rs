use std::env;
use std::time::Duration;

const DEFAULT_API_URL: &str = "https://api.neynar.com";
const DEFAULT_CACHE_DURATION_MS: u64 = 3_600_000;
const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(100);
/// Longest time-to-live the cache accepts
pub(crate) const MAX_CACHE_DURATION: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Process configuration parsed from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub cache_duration: Duration,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = lookup("NEYNAR_API_KEY").unwrap_or_default();

        let api_url = lookup("NEYNAR_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let cache_duration_ms = lookup("CACHE_DURATION")
            .and_then(|ms| ms.trim().parse::<u64>().ok())
            .filter(|&ms| Duration::from_millis(ms) <= MAX_CACHE_DURATION)
            .unwrap_or(DEFAULT_CACHE_DURATION_MS);

        Self {
            api_key,
            api_url,
            cache_duration: Duration::from_millis(cache_duration_ms),
        }
    }

    /// Resolver settings for this process, engine tunables left at their defaults
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            cache_duration: self.cache_duration,
            ..Default::default()
        }
    }
}

/// Tunables for [`NameResolver`](crate::NameResolver)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// How long a resolved identity stays fresh
    pub cache_duration: Duration,
    /// How long a batch stays open for more addresses after the first one joins
    pub debounce_window: Duration,
    /// When set, callers re-read the cache this long after enqueueing instead
    /// of waiting for their batch to finish
    pub poll_delay: Option<Duration>,
    /// When set, addresses with no identity are remembered as misses this long
    pub negative_ttl: Option<Duration>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_duration: Duration::from_millis(DEFAULT_CACHE_DURATION_MS),
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
            poll_delay: None,
            negative_ttl: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.api_key, "");
        assert_eq!(config.api_url, "https://api.neynar.com");
        assert_eq!(config.cache_duration, Duration::from_secs(3600));
    }

    #[test]
    fn test_reads_values() {
        let config = config_from(&[
            ("NEYNAR_API_KEY", "secret"),
            ("NEYNAR_API_URL", "http://localhost:8080"),
            ("CACHE_DURATION", "60000"),
        ]);
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.cache_duration, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_cache_duration_falls_back() {
        let config = config_from(&[("CACHE_DURATION", "an hour")]);
        assert_eq!(config.cache_duration, Duration::from_secs(3600));
    }

    #[test]
    fn test_oversized_cache_duration_falls_back() {
        let config = config_from(&[("CACHE_DURATION", "99999999999999999")]);
        assert_eq!(config.cache_duration, Duration::from_secs(3600));

        let config = config_from(&[("CACHE_DURATION", "3153600000000")]);
        assert_eq!(config.cache_duration, MAX_CACHE_DURATION);
    }

    #[test]
    fn test_resolver_config_carries_cache_duration() {
        let config = config_from(&[("CACHE_DURATION", "5000")]);
        let resolver_config = config.resolver_config();
        assert_eq!(resolver_config.cache_duration, Duration::from_secs(5));
        assert_eq!(resolver_config.debounce_window, Duration::from_millis(100));
        assert!(resolver_config.poll_delay.is_none());
        assert!(resolver_config.negative_ttl.is_none());
    }
}
