// ABOUTME: Configuration and environment variable helpers for OpsDesk
// ABOUTME: Variable names plus typed lookups with logged fallbacks

pub mod constants;

use std::env;
use std::str::FromStr;

use tracing::warn;

/// Read the first set variable among `names`, in order
pub fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()))
}

/// Parse an environment variable, falling back to `default` when unset or unparsable
pub fn env_parse_or<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Debug,
{
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "Ignoring invalid value '{}' for {}, using default {:?}",
                    raw, name, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_or_uses_default_for_missing() {
        let value: u32 = env_parse_or("OPSDESK_TEST_SURELY_UNSET_VAR", 7);
        assert_eq!(value, 7);
    }

    #[test]
    fn test_env_parse_or_falls_back_on_garbage() {
        env::set_var("OPSDESK_TEST_GARBAGE_VAR", "not-a-number");
        let value: u32 = env_parse_or("OPSDESK_TEST_GARBAGE_VAR", 3);
        assert_eq!(value, 3);
        env::remove_var("OPSDESK_TEST_GARBAGE_VAR");
    }

    #[test]
    fn test_first_env_prefers_earlier_names() {
        env::set_var("OPSDESK_TEST_FIRST_A", "a");
        env::set_var("OPSDESK_TEST_FIRST_B", "b");
        assert_eq!(
            first_env(&["OPSDESK_TEST_FIRST_A", "OPSDESK_TEST_FIRST_B"]),
            Some("a".to_string())
        );
        env::remove_var("OPSDESK_TEST_FIRST_A");
        assert_eq!(
            first_env(&["OPSDESK_TEST_FIRST_A", "OPSDESK_TEST_FIRST_B"]),
            Some("b".to_string())
        );
        env::remove_var("OPSDESK_TEST_FIRST_B");
    }
}
