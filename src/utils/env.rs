/// Get environment variable with TIDEWAY_ prefix, falling back to unprefixed version
///
/// Checks `TIDEWAY_{key}` first, then `{key}`, so impersonation settings can
/// live next to the rest of an application's Tideway configuration.
///
/// # Examples
///
/// ```rust
/// use tideway_impersonate::utils::get_env_with_prefix;
///
/// // Checks TIDEWAY_IMPERSONATE_SESSION_KEY first, then IMPERSONATE_SESSION_KEY
/// let key = get_env_with_prefix("IMPERSONATE_SESSION_KEY");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("TIDEWAY_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}

/// Parse a boolean flag from the environment, ignoring unparseable values.
pub fn get_env_bool(key: &str) -> Option<bool> {
    get_env_with_prefix(key).and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_with_prefix() {
        unsafe {
            std::env::set_var("TIDEWAY_ENV_TEST_PREFIXED", "prefixed_value");
            std::env::set_var("ENV_TEST_PREFIXED", "unprefixed_value");
        }
        assert_eq!(
            get_env_with_prefix("ENV_TEST_PREFIXED"),
            Some("prefixed_value".to_string())
        );
        unsafe {
            std::env::remove_var("TIDEWAY_ENV_TEST_PREFIXED");
        }
        assert_eq!(
            get_env_with_prefix("ENV_TEST_PREFIXED"),
            Some("unprefixed_value".to_string())
        );
        unsafe {
            std::env::remove_var("ENV_TEST_PREFIXED");
        }

        assert_eq!(get_env_with_prefix("ENV_TEST_NON_EXISTENT"), None);
    }

    #[test]
    fn test_get_env_bool() {
        unsafe {
            std::env::set_var("TIDEWAY_ENV_TEST_FLAG", "true");
            std::env::set_var("TIDEWAY_ENV_TEST_GARBAGE", "yes please");
        }
        assert_eq!(get_env_bool("ENV_TEST_FLAG"), Some(true));
        assert_eq!(get_env_bool("ENV_TEST_GARBAGE"), None);
        unsafe {
            std::env::remove_var("TIDEWAY_ENV_TEST_FLAG");
            std::env::remove_var("TIDEWAY_ENV_TEST_GARBAGE");
        }
    }
}
