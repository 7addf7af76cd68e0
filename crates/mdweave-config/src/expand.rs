//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use crate::ConfigError;

/// Expand `${VAR}` references using `lookup` to read variables.
///
/// Returns the original string unchanged if no `${}` patterns are present.
/// Bare `$VAR` syntax is not expanded (only `${VAR}` with braces).
pub(crate) fn expand_env_with(
    value: &str,
    field: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    // Fast path: no expansion needed
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        match lookup(var) {
            Some(val) => Ok(Some(val)),
            None => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Expand a leading `~` to the home directory.
pub(crate) fn expand_tilde(value: &str) -> String {
    shellexpand::tilde(value).into_owned()
}

/// Error returned when environment variable lookup fails.
struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(var: &str) -> Option<String> {
        match var {
            "HOST_TEST" => Some("example.com".to_owned()),
            "USER_TEST" => Some("admin".to_owned()),
            "PASS_TEST" => Some("secret".to_owned()),
            _ => None,
        }
    }

    #[test]
    fn test_expand_simple_var() {
        let result = expand_env_with("${USER_TEST}", "test.field", &env).unwrap();
        assert_eq!(result, "admin");
    }

    #[test]
    fn test_expand_with_default_uses_value() {
        let result = expand_env_with("${USER_TEST:-nobody}", "test.field", &env).unwrap();
        assert_eq!(result, "admin");
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        let result = expand_env_with("${UNSET_VAR_TEST:-default}", "test.field", &env).unwrap();
        assert_eq!(result, "default");
    }

    #[test]
    fn test_expand_missing_var_error() {
        let err = expand_env_with("${MISSING_VAR_TEST}", "test.field", &env).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_VAR_TEST"));
        assert!(err.to_string().contains("test.field"));
    }

    #[test]
    fn test_expand_literal_unchanged() {
        let result = expand_env_with("literal string", "test.field", &env).unwrap();
        assert_eq!(result, "literal string");
    }

    #[test]
    fn test_expand_multiple_vars() {
        let result = expand_env_with("${USER_TEST}@${HOST_TEST}", "test.field", &env).unwrap();
        assert_eq!(result, "admin@example.com");
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_env_with("$VAR", "test.field", &env).unwrap();
        assert_eq!(result, "$VAR");
    }

    #[test]
    fn test_tilde_leaves_plain_paths() {
        assert_eq!(expand_tilde("/usr/bin/mmdc"), "/usr/bin/mmdc");
        assert_eq!(expand_tilde("mmdc"), "mmdc");
        assert_eq!(expand_tilde("java -jar ~plantuml.jar"), "java -jar ~plantuml.jar");
    }
}
