//! Best-effort classification of backend error descriptions.
//!
//! Checks run in a fixed order and the first match wins:
//!
//! 1. credential (`401`, `API key not valid`, `API key expired`, `UNAUTHENTICATED`)
//! 2. access (`403`, `PERMISSION_DENIED`)
//! 3. capacity (`429`, `RESOURCE_EXHAUSTED`, quota, `503`, overloaded)
//! 4. transport (network, fetch, connection, timeout)
//! 5. safety (`SAFETY`, blocked, prohibited)
//!
//! Anything else is passed through verbatim as unknown. A description
//! containing both `429` and `403` is therefore access denied.

use chem_core::ErrorCategory;

const AUTH_PATTERNS: &[&str] = &[
    "401",
    "api key not valid",
    "api key expired",
    "api_key_invalid",
    "invalid api key",
    "missing api key",
    "unauthenticated",
];

const ACCESS_PATTERNS: &[&str] = &["403", "permission_denied", "permission denied"];

const RATE_PATTERNS: &[&str] = &[
    "429",
    "resource_exhausted",
    "quota",
    "rate limit",
    "503",
    "overloaded",
    "unavailable",
];

const NETWORK_PATTERNS: &[&str] = &[
    "network",
    "fetch",
    "connection",
    "timed out",
    "timeout",
    "dns",
];

const SAFETY_PATTERNS: &[&str] = &["safety", "blocked", "prohibited"];

/// Classify an error description. Deterministic for any input.
#[must_use]
pub fn classify(description: &str) -> ErrorCategory {
    let lower = description.to_lowercase();
    let matches = |patterns: &[&str]| patterns.iter().any(|p| lower.contains(p));

    if matches(AUTH_PATTERNS) {
        ErrorCategory::Auth
    } else if matches(ACCESS_PATTERNS) {
        ErrorCategory::AccessDenied
    } else if matches(RATE_PATTERNS) {
        ErrorCategory::RateLimited
    } else if matches(NETWORK_PATTERNS) {
        ErrorCategory::Network
    } else if matches(SAFETY_PATTERNS) {
        ErrorCategory::ContentPolicy
    } else {
        ErrorCategory::Unknown(description.to_string())
    }
}

/// Classify a non-success HTTP response.
///
/// The status codes that carry an unambiguous meaning are mapped directly;
/// everything else falls back to [`classify`] on the full description.
#[must_use]
pub fn classify_status(http_status: u16, description: &str) -> ErrorCategory {
    match http_status {
        401 => ErrorCategory::Auth,
        403 => ErrorCategory::AccessDenied,
        429 => ErrorCategory::RateLimited,
        _ => classify(description),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_patterns() {
        assert_eq!(classify("HTTP 429 Too Many Requests"), ErrorCategory::RateLimited);
        assert_eq!(classify("got 403 from upstream"), ErrorCategory::AccessDenied);
        assert_eq!(
            classify("API key not valid. Please pass a valid API key."),
            ErrorCategory::Auth
        );
        assert_eq!(classify("Failed to fetch"), ErrorCategory::Network);
        assert_eq!(
            classify("Candidate was blocked due to SAFETY"),
            ErrorCategory::ContentPolicy
        );
        assert_eq!(
            classify("The model is overloaded. Please try again later."),
            ErrorCategory::RateLimited
        );
    }

    #[test]
    fn test_unknown_passes_through_verbatim() {
        assert_eq!(
            classify("Internal error encountered."),
            ErrorCategory::Unknown("Internal error encountered.".to_string())
        );
    }

    #[test]
    fn test_overlapping_patterns_resolve_by_order() {
        assert_eq!(classify("429 after 403"), ErrorCategory::AccessDenied);
        assert_eq!(classify("403 network"), ErrorCategory::AccessDenied);
        assert_eq!(classify("401 and 429"), ErrorCategory::Auth);
        assert_eq!(classify("quota exceeded; connection reset"), ErrorCategory::RateLimited);
        assert_eq!(classify("network blocked"), ErrorCategory::Network);
    }

    #[test]
    fn test_status_takes_precedence() {
        assert_eq!(classify_status(429, "403 mentioned"), ErrorCategory::RateLimited);
        assert_eq!(classify_status(401, "whatever"), ErrorCategory::Auth);
        assert_eq!(
            classify_status(400, "400 INVALID_ARGUMENT API key not valid"),
            ErrorCategory::Auth
        );
        assert_eq!(
            classify_status(400, "400 INVALID_ARGUMENT API key expired. Please renew the API key."),
            ErrorCategory::Auth
        );
        assert_eq!(
            classify_status(500, "500 INTERNAL boom"),
            ErrorCategory::Unknown("500 INTERNAL boom".to_string())
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_classification_is_deterministic(s in ".{0,80}") {
                prop_assert_eq!(classify(&s), classify(&s));
            }

            #[test]
            fn prop_429_is_rate_limited_unless_earlier_pattern(
                prefix in "[a-z ]{0,20}",
                suffix in "[a-z ]{0,20}",
            ) {
                let description = format!("{prefix}429{suffix}");
                let lower = description.to_lowercase();
                let earlier = AUTH_PATTERNS.iter().chain(ACCESS_PATTERNS).any(|p| lower.contains(p));
                prop_assume!(!earlier);
                prop_assert_eq!(classify(&description), ErrorCategory::RateLimited);
            }

            #[test]
            fn prop_403_is_access_denied_unless_auth(
                prefix in "[a-z0-9 ]{0,20}",
                suffix in "[a-z0-9 ]{0,20}",
            ) {
                let description = format!("{prefix}403{suffix}");
                let lower = description.to_lowercase();
                prop_assume!(!AUTH_PATTERNS.iter().any(|p| lower.contains(p)));
                prop_assert_eq!(classify(&description), ErrorCategory::AccessDenied);
            }
        }
    }
}
