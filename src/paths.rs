use serde::Serialize;

/// Frontend routes that require a signed-in user.
const PROTECTED_PATHS: &[&str] = &["/dashboard", "/chat", "/settings", "/subscription", "/datasets"];

/// Frontend routes reachable without a session.
const PUBLIC_PATHS: &[&str] = &["/", "/login", "/signup", "/pricing"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathValidation {
    pub is_valid: bool,
    pub is_public: bool,
    pub is_protected: bool,
}

/// Classify a pathname against the static route tables.
///
/// Matching is exact: no trailing-slash or case normalization, and
/// query strings are not stripped. Anything not listed is invalid,
/// including sub-paths of protected routes.
pub fn validate_path(pathname: &str) -> PathValidation {
    let is_protected = PROTECTED_PATHS.contains(&pathname);
    let is_public = PUBLIC_PATHS.contains(&pathname);
    PathValidation {
        is_valid: is_protected || is_public,
        is_public,
        is_protected,
    }
}

// ── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_route_is_valid_and_protected() {
        let v = validate_path("/dashboard");
        assert!(v.is_valid);
        assert!(v.is_protected);
        assert!(!v.is_public);
    }

    #[test]
    fn public_route_is_valid_and_public() {
        let v = validate_path("/login");
        assert!(v.is_valid);
        assert!(v.is_public);
        assert!(!v.is_protected);
    }

    #[test]
    fn trailing_slash_is_not_normalized() {
        assert!(!validate_path("/dashboard/").is_valid);
    }

    #[test]
    fn sub_path_of_protected_route_is_invalid() {
        assert!(!validate_path("/dashboard/stats").is_valid);
    }

    #[test]
    fn query_string_is_not_stripped() {
        assert!(!validate_path("/login?next=/chat").is_valid);
    }

    #[test]
    fn unknown_route_is_invalid() {
        let v = validate_path("/nope");
        assert!(!v.is_valid);
        assert!(!v.is_public);
        assert!(!v.is_protected);
    }
}
