/*
 * Route plumbing for the profile page: parameter sanitization, target
 * discrimination, and the URL/rewrite strings the host hooks register. The
 * coordinator resolves "by id / by login / by session" into a concrete
 * identity before the core ever runs, so the composer never inspects types.
 */

/// Strips every non-alphanumeric character from a raw route parameter.
pub fn sanitize_param(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

// What the route parameter asks for, after sanitization. An all-digit
// parameter is a user id; anything else non-empty is a login name; an empty
// or absent parameter leaves the target to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    UserId(u64),
    Login(String),
    Unspecified,
}

pub fn parse_target(raw_param: Option<&str>) -> RouteTarget {
    let cleaned = raw_param.map(sanitize_param).unwrap_or_default();
    if cleaned.is_empty() {
        return RouteTarget::Unspecified;
    }
    if cleaned.chars().all(|c| c.is_ascii_digit()) {
        // Digit strings too long for u64 fall back to a login lookup, which
        // will simply not resolve.
        if let Ok(id) = cleaned.parse::<u64>() {
            return RouteTarget::UserId(id);
        }
    }
    RouteTarget::Login(cleaned)
}

// The rewrite registration datum handed to the host: requests matching
// `pattern` are rewritten to `replacement`, with the captured parameter
// carried in the `username` query variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    pub pattern: String,
    pub replacement: String,
}

pub fn rewrite_rule(page_title: &str) -> RewriteRule {
    RewriteRule {
        pattern: format!("{page_title}/(.+)"),
        replacement: format!("index.php?pagename={page_title}&username=$1"),
    }
}

/// The canonical URL of one user's profile page.
pub fn profile_url(slug: &str, user_id: u64) -> String {
    format!("/index.php/{slug}/{user_id}")
}

/// Wraps host-rendered avatar markup in a link to the user's profile.
pub fn wrap_avatar(avatar_markup: &str, slug: &str, user_id: u64) -> String {
    format!("<a href='{}'>{avatar_markup}</a>", profile_url(slug, user_id))
}

/// The author-URL hook: author links point at the author's profile page.
pub fn author_url(slug: &str, author_id: u64) -> String {
    profile_url(slug, author_id)
}

/// The parse-query check: does this request target the profile page?
pub fn is_profile_request(requested_slug: &str, configured_slug: &str) -> bool {
    requested_slug == configured_slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_non_alphanumerics() {
        assert_eq!(sanitize_param("jdoe"), "jdoe");
        assert_eq!(sanitize_param("j.doe-42!"), "jdoe42");
        assert_eq!(sanitize_param("../../etc"), "etc");
        assert_eq!(sanitize_param("!@#$"), "");
    }

    #[test]
    fn test_parse_target_numeric_is_user_id() {
        assert_eq!(parse_target(Some("42")), RouteTarget::UserId(42));
        // Sanitization happens before classification.
        assert_eq!(parse_target(Some("4-2")), RouteTarget::UserId(42));
    }

    #[test]
    fn test_parse_target_name_is_login() {
        assert_eq!(
            parse_target(Some("jdoe")),
            RouteTarget::Login("jdoe".to_string())
        );
        assert_eq!(
            parse_target(Some("jdoe42")),
            RouteTarget::Login("jdoe42".to_string())
        );
    }

    #[test]
    fn test_parse_target_empty_is_unspecified() {
        assert_eq!(parse_target(None), RouteTarget::Unspecified);
        assert_eq!(parse_target(Some("")), RouteTarget::Unspecified);
        assert_eq!(parse_target(Some("!!!")), RouteTarget::Unspecified);
    }

    #[test]
    fn test_parse_target_oversized_digit_string_falls_back_to_login() {
        let oversized = "9".repeat(30);
        assert_eq!(
            parse_target(Some(&oversized)),
            RouteTarget::Login(oversized)
        );
    }

    #[test]
    fn test_rewrite_rule_shape() {
        let rule = rewrite_rule("User Profile");
        assert_eq!(rule.pattern, "User Profile/(.+)");
        assert_eq!(
            rule.replacement,
            "index.php?pagename=User Profile&username=$1"
        );
    }

    #[test]
    fn test_profile_urls() {
        assert_eq!(profile_url("user-profile", 42), "/index.php/user-profile/42");
        assert_eq!(
            wrap_avatar("<img />", "user-profile", 42),
            "<a href='/index.php/user-profile/42'><img /></a>"
        );
        assert_eq!(author_url("user-profile", 7), "/index.php/user-profile/7");
        assert!(is_profile_request("user-profile", "user-profile"));
        assert!(!is_profile_request("about", "user-profile"));
    }
}
