/*
 * The tag substitution engine. A user's profile template may contain
 * bracketed placeholder tags ([biography], [email], ...) drawn from a fixed,
 * closed set; `substitute` replaces every occurrence with its bound value in
 * a single left-to-right scan. Bound values are emitted verbatim and never
 * rescanned, so template content can never trigger nested expansion. Any
 * bracket sequence that is not a bound, known tag passes through unchanged.
 */
use super::models::UserIdentity;
use std::collections::HashMap;

/// The closed set of placeholder tags recognized in profile templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderTag {
    Biography,
    Aim,
    Yim,
    Gtalk,
    Email,
    Website,
    WebsiteLink,
    DisplayName,
}

impl PlaceholderTag {
    pub const ALL: [PlaceholderTag; 8] = [
        PlaceholderTag::Biography,
        PlaceholderTag::Aim,
        PlaceholderTag::Yim,
        PlaceholderTag::Gtalk,
        PlaceholderTag::Email,
        PlaceholderTag::Website,
        PlaceholderTag::WebsiteLink,
        PlaceholderTag::DisplayName,
    ];

    /// The token text between the brackets.
    pub fn token(self) -> &'static str {
        match self {
            PlaceholderTag::Biography => "biography",
            PlaceholderTag::Aim => "aim",
            PlaceholderTag::Yim => "yim",
            PlaceholderTag::Gtalk => "gtalk",
            PlaceholderTag::Email => "email",
            PlaceholderTag::Website => "website",
            PlaceholderTag::WebsiteLink => "website_link",
            PlaceholderTag::DisplayName => "display_name",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        PlaceholderTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.token() == token)
    }
}

/*
 * The resolved tag-to-value table for one render. The standard table is
 * derived from the target user's identity facts; tests may bind tags
 * individually.
 */
#[derive(Debug, Clone, Default)]
pub struct TagBindings {
    values: HashMap<PlaceholderTag, String>,
}

impl TagBindings {
    pub fn new() -> Self {
        TagBindings {
            values: HashMap::new(),
        }
    }

    pub fn bind(&mut self, tag: PlaceholderTag, value: impl Into<String>) {
        self.values.insert(tag, value.into());
    }

    pub fn get(&self, tag: PlaceholderTag) -> Option<&str> {
        self.values.get(&tag).map(String::as_str)
    }

    /// Builds the standard binding table from a user's identity facts.
    /// `website_link` wraps the website in an anchor opening in a new tab.
    pub fn from_identity(identity: &UserIdentity) -> Self {
        let mut bindings = TagBindings::new();
        bindings.bind(PlaceholderTag::Biography, identity.biography.clone());
        bindings.bind(PlaceholderTag::Aim, identity.aim.clone());
        bindings.bind(PlaceholderTag::Yim, identity.yim.clone());
        bindings.bind(PlaceholderTag::Gtalk, identity.gtalk.clone());
        bindings.bind(PlaceholderTag::Email, identity.email.clone());
        bindings.bind(PlaceholderTag::Website, identity.website.clone());
        bindings.bind(
            PlaceholderTag::WebsiteLink,
            format!(
                "<a href='{0}' target='_blank'>{0}</a>",
                identity.website
            ),
        );
        bindings.bind(PlaceholderTag::DisplayName, identity.display_name.clone());
        bindings
    }
}

/*
 * Replaces every bound `[tag]` occurrence in `template` with its value.
 * Literal substring substitution, not a parser: replaced values are appended
 * to the output and the scan resumes after the closing bracket, so values
 * containing bracket syntax are not expanded again. Pure and deterministic;
 * an empty bound value yields the empty string, with no whitespace cleanup.
 */
pub fn substitute(template: &str, bindings: &TagBindings) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find(']').and_then(|close| {
            let token = &after[..close];
            PlaceholderTag::from_token(token)
                .and_then(|tag| bindings.get(tag))
                .map(|value| (value, close))
        });
        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                // Not a bound, known tag; keep the bracket and rescan from
                // the next character.
                out.push('[');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn test_identity() -> UserIdentity {
        UserIdentity {
            id: 7,
            login: "alice".to_string(),
            display_name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            website: "http://example.org".to_string(),
            registered_at: OffsetDateTime::UNIX_EPOCH,
            aim: "alice_aim".to_string(),
            yim: String::new(),
            gtalk: "alice@gtalk".to_string(),
            biography: "Rustacean.".to_string(),
        }
    }

    #[test]
    fn test_substitute_basic_scenario() {
        let mut bindings = TagBindings::new();
        bindings.bind(PlaceholderTag::DisplayName, "Alice");
        bindings.bind(PlaceholderTag::Email, "a@x.com");

        let result = substitute("Hi, I'm [display_name]. Reach me at [email].", &bindings);

        assert_eq!(result, "Hi, I'm Alice. Reach me at a@x.com.");
    }

    #[test]
    fn test_substitute_replaces_every_occurrence() {
        let mut bindings = TagBindings::new();
        bindings.bind(PlaceholderTag::DisplayName, "Alice");

        let result = substitute("[display_name] and [display_name]", &bindings);

        assert_eq!(result, "Alice and Alice");
    }

    #[test]
    fn test_unknown_and_unbound_tags_pass_through() {
        let mut bindings = TagBindings::new();
        bindings.bind(PlaceholderTag::Email, "a@x.com");

        // [frobnicate] is not in the closed set; [aim] is known but unbound.
        let result = substitute("[frobnicate] [aim] [email]", &bindings);

        assert_eq!(result, "[frobnicate] [aim] a@x.com");
    }

    #[test]
    fn test_empty_value_replaces_with_empty_string() {
        let mut bindings = TagBindings::new();
        bindings.bind(PlaceholderTag::Website, "");

        let result = substitute("Site: [website] (end)", &bindings);

        assert_eq!(result, "Site:  (end)");
    }

    #[test]
    fn test_unclosed_bracket_passes_through() {
        let mut bindings = TagBindings::new();
        bindings.bind(PlaceholderTag::Email, "a@x.com");

        assert_eq!(substitute("oops [email", &bindings), "oops [email");
        assert_eq!(substitute("[", &bindings), "[");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let mut bindings = TagBindings::new();
        bindings.bind(PlaceholderTag::DisplayName, "[email]");
        bindings.bind(PlaceholderTag::Email, "a@x.com");

        // The inserted "[email]" must survive verbatim; no nested expansion.
        let result = substitute("Name: [display_name]", &bindings);

        assert_eq!(result, "Name: [email]");
    }

    #[test]
    fn test_idempotent_when_values_are_bracket_free() {
        let mut bindings = TagBindings::new();
        bindings.bind(PlaceholderTag::DisplayName, "Alice");
        bindings.bind(PlaceholderTag::Email, "a@x.com");
        let template = "Hi [display_name] ([email]) [unknown] trailing [";

        let once = substitute(template, &bindings);
        let twice = substitute(&once, &bindings);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_from_identity_binds_the_full_table() {
        let identity = test_identity();
        let bindings = TagBindings::from_identity(&identity);

        assert_eq!(bindings.get(PlaceholderTag::Biography), Some("Rustacean."));
        assert_eq!(bindings.get(PlaceholderTag::Aim), Some("alice_aim"));
        assert_eq!(bindings.get(PlaceholderTag::Yim), Some(""));
        assert_eq!(bindings.get(PlaceholderTag::Gtalk), Some("alice@gtalk"));
        assert_eq!(bindings.get(PlaceholderTag::Email), Some("a@x.com"));
        assert_eq!(
            bindings.get(PlaceholderTag::Website),
            Some("http://example.org")
        );
        assert_eq!(
            bindings.get(PlaceholderTag::WebsiteLink),
            Some("<a href='http://example.org' target='_blank'>http://example.org</a>")
        );
        assert_eq!(bindings.get(PlaceholderTag::DisplayName), Some("Alice"));
    }
}
