use serde::{Deserialize, Serialize}; // StatKey appears inside persisted user meta keys
use std::collections::HashSet;
use std::fmt;
use time::OffsetDateTime;

/// Default page coordinates seeded on install.
pub const DEFAULT_PAGE_TITLE: &str = "User Profile";
pub const DEFAULT_PAGE_SLUG: &str = "user-profile";

// Identifies one displayable account metric. This is registry data, not an
// enum: the bootstrap path only ever seeds the four default keys, but the
// resolver and composer must work for any ordered key/label list supplied at
// runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatKey(String);

impl StatKey {
    pub fn new(key: impl Into<String>) -> Self {
        StatKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StatKey {
    fn from(key: &str) -> Self {
        StatKey(key.to_string())
    }
}

// One registered statistic: key, human-readable label, and whether the admin
// has enabled it for end-user selection. Keeping the three together replaces
// the original storage format's two index-aligned comma-joined lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRegistryEntry {
    pub key: StatKey,
    pub label: String,
    pub enabled: bool,
}

/*
 * The ordered set of statistics known to the system. Insertion order is
 * authoritative: it drives the order of the admin form, the user form, and
 * the rendered stat lines. Mutated only by the install and admin-save paths.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatRegistry {
    entries: Vec<StatRegistryEntry>,
}

impl StatRegistry {
    pub fn new() -> Self {
        StatRegistry {
            entries: Vec::new(),
        }
    }

    pub fn from_entries(entries: Vec<StatRegistryEntry>) -> Self {
        StatRegistry { entries }
    }

    /// Appends a statistic. Duplicate keys are the caller's bug; the first
    /// entry wins on lookup.
    pub fn push(&mut self, key: StatKey, label: impl Into<String>, enabled: bool) {
        self.entries.push(StatRegistryEntry {
            key,
            label: label.into(),
            enabled,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatRegistryEntry> {
        self.entries.iter()
    }

    pub fn get(&self, key: &StatKey) -> Option<&StatRegistryEntry> {
        self.entries.iter().find(|e| &e.key == key)
    }

    pub fn contains_key(&self, key: &StatKey) -> bool {
        self.get(key).is_some()
    }

    pub fn is_enabled(&self, key: &StatKey) -> bool {
        self.get(key).is_some_and(|e| e.enabled)
    }

    /// Flips the enabled flag for a known key. Returns false when the key is
    /// not registered, leaving the registry untouched.
    pub fn set_enabled(&mut self, key: &StatKey, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|e| &e.key == key) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// The two admin lifecycle switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleFlags {
    pub restore_defaults_on_reactivate: bool,
    pub complete_uninstall_on_deactivate: bool,
}

// Coordinates of the content page the plugin creates on install. A page_id
// of 0 means "no page recorded yet".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSettings {
    pub title: String,
    pub slug: String,
    pub page_id: u64,
}

/*
 * The whole plugin configuration: page coordinates, statistic registry, and
 * lifecycle flags. Loaded once per request from the option store and passed
 * by reference through the core; there is no ambient/static copy.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileConfiguration {
    pub page: PageSettings,
    pub registry: StatRegistry,
    pub flags: LifecycleFlags,
}

impl ProfileConfiguration {
    /// The configuration seeded on a fresh install: the four default stats
    /// in fixed order, all enabled, both lifecycle flags off.
    pub fn default_install() -> Self {
        let mut registry = StatRegistry::new();
        registry.push(StatKey::from("age"), "Age", true);
        registry.push(StatKey::from("posts"), "Post Count", true);
        registry.push(StatKey::from("comments"), "Comment Count", true);
        registry.push(StatKey::from("userlevel"), "User Level", true);
        ProfileConfiguration {
            page: PageSettings {
                title: DEFAULT_PAGE_TITLE.to_string(),
                slug: DEFAULT_PAGE_SLUG.to_string(),
                page_id: 0,
            },
            registry,
            flags: LifecycleFlags::default(),
        }
    }
}

/*
 * Per-user profile data: the free-text template and the set of statistics
 * the user has opted to show. Absent stored data decodes to the default
 * (empty template, nothing visible); the owner's edit form is the only
 * mutation path.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub template_text: String,
    pub visible_stats: HashSet<StatKey>,
}

impl UserProfile {
    pub fn is_stat_visible(&self, key: &StatKey) -> bool {
        self.visible_stats.contains(key)
    }
}

// Identity facts supplied by the host's user directory. Not serialized by
// this crate; the host owns the account record and we only borrow a copy per
// request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: u64,
    pub login: String,
    pub display_name: String,
    pub email: String,
    pub website: String,
    pub registered_at: OffsetDateTime,
    pub aim: String,
    pub yim: String,
    pub gtalk: String,
    pub biography: String,
}

// A computed statistic: display value plus an optional unit label (empty
// string when there is none). Recomputed on every page view, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticValue {
    pub value: String,
    pub unit: String,
}

impl StatisticValue {
    pub fn new(value: impl Into<String>, unit: impl Into<String>) -> Self {
        StatisticValue {
            value: value.into(),
            unit: unit.into(),
        }
    }

    /// A value with no unit label.
    pub fn plain(value: impl Into<String>) -> Self {
        StatisticValue {
            value: value.into(),
            unit: String::new(),
        }
    }
}

// One resolved, renderable statistic row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatLine {
    pub label: String,
    pub value: String,
    pub unit: String,
}

// The composer's output, ready to overwrite the content page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPage {
    pub title: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_install_seeds_four_stats_in_order() {
        let config = ProfileConfiguration::default_install();
        let keys: Vec<&str> = config.registry.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["age", "posts", "comments", "userlevel"]);
        assert!(config.registry.iter().all(|e| e.enabled));
        assert!(!config.flags.restore_defaults_on_reactivate);
        assert!(!config.flags.complete_uninstall_on_deactivate);
        assert_eq!(config.page.title, DEFAULT_PAGE_TITLE);
        assert_eq!(config.page.slug, DEFAULT_PAGE_SLUG);
        assert_eq!(config.page.page_id, 0);
    }

    #[test]
    fn test_registry_set_enabled_unknown_key() {
        let mut registry = StatRegistry::new();
        registry.push(StatKey::from("age"), "Age", true);

        assert!(registry.set_enabled(&StatKey::from("age"), false));
        assert!(!registry.is_enabled(&StatKey::from("age")));

        assert!(!registry.set_enabled(&StatKey::from("karma"), true));
        assert!(!registry.contains_key(&StatKey::from("karma")));
    }
}
