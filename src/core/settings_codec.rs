/*
 * Pure translation between the option store's string rows and the typed
 * `ProfileConfiguration`. The stored layout is kept row-compatible with the
 * original plugin: two comma-joined lists for statistic keys and labels, a
 * JSON options bag holding the lifecycle flags plus one `stat_<key>` switch
 * per statistic ("on"/"off"), and plain string rows for the page title, slug
 * and id.
 *
 * Decoding validates the loosely-typed storage against the typed model: a
 * key/label length mismatch is an error, a `stat_<key>` switch naming an
 * unregistered key is logged and ignored, and a missing or garbled page id
 * decodes as 0.
 */
use super::models::{
    DEFAULT_PAGE_SLUG, DEFAULT_PAGE_TITLE, LifecycleFlags, PageSettings, ProfileConfiguration,
    StatKey, StatRegistry,
};
use std::collections::BTreeMap;

pub const OPT_PAGE_TITLE: &str = "up_profile_page_title";
pub const OPT_PAGE_NAME: &str = "up_profile_page_name";
pub const OPT_PAGE_ID: &str = "up_profile_page_id";
pub const OPT_STATS: &str = "up_profile_stats";
pub const OPT_STAT_NAMES: &str = "up_profile_stat_names";
pub const OPT_OPTIONS: &str = "up_options";

/// Every option row this plugin owns; uninstall removes exactly these.
pub const ALL_OPTION_KEYS: [&str; 6] = [
    OPT_PAGE_TITLE,
    OPT_PAGE_NAME,
    OPT_PAGE_ID,
    OPT_STATS,
    OPT_STAT_NAMES,
    OPT_OPTIONS,
];

const BAG_RESTORE: &str = "restore_defaults_on_reactivate";
const BAG_UNINSTALL: &str = "complete_uninstall_on_deactivate";
const BAG_STAT_PREFIX: &str = "stat_";
const SWITCH_ON: &str = "on";
const SWITCH_OFF: &str = "off";

#[derive(Debug)]
pub enum SettingsError {
    LabelCountMismatch { keys: usize, labels: usize },
    OptionsBag(serde_json::Error),
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::OptionsBag(err)
    }
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::LabelCountMismatch { keys, labels } => write!(
                f,
                "Statistic key/label lists are misaligned: {keys} keys vs {labels} labels"
            ),
            SettingsError::OptionsBag(e) => write!(f, "Malformed options bag: {e}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::OptionsBag(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SettingsError>;

// The raw option rows as read from (or written to) the option store. `None`
// means the row is absent.
#[derive(Debug, Clone, Default)]
pub struct StoredOptions {
    pub page_title: Option<String>,
    pub page_slug: Option<String>,
    pub page_id: Option<String>,
    pub stat_keys: Option<String>,
    pub stat_labels: Option<String>,
    pub options_bag: Option<String>,
}

impl StoredOptions {
    /// True when nothing has ever been stored; used by the activation path
    /// to distinguish a fresh install from a reactivation.
    pub fn is_absent(&self) -> bool {
        self.page_title.is_none()
            && self.page_slug.is_none()
            && self.page_id.is_none()
            && self.stat_keys.is_none()
            && self.stat_labels.is_none()
            && self.options_bag.is_none()
    }
}

fn split_list(joined: &str) -> Vec<String> {
    if joined.is_empty() {
        return Vec::new();
    }
    joined.split(',').map(|s| s.to_string()).collect()
}

fn switch(value: bool) -> &'static str {
    if value { SWITCH_ON } else { SWITCH_OFF }
}

/*
 * Decodes stored rows into a typed configuration. Missing rows fall back to
 * the install defaults for the page coordinates and the registry key/label
 * list; enabled switches and lifecycle flags come solely from the options
 * bag (absent means off).
 */
pub fn decode(stored: &StoredOptions) -> Result<ProfileConfiguration> {
    let defaults = ProfileConfiguration::default_install();

    let bag: BTreeMap<String, String> = match stored.options_bag.as_deref() {
        Some(raw) => serde_json::from_str(raw)?,
        None => BTreeMap::new(),
    };

    let (keys, labels) = match (&stored.stat_keys, &stored.stat_labels) {
        (Some(keys), Some(labels)) => (split_list(keys), split_list(labels)),
        _ => (
            defaults.registry.iter().map(|e| e.key.to_string()).collect(),
            defaults.registry.iter().map(|e| e.label.clone()).collect(),
        ),
    };
    if keys.len() != labels.len() {
        return Err(SettingsError::LabelCountMismatch {
            keys: keys.len(),
            labels: labels.len(),
        });
    }

    let mut registry = StatRegistry::new();
    for (key, label) in keys.into_iter().zip(labels) {
        let stat_key = StatKey::new(key);
        let enabled = bag
            .get(&format!("{BAG_STAT_PREFIX}{stat_key}"))
            .is_some_and(|v| v == SWITCH_ON);
        registry.push(stat_key, label, enabled);
    }

    // Surface switches that name keys the registry does not know; they are
    // storage drift and never reach the typed model.
    for bag_key in bag.keys() {
        if let Some(stat) = bag_key.strip_prefix(BAG_STAT_PREFIX)
            && !registry.contains_key(&StatKey::from(stat))
        {
            log::warn!("settings_codec: Ignoring switch for unregistered stat '{stat}'");
        }
    }

    let page_id = stored
        .page_id
        .as_deref()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);

    Ok(ProfileConfiguration {
        page: PageSettings {
            title: stored
                .page_title
                .clone()
                .unwrap_or_else(|| DEFAULT_PAGE_TITLE.to_string()),
            slug: stored
                .page_slug
                .clone()
                .unwrap_or_else(|| DEFAULT_PAGE_SLUG.to_string()),
            page_id,
        },
        registry,
        flags: LifecycleFlags {
            restore_defaults_on_reactivate: bag
                .get(BAG_RESTORE)
                .is_some_and(|v| v == SWITCH_ON),
            complete_uninstall_on_deactivate: bag
                .get(BAG_UNINSTALL)
                .is_some_and(|v| v == SWITCH_ON),
        },
    })
}

/// Encodes a typed configuration back into the stored row layout.
pub fn encode(config: &ProfileConfiguration) -> Result<StoredOptions> {
    let mut bag: BTreeMap<String, String> = BTreeMap::new();
    bag.insert(
        BAG_RESTORE.to_string(),
        switch(config.flags.restore_defaults_on_reactivate).to_string(),
    );
    bag.insert(
        BAG_UNINSTALL.to_string(),
        switch(config.flags.complete_uninstall_on_deactivate).to_string(),
    );
    for entry in config.registry.iter() {
        bag.insert(
            format!("{BAG_STAT_PREFIX}{}", entry.key),
            switch(entry.enabled).to_string(),
        );
    }

    let keys: Vec<String> = config.registry.iter().map(|e| e.key.to_string()).collect();
    let labels: Vec<String> = config.registry.iter().map(|e| e.label.clone()).collect();

    Ok(StoredOptions {
        page_title: Some(config.page.title.clone()),
        page_slug: Some(config.page.slug.clone()),
        page_id: Some(config.page.page_id.to_string()),
        stat_keys: Some(keys.join(",")),
        stat_labels: Some(labels.join(",")),
        options_bag: Some(serde_json::to_string(&bag)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let mut config = ProfileConfiguration::default_install();
        config.registry.set_enabled(&StatKey::from("comments"), false);
        config.flags.complete_uninstall_on_deactivate = true;
        config.page.page_id = 17;

        let stored = encode(&config).expect("encode should succeed");
        let decoded = decode(&stored).expect("decode should succeed");

        assert_eq!(decoded, config);
    }

    #[test]
    fn test_decode_absent_rows_yields_disabled_defaults() {
        let decoded = decode(&StoredOptions::default()).expect("decode should succeed");

        let keys: Vec<&str> = decoded.registry.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["age", "posts", "comments", "userlevel"]);
        // No options bag means every switch is off.
        assert!(decoded.registry.iter().all(|e| !e.enabled));
        assert!(!decoded.flags.restore_defaults_on_reactivate);
        assert_eq!(decoded.page.page_id, 0);
        assert_eq!(decoded.page.title, DEFAULT_PAGE_TITLE);
    }

    #[test]
    fn test_decode_rejects_misaligned_lists() {
        let stored = StoredOptions {
            stat_keys: Some("age,posts".to_string()),
            stat_labels: Some("Age".to_string()),
            ..Default::default()
        };

        let result = decode(&stored);

        assert!(matches!(
            result,
            Err(SettingsError::LabelCountMismatch { keys: 2, labels: 1 })
        ));
    }

    #[test]
    fn test_decode_ignores_switch_for_unknown_key() {
        let stored = StoredOptions {
            stat_keys: Some("age".to_string()),
            stat_labels: Some("Age".to_string()),
            options_bag: Some(r#"{"stat_age":"on","stat_karma":"on"}"#.to_string()),
            ..Default::default()
        };

        let decoded = decode(&stored).expect("decode should succeed");

        assert_eq!(decoded.registry.len(), 1);
        assert!(decoded.registry.is_enabled(&StatKey::from("age")));
        assert!(!decoded.registry.contains_key(&StatKey::from("karma")));
    }

    #[test]
    fn test_decode_garbled_page_id_is_zero() {
        let stored = StoredOptions {
            page_id: Some("not-a-number".to_string()),
            ..Default::default()
        };

        let decoded = decode(&stored).expect("decode should succeed");

        assert_eq!(decoded.page.page_id, 0);
    }

    #[test]
    fn test_decode_malformed_bag_is_an_error() {
        let stored = StoredOptions {
            options_bag: Some("{not json".to_string()),
            ..Default::default()
        };

        assert!(matches!(decode(&stored), Err(SettingsError::OptionsBag(_))));
    }

    #[test]
    fn test_decode_empty_lists_yield_empty_registry() {
        let stored = StoredOptions {
            stat_keys: Some(String::new()),
            stat_labels: Some(String::new()),
            ..Default::default()
        };

        let decoded = decode(&stored).expect("decode should succeed");

        assert!(decoded.registry.is_empty());
    }
}
