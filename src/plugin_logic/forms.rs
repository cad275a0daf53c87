/*
 * Data for the two settings surfaces. The host's dashboard renders the
 * actual form chrome; this module only supplies the rows (one checkbox per
 * statistic plus the two lifecycle flags for the admin, one checkbox per
 * admin-enabled statistic plus the template textarea for the user) and the
 * typed submissions coming back.
 */
use crate::core::models::{ProfileConfiguration, StatKey, UserProfile};
use crate::core::substitution::PlaceholderTag;
use std::collections::HashSet;

// One checkbox row: stable element id, human-readable label, current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckboxField {
    pub id: String,
    pub label: String,
    pub checked: bool,
}

// The admin dashboard form: which statistics users may choose from, plus
// the lifecycle switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSettingsForm {
    pub stat_fields: Vec<CheckboxField>,
    pub restore_defaults: CheckboxField,
    pub complete_uninstall: CheckboxField,
}

// The per-user profile form: the template textarea (with tag help text) and
// a visibility checkbox for each admin-enabled statistic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSettingsForm {
    pub template_text: String,
    pub tag_help: String,
    pub stat_fields: Vec<CheckboxField>,
}

// What the admin form posts back.
#[derive(Debug, Clone, Default)]
pub struct AdminSettingsSubmission {
    pub enabled_stats: HashSet<StatKey>,
    pub restore_defaults_on_reactivate: bool,
    pub complete_uninstall_on_deactivate: bool,
}

// What the user's edit form posts back.
#[derive(Debug, Clone, Default)]
pub struct UserProfileSubmission {
    pub template_text: String,
    pub visible_stats: HashSet<StatKey>,
}

pub fn build_admin_form(config: &ProfileConfiguration) -> AdminSettingsForm {
    let stat_fields = config
        .registry
        .iter()
        .map(|entry| CheckboxField {
            id: format!("up_stat_{}", entry.key),
            label: entry.label.clone(),
            checked: entry.enabled,
        })
        .collect();
    AdminSettingsForm {
        stat_fields,
        restore_defaults: CheckboxField {
            id: "up_restore".to_string(),
            label: "Restore default settings upon reactivation?".to_string(),
            checked: config.flags.restore_defaults_on_reactivate,
        },
        complete_uninstall: CheckboxField {
            id: "up_uninstall".to_string(),
            label: "Completely un-install upon deactivation?".to_string(),
            checked: config.flags.complete_uninstall_on_deactivate,
        },
    }
}

pub fn build_user_form(config: &ProfileConfiguration, profile: &UserProfile) -> UserSettingsForm {
    // Only admin-enabled statistics are offered to the user.
    let stat_fields = config
        .registry
        .iter()
        .filter(|entry| entry.enabled)
        .map(|entry| CheckboxField {
            id: format!("up_stat_{}", entry.key),
            label: entry.label.clone(),
            checked: profile.is_stat_visible(&entry.key),
        })
        .collect();

    let tags: Vec<String> = PlaceholderTag::ALL
        .iter()
        .map(|tag| format!("[{}]", tag.token()))
        .collect();
    UserSettingsForm {
        template_text: profile.template_text.clone(),
        tag_help: format!(
            "Your public profile page. You can use {} tags.",
            tags.join(", ")
        ),
        stat_fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::StatKey;

    #[test]
    fn test_admin_form_lists_every_registered_stat() {
        let mut config = ProfileConfiguration::default_install();
        config.registry.set_enabled(&StatKey::from("posts"), false);
        config.flags.complete_uninstall_on_deactivate = true;

        let form = build_admin_form(&config);

        assert_eq!(form.stat_fields.len(), 4);
        assert_eq!(form.stat_fields[0].id, "up_stat_age");
        assert!(form.stat_fields[0].checked);
        assert_eq!(form.stat_fields[1].label, "Post Count");
        assert!(!form.stat_fields[1].checked);
        assert!(!form.restore_defaults.checked);
        assert!(form.complete_uninstall.checked);
    }

    #[test]
    fn test_user_form_offers_only_enabled_stats() {
        let mut config = ProfileConfiguration::default_install();
        config.registry.set_enabled(&StatKey::from("comments"), false);
        let mut profile = UserProfile::default();
        profile.template_text = "Hi [display_name]".to_string();
        profile.visible_stats.insert(StatKey::from("age"));

        let form = build_user_form(&config, &profile);

        let ids: Vec<&str> = form.stat_fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["up_stat_age", "up_stat_posts", "up_stat_userlevel"]);
        assert!(form.stat_fields[0].checked);
        assert!(!form.stat_fields[1].checked);
        assert_eq!(form.template_text, "Hi [display_name]");
    }

    #[test]
    fn test_user_form_help_names_all_eight_tags() {
        let config = ProfileConfiguration::default_install();
        let form = build_user_form(&config, &UserProfile::default());

        for token in [
            "[biography]",
            "[aim]",
            "[yim]",
            "[gtalk]",
            "[email]",
            "[website]",
            "[website_link]",
            "[display_name]",
        ] {
            assert!(form.tag_help.contains(token), "missing {token}");
        }
    }
}
