use crate::core::composer::{ProfileView, compose};
use crate::core::models::{ComposedPage, ProfileConfiguration, StatKey, UserIdentity, UserProfile};
use crate::core::option_store::{OptionStoreError, OptionStoreOperations};
use crate::core::page_store::{ContentPage, PageStatus, PageStoreError, PageStoreOperations};
use crate::core::settings_codec::{
    self, ALL_OPTION_KEYS, OPT_OPTIONS, OPT_PAGE_ID, OPT_PAGE_NAME, OPT_PAGE_TITLE, OPT_STAT_NAMES,
    OPT_STATS, SettingsError, StoredOptions,
};
use crate::core::stat_resolver::resolve_visible;
use crate::core::stat_values::compute_stat_values;
use crate::core::substitution::{TagBindings, substitute};
use crate::core::user_directory::UserDirectoryOperations;
use crate::core::user_meta::{META_STAT_PREFIX, META_TEMPLATE_TEXT, UserMetaError, UserMetaOperations};
use super::forms::{
    AdminSettingsForm, AdminSettingsSubmission, UserProfileSubmission, UserSettingsForm,
    build_admin_form, build_user_form,
};
use super::routing::{self, RewriteRule, RouteTarget};
use std::collections::HashSet;
use std::sync::Arc;
use time::OffsetDateTime;

/// Where the owner edits their profile; the edit-link section of the page
/// points here.
pub const EDIT_PROFILE_URL: &str = "/wp-admin/profile.php#up_profile_page";

const PLACEHOLDER_PAGE_BODY: &str = "This page needs to exist in order to display user \
profiles. Nothing typed here will show up; the plugin generates the profile pages for you.";

const SWITCH_ON: &str = "on";
const SWITCH_OFF: &str = "off";

#[derive(Debug)]
pub enum LogicError {
    AccessDenied,
    OptionStore(OptionStoreError),
    UserMeta(UserMetaError),
    PageStore(PageStoreError),
    Settings(SettingsError),
}

impl From<OptionStoreError> for LogicError {
    fn from(err: OptionStoreError) -> Self {
        LogicError::OptionStore(err)
    }
}

impl From<UserMetaError> for LogicError {
    fn from(err: UserMetaError) -> Self {
        LogicError::UserMeta(err)
    }
}

impl From<PageStoreError> for LogicError {
    fn from(err: PageStoreError) -> Self {
        LogicError::PageStore(err)
    }
}

impl From<SettingsError> for LogicError {
    fn from(err: SettingsError) -> Self {
        LogicError::Settings(err)
    }
}

impl std::fmt::Display for LogicError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicError::AccessDenied => {
                write!(f, "You do not have sufficient permissions to access this page.")
            }
            LogicError::OptionStore(e) => write!(f, "{e}"),
            LogicError::UserMeta(e) => write!(f, "{e}"),
            LogicError::PageStore(e) => write!(f, "{e}"),
            LogicError::Settings(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LogicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LogicError::AccessDenied => None,
            LogicError::OptionStore(e) => Some(e),
            LogicError::UserMeta(e) => Some(e),
            LogicError::PageStore(e) => Some(e),
            LogicError::Settings(e) => Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, LogicError>;

/*
 * The coordinator wiring the host's hooks onto the core. It owns nothing but
 * trait handles to the four collaborators (configuration storage, per-user
 * attributes, the content-page repository, and the account directory); every
 * request loads the configuration fresh and threads it through the pure
 * leaves, so there is no cross-request mutable state here.
 */
pub struct ProfilePageLogic {
    option_store: Arc<dyn OptionStoreOperations>,
    user_meta: Arc<dyn UserMetaOperations>,
    page_store: Arc<dyn PageStoreOperations>,
    user_directory: Arc<dyn UserDirectoryOperations>,
}

impl ProfilePageLogic {
    pub fn new(
        option_store: Arc<dyn OptionStoreOperations>,
        user_meta: Arc<dyn UserMetaOperations>,
        page_store: Arc<dyn PageStoreOperations>,
        user_directory: Arc<dyn UserDirectoryOperations>,
    ) -> Self {
        ProfilePageLogic {
            option_store,
            user_meta,
            page_store,
            user_directory,
        }
    }

    fn read_stored_options(&self) -> Result<StoredOptions> {
        Ok(StoredOptions {
            page_title: self.option_store.get_option(OPT_PAGE_TITLE)?,
            page_slug: self.option_store.get_option(OPT_PAGE_NAME)?,
            page_id: self.option_store.get_option(OPT_PAGE_ID)?,
            stat_keys: self.option_store.get_option(OPT_STATS)?,
            stat_labels: self.option_store.get_option(OPT_STAT_NAMES)?,
            options_bag: self.option_store.get_option(OPT_OPTIONS)?,
        })
    }

    /// Loads the typed configuration from the option store. Absent rows
    /// decode to install defaults with every switch off.
    pub fn load_configuration(&self) -> Result<ProfileConfiguration> {
        let stored = self.read_stored_options()?;
        Ok(settings_codec::decode(&stored)?)
    }

    fn store_configuration(&self, config: &ProfileConfiguration) -> Result<()> {
        let stored = settings_codec::encode(config)?;
        let rows = [
            (OPT_PAGE_TITLE, stored.page_title),
            (OPT_PAGE_NAME, stored.page_slug),
            (OPT_PAGE_ID, stored.page_id),
            (OPT_STATS, stored.stat_keys),
            (OPT_STAT_NAMES, stored.stat_labels),
            (OPT_OPTIONS, stored.options_bag),
        ];
        for (key, value) in rows {
            if let Some(value) = value {
                self.option_store.update_option(key, &value)?;
            }
        }
        Ok(())
    }

    /*
     * The activation hook. Seeds the default configuration on a fresh
     * install; on reactivation, keeps the stored configuration unless the
     * restore-defaults flag was set, in which case the registry and flags go
     * back to the install defaults. Either way the profile content page is
     * created if missing or re-published if it already exists, and its id is
     * recorded in the configuration.
     */
    pub fn activate(&self) -> Result<ProfileConfiguration> {
        let stored = self.read_stored_options()?;
        let mut config = if stored.is_absent() {
            log::info!("ProfilePageLogic: Fresh install, seeding default configuration.");
            ProfileConfiguration::default_install()
        } else {
            let existing = settings_codec::decode(&stored)?;
            if existing.flags.restore_defaults_on_reactivate {
                log::info!("ProfilePageLogic: Restoring default configuration on reactivation.");
                ProfileConfiguration::default_install()
            } else {
                existing
            }
        };

        config.page.page_id = match self.page_store.find_by_title(&config.page.title)? {
            Some(mut page) => {
                if page.status != PageStatus::Published {
                    page.status = PageStatus::Published;
                    self.page_store.update_page(&page)?;
                }
                log::debug!(
                    "ProfilePageLogic: Reusing existing profile page {}.",
                    page.id
                );
                page.id
            }
            None => {
                let id = self.page_store.insert_page(
                    &config.page.title,
                    &config.page.slug,
                    PLACEHOLDER_PAGE_BODY,
                    PageStatus::Published,
                )?;
                log::debug!("ProfilePageLogic: Created profile page {id}.");
                id
            }
        };

        self.store_configuration(&config)?;
        Ok(config)
    }

    /*
     * The deactivation hook. The plugin's option rows are always removed.
     * The created page and all per-user attributes are only purged when the
     * complete-uninstall flag is set; otherwise user data survives a
     * deactivate/reactivate cycle untouched.
     */
    pub fn deactivate(&self) -> Result<()> {
        let stored = self.read_stored_options()?;
        let config = settings_codec::decode(&stored)?;

        if config.flags.complete_uninstall_on_deactivate {
            let templates = self.user_meta.delete_matching(META_TEMPLATE_TEXT)?;
            let switches = self.user_meta.delete_matching(META_STAT_PREFIX)?;
            log::info!(
                "ProfilePageLogic: Complete uninstall purged {} user attributes.",
                templates + switches
            );
            if config.page.page_id != 0 {
                self.page_store.delete_page(config.page.page_id)?;
            }
        }

        for key in ALL_OPTION_KEYS {
            self.option_store.delete_option(key)?;
        }
        log::info!("ProfilePageLogic: Deactivated, configuration rows removed.");
        Ok(())
    }

    /// Loads one user's profile data from the attribute store. Absent rows
    /// mean an empty template and nothing visible.
    pub fn load_user_profile(&self, config: &ProfileConfiguration, user_id: u64) -> Result<UserProfile> {
        let template_text = self
            .user_meta
            .get_meta(user_id, META_TEMPLATE_TEXT)?
            .unwrap_or_default();
        let mut visible_stats = HashSet::new();
        for entry in config.registry.iter() {
            let key = format!("{META_STAT_PREFIX}{}", entry.key);
            if self
                .user_meta
                .get_meta(user_id, &key)?
                .is_some_and(|v| v == SWITCH_ON)
            {
                visible_stats.insert(entry.key.clone());
            }
        }
        Ok(UserProfile {
            template_text,
            visible_stats,
        })
    }

    fn resolve_identity(
        &self,
        target: RouteTarget,
        session_user: Option<u64>,
    ) -> Option<UserIdentity> {
        match target {
            RouteTarget::UserId(id) => self.user_directory.find_by_id(id),
            RouteTarget::Login(login) => self.user_directory.find_by_login(&login),
            RouteTarget::Unspecified => session_user.and_then(|id| self.user_directory.find_by_id(id)),
        }
    }

    /*
     * The content-rendering hook: computes the page that overwrites the
     * profile content page's title and body for one request. The target is
     * tried in order: explicit id, explicit login, the session user; when
     * none resolves the generic title and logged-out placeholder are
     * returned, never an error.
     */
    pub fn handle_request(
        &self,
        raw_param: Option<&str>,
        session_user: Option<u64>,
        now: OffsetDateTime,
    ) -> Result<ComposedPage> {
        let config = self.load_configuration()?;
        let target = routing::parse_target(raw_param);
        log::trace!("ProfilePageLogic: Handling profile request for {target:?}.");

        let Some(identity) = self.resolve_identity(target, session_user) else {
            log::debug!("ProfilePageLogic: No user resolved, composing anonymous page.");
            return Ok(compose(None, "", false, EDIT_PROFILE_URL));
        };

        let profile = self.load_user_profile(&config, identity.id)?;
        let bindings = TagBindings::from_identity(&identity);
        let bio = substitute(&profile.template_text, &bindings);
        let values =
            compute_stat_values(self.user_directory.as_ref(), &identity, &config.registry, now);
        let stats = resolve_visible(&config.registry, &profile, &values);
        let is_owner = session_user == Some(identity.id);
        let avatar = self.user_directory.avatar_markup(identity.id);

        let view = ProfileView {
            identity,
            bio,
            stats,
        };
        Ok(compose(Some(&view), &avatar, is_owner, EDIT_PROFILE_URL))
    }

    /*
     * Persists the owner's edit form: the template text and one visibility
     * switch per admin-enabled statistic. Switches for statistics the admin
     * has disabled are not written; the stored opt-in simply goes stale
     * until the admin re-enables the statistic.
     */
    pub fn save_user_profile(
        &self,
        user_id: u64,
        submission: &UserProfileSubmission,
    ) -> Result<()> {
        let config = self.load_configuration()?;
        self.user_meta
            .update_meta(user_id, META_TEMPLATE_TEXT, &submission.template_text)?;
        for entry in config.registry.iter().filter(|e| e.enabled) {
            let value = if submission.visible_stats.contains(&entry.key) {
                SWITCH_ON
            } else {
                SWITCH_OFF
            };
            self.user_meta
                .update_meta(user_id, &format!("{META_STAT_PREFIX}{}", entry.key), value)?;
        }
        log::debug!("ProfilePageLogic: Saved profile settings for user {user_id}.");
        Ok(())
    }

    /*
     * Applies the admin settings form. Rejected at this boundary when the
     * actor lacks the manage capability. Submitted keys the registry does
     * not know are ignored with a warning; the enabled switches and both
     * lifecycle flags are replaced in one configuration write.
     */
    pub fn apply_admin_settings(
        &self,
        actor_can_manage: bool,
        submission: &AdminSettingsSubmission,
    ) -> Result<ProfileConfiguration> {
        if !actor_can_manage {
            log::warn!("ProfilePageLogic: Rejected settings write from unauthorized actor.");
            return Err(LogicError::AccessDenied);
        }

        let mut config = self.load_configuration()?;
        for submitted in &submission.enabled_stats {
            if !config.registry.contains_key(submitted) {
                log::warn!(
                    "ProfilePageLogic: Ignoring submitted switch for unregistered stat '{submitted}'."
                );
            }
        }
        let keys: Vec<StatKey> = config.registry.iter().map(|e| e.key.clone()).collect();
        for key in keys {
            let enabled = submission.enabled_stats.contains(&key);
            config.registry.set_enabled(&key, enabled);
        }
        config.flags.restore_defaults_on_reactivate = submission.restore_defaults_on_reactivate;
        config.flags.complete_uninstall_on_deactivate =
            submission.complete_uninstall_on_deactivate;

        self.store_configuration(&config)?;
        log::info!("ProfilePageLogic: Admin settings applied.");
        Ok(config)
    }

    pub fn admin_settings_form(&self) -> Result<AdminSettingsForm> {
        let config = self.load_configuration()?;
        Ok(build_admin_form(&config))
    }

    pub fn user_settings_form(&self, user_id: u64) -> Result<UserSettingsForm> {
        let config = self.load_configuration()?;
        let profile = self.load_user_profile(&config, user_id)?;
        Ok(build_user_form(&config, &profile))
    }

    /// The rewrite rule to register with the host, derived from the stored
    /// page title.
    pub fn rewrite_rule(&self) -> Result<RewriteRule> {
        let config = self.load_configuration()?;
        Ok(routing::rewrite_rule(&config.page.title))
    }

    /// The avatar hook: wraps host-rendered avatar markup in a profile link.
    pub fn wrap_avatar(&self, avatar_markup: &str, user_id: u64) -> Result<String> {
        let config = self.load_configuration()?;
        Ok(routing::wrap_avatar(avatar_markup, &config.page.slug, user_id))
    }

    /// The author-URL hook: author links point at the author's profile.
    pub fn author_url(&self, author_id: u64) -> Result<String> {
        let config = self.load_configuration()?;
        Ok(routing::author_url(&config.page.slug, author_id))
    }
}

/// Applies a composed page to the content item the host is about to render.
pub fn overwrite_page(page: &mut ContentPage, composed: &ComposedPage) {
    page.title = composed.title.clone();
    page.body = composed.body.clone();
}
