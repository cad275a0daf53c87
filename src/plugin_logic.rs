/*
 * This module provides the coordination layer that connects the host
 * platform's hooks (activation/deactivation, query parsing, content
 * rendering, the settings surfaces) to the pure core. `ProfilePageLogic` is
 * the entry point; `routing` holds the route parsing and URL helpers, and
 * `forms` the data for the admin and per-user settings forms. Unit tests
 * for `ProfilePageLogic` are in `handler_tests.rs`.
 */
pub mod forms;
pub mod handler;
pub mod routing;


pub use forms::{
    AdminSettingsForm, AdminSettingsSubmission, CheckboxField, UserProfileSubmission,
    UserSettingsForm,
};
pub use handler::{EDIT_PROFILE_URL, LogicError, ProfilePageLogic, overwrite_page};
pub use routing::{RewriteRule, RouteTarget};
