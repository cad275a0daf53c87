/*
 * profile_pages: a library giving each registered user a publicly viewable
 * profile page with a free-text biography (with substitution tags) and a
 * configurable set of account statistics.
 *
 * The crate is split into a host-independent `core` (the tag substitution
 * engine, the statistic visibility resolver, the page composer, the settings
 * codec, and the storage abstractions) and a `plugin_logic` layer that wires
 * the host platform's lifecycle and rendering hooks onto that core.
 */
pub mod core;
pub mod plugin_logic;

pub use crate::core::{ComposedPage, ProfileConfiguration, StatKey, UserIdentity, UserProfile};
pub use crate::plugin_logic::ProfilePageLogic;
