/*
 * This module consolidates the host-independent core of the plugin. It
 * re-exports the domain model, the two pure leaves (the tag substitution
 * engine and the statistic visibility resolver), the page composer, the
 * settings codec, and the storage abstractions (`OptionStoreOperations`,
 * `UserMetaOperations`, `PageStoreOperations`, `UserDirectoryOperations`)
 * together with their bundled file-backed/in-memory implementations.
 */
pub mod composer;
pub mod models;
pub mod option_store;
pub mod page_store;
pub mod settings_codec;
pub mod stat_resolver;
pub mod stat_values;
pub mod substitution;
pub mod user_directory;
pub mod user_meta;

// Re-export key structures and enums
pub use models::{
    ComposedPage, LifecycleFlags, PageSettings, ProfileConfiguration, StatKey, StatLine,
    StatRegistry, StatRegistryEntry, StatisticValue, UserIdentity, UserProfile,
};

// Re-export the pure leaves and the composer
pub use composer::{ProfileView, compose};
pub use stat_resolver::resolve_visible;
pub use stat_values::{account_age_days, compute_stat_values};
pub use substitution::{PlaceholderTag, TagBindings, substitute};

// Re-export settings codec items
pub use settings_codec::{SettingsError, StoredOptions};

// Re-export storage related items
pub use option_store::{FileOptionStore, OptionStoreError, OptionStoreOperations};
pub use page_store::{
    ContentPage, FilePageStore, PageStatus, PageStoreError, PageStoreOperations,
};
pub use user_directory::{InMemoryUserDirectory, UserAccount, UserDirectoryOperations};
pub use user_meta::{FileUserMetaStore, UserMetaError, UserMetaOperations};
