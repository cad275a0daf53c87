/*
 * Computes the live statistic values for one page view. Values are derived
 * from the user directory and the registration timestamp at request time and
 * are never persisted. Only keys present in the registry are computed; a
 * registered key with no known computation source simply yields no entry,
 * which the resolver renders as an empty value.
 */
use super::models::{StatKey, StatRegistry, StatisticValue, UserIdentity};
use super::user_directory::UserDirectoryOperations;
use std::collections::HashMap;
use time::OffsetDateTime;

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days between registration and `now`, clamped at zero.
pub fn account_age_days(registered_at: OffsetDateTime, now: OffsetDateTime) -> i64 {
    let elapsed = (now - registered_at).whole_seconds();
    (elapsed / SECONDS_PER_DAY).max(0)
}

pub fn compute_stat_values(
    directory: &dyn UserDirectoryOperations,
    identity: &UserIdentity,
    registry: &StatRegistry,
    now: OffsetDateTime,
) -> HashMap<StatKey, StatisticValue> {
    let mut values = HashMap::new();
    for entry in registry.iter() {
        let computed = match entry.key.as_str() {
            "age" => Some(StatisticValue::new(
                account_age_days(identity.registered_at, now).to_string(),
                "days",
            )),
            "posts" => Some(StatisticValue::plain(
                directory.post_count(identity.id).to_string(),
            )),
            "comments" => Some(StatisticValue::plain(
                directory.comment_count(identity.id).to_string(),
            )),
            "userlevel" => Some(StatisticValue::plain(directory.user_level(identity.id))),
            other => {
                log::debug!("compute_stat_values: no computation source for stat '{other}'");
                None
            }
        };
        if let Some(value) = computed {
            values.insert(entry.key.clone(), value);
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ProfileConfiguration;
    use crate::core::user_directory::{InMemoryUserDirectory, UserAccount};
    use time::Duration;

    fn test_account() -> UserAccount {
        UserAccount {
            identity: UserIdentity {
                id: 42,
                login: "jdoe".to_string(),
                display_name: "J. Doe".to_string(),
                email: "jdoe@example.org".to_string(),
                website: String::new(),
                registered_at: OffsetDateTime::UNIX_EPOCH,
                aim: String::new(),
                yim: String::new(),
                gtalk: String::new(),
                biography: String::new(),
            },
            post_count: 10,
            comment_count: 4,
            user_level: "2".to_string(),
            avatar_markup: String::new(),
        }
    }

    #[test]
    fn test_account_age_days() {
        let registered = OffsetDateTime::UNIX_EPOCH;
        assert_eq!(account_age_days(registered, registered + Duration::days(5)), 5);
        // Partial days are truncated.
        assert_eq!(
            account_age_days(registered, registered + Duration::hours(47)),
            1
        );
        // A registration timestamp in the future clamps to zero.
        assert_eq!(
            account_age_days(registered + Duration::days(3), registered),
            0
        );
    }

    #[test]
    fn test_compute_covers_the_default_registry() {
        let mut directory = InMemoryUserDirectory::new();
        let account = test_account();
        let identity = account.identity.clone();
        directory.add_account(account);
        let config = ProfileConfiguration::default_install();
        let now = OffsetDateTime::UNIX_EPOCH + Duration::days(5);

        let values = compute_stat_values(&directory, &identity, &config.registry, now);

        assert_eq!(values.len(), 4);
        let age = &values[&StatKey::from("age")];
        assert_eq!(age.value, "5");
        assert_eq!(age.unit, "days");
        assert_eq!(values[&StatKey::from("posts")].value, "10");
        assert_eq!(values[&StatKey::from("comments")].value, "4");
        assert_eq!(values[&StatKey::from("userlevel")].value, "2");
    }

    #[test]
    fn test_unknown_registered_key_yields_no_entry() {
        let mut directory = InMemoryUserDirectory::new();
        let account = test_account();
        let identity = account.identity.clone();
        directory.add_account(account);
        let mut config = ProfileConfiguration::default_install();
        config
            .registry
            .push(StatKey::from("karma"), "Karma", true);

        let values = compute_stat_values(
            &directory,
            &identity,
            &config.registry,
            OffsetDateTime::UNIX_EPOCH,
        );

        assert!(!values.contains_key(&StatKey::from("karma")));
        assert_eq!(values.len(), 4);
    }
}
