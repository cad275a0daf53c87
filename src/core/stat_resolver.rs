/*
 * The statistic visibility resolver: the join between the admin-enabled
 * registry and the per-user opt-in set. Registry insertion order is
 * authoritative and drives output order. Pure, no I/O, and total: a key with
 * no computed value renders as an empty string rather than failing, so
 * host-level storage drift can never break page rendering.
 */
use super::models::{StatKey, StatLine, StatRegistry, StatisticValue, UserProfile};
use std::collections::HashMap;

/*
 * Produces the ordered stat rows to render for one user. A registry entry
 * contributes a row iff it is admin-enabled AND in the user's visible set;
 * everything else is silently skipped, never an error.
 */
pub fn resolve_visible(
    registry: &StatRegistry,
    profile: &UserProfile,
    values: &HashMap<StatKey, StatisticValue>,
) -> Vec<StatLine> {
    let mut lines = Vec::new();
    for entry in registry.iter() {
        if !entry.enabled || !profile.is_stat_visible(&entry.key) {
            continue;
        }
        let (value, unit) = match values.get(&entry.key) {
            Some(v) => (v.value.clone(), v.unit.clone()),
            None => {
                // Configuration drift: the key is registered and visible but
                // was never computed. Render an empty value.
                log::warn!(
                    "resolve_visible: no computed value for enabled stat '{}'",
                    entry.key
                );
                (String::new(), String::new())
            }
        };
        lines.push(StatLine {
            label: entry.label.clone(),
            value,
            unit,
        });
    }
    lines
}
