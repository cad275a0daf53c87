/*
 * The profile page composer: assembles the final page title and body from
 * the avatar markup, the substituted bio, the resolved stat lines, and the
 * owner-only edit link. Section order is fixed (avatar, bio, stats, edit
 * link) and an empty section contributes zero output, so no stray separator
 * markup surrounds an empty bio or an empty stats block.
 *
 * Target resolution happens upstream: the composer receives either a fully
 * resolved `ProfileView` or nothing, in which case it emits the generic
 * title and the logged-out placeholder body.
 */
use super::models::{ComposedPage, StatLine, UserIdentity};

const GENERIC_TITLE: &str = "User Profile Page";
const LOGGED_OUT_BODY: &str =
    "You are not logged in. You cannot have a profile page unless you register an account.";

// Everything already resolved for one profile render: the target's identity,
// the substituted bio text, and the visible stat rows.
#[derive(Debug, Clone)]
pub struct ProfileView {
    pub identity: UserIdentity,
    pub bio: String,
    pub stats: Vec<StatLine>,
}

pub fn compose(
    view: Option<&ProfileView>,
    avatar_markup: &str,
    is_owner: bool,
    edit_url: &str,
) -> ComposedPage {
    let Some(view) = view else {
        return ComposedPage {
            title: GENERIC_TITLE.to_string(),
            body: LOGGED_OUT_BODY.to_string(),
        };
    };

    let mut body = String::new();
    body.push_str(avatar_markup);

    if !view.bio.is_empty() {
        body.push_str("<hr><p>");
        body.push_str(&view.bio);
        body.push_str("</p><br /><br /><hr>");
    }

    if !view.stats.is_empty() {
        body.push_str(&format!(
            "<h2>{}'s Stats:</h2><p>",
            view.identity.display_name
        ));
        for line in &view.stats {
            body.push_str(&format!("{}: {} {}<br />", line.label, line.value, line.unit));
        }
        body.push_str("</p>");
    }

    if is_owner {
        body.push_str(&format!(
            "<hr><p><a href='{edit_url}'>Edit your profile</a></p>"
        ));
    }

    ComposedPage {
        title: format!("{}'s Profile", view.identity.display_name),
        body,
    }
}
