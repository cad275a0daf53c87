/*
 * Abstraction over the host's account directory: identity lookup by id or
 * login plus the live counters the statistics are computed from. Reads of
 * missing accounts return None / zero rather than an error; the host's user
 * table is the source of truth and this crate only consumes it.
 *
 * `InMemoryUserDirectory` is the bundled implementation for embedders and
 * tests; a real host adapts its own user storage behind the trait.
 */
use super::models::UserIdentity;

pub trait UserDirectoryOperations: Send + Sync {
    fn find_by_id(&self, user_id: u64) -> Option<UserIdentity>;
    fn find_by_login(&self, login: &str) -> Option<UserIdentity>;
    /// Published post count for the user; 0 when unknown.
    fn post_count(&self, user_id: u64) -> u64;
    /// Approved comment count for the user; 0 when unknown.
    fn comment_count(&self, user_id: u64) -> u64;
    /// The host's user-level attribute; empty when unknown.
    fn user_level(&self, user_id: u64) -> String;
    /// Host-rendered avatar markup for the user; empty when there is none.
    fn avatar_markup(&self, user_id: u64) -> String;
}

// One registered account plus the counters the host would otherwise derive
// from its post/comment tables.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub identity: UserIdentity,
    pub post_count: u64,
    pub comment_count: u64,
    pub user_level: String,
    pub avatar_markup: String,
}

#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    accounts: Vec<UserAccount>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        InMemoryUserDirectory {
            accounts: Vec::new(),
        }
    }

    pub fn add_account(&mut self, account: UserAccount) {
        log::trace!(
            "InMemoryUserDirectory: Registering account '{}' (id {}).",
            account.identity.login,
            account.identity.id
        );
        self.accounts.push(account);
    }

    fn account_by_id(&self, user_id: u64) -> Option<&UserAccount> {
        self.accounts.iter().find(|a| a.identity.id == user_id)
    }
}

impl UserDirectoryOperations for InMemoryUserDirectory {
    fn find_by_id(&self, user_id: u64) -> Option<UserIdentity> {
        self.account_by_id(user_id).map(|a| a.identity.clone())
    }

    fn find_by_login(&self, login: &str) -> Option<UserIdentity> {
        self.accounts
            .iter()
            .find(|a| a.identity.login == login)
            .map(|a| a.identity.clone())
    }

    fn post_count(&self, user_id: u64) -> u64 {
        self.account_by_id(user_id).map_or(0, |a| a.post_count)
    }

    fn comment_count(&self, user_id: u64) -> u64 {
        self.account_by_id(user_id).map_or(0, |a| a.comment_count)
    }

    fn user_level(&self, user_id: u64) -> String {
        self.account_by_id(user_id)
            .map(|a| a.user_level.clone())
            .unwrap_or_default()
    }

    fn avatar_markup(&self, user_id: u64) -> String {
        self.account_by_id(user_id)
            .map(|a| a.avatar_markup.clone())
            .unwrap_or_default()
    }
}
