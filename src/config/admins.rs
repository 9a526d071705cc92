//! Admin allow-list loaded from environment variables.
//!
//! `DEALDESK_ADMIN_IDS` holds a comma-separated list of Discord user ids that may run
//! mutating commands. When the variable is unset or empty, everyone may.

use std::collections::HashSet;

/// Set of Discord user ids allowed to run admin commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminList {
    ids: HashSet<String>,
}

impl AdminList {
    /// Parses a comma-separated id list, ignoring blanks and surrounding whitespace.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let ids = raw
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToString::to_string)
            .collect();
        Self { ids }
    }

    /// Reads `DEALDESK_ADMIN_IDS` from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var("DEALDESK_ADMIN_IDS")
            .map(|raw| Self::parse(&raw))
            .unwrap_or_default()
    }

    /// Whether `user_id` may run admin commands.
    #[must_use]
    pub fn allows(&self, user_id: &str) -> bool {
        self.ids.is_empty() || self.ids.contains(user_id)
    }

    /// Whether the allow-list restricts anyone at all.
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        !self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_allows_everyone() {
        let admins = AdminList::parse("");
        assert!(!admins.is_restricted());
        assert!(admins.allows("123"));
    }

    #[test]
    fn test_parse_ignores_blanks_and_whitespace() {
        let admins = AdminList::parse(" 111 , ,222,");
        assert!(admins.is_restricted());
        assert!(admins.allows("111"));
        assert!(admins.allows("222"));
        assert!(!admins.allows("333"));
    }
}
