// ABOUTME: Identity of the party issuing a read or write
// ABOUTME: Parses raw identity values into an optional user id and closed role

use opsdesk_core::Role;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Option<String>,
    pub role: Option<Role>,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: Some(user_id.into()),
            role: Some(role),
        }
    }

    /// Anonymous caller; sees nothing
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build a caller from raw identity values. Blank ids and unrecognised
    /// role strings are treated as absent.
    pub fn from_raw(user_id: Option<&str>, role: Option<&str>) -> Self {
        let user_id = user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        let role = role.and_then(|raw| match raw.parse::<Role>() {
            Ok(role) => Some(role),
            Err(e) => {
                warn!(audit = true, "Ignoring caller role: {}", e);
                None
            }
        });

        Self { user_id, role }
    }

    pub fn has_role(&self, check: impl Fn(&Role) -> bool) -> bool {
        self.role.as_ref().is_some_and(check)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_parses_known_role() {
        let caller = Caller::from_raw(Some("usr-1"), Some("sales"));
        assert_eq!(caller, Caller::new("usr-1", Role::Sales));
    }

    #[test]
    fn test_from_raw_drops_unknown_role_and_blank_id() {
        let caller = Caller::from_raw(Some("  "), Some("manager"));
        assert_eq!(caller, Caller::anonymous());
    }

    #[test]
    fn test_has_role() {
        let caller = Caller::new("usr-1", Role::Admin);
        assert!(caller.has_role(Role::can_review));
        assert!(!Caller::anonymous().has_role(Role::can_review));
    }
}
