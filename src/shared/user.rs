/**
 * User Model
 *
 * This module defines the user record exchanged between the user directory,
 * the session service and the HTTP layer, together with the closed set of
 * roles a user can hold.
 *
 * # Roles
 *
 * Roles are a static enumeration, not a persisted catalog. On the wire and
 * in the `users_roles` junction table a role is its upper-case name, and
 * parsing is an exact, case-sensitive match.
 */

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// Externally supplied user identity (primary key of `users`)
pub type UserId = i64;

/// A role a user can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Full administrative access (register, edit, delete users)
    Admin,
    /// Regular user
    Normal,
    /// Read-mostly user
    Basic,
}

impl Role {
    /// Every role known to the system
    pub const ALL: [Role; 3] = [Role::Admin, Role::Normal, Role::Basic];

    /// Name stored in the junction table and carried in token claims
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Normal => "NORMAL",
            Role::Basic => "BASIC",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| SharedError::validation("roles", format!("unknown role '{}'", s)))
    }
}

/// Display name, always stored upper-case
///
/// Every construction path (including deserialization) normalizes the
/// value, so a `DisplayName` read back from the database compares equal to
/// the one that was written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DisplayName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for DisplayName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<DisplayName> for String {
    fn from(name: DisplayName) -> Self {
        name.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User record
///
/// A persisted user always holds at least one role. The password digest is
/// never serialized outward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Externally supplied identity
    pub id: UserId,
    /// Email address (unique)
    pub email: String,
    /// Upper-cased display name
    pub name: DisplayName,
    /// Password digest (bcrypt)
    #[serde(skip)]
    pub password_digest: String,
    /// Role set
    pub roles: BTreeSet<Role>,
    /// Created at (Unix seconds)
    pub created_at: i64,
    /// Updated at (Unix seconds)
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_name() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_parse_is_case_sensitive() {
        assert!("admin".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
        assert!("SUPERUSER".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_upper_case() {
        let json = serde_json::to_string(&vec![Role::Admin, Role::Basic]).unwrap();
        assert_eq!(json, r#"["ADMIN","BASIC"]"#);
        assert!(serde_json::from_str::<Role>(r#""normal""#).is_err());
    }

    #[test]
    fn test_display_name_uppercases_on_every_path() {
        assert_eq!(DisplayName::new("  muchlis ").as_str(), "MUCHLIS");
        assert_eq!(DisplayName::from("Dype".to_string()).as_str(), "DYPE");

        let parsed: DisplayName = serde_json::from_str(r#""mixed Case""#).unwrap();
        assert_eq!(parsed.as_str(), "MIXED CASE");
    }

    #[test]
    fn test_user_never_serializes_password_digest() {
        let user = User {
            id: 1,
            email: "example@example.com".to_string(),
            name: DisplayName::new("example"),
            password_digest: "$2b$04$secret".to_string(),
            roles: BTreeSet::from([Role::Normal]),
            created_at: 1_631_341_964,
            updated_at: 1_631_341_964,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_digest").is_none());
        assert_eq!(json["name"], "EXAMPLE");
        assert_eq!(json["roles"], serde_json::json!(["NORMAL"]));
    }
}
