//! Wire types for the authentication endpoints

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// User role as consumed by route guards.
///
/// The canonical representation is SCREAMING_SNAKE uppercase. Casing is
/// normalized here, at the single point where server responses are parsed;
/// call sites never touch casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
    Elder,
    Leader,
    Member,
}

impl Role {
    /// Canonical wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Elder => "ELDER",
            Role::Leader => "LEADER",
            Role::Member => "MEMBER",
        }
    }

    /// Whether this role satisfies a guard requiring `required`.
    ///
    /// `SuperAdmin` satisfies every requirement and `Admin` satisfies
    /// everything except `SuperAdmin`; the remaining roles match exactly.
    pub fn satisfies(&self, required: Role) -> bool {
        match (self, required) {
            (Role::SuperAdmin, _) => true,
            (Role::Admin, Role::SuperAdmin) => false,
            (Role::Admin, _) => true,
            _ => *self == required,
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            "SUPER_ADMIN" | "SUPERADMIN" => Ok(Role::SuperAdmin),
            "ELDER" => Ok(Role::Elder),
            "LEADER" => Ok(Role::Leader),
            "MEMBER" => Ok(Role::Member),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Authenticated user identity as reported by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

/// Request body for user login
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response from the login endpoint
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub user: AuthUser,
    pub access_token: String,
    pub refresh_token: String,
}

/// Response from the session-check endpoint
#[derive(Debug, Deserialize)]
pub struct CheckResponse {
    #[serde(rename = "isLoggedIn")]
    pub is_logged_in: bool,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

/// Response from the token refresh endpoint
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Request body for account creation
#[derive(Debug, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

/// Generic message body used by the backend for both success and error
/// responses
#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_normalizes_casing_at_parse() {
        for raw in ["admin", "Admin", "ADMIN", " admin "] {
            assert_eq!(raw.parse::<Role>().unwrap(), Role::Admin);
        }
        assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("superadmin".parse::<Role>().unwrap(), Role::SuperAdmin);
    }

    #[test]
    fn role_rejects_unknown_values() {
        assert!("pastor".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn role_round_trips_through_serde() {
        let user: AuthUser =
            serde_json::from_str(r#"{"id":1,"email":"a@b.com","role":"member"}"#).unwrap();
        assert_eq!(user.role, Role::Member);

        let encoded = serde_json::to_string(&user).unwrap();
        assert!(encoded.contains(r#""role":"MEMBER""#));
    }

    #[test]
    fn satisfies_lattice() {
        assert!(Role::SuperAdmin.satisfies(Role::Admin));
        assert!(Role::SuperAdmin.satisfies(Role::Elder));
        assert!(Role::Admin.satisfies(Role::Member));
        assert!(!Role::Admin.satisfies(Role::SuperAdmin));
        assert!(Role::Elder.satisfies(Role::Elder));
        assert!(!Role::Member.satisfies(Role::Admin));
    }

    #[test]
    fn check_response_tolerates_missing_user() {
        let body: CheckResponse = serde_json::from_str(r#"{"isLoggedIn":false}"#).unwrap();
        assert!(!body.is_logged_in);
        assert!(body.user.is_none());
    }
}
