//! Route guards over the session state store
//!
//! Checks performed before an operation that redirect-or-reject
//! unauthenticated and under-privileged users. Guards read the session
//! state only; they never touch the network.

use tracing::warn;

use common::{AuthError, AuthResult};

use crate::models::{AuthUser, Role};
use crate::state::SessionStore;

/// Require a logged-in session, returning the authenticated user.
///
/// Fails with `SessionExpired` when nobody is logged in (including while the
/// initial session check is still loading).
pub fn require_login(store: &SessionStore) -> AuthResult<AuthUser> {
    match store.user() {
        Some(user) if store.is_logged_in() => Ok(user),
        _ => Err(AuthError::SessionExpired),
    }
}

/// Require a logged-in user whose role satisfies `required`.
///
/// Fails with `Forbidden` when logged in under an insufficient role.
pub fn require_role(store: &SessionStore, required: Role) -> AuthResult<AuthUser> {
    let user = require_login(store)?;
    if user.role.satisfies(required) {
        Ok(user)
    } else {
        warn!(
            "User {} with role {} denied access requiring {}",
            user.email, user.role, required
        );
        Err(AuthError::Forbidden(format!("requires {} role", required)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::client::ApiClient;
    use crate::config::ClientConfig;
    use crate::credentials::MemoryCredentialStore;
    use crate::navigator::NoopNavigator;

    fn store_with_user(role: Option<Role>) -> SessionStore {
        let client = ApiClient::new(
            &ClientConfig::default(),
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(NoopNavigator),
        )
        .unwrap();
        let store = SessionStore::new(Arc::new(client));
        if let Some(role) = role {
            store.set_state_for_tests(AuthUser {
                id: 1,
                email: "a@b.com".to_string(),
                role,
            });
        }
        store
    }

    #[test]
    fn rejects_logged_out_session() {
        let store = store_with_user(None);
        assert!(matches!(
            require_login(&store),
            Err(AuthError::SessionExpired)
        ));
    }

    #[test]
    fn member_is_forbidden_from_admin_guard() {
        let store = store_with_user(Some(Role::Member));
        assert!(matches!(
            require_role(&store, Role::Admin),
            Err(AuthError::Forbidden(_))
        ));
    }

    #[test]
    fn super_admin_passes_admin_guard() {
        let store = store_with_user(Some(Role::SuperAdmin));
        let user = require_role(&store, Role::Admin).unwrap();
        assert_eq!(user.role, Role::SuperAdmin);
    }

    #[test]
    fn exact_role_passes_its_own_guard() {
        let store = store_with_user(Some(Role::Elder));
        assert!(require_role(&store, Role::Elder).is_ok());
        assert!(require_role(&store, Role::Leader).is_err());
    }
}
