//! Mock authentication over the stored user list.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::models::{new_id, AuthToken, User, UserProfile, UserRole};
use crate::stats::{self, AdminStats};
use crate::storage::{read_json, AUTH_TOKEN_KEY, USERS_KEY, USER_PROFILES_KEY};
use crate::store::{persist, DataStore, StoreResult};

impl DataStore {
    /// Resolves a persisted auth token into the current user.
    pub(crate) fn restore_session(&mut self) {
        let token: Option<AuthToken> = match read_json(self.storage.as_ref(), AUTH_TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "discarding unreadable auth token");
                None
            }
        };
        let Some(token) = token else { return };

        match self.users.iter().find(|u| u.id == token.user_id) {
            Some(user) => {
                debug!(user_id = %user.id, "session restored");
                self.current_user = Some(user.clone());
            }
            None => {
                warn!(user_id = %token.user_id, "auth token refers to unknown user");
                if let Err(e) = self.storage.remove_item(AUTH_TOKEN_KEY) {
                    warn!(error = %e, "failed to remove stale auth token");
                }
            }
        }
    }

    pub fn login(&mut self, email: &str, password: &str) -> StoreResult<User> {
        let user = self
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()) && u.password == password)
            .cloned()
            .ok_or(StoreError::InvalidCredentials)?;

        let token = AuthToken {
            user_id: user.id.clone(),
            issued_at: Utc::now(),
        };
        persist(self.storage.as_mut(), AUTH_TOKEN_KEY, &token);
        info!(user_id = %user.id, role = %user.role, "logged in");
        self.set_current_user(Some(user.clone()));
        Ok(user)
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.storage.remove_item(AUTH_TOKEN_KEY) {
            warn!(error = %e, "failed to remove auth token");
        }
        if let Some(user) = self.current_user.take() {
            info!(user_id = %user.id, "logged out");
        }
    }

    /// Creates an account and logs it in. Job seekers start with an empty
    /// profile.
    pub fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
        company_id: Option<String>,
    ) -> StoreResult<User> {
        if role == UserRole::Admin {
            return Err(StoreError::Forbidden(
                "Admin accounts cannot be self-registered".to_string(),
            ));
        }
        let email = email.trim();
        if self.users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(StoreError::EmailTaken);
        }
        if let Some(id) = &company_id {
            if self.get_company(id).is_none() {
                return Err(StoreError::Forbidden(format!("Company {} does not exist", id)));
            }
        }

        let user = User {
            id: new_id("user"),
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            role,
            company_id: if role == UserRole::Employer { company_id } else { None },
            created_at: Utc::now(),
        };
        self.users.push(user.clone());
        persist(self.storage.as_mut(), USERS_KEY, &self.users);

        if role == UserRole::JobSeeker {
            self.profiles.push(UserProfile {
                id: user.id.clone(),
                name: user.name.clone(),
                email: user.email.clone(),
                ..Default::default()
            });
            persist(self.storage.as_mut(), USER_PROFILES_KEY, &self.profiles);
        }
        info!(user_id = %user.id, role = %role, "registered");

        self.login(email, password)
    }

    fn require_admin(&self) -> StoreResult<()> {
        match self.current_user() {
            Some(u) if u.role == UserRole::Admin => Ok(()),
            Some(_) => Err(StoreError::Forbidden(
                "Only admin accounts can manage users".to_string(),
            )),
            None => Err(StoreError::NotLoggedIn),
        }
    }

    pub fn list_users(&self) -> StoreResult<&[User]> {
        self.require_admin()?;
        Ok(&self.users)
    }

    /// Filters the user out of the list. Their applications, saved jobs
    /// and profile are left in place.
    pub fn delete_user(&mut self, user_id: &str) -> StoreResult<()> {
        self.require_admin()?;
        if self.current_user().is_some_and(|u| u.id == user_id) {
            return Err(StoreError::Forbidden(
                "Admins cannot delete their own account".to_string(),
            ));
        }
        let before = self.users.len();
        self.users.retain(|u| u.id != user_id);
        if self.users.len() == before {
            return Err(StoreError::UserNotFound(user_id.to_string()));
        }
        info!(user_id, "user deleted");
        persist(self.storage.as_mut(), USERS_KEY, &self.users);
        Ok(())
    }

    pub fn admin_stats(&self) -> StoreResult<AdminStats> {
        self.require_admin()?;
        Ok(stats::admin_stats(
            &self.users,
            &self.companies,
            &self.jobs,
            &self.applications,
        ))
    }
}
