/// Session, account and profile operations
use chrono::Utc;
use tracing::info;

use crate::domain::{
    service_days, BadgeId, BadgeStatus, Owner, UserProfile, ANONYMOUS_LABEL, DEFAULT_NICKNAME,
};
use crate::security::{hash_password, normalize_email, validate_nickname, validate_password, verify_password};
use crate::session::SessionState;
use crate::storage::settings::{NICKNAME, PROFILE_IMAGE_URI};
use crate::storage::{
    BadgeStore, EntryStore, MonthlyStore, SettingsStore, UserStore,
};
use crate::{AppError, AppResult};

use super::DiaryService;

const LOGIN_FAILED: &str = "Email or password is incorrect";

impl DiaryService {
    /// The signed-in owner, if any
    pub fn current_owner(&self) -> AppResult<Option<Owner>> {
        Ok(self.session.load()?.current_owner)
    }

    /// The signed-in owner, or a validation error asking to sign in
    pub fn require_owner(&self) -> AppResult<Owner> {
        self.current_owner()?
            .ok_or_else(|| AppError::Validation("Sign in or start an anonymous session first".to_string()))
    }

    /// Switch to the device's anonymous identity, creating it on first use
    pub fn start_anonymous_session(&self) -> AppResult<Owner> {
        let mut state = self.session.load()?;
        let owner = match state.anonymous_owner.clone() {
            Some(owner) => owner,
            None => {
                let owner = Owner::new_anonymous();
                state.anonymous_owner = Some(owner.clone());
                state.anonymous_started_at = Some(Utc::now());
                info!("Created anonymous identity {}", owner);
                owner
            }
        };
        state.current_owner = Some(owner.clone());
        self.session.save(&state)?;
        Ok(owner)
    }

    /// Create an account and sign in as it
    pub fn sign_up(
        &self,
        email: &str,
        password: &str,
        password_confirm: &str,
        nickname: &str,
    ) -> AppResult<Owner> {
        let email = normalize_email(email)?;
        validate_password(password, password_confirm)?;
        let nickname = validate_nickname(nickname)?;

        let exists = self.storage.read(|conn| UserStore::new(conn).email_exists(&email))?;
        if exists {
            return Err(AppError::Validation("This email is already registered".to_string()));
        }

        let password_hash = hash_password(password)?;
        let user_id = self
            .storage
            .write(|tx| UserStore::new(tx).insert(&nickname, &email, &password_hash, Utc::now()))?;

        let owner = Owner::Registered(user_id);
        self.set_current_owner(Some(owner.clone()))?;
        info!("Signed up user {}", user_id);
        Ok(owner)
    }

    pub fn login(&self, email: &str, password: &str) -> AppResult<Owner> {
        let email = normalize_email(email).map_err(|_| AppError::Validation(LOGIN_FAILED.to_string()))?;
        let user = self
            .storage
            .read(|conn| UserStore::new(conn).find_by_email(&email))?
            .ok_or_else(|| AppError::Validation(LOGIN_FAILED.to_string()))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Validation(LOGIN_FAILED.to_string()));
        }

        let owner = Owner::Registered(user.id);
        self.set_current_owner(Some(owner.clone()))?;
        info!("User {} logged in", user.id);
        Ok(owner)
    }

    /// Sign out; the anonymous identity is kept for later
    pub fn logout(&self) -> AppResult<()> {
        self.set_current_owner(None)?;
        info!("Logged out");
        Ok(())
    }

    /// Delete the signed-in account and everything it owns
    pub fn withdraw_current_user(&self) -> AppResult<()> {
        let owner = self.require_owner()?;
        let user_id = owner
            .user_id()
            .ok_or_else(|| AppError::Validation("Only registered accounts can be withdrawn".to_string()))?;

        self.storage.write(|tx| {
            let entries = EntryStore::new(tx).delete_all_for_owner(&owner)?;
            MonthlyStore::new(tx).delete_all_for_owner(&owner)?;
            BadgeStore::new(tx).delete_all_for_owner(&owner)?;
            SettingsStore::new(tx).delete_all_for_owner(&owner)?;
            UserStore::new(tx).delete(user_id)?;
            info!("Withdrew user {} ({} entries removed)", user_id, entries);
            Ok(())
        })?;

        self.set_current_owner(None)?;
        Ok(())
    }

    /// Profile of the signed-in owner
    pub fn get_user_profile(&self) -> AppResult<UserProfile> {
        let state = self.session.load()?;
        let owner = state
            .current_owner
            .clone()
            .ok_or_else(|| AppError::Validation("Sign in or start an anonymous session first".to_string()))?;
        let now = Utc::now();

        let (user, nickname, selected_badge, profile_image_uri) = self.storage.read(|conn| {
            let settings = SettingsStore::new(conn);
            let user = match owner.user_id() {
                Some(id) => UserStore::new(conn).get(id)?,
                None => None,
            };
            Ok((
                user,
                settings.get(&owner, NICKNAME)?,
                BadgeStore::new(conn).selected(&owner)?,
                settings.get(&owner, PROFILE_IMAGE_URI)?,
            ))
        })?;

        let (nickname, account_label, since) = match (&owner, user) {
            (Owner::Registered(id), None) => return Err(AppError::NotFound(format!("user {}", id))),
            (Owner::Registered(_), Some(user)) => (user.nickname, user.email, user.created_at),
            (Owner::Anonymous(_), _) => (
                nickname.unwrap_or_else(|| DEFAULT_NICKNAME.to_string()),
                ANONYMOUS_LABEL.to_string(),
                state.anonymous_started_at.unwrap_or(now),
            ),
        };

        Ok(UserProfile {
            owner,
            nickname,
            account_label,
            service_days: service_days(since, now),
            selected_badge,
            profile_image_uri,
        })
    }

    /// Registered owners rename their account; anonymous ones keep the
    /// nickname in settings
    pub fn update_nickname(&self, nickname: &str) -> AppResult<()> {
        let owner = self.require_owner()?;
        let nickname = validate_nickname(nickname)?;

        let updated = self.storage.write(|tx| match owner.user_id() {
            Some(id) => UserStore::new(tx).update_nickname(id, &nickname),
            None => SettingsStore::new(tx).put(&owner, NICKNAME, &nickname).map(|_| true),
        })?;
        if !updated {
            return Err(AppError::NotFound(format!("account for {}", owner)));
        }
        Ok(())
    }

    pub fn update_profile_image(&self, uri: &str) -> AppResult<()> {
        let owner = self.require_owner()?;
        self.storage
            .write(|tx| SettingsStore::new(tx).put(&owner, PROFILE_IMAGE_URI, uri.trim()))?;
        Ok(())
    }

    /// Every catalog badge with the owner's earned and selected flags
    pub fn get_badge_statuses(&self, owner: &Owner) -> AppResult<Vec<BadgeStatus>> {
        Ok(self.storage.read(|conn| BadgeStore::new(conn).statuses(owner))?)
    }

    /// Choose the representative badge; it must already be earned
    pub fn select_badge(&self, owner: &Owner, badge_id: BadgeId) -> AppResult<()> {
        let selected = self.storage.write(|tx| BadgeStore::new(tx).select(owner, badge_id))?;
        if selected {
            return Ok(());
        }

        let known = self
            .storage
            .read(|conn| Ok(BadgeStore::new(conn).catalog()?.iter().any(|b| b.id == badge_id)))?;
        if known {
            Err(AppError::Validation("That badge has not been earned yet".to_string()))
        } else {
            Err(AppError::NotFound(format!("badge {}", badge_id)))
        }
    }

    fn set_current_owner(&self, owner: Option<Owner>) -> AppResult<()> {
        let state = self.session.load()?;
        self.session.save(&SessionState {
            current_owner: owner,
            ..state
        })?;
        Ok(())
    }
}
