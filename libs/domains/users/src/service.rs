use chrono::Utc;
use database::firestore::Document;
use email::NotificationService;
use observability::IdentityMetrics;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::identity::{IdentityError, IdentityProvider};
use crate::models::{
    CreateUser, DELETED_AT_FIELD, LoginRequest, UserProfile, identity_uid, is_tombstone,
};
use crate::repository::UserRepository;

/// Service layer for accounts and their profiles
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    identity: Arc<dyn IdentityProvider>,
    notifications: NotificationService,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(
        repository: R,
        identity: Arc<dyn IdentityProvider>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            identity,
            notifications,
        }
    }

    /// Create the identity, then its participant profile. Returns the uid.
    ///
    /// A failed profile write leaves the identity in place.
    pub async fn register(&self, input: CreateUser) -> UserResult<String> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let uid = match self.identity.create_user(&input.email, &input.password).await {
            Ok(uid) => uid,
            Err(err) => {
                IdentityMetrics::record_operation("create_user", false);
                return Err(UserError::IdentityCreation(err.to_string()));
            }
        };
        IdentityMetrics::record_operation("create_user", true);

        let profile = UserProfile::participant(uid.clone(), &input).into_document();
        if let Err(err) = self.repository.put(&uid, profile).await {
            error!(uid = %uid, error = %err, "Profile write failed; identity left without profile");
            return Err(UserError::IdentityCreation(err.to_string()));
        }

        info!(uid = %uid, "Registered user");
        Ok(uid)
    }

    pub async fn authenticate(&self, input: LoginRequest) -> UserResult<String> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let result = self
            .identity
            .sign_in_with_password(&input.email, &input.password)
            .await;
        IdentityMetrics::record_operation("sign_in", result.is_ok());

        result.map_err(|err| UserError::Authentication(err.to_string()))
    }

    /// Generate a reset link and email it to `email`
    pub async fn request_password_reset(&self, email: &str) -> UserResult<()> {
        let link = self.identity.password_reset_link(email).await;
        IdentityMetrics::record_operation("password_reset_link", link.is_ok());
        let link = link.map_err(|err| UserError::ResetLink(err.to_string()))?;

        let sent = self.notifications.send_password_reset(email, &link).await;
        IdentityMetrics::record_reset_email(sent.is_ok());
        sent.map_err(|err| UserError::EmailDelivery(format!("{:#}", err)))?;

        Ok(())
    }

    /// The stored profile; tombstoned profiles read as missing
    pub async fn fetch_profile(&self, id: &str) -> UserResult<Document> {
        self.live_profile(id).await
    }

    /// Merge `fields` into the profile; fields not supplied are kept.
    ///
    /// The tombstone marker can only be written by [`Self::delete_profile`].
    pub async fn update_profile(&self, id: &str, fields: Document) -> UserResult<()> {
        if fields.contains_key(DELETED_AT_FIELD) {
            return Err(UserError::Validation(format!(
                "{} cannot be set through a profile update",
                DELETED_AT_FIELD
            )));
        }
        self.live_profile(id).await?;
        self.repository.merge(id, fields).await?;
        info!(id = %id, "Updated profile");
        Ok(())
    }

    /// Delete the profile, then its identity.
    ///
    /// When the identity delete fails the profile is written back with
    /// `deleted_at` set and the call fails; calling again retries the
    /// identity delete.
    pub async fn delete_profile(&self, id: &str) -> UserResult<()> {
        let profile = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        let uid = identity_uid(&profile, id).to_string();

        self.repository.delete(id).await?;

        match self.identity.delete_user(&uid).await {
            Ok(()) => {}
            Err(IdentityError::UserNotFound) => {
                warn!(id = %id, uid = %uid, "Identity already gone; profile removed");
            }
            Err(err) => {
                IdentityMetrics::record_operation("delete_user", false);
                self.tombstone(id, profile).await;
                return Err(UserError::Internal(format!(
                    "Error deleting user {}: {}",
                    uid, err
                )));
            }
        }

        IdentityMetrics::record_operation("delete_user", true);
        info!(id = %id, uid = %uid, "Deleted profile and identity");
        Ok(())
    }

    async fn live_profile(&self, id: &str) -> UserResult<Document> {
        self.repository
            .get(id)
            .await?
            .filter(|profile| !is_tombstone(profile))
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    async fn tombstone(&self, id: &str, mut profile: Document) {
        profile
            .entry(DELETED_AT_FIELD)
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));

        match self.repository.put(id, profile).await {
            Ok(()) => warn!(id = %id, "Identity delete failed; profile tombstoned"),
            Err(err) => error!(
                id = %id,
                error = %err,
                "Identity delete failed and tombstone could not be written"
            ),
        }
    }
}
