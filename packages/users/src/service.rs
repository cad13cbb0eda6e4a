// ABOUTME: User service for registration, login and profile management
// ABOUTME: Resolves avatar URLs through object storage and hashes credentials with argon2

use std::sync::Arc;

use bytes::Bytes;
use rand::{distributions::Alphanumeric, Rng};
use tracing::{debug, info, warn};

use crate::error::UserError;
use crate::password::{hash_password, verify_password};
use crate::storage::{UserRecord, UserStorage};
use crate::types::{ProfileUpdateInput, RegisterInput, User};
use crate::validation::{
    avatar_extension, email_local_part, is_valid_email, is_valid_unique_name, MAX_AVATAR_BYTES,
};
use todo_core::{now_millis, Clock, IdGenerator, AVATAR_KEY_PREFIX, DEFAULT_AVATAR_KEY};
use todo_storage::ObjectStorage;

const SESSION_KEY_LENGTH: usize = 32;

fn generate_session_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_KEY_LENGTH)
        .map(char::from)
        .collect()
}

#[derive(Clone)]
pub struct UserService {
    storage: Arc<UserStorage>,
    objects: ObjectStorage,
    ids: Arc<dyn IdGenerator>,
    clock: Clock,
}

impl UserService {
    pub fn new(storage: Arc<UserStorage>, objects: ObjectStorage, ids: Arc<dyn IdGenerator>) -> Self {
        Self::with_clock(storage, objects, ids, Arc::new(now_millis))
    }

    pub fn with_clock(
        storage: Arc<UserStorage>,
        objects: ObjectStorage,
        ids: Arc<dyn IdGenerator>,
        clock: Clock,
    ) -> Self {
        Self {
            storage,
            objects,
            ids,
            clock,
        }
    }

    fn to_user(&self, record: UserRecord) -> User {
        let icon_url = self.objects.object_url(&record.icon_uri);
        User {
            id: record.id,
            name: record.name,
            unique_name: record.unique_name,
            email: record.email,
            description: record.description,
            icon_uri: record.icon_uri,
            icon_url,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    pub async fn register(&self, input: RegisterInput) -> Result<User, UserError> {
        let email = input.email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(UserError::InvalidEmail);
        }
        if input.password.is_empty() {
            return Err(UserError::InvalidPassword);
        }
        if self.storage.email_exists(&email).await? {
            return Err(UserError::EmailExists);
        }

        let local_part = email_local_part(&email).to_string();
        let name = input
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| local_part.clone());

        // Fall back to the whole address when the local part is already claimed
        let unique_name = if self.storage.unique_name_taken(&local_part, None).await? {
            email.clone()
        } else {
            local_part
        };

        let password = hash_password(&input.password)?;
        let id = self.ids.generate_id().await?;
        let now = (self.clock)();

        let record = UserRecord {
            id,
            name,
            unique_name,
            email,
            password,
            description: String::new(),
            icon_uri: DEFAULT_AVATAR_KEY.to_string(),
            session_key: String::new(),
            created_at: now,
            updated_at: now,
        };
        self.storage.create_user(&record).await?;
        info!("Registered user {}", record.id);

        Ok(self.to_user(record))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, UserError> {
        let record = self
            .storage
            .get_user_by_email(email.trim())
            .await?
            .ok_or(UserError::UserNotFound)?;

        if !verify_password(password, &record.password) {
            warn!("Failed login attempt for user {}", record.id);
            return Err(UserError::InvalidCredentials);
        }

        Ok(self.to_user(record))
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User, UserError> {
        let record = self
            .storage
            .get_user(user_id)
            .await?
            .ok_or(UserError::UserNotFound)?;
        Ok(self.to_user(record))
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        input: ProfileUpdateInput,
    ) -> Result<User, UserError> {
        let name = input
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        let unique_name = input.unique_name.as_deref().map(str::trim);

        if let Some(unique_name) = unique_name {
            if !is_valid_unique_name(unique_name) {
                return Err(UserError::InvalidUniqueName);
            }
            if self
                .storage
                .unique_name_taken(unique_name, Some(user_id))
                .await?
            {
                return Err(UserError::UniqueNameExists);
            }
        }

        let now = (self.clock)();
        self.storage
            .update_profile(user_id, name, unique_name, now)
            .await?;

        self.get_user(user_id).await
    }

    /// Store a new avatar and return its public URL
    pub async fn update_avatar(
        &self,
        user_id: i64,
        content_type: &str,
        payload: Bytes,
    ) -> Result<String, UserError> {
        let ext = avatar_extension(content_type)
            .ok_or_else(|| UserError::UnsupportedImageType(content_type.to_string()))?;
        if payload.len() > MAX_AVATAR_BYTES {
            return Err(UserError::AvatarTooLarge);
        }

        let key = format!("{}/{}.{}", AVATAR_KEY_PREFIX, user_id, ext);
        self.objects.put_object(&key, payload).await?;

        let now = (self.clock)();
        self.storage.update_avatar(user_id, &key, now).await?;
        info!("Updated avatar for user {}", user_id);

        Ok(self.objects.object_url(&key))
    }

    /// Return the account's live session key, starting a new session when none is open.
    /// Every device signed in to the account shares the key until the password is reset.
    pub async fn open_session(&self, user_id: i64) -> Result<String, UserError> {
        let record = self
            .storage
            .get_user(user_id)
            .await?
            .ok_or(UserError::UserNotFound)?;
        if !record.session_key.is_empty() {
            return Ok(record.session_key);
        }

        let session_key = generate_session_key();
        self.storage.update_session_key(user_id, &session_key).await?;
        debug!("Opened session for user {}", user_id);
        Ok(session_key)
    }

    /// Check that `session_key` is still the account's live session
    pub async fn verify_session(&self, user_id: i64, session_key: &str) -> Result<(), UserError> {
        if session_key.is_empty() {
            return Err(UserError::SessionExpired);
        }
        match self.storage.get_user(user_id).await? {
            Some(record) if record.session_key == session_key => Ok(()),
            _ => Err(UserError::SessionExpired),
        }
    }

    /// Change the signed-in user's password. `email` must be the account's own address.
    /// Ends the account session so refresh tokens issued before the reset stop working.
    pub async fn reset_password(
        &self,
        user_id: i64,
        email: &str,
        password: &str,
    ) -> Result<(), UserError> {
        if password.is_empty() {
            return Err(UserError::InvalidPassword);
        }

        let record = self
            .storage
            .get_user(user_id)
            .await?
            .ok_or(UserError::UserNotFound)?;
        if record.email != email.trim() {
            warn!("Rejected password reset for user {} with foreign email", user_id);
            return Err(UserError::EmailMismatch);
        }

        let password_hash = hash_password(password)?;
        let now = (self.clock)();
        self.storage
            .reset_password(user_id, &password_hash, now)
            .await?;
        info!("Password reset for user {}", user_id);
        Ok(())
    }
}
