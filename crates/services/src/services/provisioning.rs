//! User provisioning with role-hierarchy enforcement and an audit trail.

use db::models::user::{AuditAction, UserAuditLog, UserProfile, UserRole};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use utils::validation::validate_email;
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("caller not found or inactive")]
    UnknownCaller,
    #[error("role {caller} may not perform this operation")]
    Forbidden { caller: UserRole },
    #[error("email already registered: {0}")]
    EmailTaken(String),
    #[error("user not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
}

/// Salted sha-256 digest, hex encoded. The salt is stored alongside the
/// digest so verification can recompute it.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

fn random_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().r#gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub struct ProvisioningService {
    pool: SqlitePool,
}

impl ProvisioningService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn resolve_caller(&self, actor_id: Uuid) -> Result<UserProfile, ProvisioningError> {
        let caller = UserProfile::find_by_id(&self.pool, actor_id)
            .await?
            .filter(|u| u.active)
            .ok_or(ProvisioningError::UnknownCaller)?;
        if !caller.role.can_provision() {
            return Err(ProvisioningError::Forbidden { caller: caller.role });
        }
        Ok(caller)
    }

    pub async fn create_user(
        &self,
        actor_id: Uuid,
        req: &CreateUserRequest,
    ) -> Result<UserProfile, ProvisioningError> {
        let caller = self.resolve_caller(actor_id).await?;
        if !caller.role.can_create(req.role) {
            return Err(ProvisioningError::Forbidden { caller: caller.role });
        }
        if !validate_email(&req.email) {
            return Err(ProvisioningError::Validation(format!(
                "invalid email: {}",
                req.email
            )));
        }
        if req.password.len() < MIN_PASSWORD_LEN {
            return Err(ProvisioningError::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if req.full_name.trim().is_empty() {
            return Err(ProvisioningError::Validation("full_name is required".into()));
        }
        if UserProfile::find_by_email(&self.pool, &req.email).await?.is_some() {
            return Err(ProvisioningError::EmailTaken(req.email.clone()));
        }

        let salt = random_salt();
        let digest = hash_password(&salt, &req.password);
        let user = UserProfile::create(
            &self.pool,
            Uuid::new_v4(),
            &req.email,
            &digest,
            &salt,
            req.full_name.trim(),
            req.phone.as_deref(),
            req.role,
        )
        .await?;

        UserAuditLog::create(
            &self.pool,
            actor_id,
            AuditAction::Created,
            user.id,
            Some(format!("role {}", user.role)),
        )
        .await?;

        info!(user_id = %user.id, role = %user.role, "user provisioned");
        Ok(user)
    }

    pub async fn deactivate_user(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), ProvisioningError> {
        let caller = self.resolve_caller(actor_id).await?;
        let target = UserProfile::find_by_id(&self.pool, user_id)
            .await?
            .ok_or(ProvisioningError::NotFound)?;
        // Same rule as creation: an admin cannot touch developer accounts.
        if !caller.role.can_create(target.role) {
            return Err(ProvisioningError::Forbidden { caller: caller.role });
        }

        UserProfile::deactivate(&self.pool, user_id).await?;
        UserAuditLog::create(&self.pool, actor_id, AuditAction::Deactivated, user_id, None)
            .await?;
        info!(user_id = %user_id, "user deactivated");
        Ok(())
    }

    pub async fn change_role(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<UserProfile, ProvisioningError> {
        let caller = self.resolve_caller(actor_id).await?;
        let target = UserProfile::find_by_id(&self.pool, user_id)
            .await?
            .ok_or(ProvisioningError::NotFound)?;
        if !caller.role.can_create(target.role) || !caller.role.can_create(role) {
            return Err(ProvisioningError::Forbidden { caller: caller.role });
        }

        let updated = UserProfile::update_role(&self.pool, user_id, role)
            .await?
            .ok_or(ProvisioningError::NotFound)?;
        UserAuditLog::create(
            &self.pool,
            actor_id,
            AuditAction::RoleChanged,
            user_id,
            Some(format!("{} -> {}", target.role, role)),
        )
        .await?;
        Ok(updated)
    }
}
