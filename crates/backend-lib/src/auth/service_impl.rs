use ::metrics::counter;
use async_trait::async_trait;
use fintrack_common::IdentityId;
use scrypt::Params;
use zeroize::Zeroize;

use super::{
    hash_password, hash_password_secure, identity::normalize_email, token_generator,
    verify_password, AuthService, Identity, PasswordRequirements,
};
use crate::error::AppError;
use crate::metrics::{AUTH_LOGIN, AUTH_LOGIN_FAILED, AUTH_REGISTERED};
use crate::storage::{CredentialStore, StoreError};
use crate::validation::validate_email;

/// scrypt-backed credential verifier over any [`CredentialStore`]
pub struct DefaultAuth<C> {
    store: C,
    params: Params,
    requirements: PasswordRequirements,
    /// Hash of a random secret, verified against when the email is unknown
    /// so both failure paths cost one scrypt run.
    dummy_hash: String,
}

impl<C: CredentialStore> DefaultAuth<C> {
    pub fn new(
        store: C,
        params: Params,
        requirements: PasswordRequirements,
    ) -> anyhow::Result<Self> {
        let dummy_hash = hash_password(&token_generator::generate_secure_token(), params)?;
        Ok(Self {
            store,
            params,
            requirements,
            dummy_hash,
        })
    }
}

#[async_trait]
impl<C: CredentialStore + 'static> AuthService for DefaultAuth<C> {
    async fn register(&self, email: &str, mut secret: String) -> Result<Identity, AppError> {
        let email = normalize_email(email);
        let checked = validate_email(&email).and_then(|_| {
            super::check_password_strength(&secret, &self.requirements)
        });
        if let Err(e) = checked {
            secret.zeroize();
            return Err(e.into());
        }

        let params = self.params;
        let secret_hash = tokio::task::spawn_blocking(move || {
            hash_password_secure(&mut secret, params)
        })
        .await?
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;

        let identity = Identity::new(email, secret_hash);
        match self.store.insert_identity(identity.clone()).await {
            Ok(()) => {
                counter!(AUTH_REGISTERED).increment(1);
                tracing::info!(identity = %identity.id, "account registered");
                Ok(identity)
            },
            Err(StoreError::Duplicate) => Err(AppError::DuplicateEmail),
            Err(e) => Err(e.into()),
        }
    }

    async fn verify(&self, email: &str, mut secret: String) -> Result<Identity, AppError> {
        let email = normalize_email(email);
        // a failed lookup answers like an unknown email
        let found = self.store.find_by_email(&email).await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "credential lookup failed");
            None
        });

        let hash = found
            .as_ref()
            .map_or_else(|| self.dummy_hash.clone(), |i| i.secret_hash.clone());
        let matched = tokio::task::spawn_blocking(move || {
            let ok = verify_password(&hash, &secret);
            secret.zeroize();
            ok
        })
        .await?;

        match found {
            Some(identity) if matched => {
                counter!(AUTH_LOGIN).increment(1);
                Ok(identity)
            },
            _ => {
                counter!(AUTH_LOGIN_FAILED).increment(1);
                tracing::warn!(target: "security", "failed login attempt");
                Err(AppError::InvalidCredentials)
            },
        }
    }

    async fn identity(&self, id: IdentityId) -> Result<Option<Identity>, AppError> {
        Ok(self.store.find_identity(id).await?)
    }
}
