use tracing::{info, instrument, warn};

use super::{
    jwt::{Identity, JwtKeys},
    password::{hash_password_blocking, verify_password_blocking},
    repo_types::User,
};
use crate::{
    error::AppError,
    store::{Store, StoreError},
};

/// Registers a new user. No token is issued; the caller logs in separately.
#[instrument(skip(store, password))]
pub async fn signup(store: &dyn Store, email: &str, password: &str) -> Result<User, AppError> {
    if store
        .find_user_by_email(email)
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .is_some()
    {
        warn!("email already registered");
        return Err(AppError::UserExists);
    }

    let hash = hash_password_blocking(password.to_string()).await?;

    let user = match store.create_user(email, &hash).await {
        Ok(u) => u,
        // lost a race with a concurrent signup for the same email
        Err(StoreError::Duplicate) => {
            warn!("email already registered");
            return Err(AppError::UserExists);
        }
        Err(e) => return Err(AppError::Internal(e.into())),
    };

    info!(user_id = %user.id, "user registered");
    Ok(user)
}

/// Checks credentials and issues a session token for `{id, email}`.
#[instrument(skip(store, keys, password))]
pub async fn login(
    store: &dyn Store,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<(Identity, String), AppError> {
    let user = store
        .find_user_by_email(email)
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .ok_or_else(|| {
            warn!("login unknown email");
            AppError::UnknownUser
        })?;

    let ok = verify_password_blocking(password.to_string(), user.password_hash.clone()).await?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::BadCredentials);
    }

    let identity = Identity {
        id: user.id,
        email: user.email,
    };
    let token = keys
        .issue(&identity)
        .map_err(|e| AppError::Internal(e.into()))?;

    info!(user_id = %identity.id, "user logged in");
    Ok((identity, token))
}
