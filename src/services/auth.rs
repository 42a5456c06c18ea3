//! Sign-in flows and session token handling.
//!
//! Both the password and the GitHub flow end the same way: a signed token
//! embedding the user id, plus a session row persisted per successful
//! sign-in. Sessions are never expired server-side; the token carries its
//! own expiry.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::db::models::{SignInResponse, UserResponse};
use crate::db::CredentialStore;
use crate::github::OAuthProvider;
use crate::services::{events, ServiceError};

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

pub fn issue_token(auth: &AuthConfig, user_id: i64) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = SessionClaims {
        user_id,
        iat: now.timestamp(),
        exp: (now + Duration::hours(auth.token_ttl_hours)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
}

pub fn decode_token(
    auth: &AuthConfig,
    token: &str,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Sign a token for the user and persist the session row.
async fn create_session(
    store: &dyn CredentialStore,
    auth: &AuthConfig,
    user_id: i64,
) -> Result<String, ServiceError> {
    let token = issue_token(auth, user_id)?;
    store.create_session(user_id, &token).await?;
    Ok(token)
}

/// Password sign-in. The only domain failure is `InvalidCredentials`: an
/// unknown email, a wrong password, and an OAuth-only account (no stored
/// hash) are indistinguishable to the caller.
pub async fn sign_in(
    store: &dyn CredentialStore,
    auth: &AuthConfig,
    email: &str,
    password: &str,
) -> Result<SignInResponse, ServiceError> {
    let user = store
        .find_user_by_email(email)
        .await?
        .ok_or(ServiceError::InvalidCredentials)?;

    let hash = user
        .password_hash
        .as_deref()
        .ok_or(ServiceError::InvalidCredentials)?;
    if !verify_password(password, hash) {
        return Err(ServiceError::InvalidCredentials);
    }

    let token = create_session(store, auth, user.id).await?;
    Ok(SignInResponse {
        user: user.into(),
        token,
    })
}

/// GitHub sign-in: exchange the authorization code, resolve the account by
/// the provider email, provisioning a passwordless user on first login.
pub async fn sign_in_github(
    store: &dyn CredentialStore,
    auth: &AuthConfig,
    provider: &dyn OAuthProvider,
    code: &str,
) -> Result<SignInResponse, ServiceError> {
    let access_token = provider
        .exchange_code(code)
        .await
        .map_err(ServiceError::Provider)?;

    let email = provider
        .fetch_primary_email(&access_token)
        .await
        .map_err(ServiceError::Provider)?
        .ok_or(ServiceError::OAuthEmailUnavailable)?;

    let user = match store.find_user_by_email(&email).await? {
        Some(user) => user,
        None => {
            tracing::info!("Provisioning account for {} via GitHub", email);
            store.create_user(&email, None).await?
        }
    };

    let token = create_session(store, auth, user.id).await?;
    Ok(SignInResponse {
        user: user.into(),
        token,
    })
}

/// Register a new account. Registration is only open while the event is
/// active, and emails are unique.
pub async fn register(
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
) -> Result<UserResponse, ServiceError> {
    if !events::is_current_event_active(store).await {
        return Err(ServiceError::EnrollmentNotOpen);
    }
    if store.find_user_by_email(email).await?.is_some() {
        return Err(ServiceError::DuplicateEmail);
    }

    let hash = hash_password(password).map_err(|_| ServiceError::PasswordHash)?;
    let user = store.create_user(email, Some(&hash)).await?;
    Ok(user.into())
}
