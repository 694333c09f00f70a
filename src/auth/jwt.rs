use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{debug, error, warn};

use crate::{
    auth::repo::{Role, User},
    config::JwtConfig,
    error::AppError,
    state::AppState,
};

/// Claims embedded in every issued token. The whole identity travels in the
/// token, so request handling never has to re-read the users table.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(jwt: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(jwt.secret.as_bytes()),
            decoding: DecodingKey::from_secret(jwt.secret.as_bytes()),
            issuer: jwt.issuer.clone(),
            ttl: Duration::hours(jwt.ttl_hours),
        }
    }

    /// Issue a token for a user. Expiry is `ttl` from now; there is no
    /// refresh flow, clients log in again once the token lapses.
    pub fn sign(&self, user: &User) -> Result<String, AppError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + self.ttl;
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            error!(error = %e, "jwt encode error");
            AppError::Internal
        })?;
        debug!(user_id = user.id, "jwt signed");
        Ok(token)
    }

    /// Decode and validate a token. Signature, expiry and issuer are all
    /// checked; any failure collapses to [`AppError::Unauthorized`].
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            warn!(error = %e, "jwt rejected");
            AppError::Unauthorized
        })?;
        Ok(data.claims)
    }
}

/// Authenticated caller, decoded from the `Authorization: Bearer` header.
///
/// A missing header is a 403 with `No token provided`, a header without a
/// bearer token is a 403 with `Malformed token`, and a token that fails
/// validation is a 401.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    /// Gate for admin-only routes.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role != Role::Admin {
            return Err(AppError::Forbidden("Admin only".to_string()));
        }
        Ok(())
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or_else(|| AppError::Forbidden("No token provided".to_string()))?;

        let token = header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Forbidden("Malformed token".to_string()))?;

        let claims = keys.verify(token)?;

        Ok(CurrentUser {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }
}
