use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{debug, info, warn};

use super::{
    claims::Identity,
    dto::{LoginRequest, LoginResponse, RegisterRequest, UserSummary},
    errors::AuthError,
    jwt::JwtKeys,
    password::{hash_password, verify_dummy, verify_password},
};
use crate::{
    state::AppState,
    users::{Credential, NewUser, PublicUser, User, UserRepository},
};

/// Registration and credential checks on top of the user store.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.users.clone(), JwtKeys::from_ref(state))
    }
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    /// Looks up `email` and checks `password` against it. Returns `None` for
    /// unknown, inactive or federated accounts and for a wrong password.
    async fn verify(&self, email: &str, password: &str) -> Result<Option<User>, AuthError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            debug!("login unknown email");
            verify_dummy(password);
            return Ok(None);
        };

        let Some(hash) = user.credential.password_hash() else {
            debug!(user_id = %user.id, "login on account without password");
            verify_dummy(password);
            return Ok(None);
        };

        if !verify_password(password, hash)? {
            warn!(user_id = %user.id, "login invalid password");
            return Ok(None);
        }

        if !user.is_active {
            warn!(user_id = %user.id, "login on inactive account");
            return Ok(None);
        }

        Ok(Some(user))
    }

    pub async fn validate_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<PublicUser>, AuthError> {
        Ok(self
            .verify(email, password)
            .await?
            .map(|u| PublicUser::from(&u)))
    }

    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AuthError> {
        let user = self
            .validate_credentials(&req.email, &req.password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let identity = Identity {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
        };
        let access_token = self.keys.sign(&identity)?;

        info!(user_id = %user.id, "user logged in");
        Ok(LoginResponse {
            access_token,
            user: UserSummary::from(&user),
        })
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<PublicUser, AuthError> {
        let password_hash = hash_password(&req.password)?;
        let user = self
            .users
            .create(NewUser {
                email: req.email,
                credential: Credential::Local { password_hash },
                name: req.name,
                role: req.role,
            })
            .await
            .map_err(|e| {
                warn!(error = %e, "create user failed");
                AuthError::from(e)
            })?;

        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(PublicUser::from(&user))
    }
}
