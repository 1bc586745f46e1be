use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::Claims;
use chrono::Duration;
use chrono::Utc;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::IssuedToken;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::ports::IdentityServicePort;
use crate::domain::user::ports::UserRepository;

/// Authentication gate: registration and login over the user directory.
///
/// Stateless across requests. Rate limiting is a deployment concern
/// (reverse proxy, per client address); this service does not throttle.
pub struct IdentityService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    token_ttl_hours: i64,
    /// Hash of a throwaway password, verified against on the unknown-username
    /// login path so that path costs about as much as a wrong password.
    decoy_hash: String,
}

impl<UR> IdentityService<UR>
where
    UR: UserRepository,
{
    /// Create a new identity service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User directory implementation
    /// * `authenticator` - Password hashing and token issuance
    /// * `token_ttl_hours` - Access token lifetime in hours
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>, token_ttl_hours: i64) -> Self {
        let decoy_hash = authenticator
            .hash_password("decoy-timing-password")
            .unwrap_or_default();

        Self {
            repository,
            authenticator,
            token_ttl_hours,
            decoy_hash,
        }
    }
}

#[async_trait]
impl<UR> IdentityServicePort for IdentityService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        // Fast-path existence checks, username first. These are an
        // optimization only: the insert below hits the database's unique
        // constraints, which remain the source of truth under concurrent
        // registration.
        if self
            .repository
            .find_by_username(&command.username)
            .await?
            .is_some()
        {
            return Err(UserError::UsernameAlreadyExists(
                command.username.as_str().to_string(),
            ));
        }

        if self
            .repository
            .find_by_email(command.email.as_str())
            .await?
            .is_some()
        {
            return Err(UserError::EmailAlreadyExists(
                command.email.as_str().to_string(),
            ));
        }

        let password_hash = self.authenticator.hash_password(command.password.as_str())?;

        let user = self
            .repository
            .create(NewUser {
                username: command.username,
                email: command.email,
                password_hash,
                is_active: true,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(username = %user.username, "New user registered");
        Ok(user)
    }

    async fn login(&self, command: LoginCommand) -> Result<IssuedToken, UserError> {
        let user = match self.repository.find_by_username(&command.username).await? {
            Some(user) => user,
            None => {
                // Burn a verification anyway; an early return here would make
                // unknown usernames measurably faster than wrong passwords.
                let _ = self
                    .authenticator
                    .verify_password(&command.password, &self.decoy_hash);
                return Err(UserError::InvalidCredentials);
            }
        };

        if !self
            .authenticator
            .verify_password(&command.password, &user.password_hash)
        {
            return Err(UserError::InvalidCredentials);
        }

        // Checked after password verification: a wrong password on a
        // disabled account must not reveal the account state.
        if !user.is_active {
            return Err(UserError::AccountDisabled);
        }

        let claims = Claims::for_subject(
            user.username.as_str(),
            Duration::hours(self.token_ttl_hours),
        );
        let access_token = self.authenticator.issue_token(&claims)?;

        tracing::info!(username = %user.username, "User logged in");
        Ok(IssuedToken {
            access_token,
            expires_in: claims.ttl_seconds(),
        })
    }
}
