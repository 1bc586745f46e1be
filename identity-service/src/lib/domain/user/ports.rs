use async_trait::async_trait;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::IssuedToken;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;

/// Port for identity operations exposed to the HTTP layer.
#[async_trait]
pub trait IdentityServicePort: Send + Sync + 'static {
    /// Register a new user with validated credentials.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Storage operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Authenticate a user and issue a bearer token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password,
    ///   indistinguishably
    /// * `AccountDisabled` - Password verified but the account is inactive
    /// * `DatabaseError` - Storage operation failed
    async fn login(&self, command: LoginCommand) -> Result<IssuedToken, UserError>;
}

/// Persistence operations for the user directory.
///
/// Each operation is a single transactional statement; uniqueness is
/// enforced by the storage layer's constraints and surfaced as the conflict
/// errors below.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new identity; storage assigns the id.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Unique constraint on username violated
    /// * `EmailAlreadyExists` - Unique constraint on email violated
    /// * `DatabaseError` - Storage operation failed
    async fn create(&self, user: NewUser) -> Result<User, UserError>;

    /// Retrieve a user by identifier.
    ///
    /// # Errors
    /// * `DatabaseError` - Storage operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve a user by username.
    ///
    /// # Errors
    /// * `DatabaseError` - Storage operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Retrieve a user by email address.
    ///
    /// # Errors
    /// * `DatabaseError` - Storage operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
}
