/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength checks
/// - [`jwt`]: JWT access/refresh token generation and validation
/// - [`middleware`]: Request authentication context
///
/// Every account is its own tenant: the JWT subject is the user id, and all
/// data access downstream is scoped by that id.
///
/// # Example
///
/// ```no_run
/// use staffboard_shared::auth::password::{hash_password, verify_password};
/// use staffboard_shared::auth::jwt::{create_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), TokenType::Access);
/// let token = create_token(&claims, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
