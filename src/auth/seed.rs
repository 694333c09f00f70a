use sqlx::SqlitePool;
use tracing::info;

use crate::auth::password::hash_password;
use crate::auth::repo::{Role, User};
use crate::error::AppError;

const DEFAULT_ACCOUNTS: [(&str, &str, Role); 3] = [
    ("admin", "admin123", Role::Admin),
    ("boss", "boss123", Role::Boss),
    ("sales", "sales123", Role::Sales),
];

/// Create a default account for every role that has no user yet, so a fresh
/// database is usable right away. Existing accounts are never touched.
pub async fn ensure_default_users(db: &SqlitePool) -> Result<(), AppError> {
    for (username, password, role) in DEFAULT_ACCOUNTS {
        if User::role_exists(db, role).await? {
            continue;
        }
        let hash = hash_password(password)?;
        let user = User::create(db, username, &hash, role).await?;
        info!(user_id = user.id, username = %user.username, role = %role, "seeded default user");
    }
    Ok(())
}
