//! Creates configured users on startup.

use bannerd_core::User;
use bannerd_storage::{StorageError, UserStorage};
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapStats {
    pub created: usize,
    pub existing: usize,
}

/// Creates every user in `wanted` that the store does not have yet.
///
/// Existing users are left untouched, so running this on every start is safe.
pub async fn ensure_users(
    users: &dyn UserStorage,
    wanted: &[User],
) -> Result<BootstrapStats, StorageError> {
    let mut stats = BootstrapStats::default();

    for user in wanted {
        if users.find_by_name(&user.name).await?.is_some() {
            stats.existing += 1;
            continue;
        }
        match users.create_user(user).await {
            Ok(()) => stats.created += 1,
            // Another instance got there first.
            Err(e) if e.is_already_exists() => stats.existing += 1,
            Err(e) => return Err(e),
        }
    }

    if !wanted.is_empty() {
        info!(
            created = stats.created,
            existing = stats.existing,
            "bootstrap users ensured"
        );
    }
    Ok(stats)
}
