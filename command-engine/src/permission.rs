//! Permission collaborator used by the permission-set operation.

use std::collections::HashSet;

use async_trait::async_trait;
use dbot_core::User;

use crate::error::Result;

pub const VIEWER_LEVEL: i64 = 0;
pub const MODERATOR_LEVEL: i64 = 2;
pub const BROADCASTER_LEVEL: i64 = 3;

#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Permission level of `user` in `scope`; higher is more privileged.
    async fn user_permission_level(&self, scope: &str, user: &User) -> Result<i64>;
}

/// Fixed permissions: the channel owner is broadcaster, configured names are moderators.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissionProvider {
    moderators: HashSet<String>,
}

impl StaticPermissionProvider {
    pub fn new<I, S>(moderators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            moderators: moderators
                .into_iter()
                .map(|m| m.as_ref().trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }
}

#[async_trait]
impl PermissionProvider for StaticPermissionProvider {
    async fn user_permission_level(&self, scope: &str, user: &User) -> Result<i64> {
        let username = user.username.to_lowercase();
        if scope.trim_start_matches('#').eq_ignore_ascii_case(&username) {
            Ok(BROADCASTER_LEVEL)
        } else if self.moderators.contains(&username) {
            Ok(MODERATOR_LEVEL)
        } else {
            Ok(VIEWER_LEVEL)
        }
    }
}
