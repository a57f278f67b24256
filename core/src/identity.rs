//! Resolution of user ids to display identities
//!
//! The diff engine never looks users up itself; callers resolve the author of a
//! version up front and hand the resulting `Attribution` to the engine.

use crate::text_diff::Attribution;
use std::collections::HashMap;

pub trait IdentityResolver {
    /// Resolve a user id to the identity stamped onto diff blocks
    fn resolve(&self, user_id: &str) -> Attribution;
}

/// Resolver backed by a fixed id -> display name table
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityResolver {
    names: HashMap<String, String>,
}

impl StaticIdentityResolver {
    pub fn new(names: HashMap<String, String>) -> Self {
        Self { names }
    }
}

impl IdentityResolver for StaticIdentityResolver {
    fn resolve(&self, user_id: &str) -> Attribution {
        match self.names.get(user_id) {
            Some(name) => Attribution::new(user_id, name.clone()),
            None => {
                log::debug!("No display name configured for user '{user_id}', using the id");
                Attribution::new(user_id, user_id)
            }
        }
    }
}
