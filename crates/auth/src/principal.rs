use serde::{Deserialize, Serialize};

use tours_core::AccountId;

/// An authenticated login account, as carried by a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub account_id: AccountId,
    pub username: String,
}

impl Principal {
    pub fn new(account_id: AccountId, username: impl Into<String>) -> Self {
        Self {
            account_id,
            username: username.into(),
        }
    }
}
