use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug, Clone, Copy, Eq, Hash, Deserialize, PartialEq)]
pub struct AccountId(pub i32);

/// The already-authenticated identity attached to a request. The upstream
/// identity service verifies the caller and forwards the account id; this
/// subsystem trusts it as-is.
#[derive(Serialize, Debug, Deserialize, Clone, Copy)]
pub struct Session {
    pub account_id: AccountId,
}
