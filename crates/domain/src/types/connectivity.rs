//! Connectivity state consulted before remote operations

use serde::{Deserialize, Serialize};

/// Process-wide connectivity: initialized by a startup reachability probe,
/// transitioned by explicit network events, consulted (never owned) by the
/// reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    Online,
    Offline,
}

impl ConnectivityState {
    #[must_use]
    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}
