//! Connectivity tracking
//!
//! A single atomic flag behind the `ConnectivityProbe` port: initialized by
//! a startup reachability probe, transitioned by explicit network events,
//! and read by the reconciler before each remote operation.

use std::sync::atomic::{AtomicBool, Ordering};

use homedash_core::ConnectivityProbe;
use homedash_domain::ConnectivityState;
use reqwest::Client;
use tracing::{info, warn};

/// Shared connectivity flag.
pub struct SharedConnectivity {
    online: AtomicBool,
}

impl SharedConnectivity {
    /// Create with a known initial state.
    #[must_use]
    pub fn new(initial: ConnectivityState) -> Self {
        Self { online: AtomicBool::new(initial.is_online()) }
    }

    /// Explicit transition (network event).
    pub fn set_state(&self, state: ConnectivityState) {
        let was_online = self.online.swap(state.is_online(), Ordering::SeqCst);
        if was_online != state.is_online() {
            info!(?state, "connectivity state changed");
        }
    }

    /// One-shot reachability check. Any HTTP response counts as online;
    /// only transport failures mean offline.
    pub async fn probe(http: &Client, probe_url: &str) -> ConnectivityState {
        match http.get(probe_url).send().await {
            Ok(_) => ConnectivityState::Online,
            Err(e) => {
                warn!(error = %e, "reachability probe failed, starting offline");
                ConnectivityState::Offline
            }
        }
    }

    /// Probe and construct in one step (startup path).
    pub async fn from_probe(http: &Client, probe_url: &str) -> Self {
        Self::new(Self::probe(http, probe_url).await)
    }
}

impl ConnectivityProbe for SharedConnectivity {
    fn state(&self) -> ConnectivityState {
        if self.online.load(Ordering::SeqCst) {
            ConnectivityState::Online
        } else {
            ConnectivityState::Offline
        }
    }
}
