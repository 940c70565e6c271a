//! Contact notification port

use async_trait::async_trait;
use homedash_domain::{ContactMessage, Result};

/// Trait for forwarding contact messages to an outbound webhook.
#[async_trait]
pub trait ContactNotifier: Send + Sync {
    /// Deliver one message. Failures surface `RemoteUnavailable`; there is
    /// no fallback path or queue.
    async fn send(&self, message: &ContactMessage) -> Result<()>;
}
