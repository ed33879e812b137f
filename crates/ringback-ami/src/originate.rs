use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

/// An outbound call origination request.
///
/// Fire-and-forget from the engine's perspective: whether the dialed human
/// actually answers is established later by an in-call verification step, not
/// by the origination result.
#[derive(Debug, Clone)]
pub struct OriginateRequest {
    /// Dial string for the outbound leg, e.g. `SIP/5551234@trunk.example.net`
    pub channel: String,
    /// Dialplan context the answered leg is dropped into
    pub context: String,
    /// Dialplan extension within the context
    pub exten: String,
    /// Dialplan priority to start at
    pub priority: u32,
    /// Caller id presented on the outbound leg
    pub caller_id: String,
    /// Answer timeout in milliseconds
    pub timeout_ms: u64,
    /// Channel variables carried onto the originated leg
    pub variables: HashMap<String, String>,
}

/// The origination surface of the telephony manager.
///
/// Implemented by the embedding transport; the scheduler only ever calls
/// [`originate`](Originator::originate) and logs a transport error without
/// retrying it.
#[async_trait]
pub trait Originator: Send + Sync {
    /// Issue the outbound leg. An `Ok` here means the manager accepted the
    /// request, nothing more.
    async fn originate(&self, request: OriginateRequest) -> Result<()>;
}
