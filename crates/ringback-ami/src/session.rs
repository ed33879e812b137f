use anyhow::Result;
use async_trait::async_trait;

/// The call-scripting surface a callback command drives.
///
/// A command is invoked from inside an active call session; this trait is the
/// session as the engine sees it: the identifying variables the script passed
/// in, plus the small set of operations a command replies with. Each command
/// calls [`finish`](CallSession::finish) exactly once, on every path.
#[async_trait]
pub trait CallSession: Send {
    /// The call's opaque unique identifier.
    fn unique_id(&self) -> &str;

    /// The caller id of the session, used as the fallback callback number.
    fn caller_id(&self) -> &str;

    /// Set a channel variable on the session.
    async fn set_variable(&mut self, name: &str, value: &str) -> Result<()>;

    /// Play an announcement file to the caller.
    async fn stream_file(&mut self, file: &str) -> Result<()>;

    /// Pause for the given number of seconds.
    async fn wait(&mut self, seconds: u32) -> Result<()>;

    /// Reset the dialplan priority the script resumes at.
    async fn set_priority(&mut self, priority: u32) -> Result<()>;

    /// Complete the command and hand control back to the script.
    async fn finish(&mut self) -> Result<()>;
}
