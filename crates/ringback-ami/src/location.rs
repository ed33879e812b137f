use thiserror::Error;

/// A member location failed to split into technology and agent halves.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed member location: {0:?}")]
pub struct InvalidLocation(pub String);

/// A queue member's device interface identifier, e.g. `SIP/2001`.
///
/// The manager addresses members by the full string; the datastore keys on it
/// too, but only the agent half is stored as the agent identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Channel technology, e.g. `SIP`
    pub technology: String,
    /// Agent identifier, e.g. `2001`
    pub agent: String,
}

impl Location {
    /// Split a raw location on the `/` separator. Both halves must be
    /// non-empty; anything else is an argument error, not a panic.
    pub fn parse(raw: &str) -> Result<Self, InvalidLocation> {
        match raw.split_once('/') {
            Some((technology, agent)) if !technology.is_empty() && !agent.is_empty() => {
                Ok(Self {
                    technology: technology.to_string(),
                    agent: agent.to_string(),
                })
            }
            _ => Err(InvalidLocation(raw.to_string())),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.technology, self.agent)
    }
}
