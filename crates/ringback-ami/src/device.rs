use serde::{Deserialize, Serialize};

/// Device state reported for a queue member.
///
/// The manager reports member state as an integer code; the engine persists
/// the code but works with the typed form everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceState {
    /// State unknown to the PBX
    Unknown,
    /// Device idle and reachable
    NotInUse,
    /// Device on a call
    InUse,
    /// Device busy
    Busy,
    /// Device identifier invalid
    Invalid,
    /// Device unreachable
    Unavailable,
    /// Device ringing
    Ringing,
    /// Device ringing while on another call
    RingingInUse,
    /// Device on hold
    OnHold,
}

impl DeviceState {
    /// Decode a manager status code. Codes outside 0..=8 are not a state.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Unknown),
            1 => Some(Self::NotInUse),
            2 => Some(Self::InUse),
            3 => Some(Self::Busy),
            4 => Some(Self::Invalid),
            5 => Some(Self::Unavailable),
            6 => Some(Self::Ringing),
            7 => Some(Self::RingingInUse),
            8 => Some(Self::OnHold),
            _ => None,
        }
    }

    /// The integer code the manager (and the datastore) uses for this state.
    pub fn code(&self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::NotInUse => 1,
            Self::InUse => 2,
            Self::Busy => 3,
            Self::Invalid => 4,
            Self::Unavailable => 5,
            Self::Ringing => 6,
            Self::RingingInUse => 7,
            Self::OnHold => 8,
        }
    }
}

impl std::fmt::Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::NotInUse => "not-in-use",
            Self::InUse => "in-use",
            Self::Busy => "busy",
            Self::Invalid => "invalid",
            Self::Unavailable => "unavailable",
            Self::Ringing => "ringing",
            Self::RingingInUse => "ringing-in-use",
            Self::OnHold => "on-hold",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for code in 0..=8 {
            let state = DeviceState::from_code(code).expect("code in range");
            assert_eq!(state.code(), code);
        }
    }

    #[test]
    fn out_of_range_codes_rejected() {
        assert_eq!(DeviceState::from_code(-1), None);
        assert_eq!(DeviceState::from_code(9), None);
    }
}
