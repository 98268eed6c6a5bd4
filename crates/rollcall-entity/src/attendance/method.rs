//! Check-in method enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a student proved presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "checkin_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CheckInMethod {
    /// Face sample scored by the biometric verifier.
    Face,
    Nfc,
    /// Bluetooth Low Energy beacon proximity.
    Ble,
    Geofence,
}

impl CheckInMethod {
    pub const ALL: [CheckInMethod; 4] = [Self::Face, Self::Nfc, Self::Ble, Self::Geofence];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Face => "face",
            Self::Nfc => "nfc",
            Self::Ble => "ble",
            Self::Geofence => "geofence",
        }
    }

    /// Only face check-ins go through the verifier; the rest count as
    /// deterministic proof of proximity or possession.
    pub fn requires_biometric(&self) -> bool {
        matches!(self, Self::Face)
    }
}

impl fmt::Display for CheckInMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckInMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "face" => Ok(Self::Face),
            "nfc" => Ok(Self::Nfc),
            "ble" => Ok(Self::Ble),
            "geofence" => Ok(Self::Geofence),
            other => Err(format!("Unknown check-in method: {other}")),
        }
    }
}
