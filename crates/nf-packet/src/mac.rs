use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid hardware address: {0}")]
pub struct MacParseError(pub String);

/// An Ethernet hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mac(pub [u8; 6]);

impl Mac {
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for Mac {
    type Err = MacParseError;

    /// Accepts exactly six colon-separated hex byte pairs (aa:bb:cc:dd:ee:ff).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 17 {
            return Err(MacParseError(s.to_string()));
        }
        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(|| MacParseError(s.to_string()))?;
            if part.len() != 2 {
                return Err(MacParseError(s.to_string()));
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| MacParseError(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(MacParseError(s.to_string()));
        }
        Ok(Mac(octets))
    }
}

impl fmt::Display for Mac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl From<[u8; 6]> for Mac {
    fn from(octets: [u8; 6]) -> Self {
        Mac(octets)
    }
}

impl Serialize for Mac {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Mac {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display_roundtrip() {
        let mac: Mac = "52:54:00:11:bf:3c".parse().unwrap();
        assert_eq!(mac.octets(), [0x52, 0x54, 0x00, 0x11, 0xbf, 0x3c]);
        assert_eq!(mac.to_string(), "52:54:00:11:bf:3c");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("52:54:00:11:bf".parse::<Mac>().is_err());
        assert!("52:54:00:11:bf:3c:ff".parse::<Mac>().is_err());
        assert!("5254:00:11:bf:3c".parse::<Mac>().is_err());
        assert!("52:54:00:11:bf:zz".parse::<Mac>().is_err());
        // 16 chars: single-digit group
        assert!("52:54:00:11:bf:3".parse::<Mac>().is_err());
    }

    #[test]
    fn test_serde_string_form() {
        let mac: Mac = serde_json::from_str("\"33:33:00:00:00:01\"").unwrap();
        assert_eq!(mac.octets(), [0x33, 0x33, 0, 0, 0, 1]);
        assert_eq!(serde_json::to_string(&mac).unwrap(), "\"33:33:00:00:00:01\"");
    }
}
