//! Checksum sum type shared by redirect resolution, delivery verification, and BOM projection.

use std::fmt;

/// A parsed `algo:hex` checksum, or the legacy bare-hex `sha256` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checksum {
    Sha256(String),
    Sha512(String),
    /// An algorithm tag the core doesn't recognize, carried through for BOM
    /// projection but fatal if verification is ever attempted against it.
    Unknown { algorithm: String, hex: String },
}

impl Checksum {
    /// Parse a checksum string. `algo:hex` is split on the first colon; bare
    /// hex with no colon is treated as legacy `sha256`.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((algo, hex)) => match algo {
                "sha256" => Checksum::Sha256(hex.to_lowercase()),
                "sha512" => Checksum::Sha512(hex.to_lowercase()),
                other => Checksum::Unknown {
                    algorithm: other.to_string(),
                    hex: hex.to_lowercase(),
                },
            },
            None => Checksum::Sha256(raw.to_lowercase()),
        }
    }

    /// The canonical `algo:hex` form used as the mapping-resolver lookup key.
    pub fn canonical(&self) -> String {
        match self {
            Checksum::Sha256(hex) => format!("sha256:{hex}"),
            Checksum::Sha512(hex) => format!("sha512:{hex}"),
            Checksum::Unknown { algorithm, hex } => format!("{algorithm}:{hex}"),
        }
    }

    pub fn hex(&self) -> &str {
        match self {
            Checksum::Sha256(hex) | Checksum::Sha512(hex) => hex,
            Checksum::Unknown { hex, .. } => hex,
        }
    }

    pub fn algorithm_name(&self) -> &str {
        match self {
            Checksum::Sha256(_) => "sha256",
            Checksum::Sha512(_) => "sha512",
            Checksum::Unknown { algorithm, .. } => algorithm,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Checksum::Unknown { .. })
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_forms() {
        assert_eq!(
            Checksum::parse("sha256:abcd"),
            Checksum::Sha256("abcd".into())
        );
        assert_eq!(
            Checksum::parse("sha512:ABCD"),
            Checksum::Sha512("abcd".into())
        );
    }

    #[test]
    fn bare_hex_is_legacy_sha256() {
        assert_eq!(Checksum::parse("deadbeef"), Checksum::Sha256("deadbeef".into()));
    }

    #[test]
    fn unknown_algorithm_is_carried_through() {
        let c = Checksum::parse("md5:ff");
        assert!(c.is_unknown());
        assert_eq!(c.algorithm_name(), "md5");
        assert_eq!(c.canonical(), "md5:ff");
    }
}
