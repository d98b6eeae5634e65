//! Version facts of the linked engine.

use std::fmt;

/// Version of the engine compiled into this process.
///
/// Static metadata of the build, not of a running instance: queryable in
/// every lifecycle state and stable across init/shutdown cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// Human-readable version, e.g. `"8.3.0"`.
    pub string: String,
    /// Numeric identifier: `major * 10_000 + minor * 100 + patch`.
    pub id: i32,
}

impl VersionInfo {
    /// Numeric identifier for a dotted version triple; `(8, 3, 0)` gives
    /// `80300`.
    pub fn id_from_parts(major: i32, minor: i32, patch: i32) -> i32 {
        major * 10_000 + minor * 100 + patch
    }

    /// Whether [`id`](VersionInfo::id) agrees with the leading
    /// `major.minor.patch` of [`string`](VersionInfo::string). Suffixes like
    /// `"8.3.0RC1"` are ignored.
    pub fn is_consistent(&self) -> bool {
        let mut parts = self.string.splitn(3, '.').map(leading_number);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(Some(major)), Some(Some(minor)), Some(Some(patch))) => {
                Self::id_from_parts(major, minor, patch) == self.id
            }
            _ => false,
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.string, self.id)
    }
}

fn leading_number(part: &str) -> Option<i32> {
    let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_encoding_matches_the_engine_convention() {
        assert_eq!(VersionInfo::id_from_parts(8, 3, 0), 80300);
        assert_eq!(VersionInfo::id_from_parts(7, 4, 33), 70433);
    }

    #[test]
    fn consistency_check_tolerates_suffixes() {
        let plain = VersionInfo {
            string: "8.3.0".into(),
            id: 80300,
        };
        assert!(plain.is_consistent());

        let rc = VersionInfo {
            string: "8.3.0RC1".into(),
            id: 80300,
        };
        assert!(rc.is_consistent());

        let wrong = VersionInfo {
            string: "8.3.0".into(),
            id: 80200,
        };
        assert!(!wrong.is_consistent());

        let garbage = VersionInfo {
            string: "dev".into(),
            id: 80300,
        };
        assert!(!garbage.is_consistent());
    }
}
