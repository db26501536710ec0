//! Which binary dialects are read, and which one is written for a given game release.
//!
//! Everything in here is constant data. Supporting a new game release only requires a new row in
//! [`DEFAULT_WRITE_VERSIONS`].

use crate::binary_version::{BinaryVersion, GameVersion};

/// Documents older than this are rejected before any tree data is read.
pub const OLDEST_SUPPORTED_VERSION: BinaryVersion = BinaryVersion::new(0, 16, 0, 0);

/// Starting with this version, an extra reserved byte follows the version header.
pub const BEHAVIOUR_SWITCH_VERSION: BinaryVersion = BinaryVersion::new(0, 17, 0, 0);

/// Dialect written for releases missing from [`DEFAULT_WRITE_VERSIONS`].
pub const DEFAULT_WRITE_VERSION: BinaryVersion = BinaryVersion::new(0, 17, 9, 1);

/// Dialect written for brand new documents, per game release family.
pub static DEFAULT_WRITE_VERSIONS: &[(GameVersion, BinaryVersion)] = &[
    (GameVersion::new(0, 16), BinaryVersion::new(0, 16, 51, 0)),
    (GameVersion::new(0, 17), BinaryVersion::new(0, 17, 42, 4)),
];

pub fn is_supported(version: BinaryVersion) -> bool {
    version >= OLDEST_SUPPORTED_VERSION
}

/// Whether documents of this version carry the reserved byte after the version header.
pub fn has_reserved_flag(version: BinaryVersion) -> bool {
    version >= BEHAVIOUR_SWITCH_VERSION
}

/// Resolve the binary version a new document for `game_version` should be written with.
pub fn resolve_write_version(game_version: GameVersion) -> BinaryVersion {
    DEFAULT_WRITE_VERSIONS
        .iter()
        .find(|(release, _)| *release == game_version)
        .map(|(_, version)| *version)
        .unwrap_or(DEFAULT_WRITE_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_listed_releases() {
        assert_eq!(
            resolve_write_version(GameVersion::new(0, 16)),
            BinaryVersion::new(0, 16, 51, 0)
        );
        assert_eq!(
            resolve_write_version(GameVersion::new(0, 17)),
            BinaryVersion::new(0, 17, 42, 4)
        );
    }

    #[test]
    fn test_falls_back_to_default_write_version() {
        assert_eq!(
            resolve_write_version(GameVersion::new(0, 18)),
            DEFAULT_WRITE_VERSION
        );
        assert_eq!(
            resolve_write_version(GameVersion::new(0, 15)),
            BinaryVersion::new(0, 17, 9, 1)
        );
    }

    #[test]
    fn test_version_floor_is_inclusive() {
        assert!(!is_supported(BinaryVersion::new(0, 15, 9, 9)));
        assert!(is_supported(BinaryVersion::new(0, 16, 0, 0)));
    }

    #[test]
    fn test_reserved_flag_boundary() {
        assert!(!has_reserved_flag(BinaryVersion::new(0, 16, 99, 99)));
        assert!(has_reserved_flag(BinaryVersion::new(0, 17, 0, 0)));
    }

    #[test]
    fn test_default_write_versions_are_readable() {
        for (_, version) in DEFAULT_WRITE_VERSIONS {
            assert!(is_supported(*version));
        }
        assert!(is_supported(DEFAULT_WRITE_VERSION));
    }
}
