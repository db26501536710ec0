use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// The version stamp at the start of every binary property tree document.
///
/// Ordering is lexicographic over `(major, minor, build, revision)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BinaryVersion {
    pub major: u16,
    pub minor: u16,
    pub build: u16,
    pub revision: u16,
}

impl BinaryVersion {
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        BinaryVersion {
            major,
            minor,
            build,
            revision,
        }
    }

    /// The release family this document version belongs to.
    pub const fn game_version(&self) -> GameVersion {
        GameVersion::new(self.major, self.minor)
    }
}

impl fmt::Display for BinaryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// A game release family, e.g. `0.17`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GameVersion {
    pub major: u16,
    pub minor: u16,
}

impl GameVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        GameVersion { major, minor }
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseVersionError {
    #[error("expected {expected} version components in `{input}`, found {found}")]
    WrongComponentCount {
        input: String,
        expected: &'static str,
        found: usize,
    },
    #[error("invalid version component `{component}` in `{input}`: {source}")]
    InvalidComponent {
        input: String,
        component: String,
        #[source]
        source: ParseIntError,
    },
}

fn parse_components(s: &str) -> Result<Vec<u16>, ParseVersionError> {
    s.trim()
        .split('.')
        .map(|component| {
            component
                .parse::<u16>()
                .map_err(|source| ParseVersionError::InvalidComponent {
                    input: s.to_owned(),
                    component: component.to_owned(),
                    source,
                })
        })
        .collect()
}

impl FromStr for BinaryVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_components(s)?.as_slice() {
            &[major, minor, build, revision] => {
                Ok(BinaryVersion::new(major, minor, build, revision))
            }
            other => Err(ParseVersionError::WrongComponentCount {
                input: s.to_owned(),
                expected: "4",
                found: other.len(),
            }),
        }
    }
}

impl FromStr for GameVersion {
    type Err = ParseVersionError;

    /// Accepts `major.minor` as well as full release strings such as `0.17.79`,
    /// in which case only the first two components are kept.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components = parse_components(s)?;
        match components.as_slice() {
            &[major, minor, ..] if components.len() <= 4 => Ok(GameVersion::new(major, minor)),
            other => Err(ParseVersionError::WrongComponentCount {
                input: s.to_owned(),
                expected: "2 to 4",
                found: other.len(),
            }),
        }
    }
}
