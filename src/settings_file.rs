use crate::binary_version::{BinaryVersion, GameVersion};
use crate::codec::{self, CodecSettings};
use crate::err::{Result, SettingsError};
use crate::property_tree::PropertyTree;
use crate::version_policy;

use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// A binary settings document: its binary version and its property tree.
///
/// Every structural failure, whichever direction, surfaces as
/// [`SettingsError::InvalidSettingsDocument`].
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsFile {
    version: BinaryVersion,
    tree: PropertyTree,
    settings: CodecSettings,
}

impl SettingsFile {
    /// A new document for `game_version`, written with the dialect the version policy selects.
    pub fn new(game_version: GameVersion, tree: PropertyTree) -> Self {
        let version = version_policy::resolve_write_version(game_version);
        debug!(
            "Resolved binary version {} for game version {}",
            version, game_version
        );
        SettingsFile::with_version(version, tree)
    }

    /// A document written with an explicit binary version.
    pub fn with_version(version: BinaryVersion, tree: PropertyTree) -> Self {
        SettingsFile {
            version,
            tree,
            settings: CodecSettings::default(),
        }
    }

    pub fn with_configuration(mut self, settings: CodecSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        SettingsFile::from_path_with_settings(path, CodecSettings::default())
    }

    pub fn from_path_with_settings(path: impl AsRef<Path>, settings: CodecSettings) -> Result<Self> {
        let path = path.as_ref();
        info!("Reading settings file {}", path.display());

        let mut f = File::open(path).map_err(|source| SettingsError::FailedToOpenFile {
            source,
            path: path.to_path_buf(),
        })?;
        let mut buf = Vec::new();
        f.read_to_end(&mut buf)?;

        SettingsFile::from_buffer_with_settings(&buf, settings)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        SettingsFile::from_buffer(&buf)
    }

    pub fn from_buffer(bytes: &[u8]) -> Result<Self> {
        SettingsFile::from_buffer_with_settings(bytes, CodecSettings::default())
    }

    pub fn from_buffer_with_settings(bytes: &[u8], settings: CodecSettings) -> Result<Self> {
        let (version, tree) = codec::decode_with_settings(bytes, &settings)?;
        Ok(SettingsFile {
            version,
            tree,
            settings,
        })
    }

    /// A new document for `game_version` from the JSON form of its tree.
    pub fn from_json_str(game_version: GameVersion, json: &str) -> Result<Self> {
        let tree = PropertyTree::from_json_str(json)?;
        Ok(SettingsFile::new(game_version, tree))
    }

    pub fn version(&self) -> BinaryVersion {
        self.version
    }

    pub fn tree(&self) -> &PropertyTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut PropertyTree {
        &mut self.tree
    }

    pub fn set_tree(&mut self, tree: PropertyTree) {
        self.tree = tree;
    }

    pub fn into_tree(self) -> PropertyTree {
        self.tree
    }

    pub fn to_json_string(&self, indent: bool) -> Result<String> {
        Ok(self.tree.to_json_string(indent)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(codec::encode_to_vec_with_settings(
            self.version,
            &self.tree,
            &self.settings,
        )?)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        codec::encode_with_settings(writer, self.version, &self.tree, &self.settings)?;
        Ok(())
    }

    /// Write the document to `path`, replacing any existing file.
    ///
    /// Nothing is created when the tree cannot be encoded. If writing fails midway the file may
    /// hold a partial document; removing it is up to the caller.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;

        info!(
            "Writing settings file {} (binary version {})",
            path.display(),
            self.version
        );

        let f = File::create(path).map_err(|source| SettingsError::FailedToCreateFile {
            source,
            path: path.to_path_buf(),
        })?;
        let mut writer = BufWriter::new(f);
        writer.write_all(&bytes)?;
        writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::err::InvalidDocument;
    use crate::property_tree::Dictionary;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_documents_use_resolved_version() {
        let file = SettingsFile::new(GameVersion::new(0, 16), PropertyTree::None);
        assert_eq!(file.version(), BinaryVersion::new(0, 16, 51, 0));

        let file = SettingsFile::new(GameVersion::new(0, 18), PropertyTree::None);
        assert_eq!(file.version(), version_policy::DEFAULT_WRITE_VERSION);
    }

    #[test]
    fn test_structural_errors_are_one_kind() {
        let unsupported = SettingsFile::from_buffer(&[0, 0, 15, 0, 0, 0, 0, 0, 0, 0]).unwrap_err();
        let corrupt = SettingsFile::from_buffer(&[0, 0, 16, 0, 0, 0, 0, 0, 9, 0]).unwrap_err();
        let invalid_json = SettingsFile::from_json_str(GameVersion::new(0, 17), "{").unwrap_err();

        for err in [&unsupported, &corrupt, &invalid_json] {
            assert!(matches!(err, SettingsError::InvalidSettingsDocument { .. }));
        }

        assert!(matches!(
            unsupported.invalid_document(),
            Some(InvalidDocument::Deserialization(e)) if e.is_unsupported_version()
        ));
        assert!(matches!(
            corrupt.invalid_document(),
            Some(InvalidDocument::Deserialization(e)) if e.is_corrupt_data()
        ));
        assert!(matches!(
            invalid_json.invalid_document(),
            Some(InvalidDocument::Serialization(e)) if e.is_invalid_tree()
        ));
    }

    #[test]
    fn test_bytes_round_trip() {
        let mut dict = Dictionary::new();
        dict.insert("startup", PropertyTree::Dictionary(Dictionary::new()));
        let file = SettingsFile::new(GameVersion::new(0, 17), PropertyTree::Dictionary(dict));

        let bytes = file.to_bytes().unwrap();
        let read = SettingsFile::from_reader(bytes.as_slice()).unwrap();

        assert_eq!(read, file);
    }

    #[test]
    fn test_write_to_matches_to_bytes() {
        let mut file = SettingsFile::new(GameVersion::new(0, 17), PropertyTree::None);
        file.set_tree(PropertyTree::from("replaced"));

        let mut out = Vec::new();
        file.write_to(&mut out).unwrap();
        assert_eq!(out, file.to_bytes().unwrap());

        let read = SettingsFile::from_buffer(&out).unwrap();
        assert_eq!(read.into_tree(), PropertyTree::from("replaced"));
    }
}
