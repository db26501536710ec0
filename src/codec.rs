//! Binary property tree codec.
//!
//! Document layout (all multi-byte fields little-endian):
//!
//! ```text
//! u16 major, u16 minor, u16 build, u16 revision
//! [u8 reserved flag]            -- only when version >= 0.17.0.0
//! node                          -- document root
//!
//! node:   u8 type tag, u8 reserved (1 for strings, 0 otherwise), payload
//! string: u8 is_empty, [u8 length | 0xff u32 length], utf-8 bytes
//! list:   u32 count, count * (string key (always empty), node)
//! dict:   u32 count, count * (string key, node)
//! ```

mod deserializer;
mod serializer;

use crate::binary_version::BinaryVersion;
use crate::err::{DeserializationResult, SerializationResult};
use crate::property_tree::PropertyTree;

use std::io::Write;

pub(crate) use self::deserializer::PropertyTreeDeserializer;
pub(crate) use self::serializer::PropertyTreeSerializer;

/// Default limit on container nesting.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 512;

/// Codec configuration.
///
/// ```
/// use modsettings::CodecSettings;
///
/// let settings = CodecSettings::new()
///     .max_nesting_depth(64)
///     .reject_trailing_data(true);
/// assert_eq!(settings.get_max_nesting_depth(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecSettings {
    max_nesting_depth: usize,
    reject_trailing_data: bool,
}

impl Default for CodecSettings {
    fn default() -> Self {
        CodecSettings {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            reject_trailing_data: false,
        }
    }
}

impl CodecSettings {
    pub fn new() -> Self {
        CodecSettings::default()
    }

    /// Maximum container depth accepted by decode and produced by encode.
    /// The root node is at depth 0.
    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// When set, bytes following the document root fail decoding instead of being ignored.
    pub fn reject_trailing_data(mut self, reject: bool) -> Self {
        self.reject_trailing_data = reject;
        self
    }

    pub fn get_max_nesting_depth(&self) -> usize {
        self.max_nesting_depth
    }

    pub fn should_reject_trailing_data(&self) -> bool {
        self.reject_trailing_data
    }
}

/// Decode a complete document.
pub fn decode(bytes: &[u8]) -> DeserializationResult<(BinaryVersion, PropertyTree)> {
    decode_with_settings(bytes, &CodecSettings::default())
}

pub fn decode_with_settings(
    bytes: &[u8],
    settings: &CodecSettings,
) -> DeserializationResult<(BinaryVersion, PropertyTree)> {
    PropertyTreeDeserializer::new(bytes, settings).read_document()
}

/// Encode a complete document into a new buffer.
pub fn encode_to_vec(version: BinaryVersion, tree: &PropertyTree) -> SerializationResult<Vec<u8>> {
    encode_to_vec_with_settings(version, tree, &CodecSettings::default())
}

pub fn encode_to_vec_with_settings(
    version: BinaryVersion,
    tree: &PropertyTree,
    settings: &CodecSettings,
) -> SerializationResult<Vec<u8>> {
    let mut buf = Vec::new();
    PropertyTreeSerializer::new(&mut buf, settings).write_document(version, tree)?;
    Ok(buf)
}

/// Encode a complete document into `writer`.
///
/// The document is staged in memory first, so a tree the format cannot express leaves the
/// writer untouched. An I/O error while writing may leave a partial document behind; cleaning up
/// the destination is up to the caller.
pub fn encode<W: Write>(
    writer: W,
    version: BinaryVersion,
    tree: &PropertyTree,
) -> SerializationResult<()> {
    encode_with_settings(writer, version, tree, &CodecSettings::default())
}

pub fn encode_with_settings<W: Write>(
    mut writer: W,
    version: BinaryVersion,
    tree: &PropertyTree,
    settings: &CodecSettings,
) -> SerializationResult<()> {
    let buf = encode_to_vec_with_settings(version, tree, settings)?;
    writer.write_all(&buf)?;
    writer.flush()?;
    Ok(())
}
