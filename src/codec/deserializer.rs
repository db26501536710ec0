use super::CodecSettings;
use crate::binary_version::BinaryVersion;
use crate::err::{DeserializationError, DeserializationResult as Result};
use crate::property_tree::{Dictionary, PropertyTree, PropertyTreeType};
use crate::utils::ByteCursor;
use crate::version_policy;

use log::{debug, trace, warn};

/// Smallest possible encoding of a container entry: an empty key plus a `None` node.
const MIN_ENTRY_SIZE: usize = 3;

pub(crate) struct PropertyTreeDeserializer<'a, 's> {
    cursor: ByteCursor<'a>,
    settings: &'s CodecSettings,
}

impl<'a, 's> PropertyTreeDeserializer<'a, 's> {
    pub(crate) fn new(buf: &'a [u8], settings: &'s CodecSettings) -> Self {
        PropertyTreeDeserializer {
            cursor: ByteCursor::new(buf),
            settings,
        }
    }

    pub(crate) fn read_document(mut self) -> Result<(BinaryVersion, PropertyTree)> {
        let version = self.read_version()?;

        if !version_policy::is_supported(version) {
            return Err(DeserializationError::UnsupportedVersion {
                found: version,
                oldest: version_policy::OLDEST_SUPPORTED_VERSION,
            });
        }

        if version_policy::has_reserved_flag(version) {
            let _ = self.cursor.bool_named("reserved flag")?;
        }

        debug!("Reading property tree document, binary version {}", version);

        let root = self.read_node(0)?;

        let remaining = self.cursor.remaining();
        if remaining > 0 {
            let offset = self.cursor.position();
            if self.settings.should_reject_trailing_data() {
                return Err(DeserializationError::TrailingData { offset, remaining });
            }
            warn!(
                "Ignoring {} bytes after the document root at offset {}",
                remaining, offset
            );
        }

        Ok((version, root))
    }

    fn read_version(&mut self) -> Result<BinaryVersion> {
        let major = self.cursor.u16_named("version major")?;
        let minor = self.cursor.u16_named("version minor")?;
        let build = self.cursor.u16_named("version build")?;
        let revision = self.cursor.u16_named("version revision")?;

        Ok(BinaryVersion::new(major, minor, build, revision))
    }

    fn read_node(&mut self, depth: usize) -> Result<PropertyTree> {
        let offset = self.cursor.position();

        if depth > self.settings.get_max_nesting_depth() {
            return Err(DeserializationError::NestingTooDeep {
                offset,
                max_depth: self.settings.get_max_nesting_depth(),
            });
        }

        let tag = self.cursor.u8_named("type tag")?;
        let tree_type = PropertyTreeType::from_u8(tag)
            .ok_or(DeserializationError::UnknownTypeTag { tag, offset })?;
        // Reserved, meaning unknown.
        let _ = self.cursor.u8_named("reserved")?;

        trace!("Offset {}: reading {} node", offset, tree_type);

        let node = match tree_type {
            PropertyTreeType::None => PropertyTree::None,
            PropertyTreeType::Bool => PropertyTree::Bool(self.cursor.bool_named("bool value")?),
            PropertyTreeType::Double => {
                PropertyTree::Double(self.cursor.f64_named("double value")?)
            }
            PropertyTreeType::Int => PropertyTree::Int(self.cursor.i32_named("int value")?),
            PropertyTreeType::String => PropertyTree::String(self.read_string("string value")?),
            PropertyTreeType::List => {
                let count = self.read_count("list count")?;
                let mut items = Vec::with_capacity(self.capacity_hint(count));
                for _ in 0..count {
                    // Lists are dictionaries whose keys are always empty.
                    let _ = self.read_string("list key")?;
                    items.push(self.read_node(depth + 1)?);
                }
                PropertyTree::List(items)
            }
            PropertyTreeType::Dictionary => {
                let count = self.read_count("dictionary count")?;
                let mut dict = Dictionary::with_capacity(self.capacity_hint(count));
                for _ in 0..count {
                    let key_offset = self.cursor.position();
                    let key = self.read_string("dictionary key")?;
                    let child = self.read_node(depth + 1)?;
                    if dict.insert(key.as_str(), child).is_some() {
                        warn!(
                            "Offset {}: duplicate dictionary key `{}`, keeping the last value",
                            key_offset, key
                        );
                    }
                }
                PropertyTree::Dictionary(dict)
            }
        };

        Ok(node)
    }

    fn read_count(&mut self, what: &'static str) -> Result<usize> {
        Ok(self.cursor.u32_named(what)? as usize)
    }

    /// Preallocation hint for `count` entries, capped at what the remaining input could hold.
    fn capacity_hint(&self, count: usize) -> usize {
        count.min(self.cursor.remaining() / MIN_ENTRY_SIZE)
    }

    fn read_string(&mut self, what: &'static str) -> Result<String> {
        if self.cursor.bool_named(what)? {
            return Ok(String::new());
        }

        let len = match self.cursor.u8_named(what)? {
            u8::MAX => self.cursor.u32_named(what)? as usize,
            short => usize::from(short),
        };

        Ok(self.cursor.utf8_str(len, what)?.to_owned())
    }
}
