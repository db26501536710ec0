use super::CodecSettings;
use crate::binary_version::BinaryVersion;
use crate::err::{SerializationError, SerializationResult as Result};
use crate::property_tree::{PropertyTree, PropertyTreeType};
use crate::version_policy;

use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, trace};
use std::io::Write;

pub(crate) struct PropertyTreeSerializer<'s, W: Write> {
    writer: W,
    settings: &'s CodecSettings,
}

impl<'s, W: Write> PropertyTreeSerializer<'s, W> {
    pub(crate) fn new(writer: W, settings: &'s CodecSettings) -> Self {
        PropertyTreeSerializer { writer, settings }
    }

    pub(crate) fn write_document(mut self, version: BinaryVersion, tree: &PropertyTree) -> Result<()> {
        debug!("Writing property tree document, binary version {}", version);

        self.write_version(version)?;

        if version_policy::has_reserved_flag(version) {
            self.writer.write_u8(0)?;
        }

        // An absent tree is a lone `None` node.
        self.write_node(tree, 0)
    }

    fn write_version(&mut self, version: BinaryVersion) -> Result<()> {
        self.writer.write_u16::<LittleEndian>(version.major)?;
        self.writer.write_u16::<LittleEndian>(version.minor)?;
        self.writer.write_u16::<LittleEndian>(version.build)?;
        self.writer.write_u16::<LittleEndian>(version.revision)?;
        Ok(())
    }

    fn write_node(&mut self, tree: &PropertyTree, depth: usize) -> Result<()> {
        let max_depth = self.settings.get_max_nesting_depth();
        if depth > max_depth {
            return Err(SerializationError::NestingTooDeep { max_depth });
        }

        let tree_type = tree.tree_type();
        trace!("Writing {} node at depth {}", tree_type, depth);

        self.writer.write_u8(tree_type.as_u8())?;
        // Reserved, meaning unknown: 1 for strings, 0 for everything else.
        self.writer
            .write_u8(u8::from(tree_type == PropertyTreeType::String))?;

        match tree {
            PropertyTree::None => {}
            PropertyTree::Bool(b) => self.writer.write_u8(u8::from(*b))?,
            PropertyTree::Double(d) => self.writer.write_f64::<LittleEndian>(*d)?,
            PropertyTree::Int(i) => self.writer.write_i32::<LittleEndian>(*i)?,
            PropertyTree::String(s) => self.write_string(s)?,
            PropertyTree::List(items) => {
                self.write_count(items.len())?;
                for item in items {
                    self.write_string("")?;
                    self.write_node(item, depth + 1)?;
                }
            }
            PropertyTree::Dictionary(dict) => {
                self.write_count(dict.len())?;
                for (key, child) in dict.iter() {
                    self.write_string(key)?;
                    self.write_node(child, depth + 1)?;
                }
            }
        }

        Ok(())
    }

    fn write_count(&mut self, len: usize) -> Result<()> {
        let count = u32::try_from(len).map_err(|_| SerializationError::ContainerTooLarge { len })?;
        self.writer.write_u32::<LittleEndian>(count)?;
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        let bytes = value.as_bytes();

        let is_empty = bytes.is_empty();
        self.writer.write_u8(u8::from(is_empty))?;
        if is_empty {
            return Ok(());
        }

        let len = u32::try_from(bytes.len())
            .map_err(|_| SerializationError::StringTooLong { len: bytes.len() })?;

        if len < u32::from(u8::MAX) {
            self.writer.write_u8(len as u8)?;
        } else {
            self.writer.write_u8(u8::MAX)?;
            self.writer.write_u32::<LittleEndian>(len)?;
        }

        self.writer.write_all(bytes)?;
        Ok(())
    }
}
