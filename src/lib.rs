//! Reader and writer for the binary "property tree" format that stores game mod settings,
//! plus exportable settings templates for carrying settings across mod and game versions.
//!
//! ```
//! use modsettings::{Dictionary, GameVersion, PropertyTree, SettingsFile};
//!
//! let mut startup = Dictionary::new();
//! startup.insert("my-setting", PropertyTree::Bool(true));
//! let mut root = Dictionary::new();
//! root.insert("startup", PropertyTree::Dictionary(startup));
//!
//! let file = SettingsFile::new(GameVersion::new(0, 17), PropertyTree::Dictionary(root));
//! let bytes = file.to_bytes().unwrap();
//!
//! let read = SettingsFile::from_buffer(&bytes).unwrap();
//! assert_eq!(read.version().to_string(), "0.17.42.4");
//! assert_eq!(read.tree(), file.tree());
//! ```
#![deny(unused_must_use)]
#![forbid(unsafe_code)]

pub mod binary_version;
pub mod codec;
pub mod err;
pub mod mod_settings;
pub mod property_tree;
mod settings_file;
pub mod template;
mod utils;
pub mod version_policy;

pub use binary_version::{BinaryVersion, GameVersion, ParseVersionError};
pub use codec::{CodecSettings, decode, decode_with_settings, encode, encode_to_vec};
pub use err::{
    DeserializationError, InvalidDocument, SerializationError, SettingsError,
};
pub use mod_settings::{
    HasModSettings, LoadTime, ModSetting, Setting, SettingsTemplate, TypedModSetting,
};
pub use property_tree::{Dictionary, PropertyTree, PropertyTreeType};
pub use settings_file::SettingsFile;
pub use template::{TemplateValue, ValueFormatError, ValueTemplate};

// For tests, we only initialize logging once.
#[cfg(test)]
use std::sync::Once;

#[cfg(test)]
static LOGGER_INIT: Once = Once::new();

// Rust runs the tests concurrently, so unless we synchronize logging access
// it will crash when attempting to run `cargo test` with some logging facilities.
#[cfg(test)]
pub fn ensure_env_logger_initialized() {
    LOGGER_INIT.call_once(env_logger::init);
}
