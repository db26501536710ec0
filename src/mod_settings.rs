//! Mod settings and exportable settings snapshots.

use crate::err::SerializationResult;
use crate::property_tree::{Dictionary, PropertyTree};
use crate::template::{TemplateValue, ValueTemplate};

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Key of the nested value inside a setting entry of a `mod-settings.dat` document.
const VALUE_KEY: &str = "value";

/// When a setting takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoadTime {
    #[serde(rename = "startup")]
    Startup,
    #[serde(rename = "runtime-global")]
    RuntimeGlobal,
    #[serde(rename = "runtime-per-user")]
    RuntimeUser,
}

impl LoadTime {
    pub const ALL: [LoadTime; 3] = [
        LoadTime::Startup,
        LoadTime::RuntimeGlobal,
        LoadTime::RuntimeUser,
    ];

    /// Group name used by both the settings file and the template interchange format.
    pub fn key(self) -> &'static str {
        match self {
            LoadTime::Startup => "startup",
            LoadTime::RuntimeGlobal => "runtime-global",
            LoadTime::RuntimeUser => "runtime-per-user",
        }
    }
}

impl fmt::Display for LoadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for LoadTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoadTime::ALL
            .into_iter()
            .find(|load_time| load_time.key() == s)
            .ok_or_else(|| format!("`{}` is not a setting load time", s))
    }
}

/// A named, categorized setting with a current value.
pub trait ModSetting {
    fn name(&self) -> &str;

    fn load_time(&self) -> LoadTime;

    /// Capture of the setting's current value.
    fn value_template(&self) -> ValueTemplate;
}

/// A setting whose values have a declared type.
pub trait TypedModSetting: ModSetting {
    type Value: TemplateValue;
}

/// Something that may declare settings, typically an installed mod.
pub trait HasModSettings {
    type Setting: ModSetting;

    fn settings(&self) -> Option<&[Self::Setting]>;
}

/// A concrete setting. `Setting<ValueTemplate>` holds a value of any kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Setting<T> {
    pub name: String,
    pub load_time: LoadTime,
    pub value: T,
}

impl<T> Setting<T> {
    pub fn new(name: impl Into<String>, load_time: LoadTime, value: T) -> Self {
        Setting {
            name: name.into(),
            load_time,
            value,
        }
    }
}

impl<T: TemplateValue + Clone> ModSetting for Setting<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_time(&self) -> LoadTime {
        self.load_time
    }

    fn value_template(&self) -> ValueTemplate {
        self.value.clone().into_template()
    }
}

impl<T: TemplateValue + Clone> TypedModSetting for Setting<T> {
    type Value = T;
}

/// Snapshot of mod settings, grouped by load time, independent of any binary document.
///
/// Serializes to the template interchange format:
///
/// ```json
/// {
///   "startup": { "setting-name": true },
///   "runtime-global": {},
///   "runtime-per-user": {}
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsTemplate {
    #[serde(rename = "startup", default)]
    startup: BTreeMap<String, ValueTemplate>,
    #[serde(rename = "runtime-global", default)]
    runtime_global: BTreeMap<String, ValueTemplate>,
    #[serde(rename = "runtime-per-user", default)]
    runtime_user: BTreeMap<String, ValueTemplate>,
}

impl SettingsTemplate {
    pub fn new() -> Self {
        SettingsTemplate::default()
    }

    /// Snapshot every setting declared by `source`.
    pub fn from_mod<M: HasModSettings + ?Sized>(source: &M) -> Self {
        let mut template = SettingsTemplate::new();
        template.add_mod(source);
        template
    }

    pub fn bucket(&self, load_time: LoadTime) -> &BTreeMap<String, ValueTemplate> {
        match load_time {
            LoadTime::Startup => &self.startup,
            LoadTime::RuntimeGlobal => &self.runtime_global,
            LoadTime::RuntimeUser => &self.runtime_user,
        }
    }

    fn bucket_mut(&mut self, load_time: LoadTime) -> &mut BTreeMap<String, ValueTemplate> {
        match load_time {
            LoadTime::Startup => &mut self.startup,
            LoadTime::RuntimeGlobal => &mut self.runtime_global,
            LoadTime::RuntimeUser => &mut self.runtime_user,
        }
    }

    /// Store a raw value; an existing entry with the same name is replaced.
    pub fn insert(
        &mut self,
        load_time: LoadTime,
        name: impl Into<String>,
        value: ValueTemplate,
    ) -> Option<ValueTemplate> {
        self.bucket_mut(load_time).insert(name.into(), value)
    }

    /// Capture `setting`'s current value. Last write wins.
    pub fn add_setting<S: ModSetting + ?Sized>(&mut self, setting: &S) {
        let template = setting.value_template();
        self.insert(setting.load_time(), setting.name(), template);
    }

    /// Capture every setting declared by `source`; does nothing if it declares none.
    pub fn add_mod<M: HasModSettings + ?Sized>(&mut self, source: &M) {
        if let Some(settings) = source.settings() {
            for setting in settings {
                self.add_setting(setting);
            }
        }
    }

    pub fn get(&self, load_time: LoadTime, name: &str) -> Option<&ValueTemplate> {
        self.bucket(load_time).get(name)
    }

    /// Look up the stored value for `setting`, read as the setting's declared type.
    ///
    /// A stored value that cannot be read as that type is treated like a missing one: the
    /// setting may have changed type between the mod version the template was taken from and
    /// the one it is applied to.
    pub fn try_get_value<S: TypedModSetting + ?Sized>(&self, setting: &S) -> Option<S::Value> {
        let template = self.get(setting.load_time(), setting.name())?;
        match template.get_value::<S::Value>() {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(
                    "Ignoring stored value of {} setting `{}`: {}",
                    setting.load_time(),
                    setting.name(),
                    e
                );
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        LoadTime::ALL.iter().map(|lt| self.bucket(*lt).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored values, grouped by load time in declaration order, then by name.
    pub fn iter(&self) -> impl Iterator<Item = (LoadTime, &str, &ValueTemplate)> {
        LoadTime::ALL.into_iter().flat_map(move |load_time| {
            self.bucket(load_time)
                .iter()
                .map(move |(name, value)| (load_time, name.as_str(), value))
        })
    }

    pub fn to_json_string(&self, indent: bool) -> SerializationResult<String> {
        let json = if indent {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    pub fn from_json_str(json: &str) -> SerializationResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The interchange format as a property tree.
    pub fn to_property_tree(&self) -> PropertyTree {
        self.groups(|value| value.to_tree())
    }

    /// Capture the settings stored in a decoded `mod-settings.dat` document, which has the shape
    /// `{ <load time>: { <name>: { "value": <scalar> } } }`.
    ///
    /// Entries without a scalar value are skipped.
    pub fn from_settings_tree(tree: &PropertyTree) -> Self {
        let mut template = SettingsTemplate::new();

        for load_time in LoadTime::ALL {
            let Some(group) = tree.get(load_time.key()).and_then(PropertyTree::as_dictionary)
            else {
                continue;
            };

            for (name, entry) in group.iter() {
                match entry.get(VALUE_KEY).and_then(ValueTemplate::from_tree) {
                    Some(value) => {
                        template.insert(load_time, name, value);
                    }
                    None => trace!(
                        "Skipping {} setting `{}` without a scalar value",
                        load_time, name
                    ),
                }
            }
        }

        template
    }

    /// Build a `mod-settings.dat` document holding exactly the stored values.
    pub fn to_settings_tree(&self) -> PropertyTree {
        self.groups(|value| {
            let mut entry = Dictionary::with_capacity(1);
            entry.insert(VALUE_KEY, value.to_tree());
            PropertyTree::Dictionary(entry)
        })
    }

    /// Reapply stored values onto a decoded `mod-settings.dat` document.
    ///
    /// Only settings already present in `tree` are touched, and only when the stored value can be
    /// read as the kind of value the setting currently holds. Returns the number of settings
    /// updated.
    pub fn apply_to_settings_tree(&self, tree: &mut PropertyTree) -> usize {
        let mut applied = 0;

        let Some(root) = tree.as_dictionary_mut() else {
            return applied;
        };

        for load_time in LoadTime::ALL {
            let Some(group) = root
                .get_mut(load_time.key())
                .and_then(PropertyTree::as_dictionary_mut)
            else {
                continue;
            };

            for (name, entry) in group.iter_mut() {
                let Some(stored) = self.get(load_time, name) else {
                    continue;
                };
                let Some(slot) = entry.as_dictionary_mut().and_then(|e| e.get_mut(VALUE_KEY))
                else {
                    continue;
                };
                let Some(current) = ValueTemplate::from_tree(slot) else {
                    continue;
                };

                match stored.coerce_like(&current) {
                    Ok(value) => {
                        *slot = value.to_tree();
                        applied += 1;
                    }
                    Err(e) => debug!("Not applying {} setting `{}`: {}", load_time, name, e),
                }
            }
        }

        applied
    }

    fn groups(&self, to_tree: impl Fn(&ValueTemplate) -> PropertyTree) -> PropertyTree {
        let mut root = Dictionary::with_capacity(LoadTime::ALL.len());
        for load_time in LoadTime::ALL {
            let group: Dictionary = self
                .bucket(load_time)
                .iter()
                .map(|(name, value)| (name.as_str(), to_tree(value)))
                .collect();
            root.insert(load_time.key(), PropertyTree::Dictionary(group));
        }
        PropertyTree::Dictionary(root)
    }
}
