//! Scenario and rule storage.
//!
//! A [`Scenario`] maps field names to ordered [`FieldRules`]; a
//! [`ScenarioStore`] holds scenarios by key. Everything preserves insertion
//! order, which is evaluation order. When deserialized, document order is
//! kept as long as the underlying format yields map entries in order.
//!
//! ```
//! use palisade_validation::{FieldRules, Scenario, ScenarioStore, SCENE_ADD};
//!
//! let mut store = ScenarioStore::new();
//! store.load(
//!     SCENE_ADD,
//!     Scenario::new()
//!         .field("name", FieldRules::new().rule("require", "name is required"))
//!         .field("age", FieldRules::new().rule("between:1,120", "age out of range")),
//! );
//!
//! let fields: Vec<_> = store.get(SCENE_ADD).unwrap().fields().collect();
//! assert_eq!(fields, ["name", "age"]);
//! ```

use crate::rule::REQUIRE;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// Conventional key for creation forms.
pub const SCENE_ADD: &str = "add";

/// Conventional key for update forms.
pub const SCENE_EDIT: &str = "edit";

/// A rule token and the message reported when it fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEntry {
    pub rule: String,
    pub message: String,
}

/// Ordered rules for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRules {
    entries: Vec<RuleEntry>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. An identical token already present keeps its position
    /// and takes the new message.
    pub fn rule(mut self, rule: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert(rule, message);
        self
    }

    pub fn insert(&mut self, rule: impl Into<String>, message: impl Into<String>) {
        let rule = rule.into();
        let message = message.into();
        match self.entries.iter_mut().find(|entry| entry.rule == rule) {
            Some(entry) => entry.message = message,
            None => self.entries.push(RuleEntry { rule, message }),
        }
    }

    /// Whether the exact token `require` is present.
    pub fn is_required(&self) -> bool {
        self.entries.iter().any(|entry| entry.rule == REQUIRE)
    }

    pub fn message(&self, rule: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.rule == rule)
            .map(|entry| entry.message.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a FieldRules {
    type Item = &'a RuleEntry;
    type IntoIter = std::slice::Iter<'a, RuleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<R: Into<String>, M: Into<String>> FromIterator<(R, M)> for FieldRules {
    fn from_iter<I: IntoIterator<Item = (R, M)>>(iter: I) -> Self {
        let mut rules = FieldRules::new();
        for (rule, message) in iter {
            rules.insert(rule, message);
        }
        rules
    }
}

/// Ordered field rules for one scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scenario {
    fields: Vec<(String, FieldRules)>,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field. An existing field keeps its position and takes the new
    /// rules.
    pub fn field(mut self, name: impl Into<String>, rules: FieldRules) -> Self {
        self.insert(name, rules);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, rules: FieldRules) {
        let name = name.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, existing)) => *existing = rules,
            None => self.fields.push((name, rules)),
        }
    }

    pub fn rules(&self, field: &str) -> Option<&FieldRules> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, rules)| rules)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRules)> {
        self.fields.iter().map(|(name, rules)| (name.as_str(), rules))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of rule entries across fields.
    pub fn rule_count(&self) -> usize {
        self.fields.iter().map(|(_, rules)| rules.len()).sum()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldRules)> for Scenario {
    fn from_iter<I: IntoIterator<Item = (K, FieldRules)>>(iter: I) -> Self {
        let mut scenario = Scenario::new();
        for (name, rules) in iter {
            scenario.insert(name, rules);
        }
        scenario
    }
}

/// Scenarios by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ScenarioStore {
    scenarios: HashMap<String, Scenario>,
}

impl ScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a scenario, replacing any scenario under the same key.
    pub fn load(&mut self, key: impl Into<String>, scenario: Scenario) -> Option<Scenario> {
        self.scenarios.insert(key.into(), scenario)
    }

    /// Store several scenarios at once.
    pub fn import<K: Into<String>>(&mut self, scenarios: impl IntoIterator<Item = (K, Scenario)>) {
        for (key, scenario) in scenarios {
            self.load(key, scenario);
        }
    }

    /// Move every scenario of `other` into this store; keys present in both
    /// take `other`'s scenario.
    pub fn merge(&mut self, other: ScenarioStore) {
        self.scenarios.extend(other.scenarios);
    }

    pub fn get(&self, key: &str) -> Option<&Scenario> {
        self.scenarios.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.scenarios.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Scenario> {
        self.scenarios.remove(key)
    }

    /// Scenario keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.scenarios.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

// ============================================================================
// Serde
// ============================================================================

/// Visits a map into an ordered collection via `FromIterator`.
struct OrderedMap<K, V, C> {
    expecting: &'static str,
    marker: PhantomData<fn() -> (K, V, C)>,
}

impl<'de, K, V, C> Visitor<'de> for OrderedMap<K, V, C>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
    C: FromIterator<(K, V)>,
{
    type Value = C;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.expecting)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<C, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry::<K, V>()? {
            entries.push(entry);
        }
        Ok(entries.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for FieldRules {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMap::<String, String, FieldRules> {
            expecting: "a map of rule tokens to messages",
            marker: PhantomData,
        })
    }
}

impl<'de> Deserialize<'de> for Scenario {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMap::<String, FieldRules, Scenario> {
            expecting: "a map of field names to rules",
            marker: PhantomData,
        })
    }
}

impl Serialize for FieldRules {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.rule, &entry.message)?;
        }
        map.end()
    }
}

impl Serialize for Scenario {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, rules) in &self.fields {
            map.serialize_entry(name, rules)?;
        }
        map.end()
    }
}
