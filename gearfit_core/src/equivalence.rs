//! Equipment equivalence classes.
//!
//! A class lists every equipment id that satisfies a canonical requirement.
//! Classes are reflexive and may overlap; matching is per requirement.

use crate::EquipmentId;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

/// Canonical id -> ids that satisfy it
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<EquipmentId, Vec<EquipmentId>>",
    into = "BTreeMap<EquipmentId, Vec<EquipmentId>>"
)]
pub struct EquivalenceClasses {
    classes: BTreeMap<EquipmentId, BTreeSet<EquipmentId>>,
}

impl EquivalenceClasses {
    /// An empty table; every requirement is matched only by itself
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in substitutions for common equipment
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert("barbell", ["olympic_barbell"]);
        table.insert("dumbbells", ["adjustable_dumbbells"]);
        table.insert("kettlebell", ["adjustable_kettlebell"]);
        table.insert("resistance_bands", ["loop_bands", "tube_bands"]);
        table.insert("pullup_bar", ["doorway_pullup_bar", "power_tower"]);
        table.insert("bench", ["flat_bench", "adjustable_bench"]);
        table.insert("mat", ["yoga_mat"]);
        table.insert("cable_machine", ["functional_trainer"]);
        table
    }

    /// Register alternatives for `canonical`, adding to any existing class.
    ///
    /// The canonical id is always a member of its own class.
    pub fn insert<I, S>(&mut self, canonical: impl Into<EquipmentId>, alternatives: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<EquipmentId>,
    {
        let canonical = canonical.into();
        let class = self.classes.entry(canonical.clone()).or_default();
        class.insert(canonical);
        class.extend(alternatives.into_iter().map(Into::into));
    }

    /// Add every class of `other` on top of this table
    pub fn merge(&mut self, other: &EquivalenceClasses) {
        for (canonical, alternatives) in &other.classes {
            self.insert(canonical.clone(), alternatives.iter().cloned());
        }
    }

    /// Ids that satisfy `requirement`, defaulting to `{requirement}`
    pub fn class_of<'a>(&'a self, requirement: &str) -> Cow<'a, BTreeSet<EquipmentId>> {
        match self.classes.get(requirement) {
            Some(class) => Cow::Borrowed(class),
            None => Cow::Owned(BTreeSet::from([requirement.to_string()])),
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl From<BTreeMap<EquipmentId, Vec<EquipmentId>>> for EquivalenceClasses {
    fn from(raw: BTreeMap<EquipmentId, Vec<EquipmentId>>) -> Self {
        let mut table = Self::new();
        for (canonical, alternatives) in raw {
            table.insert(canonical, alternatives);
        }
        table
    }
}

impl From<EquivalenceClasses> for BTreeMap<EquipmentId, Vec<EquipmentId>> {
    fn from(table: EquivalenceClasses) -> Self {
        table
            .classes
            .into_iter()
            .map(|(canonical, class)| (canonical, class.into_iter().collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_are_reflexive() {
        let table = EquivalenceClasses::builtin();
        for (canonical, class) in &table.classes {
            assert!(class.contains(canonical), "{} missing from its class", canonical);
        }
    }

    #[test]
    fn test_unregistered_requirement_is_singleton() {
        let table = EquivalenceClasses::new();
        let class = table.class_of("sled");
        assert_eq!(class.len(), 1);
        assert!(class.contains("sled"));
    }

    #[test]
    fn test_insert_extends_existing_class() {
        let mut table = EquivalenceClasses::new();
        table.insert("barbell", ["olympic_barbell"]);
        table.insert("barbell", ["trap_bar"]);

        let class = table.class_of("barbell");
        assert_eq!(class.len(), 3);
        assert!(class.contains("trap_bar"));
    }

    #[test]
    fn test_classes_may_overlap() {
        let mut table = EquivalenceClasses::new();
        table.insert("bench", ["step_platform"]);
        table.insert("box", ["step_platform"]);

        assert!(table.class_of("bench").contains("step_platform"));
        assert!(table.class_of("box").contains("step_platform"));
    }

    #[test]
    fn test_merge_and_toml_form() {
        let overrides: EquivalenceClasses =
            toml::from_str(r#"kettlebell = ["dumbbells"]"#).unwrap();
        assert!(overrides.class_of("kettlebell").contains("kettlebell"));

        let mut table = EquivalenceClasses::builtin();
        table.merge(&overrides);
        let class = table.class_of("kettlebell");
        assert!(class.contains("dumbbells"));
        assert!(class.contains("adjustable_kettlebell"));
    }
}
