//! Exercise eligibility matching.
//!
//! Decides whether a user can perform an exercise given their canonical
//! equipment set. Unlike resolution, matching fails closed: an exercise with
//! a missing or blank requirement is never eligible.
//!
//! Rules, first match wins:
//! 1. Requirement `"none"` / `"bodyweight"` -> eligible
//! 2. Requirement present in the equipment set -> eligible
//! 3. Any member of the requirement's equivalence class present -> eligible
//! 4. Otherwise -> not eligible

use crate::{
    CanonicalEquipmentSet, EquipmentId, EquipmentRequirement, EquivalenceClasses, Exercise,
};

/// Outcome of an eligibility check, with the reason
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Eligibility {
    /// No equipment needed
    Unrestricted,
    /// The required equipment is available as-is
    Direct,
    /// An equivalent piece of equipment is available
    Substituted { via: EquipmentId },
    /// Nothing in the equipment set satisfies the requirement
    MissingEquipment,
    /// The exercise has no usable requirement
    MalformedRequirement,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(
            self,
            Eligibility::Unrestricted | Eligibility::Direct | Eligibility::Substituted { .. }
        )
    }
}

/// Check an exercise against the available equipment
pub fn check_eligibility(
    exercise: &Exercise,
    equipment: &CanonicalEquipmentSet,
    equivalences: &EquivalenceClasses,
) -> Eligibility {
    let required = match exercise.requirement() {
        EquipmentRequirement::Unrestricted => return Eligibility::Unrestricted,
        EquipmentRequirement::Malformed => return Eligibility::MalformedRequirement,
        EquipmentRequirement::Needs(id) => id,
    };

    if equipment.contains(required) {
        return Eligibility::Direct;
    }

    let class = equivalences.class_of(required);
    let via = class
        .iter()
        .find(|alternative| equipment.contains(alternative))
        .cloned();

    match via {
        Some(via) => Eligibility::Substituted { via },
        None => Eligibility::MissingEquipment,
    }
}

/// Whether the exercise can be performed with the available equipment
pub fn is_eligible(
    exercise: &Exercise,
    equipment: &CanonicalEquipmentSet,
    equivalences: &EquivalenceClasses,
) -> bool {
    check_eligibility(exercise, equipment, equivalences).is_eligible()
}

/// Eligible exercises, in input order
pub fn filter_eligible<'a>(
    exercises: &'a [Exercise],
    equipment: &CanonicalEquipmentSet,
    equivalences: &EquivalenceClasses,
) -> Vec<&'a Exercise> {
    exercises
        .iter()
        .filter(|exercise| is_eligible(exercise, equipment, equivalences))
        .collect()
}
