//! Equipment resolution.
//!
//! Reconciles every equipment declaration on a user record into one
//! `CanonicalEquipmentSet`. The merge rule is set union: once any source
//! declares a piece of equipment, it stays available.
//!
//! Location handling:
//! - `gym` -> `gym_equipment`
//! - `home_equipment` -> `home_equipment`
//! - `home_bodyweight` -> `bodyweight_equipment`
//! - unset or unrecognized -> all three scoped lists
//!
//! A recognized location with an empty or absent scoped list contributes
//! nothing; the other scoped lists are not consulted.

use crate::questionnaire::aggregate_equipment;
use crate::{CanonicalEquipmentSet, EquipmentId, RawEquipmentSources, WorkoutLocation};

/// Resolve raw sources into the canonical equipment set.
///
/// Total: absent or malformed fields count as empty lists.
pub fn resolve(sources: &RawEquipmentSources) -> CanonicalEquipmentSet {
    let mut available = CanonicalEquipmentSet::new();

    // Legacy flat list
    available.extend(ids(&sources.equipment));

    // Location-scoped lists
    let location = sources.workout_location.as_deref().and_then(WorkoutLocation::parse);
    match location {
        Some(WorkoutLocation::Gym) => available.extend(ids(&sources.gym_equipment)),
        Some(WorkoutLocation::HomeEquipment) => available.extend(ids(&sources.home_equipment)),
        Some(WorkoutLocation::HomeBodyweight) => {
            available.extend(ids(&sources.bodyweight_equipment))
        }
        None => {
            tracing::debug!(
                "Workout location {:?} not recognized, using every scoped list",
                sources.workout_location
            );
            available.extend(ids(&sources.home_equipment));
            available.extend(ids(&sources.gym_equipment));
            available.extend(ids(&sources.bodyweight_equipment));
        }
    }

    // Questionnaire answers
    available.extend(aggregate_equipment(&sources.answer_metadata));

    tracing::trace!("Resolved {} equipment ids", available.len());
    available
}

fn ids(list: &Option<Vec<EquipmentId>>) -> impl Iterator<Item = &str> {
    list.iter().flatten().map(String::as_str)
}
