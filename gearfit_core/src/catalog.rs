//! Exercise catalog: built-in exercises and external catalog files.
//!
//! Catalog order is significant; eligibility filtering keeps it.

use crate::{Catalog, Error, EquipmentRequirement, Exercise, Result};
use csv::ReaderBuilder;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for tests and custom catalogs.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn exercise(id: &str, name: &str, requirement: &str, muscles: &[&str]) -> Exercise {
    Exercise {
        muscle_groups: muscles.iter().map(|m| m.to_string()).collect(),
        ..Exercise::new(id, name, requirement)
    }
}

fn build_default_catalog_internal() -> Catalog {
    let exercises = vec![
        // Bodyweight
        exercise("push_up", "Push-up", "bodyweight", &["chest", "triceps"]),
        exercise("air_squat", "Air Squat", "none", &["quads", "glutes"]),
        exercise("plank", "Plank", "bodyweight", &["core"]),
        exercise("burpee", "Burpee", "none", &["full_body"]),
        exercise("lunge", "Walking Lunge", "bodyweight", &["quads", "glutes"]),
        // Household items
        exercise("chair_dip", "Chair Dip", "chair", &["triceps"]),
        exercise("step_up", "Chair Step-up", "chair", &["quads", "glutes"]),
        exercise("dead_bug", "Dead Bug", "mat", &["core"]),
        exercise("glute_bridge", "Glute Bridge", "mat", &["glutes", "hamstrings"]),
        exercise("stair_climb", "Stair Climb", "stairs", &["calves", "quads"]),
        exercise("towel_row", "Towel Door Row", "towel", &["back", "biceps"]),
        // Free weights
        exercise("db_curl", "Dumbbell Curl", "dumbbells", &["biceps"]),
        exercise("db_press", "Dumbbell Bench Press", "dumbbells", &["chest", "triceps"]),
        exercise("kb_swing", "Kettlebell Swing", "kettlebell", &["glutes", "hamstrings"]),
        exercise("goblet_squat", "Goblet Squat", "kettlebell", &["quads", "glutes"]),
        exercise("back_squat", "Barbell Back Squat", "barbell", &["quads", "glutes"]),
        exercise("deadlift", "Deadlift", "barbell", &["hamstrings", "back"]),
        exercise("front_squat", "Front Squat", "squat_rack", &["quads", "core"]),
        exercise("bench_press", "Barbell Bench Press", "bench", &["chest", "triceps"]),
        // Bars, bands and machines
        exercise("pull_up", "Pull-up", "pullup_bar", &["back", "biceps"]),
        exercise("bar_dip", "Parallel Bar Dip", "parallel_bars", &["chest", "triceps"]),
        exercise("band_pull_apart", "Band Pull-apart", "resistance_bands", &["shoulders"]),
        exercise("cable_row", "Seated Cable Row", "cable_machine", &["back"]),
        exercise("leg_press", "Leg Press", "leg_press", &["quads"]),
    ];

    Catalog { exercises }
}

/// CSV row format for external catalogs
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    name: String,
    #[serde(default)]
    equipment: Option<String>,
    #[serde(default)]
    muscles: Option<String>,
}

impl From<CsvRow> for Exercise {
    fn from(row: CsvRow) -> Self {
        Exercise {
            id: row.id,
            name: row.name,
            equipment_requirement: row.equipment.filter(|e| !e.trim().is_empty()),
            muscle_groups: row
                .muscles
                .map(|m| {
                    m.split(';')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

impl Catalog {
    /// Load a catalog from a `.json` (array of exercises) or `.csv` file
    pub fn load_from(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        let exercises = match extension.as_deref() {
            Some("json") => {
                let contents = std::fs::read_to_string(path)?;
                serde_json::from_str::<Vec<Exercise>>(&contents)?
            }
            Some("csv") => {
                let mut reader = ReaderBuilder::new()
                    .has_headers(true)
                    .flexible(true)
                    .trim(csv::Trim::All)
                    .from_path(path)?;
                let mut exercises = Vec::new();
                for row in reader.deserialize::<CsvRow>() {
                    exercises.push(Exercise::from(row?));
                }
                exercises
            }
            _ => return Err(Error::UnsupportedCatalog(path.to_path_buf())),
        };

        tracing::info!("Loaded {} exercises from {:?}", exercises.len(), path);
        Ok(Catalog { exercises })
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for exercise in &self.exercises {
            if exercise.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            } else if !seen.insert(exercise.id.as_str()) {
                errors.push(format!("Duplicate exercise ID '{}'", exercise.id));
            }
            if exercise.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", exercise.id));
            }
            if exercise.requirement() == EquipmentRequirement::Malformed {
                errors.push(format!(
                    "Exercise '{}' has no equipment requirement",
                    exercise.id
                ));
            }
        }

        errors
    }

    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EquivalenceClasses, Questionnaire};

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.exercises.len(), 24);
        assert!(std::ptr::eq(get_default_catalog(), get_default_catalog()));
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_questionnaire_equipment_is_used_by_catalog() {
        // Every option that implies equipment should unlock at least one exercise
        let catalog = build_default_catalog();
        let requirements: HashSet<&str> = catalog
            .exercises
            .iter()
            .filter_map(|e| e.equipment_requirement.as_deref())
            .collect();
        let table = EquivalenceClasses::builtin();

        for question in Questionnaire::builtin().questions {
            for option in &question.options {
                let implied = option
                    .metadata
                    .as_ref()
                    .and_then(|m| m.equipment.clone())
                    .unwrap_or_default();
                for id in implied {
                    let covered = requirements.contains(id.as_str())
                        || requirements
                            .iter()
                            .any(|r| table.class_of(r).contains(&id));
                    assert!(covered, "No exercise uses '{}'", id);
                }
            }
        }
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut missing = Exercise::new("b", "", "x");
        missing.equipment_requirement = None;
        let catalog = Catalog {
            exercises: vec![
                Exercise::new("a", "A", "bench"),
                Exercise::new("a", "A2", "mat"),
                missing,
            ],
        };

        let errors = catalog.validate();
        assert_eq!(errors.len(), 3, "{:?}", errors);
    }

    #[test]
    fn test_load_json_catalog() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[
                { "id": "row", "name": "Row", "equipment_requirement": "cable_machine" },
                { "id": "odd", "name": "Odd", "equipment_requirement": ["x"] },
                { "id": "walk", "name": "Walk", "equipment_requirement": "none" }
            ]"#,
        )
        .unwrap();

        let catalog = Catalog::load_from(&path).unwrap();
        let ids: Vec<&str> = catalog.exercises.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["row", "odd", "walk"]);
        assert_eq!(catalog.get("odd").unwrap().equipment_requirement, None);
    }

    #[test]
    fn test_load_csv_catalog() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("catalog.csv");
        std::fs::write(
            &path,
            "id,name,equipment,muscles\n\
             curl,Curl,dumbbells,biceps;forearms\n\
             mystery,Mystery,,\n\
             squat,Squat,none,quads\n",
        )
        .unwrap();

        let catalog = Catalog::load_from(&path).unwrap();
        assert_eq!(catalog.exercises.len(), 3);

        let curl = catalog.get("curl").unwrap();
        assert_eq!(curl.equipment_requirement.as_deref(), Some("dumbbells"));
        assert_eq!(curl.muscle_groups, vec!["biceps", "forearms"]);

        let mystery = catalog.get("mystery").unwrap();
        assert_eq!(mystery.requirement(), EquipmentRequirement::Malformed);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = Catalog::load_from(Path::new("catalog.yaml"));
        assert!(matches!(result, Err(Error::UnsupportedCatalog(_))));
    }
}
