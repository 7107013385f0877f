//! End-to-end scenarios: questionnaire -> resolver -> matcher.

use gearfit_core::*;

fn set(ids: &[&str]) -> CanonicalEquipmentSet {
    ids.iter().copied().collect()
}

#[test]
fn test_bodyweight_user_with_household_items() {
    let questionnaire = Questionnaire::builtin();
    let mut flow = QuestionFlow::new(&questionnaire);

    flow.answer(&["home"]).unwrap();
    let follow_up = flow.answer(&["no_equipment"]).unwrap().unwrap();
    assert_eq!(follow_up.id, "bodyweight_items_question");
    assert!(flow.answer(&["chair_available", "mat_available"]).unwrap().is_none());

    let sources = flow.finish().into_sources();
    assert_eq!(sources.workout_location.as_deref(), Some("home_bodyweight"));

    let equipment = resolve(&sources);
    assert_eq!(equipment, set(&["bodyweight", "chair", "mat"]));

    let table = EquivalenceClasses::builtin();
    let chair_dip = Exercise::new("chair_dip", "Chair Dip", "chair");
    let curl = Exercise::new("db_curl", "Dumbbell Curl", "dumbbells");
    assert!(is_eligible(&chair_dip, &equipment, &table));
    assert!(!is_eligible(&curl, &equipment, &table));
}

#[test]
fn test_gym_user_with_scoped_list() {
    let sources = RawEquipmentSources {
        gym_equipment: Some(
            ["cable_machine", "barbell", "dumbbells", "bench"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ),
        home_equipment: Some(vec!["kettlebell".into()]),
        workout_location: Some("gym".into()),
        ..Default::default()
    };
    let equipment = resolve(&sources);
    let table = EquivalenceClasses::builtin();

    for id in ["cable_machine", "barbell", "dumbbells", "bench"] {
        let exercise = Exercise::new(id, id, id);
        assert!(is_eligible(&exercise, &equipment, &table), "{} should be eligible", id);
    }

    let swing = Exercise::new("kb_swing", "Kettlebell Swing", "kettlebell");
    assert!(!is_eligible(&swing, &equipment, &table));

    let mut permissive = table.clone();
    permissive.insert("kettlebell", ["dumbbells"]);
    assert_eq!(
        check_eligibility(&swing, &equipment, &permissive),
        Eligibility::Substituted {
            via: "dumbbells".into()
        }
    );
}

#[test]
fn test_filtering_the_builtin_catalog() {
    let catalog = get_default_catalog();
    let table = EquivalenceClasses::builtin();

    let nothing = CanonicalEquipmentSet::new();
    let eligible = filter_eligible(&catalog.exercises, &nothing, &table);
    assert!(!eligible.is_empty());
    assert!(eligible
        .iter()
        .all(|e| e.requirement() == EquipmentRequirement::Unrestricted));

    // Order follows the catalog
    let positions: Vec<usize> = eligible
        .iter()
        .map(|e| catalog.exercises.iter().position(|c| c.id == e.id).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_matching_from_many_threads() {
    let catalog = get_default_catalog();
    let table = EquivalenceClasses::builtin();
    let equipment = set(&["adjustable_dumbbells", "mat"]);
    let expected = filter_eligible(&catalog.exercises, &equipment, &table).len();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| filter_eligible(&catalog.exercises, &equipment, &table).len()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
