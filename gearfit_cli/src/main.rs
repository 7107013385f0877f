use clap::{Parser, Subcommand};
use gearfit_core::*;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gearfit")]
#[command(about = "Equipment-aware exercise selection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer the equipment questionnaire and save the profile
    Questionnaire {
        /// Answer non-interactively: QUESTION=OPTION[,OPTION...] (repeatable)
        #[arg(long = "answer", value_name = "QUESTION=OPTIONS")]
        answers: Vec<String>,
    },

    /// Show the equipment available to you
    Equipment,

    /// List the exercises you can do with your equipment
    Exercises {
        /// Also list excluded exercises and why
        #[arg(long)]
        all: bool,

        /// Use this catalog file (.json or .csv) instead of the configured one
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    gearfit_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let profile_path = Config::profile_path(&data_dir);

    match cli.command {
        Commands::Questionnaire { answers } => cmd_questionnaire(profile_path, answers),
        Commands::Equipment => cmd_equipment(profile_path),
        Commands::Exercises { all, catalog } => cmd_exercises(profile_path, all, catalog, &config),
    }
}

fn cmd_questionnaire(profile_path: PathBuf, answers: Vec<String>) -> Result<()> {
    let scripted = parse_answers(&answers)?;
    let questionnaire = Questionnaire::builtin();
    let mut flow = QuestionFlow::new(&questionnaire);

    let interactive = answers.is_empty();
    while let Some(question) = flow.current() {
        let selected = if interactive {
            prompt_question(question)?
        } else {
            scripted.get(question.id.as_str()).cloned().unwrap_or_default()
        };
        match flow.answer(&selected) {
            Ok(_) => {}
            // A typo at the prompt gets another try; scripted answers must be valid
            Err(Error::Questionnaire(msg)) if interactive => println!("✗ {}, try again", msg),
            Err(e) => return Err(e),
        }
    }

    let outcome = flow.finish();

    // A retake keeps legacy and location-scoped lists from the old profile
    let profile = match UserProfile::load(&profile_path)? {
        Some(mut existing) => {
            existing.update_sources(|sources| sources.apply_questionnaire(outcome));
            existing
        }
        None => UserProfile::new(outcome.into_sources()),
    };
    profile.save(&profile_path)?;

    println!("\n✓ Profile saved");
    display_equipment(&profile.canonical_equipment());
    Ok(())
}

fn cmd_equipment(profile_path: PathBuf) -> Result<()> {
    match UserProfile::load(&profile_path)? {
        Some(profile) => display_equipment(&profile.canonical_equipment()),
        None => println!("No profile found. Run `gearfit questionnaire` first."),
    }
    Ok(())
}

fn cmd_exercises(
    profile_path: PathBuf,
    all: bool,
    catalog_path: Option<PathBuf>,
    config: &Config,
) -> Result<()> {
    let catalog = match catalog_path {
        Some(path) => Catalog::load_from(&path)?,
        None => config.load_catalog()?,
    };
    for problem in catalog.validate() {
        tracing::warn!("Catalog: {}", problem);
    }

    let equipment = UserProfile::load(&profile_path)?
        .map(|profile| profile.canonical_equipment())
        .unwrap_or_default();
    let equivalences = config.equivalence_classes();

    let checked: Vec<(&Exercise, Eligibility)> = catalog
        .exercises
        .iter()
        .map(|exercise| (exercise, check_eligibility(exercise, &equipment, &equivalences)))
        .collect();
    let eligible = checked.iter().filter(|(_, e)| e.is_eligible()).count();

    println!(
        "Eligible exercises: {} of {}",
        eligible,
        catalog.exercises.len()
    );
    for (exercise, eligibility) in &checked {
        let requirement = exercise.equipment_requirement.as_deref().unwrap_or("?");
        match eligibility {
            Eligibility::Unrestricted | Eligibility::Direct => {
                println!("  ✓ {} ({})", exercise.name, requirement);
            }
            Eligibility::Substituted { via } => {
                println!("  ✓ {} ({} via {})", exercise.name, requirement, via);
            }
            Eligibility::MissingEquipment if all => {
                println!("  ✗ {} ({}) - missing equipment", exercise.name, requirement);
            }
            Eligibility::MalformedRequirement => {
                tracing::warn!(
                    "Exercise '{}' has no usable equipment requirement, excluded",
                    exercise.id
                );
                if all {
                    println!("  ✗ {} - no equipment requirement", exercise.name);
                }
            }
            Eligibility::MissingEquipment => {}
        }
    }

    Ok(())
}

/// Parse `QUESTION=OPT[,OPT...]` flags into a lookup table
fn parse_answers(raw: &[String]) -> Result<HashMap<String, Vec<String>>> {
    let mut answers = HashMap::new();
    for entry in raw {
        let (question, options) = entry.split_once('=').ok_or_else(|| {
            Error::Questionnaire(format!(
                "Invalid answer '{}', expected QUESTION=OPTION[,OPTION...]",
                entry
            ))
        })?;
        let options = options
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        answers.insert(question.trim().to_string(), options);
    }
    Ok(answers)
}

fn prompt_question(question: &Question) -> Result<Vec<String>> {
    println!("\n{}", question.prompt);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}) {}", i + 1, option.label);
    }
    match question.selection {
        SelectionKind::Single => print!("Pick one > "),
        SelectionKind::Multiple => print!("Pick any, comma-separated > "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;

    let selected = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|token| match token.parse::<usize>() {
            Ok(n) if n >= 1 && n <= question.options.len() => question.options[n - 1].id.clone(),
            _ => token.to_string(),
        })
        .collect();

    Ok(selected)
}

fn display_equipment(equipment: &CanonicalEquipmentSet) {
    if equipment.is_empty() {
        println!("Available equipment: none");
        return;
    }
    println!("Available equipment:");
    for id in equipment.iter() {
        println!("  • {}", id);
    }
}
