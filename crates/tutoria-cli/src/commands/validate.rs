//! The `tutoria validate` command.

use std::path::PathBuf;

use anyhow::Result;

use tutoria_core::scenario;

pub fn execute(scenario_path: PathBuf) -> Result<()> {
    let scenarios = if scenario_path.is_dir() {
        scenario::load_scenario_directory(&scenario_path)?
    } else {
        vec![scenario::parse_scenario(&scenario_path)?]
    };

    let mut total_warnings = 0;

    for s in &scenarios {
        println!(
            "Scenario: {} ({} students, {} events)",
            s.name,
            s.students.len(),
            s.events.len()
        );

        let warnings = scenario::validate_scenario(s);
        for w in &warnings {
            println!("  WARNING: {w}");
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All scenarios valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
