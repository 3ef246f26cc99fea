//! The `tutoria init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("tutoria.toml").exists() {
        println!("tutoria.toml already exists, skipping.");
    } else {
        std::fs::write("tutoria.toml", SAMPLE_CONFIG)?;
        println!("Created tutoria.toml");
    }

    std::fs::create_dir_all("scenarios")?;
    let example_path = std::path::Path::new("scenarios/example.toml");
    if example_path.exists() {
        println!("scenarios/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_SCENARIO)?;
        println!("Created scenarios/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Adjust the fee rates in tutoria.toml");
    println!("  2. Run: tutoria validate --scenario scenarios/example.toml");
    println!("  3. Run: tutoria run --scenario scenarios/example.toml --save");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# tutoria configuration

# Listing order for both directories: name, email or registration_id
default_order = "name"
data_dir = "./tutoria-data"

# Share of each donation kept by the tutor, per reputation tier
[fees]
apprentice = 0.40
tutor = 0.80
top = 0.90
"#;

const EXAMPLE_SCENARIO: &str = r#"[scenario]
id = "example"
name = "Example Scenario"
description = "One tutor, one request"

[[students]]
registration_id = "11715963"
name = "Gauds Lindo"
course_code = 1
email = "gaudslindo99@gmail.com"

[[students]]
registration_id = "11715000"
name = "Ana Clara"
course_code = 1
phone = "83 99999-0000"
email = "ana@ccc.ufcg.edu.br"

[[events]]
type = "promote"
registration_id = "11715963"
subject = "P2"
proficiency = 5

[[events]]
type = "slot"
email = "gaudslindo99@gmail.com"
time = "10:00"
day = "seg"

[[events]]
type = "location"
email = "gaudslindo99@gmail.com"
location = "LCC2"

[[events]]
type = "request_in_person"
subject = "P2"
time = "10:00"
day = "seg"
location = "LCC2"

[[events]]
type = "rate"
email = "gaudslindo99@gmail.com"
score = 5

[[events]]
type = "donate"
email = "gaudslindo99@gmail.com"
amount = 1000
"#;
