//! The `ieltsprep init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("ieltsprep.toml").exists() {
        println!("ieltsprep.toml already exists, skipping.");
    } else {
        std::fs::write("ieltsprep.toml", SAMPLE_CONFIG)?;
        println!("Created ieltsprep.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set IELTSPREP_GEMINI_KEY (and IELTSPREP_FIREBASE_KEY for Google/Apple sign-in)");
    println!("  2. Run: ieltsprep login --method guest --name <NAME>");
    println!("  3. Run: ieltsprep onboard");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# ieltsprep configuration

# Where profiles and exam content are stored.
# For the hosted backend use:
#   type = "firestore"
#   project_id = "your-project"
#   api_key = "${IELTSPREP_FIREBASE_KEY}"
[store]
type = "file"

[identity]
api_key = "${IELTSPREP_FIREBASE_KEY}"

[evaluator]
type = "gemini"
api_key = "${IELTSPREP_GEMINI_KEY}"
model = "gemini-3-flash-preview"

[exam]
variant = "variant_1"
reading_minutes = 10
listening_minutes = 10
writing_minutes = 15
speaking_minutes = 5
# "continue" keeps a section open at 0:00, "auto_advance" moves on.
timeout_policy = "continue"
"#;
