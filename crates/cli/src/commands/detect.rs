//! `codeward detect` — Detect a project's technology stack.

use std::path::Path;

use codeward_core::DetectedStack;

pub async fn run(config: Option<&Path>, dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let engine = super::engine(config)?;
    let stack = engine.detect_stack(dir).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stack)?);
        return Ok(());
    }

    match stack {
        Some(stack) => print!("{}", render(&stack)),
        None => {
            println!("No known stack detected in {}", dir.display());
            println!("   Default profile: {}", engine.default_profile());
        }
    }
    Ok(())
}

fn render(stack: &DetectedStack) -> String {
    let mut out = format!("🔎 {}\n", stack.describe());
    out.push_str(&format!("   Confidence: {}\n", stack.confidence));
    if let Some(test_framework) = &stack.test_framework {
        out.push_str(&format!("   Tests:      {test_framework}\n"));
    }
    out.push_str(&format!("   Markers:    {}\n", stack.markers.join(", ")));
    out.push_str(&format!("   Profile:    {}\n", stack.suggested_profile));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeward_core::Confidence;

    #[test]
    fn render_lists_markers_and_profile() {
        let stack = DetectedStack {
            language: "python".into(),
            framework: Some("FastAPI".into()),
            build_tool: Some("pip".into()),
            test_framework: Some("pytest".into()),
            confidence: Confidence::High,
            markers: vec!["requirements.txt".into(), "setup.py".into()],
            suggested_profile: "python-fastapi".into(),
        };
        let text = render(&stack);
        assert!(text.contains("Confidence: high"));
        assert!(text.contains("Tests:      pytest"));
        assert!(text.contains("requirements.txt, setup.py"));
        assert!(text.contains("Profile:    python-fastapi"));
    }
}
