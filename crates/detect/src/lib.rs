//! Stack detection for Codeward.
//!
//! Signatures are evaluated in priority order against the marker files in
//! a project directory; the first signature with at least one marker wins.
//! Its manifest is then read to recognize a framework, which raises the
//! confidence to high and selects the framework's profile.
//!
//! Detection is never cached: marker files change between calls.

pub mod manifest;
pub mod signatures;

use std::path::Path;

use codeward_core::io::{self, RetryPolicy};
use codeward_core::{Confidence, DetectedStack, Result};
use tracing::{debug, info};

use manifest::Dependencies;
use signatures::{ManifestKind, SIGNATURES, Signature};

#[derive(Debug, Clone, Default)]
pub struct StackDetector {
    retry: RetryPolicy,
}

impl StackDetector {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    /// Detect the stack of `project_dir`. `Ok(None)` means "not detected".
    pub async fn detect(&self, project_dir: &Path) -> Result<Option<DetectedStack>> {
        if !is_dir(project_dir).await {
            debug!(dir = %project_dir.display(), "Project directory missing, nothing to detect");
            return Ok(None);
        }

        for signature in SIGNATURES {
            let mut markers = Vec::new();
            for marker in signature.markers {
                if is_file(&project_dir.join(marker)).await {
                    markers.push(marker.to_string());
                }
            }
            if markers.is_empty() {
                continue;
            }

            let deps = self.dependencies(project_dir, signature, &markers).await?;
            let stack = refine(signature, markers, &deps);
            info!(
                stack = %stack.describe(),
                confidence = %stack.confidence,
                profile = %stack.suggested_profile,
                "Stack detected"
            );
            return Ok(Some(stack));
        }

        debug!(dir = %project_dir.display(), "No stack signature matched");
        Ok(None)
    }

    async fn dependencies(
        &self,
        dir: &Path,
        signature: &Signature,
        markers: &[String],
    ) -> Result<Dependencies> {
        let mut deps = Dependencies::default();
        match signature.manifest {
            ManifestKind::Node => {
                if let Some(text) = self.read(dir, "package.json").await? {
                    deps = manifest::package_json(&text);
                }
            }
            ManifestKind::Maven | ManifestKind::Gradle => {
                for marker in markers {
                    if let Some(text) = self.read(dir, marker).await? {
                        deps.extend(manifest::jvm_build(&text));
                    }
                }
            }
            ManifestKind::Python => {
                for marker in markers {
                    if let Some(text) = self.read(dir, marker).await? {
                        deps.extend(manifest::python(marker, &text));
                    }
                }
            }
            ManifestKind::Cargo => {
                if let Some(text) = self.read(dir, "Cargo.toml").await? {
                    deps = manifest::cargo_toml(&text);
                }
            }
            ManifestKind::GoMod => {
                if let Some(text) = self.read(dir, "go.mod").await? {
                    deps = manifest::go_mod(&text);
                }
            }
        }
        Ok(deps)
    }

    async fn read(&self, dir: &Path, file: &str) -> Result<Option<String>> {
        Ok(io::read_optional(&self.retry, &dir.join(file)).await?)
    }
}

/// Apply framework and test-framework recognition to a matched signature.
fn refine(signature: &Signature, markers: Vec<String>, deps: &Dependencies) -> DetectedStack {
    let framework = signature
        .manifest
        .frameworks()
        .iter()
        .find(|f| deps.has(f.dependency));
    let test_framework = signature
        .manifest
        .test_frameworks()
        .iter()
        .find(|(dep, _)| deps.has(dep))
        .map(|(_, name)| name.to_string());

    let build_tool = match signature.manifest {
        ManifestKind::Python => python_build_tool(&markers),
        _ => signature.build_tool,
    };

    DetectedStack {
        language: signature.language.to_string(),
        framework: framework.map(|f| f.name.to_string()),
        build_tool: Some(build_tool.to_string()),
        test_framework,
        confidence: if framework.is_some() {
            Confidence::High
        } else {
            signature.confidence
        },
        markers,
        suggested_profile: framework
            .map_or(signature.profile, |f| f.profile)
            .to_string(),
    }
}

fn python_build_tool(markers: &[String]) -> &'static str {
    match markers.first().map(String::as_str) {
        Some("pyproject.toml") => "pyproject",
        Some("Pipfile") => "Pipenv",
        Some("setup.py") => "setuptools",
        _ => "pip",
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for (name, content) in files {
            std::fs::write(tmp.path().join(name), content).unwrap();
        }
        tmp
    }

    async fn detect(tmp: &TempDir) -> Option<DetectedStack> {
        StackDetector::new(RetryPolicy::none())
            .detect(tmp.path())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn express_package_json_is_high_confidence() {
        let tmp = project(&[(
            "package.json",
            r#"{ "name": "api", "dependencies": { "express": "^4.19.2" } }"#,
        )]);
        let stack = detect(&tmp).await.unwrap();

        assert_eq!(stack.language, "javascript");
        assert_eq!(stack.framework.as_deref(), Some("Express"));
        assert_eq!(stack.confidence, Confidence::High);
        assert_eq!(stack.suggested_profile, "nodejs-express");
        assert_eq!(stack.markers, ["package.json"]);
    }

    #[tokio::test]
    async fn tsconfig_beats_package_json() {
        let tmp = project(&[
            ("tsconfig.json", "{}"),
            (
                "package.json",
                r#"{ "dependencies": { "@nestjs/core": "10", "react": "18" }, "devDependencies": { "jest": "29" } }"#,
            ),
        ]);
        let stack = detect(&tmp).await.unwrap();

        assert_eq!(stack.language, "typescript");
        assert_eq!(stack.framework.as_deref(), Some("NestJS"));
        assert_eq!(stack.test_framework.as_deref(), Some("Jest"));
        assert_eq!(stack.markers, ["tsconfig.json"]);
    }

    #[tokio::test]
    async fn maven_without_framework_keeps_generic_profile() {
        let tmp = project(&[("pom.xml", "<project><artifactId>plain</artifactId></project>")]);
        let stack = detect(&tmp).await.unwrap();

        assert_eq!(stack.language, "java");
        assert_eq!(stack.framework, None);
        assert_eq!(stack.build_tool.as_deref(), Some("Maven"));
        assert_eq!(stack.confidence, Confidence::Medium);
        assert_eq!(stack.suggested_profile, "java");
    }

    #[tokio::test]
    async fn spring_boot_gradle() {
        let tmp = project(&[(
            "build.gradle.kts",
            "plugins { id(\"org.springframework.boot\") version \"3.3.0\" }\ndependencies { testImplementation(\"org.junit.jupiter:junit-jupiter\") }",
        )]);
        let stack = detect(&tmp).await.unwrap();

        assert_eq!(stack.framework.as_deref(), Some("Spring Boot"));
        assert_eq!(stack.suggested_profile, "java-spring");
        assert_eq!(stack.test_framework.as_deref(), Some("JUnit"));
        assert_eq!(stack.markers, ["build.gradle.kts"]);
    }

    #[tokio::test]
    async fn python_markers_are_combined() {
        let tmp = project(&[
            ("requirements.txt", "fastapi==0.110\n"),
            ("setup.py", "setup(tests_require=['pytest'])"),
        ]);
        let stack = detect(&tmp).await.unwrap();

        assert_eq!(stack.framework.as_deref(), Some("FastAPI"));
        assert_eq!(stack.test_framework.as_deref(), Some("pytest"));
        assert_eq!(stack.build_tool.as_deref(), Some("pip"));
        assert_eq!(stack.markers, ["requirements.txt", "setup.py"]);
    }

    #[tokio::test]
    async fn rust_and_go() {
        let rust = project(&[("Cargo.toml", "[package]\nname = \"svc\"\n\n[dependencies]\nactix-web = \"4\"\n")]);
        assert_eq!(detect(&rust).await.unwrap().suggested_profile, "rust-actix");

        let go = project(&[("go.mod", "module shop\n\nrequire github.com/gin-gonic/gin v1.10.0\n")]);
        let stack = detect(&go).await.unwrap();
        assert_eq!(stack.framework.as_deref(), Some("Gin"));
        assert_eq!(stack.language, "go");
    }

    #[tokio::test]
    async fn nothing_to_detect() {
        let tmp = project(&[("README.md", "# hello")]);
        assert!(detect(&tmp).await.is_none());

        let missing = tmp.path().join("nowhere");
        let result = StackDetector::default().detect(&missing).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn detection_is_not_cached() {
        let tmp = project(&[]);
        let detector = StackDetector::new(RetryPolicy::none());
        assert!(detector.detect(tmp.path()).await.unwrap().is_none());

        std::fs::write(tmp.path().join("go.mod"), "module x\n").unwrap();
        let stack = detector.detect(tmp.path()).await.unwrap().unwrap();
        assert_eq!(stack.suggested_profile, "go");
    }
}
