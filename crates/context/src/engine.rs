//! The context engine — one entry point for every resolution operation.
//!
//! Owns the two cached stores and the uncached per-project readers, and
//! wires them through classification, guardrail merging and assembly.

use std::path::Path;
use std::sync::Arc;

use codeward_config::AppConfig;
use codeward_core::{
    Clock, DetectedStack, GuardrailSet, Profile, ProfileSummary, ProjectConfig, ProjectRules,
    Result, RetryPolicy, SearchHit, StandardDocument, SystemClock, TaskType,
};
use codeward_detect::StackDetector;
use codeward_rules::{Classification, classifier, guardrails};
use codeward_store::{
    DocumentStore, ProfileSources, ProfileStore, ProjectConfigLoader, ProjectConfigLookup,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::assembler::{
    AssemblyInput, AssemblyMetadata, ContextAssembler, Variant, relevant_categories,
};

/// Which rule picked the profile for a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSelection {
    /// Explicit profile id passed by the caller.
    Override,
    /// `profile` field of the project's override file.
    Project,
    /// Suggested by stack detection and present in the store.
    Detected,
    /// The configured default profile.
    Default,
}

/// One resolved context bundle.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedContext {
    pub text: String,
    pub task_type: TaskType,
    pub profile_id: String,
    pub profile_selection: ProfileSelection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<DetectedStack>,
    pub metadata: AssemblyMetadata,
}

/// Guardrails for one task type plus the project's separate rule channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardrailReport {
    pub guardrails: GuardrailSet,
    pub project_rules: ProjectRules,
}

pub struct ContextEngine {
    profiles: ProfileStore,
    documents: DocumentStore,
    projects: ProjectConfigLoader,
    detector: StackDetector,
    assembler: ContextAssembler,
    default_profile: String,
}

impl ContextEngine {
    pub fn new(profiles: ProfileStore, documents: DocumentStore, default_profile: impl Into<String>) -> Self {
        Self {
            profiles,
            documents,
            projects: ProjectConfigLoader::default(),
            detector: StackDetector::default(),
            assembler: ContextAssembler::with_default_limits(),
            default_profile: default_profile.into(),
        }
    }

    /// Retry policy for the per-call project reads.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.projects = ProjectConfigLoader::new(retry.clone());
        self.detector = StackDetector::new(retry);
        self
    }

    pub fn with_assembler(mut self, assembler: ContextAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Build the engine described by `config`, on the system clock.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let retry = config.io.retry_policy();
        let ttl = config.cache.ttl();

        let sources = ProfileSources {
            base: config.profile_base_dirs(),
            custom: Some(config.profile_custom_dir()),
            fallback: Some(config.profile_fallback_dir()),
        };
        let profiles = ProfileStore::new(sources, ttl, clock.clone())
            .with_policy(config.profiles.invalid_policy)
            .with_retry(retry.clone());
        let documents = DocumentStore::new(config.standards_root(), ttl, clock).with_retry(retry.clone());

        Self::new(profiles, documents, config.profiles.default_profile.clone()).with_retry(retry)
    }

    pub fn default_profile(&self) -> &str {
        &self.default_profile
    }

    pub fn profile_store(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn document_store(&self) -> &DocumentStore {
        &self.documents
    }

    // ── Resolution ────────────────────────────────────────────────────────

    /// Compact bundle: every section except the standards excerpts.
    pub async fn resolve_context(
        &self,
        description: &str,
        project_dir: Option<&Path>,
        profile_override: Option<&str>,
    ) -> Result<ResolvedContext> {
        self.resolve(description, project_dir, profile_override, Variant::Compact)
            .await
    }

    /// Full bundle, including excerpts from relevant standards.
    pub async fn resolve_full_context(
        &self,
        description: &str,
        project_dir: Option<&Path>,
        profile_override: Option<&str>,
    ) -> Result<ResolvedContext> {
        self.resolve(description, project_dir, profile_override, Variant::Full)
            .await
    }

    pub async fn resolve(
        &self,
        description: &str,
        project_dir: Option<&Path>,
        profile_override: Option<&str>,
        variant: Variant,
    ) -> Result<ResolvedContext> {
        let (stack, project) = match project_dir {
            Some(dir) => (
                self.detector.detect(dir).await?,
                self.projects.load(dir).await?,
            ),
            None => (None, None),
        };

        let (profile, selection) = self
            .select_profile(profile_override, project.as_ref(), stack.as_ref())
            .await?;

        let task_type = classifier::classify(description);
        let guardrail_set = guardrails::resolve(task_type, project.as_ref());
        let project_rules = guardrails::project_rules(task_type, project.as_ref());

        let documents = match variant {
            Variant::Full => {
                let categories = relevant_categories(task_type, stack.as_ref());
                self.documents.in_categories(&categories).await?
            }
            Variant::Compact => Vec::new(),
        };

        let assembled = self.assembler.assemble(
            &AssemblyInput {
                description,
                task_type,
                profile: &profile,
                guardrails: &guardrail_set,
                project_rules: &project_rules,
                project: project.as_ref(),
                stack: stack.as_ref(),
                documents: &documents,
            },
            variant,
        );

        info!(
            task_type = %task_type,
            profile = %profile.id,
            selection = ?selection,
            variant = ?variant,
            documents = assembled.metadata.documents.len(),
            "Context resolved"
        );

        Ok(ResolvedContext {
            text: assembled.text,
            task_type,
            profile_id: profile.id.clone(),
            profile_selection: selection,
            stack,
            metadata: assembled.metadata,
        })
    }

    async fn select_profile(
        &self,
        profile_override: Option<&str>,
        project: Option<&ProjectConfig>,
        stack: Option<&DetectedStack>,
    ) -> Result<(Arc<Profile>, ProfileSelection)> {
        if let Some(id) = profile_override.map(str::trim).filter(|id| !id.is_empty()) {
            return Ok((self.profiles.get_profile(id).await?, ProfileSelection::Override));
        }
        if let Some(id) = project.and_then(|p| p.profile.as_deref()) {
            return Ok((self.profiles.get_profile(id).await?, ProfileSelection::Project));
        }
        if let Some(stack) = stack {
            match self.profiles.get_profile(&stack.suggested_profile).await {
                Ok(profile) => return Ok((profile, ProfileSelection::Detected)),
                Err(e) if e.is_not_found() => debug!(
                    suggested = %stack.suggested_profile,
                    "Suggested profile not available, using default"
                ),
                Err(e) => return Err(e),
            }
        }
        let profile = self.profiles.get_profile(&self.default_profile).await?;
        Ok((profile, ProfileSelection::Default))
    }

    // ── Individual operations ─────────────────────────────────────────────

    pub async fn detect_stack(&self, project_dir: &Path) -> Result<Option<DetectedStack>> {
        self.detector.detect(project_dir).await
    }

    pub async fn guardrails(
        &self,
        task_type: TaskType,
        project_dir: Option<&Path>,
    ) -> Result<GuardrailReport> {
        let project = match project_dir {
            Some(dir) => self.projects.load(dir).await?,
            None => None,
        };
        Ok(GuardrailReport {
            guardrails: guardrails::resolve(task_type, project.as_ref()),
            project_rules: guardrails::project_rules(task_type, project.as_ref()),
        })
    }

    pub fn classify(&self, description: &str) -> Classification {
        classifier::explain(description)
    }

    pub async fn list_profiles(&self) -> Result<Vec<ProfileSummary>> {
        self.profiles.list_profiles().await
    }

    pub async fn describe_profile(&self, id: &str) -> Result<Arc<Profile>> {
        self.profiles.get_profile(id).await
    }

    pub async fn search_standards(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.documents.search(query).await
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        self.documents.categories().await
    }

    pub async fn standards_by_category(&self, category: &str) -> Result<Vec<StandardDocument>> {
        self.documents.by_category(category).await
    }

    pub async fn load_project_config(&self, project_dir: &Path) -> Result<ProjectConfigLookup> {
        self.projects.lookup(project_dir).await
    }

    /// Drop both caches; the next read goes back to disk.
    pub async fn invalidate(&self) {
        self.profiles.invalidate().await;
        self.documents.invalidate().await;
        info!("Caches invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeward_core::PROJECT_CONFIG_FILE;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const JAVA_SPRING: &str = r#"
name: Java Spring Boot
language: java
architecture:
  style: hexagonal
naming:
  classes: PascalCase
  suffixes:
    repository: "*Repository"
"#;

    const NODE_EXPRESS: &str = r#"
name: Node.js Express
language: javascript
architecture:
  style: layered
  layers:
    - name: routes
      allowed_dependencies: [services]
    - name: services
naming:
  files: kebab-case
"#;

    struct Fixture {
        tmp: TempDir,
        engine: ContextEngine,
    }

    impl Fixture {
        fn project(&self, files: &[(&str, &str)]) -> PathBuf {
            let dir = self.tmp.path().join("project");
            std::fs::create_dir_all(&dir).unwrap();
            for (name, content) in files {
                std::fs::write(dir.join(name), content).unwrap();
            }
            dir
        }
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let data = tmp.path().join("data");
        let templates = data.join("profiles").join("templates");
        std::fs::create_dir_all(&templates).unwrap();
        std::fs::write(templates.join("java-spring.yaml"), JAVA_SPRING).unwrap();
        std::fs::write(templates.join("nodejs-express.yaml"), NODE_EXPRESS).unwrap();

        let testing = data.join("standards").join("testing");
        std::fs::create_dir_all(&testing).unwrap();
        std::fs::write(testing.join("regression.md"), "# Regression Tests\n\nPin every fixed bug.\n").unwrap();
        let security = data.join("standards").join("security");
        std::fs::create_dir_all(&security).unwrap();
        std::fs::write(security.join("owasp.md"), "# OWASP\n\nValidate input.\n").unwrap();

        let config = AppConfig {
            data_dir: data,
            ..Default::default()
        };
        let engine = ContextEngine::from_config(&config).with_retry(RetryPolicy::none());
        Fixture { tmp, engine }
    }

    #[tokio::test]
    async fn null_pointer_bug_without_project() {
        let fx = fixture();
        let resolved = fx
            .engine
            .resolve_full_context("fix the null pointer bug", None, None)
            .await
            .unwrap();

        assert_eq!(resolved.task_type, TaskType::Bugfix);
        assert_eq!(resolved.profile_id, "java-spring");
        assert_eq!(resolved.profile_selection, ProfileSelection::Default);

        let builtin = guardrails::builtin(TaskType::Bugfix);
        for rule in builtin.mandatory.iter().chain(&builtin.avoid) {
            assert!(resolved.text.contains(&format!("- {rule}\n")), "missing: {rule}");
        }
        assert!(resolved.text.contains("## Naming Conventions"));
        assert!(resolved.text.contains("- classes: PascalCase\n"));
        assert!(resolved.text.contains("- repository: *Repository\n"));
        assert_eq!(resolved.metadata.documents, ["testing/regression"]);
    }

    #[tokio::test]
    async fn compact_context_skips_standards() {
        let fx = fixture();
        let resolved = fx
            .engine
            .resolve_context("fix the null pointer bug", None, None)
            .await
            .unwrap();
        assert!(resolved.metadata.documents.is_empty());
        assert!(!resolved.text.contains("Pin every fixed bug"));
    }

    #[tokio::test]
    async fn detected_stack_selects_framework_profile() {
        let fx = fixture();
        let dir = fx.project(&[("package.json", r#"{"dependencies": {"express": "4"}}"#)]);

        let resolved = fx
            .engine
            .resolve_full_context("add an orders endpoint", Some(&dir), None)
            .await
            .unwrap();
        assert_eq!(resolved.task_type, TaskType::Feature);
        assert_eq!(resolved.profile_id, "nodejs-express");
        assert_eq!(resolved.profile_selection, ProfileSelection::Detected);
        assert_eq!(resolved.stack.unwrap().framework.as_deref(), Some("Express"));
        assert!(resolved.text.contains("- files: kebab-case\n"));
    }

    #[tokio::test]
    async fn missing_suggested_profile_falls_back_to_default() {
        let fx = fixture();
        let dir = fx.project(&[("go.mod", "module shop\n")]);

        let resolved = fx
            .engine
            .resolve_context("add a cart", Some(&dir), None)
            .await
            .unwrap();
        assert_eq!(resolved.profile_id, "java-spring");
        assert_eq!(resolved.profile_selection, ProfileSelection::Default);
        assert_eq!(resolved.stack.unwrap().language, "go");
    }

    #[tokio::test]
    async fn rejected_suggested_profile_falls_back_to_default() {
        let fx = fixture();
        let templates = fx.tmp.path().join("data").join("profiles").join("templates");
        std::fs::write(
            templates.join("nodejs-express.yaml"),
            "architecture:\n  style: layered\ncode_quality:\n  max_method_lines: 0\n",
        )
        .unwrap();
        let dir = fx.project(&[("package.json", r#"{"dependencies": {"express": "4"}}"#)]);

        let resolved = fx
            .engine
            .resolve_context("add an orders endpoint", Some(&dir), None)
            .await
            .unwrap();
        assert_eq!(resolved.profile_id, "java-spring");
        assert_eq!(resolved.profile_selection, ProfileSelection::Default);
        assert_eq!(resolved.stack.unwrap().suggested_profile, "nodejs-express");
    }

    #[tokio::test]
    async fn selection_order_override_then_project() {
        let fx = fixture();
        let dir = fx.project(&[
            ("package.json", r#"{"dependencies": {"express": "4"}}"#),
            (PROJECT_CONFIG_FILE, r#"{"profile": "java-spring"}"#),
        ]);

        let by_project = fx
            .engine
            .resolve_context("add a cart", Some(&dir), None)
            .await
            .unwrap();
        assert_eq!(by_project.profile_id, "java-spring");
        assert_eq!(by_project.profile_selection, ProfileSelection::Project);

        let by_override = fx
            .engine
            .resolve_context("add a cart", Some(&dir), Some("nodejs-express"))
            .await
            .unwrap();
        assert_eq!(by_override.profile_id, "nodejs-express");
        assert_eq!(by_override.profile_selection, ProfileSelection::Override);
    }

    #[tokio::test]
    async fn unknown_profiles_are_not_found() {
        let fx = fixture();
        let err = fx
            .engine
            .resolve_context("add a cart", None, Some("cobol-cics"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let dir = fx.project(&[(PROJECT_CONFIG_FILE, r#"{"profile": "missing"}"#)]);
        let err = fx
            .engine
            .resolve_context("add a cart", Some(&dir), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn missing_default_profile_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let config = AppConfig {
            data_dir: tmp.path().to_path_buf(),
            ..Default::default()
        };
        let engine = ContextEngine::from_config(&config);
        let err = engine
            .resolve_context("anything", None, None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn guardrails_merge_project_additions() {
        let fx = fixture();
        let dir = fx.project(&[(
            PROJECT_CONFIG_FILE,
            r#"{"guardrails": {"security": {"mandatory": ["Run the ZAP baseline scan"]}},
                "rules": {"always": ["Every endpoint is versioned"]}}"#,
        )]);

        let report = fx.engine.guardrails(TaskType::Security, Some(&dir)).await.unwrap();
        assert_eq!(
            report.guardrails.mandatory.last().map(String::as_str),
            Some("Run the ZAP baseline scan")
        );
        assert_eq!(report.project_rules.always, ["Every endpoint is versioned"]);

        let plain = fx.engine.guardrails(TaskType::Security, None).await.unwrap();
        assert_eq!(plain.guardrails, guardrails::builtin(TaskType::Security));
        assert!(plain.project_rules.is_empty());
    }

    #[tokio::test]
    async fn project_rules_and_decisions_reach_the_text() {
        let fx = fixture();
        let dir = fx.project(&[(
            PROJECT_CONFIG_FILE,
            r#"{"decisions": {"persistence": "PostgreSQL"},
                "thresholds": {"min_test_coverage": 90}}"#,
        )]);
        let resolved = fx
            .engine
            .resolve_context("add a cart", Some(&dir), None)
            .await
            .unwrap();
        assert!(resolved.text.contains("- **persistence:** PostgreSQL\n"));
        assert!(resolved.text.contains("- Min test coverage: 90% (project override, profile: 80%)\n"));
    }

    #[tokio::test]
    async fn standards_operations() {
        let fx = fixture();
        assert_eq!(fx.engine.categories().await.unwrap(), ["security", "testing"]);

        let hits = fx.engine.search_standards("validate").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document_id, "security/owasp");

        let docs = fx.engine.standards_by_category("Testing").await.unwrap();
        assert_eq!(docs[0].name, "Regression Tests");
        assert!(fx.engine.standards_by_category("mobile").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn project_config_lookup_reports_absence() {
        let fx = fixture();
        let dir = fx.project(&[]);
        let lookup = fx.engine.load_project_config(&dir).await.unwrap();
        assert!(matches!(lookup, ProjectConfigLookup::Absent { .. }));
    }

    #[tokio::test]
    async fn invalidate_reloads_profiles() {
        let fx = fixture();
        assert_eq!(fx.engine.list_profiles().await.unwrap().len(), 2);

        let custom = fx.tmp.path().join("data").join("profiles").join("custom");
        std::fs::create_dir_all(&custom).unwrap();
        std::fs::write(custom.join("python-fastapi.yaml"), "architecture:\n  style: clean\n").unwrap();

        // Default TTL is five minutes, so the new file is not visible yet.
        assert_eq!(fx.engine.list_profiles().await.unwrap().len(), 2);
        fx.engine.invalidate().await;
        assert_eq!(fx.engine.list_profiles().await.unwrap().len(), 3);

        let profile = fx.engine.describe_profile("python-fastapi").await.unwrap();
        assert_eq!(profile.name, "python-fastapi");
    }

    #[test]
    fn classify_is_exposed() {
        let tmp = TempDir::new().unwrap();
        let config = AppConfig {
            data_dir: tmp.path().to_path_buf(),
            ..Default::default()
        };
        let engine = ContextEngine::from_config(&config);
        assert_eq!(engine.classify("").task_type, TaskType::Feature);
    }
}
