//! Manifest readers: extract declared dependency names.
//!
//! Every reader is lenient. A manifest that does not parse yields no
//! dependencies and a warning; detection falls back to the signature.

use tracing::warn;

/// Declared dependency names of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    names: Vec<String>,
}

impl Dependencies {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            names: names.into_iter().collect(),
        }
    }

    pub fn extend(&mut self, other: Dependencies) {
        self.names.extend(other.names);
    }

    /// Exact match, or a path-style name below `name` (`.../echo/v4`).
    pub fn has(&self, name: &str) -> bool {
        self.names.iter().any(|dep| {
            dep == name
                || dep
                    .strip_prefix(name)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// `dependencies` and `devDependencies` keys of a `package.json`.
pub fn package_json(text: &str) -> Dependencies {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            warn!(manifest = "package.json", error = %e, "Manifest does not parse");
            return Dependencies::default();
        }
    };
    let names = ["dependencies", "devDependencies", "peerDependencies"]
        .into_iter()
        .filter_map(|section| value.get(section).and_then(|s| s.as_object()))
        .flat_map(|deps| deps.keys().map(|k| k.to_lowercase()));
    Dependencies::new(names)
}

/// Maven and Gradle descriptors are matched by keyword.
pub fn jvm_build(text: &str) -> Dependencies {
    let lower = text.to_lowercase();
    let mut names = Vec::new();
    if lower.contains("spring-boot") || lower.contains("org.springframework.boot") {
        names.push("spring-boot".to_string());
    }
    if lower.contains("junit") {
        names.push("junit".to_string());
    }
    Dependencies::new(names)
}

/// `[dependencies]`, `[dev-dependencies]` and `[workspace.dependencies]`
/// keys of a `Cargo.toml`.
pub fn cargo_toml(text: &str) -> Dependencies {
    let value: toml::Value = match toml::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            warn!(manifest = "Cargo.toml", error = %e, "Manifest does not parse");
            return Dependencies::default();
        }
    };
    let tables = [
        value.get("dependencies"),
        value.get("dev-dependencies"),
        value.get("workspace").and_then(|w| w.get("dependencies")),
    ];
    let names = tables
        .into_iter()
        .flatten()
        .filter_map(|t| t.as_table())
        .flat_map(|t| t.keys().map(|k| k.to_lowercase()));
    Dependencies::new(names)
}

/// Module paths required by a `go.mod`, single-line and block form.
pub fn go_mod(text: &str) -> Dependencies {
    let mut names = Vec::new();
    let mut in_block = false;
    for line in text.lines() {
        let line = line.trim();
        if in_block {
            if line.starts_with(')') {
                in_block = false;
                continue;
            }
        } else if line.starts_with("require (") || line == "require(" {
            in_block = true;
            continue;
        } else if let Some(rest) = line.strip_prefix("require ") {
            if let Some(module) = rest.split_whitespace().next() {
                names.push(module.to_lowercase());
            }
            continue;
        } else {
            continue;
        }
        if let Some(module) = line.split_whitespace().next().filter(|m| !m.starts_with("//")) {
            names.push(module.to_lowercase());
        }
    }
    Dependencies::new(names)
}

/// Dependencies from any of the Python manifests, chosen by file name.
pub fn python(file_name: &str, text: &str) -> Dependencies {
    match file_name {
        "pyproject.toml" => pyproject(text),
        "Pipfile" => pipfile(text),
        "requirements.txt" => Dependencies::new(text.lines().filter_map(requirement_name)),
        _ => setup_py(text),
    }
}

fn pyproject(text: &str) -> Dependencies {
    let value: toml::Value = match toml::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            warn!(manifest = "pyproject.toml", error = %e, "Manifest does not parse");
            return Dependencies::default();
        }
    };
    let mut names = Vec::new();

    if let Some(project) = value.get("project") {
        let listed = project
            .get("dependencies")
            .and_then(|d| d.as_array())
            .into_iter()
            .flatten();
        let optional = project
            .get("optional-dependencies")
            .and_then(|d| d.as_table())
            .into_iter()
            .flat_map(|t| t.values())
            .filter_map(|group| group.as_array())
            .flatten();
        names.extend(
            listed
                .chain(optional)
                .filter_map(|d| d.as_str())
                .filter_map(requirement_name),
        );
    }

    if let Some(poetry) = value.get("tool").and_then(|t| t.get("poetry")) {
        let mut tables = vec![poetry.get("dependencies"), poetry.get("dev-dependencies")];
        if let Some(groups) = poetry.get("group").and_then(|g| g.as_table()) {
            tables.extend(groups.values().map(|g| g.get("dependencies")));
        }
        names.extend(
            tables
                .into_iter()
                .flatten()
                .filter_map(|t| t.as_table())
                .flat_map(|t| t.keys())
                .map(|k| normalize_python(k)),
        );
    }

    Dependencies::new(names)
}

fn pipfile(text: &str) -> Dependencies {
    let value: toml::Value = match toml::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            warn!(manifest = "Pipfile", error = %e, "Manifest does not parse");
            return Dependencies::default();
        }
    };
    let names = ["packages", "dev-packages"]
        .into_iter()
        .filter_map(|section| value.get(section).and_then(|s| s.as_table()))
        .flat_map(|t| t.keys().map(|k| normalize_python(k)));
    Dependencies::new(names)
}

/// Quoted requirement strings inside `setup.py`.
fn setup_py(text: &str) -> Dependencies {
    let names = text
        .split(['"', '\''])
        .skip(1)
        .step_by(2)
        .filter_map(requirement_name);
    Dependencies::new(names)
}

/// `FastAPI[all]>=0.110` → `fastapi`.
fn requirement_name(spec: &str) -> Option<String> {
    let spec = spec.trim();
    if spec.is_empty() || spec.starts_with('#') || spec.starts_with('-') {
        return None;
    }
    let name: String = spec
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    (!name.is_empty()).then(|| normalize_python(&name))
}

fn normalize_python(name: &str) -> String {
    name.to_lowercase().replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_json_reads_all_dependency_sections() {
        let deps = package_json(
            r#"{
                "name": "shop",
                "dependencies": { "express": "^4.19.0" },
                "devDependencies": { "jest": "^29.0.0" }
            }"#,
        );
        assert!(deps.has("express"));
        assert!(deps.has("jest"));
        assert!(!deps.has("react"));
    }

    #[test]
    fn package_json_prefix_is_not_a_match() {
        let deps = package_json(r#"{ "dependencies": { "next-auth": "4" } }"#);
        assert!(!deps.has("next"));
    }

    #[test]
    fn broken_package_json_is_empty() {
        assert!(package_json("{ nope").is_empty());
    }

    #[test]
    fn cargo_toml_dependencies() {
        let deps = cargo_toml(
            r#"
[package]
name = "svc"

[dependencies]
axum = "0.8"
tokio = { version = "1", features = ["full"] }
"#,
        );
        assert!(deps.has("axum"));
        assert!(deps.has("tokio"));
        assert!(!deps.has("rocket"));
    }

    #[test]
    fn go_mod_block_and_single_line() {
        let deps = go_mod(
            "module example.com/shop\n\ngo 1.22\n\nrequire github.com/stretchr/testify v1.9.0\n\nrequire (\n\tgithub.com/labstack/echo/v4 v4.12.0\n\t// indirect comment\n)\n",
        );
        assert!(deps.has("github.com/labstack/echo"));
        assert!(deps.has("github.com/stretchr/testify"));
        assert!(!deps.has("github.com/gin-gonic/gin"));
    }

    #[test]
    fn python_manifests() {
        let requirements = python("requirements.txt", "# web\nFastAPI[all]>=0.110\npytest==8.0\n-r dev.txt\n");
        assert!(requirements.has("fastapi"));
        assert!(requirements.has("pytest"));

        let pyproject = python(
            "pyproject.toml",
            r#"
[project]
name = "api"
dependencies = ["Django>=5.0"]

[tool.poetry.group.dev.dependencies]
pytest = "^8"
"#,
        );
        assert!(pyproject.has("django"));
        assert!(pyproject.has("pytest"));

        let pipfile = python("Pipfile", "[packages]\nflask = \"*\"\n");
        assert!(pipfile.has("flask"));

        let setup = python("setup.py", "setup(name='svc', install_requires=['flask>=3', \"requests\"])");
        assert!(setup.has("flask"));
        assert!(setup.has("requests"));
    }

    #[test]
    fn jvm_keywords() {
        let deps = jvm_build("plugins { id 'org.springframework.boot' version '3.3.0' }");
        assert!(deps.has("spring-boot"));
        assert!(!deps.has("junit"));
    }
}
