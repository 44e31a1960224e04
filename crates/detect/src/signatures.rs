//! Stack signatures and framework tables, most specific first.

use codeward_core::Confidence;

/// How a signature's declared dependencies are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    Maven,
    Gradle,
    Node,
    Python,
    Cargo,
    GoMod,
}

/// A marker-file pattern and what it implies when nothing more specific
/// is found in the manifest.
#[derive(Debug)]
pub struct Signature {
    pub markers: &'static [&'static str],
    pub language: &'static str,
    pub build_tool: &'static str,
    pub profile: &'static str,
    pub confidence: Confidence,
    pub manifest: ManifestKind,
}

/// A dependency that identifies a framework.
#[derive(Debug)]
pub struct Framework {
    pub dependency: &'static str,
    pub name: &'static str,
    pub profile: &'static str,
}

pub const SIGNATURES: &[Signature] = &[
    Signature {
        markers: &["pom.xml"],
        language: "java",
        build_tool: "Maven",
        profile: "java",
        confidence: Confidence::Medium,
        manifest: ManifestKind::Maven,
    },
    Signature {
        markers: &["build.gradle", "build.gradle.kts"],
        language: "java",
        build_tool: "Gradle",
        profile: "java",
        confidence: Confidence::Medium,
        manifest: ManifestKind::Gradle,
    },
    Signature {
        markers: &["tsconfig.json"],
        language: "typescript",
        build_tool: "npm",
        profile: "typescript",
        confidence: Confidence::Medium,
        manifest: ManifestKind::Node,
    },
    Signature {
        markers: &["package.json"],
        language: "javascript",
        build_tool: "npm",
        profile: "nodejs",
        confidence: Confidence::Low,
        manifest: ManifestKind::Node,
    },
    Signature {
        markers: &["pyproject.toml", "requirements.txt", "setup.py", "Pipfile"],
        language: "python",
        build_tool: "pip",
        profile: "python",
        confidence: Confidence::Low,
        manifest: ManifestKind::Python,
    },
    Signature {
        markers: &["Cargo.toml"],
        language: "rust",
        build_tool: "Cargo",
        profile: "rust",
        confidence: Confidence::Medium,
        manifest: ManifestKind::Cargo,
    },
    Signature {
        markers: &["go.mod"],
        language: "go",
        build_tool: "Go modules",
        profile: "go",
        confidence: Confidence::Medium,
        manifest: ManifestKind::GoMod,
    },
];

const JVM_FRAMEWORKS: &[Framework] = &[Framework {
    dependency: "spring-boot",
    name: "Spring Boot",
    profile: "java-spring",
}];

const NODE_FRAMEWORKS: &[Framework] = &[
    Framework {
        dependency: "@nestjs/core",
        name: "NestJS",
        profile: "nodejs-nestjs",
    },
    Framework {
        dependency: "next",
        name: "Next.js",
        profile: "nodejs-nextjs",
    },
    Framework {
        dependency: "react",
        name: "React",
        profile: "nodejs-react",
    },
    Framework {
        dependency: "express",
        name: "Express",
        profile: "nodejs-express",
    },
    Framework {
        dependency: "fastify",
        name: "Fastify",
        profile: "nodejs-fastify",
    },
];

const PYTHON_FRAMEWORKS: &[Framework] = &[
    Framework {
        dependency: "fastapi",
        name: "FastAPI",
        profile: "python-fastapi",
    },
    Framework {
        dependency: "django",
        name: "Django",
        profile: "python-django",
    },
    Framework {
        dependency: "flask",
        name: "Flask",
        profile: "python-flask",
    },
];

const RUST_FRAMEWORKS: &[Framework] = &[
    Framework {
        dependency: "axum",
        name: "Axum",
        profile: "rust-axum",
    },
    Framework {
        dependency: "actix-web",
        name: "Actix Web",
        profile: "rust-actix",
    },
    Framework {
        dependency: "rocket",
        name: "Rocket",
        profile: "rust-rocket",
    },
];

const GO_FRAMEWORKS: &[Framework] = &[
    Framework {
        dependency: "github.com/gin-gonic/gin",
        name: "Gin",
        profile: "go-gin",
    },
    Framework {
        dependency: "github.com/labstack/echo",
        name: "Echo",
        profile: "go-echo",
    },
    Framework {
        dependency: "github.com/gofiber/fiber",
        name: "Fiber",
        profile: "go-fiber",
    },
];

impl ManifestKind {
    pub fn frameworks(self) -> &'static [Framework] {
        match self {
            Self::Maven | Self::Gradle => JVM_FRAMEWORKS,
            Self::Node => NODE_FRAMEWORKS,
            Self::Python => PYTHON_FRAMEWORKS,
            Self::Cargo => RUST_FRAMEWORKS,
            Self::GoMod => GO_FRAMEWORKS,
        }
    }

    /// `(dependency, test framework name)` pairs, in preference order.
    pub fn test_frameworks(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Maven | Self::Gradle => &[("junit", "JUnit")],
            Self::Node => &[("jest", "Jest"), ("vitest", "Vitest"), ("mocha", "Mocha")],
            Self::Python => &[("pytest", "pytest")],
            Self::Cargo => &[],
            Self::GoMod => &[("github.com/stretchr/testify", "Testify")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_marker_belongs_to_one_signature() {
        let mut seen = std::collections::HashSet::new();
        for signature in SIGNATURES {
            assert!(!signature.markers.is_empty());
            for marker in signature.markers {
                assert!(seen.insert(*marker), "{marker} listed twice");
            }
        }
    }

    #[test]
    fn framework_profiles_extend_the_language() {
        for signature in SIGNATURES {
            for framework in signature.manifest.frameworks() {
                assert!(framework.profile.contains('-'), "{}", framework.profile);
            }
        }
    }
}
