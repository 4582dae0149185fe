//! Backend framework detection and dependency declarations

use super::category::ArtifactCategory;
use super::model::Artifact;
use crate::classify::contains_term;

/// Fallback entry point when no framework is recognised
pub const DEFAULT_BACKEND_FILE: &str = "app.py";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyFile {
    Requirements(&'static [&'static str]),
    PackageJson(&'static [(&'static str, &'static str)]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendFramework {
    pub name: &'static str,
    pub markers: &'static [&'static str],
    pub entry_file: &'static str,
    pub dependencies: DependencyFile,
}

/// Checked top to bottom; the first framework with a marker hit wins
pub const BACKEND_FRAMEWORKS: &[BackendFramework] = &[
    BackendFramework {
        name: "flask",
        markers: &["from flask", "import flask", "flask("],
        entry_file: "app.py",
        dependencies: DependencyFile::Requirements(&["flask>=3.0"]),
    },
    BackendFramework {
        name: "fastapi",
        markers: &["from fastapi", "import fastapi", "fastapi("],
        entry_file: "main.py",
        dependencies: DependencyFile::Requirements(&["fastapi>=0.110", "uvicorn>=0.29"]),
    },
    BackendFramework {
        name: "django",
        markers: &["from django", "import django"],
        entry_file: "views.py",
        dependencies: DependencyFile::Requirements(&["django>=5.0"]),
    },
    BackendFramework {
        name: "express",
        markers: &["require('express')", "require(\"express\")", "from 'express'", "from \"express\"", "express()"],
        entry_file: "server.js",
        dependencies: DependencyFile::PackageJson(&[("express", "^4.19.2")]),
    },
    BackendFramework {
        name: "node",
        markers: &["require(", "module.exports", "http.createserver", "process.env"],
        entry_file: "server.js",
        dependencies: DependencyFile::PackageJson(&[]),
    },
];

pub fn detect_framework(text: &str) -> Option<&'static BackendFramework> {
    let lower = text.to_lowercase();
    BACKEND_FRAMEWORKS
        .iter()
        .find(|fw| fw.markers.iter().any(|m| contains_term(&lower, m)))
}

/// Writes the backend text verbatim under the detected framework's filename,
/// plus a dependency file for that framework
pub fn assemble_backend(text: &str) -> Vec<Artifact> {
    let Some(framework) = detect_framework(text) else {
        return vec![Artifact::new(ArtifactCategory::Backend, DEFAULT_BACKEND_FILE, text)];
    };

    vec![
        Artifact::new(ArtifactCategory::Backend, framework.entry_file, text),
        dependency_artifact(framework),
    ]
}

pub fn dependency_artifact(framework: &BackendFramework) -> Artifact {
    match framework.dependencies {
        DependencyFile::Requirements(packages) => {
            let mut content = packages.join("\n");
            content.push('\n');
            Artifact::new(ArtifactCategory::Backend, "requirements.txt", content)
        }
        DependencyFile::PackageJson(packages) => {
            let dependencies: serde_json::Map<String, serde_json::Value> = packages
                .iter()
                .map(|(name, version)| (name.to_string(), serde_json::Value::from(*version)))
                .collect();
            let manifest = serde_json::json!({
                "name": "demo-backend",
                "version": "1.0.0",
                "private": true,
                "main": framework.entry_file,
                "scripts": { "start": format!("node {}", framework.entry_file) },
                "dependencies": dependencies,
            });
            let mut content =
                serde_json::to_string_pretty(&manifest).unwrap_or_else(|_| "{}".to_string());
            content.push('\n');
            Artifact::new(ArtifactCategory::Backend, "package.json", content)
        }
    }
}
