//! Deployment notes plus build and orchestration recipes

use super::category::ArtifactCategory;
use super::model::{join_fragments, Artifact, Fragment};

pub const DEPLOY_NOTES_FILE: &str = "deploy.md";
pub const DOCKERFILE: &str = "Dockerfile";
pub const COMPOSE_FILE: &str = "docker-compose.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recipe {
    Build,
    Orchestration,
}

/// Always writes the notes file; the recipes only when a fragment carries
/// their own marker (fence language, header comment or leading instruction)
pub fn assemble_deployment(fragments: &[Fragment]) -> Vec<Artifact> {
    let notes = join_fragments(fragments);
    if notes.trim().is_empty() {
        return Vec::new();
    }

    let mut artifacts = vec![Artifact::new(
        ArtifactCategory::Deployment,
        DEPLOY_NOTES_FILE,
        notes,
    )];

    let mut dockerfile = None;
    let mut compose = None;
    for fragment in fragments {
        match recipe_kind(fragment) {
            Some((Recipe::Build, body)) if dockerfile.is_none() => dockerfile = Some(body),
            Some((Recipe::Orchestration, body)) if compose.is_none() => compose = Some(body),
            _ => {}
        }
    }

    if let Some(body) = dockerfile {
        artifacts.push(Artifact::new(ArtifactCategory::Deployment, DOCKERFILE, body));
    }
    if let Some(body) = compose {
        artifacts.push(Artifact::new(ArtifactCategory::Deployment, COMPOSE_FILE, body));
    }
    artifacts
}

fn recipe_kind(fragment: &Fragment) -> Option<(Recipe, String)> {
    let text = fragment.text.as_str();
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let first = lines.next()?.trim();
    let header = first.trim_start_matches('#').trim().to_lowercase();

    if matches!(header.as_str(), "dockerfile") && first.starts_with('#') {
        return Some((Recipe::Build, strip_first_line(text)));
    }
    if matches!(
        header.as_str(),
        "docker-compose.yml" | "docker-compose.yaml" | "compose.yml" | "compose.yaml"
    ) && first.starts_with('#')
    {
        return Some((Recipe::Orchestration, strip_first_line(text)));
    }

    match fragment.language.as_deref() {
        Some("dockerfile") | Some("docker") => return Some((Recipe::Build, text.to_string())),
        Some("yaml") | Some("yml") if has_top_level_services(text) => {
            return Some((Recipe::Orchestration, text.to_string()))
        }
        _ => {}
    }

    let first_instruction = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))?;
    if first_instruction.starts_with("FROM ") {
        return Some((Recipe::Build, text.to_string()));
    }
    if has_top_level_services(text) {
        return Some((Recipe::Orchestration, text.to_string()));
    }
    None
}

fn has_top_level_services(text: &str) -> bool {
    text.lines().any(|l| l.trim_end() == "services:")
}

fn strip_first_line(text: &str) -> String {
    let trimmed = text.trim_start();
    match trimmed.split_once('\n') {
        Some((_, rest)) => rest.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(artifacts: &'a [Artifact], filename: &str) -> Option<&'a Artifact> {
        artifacts.iter().find(|a| a.filename() == filename)
    }

    #[test]
    fn test_notes_only_without_markers() {
        let artifacts = assemble_deployment(&[Fragment::new("docker run -p 5000:5000 demo")]);
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].path, "deployment/deploy.md");
    }

    #[test]
    fn test_fenced_recipes() {
        let artifacts = assemble_deployment(&[
            Fragment::new("FROM python:3.11-slim\nCMD [\"python\", \"app.py\"]").with_language("dockerfile"),
            Fragment::new("services:\n  web:\n    build: .").with_language("yaml"),
        ]);

        assert_eq!(artifacts.len(), 3);
        assert!(find(&artifacts, "Dockerfile").unwrap().content.starts_with("FROM python"));
        assert!(find(&artifacts, "docker-compose.yml").unwrap().content.starts_with("services:"));
        let notes = &find(&artifacts, "deploy.md").unwrap().content;
        assert!(notes.contains("FROM python") && notes.contains("services:"));
    }

    #[test]
    fn test_header_markers_are_stripped() {
        let artifacts = assemble_deployment(&[Fragment::new(
            "# Dockerfile\nFROM node:20\nCMD [\"node\", \"server.js\"]",
        )]);
        assert_eq!(
            find(&artifacts, "Dockerfile").unwrap().content,
            "FROM node:20\nCMD [\"node\", \"server.js\"]"
        );
    }

    #[test]
    fn test_yaml_without_services_is_not_compose() {
        let artifacts = assemble_deployment(&[Fragment::new("name: ci\non: push").with_language("yaml")]);
        assert!(find(&artifacts, "docker-compose.yml").is_none());
    }

    #[test]
    fn test_first_recipe_wins() {
        let artifacts = assemble_deployment(&[
            Fragment::new("FROM a").with_language("dockerfile"),
            Fragment::new("FROM b").with_language("dockerfile"),
        ]);
        assert_eq!(find(&artifacts, "Dockerfile").unwrap().content, "FROM a");
    }

    #[test]
    fn test_empty_fragments() {
        assert!(assemble_deployment(&[]).is_empty());
    }
}
