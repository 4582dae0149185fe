//! Category vocabularies, evaluated in priority order

use super::signals::contains_term;
use crate::artifact::ArtifactCategory;

/// One row of the classification table
///
/// `terms` are matched against the lowercased text, `exact_terms` against the
/// original text. Both use word-boundary matching on the leading side.
#[derive(Debug, Clone, Copy)]
pub struct CategoryVocabulary {
    pub category: ArtifactCategory,
    pub terms: &'static [&'static str],
    pub exact_terms: &'static [&'static str],
}

impl CategoryVocabulary {
    /// First vocabulary term found in `text`, if any
    pub fn find_match(&self, text: &str) -> Option<&'static str> {
        let lower = text.to_lowercase();
        self.terms
            .iter()
            .copied()
            .find(|term| contains_term(&lower, term))
            .or_else(|| {
                self.exact_terms
                    .iter()
                    .copied()
                    .find(|term| contains_term(text, term))
            })
    }
}

/// Priority order: frontend > backend > database > test > deployment.
///
/// Markup markers are more specific than generic backend or test tokens, so
/// frontend is checked first.
pub const CATEGORY_VOCABULARIES: &[CategoryVocabulary] = &[
    CategoryVocabulary {
        category: ArtifactCategory::Frontend,
        terms: &[
            "<!doctype",
            "<html",
            "<head",
            "<body",
            "<div",
            "<span",
            "<script",
            "<style",
            "<link",
            "<form",
            "<button",
            "<canvas",
            "<input",
            "document.",
            "window.",
            "addeventlistener",
            "getelementbyid",
            "queryselector",
            "innerhtml",
            "localstorage",
            "usestate",
            "react",
            "vue",
            "@media",
            "font-family",
            "background-color",
            "margin:",
            "padding:",
            "color:",
        ],
        exact_terms: &[],
    },
    CategoryVocabulary {
        category: ArtifactCategory::Backend,
        terms: &[
            "flask",
            "fastapi",
            "django",
            "express",
            "@app.",
            "app.get(",
            "app.post(",
            "app.listen",
            "app.run(",
            "uvicorn",
            "router",
            "endpoint",
            "createserver",
            "http.handlefunc",
            "func main",
            "public static void main",
            "module.exports",
            "require(",
            "async def ",
            "def ",
            "class ",
        ],
        exact_terms: &[],
    },
    CategoryVocabulary {
        category: ArtifactCategory::Database,
        terms: &[
            "create table",
            "insert into",
            "alter table",
            "drop table",
            "primary key",
            "foreign key",
            "create index",
        ],
        exact_terms: &["SELECT ", "UPDATE ", "DELETE FROM"],
    },
    CategoryVocabulary {
        category: ArtifactCategory::Test,
        terms: &[
            "assert",
            "unittest",
            "pytest",
            "describe(",
            "it(",
            "expect(",
            "test(",
            "testcase",
            "@test",
            "#[test]",
            "jest",
            "mocha",
            "cypress",
        ],
        exact_terms: &[],
    },
    CategoryVocabulary {
        category: ArtifactCategory::Deployment,
        terms: &[
            "dockerfile",
            "docker-compose",
            "docker build",
            "docker run",
            "entrypoint",
            "services:",
            "image:",
            "replicas:",
            "apiversion:",
            "kubectl",
            "nginx",
            "#!/bin/bash",
            "#!/bin/sh",
        ],
        exact_terms: &["FROM ", "EXPOSE ", "CMD ", "RUN ", "WORKDIR "],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn vocabulary(category: ArtifactCategory) -> &'static CategoryVocabulary {
        CATEGORY_VOCABULARIES
            .iter()
            .find(|v| v.category == category)
            .unwrap()
    }

    #[test]
    fn test_table_order_matches_priority() {
        let order: Vec<_> = CATEGORY_VOCABULARIES.iter().map(|v| v.category).collect();
        assert_eq!(order, ArtifactCategory::ALL.to_vec());
    }

    #[parameterized(
        frontend_markup = { ArtifactCategory::Frontend, "<div class=\"card\"></div>" },
        frontend_dom = { ArtifactCategory::Frontend, "document.getElementById('app')" },
        frontend_css = { ArtifactCategory::Frontend, "body { margin: 0; }" },
        backend_flask = { ArtifactCategory::Backend, "from flask import Flask" },
        backend_def = { ArtifactCategory::Backend, "def handler(): return 1" },
        backend_express = { ArtifactCategory::Backend, "const express = require('express');" },
        database_ddl = { ArtifactCategory::Database, "create table users (id int primary key);" },
        database_query = { ArtifactCategory::Database, "SELECT * FROM users;" },
        test_assert = { ArtifactCategory::Test, "assert total == 3" },
        test_jest = { ArtifactCategory::Test, "it('adds', () => expect(add(1, 2)).toBe(3));" },
        deployment_dockerfile = { ArtifactCategory::Deployment, "FROM python:3.11-slim" },
        deployment_compose = { ArtifactCategory::Deployment, "services:\n  web:\n    build: ." },
    )]
    fn test_vocabulary_matches(category: ArtifactCategory, text: &str) {
        assert!(
            vocabulary(category).find_match(text).is_some(),
            "{} vocabulary should match {:?}",
            category,
            text
        );
    }

    #[parameterized(
        submit_is_not_a_test = { ArtifactCategory::Test, "form.submit()" },
        lowercase_select_is_prose = { ArtifactCategory::Database, "select a plan" },
        from_inside_word = { ArtifactCategory::Deployment, "WHEREFROM here" },
    )]
    fn test_vocabulary_rejects(category: ArtifactCategory, text: &str) {
        assert_eq!(vocabulary(category).find_match(text), None);
    }
}
