//! Minimal self-consistent artifacts for categories left empty
//!
//! The frontend page loads the stylesheet and script it ships with and calls
//! the backend's `/api/health` route, the test exercises that route, and the
//! container recipes run the backend entry point.

use super::category::ArtifactCategory;
use super::model::Artifact;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Demo</title>
    <link rel="stylesheet" href="style.css">
</head>
<body>
    <main class="container">
        <h1>Demo</h1>
        <p id="status">Checking backend...</p>
    </main>
    <script src="script.js"></script>
</body>
</html>
"#;

const STYLE_CSS: &str = r#"body {
    font-family: system-ui, sans-serif;
    margin: 0;
    background-color: #f5f5f5;
}

.container {
    max-width: 720px;
    margin: 40px auto;
    padding: 24px;
    background-color: #ffffff;
    border-radius: 8px;
}
"#;

const SCRIPT_JS: &str = r#"document.addEventListener('DOMContentLoaded', () => {
    const status = document.getElementById('status');
    fetch('/api/health')
        .then((response) => response.json())
        .then((data) => { status.textContent = `Backend: ${data.status}`; })
        .catch(() => { status.textContent = 'Backend unavailable'; });
});
"#;

const APP_PY: &str = r#"from flask import Flask, jsonify, send_from_directory

app = Flask(__name__, static_folder="../frontend", static_url_path="")


@app.route("/")
def index():
    return send_from_directory(app.static_folder, "index.html")


@app.route("/api/health")
def health():
    return jsonify({"status": "ok"})


if __name__ == "__main__":
    app.run(host="0.0.0.0", port=5000)
"#;

const REQUIREMENTS_TXT: &str = "flask>=3.0\n";

const SCHEMA_SQL: &str = r#"CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;

const TEST_APP_PY: &str = r#"import unittest

from app import app


class HealthTest(unittest.TestCase):
    def setUp(self):
        self.client = app.test_client()

    def test_health(self):
        response = self.client.get("/api/health")
        self.assertEqual(response.status_code, 200)
        self.assertEqual(response.get_json()["status"], "ok")


if __name__ == "__main__":
    unittest.main()
"#;

const DEPLOY_MD: &str = r#"# Deployment

Build and start the stack:

    docker compose up --build

The application listens on http://localhost:5000.
"#;

const DOCKERFILE: &str = r#"FROM python:3.11-slim
WORKDIR /app
COPY backend/requirements.txt backend/requirements.txt
RUN pip install --no-cache-dir -r backend/requirements.txt
COPY backend/ backend/
COPY frontend/ frontend/
EXPOSE 5000
WORKDIR /app/backend
CMD ["python", "app.py"]
"#;

const COMPOSE_YML: &str = r#"services:
  web:
    build:
      context: ..
      dockerfile: deployment/Dockerfile
    ports:
      - "5000:5000"
"#;

/// Default files for one category
pub fn default_artifacts(category: ArtifactCategory) -> Vec<Artifact> {
    let files: &[(&str, &str)] = match category {
        ArtifactCategory::Frontend => &[
            ("index.html", INDEX_HTML),
            ("style.css", STYLE_CSS),
            ("script.js", SCRIPT_JS),
        ],
        ArtifactCategory::Backend => &[("app.py", APP_PY), ("requirements.txt", REQUIREMENTS_TXT)],
        ArtifactCategory::Database => &[("schema.sql", SCHEMA_SQL)],
        ArtifactCategory::Test => &[("test_app.py", TEST_APP_PY)],
        ArtifactCategory::Deployment => &[
            ("deploy.md", DEPLOY_MD),
            ("Dockerfile", DOCKERFILE),
            ("docker-compose.yml", COMPOSE_YML),
        ],
    };

    files
        .iter()
        .map(|(name, content)| Artifact::new(category, name, *content))
        .collect()
}
