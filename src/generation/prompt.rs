//! Per-phase prompt construction

use super::port::PhaseContext;
use crate::llm::ChatMessage;
use crate::workflow::Stage;

/// Appended to every phase that is expected to emit code
const CODE_OUTPUT_RULES: &str = "\
Output rules:
1. Put every file in its own fenced block with a language tag (```html, ```css, ```js, ```python, ```sql, ```dockerfile, ```yaml).
2. Start each block with the complete file content; no ellipses or placeholders.
3. Do not describe what you are about to write.";

fn role(stage: Stage) -> &'static str {
    match stage {
        Stage::Requirement => {
            "You are a product analyst. Turn the product description into a concise requirement \
             report: target users, core features, non-functional needs and acceptance criteria."
        }
        Stage::Design => {
            "You are a software architect. Design a small web application for the requirements: \
             frontend pages, backend endpoints, data model and how the pieces talk to each other."
        }
        Stage::Coding => {
            "You are a full-stack developer. Implement the design as a runnable demo: one html \
             page with its stylesheet and script, a backend service, and a database schema."
        }
        Stage::Testing => {
            "You are a QA engineer. Write an automated test suite for the implementation that \
             exercises the backend endpoints."
        }
        Stage::Deployment => {
            "You are a DevOps engineer. Provide a Dockerfile, a docker-compose.yml and short \
             deployment notes for running the demo locally."
        }
        Stage::Success | Stage::Failed => "",
    }
}

fn emits_code(stage: Stage) -> bool {
    matches!(stage, Stage::Coding | Stage::Testing | Stage::Deployment)
}

/// Builds the system and user messages for a phase
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn system_prompt(&self, stage: Stage) -> String {
        if emits_code(stage) {
            format!("{}\n\n{}", role(stage), CODE_OUTPUT_RULES)
        } else {
            role(stage).to_string()
        }
    }

    pub fn user_prompt(&self, stage: Stage, context: &PhaseContext) -> String {
        let mut prompt = format!("Product description:\n{}\n", context.description.trim());

        for (prior, report) in &context.prior_reports {
            prompt.push_str(&format!("\n## {} report\n{}\n", prior, report.trim()));
        }

        if let Some(feedback) = &context.feedback {
            prompt.push_str(&format!(
                "\nThe previous attempt was rejected by validation:\n{}\nFix every issue listed above.\n",
                feedback
            ));
        }

        prompt.push_str(&format!("\nProduce the {} report now.", stage));
        prompt
    }

    pub fn messages(&self, stage: Stage, context: &PhaseContext) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_prompt(stage)),
            ChatMessage::user(self.user_prompt(stage, context)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> PhaseContext {
        PhaseContext {
            description: "A recipe sharing site".to_string(),
            prior_reports: vec![
                (Stage::Requirement, "Users post recipes.".to_string()),
                (Stage::Design, "Flask + SQLite.".to_string()),
            ],
            feedback: None,
            attempt: 1,
        }
    }

    #[test]
    fn test_user_prompt_embeds_prior_reports_in_order() {
        let prompt = PromptBuilder::new().user_prompt(Stage::Coding, &context());

        let req = prompt.find("## requirement report").unwrap();
        let design = prompt.find("## design report").unwrap();
        assert!(req < design);
        assert!(prompt.contains("A recipe sharing site"));
        assert!(prompt.ends_with("Produce the coding report now."));
    }

    #[test]
    fn test_feedback_is_verbatim() {
        let mut ctx = context();
        ctx.feedback = Some("[MarkupStructure] frontend/index.html is missing its <html>...</html> root".to_string());

        let prompt = PromptBuilder::new().user_prompt(Stage::Coding, &ctx);
        assert!(prompt.contains(
            "[MarkupStructure] frontend/index.html is missing its <html>...</html> root"
        ));
    }

    #[test]
    fn test_code_rules_only_for_code_phases() {
        let builder = PromptBuilder::new();
        assert!(builder.system_prompt(Stage::Coding).contains("Output rules"));
        assert!(!builder.system_prompt(Stage::Requirement).contains("Output rules"));
    }

    #[test]
    fn test_messages_roles() {
        let messages = PromptBuilder::new().messages(Stage::Design, &context());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, crate::llm::MessageRole::System);
        assert_eq!(messages[1].role, crate::llm::MessageRole::User);
    }
}
