//! Grounding prompt rendering.

use handlebars::Handlebars;
use nexus_core::{AppError, AppResult};
use serde_json::json;

/// System instruction embedding the retrieved context.
///
/// Restricts the model to the provided context, directs comprehensive use
/// of all relevant retrieved material, and requires quoting fidelity and
/// structured formatting.
const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are "Nexus", a corporate knowledge assistant.
Your primary function is to answer employee questions using ONLY the provided handbook documents.

IMPORTANT: All source documents will be displayed to users below your response. Users can click on them to verify your answer against the original documentation.

STRICT CITATION RULES:
1. **Source Fidelity**: Use ONLY the information provided in the context below.
2. **Comprehensive Coverage**: Most topics are split across multiple sections. Reference ALL relevant information from the context.
3. **Accuracy First**: When making claims, directly reference or quote exact phrases from the context to ensure accuracy.
4. **Markdown Formatting**: Use professional Markdown for headers, lists, and tables. Ensure readability.
5. **Clarity**: Structure your answer logically with clear sections when covering multiple aspects of a topic.

If the context doesn't contain enough information to answer the question, say so clearly and explain what information is missing.

CONTEXT:
{{context}}"#;

/// Render the system prompt with the grounding context in place.
pub fn render_system_prompt(context: &str) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // The context is raw document text, not HTML.
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("system", SYSTEM_PROMPT_TEMPLATE)
        .map_err(|e| AppError::Other(format!("Failed to register prompt template: {}", e)))?;

    handlebars
        .render("system", &json!({ "context": context }))
        .map_err(|e| AppError::Other(format!("Failed to render prompt template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_injected() {
        let rendered = render_system_prompt("Employees receive 25 vacation days.").unwrap();
        assert!(rendered.contains("Employees receive 25 vacation days."));
        assert!(rendered.contains("ONLY the provided handbook documents"));
        assert!(rendered.ends_with("Employees receive 25 vacation days."));
    }

    #[test]
    fn test_markdown_context_is_not_escaped() {
        let rendered = render_system_prompt("**bold** & <em>not html</em>").unwrap();
        assert!(rendered.contains("**bold** & <em>not html</em>"));
    }
}
