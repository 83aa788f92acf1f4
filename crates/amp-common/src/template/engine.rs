//! Template engine with `${...}` placeholder syntax
//!
//! Uses minijinja with custom syntax configuration:
//! - Variable delimiters: `${...}`
//! - Block delimiters: `{%...%}`
//! - Comment delimiters: `{#...#}`
//! - Escape: `$${...}` produces literal `${...}`

use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, UndefinedBehavior, Value};
use serde::Serialize;

use super::error::TemplateError;

/// Placeholder for escaped `$${` during preprocessing
const ESCAPED_PLACEHOLDER: &str = "\x00__AMP_ESCAPED_DOLLAR_BRACE__\x00";

/// Template engine for manifest assets
///
/// Undefined variables are an error: a dashboard rendered with a missing
/// namespace would silently query the wrong metrics.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    /// Create a new template engine
    ///
    /// # Panics
    ///
    /// Panics if the minijinja syntax configuration fails to build. The
    /// delimiters are hardcoded, so this only happens on a minijinja API change.
    pub fn new() -> Self {
        let syntax = SyntaxConfig::builder()
            .variable_delimiters("${", "}")
            .block_delimiters("{%", "%}")
            .comment_delimiters("{#", "#}")
            .build()
            .expect("template syntax configuration is hardcoded and valid");

        let mut env = Environment::new();
        env.set_syntax(syntax);
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        Self { env }
    }

    /// Render a template string with the given context
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` if the template syntax is invalid or a
    /// referenced variable is undefined.
    pub fn render<C: Serialize>(&self, template: &str, ctx: &C) -> Result<String, TemplateError> {
        let preprocessed = template.replace("$${", ESCAPED_PLACEHOLDER);

        let rendered = self
            .env
            .render_str(&preprocessed, Value::from_serialize(ctx))
            .map_err(TemplateError::from)?;

        Ok(rendered.replace(ESCAPED_PLACEHOLDER, "${"))
    }

    /// Render a template and parse the result as JSON
    ///
    /// Catches templates that produce malformed JSON before they reach the
    /// API server.
    pub fn render_json<C: Serialize>(
        &self,
        template: &str,
        ctx: &C,
    ) -> Result<serde_json::Value, TemplateError> {
        let rendered = self.render(template, ctx)?;
        serde_json::from_str(&rendered).map_err(|e| TemplateError::Context(e.to_string()))
    }
}
