use crate::error::PromptError;
use tera::Tera;

/// Tera-backed template engine for building model prompts.
pub struct TeraEngine {
    tera: Tera,
}

impl TeraEngine {
    /// Create with inline templates (no filesystem).
    pub fn new() -> Self {
        Self {
            tera: Tera::default(),
        }
    }

    /// Register a template from a string.
    pub fn add_template(&mut self, name: &str, content: &str) -> Result<(), PromptError> {
        self.tera
            .add_raw_template(name, content)
            .map_err(|e| PromptError::Render(format!("{name}: {e}")))
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render a named template with the given context.
    pub fn render(&self, template_name: &str, context: &tera::Context) -> Result<String, PromptError> {
        if !self.has_template(template_name) {
            return Err(PromptError::NotFound(template_name.to_string()));
        }
        self.tera
            .render(template_name, context)
            .map_err(|e| PromptError::Render(format!("{template_name}: {e}")))
    }
}

impl Default for TeraEngine {
    fn default() -> Self {
        Self::new()
    }
}
