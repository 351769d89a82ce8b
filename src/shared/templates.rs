//! HTML templates rendered by the delivery endpoints.
//!
//! Templates are embedded at compile time so the binary does not depend on
//! the working directory it is started from.

use minijinja::{Environment, Value};
use std::sync::OnceLock;
use thiserror::Error;

/// Player page served by `/stream/{file_id}`
pub const PLAYER_TEMPLATE: &str = "player.html";

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();
    // `.html` names turn on HTML auto-escaping
    if let Err(e) = env.add_template(
        PLAYER_TEMPLATE,
        include_str!("../../templates/player.html"),
    ) {
        tracing::warn!("Failed to load template {}: {}", PLAYER_TEMPLATE, e);
    }
    env
}

fn environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a named template with the given context
pub fn render_template(name: &str, context: Value) -> Result<String, TemplateError> {
    let template = environment()
        .get_template(name)
        .map_err(|_| TemplateError::NotFound(name.to_string()))?;

    template
        .render(context)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    // Links are built server-side, so they are passed as safe strings
    #[test]
    fn test_player_renders_media_link() {
        let html = render_template(
            PLAYER_TEMPLATE,
            context! {
                filename => "clip.mp4",
                media_link => Value::from_safe_string("https://media.example/dl/42?token=abc".to_string()),
                mime_type => "video/mp4",
            },
        )
        .unwrap();

        assert!(html.contains("https://media.example/dl/42?token=abc"));
        assert!(html.contains("<title>clip.mp4</title>"));
    }

    #[test]
    fn test_player_escapes_filename() {
        let html = render_template(
            PLAYER_TEMPLATE,
            context! {
                filename => "<script>x</script>",
                media_link => "/dl/1?token=t",
                mime_type => "video/mp4",
            },
        )
        .unwrap();

        assert!(!html.contains("<script>x</script>"));
    }

    #[test]
    fn test_unknown_template() {
        assert!(matches!(
            render_template("missing.html", Value::UNDEFINED),
            Err(TemplateError::NotFound(_))
        ));
    }
}
