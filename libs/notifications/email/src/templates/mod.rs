//! Email templates rendered with Handlebars
//!
//! Templates are keyed by name and registered up front; each has a subject
//! and a text and/or HTML body.

use eyre::{eyre, Result};
use handlebars::Handlebars;
use serde_json::Value;
use std::collections::HashMap;

/// Template used for password reset links.
///
/// Variables: `email`, `reset_link`, `app_name`.
pub const PASSWORD_RESET: &str = "password_reset";

/// Rendered template result
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTemplate {
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

/// Email template definition
#[derive(Clone, Debug)]
pub struct EmailTemplate {
    pub name: String,
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

/// Handlebars-based template engine
///
/// Supports `{{name}}` variables, `{{#if}}` blocks and `{{#each}}` loops.
/// HTML bodies are escaped; text bodies are rendered verbatim.
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
    templates: HashMap<String, EmailTemplate>,
}

impl TemplateEngine {
    /// Create a new TemplateEngine with the built-in templates
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);

        let mut engine = Self {
            handlebars,
            templates: HashMap::new(),
        };
        engine.register_defaults()?;

        Ok(engine)
    }

    pub fn register(&mut self, template: EmailTemplate) -> Result<()> {
        self.handlebars
            .register_template_string(&format!("{}_subject", template.name), &template.subject)
            .map_err(|e| eyre!("Failed to register subject template: {}", e))?;

        if let Some(text) = &template.body_text {
            self.handlebars
                .register_template_string(&format!("{}_text", template.name), text)
                .map_err(|e| eyre!("Failed to register text template: {}", e))?;
        }

        if let Some(html) = &template.body_html {
            self.handlebars
                .register_template_string(&format!("{}_html", template.name), html)
                .map_err(|e| eyre!("Failed to register HTML template: {}", e))?;
        }

        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    /// Render a template by name; missing variables are an error
    pub fn render(&self, name: &str, data: &Value) -> Result<RenderedTemplate> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| eyre!("Template not found: {}", name))?;

        let subject = self
            .handlebars
            .render(&format!("{}_subject", name), data)
            .map_err(|e| eyre!("Failed to render subject: {}", e))?;

        let body_text = template
            .body_text
            .as_ref()
            .map(|_| self.render_plain(&format!("{}_text", name), data))
            .transpose()?;

        let body_html = template
            .body_html
            .as_ref()
            .map(|_| {
                self.handlebars
                    .render(&format!("{}_html", name), data)
                    .map_err(|e| eyre!("Failed to render HTML: {}", e))
            })
            .transpose()?;

        Ok(RenderedTemplate {
            subject,
            body_text,
            body_html,
        })
    }

    /// Text bodies must not be HTML-escaped, or links with `&` break
    fn render_plain(&self, template: &str, data: &Value) -> Result<String> {
        let mut plain = self.handlebars.clone();
        plain.register_escape_fn(handlebars::no_escape);
        plain
            .render(template, data)
            .map_err(|e| eyre!("Failed to render text: {}", e))
    }

    fn register_defaults(&mut self) -> Result<()> {
        self.register(EmailTemplate {
            name: PASSWORD_RESET.to_string(),
            subject: "Reset your password for {{app_name}}".to_string(),
            body_text: Some(
                r#"Hello,

Follow this link to reset your {{app_name}} account password for your {{email}} account.

{{reset_link}}

If you didn't ask to reset your password, you can ignore this email.

Thanks,

{{app_name}} Team"#
                    .to_string(),
            ),
            body_html: Some(
                r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <p>Hello,</p>
    <p>Follow this link to reset your {{app_name}} account password for your {{email}} account.</p>
    <p style="margin: 30px 0;">
        <a href="{{reset_link}}"
           style="background-color: #dc2626; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px; display: inline-block;">
            Reset Password
        </a>
    </p>
    <p style="color: #666; font-size: 14px;">If you didn't ask to reset your password, you can ignore this email.</p>
    <p>Thanks,<br>{{app_name}} Team</p>
</body>
</html>"#
                    .to_string(),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reset_data() -> Value {
        json!({
            "app_name": "Gateway Utsav",
            "email": "asha@example.com",
            "reset_link": "https://gatewayutsav-921d6.firebaseapp.com/__/auth/action?mode=resetPassword&oobCode=abc"
        })
    }

    #[test]
    fn test_unknown_template_is_an_error() {
        let engine = TemplateEngine::new().unwrap();
        let err = engine.render("welcome", &reset_data()).unwrap_err();
        assert!(err.to_string().contains("Template not found: welcome"));
    }

    #[test]
    fn test_password_reset_renders_link_unescaped_in_text() {
        let engine = TemplateEngine::new().unwrap();
        let rendered = engine.render(PASSWORD_RESET, &reset_data()).unwrap();

        assert_eq!(rendered.subject, "Reset your password for Gateway Utsav");
        let text = rendered.body_text.unwrap();
        assert!(text.contains("for your asha@example.com account"));
        assert!(text.contains("mode=resetPassword&oobCode=abc"));
        assert!(text.ends_with("Gateway Utsav Team"));

        let html = rendered.body_html.unwrap();
        assert!(html.contains("&amp;oobCode"));
    }

    #[test]
    fn test_missing_variable_is_error() {
        let engine = TemplateEngine::new().unwrap();
        let result = engine.render(PASSWORD_RESET, &json!({"app_name": "Gateway Utsav"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_template_is_error() {
        let engine = TemplateEngine::new().unwrap();
        let err = engine.render("welcome", &json!({})).unwrap_err();
        assert!(err.to_string().contains("Template not found"));
    }

    #[test]
    fn test_custom_template() {
        let mut engine = TemplateEngine::new().unwrap();
        engine
            .register(EmailTemplate {
                name: "notice".to_string(),
                subject: "{{count}} new rooms".to_string(),
                body_text: Some("{{#each rooms}}{{this}} {{/each}}".to_string()),
                body_html: None,
            })
            .unwrap();

        let rendered = engine
            .render("notice", &json!({"count": 2, "rooms": ["Kitchen", "Hall"]}))
            .unwrap();
        assert_eq!(rendered.subject, "2 new rooms");
        assert_eq!(rendered.body_text.as_deref(), Some("Kitchen Hall "));
        assert!(rendered.body_html.is_none());
    }
}
