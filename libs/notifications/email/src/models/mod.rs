use serde::{Deserialize, Serialize};

/// Email message to be sent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Email {
    /// Unique identifier, used in logs and as a fallback message id
    pub id: String,
    /// Recipient email address
    pub to: String,
    pub subject: String,
    /// Plain text body
    pub body_text: Option<String>,
    /// HTML body
    pub body_html: Option<String>,
}

impl Email {
    /// Create a new email with required fields
    pub fn new(to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            to: to.into(),
            subject: subject.into(),
            body_text: None,
            body_html: None,
        }
    }

    /// Set plain text body
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.body_text = Some(text.into());
        self
    }

    /// Set HTML body
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.body_html = Some(html.into());
        self
    }

    /// Build from a rendered template
    pub fn from_rendered(to: impl Into<String>, rendered: crate::templates::RenderedTemplate) -> Self {
        let mut email = Self::new(to, rendered.subject);
        email.body_text = rendered.body_text;
        email.body_html = rendered.body_html;
        email
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_bodies() {
        let email = Email::new("a@b.io", "Hi")
            .with_text("plain")
            .with_html("<p>html</p>");

        assert_eq!(email.to, "a@b.io");
        assert_eq!(email.body_text.as_deref(), Some("plain"));
        assert_eq!(email.body_html.as_deref(), Some("<p>html</p>"));
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(Email::new("a@b.io", "x").id, Email::new("a@b.io", "x").id);
    }
}
