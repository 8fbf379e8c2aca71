//! Placeholder substitution for subject and body templates.
//!
//! Templates use `{name}`-style placeholders resolved against the recipient
//! row's fields plus a generated `unique_code`. A template that references a
//! variable the row does not provide is sent unformatted rather than aborting
//! the batch; the missing variable is logged. Rendering never stops a batch.

use std::collections::HashMap;

use rand::Rng;
use serde::Deserialize;
use tracing::warn;

use crate::error::TemplateError;

/// The subject/body pair applied to every recipient.
#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    /// Subject line, may contain placeholders.
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Message body, may contain placeholders.
    #[serde(default = "default_body")]
    pub body: String,

    /// Send the body as `text/html` rather than `text/plain`.
    #[serde(default = "default_html")]
    pub html: bool,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            subject: default_subject(),
            body: default_body(),
            html: default_html(),
        }
    }
}

fn default_subject() -> String {
    "Email from Mailout".to_string()
}

fn default_body() -> String {
    "Hello {name}, this is a test email.".to_string()
}

const fn default_html() -> bool {
    true
}

/// Render `template` against `vars`, falling back to the unformatted
/// template when substitution fails.
#[must_use]
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    match substitute(template, vars) {
        Ok(rendered) => rendered,
        Err(error) => {
            warn!(%error, "Template left unformatted");
            template.to_string()
        }
    }
}

/// Substitute every `{name}` placeholder in `template` with the matching
/// value from `vars`. `{{` and `}}` escape literal braces.
///
/// # Errors
///
/// Returns an error when a placeholder names a missing variable or the
/// braces are malformed.
pub fn substitute(
    template: &str,
    vars: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(brace) = rest.find(['{', '}']) {
        output.push_str(&rest[..brace]);

        if rest.as_bytes()[brace] == b'{' {
            if rest[brace + 1..].starts_with('{') {
                output.push('{');
                rest = &rest[brace + 2..];
            } else {
                let close = rest[brace + 1..]
                    .find('}')
                    .ok_or(TemplateError::UnclosedPlaceholder)?;
                let name = &rest[brace + 1..brace + 1 + close];
                let value = vars
                    .get(name)
                    .ok_or_else(|| TemplateError::MissingVariable(name.to_string()))?;
                output.push_str(value);
                rest = &rest[brace + 1 + close + 1..];
            }
        } else if rest[brace + 1..].starts_with('}') {
            output.push('}');
            rest = &rest[brace + 2..];
        } else {
            return Err(TemplateError::UnmatchedBrace);
        }
    }

    output.push_str(rest);
    Ok(output)
}

/// Generate the per-recipient registration code: a random 5-digit number,
/// rendered as a string.
#[must_use]
pub fn unique_code() -> String {
    rand::rng().random_range(10_000_u32..=99_999).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn substitutes_all_placeholders() {
        let rendered = substitute(
            "Hello {name}, your code is {unique_code}.",
            &vars(&[("name", "Ada"), ("unique_code", "12345")]),
        )
        .expect("substitution should succeed");

        assert_eq!(rendered, "Hello Ada, your code is 12345.");
    }

    #[test]
    fn repeated_placeholders_substitute_every_occurrence() {
        let rendered = substitute("{name} {name}", &vars(&[("name", "Ada")]))
            .expect("substitution should succeed");

        assert_eq!(rendered, "Ada Ada");
    }

    #[test]
    fn missing_variable_is_reported() {
        let result = substitute("Hello {name}", &vars(&[]));

        assert_eq!(
            result,
            Err(TemplateError::MissingVariable("name".to_string()))
        );
    }

    #[test]
    fn escaped_braces_are_literal() {
        let rendered = substitute("{{not_a_var}} {name}", &vars(&[("name", "Ada")]))
            .expect("substitution should succeed");

        assert_eq!(rendered, "{not_a_var} Ada");
    }

    #[test]
    fn unclosed_placeholder_is_reported() {
        assert_eq!(
            substitute("Hello {name", &vars(&[("name", "Ada")])),
            Err(TemplateError::UnclosedPlaceholder)
        );
    }

    #[test]
    fn render_falls_back_to_unformatted_template() {
        let template = "Hello {name}, welcome to {place}.";
        let rendered = render(template, &vars(&[("name", "Ada")]));

        assert_eq!(rendered, template);
    }

    #[test]
    fn render_is_deterministic_for_complete_mappings() {
        let mapping = vars(&[("name", "Ada")]);

        let first = render("Hi {name}", &mapping);
        let second = render("Hi {name}", &mapping);

        assert_eq!(first, second);
    }

    #[test]
    fn unique_code_is_always_five_digits() {
        for _ in 0..200 {
            let code = unique_code();
            assert_eq!(code.len(), 5);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
