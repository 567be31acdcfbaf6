//! Route template resolution.
//!
//! Templates name their placeholders in braces
//! (`/{SubscriptionId}/services/sqlservers/servers/{ServerName}`) and may
//! carry a fixed query (`?op=ResetPassword`). Resolution substitutes
//! percent-encoded parameter values and appends optional query pairs.

use crate::error::GatewayError;

/// Named values for a template's placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: Vec<(&'static str, String)>,
}

impl PathParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, replacing any earlier value with the same name.
    #[must_use]
    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
        self
    }

    /// Returns the value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Optional query-string pairs appended after the template.
pub type QueryParams = Vec<(&'static str, String)>;

/// Resolves `template` into a concrete relative path.
///
/// # Errors
///
/// Returns [`GatewayError::MissingParameter`] if a placeholder has no value
/// and [`GatewayError::InvalidRoute`] if a brace is unterminated or a
/// placeholder is empty.
pub fn resolve(
    template: &str,
    params: &PathParams,
    query: &[(&'static str, String)],
) -> Result<String, GatewayError> {
    let mut path = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let (literal, tail) = rest.split_at(open);
        path.push_str(literal);

        let Some(close) = tail.find('}') else {
            return Err(invalid(template, "unterminated placeholder"));
        };
        let name = tail.get(1..close).unwrap_or_default();
        if name.is_empty() {
            return Err(invalid(template, "empty placeholder"));
        }
        if name.contains('{') {
            return Err(invalid(template, "nested placeholder"));
        }

        let value = params.get(name).ok_or_else(|| GatewayError::MissingParameter {
            name: name.to_string(),
        })?;
        path.push_str(&urlencoding::encode(value));
        rest = tail.get(close + 1..).unwrap_or_default();
    }
    if rest.contains('}') {
        return Err(invalid(template, "unmatched closing brace"));
    }
    path.push_str(rest);

    let mut separator = if path.contains('?') { '&' } else { '?' };
    for (key, value) in query {
        path.push(separator);
        path.push_str(&urlencoding::encode(key));
        path.push('=');
        path.push_str(&urlencoding::encode(value));
        separator = '&';
    }

    Ok(path)
}

fn invalid(template: &str, reason: &str) -> GatewayError {
    GatewayError::InvalidRoute {
        template: template.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const SERVER: &str = "/{SubscriptionId}/services/sqlservers/servers/{ServerName}";

    fn resolved(template: &str, params: &PathParams, query: &[(&'static str, String)]) -> String {
        match resolve(template, params, query) {
            Ok(path) => path,
            Err(err) => panic!("resolve failed: {err}"),
        }
    }

    #[test]
    fn substitutes_every_placeholder() {
        let params = PathParams::new()
            .with("SubscriptionId", "sub-1")
            .with("ServerName", "abc123");
        assert_eq!(
            resolved(SERVER, &params, &[]),
            "/sub-1/services/sqlservers/servers/abc123"
        );
    }

    #[test]
    fn escapes_values() {
        let params = PathParams::new()
            .with("SubscriptionId", "a b/c")
            .with("ServerName", "x?y&z");
        let path = resolved(SERVER, &params, &[]);
        assert_eq!(path, "/a%20b%2Fc/services/sqlservers/servers/x%3Fy%26z");
        assert!(!path.contains('{'));
    }

    #[test]
    fn missing_value_is_reported_by_name() {
        let params = PathParams::new().with("SubscriptionId", "sub");
        let Err(GatewayError::MissingParameter { name }) = resolve(SERVER, &params, &[]) else {
            panic!("expected MissingParameter");
        };
        assert_eq!(name, "ServerName");
    }

    #[test]
    fn keeps_template_query_and_appends_pairs() {
        let params = PathParams::new()
            .with("SubscriptionId", "s")
            .with("ServerName", "n");
        let template = "/{SubscriptionId}/servers/{ServerName}?op=ResetPassword";
        assert_eq!(
            resolved(template, &params, &[("eventTypes", "deadlock,throttling".to_string())]),
            "/s/servers/n?op=ResetPassword&eventTypes=deadlock%2Cthrottling"
        );
    }

    #[test]
    fn first_query_pair_opens_query() {
        let params = PathParams::new().with("SubscriptionId", "s");
        let query = [
            ("startDate", "2015-01-01".to_string()),
            ("intervalSizeInMinutes", "60".to_string()),
        ];
        assert_eq!(
            resolved("/{SubscriptionId}/events", &params, &query),
            "/s/events?startDate=2015-01-01&intervalSizeInMinutes=60"
        );
    }

    #[test]
    fn malformed_templates_are_rejected() {
        let params = PathParams::new().with("A", "1");
        for template in ["/{A", "/{}/x", "/A}", "/{{A}"] {
            assert!(
                matches!(
                    resolve(template, &params, &[]),
                    Err(GatewayError::InvalidRoute { .. })
                ),
                "{template} should be rejected"
            );
        }
    }

    #[test]
    fn later_value_replaces_earlier() {
        let params = PathParams::new().with("A", "1").with("A", "2");
        assert_eq!(params.get("A"), Some("2"));
    }
}
