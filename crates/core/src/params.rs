use crate::error::GatewayError;
use std::collections::HashMap;

/// Inbound query parameters, split into the ones the handler consumes and the
/// leftover pairs that are forwarded to the origin untouched.
#[derive(Debug)]
pub struct ActionQuery {
    params: HashMap<String, String>,
    leftover: String,
}

impl ActionQuery {
    /// Parse a raw query string. Parameters named in `consumed` are kept for
    /// the handler; everything else is re-serialized into the leftover query
    /// (prefixed with `?` when non-empty).
    pub fn parse(raw: Option<&str>, consumed: &[&str]) -> Self {
        let mut params = HashMap::new();
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        let mut any_leftover = false;
        if let Some(raw) = raw {
            for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
                if consumed.contains(&key.as_ref()) {
                    params.insert(key.into_owned(), value.into_owned());
                } else {
                    serializer.append_pair(&key, &value);
                    any_leftover = true;
                }
            }
        }
        let leftover = if any_leftover {
            format!("?{}", serializer.finish())
        } else {
            String::new()
        };
        Self { params, leftover }
    }

    /// Raw parameter value, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// String parameter; the empty string when absent.
    pub fn string(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_owned()
    }

    /// Boolean flag. Presence implies true, independent of the value.
    pub fn flag(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Required numeric parameter.
    pub fn number(&self, name: &str) -> Result<i64, GatewayError> {
        let value = self.string(name);
        value.parse().map_err(|_| {
            GatewayError::Validation(format!("Not numeric. name={name} value={value}"))
        })
    }

    /// Optional numeric parameter; absence is fine, a non-numeric value is not.
    pub fn number_opt(&self, name: &str) -> Result<Option<i64>, GatewayError> {
        match self.get(name) {
            None => Ok(None),
            Some(_) => self.number(name).map(Some),
        }
    }

    /// Required key parameter: non-empty and starting with `/`.
    pub fn uri(&self, name: &str) -> Result<&str, GatewayError> {
        let value = self.get(name).unwrap_or_default();
        check_uri(value, "Key")?;
        Ok(value)
    }

    /// Required key parameter with the leftover query glued back on, e.g.
    /// `/foo/bar?x=1&l=10`.
    pub fn uri_with_leftover(&self, name: &str) -> Result<String, GatewayError> {
        let uri = self.uri(name)?;
        Ok(format!("{uri}{}", self.leftover))
    }

    /// The forwarded remainder of the query string (`?...`, or empty).
    pub fn leftover(&self) -> &str {
        &self.leftover
    }
}

/// Reject an empty required value with a 400-class error.
pub fn check_not_null(value: &str, name: &str) -> Result<(), GatewayError> {
    if value.is_empty() {
        return Err(GatewayError::Validation(format!("{name} is required.")));
    }
    Ok(())
}

/// Key check: required, and must begin with a slash.
pub fn check_uri(value: &str, name: &str) -> Result<(), GatewayError> {
    check_not_null(value, name)?;
    if !value.starts_with('/') {
        return Err(GatewayError::Validation(format!(
            "{name} must start with a slash."
        )));
    }
    Ok(())
}

/// Append a query-operation marker to a request uri that may already carry
/// parameters: `/foo` + `e` becomes `/foo?e`, `/foo?x=1` + `f` becomes
/// `/foo?x=1&f`.
pub fn append_marker(requesturi: &str, marker: &str) -> String {
    let separator = if requesturi.contains('?') { '&' } else { '?' };
    format!("{requesturi}{separator}{marker}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leftover_excludes_consumed_params() {
        let query = ActionQuery::parse(Some("uri=/foo&x=1&l=10"), &["uri"]);
        assert_eq!(query.get("uri"), Some("/foo"));
        assert_eq!(query.leftover(), "?x=1&l=10");
    }

    #[test]
    fn test_leftover_empty_when_everything_consumed() {
        let query = ActionQuery::parse(Some("uri=/foo"), &["uri"]);
        assert_eq!(query.leftover(), "");
        assert_eq!(query.uri_with_leftover("uri").unwrap(), "/foo");
    }

    #[test]
    fn test_uri_validation() {
        let query = ActionQuery::parse(Some("uri=foo"), &["uri"]);
        assert!(matches!(
            query.uri("uri"),
            Err(GatewayError::Validation(message)) if message == "Key must start with a slash."
        ));
        let query = ActionQuery::parse(None, &["uri"]);
        assert!(matches!(
            query.uri("uri"),
            Err(GatewayError::Validation(message)) if message == "Key is required."
        ));
    }

    #[test]
    fn test_number_requires_numeric_value() {
        let query = ActionQuery::parse(Some("num=12&bad=x"), &["num", "bad"]);
        assert_eq!(query.number("num").unwrap(), 12);
        assert!(matches!(
            query.number("bad"),
            Err(GatewayError::Validation(message)) if message == "Not numeric. name=bad value=x"
        ));
        assert!(query.number("missing").is_err());
        assert_eq!(query.number_opt("missing").unwrap(), None);
        assert_eq!(query.number_opt("num").unwrap(), Some(12));
    }

    #[test]
    fn test_flag_presence_implies_true() {
        let query = ActionQuery::parse(Some("_async&_csv=false"), &["_async", "_csv"]);
        assert!(query.flag("_async"));
        // Presence wins over the value, by contract.
        assert!(query.flag("_csv"));
        assert!(!query.flag("_pagination"));
    }

    #[test]
    fn test_append_marker() {
        assert_eq!(append_marker("/foo", "e"), "/foo?e");
        assert_eq!(append_marker("/foo?x=1", "f"), "/foo?x=1&f");
    }
}
