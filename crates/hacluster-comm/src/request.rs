//! Remote request shapes

use url::form_urlencoded;

/// One remote action plus its form parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestData {
    action: String,
    params: Vec<(String, String)>,
}

impl RequestData {
    /// Create a request for `action`, e.g. `remote/status`
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: Vec::new(),
        }
    }

    /// Add a form parameter
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Value of the first parameter called `name`
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// `application/x-www-form-urlencoded` body
    #[must_use]
    pub fn encoded(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.params)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded() {
        let request = RequestData::new("remote/set_corosync_conf")
            .with_param("corosync_conf", "totem {\n version: 2\n}\n");
        assert_eq!(
            request.encoded(),
            "corosync_conf=totem+%7B%0A+version%3A+2%0A%7D%0A"
        );
        assert_eq!(request.param("corosync_conf"), Some("totem {\n version: 2\n}\n"));
    }

    #[test]
    fn test_encoded_empty() {
        assert_eq!(RequestData::new("remote/status").encoded(), "");
    }
}
