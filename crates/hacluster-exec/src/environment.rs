//! Process environment inspection

/// Variables whose presence makes HTTPS requests go through a proxy
const PROXY_VARIABLES: [&str; 4] = ["https_proxy", "HTTPS_PROXY", "all_proxy", "ALL_PROXY"];

/// Check whether any proxy variable is set to a non-empty value
pub fn proxy_is_set<I, K, V>(vars: I) -> bool
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    vars.into_iter()
        .any(|(key, value)| PROXY_VARIABLES.contains(&key.as_ref()) && !value.as_ref().is_empty())
}

/// [`proxy_is_set`] applied to the current process environment
#[must_use]
pub fn proxy_set_in_environment() -> bool {
    proxy_is_set(std::env::vars())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_is_set() {
        assert!(proxy_is_set([("https_proxy", "http://proxy:3128")]));
        assert!(proxy_is_set([("PATH", "/bin"), ("ALL_PROXY", "socks5://p")]));
    }

    #[test]
    fn test_proxy_not_set() {
        assert!(!proxy_is_set(Vec::<(String, String)>::new()));
        assert!(!proxy_is_set([("HTTPS_PROXY", "")]));
        assert!(!proxy_is_set([("http_proxy", "http://proxy:3128")]));
    }
}
