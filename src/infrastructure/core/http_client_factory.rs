use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;

/// Transport settings for provider clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpClientSettings {
    /// Transient-failure retries; 0 surfaces the first failure
    pub max_retries: u32,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self {
            max_retries: 0,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates a new HTTP client, with retry middleware when `max_retries > 0`
    pub fn create_client(settings: &HttpClientSettings) -> ClientWithMiddleware {
        let client = Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        let builder = ClientBuilder::new(client);
        if settings.max_retries == 0 {
            return builder.build();
        }

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(settings.max_retries);
        builder
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }
}

/// Helper function to build a URL with query parameters.
/// Since reqwest-middleware 0.5.0 doesn't expose the .query() method,
/// we build the query string manually and append it to the URL.
pub fn build_url_with_query<K, V>(base_url: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if params.is_empty() {
        return base_url.to_string();
    }

    let query_string: String = params
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                urlencoding_encode(k.as_ref()),
                urlencoding_encode(v.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    if base_url.contains('?') {
        format!("{}&{}", base_url, query_string)
    } else {
        format!("{}?{}", base_url, query_string)
    }
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
fn urlencoding_encode(s: &str) -> String {
    let mut encoded = String::new();
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char);
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_with_query() {
        let url = build_url_with_query(
            "https://api.example.com/v3/instruments/EUR_USD/candles",
            &[("granularity", "H1"), ("count", "200")],
        );
        assert_eq!(
            url,
            "https://api.example.com/v3/instruments/EUR_USD/candles?granularity=H1&count=200"
        );
    }

    #[test]
    fn test_query_values_are_encoded() {
        let url = build_url_with_query("https://x.test/a?b=1", &[("from", "2024-01-01T00:00:00+00:00")]);
        assert_eq!(url, "https://x.test/a?b=1&from=2024-01-01T00%3A00%3A00%2B00%3A00");
    }

    #[test]
    fn test_no_params_leaves_url_untouched() {
        let params: [(&str, &str); 0] = [];
        assert_eq!(build_url_with_query("https://x.test", &params), "https://x.test");
    }
}
