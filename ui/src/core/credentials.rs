//! Pass-through credentials for the upstream calculation service.
//!
//! The client never interprets these values; it only forwards them as
//! request headers. Nothing here touches the network or persists
//! anything across the page session.

pub const HEADER_BASE_URL: &str = "X-RapidAPI-Base-Url";
pub const HEADER_KEY: &str = "X-RapidAPI-Key";
pub const HEADER_HOST: &str = "X-RapidAPI-Host";

/// Which of the three credential inputs an edit targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    Endpoint,
    Key,
    Host,
}

/// The three opaque credential values, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub endpoint: String,
    pub key: String,
    pub host: String,
}

impl Credentials {
    /// Configured means every field is non-empty after trimming.
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty()
            && !self.key.trim().is_empty()
            && !self.host.trim().is_empty()
    }

    pub fn set(&mut self, field: CredentialField, value: String) {
        match field {
            CredentialField::Endpoint => self.endpoint = value,
            CredentialField::Key => self.key = value,
            CredentialField::Host => self.host = value,
        }
    }

    /// Headers for every outgoing request: the JSON content type, plus the
    /// three forwarding headers only once the credentials are complete.
    pub fn build_headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![("Content-Type", "application/json".to_string())];
        if self.is_configured() {
            headers.push((HEADER_BASE_URL, self.endpoint.trim().to_string()));
            headers.push((HEADER_KEY, self.key.trim().to_string()));
            headers.push((HEADER_HOST, self.host.trim().to_string()));
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::distributions::Alphanumeric;
    use rand::{Rng, SeedableRng};

    fn creds(endpoint: &str, key: &str, host: &str) -> Credentials {
        Credentials {
            endpoint: endpoint.into(),
            key: key.into(),
            host: host.into(),
        }
    }

    #[test]
    fn configured_requires_all_three_fields() {
        assert!(creds("https://api.example.com", "k", "h").is_configured());
        assert!(!creds("", "k", "h").is_configured());
        assert!(!creds("https://api.example.com", "", "h").is_configured());
        assert!(!creds("https://api.example.com", "k", "").is_configured());
    }

    #[test]
    fn whitespace_only_fields_do_not_count() {
        assert!(!creds("   ", "k", "h").is_configured());
        assert!(!creds("e", "\t", "h").is_configured());
        assert!(!creds("e", "k", " \n ").is_configured());
    }

    // Property check: configured iff every trimmed field is non-empty,
    // over a mix of random, empty, and whitespace-only values.
    #[test]
    fn configured_matches_trimmed_emptiness() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let sample = |rng: &mut rand::rngs::StdRng| -> String {
            match rng.gen_range(0..4) {
                0 => String::new(),
                1 => " ".repeat(rng.gen_range(1..5)),
                2 => format!(
                    "  {}  ",
                    (0..rng.gen_range(1..12))
                        .map(|_| rng.sample(Alphanumeric) as char)
                        .collect::<String>()
                ),
                _ => (0..rng.gen_range(1..12))
                    .map(|_| rng.sample(Alphanumeric) as char)
                    .collect(),
            }
        };

        for _ in 0..500 {
            let c = creds(&sample(&mut rng), &sample(&mut rng), &sample(&mut rng));
            let expected = !c.endpoint.trim().is_empty()
                && !c.key.trim().is_empty()
                && !c.host.trim().is_empty();
            assert_eq!(c.is_configured(), expected, "credentials: {c:?}");
        }
    }

    #[test]
    fn headers_include_forwarding_trio_only_when_configured() {
        let incomplete = creds("e", "", "h");
        let headers = incomplete.build_headers();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].0, "Content-Type");

        let complete = creds(" https://up.example ", "secret", "up.example");
        let headers = complete.build_headers();
        assert_eq!(headers.len(), 4);
        assert!(headers
            .iter()
            .any(|(k, v)| *k == HEADER_BASE_URL && v == "https://up.example"));
        assert!(headers.iter().any(|(k, v)| *k == HEADER_KEY && v == "secret"));
        assert!(headers.iter().any(|(k, v)| *k == HEADER_HOST && v == "up.example"));
    }
}
