use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::crossref::{CrossRefResponse, CrossRefWork, citation_from_work};
use crate::{Config, NewCitation};

static DOI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^10\.[0-9]{4,}/[^\s]+$").unwrap());

static DOI_URL_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://doi\.org/").unwrap());

/// Errors from resolving a DOI against CrossRef.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("invalid DOI format: {0:?} (expected e.g. 10.1234/example)")]
    InvalidDoiFormat(String),
    #[error("DOI not found: {0}")]
    NotFound(String),
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("CrossRef lookup failed: HTTP {0}")]
    Status(u16),
    #[error("failed to parse CrossRef response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LookupError {
    /// Stable error code shown next to the inline message.
    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::InvalidDoiFormat(_) => "invalid-doi-format",
            LookupError::NotFound(_) => "not-found",
            LookupError::Http(_) | LookupError::Status(_) | LookupError::Parse(_) => {
                "network-or-parse-failure"
            }
        }
    }
}

/// Trim a DOI and strip a leading `https://doi.org/` (or `http://`).
pub fn clean_doi(doi: &str) -> String {
    DOI_URL_PREFIX_RE.replace(doi.trim(), "").into_owned()
}

pub fn is_valid_doi(doi: &str) -> bool {
    DOI_RE.is_match(&clean_doi(doi))
}

/// Client for the CrossRef `works` API.
#[derive(Debug, Clone)]
pub struct CrossRefClient {
    client: reqwest::Client,
    config: Config,
}

impl CrossRefClient {
    pub fn new(config: Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, config }
    }

    fn user_agent(&self) -> String {
        match &self.config.crossref_mailto {
            Some(email) => format!("citecheck/{} (mailto:{})", env!("CARGO_PKG_VERSION"), email),
            None => format!("citecheck/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Fetch the raw work metadata for a DOI. The DOI is not validated here.
    pub async fn fetch_work(&self, doi: &str) -> Result<CrossRefWork, LookupError> {
        let doi = clean_doi(doi);
        let url = format!(
            "{}/works/{}",
            self.config.crossref_base_url.trim_end_matches('/'),
            urlencoding::encode(&doi)
        );
        tracing::debug!(%url, "fetching CrossRef work");

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("User-Agent", self.user_agent())
            .timeout(self.config.timeout())
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 404 {
            return Err(LookupError::NotFound(doi));
        }
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        let data: CrossRefResponse = serde_json::from_str(&body)?;
        Ok(data.message)
    }

    /// Validate a DOI, fetch its metadata and build a citation row.
    pub async fn lookup(&self, doi: &str) -> Result<NewCitation, LookupError> {
        if !is_valid_doi(doi) {
            return Err(LookupError::InvalidDoiFormat(doi.trim().to_string()));
        }
        let work = self.fetch_work(doi).await?;
        let citation = citation_from_work(&work, doi);
        tracing::info!(doi = %citation.doi, year = ?citation.year, "resolved DOI");
        Ok(citation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_doi() {
        assert_eq!(clean_doi("  10.1038/nature12373 "), "10.1038/nature12373");
        assert_eq!(
            clean_doi("https://doi.org/10.1038/nature12373"),
            "10.1038/nature12373"
        );
        assert_eq!(
            clean_doi("http://doi.org/10.1038/nature12373"),
            "10.1038/nature12373"
        );
    }

    #[test]
    fn test_valid_doi() {
        assert!(is_valid_doi("10.1038/nature12373"));
        assert!(is_valid_doi("https://doi.org/10.1029/2018JD029522"));
        assert!(is_valid_doi("10.12345/ABC-def_(1)"));
    }

    #[test]
    fn test_invalid_doi() {
        assert!(!is_valid_doi(""));
        assert!(!is_valid_doi("10.12/abc"));
        assert!(!is_valid_doi("10.1234/has space"));
        assert!(!is_valid_doi("doi:10.1234/abc"));
        assert!(!is_valid_doi("https://dx.doi.org/10.1234/abc"));
        // Registrant codes are ASCII digits only.
        assert!(!is_valid_doi("10.\u{0661}\u{0662}\u{0663}\u{0664}/x"));
        assert!(!is_valid_doi("10.１２３４/x"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            LookupError::InvalidDoiFormat("x".into()).kind(),
            "invalid-doi-format"
        );
        assert_eq!(LookupError::NotFound("x".into()).kind(), "not-found");
        assert_eq!(LookupError::Status(500).kind(), "network-or-parse-failure");
        let parse = serde_json::from_str::<CrossRefResponse>("not json").unwrap_err();
        assert_eq!(LookupError::from(parse).kind(), "network-or-parse-failure");
    }

    #[tokio::test]
    async fn lookup_rejects_malformed_doi_without_network() {
        let client = CrossRefClient::new(Config {
            crossref_base_url: "http://127.0.0.1:1".into(),
            ..Config::default()
        });
        let err = client.lookup("not-a-doi").await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidDoiFormat(ref d) if d == "not-a-doi"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_failure() {
        let client = CrossRefClient::new(Config {
            crossref_base_url: "http://127.0.0.1:1".into(),
            timeout_secs: 2,
            ..Config::default()
        });
        let err = client.lookup("10.1038/nature12373").await.unwrap_err();
        assert_eq!(err.kind(), "network-or-parse-failure");
    }
}
