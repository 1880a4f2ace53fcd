//! Crossref works API client.
//!
//! Provides metadata lookups and full-text URL discovery from
//! `GET {base}/{doi}`.

use crate::config::Config;
use refshelf_engine::{Author, DocumentError, Lookup, LookupError, Record};
use reqwest::StatusCode;
use serde::Deserialize;

/// HTTP client for the works endpoint.
#[derive(Debug, Clone)]
pub struct Crossref {
    http: reqwest::Client,
    base_url: reqwest::Url,
}

impl Crossref {
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.lookup_url.clone(),
        })
    }

    /// Underlying HTTP client, shared with the document store.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// `{base}/{doi}` with the DOI as one percent-encoded path segment.
    fn work_url(&self, doi: &str) -> reqwest::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(doi);
        }
        url
    }

    async fn work(&self, doi: &str) -> Result<Work, LookupError> {
        let url = self.work_url(doi);
        tracing::debug!(url = %url, "requesting work");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(doi.to_string()));
        }
        let response = response
            .error_for_status()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;
        Ok(envelope.message)
    }

    /// First full-text link advertised as a PDF.
    pub async fn pdf_url(&self, doi: &str) -> Result<String, DocumentError> {
        let work = self.work(doi).await.map_err(|e| match e {
            LookupError::Network(msg) => DocumentError::Network(msg),
            _ => DocumentError::NotFound(doi.to_string()),
        })?;
        work.pdf_link()
            .map(str::to_string)
            .ok_or_else(|| DocumentError::NotFound(doi.to_string()))
    }
}

impl Lookup for Crossref {
    async fn lookup(&self, doi: &str) -> Result<Record, LookupError> {
        let work = self.work(doi).await?;
        Ok(work.into_record(doi))
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    message: Work,
}

/// The subset of a Crossref work that maps onto a [`Record`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Work {
    #[serde(default)]
    title: Vec<String>,
    #[serde(default)]
    author: Vec<WorkAuthor>,
    #[serde(default)]
    container_title: Vec<String>,
    #[serde(default)]
    short_container_title: Vec<String>,
    volume: Option<String>,
    issue: Option<String>,
    page: Option<String>,
    published_print: Option<DateParts>,
    published_online: Option<DateParts>,
    issued: Option<DateParts>,
    #[serde(default)]
    link: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct WorkAuthor {
    family: Option<String>,
    given: Option<String>,
    /// Organisational authors carry only a name
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DateParts {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i32>>>,
}

impl DateParts {
    fn year(&self) -> Option<i32> {
        self.date_parts.first()?.first().copied().flatten()
    }
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "URL")]
    url: String,
    #[serde(rename = "content-type", default)]
    content_type: String,
}

impl Work {
    fn year(&self) -> Option<i32> {
        [&self.published_print, &self.published_online, &self.issued]
            .into_iter()
            .flatten()
            .find_map(DateParts::year)
    }

    fn pdf_link(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|l| l.content_type == "application/pdf")
            .map(|l| l.url.as_str())
    }

    /// The record keeps the DOI as requested; Crossref may answer with a
    /// differently-cased one.
    fn into_record(self, requested: &str) -> Record {
        let year = self.year();
        let authors = self
            .author
            .into_iter()
            .filter_map(|a| {
                let family = a.family.or(a.name)?;
                Some(Author {
                    family,
                    given: a.given,
                })
            })
            .collect();

        Record {
            doi: requested.to_string(),
            title: self.title.into_iter().next().map(|t| t.trim().to_string()),
            authors,
            year,
            journal: self.container_title.into_iter().next(),
            journal_short: self.short_container_title.into_iter().next(),
            volume: self.volume,
            issue: self.issue,
            pages: self.page,
            ..Record::default()
        }
    }
}
