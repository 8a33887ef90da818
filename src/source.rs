use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no article found for title {title:?}")]
    NotFound { title: String },
    #[error("wiki request failed: {0}")]
    Transient(#[from] reqwest::Error),
    #[error("unexpected api response: {0}")]
    BadResponse(String),
}

/// One SPARQL result set: declared output variables plus one value map per
/// binding row. Unbound optionals are simply missing from the row's map.
pub struct QueryRows {
    pub vars: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}

#[derive(Deserialize)]
struct SparqlResponse {
    head: SparqlHead,
    results: SparqlResults,
}

#[derive(Deserialize)]
struct SparqlHead {
    vars: Vec<String>,
}

#[derive(Deserialize)]
struct SparqlResults {
    bindings: Vec<BTreeMap<String, SparqlBinding>>,
}

#[derive(Deserialize)]
struct SparqlBinding {
    value: String,
}

/// The two remote collaborators: a SPARQL query endpoint and the MediaWiki
/// revision-content API.
#[derive(Clone)]
pub struct WikiSource {
    client: reqwest::Client,
}

impl WikiSource {
    pub fn new() -> Self {
        WikiSource {
            client: reqwest::Client::new(),
        }
    }

    /// Run a SPARQL query and flatten the JSON binding rows.
    pub async fn run_query(&self, endpoint: &str, query: &str) -> Result<QueryRows, FetchError> {
        debug!("Running SPARQL query against {}", endpoint);
        let response: SparqlResponse = self
            .client
            .get(endpoint)
            .query(&[("query", query), ("format", "json")])
            .header(reqwest::header::USER_AGENT, "wiki_ships/0.1")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let rows = response
            .results
            .bindings
            .into_iter()
            .map(|binding| {
                binding
                    .into_iter()
                    .map(|(var, b)| (var, b.value))
                    .collect()
            })
            .collect();

        Ok(QueryRows {
            vars: response.head.vars,
            rows,
        })
    }

    /// Fetch the raw wikitext of the latest revision of an article.
    pub async fn fetch_document(&self, title: &str, language: &str) -> Result<String, FetchError> {
        let api_url = format!("https://{}.wikipedia.org/w/api.php", language);
        let body: serde_json::Value = self
            .client
            .get(&api_url)
            .query(&[
                ("action", "query"),
                ("prop", "revisions"),
                ("rvlimit", "1"),
                ("rvprop", "content"),
                ("format", "json"),
                ("titles", title),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let pages = body["query"]["pages"]
            .as_object()
            .ok_or_else(|| FetchError::BadResponse("no query.pages object".into()))?;

        // Single-title request: one page entry, keyed by page id ("-1" when
        // the title does not exist).
        let (page_id, page) = pages
            .iter()
            .next()
            .ok_or_else(|| FetchError::BadResponse("empty query.pages".into()))?;
        if page_id.as_str() == "-1" || page.get("missing").is_some() {
            return Err(FetchError::NotFound {
                title: title.to_string(),
            });
        }

        page["revisions"][0]["*"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| FetchError::BadResponse("revision has no content".into()))
    }
}

impl Default for WikiSource {
    fn default() -> Self {
        WikiSource::new()
    }
}
