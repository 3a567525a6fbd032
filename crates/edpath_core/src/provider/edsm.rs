use std::{thread, time::Duration};

use reqwest::{
    StatusCode,
    blocking::{Client, Request},
};
use serde::Deserialize;

use crate::{
    Coords, Error, Result,
    constants::{EDSM_SYSTEM_API, HTTP_TIMEOUT_SECS},
};

/// Fetches the raw upstream response for a system name.
pub trait SystemFetcher: Send + Sync {
    fn fetch(&self, name: &str) -> Result<String>;
}

/// EDSM system endpoint over HTTP.
#[derive(Clone, Debug)]
pub struct EdsmClient {
    client: Client,
    endpoint: String,
    delay: Duration,
}

impl EdsmClient {
    pub fn new(delay: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(concat!("edpath/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: EDSM_SYSTEM_API.to_string(),
            delay,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request(&self, name: &str) -> Result<Request> {
        Ok(self
            .client
            .get(&self.endpoint)
            .query(&[("systemName", name), ("showCoordinates", "1")])
            .build()?)
    }
}

impl SystemFetcher for EdsmClient {
    fn fetch(&self, name: &str) -> Result<String> {
        let request = self.request(name)?;
        log::info!("edsm: fetch name={name:?}");
        log::debug!("edsm: GET {}", request.url());

        let response = self.client.execute(request);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let response = response?;
        if let Some(err) = status_error(name, response.status()) {
            return Err(err);
        }
        Ok(response.text()?)
    }
}

/// Maps a non-success HTTP status to the provider error it stands for.
fn status_error(name: &str, status: StatusCode) -> Option<Error> {
    if status.is_success() {
        None
    } else if status == StatusCode::NOT_FOUND {
        Some(Error::not_found(format!("EDSM has no system {name:?} ({status})")))
    } else {
        Some(Error::invalid_data(format!(
            "EDSM lookup for {name:?} failed ({status})"
        )))
    }
}

/// The part of an upstream system record the solver needs.
#[derive(Clone, Debug, Deserialize)]
pub struct SystemRecord {
    #[serde(default)]
    pub name: String,
    pub coords: Option<Coords>,
}

impl SystemRecord {
    /// Decodes and checks a response for `query`.
    ///
    /// An empty body, `[]` or `{}` means the name is unknown upstream.
    pub fn parse(query: &str, raw: &str) -> Result<Coords> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "[]" || trimmed == "{}" {
            return Err(Error::not_found(format!("no upstream record for {query:?}")));
        }

        let record: SystemRecord = serde_json::from_str(trimmed)
            .map_err(|e| Error::invalid_data(format!("record for {query:?}: {e}")))?;
        if record.name.to_lowercase() != query.to_lowercase() {
            return Err(Error::DataMismatch {
                query: query.to_string(),
                found: record.name,
            });
        }
        let coords = record
            .coords
            .ok_or_else(|| Error::invalid_data(format!("record for {query:?} has no coordinates")))?;
        if !coords.is_valid() {
            return Err(Error::invalid_data(format!(
                "record for {query:?} has non-finite coordinates"
            )));
        }
        Ok(coords)
    }
}
