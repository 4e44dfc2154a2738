//! In-memory fetcher for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use crate::error::MonitorError;
use crate::fetcher::ManifestFetcher;

/// Serves scripted responses per URL. The last response for a URL repeats.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: Mutex<HashMap<String, VecDeque<Result<String, StatusCode>>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: &str, body: &str) -> Self {
        self.push(url, Ok(body.to_string()))
    }

    pub fn fail(self, url: &str, status: StatusCode) -> Self {
        self.push(url, Err(status))
    }

    fn push(self, url: &str, response: Result<String, StatusCode>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ManifestFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, MonitorError> {
        self.requests.lock().unwrap().push(url.to_string());
        let mut responses = self.responses.lock().unwrap();
        let queue = responses
            .get_mut(url.as_str())
            .ok_or_else(|| MonitorError::http_status(StatusCode::NOT_FOUND, url.as_str()))?;
        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        match response {
            Some(Ok(body)) => Ok(body),
            Some(Err(status)) => Err(MonitorError::http_status(status, url.as_str())),
            None => Err(MonitorError::http_status(StatusCode::NOT_FOUND, url.as_str())),
        }
    }
}
