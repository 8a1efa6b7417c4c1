//! Backend talking to a note REST server over HTTPS.

use super::{Backend, BackendError, BackendResult};
use crate::domain::Note;
use crate::infra::base64_data;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use std::time::Duration;

/// Per-request timeout. Requests are never retried.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Body sent on update: only the content travels.
#[derive(Serialize)]
struct UpdateBody {
    #[serde(with = "base64_data")]
    data: Option<Vec<u8>>,
}

/// Blocking client for the REST protocol served by [`crate::server`].
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    base: Url,
    token: String,
    client: Client,
}

impl RemoteBackend {
    /// Creates a client for the server at `url`, authenticating with `token`.
    pub fn new(url: &str, token: impl Into<String>) -> BackendResult<Self> {
        let base = Url::parse(url).map_err(|e| BackendError::InvalidUrl(format!("{}: {}", url, e)))?;
        if base.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(url.to_string()));
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base,
            token: token.into(),
            client,
        })
    }

    /// Builds `<base>/<segment>`, percent-encoding the segment.
    fn url(&self, segment: Option<&str>) -> BackendResult<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| BackendError::InvalidUrl(self.base.to_string()))?;
            segments.pop_if_empty();
            if let Some(segment) = segment {
                segments.push(segment);
            }
        }
        if segment.is_none() && !url.path().ends_with('/') {
            url.set_path(&format!("{}/", url.path()));
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url).bearer_auth(&self.token)
    }

    /// Sends a request; `subject` names the note or query in errors.
    fn send(&self, request: RequestBuilder, subject: &str) -> BackendResult<Response> {
        let response = request.send()?;
        let status = response.status();
        tracing::debug!(url = %response.url(), %status, "remote response");
        if status == StatusCode::OK {
            Ok(response)
        } else {
            Err(error_for(status, response, subject))
        }
    }

    fn query_notes(&self, path: Option<&str>, key: &str, value: &str) -> BackendResult<Vec<Note>> {
        let mut url = self.url(path)?;
        url.query_pairs_mut().append_pair(key, value);
        let response = self.send(self.request(Method::GET, url), value)?;
        Ok(response.json()?)
    }
}

/// Maps a non-200 response onto the backend taxonomy.
fn error_for(status: StatusCode, response: Response, subject: &str) -> BackendError {
    match status {
        StatusCode::NOT_FOUND => BackendError::NotFound(subject.to_string()),
        StatusCode::CONFLICT => BackendError::NoteExist(subject.to_string()),
        StatusCode::BAD_REQUEST => BackendError::BadRequest,
        StatusCode::UNAUTHORIZED => BackendError::Unauthorized,
        StatusCode::NOT_MODIFIED => BackendError::NotModified(subject.to_string()),
        StatusCode::UNPROCESSABLE_ENTITY => match response.json::<Note>() {
            Ok(note) => BackendError::IntegrityFail(Box::new(note)),
            Err(_) => BackendError::InvalidResponse(status.as_u16()),
        },
        other => BackendError::InvalidResponse(other.as_u16()),
    }
}

impl Backend for RemoteBackend {
    fn init(&self) -> BackendResult<()> {
        Ok(())
    }

    fn create(&self, note: &Note) -> BackendResult<()> {
        let url = self.url(None)?;
        self.send(self.request(Method::POST, url).json(note), note.name())?;
        Ok(())
    }

    fn get(&self, name: &str) -> BackendResult<Note> {
        let url = self.url(Some(name))?;
        let response = self.send(self.request(Method::GET, url), name)?;
        Ok(response.json()?)
    }

    fn update(&self, name: &str, data: &[u8]) -> BackendResult<()> {
        let url = self.url(Some(name))?;
        let body = UpdateBody {
            data: Some(data.to_vec()),
        };
        self.send(self.request(Method::PUT, url).json(&body), name)?;
        Ok(())
    }

    fn delete(&self, note: &Note) -> BackendResult<()> {
        let mut url = self.url(Some(note.name()))?;
        url.query_pairs_mut().append_pair("id", note.id().as_str());
        self.send(self.request(Method::DELETE, url), note.name())?;
        Ok(())
    }

    fn list(&self, filter: &str) -> BackendResult<Vec<Note>> {
        self.query_notes(None, "filter", filter)
    }

    fn search(&self, query: &str) -> BackendResult<Vec<Note>> {
        self.query_notes(Some("search"), "query", query)
    }
}
