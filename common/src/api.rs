use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Status value the backend uses for success.
pub const STATUS_OK: i64 = 0;

/// Every response body is wrapped as `{status, message, data}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub status: i64,
    #[serde(default, alias = "msg")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Error, PartialEq)]
pub enum EnvelopeError {
    #[error("request failed with status {status}: {message}")]
    Failure { status: i64, message: String },
    #[error("unexpected response payload: {0}")]
    Schema(String),
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Message the backend attached, or a generic one naming the status.
    pub fn failure_message(&self) -> String {
        match self.message.as_deref() {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => format!("status {}", self.status),
        }
    }

    /// Checks the status only, discarding any payload.
    pub fn into_unit(self) -> Result<(), EnvelopeError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self.into_failure())
        }
    }

    /// Checks the status, then decodes `data` as `T`.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, EnvelopeError> {
        if !self.is_success() {
            return Err(self.into_failure());
        }
        let data = self.data.unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|e| EnvelopeError::Schema(e.to_string()))
    }

    fn into_failure(self) -> EnvelopeError {
        EnvelopeError::Failure {
            status: self.status,
            message: self.failure_message(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// The backend endpoints the console consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    SchedNames,
    ListJobs,
    TriggerJob,
    RefreshTrigger,
    PauseJob,
    ResumeJob,
    RemoveLocal,
    DeleteJob,
    Login,
    ListInstances,
    DeleteInstance,
}

impl Endpoint {
    pub fn method(self) -> HttpMethod {
        match self {
            Endpoint::SchedNames | Endpoint::ListJobs | Endpoint::ListInstances => HttpMethod::Get,
            Endpoint::RemoveLocal | Endpoint::DeleteInstance => HttpMethod::Delete,
            Endpoint::TriggerJob
            | Endpoint::RefreshTrigger
            | Endpoint::PauseJob
            | Endpoint::ResumeJob
            | Endpoint::DeleteJob
            | Endpoint::Login => HttpMethod::Post,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::SchedNames => "/api/job/sched-names",
            Endpoint::ListJobs => "/api/job/list",
            Endpoint::TriggerJob => "/api/job/trigger",
            Endpoint::RefreshTrigger => "/api/job/refresh",
            Endpoint::PauseJob => "/api/job/pause",
            Endpoint::ResumeJob => "/api/job/resume",
            Endpoint::RemoveLocal => "/api/job/removeLocal",
            Endpoint::DeleteJob => "/api/job/delete",
            Endpoint::Login => "/api/login",
            Endpoint::ListInstances => "/api/instance/list",
            Endpoint::DeleteInstance => "/api/instance/delete",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
