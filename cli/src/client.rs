use std::time::Duration;

use async_trait::async_trait;
use common::{
    Endpoint, Envelope, HttpMethod, InstanceInfo, JobKey, JobRow, LoginRequest, SchedulerName,
    TriggerKey,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ConsoleError, Result};

/// The backend contract the console depends on. Each call is one request and
/// resolves to the decoded payload or a `ConsoleError`.
#[async_trait]
pub trait SchedulerApi: Send + Sync {
    async fn sched_names(&self) -> Result<Vec<SchedulerName>>;

    /// Lists job/trigger rows, filtered to one scheduler when `sched` is set.
    async fn list_jobs(&self, sched: Option<&SchedulerName>) -> Result<Vec<JobRow>>;

    /// Fires the job once. Succeeds only if the backend confirms it.
    async fn trigger_job(&self, key: &JobKey) -> Result<()>;

    /// Re-reads a trigger from the scheduler and returns its current row.
    async fn refresh_trigger(&self, key: &TriggerKey) -> Result<JobRow>;

    async fn pause_job(&self, key: &JobKey) -> Result<()>;

    async fn resume_job(&self, key: &JobKey) -> Result<()>;

    /// Drops the trigger record kept by the scheduler center.
    async fn remove_local(&self, key: &TriggerKey) -> Result<()>;

    /// Deletes the job definition from the scheduler.
    async fn delete_job(&self, key: &JobKey) -> Result<()>;

    async fn login(&self, credentials: &LoginRequest) -> Result<()>;

    async fn list_instances(&self, sched: Option<&SchedulerName>) -> Result<Vec<InstanceInfo>>;

    /// Unregisters a scheduler instance. Succeeds only if the backend confirms it.
    async fn delete_instance(&self, instance: &InstanceInfo) -> Result<()>;
}

/// `SchedulerApi` over HTTP. The cookie store carries the session, so every
/// request after a login is credentialed.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> std::result::Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, endpoint: Endpoint) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint.path());
        match endpoint.method() {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Delete => self.client.delete(url),
        }
    }

    async fn get(&self, endpoint: Endpoint, sched: Option<&SchedulerName>) -> Result<Envelope> {
        let mut req = self.request(endpoint);
        if let Some(name) = sched {
            req = req.query(&[("schedName", name.as_str())]);
        }
        log::debug!("{} schedName={:?}", endpoint, sched.map(SchedulerName::as_str));
        self.execute(endpoint, req).await
    }

    async fn send_json<B: Serialize + Sync>(&self, endpoint: Endpoint, body: &B) -> Result<Envelope> {
        let req = self.request(endpoint).json(body);
        log::debug!("{}", endpoint);
        self.execute(endpoint, req).await
    }

    async fn execute(&self, endpoint: Endpoint, req: reqwest::RequestBuilder) -> Result<Envelope> {
        let resp = req
            .send()
            .await
            .map_err(|source| ConsoleError::Transport { endpoint, source })?;
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|source| ConsoleError::Transport { endpoint, source })?;

        match serde_json::from_slice::<Envelope>(&body) {
            // A failure envelope explains itself even on a non-2xx response.
            Ok(envelope) if status.is_success() || !envelope.is_success() => Ok(envelope),
            Ok(_) => Err(ConsoleError::HttpStatus {
                endpoint,
                status: status.as_u16(),
            }),
            Err(_) if !status.is_success() => Err(ConsoleError::HttpStatus {
                endpoint,
                status: status.as_u16(),
            }),
            Err(e) => Err(ConsoleError::Malformed {
                endpoint,
                detail: e.to_string(),
            }),
        }
    }
}

fn decode<T: DeserializeOwned>(endpoint: Endpoint, envelope: Envelope) -> Result<T> {
    envelope
        .into_data()
        .map_err(|e| ConsoleError::from_envelope(endpoint, e))
}

fn status_only(endpoint: Endpoint, envelope: Envelope) -> Result<()> {
    envelope
        .into_unit()
        .map_err(|e| ConsoleError::from_envelope(endpoint, e))
}

/// For endpoints whose `data` is a success flag: `false` is a failure even
/// when the status is ok.
fn confirmed(endpoint: Endpoint, envelope: Envelope) -> Result<()> {
    if decode::<bool>(endpoint, envelope)? {
        Ok(())
    } else {
        Err(ConsoleError::Rejected { endpoint })
    }
}

#[async_trait]
impl SchedulerApi for HttpApi {
    async fn sched_names(&self) -> Result<Vec<SchedulerName>> {
        let endpoint = Endpoint::SchedNames;
        decode(endpoint, self.get(endpoint, None).await?)
    }

    async fn list_jobs(&self, sched: Option<&SchedulerName>) -> Result<Vec<JobRow>> {
        let endpoint = Endpoint::ListJobs;
        decode(endpoint, self.get(endpoint, sched).await?)
    }

    async fn trigger_job(&self, key: &JobKey) -> Result<()> {
        let endpoint = Endpoint::TriggerJob;
        confirmed(endpoint, self.send_json(endpoint, key).await?)
    }

    async fn refresh_trigger(&self, key: &TriggerKey) -> Result<JobRow> {
        let endpoint = Endpoint::RefreshTrigger;
        decode(endpoint, self.send_json(endpoint, key).await?)
    }

    async fn pause_job(&self, key: &JobKey) -> Result<()> {
        let endpoint = Endpoint::PauseJob;
        status_only(endpoint, self.send_json(endpoint, key).await?)
    }

    async fn resume_job(&self, key: &JobKey) -> Result<()> {
        let endpoint = Endpoint::ResumeJob;
        status_only(endpoint, self.send_json(endpoint, key).await?)
    }

    async fn remove_local(&self, key: &TriggerKey) -> Result<()> {
        let endpoint = Endpoint::RemoveLocal;
        confirmed(endpoint, self.send_json(endpoint, key).await?)
    }

    async fn delete_job(&self, key: &JobKey) -> Result<()> {
        let endpoint = Endpoint::DeleteJob;
        status_only(endpoint, self.send_json(endpoint, key).await?)
    }

    async fn login(&self, credentials: &LoginRequest) -> Result<()> {
        let endpoint = Endpoint::Login;
        status_only(endpoint, self.send_json(endpoint, credentials).await?)
    }

    async fn list_instances(&self, sched: Option<&SchedulerName>) -> Result<Vec<InstanceInfo>> {
        let endpoint = Endpoint::ListInstances;
        decode(endpoint, self.get(endpoint, sched).await?)
    }

    async fn delete_instance(&self, instance: &InstanceInfo) -> Result<()> {
        let endpoint = Endpoint::DeleteInstance;
        confirmed(endpoint, self.send_json(endpoint, instance).await?)
    }
}
