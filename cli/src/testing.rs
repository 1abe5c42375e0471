//! In-memory `SchedulerApi` for controller tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use common::{Endpoint, InstanceInfo, JobKey, JobRow, LoginRequest, SchedulerName, TriggerKey};
use tokio::sync::oneshot;

use crate::client::SchedulerApi;
use crate::error::{ConsoleError, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    SchedNames,
    List(Option<String>),
    Trigger(JobKey),
    Refresh(TriggerKey),
    Pause(JobKey),
    Resume(JobKey),
    RemoveLocal(TriggerKey),
    Delete(JobKey),
    Login(String),
    Instances(Option<String>),
    DeleteInstance(InstanceInfo),
}

#[derive(Default)]
pub(crate) struct FakeApi {
    calls: Mutex<Vec<Call>>,
    names: Vec<SchedulerName>,
    lists: HashMap<Option<String>, Vec<JobRow>>,
    refreshed: HashMap<TriggerKey, JobRow>,
    failures: HashMap<Endpoint, (i64, String)>,
    rejected: HashSet<Endpoint>,
    list_gates: Mutex<HashMap<Option<String>, oneshot::Receiver<()>>>,
    refresh_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_names(mut self, names: &[&str]) -> Self {
        self.names = names.iter().map(|n| SchedulerName::new(*n)).collect();
        self
    }

    pub(crate) fn with_list(mut self, filter: Option<&str>, rows: Vec<JobRow>) -> Self {
        self.lists.insert(filter.map(str::to_string), rows);
        self
    }

    pub(crate) fn with_refresh(mut self, row: JobRow) -> Self {
        self.refreshed.insert(row.trigger_key(), row);
        self
    }

    /// Makes `endpoint` answer with a non-zero status.
    pub(crate) fn failing(mut self, endpoint: Endpoint, status: i64, message: &str) -> Self {
        self.failures.insert(endpoint, (status, message.to_string()));
        self
    }

    /// Makes `endpoint` answer `data: false`.
    pub(crate) fn rejecting(mut self, endpoint: Endpoint) -> Self {
        self.rejected.insert(endpoint);
        self
    }

    /// Holds the next list response for `filter` until the sender fires.
    pub(crate) fn gate_list(&self, filter: Option<&str>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.list_gates
            .lock()
            .unwrap()
            .insert(filter.map(str::to_string), rx);
        tx
    }

    /// Holds the next refresh response until the sender fires.
    pub(crate) fn gate_refresh(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.refresh_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn outcome(&self, endpoint: Endpoint) -> Result<()> {
        if let Some((status, message)) = self.failures.get(&endpoint) {
            return Err(ConsoleError::Api {
                endpoint,
                status: *status,
                message: message.clone(),
            });
        }
        if self.rejected.contains(&endpoint) {
            return Err(ConsoleError::Rejected { endpoint });
        }
        Ok(())
    }
}

#[async_trait]
impl SchedulerApi for FakeApi {
    async fn sched_names(&self) -> Result<Vec<SchedulerName>> {
        self.record(Call::SchedNames);
        self.outcome(Endpoint::SchedNames)?;
        Ok(self.names.clone())
    }

    async fn list_jobs(&self, sched: Option<&SchedulerName>) -> Result<Vec<JobRow>> {
        let filter = sched.map(|s| s.to_string());
        self.record(Call::List(filter.clone()));
        let gate = self.list_gates.lock().unwrap().remove(&filter);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.outcome(Endpoint::ListJobs)?;
        Ok(self.lists.get(&filter).cloned().unwrap_or_default())
    }

    async fn trigger_job(&self, key: &JobKey) -> Result<()> {
        self.record(Call::Trigger(key.clone()));
        self.outcome(Endpoint::TriggerJob)
    }

    async fn refresh_trigger(&self, key: &TriggerKey) -> Result<JobRow> {
        self.record(Call::Refresh(key.clone()));
        let gate = self.refresh_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.outcome(Endpoint::RefreshTrigger)?;
        self.refreshed.get(key).cloned().ok_or_else(|| ConsoleError::Api {
            endpoint: Endpoint::RefreshTrigger,
            status: 1,
            message: "trigger not found".to_string(),
        })
    }

    async fn pause_job(&self, key: &JobKey) -> Result<()> {
        self.record(Call::Pause(key.clone()));
        self.outcome(Endpoint::PauseJob)
    }

    async fn resume_job(&self, key: &JobKey) -> Result<()> {
        self.record(Call::Resume(key.clone()));
        self.outcome(Endpoint::ResumeJob)
    }

    async fn remove_local(&self, key: &TriggerKey) -> Result<()> {
        self.record(Call::RemoveLocal(key.clone()));
        self.outcome(Endpoint::RemoveLocal)
    }

    async fn delete_job(&self, key: &JobKey) -> Result<()> {
        self.record(Call::Delete(key.clone()));
        self.outcome(Endpoint::DeleteJob)
    }

    async fn login(&self, credentials: &LoginRequest) -> Result<()> {
        self.record(Call::Login(credentials.username.clone()));
        self.outcome(Endpoint::Login)
    }

    async fn list_instances(&self, sched: Option<&SchedulerName>) -> Result<Vec<InstanceInfo>> {
        self.record(Call::Instances(sched.map(|s| s.to_string())));
        self.outcome(Endpoint::ListInstances)?;
        Ok(Vec::new())
    }

    async fn delete_instance(&self, instance: &InstanceInfo) -> Result<()> {
        self.record(Call::DeleteInstance(instance.clone()));
        self.outcome(Endpoint::DeleteInstance)
    }
}
