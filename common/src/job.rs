use serde::{Deserialize, Serialize};

use crate::time::FireTime;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SchedulerName(pub String);

impl SchedulerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SchedulerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a job within one scheduler. Serializes as the body of every
/// job-targeted command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct JobKey {
    pub sched_name: SchedulerName,
    pub job_name: String,
    pub job_group: String,
}

impl std::fmt::Display for JobKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}.{}", self.sched_name, self.job_group, self.job_name)
    }
}

/// Identity of a trigger within one scheduler. Serializes as the body of every
/// trigger-targeted command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct TriggerKey {
    pub sched_name: SchedulerName,
    pub trigger_name: String,
    pub trigger_group: String,
}

impl std::fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}.{}", self.sched_name, self.trigger_group, self.trigger_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TriggerState {
    Normal,
    Paused,
    Complete,
    Error,
    Blocked,
    None,
    /// Any state string the backend reports that is not in the list above.
    Other(String),
}

impl TriggerState {
    pub fn is_paused(&self) -> bool {
        matches!(self, TriggerState::Paused)
    }

    pub fn as_str(&self) -> &str {
        match self {
            TriggerState::Normal => "NORMAL",
            TriggerState::Paused => "PAUSED",
            TriggerState::Complete => "COMPLETE",
            TriggerState::Error => "ERROR",
            TriggerState::Blocked => "BLOCKED",
            TriggerState::None => "NONE",
            TriggerState::Other(s) => s,
        }
    }
}

impl From<String> for TriggerState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "NORMAL" => TriggerState::Normal,
            "PAUSED" => TriggerState::Paused,
            "COMPLETE" => TriggerState::Complete,
            "ERROR" => TriggerState::Error,
            "BLOCKED" => TriggerState::Blocked,
            "NONE" => TriggerState::None,
            _ => TriggerState::Other(s),
        }
    }
}

impl From<TriggerState> for String {
    fn from(state: TriggerState) -> Self {
        state.as_str().to_string()
    }
}

impl std::fmt::Display for TriggerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One job/trigger pair as reported by the list and refresh endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRow {
    pub sched_name: SchedulerName,
    pub job_name: String,
    pub job_group: String,
    pub trigger_name: String,
    pub trigger_group: String,
    #[serde(default)]
    pub job_desc: Option<String>,
    #[serde(default)]
    pub prev_fire_time: Option<FireTime>,
    #[serde(default)]
    pub next_fire_time: Option<FireTime>,
    pub trigger_state: TriggerState,
    #[serde(default)]
    pub update_time: Option<FireTime>,
}

impl JobRow {
    pub fn job_key(&self) -> JobKey {
        JobKey {
            sched_name: self.sched_name.clone(),
            job_name: self.job_name.clone(),
            job_group: self.job_group.clone(),
        }
    }

    pub fn trigger_key(&self) -> TriggerKey {
        TriggerKey {
            sched_name: self.sched_name.clone(),
            trigger_name: self.trigger_name.clone(),
            trigger_group: self.trigger_group.clone(),
        }
    }
}

/// A scheduler instance registered with the backend. Also the request body
/// for deleting one; unset fields are left out of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceInfo {
    pub sched_name: SchedulerName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_port: Option<u16>,
}
