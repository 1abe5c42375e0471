pub mod api;
pub mod job;
pub mod time;

pub use api::{Endpoint, Envelope, EnvelopeError, HttpMethod, LoginRequest, STATUS_OK};
pub use job::{InstanceInfo, JobKey, JobRow, SchedulerName, TriggerKey, TriggerState};
pub use time::FireTime;

// Production paths (follow FHS - Filesystem Hierarchy Standard)
pub const DEFAULT_CONFIG_PATH: &str = "/etc/schedcenter/config.yaml";

// Fallback paths for non-root users
pub const USER_CONFIG_PATH: &str = "~/.config/schedcenter/config.yaml";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
