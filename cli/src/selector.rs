use common::SchedulerName;

use crate::client::SchedulerApi;
use crate::error::Result;
use crate::notifier::Notifier;

/// Which jobs the table shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Scheduler(SchedulerName),
}

impl Selection {
    /// The list filter, if any.
    pub fn scheduler(&self) -> Option<&SchedulerName> {
        match self {
            Selection::All => None,
            Selection::Scheduler(name) => Some(name),
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::All => f.write_str("all schedulers"),
            Selection::Scheduler(name) => write!(f, "scheduler {}", name),
        }
    }
}

/// Scheduler names known to the backend, with an implicit "all" entry at
/// index 0.
#[derive(Debug, Default)]
pub struct SchedulerSelector {
    names: Vec<SchedulerName>,
    selected: usize,
}

impl SchedulerSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the scheduler names once. On failure the error is surfaced and
    /// the selector keeps only the "all" entry.
    pub async fn load(&mut self, api: &dyn SchedulerApi, notifier: &dyn Notifier) -> Result<()> {
        match api.sched_names().await {
            Ok(names) => {
                log::info!("loaded {} scheduler names", names.len());
                self.populate(names);
                Ok(())
            }
            Err(e) => {
                notifier.error(&e);
                Err(e)
            }
        }
    }

    pub fn populate(&mut self, names: Vec<SchedulerName>) {
        self.names = names;
        self.selected = 0;
    }

    /// Number of entries including "all". Never zero.
    pub fn entry_count(&self) -> usize {
        self.names.len() + 1
    }

    /// True when only the "all" entry is offered.
    pub fn has_no_schedulers(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[SchedulerName] {
        &self.names
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn entry(&self, index: usize) -> Option<Selection> {
        match index {
            0 => Some(Selection::All),
            i => self.names.get(i - 1).cloned().map(Selection::Scheduler),
        }
    }

    /// Selects an entry. Out-of-range indexes change nothing.
    pub fn select(&mut self, index: usize) -> Option<Selection> {
        let selection = self.entry(index)?;
        self.selected = index;
        Some(selection)
    }

    /// Selects a scheduler by name.
    pub fn select_name(&mut self, name: &str) -> Option<Selection> {
        let index = self.names.iter().position(|n| n.as_str() == name)?;
        self.select(index + 1)
    }

    pub fn current(&self) -> Selection {
        self.entry(self.selected).unwrap_or(Selection::All)
    }
}
