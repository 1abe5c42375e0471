//! Job Table Controller.
//!
//! A `JobTable` is an arena of displayed rows. Each row keeps the `JobRow`
//! snapshot captured when the table was loaded (commands always target that
//! snapshot) next to the cells currently shown, which refreshes overwrite.
//!
//! Overlapping loads are sequenced by a generation counter: every load clears
//! the table and takes a new generation, and a response is only applied if its
//! generation is still current. A slow, older response is discarded instead
//! of overwriting newer rows.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use common::time::display_opt;
use common::{JobRow, TriggerState};
use serde::{Deserialize, Serialize};

use crate::client::SchedulerApi;
use crate::dispatcher::RowAction;
use crate::error::Result;
use crate::selector::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TableVariant {
    /// Read-only listing with trigger-now and refresh.
    List,
    /// Management view with remove, pause/resume and delete.
    Manage,
}

impl TableVariant {
    pub fn actions(self) -> &'static [RowAction] {
        match self {
            TableVariant::List => &[RowAction::TriggerNow, RowAction::Refresh],
            TableVariant::Manage => &[RowAction::RemoveLocal, RowAction::Toggle, RowAction::Delete],
        }
    }

    pub fn allows(self, action: RowAction) -> bool {
        self.actions().contains(&action)
    }
}

impl std::fmt::Display for TableVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableVariant::List => f.write_str("list"),
            TableVariant::Manage => f.write_str("manage"),
        }
    }
}

/// Label of the pause/resume control. The label names the command a click
/// issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleLabel {
    Pause,
    Resume,
}

impl ToggleLabel {
    pub fn for_state(state: &TriggerState) -> Self {
        if state.is_paused() {
            ToggleLabel::Resume
        } else {
            ToggleLabel::Pause
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            ToggleLabel::Pause => ToggleLabel::Resume,
            ToggleLabel::Resume => ToggleLabel::Pause,
        }
    }
}

impl std::fmt::Display for ToggleLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToggleLabel::Pause => f.write_str("Pause"),
            ToggleLabel::Resume => f.write_str("Resume"),
        }
    }
}

/// Text currently displayed for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCells {
    pub sched_name: String,
    pub job_name: String,
    pub job_desc: String,
    pub prev_fire_time: String,
    pub next_fire_time: String,
    pub trigger_state: String,
    /// Only shown by the list view.
    pub update_time: Option<String>,
}

impl RowCells {
    fn render(row: &JobRow, variant: TableVariant) -> Self {
        Self {
            sched_name: row.sched_name.to_string(),
            job_name: row.job_name.clone(),
            job_desc: row.job_desc.clone().unwrap_or_default(),
            prev_fire_time: display_opt(row.prev_fire_time.as_ref()),
            next_fire_time: display_opt(row.next_fire_time.as_ref()),
            trigger_state: row.trigger_state.to_string(),
            update_time: match variant {
                TableVariant::List => Some(display_opt(row.update_time.as_ref())),
                TableVariant::Manage => None,
            },
        }
    }

    /// Overwrites the five refreshable cells. Scheduler and update time stay.
    fn overwrite(&mut self, fresh: &JobRow) {
        self.job_name = fresh.job_name.clone();
        self.job_desc = fresh.job_desc.clone().unwrap_or_default();
        self.prev_fire_time = display_opt(fresh.prev_fire_time.as_ref());
        self.next_fire_time = display_opt(fresh.next_fire_time.as_ref());
        self.trigger_state = fresh.trigger_state.to_string();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId {
    generation: u64,
    slot: usize,
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.generation, self.slot)
    }
}

#[derive(Debug, Clone)]
pub struct Row {
    id: RowId,
    snapshot: JobRow,
    cells: RowCells,
    toggle: Option<ToggleLabel>,
}

impl Row {
    pub fn id(&self) -> RowId {
        self.id
    }

    /// The row as loaded. Never changes for the lifetime of the row.
    pub fn snapshot(&self) -> &JobRow {
        &self.snapshot
    }

    pub fn cells(&self) -> &RowCells {
        &self.cells
    }

    pub fn toggle(&self) -> Option<ToggleLabel> {
        self.toggle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

#[derive(Debug)]
pub struct JobTable {
    variant: TableVariant,
    generation: u64,
    order: Vec<RowId>,
    rows: HashMap<RowId, Row>,
}

impl JobTable {
    pub fn new(variant: TableVariant) -> Self {
        Self {
            variant,
            generation: 0,
            order: Vec::new(),
            rows: HashMap::new(),
        }
    }

    pub fn variant(&self) -> TableVariant {
        self.variant
    }

    /// Clears every row and opens a new generation.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.order.clear();
        self.rows.clear();
        LoadTicket {
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Renders `rows` in order if `ticket` is still current. Returns whether
    /// the rows were applied.
    pub fn complete_load(&mut self, ticket: LoadTicket, rows: Vec<JobRow>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        for (slot, snapshot) in rows.into_iter().enumerate() {
            let id = RowId {
                generation: ticket.generation,
                slot,
            };
            let cells = RowCells::render(&snapshot, self.variant);
            let toggle = match self.variant {
                TableVariant::Manage => Some(ToggleLabel::for_state(&snapshot.trigger_state)),
                TableVariant::List => None,
            };
            self.order.push(id);
            self.rows.insert(
                id,
                Row {
                    id,
                    snapshot,
                    cells,
                    toggle,
                },
            );
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.order.iter().filter_map(|id| self.rows.get(id))
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.get(&id)
    }

    /// Looks a row up by its 1-based display position.
    pub fn row_at(&self, position: usize) -> Option<&Row> {
        let index = position.checked_sub(1)?;
        self.order.get(index).and_then(|id| self.rows.get(id))
    }

    pub fn apply_refresh(&mut self, id: RowId, fresh: &JobRow) -> bool {
        match self.rows.get_mut(&id) {
            Some(row) => {
                row.cells.overwrite(fresh);
                true
            }
            None => false,
        }
    }

    /// Flips the toggle label and returns the new one.
    pub fn flip_toggle(&mut self, id: RowId) -> Option<ToggleLabel> {
        let row = self.rows.get_mut(&id)?;
        let label = row.toggle?.flipped();
        row.toggle = Some(label);
        Some(label)
    }

    pub fn remove(&mut self, id: RowId) -> bool {
        if self.rows.remove(&id).is_none() {
            return false;
        }
        self.order.retain(|other| *other != id);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { rows: usize },
    /// A newer load started before this one finished.
    Discarded,
}

/// Owns one `JobTable` and loads it from the backend. Loads may overlap; the
/// table lock is never held across a request.
pub struct TableController {
    table: Mutex<JobTable>,
}

impl TableController {
    pub fn new(variant: TableVariant) -> Self {
        Self {
            table: Mutex::new(JobTable::new(variant)),
        }
    }

    pub(crate) fn table(&self) -> MutexGuard<'_, JobTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn variant(&self) -> TableVariant {
        self.table().variant()
    }

    pub fn with_table<R>(&self, f: impl FnOnce(&JobTable) -> R) -> R {
        f(&self.table())
    }

    /// Resolves a 1-based display position to the row currently shown there.
    pub fn row_id_at(&self, position: usize) -> Option<RowId> {
        self.table().row_at(position).map(Row::id)
    }

    pub async fn load(&self, api: &dyn SchedulerApi, selection: &Selection) -> Result<LoadOutcome> {
        let ticket = self.table().begin_load();
        log::debug!("loading table for {} (generation {})", selection, ticket.generation);

        let result = api.list_jobs(selection.scheduler()).await;

        let mut table = self.table();
        if !table.is_current(ticket) {
            log::debug!("discarding stale list response for {} (generation {})", selection, ticket.generation);
            return Ok(LoadOutcome::Discarded);
        }
        let rows = result?;
        let count = rows.len();
        table.complete_load(ticket, rows);
        log::info!("loaded {} rows for {}", count, selection);
        Ok(LoadOutcome::Applied { rows: count })
    }
}
