//! Row Action Dispatcher.
//!
//! Every action reads the target row's snapshot, awaits the backend and only
//! then touches the row. A row that left the table while its request was in
//! flight is never resurrected or modified.

use common::JobRow;

use crate::client::SchedulerApi;
use crate::error::{ConsoleError, Result};
use crate::table::{RowId, TableController, ToggleLabel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    TriggerNow,
    Refresh,
    /// Pause or resume, whichever the row's toggle label names.
    Toggle,
    RemoveLocal,
    Delete,
}

impl std::fmt::Display for RowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RowAction::TriggerNow => "trigger",
            RowAction::Refresh => "refresh",
            RowAction::Toggle => "pause/resume",
            RowAction::RemoveLocal => "remove",
            RowAction::Delete => "delete",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Triggered,
    Refreshed,
    /// The command went through and the row was re-read. Carries the new label.
    Toggled { label: ToggleLabel },
    Removed,
    /// The backend accepted the command but the row was no longer displayed.
    RowGone,
}

pub struct Dispatcher<'a> {
    api: &'a dyn SchedulerApi,
    table: &'a TableController,
}

impl<'a> Dispatcher<'a> {
    pub fn new(api: &'a dyn SchedulerApi, table: &'a TableController) -> Self {
        Self { api, table }
    }

    pub async fn dispatch(&self, row: RowId, action: RowAction) -> Result<ActionOutcome> {
        let variant = self.table.variant();
        if !variant.allows(action) {
            return Err(ConsoleError::ActionUnavailable { action, variant });
        }
        log::debug!("dispatching {} on row {}", action, row);

        match action {
            RowAction::TriggerNow => self.trigger_now(row).await,
            RowAction::Refresh => self.refresh(row).await,
            RowAction::Toggle => self.toggle(row).await,
            RowAction::RemoveLocal => self.remove_local(row).await,
            RowAction::Delete => self.delete(row).await,
        }
    }

    fn snapshot(&self, row: RowId) -> Result<JobRow> {
        self.table
            .table()
            .row(row)
            .map(|r| r.snapshot().clone())
            .ok_or_else(|| ConsoleError::RowNotFound(row.to_string()))
    }

    async fn trigger_now(&self, row: RowId) -> Result<ActionOutcome> {
        let key = self.snapshot(row)?.job_key();
        self.api.trigger_job(&key).await?;
        log::info!("triggered job {}", key);
        Ok(ActionOutcome::Triggered)
    }

    async fn refresh(&self, row: RowId) -> Result<ActionOutcome> {
        let key = self.snapshot(row)?.trigger_key();
        let fresh = self.api.refresh_trigger(&key).await?;
        if self.table.table().apply_refresh(row, &fresh) {
            log::debug!("refreshed trigger {}", key);
            Ok(ActionOutcome::Refreshed)
        } else {
            Ok(ActionOutcome::RowGone)
        }
    }

    async fn toggle(&self, row: RowId) -> Result<ActionOutcome> {
        let (key, label) = {
            let table = self.table.table();
            let r = table
                .row(row)
                .ok_or_else(|| ConsoleError::RowNotFound(row.to_string()))?;
            let label = r.toggle().ok_or(ConsoleError::ActionUnavailable {
                action: RowAction::Toggle,
                variant: table.variant(),
            })?;
            (r.snapshot().job_key(), label)
        };

        match label {
            ToggleLabel::Pause => self.api.pause_job(&key).await?,
            ToggleLabel::Resume => self.api.resume_job(&key).await?,
        }
        log::info!("{} job {}", if label == ToggleLabel::Pause { "paused" } else { "resumed" }, key);

        let Some(flipped) = self.table.table().flip_toggle(row) else {
            return Ok(ActionOutcome::RowGone);
        };
        // The command does not report fire times; re-read the row.
        match self.refresh(row).await? {
            ActionOutcome::RowGone => Ok(ActionOutcome::RowGone),
            _ => Ok(ActionOutcome::Toggled { label: flipped }),
        }
    }

    async fn remove_local(&self, row: RowId) -> Result<ActionOutcome> {
        let key = self.snapshot(row)?.trigger_key();
        self.api.remove_local(&key).await?;
        log::info!("removed trigger {}", key);
        Ok(self.drop_row(row))
    }

    async fn delete(&self, row: RowId) -> Result<ActionOutcome> {
        let key = self.snapshot(row)?.job_key();
        self.api.delete_job(&key).await?;
        log::info!("deleted job {}", key);
        Ok(self.drop_row(row))
    }

    fn drop_row(&self, row: RowId) -> ActionOutcome {
        if self.table.table().remove(row) {
            ActionOutcome::Removed
        } else {
            ActionOutcome::RowGone
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selection;
    use crate::table::tests::job_row;
    use crate::table::TableVariant;
    use crate::testing::{Call, FakeApi};
    use common::{Endpoint, FireTime, SchedulerName, TriggerState};

    async fn loaded(api: &FakeApi, variant: TableVariant) -> TableController {
        let table = TableController::new(variant);
        table.load(api, &Selection::All).await.unwrap();
        table
    }

    fn cells(table: &TableController) -> Vec<(String, String, String)> {
        table.with_table(|t| {
            t.rows()
                .map(|r| {
                    let c = r.cells();
                    (c.job_name.clone(), c.trigger_state.clone(), c.next_fire_time.clone())
                })
                .collect()
        })
    }

    #[tokio::test]
    async fn test_resume_flips_label_then_refreshes() {
        let mut paused = job_row("s1", "j1", TriggerState::Paused);
        paused.trigger_name = "t1".to_string();
        let mut resumed = paused.clone();
        resumed.trigger_state = TriggerState::Normal;
        resumed.next_fire_time = Some(FireTime::Text("2030-01-01 00:00:00".to_string()));

        let api = FakeApi::new().with_list(None, vec![paused.clone()]).with_refresh(resumed);
        let table = loaded(&api, TableVariant::Manage).await;
        let row = table.row_id_at(1).unwrap();
        assert_eq!(table.with_table(|t| t.row(row).unwrap().toggle()), Some(ToggleLabel::Resume));

        let outcome = Dispatcher::new(&api, &table).dispatch(row, RowAction::Toggle).await.unwrap();

        assert_eq!(outcome, ActionOutcome::Toggled { label: ToggleLabel::Pause });
        assert_eq!(
            api.calls()[1..],
            [Call::Resume(paused.job_key()), Call::Refresh(paused.trigger_key())]
        );
        assert_eq!(
            cells(&table),
            vec![("j1".to_string(), "NORMAL".to_string(), "2030-01-01 00:00:00".to_string())]
        );
    }

    #[tokio::test]
    async fn test_pause_label_calls_pause() {
        let row_data = job_row("s1", "j1", TriggerState::Normal);
        let mut paused = row_data.clone();
        paused.trigger_state = TriggerState::Paused;
        let api = FakeApi::new().with_list(None, vec![row_data.clone()]).with_refresh(paused);
        let table = loaded(&api, TableVariant::Manage).await;
        let row = table.row_id_at(1).unwrap();

        let outcome = Dispatcher::new(&api, &table).dispatch(row, RowAction::Toggle).await.unwrap();

        assert_eq!(outcome, ActionOutcome::Toggled { label: ToggleLabel::Resume });
        assert_eq!(api.calls()[1], Call::Pause(row_data.job_key()));
    }

    #[tokio::test]
    async fn test_failed_toggle_changes_nothing() {
        let row_data = job_row("s1", "j1", TriggerState::Normal);
        let api = FakeApi::new()
            .with_list(None, vec![row_data])
            .failing(Endpoint::PauseJob, 1, "scheduler offline");
        let table = loaded(&api, TableVariant::Manage).await;
        let row = table.row_id_at(1).unwrap();
        let before = cells(&table);

        let err = Dispatcher::new(&api, &table).dispatch(row, RowAction::Toggle).await.unwrap_err();

        assert!(matches!(err, ConsoleError::Api { status: 1, .. }));
        assert_eq!(table.with_table(|t| t.row(row).unwrap().toggle()), Some(ToggleLabel::Pause));
        assert_eq!(cells(&table), before);
        assert_eq!(api.calls().len(), 2, "no refresh after a failed pause");
    }

    #[tokio::test]
    async fn test_failed_refresh_after_pause_keeps_cells() {
        let row_data = job_row("s1", "j1", TriggerState::Normal);
        let api = FakeApi::new()
            .with_list(None, vec![row_data.clone()])
            .failing(Endpoint::RefreshTrigger, 1, "trigger not found");
        let table = loaded(&api, TableVariant::Manage).await;
        let row = table.row_id_at(1).unwrap();
        let before = table.with_table(|t| t.row(row).unwrap().cells().clone());

        let err = Dispatcher::new(&api, &table).dispatch(row, RowAction::Toggle).await.unwrap_err();

        assert!(matches!(
            err,
            ConsoleError::Api { endpoint: Endpoint::RefreshTrigger, status: 1, .. }
        ));
        // The pause went through, so the label follows it.
        assert_eq!(table.with_table(|t| t.row(row).unwrap().toggle()), Some(ToggleLabel::Resume));
        assert_eq!(table.with_table(|t| t.row(row).unwrap().cells().clone()), before);
        assert_eq!(
            api.calls()[1..],
            [Call::Pause(row_data.job_key()), Call::Refresh(row_data.trigger_key())]
        );
    }

    #[tokio::test]
    async fn test_refresh_touches_only_its_row() {
        let a = job_row("s1", "a", TriggerState::Normal);
        let b = job_row("s1", "b", TriggerState::Normal);
        let mut fresh = a.clone();
        fresh.job_name = "a-renamed".to_string();
        fresh.trigger_state = TriggerState::Complete;
        let api = FakeApi::new().with_list(None, vec![a, b]).with_refresh(fresh);
        let table = loaded(&api, TableVariant::List).await;

        let row = table.row_id_at(1).unwrap();
        let outcome = Dispatcher::new(&api, &table).dispatch(row, RowAction::Refresh).await.unwrap();

        assert_eq!(outcome, ActionOutcome::Refreshed);
        assert_eq!(
            cells(&table),
            vec![
                ("a-renamed".to_string(), "COMPLETE".to_string(), String::new()),
                ("b".to_string(), "NORMAL".to_string(), String::new()),
            ]
        );
    }

    #[tokio::test]
    async fn test_refresh_keeps_targeting_the_snapshot() {
        let a = job_row("s1", "a", TriggerState::Normal);
        let mut fresh = a.clone();
        fresh.job_name = "renamed".to_string();
        let api = FakeApi::new().with_list(None, vec![a.clone()]).with_refresh(fresh);
        let table = loaded(&api, TableVariant::List).await;
        let row = table.row_id_at(1).unwrap();
        let dispatcher = Dispatcher::new(&api, &table);

        dispatcher.dispatch(row, RowAction::TriggerNow).await.unwrap();
        dispatcher.dispatch(row, RowAction::Refresh).await.unwrap();
        dispatcher.dispatch(row, RowAction::TriggerNow).await.unwrap();

        let calls = api.calls();
        assert_eq!(calls[1], Call::Trigger(a.job_key()));
        assert_eq!(calls[3], Call::Trigger(a.job_key()));
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let rows = vec![
            job_row("s1", "a", TriggerState::Normal),
            job_row("s1", "b", TriggerState::Normal),
            job_row("s1", "c", TriggerState::Normal),
        ];
        let api = FakeApi::new().with_list(None, rows.clone());
        let table = loaded(&api, TableVariant::Manage).await;
        let row = table.row_id_at(2).unwrap();

        let outcome = Dispatcher::new(&api, &table).dispatch(row, RowAction::Delete).await.unwrap();

        assert_eq!(outcome, ActionOutcome::Removed);
        assert_eq!(api.calls()[1], Call::Delete(rows[1].job_key()));
        let names: Vec<_> = cells(&table).into_iter().map(|c| c.0).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_row() {
        let api = FakeApi::new()
            .with_list(None, vec![job_row("s1", "a", TriggerState::Normal)])
            .failing(Endpoint::DeleteJob, 1, "not found");
        let table = loaded(&api, TableVariant::Manage).await;
        let row = table.row_id_at(1).unwrap();

        let err = Dispatcher::new(&api, &table).dispatch(row, RowAction::Delete).await.unwrap_err();

        assert_eq!(err.to_string(), "POST /api/job/delete: not found (status 1)");
        assert_eq!(table.with_table(|t| t.len()), 1);
    }

    #[tokio::test]
    async fn test_remove_local_uses_trigger_identity() {
        let a = job_row("s1", "a", TriggerState::Normal);
        let api = FakeApi::new().with_list(None, vec![a.clone()]);
        let table = loaded(&api, TableVariant::Manage).await;
        let row = table.row_id_at(1).unwrap();

        let outcome = Dispatcher::new(&api, &table).dispatch(row, RowAction::RemoveLocal).await.unwrap();

        assert_eq!(outcome, ActionOutcome::Removed);
        assert_eq!(api.calls()[1], Call::RemoveLocal(a.trigger_key()));
        assert!(table.with_table(|t| t.is_empty()));
    }

    #[tokio::test]
    async fn test_rejected_remove_keeps_row() {
        let api = FakeApi::new()
            .with_list(None, vec![job_row("s1", "a", TriggerState::Normal)])
            .rejecting(Endpoint::RemoveLocal);
        let table = loaded(&api, TableVariant::Manage).await;
        let row = table.row_id_at(1).unwrap();

        let err = Dispatcher::new(&api, &table).dispatch(row, RowAction::RemoveLocal).await.unwrap_err();

        assert!(matches!(err, ConsoleError::Rejected { .. }));
        assert_eq!(table.with_table(|t| t.len()), 1);
    }

    #[tokio::test]
    async fn test_rejected_trigger_is_an_error() {
        let api = FakeApi::new()
            .with_list(None, vec![job_row("s1", "a", TriggerState::Normal)])
            .rejecting(Endpoint::TriggerJob);
        let table = loaded(&api, TableVariant::List).await;
        let row = table.row_id_at(1).unwrap();

        let err = Dispatcher::new(&api, &table).dispatch(row, RowAction::TriggerNow).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Rejected { endpoint: Endpoint::TriggerJob }));
    }

    #[tokio::test]
    async fn test_action_outside_variant_sends_nothing() {
        let api = FakeApi::new().with_list(None, vec![job_row("s1", "a", TriggerState::Normal)]);
        let table = loaded(&api, TableVariant::List).await;
        let row = table.row_id_at(1).unwrap();

        let err = Dispatcher::new(&api, &table).dispatch(row, RowAction::Delete).await.unwrap_err();

        assert!(matches!(err, ConsoleError::ActionUnavailable { .. }));
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_row_from_previous_load_is_not_found() {
        let api = FakeApi::new()
            .with_list(None, vec![job_row("s1", "a", TriggerState::Normal)])
            .with_list(Some("s1"), vec![job_row("s1", "a", TriggerState::Normal)]);
        let table = loaded(&api, TableVariant::List).await;
        let old = table.row_id_at(1).unwrap();
        table
            .load(&api, &Selection::Scheduler(SchedulerName::new("s1")))
            .await
            .unwrap();

        let err = Dispatcher::new(&api, &table).dispatch(old, RowAction::Refresh).await.unwrap_err();
        assert!(matches!(err, ConsoleError::RowNotFound(_)));
    }

    #[tokio::test]
    async fn test_reload_during_refresh_reports_row_gone() {
        let a = job_row("s1", "a", TriggerState::Normal);
        let api = FakeApi::new()
            .with_list(None, vec![a.clone()])
            .with_refresh(a.clone());
        let table = loaded(&api, TableVariant::List).await;
        let row = table.row_id_at(1).unwrap();
        let gate = api.gate_refresh();

        let dispatcher = Dispatcher::new(&api, &table);
        let (outcome, _) = tokio::join!(dispatcher.dispatch(row, RowAction::Refresh), async {
            table.load(&api, &Selection::All).await.unwrap();
            gate.send(()).unwrap();
        });

        assert_eq!(outcome.unwrap(), ActionOutcome::RowGone);
        assert_eq!(table.with_table(|t| t.len()), 1);
    }
}
