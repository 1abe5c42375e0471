//! Interactive console: a scheduler selector above one job table, driven by
//! line commands.

use std::io::Write;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::client::SchedulerApi;
use crate::dispatcher::{ActionOutcome, Dispatcher, RowAction};
use crate::error::ConsoleError;
use crate::notifier::Notifier;
use crate::render;
use crate::selector::SchedulerSelector;
use crate::table::{LoadOutcome, TableController, TableVariant};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ReplLine {
    #[command(subcommand)]
    command: ReplCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
enum ReplCommand {
    /// Show the scheduler entries
    #[command(alias = "ls")]
    Schedulers,
    /// Select a scheduler entry (0 = all) and reload the table
    Select { index: usize },
    /// Reload the table for the current selection
    Reload,
    /// Print the table
    Show,
    /// Fire a row's job now
    Trigger { row: usize },
    /// Re-read a row from the scheduler
    Refresh { row: usize },
    /// Pause or resume a row's job, as its toggle shows
    Toggle { row: usize },
    /// Remove a row's trigger from the scheduler center
    Remove { row: usize },
    /// Delete a row's job
    Delete { row: usize },
    /// Leave the console
    #[command(alias = "exit")]
    Quit,
}

pub struct Console {
    api: Arc<dyn SchedulerApi>,
    notifier: Arc<dyn Notifier>,
    selector: SchedulerSelector,
    table: TableController,
}

impl Console {
    pub fn new(api: Arc<dyn SchedulerApi>, notifier: Arc<dyn Notifier>, variant: TableVariant) -> Self {
        Self {
            api,
            notifier,
            selector: SchedulerSelector::new(),
            table: TableController::new(variant),
        }
    }

    pub fn selector(&self) -> &SchedulerSelector {
        &self.selector
    }

    pub fn table(&self) -> &TableController {
        &self.table
    }

    /// Loads the scheduler names, applies `preselect` if it names one, and
    /// loads the first table. The management view waits for an explicit
    /// selection.
    pub async fn start(&mut self, preselect: Option<&str>) {
        // A failed name load is already surfaced; the selector stays usable.
        let _ = self.selector.load(self.api.as_ref(), self.notifier.as_ref()).await;

        if let Some(name) = preselect {
            if self.selector.select_name(name).is_some() {
                self.reload().await;
                return;
            }
            log::warn!("scheduler {} is not known to the backend", name);
        }
        if self.table.variant() == TableVariant::List {
            self.reload().await;
        }
    }

    /// Selects an entry and reloads. Returns false if the index is out of range.
    pub async fn select(&mut self, index: usize) -> bool {
        if self.selector.select(index).is_none() {
            return false;
        }
        self.reload().await;
        true
    }

    pub async fn reload(&self) {
        let selection = self.selector.current();
        match self.table.load(self.api.as_ref(), &selection).await {
            Ok(LoadOutcome::Applied { .. }) | Ok(LoadOutcome::Discarded) => {}
            Err(e) => self.notifier.error(&e),
        }
    }

    /// Runs `action` on the row at 1-based `position`, surfacing the result.
    pub async fn act(&self, position: usize, action: RowAction) -> Option<ActionOutcome> {
        let Some(row) = self.table.row_id_at(position) else {
            self.notifier.error(&ConsoleError::RowNotFound(position.to_string()));
            return None;
        };

        match Dispatcher::new(self.api.as_ref(), &self.table).dispatch(row, action).await {
            Ok(outcome) => {
                match &outcome {
                    ActionOutcome::Triggered => self.notifier.notice("Job triggered."),
                    ActionOutcome::RowGone => {
                        log::debug!("{} finished after row {} left the table", action, position)
                    }
                    _ => {}
                }
                Some(outcome)
            }
            Err(e) => {
                self.notifier.error(&e);
                None
            }
        }
    }

    fn show<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(
            out,
            "{} ({} view)",
            self.selector.current(),
            self.table.variant()
        )?;
        let rendered = self.table.with_table(render::job_table);
        writeln!(out, "{}", rendered)
    }

    /// Executes one command. Returns false when the console should exit.
    async fn execute<W: Write>(&mut self, command: ReplCommand, out: &mut W) -> std::io::Result<bool> {
        match command {
            ReplCommand::Schedulers => write!(out, "{}", render::selector(&self.selector))?,
            ReplCommand::Select { index } => {
                if self.select(index).await {
                    self.show(out)?;
                } else {
                    writeln!(out, "No scheduler entry {}.", index)?;
                }
            }
            ReplCommand::Reload => {
                self.reload().await;
                self.show(out)?;
            }
            ReplCommand::Show => self.show(out)?,
            ReplCommand::Trigger { row } => {
                self.act(row, RowAction::TriggerNow).await;
            }
            ReplCommand::Refresh { row } => self.act_and_show(row, RowAction::Refresh, out).await?,
            ReplCommand::Toggle { row } => self.act_and_show(row, RowAction::Toggle, out).await?,
            ReplCommand::Remove { row } => self.act_and_show(row, RowAction::RemoveLocal, out).await?,
            ReplCommand::Delete { row } => self.act_and_show(row, RowAction::Delete, out).await?,
            ReplCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    async fn act_and_show<W: Write>(&self, row: usize, action: RowAction, out: &mut W) -> std::io::Result<()> {
        if self.act(row, action).await.is_some() {
            self.show(out)?;
        }
        Ok(())
    }

    /// Reads commands from `input` until it ends or `quit` is entered.
    pub async fn run<R, W>(&mut self, input: R, mut out: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        write!(out, "{}", render::selector(&self.selector))?;
        self.show(&mut out)?;

        let mut lines = input.lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match ReplLine::try_parse_from(line.split_whitespace()) {
                Ok(parsed) => {
                    if !self.execute(parsed.command, &mut out).await? {
                        break;
                    }
                }
                Err(e) => writeln!(out, "{}", e)?,
            }
        }
        Ok(())
    }
}
