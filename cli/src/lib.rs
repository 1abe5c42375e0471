pub mod client;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod notifier;
pub mod render;
pub mod selector;
pub mod table;

#[cfg(test)]
mod testing;

pub use client::{HttpApi, SchedulerApi};
pub use console::Console;
pub use dispatcher::{ActionOutcome, Dispatcher, RowAction};
pub use error::ConsoleError;
pub use selector::{SchedulerSelector, Selection};
pub use table::{JobTable, LoadOutcome, TableController, TableVariant, ToggleLabel};
