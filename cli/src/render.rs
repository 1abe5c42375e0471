use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use common::InstanceInfo;

use crate::selector::SchedulerSelector;
use crate::table::{JobTable, Row, TableVariant};

fn headers(variant: TableVariant) -> Vec<&'static str> {
    let mut headers = vec!["No", "Scheduler", "Job", "Description", "Prev Fire", "Next Fire", "State"];
    match variant {
        TableVariant::List => headers.push("Updated"),
        TableVariant::Manage => headers.push("Toggle"),
    }
    headers
}

fn fields(position: usize, row: &Row) -> Vec<String> {
    let c = row.cells();
    let mut fields = vec![
        position.to_string(),
        c.sched_name.clone(),
        c.job_name.clone(),
        c.job_desc.clone(),
        c.prev_fire_time.clone(),
        c.next_fire_time.clone(),
        c.trigger_state.clone(),
    ];
    match (&c.update_time, row.toggle()) {
        (_, Some(label)) => fields.push(label.to_string()),
        (Some(updated), None) => fields.push(updated.clone()),
        (None, None) => fields.push(String::new()),
    }
    fields
}

pub fn job_table(table: &JobTable) -> Table {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers(table.variant()));

    for (i, row) in table.rows().enumerate() {
        out.add_row(fields(i + 1, row));
    }
    out
}

/// Writes the table as CSV with the same columns as `job_table`.
pub fn job_csv<W: std::io::Write>(table: &JobTable, writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(headers(table.variant()))?;
    for (i, row) in table.rows().enumerate() {
        wtr.write_record(fields(i + 1, row))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn selector(selector: &SchedulerSelector) -> String {
    let mut out = String::new();
    for index in 0..selector.entry_count() {
        let marker = if index == selector.selected_index() { "*" } else { " " };
        let label = match index {
            0 => "(all)".to_string(),
            i => selector.names()[i - 1].to_string(),
        };
        out.push_str(&format!("{} {:>2}  {}\n", marker, index, label));
    }
    out
}

pub fn instances(instances: &[InstanceInfo]) -> Table {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Scheduler", "Instance", "Host", "Port"]);
    for inst in instances {
        out.add_row(vec![
            inst.sched_name.to_string(),
            inst.instance_name.clone().unwrap_or_default(),
            inst.instance_host.clone().unwrap_or_default(),
            inst.instance_port.map(|p| p.to_string()).unwrap_or_default(),
        ]);
    }
    out
}
