//! Report command implementation.
//!
//! Prints the KPI report: totals, recent volume, average resolution time,
//! and breakdowns by priority, category and assignee.

use crate::config;
use crate::error::Result;
use crate::format::{OutputContext, OutputMode, rich};
use crate::model::{Priority, Status};
use crate::report::KpiReport;
use tracing::info;

/// Execute the report command.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or queried.
pub fn execute(cli: &config::CliOverrides, ctx: &OutputContext) -> Result<()> {
    let workspace = config::open_storage_with_cli(cli)?;
    info!("Computing KPI report");
    let report = workspace.storage.kpi_report()?;

    match ctx.mode() {
        OutputMode::Json => ctx.json_pretty(&report)?,
        OutputMode::Rich => rich::render_kpi_panel(&report, ctx),
        OutputMode::Plain => print!("{}", format_report_plain(&report)),
        OutputMode::Quiet => {}
    }

    Ok(())
}

fn format_report_plain(report: &KpiReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total tickets: {}\n", report.total_tickets));
    out.push_str(&format!("Created in last 30 days: {}\n", report.recent_30d));
    out.push_str(&format!(
        "Average resolution: {} days\n",
        report.avg_resolution_days
    ));

    out.push_str("\nBy priority:\n");
    for priority in Priority::ALL {
        out.push_str(&format!(
            "  {:<10} {}\n",
            priority.as_str(),
            report.priority_counts.get(priority)
        ));
    }

    if !report.category_counts.is_empty() {
        out.push_str("\nBy category:\n");
        for (category, count) in &report.category_counts {
            out.push_str(&format!("  {category:<10} {count}\n"));
        }
    }

    if !report.assignee_workload.is_empty() {
        out.push_str("\nWorkload:\n");
        for (assignee, workload) in &report.assignee_workload {
            let breakdown: Vec<String> = Status::ALL
                .iter()
                .map(|s| format!("{} {}", workload.get(*s), s.as_str()))
                .collect();
            out.push_str(&format!(
                "  {assignee:<10} {} total ({})\n",
                workload.total,
                breakdown.join(", ")
            ));
        }
    }

    out
}
