//! KPI report: aggregate statistics over the whole ticket set.
//!
//! The report is computed on demand and never persisted. Averages use
//! whole-day differences and integer division, so two tickets resolved in
//! 3 and 4 days average to 3.

use crate::model::{Priority, Status, Ticket};
use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Window for `recent_30d`.
pub const RECENT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct KpiReport {
    pub total_tickets: usize,
    pub recent_30d: usize,
    pub avg_resolution_days: i64,
    pub priority_counts: PriorityCounts,
    pub category_counts: BTreeMap<String, usize>,
    pub assignee_workload: BTreeMap<String, Workload>,
}

/// Ticket count per priority. All three keys are always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct PriorityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl PriorityCounts {
    #[must_use]
    pub const fn get(&self, priority: Priority) -> usize {
        match priority {
            Priority::Low => self.low,
            Priority::Medium => self.medium,
            Priority::High => self.high,
        }
    }

    fn bump(&mut self, priority: Priority) {
        match priority {
            Priority::Low => self.low += 1,
            Priority::Medium => self.medium += 1,
            Priority::High => self.high += 1,
        }
    }
}

/// Per-assignee status breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Workload {
    pub total: usize,
    pub open: usize,
    #[serde(rename = "in-progress")]
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
}

impl Workload {
    #[must_use]
    pub const fn get(&self, status: Status) -> usize {
        match status {
            Status::Open => self.open,
            Status::InProgress => self.in_progress,
            Status::Resolved => self.resolved,
            Status::Closed => self.closed,
        }
    }

    fn record(&mut self, status: Status) {
        self.total += 1;
        match status {
            Status::Open => self.open += 1,
            Status::InProgress => self.in_progress += 1,
            Status::Resolved => self.resolved += 1,
            Status::Closed => self.closed += 1,
        }
    }
}

impl KpiReport {
    /// Compute the report over `tickets` as of `now`.
    #[must_use]
    pub fn compute(tickets: &[Ticket], now: DateTime<Utc>) -> Self {
        let recent_cutoff = now - Duration::days(RECENT_WINDOW_DAYS);

        let mut report = Self {
            total_tickets: tickets.len(),
            ..Self::default()
        };
        let mut resolution_days_sum: i64 = 0;
        let mut resolved_count: i64 = 0;

        for ticket in tickets {
            if ticket.created_at >= recent_cutoff {
                report.recent_30d += 1;
            }

            if let Some(resolved_at) = ticket.resolved_at {
                resolution_days_sum += resolved_at.signed_duration_since(ticket.created_at).num_days();
                resolved_count += 1;
            }

            report.priority_counts.bump(ticket.priority);

            *report
                .category_counts
                .entry(ticket.category_or_default().to_string())
                .or_insert(0) += 1;

            report
                .assignee_workload
                .entry(ticket.assignee.clone())
                .or_default()
                .record(ticket.status);
        }

        report.avg_resolution_days = if resolved_count == 0 {
            0
        } else {
            resolution_days_sum / resolved_count
        };

        report
    }
}
