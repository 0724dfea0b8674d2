//! JSONL audit trail logging.
//!
//! Each planner run appends events to an audit.jsonl file, one JSON
//! object per line, so a plan can be reconstructed after the fact.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::plan::Plan;

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger.
pub struct AuditLog {
    writer: BufWriter<std::fs::File>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Convenience: log a plan run start.
pub fn log_plan_started(audit: &mut AuditLog, snapshot_file: &str) -> Result<()> {
    audit.log(
        "plan_started",
        serde_json::json!({ "snapshot_file": snapshot_file }),
    )
}

/// Convenience: log each planned trade.
pub fn log_trades(audit: &mut AuditLog, plan: &Plan) -> Result<()> {
    for t in &plan.trades {
        audit.log(
            "trade_planned",
            serde_json::json!({
                "sell": t.sell.as_str(),
                "buy": t.buy.as_str(),
                "value": t.value,
                "pair_price": t.pair_price,
            }),
        )?;
    }
    Ok(())
}

/// Convenience: log plan completion.
pub fn log_plan_completed(audit: &mut AuditLog, plan: &Plan) -> Result<()> {
    audit.log(
        "plan_completed",
        serde_json::json!({
            "trades": plan.trades.len(),
            "total_value": plan.total_value,
        }),
    )
}
