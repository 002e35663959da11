//! Schema command implementation.
//!
//! Emits JSON Schema documents describing tkt's machine-readable outputs,
//! so tooling can rely on stable shapes without reading source code.

use crate::cli::{SchemaArgs, SchemaTarget};
use crate::error::Result;
use crate::format::OutputContext;
use crate::model::Ticket;
use crate::report::KpiReport;
use chrono::{DateTime, Utc};
use schemars::schema::RootSchema;
use schemars::schema_for;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize, schemars::JsonSchema)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Serialize, schemars::JsonSchema)]
struct ErrorBody {
    /// Machine-readable error code (SCREAMING_SNAKE_CASE)
    code: String,
    /// Human-readable message
    message: String,
    /// Optional hint for remediation
    hint: Option<String>,
    /// Whether the operation can be retried
    retryable: bool,
}

#[derive(Debug, Serialize)]
struct SchemaOutput {
    tool: &'static str,
    generated_at: DateTime<Utc>,
    schemas: BTreeMap<&'static str, RootSchema>,
}

/// Execute the schema command. Output is JSON in every mode except quiet.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn execute(args: &SchemaArgs, ctx: &OutputContext) -> Result<()> {
    if ctx.is_quiet() {
        return Ok(());
    }

    let payload = SchemaOutput {
        tool: "tkt",
        generated_at: Utc::now(),
        schemas: build_schemas(args.target),
    };
    ctx.json_pretty(&payload)
}

fn build_schemas(target: SchemaTarget) -> BTreeMap<&'static str, RootSchema> {
    let mut schemas = BTreeMap::new();

    match target {
        SchemaTarget::All => {
            schemas.insert("Ticket", schema_for!(Ticket));
            schemas.insert("KpiReport", schema_for!(KpiReport));
            schemas.insert("ErrorEnvelope", schema_for!(ErrorEnvelope));
        }
        SchemaTarget::Ticket => {
            schemas.insert("Ticket", schema_for!(Ticket));
        }
        SchemaTarget::Report => {
            schemas.insert("KpiReport", schema_for!(KpiReport));
        }
        SchemaTarget::Error => {
            schemas.insert("ErrorEnvelope", schema_for!(ErrorEnvelope));
        }
    }

    schemas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_generation_is_json_serializable() {
        let schemas = build_schemas(SchemaTarget::All);
        assert_eq!(schemas.len(), 3);
        for (name, schema) in schemas {
            let value = serde_json::to_value(&schema).expect("schema serializable");
            assert!(value.is_object(), "{name} schema should be a JSON object");
        }
    }

    #[test]
    fn report_schema_uses_hyphenated_workload_key() {
        let schemas = build_schemas(SchemaTarget::Report);
        let value = serde_json::to_value(&schemas["KpiReport"]).unwrap();
        let text = value.to_string();
        assert!(text.contains("in-progress"));
        assert!(text.contains("avg_resolution_days"));
    }
}
