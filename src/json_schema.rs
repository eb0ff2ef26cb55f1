//! JSON Schema generation for CLI output types.
//!
//! Schemas are generated with schemars and exported via the `schema` subcommand.

use schemars::{schema_for, Schema};
use std::collections::BTreeMap;

/// Returns all JSON schemas for commands that support --json output.
/// Uses BTreeMap for deterministic ordering.
pub fn all_schemas() -> BTreeMap<&'static str, Schema> {
    let mut schemas = BTreeMap::new();
    schemas.insert(
        "analyze",
        schema_for!(crate::cmd::analyze::AnalyzeJsonOutput),
    );
    schemas.insert("plan", schema_for!(crate::cmd::plan::PlanJsonOutput));
    schemas.insert("split", schema_for!(crate::cmd::split::SplitJsonOutput));
    schemas
}

pub fn get_schema(command: &str) -> Option<Schema> {
    all_schemas().remove(command)
}

pub fn schema_names() -> Vec<&'static str> {
    all_schemas().keys().copied().collect()
}
