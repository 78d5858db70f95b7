pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

type Scalars = Vec<(String, Value)>;
type Tables = Vec<(String, Vec<Value>)>;

/// Splits a result object into dotted scalar rows and the arrays of
/// objects it carries (scenario rankings, projection paths).
pub(crate) fn flatten_result(map: &Map<String, Value>) -> (Scalars, Tables) {
    let mut rows = Vec::new();
    let mut tables = Vec::new();
    flatten_into("", map, &mut rows, &mut tables);
    (rows, tables)
}

fn flatten_into(
    prefix: &str,
    map: &Map<String, Value>,
    rows: &mut Vec<(String, Value)>,
    tables: &mut Vec<(String, Vec<Value>)>,
) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, rows, tables),
            Value::Array(items) if items.iter().all(Value::is_object) && !items.is_empty() => {
                tables.push((name, items.clone()))
            }
            _ => rows.push((name, val.clone())),
        }
    }
}
