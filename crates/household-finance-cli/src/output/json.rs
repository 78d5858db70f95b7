use serde_json::Value;
use std::io::{self, Write};

/// Report as indented JSON on stdout. Money fields are already integer
/// minor units, so the document round-trips through `--input` unchanged.
pub fn print_json(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_json(&mut stdout.lock(), value) {
        log::error!("failed to write JSON report: {}", e);
    }
}

fn write_json<W: Write>(out: &mut W, value: &Value) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_written_with_trailing_newline() {
        let mut buf = Vec::new();
        write_json(&mut buf, &json!({ "shortfall": 9_000_000 })).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("}\n"));
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap()["shortfall"], 9_000_000);
    }
}
