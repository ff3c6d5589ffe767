use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => Ok(render_table(&serde_json::to_value(value)?)),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn table_options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

fn render_table(value: &Value) -> String {
    match value {
        Value::Array(items) => render_rows(items),
        Value::Object(map) => {
            let rows = map
                .iter()
                .map(|(key, value)| vec![key.clone(), cell(value)])
                .collect::<Vec<_>>();
            table::render(&["field", "value"], &rows, table_options())
        }
        scalar => cell(scalar),
    }
}

/// Objects become one row each with the union of their keys as columns, in
/// first-seen order; anything else is a single `value` column.
fn render_rows(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }
    if !items.iter().all(Value::is_object) {
        let rows = items.iter().map(|item| vec![cell(item)]).collect::<Vec<_>>();
        return table::render(&["value"], &rows, table_options());
    }

    let mut headers: Vec<&str> = Vec::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|h| map.get(*h).map_or_else(|| String::from("-"), cell))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    table::render(&headers, &rows, table_options())
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::String(s) => s.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;
    use serde_json::json;

    use super::render;
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Row {
        id: &'static str,
        pages: u32,
    }

    #[test]
    fn json_render_is_pretty_json() {
        let out = render(&Row { id: "x", pages: 7 }, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["pages"], 7);
        assert!(out.contains('\n'));
    }

    #[test]
    fn raw_render_is_single_line() {
        let out = render(&Row { id: "x", pages: 7 }, OutputFormat::Raw).unwrap();
        assert!(!out.contains('\n'));
    }

    #[test]
    fn object_renders_as_field_value_table() {
        let out = render(&Row { id: "x", pages: 7 }, OutputFormat::Table).unwrap();
        assert!(out.lines().next().is_some_and(|l| l.starts_with("field")));
        assert!(out.contains("pages"));
    }

    #[test]
    fn arrays_of_objects_keep_key_order_and_join_string_lists() {
        let value = json!([
            {"name": "Economics", "selected": true},
            {"name": "Law", "tags": ["a", "b"]},
        ]);
        let out = render(&value, OutputFormat::Table).unwrap();
        let header = out.lines().next().unwrap();
        assert!(header.find("name") < header.find("selected"));
        assert!(out.contains("a, b"));
    }

    #[test]
    fn empty_array_has_placeholder() {
        let out = render(&Vec::<Row>::new(), OutputFormat::Table).unwrap();
        assert_eq!(out, "(no rows)");
    }
}
