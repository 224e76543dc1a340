use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One permit object exactly as the open-data endpoint returned it.
pub type RawPermit = Map<String, Value>;

/// Processed permits: a header of column names and one row of cells per permit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermitTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PermitTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[cfg(test)]
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Header row followed by the data rows, as sheet values.
    pub fn to_values(&self) -> Vec<Vec<String>> {
        let mut values = Vec::with_capacity(self.rows.len() + 1);
        values.push(self.columns.clone());
        values.extend(self.rows.iter().cloned());
        values
    }
}

/// Flattens a JSON value into a single sheet cell.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        // url-typed columns come back as {"url": "..."}
        Some(Value::Object(obj)) => match obj.get("url") {
            Some(Value::String(url)) => url.clone(),
            _ => Value::Object(obj.clone()).to_string(),
        },
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cell_text_flattens_values() {
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&Value::Null)), "");
        assert_eq!(cell_text(Some(&json!("Commercial"))), "Commercial");
        assert_eq!(cell_text(Some(&json!(98101))), "98101");
        assert_eq!(cell_text(Some(&json!(true))), "true");
        assert_eq!(
            cell_text(Some(&json!({"url": "https://cosaccela.seattle.gov/x"}))),
            "https://cosaccela.seattle.gov/x"
        );
        assert_eq!(cell_text(Some(&json!({"a": 1}))), r#"{"a":1}"#);
        assert_eq!(cell_text(Some(&json!(["a", "b"]))), r#"["a","b"]"#);
    }

    #[test]
    fn to_values_puts_header_first() {
        let table = PermitTable {
            columns: vec!["permitnum".into(), "fetch_date".into()],
            rows: vec![
                vec!["6901234-CN".into(), "2024-05-01 10:00:00".into()],
                vec!["6905678-CN".into(), "2024-05-01 10:00:00".into()],
            ],
        };
        let values = table.to_values();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], vec!["permitnum", "fetch_date"]);
        assert_eq!(values[2][0], "6905678-CN");
        assert_eq!(table.column("permitnum").unwrap(), vec!["6901234-CN", "6905678-CN"]);
        assert!(table.column("missing").is_none());
    }
}
