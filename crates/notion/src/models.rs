use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tabular::{Page, RecordPage, SelectOption};

/// Body of a database query request
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct QueryBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<&'a str>,
    pub page_size: usize,
}

/// One page of a database query response
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl QueryResponse {
    /// Keep only the property bags, in response order.
    pub fn into_page(self) -> RecordPage {
        RecordPage {
            records: self.results.into_iter().map(|page| page.properties).collect(),
            has_more: self.has_more,
            next_cursor: self.next_cursor,
        }
    }
}

/// Database metadata as returned by the retrieve endpoint
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DatabaseSchema {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySchema>,
}

/// Declared type of one database property
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertySchema {
    Select { select: OptionList },
    MultiSelect { multi_select: OptionList },
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct OptionList {
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

impl DatabaseSchema {
    /// Allowed values of a select or multi-select property.
    ///
    /// `None` when the property is unknown or of any other type.
    pub fn options(&self, property: &str) -> Option<Vec<SelectOption>> {
        match self.properties.get(property)? {
            PropertySchema::Select { select } => Some(select.options.clone()),
            PropertySchema::MultiSelect { multi_select } => Some(multi_select.options.clone()),
            PropertySchema::Other => None,
        }
    }
}

/// Error object returned with non-success statuses
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tabular::Value;

    #[test]
    fn test_query_response_into_page() {
        let response: QueryResponse = serde_json::from_value(json!({
            "object": "list",
            "results": [
                {
                    "object": "page",
                    "id": "p1",
                    "properties": {
                        "Name": {"type": "title", "title": [{"plain_text": "Cena"}]},
                        "Precio": {"type": "number", "number": 25},
                    },
                },
            ],
            "has_more": true,
            "next_cursor": "abc",
        }))
        .unwrap();

        let page = response.into_page();
        assert!(page.has_more);
        assert_eq!(page.next_cursor.as_deref(), Some("abc"));
        assert_eq!(
            page.records[0].to_row(),
            vec![
                ("Name".to_string(), Value::from("Cena")),
                ("Precio".to_string(), Value::from(25)),
            ]
        );
    }

    #[test]
    fn test_last_page_defaults() {
        let response: QueryResponse =
            serde_json::from_value(json!({"results": [], "has_more": false, "next_cursor": null}))
                .unwrap();
        assert_eq!(response.into_page(), RecordPage::default());
    }

    #[test]
    fn test_query_body_omits_missing_cursor() {
        let first = QueryBody { start_cursor: None, page_size: 100 };
        assert_eq!(serde_json::to_value(&first).unwrap(), json!({"page_size": 100}));

        let next = QueryBody { start_cursor: Some("c2"), page_size: 10 };
        assert_eq!(
            serde_json::to_value(&next).unwrap(),
            json!({"start_cursor": "c2", "page_size": 10})
        );
    }

    #[test]
    fn test_schema_options() {
        let schema: DatabaseSchema = serde_json::from_value(json!({
            "object": "database",
            "id": "db1",
            "properties": {
                "Categoria": {"id": "a", "type": "select", "select": {"options": [
                    {"id": "1", "name": "Comida", "color": "red"},
                    {"id": "2", "name": "Casa", "color": "blue"},
                ]}},
                "Evento": {"id": "b", "type": "multi_select", "multi_select": {"options": [
                    {"name": "Boda"},
                ]}},
                "Precio": {"id": "c", "type": "number", "number": {"format": "euro"}},
                "Name": {"id": "title", "type": "title", "title": {}},
            },
        }))
        .unwrap();

        let names = |options: Vec<SelectOption>| -> Vec<String> {
            options.into_iter().map(|o| o.name).collect()
        };
        assert_eq!(names(schema.options("Categoria").unwrap()), vec!["Comida", "Casa"]);
        assert_eq!(names(schema.options("Evento").unwrap()), vec!["Boda"]);
        assert_eq!(schema.options("Precio"), None);
        assert_eq!(schema.options("Missing"), None);
    }
}
