use axum::Json;
use serde_json::{Map, Value};

/// Wrap `data` in the `{"status":"ok", ...}` success envelope.
///
/// Object fields are merged next to `status`; any other value is ignored.
pub fn success(data: Value) -> Json<Value> {
    let mut body = Map::new();
    body.insert("status".to_owned(), Value::from("ok"));
    if let Value::Object(fields) = data {
        body.extend(fields);
    }
    Json(Value::Object(body))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn merges_fields_after_status() {
        let Json(body) = success(json!({ "fragments": [] }));
        assert_eq!(body, json!({ "status": "ok", "fragments": [] }));
    }

    #[test]
    fn bare_envelope() {
        let Json(body) = success(Value::Null);
        assert_eq!(body, json!({ "status": "ok" }));
    }
}
