//! Canned replies in the imagery service's wire format.

use serde_json::{json, Value};

/// Reply to a successful map creation.
pub fn map_created(project: &str, map_id: &str) -> Value {
    json!({ "name": format!("projects/{}/maps/{}", project, map_id) })
}

/// Reply to a successful value computation.
pub fn computed(result: Value) -> Value {
    json!({ "result": result })
}

/// The service's error envelope.
pub fn error(code: u16, status: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message,
            "status": status,
        }
    })
}
