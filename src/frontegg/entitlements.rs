//! Normalization of Frontegg entitlement payloads
//!
//! The tenant-assignment endpoint has returned several shapes over time.
//! Everything is reduced to a flat list of application id strings; values
//! that are not strings are discarded.

use serde_json::{Map, Value};

/// Keys that may hold a nested list of applications
const NESTED_LIST_KEYS: [&str; 4] = ["applications", "apps", "items", "data"];

/// Extract application ids from a tenant-assignment response
///
/// Supported shapes:
/// - `[{ "tenantId": "...", "appIds": [...] }]`: the entry for `tenant_id`,
///   falling back to the first entry
/// - `[{ "appId": "..." }, { "id": "..." }, "..."]`
/// - `{ "appIds": [...] }` or a list under one of the nested keys
/// - `{ "appId": "..." }` / `{ "id": "..." }`
pub fn extract_app_ids(payload: &Value, tenant_id: &str) -> Vec<String> {
    match payload {
        Value::Array(items) if items.iter().any(is_assignment) => {
            let assignment = items
                .iter()
                .find(|item| item.get("tenantId").and_then(Value::as_str) == Some(tenant_id))
                .or_else(|| items.first());

            assignment
                .and_then(|a| a.get("appIds"))
                .map(string_items)
                .unwrap_or_default()
        }
        Value::Array(items) => items.iter().filter_map(app_object_id).collect(),
        Value::Object(map) => extract_from_object(map, tenant_id),
        _ => Vec::new(),
    }
}

fn extract_from_object(map: &Map<String, Value>, tenant_id: &str) -> Vec<String> {
    if let Some(ids) = map.get("appIds").filter(|v| v.is_array()) {
        return string_items(ids);
    }

    if let Some(nested) = NESTED_LIST_KEYS
        .iter()
        .find_map(|key| map.get(*key).filter(|v| v.is_array()))
    {
        return extract_app_ids(nested, tenant_id);
    }

    app_id_field(map).into_iter().collect()
}

/// An assignment object carries an `appIds` array
fn is_assignment(item: &Value) -> bool {
    item.get("appIds").is_some_and(Value::is_array)
}

/// Id of one element of an app list: a bare string or an app object
fn app_object_id(item: &Value) -> Option<String> {
    match item {
        Value::String(id) => Some(id.clone()),
        Value::Object(map) => app_id_field(map),
        _ => None,
    }
}

fn app_id_field(map: &Map<String, Value>) -> Option<String> {
    map.get("appId")
        .and_then(Value::as_str)
        .or_else(|| map.get("id").and_then(Value::as_str))
        .map(str::to_string)
}

fn string_items(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
