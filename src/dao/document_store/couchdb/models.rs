use serde::Deserialize;
use serde_json::{Map, Value};

pub const END_SUFFIX: &str = "\u{ffff}";
const ID_FIELD: &str = "_id";
const REV_FIELD: &str = "_rev";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseInfo {
    pub update_seq: Value,
}

#[derive(Debug, Deserialize)]
pub struct ChangesResponse {
    #[serde(default)]
    pub results: Vec<ChangeRow>,
    pub last_seq: Value,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRow {
    pub id: String,
}

/// Only the revision is needed before overwriting or deleting a document.
#[derive(Debug, Deserialize)]
pub struct RevisionOnly {
    #[serde(rename = "_rev")]
    pub rev: String,
}

/// Encode a logical path as a single URL segment; CouchDB keeps `%2F` inside ids.
pub fn encode_doc_id(path: &str) -> String {
    path.replace('%', "%25").replace('/', "%2F")
}

/// Sequence tokens are opaque strings on CouchDB 2+ and integers on 1.x.
pub fn seq_param(seq: &Value) -> String {
    match seq {
        Value::String(token) => token.clone(),
        other => other.to_string(),
    }
}

/// Split CouchDB bookkeeping fields off a stored document.
pub fn into_body(document: Value) -> (Option<String>, Value) {
    match document {
        Value::Object(mut map) => {
            map.remove(ID_FIELD);
            let rev = map
                .remove(REV_FIELD)
                .and_then(|rev| rev.as_str().map(str::to_string));
            (rev, Value::Object(map))
        }
        other => (None, other),
    }
}

/// Wrap a body for writing, carrying the revision being replaced.
pub fn with_revision(mut body: Map<String, Value>, rev: Option<String>) -> Value {
    body.remove(ID_FIELD);
    body.remove(REV_FIELD);
    if let Some(rev) = rev {
        body.insert(REV_FIELD.to_string(), Value::String(rev));
    }
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn encodes_paths_as_single_segment() {
        assert_eq!(
            encode_doc_id("games/g1/scoring/gameState"),
            "games%2Fg1%2Fscoring%2FgameState"
        );
        assert_eq!(encode_doc_id("a%b"), "a%25b");
    }

    #[test]
    fn sequence_tokens_render_verbatim() {
        assert_eq!(seq_param(&json!("12-abc")), "12-abc");
        assert_eq!(seq_param(&json!(12)), "12");
    }

    #[test]
    fn strips_and_restores_bookkeeping() {
        let stored = json!({ "_id": "x", "_rev": "1-a", "outs": 2 });
        let (rev, body) = into_body(stored);
        assert_eq!(rev.as_deref(), Some("1-a"));
        assert_eq!(body, json!({ "outs": 2 }));

        let Value::Object(map) = body else {
            panic!("expected object")
        };
        assert_eq!(
            with_revision(map, rev),
            json!({ "outs": 2, "_rev": "1-a" })
        );
    }
}
