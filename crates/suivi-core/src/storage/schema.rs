//! Snapshot schema, legacy normalization and the seed dataset
//!
//! The document snapshot is a versioned JSON envelope. Snapshots written by
//! the original browser application are a bare array with looser field
//! shapes: sequential string ids, a single `transmittalFile` data-URL
//! string instead of the `transmittalFiles` array, empty strings for absent
//! dates, and occasionally a negative `currentRevisionIndex`. Loading
//! normalizes all of that once, in JSON space, before deserializing into
//! the typed model; saving always writes the current envelope.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{ApprovalStatus, Document, Revision};

/// Current snapshot schema version
pub const SCHEMA_VERSION: u32 = 2;

/// Versioned on-disk envelope for the document snapshot
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    pub schema_version: u32,
    pub documents: Vec<Document>,
}

impl DocumentSnapshot {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            documents,
        }
    }
}

/// Parse a document snapshot, accepting both the current envelope and the
/// legacy bare-array shape
///
/// Returns `None` when the JSON is malformed beyond normalization; the
/// caller falls back to the seed dataset.
pub fn parse_documents(raw: &str) -> Option<Vec<Document>> {
    let mut value: Value = serde_json::from_str(raw).ok()?;

    let docs = match &mut value {
        Value::Array(docs) => docs,
        Value::Object(map) => match map.get_mut("documents") {
            Some(Value::Array(docs)) => docs,
            _ => return None,
        },
        _ => return None,
    };

    for doc in docs.iter_mut() {
        normalize_document(doc);
    }

    serde_json::from_value(Value::Array(std::mem::take(docs))).ok()
}

/// Rewrite one raw document object into the current schema shape
fn normalize_document(doc: &mut Value) {
    let Some(obj) = doc.as_object_mut() else {
        return;
    };

    normalize_id(obj);

    // A negative or non-numeric pointer means "no explicit pointer"
    match obj.get("currentRevisionIndex") {
        Some(Value::Number(n)) if n.as_i64().is_some_and(|i| i >= 0) => {}
        _ => {
            obj.insert("currentRevisionIndex".to_string(), Value::Null);
        }
    }

    if let Some(Value::Array(revisions)) = obj.get_mut("revisions") {
        for rev in revisions.iter_mut() {
            normalize_revision(rev);
        }
    } else {
        obj.insert("revisions".to_string(), json!([]));
    }
}

fn normalize_revision(rev: &mut Value) {
    let Some(obj) = rev.as_object_mut() else {
        return;
    };

    normalize_id(obj);

    for date_field in [
        "transmittalDate",
        "observationDate",
        "approvalDate",
        "returnDate",
    ] {
        if matches!(obj.get(date_field), Some(Value::String(s)) if s.is_empty()) {
            obj.insert(date_field.to_string(), Value::Null);
        }
    }

    if obj.get("status").map_or(true, |s| !s.is_string()) {
        obj.insert("status".to_string(), json!("PENDING"));
    }

    normalize_attachments(obj, "transmittalFiles", "transmittalFile");
    normalize_attachments(obj, "observationFiles", "observationFile");
}

/// Fold the legacy single-file field into the array field and convert
/// data-URL strings into attachment objects; unparseable entries are dropped
fn normalize_attachments(
    obj: &mut serde_json::Map<String, Value>,
    array_field: &str,
    legacy_field: &str,
) {
    let mut raw: Vec<Value> = match obj.remove(array_field) {
        Some(Value::Array(list)) => list,
        _ => Vec::new(),
    };
    if raw.is_empty() {
        if let Some(Value::String(single)) = obj.remove(legacy_field) {
            raw.push(Value::String(single));
        }
    } else {
        obj.remove(legacy_field);
    }

    let converted: Vec<Value> = raw
        .into_iter()
        .filter_map(|entry| match entry {
            Value::Object(_) => Some(entry),
            Value::String(url) => data_url_to_attachment(&url),
            _ => None,
        })
        .collect();

    obj.insert(array_field.to_string(), Value::Array(converted));
}

fn data_url_to_attachment(url: &str) -> Option<Value> {
    let rest = url.strip_prefix("data:")?;
    let (mime, data) = rest.split_once(";base64,")?;
    Some(json!({ "name": "attachment", "mime": mime, "data": data }))
}

/// Legacy ids are short sequential strings; replace anything that is not a
/// UUID with a fresh one
fn normalize_id(obj: &mut serde_json::Map<String, Value>) {
    let valid = matches!(
        obj.get("id"),
        Some(Value::String(s)) if Uuid::parse_str(s).is_ok()
    );
    if !valid {
        obj.insert("id".to_string(), json!(Uuid::new_v4().to_string()));
    }
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

/// The dataset a fresh install starts from
pub fn seed_documents() -> Vec<Document> {
    let mut fondation = Revision::new("00", ApprovalStatus::Approved);
    fondation.transmittal_ref = "B-001".to_string();
    fondation.transmittal_date = date(2023, 10, 15);
    fondation.observation_ref = Some("VISA-001".to_string());
    fondation.observation_date = date(2023, 10, 20);
    fondation.approval_date = date(2023, 10, 22);
    fondation.return_date = date(2023, 10, 25);

    let mut schema = Revision::new("01", ApprovalStatus::Rejected);
    schema.transmittal_ref = "B-002".to_string();
    schema.transmittal_date = date(2023, 10, 28);
    schema.observation_ref = Some("OBS-005".to_string());
    schema.observation_date = date(2023, 11, 2);

    let mut coupe = Revision::new("00", ApprovalStatus::NoResponse);
    coupe.transmittal_ref = "B-003".to_string();
    coupe.transmittal_date = date(2023, 11, 5);

    vec![
        Document::new(
            "01",
            "A",
            "GC",
            "GC-FND-Z1-001",
            "Plan de fondation - Zone Nord",
            fondation,
        ),
        Document::new(
            "02",
            "B",
            "ELEC",
            "EL-SCH-GEN-001",
            "Schéma unifilaire général",
            schema,
        ),
        Document::new(
            "01",
            "A",
            "GC",
            "GC-COU-MV-004",
            "Coupe de principe Mur Voile",
            coupe,
        ),
    ]
}
