//! Versioned document codec for scenes.
//!
//! Every encoded document carries a `schema_version` tag. Decoding reads the
//! tag first and dispatches on it; documents from any other version go
//! through [`migrate_document`], which rejects what it cannot convert. A read
//! never rewrites the stored document.

use std::collections::BTreeSet;

use fatebot_core::channel::{ChannelId, MessageId};
use fatebot_core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::aggregates::{Aspect, AspectId, Scene};

/// The schema version this build reads and writes.
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Key holding the schema version inside a document.
pub const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Key older documents used for the version tag.
const LEGACY_VERSION_KEY: &str = "_v";

#[derive(Debug, Serialize, Deserialize)]
struct AspectDocumentV1 {
    id: u64,
    name: String,
    #[serde(default)]
    boost: bool,
    #[serde(default)]
    invokes: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct SceneDocumentV1 {
    #[serde(alias = "_v")]
    schema_version: i64,
    channel_id: ChannelId,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    aspects: Vec<AspectDocumentV1>,
    next_aspect_id: u64,
    #[serde(default)]
    display_message_ids: Vec<MessageId>,
}

/// Encodes a scene as a current-version document.
#[must_use]
pub fn encode_scene(scene: &Scene) -> Value {
    let document = SceneDocumentV1 {
        schema_version: CURRENT_SCHEMA_VERSION,
        channel_id: scene.channel_id(),
        description: scene.description().map(str::to_owned),
        aspects: scene
            .aspects()
            .map(|(id, aspect)| AspectDocumentV1 {
                id: id.0,
                name: aspect.name().to_owned(),
                boost: aspect.is_boost(),
                invokes: aspect.invokes(),
            })
            .collect(),
        next_aspect_id: scene.next_aspect_id().0,
        display_message_ids: scene.display_message_ids().iter().copied().collect(),
    };
    // Serialization of derived Serialize types to Value is infallible.
    serde_json::to_value(document).expect("SceneDocumentV1 serialization is infallible")
}

/// Reads the version tag of a document, if present.
#[must_use]
pub fn schema_version_of(document: &Value) -> Option<i64> {
    document
        .get(SCHEMA_VERSION_KEY)
        .or_else(|| document.get(LEGACY_VERSION_KEY))
        .and_then(Value::as_i64)
}

/// Decodes the document stored under `channel_id`.
///
/// # Errors
///
/// Returns `DomainError::UnsupportedSchemaVersion` for documents of another
/// version with no migration path, and `DomainError::CorruptDocument` for
/// current-version documents that do not decode or break scene invariants.
pub fn decode_scene(channel_id: ChannelId, document: &Value) -> Result<Scene, DomainError> {
    match schema_version_of(document) {
        Some(CURRENT_SCHEMA_VERSION) => decode_v1(channel_id, document),
        found => {
            let migrated = migrate_document(channel_id, found, document)?;
            decode_v1(channel_id, &migrated)
        }
    }
}

/// Converts a document from an older (or unknown) version into the current
/// shape.
///
/// No migration paths exist yet, so every such document is rejected.
///
/// # Errors
///
/// Returns `DomainError::UnsupportedSchemaVersion`.
pub fn migrate_document(
    channel_id: ChannelId,
    found: Option<i64>,
    _document: &Value,
) -> Result<Value, DomainError> {
    Err(DomainError::UnsupportedSchemaVersion {
        channel_id,
        found,
        expected: CURRENT_SCHEMA_VERSION,
    })
}

fn decode_v1(channel_id: ChannelId, document: &Value) -> Result<Scene, DomainError> {
    let corrupt = |reason: String| DomainError::CorruptDocument { channel_id, reason };

    let parsed: SceneDocumentV1 = serde_json::from_value(document.clone())
        .map_err(|e| corrupt(format!("document deserialization failed: {e}")))?;

    if parsed.channel_id != channel_id {
        return Err(corrupt(format!(
            "document belongs to channel {}",
            parsed.channel_id
        )));
    }

    let mut complaints = Vec::new();
    let mut aspects = Vec::with_capacity(parsed.aspects.len());
    for stored in parsed.aspects {
        match Aspect::from_parts(stored.name, stored.boost, stored.invokes) {
            Ok(aspect) => aspects.push((AspectId(stored.id), aspect)),
            Err(found) => complaints.extend(
                found
                    .into_iter()
                    .map(|complaint| format!("aspect {}: {complaint}", stored.id)),
            ),
        }
    }
    if !complaints.is_empty() {
        return Err(corrupt(complaints.join("; ")));
    }

    Scene::from_parts(
        channel_id,
        parsed.description,
        aspects,
        parsed.next_aspect_id,
        parsed.display_message_ids.into_iter().collect::<BTreeSet<_>>(),
    )
    .map_err(|complaints| corrupt(complaints.join("; ")))
}
