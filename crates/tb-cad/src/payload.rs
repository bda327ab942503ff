//! Simulation payload
//!
//! Builds the one-shot document handed to the external simulation service.
//! The vertical axis is flipped here and nowhere else.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resolve::ResolvedEntitySet;

/// Namespace for payload content hashes
const PAYLOAD_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2d3e_8a4b_4c5d_9e6f_7a8b_9c0d_1e2f);

/// Project context sent along with the entities
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub project_id: Uuid,
    pub drawing_id: Uuid,
    pub name: String,
}

/// Simulation-creation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationPayload {
    #[serde(flatten)]
    pub metadata: ProjectMetadata,
    /// Resolved entities in simulation (y up) orientation
    pub entities: ResolvedEntitySet,
    /// Content hash of metadata and entities; equal inputs give equal hashes
    pub hash: Uuid,
}

impl SimulationPayload {
    /// Build a payload from entities resolved in editing orientation
    pub fn build(
        metadata: ProjectMetadata,
        resolved: &ResolvedEntitySet,
    ) -> Result<Self, PayloadError> {
        let entities = resolved.flipped_y();
        let hash = content_hash(&metadata, &entities)?;
        Ok(Self {
            metadata,
            entities,
            hash,
        })
    }

    /// Serialize to the JSON body sent to the service
    pub fn to_json(&self) -> Result<String, PayloadError> {
        serde_json::to_string(self).map_err(|e| PayloadError::Serialize(e.to_string()))
    }
}

fn content_hash(
    metadata: &ProjectMetadata,
    entities: &ResolvedEntitySet,
) -> Result<Uuid, PayloadError> {
    let bytes = serde_json::to_vec(&(metadata, entities))
        .map_err(|e| PayloadError::Serialize(e.to_string()))?;
    Ok(Uuid::new_v5(&PAYLOAD_NAMESPACE, &bytes))
}

/// Payload-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum PayloadError {
    #[error("Serialization error: {0}")]
    Serialize(String),
}
