use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A reference to another record as it arrives from the storage layer:
/// either the bare identifier or the referenced record expanded in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    Id(Uuid),
    Expanded(ExpandedRef),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedRef {
    #[serde(alias = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl EntityRef {
    pub fn expanded(id: Uuid, fields: Map<String, Value>) -> Self {
        EntityRef::Expanded(ExpandedRef { id, fields })
    }
}

impl From<Uuid> for EntityRef {
    fn from(id: Uuid) -> Self {
        EntityRef::Id(id)
    }
}
