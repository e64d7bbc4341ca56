use serde::{Deserialize, Serialize};

/// A tag or ingredient as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: i32,
    pub name: String,
}

impl From<models::tag::Model> for Attribute {
    fn from(m: models::tag::Model) -> Self { Self { id: m.id, name: m.name } }
}

impl From<models::ingredient::Model> for Attribute {
    fn from(m: models::ingredient::Model) -> Self { Self { id: m.id, name: m.name } }
}
