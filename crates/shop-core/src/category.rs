//! Catalog categories.

use crate::error::ShopResult;
use crate::validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

impl Category {
    pub fn new(name: &str) -> ShopResult<Self> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: validate::length("Name", name, 3, 50)?,
        })
    }

    pub fn rename(&mut self, name: &str) -> ShopResult<()> {
        self.name = validate::length("Name", name, 3, 50)?;
        Ok(())
    }
}

/// Request body for create/update
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    #[serde(default)]
    pub name: String,
}
