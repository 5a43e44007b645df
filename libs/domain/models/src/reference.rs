//! [libs/domain/models/src/reference.rs]
//! Reference Store entities (C1, §4.1): named, interface-scoped image/text templates.

use crate::navigation::Area;
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Image,
    Text,
}

/// Unique by `(team, interface_name, name)` (§3, §6 database invariants).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub team: String,
    pub interface_name: String,
    pub name: String,
    pub reference_type: ReferenceType,
    pub area: Area,
    pub image_url: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Bumped whenever an existing reference's `text` or `area` changes, so the editor knows
    /// whether a re-upload to the object store is due (§4.1).
    #[serde(default)]
    pub modified: bool,
}
