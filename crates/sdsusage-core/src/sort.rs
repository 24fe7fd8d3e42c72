//! Sort options for the project list.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Field projects are ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Total size in bytes.
    #[default]
    TotalSize,
    /// Project name, case-insensitive.
    Name,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[strum(to_string = "asc", serialize = "ascending")]
    Asc,
    #[default]
    #[strum(to_string = "desc", serialize = "descending")]
    Desc,
}

impl SortOrder {
    pub fn is_descending(self) -> bool {
        self == SortOrder::Desc
    }
}

/// How the top-level project list is sorted. Defaults to size, descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }
}
