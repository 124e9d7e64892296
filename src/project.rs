//! Project context: the read-only inputs the validator needs beyond the row itself.
//!
//! The active project decides whether the `Category` column applies; the allowed category list is
//! supplied alongside it. Both are plain data and can be loaded from JSON configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Record identifier column.
pub const FIELD_ID: &str = "ID";
/// Delivery date column.
pub const FIELD_DELIVERY_DATE: &str = "Delivery_Date";
/// State column.
pub const FIELD_STATE: &str = "State";
/// District column.
pub const FIELD_DISTRICT: &str = "District";
/// School column.
pub const FIELD_SCHOOL: &str = "School";
/// Public-sector undertaking column.
pub const FIELD_PSU: &str = "PSU";
/// Delivery status column.
pub const FIELD_STATUS: &str = "Status";
/// Cost column.
pub const FIELD_COST: &str = "Cost";
/// Item category column (device procurement only).
pub const FIELD_CATEGORY: &str = "Category";

/// Columns required for every project, in template order.
pub const REQUIRED_FIELDS: [&str; 8] = [
    FIELD_ID,
    FIELD_DELIVERY_DATE,
    FIELD_STATE,
    FIELD_DISTRICT,
    FIELD_SCHOOL,
    FIELD_PSU,
    FIELD_STATUS,
    FIELD_COST,
];

/// Allowed values of the `Status` column.
pub const ALLOWED_STATUSES: [&str; 4] = ["Shipped", "Pending", "Just Deployed", "Arrived"];

/// Project name that selects [`ProjectKind::Devices`].
pub const DEVICE_PROJECT_NAME: &str = "Device Procurement";
/// Project name that selects [`ProjectKind::SanitaryPads`].
pub const SANITARY_PAD_PROJECT_NAME: &str = "Sanitary Pad Procurement";

/// Procurement type, derived from the project name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    /// Device procurement: rows carry a `Category` validated against the category list.
    Devices,
    /// Sanitary-pad procurement: no `Category` column.
    SanitaryPads,
    /// Any other project name; treated like sanitary pads (no `Category`).
    Other,
}

impl ProjectKind {
    /// Map a project name onto a kind. Surrounding whitespace is ignored; matching is exact.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            DEVICE_PROJECT_NAME => Self::Devices,
            SANITARY_PAD_PROJECT_NAME => Self::SanitaryPads,
            _ => Self::Other,
        }
    }

    /// Whether rows of this project carry a `Category` column.
    pub fn uses_category(self) -> bool {
        matches!(self, Self::Devices)
    }

    /// Required columns for this project, in template order.
    pub fn required_fields(self) -> Vec<&'static str> {
        let mut fields = REQUIRED_FIELDS.to_vec();
        if self.uses_category() {
            fields.push(FIELD_CATEGORY);
        }
        fields
    }
}

/// Active project descriptor plus the allowed category list.
///
/// ```
/// use procurement_bulk_import::project::{ProjectContext, ProjectKind};
///
/// let ctx = ProjectContext::from_json_str(
///     r#"{ "name": "Device Procurement", "categories": ["Laptop", "Tablet"] }"#,
/// ).unwrap();
/// assert_eq!(ctx.kind(), ProjectKind::Devices);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectContext {
    /// Project display name.
    pub name: String,
    /// Allowed item categories, in display order.
    #[serde(default)]
    pub categories: Vec<String>,
}

impl ProjectContext {
    /// Create a context from a project name and category list.
    pub fn new<I, S>(name: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    /// Context for device procurement with the given categories.
    pub fn devices<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(DEVICE_PROJECT_NAME, categories)
    }

    /// Context for sanitary-pad procurement.
    pub fn sanitary_pads() -> Self {
        Self::new(SANITARY_PAD_PROJECT_NAME, Vec::<String>::new())
    }

    /// Procurement type derived from [`Self::name`].
    pub fn kind(&self) -> ProjectKind {
        ProjectKind::from_name(&self.name)
    }

    /// Returns `true` if `value` is one of the allowed categories (exact match).
    pub fn allows_category(&self, value: &str) -> bool {
        self.categories.iter().any(|c| c == value)
    }

    /// Parse a context from JSON: `{ "name": "...", "categories": ["..."] }`.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a context from a JSON file.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
