//! Employer grouping for canteen users.

use std::fmt;

use serde::Serialize;

use super::CompanyId;

/// Validation errors returned by [`Company::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyValidationError {
    EmptyName,
}

impl fmt::Display for CompanyValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "company name must not be empty"),
        }
    }
}

impl std::error::Error for CompanyValidationError {}

/// Employer or tenant that users belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    id: CompanyId,
    name: String,
    active: bool,
}

impl Company {
    /// Build a company, rejecting blank names.
    pub fn new(
        id: CompanyId,
        name: impl Into<String>,
        active: bool,
    ) -> Result<Self, CompanyValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CompanyValidationError::EmptyName);
        }
        Ok(Self { id, name, active })
    }

    pub const fn id(&self) -> &CompanyId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn is_active(&self) -> bool {
        self.active
    }
}
