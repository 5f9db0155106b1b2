use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Literal permission entry that grants `manage` on everything.
pub const WILDCARD_PERMISSION: &str = "all";

/// Resource catalog a permission can refer to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    /// Wildcard subject.
    All,
    Addresses,
    Agendas,
    CareAssignments,
    Customizations,
    Financials,
    Foods,
    Nutritionists,
    Patients,
    Resources,
    Responsables,
    Secretaries,
}

impl Resource {
    pub const CATALOG: [Resource; 12] = [
        Resource::All,
        Resource::Addresses,
        Resource::Agendas,
        Resource::CareAssignments,
        Resource::Customizations,
        Resource::Financials,
        Resource::Foods,
        Resource::Nutritionists,
        Resource::Patients,
        Resource::Resources,
        Resource::Responsables,
        Resource::Secretaries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::All => "all",
            Resource::Addresses => "addresses",
            Resource::Agendas => "agendas",
            Resource::CareAssignments => "careAssignments",
            Resource::Customizations => "customizations",
            Resource::Financials => "financials",
            Resource::Foods => "foods",
            Resource::Nutritionists => "nutritionists",
            Resource::Patients => "patients",
            Resource::Resources => "resources",
            Resource::Responsables => "responsables",
            Resource::Secretaries => "secretaries",
        }
    }
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::CATALOG
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| PermissionParseError::UnknownResource(s.to_string()))
    }
}

/// Action a permission grants on a resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Any action.
    Manage,
    Read,
    Write,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Manage, Action::Read, Action::Write, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Manage => "manage",
            Action::Read => "read",
            Action::Write => "write",
            Action::Delete => "delete",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| PermissionParseError::UnknownAction(s.to_string()))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermissionParseError {
    #[error("permission '{0}' is not of the form '<resource>:<action>'")]
    MissingSeparator(String),

    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    #[error("unknown action '{0}'")]
    UnknownAction(String),
}

/// A parsed `"<resource>:<action>"` permission string.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Permission {
    pub resource: Resource,
    pub action: Action,
}

impl Permission {
    pub fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.resource, self.action)
    }
}

impl FromStr for Permission {
    type Err = PermissionParseError;

    /// Splits once on `:`; anything after the first separator is the action.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (resource, action) = s
            .split_once(':')
            .ok_or_else(|| PermissionParseError::MissingSeparator(s.to_string()))?;

        Ok(Self {
            resource: resource.parse()?,
            action: action.parse()?,
        })
    }
}
