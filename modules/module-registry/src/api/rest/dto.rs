use serde::{Deserialize, Serialize};

use crate::domain::model::ModuleVersion;

/// Discovery document served at `/.well-known/terraform.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceDiscoveryDto {
    #[serde(rename = "modules.v1")]
    pub modules_v1: String,
}

/// `{"modules":[{"versions":[{"version":"1.0.0"}]}]}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleVersionsResponseDto {
    pub modules: Vec<ModuleVersionSetDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleVersionSetDto {
    pub versions: Vec<ModuleVersionDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleVersionDto {
    pub version: String,
}

impl From<Vec<ModuleVersion>> for ModuleVersionsResponseDto {
    fn from(versions: Vec<ModuleVersion>) -> Self {
        Self {
            modules: vec![ModuleVersionSetDto {
                versions: versions
                    .iter()
                    .map(|v| ModuleVersionDto {
                        version: v.as_str().to_owned(),
                    })
                    .collect(),
            }],
        }
    }
}

/// Path parameters of the per-module routes.
#[derive(Debug, Deserialize)]
pub struct ModulePath {
    pub namespace: String,
    pub name: String,
    pub system: String,
}

/// Path parameters of the per-version routes.
#[derive(Debug, Deserialize)]
pub struct VersionPath {
    pub namespace: String,
    pub name: String,
    pub system: String,
    pub version: String,
}
