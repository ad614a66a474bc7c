//! Human-readable role and domain blurbs attached to analysis reports.

use std::collections::HashMap;

use serde::Deserialize;

const BUILTIN_DESCRIPTIONS: &str = include_str!("../../data/descriptions.json");

pub const MISSING_ROLE_DESCRIPTION: &str = "No description available for this role.";
pub const MISSING_DOMAIN_DESCRIPTION: &str = "No description available for this domain.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Descriptions {
    #[serde(default)]
    roles: HashMap<String, String>,
    #[serde(default)]
    domains: HashMap<String, String>,
}

impl Descriptions {
    pub fn builtin() -> Result<Self, serde_json::Error> {
        serde_json::from_str(BUILTIN_DESCRIPTIONS)
    }

    pub fn role(&self, role: &str) -> &str {
        self.roles
            .get(role)
            .map(String::as_str)
            .unwrap_or(MISSING_ROLE_DESCRIPTION)
    }

    pub fn domain(&self, domain: &str) -> &str {
        self.domains
            .get(domain)
            .map(String::as_str)
            .unwrap_or(MISSING_DOMAIN_DESCRIPTION)
    }
}
