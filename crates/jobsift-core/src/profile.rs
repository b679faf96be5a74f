use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::filter::KeywordFilter;

/// What to search for, where, and which admitted jobs are worth reporting.
///
/// Loaded from a JSON file; any omitted field falls back to the built-in
/// default profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchProfile {
    pub queries: Vec<String>,
    pub location: String,
    pub radius_km: u32,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for SearchProfile {
    fn default() -> Self {
        Self {
            queries: [
                "Digital Product Owner",
                "Product Marketing Manager",
                "Growth Product Manager",
                "Digital Marketing Manager",
                "Scrum Product Owner",
                "Technical Product Manager",
                "E-commerce Manager",
                "Product Owner Digital Channels",
                "Marketing Technology Product Owner",
                "Growth Architect",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            location: "Willow Grove, PA 19090".to_string(),
            radius_km: 64,
            include: [
                "product manager",
                "product management",
                "pm",
                "roadmap",
                "platform",
                "technical product",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            exclude: ["junior", "entry level", "intern", "marketing product", "sales"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl SearchProfile {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!("Cannot read profile {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Reject profiles that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.queries.iter().all(|q| q.trim().is_empty()) {
            return Err(AppError::ConfigError(
                "Profile needs at least one non-blank query".into(),
            ));
        }
        if self.location.trim().is_empty() {
            return Err(AppError::ConfigError("Profile location is empty".into()));
        }
        Ok(())
    }

    /// Query terms, trimmed, blanks dropped.
    pub fn query_terms(&self) -> Vec<String> {
        self.queries
            .iter()
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn keyword_filter(&self) -> KeywordFilter {
        KeywordFilter::new(&self.include, &self.exclude)
    }
}
