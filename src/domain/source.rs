use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::Result;

/// A publication as advertised by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub href: String,
    #[serde(rename = "isEnabledByDefault", default)]
    pub is_enabled_by_default: bool,
}

impl SourceDescriptor {
    pub fn new(
        name: impl Into<String>,
        href: impl Into<String>,
        is_enabled_by_default: bool,
    ) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
            is_enabled_by_default,
        }
    }
}

/// Body of the catalog endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    #[serde(rename = "dynamic_sections")]
    pub sources: Vec<SourceDescriptor>,
}

impl Catalog {
    /// Decode a catalog body, rejecting entries whose `href` is not a URL.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let catalog: Catalog = serde_json::from_slice(body)?;
        for source in &catalog.sources {
            Url::parse(&source.href)?;
        }
        Ok(catalog)
    }
}

/// A catalog entry annotated with its resolved visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedSource {
    pub descriptor: SourceDescriptor,
    pub enabled: bool,
}

impl OrderedSource {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn href(&self) -> &str {
        &self.descriptor.href
    }
}
