//! Categorized extraction results.
//!
//! An [`ExtractionResult`] is immutable once built. A category is `Some` only
//! when its activity was enabled on the request; engine output for disabled
//! categories is discarded rather than defaulted to empty containers, so an
//! absent category is never confused with "extracted but empty".

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::engine::EngineOutput;
use crate::types::activity::Activities;

/// One extracted link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkInfo {
    pub url: String,
    pub text: String,
}

impl LinkInfo {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
        }
    }
}

/// Count summary over a set of grouped links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkSummary {
    pub total: usize,
    pub internal_count: usize,
    pub external_count: usize,
    pub unique_domains: usize,
}

/// Links grouped by internal/external and by domain, with summary counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedLinks {
    pub internal: Vec<LinkInfo>,
    pub external: Vec<LinkInfo>,
    pub by_domain: HashMap<String, Vec<LinkInfo>>,
    pub summary: LinkSummary,
}

/// Derived content view: text plus its length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentInfo {
    pub text: Option<String>,
    pub text_length: usize,
}

/// The immutable, category-grouped output of one completed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// The URL the request targeted
    pub url: String,
    pub text: Option<String>,
    pub language: Option<String>,
    pub language_confidence: Option<f64>,
    pub links: Option<GroupedLinks>,
    pub socials: Option<HashMap<String, String>>,
    pub videos: Option<HashMap<String, String>>,
    pub product: Option<HashMap<String, String>>,
    pub article: Option<HashMap<String, String>>,
    pub content: Option<ContentInfo>,
}

impl ExtractionResult {
    /// Shape raw engine output into a result, gated by the enabled activities.
    pub fn from_engine(url: impl Into<String>, activities: &Activities, output: EngineOutput) -> Self {
        let text = if activities.text.is_some() {
            output.text
        } else {
            None
        };

        let (language, language_confidence) = if activities.language_detection() {
            (output.language, output.language_confidence)
        } else {
            (None, None)
        };

        let content = activities.text.map(|_| ContentInfo {
            text: text.clone(),
            text_length: text.as_deref().map_or(0, str::len),
        });

        Self {
            url: url.into(),
            text,
            language,
            language_confidence,
            links: activities.links.and(output.links),
            socials: activities.socials.as_ref().and(output.socials),
            videos: activities.video.as_ref().and(output.videos),
            product: activities.product.as_ref().and(output.product),
            article: activities.article.as_ref().and(output.article),
            content,
        }
    }

    /// Flattened export grouped by extraction category.
    pub fn to_grouped(&self) -> serde_json::Value {
        json!({
            "text": self.content,
            "links": self.links,
            "socials": self.socials,
            "videos": self.videos,
            "product": self.product,
            "article": self.article,
        })
    }
}
