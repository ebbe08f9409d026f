//! Library directory: sections and the titles they hold.

use serde::{Deserialize, Serialize};

/// One library section (collection) on the media server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySection {
    /// Section key used in `/library/sections/{key}/...` paths.
    pub key: String,
    pub title: String,
    /// Section type (`movie`, `show`, `artist`, ...).
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SectionsResponse {
    #[serde(rename = "MediaContainer")]
    container: SectionsContainer,
}

#[derive(Debug, Deserialize)]
struct SectionsContainer {
    #[serde(default, rename = "Directory")]
    directory: Vec<LibrarySection>,
}

impl SectionsResponse {
    pub(crate) fn into_sections(self) -> Vec<LibrarySection> {
        self.container.directory
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemsResponse {
    #[serde(rename = "MediaContainer")]
    container: ItemsContainer,
}

#[derive(Debug, Deserialize)]
struct ItemsContainer {
    #[serde(default, rename = "Metadata")]
    metadata: Vec<ItemWire>,
}

#[derive(Debug, Deserialize)]
struct ItemWire {
    #[serde(default)]
    title: String,
}

impl ItemsResponse {
    /// Whether any returned item carries exactly `title`.
    pub(crate) fn contains_title(&self, title: &str) -> bool {
        self.container.metadata.iter().any(|m| m.title == title)
    }
}
