//! JSON page fixtures: a body tree, an optional focused element, and nodes
//! that render later.

use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::{Element, NodeId, Page, Result, error::Error};

/// Location used when a fixture does not name one.
const DEFAULT_URL: &str = "https://www.bilibili.com/video/BV1xx411c7mD";

/// Serde default for [`PageFixture::url`].
fn default_url() -> String {
    DEFAULT_URL.to_string()
}

/// One element and its children.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeFixture {
    /// Tag name.
    pub tag: String,
    /// Optional `id` attribute.
    #[serde(default)]
    pub id: Option<String>,
    /// Optional `class` attribute.
    #[serde(default)]
    pub class: Option<String>,
    /// Remaining attributes.
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Initial checked state.
    #[serde(default)]
    pub checked: bool,
    /// Children in order.
    #[serde(default)]
    pub children: Vec<NodeFixture>,
}

impl NodeFixture {
    /// Insert this node and its children under `parent`.
    pub fn insert(&self, page: &Page, parent: NodeId) -> Option<NodeId> {
        let id = page.append(parent, self.element())?;
        for child in &self.children {
            child.insert(page, id);
        }
        Some(id)
    }

    /// Element data for this node, without children.
    fn element(&self) -> Element {
        let mut element = Element::new(&self.tag).checked(self.checked);
        if let Some(id) = &self.id {
            element = element.with_id(id);
        }
        if let Some(class) = &self.class {
            element = element.with_class(class);
        }
        for (name, value) in &self.attrs {
            element = element.with_attr(name, value);
        }
        element
    }
}

/// A subtree inserted some time after load.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeferredNode {
    /// Delay after load, in milliseconds.
    pub after_ms: u64,
    /// `id` of the parent element; the body when absent.
    #[serde(default)]
    pub parent: Option<String>,
    /// The subtree to insert.
    pub node: NodeFixture,
}

impl DeferredNode {
    /// Delay as a duration.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.after_ms)
    }

    /// Insert the subtree under its named parent (or the body).
    pub fn insert(&self, page: &Page) -> Result<NodeId> {
        let parent = match &self.parent {
            Some(id) => page
                .element_by_id(id)
                .ok_or_else(|| Error::UnknownElement(id.clone()))?,
            None => page.body(),
        };
        self.node
            .insert(page, parent)
            .ok_or_else(|| Error::UnknownElement(self.parent.clone().unwrap_or_default()))
    }
}

/// A whole page description.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageFixture {
    /// Document location.
    #[serde(default = "default_url")]
    pub url: String,
    /// Children of `body`.
    #[serde(default)]
    pub body: Vec<NodeFixture>,
    /// `id` of the element focused after load.
    #[serde(default)]
    pub focus: Option<String>,
    /// Nodes rendered after load.
    #[serde(default)]
    pub later: Vec<DeferredNode>,
}

impl PageFixture {
    /// Parse a fixture from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a fixture file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Build the initial document. Deferred nodes are left to the caller.
    pub fn build(&self) -> Result<Page> {
        let page = Page::new(&self.url);
        let body = page.body();
        for node in &self.body {
            node.insert(&page, body);
        }
        if let Some(id) = &self.focus {
            let target = page
                .element_by_id(id)
                .ok_or_else(|| Error::UnknownElement(id.clone()))?;
            page.focus(target);
        }
        Ok(page)
    }
}
