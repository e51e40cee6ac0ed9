//! In-memory document: element arena, focus, clicks, and change notification.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::{
    error::SelectorError,
    events::{DEFAULT_EVENT_CAPACITY, EventCursor, EventFilter, EventHub},
    selector::{ElementTree, SelectorList},
    view::PageView,
};

/// Stable identifier of an element within one [`Page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Input types that accept free text.
const TEXT_INPUT_TYPES: &[&str] = &["text", "search", "email", "url", "tel", "password", "number"];

/// Element data: tag, attributes, and checked state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercased tag name.
    tag: String,
    /// Attributes keyed by lowercased name.
    attrs: BTreeMap<String, String>,
    /// Checkbox/radio state.
    checked: bool,
}

impl Element {
    /// New element with no attributes.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            checked: false,
        }
    }

    /// Set the `id` attribute.
    #[must_use]
    pub fn with_id(self, id: &str) -> Self {
        self.with_attr("id", id)
    }

    /// Append a class to the `class` attribute.
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        let merged = match self.attrs.get("class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.attrs.insert("class".into(), merged);
        self
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Set the checked state.
    #[must_use]
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Class names from the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Checked state.
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// True for controls that take typed text: `textarea`, editable content, and
    /// `input` elements of a text-like type.
    pub fn is_text_entry(&self) -> bool {
        if self
            .attr("contenteditable")
            .is_some_and(|v| v.is_empty() || v.eq_ignore_ascii_case("true"))
        {
            return true;
        }
        match self.tag.as_str() {
            "textarea" => true,
            "input" => match self.attr("type") {
                None => true,
                Some(ty) => TEXT_INPUT_TYPES.iter().any(|t| ty.eq_ignore_ascii_case(t)),
            },
            _ => false,
        }
    }

    /// True for checkbox and radio inputs.
    fn is_toggle(&self) -> bool {
        self.tag == "input"
            && self
                .attr("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("checkbox") || t.eq_ignore_ascii_case("radio"))
    }
}

/// What changed in a mutation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// Children were added to or removed from the target.
    ChildList,
    /// The named attribute (or `checked` state) changed on the target.
    Attribute(String),
}

/// One change notification.
#[derive(Debug, Clone)]
pub struct Mutation {
    /// Node whose children or attributes changed.
    pub target: NodeId,
    /// Kind of change.
    pub kind: MutationKind,
    /// `target` followed by its ancestors up to the document element.
    path: Vec<NodeId>,
}

impl Mutation {
    /// True when the change happened at or below `root`.
    pub fn within(&self, root: NodeId) -> bool {
        self.path.contains(&root)
    }
}

/// A keystroke delivered to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Key string as reported by the browser (`"d"`, `"Enter"`, ...).
    pub key: String,
    /// Focus was on a text-entry element when the key was pressed.
    pub in_text_entry: bool,
}

/// Arena slot.
#[derive(Debug)]
struct Node {
    /// Parent element, `None` for the document element.
    parent: Option<NodeId>,
    /// Children in document order.
    children: Vec<NodeId>,
    /// Element data.
    element: Element,
    /// Number of activations received.
    clicks: usize,
}

/// Mutable document state.
#[derive(Debug)]
struct Dom {
    /// Element arena.
    nodes: HashMap<NodeId, Node>,
    /// Next id to hand out.
    next: u64,
    /// The `html` element.
    root: NodeId,
    /// The `body` element.
    body: NodeId,
    /// Focused element.
    focused: Option<NodeId>,
    /// Location of the document.
    url: String,
}

impl ElementTree for Dom {
    fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(&node).map(|n| &n.element)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }
}

impl Dom {
    /// Fresh `html > (head, body)` document.
    fn new(url: &str) -> Self {
        let mut dom = Self {
            nodes: HashMap::new(),
            next: 0,
            root: NodeId(0),
            body: NodeId(0),
            focused: None,
            url: url.to_string(),
        };
        let root = dom.alloc(None, Element::new("html"));
        dom.root = root;
        let _head = dom.attach(root, Element::new("head"));
        dom.body = dom.attach(root, Element::new("body"));
        dom
    }

    /// Allocate a detached node.
    fn alloc(&mut self, parent: Option<NodeId>, element: Element) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        self.nodes.insert(
            id,
            Node {
                parent,
                children: Vec::new(),
                element,
                clicks: 0,
            },
        );
        id
    }

    /// Allocate a node as the last child of `parent` (which must exist).
    fn attach(&mut self, parent: NodeId, element: Element) -> NodeId {
        let id = self.alloc(Some(parent), element);
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        id
    }

    /// `node` followed by its ancestors.
    fn path(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = vec![node];
        let mut cur = self.parent(node);
        while let Some(p) = cur {
            path.push(p);
            cur = self.parent(p);
        }
        path
    }

    /// Elements in document order under `scope` (exclusive), or the whole document.
    fn document_order(&self, scope: Option<NodeId>) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match scope {
            None => vec![self.root],
            Some(s) => match self.nodes.get(&s) {
                Some(n) => n.children.iter().rev().copied().collect(),
                None => Vec::new(),
            },
        };
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(n) = self.nodes.get(&id) {
                stack.extend(n.children.iter().rev().copied());
            }
        }
        out
    }

    /// Detach and drop the subtree at `node`.
    fn remove(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let doomed = {
            let mut all = self.document_order(Some(node));
            all.push(node);
            all
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|c| *c != node);
        }
        for id in &doomed {
            self.nodes.remove(id);
        }
        if self.focused.is_some_and(|f| doomed.contains(&f)) {
            self.focused = None;
        }
        Some(parent)
    }
}

/// Shared page state.
struct PageInner {
    /// Document tree.
    dom: Mutex<Dom>,
    /// Subtree change observers.
    mutations: EventHub<Mutation>,
    /// Keystroke listeners.
    keys: EventHub<KeyEvent>,
}

/// Handle to an in-memory document. Clones share the same document.
#[derive(Clone)]
pub struct Page {
    /// Shared state.
    inner: Arc<PageInner>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dom = self.inner.dom.lock();
        f.debug_struct("Page")
            .field("url", &dom.url)
            .field("nodes", &dom.nodes.len())
            .finish_non_exhaustive()
    }
}

impl Page {
    /// Create an empty document at `url`.
    pub fn new(url: &str) -> Self {
        Self {
            inner: Arc::new(PageInner {
                dom: Mutex::new(Dom::new(url)),
                mutations: EventHub::new(DEFAULT_EVENT_CAPACITY),
                keys: EventHub::new(DEFAULT_EVENT_CAPACITY),
            }),
        }
    }

    /// The `html` element.
    pub fn document_element(&self) -> NodeId {
        self.inner.dom.lock().root
    }

    /// The `body` element.
    pub fn body(&self) -> NodeId {
        self.inner.dom.lock().body
    }

    /// Navigate (in place) to `url`.
    pub fn set_url(&self, url: &str) {
        self.inner.dom.lock().url = url.to_string();
    }

    /// Append `element` as the last child of `parent`.
    pub fn append(&self, parent: NodeId, element: Element) -> Option<NodeId> {
        let (id, path) = {
            let mut dom = self.inner.dom.lock();
            if !dom.nodes.contains_key(&parent) {
                return None;
            }
            let id = dom.attach(parent, element);
            (id, dom.path(parent))
        };
        trace!(node = %id, parent = %parent, "append");
        self.publish(parent, MutationKind::ChildList, path);
        Some(id)
    }

    /// Remove `node` and its subtree. The document element cannot be removed.
    pub fn remove(&self, node: NodeId) -> bool {
        let (parent, path) = {
            let mut dom = self.inner.dom.lock();
            let Some(parent) = dom.remove(node) else {
                return false;
            };
            (parent, dom.path(parent))
        };
        self.publish(parent, MutationKind::ChildList, path);
        true
    }

    /// Set (or replace) an attribute on `node`.
    pub fn set_attr(&self, node: NodeId, name: &str, value: &str) -> bool {
        let name = name.to_ascii_lowercase();
        let path = {
            let mut dom = self.inner.dom.lock();
            let Some(n) = dom.nodes.get_mut(&node) else {
                return false;
            };
            n.element.attrs.insert(name.clone(), value.to_string());
            dom.path(node)
        };
        self.publish(node, MutationKind::Attribute(name), path);
        true
    }

    /// Set the checked state of `node` without counting a click.
    pub fn set_checked(&self, node: NodeId, checked: bool) -> bool {
        let path = {
            let mut dom = self.inner.dom.lock();
            let Some(n) = dom.nodes.get_mut(&node) else {
                return false;
            };
            n.element.checked = checked;
            dom.path(node)
        };
        self.publish(node, MutationKind::Attribute("checked".into()), path);
        true
    }

    /// Move focus to `node`.
    pub fn focus(&self, node: NodeId) -> bool {
        let mut dom = self.inner.dom.lock();
        if !dom.nodes.contains_key(&node) {
            return false;
        }
        dom.focused = Some(node);
        true
    }

    /// Clear focus (back to the body).
    pub fn blur(&self) {
        self.inner.dom.lock().focused = None;
    }

    /// Deliver a keystroke to all key listeners.
    pub fn press_key(&self, key: &str) {
        let in_text_entry = {
            let dom = self.inner.dom.lock();
            dom.focused
                .and_then(|f| dom.element(f))
                .is_some_and(Element::is_text_entry)
        };
        debug!(key, in_text_entry, "keypress");
        self.inner.keys.publish(&KeyEvent {
            key: key.to_string(),
            in_text_entry,
        });
    }

    /// Snapshot of an element.
    pub fn element(&self, node: NodeId) -> Option<Element> {
        self.inner.dom.lock().element(node).cloned()
    }

    /// Checked state of `node`; `false` when it does not exist.
    pub fn is_checked(&self, node: NodeId) -> bool {
        self.inner
            .dom
            .lock()
            .element(node)
            .is_some_and(Element::is_checked)
    }

    /// Number of activations `node` has received.
    pub fn clicks(&self, node: NodeId) -> usize {
        self.inner.dom.lock().nodes.get(&node).map_or(0, |n| n.clicks)
    }

    /// All elements matching `selector` under `scope`, in document order.
    pub fn query_all(
        &self,
        scope: Option<NodeId>,
        selector: &str,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        let dom = self.inner.dom.lock();
        Ok(dom
            .document_order(scope)
            .into_iter()
            .filter(|id| list.matches(&*dom, *id))
            .collect())
    }

    /// Every element in document order, with its data and click count.
    pub fn elements(&self) -> Vec<(NodeId, Element, usize)> {
        let dom = self.inner.dom.lock();
        dom.document_order(None)
            .into_iter()
            .filter_map(|id| dom.nodes.get(&id).map(|n| (id, n.element.clone(), n.clicks)))
            .collect()
    }

    /// First element whose `id` attribute is `id`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|(_, element, _)| element.id() == Some(id))
            .map(|(node, _, _)| node)
    }

    /// Number of live subtree observers.
    pub fn observer_count(&self) -> usize {
        self.inner.mutations.live()
    }

    /// Number of live key listeners.
    pub fn key_listener_count(&self) -> usize {
        self.inner.keys.live()
    }

    /// Unload the document: every observer and key listener stream closes.
    pub fn close(&self) {
        debug!("page closed");
        self.inner.mutations.close_all();
        self.inner.keys.close_all();
    }

    /// Notify observers of a change at `target`.
    fn publish(&self, target: NodeId, kind: MutationKind, path: Vec<NodeId>) {
        self.inner
            .mutations
            .publish(&Mutation { target, kind, path });
    }
}

impl PageView for Page {
    fn url(&self) -> String {
        self.inner.dom.lock().url.clone()
    }

    fn query(&self, scope: Option<NodeId>, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        let dom = self.inner.dom.lock();
        Ok(dom
            .document_order(scope)
            .into_iter()
            .find(|id| list.matches(&*dom, *id)))
    }

    fn observe(&self, root: NodeId) -> EventCursor<Mutation> {
        let filter: EventFilter<Mutation> = Arc::new(move |m: &Mutation| m.within(root));
        self.inner.mutations.subscribe(Some(filter))
    }

    fn listen_keys(&self) -> EventCursor<KeyEvent> {
        self.inner.keys.subscribe(None)
    }

    fn click(&self, node: NodeId) -> bool {
        let toggled = {
            let mut dom = self.inner.dom.lock();
            let Some(n) = dom.nodes.get_mut(&node) else {
                return false;
            };
            if n.element.attr("disabled").is_some() {
                return false;
            }
            n.clicks += 1;
            if n.element.is_toggle() {
                let is_radio = n.element.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("radio"));
                n.element.checked = if is_radio { true } else { !n.element.checked };
                Some(dom.path(node))
            } else {
                None
            }
        };
        trace!(node = %node, "click");
        if let Some(path) = toggled {
            self.publish(node, MutationKind::Attribute("checked".into()), path);
        }
        true
    }

    fn active_element(&self) -> Option<Element> {
        let dom = self.inner.dom.lock();
        dom.focused.and_then(|f| dom.element(f).cloned())
    }
}
