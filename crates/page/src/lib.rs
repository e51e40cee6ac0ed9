//! Document model for the bilibili helper.
//!
//! - [`PageView`]: the trait the engine drives
//! - [`Page`]: an in-memory document with subtree observers, focus, and clicks
//! - [`SelectorList`]: the CSS subset used to address player controls
//! - [`PageFixture`]: JSON descriptions of pages for the CLI driver

mod error;
mod events;
mod fixture;
mod page;
mod selector;
mod view;

#[cfg(test)]
mod test_selector;

pub use error::{Error, Result, SelectorError};
pub use events::{EventCursor, EventFilter};
pub use fixture::{DeferredNode, NodeFixture, PageFixture};
pub use page::{Element, KeyEvent, Mutation, MutationKind, NodeId, Page};
pub use selector::SelectorList;
pub use view::PageView;
