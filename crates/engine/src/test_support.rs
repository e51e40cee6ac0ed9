//! Test support utilities for engine unit and integration tests.
//! These helpers are public so the `tests/` suite can share them.

use std::{sync::Arc, time::Duration};

use bilihelper_page::{Element, NodeId, Page, PageView};
use config::{ConfigStore, MemoryStorage, STORAGE_KEY};
use tokio::time;

/// A video page URL inside the activation patterns.
pub const VIDEO_URL: &str = "https://www.bilibili.com/video/BV1GJ411x7h7";

/// Handles to the controls of a page built by [`legacy_player`].
pub struct Player {
    /// The document.
    pub page: Page,
    /// Control bar that holds the player buttons.
    pub controls: NodeId,
    /// Danmaku checkbox.
    pub danmaku: NodeId,
    /// Widescreen button.
    pub widescreen: NodeId,
    /// Fullscreen button.
    pub fullscreen: NodeId,
    /// "Add to collection" button.
    pub collect: NodeId,
    /// "Give coins" button.
    pub coin: NodeId,
    /// Site search box.
    pub search: NodeId,
}

impl Player {
    /// The page behind the engine's document seam.
    pub fn view(&self) -> Arc<dyn PageView> {
        Arc::new(self.page.clone())
    }
}

/// A blank page at [`VIDEO_URL`].
pub fn blank_page() -> Page {
    Page::new(VIDEO_URL)
}

/// Append `element` to `parent`, panicking when `parent` is gone.
pub fn add(page: &Page, parent: NodeId, element: Element) -> NodeId {
    page.append(parent, element)
        .unwrap_or_else(|| panic!("parent {parent} missing"))
}

/// A fully rendered legacy player with the danmaku overlay `danmaku_on`.
pub fn legacy_player(danmaku_on: bool) -> Player {
    let page = blank_page();
    let body = page.body();
    let search = add(
        &page,
        body,
        Element::new("input")
            .with_class("nav-search-keyword")
            .with_attr("type", "text"),
    );
    let controls = add(
        &page,
        body,
        Element::new("div").with_class("bilibili-player-video-control"),
    );
    let switch_box = add(
        &page,
        controls,
        Element::new("div").with_class("bilibili-player-video-danmaku-switch"),
    );
    let danmaku = add(
        &page,
        switch_box,
        Element::new("input")
            .with_class("bui-checkbox")
            .with_attr("type", "checkbox")
            .checked(danmaku_on),
    );
    let wide_box = add(
        &page,
        controls,
        Element::new("div").with_class("bilibili-player-video-btn-widescreen"),
    );
    let widescreen = add(
        &page,
        wide_box,
        Element::new("button").with_attr("data-text", "宽屏模式"),
    );
    let full_box = add(
        &page,
        controls,
        Element::new("div").with_class("bilibili-player-video-btn-fullscreen"),
    );
    let fullscreen = add(
        &page,
        full_box,
        Element::new("button").with_attr("data-text", "进入全屏"),
    );
    let toolbar = add(&page, body, Element::new("div").with_class("video-toolbar"));
    let collect = add(
        &page,
        toolbar,
        Element::new("span")
            .with_class("collect")
            .with_attr("title", "添加到收藏"),
    );
    let coin = add(
        &page,
        toolbar,
        Element::new("span")
            .with_class("coin")
            .with_attr("title", "投硬币"),
    );
    Player {
        page,
        controls,
        danmaku,
        widescreen,
        fullscreen,
        collect,
        coin,
        search,
    }
}

/// A store over fresh in-memory storage holding `persisted`, if any.
pub fn store_with(persisted: Option<&str>) -> Arc<ConfigStore> {
    let storage = match persisted {
        Some(text) => MemoryStorage::with_value(STORAGE_KEY, text),
        None => MemoryStorage::new(),
    };
    Arc::new(ConfigStore::load(Arc::new(storage)))
}

/// Let spawned tasks run until they block. Under a paused clock this also
/// advances time past any timer that is due within a millisecond.
pub async fn settle() {
    time::sleep(Duration::from_millis(1)).await;
}
