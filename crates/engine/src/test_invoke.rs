use std::sync::Arc;

use bilihelper_page::{Element, Page, PageView};

use crate::{ActionInvoker, RaceWin, WaitError, test_support::*};

fn invoker(page: &Page) -> ActionInvoker {
    let view: Arc<dyn PageView> = Arc::new(page.clone());
    ActionInvoker::new(view)
}

#[tokio::test]
async fn click_now_hits_present_element_once() {
    let page = blank_page();
    let button = add(&page, page.body(), Element::new("button").with_class("go"));
    let inv = invoker(&page);
    assert_eq!(inv.click_now(".go", None).unwrap(), Some(button));
    assert_eq!(page.clicks(button), 1);
    assert_eq!(page.observer_count(), 0);
}

#[tokio::test]
async fn click_now_misses_without_waiting() {
    let page = blank_page();
    let inv = invoker(&page);
    assert_eq!(inv.click_now(".go", None).unwrap(), None);
    assert_eq!(page.observer_count(), 0);
}

#[tokio::test]
async fn click_now_respects_root() {
    let page = blank_page();
    let outside = add(&page, page.body(), Element::new("a").with_class("close"));
    let inv = invoker(&page);
    assert_eq!(inv.click_now(".close", Some(".dialog")).unwrap(), None);
    assert_eq!(page.clicks(outside), 0);

    let dialog = add(&page, page.body(), Element::new("div").with_class("dialog"));
    let inside = add(&page, dialog, Element::new("a").with_class("close"));
    assert_eq!(inv.click_now(".close", Some(".dialog")).unwrap(), Some(inside));
    assert_eq!(page.clicks(outside), 0);
}

#[tokio::test]
async fn click_now_reports_refused_click() {
    let page = blank_page();
    let button = add(
        &page,
        page.body(),
        Element::new("button").with_attr("disabled", ""),
    );
    assert_eq!(invoker(&page).click_now("button", None).unwrap(), None);
    assert_eq!(page.clicks(button), 0);
}

#[tokio::test]
async fn triggering_a_toggle_twice_toggles_twice() {
    let page = blank_page();
    let check = add(
        &page,
        page.body(),
        Element::new("input").with_attr("type", "checkbox"),
    );
    let inv = invoker(&page);
    inv.click_now("input", None).unwrap();
    assert!(page.is_checked(check));
    inv.click_now("input", None).unwrap();
    assert!(!page.is_checked(check));
    assert_eq!(page.clicks(check), 2);
}

#[tokio::test(start_paused = true)]
async fn click_when_ready_waits_then_clicks() {
    let page = blank_page();
    let inv = invoker(&page);
    let task = tokio::spawn(async move { inv.click_when_ready(".late", None).await });
    settle().await;
    assert_eq!(page.observer_count(), 1);

    let node = add(&page, page.body(), Element::new("span").with_class("late"));
    assert_eq!(task.await.unwrap().unwrap(), node);
    assert_eq!(page.clicks(node), 1);
    assert_eq!(page.observer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn click_when_ready_reports_inert_element() {
    let page = blank_page();
    let node = add(
        &page,
        page.body(),
        Element::new("button").with_attr("disabled", "disabled"),
    );
    let err = invoker(&page)
        .click_when_ready("button", None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        WaitError::Inert {
            target: "button".into(),
            node
        }
    );
}

#[tokio::test(start_paused = true)]
async fn race_prefers_first_present_candidate() {
    let page = blank_page();
    let a = add(&page, page.body(), Element::new("div").with_class("a"));
    let b = add(&page, page.body(), Element::new("div").with_class("b"));
    let win = invoker(&page).race(&[".a", ".b"]).await.unwrap();
    assert_eq!(
        win,
        RaceWin {
            index: 0,
            selector: ".a".into(),
            node: a
        }
    );
    assert_eq!(page.clicks(a), 1);
    assert_eq!(page.clicks(b), 0);
    assert_eq!(page.observer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn race_winner_drops_the_losers() {
    let page = blank_page();
    let inv = invoker(&page);
    let task = tokio::spawn(async move { inv.race(&[".legacy", ".modern"]).await });
    settle().await;
    assert_eq!(page.observer_count(), 2);

    let modern = add(&page, page.body(), Element::new("div").with_class("modern"));
    let win = task.await.unwrap().unwrap();
    assert_eq!(win.index, 1);
    assert_eq!(win.node, modern);
    assert_eq!(page.observer_count(), 0);

    // A late loser is never activated.
    let legacy = add(&page, page.body(), Element::new("div").with_class("legacy"));
    settle().await;
    assert_eq!(page.clicks(legacy), 0);
    assert_eq!(page.clicks(modern), 1);
}

#[tokio::test(start_paused = true)]
async fn race_survives_a_failing_candidate() {
    let page = blank_page();
    let inv = invoker(&page);
    let task = tokio::spawn(async move { inv.race(&["div[", ".ok"]).await });
    settle().await;
    let ok = add(&page, page.body(), Element::new("b").with_class("ok"));
    let win = task.await.unwrap().unwrap();
    assert_eq!((win.index, win.node), (1, ok));
}

#[tokio::test(start_paused = true)]
async fn race_fails_when_every_candidate_fails() {
    let page = blank_page();
    let err = invoker(&page).race(&["[", "div["]).await.unwrap_err();
    match err {
        WaitError::Selector(e) => assert_eq!(e.selector, "div["),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_race_is_rejected() {
    let page = blank_page();
    assert_eq!(
        invoker(&page).race(&[]).await.unwrap_err(),
        WaitError::NoCandidates
    );
}

#[tokio::test(start_paused = true)]
async fn first_present_reports_without_clicking() {
    let page = blank_page();
    let inv = invoker(&page);
    let task = tokio::spawn(async move { inv.first_present(&[".old", ".new"]).await });
    settle().await;
    let new = add(&page, page.body(), Element::new("input").with_class("new"));
    let win = task.await.unwrap().unwrap();
    assert_eq!((win.index, win.node), (1, new));
    assert_eq!(page.clicks(new), 0);
    assert_eq!(page.observer_count(), 0);
}
