use std::{sync::Arc, time::Duration};

use bilihelper_page::{Element, PageView};
use tokio::time;

use crate::{
    WaitError, WaitHandle, WaitState, test_support::*, wait_for_element,
};

fn view(page: &bilihelper_page::Page) -> Arc<dyn PageView> {
    Arc::new(page.clone())
}

#[tokio::test(start_paused = true)]
async fn present_element_resolves_without_observer() {
    let page = blank_page();
    let target = add(&page, page.body(), Element::new("div").with_class("ready"));
    let mut handle = WaitHandle::begin(view(&page), ".ready", None, None).unwrap();
    assert_eq!(handle.state(), WaitState::Resolved);
    assert_eq!(handle.wait().await.unwrap(), target);
    assert_eq!(page.observer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn late_element_resolves_and_observer_is_removed() {
    let page = blank_page();
    let v = view(&page);
    let task = tokio::spawn(async move { wait_for_element(&v, ".late", None, None).await });
    settle().await;
    assert_eq!(page.observer_count(), 1);

    let target = add(&page, page.body(), Element::new("p").with_class("late"));
    assert_eq!(task.await.unwrap().unwrap(), target);
    assert_eq!(page.observer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn attribute_change_can_satisfy_a_wait() {
    let page = blank_page();
    let button = add(&page, page.body(), Element::new("button"));
    let v = view(&page);
    let task =
        tokio::spawn(async move { wait_for_element(&v, "button.ready", None, None).await });
    settle().await;
    page.set_attr(button, "class", "ready");
    assert_eq!(task.await.unwrap().unwrap(), button);
}

#[tokio::test(start_paused = true)]
async fn missing_root_fails_without_observer() {
    let page = blank_page();
    let err = wait_for_element(&view(&page), ".x", Some("#player"), None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        WaitError::RootNotFound {
            root: "#player".into()
        }
    );
    assert_eq!(page.observer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn changes_outside_the_root_are_ignored() {
    let page = blank_page();
    let player = add(&page, page.body(), Element::new("div").with_id("player"));
    let v = view(&page);
    let task = tokio::spawn(async move {
        wait_for_element(&v, ".btn", Some("#player"), None).await
    });
    settle().await;

    add(&page, page.body(), Element::new("a").with_class("btn"));
    settle().await;
    assert!(!task.is_finished());

    let inside = add(&page, player, Element::new("a").with_class("btn"));
    assert_eq!(task.await.unwrap().unwrap(), inside);
}

#[tokio::test(start_paused = true)]
async fn timeout_abandons_and_tears_down() {
    let page = blank_page();
    let mut handle = WaitHandle::begin(
        view(&page),
        ".never",
        None,
        Some(Duration::from_millis(500)),
    )
    .unwrap();
    assert_eq!(handle.state(), WaitState::Pending);

    let started = time::Instant::now();
    let err = handle.wait().await.unwrap_err();
    assert!(started.elapsed() >= Duration::from_millis(500));
    match err {
        WaitError::Abandoned { target, root, .. } => {
            assert_eq!(target, ".never");
            assert_eq!(root, "body");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(handle.state(), WaitState::Abandoned);
    assert_eq!(page.observer_count(), 0);

    // Abandonment is terminal even if the element shows up afterwards.
    add(&page, page.body(), Element::new("div").with_class("never"));
    assert!(matches!(
        handle.wait().await,
        Err(WaitError::Abandoned { .. })
    ));
    assert_eq!(handle.state(), WaitState::Abandoned);
}

#[tokio::test(start_paused = true)]
async fn element_before_timeout_wins() {
    let page = blank_page();
    let v = view(&page);
    let task = tokio::spawn(async move {
        wait_for_element(&v, ".soon", None, Some(Duration::from_secs(5))).await
    });
    time::sleep(Duration::from_secs(1)).await;
    let node = add(&page, page.body(), Element::new("i").with_class("soon"));
    assert_eq!(task.await.unwrap().unwrap(), node);
}

#[tokio::test(start_paused = true)]
async fn closing_the_page_detaches() {
    let page = blank_page();
    let v = view(&page);
    let task = tokio::spawn(async move { wait_for_element(&v, ".x", None, None).await });
    settle().await;
    page.close();
    assert_eq!(
        task.await.unwrap().unwrap_err(),
        WaitError::Detached { target: ".x".into() }
    );
}

#[tokio::test(start_paused = true)]
async fn bad_selector_is_reported() {
    let page = blank_page();
    let err = wait_for_element(&view(&page), "div[", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, WaitError::Selector(_)));
    assert_eq!(page.observer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn concurrent_waits_have_their_own_observers() {
    let page = blank_page();
    let (a, b) = (view(&page), view(&page));
    let first = tokio::spawn(async move { wait_for_element(&a, ".a", None, None).await });
    let second = tokio::spawn(async move { wait_for_element(&b, ".b", None, None).await });
    settle().await;
    assert_eq!(page.observer_count(), 2);

    add(&page, page.body(), Element::new("div").with_class("a"));
    first.await.unwrap().unwrap();
    settle().await;
    assert_eq!(page.observer_count(), 1);
    assert!(!second.is_finished());

    add(&page, page.body(), Element::new("div").with_class("b"));
    second.await.unwrap().unwrap();
    assert_eq!(page.observer_count(), 0);
}
