//! `run`: bootstrap a page fixture and report what the helper did.

use std::{fmt::Write as _, sync::Arc};

use bilihelper_engine::{Bootstrapper, StartupReport};
use bilihelper_page::{Element, Page, PageFixture, PageView};
use config::ConfigStore;
use tokio::{runtime, time};
use tracing::{info, warn};

use crate::{cli::RunArgs, error::Result};

/// Execute the `run` subcommand on a fresh single-threaded runtime.
pub fn run(args: &RunArgs, store: Arc<ConfigStore>) -> Result<()> {
    let fixture = PageFixture::load(&args.page)?;
    let page = fixture.build()?;
    if let Some(url) = &args.url {
        page.set_url(url);
    }
    let rt = runtime::Builder::new_current_thread().enable_all().build()?;
    let report = rt.block_on(drive(args, &fixture, &page, store));
    print!("{}", render(&page, report.as_ref()));
    Ok(())
}

/// Render deferred nodes on schedule, bootstrap, replay keys, and wait.
async fn drive(
    args: &RunArgs,
    fixture: &PageFixture,
    page: &Page,
    store: Arc<ConfigStore>,
) -> Option<StartupReport> {
    for deferred in fixture.later.iter().cloned() {
        let page = page.clone();
        tokio::spawn(async move {
            time::sleep(deferred.delay()).await;
            if let Err(e) = deferred.insert(&page) {
                warn!(error = %e, "deferred node not inserted");
            }
        });
    }

    let view: Arc<dyn PageView> = Arc::new(page.clone());
    let mut session = Bootstrapper::new(view, store)
        .with_settle_delay(args.settle)
        .run();
    if !session.is_active() {
        info!(url = %page.url(), "page is outside the handled URLs");
    }

    for key in &args.keys {
        page.press_key(key);
        let Some(listener) = session.hotkeys() else {
            continue;
        };
        match time::timeout(args.wait, listener.next_outcome()).await {
            Ok(Some((key, outcome))) => println!("key {key}: {outcome:?}"),
            Ok(None) => break,
            Err(_) => println!("key {key}: still pending after {:?}", args.wait),
        }
    }

    let report = match time::timeout(args.wait, session.startup()).await {
        Ok(report) => Some(report),
        Err(_) => {
            warn!(wait = ?args.wait, "startup did not finish");
            None
        }
    };
    session.shutdown().await;
    report
}

/// Startup outcomes followed by one line per element.
fn render(page: &Page, report: Option<&StartupReport>) -> String {
    let mut out = String::new();
    match report {
        Some(r) => {
            writeln!(out, "danmaku: {:?}", r.danmaku).ok();
            writeln!(out, "screen: {:?}", r.screen).ok();
        }
        None => {
            writeln!(out, "startup: pending").ok();
        }
    }
    for (node, element, clicks) in page.elements() {
        writeln!(
            out,
            "{node} {} checked={} clicks={clicks}",
            describe(&element),
            element.is_checked()
        )
        .ok();
    }
    out
}

/// Compact `tag#id.class` form of an element.
fn describe(element: &Element) -> String {
    let mut s = element.tag().to_string();
    if let Some(id) = element.id() {
        s.push('#');
        s.push_str(id);
    }
    for class in element.classes() {
        s.push('.');
        s.push_str(class);
    }
    s
}
