#[cfg(test)]
mod tests {
    use crate::{Element, Page, SelectorList};

    fn player() -> Page {
        let page = Page::new("https://www.bilibili.com/video/BV1");
        let body = page.body();
        let wrap = page
            .append(body, Element::new("div").with_class("bilibili-player-video-btn-fullscreen"))
            .unwrap();
        page.append(wrap, Element::new("button").with_attr("data-text", "进入全屏"))
            .unwrap();
        page.append(
            body,
            Element::new("input")
                .with_class("bui-checkbox")
                .with_attr("type", "checkbox")
                .checked(true),
        )
        .unwrap();
        page
    }

    #[test]
    fn parses_player_selectors() {
        for sel in [
            "input.bui-checkbox:checked",
            "input.bui-checkbox:not(:checked)",
            r#"button[data-text="宽屏模式"]"#,
            r#"[class*="bili-dialog"] .close"#,
            r#".collect[title*="收藏"]"#,
            ".a > .b, #c",
            "*",
        ] {
            assert!(SelectorList::parse(sel).is_ok(), "{sel}");
        }
    }

    #[test]
    fn rejects_unsupported_syntax() {
        for sel in ["", "div:hover", "[title", "a ~ b", ".", "a,"] {
            let err = SelectorList::parse(sel).unwrap_err();
            assert_eq!(err.selector, sel);
        }
    }

    #[test]
    fn descendant_and_attribute_substring() {
        let page = player();
        let hits = page
            .query_all(
                None,
                r#".bilibili-player-video-btn-fullscreen button[data-text*="全屏"]"#,
            )
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert!(
            page.query_all(None, r#"body > button[data-text*="全屏"]"#)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn checked_and_negation() {
        let page = player();
        let input = page.query_all(None, "input.bui-checkbox").unwrap()[0];
        assert_eq!(
            page.query_all(None, "input.bui-checkbox:checked").unwrap(),
            vec![input]
        );
        assert!(
            page.query_all(None, "input.bui-checkbox:not(:checked)")
                .unwrap()
                .is_empty()
        );
        page.set_checked(input, false);
        assert_eq!(
            page.query_all(None, "input.bui-checkbox:not(:checked)").unwrap(),
            vec![input]
        );
    }

    #[test]
    fn attribute_operators() {
        let page = Page::new("about:blank");
        let body = page.body();
        let el = page
            .append(
                body,
                Element::new("div")
                    .with_attr("lang", "zh-CN")
                    .with_attr("class", "bili-dialog-m mask"),
            )
            .unwrap();
        for sel in [
            "[lang|=zh]",
            "[lang^=zh]",
            "[lang$=CN]",
            "[class~=mask]",
            r#"[class*="dialog"]"#,
            "DIV[lang]",
        ] {
            assert_eq!(page.query_all(None, sel).unwrap(), vec![el], "{sel}");
        }
        assert!(page.query_all(None, "[class~=dialog]").unwrap().is_empty());
        assert!(page.query_all(None, "[lang^='']").unwrap().is_empty());
    }
}
