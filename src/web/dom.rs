// DOM nodes of the splash page and the writer that applies a `Screen` to them.
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

use crate::shell::view::{Screen, View};

pub const ROOT_ID: &str = "drs-root";

// Keyframes and the scan-line overlay referenced by the inline styles.
const PAGE_CSS: &str = "
.crt-overlay { position:fixed; inset:0; pointer-events:none; z-index:50;
  background:linear-gradient(rgba(18,16,16,0) 50%, rgba(0,0,0,0.25) 50%);
  background-size:100% 4px; }
.crt-overlay.crt-error { background:linear-gradient(rgba(60,0,0,0) 50%, rgba(80,0,0,0.35) 50%);
  background-size:100% 3px; }
#drs-heading { position:relative; }
#drs-heading::after { content:attr(data-text); position:absolute; left:2px; top:0;
  opacity:0.35; color:#00f3ff; clip-path:inset(0 0 55% 0); }
@keyframes drs-fade-in { from { opacity:0; transform:translateY(8px); } to { opacity:1; transform:none; } }
@keyframes drs-shake { 0%,100% { transform:translate(0,0); } 25% { transform:translate(-2px,1px); }
  50% { transform:translate(2px,-1px); } 75% { transform:translate(-1px,-2px); } }
@keyframes drs-pulse { 50% { opacity:0.4; } }
@keyframes drs-ping { 75%,100% { transform:scale(2); opacity:0; } }
";

const ROOT_STYLE: &str = "position:relative; min-height:100vh; overflow:hidden; \
    font-family:'Fira Code', monospace; color:#a0a0a0; transition:background-color 1s;";
const OVERLAY_STYLE: &str = "position:fixed; inset:0; z-index:100; display:flex; \
    flex-direction:column; align-items:center; justify-content:center; background:#0d0d0d; \
    transition:opacity 0.5s;";
const CAPTION_STYLE: &str = "color:#00f3ff; font-size:14px; letter-spacing:0.3em; \
    margin-bottom:16px; text-transform:uppercase;";
const TRACK_STYLE: &str =
    "width:256px; height:1px; background:rgba(255,255,255,0.1); position:relative; overflow:hidden;";
const BAR_STYLE: &str = "position:absolute; top:0; left:0; height:100%; width:0%; \
    background:#00f3ff; box-shadow:0 0 10px #00f3ff; transition:all 0.2s;";
const CONTENT_STYLE: &str = "position:relative; z-index:10; min-height:100vh; display:none; \
    align-items:center; justify-content:center; padding:24px;";
const PANEL_BASE: &str =
    "width:100%; max-width:896px; padding:64px; backdrop-filter:blur(12px); transition:all 0.5s;";

/// Handles to every node the writer touches.
pub struct Page {
    root: HtmlElement,
    style: HtmlElement,
    crt: HtmlElement,
    overlay: HtmlElement,
    caption: HtmlElement,
    bar: HtmlElement,
    content: HtmlElement,
    panel: HtmlElement,
    status: HtmlElement,
    heading: HtmlElement,
    body: HtmlElement,
    indicator: HtmlElement,
    footer: HtmlElement,
}

fn element(doc: &Document, tag: &str, id: &str, style: &str) -> Result<HtmlElement, JsValue> {
    let el: HtmlElement = doc.create_element(tag)?.dyn_into()?;
    el.set_id(id);
    if !style.is_empty() {
        el.set_attribute("style", style)?;
    }
    Ok(el)
}

impl Page {
    /// Build the splash markup under `<body>`. The rain canvas is mounted
    /// separately into [`Page::root`], under the panels.
    pub fn build(doc: &Document) -> Result<Self, JsValue> {
        let body_el = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;

        let style = element(doc, "style", "drs-style", "")?;
        style.set_text_content(Some(PAGE_CSS));

        let root = element(doc, "div", ROOT_ID, ROOT_STYLE)?;
        let crt = element(doc, "div", "drs-crt", "")?;
        crt.set_class_name("crt-overlay");

        let overlay = element(doc, "div", "drs-loading", OVERLAY_STYLE)?;
        let caption = element(doc, "div", "drs-caption", CAPTION_STYLE)?;
        let track = element(doc, "div", "drs-track", TRACK_STYLE)?;
        let bar = element(doc, "div", "drs-bar", BAR_STYLE)?;
        track.append_child(&bar)?;
        overlay.append_child(&caption)?;
        overlay.append_child(&track)?;

        let content = element(doc, "div", "drs-content", CONTENT_STYLE)?;
        let panel = element(doc, "div", "drs-panel", PANEL_BASE)?;
        let header = element(doc, "header", "drs-header", "margin-bottom:40px;")?;
        let status = element(
            doc,
            "p",
            "drs-status",
            "font-size:12px; letter-spacing:0.4em; text-transform:uppercase;",
        )?;
        header.append_child(&status)?;
        let main = element(doc, "main", "drs-main", "")?;
        let heading = element(doc, "h1", "drs-heading", "")?;
        let body = element(doc, "p", "drs-body", "")?;
        main.append_child(&heading)?;
        main.append_child(&body)?;
        let footer_row = element(
            doc,
            "footer",
            "drs-footer-row",
            "margin-top:48px; display:flex; align-items:center; gap:16px;",
        )?;
        let indicator = element(doc, "div", "drs-indicator", "")?;
        let footer = element(doc, "span", "drs-footer", "")?;
        footer_row.append_child(&indicator)?;
        footer_row.append_child(&footer)?;
        panel.append_child(&header)?;
        panel.append_child(&main)?;
        panel.append_child(&footer_row)?;
        content.append_child(&panel)?;

        root.append_child(&crt)?;
        root.append_child(&overlay)?;
        root.append_child(&content)?;
        body_el.append_child(&style)?;
        body_el.append_child(&root)?;

        Ok(Self {
            root,
            style,
            crt,
            overlay,
            caption,
            bar,
            content,
            panel,
            status,
            heading,
            body,
            indicator,
            footer,
        })
    }

    pub fn root(&self) -> &HtmlElement {
        &self.root
    }

    pub fn apply(&self, screen: &Screen) -> Result<(), JsValue> {
        let theme = screen.mood.theme();
        self.root.style().set_property("background-color", theme.page_background)?;
        match theme.crt_class {
            Some(class) => self.crt.set_class_name(&format!("crt-overlay {class}")),
            None => self.crt.set_class_name("crt-overlay"),
        }

        match &screen.view {
            View::Loading(overlay) => {
                self.content.style().set_property("display", "none")?;
                self.overlay.style().set_property("display", "flex")?;
                self.overlay.style().set_property("opacity", &overlay.opacity.to_string())?;
                self.caption.set_text_content(Some(&overlay.caption()));
                self.bar
                    .style()
                    .set_property("width", &format!("{}%", (overlay.bar_fill * 100.0).round()))?;
            }
            View::Content(panel) => {
                self.overlay.style().set_property("display", "none")?;
                self.content.style().set_property("display", "flex")?;
                self.panel.set_attribute(
                    "style",
                    &format!("{PANEL_BASE} {} animation:{};", theme.panel, theme.panel_animation),
                )?;
                self.status.style().set_property("color", theme.status_color)?;
                self.status.set_text_content(Some(panel.status));
                self.heading.set_attribute("data-text", panel.heading)?;
                self.heading.set_attribute(
                    "style",
                    &format!(
                        "font-size:48px; font-weight:bold; margin-bottom:32px; display:inline-block; \
                         cursor:default; color:{};",
                        theme.heading_color
                    ),
                )?;
                self.heading.set_text_content(Some(panel.heading));
                self.body.set_attribute(
                    "style",
                    &format!(
                        "font-size:18px; line-height:1.6; max-width:672px; color:{};",
                        theme.body_color
                    ),
                )?;
                self.body.set_text_content(Some(panel.body));
                self.indicator.set_attribute(
                    "style",
                    &format!("width:8px; height:8px; border-radius:9999px; {}", theme.indicator),
                )?;
                self.footer.set_attribute(
                    "style",
                    &format!(
                        "font-size:10px; letter-spacing:0.2em; text-transform:uppercase; {}",
                        theme.footer
                    ),
                )?;
                self.footer.set_text_content(Some(panel.footer));
            }
        }
        Ok(())
    }

    pub fn remove(&self) {
        self.root.remove();
        self.style.remove();
    }
}
