//! Pure mapping from [`ShellState`] to what the page shows.
//!
//! Nothing here is stored between renders; the DOM writer in `web` calls
//! [`render`] after every state change and applies the result wholesale.

use super::{ShellState, Stage};

pub const LOADING_CAPTION: &str = "INITIALIZING SYSTEM...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mood {
    Nominal,
    Fault,
}

impl Mood {
    pub fn of(state: &ShellState) -> Mood {
        if state.error { Mood::Fault } else { Mood::Nominal }
    }

    pub fn theme(self) -> &'static Theme {
        match self {
            Mood::Nominal => &NOMINAL_THEME,
            Mood::Fault => &FAULT_THEME,
        }
    }
}

/// Inline CSS fragments for one mood.
#[derive(Debug, PartialEq)]
pub struct Theme {
    pub page_background: &'static str,
    /// Extra class on the scan-line overlay.
    pub crt_class: Option<&'static str>,
    pub panel: &'static str,
    /// Panel animation (keyframes are injected by the DOM writer).
    pub panel_animation: &'static str,
    pub status_color: &'static str,
    pub heading_color: &'static str,
    pub body_color: &'static str,
    pub indicator: &'static str,
    pub footer: &'static str,
}

static NOMINAL_THEME: Theme = Theme {
    page_background: "#0d0d0d",
    crt_class: None,
    panel: "border:1px solid rgba(0,243,255,0.3); background:rgba(13,13,13,0.8); \
            box-shadow:0 0 30px rgba(0,243,255,0.1);",
    panel_animation: "drs-fade-in 1s ease-out",
    status_color: "rgba(0,243,255,0.7)",
    heading_color: "#ffffff",
    body_color: "#9ca3af",
    indicator: "background:#22c55e; animation:drs-pulse 2s ease-in-out infinite;",
    footer: "opacity:0.3;",
};

static FAULT_THEME: Theme = Theme {
    page_background: "#1a0000",
    crt_class: Some("crt-error"),
    panel: "border:1px solid #dc2626; background:rgba(127,29,29,0.1); \
            box-shadow:0 0 50px rgba(255,0,0,0.4);",
    panel_animation: "drs-shake 0.5s linear infinite",
    status_color: "#ef4444",
    heading_color: "#dc2626",
    body_color: "rgba(248,113,113,0.6)",
    indicator: "background:#dc2626; animation:drs-ping 1s cubic-bezier(0,0,0.2,1) infinite;",
    footer: "color:#ef4444; font-weight:bold;",
};

#[derive(Clone, Debug, PartialEq)]
pub struct LoadingOverlay {
    /// Clamped to 100.
    pub percent: u32,
    /// Progress bar width in `[0, 1]`.
    pub bar_fill: f64,
    /// 0.0 while fading out, 1.0 otherwise. The CSS transition animates it.
    pub opacity: f64,
}

impl LoadingOverlay {
    pub fn caption(&self) -> String {
        format!("{LOADING_CAPTION} {}%", self.percent)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContentPanel {
    pub mood: Mood,
    pub status: &'static str,
    /// Shown as the glitch title; mirrored into its `data-text` attribute.
    pub heading: &'static str,
    pub body: &'static str,
    pub footer: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub enum View {
    Loading(LoadingOverlay),
    Content(ContentPanel),
}

/// Page-level presentation: chrome that follows the error flag in every stage,
/// plus the stage-specific view.
#[derive(Clone, Debug, PartialEq)]
pub struct Screen {
    pub mood: Mood,
    pub view: View,
}

pub mod copy {
    pub const STATUS_NOMINAL: &str = "[ СТАТУС: ИНИЦИАЛИЗАЦИЯ ОБЪЕКТА... ]";
    pub const STATUS_FAULT: &str = "[ СИСТЕМА: КРИТИЧЕСКИЙ СБОЙ ]";
    pub const HEADING_NOMINAL: &str = "ПРОГРУЖАЕМ РЕАЛЬНОСТЬ. 99%";
    pub const HEADING_FAULT: &str = "РЕАЛЬНОСТЬ ПОВРЕЖДЕНА";
    pub const BODY_FIRST_RUN: &str = "«Мы калибруем лазеры и настраиваем подачу неона. Совсем скоро \
        границы между цифровой моделью и осязаемым артефактом сотрутся окончательно. В лаборатории \
        «ВНЕ РАМОК» идет финальная стадия сборки».";
    pub const BODY_RECOVERED: &str =
        "Настраиваем загрузку из нематериального в материальное. Ждите...";
    pub const BODY_FAULT: &str = "Обнаружена десинхронизация потоков. Процесс материализации \
        прерван. Ожидайте автоматического восстановления системы.";
    pub const FOOTER_NOMINAL: &str = "Entropy Status: Increasing...";
    pub const FOOTER_FAULT: &str = "FATAL ERROR: ENTROPY OVERFLOW";
}

pub fn render(state: &ShellState) -> Screen {
    let view = match state.stage {
        Stage::Loading | Stage::Fading => View::Loading(loading_overlay(state)),
        Stage::Content => View::Content(content_panel(state)),
    };
    Screen { mood: Mood::of(state), view }
}

fn loading_overlay(state: &ShellState) -> LoadingOverlay {
    let percent = state.display_percent();
    LoadingOverlay {
        percent,
        bar_fill: f64::from(percent) / 100.0,
        opacity: if state.stage == Stage::Fading { 0.0 } else { 1.0 },
    }
}

fn content_panel(state: &ShellState) -> ContentPanel {
    match (state.error, state.recovered) {
        (true, _) => ContentPanel {
            mood: Mood::Fault,
            status: copy::STATUS_FAULT,
            heading: copy::HEADING_FAULT,
            body: copy::BODY_FAULT,
            footer: copy::FOOTER_FAULT,
        },
        (false, recovered) => ContentPanel {
            mood: Mood::Nominal,
            status: copy::STATUS_NOMINAL,
            heading: copy::HEADING_NOMINAL,
            body: if recovered { copy::BODY_RECOVERED } else { copy::BODY_FIRST_RUN },
            footer: copy::FOOTER_NOMINAL,
        },
    }
}
