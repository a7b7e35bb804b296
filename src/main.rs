//! Cyberspace Hub entry point
//!
//! On the web, detects which page is loaded (Games Verse catalog or the
//! CyberSpace landing page) and wires it up. Natively, plays a headless demo
//! session so the engines can be exercised from a terminal.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_shared {
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element};

    use cyberspace_hub::notify::NotificationKind;

    pub fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    /// Look up a required element
    pub fn element(document: &Document, id: &str) -> Result<Element, String> {
        document
            .get_element_by_id(id)
            .ok_or_else(|| format!("missing #{}", id))
    }

    pub fn js_err(err: JsValue) -> String {
        format!("{:?}", err)
    }

    pub fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    pub fn on_click(
        target: &web_sys::EventTarget,
        handler: impl FnMut(web_sys::MouseEvent) + 'static,
    ) -> Result<(), String> {
        let closure = Closure::<dyn FnMut(_)>::new(handler);
        target
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            .map_err(js_err)?;
        closure.forget();
        Ok(())
    }

    /// Append a toast to the page and return it
    pub fn toast_element(
        document: &Document,
        id: Option<u64>,
        kind: NotificationKind,
        message: &str,
    ) -> Option<Element> {
        let toast = document.create_element("div").ok()?;
        toast.set_class_name(&format!("notification {}", kind.css_class()));
        if let Some(id) = id {
            toast.set_id(&format!("toast-{}", id));
        }
        toast.set_inner_html(&format!(
            r#"<div class="notification-icon">{}</div><div class="notification-content"><div class="notification-message">{}</div></div>"#,
            kind.icon(),
            cyberspace_hub::catalog::render::escape_html(message),
        ));
        document.body()?.append_child(&toast).ok()?;
        Some(toast)
    }

    /// Slide a toast out, then remove it
    pub fn dismiss_toast(toast: Element) {
        let _ = toast.class_list().add_1("slide-out");
        let closure = Closure::once(move || toast.remove());
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                300,
            );
        }
        closure.forget();
    }

    /// Fire-and-forget toast used by the catalog page
    pub fn show_toast(kind: NotificationKind, message: &str, duration_ms: i32) {
        let Some(document) = document() else { return };
        let Some(toast) = toast_element(&document, None, kind, message) else {
            return;
        };
        let closure = Closure::once(move || dismiss_toast(toast));
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                duration_ms,
            );
        }
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
mod catalog_page {
    use std::rc::Rc;

    use js_sys::{Array, Function, Reflect};
    use wasm_bindgen::prelude::*;
    use web_sys::Document;

    use cyberspace_hub::catalog::host::{self, SHARE_TEXT};
    use cyberspace_hub::catalog::{
        self, APP_BUILD, APP_VERSION, GAMES, HostBridge, LaunchRoute, ShareRoute, Theme,
        UserProfile, render, theme,
    };
    use cyberspace_hub::notify::NotificationKind;
    use cyberspace_hub::platform::{LocalStore, now_ms};

    use crate::web_shared::{element, js_err, on_click, set_text, show_toast};

    /// `window.Telegram.WebApp`
    struct TelegramHost {
        web_app: JsValue,
    }

    impl TelegramHost {
        fn detect() -> Option<Self> {
            let window = web_sys::window()?;
            let telegram = Reflect::get(&window, &"Telegram".into()).ok()?;
            if telegram.is_undefined() || telegram.is_null() {
                return None;
            }
            let web_app = Reflect::get(&telegram, &"WebApp".into()).ok()?;
            if web_app.is_undefined() || web_app.is_null() {
                return None;
            }
            Some(Self { web_app })
        }

        fn call(&self, method: &str, args: &[JsValue]) {
            let func = Reflect::get(&self.web_app, &method.into())
                .ok()
                .and_then(|f| f.dyn_into::<Function>().ok());
            let Some(func) = func else {
                log::warn!("Host method {} unavailable", method);
                return;
            };
            let argv: Array = args.iter().collect();
            if let Err(e) = func.apply(&self.web_app, &argv) {
                log::warn!("Host method {} failed: {:?}", method, e);
            }
        }
    }

    impl HostBridge for TelegramHost {
        fn open_link(&self, url: &str) {
            self.call("openLink", &[url.into()]);
        }

        fn share_url(&self, url: &str, text: &str) {
            self.call("shareUrl", &[url.into(), text.into()]);
        }

        fn expand(&self) {
            self.call("expand", &[]);
        }

        fn ready(&self) {
            self.call("ready", &[]);
        }

        fn enable_closing_confirmation(&self) {
            self.call("enableClosingConfirmation", &[]);
        }

        fn user(&self) -> Option<UserProfile> {
            let init = Reflect::get(&self.web_app, &"initDataUnsafe".into()).ok()?;
            let user = Reflect::get(&init, &"user".into()).ok()?;
            if user.is_undefined() || user.is_null() {
                return None;
            }
            let json = js_sys::JSON::stringify(&user).ok()?.as_string()?;
            serde_json::from_str(&json).ok()
        }
    }

    fn as_bridge(host: &Option<Rc<TelegramHost>>) -> Option<&dyn HostBridge> {
        host.as_deref().map(|h| h as &dyn HostBridge)
    }

    fn open_game(host: &Option<Rc<TelegramHost>>, url: &str) {
        match host::launch_route(as_bridge(host)) {
            LaunchRoute::Host => {
                if let Some(h) = host {
                    h.open_link(url);
                }
            }
            LaunchRoute::NewTab => {
                if let Some(window) = web_sys::window() {
                    let _ = window.open_with_url_and_target_and_features(
                        url,
                        "_blank",
                        "noopener,noreferrer",
                    );
                }
            }
        }
    }

    fn share_app(host: &Option<Rc<TelegramHost>>) {
        let Some(window) = web_sys::window() else { return };
        let url = window.location().href().unwrap_or_default();
        let navigator = window.navigator();
        let native_share = Reflect::has(&navigator, &"share".into()).unwrap_or(false);

        match host::share_route(as_bridge(host), native_share) {
            ShareRoute::Host => {
                if let Some(h) = host {
                    h.share_url(&url, SHARE_TEXT);
                }
            }
            ShareRoute::NativeShare => {
                let data = js_sys::Object::new();
                let _ = Reflect::set(&data, &"title".into(), &"Games Verse".into());
                let _ = Reflect::set(&data, &"text".into(), &SHARE_TEXT.into());
                let _ = Reflect::set(&data, &"url".into(), &url.as_str().into());
                if let Ok(share) = Reflect::get(&navigator, &"share".into())
                    .and_then(|f| f.dyn_into::<Function>().map_err(JsValue::from))
                {
                    // User cancelling the sheet rejects the promise; nothing to do
                    let _ = share.call1(&navigator, &data);
                }
            }
            ShareRoute::Clipboard => {
                let promise = Reflect::get(&navigator, &"clipboard".into())
                    .and_then(|clipboard| {
                        let write = Reflect::get(&clipboard, &"writeText".into())?
                            .dyn_into::<Function>()
                            .map_err(JsValue::from)?;
                        write.call1(&clipboard, &url.as_str().into())
                    })
                    .and_then(|p| p.dyn_into::<js_sys::Promise>().map_err(JsValue::from));
                let Ok(promise) = promise else {
                    log::warn!("Clipboard unavailable");
                    return;
                };
                wasm_bindgen_futures::spawn_local(async move {
                    if wasm_bindgen_futures::JsFuture::from(promise).await.is_ok() {
                        show_toast(NotificationKind::Success, "Ссылка скопирована в буфер!", 3000);
                    }
                });
            }
        }
    }

    fn setup_navigation(document: &Document) -> Result<(), String> {
        let items = document.query_selector_all(".nav-item").map_err(js_err)?;
        for i in 0..items.length() {
            let Some(item) = items.get(i).and_then(|n| n.dyn_into::<web_sys::Element>().ok())
            else {
                continue;
            };
            let clicked = item.clone();
            on_click(&item, move |_| {
                let Some(document) = crate::web_shared::document() else { return };
                let target = clicked.get_attribute("data-section").unwrap_or_default();
                if let Ok(navs) = document.query_selector_all(".nav-item") {
                    for j in 0..navs.length() {
                        if let Some(nav) =
                            navs.get(j).and_then(|n| n.dyn_into::<web_sys::Element>().ok())
                        {
                            let _ = nav.class_list().remove_1("active");
                        }
                    }
                }
                let _ = clicked.class_list().add_1("active");
                if let Ok(sections) = document.query_selector_all(".content-section") {
                    for j in 0..sections.length() {
                        if let Some(section) =
                            sections.get(j).and_then(|n| n.dyn_into::<web_sys::Element>().ok())
                        {
                            let _ = section
                                .class_list()
                                .toggle_with_force("active", section.id() == target);
                        }
                    }
                }
            })?;
        }
        Ok(())
    }

    fn update_profile(document: &Document, user: &UserProfile) -> Result<(), String> {
        element(document, "tg-name")?.set_text_content(Some(user.display_name()));
        element(document, "tg-username")?.set_text_content(Some(&user.handle()));
        if let Some(photo) = user.photo_url.as_deref().filter(|p| !p.is_empty()) {
            element(document, "tg-avatar")?.set_inner_html(&format!(
                r#"<img src="{}" alt="{}" style="width: 100%; height: 100%; border-radius: 50%;">"#,
                render::escape_html(photo),
                render::escape_html(user.display_name()),
            ));
        }
        Ok(())
    }

    fn apply_theme(document: &Document, theme: Theme) {
        if let Some(root) = document.document_element() {
            let _ = root.set_attribute("data-theme", theme.as_str());
        }
        let (icon, text) = theme.button_label();
        if let Ok(Some(el)) = document.query_selector("#theme-toggle .theme-icon") {
            el.set_text_content(Some(icon));
        }
        if let Ok(Some(el)) = document.query_selector("#theme-toggle .theme-text") {
            el.set_text_content(Some(text));
        }
    }

    fn setup_theme(document: &Document) -> Result<(), String> {
        let toggle = element(document, "theme-toggle")?;
        let store = LocalStore::open().map_err(|e| e.to_string())?;
        apply_theme(document, Theme::load(&store));

        let document = document.clone();
        let mut store = store;
        on_click(&toggle, move |_| match Theme::toggle(&mut store) {
            Ok(theme) => apply_theme(&document, theme),
            Err(e) => log::warn!("Theme not saved: {}", e),
        })
    }

    fn setup_announcement(document: &Document) -> Result<(), String> {
        let Some(banner) = document.get_element_by_id("announcement") else {
            return Ok(());
        };
        let mut store = LocalStore::open().map_err(|e| e.to_string())?;
        let hide = |banner: &web_sys::Element| {
            let _ = banner.set_attribute("style", "display: none");
        };
        if theme::announcement_closed(&store) {
            hide(&banner);
            return Ok(());
        }
        if let Ok(Some(close)) = banner.query_selector(".announcement-close") {
            let banner = banner.clone();
            on_click(&close, move |_| {
                hide(&banner);
                if let Err(e) = theme::close_announcement(&mut store) {
                    log::warn!("{}", e);
                }
            })?;
        }
        Ok(())
    }

    fn setup_games(document: &Document, host: Option<Rc<TelegramHost>>) -> Result<(), String> {
        let container = element(document, "games-container")?;
        container.set_inner_html(&render::render_games(&GAMES));

        // One delegated listener: the play button and the whole card launch the game
        on_click(&container, move |event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<web_sys::Element>().ok())
            else {
                return;
            };
            let Ok(Some(card)) = target.closest("[data-url]") else { return };
            if let Some(url) = card.get_attribute("data-url") {
                event.stop_propagation();
                open_game(&host, &url);
            }
        })
    }

    fn setup_news(document: &Document) -> Result<(), String> {
        let container = element(document, "news-container")?;
        container.set_inner_html(&render::render_news(&catalog::data::news(now_ms())));
        Ok(())
    }

    /// Page images are not draggable, including static markup
    fn disable_image_drag(document: &Document) {
        let Ok(images) = document.query_selector_all("img") else {
            return;
        };
        for i in 0..images.length() {
            if let Some(img) = images.get(i).and_then(|n| n.dyn_into::<web_sys::Element>().ok()) {
                let _ = img.set_attribute("draggable", "false");
            }
        }
    }

    pub fn run(document: &Document) {
        log::info!("🚀 Games Verse v{} initializing...", APP_VERSION);

        let host = TelegramHost::detect().map(Rc::new);

        let results = [
            catalog::setup_step("navigation", || setup_navigation(document)),
            catalog::setup_step("host", || {
                let user = host::init_host(as_bridge(&host));
                update_profile(document, &user)
            }),
            catalog::setup_step("theme", || setup_theme(document)),
            catalog::setup_step("share", || {
                let share = element(document, "share-button")?;
                let host = host.clone();
                on_click(&share, move |_| share_app(&host))
            }),
            catalog::setup_step("games", || setup_games(document, host.clone())),
            catalog::setup_step("news", || setup_news(document)),
            catalog::setup_step("announcement", || setup_announcement(document)),
        ];

        set_text(document, "app-version", APP_VERSION);
        set_text(document, "app-build", APP_BUILD);
        disable_image_drag(document);

        if results.iter().all(|ok| *ok) {
            log::info!("✅ Games Verse initialized successfully");
        } else {
            show_toast(NotificationKind::Error, "Ошибка загрузки приложения", 3000);
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod cyberspace_page {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element};

    use cyberspace_hub::audio::{AudioManager, SoundEffect};
    use cyberspace_hub::consts::*;
    use cyberspace_hub::platform::{LocalStore, now_ms};
    use cyberspace_hub::progress::AchievementKind;
    use cyberspace_hub::sim::{CardState, ReactionPhase};
    use cyberspace_hub::{Session, SessionEffect};

    use crate::web_shared::{dismiss_toast, element, js_err, on_click, set_text, toast_element};

    /// Page state: the session plus DOM bookkeeping
    struct App {
        session: Session<LocalStore>,
        audio: AudioManager,
        /// Toast DOM nodes by notification id
        toasts: HashMap<u64, Element>,
        /// Cosmetic randomness (matrix columns, confetti)
        fx_rng: Pcg32,
        last_matrix_spawn: f64,
    }

    impl App {
        fn handle(&mut self, document: &Document, effects: Vec<SessionEffect>) {
            for effect in &effects {
                if let Some(sound) = SoundEffect::for_effect(effect) {
                    self.audio.play(sound);
                }
                match effect {
                    SessionEffect::MatrixRain { .. } => {
                        if let Some(overlay) = document.get_element_by_id("matrix-overlay") {
                            let _ = overlay.class_list().add_1("active");
                        }
                    }
                    SessionEffect::MatrixEnded => {
                        if let Some(overlay) = document.get_element_by_id("matrix-overlay") {
                            let _ = overlay.class_list().remove_1("active");
                            overlay.set_inner_html("");
                        }
                    }
                    SessionEffect::Party => self.spawn_confetti(document),
                    SessionEffect::ProgressReset => {
                        for (_, toast) in self.toasts.drain() {
                            toast.remove();
                        }
                        self.audio.set_volume(self.session.settings().effective_volume());
                    }
                    SessionEffect::NotificationExpired { id } => {
                        if let Some(toast) = self.toasts.remove(id) {
                            dismiss_toast(toast);
                        }
                    }
                    _ => {}
                }
            }
            self.sync_toasts(document);
            if !effects.is_empty() {
                self.render(document);
            }
        }

        fn sync_toasts(&mut self, document: &Document) {
            for n in self.session.notifications() {
                if self.toasts.contains_key(&n.id) {
                    continue;
                }
                if let Some(el) = toast_element(document, Some(n.id), n.kind, &n.message) {
                    self.toasts.insert(n.id, el);
                }
            }
        }

        fn render(&self, document: &Document) {
            self.render_board(document);
            self.render_reaction(document);
            self.render_progress(document);
        }

        fn render_board(&self, document: &Document) {
            let memory = self.session.memory();
            let Some(round) = memory.round() else {
                // No round dealt yet (fresh page or after a reset)
                if let Some(board) = document.get_element_by_id("memory-board") {
                    board.set_inner_html("");
                }
                set_text(document, "memory-attempts", "0");
                set_text(
                    document,
                    "memory-pairs",
                    &format!("0/{}", cyberspace_hub::sim::SYMBOL_KINDS),
                );
                set_text(document, "memory-status", "");
                return;
            };
            if let Some(board) = document.get_element_by_id("memory-board") {
                let html: String = round
                    .cards
                    .iter()
                    .map(|card| {
                        let (class, face) = match card.state {
                            CardState::FaceDown => ("memory-card", '?'),
                            CardState::FaceUp => ("memory-card flipped", card.symbol),
                            CardState::Matched => ("memory-card flipped matched", card.symbol),
                        };
                        format!(
                            r#"<button class="{}" data-index="{}">{}</button>"#,
                            class, card.index, face
                        )
                    })
                    .collect();
                board.set_inner_html(&html);
            }
            set_text(document, "memory-attempts", &round.attempts.to_string());
            set_text(
                document,
                "memory-pairs",
                &format!("{}/{}", round.matched_pairs, cyberspace_hub::sim::SYMBOL_KINDS),
            );
            if round.won {
                set_text(
                    document,
                    "memory-status",
                    &format!("🎉 Победа за {} попыток!", round.attempts),
                );
            } else {
                set_text(document, "memory-status", "");
            }
        }

        fn render_reaction(&self, document: &Document) {
            let phase = self.session.reaction().phase();
            if let Some(target) = document.get_element_by_id("reaction-target") {
                let visible = matches!(phase, ReactionPhase::TargetVisible { .. });
                let _ = target.class_list().toggle_with_force("visible", visible);
            }
            let status = match phase {
                ReactionPhase::Idle => "Нажмите «Старт»".to_string(),
                ReactionPhase::Armed { .. } => "Ждите...".to_string(),
                ReactionPhase::TargetVisible { .. } => "Жмите!".to_string(),
                ReactionPhase::Recorded { ms } => format!("{} мс", ms),
            };
            set_text(document, "reaction-result", &status);
        }

        fn render_progress(&self, document: &Document) {
            let best = self.session.best_scores();
            set_text(
                document,
                "reaction-best",
                &best
                    .best_reaction_ms
                    .map_or_else(|| "-".to_string(), |ms| format!("{} мс", ms)),
            );
            set_text(
                document,
                "memory-best",
                &best
                    .memory_best_attempts
                    .map_or_else(|| "-".to_string(), |n| n.to_string()),
            );

            let ledger = self.session.achievements();
            set_text(document, "achievement-count", &ledger.len().to_string());
            set_text(document, "activity-level", self.session.activity_level().as_str());
            if let Some(list) = document.get_element_by_id("achievement-list") {
                let html: String = ledger
                    .entries()
                    .iter()
                    .map(|a| {
                        let title = AchievementKind::from_name(&a.name)
                            .map_or(a.name.as_str(), |k| k.title());
                        format!(
                            r#"<li class="achievement"><span>🏆 {}</span><span class="achievement-date">{}</span></li>"#,
                            cyberspace_hub::catalog::render::escape_html(title),
                            cyberspace_hub::catalog::render::format_date(a.date),
                        )
                    })
                    .collect();
                list.set_inner_html(&html);
            }
            set_text(document, "visit-count", &self.session.stats().visits.to_string());
        }

        fn spawn_matrix_column(&mut self, document: &Document) {
            let Some(overlay) = document.get_element_by_id("matrix-overlay") else {
                return;
            };
            let Ok(column) = document.create_element("div") else { return };
            let glyphs: Vec<char> = MATRIX_GLYPHS.chars().collect();
            let len = self.fx_rng.random_range(8..24);
            let text: String = (0..len)
                .map(|_| glyphs[self.fx_rng.random_range(0..glyphs.len())])
                .collect();
            column.set_class_name("matrix-column");
            column.set_text_content(Some(&text));
            let _ = column.set_attribute(
                "style",
                &format!(
                    "left: {:.1}%; animation-duration: {:.1}s",
                    self.fx_rng.random_range(0.0..100.0),
                    self.fx_rng.random_range(2.0..5.0)
                ),
            );
            let _ = overlay.append_child(&column);
            // Keep the overlay bounded
            while overlay.child_element_count() > 80 {
                if let Some(first) = overlay.first_element_child() {
                    first.remove();
                }
            }
        }

        fn spawn_confetti(&mut self, document: &Document) {
            let Some(body) = document.body() else { return };
            for _ in 0..PARTY_CONFETTI {
                let Ok(piece) = document.create_element("div") else { return };
                piece.set_class_name("confetti");
                let _ = piece.set_attribute(
                    "style",
                    &format!(
                        "left: {:.1}vw; background: hsl({}, 90%, 60%); animation-delay: {:.2}s",
                        self.fx_rng.random_range(0.0..100.0),
                        self.fx_rng.random_range(0..360),
                        self.fx_rng.random_range(0.0..0.8)
                    ),
                );
                let _ = body.append_child(&piece);
                let closure = Closure::once(move || piece.remove());
                if let Some(window) = web_sys::window() {
                    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                        closure.as_ref().unchecked_ref(),
                        4000,
                    );
                }
                closure.forget();
            }
        }
    }

    fn setup_memory(document: &Document, app: Rc<RefCell<App>>) -> Result<(), String> {
        let board = element(document, "memory-board")?;
        {
            let app = app.clone();
            let document = document.clone();
            on_click(&board, move |event| {
                let index = event
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .and_then(|el| el.closest("[data-index]").ok().flatten())
                    .and_then(|el| el.get_attribute("data-index"))
                    .and_then(|s| s.parse::<usize>().ok());
                let Some(index) = index else { return };
                let mut a = app.borrow_mut();
                let effects = a.session.flip_card(index, now_ms());
                a.handle(&document, effects);
            })?;
        }

        let start = element(document, "memory-start")?;
        let document = document.clone();
        on_click(&start, move |_| {
            let mut a = app.borrow_mut();
            a.session.start_memory_round(now_ms());
            a.render(&document);
        })
    }

    fn setup_reaction(document: &Document, app: Rc<RefCell<App>>) -> Result<(), String> {
        let start = element(document, "reaction-start")?;
        {
            let app = app.clone();
            let document = document.clone();
            on_click(&start, move |_| {
                let mut a = app.borrow_mut();
                a.session.start_reaction(now_ms());
                a.render(&document);
            })?;
        }

        let target = element(document, "reaction-target")?;
        let document = document.clone();
        on_click(&target, move |_| {
            let mut a = app.borrow_mut();
            let effects = a.session.click_reaction(now_ms());
            a.handle(&document, effects);
        })
    }

    fn setup_keys(app: Rc<RefCell<App>>) -> Result<(), String> {
        let window = web_sys::window().ok_or("no window")?;
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let key = event.key();
            let mut chars = key.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return;
            };
            let Some(document) = crate::web_shared::document() else { return };
            let mut a = app.borrow_mut();
            let effects = a.session.key_pressed(c, now_ms());
            a.handle(&document, effects);
        });
        window
            .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
            .map_err(js_err)?;
        closure.forget();
        Ok(())
    }

    /// Flush progress when the page goes away
    fn setup_teardown(app: Rc<RefCell<App>>) -> Result<(), String> {
        let window = web_sys::window().ok_or("no window")?;
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            app.borrow_mut().session.flush();
            log::info!("Progress flushed on page hide");
        });
        window
            .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())
            .map_err(js_err)?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(app: Rc<RefCell<App>>, document: Document) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |_time: f64| {
            frame(app, document);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame(app: Rc<RefCell<App>>, document: Document) {
        {
            let mut a = app.borrow_mut();
            let now = now_ms();
            let effects = a.session.tick(now);
            a.handle(&document, effects);

            if a.session.matrix_active() && now - a.last_matrix_spawn >= MATRIX_SPAWN_INTERVAL_MS {
                a.last_matrix_spawn = now;
                a.spawn_matrix_column(&document);
            }
        }
        request_animation_frame(app, document);
    }

    pub fn run(document: &Document) {
        let store = match LocalStore::open() {
            Ok(store) => store,
            Err(e) => {
                log::error!("CyberSpace needs LocalStorage: {}", e);
                return;
            }
        };

        let now = now_ms();
        let session = Session::open(store, now as u64, now);
        let audio = AudioManager::new(session.settings().effective_volume());
        let app = Rc::new(RefCell::new(App {
            session,
            audio,
            toasts: HashMap::new(),
            fx_rng: Pcg32::seed_from_u64(now as u64 ^ 0x5eed),
            last_matrix_spawn: 0.0,
        }));

        cyberspace_hub::catalog::setup_step("memory", || setup_memory(document, app.clone()));
        cyberspace_hub::catalog::setup_step("reaction", || setup_reaction(document, app.clone()));
        cyberspace_hub::catalog::setup_step("keys", || setup_keys(app.clone()));
        cyberspace_hub::catalog::setup_step("teardown", || setup_teardown(app.clone()));

        {
            let mut a = app.borrow_mut();
            a.sync_toasts(document);
            a.render(document);
        }

        request_animation_frame(app, document.clone());
        log::info!("CyberSpace running!");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let Some(document) = web_shared::document() else {
        log::error!("No document");
        return;
    };

    if document.get_element_by_id("games-container").is_some() {
        catalog_page::run(&document);
    }
    if document.get_element_by_id("memory-board").is_some() {
        cyberspace_page::run(&document);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cyberspace_hub::platform::{MemoryStore, now_ms};
    use cyberspace_hub::sim::{CARD_COUNT, CardState, GameEvent};
    use cyberspace_hub::{Session, SessionEffect};
    use std::collections::HashMap;

    env_logger::init();
    log::info!("Cyberspace Hub (native) starting...");
    log::info!("The pages run in the browser - build for wasm32 and serve with `trunk serve`");

    let seed = now_ms() as u64;
    let mut now = 0.0;
    let mut session = Session::open(MemoryStore::new(), seed, now);

    // Memory round with a player who remembers every card they have seen
    println!("\nPlaying a memory round (seed {})...", seed);
    session.start_memory_round(now);
    let face_down = |s: &Session<MemoryStore>, i: usize| {
        s.memory()
            .round()
            .is_some_and(|r| r.cards[i].state == CardState::FaceDown)
    };
    let mut known: HashMap<usize, char> = HashMap::new();
    let mut won = None;
    for _ in 0..CARD_COUNT * CARD_COUNT {
        let Some(first) = (0..CARD_COUNT).find(|&i| face_down(&session, i)) else {
            break;
        };
        let mut effects = session.flip_card(first, now);
        let Some(symbol) = revealed(&effects, first) else { break };
        known.insert(first, symbol);

        let partner = (0..CARD_COUNT)
            .find(|&i| i != first && known.get(&i) == Some(&symbol) && face_down(&session, i))
            .or_else(|| {
                (0..CARD_COUNT)
                    .find(|&i| i != first && !known.contains_key(&i) && face_down(&session, i))
            });
        let Some(second) = partner else { break };
        let more = session.flip_card(second, now);
        if let Some(symbol) = revealed(&more, second) {
            known.insert(second, symbol);
        }
        effects.extend(more);

        won = won.or(effects.iter().find_map(|e| match e {
            SessionEffect::Game(GameEvent::RoundWon { attempts }) => Some(*attempts),
            _ => None,
        }));
        now += session.settings().mismatch_delay_ms;
        session.tick(now);
        if won.is_some() {
            break;
        }
    }
    match won {
        Some(attempts) => println!("✓ Round won in {} attempts", attempts),
        None => println!("✗ Round not finished"),
    }

    // Reaction test with a 280 ms reflex
    let fire_at = session.start_reaction(now);
    session.tick(fire_at);
    session.click_reaction(fire_at + 280.0);

    let best = session.best_scores();
    println!(
        "✓ Best reaction: {:?} ms, best memory: {:?} attempts",
        best.best_reaction_ms, best.memory_best_attempts
    );
    println!(
        "✓ {} achievements, activity level: {}",
        session.achievements().len(),
        session.activity_level().as_str()
    );

    let store = session.close();
    println!("✓ {} records persisted", store.len());
}

/// Symbol revealed at `index` by a flip
#[cfg(not(target_arch = "wasm32"))]
fn revealed(effects: &[cyberspace_hub::SessionEffect], index: usize) -> Option<char> {
    use cyberspace_hub::SessionEffect;
    use cyberspace_hub::sim::GameEvent;

    effects.iter().find_map(|e| match e {
        SessionEffect::Game(GameEvent::CardRevealed { index: i, symbol }) if *i == index => {
            Some(*symbol)
        }
        _ => None,
    })
}
