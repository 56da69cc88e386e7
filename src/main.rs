//! czch portfolio entry point
//!
//! In the browser this wires the page DOM to the library and runs the
//! frame loop. Natively it offers the terminal on stdin and a headless
//! demo of the snake and the starfield.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::anyhow;
    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, Element, Event, EventTarget, HtmlAudioElement, HtmlCanvasElement, HtmlElement,
        HtmlImageElement, HtmlInputElement, KeyboardEvent, MouseEvent, TouchEvent, Window,
    };

    use portfolio::audio::{AudioAnalyser, HtmlAudio};
    use portfolio::consts::*;
    use portfolio::particles::{
        Ambient, ParticleField, PointerSignal, ReactiveSignal, SignalSample, SpectrumSignal,
    };
    use portfolio::platform::LocalStore;
    use portfolio::platform::web::{self, Interval, element};
    use portfolio::player::{MediaError, MusicPlayer, default_playlist};
    use portfolio::presence::{DEFAULT_USER_ID, StatusCard, presence_url};
    use portfolio::renderer::vertex::colors;
    use portfolio::renderer::{RenderState, Vertex, particle_field_vertices, snake_board_vertices};
    use portfolio::sim::{
        ButtonInput, DirectionSource, GamePhase, KeyboardInput, SnakeClock, SnakeConfig, SnakeEvent,
        SnakeGame, SwipeInput, Touch, feed,
    };
    use portfolio::terminal::{Terminal, TerminalEffect};
    use portfolio::ui::{self, PROJECTS, SnakeAction, Tab, WindowDrag};
    use portfolio::{HighScore, ReactiveMode, Settings};

    /// Whole-page state shared by every handler
    struct App {
        document: Document,
        store: LocalStore,
        settings: Settings,

        field: ParticleField,
        pointer: PointerSignal,
        /// Built on the first play in music mode; a media element can only
        /// feed one audio graph
        spectrum: Option<SpectrumSignal<AudioAnalyser>>,
        analyser_failed: bool,
        background: Option<RenderState>,

        snake: SnakeGame,
        clock: SnakeClock,
        snake_view: Option<RenderState>,
        snake_open: bool,
        snake_drag: WindowDrag,
        best: HighScore,
        keyboard: KeyboardInput,
        swipe: SwipeInput,
        buttons: ButtonInput,

        terminal: Terminal,
        terminal_drag: WindowDrag,
        player: MusicPlayer,
        audio: HtmlAudio,
        card: StatusCard,
        poll_in_flight: bool,

        last_time: f64,
        timers: Vec<Interval>,
    }

    impl App {
        /// Background input for this frame
        fn sample(&mut self, now_ms: f64) -> SignalSample {
            match self.settings.reactive_mode {
                ReactiveMode::Pointer => self.pointer.sample(now_ms),
                ReactiveMode::Audio => match self.spectrum.as_mut() {
                    Some(spectrum) if self.player.playing => spectrum.sample(now_ms),
                    _ => Ambient.sample(now_ms),
                },
            }
        }

        fn frame(&mut self, time: f64) {
            let dt_ms = if self.last_time > 0.0 {
                (time - self.last_time).max(0.0)
            } else {
                1000.0 / REFERENCE_FPS as f64
            };
            self.last_time = time;

            let App { player, audio, .. } = &mut *self;
            if player.sync_media(audio) {
                self.render_player();
            }

            let sample = self.sample(time);
            self.field.tick((dt_ms / 1000.0) as f32, &sample);
            if let Some(target) = self.background.as_mut() {
                present(target, &particle_field_vertices(&self.field));
            }

            if !self.snake_open {
                return;
            }
            for event in self.clock.step(&mut self.snake, dt_ms) {
                match event {
                    SnakeEvent::NewHighScore { score } => {
                        self.best.record(score, &mut self.store);
                    }
                    SnakeEvent::Died { score } => log::info!("Snake over with {} points", score),
                    SnakeEvent::Moved | SnakeEvent::AteFood { .. } => {}
                }
            }
            if let Some(target) = self.snake_view.as_mut() {
                present(target, &snake_board_vertices(&self.snake));
            }
            self.render_snake_hud();
        }

        /// Connect (or wake) the analyser when music mode needs it
        fn ensure_analyser(&mut self) {
            if self.settings.reactive_mode != ReactiveMode::Audio {
                return;
            }
            if let Some(spectrum) = self.spectrum.as_mut() {
                spectrum.source_mut().resume();
                return;
            }
            if self.analyser_failed {
                return;
            }
            match AudioAnalyser::connect(self.audio.element()) {
                Some(analyser) => {
                    analyser.resume();
                    self.spectrum = Some(SpectrumSignal::new(analyser));
                }
                None => self.analyser_failed = true,
            }
        }

        fn save_settings(&mut self) {
            self.settings.save(&mut self.store);
        }

        fn apply_field_settings(&mut self) {
            self.field.reconfigure(self.settings.field_config());
        }

        fn apply_terminal_effect(&mut self, effect: TerminalEffect) {
            match effect {
                TerminalEffect::Close => self.set_class("terminal", "hidden", true),
                TerminalEffect::Minimize => self.render_terminal(),
                TerminalEffect::LaunchSnake => self.open_snake(),
                TerminalEffect::ThemeChanged(theme) => {
                    self.settings.terminal_theme = theme;
                    self.save_settings();
                    self.render_theme();
                }
            }
        }

        fn open_snake(&mut self) {
            self.snake_open = true;
            self.set_class("snake-window", "hidden", false);
            self.render_snake_hud();
        }

        /// Closing throws the current run away
        fn close_snake(&mut self) {
            self.snake_open = false;
            self.snake.reset();
            self.clock.clear();
            self.set_class("snake-window", "hidden", true);
        }

        // DOM output

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_html(&self, id: &str, html: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_inner_html(html);
            }
        }

        fn set_class(&self, id: &str, class: &str, on: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.class_list().toggle_with_force(class, on);
            }
        }

        fn set_style(&self, id: &str, property: &str, value: &str) {
            if let Ok(el) = element::<HtmlElement>(&self.document, id) {
                let _ = el.style().set_property(property, value);
            }
        }

        fn render_card(&self) {
            let html = self.card.to_html(web::now_ms() as i64, DEFAULT_USER_ID);
            self.set_html("status-card", &html);
        }

        fn render_terminal(&self) {
            self.set_html("terminal-output", &ui::terminal_html(&self.terminal.history));
            if let Some(output) = self.document.get_element_by_id("terminal-output") {
                output.set_scroll_top(output.scroll_height());
            }
            self.set_class("terminal", "minimized", self.terminal.minimized);
        }

        fn render_theme(&self) {
            let palette = self.settings.terminal_theme.palette();
            self.set_style("terminal", "--term-bg", palette.background);
            self.set_style("terminal", "--term-border", palette.border);
            self.set_style("terminal", "--term-header", palette.header);
            self.set_style("terminal", "--term-text", palette.text);
            self.set_style("terminal", "--term-prompt", palette.prompt);
        }

        fn render_player(&self) {
            if let Some(track) = self.player.current_track() {
                self.set_text("player-title", &track.title);
                self.set_text("player-artist", &track.artist);
                if let Ok(cover) = element::<HtmlImageElement>(&self.document, "player-cover") {
                    if cover.src() != track.cover_url {
                        cover.set_src(&track.cover_url);
                    }
                }
            }
            self.set_text("player-toggle", if self.player.playing { "❚❚" } else { "▶" });
            self.set_style(
                "player-progress-fill",
                "width",
                &format!("{:.1}%", self.player.progress()),
            );
            self.set_text("player-elapsed", &self.player.elapsed_label());
            self.set_text("player-duration", &self.player.duration_label());
            self.set_text("player-volume-label", &format!("{}%", self.player.volume));

            match self.player.error_text() {
                Some(message) => {
                    self.set_text("player-error", &message);
                    self.set_class("player-error", "hidden", false);
                }
                None => self.set_class("player-error", "hidden", true),
            }

            let enabled = self.player.is_enabled();
            for id in [
                "player-toggle",
                "player-prev",
                "player-next",
                "player-share",
                "player-download",
            ] {
                if let Some(el) = self.document.get_element_by_id(id) {
                    let _ = if enabled {
                        el.remove_attribute("disabled")
                    } else {
                        el.set_attribute("disabled", "")
                    };
                }
            }
        }

        fn render_settings(&self) {
            self.set_text(
                "mode-toggle",
                &format!("Mode: {}", self.settings.reactive_mode.label()),
            );
            self.set_text(
                "quality-toggle",
                &format!("Quality: {}", self.settings.quality.as_str()),
            );
            self.set_text(
                "motion-toggle",
                if self.settings.reduced_motion {
                    "Motion: Reduced"
                } else {
                    "Motion: Full"
                },
            );
        }

        fn show_tab(&self, tab: Tab) {
            for t in Tab::ALL {
                self.set_class(&t.section_id(), "hidden", t != tab);
                let selector = format!("[data-tab=\"{}\"]", t.label());
                if let Ok(Some(button)) = self.document.query_selector(&selector) {
                    let _ = button.class_list().toggle_with_force("active", t == tab);
                }
            }
        }

        fn render_snake_hud(&self) {
            self.set_text("snake-score", &self.snake.score.to_string());
            self.set_text("snake-high", &self.snake.high_score.to_string());
            match ui::snake_banner(&self.snake) {
                Some(html) => {
                    self.set_html("snake-banner", &html);
                    self.set_class("snake-banner", "hidden", false);
                }
                None => self.set_class("snake-banner", "hidden", true),
            }
            self.set_text("snake-action", SnakeAction::for_phase(self.snake.phase).label());
        }

        fn render_all(&self) {
            self.render_card();
            self.render_terminal();
            self.render_theme();
            self.render_player();
            self.render_settings();
            self.set_html("project-list", &ui::projects_html(PROJECTS));
        }
    }

    fn present(target: &mut RenderState, vertices: &[Vertex]) {
        match target.render(vertices) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (size, view) = (target.size, target.view);
                target.resize(size, view);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => log::error!("Out of memory!"),
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }

    /// Attach a listener for the lifetime of the page
    fn listen(
        target: &EventTarget,
        event: &str,
        handler: impl FnMut(Event) + 'static,
    ) -> anyhow::Result<()> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(web::js_error)?;
        closure.forget();
        Ok(())
    }

    /// Click handler on `#id` that only needs the app
    fn on_click(
        app: &Rc<RefCell<App>>,
        document: &Document,
        id: &str,
        mut handler: impl FnMut(&mut App) + 'static,
    ) -> anyhow::Result<()> {
        let target: Element = element(document, id)?;
        let app = app.clone();
        listen(&target, "click", move |_event| handler(&mut app.borrow_mut()))
    }

    /// Client position of a mouse event or the first touch
    fn pointer_position(event: &Event) -> Option<Vec2> {
        if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
            return Some(Vec2::new(mouse.client_x() as f32, mouse.client_y() as f32));
        }
        let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
        Some(Vec2::new(touch.client_x() as f32, touch.client_y() as f32))
    }

    fn viewport_size(window: &Window) -> Vec2 {
        let dimension = |value: Result<JsValue, JsValue>| {
            value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
        };
        Vec2::new(dimension(window.inner_width()), dimension(window.inner_height()))
    }

    /// Let `#header_id` drag the fixed `#window_id` around the viewport
    fn setup_window_drag(
        app: &Rc<RefCell<App>>,
        window: &Window,
        document: &Document,
        window_id: &str,
        header_id: &str,
        drag_of: fn(&mut App) -> &mut WindowDrag,
    ) -> anyhow::Result<()> {
        let panel: HtmlElement = element(document, window_id)?;
        let header: Element = element(document, header_id)?;

        for name in ["mousedown", "touchstart"] {
            let app = app.clone();
            let panel = panel.clone();
            listen(&header, name, move |event| {
                // Header buttons keep their own clicks
                let on_button = event
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .and_then(|el| el.closest("button").ok().flatten())
                    .is_some();
                if on_button {
                    return;
                }
                let Some(pointer) = pointer_position(&event) else {
                    return;
                };
                let rect = panel.get_bounding_client_rect();
                let corner = Vec2::new(rect.left() as f32, rect.top() as f32);
                drag_of(&mut *app.borrow_mut()).begin(pointer, corner);
            })?;
        }

        for name in ["mousemove", "touchmove"] {
            let app = app.clone();
            let panel = panel.clone();
            let window = window.clone();
            listen(document, name, move |event| {
                let mut app = app.borrow_mut();
                let drag = drag_of(&mut *app);
                if !drag.is_dragging() {
                    return;
                }
                let Some(pointer) = pointer_position(&event) else {
                    return;
                };
                let rect = panel.get_bounding_client_rect();
                let size = Vec2::new(rect.width() as f32, rect.height() as f32);
                if let Some(pos) = drag.drag_to(pointer, viewport_size(&window), size) {
                    let style = panel.style();
                    let _ = style.set_property("left", &format!("{}px", pos.x));
                    let _ = style.set_property("top", &format!("{}px", pos.y));
                    let _ = style.set_property("right", "auto");
                    let _ = style.set_property("bottom", "auto");
                    let _ = style.set_property("transform", "none");
                }
            })?;
        }

        for name in ["mouseup", "touchend"] {
            let app = app.clone();
            listen(document, name, move |_event| drag_of(&mut *app.borrow_mut()).end())?;
        }
        Ok(())
    }

    /// Size the backing store for the device pixel ratio.
    /// Returns (physical size, CSS size).
    fn fit_canvas(window: &Window, canvas: &HtmlCanvasElement, css: Vec2) -> ((u32, u32), Vec2) {
        let dpr = window.device_pixel_ratio();
        let size = ((css.x as f64 * dpr) as u32, (css.y as f64 * dpr) as u32);
        canvas.set_width(size.0);
        canvas.set_height(size.1);
        (size, css)
    }

    fn client_size(canvas: &HtmlCanvasElement) -> Vec2 {
        Vec2::new(canvas.client_width() as f32, canvas.client_height() as f32)
    }

    async fn init_gpu(
        window: &Window,
        background: &HtmlCanvasElement,
        snake: &HtmlCanvasElement,
    ) -> anyhow::Result<(RenderState, RenderState)> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let background_surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(background.clone()))
            .map_err(|e| anyhow!("background surface: {e}"))?;
        let snake_surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(snake.clone()))
            .map_err(|e| anyhow!("snake surface: {e}"))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&background_surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("no adapter: {e}"))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let (size, view) = fit_canvas(window, background, client_size(background));
        let background_state =
            RenderState::new(background_surface, &adapter, size, view, colors::PAGE_BACKGROUND)
                .await
                .map_err(|e| anyhow!("background device: {e}"))?;

        // Hidden until launched, so size from the board rather than layout
        let (size, view) = fit_canvas(window, snake, Vec2::splat(SNAKE_CANVAS_PX));
        let snake_state = RenderState::new(snake_surface, &adapter, size, view, colors::BOARD)
            .await
            .map_err(|e| anyhow!("snake device: {e}"))?;

        Ok((background_state, snake_state))
    }

    pub async fn run() -> anyhow::Result<()> {
        log::info!("Portfolio starting...");

        let window = web::window()?;
        let document = web::document()?;

        let store = LocalStore::new();
        let settings = Settings::load(&store);
        let best = HighScore::load(&store);
        let seed = web::now_ms() as u64;

        let canvas: HtmlCanvasElement = element(&document, "background")?;
        let mut field = ParticleField::new(settings.field_config(), seed);
        let css = client_size(&canvas);
        field.resize(css.x, css.y);

        let audio_element: HtmlAudioElement = element(&document, "player-audio")?;
        let mut audio = HtmlAudio::new(audio_element.clone());
        let player = MusicPlayer::new(default_playlist(), settings.volume);
        player.attach(&mut audio);
        if let Ok(volume) = element::<HtmlInputElement>(&document, "player-volume") {
            volume.set_value(&player.volume.to_string());
        }

        let terminal = Terminal::new(settings.terminal_theme);
        let snake = SnakeGame::new(SnakeConfig::default(), seed, best.best());
        log::info!("Seeded with {}", seed);

        let app = Rc::new(RefCell::new(App {
            document: document.clone(),
            store,
            settings,
            field,
            pointer: PointerSignal::default(),
            spectrum: None,
            analyser_failed: false,
            background: None,
            snake,
            clock: SnakeClock::new(),
            snake_view: None,
            snake_open: false,
            snake_drag: WindowDrag::default(),
            best,
            keyboard: KeyboardInput,
            swipe: SwipeInput::default(),
            buttons: ButtonInput,
            terminal,
            terminal_drag: WindowDrag::default(),
            player,
            audio,
            card: StatusCard::default(),
            poll_in_flight: false,
            last_time: 0.0,
            timers: Vec::new(),
        }));

        {
            let app = app.borrow();
            app.render_all();
            let initial = window
                .location()
                .hash()
                .ok()
                .and_then(|hash| Tab::parse(&hash))
                .unwrap_or_default();
            app.show_tab(initial);
        }

        setup_tabs(&app, &window, &document)?;
        setup_background_input(&app, &window, &document, &canvas)?;
        setup_settings(&app, &document)?;
        setup_player(&app, &document, &audio_element)?;
        setup_terminal(&app, &window, &document)?;
        setup_snake(&app, &window, &document)?;
        start_presence_polling(&app)?;

        // The page stays usable without WebGPU, just without canvases
        let snake_canvas: HtmlCanvasElement = element(&document, "snake-canvas")?;
        match init_gpu(&window, &canvas, &snake_canvas).await {
            Ok((background, snake_view)) => {
                let mut app = app.borrow_mut();
                app.background = Some(background);
                app.snake_view = Some(snake_view);
            }
            Err(e) => log::warn!("WebGPU unavailable, canvases disabled: {e:#}"),
        }

        request_animation_frame(app)?;

        log::info!("Portfolio running!");
        Ok(())
    }

    fn setup_tabs(
        app: &Rc<RefCell<App>>,
        window: &Window,
        document: &Document,
    ) -> anyhow::Result<()> {
        for tab in Tab::ALL {
            let selector = format!("[data-tab=\"{}\"]", tab.label());
            let Some(button) = document.query_selector(&selector).map_err(web::js_error)? else {
                log::warn!("No nav button for {}", tab.label());
                continue;
            };
            let app = app.clone();
            let window = window.clone();
            listen(&button, "click", move |event| {
                event.prevent_default();
                app.borrow().show_tab(tab);
                let _ = window.location().set_hash(tab.label());
            })?;
        }

        let app = app.clone();
        let location_window = window.clone();
        listen(window, "hashchange", move |_event| {
            let hash = location_window.location().hash().unwrap_or_default();
            if let Some(tab) = Tab::parse(&hash) {
                app.borrow().show_tab(tab);
            }
        })
    }

    fn setup_background_input(
        app: &Rc<RefCell<App>>,
        window: &Window,
        document: &Document,
        canvas: &HtmlCanvasElement,
    ) -> anyhow::Result<()> {
        {
            let app = app.clone();
            listen(window, "mousemove", move |event| {
                if let Some(event) = event.dyn_ref::<MouseEvent>() {
                    app.borrow_mut()
                        .pointer
                        .set_position(event.client_x() as f32, event.client_y() as f32);
                }
            })?;
        }

        {
            let app = app.clone();
            listen(document, "mouseleave", move |_event| {
                app.borrow_mut().pointer.clear();
            })?;
        }

        let app = app.clone();
        let resize_window = window.clone();
        let canvas = canvas.clone();
        listen(window, "resize", move |_event| {
            let mut app = app.borrow_mut();
            let css = client_size(&canvas);
            app.field.resize(css.x, css.y);
            if let Some(target) = app.background.as_mut() {
                let (size, view) = fit_canvas(&resize_window, &canvas, css);
                target.resize(size, view);
            }
        })
    }

    fn setup_settings(app: &Rc<RefCell<App>>, document: &Document) -> anyhow::Result<()> {
        on_click(app, document, "mode-toggle", |app| {
            app.settings.reactive_mode = app.settings.reactive_mode.toggled();
            log::info!("Background follows {}", app.settings.reactive_mode.label());
            app.save_settings();
            app.apply_field_settings();
            if app.player.playing {
                app.ensure_analyser();
            }
            app.render_settings();
        })?;

        on_click(app, document, "quality-toggle", |app| {
            app.settings.quality = app.settings.quality.next();
            app.save_settings();
            app.apply_field_settings();
            app.render_settings();
        })?;

        on_click(app, document, "motion-toggle", |app| {
            app.settings.reduced_motion = !app.settings.reduced_motion;
            app.save_settings();
            app.apply_field_settings();
            app.render_settings();
        })
    }

    fn setup_player(
        app: &Rc<RefCell<App>>,
        document: &Document,
        audio_element: &HtmlAudioElement,
    ) -> anyhow::Result<()> {
        on_click(app, document, "player-toggle", |app| {
            let App { player, audio, .. } = &mut *app;
            if player.toggle_play(audio) {
                app.ensure_analyser();
            }
            app.render_player();
        })?;

        on_click(app, document, "player-next", |app| {
            let App { player, audio, .. } = &mut *app;
            player.next(audio);
            app.render_player();
        })?;

        on_click(app, document, "player-prev", |app| {
            let App { player, audio, .. } = &mut *app;
            player.previous(audio);
            app.render_player();
        })?;

        on_click(app, document, "player-share", |app| {
            if let Some(text) = app.player.share_text() {
                wasm_bindgen_futures::spawn_local(async move {
                    web::copy_to_clipboard(&text).await;
                });
            }
        })?;

        on_click(app, document, "player-download", |app| {
            if let Some((url, file_name)) = app.player.download() {
                if let Err(e) = web::download(&url, &file_name) {
                    log::warn!("Download failed: {e:#}");
                }
            }
        })?;

        {
            let bar: HtmlElement = element(document, "player-progress")?;
            let app = app.clone();
            let target = bar.clone();
            listen(&target, "click", move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let rect = bar.get_bounding_client_rect();
                let x = event.client_x() as f64 - rect.left();
                let mut app = app.borrow_mut();
                let App { player, audio, .. } = &mut *app;
                player.seek_fraction(x, rect.width(), audio);
                app.render_player();
            })?;
        }

        {
            let slider: HtmlInputElement = element(document, "player-volume")?;
            let input = slider.clone();
            let app_input = app.clone();
            listen(&slider, "input", move |_event| {
                let Ok(volume) = input.value().parse::<i32>() else {
                    return;
                };
                let mut app = app_input.borrow_mut();
                let App { player, audio, .. } = &mut *app;
                player.set_volume(volume, audio);
                app.render_player();
            })?;

            let app = app.clone();
            listen(&slider, "change", move |_event| {
                let mut app = app.borrow_mut();
                app.settings.volume = app.player.volume;
                app.save_settings();
            })?;
        }

        // Media element events
        {
            let app = app.clone();
            let el = audio_element.clone();
            listen(audio_element, "loadedmetadata", move |_event| {
                let mut app = app.borrow_mut();
                app.player.on_metadata(el.duration());
                app.render_player();
            })?;
        }
        {
            let app = app.clone();
            let el = audio_element.clone();
            listen(audio_element, "timeupdate", move |_event| {
                let mut app = app.borrow_mut();
                app.player.on_time_update(el.current_time());
                app.render_player();
            })?;
        }
        {
            let app = app.clone();
            listen(audio_element, "ended", move |_event| {
                let mut app = app.borrow_mut();
                let App { player, audio, .. } = &mut *app;
                player.on_ended(audio);
                app.render_player();
            })?;
        }

        let app = app.clone();
        let el = audio_element.clone();
        listen(audio_element, "error", move |_event| {
            let mut app = app.borrow_mut();
            app.player.on_error(MediaError::Load(el.current_src()));
            app.render_player();
        })
    }

    fn setup_terminal(
        app: &Rc<RefCell<App>>,
        window: &Window,
        document: &Document,
    ) -> anyhow::Result<()> {
        let input: HtmlInputElement = element(document, "terminal-input")?;

        {
            let app = app.clone();
            let field = input.clone();
            listen(&input, "keydown", move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if event.key() != "Enter" {
                    return;
                }
                let line = field.value();
                field.set_value("");
                let mut app = app.borrow_mut();
                let effect = app.terminal.execute(&line);
                app.render_terminal();
                if let Some(effect) = effect {
                    app.apply_terminal_effect(effect);
                }
            })?;
        }

        {
            let app = app.clone();
            let open_input = input.clone();
            let button: Element = element(document, "terminal-open")?;
            listen(&button, "click", move |_event| {
                let mut app = app.borrow_mut();
                app.terminal.minimized = false;
                app.set_class("terminal", "hidden", false);
                app.render_terminal();
                let _ = open_input.focus();
            })?;
        }

        {
            let app = app.clone();
            let button: Element = element(document, "terminal-close")?;
            listen(&button, "click", move |event| {
                event.stop_propagation();
                app.borrow_mut().apply_terminal_effect(TerminalEffect::Close);
            })?;
        }

        setup_window_drag(app, window, document, "terminal", "terminal-header", |app| {
            &mut app.terminal_drag
        })?;

        on_click(app, document, "terminal-header", |app| {
            // The click that ends a drag does not minimise
            if app.terminal_drag.take_moved() {
                return;
            }
            app.terminal.toggle_minimized();
            app.render_terminal();
        })
    }

    fn setup_snake(
        app: &Rc<RefCell<App>>,
        window: &Window,
        document: &Document,
    ) -> anyhow::Result<()> {
        on_click(app, document, "snake-action", |app| {
            SnakeAction::for_phase(app.snake.phase).apply(&mut app.snake);
            app.render_snake_hud();
        })?;

        on_click(app, document, "snake-reset", |app| {
            app.snake.reset();
            app.clock.clear();
            app.render_snake_hud();
        })?;

        on_click(app, document, "snake-close", |app| app.close_snake())?;

        setup_window_drag(app, window, document, "snake-window", "snake-header", |app| {
            &mut app.snake_drag
        })?;

        {
            let app = app.clone();
            listen(window, "keydown", move |event| {
                let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                // Typing in the terminal never steers
                if event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                    .is_some()
                {
                    return;
                }
                let mut app = app.borrow_mut();
                if !app.snake_open {
                    return;
                }
                let key = key_event.key();
                let active = matches!(app.snake.phase, GamePhase::Playing | GamePhase::Paused);
                if key == " " && active {
                    event.prevent_default();
                    app.snake.toggle_pause();
                    return;
                }
                let App { keyboard, snake, .. } = &mut *app;
                if snake.phase == GamePhase::Playing && keyboard.classify(key.as_str()).is_some() {
                    event.prevent_default();
                }
                feed(keyboard, key.as_str(), snake);
            })?;
        }

        let canvas: HtmlCanvasElement = element(document, "snake-canvas")?;
        {
            let app = app.clone();
            listen(&canvas, "touchstart", move |event| {
                let Some(touch) = event
                    .dyn_ref::<TouchEvent>()
                    .and_then(|e| e.touches().get(0))
                else {
                    return;
                };
                let mut app = app.borrow_mut();
                if app.snake.phase == GamePhase::Playing {
                    event.prevent_default();
                }
                let pos = Vec2::new(touch.client_x() as f32, touch.client_y() as f32);
                let App { swipe, snake, .. } = &mut *app;
                feed(swipe, Touch::Start(pos), snake);
            })?;
        }
        {
            let app = app.clone();
            listen(&canvas, "touchend", move |event| {
                let Some(touch) = event
                    .dyn_ref::<TouchEvent>()
                    .and_then(|e| e.changed_touches().get(0))
                else {
                    return;
                };
                let mut app = app.borrow_mut();
                let pos = Vec2::new(touch.client_x() as f32, touch.client_y() as f32);
                let App { swipe, snake, .. } = &mut *app;
                feed(swipe, Touch::End(pos), snake);
            })?;
        }

        let dpad = document
            .query_selector_all(".snake-btn[data-dir]")
            .map_err(web::js_error)?;
        for i in 0..dpad.length() {
            let Some(button) = dpad.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let Some(dir) = button.get_attribute("data-dir") else {
                continue;
            };
            let app = app.clone();
            listen(&button, "click", move |_event| {
                let mut app = app.borrow_mut();
                let App { buttons, snake, .. } = &mut *app;
                feed(buttons, dir.as_str(), snake);
            })?;
        }

        Ok(())
    }

    fn start_presence_polling(app: &Rc<RefCell<App>>) -> anyhow::Result<()> {
        poll_presence(app.clone());
        let timer_app = app.clone();
        let interval = Interval::new(PRESENCE_POLL_MS, move || poll_presence(timer_app.clone()))?;
        app.borrow_mut().timers.push(interval);
        Ok(())
    }

    /// One poll; skipped while the previous request is still out
    fn poll_presence(app: Rc<RefCell<App>>) {
        {
            let mut app = app.borrow_mut();
            if app.poll_in_flight {
                return;
            }
            app.poll_in_flight = true;
        }
        let url = presence_url(DEFAULT_USER_ID);
        wasm_bindgen_futures::spawn_local(async move {
            let result = web::fetch_presence(&url).await;
            let mut app = app.borrow_mut();
            app.poll_in_flight = false;
            // Live cards re-render anyway so elapsed clocks keep ticking
            if app.card.apply(result) || !app.card.is_placeholder() {
                app.render_card();
            }
        });
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) -> anyhow::Result<()> {
        let closure = Closure::once(move |time: f64| {
            app.borrow_mut().frame(time);
            if let Err(e) = request_animation_frame(app) {
                log::error!("Frame loop stopped: {e:#}");
            }
        });
        web::window()?
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(web::js_error)?;
        closure.forget();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }

    if let Err(e) = wasm_app::run().await {
        log::error!("Startup failed: {e:#}");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Portfolio (native) starting...");
    log::info!("The page itself runs in the browser - use `trunk serve` for the web version");

    if std::env::args().any(|arg| arg == "--demo") {
        native::snake_demo(42);
        native::starfield_demo(42);
    } else {
        native::repl();
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::io::{self, BufRead, Write};

    use portfolio::consts::*;
    use portfolio::particles::{FieldConfig, ParticleField, PulseSignal, ReactiveSignal};
    use portfolio::sim::{Direction, GamePhase, SnakeClock, SnakeConfig, SnakeEvent, SnakeGame};
    use portfolio::terminal::{Line, LineKind, Terminal, TerminalEffect};

    /// Lines produced by the most recent command (everything after its echo)
    fn new_output(history: &[Line]) -> &[Line] {
        match history.iter().rposition(|l| l.kind == LineKind::Command) {
            Some(i) => &history[i + 1..],
            None => history,
        }
    }

    fn print_lines(lines: &[Line]) {
        for line in lines {
            match line.kind {
                LineKind::Error => eprintln!("{}", line.content),
                _ => println!("{}", line.content),
            }
        }
    }

    /// The terminal on stdin
    pub fn repl() {
        let mut terminal = Terminal::default();
        print_lines(&terminal.history);

        let stdin = io::stdin();
        loop {
            print!("$ ");
            let _ = io::stdout().flush();

            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    log::error!("stdin: {}", e);
                    break;
                }
            }
            if line.trim().is_empty() {
                continue;
            }

            let effect = terminal.execute(&line);
            print_lines(new_output(&terminal.history));

            match effect {
                Some(TerminalEffect::Close) => break,
                Some(TerminalEffect::LaunchSnake) => snake_demo(rand::random()),
                Some(TerminalEffect::ThemeChanged(theme)) => {
                    log::info!("Theme {} applies to the browser terminal only", theme.name())
                }
                Some(TerminalEffect::Minimize) | None => {}
            }
        }
    }

    /// Greedy autopilot: head for the food, avoid walls and the body
    fn autopilot(game: &SnakeGame) -> Option<Direction> {
        let head = game.head();
        let food = game.food;
        let mut preferred = Vec::with_capacity(4);
        if food.x > head.x {
            preferred.push(Direction::Right);
        } else if food.x < head.x {
            preferred.push(Direction::Left);
        }
        if food.y > head.y {
            preferred.push(Direction::Down);
        } else if food.y < head.y {
            preferred.push(Direction::Up);
        }
        preferred.extend([Direction::Up, Direction::Right, Direction::Down, Direction::Left]);

        preferred.into_iter().find(|&dir| {
            let next = head.step(dir);
            game.direction != Some(dir.opposite())
                && next.in_bounds(game.config.grid)
                && !game.occupies(next)
        })
    }

    /// Play one headless run at 60 fps and log the events
    pub fn snake_demo(seed: u64) {
        let mut game = SnakeGame::new(SnakeConfig::default(), seed, 0);
        let mut clock = SnakeClock::new();
        game.start();
        log::info!("Snake demo (seed {})", seed);

        let frame_ms = 1000.0 / REFERENCE_FPS as f64;
        for _ in 0..60 * 60 * 5 {
            if let Some(dir) = autopilot(&game) {
                game.steer(dir);
            }
            for event in clock.step(&mut game, frame_ms) {
                match event {
                    SnakeEvent::AteFood { score } => log::debug!("Ate food, score {}", score),
                    SnakeEvent::NewHighScore { score } => log::debug!("New best {}", score),
                    SnakeEvent::Died { score } => log::info!("Died with {} points", score),
                    SnakeEvent::Moved => {}
                }
            }
            if game.phase == GamePhase::GameOver {
                break;
            }
        }

        println!(
            "Snake demo: score {} length {} after {} ticks ({})",
            game.score,
            game.len(),
            game.ticks,
            game.phase.as_str()
        );
    }

    /// Drive the starfield with the synthetic beat for a few seconds
    pub fn starfield_demo(seed: u64) {
        let mut field = ParticleField::new(FieldConfig::reactive(), seed);
        field.resize(1280.0, 720.0);
        let mut signal = PulseSignal::new(120.0);
        signal.set_playing(true);

        let frames = 60 * 4;
        let mut beats = 0;
        let mut links = 0;
        for frame in 0..frames {
            let now_ms = frame as f64 * 1000.0 / REFERENCE_FPS as f64;
            let sample = signal.sample(now_ms);
            if sample.beat {
                beats += 1;
            }
            field.tick(1.0 / REFERENCE_FPS, &sample);
            links += field.connections().len();
        }

        println!(
            "Starfield demo: {} particles, {} beats, {:.1} connections per frame",
            field.particle_count(),
            beats,
            links as f64 / frames as f64
        );
    }
}
