//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use marquee_core::{Backend, spawn_bootstrap};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::{auth::AuthScreen, browse::BrowseScreen, movie::MovieScreen};
use crate::theme;
use crate::tui::Tui;

const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

pub struct App {
    active_screen: ScreenId,
    /// Where `GoBack` returns to.
    previous_screen: Option<ScreenId>,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    help_visible: bool,
    search_active: bool,
    search_query: String,
    terminal_size: (u16, u16),
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    backend: Backend,
    profile_name: String,
    /// Cancels in-flight bootstrap fetches on reload, sign-out and exit.
    data_cancel: CancellationToken,
    notification: Option<(Notification, Instant)>,
}

impl App {
    /// Build the app. Starts on the browse screen when the backend already
    /// holds a session, otherwise on the auth screen.
    pub fn new(backend: Backend, profile_name: String) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let mut screens: HashMap<ScreenId, Box<dyn Component>> = HashMap::new();
        screens.insert(ScreenId::Auth, Box::new(AuthScreen::new(backend.clone())));
        screens.insert(
            ScreenId::Browse,
            Box::new(BrowseScreen::new(backend.session().username())),
        );

        let active_screen = if backend.session().is_authenticated() {
            ScreenId::Browse
        } else {
            ScreenId::Auth
        };

        Self {
            active_screen,
            previous_screen: None,
            screens,
            running: true,
            help_visible: false,
            search_active: false,
            search_query: String::new(),
            terminal_size: (0, 0),
            action_tx,
            action_rx,
            backend,
            profile_name,
            data_cancel: CancellationToken::new(),
            notification: None,
        }
    }

    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Run until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.terminal_size = tui.size().unwrap_or((80, 24));
        self.init_screens()?;

        if self.active_screen == ScreenId::Browse {
            self.action_tx.send(Action::Reload)?;
        }

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!(screen = %self.active_screen, "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Global keys first, then the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        // The auth form takes every other key as input.
        if self.active_screen == ScreenId::Auth {
            if let Some(screen) = self.screens.get_mut(&ScreenId::Auth) {
                return screen.handle_key_event(key);
            }
            return Ok(None);
        }

        if self.search_active {
            return match key.code {
                KeyCode::Esc => {
                    self.search_query.clear();
                    Ok(Some(Action::CloseSearch))
                }
                // Keep the query applied, just hide the bar.
                KeyCode::Enter => {
                    self.search_active = false;
                    Ok(None)
                }
                KeyCode::Backspace => {
                    self.search_query.pop();
                    Ok(Some(Action::SearchInput(self.search_query.clone())))
                }
                KeyCode::Char(c) => {
                    self.search_query.push(c);
                    Ok(Some(Action::SearchInput(self.search_query.clone())))
                }
                _ => Ok(None),
            };
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char('/')) if self.active_screen == ScreenId::Browse => {
                return Ok(Some(Action::OpenSearch));
            }
            _ => {}
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }
        Ok(None)
    }

    /// Update one screen and queue whatever it asks for next.
    fn forward(&mut self, id: ScreenId, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&id) {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    /// Mount a fresh screen in place of any existing one.
    fn mount(&mut self, id: ScreenId, mut screen: Box<dyn Component>) -> Result<()> {
        screen.init(self.action_tx.clone())?;
        screen.set_focused(id == self.active_screen);
        self.screens.insert(id, screen);
        Ok(())
    }

    fn switch_to(&mut self, target: ScreenId) {
        // No session, no browsing.
        let target = if target.requires_session() && !self.backend.session().is_authenticated() {
            ScreenId::Auth
        } else {
            target
        };
        if target == self.active_screen {
            return;
        }

        let from = self.screens.get(&self.active_screen).map_or("none", |s| s.id());
        debug!(from, to = %target, "switching screen");
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(false);
        }
        self.previous_screen = Some(self.active_screen);
        self.active_screen = target;
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
    }

    fn notify(&self, notification: Notification) -> Result<()> {
        self.action_tx.send(Action::Notify(notification))?;
        Ok(())
    }

    /// Start a new data token, cancelling whatever the old one guarded.
    fn reset_data_cancel(&mut self) -> CancellationToken {
        self.data_cancel.cancel();
        self.data_cancel = CancellationToken::new();
        self.data_cancel.clone()
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Resize(w, h) => {
                self.terminal_size = (*w, *h);
            }

            Action::Render => {}

            Action::Tick => {
                let expired = self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() > NOTIFICATION_TTL);
                if expired {
                    self.notification = None;
                }
                self.forward(self.active_screen, action)?;
            }

            // ── Navigation ────────────────────────────────────────────
            Action::SwitchScreen(target) => self.switch_to(*target),

            Action::GoBack => {
                let target = self.previous_screen.take().unwrap_or(ScreenId::Browse);
                self.switch_to(target);
                if self.active_screen != ScreenId::Movie {
                    self.screens.remove(&ScreenId::Movie);
                }
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::OpenSearch => {
                self.search_active = true;
                self.search_query.clear();
                // The bar starts empty, so the grid must drop any kept query.
                self.forward(ScreenId::Browse, &Action::SearchInput(String::new()))?;
            }

            Action::CloseSearch => {
                self.search_active = false;
                self.search_query.clear();
                self.forward(ScreenId::Browse, action)?;
            }

            Action::SearchInput(_) => self.forward(ScreenId::Browse, action)?,

            // ── Auth ──────────────────────────────────────────────────
            Action::AuthResponse(_) => self.forward(ScreenId::Auth, action)?,

            Action::SignedIn { username } => {
                info!(%username, profile = %self.profile_name, "signed in");
                self.forward(ScreenId::Browse, action)?;
                self.switch_to(ScreenId::Browse);
                self.previous_screen = None;
                self.action_tx.send(Action::Reload)?;
            }

            Action::SignOut => {
                if let Err(e) = self.backend.sign_out() {
                    warn!(error = %e, "sign-out failed");
                    self.notify(Notification::error(e.to_string()))?;
                    return Ok(());
                }
                self.reset_data_cancel();
                self.search_active = false;
                self.search_query.clear();
                self.help_visible = false;
                self.screens.remove(&ScreenId::Movie);
                self.switch_to(ScreenId::Auth);
                self.previous_screen = None;
                self.mount(ScreenId::Auth, Box::new(AuthScreen::new(self.backend.clone())))?;
                self.mount(ScreenId::Browse, Box::new(BrowseScreen::new(None)))?;
                self.notify(Notification::info("Signed out"))?;
            }

            // ── Browse ────────────────────────────────────────────────
            Action::Reload | Action::Browse(_) => self.forward(ScreenId::Browse, action)?,

            Action::FetchBrowse(generation) => {
                let cancel = self.reset_data_cancel();
                debug!(?generation, "spawning browse bootstrap");
                spawn_bootstrap(&self.backend, *generation, &self.action_tx, &cancel);
            }

            Action::OpenMovie(detail) => {
                info!(title = %detail.movie.title, route = %detail.route, "opening movie");
                self.mount(ScreenId::Movie, Box::new(MovieScreen::new((**detail).clone())))?;
                self.switch_to(ScreenId::Movie);
            }

            // ── Notifications ─────────────────────────────────────────
            Action::Notify(n) => {
                self.notification = Some((n.clone(), Instant::now()));
            }
        }

        Ok(())
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // The auth form gets the whole frame.
        if self.active_screen == ScreenId::Auth {
            if let Some(screen) = self.screens.get(&ScreenId::Auth) {
                screen.render(frame, area);
            }
            if let Some((ref notif, _)) = self.notification {
                Self::render_notification(frame, area, notif);
            }
            return;
        }

        let layout = Layout::vertical([
            Constraint::Min(1),    // screen content
            Constraint::Length(1), // status bar
        ])
        .split(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0]);
        }
        self.render_status_bar(frame, layout[1]);

        if let Some((ref notif, _)) = self.notification {
            Self::render_notification(frame, area, notif);
        }
        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    /// Search bar while searching, otherwise the profile indicator and
    /// key hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if self.search_active {
            let line = Line::from(vec![
                Span::styled(" / ", Style::default().fg(theme::MARQUEE_GOLD)),
                Span::styled(&self.search_query, Style::default().fg(theme::NEON_CYAN)),
                Span::styled("█", Style::default().fg(theme::NEON_CYAN)),
                Span::styled("  Esc clear  Enter keep", theme::key_hint()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            return;
        }

        let line = Line::from(vec![
            Span::styled(" ◆ ", Style::default().fg(theme::MARQUEE_GOLD)),
            Span::styled(&self.profile_name, Style::default().fg(theme::DIM_WHITE)),
            Span::styled(" │ ", theme::key_hint()),
            Span::styled(self.active_screen.label(), theme::title_style()),
            Span::styled(" │ ? help  / search  q quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help_width = 56u16.min(area.width.saturating_sub(4));
        let help_height = 18u16.min(area.height.saturating_sub(4));
        let x = area.width.saturating_sub(help_width) / 2;
        let y = area.height.saturating_sub(help_height) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            help_area,
        );

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let entry = |key: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(what, theme::key_hint()),
            ])
        };
        let heading = |text: &'static str| {
            Line::from(Span::styled(
                format!("  {text}"),
                Style::default().fg(theme::NEON_CYAN),
            ))
        };

        let help_text = vec![
            Line::from(""),
            heading("Browse"),
            entry("j/k ↑/↓", "Move up/down"),
            entry("g/G", "Top / bottom"),
            entry("t/T", "Next / previous theater"),
            entry("/", "Search titles"),
            entry("Esc", "Clear search and theater"),
            entry("Enter", "Movie details"),
            entry("r", "Reload"),
            entry("L", "Sign out"),
            Line::from(""),
            heading("Global"),
            entry("?", "This help"),
            entry("q Ctrl+C", "Quit"),
            Line::from(""),
            Line::from(Span::styled("  Esc or ? to close", theme::key_hint())),
        ];
        frame.render_widget(Paragraph::new(help_text), inner);
    }

    /// Toast in the bottom-right corner, above the status bar.
    fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
        let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
        let width = msg_len
            .saturating_add(6)
            .clamp(20, 60)
            .min(area.width.saturating_sub(2));
        let height = 3u16;
        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 2);
        let toast_area = Rect::new(area.x + x, area.y + y, width, height);

        let (border_color, icon) = match notif.level {
            NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
            NotificationLevel::Error => (theme::ERROR_RED, "✗"),
            NotificationLevel::Info => (theme::NEON_CYAN, "·"),
        };

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            toast_area,
        );
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(toast_area);
        frame.render_widget(block, toast_area);

        let line = Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
            Span::styled(&notif.message, Style::default().fg(theme::DIM_WHITE)),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }
}
