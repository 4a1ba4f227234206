//! Auth screen: sign in, register, or finish a sign-in with the emailed
//! verification code.
//!
//! The form state and its transitions live in [`AuthFlow`]; this screen
//! only maps keys onto its buffers and sends validated requests from a
//! spawned task so the UI keeps drawing while the backend answers.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use marquee_core::{AuthBackend, AuthFlow, AuthMode, AuthStep, Backend};

use crate::action::{Action, AuthResponse, Notification};
use crate::component::Component;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthField {
    Username,
    Email,
    Password,
    Otp,
}

impl AuthField {
    /// Fields shown for `mode`, in Tab order.
    fn for_mode(mode: AuthMode) -> &'static [AuthField] {
        match mode {
            AuthMode::SignIn => &[Self::Email, Self::Password],
            AuthMode::Register => &[Self::Username, Self::Email, Self::Password],
            AuthMode::VerifyOtp => &[Self::Otp],
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Username => "  Username",
            Self::Email => "  Email",
            Self::Password => "  Password",
            Self::Otp => "  Verification code",
        }
    }
}

pub struct AuthScreen {
    focused: bool,
    action_tx: Option<UnboundedSender<Action>>,
    backend: Backend,
    flow: AuthFlow,
    field: AuthField,
    submitting: bool,
    show_password: bool,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

impl AuthScreen {
    pub fn new(backend: Backend) -> Self {
        Self {
            focused: false,
            action_tx: None,
            backend,
            flow: AuthFlow::new(),
            field: AuthField::Email,
            submitting: false,
            show_password: false,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    fn fields(&self) -> &'static [AuthField] {
        AuthField::for_mode(self.flow.mode())
    }

    fn first_field(&mut self) {
        self.field = self.fields().first().copied().unwrap_or(AuthField::Email);
    }

    fn cycle_field(&mut self, forward: bool) {
        let fields = self.fields();
        let len = fields.len();
        let idx = fields.iter().position(|&f| f == self.field).unwrap_or(0);
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        self.field = fields.get(next).copied().unwrap_or(self.field);
    }

    fn input_mut(&mut self) -> &mut String {
        match self.field {
            AuthField::Username => &mut self.flow.username,
            AuthField::Email => &mut self.flow.email,
            AuthField::Password => &mut self.flow.password,
            AuthField::Otp => &mut self.flow.otp,
        }
    }

    fn value(&self, field: AuthField) -> &str {
        match field {
            AuthField::Username => &self.flow.username,
            AuthField::Email => &self.flow.email,
            AuthField::Password => &self.flow.password,
            AuthField::Otp => &self.flow.otp,
        }
    }

    /// Validate and, if the form is complete, send it in the background.
    fn submit(&mut self) {
        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        let Some(request) = self.flow.prepare() else {
            debug!(mode = %self.flow.mode(), "auth form rejected locally");
            return;
        };

        self.submitting = true;
        let backend = self.backend.clone();
        tokio::spawn(async move {
            let result = backend.authenticate(&request).await;
            if let Err(ref e) = result {
                warn!(error = %e, "auth request failed");
            }
            let _ = tx.send(Action::AuthResponse(Box::new(AuthResponse { request, result })));
        });
    }

    fn finish(&mut self, response: &AuthResponse) -> Option<Action> {
        self.submitting = false;
        let step = self
            .flow
            .complete(&response.request, response.result.clone());
        let notice = step.notice();
        match step {
            AuthStep::Authenticated { username } => {
                if let (Some(tx), Some(notice)) = (&self.action_tx, notice) {
                    let _ = tx.send(Action::Notify(Notification::success(notice)));
                }
                Some(Action::SignedIn { username })
            }
            AuthStep::AwaitingOtp => {
                self.field = AuthField::Otp;
                notice.map(|n| Action::Notify(Notification::info(n)))
            }
            AuthStep::Registered => {
                self.first_field();
                notice.map(|n| Action::Notify(Notification::success(n)))
            }
            AuthStep::Failed { .. } => None,
        }
    }

    // ── Rendering helpers ───────────────────────────────────────────

    fn render_panel(frame: &mut Frame, area: Rect) -> Rect {
        let panel_w = 56u16.min(area.width.saturating_sub(4));
        let panel_h = 21u16.min(area.height.saturating_sub(2));
        let x = area.width.saturating_sub(panel_w) / 2;
        let y = area.height.saturating_sub(panel_h) / 2;
        let panel = Rect::new(area.x + x, area.y + y, panel_w, panel_h);

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            panel,
        );

        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled("🎬 marquee", theme::title_style()),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(panel);
        frame.render_widget(block, panel);
        inner
    }

    fn render_mode_tabs(&self, frame: &mut Frame, area: Rect) {
        let mode = self.flow.mode();
        let line = if mode == AuthMode::VerifyOtp {
            Line::from(vec![Span::styled(
                format!("{mode} for {}", self.flow.email),
                theme::title_style(),
            )])
        } else {
            let tab = |m: AuthMode| {
                if m == mode {
                    Span::styled(format!(" {m} "), theme::table_selected())
                } else {
                    Span::styled(format!(" {m} "), theme::key_hint())
                }
            };
            Line::from(vec![
                tab(AuthMode::SignIn),
                Span::styled(" │ ", theme::key_hint()),
                tab(AuthMode::Register),
            ])
        };
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }

    fn render_input_field(&self, frame: &mut Frame, area: Rect, field: AuthField) {
        if area.height < 4 {
            return;
        }
        let active = field == self.field;
        let value = self.value(field);

        let label_style = if active {
            Style::default().fg(theme::NEON_CYAN)
        } else {
            Style::default().fg(theme::DIM_WHITE)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(field.label(), label_style)),
            Rect::new(area.x, area.y, area.width, 1),
        );

        let masked = field == AuthField::Password && !self.show_password;
        let display = if masked {
            "\u{25CF}".repeat(value.chars().count())
        } else {
            value.to_owned()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if active {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let box_area = Rect::new(area.x, area.y + 1, area.width, 3);
        let inner = block.inner(box_area);
        frame.render_widget(block, box_area);

        let text = if active && !self.submitting {
            format!("{display}\u{2588}")
        } else {
            display
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme::NEON_CYAN))),
            inner,
        );
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.submitting {
            let label = match self.flow.mode() {
                AuthMode::SignIn => "  Signing in…",
                AuthMode::Register => "  Registering…",
                AuthMode::VerifyOtp => "  Verifying…",
            };
            let throbber = throbber_widgets_tui::Throbber::default()
                .label(label)
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::MARQUEE_GOLD));
            frame.render_stateful_widget(throbber, area, &mut self.throbber_state.clone());
        } else if let Some(err) = self.flow.error() {
            frame.render_widget(
                Paragraph::new(Span::styled(err, theme::error_text()))
                    .alignment(Alignment::Center),
                area,
            );
        }
    }

    fn render_key_hints(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled("Tab ", theme::key_hint_key()),
            Span::styled("next  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("submit  ", theme::key_hint()),
        ];
        if self.flow.mode() == AuthMode::VerifyOtp {
            spans.push(Span::styled("Ctrl+C ", theme::key_hint_key()));
            spans.push(Span::styled("quit", theme::key_hint()));
        } else {
            let other = match self.flow.mode() {
                AuthMode::SignIn => "register",
                _ => "sign in",
            };
            spans.push(Span::styled("Ctrl+R ", theme::key_hint_key()));
            spans.push(Span::styled(format!("{other}  "), theme::key_hint()));
            spans.push(Span::styled("Ctrl+U ", theme::key_hint_key()));
            spans.push(Span::styled("show", theme::key_hint()));
        }
        frame.render_widget(
            Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
            area,
        );
    }
}

impl Component for AuthScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.submitting {
            return Ok(None);
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => {
                if self.flow.toggle() {
                    self.first_field();
                }
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
                self.show_password = !self.show_password;
            }
            (_, KeyCode::Tab | KeyCode::Down) => self.cycle_field(true),
            (_, KeyCode::BackTab | KeyCode::Up) => self.cycle_field(false),
            (_, KeyCode::Enter) => self.submit(),
            (_, KeyCode::Backspace) => {
                self.input_mut().pop();
            }
            (modifiers, KeyCode::Char(c)) if !modifiers.contains(KeyModifiers::CONTROL) => {
                self.input_mut().push(c);
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::AuthResponse(response) => return Ok(self.finish(response)),
            Action::Tick if self.submitting => self.throbber_state.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            area,
        );

        let inner = Self::render_panel(frame, area);
        let fields = self.fields();

        let mut constraints = vec![Constraint::Length(2)];
        constraints.extend(fields.iter().map(|_| Constraint::Length(4)));
        constraints.extend([
            Constraint::Min(0),
            Constraint::Length(1), // error or throbber
            Constraint::Length(1), // hints
        ]);
        let layout = Layout::vertical(constraints).split(inner);

        self.render_mode_tabs(frame, layout[0]);
        for (i, &field) in fields.iter().enumerate() {
            if let Some(&slot) = layout.get(i + 1) {
                self.render_input_field(frame, slot, field);
            }
        }

        let n = layout.len();
        self.render_status(frame, layout[n - 2]);
        self.render_key_hints(frame, layout[n - 1]);

        if self.flow.mode() == AuthMode::VerifyOtp && !self.submitting {
            let note = Paragraph::new(Span::styled(
                marquee_core::auth::NOTICE_CHECK_EMAIL,
                Style::default()
                    .fg(theme::DIM_WHITE)
                    .add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center);
            if let Some(&slot) = layout.get(fields.len() + 1) {
                frame.render_widget(note, Rect::new(slot.x, slot.y, slot.width, 1.min(slot.height)));
            }
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn id(&self) -> &'static str {
        "auth"
    }
}
