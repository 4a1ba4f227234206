//! Movie detail: one movie at one theater, with its showtimes split out
//! and the route and IMDb link the web client would navigate to.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use crate::action::{Action, MovieDetail};
use crate::component::Component;
use crate::theme;

pub struct MovieScreen {
    focused: bool,
    detail: MovieDetail,
}

impl MovieScreen {
    pub fn new(detail: MovieDetail) -> Self {
        Self {
            focused: false,
            detail,
        }
    }

    fn field<'a>(label: &'a str, value: impl Into<Span<'a>>) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {label:<11}"), theme::key_hint()),
            value.into(),
        ])
    }

    fn showtime_lines(&self) -> Vec<Line<'_>> {
        let times = self.detail.movie.showtimes.times();
        if times.is_empty() {
            return vec![Line::from(Span::styled(
                format!("    {}", self.detail.movie.showtimes.label()),
                Style::default().fg(theme::DIM_WHITE),
            ))];
        }
        times
            .into_iter()
            .map(|time| {
                Line::from(vec![
                    Span::styled("    ▸ ", theme::key_hint_key()),
                    Span::styled(time, Style::default().fg(theme::NEON_CYAN)),
                ])
            })
            .collect()
    }
}

impl Component for MovieScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => {
                Ok(Some(Action::GoBack))
            }
            _ => Ok(None),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let movie = &self.detail.movie;

        let block = Block::default()
            .title(format!(" {} ", movie.title))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

        let mut lines = vec![
            Line::from(""),
            Self::field(
                "Theater",
                Span::styled(self.detail.theater.as_str(), theme::theater_name()),
            ),
        ];
        if !self.detail.address.is_empty() {
            lines.push(Self::field(
                "Address",
                Span::styled(
                    self.detail.address.as_str(),
                    Style::default().fg(theme::DIM_WHITE),
                ),
            ));
        }
        lines.push(Self::field(
            "Rating",
            Span::styled(
                movie.rating.label(),
                theme::rating(movie.rating.as_str().is_some()).add_modifier(Modifier::BOLD),
            ),
        ));
        lines.push(Line::from(""));
        lines.push(Self::field("Showtimes", Span::raw("")));
        lines.extend(self.showtime_lines());
        lines.push(Line::from(""));
        lines.push(Self::field(
            "IMDb",
            Span::styled(
                self.detail.route.imdb_url(),
                Style::default()
                    .fg(theme::NEON_CYAN)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ));
        if let Some(ref image) = movie.image {
            lines.push(Self::field(
                "Poster",
                Span::styled(image.as_str(), Style::default().fg(theme::DIM_WHITE)),
            ));
        }
        lines.push(Self::field(
            "Route",
            Span::styled(self.detail.route.path(), theme::key_hint()),
        ));

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), layout[0]);

        let hints = Line::from(vec![
            Span::styled("  Esc ", theme::key_hint_key()),
            Span::styled("back  ", theme::key_hint()),
            Span::styled("q ", theme::key_hint_key()),
            Span::styled("quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn id(&self) -> &'static str {
        "movie"
    }
}
