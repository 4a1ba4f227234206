//! Browse screen: every movie at every theater, narrowed by the search
//! bar and a theater selector.
//!
//! The screen owns the loaded data ([`BrowseState`]) and the filter. The
//! grid is re-derived from both whenever either changes. Fetching itself
//! is the app's job: a reload bumps the generation here and hands it to
//! the app, which spawns the bootstrap tasks.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};
use tracing::debug;

use marquee_core::{
    BrowseEvent, BrowseFilter, BrowseState, Loadable, Theater, TheaterSelection, theater_names,
};

use crate::action::{Action, MovieDetail};
use crate::component::Component;
use crate::theme;

const NO_MOVIES: &str = "No movies found.";

pub struct BrowseScreen {
    focused: bool,
    state: BrowseState,
    filter: BrowseFilter,
    username: Option<String>,
    /// Selector options, in listing order.
    names: Vec<String>,
    /// Filtered theaters that still have movies.
    visible: Vec<Theater>,
    /// (theater, movie) index pairs into `visible`, one per grid row.
    rows: Vec<(usize, usize)>,
    table_state: TableState,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

impl BrowseScreen {
    pub fn new(username: Option<String>) -> Self {
        Self {
            focused: false,
            state: BrowseState::new(),
            filter: BrowseFilter::default(),
            username,
            names: Vec::new(),
            visible: Vec::new(),
            rows: Vec::new(),
            table_state: TableState::default(),
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    /// Re-derive the grid from the loaded theaters and the filter.
    fn recompute(&mut self) {
        let Some(theaters) = self.state.theaters.ready() else {
            self.names.clear();
            self.visible.clear();
            self.rows.clear();
            self.table_state.select(None);
            return;
        };

        self.names = theater_names(theaters);
        // A reload can drop the selected theater.
        let vanished = matches!(
            &self.filter.selection,
            TheaterSelection::Named(name) if !self.names.contains(name)
        );
        if vanished {
            self.filter.selection = TheaterSelection::All;
        }

        self.visible = self
            .filter
            .apply(theaters)
            .into_iter()
            .filter(Theater::has_movies)
            .collect();
        self.rows = self
            .visible
            .iter()
            .enumerate()
            .flat_map(|(t, theater)| (0..theater.movies.len()).map(move |m| (t, m)))
            .collect();

        let selected = self.table_state.selected().unwrap_or(0);
        self.select(selected);
    }

    fn select(&mut self, idx: usize) {
        if self.rows.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(idx.min(self.rows.len() - 1)));
        }
    }

    fn move_down(&mut self) {
        let idx = self.table_state.selected().map_or(0, |i| i.saturating_add(1));
        self.select(idx);
    }

    fn move_up(&mut self) {
        let idx = self.table_state.selected().unwrap_or(0).saturating_sub(1);
        self.select(idx);
    }

    fn cycle_theater(&mut self, forward: bool) {
        self.filter.selection = if forward {
            self.filter.selection.cycle_next(&self.names)
        } else {
            self.filter.selection.cycle_prev(&self.names)
        };
        debug!(selection = %self.filter.selection, "theater selection changed");
        self.table_state.select(Some(0));
        self.recompute();
    }

    fn selected_detail(&self) -> Option<MovieDetail> {
        let &(t, m) = self.rows.get(self.table_state.selected()?)?;
        let theater = self.visible.get(t)?;
        let movie = theater.movies.get(m)?;
        Some(MovieDetail::new(theater, movie))
    }

    fn total_movies(&self) -> usize {
        self.state
            .theaters
            .ready()
            .map_or(0, |ts| ts.iter().map(|t| t.movies.len()).sum())
    }

    // ── Rendering helpers ───────────────────────────────────────────

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let selection = &self.filter.selection;
        let mut left = vec![
            Span::styled(" Theater ", theme::key_hint()),
            Span::styled("◀ ", theme::key_hint_key()),
            Span::styled(selection.label(), theme::theater_name()),
            Span::styled(" ▶", theme::key_hint_key()),
        ];
        if !self.filter.search_query.is_empty() {
            left.push(Span::styled("   Search ", theme::key_hint()));
            left.push(Span::styled(
                format!("\"{}\"", self.filter.search_query),
                Style::default().fg(theme::NEON_CYAN),
            ));
        }

        let who = self.username.as_deref().unwrap_or("signed in");
        let mut right = vec![Span::styled(
            format!("● {who}"),
            Style::default().fg(theme::SUCCESS_GREEN),
        )];
        match &self.state.profile_picture {
            Loadable::Ready(Some(_)) => {
                right.push(Span::styled("  🖼 photo ", theme::key_hint()));
            }
            Loadable::Loading => right.push(Span::styled("  … ", theme::key_hint())),
            // No picture, or the fetch failed: leave it out.
            Loadable::Ready(None) | Loadable::Failed(_) => right.push(Span::raw(" ")),
        }

        frame.render_widget(Paragraph::new(Line::from(left)), area);
        frame.render_widget(
            Paragraph::new(Line::from(right)).alignment(Alignment::Right),
            area,
        );
    }

    fn render_grid(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(["Theater", "Title", "Rating", "Showtimes"]).style(theme::table_header());

        let rows: Vec<Row> = self
            .rows
            .iter()
            .filter_map(|&(t, m)| {
                let theater = self.visible.get(t)?;
                let movie = theater.movies.get(m)?;
                let theater_cell = if m == 0 {
                    Cell::from(theater.name.as_str()).style(theme::theater_name())
                } else {
                    Cell::from("")
                };
                Some(
                    Row::new(vec![
                        theater_cell,
                        Cell::from(movie.title.as_str()),
                        Cell::from(movie.rating.label())
                            .style(theme::rating(movie.rating.as_str().is_some())),
                        Cell::from(movie.showtimes.label()),
                    ])
                    .style(theme::table_row()),
                )
            })
            .collect();

        let widths = [
            Constraint::Fill(2),
            Constraint::Fill(3),
            Constraint::Length(10),
            Constraint::Fill(3),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state;
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_body(&self, frame: &mut Frame, area: Rect) {
        if let Some(err) = self.state.blocking_error() {
            frame.render_widget(
                Paragraph::new(vec![
                    Line::from(""),
                    Line::from(Span::styled(err, theme::error_text())),
                    Line::from(""),
                    Line::from(vec![
                        Span::styled("r ", theme::key_hint_key()),
                        Span::styled("retry", theme::key_hint()),
                    ]),
                ])
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
                area,
            );
            return;
        }

        if self.state.theaters.is_loading() {
            let throbber = throbber_widgets_tui::Throbber::default()
                .label("  Loading theaters…")
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::MARQUEE_GOLD));
            frame.render_stateful_widget(throbber, area, &mut self.throbber_state.clone());
            return;
        }

        if self.rows.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(NO_MOVIES, Style::default().fg(theme::DIM_WHITE)))
                    .alignment(Alignment::Center),
                area,
            );
            return;
        }

        self.render_grid(frame, area);
    }
}

impl Component for BrowseScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('g') | KeyCode::Home => self.select(0),
            KeyCode::Char('G') | KeyCode::End => self.select(usize::MAX),
            KeyCode::Char('t') => self.cycle_theater(true),
            KeyCode::Char('T') => self.cycle_theater(false),
            KeyCode::Esc if self.filter.is_active() => {
                self.filter.clear();
                self.recompute();
            }
            KeyCode::Enter => {
                return Ok(self
                    .selected_detail()
                    .map(|detail| Action::OpenMovie(Box::new(detail))));
            }
            KeyCode::Char('r') => return Ok(Some(Action::Reload)),
            KeyCode::Char('L') => return Ok(Some(Action::SignOut)),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Reload => {
                let generation = self.state.begin();
                self.recompute();
                return Ok(Some(Action::FetchBrowse(generation)));
            }
            Action::Browse(event) => {
                let is_theaters = matches!(event, BrowseEvent::Theaters { .. });
                if self.state.apply(event.clone()) && is_theaters {
                    self.recompute();
                }
            }
            Action::SearchInput(query) => {
                self.filter.search_query.clone_from(query);
                self.table_state.select(Some(0));
                self.recompute();
            }
            Action::CloseSearch => {
                self.filter.search_query.clear();
                self.recompute();
            }
            Action::SignedIn { username } => {
                self.username = Some(username.clone());
            }
            Action::Tick if self.state.theaters.is_loading() => {
                self.throbber_state.calc_next();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let shown = self.rows.len();
        let total = self.total_movies();
        let title = if self.filter.is_active() {
            format!(" Now Showing ({shown}/{total}) ")
        } else {
            format!(" Now Showing ({total}) ")
        };

        let block = Block::default()
            .title(title)
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

        let layout = Layout::vertical([
            Constraint::Length(1), // selector + profile
            Constraint::Length(1), // spacer
            Constraint::Min(1),    // grid
            Constraint::Length(1), // hints
        ])
        .split(inner);

        self.render_header(frame, layout[0]);
        self.render_body(frame, layout[2]);

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("move  ", theme::key_hint()),
            Span::styled("t/T ", theme::key_hint_key()),
            Span::styled("theater  ", theme::key_hint()),
            Span::styled("/ ", theme::key_hint_key()),
            Span::styled("search  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("details  ", theme::key_hint()),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("reload  ", theme::key_hint()),
            Span::styled("L ", theme::key_hint_key()),
            Span::styled("sign out", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[3]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn id(&self) -> &'static str {
        "browse"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::KeyModifiers;
    use marquee_core::{Generation, Movie, Rating, Showtimes};
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    fn movie(title: &str, imdb_id: &str, showtimes: Option<&str>) -> Movie {
        Movie {
            title: title.into(),
            rating: Rating::Rated("7.9".into()),
            showtimes: Showtimes::from_wire(showtimes),
            imdb_id: imdb_id.into(),
            image: None,
        }
    }

    fn theaters() -> Vec<Theater> {
        vec![
            Theater {
                name: "Regal Village".into(),
                address: "961 Broxton Ave".into(),
                movies: vec![
                    movie("Dune: Part Two", "tt15239678", Some("7:00pm, 10:15pm")),
                    movie("Conclave", "tt20215234", None),
                ],
            },
            Theater {
                name: "Closed for Renovation".into(),
                address: String::new(),
                movies: vec![],
            },
            Theater {
                name: "Landmark".into(),
                address: "10850 W Pico Blvd".into(),
                movies: vec![movie("Dune", "tt1160419", Some("1:00pm"))],
            },
        ]
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// Reload and deliver the theater list for that generation.
    fn loaded() -> BrowseScreen {
        let mut screen = BrowseScreen::new(Some("joe".into()));
        let generation = begin(&mut screen);
        screen
            .update(&Action::Browse(BrowseEvent::Theaters {
                generation,
                result: Ok(theaters()),
            }))
            .unwrap();
        screen
    }

    fn begin(screen: &mut BrowseScreen) -> Generation {
        match screen.update(&Action::Reload).unwrap() {
            Some(Action::FetchBrowse(generation)) => generation,
            other => panic!("expected a fetch request, got {other:?}"),
        }
    }

    fn titles(screen: &BrowseScreen) -> Vec<String> {
        screen
            .rows
            .iter()
            .map(|&(t, m)| screen.visible[t].movies[m].title.clone())
            .collect()
    }

    fn rendered(screen: &BrowseScreen) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 16)).unwrap();
        terminal.draw(|frame| screen.render(frame, frame.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn reload_starts_loading_and_requests_a_fetch() {
        let mut screen = loaded();
        begin(&mut screen);
        assert!(screen.state.theaters.is_loading());
        assert!(screen.rows.is_empty());
        assert!(rendered(&screen).contains("Loading theaters"));
    }

    #[test]
    fn grid_lists_every_movie_and_skips_empty_theaters() {
        let screen = loaded();
        assert_eq!(titles(&screen), vec!["Dune: Part Two", "Conclave", "Dune"]);
        assert_eq!(screen.table_state.selected(), Some(0));

        let text = rendered(&screen);
        assert!(text.contains("Regal Village"));
        assert!(!text.contains("Closed for Renovation"));
        assert!(text.contains("No showtimes listed"));
    }

    #[test]
    fn stale_results_do_not_reach_the_grid() {
        let mut screen = BrowseScreen::new(None);
        let first = begin(&mut screen);
        let second = begin(&mut screen);

        screen
            .update(&Action::Browse(BrowseEvent::Theaters {
                generation: first,
                result: Ok(theaters()),
            }))
            .unwrap();
        assert!(screen.rows.is_empty());
        assert!(screen.state.theaters.is_loading());

        screen
            .update(&Action::Browse(BrowseEvent::Theaters {
                generation: second,
                result: Ok(theaters()),
            }))
            .unwrap();
        assert_eq!(screen.rows.len(), 3);
    }

    #[test]
    fn search_narrows_case_insensitively() {
        let mut screen = loaded();
        screen.update(&Action::SearchInput("DUNE".into())).unwrap();
        assert_eq!(titles(&screen), vec!["Dune: Part Two", "Dune"]);

        screen.update(&Action::SearchInput("zzz".into())).unwrap();
        assert!(screen.rows.is_empty());
        assert!(rendered(&screen).contains(NO_MOVIES));

        screen.update(&Action::CloseSearch).unwrap();
        assert_eq!(screen.rows.len(), 3);
    }

    #[test]
    fn theater_selector_cycles_through_all_and_back() {
        let mut screen = loaded();
        screen.handle_key_event(key(KeyCode::Char('t'))).unwrap();
        assert_eq!(
            screen.filter.selection,
            TheaterSelection::Named("Regal Village".into())
        );
        assert_eq!(titles(&screen), vec!["Dune: Part Two", "Conclave"]);

        screen.handle_key_event(key(KeyCode::Char('T'))).unwrap();
        assert!(screen.filter.selection.is_all());

        // Backwards from All wraps to the last theater.
        screen.handle_key_event(key(KeyCode::Char('T'))).unwrap();
        assert_eq!(titles(&screen), vec!["Dune"]);

        screen.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert!(!screen.filter.is_active());
        assert_eq!(screen.rows.len(), 3);
    }

    #[test]
    fn enter_opens_the_selected_movie() {
        let mut screen = loaded();
        screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        assert_eq!(screen.table_state.selected(), Some(2));

        screen.handle_key_event(key(KeyCode::Char('g'))).unwrap();
        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        let Some(Action::OpenMovie(detail)) = action else {
            panic!("expected OpenMovie, got {action:?}");
        };
        assert_eq!(detail.theater, "Regal Village");
        assert_eq!(
            detail.route.path(),
            "/tt15239678?showtimes=7%3A00pm%2C+10%3A15pm"
        );
    }

    #[test]
    fn enter_on_an_empty_grid_does_nothing() {
        let mut screen = BrowseScreen::new(None);
        assert!(screen.handle_key_event(key(KeyCode::Enter)).unwrap().is_none());
    }

    #[test]
    fn theater_failure_replaces_the_grid() {
        let mut screen = BrowseScreen::new(None);
        let generation = begin(&mut screen);
        screen
            .update(&Action::Browse(BrowseEvent::Theaters {
                generation,
                result: Err("Failed to load theater data.".into()),
            }))
            .unwrap();
        assert!(rendered(&screen).contains("Failed to load theater data."));
    }

    #[test]
    fn picture_failure_leaves_the_grid_alone() {
        let mut screen = loaded();
        let generation = screen.state.generation();
        screen
            .update(&Action::Browse(BrowseEvent::ProfilePicture {
                generation,
                result: Err("Failed to fetch photo".into()),
            }))
            .unwrap();
        assert_eq!(screen.rows.len(), 3);
        let text = rendered(&screen);
        assert!(text.contains("Dune: Part Two"));
        assert!(!text.contains("Failed to fetch photo"));
    }

    #[test]
    fn reload_keeps_a_selection_that_still_exists() {
        let mut screen = loaded();
        screen.handle_key_event(key(KeyCode::Char('t'))).unwrap();
        let generation = begin(&mut screen);
        screen
            .update(&Action::Browse(BrowseEvent::Theaters {
                generation,
                result: Ok(theaters()),
            }))
            .unwrap();
        assert_eq!(titles(&screen), vec!["Dune: Part Two", "Conclave"]);

        let generation = begin(&mut screen);
        screen
            .update(&Action::Browse(BrowseEvent::Theaters {
                generation,
                result: Ok(theaters().split_off(2)),
            }))
            .unwrap();
        assert!(screen.filter.selection.is_all());
        assert_eq!(titles(&screen), vec!["Dune"]);
    }
}
