//! TUI module - terminal map, workout list and entry form with ratatui

pub mod view;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    symbols,
    widgets::{
        canvas::{Canvas, Map as WorldMap, MapResolution, Points},
        Block, Borders, Clear, List, ListItem, ListState, Paragraph,
    },
};
use std::io::{stdout, Stdout};
use tracing::{debug, error};

use crate::db::Storage;
use crate::session::{SessionController, SessionState};
use crate::workout::WorkoutKind;
use view::{FormField, FormState, TuiView};

type Tui = Terminal<CrosstermBackend<Stdout>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Map,
    List,
}

/// App state for TUI
pub struct App<S> {
    session: SessionController<S, TuiView>,
    pane: Pane,
    list_state: ListState,
    confirm_reset: bool,
    should_quit: bool,
}

impl<S: Storage> App<S> {
    pub fn new(session: SessionController<S, TuiView>) -> Self {
        Self {
            session,
            pane: Pane::Map,
            list_state: ListState::default(),
            confirm_reset: false,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &SessionController<S, TuiView> {
        &self.session
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal()?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[1]);

        // Header
        let header = Paragraph::new("waymark - Running & Cycling Log")
            .style(Style::default().fg(Color::Cyan).bold())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, rows[0]);

        self.render_list(frame, columns[0]);
        self.render_map(frame, columns[1]);

        // Footer
        let view = self.session.ui();
        let hints = match (view.form.visible, self.pane) {
            (true, _) => "Enter: save | Esc: cancel | Tab: next field | ←/→: type",
            (false, Pane::Map) => "q: quit | Tab: list | arrows: move | Enter: add workout | +/-: zoom | D: reset",
            (false, Pane::List) => "q: quit | Tab: map | ↑/↓: select | Enter: show on map | D: reset",
        };
        let footer_text = match &view.status {
            Some(status) => Line::from(vec![
                Span::styled(status.clone(), Style::default().fg(Color::Yellow)),
                Span::raw("  "),
                Span::styled(hints, Style::default().fg(Color::DarkGray)),
            ]),
            None => Line::styled(hints, Style::default().fg(Color::DarkGray)),
        };
        let footer = Paragraph::new(footer_text).block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, rows[2]);

        if view.form.visible {
            self.render_form(frame, area);
        }
    }

    fn render_list(&mut self, frame: &mut Frame, area: Rect) {
        let view = self.session.ui();
        let items: Vec<ListItem> = view
            .entries
            .iter()
            .map(|entry| {
                let color = kind_color(entry.kind);
                ListItem::new(vec![
                    Line::styled(entry.title.clone(), Style::default().fg(color).bold()),
                    Line::raw(entry.details.clone()),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(pane_block("Workouts", self.pane == Pane::List))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn render_map(&self, frame: &mut Frame, area: Rect) {
        let view = self.session.ui();
        let block = pane_block("Map", self.pane == Pane::Map);

        let Some(center) = view.center else {
            let placeholder = Paragraph::new("Map unavailable: no current location")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        };

        let (half_width, half_height) = view.span();
        let canvas = Canvas::default()
            .block(block.title_bottom(format!(" {} | z{} ", view.cursor, view.zoom)))
            .marker(symbols::Marker::Braille)
            .x_bounds([center.lng - half_width, center.lng + half_width])
            .y_bounds([center.lat - half_height, center.lat + half_height])
            .paint(|ctx| {
                ctx.draw(&WorldMap {
                    resolution: MapResolution::High,
                    color: Color::DarkGray,
                });
                ctx.layer();
                for marker in &view.markers {
                    let color = popup_color(&marker.style_class);
                    let point = (marker.coords.lng, marker.coords.lat);
                    ctx.draw(&Points { coords: &[point], color });
                    ctx.print(point.0, point.1, Span::styled(marker.label.clone(), Style::default().fg(color)));
                }
                ctx.print(
                    view.cursor.lng,
                    view.cursor.lat,
                    Span::styled("+", Style::default().fg(Color::White).bold()),
                );
            });
        frame.render_widget(canvas, area);
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let form = &self.session.ui().form;
        let popup = centered_rect(46, 10, area);

        let kind_value = format!("< {} >", form.kind.label());
        let extra_value = match form.kind {
            WorkoutKind::Running => form.cadence.as_str(),
            WorkoutKind::Cycling => form.elevation_gain.as_str(),
        };
        let mut lines = vec![
            field_line(form, FormField::Kind, "Type", &kind_value),
            field_line(form, FormField::Distance, "Distance", &form.distance),
            field_line(form, FormField::Duration, "Duration", &form.duration),
            field_line(form, FormField::Extra, form.extra_label(), extra_value),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::raw(""));
            lines.push(Line::styled(error.clone(), Style::default().fg(Color::Red)));
        }

        let title = match self.session.state() {
            SessionState::AwaitingFormInput { pending } => format!(" New workout at {} ", pending),
            SessionState::Idle => " New workout ".to_string(),
        };
        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(kind_color(form.kind))),
        );
        frame.render_widget(Clear, popup);
        frame.render_widget(paragraph, popup);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            self.handle_key(key);
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.session.ui().form.visible {
            self.handle_form_key(key.code);
            return;
        }

        if key.code != KeyCode::Char('D') {
            self.confirm_reset = false;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => {
                self.pane = match self.pane {
                    Pane::Map => Pane::List,
                    Pane::List => Pane::Map,
                };
            }
            KeyCode::Char('D') => self.request_reset(),
            code => match self.pane {
                Pane::Map => self.handle_map_key(code),
                Pane::List => self.handle_list_key(code),
            },
        }
    }

    fn handle_map_key(&mut self, code: KeyCode) {
        if !self.session.is_map_ready() {
            return;
        }
        let view = self.session.ui_mut();
        match code {
            KeyCode::Up => view.move_cursor(1.0, 0.0),
            KeyCode::Down => view.move_cursor(-1.0, 0.0),
            KeyCode::Left => view.move_cursor(0.0, -1.0),
            KeyCode::Right => view.move_cursor(0.0, 1.0),
            KeyCode::Char('+') | KeyCode::Char('=') => view.zoom_by(1),
            KeyCode::Char('-') => view.zoom_by(-1),
            KeyCode::Enter => {
                let cursor = view.cursor;
                self.session.on_location_picked(cursor);
            }
            _ => {}
        }
    }

    fn handle_list_key(&mut self, code: KeyCode) {
        let len = self.session.ui().entries.len();
        if len == 0 {
            return;
        }
        match code {
            KeyCode::Up => {
                let i = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
                self.list_state.select(Some(i));
            }
            KeyCode::Down => {
                let i = self.list_state.selected().map_or(0, |i| (i + 1).min(len - 1));
                self.list_state.select(Some(i));
            }
            KeyCode::Enter => {
                let selected = self
                    .list_state
                    .selected()
                    .and_then(|i| self.session.ui().entries.get(i))
                    .map(|entry| entry.id.clone());
                if let Some(id) = selected {
                    self.session.on_list_item_activated(&id);
                }
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.session.on_cancel(),
            KeyCode::Enter => {
                let form = &self.session.ui().form;
                let (kind, fields) = (form.kind, form.raw_fields());
                match self.session.on_form_submitted(kind, &fields) {
                    Ok(workout) => {
                        self.list_state.select(Some(self.session.ui().entries.len().saturating_sub(1)));
                        debug!(id = %workout.id(), "Form submitted");
                    }
                    Err(e) => debug!(error = %e, "Form submission rejected"),
                }
            }
            KeyCode::Tab | KeyCode::Down => {
                let form = &mut self.session.ui_mut().form;
                form.focus = form.focus.next();
            }
            KeyCode::BackTab | KeyCode::Up => {
                let form = &mut self.session.ui_mut().form;
                form.focus = form.focus.prev();
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
                if self.session.ui().form.focus == FormField::Kind =>
            {
                let kind = self.session.ui().form.kind.toggled();
                self.session.on_kind_changed(kind);
            }
            KeyCode::Backspace => {
                if let Some(input) = self.session.ui_mut().form.focused_input() {
                    input.pop();
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
                if let Some(input) = self.session.ui_mut().form.focused_input() {
                    input.push(c);
                }
            }
            _ => {}
        }
    }

    fn request_reset(&mut self) {
        if !self.confirm_reset {
            self.confirm_reset = true;
            self.session.ui_mut().status = Some("Press D again to delete all workouts".to_string());
            return;
        }
        self.confirm_reset = false;
        self.list_state.select(None);
        match self.session.reset() {
            Ok(()) => self.session.ui_mut().status = Some("All workouts deleted".to_string()),
            Err(e) => {
                error!(error = %e, "Reset failed");
                self.session.ui_mut().status = Some(format!("Reset failed: {}", e));
            }
        }
    }
}

fn field_line(form: &FormState, field: FormField, label: &str, value: &str) -> Line<'static> {
    let focused = form.focus == field;
    let style = if focused {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default()
    };
    let cursor = if focused && field != FormField::Kind { "_" } else { "" };
    Line::from(vec![
        Span::raw(format!("{:<11}", label)),
        Span::styled(format!("{}{}", value, cursor), style),
    ])
}

fn kind_color(kind: WorkoutKind) -> Color {
    match kind {
        WorkoutKind::Running => Color::Green,
        WorkoutKind::Cycling => Color::Yellow,
    }
}

fn popup_color(style_class: &str) -> Color {
    match style_class {
        "running-popup" => kind_color(WorkoutKind::Running),
        "cycling-popup" => kind_color(WorkoutKind::Cycling),
        _ => Color::White,
    }
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default().borders(Borders::ALL).title(title).border_style(style)
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
