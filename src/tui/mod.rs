//! Ratatui-based terminal UI.
//!
//! The dashboard has a side menu over the three views (introduction,
//! exploration, forecasting). Exploration filters by event labels; forecasting
//! filters by a date interval and exposes the horizon slider. Both render a
//! Plotters chart and the forecast metrics.

use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::pipeline::{
    EXPLORATION_HORIZON_DAYS, ViewOutput, clamp_range, run_exploration, run_forecasting, snap_horizon,
};
use crate::domain::{
    BASELINE_LABEL, DashboardConfig, EventId, EventVocabulary, Forecast, HORIZON_MAX_DAYS,
    HORIZON_MIN_DAYS, HORIZON_STEP_DAYS, PriceObservation, View,
};
use crate::error::AppError;
use crate::forecast::{ForecastError, Forecaster};
use crate::forecast::features::{date_from_epoch_days, epoch_days};
use crate::report::narrative;
use crate::report::{fmt_price, metric_cells};
use crate::session::Session;

mod plotters_chart;

use plotters_chart::{PointSeries, PricePlottersChart};

/// Export target when `--export` is not given.
const DEFAULT_EXPORT_PATH: &str = "brent_forecast.csv";

/// Series colors, indexed by event id.
const PALETTE: [(u8, u8, u8); 12] = [
    (255, 99, 71),
    (135, 206, 250),
    (144, 238, 144),
    (255, 215, 0),
    (221, 160, 221),
    (255, 165, 0),
    (64, 224, 208),
    (240, 128, 128),
    (173, 255, 47),
    (176, 196, 222),
    (255, 105, 180),
    (210, 180, 140),
];
const BASELINE_COLOR: (u8, u8, u8) = (150, 150, 150);
const OBSERVED_COLOR: (u8, u8, u8) = (255, 255, 255);

/// Start the TUI.
///
/// The data file is loaded before the terminal is touched, so a load failure
/// is reported like any other CLI error.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    let session = Session::open(&config)?;
    let mut app = App::new(session, &config);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Editable settings of the forecasting view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForecastField {
    Start,
    End,
    Horizon,
}

impl ForecastField {
    fn index(self) -> usize {
        match self {
            ForecastField::Start => 0,
            ForecastField::End => 1,
            ForecastField::Horizon => 2,
        }
    }

    fn next(self) -> Self {
        match self {
            ForecastField::Start => ForecastField::End,
            ForecastField::End | ForecastField::Horizon => ForecastField::Horizon,
        }
    }

    fn prev(self) -> Self {
        match self {
            ForecastField::Start | ForecastField::End => ForecastField::Start,
            ForecastField::Horizon => ForecastField::End,
        }
    }
}

struct App {
    session: Session,
    view: View,

    labels: BTreeSet<EventId>,
    label_cursor: usize,

    start: NaiveDate,
    end: NaiveDate,
    horizon: usize,
    field: ForecastField,
    editing_date: bool,
    date_input: String,

    export_path: PathBuf,
    status: String,

    // Cached per view; cleared whenever that view's parameters change.
    exploration: Option<ViewOutput>,
    forecasting: Option<ViewOutput>,
}

impl App {
    fn new(session: Session, config: &DashboardConfig) -> Self {
        let dataset = session.dataset();
        let labels = dataset.vocabulary.ids().collect();
        let (start, end) = (dataset.stats.first_date, dataset.stats.last_date);
        let status = match session.capability().forecaster() {
            Ok(_) => format!("Loaded {} rows from {}", dataset.len(), session.source().display()),
            Err(err) => err.to_string(),
        };

        Self {
            view: View::Introduction,
            labels,
            label_cursor: 0,
            start,
            end,
            horizon: snap_horizon(config.horizon),
            field: ForecastField::Start,
            editing_date: false,
            date_input: String::new(),
            export_path: config
                .export
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_PATH)),
            status,
            exploration: None,
            forecasting: None,
            session,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_date {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.show(self.view.next()),
            KeyCode::BackTab => self.show(self.view.prev()),
            KeyCode::Char('1') => self.show(View::Introduction),
            KeyCode::Char('2') => self.show(View::Exploration),
            KeyCode::Char('3') => self.show(View::Forecasting),
            KeyCode::Char('e') => self.export(),
            _ => match self.view {
                View::Introduction => {}
                View::Exploration => self.handle_exploration_key(code),
                View::Forecasting => self.handle_forecasting_key(code),
            },
        }
        false
    }

    fn handle_exploration_key(&mut self, code: KeyCode) {
        let n_labels = self.session.dataset().vocabulary.len();
        match code {
            KeyCode::Up => self.label_cursor = self.label_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.label_cursor + 1 < n_labels {
                    self.label_cursor += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let id = EventId(self.label_cursor);
                if !self.labels.remove(&id) {
                    self.labels.insert(id);
                }
                self.update_exploration();
            }
            KeyCode::Char('a') => {
                self.labels = self.session.dataset().vocabulary.ids().collect();
                self.update_exploration();
            }
            KeyCode::Char('n') => {
                self.labels.clear();
                self.update_exploration();
            }
            _ => {}
        }
    }

    fn handle_forecasting_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.field = self.field.prev(),
            KeyCode::Down => self.field = self.field.next(),
            KeyCode::Left => self.adjust_field(false),
            KeyCode::Right => self.adjust_field(true),
            KeyCode::Enter => {
                let current = match self.field {
                    ForecastField::Start => self.start,
                    ForecastField::End => self.end,
                    ForecastField::Horizon => return,
                };
                self.date_input = current.to_string();
                self.editing_date = true;
                self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
            }
            _ => {}
        }
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_date = false;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_date = false;
                self.apply_date_input();
            }
            KeyCode::Backspace => {
                self.date_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
    }

    /// Move the selected date by one horizon step, or the horizon by one slider step.
    fn adjust_field(&mut self, forward: bool) {
        let step = Days::new(HORIZON_STEP_DAYS as u64);
        let shift = |d: NaiveDate| {
            if forward {
                d.checked_add_days(step)
            } else {
                d.checked_sub_days(step)
            }
            .unwrap_or(d)
        };
        match self.field {
            ForecastField::Start => self.set_range(shift(self.start), self.end),
            ForecastField::End => self.set_range(self.start, shift(self.end)),
            ForecastField::Horizon => {
                let next = if forward {
                    self.horizon.saturating_add(HORIZON_STEP_DAYS)
                } else {
                    self.horizon.saturating_sub(HORIZON_STEP_DAYS)
                };
                self.horizon = snap_horizon(next);
                self.status = format!("horizon: {} days", self.horizon);
                self.update_forecasting();
            }
        }
    }

    fn apply_date_input(&mut self) {
        let trimmed = self.date_input.trim();
        let date = match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            Ok(d) => d,
            Err(e) => {
                self.status = format!("Invalid date '{trimmed}': {e}");
                return;
            }
        };
        match self.field {
            ForecastField::Start => self.set_range(date, self.end),
            ForecastField::End => self.set_range(self.start, date),
            ForecastField::Horizon => {}
        }
    }

    fn set_range(&mut self, start: NaiveDate, end: NaiveDate) {
        let (start, end) = clamp_range(self.session.dataset(), start, end);
        self.start = start;
        self.end = end;
        self.status = format!("interval: {start} .. {end}");
        self.update_forecasting();
    }

    fn show(&mut self, view: View) {
        self.view = view;
        self.refresh();
    }

    fn update_exploration(&mut self) {
        self.exploration = None;
        self.refresh();
    }

    fn update_forecasting(&mut self) {
        self.forecasting = None;
        self.refresh();
    }

    /// Compute the active view's output if it is not cached.
    fn refresh(&mut self) {
        let dataset = self.session.dataset();
        let capability = self.session.capability();
        match self.view {
            View::Introduction => {}
            View::Exploration => {
                if self.exploration.is_none() {
                    let out = run_exploration(dataset, capability, &self.labels, EXPLORATION_HORIZON_DAYS);
                    self.exploration = Some(out);
                }
            }
            View::Forecasting => {
                if self.forecasting.is_none() {
                    let out = run_forecasting(dataset, capability, self.start, self.end, self.horizon);
                    self.forecasting = Some(out);
                }
            }
        }
    }

    fn current_output(&self) -> Option<&ViewOutput> {
        match self.view {
            View::Introduction => None,
            View::Exploration => self.exploration.as_ref(),
            View::Forecasting => self.forecasting.as_ref(),
        }
    }

    fn export(&mut self) {
        let Some(output) = self.current_output() else {
            self.status = "Open the exploration or forecasting view to export its forecast.".to_string();
            return;
        };
        let Some(forecast) = output.forecast() else {
            let reason = output
                .skip_reason()
                .map(|r| r.to_string())
                .unwrap_or_default();
            self.status = format!("Nothing to export: {reason}");
            return;
        };
        self.status = match crate::io::export::write_forecast(&self.export_path, forecast) {
            Ok(_) => format!(
                "Exported {} rows to {}",
                forecast.rows.len(),
                self.export_path.display()
            ),
            Err(err) => {
                tracing::warn!(%err, "export failed");
                format!("Export failed: {err}")
            }
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(0)])
            .split(chunks[1]);
        self.draw_menu(frame, body[0]);
        match self.view {
            View::Introduction => self.draw_introduction(frame, body[1]),
            View::Exploration => self.draw_exploration(frame, body[1]),
            View::Forecasting => self.draw_forecasting(frame, body[1]),
        }

        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let dataset = self.session.dataset();
        let backend = match self.session.capability().forecaster() {
            Ok(f) => f.name(),
            Err(_) => "disabled",
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("brent", Style::default().fg(Color::Cyan)),
                Span::raw(" | Brent oil prices & geopolitical events"),
            ]),
            Line::from(Span::styled(
                format!(
                    "data: {} | rows: {} | period: {} .. {} | forecaster: {backend}",
                    self.session.source().display(),
                    dataset.len(),
                    dataset.stats.first_date,
                    dataset.stats.last_date,
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_menu(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = View::ALL
            .iter()
            .enumerate()
            .map(|(i, v)| ListItem::new(format!("{} {}", i + 1, v.title())))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Menu").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.view.index()));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_introduction(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = narrative::INTRODUCTION
            .split("\n\n")
            .flat_map(|para| [Line::from(para.replace('\n', " ")), Line::from("")])
            .collect();
        lines.push(Line::from(Span::styled(
            narrative::NAVIGATION_HINT,
            Style::default().fg(Color::Cyan),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(narrative::FOOTER, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().title(View::Introduction.title()).borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_exploration(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(area);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Min(0)])
            .split(cols[0]);
        self.draw_label_picker(frame, left[0]);
        self.draw_insight(frame, left[1]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(45),
                Constraint::Min(0),
                Constraint::Length(4),
            ])
            .split(cols[1]);

        let output = self.exploration.as_ref();
        self.draw_history_chart(frame, right[0], output);
        self.draw_forecast_chart(
            frame,
            right[1],
            output,
            &format!("Next {EXPLORATION_HORIZON_DAYS} days"),
        );
        draw_metrics(frame, right[2], output, EXPLORATION_HORIZON_DAYS);
    }

    fn draw_label_picker(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let vocabulary = &self.session.dataset().vocabulary;
        let items: Vec<ListItem> = vocabulary
            .ids()
            .map(|id| {
                let mark = if self.labels.contains(&id) { "[x]" } else { "[ ]" };
                let (r, g, b) = event_color(vocabulary, id);
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{mark} ")),
                    Span::styled(vocabulary.label(id).to_string(), Style::default().fg(Color::Rgb(r, g, b))),
                ]))
            })
            .collect();

        let title = format!("Events ({}/{})", self.labels.len(), vocabulary.len());
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.label_cursor));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_insight(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let vocabulary = &self.session.dataset().vocabulary;
        let label = vocabulary.label(EventId(self.label_cursor));

        let mut lines = Vec::new();
        match narrative::event_insight(label) {
            Some((title, text)) => {
                lines.push(Line::from(Span::styled(
                    title,
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(text));
            }
            None => lines.push(Line::from(narrative::INSIGHTS_PREAMBLE)),
        }

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Insights").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_forecasting(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(0), Constraint::Length(4)])
            .split(area);

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Min(0)])
            .split(rows[0]);

        let stats = &self.session.dataset().stats;
        let selected = self.forecasting.as_ref().map(|o| o.filtered.len()).unwrap_or(0);
        let info = vec![
            Line::from(narrative::FORECASTING_HELP),
            Line::from(""),
            Line::from(format!(
                "Available period: {} .. {}",
                stats.first_date, stats.last_date
            )),
            Line::from(Span::styled(
                format!("Selected records: {selected}"),
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ];
        let p = Paragraph::new(Text::from(info))
            .wrap(Wrap { trim: true })
            .block(Block::default().title(View::Forecasting.title()).borders(Borders::ALL));
        frame.render_widget(p, top[0]);

        self.draw_forecast_settings(frame, top[1]);

        let output = self.forecasting.as_ref();
        self.draw_forecast_chart(frame, rows[1], output, &format!("Next {} days", self.horizon));
        draw_metrics(frame, rows[2], output, self.horizon);
    }

    fn draw_forecast_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = vec![
            ListItem::new(format!("Start:   {}", self.start)),
            ListItem::new(format!("End:     {}", self.end)),
            ListItem::new(format!("Horizon: {} {} days", horizon_slider(self.horizon), self.horizon)),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.field.index()));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing_date {
            let hint = Paragraph::new(format!("New date: {}_", self.date_input))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_history_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, output: Option<&ViewOutput>) {
        let block = Block::default().title("Price history by event").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let observations = output.map(|o| o.filtered.observations.as_slice()).unwrap_or(&[]);
        let Some(data) = history_chart_data(observations, &self.session.dataset().vocabulary) else {
            draw_notice(frame, inner, "No events selected: nothing to plot.");
            return;
        };

        frame.render_widget(data.widget("date", "USD"), inner);
    }

    fn draw_forecast_chart(
        &self,
        frame: &mut ratatui::Frame<'_>,
        area: Rect,
        output: Option<&ViewOutput>,
        title: &str,
    ) {
        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(output) = output else {
            draw_notice(frame, inner, "Waiting for data...");
            return;
        };
        let Some(forecast) = output.forecast() else {
            let reason = output
                .skip_reason()
                .map(skip_message)
                .unwrap_or_default();
            draw_notice(frame, inner, &reason);
            return;
        };
        let Some(data) = forecast_chart_data(&output.filtered.observations, forecast) else {
            draw_notice(frame, inner, "Forecast has no finite values to plot.");
            return;
        };

        frame.render_widget(data.widget("date", "predicted USD"), inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = match self.view {
            View::Introduction => "Tab/1-3 views  q quit",
            View::Exploration => "Tab/1-3 views  ↑/↓ move  Space toggle  a all  n none  e export  q quit",
            View::Forecasting => "Tab/1-3 views  ↑/↓ select  ←/→ adjust  Enter edit date  e export  q quit",
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_metrics(frame: &mut ratatui::Frame<'_>, area: Rect, output: Option<&ViewOutput>, horizon: usize) {
    let block = Block::default().title("Forecast metrics").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(metrics) = output.and_then(|o| o.metrics()) else {
        let reason = output
            .and_then(|o| o.skip_reason())
            .map(skip_message)
            .unwrap_or_else(|| "No metrics available.".to_string());
        draw_notice(frame, inner, &reason);
        return;
    };

    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
        .split(inner);
    for ((label, value), cell) in metric_cells(metrics, horizon).into_iter().zip(cells.iter()) {
        let lines = vec![
            Line::from(Span::styled(label, Style::default().fg(Color::Gray))),
            Line::from(Span::styled(value, Style::default().add_modifier(Modifier::BOLD))),
        ];
        frame.render_widget(Paragraph::new(Text::from(lines)), *cell);
    }
}

fn draw_notice(frame: &mut ratatui::Frame<'_>, area: Rect, msg: &str) {
    let p = Paragraph::new(msg.to_string())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(p, area);
}

/// Human wording for a skipped forecast.
fn skip_message(err: &ForecastError) -> String {
    match err {
        ForecastError::EmptySelection => {
            "Select a valid interval or at least one event with data to see a forecast.".to_string()
        }
        other => other.to_string(),
    }
}

fn event_color(vocabulary: &EventVocabulary, id: EventId) -> (u8, u8, u8) {
    if vocabulary.label(id) == BASELINE_LABEL {
        BASELINE_COLOR
    } else {
        PALETTE[id.0 % PALETTE.len()]
    }
}

/// `[=====-------]` position of `horizon` on the slider.
fn horizon_slider(horizon: usize) -> String {
    const SLOTS: usize = 12;
    let span = HORIZON_MAX_DAYS - HORIZON_MIN_DAYS;
    let pos = horizon.clamp(HORIZON_MIN_DAYS, HORIZON_MAX_DAYS) - HORIZON_MIN_DAYS;
    let filled = 1 + pos * (SLOTS - 1) / span;
    format!("[{}{}]", "=".repeat(filled), "-".repeat(SLOTS - filled))
}

/// Everything a chart needs, computed outside the render call.
#[derive(Debug, Clone)]
struct ChartData {
    points: Vec<PointSeries>,
    line: Vec<(f64, f64)>,
    band: Vec<(f64, f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

impl ChartData {
    fn widget<'a>(&'a self, x_label: &'a str, y_label: &'a str) -> PricePlottersChart<'a> {
        PricePlottersChart {
            points: &self.points,
            line: &self.line,
            band: &self.band,
            x_bounds: self.x_bounds,
            y_bounds: self.y_bounds,
            x_label,
            y_label,
            fmt_x: fmt_axis_date,
            fmt_y: fmt_axis_price,
        }
    }
}

/// One point series per event present in `observations`.
fn history_chart_data(observations: &[PriceObservation], vocabulary: &EventVocabulary) -> Option<ChartData> {
    let mut by_event: Vec<(EventId, Vec<(f64, f64)>)> = Vec::new();
    for o in observations {
        let point = (epoch_days(o.date), o.price);
        match by_event.iter_mut().find(|(id, _)| *id == o.event) {
            Some((_, pts)) => pts.push(point),
            None => by_event.push((o.event, vec![point])),
        }
    }
    by_event.sort_by_key(|(id, _)| *id);

    let points: Vec<PointSeries> = by_event
        .into_iter()
        .map(|(id, points)| PointSeries {
            points,
            color: event_color(vocabulary, id),
        })
        .collect();

    let xs = observations.iter().map(|o| epoch_days(o.date));
    let ys = observations.iter().map(|o| o.price);
    Some(ChartData {
        points,
        line: Vec::new(),
        band: Vec::new(),
        x_bounds: bounds(xs, 0.0)?,
        y_bounds: bounds(ys, 0.05)?,
    })
}

/// Observed prices plus the forecast line and band.
fn forecast_chart_data(observations: &[PriceObservation], forecast: &Forecast) -> Option<ChartData> {
    let points = vec![PointSeries {
        points: observations
            .iter()
            .map(|o| (epoch_days(o.date), o.price))
            .collect(),
        color: OBSERVED_COLOR,
    }];
    let line: Vec<(f64, f64)> = forecast
        .rows
        .iter()
        .map(|r| (epoch_days(r.date), r.predicted_price))
        .collect();
    let band: Vec<(f64, f64, f64)> = forecast
        .rows
        .iter()
        .map(|r| (epoch_days(r.date), r.lower_bound, r.upper_bound))
        .collect();

    let xs = line.iter().map(|p| p.0).chain(points[0].points.iter().map(|p| p.0));
    let ys = band
        .iter()
        .flat_map(|b| [b.1, b.2])
        .chain(line.iter().map(|p| p.1))
        .chain(points[0].points.iter().map(|p| p.1));
    let x_bounds = bounds(xs, 0.0)?;
    let y_bounds = bounds(ys, 0.05)?;

    Some(ChartData {
        points,
        line,
        band,
        x_bounds,
        y_bounds,
    })
}

/// Finite min/max of `values`, padded by `pad_frac` of the span.
///
/// A single distinct value gets a unit-wide window so the chart still draws.
fn bounds(values: impl Iterator<Item = f64>, pad_frac: f64) -> Option<[f64; 2]> {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !(lo.is_finite() && hi.is_finite()) {
        return None;
    }
    if hi <= lo {
        return Some([lo - 0.5, hi + 0.5]);
    }
    let pad = ((hi - lo) * pad_frac).max(1e-12);
    Some([lo - pad, hi + pad])
}

fn fmt_axis_date(v: f64) -> String {
    date_from_epoch_days(v.round() as i64)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn fmt_axis_price(v: f64) -> String {
    fmt_price(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecasterKind, ModelSettings, RawRow};
    use crate::forecast::Capability;
    use crate::io::ingest::Dataset;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Twelve daily rows: eight labeled `A`, then four labeled `B`.
    fn app() -> App {
        let rows = (0..12u64)
            .map(|i| RawRow {
                line: i as usize + 2,
                date: ymd(2024, 1, 1) + Days::new(i),
                price: 80.0 + (i % 3) as f64,
                label: if i < 8 { "A" } else { "B" }.to_string(),
            })
            .collect();
        let dataset = Dataset::from_rows(rows).unwrap();
        let settings = ModelSettings {
            uncertainty_samples: 50,
            ..ModelSettings::default()
        };
        let capability = Capability::resolve(ForecasterKind::Additive, &settings);
        let session = Session::with_dataset(std::path::Path::new("brent.csv"), dataset, capability);
        App::new(session, &DashboardConfig::default())
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for &key in keys {
            assert!(!app.handle_key(key));
        }
    }

    #[test]
    fn toggling_labels_recomputes_the_exploration() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('2')]);
        assert_eq!(app.view, View::Exploration);
        assert_eq!(app.exploration.as_ref().unwrap().filtered.len(), 12);

        // The cursor starts on `A`; dropping it leaves the four `B` rows.
        press(&mut app, &[KeyCode::Char(' ')]);
        let out = app.exploration.as_ref().unwrap();
        assert_eq!(out.filtered.len(), 4);
        assert!(out.filtered.observations.iter().all(|o| o.event == EventId(1)));
        assert_eq!(out.filtered.indicators.names(), ["B"]);
        assert_eq!(out.forecast().unwrap().horizon, EXPLORATION_HORIZON_DAYS);

        press(&mut app, &[KeyCode::Char('n')]);
        let out = app.exploration.as_ref().unwrap();
        assert!(out.filtered.is_empty());
        assert_eq!(out.skip_reason(), Some(&ForecastError::EmptySelection));

        press(&mut app, &[KeyCode::Char('a')]);
        assert_eq!(app.exploration.as_ref().unwrap().filtered.len(), 12);
    }

    #[test]
    fn typed_end_before_start_is_clamped() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('3'), KeyCode::Down, KeyCode::Enter]);
        assert_eq!(app.field, ForecastField::End);
        assert!(app.editing_date);

        press(&mut app, &[KeyCode::Backspace; 10]);
        let typed: Vec<KeyCode> = "2023-06-01".chars().map(KeyCode::Char).collect();
        press(&mut app, &typed);
        press(&mut app, &[KeyCode::Enter]);

        assert!(!app.editing_date);
        assert_eq!((app.start, app.end), (ymd(2024, 1, 1), ymd(2024, 1, 1)));
        let out = app.forecasting.as_ref().unwrap();
        assert_eq!(out.filtered.len(), 1);
        assert_eq!(
            out.skip_reason(),
            Some(&ForecastError::TooFewRows { got: 1, min: 2 })
        );
    }

    #[test]
    fn start_stepped_past_the_data_drags_the_end_along() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('3'), KeyCode::Right]);
        assert_eq!(app.field, ForecastField::Start);
        assert_eq!((app.start, app.end), (ymd(2024, 1, 12), ymd(2024, 1, 12)));
        assert!(app.start <= app.end);
    }

    #[test]
    fn horizon_steps_stay_on_the_slider() {
        let mut app = app();
        press(&mut app, &[KeyCode::Char('3'), KeyCode::Down, KeyCode::Down]);
        assert_eq!(app.field, ForecastField::Horizon);
        assert_eq!(app.horizon, 90);

        for _ in 0..15 {
            press(&mut app, &[KeyCode::Right]);
            assert!((HORIZON_MIN_DAYS..=HORIZON_MAX_DAYS).contains(&app.horizon));
        }
        assert_eq!(app.horizon, HORIZON_MAX_DAYS);
        let forecast = app.forecasting.as_ref().unwrap().forecast().unwrap();
        assert_eq!(forecast.future().count(), HORIZON_MAX_DAYS);

        press(&mut app, &[KeyCode::Left]);
        assert_eq!(app.horizon, 330);

        for _ in 0..15 {
            press(&mut app, &[KeyCode::Left]);
            assert_eq!(app.horizon % HORIZON_STEP_DAYS, 0);
        }
        assert_eq!(app.horizon, HORIZON_MIN_DAYS);
        let forecast = app.forecasting.as_ref().unwrap().forecast().unwrap();
        assert_eq!(forecast.future().count(), HORIZON_MIN_DAYS);
    }

    #[test]
    fn switching_views_reuses_cached_outputs() {
        let mut app = app();
        assert!(app.exploration.is_none() && app.forecasting.is_none());

        press(&mut app, &[KeyCode::Char('2')]);
        let explored = app.exploration.as_ref().unwrap().filtered.observations.as_ptr();
        press(&mut app, &[KeyCode::Char('3')]);
        let forecasted = app.forecasting.as_ref().unwrap().filtered.observations.as_ptr();

        press(&mut app, &[KeyCode::Char('1'), KeyCode::Tab]);
        assert_eq!(app.view, View::Exploration);
        assert_eq!(app.exploration.as_ref().unwrap().filtered.observations.as_ptr(), explored);
        assert_eq!(app.forecasting.as_ref().unwrap().filtered.observations.as_ptr(), forecasted);

        // A horizon change only invalidates the forecasting view.
        press(&mut app, &[KeyCode::Tab, KeyCode::Down, KeyCode::Down, KeyCode::Right]);
        assert_eq!(app.horizon, 120);
        assert_eq!(app.forecasting.as_ref().unwrap().forecast().unwrap().horizon, 120);
        assert_eq!(app.exploration.as_ref().unwrap().filtered.observations.as_ptr(), explored);
    }

    #[test]
    fn horizon_slider_spans_its_bounds() {
        assert_eq!(horizon_slider(HORIZON_MIN_DAYS), "[=-----------]");
        assert_eq!(horizon_slider(HORIZON_MAX_DAYS), "[============]");
    }

    #[test]
    fn history_series_are_grouped_by_event() {
        let mut vocab = EventVocabulary::default();
        let a = vocab.intern("Gulf War");
        let base = vocab.intern(BASELINE_LABEL);
        let obs = [
            PriceObservation {
                date: ymd(1990, 8, 2),
                price: 20.0,
                event: a,
            },
            PriceObservation {
                date: ymd(1991, 3, 1),
                price: 19.0,
                event: base,
            },
            PriceObservation {
                date: ymd(1990, 8, 3),
                price: 21.0,
                event: a,
            },
        ];

        let data = history_chart_data(&obs, &vocab).unwrap();
        assert_eq!(data.points.len(), 2);
        assert_eq!(data.points[0].points.len(), 2);
        assert_eq!(data.points[1].color, BASELINE_COLOR);
        assert!(data.y_bounds[0] < 19.0 && data.y_bounds[1] > 21.0);
        assert!(history_chart_data(&[], &vocab).is_none());
    }

    #[test]
    fn single_value_still_gets_a_window() {
        assert_eq!(bounds([5.0, 5.0].into_iter(), 0.05), Some([4.5, 5.5]));
        assert_eq!(bounds([f64::NAN].into_iter(), 0.05), None);
    }

    #[test]
    fn axis_dates_render_as_months() {
        assert_eq!(fmt_axis_date(epoch_days(ymd(2020, 4, 21))), "2020-04");
    }
}
