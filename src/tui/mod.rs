//! Ratatui-based terminal UI.
//!
//! The TUI is the interactive shell: a form with the nine wall parameters and a
//! section selector, the predicted outputs, and the wall diagram.
//!
//! Everything runs on one thread. A key press updates the form; the diagram is
//! redrawn when the section, shear span, or width-to-thickness ratio changes,
//! and again (with the crack overlay) after each prediction.

use std::io;
use std::time::Duration;

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
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline;
use crate::config::AssetPaths;
use crate::domain::{PARAMETER_NAMES, SectionType, WallParameters, WallPrediction, parse_parameter};
use crate::error::AppError;
use crate::plot::Drawing;
use crate::report::PARAMETER_LABELS;

mod plotters_chart;

use plotters_chart::WallDiagram;

/// Index of the section selector in the form (after the nine numeric fields).
const SECTION_FIELD: usize = PARAMETER_NAMES.len();

/// Start the TUI.
pub fn run(assets: AssetPaths, params: WallParameters) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::new(1, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(assets, params);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(1, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(1, format!("Failed to enter alternate screen: {e}")));
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

struct App {
    assets: AssetPaths,
    /// Raw text of the nine numeric fields, in form order.
    fields: [String; 9],
    section: SectionType,
    selected_field: usize,
    /// Text being typed while a field is in edit mode.
    editing: Option<String>,
    status: String,
    drawing: Drawing,
    prediction: Option<WallPrediction>,
}

impl App {
    fn new(assets: AssetPaths, params: WallParameters) -> Self {
        let mut app = Self {
            assets,
            fields: params.scalars().map(|v| v.to_string()),
            section: params.section_type,
            selected_field: 0,
            editing: None,
            status: "Press p to predict.".to_string(),
            drawing: Drawing::new(),
            prediction: None,
        };
        app.redraw_wall();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(1, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(1, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(1, format!("Event read error: {e}")))? {
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

    /// Apply one key press. Returns `true` when the user asked to quit.
    ///
    /// Failures never leave the loop: they are reported in the status line.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing.is_some() {
            self.handle_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field < SECTION_FIELD {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left | KeyCode::Right if self.selected_field == SECTION_FIELD => {
                self.section = if code == KeyCode::Right {
                    self.section.next()
                } else {
                    self.section.prev()
                };
                self.prediction = None;
                self.status = format!("section: {}", self.section);
                self.redraw_wall();
            }
            KeyCode::Enter if self.selected_field < SECTION_FIELD => {
                self.editing = Some(self.fields[self.selected_field].clone());
                self.status = format!(
                    "Editing {}. Enter to apply, Esc to cancel.",
                    PARAMETER_NAMES[self.selected_field]
                );
            }
            KeyCode::Char('p') => self.predict(),
            _ => {}
        }

        false
    }

    fn handle_edit(&mut self, code: KeyCode) {
        let Some(buffer) = self.editing.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let text = buffer.clone();
                self.editing = None;
                self.apply_edit(&text);
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E') => {
                buffer.push(c);
            }
            _ => {}
        }
    }

    fn apply_edit(&mut self, text: &str) {
        let name = PARAMETER_NAMES[self.selected_field];
        match parse_parameter(name, text) {
            Ok(_) => {
                self.fields[self.selected_field] = text.trim().to_string();
                self.prediction = None;
                self.status = format!("{name} = {}", text.trim());
                // The old crack overlay no longer matches the inputs.
                self.redraw_wall();
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    /// Parse every field. The first bad field is reported and nothing else happens.
    fn parameters(&self) -> Result<WallParameters, AppError> {
        let mut values = [0.0; 9];
        for ((slot, name), text) in values.iter_mut().zip(PARAMETER_NAMES).zip(&self.fields) {
            *slot = parse_parameter(name, text)?;
        }
        Ok(WallParameters::from_scalars(values, self.section))
    }

    fn redraw_wall(&mut self) {
        let result = self
            .parameters()
            .and_then(|params| pipeline::wall_drawing(&self.assets, &params, None));
        match result {
            Ok(drawing) => self.drawing = drawing,
            Err(err) => {
                self.drawing.clear();
                self.status = err.to_string();
            }
        }
    }

    fn predict(&mut self) {
        let params = match self.parameters() {
            Ok(params) => params,
            Err(err) => {
                self.status = err.to_string();
                return;
            }
        };

        match pipeline::run_prediction(&self.assets, &params) {
            Ok(run) => {
                self.status = format!("Predicted: {}", run.prediction.failure_mode);
                self.prediction = Some(run.prediction);
                self.drawing = run.drawing;
            }
            Err(err) => {
                tracing::warn!("Prediction failed: {err}");
                self.prediction = None;
                self.status = format!("Prediction failed: {err}");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let line = Line::from(vec![
            Span::styled("rcwall", Style::default().fg(Color::Cyan)),
            Span::raw(" - RC shear wall predictor"),
            Span::styled(
                format!("  | assets: {}", self.assets.root().display()),
                Style::default().fg(Color::Gray),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(44), Constraint::Min(0)])
            .split(area);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(12), Constraint::Min(0)])
            .split(columns[0]);

        self.draw_form(frame, left[0]);
        self.draw_outputs(frame, left[1]);
        self.draw_diagram(frame, columns[1]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items: Vec<ListItem> = PARAMETER_LABELS
            .iter()
            .zip(&self.fields)
            .enumerate()
            .map(|(idx, (label, text))| {
                let shown = match &self.editing {
                    Some(buffer) if idx == self.selected_field => format!("{buffer}_"),
                    _ => text.clone(),
                };
                ListItem::new(format!("{label:<16} {shown}"))
            })
            .collect();
        items.push(ListItem::new(format!("{:<16} < {} >", "Section", self.section)));

        let list = List::new(items)
            .block(Block::default().title("Parameters").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_outputs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let value_style = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
        let lines = match &self.prediction {
            Some(p) => {
                let row = |label: &'static str, value: String| {
                    Line::from(vec![Span::raw(label), Span::styled(value, value_style)])
                };
                vec![
                    row("Failure mode : ", p.failure_mode.to_string()),
                    row("V/(Ag fc)    : ", format!("{:.4}", p.strength)),
                    row("theta_u (%)  : ", format!("{:.4}", p.deformation)),
                ]
            }
            None => vec![Line::from(Span::styled("-", Style::default().fg(Color::Gray)))],
        };
        let p = Paragraph::new(Text::from(lines)).block(Block::default().title("Predictions").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_diagram(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Wall").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if self.drawing.strokes.is_empty() {
            let msg = Paragraph::new("Nothing to draw.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);
        frame.render_widget(WallDiagram { drawing: &self.drawing }, rows[0]);
        if let Some(caption) = &self.drawing.caption {
            let note = Paragraph::new(caption.as_str()).style(Style::default().fg(Color::Gray));
            frame.render_widget(note, rows[1]);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  Enter edit  ←/→ section  p predict  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}
