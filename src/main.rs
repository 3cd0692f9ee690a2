use std::io;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use fightcard_terminal::api::HttpPredictApi;
use fightcard_terminal::config::ClientConfig;
use fightcard_terminal::logging;
use fightcard_terminal::metadata::MetadataDisplay;
use fightcard_terminal::prediction::{UiState, format_percent};
use fightcard_terminal::provider::spawn_provider;
use fightcard_terminal::state::{self, AppState, ProviderCommand, Slot, apply_delta};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Category,
    Fighter(Slot),
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Category => Focus::Fighter(Slot::First),
            Focus::Fighter(Slot::First) => Focus::Fighter(Slot::Second),
            Focus::Fighter(Slot::Second) => Focus::Category,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Category => Focus::Fighter(Slot::Second),
            Focus::Fighter(Slot::First) => Focus::Category,
            Focus::Fighter(Slot::Second) => Focus::Fighter(Slot::First),
        }
    }
}

struct App {
    state: AppState,
    focus: Focus,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(state: AppState, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state,
            focus: Focus::Fighter(Slot::First),
            should_quit: false,
            cmd_tx,
        }
    }

    fn dispatch(&mut self, cmd: Option<ProviderCommand>) {
        let Some(cmd) = cmd else {
            return;
        };
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Provider unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Provider request failed");
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        if let Focus::Fighter(slot) = self.focus
            && focus != self.focus
        {
            let cmd = self.state.on_blur(slot);
            self.dispatch(cmd);
        }
        self.focus = focus;
    }

    fn on_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('d') if ctrl => self.state.toggle_details(),
            KeyCode::Tab => self.set_focus(self.focus.next()),
            KeyCode::BackTab => self.set_focus(self.focus.prev()),
            KeyCode::Esc => match self.focus {
                Focus::Fighter(slot) if !self.state.input(slot).suggestions.is_empty() => {
                    self.state.hide_suggestions(slot);
                }
                _ => self.should_quit = true,
            },
            KeyCode::Enter => {
                let picked = match self.focus {
                    Focus::Fighter(slot) => self.state.pick_highlighted(slot),
                    Focus::Category => None,
                };
                if picked.is_some() {
                    self.dispatch(picked);
                } else {
                    if let Focus::Fighter(slot) = self.focus {
                        let cmd = self.state.on_blur(slot);
                        self.dispatch(cmd);
                    }
                    let cmd = self.state.submit();
                    self.dispatch(cmd);
                }
            }
            _ => match self.focus {
                Focus::Category => self.on_category_key(key),
                Focus::Fighter(slot) => self.on_fighter_key(slot, key),
            },
        }
    }

    fn on_category_key(&mut self, key: KeyEvent) {
        let cmd = match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.state.cycle_category(false),
            KeyCode::Right | KeyCode::Char('l') => self.state.cycle_category(true),
            _ => None,
        };
        self.dispatch(cmd);
    }

    fn on_fighter_key(&mut self, slot: Slot, key: KeyEvent) {
        match key.code {
            KeyCode::Down => self.state.move_highlight(slot, true),
            KeyCode::Up => self.state.move_highlight(slot, false),
            KeyCode::Backspace => self.state.pop_char(slot),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.push_char(slot, ch)
            }
            _ => {}
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = ClientConfig::from_env();
    let log_guard = logging::init();
    let mut state = AppState::with_suggestion_limit(config.suggestion_limit);
    if let Err(err) = &log_guard {
        state.push_log(format!("[WARN] File logging disabled: {err}"));
    }

    let (tx, rx) = mpsc::channel();
    let cmd_tx = match HttpPredictApi::new(&config) {
        Ok(api) => {
            let (cmd_tx, cmd_rx) = mpsc::channel();
            spawn_provider(Arc::new(api), tx, cmd_rx);
            state.push_log(format!("[INFO] Prediction service: {}", config.base_url));
            Some(cmd_tx)
        }
        Err(err) => {
            state.push_log(format!("[WARN] Prediction service unavailable: {err:#}"));
            None
        }
    };

    let mut app = App::new(state, cmd_tx);
    for cmd in app.state.startup_commands() {
        app.dispatch(Some(cmd));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Min(6),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let category = Paragraph::new(category_text(&app.state)).block(
        Block::default()
            .title("Weight Class")
            .borders(Borders::ALL)
            .border_style(focus_style(app.focus == Focus::Category)),
    );
    frame.render_widget(category, chunks[1]);

    render_fighter_input(frame, chunks[2], app, Slot::First);
    render_fighter_input(frame, chunks[3], app, Slot::Second);

    let prediction = Paragraph::new(prediction_text(&app.state))
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Prediction").borders(Borders::ALL));
    frame.render_widget(prediction, chunks[4]);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[5]);

    let footer = Paragraph::new(footer_text(app.focus))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[6]);

    if let Focus::Fighter(slot) = app.focus {
        let anchor = if slot == Slot::First {
            chunks[2]
        } else {
            chunks[3]
        };
        render_suggestions(frame, anchor, &app.state, slot);
    }
}

fn header_text(state: &AppState) -> String {
    let status = if state.ui_state().is_loading() {
        " | predicting..."
    } else if state.directory.is_loading() {
        " | loading fighters..."
    } else {
        ""
    };
    format!("FIGHTCARD | {}{}", state.active_category(), status)
}

fn category_text(state: &AppState) -> String {
    let mut line = format!("< {} >", state.active_category());
    if let Some(notice) = &state.directory_notice {
        line.push_str(&format!("   ! {notice}"));
    }
    line
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn render_fighter_input(frame: &mut Frame, area: Rect, app: &App, slot: Slot) {
    let input = app.state.input(slot);
    let focused = app.focus == Focus::Fighter(slot);
    let cursor = if focused { "_" } else { "" };
    let text = format!(
        "{}{}\n{}",
        input.text,
        cursor,
        metadata_text(input.metadata.display())
    );
    let widget = Paragraph::new(text).block(
        Block::default()
            .title(slot.label())
            .borders(Borders::ALL)
            .border_style(focus_style(focused)),
    );
    frame.render_widget(widget, area);
}

fn metadata_text(display: &MetadataDisplay) -> String {
    match display {
        MetadataDisplay::Hidden => String::new(),
        MetadataDisplay::Loading { .. } => "Weight classes: looking up...".to_string(),
        MetadataDisplay::Found { weight_classes, .. } if weight_classes.is_empty() => {
            "Weight classes: none on record".to_string()
        }
        MetadataDisplay::Found { weight_classes, .. } => {
            format!("Weight classes: {}", weight_classes.join(", "))
        }
        MetadataDisplay::NotFound { name } => format!("Fighter not found: {name}"),
    }
}

fn render_suggestions(frame: &mut Frame, anchor: Rect, state: &AppState, slot: Slot) {
    let input = state.input(slot);
    if input.suggestions.is_empty() {
        return;
    }
    let room = frame.size().height.saturating_sub(anchor.y + anchor.height);
    let height = (input.suggestions.len() as u16 + 2).min(room);
    if height < 3 {
        return;
    }
    let area = Rect {
        x: anchor.x + 2,
        y: anchor.y + anchor.height,
        width: anchor.width.saturating_sub(4).min(48),
        height,
    };
    frame.render_widget(Clear, area);

    let lines: Vec<Line> = input
        .suggestions
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let style = if input.highlighted == Some(idx) {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::styled(name.clone(), style)
        })
        .collect();
    let list = Paragraph::new(lines)
        .block(Block::default().title("Suggestions").borders(Borders::ALL));
    frame.render_widget(list, area);
}

fn prediction_text(state: &AppState) -> String {
    match state.ui_state() {
        UiState::Idle => "Pick two fighters and press Enter".to_string(),
        UiState::Loading => "Loading...".to_string(),
        UiState::Error(message) => format!("Error: {message}"),
        UiState::Result(result) => {
            let mut lines = Vec::new();
            if let Some(summary) = &result.summary {
                lines.push(summary.clone());
            }
            lines.push(format!("Winner:         {}", result.winner));
            lines.push(format!("Win probability {}", result.win_probability_label()));
            lines.push(format!("Confidence      {}", result.confidence_label()));
            lines.push(format!("Weight class    {}", result.category));
            if let Some(line) = state.prediction.ratings_line() {
                lines.push(line);
            }
            if state.prediction.details_expanded() {
                lines.push(String::new());
                match &result.model_details {
                    Some(details) => {
                        lines.push(format!("Method          {}", details.method.label()));
                        lines.push(format!(
                            "Red model       {}",
                            format_percent(details.first_model_confidence)
                        ));
                        lines.push(format!(
                            "Blue model      {}",
                            format_percent(details.second_model_confidence)
                        ));
                    }
                    None => lines.push("No model details".to_string()),
                }
                lines.push(format!(
                    "Order randomized {}",
                    if result.order_randomized { "yes" } else { "no" }
                ));
            } else {
                lines.push("Ctrl-D: show details".to_string());
            }
            lines.join("\n")
        }
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn footer_text(focus: Focus) -> &'static str {
    match focus {
        Focus::Category => "Tab Next | ←/→ Weight class | Enter Predict | Ctrl-D Details | Esc Quit",
        Focus::Fighter(_) => {
            "Tab Next | ↑/↓ Suggestions | Enter Pick/Predict | Ctrl-D Details | Esc Hide/Quit"
        }
    }
}
