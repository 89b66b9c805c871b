//! TUI typing exercise demo
//!
//! A terminal typing test built on `typing-core`, using crossterm and ratatui.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p tui-typing -- [--policy <policy.json>] [text_file]
//! ```
//!
//! Without a text file a built-in sample is used. The policy file holds a `BehaviorPolicy` in
//! JSON, for example `{"confidenceMode": "off", "strictSpace": false}`; an unreadable or
//! malformed file falls back to the defaults.
//!
//! Set `TUI_TYPING_LOG=<path>` to write engine logs to a file (filtered by `RUST_LOG`, default
//! `typing_core=debug`).
//!
//! # Keys
//!
//! - Printable keys and Space: type
//! - Backspace: delete / step back into the previous word
//! - Esc: restart (the key is set by the policy's `quickRestart`: `off`, `esc`, `tab` or
//!   `enter`)
//! - Ctrl+R: restart
//! - Ctrl+C / Ctrl+Q: quit

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::{
    cell::Cell,
    env, fs,
    io::{self, stdout},
    path::PathBuf,
    process,
    rc::Rc,
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::EnvFilter;
use typing_core::{
    BehaviorPolicy, CharacterView, KeyInput, KeyResponse, QuickRestart, RowGeometryProvider,
    Subscription,
    TypingError, TypingEvent, TypingSession, WindowWord, WrappedRowGeometry, caret_slot,
    geometry::word_width,
};
use unicode_width::UnicodeWidthStr;

const SAMPLE_TEXT: &str = "the quick brown fox jumps over the lazy dog while a small crowd \
    of curious ducks watches from the far side of the pond and wonders why anyone would \
    practice typing on a sunny afternoon when there is bread to share and water to splash";

/// Keystroke counters fed by the event bus.
#[derive(Default)]
struct Keystrokes {
    correct: Cell<usize>,
    incorrect: Cell<usize>,
}

impl Keystrokes {
    fn record(&self, event: &TypingEvent) {
        if let TypingEvent::Add { character, .. } = event {
            let counter = if character.is_correct() {
                &self.correct
            } else {
                &self.incorrect
            };
            counter.set(counter.get() + 1);
        }
    }

    fn total(&self) -> usize {
        self.correct.get() + self.incorrect.get()
    }
}

/// Application state
struct App {
    text: String,
    policy: BehaviorPolicy,
    session: TypingSession<WrappedRowGeometry>,
    keystrokes: Rc<Keystrokes>,
    _keystroke_feed: Subscription<TypingEvent>,
    should_quit: bool,
    status_message: String,
}

impl App {
    fn new(text: String, policy: BehaviorPolicy) -> Result<Self, TypingError> {
        let session = TypingSession::new(&text, policy, WrappedRowGeometry::new(0))?;
        let keystrokes = Rc::new(Keystrokes::default());
        let feed = keystrokes.clone();
        let keystroke_feed = session.events().subscribe(move |event| feed.record(event));

        Ok(Self {
            text,
            policy,
            session,
            keystrokes,
            _keystroke_feed: keystroke_feed,
            should_quit: false,
            status_message: String::new(),
        })
    }

    fn restart(&mut self) {
        let width = self.session.geometry().width();
        match App::new(self.text.clone(), self.policy) {
            Ok(mut app) => {
                app.session.geometry_mut().set_width(width);
                app.session.relayout();
                *self = app;
            }
            Err(err) => self.status_message = format!("restart failed: {err}"),
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            self.should_quit = true;
            return;
        }
        if ctrl && key.code == KeyCode::Char('r') {
            self.restart();
            return;
        }

        let Some(input) = key_input(key) else {
            return;
        };

        if self.session.is_finished() {
            if self.policy.quick_restart.accepts(input) {
                self.restart();
            }
            return;
        }

        if !self.session.has_started() {
            if !matches!(input, KeyInput::Char(_)) {
                return;
            }
            self.session.start();
        }

        match self.session.handle_key(input) {
            Ok(KeyResponse::RestartRequested) => self.restart(),
            Ok(KeyResponse::Finished) => {
                self.status_message = format!(
                    "Finished. {} restarts, Ctrl-C quits",
                    restart_label(self.policy.quick_restart)
                );
            }
            Ok(KeyResponse::Handled {
                pruned: Some(report),
            }) => {
                tracing::debug!(
                    archived = report.archived.len(),
                    first_absolute = report.first_absolute,
                    "row scrolled out"
                );
            }
            Ok(_) => {}
            Err(err) => self.status_message = err.to_string(),
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // words
                Constraint::Length(1), // status line
                Constraint::Length(1), // shortcuts
            ])
            .split(size);

        let words_area = chunks[0];
        let width = words_area.width.saturating_sub(2) as usize;
        if width > 0 && width != self.session.geometry().width() {
            self.session.geometry_mut().set_width(width);
            self.session.relayout();
        }

        self.render_words(frame, words_area);
        self.render_status_line(frame, chunks[1]);
        self.render_shortcuts(frame, chunks[2]);
    }

    fn render_words(&self, frame: &mut Frame, area: Rect) {
        let state = self.session.state();
        let window = state.window();
        let geometry = self.session.geometry();
        let visible_rows = area.height.saturating_sub(2) as usize;

        let lines: Vec<Line> = (0..geometry.row_count().min(visible_rows))
            .map(|row| {
                let mut spans = Vec::new();
                for position in geometry.words_on_row(row) {
                    if !spans.is_empty() {
                        spans.push(Span::raw(" "));
                    }
                    if let Some(word) = window.get(position) {
                        spans.extend(word_spans(word));
                    }
                }
                Line::from(spans)
            })
            .collect();

        let block = Block::default().borders(Borders::ALL).title(" typing ");
        frame.render_widget(Paragraph::new(lines).block(block), area);

        if self.session.is_finished() {
            return;
        }
        let Some(slot) = caret_slot(state) else {
            return;
        };
        let (Some(row), Some(column), Some(word)) = (
            geometry.row_index(slot.word_position),
            geometry.column(slot.word_position),
            window.get(slot.word_position),
        ) else {
            return;
        };
        if row >= visible_rows {
            return;
        }

        let offset: usize = word
            .letters()
            .take(slot.char_position)
            .map(|l| l.value().width())
            .sum();
        let x = area.x.saturating_add(1 + (column + offset).min(u16::MAX as usize - 1) as u16);
        let y = area.y + 1 + row as u16;
        if x < area.x + area.width.saturating_sub(1) {
            frame.set_cursor_position((x, y));
        }
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            format!("{} | {}", self.status_message, self.stats_text())
        } else if !self.session.has_started() {
            "Start typing to begin".to_string()
        } else {
            self.stats_text()
        };

        let status_line = Paragraph::new(status_text).style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

        frame.render_widget(status_line, area);
    }

    fn stats_text(&self) -> String {
        let state = self.session.state();
        let committed = state.archived_count() + state.typed_words().len();
        let total = committed + state.words().len();
        let accuracy = match self.keystrokes.total() {
            0 => 100.0,
            n => self.keystrokes.correct.get() as f64 * 100.0 / n as f64,
        };

        format!(
            "words:{committed}/{total} | keys:{} | acc:{accuracy:.1}% | scrolled:{}",
            self.keystrokes.total(),
            state.archived_count()
        )
    }

    fn render_shortcuts(&self, frame: &mut Frame, area: Rect) {
        let shortcuts = format!(
            "{}:restart  Backspace:delete  Ctrl-C/Q:quit",
            restart_label(self.policy.quick_restart)
        );
        let shortcuts_line =
            Paragraph::new(shortcuts).style(Style::default().bg(Color::Blue).fg(Color::White));

        frame.render_widget(shortcuts_line, area);
    }
}

fn restart_label(quick_restart: QuickRestart) -> &'static str {
    match quick_restart {
        QuickRestart::Off => "Ctrl-R",
        QuickRestart::Esc => "Esc",
        QuickRestart::Tab => "Tab",
        QuickRestart::Enter => "Enter",
    }
}

fn key_input(key: KeyEvent) -> Option<KeyInput> {
    match key.code {
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        KeyCode::Backspace => Some(KeyInput::Backspace),
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Tab | KeyCode::BackTab => Some(KeyInput::Tab),
        KeyCode::Esc => Some(KeyInput::Escape),
        KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => Some(KeyInput::Arrow),
        KeyCode::Modifier(_) => Some(KeyInput::Modifier),
        _ => None,
    }
}

fn word_spans(word: WindowWord<'_>) -> Vec<Span<'_>> {
    let committed_wrong = matches!(word, WindowWord::Committed(w) if !w.is_correct());
    let underline = if committed_wrong {
        Modifier::UNDERLINED
    } else {
        Modifier::empty()
    };

    let mut spans: Vec<Span> = word
        .letters()
        .map(|letter| {
            let style = match letter {
                CharacterView::Pending(_) => Style::default().fg(Color::DarkGray),
                CharacterView::Typed(c) if c.is_extra => Style::default().fg(Color::LightRed),
                CharacterView::Typed(c) if c.is_skipped() => Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT),
                CharacterView::Typed(c) if c.is_correct() => Style::default().fg(Color::White),
                CharacterView::Typed(_) => Style::default().fg(Color::Red),
            };
            Span::styled(letter.value(), style.add_modifier(underline))
        })
        .collect();

    if spans.is_empty() {
        spans.push(Span::raw(" ".repeat(word_width(&word))));
    }
    spans
}

struct Options {
    policy: BehaviorPolicy,
    text_file: Option<PathBuf>,
}

fn parse_args(program: &str, args: impl Iterator<Item = String>) -> Options {
    let mut options = Options {
        policy: BehaviorPolicy::default(),
        text_file: None,
    };

    let mut args = args;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--policy" => {
                let Some(path) = args.next() else {
                    eprintln!("usage: {program} [--policy <policy.json>] [text_file]");
                    process::exit(1);
                };
                options.policy = match fs::read_to_string(&path) {
                    Ok(json) => BehaviorPolicy::from_json_or_default(&json),
                    Err(err) => {
                        eprintln!("cannot read policy {path}: {err}; using defaults");
                        BehaviorPolicy::default()
                    }
                };
            }
            _ => options.text_file = Some(PathBuf::from(arg)),
        }
    }
    options
}

fn init_logging() {
    let Ok(path) = env::var("TUI_TYPING_LOG") else {
        return;
    };
    let file = match fs::File::create(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("cannot open log file {path}: {err}");
            return;
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("typing_core=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn main() -> io::Result<()> {
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "tui-typing".to_string());
    let options = parse_args(&program, args);

    init_logging();

    let text = match &options.text_file {
        Some(path) => fs::read_to_string(path)?,
        None => SAMPLE_TEXT.to_string(),
    };
    let mut app = match App::new(text, options.policy) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    };

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("error: {err}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => app.handle_key_event(key),
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    Ok(())
}
