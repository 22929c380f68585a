//! Ratatui TUI frontend for the checkers client.
//!
//! Pure UI module: terminal lifecycle, rendering, and input → intent
//! mapping. All session state lives in [`checkers_client::game_state`] and
//! all networking in [`checkers_client::net_client`].

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color as TermColor, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use std::io::{self, Stdout};

use checkers_client::game_state::{ClientGameState, GameEvent, GameSnapshot, LogCategory};
use checkers_core::perspective::{BOARD_SIZE, Local, Position};
use checkers_core::protocol::Color;

/// Terminal columns per square: a space, the two-column glyph, a space.
const CELL_WIDTH: u16 = 4;
const BOARD_WIDTH: u16 = BOARD_SIZE as u16 * CELL_WIDTH + 2;
const BOARD_HEIGHT: u16 = BOARD_SIZE as u16 + 2;

// ---------------------------------------------------------------------------
// UserIntent — result of processing user input
// ---------------------------------------------------------------------------

/// The result of processing a user input event.
#[derive(Debug, PartialEq, Eq)]
pub enum UserIntent {
    /// Nothing to do (cursor moved, popup toggled, ...).
    None,
    /// The user wants to quit.
    Quit,
    /// The user clicked a square (local frame).
    Click(Position<Local>),
    /// The user pressed End Turn.
    Skip,
    /// Local feedback message. The event loop routes it through
    /// [`ClientController::add_message`](checkers_client::client_controller::ClientController::add_message).
    Feedback(String, LogCategory),
}

// ---------------------------------------------------------------------------
// TUI-only state
// ---------------------------------------------------------------------------

/// UI-layer state that lives alongside (but separate from) the session state.
#[derive(Debug, Default)]
struct TuiState {
    /// Keyboard cursor on the board, local frame.
    cursor_row: u8,
    cursor_col: u8,
    show_help: bool,
    /// Inner area of the board grid as last drawn, for mouse hit-testing.
    board_area: Option<Rect>,
}

impl TuiState {
    fn cursor(&self) -> Option<Position<Local>> {
        Position::new(self.cursor_row, self.cursor_col)
    }

    fn move_cursor(&mut self, d_row: i8, d_col: i8) {
        let last = BOARD_SIZE as i8 - 1;
        self.cursor_row = (self.cursor_row as i8 + d_row).clamp(0, last) as u8;
        self.cursor_col = (self.cursor_col as i8 + d_col).clamp(0, last) as u8;
    }
}

/// Map a terminal cell to the board square drawn there.
fn square_at(area: Rect, x: u16, y: u16) -> Option<Position<Local>> {
    if x < area.x || y < area.y {
        return None;
    }
    let col = (x - area.x) / CELL_WIDTH;
    let row = y - area.y;
    if row >= BOARD_SIZE as u16 || col >= BOARD_SIZE as u16 {
        return None;
    }
    Position::new(row as u8, col as u8)
}

fn handle_key(tui: &mut TuiState, key: KeyEvent, gs: &ClientGameState) -> UserIntent {
    if tui.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1)) {
            tui.show_help = false;
        }
        return UserIntent::None;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => UserIntent::Quit,
        KeyCode::F(1) => {
            tui.show_help = true;
            UserIntent::None
        }
        KeyCode::Up => {
            tui.move_cursor(-1, 0);
            UserIntent::None
        }
        KeyCode::Down => {
            tui.move_cursor(1, 0);
            UserIntent::None
        }
        KeyCode::Left => {
            tui.move_cursor(0, -1);
            UserIntent::None
        }
        KeyCode::Right => {
            tui.move_cursor(0, 1);
            UserIntent::None
        }
        KeyCode::Enter | KeyCode::Char(' ') => match tui.cursor() {
            Some(pos) if gs.snapshot.is_some() => UserIntent::Click(pos),
            _ => UserIntent::None,
        },
        KeyCode::Char('s') | KeyCode::Char('S') => {
            if gs.can_skip() {
                UserIntent::Skip
            } else {
                UserIntent::Feedback(
                    "End Turn is only available mid capture chain on your move".to_string(),
                    LogCategory::Error,
                )
            }
        }
        _ => UserIntent::None,
    }
}

fn handle_mouse(tui: &mut TuiState, mouse: MouseEvent, gs: &ClientGameState) -> UserIntent {
    if tui.show_help || gs.snapshot.is_none() {
        return UserIntent::None;
    }
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return UserIntent::None;
    }
    let Some(area) = tui.board_area else {
        return UserIntent::None;
    };
    match square_at(area, mouse.column, mouse.row) {
        Some(pos) => {
            tui.cursor_row = pos.row();
            tui.cursor_col = pos.col();
            UserIntent::Click(pos)
        }
        None => UserIntent::None,
    }
}

// ---------------------------------------------------------------------------
// Public API — Tui struct
// ---------------------------------------------------------------------------

/// Owns the ratatui terminal and all UI-layer state.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    state: TuiState,
}

impl Tui {
    /// Set up the terminal (raw mode, alternate screen, mouse) and return a ready `Tui`.
    pub fn setup() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self {
            terminal,
            state: TuiState::default(),
        })
    }

    /// Restore the terminal to its original state.
    pub fn teardown(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Draw the current frame and remember where the board landed.
    pub fn render(&mut self, gs: &ClientGameState) -> io::Result<()> {
        let mut board_area = None;
        let state = &self.state;
        self.terminal.draw(|f| board_area = ui(f, gs, state))?;
        self.state.board_area = board_area;
        Ok(())
    }

    /// Poll for a keyboard or mouse event and translate it into a
    /// [`UserIntent`]. Never blocks.
    pub fn poll_and_handle_input(&mut self, gs: &ClientGameState) -> io::Result<UserIntent> {
        if !event::poll(std::time::Duration::from_millis(0))? {
            return Ok(UserIntent::None);
        }
        let intent = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                handle_key(&mut self.state, key, gs)
            }
            Event::Mouse(mouse) => handle_mouse(&mut self.state, mouse, gs),
            _ => UserIntent::None,
        };
        Ok(intent)
    }

    /// Park the cursor on the piece that must keep capturing, if it is ours.
    pub fn on_turn_changed(&mut self, gs: &ClientGameState) {
        if let Some(at) = gs.snapshot.as_ref().and_then(|s| s.just_take)
            && gs.is_our_turn()
        {
            self.state.cursor_row = at.row();
            self.state.cursor_col = at.col();
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Draw everything; returns the inner board area when a board is shown.
fn ui(frame: &mut Frame, gs: &ClientGameState, tui: &TuiState) -> Option<Rect> {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(BOARD_HEIGHT), // Board + side panel
            Constraint::Length(3),         // Controls
            Constraint::Length(1),         // Status bar
        ])
        .split(frame.area());

    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(BOARD_WIDTH), Constraint::Min(30)])
        .split(main_layout[0]);

    let board_column = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(BOARD_HEIGHT), Constraint::Min(0)])
        .split(content_layout[0]);

    let side_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(4)])
        .split(content_layout[1]);

    let board_area = render_board(frame, gs, tui, board_column[0]);
    render_info_panel(frame, gs, side_layout[0]);
    render_messages(frame, gs, side_layout[1]);
    render_controls_bar(frame, gs, main_layout[1]);
    render_status_bar(frame, gs, main_layout[2]);

    if gs.room_full {
        render_notice(frame, " Room Full ", "This game already has two players.");
    } else if !gs.connected {
        render_notice(frame, " Disconnected ", "The connection to the server was lost.");
    } else if tui.show_help {
        render_help_popup(frame);
    }

    board_area
}

fn render_board(frame: &mut Frame, gs: &ClientGameState, tui: &TuiState, area: Rect) -> Option<Rect> {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(TermColor::Magenta))
        .title(" Board ")
        .title_style(
            Style::default()
                .fg(TermColor::Magenta)
                .add_modifier(Modifier::BOLD),
        );

    let Some(snapshot) = &gs.snapshot else {
        let waiting = Paragraph::new(vec![
            Line::from(""),
            Line::from(""),
            Line::from(Span::styled(
                "Waiting for opponent...",
                Style::default().fg(TermColor::Gray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(waiting, area);
        return None;
    };

    let inner = block.inner(area);
    let lines: Vec<Line> = (0..BOARD_SIZE)
        .map(|row| {
            let spans: Vec<Span> = (0..BOARD_SIZE)
                .filter_map(|col| Position::new(row, col))
                .map(|pos| board_square(snapshot, gs, tui, pos))
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
    Some(inner)
}

fn board_square<'a>(
    snapshot: &GameSnapshot,
    gs: &ClientGameState,
    tui: &TuiState,
    pos: Position<Local>,
) -> Span<'a> {
    let dark = (pos.row() + pos.col()) % 2 == 1;
    let bg = if gs.selected() == Some(pos) {
        TermColor::Cyan
    } else if tui.cursor() == Some(pos) {
        TermColor::Yellow
    } else if snapshot.just_take == Some(pos) {
        TermColor::Magenta
    } else if dark {
        TermColor::DarkGray
    } else {
        TermColor::Gray
    };
    Span::styled(
        format!(" {} ", snapshot.board.get(pos).glyph()),
        Style::default().bg(bg),
    )
}

fn color_label(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

fn render_info_panel(frame: &mut Frame, gs: &ClientGameState, area: Rect) {
    let you = gs.color().map(color_label).unwrap_or("unassigned");
    let mut lines = vec![Line::from(vec![
        Span::styled("You: ", Style::default().fg(TermColor::Gray)),
        Span::styled(
            you,
            Style::default()
                .fg(TermColor::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ])];

    if let Some(snapshot) = &gs.snapshot {
        let (turn_text, turn_style) = if gs.is_our_turn() {
            (
                "your move".to_string(),
                Style::default()
                    .fg(TermColor::Green)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (
                format!("{} to move", color_label(snapshot.turn)),
                Style::default().fg(TermColor::White),
            )
        };
        lines.push(Line::from(vec![
            Span::styled("Turn: ", Style::default().fg(TermColor::Gray)),
            Span::styled(turn_text, turn_style),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Pieces: ", Style::default().fg(TermColor::Gray)),
            Span::raw(format!(
                "⚪ {}  ⚫ {}",
                snapshot.board.count(Color::White),
                snapshot.board.count(Color::Black)
            )),
        ]));
        if let Some(at) = snapshot.just_take {
            lines.push(Line::from(Span::styled(
                format!("Capture chain at {at}"),
                Style::default().fg(TermColor::Magenta),
            )));
        }
    }

    let info = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(TermColor::Blue))
            .title(" Game ")
            .title_style(Style::default().fg(TermColor::Blue).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(info, area);
}

/// Format a structured [`GameEvent`] into a human-readable string for the TUI log.
fn format_event(event: &GameEvent) -> String {
    match event {
        GameEvent::RoomFull => "⛔ Room is full".to_string(),
        GameEvent::ColorAssigned { color } => format!("🎨 You play {}", color_label(*color)),
        GameEvent::TurnChanged { ours: true, .. } => "🎯 Your move".to_string(),
        GameEvent::TurnChanged { turn, ours: false } => {
            format!("⏳ {} to move", color_label(*turn))
        }
        GameEvent::CaptureChain { at } => {
            format!("⚔ Keep capturing with {at}, or press S to end turn")
        }
        GameEvent::MoveSent { from, to } => format!("➡ Sent {from} → {to}"),
        GameEvent::Skipped => "⏭ Turn ended".to_string(),
        GameEvent::FrameRejected { reason } => format!("❌ Dropped frame: {reason}"),
        GameEvent::Disconnected => "❌ Server disconnected".to_string(),
        GameEvent::Text { text, .. } => text.clone(),
    }
}

fn render_messages(frame: &mut Frame, gs: &ClientGameState, area: Rect) {
    let messages: Vec<ListItem> = gs
        .events
        .iter()
        .rev()
        .take(area.height.saturating_sub(2) as usize)
        .rev()
        .map(|ev| {
            let style = match ev.category() {
                LogCategory::System => Style::default().fg(TermColor::Yellow),
                LogCategory::Action => Style::default().fg(TermColor::White),
                LogCategory::Error => Style::default().fg(TermColor::Red),
                LogCategory::Info => Style::default().fg(TermColor::Gray),
            };
            ListItem::new(Span::styled(format_event(ev), style))
        })
        .collect();

    let messages_list = List::new(messages).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(TermColor::DarkGray))
            .title(" Log ")
            .title_style(Style::default().fg(TermColor::DarkGray)),
    );

    frame.render_widget(messages_list, area);
}

fn render_controls_bar(frame: &mut Frame, gs: &ClientGameState, area: Rect) {
    let skip_style = if gs.can_skip() {
        Style::default()
            .fg(TermColor::Black)
            .bg(TermColor::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TermColor::DarkGray)
    };
    let line = Line::from(vec![
        Span::styled(" End Turn (S) ", skip_style),
        Span::raw("   "),
        Span::styled("Arrows", Style::default().fg(TermColor::Cyan)),
        Span::raw(": move cursor  "),
        Span::styled("Enter/Click", Style::default().fg(TermColor::Cyan)),
        Span::raw(": select / move"),
    ]);

    let controls = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(TermColor::Blue))
            .title(" Controls ")
            .title_style(Style::default().fg(TermColor::Blue).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(controls, area);
}

fn render_status_bar(frame: &mut Frame, gs: &ClientGameState, area: Rect) {
    let (status_text, status_color) = if gs.connected {
        ("● Connected", TermColor::Green)
    } else {
        ("● Disconnected", TermColor::Red)
    };
    let key = Style::default()
        .fg(TermColor::Cyan)
        .add_modifier(Modifier::BOLD);
    let status = Paragraph::new(Line::from(vec![
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw(" | "),
        Span::styled("F1", key),
        Span::raw(": Help | "),
        Span::styled("ESC", key),
        Span::raw(": Quit"),
    ]));
    frame.render_widget(status, area);
}

fn render_notice(frame: &mut Frame, title: &str, message: &str) {
    let area = centered_rect(50, 30, frame.area());
    frame.render_widget(Clear, area);

    let text = Text::from(vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(TermColor::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press ESC to quit",
            Style::default().fg(TermColor::DarkGray),
        )),
    ]);

    let notice = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(TermColor::Red))
                .title(title.to_string())
                .title_style(Style::default().fg(TermColor::Red).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(TermColor::Black)),
        );
    frame.render_widget(notice, area);
}

fn render_help_popup(frame: &mut Frame) {
    let area = centered_rect(60, 70, frame.area());

    frame.render_widget(Clear, area);

    let heading = Style::default()
        .fg(TermColor::Cyan)
        .add_modifier(Modifier::BOLD);
    let help_text = Text::from(vec![
        Line::from(vec![Span::styled(
            "CONTROLS",
            Style::default()
                .fg(TermColor::Yellow)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![Span::styled("  BOARD", heading)]),
        Line::from("  Arrows        Move the cursor"),
        Line::from("  Enter/Space   Pick a piece, then its destination"),
        Line::from("  Mouse click   Same as Enter on that square"),
        Line::from("  S             End turn during a capture chain"),
        Line::from(""),
        Line::from(vec![Span::styled("  SYSTEM", heading)]),
        Line::from("  F1            Toggle this help"),
        Line::from("  ESC / q       Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press ESC or F1 to close",
            Style::default().fg(TermColor::DarkGray),
        )]),
    ]);

    let help = Paragraph::new(help_text).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(TermColor::Cyan))
            .title(" Help ")
            .title_style(heading)
            .style(Style::default().bg(TermColor::Black)),
    );

    frame.render_widget(help, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
