use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use once_cell::sync::Lazy;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{error, info, warn};
use walkquote_core::{
    matchmaker::{MatchEvent, Matchmaker},
    quotes,
    session::{
        reduce, Action, Effect, Role, Session, WalkStatus, WALK_DISTANCE_LABEL,
        WALK_DURATION_LABEL,
    },
    AppConfig,
};

use crate::art;

const TICK_RATE: Duration = Duration::from_millis(250);
const QUOTE_ROTATE_TICKS: u64 = 40;
const MAX_INPUT_LEN: usize = 120;

#[derive(Debug, Clone)]
struct Theme {
    background: Color,
    foreground: Color,
    accent: Color,
    accent_dark: Color,
    muted: Color,
    success: Color,
    warning: Color,
    bubble_local: Color,
    bubble_remote: Color,
    on_bubble: Color,
}

// Teal-on-pastel WalkQuote branding.
static DEFAULT_THEME: Lazy<Theme> = Lazy::new(|| Theme {
    background: Color::Reset,
    foreground: Color::White,
    accent: palette("#1abc9c"),
    accent_dark: palette("#117a65"),
    muted: Color::DarkGray,
    success: Color::Green,
    warning: Color::Yellow,
    bubble_local: palette("#a3e4d7"),
    bubble_remote: palette("#d6eaf8"),
    on_bubble: palette("#1b2631"),
});

fn palette(value: &str) -> Color {
    parse_hex_color(value).expect("invalid palette constant")
}

impl Theme {
    fn from_config(config: &AppConfig) -> Self {
        let mut theme = DEFAULT_THEME.clone();
        if let Some(value) = config.accent_color.as_deref() {
            match parse_hex_color(value) {
                Some(color) => theme.accent = color,
                None => warn!(value, "ignoring invalid accent_color override"),
            }
        }
        if let Some(value) = config.background_color.as_deref() {
            match parse_hex_color(value) {
                Some(color) => theme.background = color,
                None => warn!(value, "ignoring invalid background_color override"),
            }
        }
        theme
    }
}

fn parse_hex_color(input: &str) -> Option<Color> {
    let trimmed = input.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

/// Single-line text input with a byte-indexed cursor.
#[derive(Debug, Clone, Default)]
struct InputField {
    value: String,
    cursor: usize,
}

impl InputField {
    fn insert(&mut self, ch: char) {
        if self.value.len() >= MAX_INPUT_LEN || ch.is_control() {
            return;
        }
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn backspace(&mut self) {
        if let Some(ch) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= ch.len_utf8();
            self.value.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    fn move_left(&mut self) {
        if let Some(ch) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= ch.len_utf8();
        }
    }

    fn move_right(&mut self) {
        if let Some(ch) = self.value[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.value.len();
    }

    fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Cursor position in characters, for terminal cursor placement.
    fn char_offset(&self) -> usize {
        self.value[..self.cursor].chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthTab {
    Login,
    SignUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthField {
    Username,
    Password,
}

/// Which panel the current session state projects to. The cascade mirrors
/// the session lifecycle: authenticate, pick a role, then walk the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Auth,
    RoleSelect,
    WandererSearch,
    WalkerWait,
    Chat,
    WandererPayment,
    WandererThanks,
    WalkerComplete,
}

fn view_for(session: &Session) -> View {
    if !session.logged_in {
        return View::Auth;
    }
    let Some(role) = session.role else {
        return View::RoleSelect;
    };
    if !session.matched {
        return match role {
            Role::Wanderer => View::WandererSearch,
            Role::Walker => View::WalkerWait,
        };
    }
    match (role, session.walk_status, session.payment_done) {
        (_, WalkStatus::NotStarted | WalkStatus::InProgress, _) => View::Chat,
        (Role::Wanderer, WalkStatus::Completed, false) => View::WandererPayment,
        (Role::Wanderer, WalkStatus::Completed, true) => View::WandererThanks,
        (Role::Walker, WalkStatus::Completed, _) => View::WalkerComplete,
    }
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Top-level application driving one interactive session.
pub struct WalkQuoteApp {
    config: AppConfig,
    theme: Theme,
    session: Session,
    status: String,
    should_quit: bool,
    fatal: Option<anyhow::Error>,
    tick_count: u64,
    auth_tab: AuthTab,
    auth_field: AuthField,
    username: InputField,
    password: InputField,
    message: InputField,
    role_cursor: usize,
    searching: bool,
    walk_art: Option<Vec<String>>,
}

impl WalkQuoteApp {
    pub fn new(config: AppConfig) -> Self {
        let theme = Theme::from_config(&config);
        Self {
            config,
            theme,
            session: Session::new(),
            status: "Log in or sign up to continue".to_string(),
            should_quit: false,
            fatal: None,
            tick_count: 0,
            auth_tab: AuthTab::Login,
            auth_field: AuthField::Username,
            username: InputField::default(),
            password: InputField::default(),
            message: InputField::default(),
            role_cursor: 0,
            searching: false,
            walk_art: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let mut match_rx: Option<mpsc::Receiver<MatchEvent>> = None;

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }

            let effects = if match_rx.is_some() {
                let mut match_closed = false;
                let rx = match_rx.as_mut().unwrap();
                let effects = tokio::select! {
                    maybe_event = event_rx.recv() => {
                        match maybe_event {
                            Some(event) => self.process_app_event(event),
                            None => break,
                        }
                    }
                    maybe_match = rx.recv() => {
                        match maybe_match {
                            Some(event) => self.handle_match_event(event),
                            None => {
                                match_closed = true;
                                Vec::new()
                            }
                        }
                    }
                };
                if match_closed {
                    match_rx = None;
                }
                effects
            } else {
                match event_rx.recv().await {
                    Some(event) => self.process_app_event(event),
                    None => break,
                }
            };

            for effect in effects {
                match effect {
                    Effect::BeginSearch => {
                        let (tx, rx) = mpsc::channel(1);
                        let matchmaker = Matchmaker::from_config(&self.config);
                        spawn(async move {
                            if let Err(err) = matchmaker.run(tx).await {
                                error!(?err, "walker search task failed");
                            }
                        });
                        match_rx = Some(rx);
                        self.searching = true;
                        self.status = "Finding your walking partner…".to_string();
                    }
                    Effect::CancelSearch => {
                        match_rx = None;
                        self.searching = false;
                    }
                }
            }

            if self.fatal.is_some() {
                break;
            }
            if self.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        info!(
            session = %serde_json::to_string(&self.session).unwrap_or_default(),
            "session at exit"
        );
        match self.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn process_app_event(&mut self, event: AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::Input(event) => match self.handle_input(event) {
                Ok(effects) => effects,
                Err(err) => {
                    self.status = format!("Error: {err}");
                    Vec::new()
                }
            },
            AppEvent::Tick => {
                self.tick_count = self.tick_count.wrapping_add(1);
                Vec::new()
            }
        }
    }

    fn handle_match_event(&mut self, event: MatchEvent) -> Vec<Effect> {
        self.searching = false;
        match event {
            MatchEvent::Found { partner } => {
                let display = partner.clone();
                let effects = self.dispatch(Action::MatchFound { partner });
                if self.session.matched {
                    self.status = format!("Walker found: {display} is nearby!");
                    if self.session.is_wanderer() && self.walk_art.is_none() {
                        match art::load(&self.config.art_path) {
                            Ok(lines) => self.walk_art = Some(lines),
                            Err(err) => {
                                error!(?err, "walk art unavailable, cannot render match view");
                                self.fatal = Some(err);
                            }
                        }
                    }
                }
                effects
            }
            MatchEvent::TimedOut => {
                self.status = "No walkers found in time. Try again".to_string();
                Vec::new()
            }
        }
    }

    /// Run one action through the reducer, surfacing rejections in the
    /// status line and leaving the session untouched on error.
    fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        match reduce(&mut self.session, action) {
            Ok(effects) => effects,
            Err(err) => {
                self.status = err.to_string();
                Vec::new()
            }
        }
    }

    fn handle_input(&mut self, event: Event) -> Result<Vec<Effect>> {
        match event {
            Event::Key(key) => {
                if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
                    self.should_quit = true;
                    return Ok(Vec::new());
                }
                self.handle_key(key)
            }
            Event::Resize(_, _) => Ok(Vec::new()),
            Event::Mouse(_) => Ok(Vec::new()),
            Event::FocusGained | Event::FocusLost | Event::Paste(_) => Ok(Vec::new()),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Vec<Effect>> {
        match view_for(&self.session) {
            View::Auth => self.handle_auth_key(key),
            View::RoleSelect => self.handle_role_key(key),
            View::WandererSearch => self.handle_search_key(key),
            View::WalkerWait => self.handle_wait_key(key),
            View::Chat => self.handle_chat_key(key),
            View::WandererPayment => self.handle_payment_key(key),
            View::WandererThanks => self.handle_finished_key(key),
            View::WalkerComplete => self.handle_finished_key(key),
        }
    }

    fn handle_auth_key(&mut self, key: KeyEvent) -> Result<Vec<Effect>> {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => return Ok(self.submit_auth()),
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                self.auth_field = match self.auth_field {
                    AuthField::Username => AuthField::Password,
                    AuthField::Password => AuthField::Username,
                };
            }
            KeyCode::BackTab => {
                self.auth_tab = match self.auth_tab {
                    AuthTab::Login => AuthTab::SignUp,
                    AuthTab::SignUp => AuthTab::Login,
                };
                self.status = match self.auth_tab {
                    AuthTab::Login => "Log in to continue".to_string(),
                    AuthTab::SignUp => "Create a new account".to_string(),
                };
            }
            KeyCode::Backspace => self.focused_input().backspace(),
            KeyCode::Delete => self.focused_input().delete(),
            KeyCode::Left => self.focused_input().move_left(),
            KeyCode::Right => self.focused_input().move_right(),
            KeyCode::Home => self.focused_input().move_home(),
            KeyCode::End => self.focused_input().move_end(),
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.focused_input().insert(ch);
            }
            _ => {}
        }
        Ok(Vec::new())
    }

    fn focused_input(&mut self) -> &mut InputField {
        match self.auth_field {
            AuthField::Username => &mut self.username,
            AuthField::Password => &mut self.password,
        }
    }

    fn submit_auth(&mut self) -> Vec<Effect> {
        let username = self.username.value.clone();
        let password = self.password.value.clone();
        let tab = self.auth_tab;
        let action = match tab {
            AuthTab::Login => Action::Login { username, password },
            AuthTab::SignUp => Action::SignUp { username, password },
        };
        let effects = self.dispatch(action);
        if self.session.logged_in {
            self.password.clear();
            self.status = match tab {
                AuthTab::Login => format!("Welcome back, {}!", self.session.username),
                AuthTab::SignUp => format!("Account created for {}!", self.session.username),
            };
        }
        effects
    }

    fn handle_role_key(&mut self, key: KeyEvent) -> Result<Vec<Effect>> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down | KeyCode::Char('k') | KeyCode::Up => {
                self.role_cursor = 1 - self.role_cursor;
            }
            KeyCode::Char('1') => return Ok(self.choose_role(Role::Wanderer)),
            KeyCode::Char('2') => return Ok(self.choose_role(Role::Walker)),
            KeyCode::Enter => {
                let role = if self.role_cursor == 0 {
                    Role::Wanderer
                } else {
                    Role::Walker
                };
                return Ok(self.choose_role(role));
            }
            _ => {}
        }
        Ok(Vec::new())
    }

    fn choose_role(&mut self, role: Role) -> Vec<Effect> {
        let effects = self.dispatch(Action::ChooseRole(role));
        if self.session.role == Some(role) {
            self.status = match role {
                Role::Wanderer => "Searching for nearby walkers…".to_string(),
                Role::Walker => "Waiting for a Wanderer to request a walk…".to_string(),
            };
        }
        effects
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Result<Vec<Effect>> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Enter | KeyCode::Char('f') => {
                if self.searching {
                    self.status = "Still searching…".to_string();
                } else {
                    return Ok(self.dispatch(Action::FindWalker));
                }
            }
            _ => {}
        }
        Ok(Vec::new())
    }

    fn handle_wait_key(&mut self, key: KeyEvent) -> Result<Vec<Effect>> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Enter | KeyCode::Char('a') => {
                let effects = self.dispatch(Action::AcceptRequest);
                if self.session.matched {
                    self.status = "You are now connected with a Wanderer!".to_string();
                }
                return Ok(effects);
            }
            _ => {}
        }
        Ok(Vec::new())
    }

    fn handle_chat_key(&mut self, key: KeyEvent) -> Result<Vec<Effect>> {
        if key.modifiers == KeyModifiers::CONTROL {
            match key.code {
                KeyCode::Char('s') => {
                    let effects = self.dispatch(Action::StartWalk);
                    if self.session.walk_status == WalkStatus::InProgress {
                        self.status = "Walk started! Enjoy your journey".to_string();
                    }
                    return Ok(effects);
                }
                KeyCode::Char('e') => {
                    let effects = self.dispatch(Action::EndWalk);
                    if self.session.walk_status == WalkStatus::Completed {
                        self.status = "Walk completed successfully".to_string();
                    }
                    return Ok(effects);
                }
                _ => {}
            }
            return Ok(Vec::new());
        }
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => {
                let text = self.message.value.clone();
                let before = self.session.messages.len();
                let effects = self.dispatch(Action::SendMessage { text });
                if self.session.messages.len() > before {
                    self.message.clear();
                }
                return Ok(effects);
            }
            KeyCode::Backspace => self.message.backspace(),
            KeyCode::Delete => self.message.delete(),
            KeyCode::Left => self.message.move_left(),
            KeyCode::Right => self.message.move_right(),
            KeyCode::Home => self.message.move_home(),
            KeyCode::End => self.message.move_end(),
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.message.insert(ch);
            }
            _ => {}
        }
        Ok(Vec::new())
    }

    fn handle_payment_key(&mut self, key: KeyEvent) -> Result<Vec<Effect>> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Enter | KeyCode::Char('p') => {
                let effects = self.dispatch(Action::PayNow);
                if self.session.payment_done {
                    self.status = "Payment successful".to_string();
                }
                return Ok(effects);
            }
            _ => {}
        }
        Ok(Vec::new())
    }

    fn handle_finished_key(&mut self, key: KeyEvent) -> Result<Vec<Effect>> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Enter | KeyCode::Char('n') | KeyCode::Char('r') => {
                let effects = self.dispatch(Action::Reset);
                self.after_reset();
                return Ok(effects);
            }
            _ => {}
        }
        Ok(Vec::new())
    }

    fn after_reset(&mut self) {
        self.username.clear();
        self.password.clear();
        self.message.clear();
        self.auth_tab = AuthTab::Login;
        self.auth_field = AuthField::Username;
        self.role_cursor = 0;
        self.walk_art = None;
        self.status = "Ready for a new walk. Log in to continue".to_string();
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        frame.render_widget(
            Block::default().style(
                Style::default()
                    .bg(self.theme.background)
                    .fg(self.theme.foreground),
            ),
            area,
        );

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(area);

        self.render_header(frame, rows[0]);
        match view_for(&self.session) {
            View::Auth => self.draw_auth(frame, rows[1]),
            View::RoleSelect => self.draw_role_select(frame, rows[1]),
            View::WandererSearch => self.draw_wanderer_search(frame, rows[1]),
            View::WalkerWait => self.draw_walker_wait(frame, rows[1]),
            View::Chat => self.draw_chat(frame, rows[1]),
            View::WandererPayment => self.draw_payment(frame, rows[1]),
            View::WandererThanks => self.draw_thanks(frame, rows[1]),
            View::WalkerComplete => self.draw_walker_complete(frame, rows[1]),
        }
        self.render_status(frame, rows[2]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let quote = quotes::rotating((self.tick_count / QUOTE_ROTATE_TICKS) as usize);
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(self.theme.accent))
            .title(Span::styled(
                " WalkQuote ",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ))
            .title_alignment(Alignment::Center);
        let paragraph = Paragraph::new(Line::from(Span::styled(
            format!("\u{201c}{quote}\u{201d}"),
            Style::default()
                .fg(self.theme.accent_dark)
                .add_modifier(Modifier::ITALIC),
        )))
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_auth(&self, frame: &mut Frame, area: Rect) {
        let width = 56.min(area.width.max(1));
        let box_area = centered_rect(width, 9, area);

        let tab_style = |active: bool| {
            if active {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(self.theme.muted)
            }
        };
        let tabs = Line::from(vec![
            Span::styled("Login", tab_style(self.auth_tab == AuthTab::Login)),
            Span::raw("   "),
            Span::styled("Sign Up", tab_style(self.auth_tab == AuthTab::SignUp)),
        ]);

        let field_label = |label: &str, focused: bool| {
            Span::styled(
                format!("{label}: "),
                if focused {
                    Style::default()
                        .fg(self.theme.accent)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(self.theme.foreground)
                },
            )
        };
        let username_line = Line::from(vec![
            field_label("Username", self.auth_field == AuthField::Username),
            Span::raw(self.username.value.clone()),
        ]);
        let masked = "\u{2022}".repeat(self.password.value.chars().count());
        let password_line = Line::from(vec![
            field_label("Password", self.auth_field == AuthField::Password),
            Span::raw(masked),
        ]);
        let helper = Line::from(Span::styled(
            "Tab field · Shift+Tab tab · Enter submit · Esc quit",
            Style::default().fg(self.theme.muted),
        ));

        let paragraph = Paragraph::new(vec![
            tabs,
            Line::from(""),
            username_line,
            password_line,
            Line::from(""),
            helper,
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Login or Sign Up to Continue"),
        );
        frame.render_widget(paragraph, box_area);

        // place the terminal cursor inside the focused field
        let (field, row) = match self.auth_field {
            AuthField::Username => (&self.username, 3),
            AuthField::Password => (&self.password, 4),
        };
        let label_width = "Username: ".len() as u16;
        let cursor_x = (box_area.x + 1 + label_width + field.char_offset() as u16)
            .min(box_area.x + box_area.width.saturating_sub(2));
        let cursor_y = box_area.y + row;
        frame.set_cursor(cursor_x, cursor_y);
    }

    fn draw_role_select(&self, frame: &mut Frame, area: Rect) {
        let box_area = centered_rect(56.min(area.width.max(1)), 8, area);
        let options = ["I'm a Wanderer", "I'm a Walker"];
        let mut lines = vec![
            Line::from(format!(
                "Hello {}! Choose your role",
                self.session.username
            )),
            Line::from(""),
        ];
        for (idx, option) in options.iter().enumerate() {
            let line = if idx == self.role_cursor {
                Line::from(Span::styled(
                    format!("\u{25b6} {option}"),
                    Style::default()
                        .fg(self.theme.accent)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(format!("  {option}"))
            };
            lines.push(line);
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "j/k choose · Enter confirm · q quit",
            Style::default().fg(self.theme.muted),
        )));

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Choose Your Role"))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, box_area);
    }

    fn draw_wanderer_search(&self, frame: &mut Frame, area: Rect) {
        let box_area = centered_rect(56.min(area.width.max(1)), 7, area);
        let mut lines = vec![
            Line::from(format!("Welcome, {}", self.session.username)),
            Line::from(""),
            Line::from("Searching for nearby walkers..."),
        ];
        if self.searching {
            let dots = ".".repeat(((self.tick_count / 2) % 4) as usize);
            lines.push(Line::from(Span::styled(
                format!("Finding your walking partner{dots}"),
                Style::default().fg(self.theme.warning),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Press Enter to find a walker",
                Style::default().fg(self.theme.muted),
            )));
        }
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Find a Walker"))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, box_area);
    }

    fn draw_walker_wait(&self, frame: &mut Frame, area: Rect) {
        let box_area = centered_rect(56.min(area.width.max(1)), 7, area);
        let paragraph = Paragraph::new(vec![
            Line::from(format!("Welcome, {}", self.session.username)),
            Line::from(""),
            Line::from("Waiting for a Wanderer to request a walk..."),
            Line::from(Span::styled(
                "Press Enter to accept the request",
                Style::default().fg(self.theme.muted),
            )),
        ])
        .block(Block::default().borders(Borders::ALL).title("Walker"))
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, box_area);
    }

    fn draw_chat(&self, frame: &mut Frame, area: Rect) {
        let in_progress = self.session.walk_status == WalkStatus::InProgress;
        let art_lines = if in_progress {
            None
        } else {
            self.walk_art.as_deref()
        };

        let mut constraints = vec![Constraint::Length(3)];
        if let Some(lines) = art_lines {
            constraints.push(Constraint::Length((lines.len() as u16 + 2).min(10)));
        }
        constraints.push(Constraint::Min(4));
        constraints.push(Constraint::Length(3));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);
        let mut chunk_iter = chunks.iter().copied();
        let banner_area = chunk_iter.next().unwrap_or(area);
        let art_area = if art_lines.is_some() {
            chunk_iter.next()
        } else {
            None
        };
        let log_area = chunk_iter.next().unwrap_or(area);
        let input_area = chunk_iter.next().unwrap_or(area);

        let partner = self.session.partner_label().to_string();
        let banner_text = match (self.session.role, in_progress) {
            (Some(Role::Wanderer), false) => format!("Matched with {partner} (Verified Walker)"),
            (Some(Role::Walker), false) => {
                "You're matched with a Wanderer! Start chatting below".to_string()
            }
            (_, true) => format!("Walk in progress: you're walking with {partner}"),
            (None, false) => String::new(),
        };
        let banner = Paragraph::new(Line::from(Span::styled(
            banner_text,
            Style::default()
                .fg(self.theme.success)
                .add_modifier(Modifier::BOLD),
        )))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        frame.render_widget(banner, banner_area);

        if let (Some(lines), Some(art_area)) = (art_lines, art_area) {
            let art: Vec<Line> = lines
                .iter()
                .map(|line| {
                    Line::from(Span::styled(
                        line.clone(),
                        Style::default().fg(self.theme.accent),
                    ))
                })
                .collect();
            let paragraph = Paragraph::new(art)
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, art_area);
        }

        let shown = if in_progress {
            self.session.visible_messages(self.config.chat_window)
        } else {
            self.session.messages.as_slice()
        };
        let bubbles: Vec<Line> = shown
            .iter()
            .map(|message| {
                let stamp = message.sent_at.with_timezone(&Local).format("%H:%M");
                let bubble_bg = if message.is_local() {
                    self.theme.bubble_local
                } else {
                    self.theme.bubble_remote
                };
                let bubble = Span::styled(
                    format!(" {}: {} ", message.sender, message.text),
                    Style::default().bg(bubble_bg).fg(self.theme.on_bubble),
                );
                let meta = Span::styled(
                    format!(" {stamp}"),
                    Style::default().fg(self.theme.muted),
                );
                let alignment = if message.is_local() {
                    Alignment::Right
                } else {
                    Alignment::Left
                };
                Line::from(vec![bubble, meta]).alignment(alignment)
            })
            .collect();
        let log_title = if in_progress {
            format!("Chat (last {} messages)", self.config.chat_window)
        } else {
            "Chat".to_string()
        };
        let log = Paragraph::new(bubbles)
            .block(Block::default().borders(Borders::ALL).title(log_title))
            .wrap(Wrap { trim: false });
        frame.render_widget(log, log_area);

        let controls = if in_progress {
            "Enter send · Ctrl+E end walk · Esc quit"
        } else {
            "Enter send · Ctrl+S start walk · Esc quit"
        };
        let input = Paragraph::new(Line::from(vec![
            Span::styled("> ", Style::default().fg(self.theme.accent)),
            Span::raw(self.message.value.clone()),
        ]))
        .block(Block::default().borders(Borders::ALL).title(controls));
        frame.render_widget(input, input_area);

        let cursor_x = (input_area.x + 3 + self.message.char_offset() as u16)
            .min(input_area.x + input_area.width.saturating_sub(2));
        frame.set_cursor(cursor_x, input_area.y + 1);
    }

    fn draw_payment(&self, frame: &mut Frame, area: Rect) {
        let box_area = centered_rect(56.min(area.width.max(1)), 8, area);
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(
                "Walk Completed!",
                Style::default()
                    .fg(self.theme.success)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                "Distance: {WALK_DISTANCE_LABEL} | Duration: {WALK_DURATION_LABEL}"
            )),
            Line::from(""),
            Line::from("Please complete your payment."),
            Line::from(Span::styled(
                "Press Enter to pay now · q quit",
                Style::default().fg(self.theme.muted),
            )),
        ])
        .block(Block::default().borders(Borders::ALL).title("Payment"))
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, box_area);
    }

    fn draw_thanks(&self, frame: &mut Frame, area: Rect) {
        let box_area = centered_rect(56.min(area.width.max(1)), 7, area);
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(
                "Thank you for walking with WalkQuote!",
                Style::default()
                    .fg(self.theme.success)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter for a new walk · q quit",
                Style::default().fg(self.theme.muted),
            )),
        ])
        .block(Block::default().borders(Borders::ALL).title("All Done"))
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, box_area);
    }

    fn draw_walker_complete(&self, frame: &mut Frame, area: Rect) {
        let box_area = centered_rect(56.min(area.width.max(1)), 7, area);
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(
                "Walk finished",
                Style::default()
                    .fg(self.theme.success)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from("Your partner will complete payment soon."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter when ready for the next walk · q quit",
                Style::default().fg(self.theme.muted),
            )),
        ])
        .block(Block::default().borders(Borders::ALL).title("Walk Finished"))
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, box_area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new(Line::from(self.status.clone()))
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
