use std::collections::VecDeque;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::clipboard::ClipboardSink;
use crate::model::config::AppConfig;
use crate::model::copy::{CopyFeedback, install_command};
use crate::model::mode::Mode;
use crate::model::plugin::{PageResult, PluginSummary};
use crate::model::search::{PageView, SearchState, compute_view, stats_line};
use crate::model::view_state::{FETCH_FAILED_MESSAGE, RequestTracker, ViewState};
use crate::msg::{Direction as MoveDir, Msg};
use crate::registry::{PER_PAGE, PageRequest, RegistryClient, RegistryError};

const TITLE: &str = "YoAPI Plugin Directory";
const DESCRIPTION: &str = "Community plugins for the YoAPI framework.";
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SEARCH_PROMPT: &str = " search: ";
const CARD_HEIGHT: u16 = 8;
const MAX_NOTIFICATIONS: usize = 8;

pub struct App {
    pub mode: Mode,
    pub config: AppConfig,
    pub should_quit: bool,
    event_tx: mpsc::Sender<Msg>,
    registry: RegistryClient,
    clipboard: Box<dyn ClipboardSink>,
    view_state: ViewState,
    requests: RequestTracker,
    /// 1-based registry page currently shown or being loaded.
    server_page: u32,
    use_fixture_data: bool,
    /// Land on the last client page of the next load (set when paging backwards
    /// across a server page boundary).
    land_on_last_page: bool,
    search: SearchState,
    /// Position within the visible slice.
    selected: usize,
    grid_columns: usize,
    copy_feedback: CopyFeedback,
    notifications: VecDeque<String>,
    spinner_frame: usize,
}

impl App {
    /// Build the app and issue the initial page request.
    pub fn new(
        config: AppConfig,
        event_tx: mpsc::Sender<Msg>,
        registry: RegistryClient,
        clipboard: Box<dyn ClipboardSink>,
    ) -> Self {
        let use_fixture_data = config.registry.use_fixture_data;
        let mut app = Self {
            mode: Mode::Browse,
            config,
            should_quit: false,
            event_tx,
            registry,
            clipboard,
            view_state: ViewState::Loading,
            requests: RequestTracker::default(),
            server_page: 1,
            use_fixture_data,
            land_on_last_page: false,
            search: SearchState::default(),
            selected: 0,
            grid_columns: 3,
            copy_feedback: CopyFeedback::default(),
            notifications: VecDeque::new(),
            spinner_frame: 0,
        };
        app.request_page(1);
        app
    }

    fn items_per_page(&self) -> usize {
        self.config.view.items_per_page
    }

    fn page_view(&self) -> PageView<'_> {
        compute_view(self.view_state.items(), &self.search, self.items_per_page())
    }

    // ── MVU: Update ──────────────────────────────────────────────

    pub fn update(&mut self, msg: Msg) -> Result<()> {
        match msg {
            Msg::Key(key) => self.handle_key(key)?,
            Msg::Resize(w, _h) => self.grid_columns = columns_for_width(w),
            Msg::MoveSelection(dir) => self.move_selection(dir),
            Msg::NextPage => self.next_page(),
            Msg::PrevPage => self.prev_page(),
            Msg::SetSearchTerm(term) => self.set_search_term(term),
            Msg::Reload => {
                self.request_page(self.server_page);
            }
            Msg::ToggleDataSource => self.toggle_data_source(),
            Msg::PageLoaded { generation, result } => self.apply_page(generation, result),
            Msg::CopyInstallCommand(index) => self.copy_install_command(index),
            Msg::OpenRepository(index) => self.open_repository(index),
            Msg::Tick => self.handle_tick_at(Instant::now()),
            Msg::Quit => self.quit(),
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return self.update(Msg::Quit);
        }

        let msg = match self.mode {
            Mode::Browse => self.key_to_msg_browse(key),
            Mode::Search => self.key_to_msg_search(key),
        };

        match msg {
            Some(msg) => self.update(msg),
            None => Ok(()),
        }
    }

    fn key_to_msg_browse(&mut self, key: KeyEvent) -> Option<Msg> {
        let msg = match key.code {
            KeyCode::Char('q') => Msg::Quit,
            KeyCode::Char('/') => {
                self.mode = Mode::Search;
                return None;
            }
            KeyCode::Esc if !self.search.term.is_empty() => Msg::SetSearchTerm(String::new()),
            KeyCode::Char('h') | KeyCode::Left => Msg::MoveSelection(MoveDir::Left),
            KeyCode::Char('j') | KeyCode::Down => Msg::MoveSelection(MoveDir::Down),
            KeyCode::Char('k') | KeyCode::Up => Msg::MoveSelection(MoveDir::Up),
            KeyCode::Char('l') | KeyCode::Right => Msg::MoveSelection(MoveDir::Right),
            KeyCode::Char('n') | KeyCode::Char(']') | KeyCode::PageDown => Msg::NextPage,
            KeyCode::Char('p') | KeyCode::Char('[') | KeyCode::PageUp => Msg::PrevPage,
            KeyCode::Char('y') | KeyCode::Enter => {
                Msg::CopyInstallCommand(self.selected_item_index()?)
            }
            KeyCode::Char('o') => Msg::OpenRepository(self.selected_item_index()?),
            KeyCode::Char('r') => Msg::Reload,
            KeyCode::Char('f') => Msg::ToggleDataSource,
            _ => return None,
        };
        Some(msg)
    }

    fn key_to_msg_search(&mut self, key: KeyEvent) -> Option<Msg> {
        let mut term = self.search.term.clone();
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                term.clear();
            }
            KeyCode::Enter => {
                self.mode = Mode::Browse;
                return None;
            }
            KeyCode::Backspace => {
                term.pop();
            }
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                term.push(ch);
            }
            _ => return None,
        }
        Some(Msg::SetSearchTerm(term))
    }

    fn quit(&mut self) {
        self.requests.close();
        self.should_quit = true;
    }

    fn push_notification(&mut self, message: String) {
        self.notifications.push_back(message);
        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
    }

    // ── Registry ─────────────────────────────────────────────────

    /// Enter `Loading` and fetch `page` on a worker thread. Returns the
    /// generation the result must carry to be applied.
    fn request_page(&mut self, page: u32) -> u64 {
        let generation = self.requests.begin();
        let request = PageRequest {
            page: page.max(1),
            per_page: PER_PAGE,
            use_fixture_data: self.use_fixture_data,
        };

        self.server_page = request.page;
        self.land_on_last_page = false;
        self.view_state = ViewState::Loading;
        self.selected = 0;
        self.copy_feedback.clear();

        tracing::info!(
            "fetching page {} (generation {generation}, fixture: {})",
            request.page,
            request.use_fixture_data
        );

        let registry = self.registry.clone();
        let tx = self.event_tx.clone();
        thread::spawn(move || {
            let result = registry.fetch(request);
            // The receiver is gone once the UI has shut down.
            let _ = tx.send(Msg::PageLoaded { generation, result });
        });

        generation
    }

    fn apply_page(
        &mut self,
        generation: u64,
        result: Result<PageResult, RegistryError>,
    ) {
        if !self.requests.is_current(generation) {
            tracing::debug!("dropping stale page result (generation {generation})");
            return;
        }

        match result {
            Ok(page) => {
                tracing::info!(
                    "page {} loaded: {} items, total {}, next: {}",
                    self.server_page,
                    page.items.len(),
                    page.total_count,
                    page.has_next_page
                );
                self.view_state = ViewState::ready(page);
                self.search.current_page = if self.land_on_last_page {
                    usize::MAX
                } else {
                    1
                };
                self.recompute_page();
            }
            Err(err) => {
                tracing::error!("fetching page {} failed: {err}", self.server_page);
                self.view_state = ViewState::Error(FETCH_FAILED_MESSAGE.to_string());
            }
        }
        self.land_on_last_page = false;
    }

    fn toggle_data_source(&mut self) {
        self.use_fixture_data = !self.use_fixture_data;
        let label = data_source_label(self.use_fixture_data);
        self.push_notification(format!("data source: {label}"));
        self.request_page(1);
    }

    // ── Search & pagination ──────────────────────────────────────

    fn set_search_term(&mut self, term: String) {
        if term == self.search.term {
            return;
        }
        self.search.term = term;
        self.recompute_page();
    }

    /// Keep the client page and selection inside the filtered result.
    fn recompute_page(&mut self) {
        let total_pages = self.page_view().total_pages;
        self.search.clamp_page(total_pages);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let visible = self.page_view().visible.len();
        self.selected = self.selected.min(visible.saturating_sub(1));
    }

    fn next_page(&mut self) {
        if !matches!(self.view_state, ViewState::Ready { .. }) {
            return;
        }

        if self.page_view().has_next() {
            self.search.current_page += 1;
            self.selected = 0;
        } else if self.view_state.has_next_page() {
            self.request_page(self.server_page + 1);
        }
    }

    fn prev_page(&mut self) {
        match self.view_state {
            ViewState::Loading => {}
            ViewState::Ready { .. } if self.search.current_page > 1 => {
                self.search.current_page -= 1;
                self.selected = 0;
            }
            _ if self.server_page > 1 => {
                self.request_page(self.server_page - 1);
                self.land_on_last_page = true;
            }
            _ => {}
        }
    }

    fn move_selection(&mut self, dir: MoveDir) {
        let visible = self.page_view().visible.len();
        if visible == 0 {
            self.selected = 0;
            return;
        }

        let columns = self.grid_columns.max(1);
        let max = visible - 1;
        self.selected = match dir {
            MoveDir::Left => self.selected.saturating_sub(1),
            MoveDir::Right => (self.selected + 1).min(max),
            MoveDir::Up => self.selected.saturating_sub(columns),
            MoveDir::Down => {
                let below = self.selected + columns;
                if below <= max { below } else { self.selected }
            }
        };
    }

    /// Index into the loaded server page of the selected card.
    fn selected_item_index(&self) -> Option<usize> {
        self.page_view()
            .visible
            .get(self.selected)
            .map(|(index, _)| *index)
    }

    // ── Card actions ─────────────────────────────────────────────

    fn copy_install_command(&mut self, index: usize) {
        let Some(full_name) = self
            .view_state
            .items()
            .get(index)
            .map(|plugin| plugin.full_name.clone())
        else {
            return;
        };

        let command = install_command(&full_name);
        match self.clipboard.write_text(&command) {
            Ok(()) => {
                tracing::info!("copied install command for {full_name}");
                self.copy_feedback.mark(index, Instant::now());
                self.push_notification(format!("copied: {command}"));
            }
            Err(err) => {
                tracing::warn!("copying install command for {full_name} failed: {err}");
            }
        }
    }

    fn open_repository(&mut self, index: usize) {
        let Some(url) = self
            .view_state
            .items()
            .get(index)
            .map(|plugin| plugin.html_url.clone())
            .filter(|url| !url.is_empty())
        else {
            return;
        };

        match open_in_browser(&url) {
            Ok(()) => self.push_notification(format!("opened {url}")),
            Err(err) => {
                tracing::warn!("failed to open {url}: {err}");
                self.push_notification(format!("could not open {url}"));
            }
        }
    }

    fn handle_tick_at(&mut self, now: Instant) {
        if matches!(self.view_state, ViewState::Loading) {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }

        if self.copy_feedback.expire(now) {
            tracing::debug!("copy feedback expired");
        }
    }

    // ── MVU: View ────────────────────────────────────────────────

    pub fn view(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(1),    // body
                Constraint::Length(1), // pagination
                Constraint::Length(1), // status bar
            ])
            .split(frame.area());

        self.grid_columns = columns_for_width(chunks[1].width);

        self.render_header(frame, chunks[0]);
        match &self.view_state {
            ViewState::Loading => self.render_spinner(frame, chunks[1]),
            ViewState::Error(message) => render_error(frame, chunks[1], message),
            ViewState::Ready { .. } => self.render_grid(frame, chunks[1]),
        }
        self.render_pagination(frame, chunks[2]);
        self.render_status_bar(frame, chunks[3]);

        if self.mode == Mode::Search {
            let cursor_x = search_cursor_x(chunks[0].x, &self.search.term);
            frame.set_cursor_position((cursor_x, chunks[0].y + 2));
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let search_style = if self.mode == Mode::Search {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };

        let stats = match &self.view_state {
            ViewState::Ready { total_count, .. } => {
                stats_line(&self.search.term, self.page_view().filtered_count, *total_count)
            }
            _ => String::new(),
        };

        let lines = vec![
            Line::from(Span::styled(
                TITLE,
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(DESCRIPTION, Style::default().fg(Color::Gray))),
            Line::from(vec![
                Span::styled(SEARCH_PROMPT, search_style),
                Span::raw(self.search.term.clone()),
            ]),
            Line::from(Span::styled(stats, Style::default().fg(Color::DarkGray))),
        ];

        let header = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .style(Style::default().bg(Color::Rgb(15, 15, 24))),
        );
        frame.render_widget(header, area);
    }

    fn render_spinner(&self, frame: &mut Frame, area: Rect) {
        let glyph = spinner_glyph(self.spinner_frame);
        let spinner = Paragraph::new(format!("{glyph} loading plugins…"))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Cyan));
        frame.render_widget(spinner, vertical_center(area, 1));
    }

    fn render_grid(&self, frame: &mut Frame, area: Rect) {
        let page_view = self.page_view();
        if page_view.visible.is_empty() {
            let empty = if self.search.term.is_empty() {
                "No plugins published yet.".to_string()
            } else {
                format!("No plugins match \"{}\".", self.search.term)
            };
            let paragraph = Paragraph::new(empty)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(paragraph, vertical_center(area, 1));
            return;
        }

        let columns = self.grid_columns.max(1);
        let row_count = page_view.visible.len().div_ceil(columns);
        let fitting_rows = ((area.height / CARD_HEIGHT) as usize).max(1);
        let (first_row, shown_rows) = row_window(row_count, fitting_rows, self.selected / columns);

        let mut row_constraints = vec![Constraint::Length(CARD_HEIGHT); shown_rows];
        row_constraints.push(Constraint::Min(0));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(row_constraints)
            .split(area);

        let window = page_view
            .visible
            .chunks(columns)
            .enumerate()
            .skip(first_row)
            .take(shown_rows);
        for (slot, (row_idx, chunk)) in window.enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
                .split(rows[slot]);

            for (col_idx, (item_index, plugin)) in chunk.iter().enumerate() {
                let position = row_idx * columns + col_idx;
                self.render_card(
                    frame,
                    cells[col_idx],
                    plugin,
                    *item_index,
                    position == self.selected,
                );
            }
        }
    }

    fn render_card(
        &self,
        frame: &mut Frame,
        area: Rect,
        plugin: &PluginSummary,
        item_index: usize,
        selected: bool,
    ) {
        let inner_width = area.width.saturating_sub(2) as usize;
        let copied = self.copy_feedback.is_copied(item_index);

        let border_style = if selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let button_style = if copied {
            Style::default().fg(Color::Black).bg(Color::Green)
        } else if selected {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };

        let meta = format!(
            "{}  ★ {}  ⑂ {}  updated {}",
            plugin.language.as_deref().unwrap_or("-"),
            plugin.stargazers_count,
            plugin.forks_count,
            plugin.updated_label()
        );

        let lines = vec![
            Line::from(Span::styled(
                format!("by {}", plugin.owner),
                Style::default().fg(Color::Magenta),
            )),
            Line::from(truncate(&plugin.description, inner_width)),
            Line::from(Span::styled(
                truncate(&meta, inner_width),
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                truncate(&plugin.html_url, inner_width),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            )),
            Line::default(),
            Line::from(Span::styled(
                self.copy_feedback.label(item_index),
                button_style,
            )),
        ];

        let card = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .title(format!(" {} ", plugin.name))
                .borders(Borders::ALL)
                .border_style(border_style)
                .style(Style::default().bg(Color::Rgb(10, 10, 18))),
        );
        frame.render_widget(card, area);
    }

    fn render_pagination(&self, frame: &mut Frame, area: Rect) {
        let ViewState::Ready { has_next_page, .. } = &self.view_state else {
            return;
        };

        let page_view = self.page_view();
        if !show_pagination(page_view.total_pages, self.server_page, *has_next_page) {
            return;
        }

        let can_prev = page_view.has_prev() || self.server_page > 1;
        let can_next = page_view.has_next() || *has_next_page;
        let enabled = Style::default().fg(Color::Cyan);
        let disabled = Style::default().fg(Color::DarkGray);

        let mut spans = vec![
            Span::styled("◀ p ", if can_prev { enabled } else { disabled }),
            Span::raw(format!(
                "  page {} of {}  ",
                page_view.current_page, page_view.total_pages
            )),
            Span::styled(" n ▶", if can_next { enabled } else { disabled }),
        ];
        if self.server_page > 1 || *has_next_page {
            spans.push(Span::styled(
                format!("   registry page {}", self.server_page),
                disabled,
            ));
        }

        let pager = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
        frame.render_widget(pager, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mode_style = match self.mode {
            Mode::Browse => Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            Mode::Search => Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        };

        let mode_span = Span::styled(format!(" {} ", self.mode.label()), mode_style);

        let mut info = format!(
            " {} | {} ",
            data_source_label(self.use_fixture_data),
            self.view_state.label()
        );
        if let Some(note) = self.notifications.back() {
            info.push_str(&format!("| {note} "));
        }
        info.push_str("| / search  y copy  o open  r reload  f source  q quit ");

        let bar = Line::from(vec![
            mode_span,
            Span::styled(info, Style::default().fg(Color::Gray).bg(Color::DarkGray)),
        ]);
        let status = Paragraph::new(bar).style(Style::default().bg(Color::DarkGray));
        frame.render_widget(status, area);
    }
}

fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let lines = vec![
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Press r to retry.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let panel = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .title(" Error ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(panel, vertical_center(area, 4));
}

/// Whether there is anything to page through, client-side or on the registry.
fn show_pagination(total_pages: usize, server_page: u32, has_next_page: bool) -> bool {
    total_pages > 1 || server_page > 1 || has_next_page
}

fn columns_for_width(width: u16) -> usize {
    match width {
        0..=79 => 1,
        80..=119 => 2,
        _ => 3,
    }
}

/// First card row to draw and how many rows to draw, keeping `selected_row`
/// inside the window.
fn row_window(row_count: usize, fitting_rows: usize, selected_row: usize) -> (usize, usize) {
    let shown = row_count.min(fitting_rows.max(1));
    let last_start = row_count.saturating_sub(shown);
    let first = selected_row.saturating_sub(shown.saturating_sub(1)).min(last_start);
    (first, shown)
}

/// Screen column just past the search term, in display cells.
fn search_cursor_x(area_x: u16, term: &str) -> u16 {
    let width = Span::raw(SEARCH_PROMPT).width() + Span::raw(term).width();
    area_x.saturating_add(width.min(u16::MAX as usize) as u16)
}

fn spinner_glyph(frame: usize) -> &'static str {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}

fn data_source_label(use_fixture_data: bool) -> &'static str {
    if use_fixture_data { "fixture" } else { "registry" }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

fn vertical_center(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect {
        x: area.x,
        y: area.y + (area.height - height) / 2,
        width: area.width,
        height,
    }
}

/// Platform opener for `url`. The empty argument after `start` is the window
/// title, so a quoted URL is never taken for one.
fn browser_command(url: &str) -> Command {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut start = Command::new("cmd");
        start.args(["/C", "start", ""]);
        start
    } else {
        Command::new("xdg-open")
    };
    command.arg(url);
    command
}

fn open_in_browser(url: &str) -> std::io::Result<()> {
    let mut child = browser_command(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    thread::spawn(move || {
        let _ = child.wait();
    });
    Ok(())
}
