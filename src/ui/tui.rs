//! Ratatui front end: search box, suggestion panel, and the popular-terms board.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use parking_lot::Mutex;
use ratatui::backend::TestBackend;
use ratatui::prelude::*;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::leaderboard::{LeaderboardView, LeaderboardViewer};
use crate::search::{NavKey, PanelView, Processed, SearchWidget};
use crate::service::SuggestionService;
use crate::ui::components::theme::ThemePalette;
use crate::ui::render::{self, AppLayout};
use crate::ui::shortcuts;

const HEADLESS_WIDTH: u16 = 80;
const HEADLESS_HEIGHT: u16 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FocusRegion {
    Search,
    Leaderboard,
}

/// Everything one frame needs, borrowed from the live state.
struct Screen<'a> {
    query: &'a str,
    loading: bool,
    panel: PanelView<'a>,
    board: LeaderboardView<'a>,
    focus: FocusRegion,
    chosen: Option<&'a str>,
    show_help: bool,
    spinner: usize,
    palette: ThemePalette,
}

pub fn footer_legend(show_help: bool) -> String {
    if show_help {
        format!(
            "{}/{} move • {} choose • {} dismiss (again to quit) • {} clear • {} switch pane • {} or r reload popular • {} theme • F1 hide help • {} quit",
            shortcuts::PREV_SUGGESTION,
            shortcuts::NEXT_SUGGESTION,
            shortcuts::CHOOSE,
            shortcuts::DISMISS,
            shortcuts::CLEAR_QUERY,
            shortcuts::TAB_FOCUS,
            shortcuts::RETRY_LEADERBOARD,
            shortcuts::THEME,
            shortcuts::QUIT,
        )
    } else {
        format!(
            "F1 help | {} choose | {} dismiss | {} reload | {} theme | {} quit",
            shortcuts::CHOOSE,
            shortcuts::DISMISS,
            shortcuts::RETRY_LEADERBOARD,
            shortcuts::THEME,
            shortcuts::QUIT,
        )
    }
}

fn draw(frame: &mut Frame, screen: &Screen<'_>) -> AppLayout {
    let layout = render::app_layout(frame.area());
    let palette = screen.palette;
    render::render_header(frame, layout.header, palette);
    render::render_input(
        frame,
        layout.input,
        screen.query,
        screen.loading,
        screen.focus == FocusRegion::Search,
        screen.spinner,
        palette,
    );
    render::render_panel(frame, layout.panel, &screen.panel, palette);
    render::render_leaderboard(
        frame,
        layout.leaderboard,
        &screen.board,
        screen.focus == FocusRegion::Leaderboard,
        palette,
    );
    render::render_banner(frame, layout.banner, screen.chosen, palette);
    render::render_footer(
        frame,
        layout.footer,
        &footer_legend(screen.show_help),
        palette,
    );
    layout
}

pub async fn run_tui<S: SuggestionService>(
    service: Arc<S>,
    config: &AppConfig,
    once: bool,
) -> Result<()> {
    if once
        && std::env::var("TUI_HEADLESS")
            .map(|v| v == "1")
            .unwrap_or(false)
    {
        return run_tui_headless(service, config).await;
    }

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, service, config, once);
    teardown_terminal()?;
    result
}

fn event_loop<S: SuggestionService>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    service: Arc<S>,
    config: &AppConfig,
    once: bool,
) -> Result<()> {
    let chosen: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let banner = Arc::clone(&chosen);
    let mut widget = SearchWidget::from_config(Arc::clone(&service), config).on_chosen(
        move |term: &str| {
            *banner.lock() = Some(term.to_string());
        },
    );
    let mut board = LeaderboardViewer::new(service, config.top_limit);
    board.load();
    info!(api_url = %config.api_url, "tui started");

    let tick_rate = Duration::from_millis(30);
    let mut last_tick = Instant::now();
    let mut needs_draw = true;
    let mut focus = FocusRegion::Search;
    let mut theme_dark = true;
    let mut show_help = false;
    let mut spinner: usize = 0;
    let mut layout = render::app_layout(Rect::default());

    loop {
        if needs_draw {
            let chosen_term = chosen.lock().clone();
            let screen = Screen {
                query: widget.query(),
                loading: widget.is_loading(),
                panel: widget.view(),
                board: board.view(),
                focus,
                chosen: chosen_term.as_deref(),
                show_help,
                spinner,
                palette: if theme_dark {
                    ThemePalette::dark()
                } else {
                    ThemePalette::light()
                },
            };
            terminal.draw(|f| layout = draw(f, &screen))?;
            needs_draw = false;
            if once {
                break;
            }
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    needs_draw = true;
                    if is_quit(&key) {
                        break;
                    }
                    match key.code {
                        KeyCode::F(1) => show_help = !show_help,
                        KeyCode::F(2) => theme_dark = !theme_dark,
                        KeyCode::F(5) => board.load(),
                        KeyCode::Tab | KeyCode::BackTab => {
                            focus = match focus {
                                FocusRegion::Search => {
                                    widget.outside_pointer();
                                    FocusRegion::Leaderboard
                                }
                                FocusRegion::Leaderboard => {
                                    widget.focus();
                                    FocusRegion::Search
                                }
                            };
                        }
                        _ => match focus {
                            FocusRegion::Leaderboard => match key.code {
                                KeyCode::Char('r') => board.load(),
                                KeyCode::Esc => {
                                    widget.focus();
                                    focus = FocusRegion::Search;
                                }
                                _ => {}
                            },
                            FocusRegion::Search => {
                                if !handle_search_key(&mut widget, &key) {
                                    break;
                                }
                            }
                        },
                    }
                }
                Event::Mouse(mouse) => {
                    if handle_mouse(&mut widget, &layout, &mut focus, &mouse) {
                        needs_draw = true;
                    }
                }
                Event::Resize(..) => needs_draw = true,
                _ => {}
            }
        }

        for processed in widget.pump() {
            needs_draw = true;
            if let Processed::UsageReported {
                term,
                accepted: true,
            } = processed
            {
                debug!(term = %term, "reloading popular terms after usage report");
                board.load();
            }
        }
        if board.pump() {
            needs_draw = true;
        }

        if last_tick.elapsed() >= tick_rate {
            if widget.is_loading() || board.state().is_loading() {
                spinner = spinner.wrapping_add(1);
                needs_draw = true;
            }
            last_tick = Instant::now();
        }
    }

    widget.shutdown();
    info!("tui exited");
    Ok(())
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::F(10)
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
}

/// Returns `false` when the key asks to leave the app.
fn handle_search_key<S: SuggestionService>(widget: &mut SearchWidget<S>, key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Down => widget.key(NavKey::Down),
        KeyCode::Up => widget.key(NavKey::Up),
        KeyCode::Enter => widget.key(NavKey::Enter),
        KeyCode::Esc => {
            let view = widget.view();
            let hidden = view == PanelView::Hidden;
            let listing = matches!(view, PanelView::Suggestions { .. });
            if hidden {
                return false;
            } else if listing {
                widget.key(NavKey::Escape);
            } else {
                widget.outside_pointer();
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            widget.query_changed(String::new());
        }
        KeyCode::Backspace => {
            let mut query = widget.query().to_string();
            if query.pop().is_some() {
                widget.query_changed(query);
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut query = widget.query().to_string();
            query.push(c);
            widget.query_changed(query);
        }
        _ => widget.key(NavKey::Other),
    }
    true
}

/// Route a pointer event. Returns whether anything visible may have changed.
fn handle_mouse<S: SuggestionService>(
    widget: &mut SearchWidget<S>,
    layout: &AppLayout,
    focus: &mut FocusRegion,
    mouse: &MouseEvent,
) -> bool {
    let (col, row) = (mouse.column, mouse.row);
    let item = render::panel_item_at(layout.panel, &widget.view(), col, row);
    match mouse.kind {
        MouseEventKind::Moved => match item {
            Some(index) => {
                widget.hover(index);
                true
            }
            None => false,
        },
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(index) = item {
                widget.click(index);
            } else if render::contains(layout.input, col, row) {
                *focus = FocusRegion::Search;
                widget.focus();
            } else {
                if render::contains(layout.leaderboard, col, row) {
                    *focus = FocusRegion::Leaderboard;
                }
                widget.outside_pointer();
            }
            true
        }
        _ => false,
    }
}

/// Render one frame off-screen and print it. `TUI_HEADLESS_QUERY` is typed
/// into the box first.
async fn run_tui_headless<S: SuggestionService>(service: Arc<S>, config: &AppConfig) -> Result<()> {
    let wait = config.request_timeout() + config.debounce() + Duration::from_secs(1);

    let mut board = LeaderboardViewer::new(Arc::clone(&service), config.top_limit);
    board.load();
    let _ = tokio::time::timeout(wait, board.process_next()).await;

    let mut widget = SearchWidget::from_config(service, config);
    let query = std::env::var("TUI_HEADLESS_QUERY").unwrap_or_default();
    widget.query_changed(query);
    if widget.engine().has_live_timer() {
        let settle = async {
            while let Some(processed) = widget.process_next().await {
                if matches!(processed, Processed::Suggestions(_)) {
                    break;
                }
            }
        };
        if tokio::time::timeout(wait, settle).await.is_err() {
            debug!("headless render proceeding without suggestions");
        }
    }

    let mut terminal = Terminal::new(TestBackend::new(HEADLESS_WIDTH, HEADLESS_HEIGHT))?;
    let screen = Screen {
        query: widget.query(),
        loading: widget.is_loading(),
        panel: widget.view(),
        board: board.view(),
        focus: FocusRegion::Search,
        chosen: None,
        show_help: false,
        spinner: 0,
        palette: ThemePalette::dark(),
    };
    terminal.draw(|f| {
        draw(f, &screen);
    })?;

    let buffer = terminal.backend().buffer();
    for y in 0..buffer.area.height {
        let line: String = (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect();
        println!("{}", line.trim_end());
    }
    widget.shutdown();
    Ok(())
}

fn teardown_terminal() -> Result<()> {
    let mut stdout = io::stdout();
    disable_raw_mode()?;
    execute!(stdout, DisableMouseCapture, LeaveAlternateScreen)?;
    Ok(())
}
