use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use snapdeck_core::AppConfig;
use snapdeck_tui::{
    app::App,
    event::{AppEvent, EventHandler},
    host::Page,
    input::{handle_key_event, handle_mouse_event},
    scroll::UiConfigExt,
    widgets::{AfterDeckWidget, HelpWidget, SlidesWidget, StatusBarWidget},
    DeckFile,
};

pub async fn run(config: Arc<AppConfig>, deck_path: Option<PathBuf>) -> Result<()> {
    // Load the deck before touching the terminal so errors print normally
    let deck = match &deck_path {
        Some(path) => DeckFile::load(path)?,
        None => DeckFile::demo(),
    };
    let mut app = App::new(config.clone(), deck)?;
    tracing::info!(deck = ?deck_path, "starting deck");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("Snapdeck"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, &config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    config: &AppConfig,
) -> Result<()> {
    let event_handler = EventHandler::new(config.ui.tick_rate(), config.ui.frame_duration());
    let wheel_delta = config.ui.terminal_wheel_delta;

    loop {
        app.update(app.now());

        // Draw UI
        terminal.draw(|frame| {
            let size = frame.area();

            // Main layout: slides + status bar
            let main_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(size);

            app.set_viewport(main_layout[0].width);

            match app.page() {
                Page::Deck => SlidesWidget::render(frame, main_layout[0], app),
                Page::After => AfterDeckWidget::render(frame, main_layout[0], app),
            }
            StatusBarWidget::render(frame, main_layout[1], app);

            if app.show_help {
                HelpWidget::render(frame, &app.theme);
            }
        })?;

        // Poll faster while something is moving or an engine timer is pending
        let event = if app.needs_fast_update() {
            event_handler.next_frame()?
        } else {
            event_handler.next()?
        };

        if let Some(event) = event {
            let now = app.now();
            match event {
                AppEvent::Key(key) => app.handle_action(handle_key_event(key), now),
                AppEvent::Mouse(mouse) => {
                    app.handle_action(handle_mouse_event(mouse, wheel_delta), now)
                }
                AppEvent::Resize(width, height) => {
                    tracing::debug!(width, height, "terminal resized");
                    app.on_resize(now);
                }
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
