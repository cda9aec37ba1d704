mod app;
mod input;
mod markdown;
mod scroll;
mod ui;

use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use parley_client::AssistantClient;
use ratatui::prelude::*;
use tracing::info;

use crate::error::ParleyError;
use app::ChatApp;

pub async fn run(client: AssistantClient, title: String) -> Result<(), ParleyError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut terminal = match enter_screen() {
        Ok(terminal) => terminal,
        Err(err) => {
            let _ = restore_terminal(&mut io::stdout());
            return Err(err.into());
        }
    };

    let mut app = ChatApp::new(Arc::new(client), title);
    app.start();

    let result = run_loop(&mut terminal, &mut app).await;

    // Restore terminal even if the loop failed
    let restored = restore_terminal(terminal.backend_mut()).and(terminal.show_cursor());

    info!(
        messages = app.store.transcript().len(),
        "Chat session closed"
    );

    result?;
    Ok(restored?)
}

fn enter_screen() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

/// Leaves raw mode and the alternate screen. Both steps run even if one fails.
fn restore_terminal(out: &mut impl Write) -> io::Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(out, LeaveAlternateScreen);
    raw.and(screen)
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut ChatApp,
) -> Result<(), ParleyError> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;
        app.advance_tick();

        // Poll for events with timeout to allow checking async responses
        if event::poll(Duration::from_millis(50))? {
            let event = event::read()?;
            input::handle_event(app, event);
        }

        app.poll();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
