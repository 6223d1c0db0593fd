//! Full-screen error message shown before the display starts.
//!
//! Used when configuration or device setup fails after the user launched the
//! TUI, so the reason is readable instead of flashing past.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::time::Duration;

/// Red full-screen error with a centred title, message and dismiss hint.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl ErrorScreen {
    /// # Errors
    /// - If raw mode cannot be enabled
    /// - If the alternate screen cannot be entered
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            active: true,
        })
    }

    /// Shows `title` and `message` until any key is pressed.
    ///
    /// # Errors
    /// - If terminal rendering or event polling fails
    pub fn show(&mut self, title: &str, message: &str) -> anyhow::Result<()> {
        let text_style = Style::default().fg(Color::White).bg(Color::Rgb(170, 0, 0));
        let lines = vec![
            Line::from(Span::styled(title, text_style.add_modifier(Modifier::BOLD))),
            Line::default(),
            Line::from(Span::styled(message, text_style)),
            Line::default(),
            Line::from(Span::styled("Press any key to exit", text_style.add_modifier(Modifier::DIM))),
        ];

        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();
                frame.render_widget(Block::default().style(text_style), area);

                let [_, middle, _] = Layout::vertical([
                    Constraint::Percentage(35),
                    Constraint::Min(5),
                    Constraint::Percentage(35),
                ])
                .areas(area);
                let [_, text_area, _] = Layout::horizontal([
                    Constraint::Percentage(10),
                    Constraint::Percentage(80),
                    Constraint::Percentage(10),
                ])
                .areas(middle);

                let paragraph = Paragraph::new(lines.clone())
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, text_area);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Restores the terminal.
    ///
    /// # Errors
    /// - If raw mode cannot be disabled
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Shows an error screen, logging instead if the terminal cannot be used.
pub fn report(title: &str, message: &str) {
    let shown = ErrorScreen::new().and_then(|mut screen| {
        screen.show(title, message)?;
        screen.cleanup()
    });
    if let Err(e) = shown {
        tracing::warn!("Could not show error screen: {e}");
    }
}
