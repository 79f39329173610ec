//! TUI rendering and terminal management (impure shell)

pub mod constants;
pub mod demo;
mod grid_view;
pub mod loader;
mod styles;

pub use grid_view::{fit, GridView, StatusBar};
pub use loader::{LazyLoader, LoadOutcome, LoadRequest};

use crate::grid::{GridEvent, TreeGrid};
use crate::model::LayoutError;
use constants::{FALLBACK_WIDTH, HEADER_HEIGHT, STATUS_BAR_HEIGHT, TICK_INTERVAL, WHEEL_ROWS};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// Columns could not be laid out for the terminal width
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    grid: TreeGrid,
    loader: LazyLoader,
    /// Area of the grid rows (below the header), for mouse hit testing.
    rows_area: Rect,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen
    pub fn new(grid: TreeGrid, loader: LazyLoader) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(crossterm::event::EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Self::with_terminal(terminal, grid, loader)
    }

    /// Run the main event loop
    ///
    /// Returns when the user quits (q or Ctrl+C). Every poll timeout is one
    /// display refresh: the grid flushes pending changes and the screen is
    /// redrawn only if something was flushed.
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.grid.set_focus(true);
        self.tick();
        self.draw()?;

        loop {
            if event::poll(TICK_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(width, height) => self.handle_resize(width, height),
                    Event::FocusGained => self.grid.set_focus(true),
                    Event::FocusLost => self.grid.set_focus(false),
                    _ => {}
                }
            }

            if self.tick() {
                self.draw()?;
            }
        }
    }
}

impl<B> TuiApp<B>
where
    B: Backend,
{
    /// Wrap an existing terminal and size the grid to it.
    pub fn with_terminal(
        terminal: Terminal<B>,
        grid: TreeGrid,
        loader: LazyLoader,
    ) -> Result<Self, TuiError> {
        let mut app = Self {
            terminal,
            grid,
            loader,
            rows_area: Rect::default(),
        };
        let size = app.terminal.size()?;
        let width = if size.width > 0 {
            size.width
        } else {
            FALLBACK_WIDTH
        };
        app.resize(width, size.height)?;
        Ok(app)
    }

    /// The grid being shown.
    pub fn grid(&self) -> &TreeGrid {
        &self.grid
    }

    /// The terminal being drawn to.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Run one display refresh.
    ///
    /// Applies finished lazy loads, queues newly requested ones, then
    /// flushes the grid. Returns whether anything was rendered.
    pub fn tick(&mut self) -> bool {
        for outcome in self.loader.drain() {
            match self
                .grid
                .resolve_lazy_load(outcome.node, outcome.generation, outcome.result)
            {
                Ok(applied) => debug!(node = %outcome.node, applied, "lazy load delivered"),
                Err(err) => warn!(error = %err, "lazy load for unknown node"),
            }
        }

        for grid_event in self.grid.take_events() {
            if let GridEvent::LoadRequested {
                node, generation, ..
            } = grid_event
            {
                let Some(target) = self.grid.tree().get(node) else {
                    continue;
                };
                let request = LoadRequest {
                    node,
                    generation,
                    key: target.key().to_string(),
                    level: target.level(),
                };
                self.loader.request(request);
            }
        }

        self.grid.on_tick().is_some()
    }

    /// Handle a single keyboard event
    ///
    /// Returns true if app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        // While editing, q is text.
        if key.code == KeyCode::Char('q') && self.grid.edit().is_none() {
            return true;
        }
        self.grid.handle_key(key);
        false
    }

    /// Handle a mouse event: clicks in the rows and wheel scrolling.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let area = self.rows_area;
        let inside = mouse.column >= area.x
            && mouse.column < area.x + area.width
            && mouse.row >= area.y
            && mouse.row < area.y + area.height;
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if inside => {
                let x = u32::from(mouse.column - area.x);
                let y = u32::from(mouse.row - area.y);
                if let Some(target) = self.grid.handle_click(x, y) {
                    debug!(node = %target.node, column = target.column, region = ?target.region, "click");
                }
            }
            MouseEventKind::ScrollDown => {
                self.grid.scroll_by(WHEEL_ROWS);
            }
            MouseEventKind::ScrollUp => {
                self.grid.scroll_by(-WHEEL_ROWS);
            }
            _ => {}
        }
    }

    /// Terminal resized. Zero widths are ignored.
    pub fn handle_resize(&mut self, width: u16, height: u16) {
        debug!(width, height, "terminal resized");
        if let Err(err) = self.resize(width, height) {
            warn!(error = %err, "keeping previous layout");
        }
    }

    fn resize(&mut self, width: u16, height: u16) -> Result<(), TuiError> {
        let (grid_area, _) = split(Rect::new(0, 0, width, height));
        let rows_height = grid_area.height.saturating_sub(HEADER_HEIGHT);
        self.grid
            .set_viewport_size(u32::from(grid_area.width), u32::from(rows_height))?;
        self.rows_area = Rect {
            y: grid_area.y + HEADER_HEIGHT,
            height: rows_height,
            ..grid_area
        };
        Ok(())
    }

    /// Render the current frame
    pub fn draw(&mut self) -> Result<(), TuiError> {
        let grid = &self.grid;
        let pending = self.loader.pending();
        self.terminal.draw(|frame| render(frame, grid, pending))?;
        Ok(())
    }
}

/// Split the screen into the grid and the status bar.
fn split(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)])
        .split(area);
    (chunks[0], chunks[1])
}

fn render(frame: &mut Frame, grid: &TreeGrid, pending_loads: usize) {
    let (grid_area, status_area) = split(frame.area());
    frame.render_widget(GridView::new(grid), grid_area);
    frame.render_widget(StatusBar::new(grid, pending_loads), status_area);
}

/// Initialize and run the TUI on `grid`.
///
/// Handles terminal setup, runs the event loop, and restores the terminal
/// on exit, including on error.
///
/// Note: Logging must be initialized by caller before calling this function.
pub fn run_with_grid(grid: TreeGrid, loader: LazyLoader) -> Result<(), TuiError> {
    info!(nodes = grid.tree().len(), "starting demo");
    let result = TuiApp::new(grid, loader).and_then(|mut app| app.run());

    // Always restore terminal state
    restore_terminal()?;

    result
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture, and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(crossterm::event::DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
