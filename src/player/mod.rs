//! The interactive toy host.
//!
//! Drives a `Session` from the keyboard and paints both panels to the
//! terminal. Each frame is composed into a cell grid and only the cells that
//! changed since the previous frame are written out.

pub mod builder;
pub mod session;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Result, bail};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::{cursor, execute, queue, style, terminal};

use crate::config::{ToyConfig, matches_binding};
use crate::engine::Direction;
use crate::engine::source::ToySource;
use crate::menubar::menu_cells;
use crate::renderer::{Renderer, SceneView};
use crate::types::{Activation, Cell, Color, Grid, NamedColor, Style, TerminalContract, Trace};
use session::{FrameView, Session};

/// Rows above the panels: menu bar and slider readout.
const HEADER_ROWS: u16 = 2;
/// Columns between the two panels.
const GUTTER: u16 = 2;

pub struct Player {
    session: Session,
    config: ToyConfig,
    screen: Option<Grid>,
    status: Option<String>,
}

enum Control {
    Continue,
    Quit,
}

impl Player {
    pub fn new(toy: ToySource, config: ToyConfig) -> Self {
        Self {
            session: Session::new(toy),
            config,
            screen: None,
            status: None,
        }
    }

    /// Run the toy in the terminal.
    ///
    /// Sets up the terminal, enters the frame loop, and restores the terminal
    /// on exit (even on error).
    pub fn play(&mut self) -> Result<()> {
        let (term_w, term_h) = terminal::size()?;
        let need_w = self.config.viewport.panel_width * 2 + GUTTER;
        let need_h = self.config.viewport.panel_height + HEADER_ROWS + 4;
        if term_w < need_w || term_h < need_h {
            bail!("Terminal too small: need {need_w}x{need_h}, have {term_w}x{term_h}");
        }

        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.run_loop(&mut stdout);

        // Always restore terminal state.
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();

        result
    }

    // -----------------------------------------------------------------------
    // Frame loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let frame_time = Duration::from_millis(self.config.slider.frame_millis);
        loop {
            if event::poll(frame_time)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if let Control::Quit = self.handle_key(&key) {
                            break;
                        }
                    }
                    Event::Resize(_, _) => {
                        self.screen = None;
                        queue!(stdout, terminal::Clear(terminal::ClearType::All))?;
                    }
                    _ => {}
                }
            }

            self.session.advance(self.config.slider.step);
            let (term_w, term_h) = terminal::size()?;
            let screen = self.compose(term_w, term_h);
            self.present(stdout, screen)?;
        }
        Ok(())
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Control {
        let keys = self.config.key_bindings.clone();
        let slider = self.config.slider.clone();
        let hit = |binding: &str| matches_binding(binding, key);

        if hit(&keys.quit) || hit("Esc") {
            return Control::Quit;
        }
        self.status = None;

        if hit(&keys.toggle_builder) {
            self.session.toggle_builder();
            return Control::Continue;
        }
        if self.session.is_building() {
            self.handle_builder_key(key);
            return Control::Continue;
        }

        if hit(&keys.step_forward) {
            self.session.nudge(slider.step);
        } else if hit(&keys.step_back) {
            self.session.nudge(-slider.step);
        } else if hit(&keys.jump_forward) {
            self.session.nudge(slider.jump);
        } else if hit(&keys.jump_back) {
            self.session.nudge(-slider.jump);
        } else if hit(&keys.first) {
            self.session.nudge(f64::NEG_INFINITY);
        } else if hit(&keys.last) {
            self.session.nudge(f64::INFINITY);
        } else if hit(&keys.run) {
            self.session.toggle_run();
        } else if hit(&keys.toggle_reverse) {
            if !self.session.toggle_reverse() {
                self.status = Some("reverse is unavailable with save/restore".into());
            }
        } else if hit(&keys.toggle_result) {
            self.session.show_result = !self.session.show_result;
        } else if hit(&keys.toggle_original_csys) {
            self.session.original_csys = !self.session.original_csys;
        } else if hit(&keys.toggle_final_csys) {
            self.session.final_csys = !self.session.final_csys;
        }
        Control::Continue
    }

    fn handle_builder_key(&mut self, key: &KeyEvent) {
        let keys = &self.config.key_bindings;
        let hit = |binding: &str| matches_binding(binding, key);

        if hit(&keys.run) {
            if !self.session.run_builder() {
                self.status = Some("add a command before running".into());
            }
            return;
        }
        if hit(&keys.builder_reset) {
            self.session.reset_builder();
            return;
        }
        let builder = self.session.builder_mut();
        if hit(&keys.step_forward) {
            builder.adjust(1);
        } else if hit(&keys.step_back) {
            builder.adjust(-1);
        } else if hit(&keys.jump_back) {
            builder.select_param(1);
        } else if hit(&keys.jump_forward) {
            builder.select_param(-1);
        } else if hit(&keys.builder_kind) {
            builder.cycle_kind(1);
        } else if hit(&keys.builder_add) {
            builder.add();
        } else if hit(&keys.builder_delete) && !builder.delete_last() {
            self.status = Some("nothing to delete".into());
        }
    }

    /// Builder dials and the draft listing, in place of the left trace.
    fn builder_lines(&self) -> Vec<(String, Style)> {
        let builder = self.session.builder();
        let keys = &self.config.key_bindings;
        let bold = Style { bold: true, ..Default::default() };
        let mut lines = vec![(
            format!("build [{}] {}", keys.builder_kind, builder.kind().name()),
            bold.clone(),
        )];
        for (i, param) in builder.params().iter().enumerate() {
            let marker = if i == builder.selected() { '>' } else { ' ' };
            let style = if i == builder.selected() { bold.clone() } else { Style::default() };
            lines.push((
                format!(
                    " {marker} {}: {} ({} to {})",
                    param.label, param.value, param.min, param.max
                ),
                style,
            ));
        }
        lines.push((String::new(), Style::default()));
        for line in builder.listing() {
            lines.push((line, Style::default()));
        }
        lines
    }

    // -----------------------------------------------------------------------
    // Composition
    // -----------------------------------------------------------------------

    fn compose(&mut self, term_w: u16, term_h: u16) -> Grid {
        let viewport = &self.config.viewport;
        let contract = TerminalContract {
            width: viewport.panel_width,
            height: viewport.panel_height,
        };
        let view = SceneView {
            extent: viewport.scene_extent,
            ..SceneView::default()
        };
        let keys = &self.config.key_bindings;
        let hints = if self.session.is_building() {
            vec![
                format!("[{}/{}] dial", keys.step_back, keys.step_forward),
                format!("[{}/{}] param", keys.jump_forward, keys.jump_back),
                format!("[{}] kind", keys.builder_kind),
                format!("[{}] add", keys.builder_add),
                format!("[{}] delete", keys.builder_delete),
                format!("[{}] run", keys.run),
                format!("[{}] reset", keys.builder_reset),
                format!("[{}] close", keys.toggle_builder),
            ]
        } else {
            vec![
                format!("[{}/{}] scrub", keys.step_back, keys.step_forward),
                format!("[{}/{}] jump", keys.jump_back, keys.jump_forward),
                format!("[{}] run", keys.run),
                format!("[{}] reverse", keys.toggle_reverse),
                format!("[{}] result", keys.toggle_result),
                format!("[{}/{}] right axes", keys.toggle_original_csys, keys.toggle_final_csys),
                format!("[{}] build", keys.toggle_builder),
                format!("[{}] quit", keys.quit),
            ]
        };
        let right_x = viewport.panel_width + GUTTER;

        let frame: FrameView = self.session.frame(view, contract);
        let mut screen = Screen::new(term_w, term_h);

        let hint_refs: Vec<&str> = hints.iter().map(String::as_str).collect();
        screen.cells(0, 0, &menu_cells(&hint_refs));

        let direction = match self.session.direction() {
            Direction::Forward => "",
            Direction::Reverse => "  [reverse]",
        };
        let readout = format!(
            " {}  progress {:.2} / {}{direction}",
            self.session.toy.title,
            self.session.progress(),
            self.session.max_progress()
        );
        screen.text(0, 1, &readout, &Style { bold: true, ..Default::default() }, term_w);

        let top = HEADER_ROWS;
        screen.blit(0, top, &frame.left);
        let below = top + contract.height + 1;
        let width = viewport.panel_width;
        if self.session.is_building() {
            for (i, (line, style)) in self.builder_lines().iter().enumerate() {
                screen.text(0, below.saturating_add(i as u16), line, style, width);
            }
        } else {
            let after = screen.trace(0, below, &frame.left_trace, width);
            screen.notes(0, after, &frame.left_notes, width);
        }

        if let Some((grid, trace, notes)) = &frame.right {
            screen.blit(right_x, top, grid);
            let after = screen.trace(right_x, below, trace, width);
            screen.notes(right_x, after, notes, width);
        }

        let status = self
            .status
            .clone()
            .or_else(|| frame.left_trace.diagnostics.first().cloned())
            .unwrap_or_default();
        screen.text(
            0,
            term_h.saturating_sub(1),
            &status,
            &Style { dim: true, ..Default::default() },
            term_w,
        );

        screen.grid
    }

    fn present(&mut self, stdout: &mut io::Stdout, screen: Grid) -> Result<()> {
        let same_size = self.screen.as_ref().is_some_and(|prev| {
            prev.len() == screen.len() && prev.first().map(Vec::len) == screen.first().map(Vec::len)
        });
        match self.screen.as_ref().filter(|_| same_size) {
            Some(prev) => {
                for change in Renderer::diff(prev, &screen) {
                    let cs = to_content_style(&change.cell.style);
                    queue!(
                        stdout,
                        cursor::MoveTo(change.x, change.y),
                        style::PrintStyledContent(style::StyledContent::new(cs, change.cell.ch)),
                    )?;
                }
            }
            None => {
                for (y, row) in screen.iter().enumerate() {
                    queue!(stdout, cursor::MoveTo(0, y as u16))?;
                    for cell in row {
                        let cs = to_content_style(&cell.style);
                        queue!(
                            stdout,
                            style::PrintStyledContent(style::StyledContent::new(cs, cell.ch))
                        )?;
                    }
                }
            }
        }
        stdout.flush()?;
        self.screen = Some(screen);
        Ok(())
    }
}

/// Whole-terminal cell buffer the frame is composed into.
struct Screen {
    grid: Grid,
}

impl Screen {
    fn new(width: u16, height: u16) -> Self {
        Screen {
            grid: vec![vec![Cell::default(); width as usize]; height as usize],
        }
    }

    fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(slot) = self
            .grid
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        {
            *slot = cell;
        }
    }

    fn cells(&mut self, x: u16, y: u16, cells: &[Cell]) {
        for (i, cell) in cells.iter().enumerate() {
            self.set(x.saturating_add(i as u16), y, cell.clone());
        }
    }

    fn text(&mut self, x: u16, y: u16, text: &str, style: &Style, max_width: u16) {
        for (i, ch) in text.chars().take(max_width as usize).enumerate() {
            self.set(x.saturating_add(i as u16), y, Cell { ch, style: style.clone() });
        }
    }

    fn blit(&mut self, x: u16, y: u16, grid: &Grid) {
        for (row_index, row) in grid.iter().enumerate() {
            self.cells(x, y.saturating_add(row_index as u16), row);
        }
    }

    /// Write trace lines styled by activation. Returns the next free row.
    fn trace(&mut self, x: u16, y: u16, trace: &Trace, width: u16) -> u16 {
        let mut row = y;
        for line in &trace.lines {
            self.text(x, row, &line.text, &activation_style(line.activation), width);
            row = row.saturating_add(1);
        }
        row
    }

    fn notes(&mut self, x: u16, y: u16, notes: &[String], width: u16) {
        let style = Style::fg(Color::Named(NamedColor::Cyan));
        for (i, note) in notes.iter().enumerate() {
            self.text(x, y.saturating_add(1 + i as u16), note, &style, width);
        }
    }
}

fn activation_style(activation: Activation) -> Style {
    match activation {
        Activation::Inactive => Style { dim: true, ..Default::default() },
        Activation::Partial => Style {
            fg: Some(Color::Named(NamedColor::Yellow)),
            bold: true,
            ..Default::default()
        },
        Activation::Complete => Style::default(),
    }
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

pub fn to_content_style(s: &Style) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    if let Some(fg) = &s.fg {
        cs.foreground_color = Some(to_ct_color(fg));
    }
    if s.bold {
        cs.attributes.set(style::Attribute::Bold);
    }
    if s.dim {
        cs.attributes.set(style::Attribute::Dim);
    }
    cs
}

pub fn to_ct_color(c: &Color) -> style::Color {
    match c {
        Color::Named(n) => match n {
            NamedColor::Black => style::Color::Black,
            NamedColor::Red => style::Color::Red,
            NamedColor::Green => style::Color::Green,
            NamedColor::Yellow => style::Color::Yellow,
            NamedColor::Blue => style::Color::Blue,
            NamedColor::Magenta => style::Color::Magenta,
            NamedColor::Cyan => style::Color::Cyan,
            NamedColor::White => style::Color::White,
            NamedColor::Gray => style::Color::Grey,
            NamedColor::Orange => style::Color::Rgb { r: 255, g: 165, b: 0 },
            NamedColor::Purple => style::Color::Rgb { r: 128, g: 0, b: 128 },
        },
        Color::Keyword(k) => {
            let [r, g, b] = k.rgb();
            style::Color::Rgb { r, g, b }
        }
        // Cells have no alpha; translucent colors draw opaque.
        Color::Rgba { r, g, b, .. } | Color::Rgb { r, g, b } => style::Color::Rgb {
            r: *r,
            g: *g,
            b: *b,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_clips_text_and_blits() {
        let mut screen = Screen::new(5, 2);
        screen.text(3, 0, "abc", &Style::default(), 10);
        assert_eq!(screen.grid[0][3].ch, 'a');
        assert_eq!(screen.grid[0][4].ch, 'b');

        let patch = vec![vec![Cell { ch: '#', style: Style::default() }; 2]; 3];
        screen.blit(4, 1, &patch);
        assert_eq!(screen.grid[1][4].ch, '#');
        assert_eq!(screen.grid.len(), 2);
    }

    #[test]
    fn activation_styles_differ() {
        assert!(activation_style(Activation::Inactive).dim);
        assert!(activation_style(Activation::Partial).bold);
        assert_eq!(activation_style(Activation::Complete), Style::default());
    }
}
