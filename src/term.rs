//! ASCII view of a session and a minimal terminal renderer.
//!
//! The view is plain text lines so it can be tested without a terminal;
//! [`TerminalRenderer`] only knows how to enter/leave raw mode and redraw
//! those lines.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor,
    style::{Attribute, Print, ResetColor, SetAttribute},
    terminal, QueueableCommand,
};

use crate::core::{Animator, PlaybackSource, ShapeGenerator, TurnOrchestrator, TurnPhase};
use crate::types::{PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

const EMPTY: char = '.';
const ACTIVE: char = '@';

fn kind_char(kind: PieceKind) -> char {
    kind.as_str().chars().next().unwrap_or('#')
}

fn slot(kind: Option<PieceKind>) -> &'static str {
    kind.map_or("-", |k| k.as_str())
}

/// Render the board, active piece and side panel as text lines.
///
/// Settled cells show their shape letter, the active piece shows `@`.
pub fn render_lines<P, G, A>(game: &TurnOrchestrator<P, G, A>) -> Vec<String>
where
    P: PlaybackSource,
    G: ShapeGenerator,
    A: Animator,
{
    let width = BOARD_WIDTH as usize;
    let height = BOARD_HEIGHT as usize;
    let mut grid = vec![vec![EMPTY; width]; height];

    for (y, row) in grid.iter_mut().enumerate() {
        for (x, ch) in row.iter_mut().enumerate() {
            if let Some(Some(kind)) = game.board().get(x as i8, y as i8) {
                *ch = kind_char(kind);
            }
        }
    }
    if let Some(piece) = game.piece() {
        for &(x, y) in piece.cells() {
            if (0..width as i8).contains(&x) && (0..height as i8).contains(&y) {
                grid[y as usize][x as usize] = ACTIVE;
            }
        }
    }

    let stats = game.stats();
    let panel = [
        format!("next   {}", slot(game.next())),
        format!("saved  {}", slot(game.saved())),
        format!("speed  {:.2}x", game.clock().speed()),
        format!("rows   {}", stats.rows_cleared),
        format!("pieces {}", stats.pieces_spawned),
        match game.phase() {
            TurnPhase::GameOver => "GAME OVER".to_string(),
            _ => String::new(),
        },
    ];

    let mut lines = Vec::with_capacity(height + 2);
    lines.push(format!("+{}+", "-".repeat(width)));
    for (y, row) in grid.iter().enumerate() {
        let mut line = String::with_capacity(width + 16);
        line.push('|');
        line.extend(row.iter());
        line.push('|');
        if let Some(text) = panel.get(y).filter(|text| !text.is_empty()) {
            line.push_str("  ");
            line.push_str(text);
        }
        lines.push(line);
    }
    lines.push(format!("+{}+", "-".repeat(width)));
    lines
}

pub struct TerminalRenderer {
    stdout: io::Stdout,
    buf: Vec<u8>,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            buf: Vec::with_capacity(4 * 1024),
        }
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.flush_buf()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Full redraw of `lines` from the top-left corner.
    pub fn draw(&mut self, lines: &[String]) -> Result<()> {
        self.buf.clear();
        encode_lines_into(lines, &mut self.buf)?;
        self.flush_buf()
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Encode a full redraw into `out` without touching stdout.
pub fn encode_lines_into(lines: &[String], out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    out.queue(cursor::MoveTo(0, 0))?;
    for (i, line) in lines.iter().enumerate() {
        out.queue(Print(line))?;
        if i + 1 < lines.len() {
            out.queue(Print("\r\n"))?;
        }
    }
    Ok(())
}
