/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen layout:
///   row 0      header: room name, case state
///   row 2..    the room, top-down, north up, two columns per world unit
///   below      status line (outcome message), event message, help

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use glam::Vec3;

use crate::domain::collision::CueGroup;
use crate::domain::motion::Facing;
use crate::domain::outcome::Outcome;
use crate::scene::Scene;
use crate::sim::session::Session;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every "empty" terminal cell. Using the
    /// same RGB for `Clear` and for each cell keeps inter-row gaps invisible
    /// on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── Layout ──

/// Terminal columns per world unit.
const CELL_W: usize = 2;

const HEADER_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HEADER_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const WALL_FG: Color = Color::Rgb { r: 120, g: 100, b: 80 };
const SPEAKING_BG: Color = Color::Rgb { r: 200, g: 160, b: 40 };
const PLAYING_BG: Color = Color::Rgb { r: 40, g: 140, b: 170 };

/// Maps world x/y onto grid cells: one cell per world unit, north up.
struct Viewport {
    min_x: f32,
    max_y: f32,
    cols: usize,
    rows: usize,
}

impl Viewport {
    fn of(scene: &Scene) -> Option<Viewport> {
        let (lo, hi) = scene.bounds()?;
        Some(Viewport {
            min_x: lo.x,
            max_y: hi.y,
            cols: (hi.x - lo.x).ceil().max(0.0) as usize,
            rows: (hi.y - lo.y).ceil().max(0.0) as usize,
        })
    }

    fn cell(&self, p: Vec3) -> Option<(usize, usize)> {
        let gx = (p.x - self.min_x).floor();
        let gy = (self.max_y - p.y).floor();
        if gx < 0.0 || gy < 0.0 { return None; }
        let (gx, gy) = (gx as usize, gy as usize);
        (gx < self.cols && gy < self.rows).then_some((gx, gy))
    }

    /// Grid cells covered by a box, as column and row ranges.
    fn span(&self, center: Vec3, half: Vec3) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        let half = half.abs();
        let clamp = |v: f32, max: usize| (v.max(0.0) as usize).min(max);
        let x0 = clamp((center.x - half.x - self.min_x).floor(), self.cols);
        let x1 = clamp((center.x + half.x - self.min_x).ceil(), self.cols);
        let y0 = clamp((self.max_y - center.y - half.y).floor(), self.rows);
        let y1 = clamp((self.max_y - center.y + half.y).ceil(), self.rows);
        (x0..x1, y0..y1)
    }
}

fn facing_glyph(facing: Facing) -> char {
    match facing {
        Facing::Down => '▼',
        Facing::Right => '▶',
        Facing::Up => '▲',
        Facing::Left => '◀',
    }
}

fn case_state(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::InProgress => "investigating",
        Outcome::Win => "case closed",
        Outcome::Lose => "case botched",
    }
}

/// Draw one frame of the session into `buf`.
fn compose<P>(buf: &mut FrameBuffer, scene: &Scene, session: &Session<P>, message: &str) {
    let header = format!(" {}  ·  {} ", scene.name, case_state(session.outcome()));
    buf.fill_row(HEADER_ROW, HEADER_BG);
    buf.put_str(0, HEADER_ROW, &header, Color::White, HEADER_BG);

    let Some(view) = Viewport::of(scene) else { return };
    let bindings = session.bindings();
    let to_screen = |gx: usize, gy: usize| (gx * CELL_W, MAP_ROW + gy);

    for &id in &bindings.walls {
        let wall = scene.get(id);
        let (cols, rows) = view.span(wall.position, wall.scale);
        for gy in rows {
            for gx in cols.clone() {
                let (x, y) = to_screen(gx, gy);
                buf.set(x, y, Cell::new('█', WALL_FG, Color::Reset));
                buf.set(x + 1, y, Cell::new('█', WALL_FG, Color::Reset));
            }
        }
    }

    let mut mark = |pos: Vec3, ch: char, fg: Color, bg: Color| {
        if let Some((gx, gy)) = view.cell(pos) {
            let (x, y) = to_screen(gx, gy);
            buf.set(x, y, Cell::new(ch, fg, bg));
            buf.set(x + 1, y, Cell::new(' ', fg, bg));
        }
    };

    for (i, &id) in bindings.evidence.iter().enumerate() {
        let ch = char::from(b'a' + i as u8);
        let bg = if session.cue_active(CueGroup::Recording, i) { PLAYING_BG } else { Color::Reset };
        mark(scene.position(id), ch, Color::Cyan, bg);
    }

    for (i, &id) in bindings.suspects.iter().enumerate() {
        let ch = char::from(b'1' + i as u8);
        let bg = if session.cue_active(CueGroup::Alibi, i) { SPEAKING_BG } else { Color::Reset };
        mark(scene.position(id), ch, Color::Yellow, bg);
    }

    mark(scene.position(bindings.player), facing_glyph(session.facing()), Color::Green, Color::Reset);

    // ── Status, message, help ──
    let status_row = MAP_ROW + view.rows + 1;
    let (fg, bg) = match session.outcome() {
        Outcome::InProgress => (Color::White, Color::Reset),
        Outcome::Win => (Color::Black, Color::Rgb { r: 80, g: 180, b: 80 }),
        Outcome::Lose => (Color::White, Color::Rgb { r: 170, g: 50, b: 50 }),
    };
    if session.outcome().is_terminal() {
        buf.fill_row(status_row, bg);
    }
    buf.put_str(1, status_row, session.status_line(), fg, bg);

    if !message.is_empty() {
        buf.put_str(1, status_row + 1, &format!("◈ {message}"), Color::Yellow, Color::Reset);
    }

    let help = " Pad: D-pad/stick move  A/X arrest  Select quit";
    buf.put_str(0, status_row + 3, help, Color::DarkGrey, Color::Reset);
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    key_release: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            key_release: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        self.fit_terminal();
        Ok(())
    }

    /// Ask the terminal to report key releases. Returns true if it will.
    pub fn enable_key_release(&mut self) -> bool {
        if !matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
            return false;
        }
        let flags = KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
        self.key_release = execute!(self.writer, PushKeyboardEnhancementFlags(flags)).is_ok();
        self.key_release
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.key_release {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Returns true if the size changed; the next flush repaints everything.
    fn fit_terminal(&mut self) -> bool {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize == self.term_w && th as usize == self.term_h {
            return false;
        }
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
        true
    }

    pub fn render<P>(&mut self, scene: &Scene, session: &Session<P>, message: &str) -> io::Result<()> {
        if self.fit_terminal() {
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        compose(&mut self.front, scene, session, message);
        self.flush_diff()?;

        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors; ResetColor would fall back to the terminal's
        // own default and show as lines between rows.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) { continue; }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Rules, Tuning};
    use crate::domain::controls::Control;
    use crate::scene::layout;
    use crate::sim::audio::fake::{FakeAudio, FakePlayback};

    const ROOM: &str = "\
@ Study
##########
#1 2 3 4 #
#        #
#abcde   #
#P      C#
##########
";

    fn frame(scene: &Scene, session: &Session<FakePlayback>, message: &str) -> FrameBuffer {
        let mut buf = FrameBuffer::new(80, 16);
        compose(&mut buf, scene, session, message);
        buf
    }

    fn setup() -> (Scene, Session<FakePlayback>) {
        let scene = layout::parse(ROOM).unwrap();
        let session = Session::new(&scene, Rules::default(), Tuning::default(), &FakeAudio::bank()).unwrap();
        (scene, session)
    }

    #[test]
    fn draws_room_top_down() {
        let (scene, session) = setup();
        let buf = frame(&scene, &session, "");
        assert!(buf.row_text(HEADER_ROW).contains("Study"));
        assert!(buf.row_text(HEADER_ROW).contains("investigating"));
        assert_eq!(buf.row_text(MAP_ROW).trim_end(), "█".repeat(20));
        assert_eq!(buf.row_text(MAP_ROW + 1).trim_end(), "██1   2   3   4   ██");
        assert_eq!(buf.row_text(MAP_ROW + 4).trim_end(), format!("██▼{}██", " ".repeat(15)));
    }

    #[test]
    fn status_and_message_below_room() {
        let (scene, session) = setup();
        let buf = frame(&scene, &session, "Nobody close enough.");
        let status_row = MAP_ROW + 6 + 1;
        assert!(buf.row_text(status_row).contains(session.status_line()));
        assert!(buf.row_text(status_row + 1).contains("Nobody close enough."));
    }

    #[test]
    fn speaking_suspect_is_highlighted() {
        let (mut scene, mut session) = setup();
        let mut audio = FakeAudio::new();
        // Suspect 2 sits at (3.5, 4.5); start just out of speaking range below it.
        scene.get_mut(session.bindings().player).position = Vec3::new(3.5, 3.15, 0.0);
        session.key_down(&scene, Some(Control::Up));
        session.update(&mut scene, &mut audio, 1.0 / 60.0);
        assert!(session.cue_active(CueGroup::Alibi, 1));

        let buf = frame(&scene, &session, "");
        let (x, y) = (3 * CELL_W, MAP_ROW + 1);
        assert_eq!(buf.get(x, y).ch, '2');
        assert_eq!(buf.get(x, y).bg, SPEAKING_BG);
        assert_eq!(buf.get(CELL_W, y).bg, Cell::BASE_BG);
    }

    #[test]
    fn player_glyph_follows_facing() {
        let (mut scene, mut session) = setup();
        let mut audio = FakeAudio::new();
        session.key_down(&scene, Some(Control::Right));
        session.update(&mut scene, &mut audio, 1.0 / 60.0);
        let buf = frame(&scene, &session, "");
        assert!(buf.row_text(MAP_ROW + 4).contains('▶'));
    }

    #[test]
    fn viewport_maps_north_up() {
        let scene = layout::parse(ROOM).unwrap();
        let view = Viewport::of(&scene).unwrap();
        assert_eq!((view.cols, view.rows), (10, 6));
        assert_eq!(view.cell(Vec3::new(1.5, 1.5, 0.0)), Some((1, 4)));
        assert_eq!(view.cell(Vec3::new(-1.0, 1.5, 0.0)), None);
        assert_eq!(view.span(Vec3::new(5.0, 0.5, 0.0), Vec3::new(5.0, 0.5, 0.5)), (0..10, 5..6));
    }
}
