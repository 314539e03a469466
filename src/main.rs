use bees_journey::{Dir, GridError, MoveEvent, Pos, Session, Settings, Tile};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{self, Stdout, Write};
use unicode_width::UnicodeWidthStr;

const CELL_W: usize = 2;
const MIN_PANEL_W: usize = 44;

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Bee,
    Empty,
    Start,
    Hive,
    Flower,
    Tree,
}

impl Glyph {
    fn look(self) -> (&'static str, Color) {
        match self {
            Glyph::Bee => ("🐝", Color::Yellow),
            Glyph::Empty => ("· ", Color::DarkGrey),
            Glyph::Start => ("⌂ ", Color::Cyan),
            Glyph::Hive => ("🏠", Color::DarkYellow),
            Glyph::Flower => ("🌼", Color::White),
            Glyph::Tree => ("🌳", Color::Green),
        }
    }
}

/// Everything shown on screen for one state of the session.
struct Frame {
    size: usize,
    hud: String,
    cells: Vec<Glyph>,
    footer: String,
}

impl Frame {
    fn capture(session: &Session) -> Self {
        let grid = session.grid();
        let size = grid.size();
        let mut cells = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let pos = Pos { x, y };
                let glyph = if pos == session.player() {
                    Glyph::Bee
                } else {
                    match grid.get(pos) {
                        Tile::Empty => Glyph::Empty,
                        Tile::Start => Glyph::Start,
                        Tile::Goal => Glyph::Hive,
                        Tile::Item => Glyph::Flower,
                        Tile::Obstacle => Glyph::Tree,
                    }
                };
                cells.push(glyph);
            }
        }

        let home = match session.steps_to_goal() {
            Some(steps) => steps.to_string(),
            None => "-".to_string(),
        };
        let hud = format!(
            "Moves: {}  Flowers: {}/{}  Hive in: {}",
            session.moves(),
            session.collected(),
            session.total_items(),
            home
        );
        let footer = if session.is_over() {
            format!(
                "Hooray! Bee is home in {} moves (r new game, q quit)",
                session.moves()
            )
        } else {
            "arrows/hjkl move  r new game  q quit".to_string()
        };

        Self {
            size,
            hud,
            cells,
            footer,
        }
    }
}

/// Draws frames, repainting only what changed since the last one.
struct Screen {
    shown: Option<Frame>,
    origin: (u16, u16),
}

impl Screen {
    fn new() -> Self {
        Self {
            shown: None,
            origin: (0, 0),
        }
    }

    fn invalidate(&mut self) {
        self.shown = None;
    }

    fn present(&mut self, stdout: &mut Stdout, frame: Frame) -> io::Result<()> {
        // Board sizes are capped well below u16 by the settings.
        let needed_w = (frame.size * CELL_W).max(MIN_PANEL_W) as u16;
        let needed_h = frame.size as u16 + 3;
        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            stdout.queue(Clear(ClearType::All))?;
            stdout.queue(MoveTo(0, 0))?;
            stdout.queue(Print(format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            )))?;
            stdout.flush()?;
            self.shown = None;
            return Ok(());
        }

        let origin = ((term_w - needed_w) / 2, (term_h - needed_h) / 2);
        if origin != self.origin {
            self.origin = origin;
            self.shown = None;
        }
        let previous = self.shown.take();
        if previous.is_none() {
            stdout.queue(Clear(ClearType::All))?;
        }
        let (ox, oy) = self.origin;
        let board_y = oy + 1;

        if previous.as_ref().map_or(true, |p| p.hud != frame.hud) {
            self.print_line(stdout, oy, &frame.hud, Color::White)?;
        }
        for (idx, glyph) in frame.cells.iter().enumerate() {
            if previous.as_ref().is_some_and(|p| p.cells[idx] == *glyph) {
                continue;
            }
            let x = ox + ((idx % frame.size) * CELL_W) as u16;
            let y = board_y + (idx / frame.size) as u16;
            draw_glyph(stdout, x, y, *glyph)?;
        }
        if previous.as_ref().map_or(true, |p| p.footer != frame.footer) {
            let y = board_y + frame.size as u16 + 1;
            self.print_line(stdout, y, &frame.footer, Color::Yellow)?;
        }

        stdout.flush()?;
        self.shown = Some(frame);
        Ok(())
    }

    fn print_line(&self, stdout: &mut Stdout, y: u16, text: &str, color: Color) -> io::Result<()> {
        stdout.queue(MoveTo(self.origin.0, y))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(SetForegroundColor(color))?;
        stdout.queue(Print(text))?;
        stdout.queue(ResetColor)?;
        Ok(())
    }
}

fn draw_glyph(stdout: &mut Stdout, x: u16, y: u16, glyph: Glyph) -> io::Result<()> {
    let (text, color) = glyph.look();
    stdout.queue(MoveTo(x, y))?;
    stdout.queue(SetForegroundColor(color))?;
    stdout.queue(Print(text))?;
    let pad = CELL_W.saturating_sub(UnicodeWidthStr::width(text));
    if pad > 0 {
        stdout.queue(Print(" ".repeat(pad)))?;
    }
    stdout.queue(ResetColor)?;
    Ok(())
}

fn main() -> io::Result<()> {
    let settings = Settings::from_env();
    init_logging(&settings)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &settings);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    if let Err(err) = &result {
        error!("exiting: {}", err);
    }
    result
}

fn init_logging(settings: &Settings) -> io::Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let (Some(filter), Some(path)) = (settings.log_filter(rust_log.as_deref()), &settings.log_file)
    else {
        return Ok(());
    };
    let file = File::create(path)?;
    env_logger::Builder::new()
        .parse_filters(&filter)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run(stdout: &mut Stdout, settings: &Settings) -> io::Result<()> {
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut session = Session::new(settings.grid, &mut rng).map_err(grid_error)?;
    info!(
        "new game on a {}x{} grid (seed {:?})",
        settings.grid.size, settings.grid.size, settings.seed
    );
    let mut screen = Screen::new();

    loop {
        screen.present(stdout, Frame::capture(&session))?;

        match event::read()? {
            Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('r') => {
                        match session.restart(&mut rng) {
                            Ok(()) => info!("new game"),
                            Err(err) => warn!("keeping the current board: {}", err),
                        }
                    }
                    code => {
                        if let Some(dir) = dir_for_key(code) {
                            if session.move_player(dir) == MoveEvent::Blocked {
                                debug!("blocked moving {:?} from {:?}", dir, session.player());
                            }
                        }
                    }
                }
            }
            Event::Resize(..) => screen.invalidate(),
            _ => {}
        }
    }
}

fn dir_for_key(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(Dir::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Dir::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(Dir::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(Dir::Right),
        _ => None,
    }
}

fn grid_error(err: GridError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err)
}
