//! Event loop: terminal mouse events in, frames out.

use std::io::stdout;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tracing::warn;

use ripplepad::audio;
use ripplepad::gesture::{PointerEvent, PointerEventKind};
use ripplepad::surface::{MapperMode, Surface};
use ripplepad::synth::SynthMessage;

use super::ui;

/// The virtual surface the gesture thresholds are tuned for. Terminal
/// cells are scaled into this space.
pub const SURFACE_WIDTH: f32 = 800.0;
pub const SURFACE_HEIGHT: f32 = 600.0;

/// The terminal reports a single mouse pointer.
const MOUSE_POINTER_ID: u64 = 0;

pub struct App {
    surface: Surface<rtrb::Producer<SynthMessage>>,
    // Held for its Drop; dropping stops the stream.
    _audio: Option<audio::AudioOutput>,
    started: Instant,
    should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        // No device is not fatal: the surface runs visuals-only.
        let (producer, output) = match audio::start_default() {
            Ok((producer, output)) => (Some(producer), Some(output)),
            Err(err) => {
                warn!("audio unavailable: {err}");
                (None, None)
            }
        };

        Self {
            surface: Surface::new(SURFACE_WIDTH, SURFACE_HEIGHT, MapperMode::Scale, producer),
            _audio: output,
            started: Instant::now(),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        execute!(stdout(), EnableMouseCapture)?;
        let result = self.event_loop(terminal);
        execute!(stdout(), DisableMouseCapture)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            let now = self.now();
            self.surface.update(now);

            let field = self.surface.frame(now);
            let mode = self.surface.mode();
            let audio_on = self._audio.is_some();
            terminal.draw(|frame| ui::render(frame, &field, mode, audio_on))?;

            // ~60 fps when idle; events interrupt the wait.
            if event::poll(Duration::from_millis(16))? {
                let size = terminal.size()?;
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key.code);
                    }
                    Event::Mouse(mouse) => {
                        self.handle_mouse(mouse, size.width, size.height);
                    }
                    _ => {}
                }
            }
        }

        self.surface.all_off(self.now());
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('g') | KeyCode::Char('G') => {
                let next = match self.surface.mode() {
                    MapperMode::Scale => MapperMode::Grid,
                    MapperMode::Grid => MapperMode::Scale,
                };
                self.surface.set_mode(next);
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, cols: u16, rows: u16) {
        let kind = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => PointerEventKind::Down,
            MouseEventKind::Drag(MouseButton::Left) => PointerEventKind::Move,
            MouseEventKind::Up(MouseButton::Left) => PointerEventKind::Up,
            _ => return,
        };

        // Terminal cell to virtual surface coordinates.
        let x = (mouse.column as f32 + 0.5) / cols.max(1) as f32 * SURFACE_WIDTH;
        let y = (mouse.row as f32 + 0.5) / rows.max(1) as f32 * SURFACE_HEIGHT;

        let event = PointerEvent {
            kind,
            id: MOUSE_POINTER_ID,
            x,
            y,
        };
        self.surface.handle_pointer(event, self.now());
    }

    fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}
