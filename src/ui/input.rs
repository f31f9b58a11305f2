/// Keyboard input: terminal key events → held keys → control transitions.
///
/// Terminals rarely report key releases, so a key counts as held until
/// HOLD_TIMEOUT passes without a Press/Repeat for it. When the keyboard
/// enhancement protocol is confirmed working, real Release events are
/// honored instead.
///
/// The session wants discrete key-down / key-up calls. `ControlLatch`
/// turns the merged held state of every source (keys + gamepad) into
/// exactly those transitions, once per frame.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::KeyConfig;
use crate::domain::controls::Control;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key names ──

/// `"Left"`, `"Space"`, `"Enter"`, or a single character (case-insensitive).
pub fn parse_key(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c.to_ascii_lowercase()));
    }
    match name.to_ascii_lowercase().as_str() {
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "space" => Some(KeyCode::Char(' ')),
        "enter" | "return" => Some(KeyCode::Enter),
        "tab" => Some(KeyCode::Tab),
        _ => None,
    }
}

/// Which keys drive which control.
pub struct KeyMap {
    keys: Vec<(Control, Vec<KeyCode>)>,
}

impl KeyMap {
    /// Unknown names are skipped; a control left with no keys keeps its default.
    pub fn from_config(cfg: &KeyConfig) -> Self {
        let defaults = KeyMap::default();
        let parse_list = |names: &[String]| -> Vec<KeyCode> {
            names.iter().filter_map(|n| parse_key(n)).collect()
        };
        let lists = [&cfg.left, &cfg.right, &cfg.up, &cfg.down, &cfg.arrest];
        let keys = Control::ALL
            .iter()
            .zip(lists)
            .map(|(&control, names)| {
                let parsed = parse_list(names.as_slice());
                if parsed.is_empty() {
                    (control, defaults.keys_for(control).to_vec())
                } else {
                    (control, parsed)
                }
            })
            .collect();
        KeyMap { keys }
    }

    pub fn keys_for(&self, control: Control) -> &[KeyCode] {
        self.keys
            .iter()
            .find(|(c, _)| *c == control)
            .map(|(_, k)| k.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        KeyMap {
            keys: vec![
                (Control::Left, vec![KeyCode::Left, KeyCode::Char('a')]),
                (Control::Right, vec![KeyCode::Right, KeyCode::Char('d')]),
                (Control::Up, vec![KeyCode::Up, KeyCode::Char('w')]),
                (Control::Down, vec![KeyCode::Down, KeyCode::Char('s')]),
                (Control::Arrest, vec![KeyCode::Char(' ')]),
            ],
        }
    }
}

// ── Terminal key state ──

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the session update.
    pub fn drain_events(&mut self) {
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.apply(key, Instant::now());
            }
        }

        self.expire(Instant::now());
    }

    fn apply(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        let code = normalize(key.code);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&code);
            }
            // Release without confirmed enhancement: rely on the timeout.
            KeyEventKind::Release => {}
            _ => {
                self.last_active.insert(code, now);
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.contains_key(&code)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// q, Esc, or Ctrl+C this frame.
    pub fn quit_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            if k.kind == KeyEventKind::Release { return false; }
            let ctrl_c = k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'));
            ctrl_c || matches!(k.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q'))
        })
    }
}

/// Shifted letters count as the same key.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

// ── Control transitions ──

/// A control that changed state this frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Transition {
    Down(Control),
    Up(Control),
}

/// Remembers last frame's merged held state and reports the edges.
#[derive(Default)]
pub struct ControlLatch {
    held: [bool; 5],
}

impl ControlLatch {
    pub fn new() -> Self {
        ControlLatch::default()
    }

    /// `held_now(control)` is the OR of every input source.
    pub fn transitions(&mut self, mut held_now: impl FnMut(Control) -> bool) -> Vec<Transition> {
        let mut out = vec![];
        for (slot, &control) in Control::ALL.iter().enumerate() {
            let now = held_now(control);
            match (self.held[slot], now) {
                (false, true) => out.push(Transition::Down(control)),
                (true, false) => out.push(Transition::Up(control)),
                _ => {}
            }
            self.held[slot] = now;
        }
        out
    }
}
