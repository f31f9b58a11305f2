/// Control aggregation: raw key transitions → per-control button state.
///
/// Each control tracks two things:
///   - `held`  : level, true between key-down and key-up, survives frames
///   - `downs` : edge count, key-downs since the last `end_frame()`
///
/// Movement reads `held`. Arrest is edge-triggered and handled by the
/// session at key-down time, not here.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Control {
    Left,
    Right,
    Up,
    Down,
    Arrest,
}

impl Control {
    pub const ALL: [Control; 5] = [
        Control::Left,
        Control::Right,
        Control::Up,
        Control::Down,
        Control::Arrest,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Button {
    pub held: bool,
    pub downs: u8,
}

#[derive(Clone, Debug, Default)]
pub struct Controls {
    buttons: [Button; 5],
}

impl Controls {
    pub fn new() -> Self {
        Controls::default()
    }

    pub fn key_down(&mut self, control: Control) {
        let b = &mut self.buttons[control.slot()];
        b.downs = b.downs.saturating_add(1);
        b.held = true;
    }

    pub fn key_up(&mut self, control: Control) {
        self.buttons[control.slot()].held = false;
    }

    /// Reset edge counters. Held flags persist until the key is released.
    pub fn end_frame(&mut self) {
        for b in &mut self.buttons {
            b.downs = 0;
        }
    }

    #[allow(dead_code)]
    pub fn button(&self, control: Control) -> Button {
        self.buttons[control.slot()]
    }

    pub fn held(&self, control: Control) -> bool {
        self.buttons[control.slot()].held
    }

    #[allow(dead_code)]
    pub fn downs(&self, control: Control) -> u8 {
        self.buttons[control.slot()].downs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down_sets_held_and_counts_edge() {
        let mut c = Controls::new();
        c.key_down(Control::Left);
        assert_eq!(c.button(Control::Left), Button { held: true, downs: 1 });
        assert!(!c.held(Control::Right));
    }

    #[test]
    fn edges_count_presses_not_frames() {
        let mut c = Controls::new();
        c.key_down(Control::Up);
        c.key_up(Control::Up);
        c.key_down(Control::Up);
        assert_eq!(c.downs(Control::Up), 2);
        assert!(c.held(Control::Up));

        // Held across a frame boundary: no new edge.
        c.end_frame();
        assert_eq!(c.downs(Control::Up), 0);
        assert!(c.held(Control::Up));
    }

    #[test]
    fn release_keeps_edge_until_frame_end() {
        let mut c = Controls::new();
        c.key_down(Control::Down);
        c.key_up(Control::Down);
        assert!(!c.held(Control::Down));
        assert_eq!(c.downs(Control::Down), 1);
        c.end_frame();
        assert_eq!(c.downs(Control::Down), 0);
    }

    #[test]
    fn edge_counter_saturates() {
        let mut c = Controls::new();
        for _ in 0..300 {
            c.key_down(Control::Arrest);
        }
        assert_eq!(c.downs(Control::Arrest), u8::MAX);
    }
}
