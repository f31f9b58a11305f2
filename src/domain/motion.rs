/// Player motion: held directions → displacement + facing.
///
/// Pure functions; the session decides whether to commit the result.
///
/// ## Intent
///   Left XOR Right → x = -1 / +1, otherwise 0.
///   Down XOR Up    → y = -1 / +1, otherwise 0.
///
/// Non-zero intent is normalized before scaling by speed × elapsed, so a
/// diagonal covers the same distance as a single axis.
///
/// ## Facing (branch order: left, right, down, up; last match wins)
///   Down → 0   Right → π/2   Up → π   Left → 3π/2   (nothing held → 0)

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec2, Vec3};

use super::controls::{Control, Controls};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Facing {
    #[default]
    Down,
    Right,
    Up,
    Left,
}

impl Facing {
    /// Rotation about +z, radians.
    pub fn angle(self) -> f32 {
        match self {
            Facing::Down => 0.0,
            Facing::Right => FRAC_PI_2,
            Facing::Up => PI,
            Facing::Left => 3.0 * FRAC_PI_2,
        }
    }

    pub fn rotation(self) -> Quat {
        Quat::from_rotation_z(self.angle())
    }
}

/// One frame's worth of motion, in the player's local (right, up) frame.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Stride {
    pub displacement: Vec2,
    pub facing: Facing,
}

/// Axis intent in {-1, 0, 1}². Opposing keys cancel.
pub fn intent(controls: &Controls) -> Vec2 {
    let axis = |neg: Control, pos: Control| match (controls.held(neg), controls.held(pos)) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    };
    Vec2::new(axis(Control::Left, Control::Right), axis(Control::Down, Control::Up))
}

pub fn facing(controls: &Controls) -> Facing {
    let left = controls.held(Control::Left);
    let right = controls.held(Control::Right);
    let down = controls.held(Control::Down);
    let up = controls.held(Control::Up);

    let mut facing = Facing::Down;
    if left && !right { facing = Facing::Left; }
    if !left && right { facing = Facing::Right; }
    if down && !up { facing = Facing::Down; }
    if !down && up { facing = Facing::Up; }
    facing
}

/// Frame-rate independent stride: |displacement| is 0 or `speed * elapsed`.
pub fn stride(controls: &Controls, speed: f32, elapsed: f32) -> Stride {
    let dir = intent(controls);
    let displacement = if dir == Vec2::ZERO {
        Vec2::ZERO
    } else {
        dir.normalize() * speed * elapsed
    };
    Stride { displacement, facing: facing(controls) }
}

/// Map a local displacement onto world space through the node's basis.
pub fn project(position: Vec3, right: Vec3, up: Vec3, displacement: Vec2) -> Vec3 {
    position + displacement.x * right + displacement.y * up
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn holding(keys: &[Control]) -> Controls {
        let mut c = Controls::new();
        for &k in keys {
            c.key_down(k);
        }
        c
    }

    const SPEED: f32 = 10.0;
    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn single_axis_moves_at_speed() {
        let s = stride(&holding(&[Control::Right]), SPEED, DT);
        assert!((s.displacement - Vec2::new(SPEED * DT, 0.0)).length() < 1e-6);
        assert_eq!(s.facing, Facing::Right);
    }

    #[test]
    fn diagonal_is_not_faster() {
        let straight = stride(&holding(&[Control::Up]), SPEED, DT);
        let diag = stride(&holding(&[Control::Up, Control::Left]), SPEED, DT);
        assert!((straight.displacement.length() - diag.displacement.length()).abs() < 1e-6);
        assert!(diag.displacement.x < 0.0 && diag.displacement.y > 0.0);
    }

    #[test]
    fn opposite_keys_cancel() {
        let s = stride(&holding(&[Control::Left, Control::Right]), SPEED, DT);
        assert_eq!(s.displacement, Vec2::ZERO);

        let s = stride(&holding(&[Control::Left, Control::Right, Control::Up]), SPEED, DT);
        assert_eq!(s.displacement.x, 0.0);
        assert!((s.displacement.y - SPEED * DT).abs() < 1e-6);
    }

    #[test]
    fn elapsed_scales_distance() {
        let keys = holding(&[Control::Down]);
        let short = stride(&keys, SPEED, 1.0 / 120.0);
        let long = stride(&keys, SPEED, 1.0 / 30.0);
        assert!((long.displacement.length() - 4.0 * short.displacement.length()).abs() < 1e-6);
    }

    #[test]
    fn vertical_wins_facing() {
        assert_eq!(facing(&holding(&[Control::Left, Control::Up])), Facing::Up);
        assert_eq!(facing(&holding(&[Control::Right, Control::Down])), Facing::Down);
        assert_eq!(facing(&holding(&[Control::Left])), Facing::Left);
        // Up+Down cancel, horizontal decides.
        assert_eq!(facing(&holding(&[Control::Up, Control::Down, Control::Right])), Facing::Right);
    }

    #[test]
    fn idle_faces_down() {
        assert_eq!(facing(&Controls::new()), Facing::Down);
        assert_eq!(Facing::Down.angle(), 0.0);
    }

    #[test]
    fn facing_angles() {
        assert!((Facing::Right.angle() - FRAC_PI_2).abs() < 1e-6);
        assert!((Facing::Up.angle() - PI).abs() < 1e-6);
        assert!((Facing::Left.angle() - 3.0 * FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn projection_uses_local_basis() {
        // Node turned a quarter left: its "right" points world +y.
        let rot = Quat::from_rotation_z(FRAC_PI_2);
        let p = project(Vec3::ZERO, rot * Vec3::X, rot * Vec3::Y, Vec2::new(1.0, 0.0));
        assert!((p - Vec3::Y).length() < 1e-6);
    }

    proptest! {
        #[test]
        fn stride_length_is_zero_or_speed(
            left: bool, right: bool, up: bool, down: bool,
            speed in 0.1f32..50.0, elapsed in 0.001f32..0.1,
        ) {
            let mut keys = vec![];
            if left { keys.push(Control::Left); }
            if right { keys.push(Control::Right); }
            if up { keys.push(Control::Up); }
            if down { keys.push(Control::Down); }
            let s = stride(&holding(&keys), speed, elapsed);
            let len = s.displacement.length();
            prop_assert!(len == 0.0 || (len - speed * elapsed).abs() < 1e-4);
        }
    }
}
