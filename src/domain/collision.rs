/// Collision resolver: is a candidate player position allowed?
///
/// ## Checks, in order
///   1. Suspects:  within speak radius → alibi proximity;
///                  within player + suspect radius → blocked.
///   2. Evidence:  within play radius → recording proximity;
///                  within player + evidence radius → blocked.
///   3. Walls:     axis-aligned box (centre, half-extents) grown by the
///                  player radius on x and y; strictly inside → blocked.
///
/// Proximity is reported for every entity on every call, whatever blocks.
/// Walls are only tested while nothing has blocked yet, and stop at the
/// first hit. Touching a wall face exactly is not a collision, so the
/// player can slide along it.

use glam::Vec3;

/// Which cue family a proximity hit belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CueGroup {
    /// Suspect alibis.
    Alibi,
    /// Evidence recordings.
    Recording,
}

#[derive(Clone, Copy, Debug)]
pub struct Radii {
    pub player: f32,
    pub suspect: f32,
    pub suspect_speak: f32,
    pub evidence: f32,
    pub recording_play: f32,
}

impl Default for Radii {
    fn default() -> Self {
        Radii {
            player: 0.5,
            suspect: 0.5,
            suspect_speak: 1.3,
            evidence: 0.25,
            recording_play: 1.0,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct WallBox {
    pub center: Vec3,
    pub half: Vec3,
}

impl WallBox {
    /// Circle-vs-box, approximated by inflating the box on each axis.
    #[inline]
    pub fn blocks(&self, point: Vec3, radius: f32) -> bool {
        (point.x - self.center.x).abs() < self.half.x.abs() + radius
            && (point.y - self.center.y).abs() < self.half.y.abs() + radius
    }
}

/// Positions the resolver tests against, gathered once per frame.
#[derive(Clone, Debug, Default)]
pub struct Obstacles {
    pub suspects: Vec<Vec3>,
    pub evidence: Vec<Vec3>,
    pub walls: Vec<WallBox>,
}

/// Returns true if the player may not stand at `candidate`.
pub fn resolve(
    candidate: Vec3,
    obstacles: &Obstacles,
    radii: &Radii,
    mut on_proximity: impl FnMut(CueGroup, usize),
) -> bool {
    let mut blocked = false;

    for (i, &pos) in obstacles.suspects.iter().enumerate() {
        let d = candidate.distance(pos);
        if d <= radii.suspect_speak {
            on_proximity(CueGroup::Alibi, i);
        }
        if d <= radii.player + radii.suspect {
            blocked = true;
        }
    }

    for (i, &pos) in obstacles.evidence.iter().enumerate() {
        let d = candidate.distance(pos);
        if d <= radii.recording_play {
            on_proximity(CueGroup::Recording, i);
        }
        if d <= radii.player + radii.evidence {
            blocked = true;
        }
    }

    blocked || obstacles.walls.iter().any(|w| w.blocks(candidate, radii.player))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(cx: f32, cy: f32, hx: f32, hy: f32) -> WallBox {
        WallBox { center: Vec3::new(cx, cy, 0.0), half: Vec3::new(hx, hy, 0.5) }
    }

    fn at(x: f32, y: f32) -> Vec3 {
        Vec3::new(x, y, 0.0)
    }

    fn hits(candidate: Vec3, obs: &Obstacles) -> (bool, Vec<(CueGroup, usize)>) {
        let mut seen = vec![];
        let blocked = resolve(candidate, obs, &Radii::default(), |g, i| seen.push((g, i)));
        (blocked, seen)
    }

    #[test]
    fn open_floor_is_free() {
        let obs = Obstacles {
            suspects: vec![at(10.0, 10.0)],
            evidence: vec![at(-10.0, 10.0)],
            walls: vec![wall(0.0, -10.0, 5.0, 0.5)],
        };
        let (blocked, seen) = hits(at(0.0, 0.0), &obs);
        assert!(!blocked);
        assert!(seen.is_empty());
    }

    #[test]
    fn inside_inflated_wall_always_blocks() {
        let w = wall(3.0, 2.0, 1.5, 0.5);
        let obs = Obstacles { walls: vec![w], ..Default::default() };
        let r = Radii::default().player;
        let steps = 20;
        for i in 1..steps {
            for j in 1..steps {
                let x = w.center.x - (w.half.x + r) + 2.0 * (w.half.x + r) * i as f32 / steps as f32;
                let y = w.center.y - (w.half.y + r) + 2.0 * (w.half.y + r) * j as f32 / steps as f32;
                assert!(hits(at(x, y), &obs).0, "({x}, {y}) should be blocked");
            }
        }
    }

    #[test]
    fn touching_wall_face_is_allowed() {
        let obs = Obstacles { walls: vec![wall(0.0, 0.0, 1.0, 0.5)], ..Default::default() };
        // Exactly radius away from the north face.
        assert!(!hits(at(0.0, 1.0), &obs).0);
        assert!(hits(at(0.0, 0.99), &obs).0);
    }

    #[test]
    fn wall_overlap_needs_both_axes() {
        let obs = Obstacles { walls: vec![wall(0.0, 0.0, 1.0, 1.0)], ..Default::default() };
        assert!(!hits(at(0.0, 3.0), &obs).0);
        assert!(!hits(at(3.0, 0.0), &obs).0);
        assert!(hits(at(1.2, 1.2), &obs).0);
    }

    #[test]
    fn suspect_speaks_before_blocking() {
        let obs = Obstacles { suspects: vec![at(0.0, 0.0)], ..Default::default() };
        // Speak radius 1.3, block radius 1.0.
        assert_eq!(hits(at(1.2, 0.0), &obs), (false, vec![(CueGroup::Alibi, 0)]));
        assert_eq!(hits(at(0.9, 0.0), &obs), (true, vec![(CueGroup::Alibi, 0)]));
        assert_eq!(hits(at(1.4, 0.0), &obs), (false, vec![]));
    }

    #[test]
    fn evidence_plays_and_blocks() {
        let obs = Obstacles { evidence: vec![at(5.0, 5.0), at(0.0, 0.0)], ..Default::default() };
        assert_eq!(hits(at(0.9, 0.0), &obs), (false, vec![(CueGroup::Recording, 1)]));
        assert_eq!(hits(at(0.7, 0.0), &obs), (true, vec![(CueGroup::Recording, 1)]));
    }

    #[test]
    fn proximity_reported_even_when_wall_blocks() {
        let obs = Obstacles {
            suspects: vec![at(0.0, 1.0)],
            evidence: vec![at(1.0, 0.0)],
            walls: vec![wall(0.0, 0.0, 0.5, 0.5)],
        };
        let (blocked, seen) = hits(at(0.0, 0.0), &obs);
        assert!(blocked);
        assert_eq!(seen, vec![(CueGroup::Alibi, 0), (CueGroup::Recording, 0)]);
    }

    #[test]
    fn every_entity_in_range_is_reported_in_order() {
        let obs = Obstacles {
            suspects: vec![at(0.5, 0.0), at(9.0, 9.0), at(-0.5, 0.0)],
            ..Default::default()
        };
        let (blocked, seen) = hits(at(0.0, 0.0), &obs);
        assert!(blocked);
        assert_eq!(seen, vec![(CueGroup::Alibi, 0), (CueGroup::Alibi, 2)]);
    }
}
