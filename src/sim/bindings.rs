/// Role bindings: which scene nodes play which part.
///
/// Resolved once when a session starts. Every count is checked up front so
/// nothing downstream has to handle a missing suspect or a second camera.
///
///   Player       exactly 1      Suspects   exactly 4
///   PlayerHead   exactly 1      Evidence   exactly 5
///   Camera       exactly 1      Walls      at least 1

use thiserror::Error;

use crate::scene::{NodeId, Role, Scene};

pub const SUSPECT_COUNT: usize = 4;
pub const EVIDENCE_COUNT: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("expected exactly one player, found {0}")]
    PlayerCount(usize),
    #[error("expected exactly one player head, found {0}")]
    PlayerHeadCount(usize),
    #[error("{0} suspects found, expected 4")]
    SuspectCount(usize),
    #[error("{0} evidence items found, expected 5")]
    EvidenceCount(usize),
    #[error("scene has no walls")]
    NoWalls,
    #[error("expected scene to have exactly one camera, but it has {0}")]
    CameraCount(usize),
    #[error("culprit index {0} is not a suspect (0..4)")]
    CulpritOutOfRange(usize),
    #[error("crime recording index {0} is not an evidence item (0..5)")]
    CrimeRecordingOutOfRange(usize),
}

#[derive(Clone, Debug)]
pub struct Bindings {
    pub player: NodeId,
    pub player_head: NodeId,
    pub suspects: [NodeId; SUSPECT_COUNT],
    pub evidence: [NodeId; EVIDENCE_COUNT],
    pub walls: Vec<NodeId>,
    pub camera: NodeId,
}

impl Bindings {
    pub fn resolve(scene: &Scene) -> Result<Bindings, BindError> {
        let player = exactly_one(scene, Role::Player).map_err(BindError::PlayerCount)?;
        let player_head = exactly_one(scene, Role::PlayerHead).map_err(BindError::PlayerHeadCount)?;

        let suspects = scene.with_role(Role::Suspect);
        let suspects: [NodeId; SUSPECT_COUNT] = suspects
            .try_into()
            .map_err(|v: Vec<NodeId>| BindError::SuspectCount(v.len()))?;

        let evidence = scene.with_role(Role::Evidence);
        let evidence: [NodeId; EVIDENCE_COUNT] = evidence
            .try_into()
            .map_err(|v: Vec<NodeId>| BindError::EvidenceCount(v.len()))?;

        let walls = scene.with_role(Role::Wall);
        if walls.is_empty() {
            return Err(BindError::NoWalls);
        }

        let camera = exactly_one(scene, Role::Camera).map_err(BindError::CameraCount)?;

        Ok(Bindings { player, player_head, suspects, evidence, walls, camera })
    }
}

/// The single node with `role`, or the number actually found.
fn exactly_one(scene: &Scene, role: Role) -> Result<NodeId, usize> {
    match scene.with_role(role).as_slice() {
        [id] => Ok(*id),
        other => Err(other.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use crate::scene::{layout, Transform};

    const FULL: &str = "\
#########
#1 2 3 4#
#abcde  #
#P     C#
#########
";

    #[test]
    fn full_cast_binds() {
        let scene = layout::parse(FULL).unwrap();
        let b = Bindings::resolve(&scene).unwrap();
        assert_eq!(scene.get(b.player).role, Role::Player);
        assert_eq!(scene.get(b.suspects[0]).name, "Suspect1");
        assert_eq!(scene.get(b.suspects[3]).name, "Suspect4");
        assert_eq!(scene.get(b.evidence[4]).name, "Evidencee");
        assert!(!b.walls.is_empty());
        assert_eq!(scene.get(b.camera).role, Role::Camera);
    }

    #[test]
    fn every_node_has_a_bound_role() {
        let scene = layout::load_default().unwrap();
        let b = Bindings::resolve(&scene).unwrap();
        let bound = 3 + b.suspects.len() + b.evidence.len() + b.walls.len();
        assert_eq!(bound, scene.len());
    }

    #[test]
    fn three_suspects_fail() {
        let scene = layout::parse(&FULL.replace('4', " ")).unwrap();
        assert_eq!(Bindings::resolve(&scene).unwrap_err(), BindError::SuspectCount(3));
    }

    #[test]
    fn evidence_count_checked() {
        let scene = layout::parse(&FULL.replace("  #\n#P", "f #\n#P")).unwrap();
        assert_eq!(Bindings::resolve(&scene).unwrap_err(), BindError::EvidenceCount(6));
    }

    #[test]
    fn missing_player_fails() {
        let scene = layout::parse(&FULL.replace('P', " ")).unwrap();
        assert_eq!(Bindings::resolve(&scene).unwrap_err(), BindError::PlayerCount(0));
    }

    #[test]
    fn two_players_fail() {
        let scene = layout::parse(&FULL.replace("#P     C#", "#P  P  C#")).unwrap();
        assert_eq!(Bindings::resolve(&scene).unwrap_err(), BindError::PlayerCount(2));
    }

    #[test]
    fn camera_count_checked() {
        let scene = layout::parse(&FULL.replace('C', " ")).unwrap();
        assert_eq!(Bindings::resolve(&scene).unwrap_err(), BindError::CameraCount(0));
        let scene = layout::parse(&FULL.replace("#P     C#", "#P C   C#")).unwrap();
        assert_eq!(Bindings::resolve(&scene).unwrap_err(), BindError::CameraCount(2));
    }

    #[test]
    fn no_walls_fails() {
        let scene = layout::parse("1234\nabcde\nP  C\n").unwrap();
        assert_eq!(Bindings::resolve(&scene).unwrap_err(), BindError::NoWalls);
    }

    #[test]
    fn headless_player_fails() {
        let mut scene = Scene::new("hand built");
        scene.add(Transform::new("Player", Role::Player, Vec3::new(1.0, 1.0, 0.0)));
        for i in 0..SUSPECT_COUNT {
            scene.add(Transform::new(format!("Suspect{i}"), Role::Suspect, Vec3::new(i as f32, 5.0, 0.0)));
        }
        for i in 0..EVIDENCE_COUNT {
            scene.add(Transform::new(format!("Evidence{i}"), Role::Evidence, Vec3::new(i as f32, 3.0, 0.0)));
        }
        scene.add(Transform::new("Wall0", Role::Wall, Vec3::ZERO).with_scale(Vec3::new(5.0, 0.5, 0.5)));
        scene.add(Transform::new("Camera", Role::Camera, Vec3::new(2.0, 2.0, 12.0)));
        assert_eq!(Bindings::resolve(&scene).unwrap_err(), BindError::PlayerHeadCount(0));

        let player = scene.with_role(Role::Player)[0];
        scene.add(Transform::new("PlayerHead", Role::PlayerHead, Vec3::ZERO).with_parent(player));
        assert!(Bindings::resolve(&scene).is_ok());
    }

    #[test]
    fn error_messages_are_descriptive() {
        assert_eq!(BindError::SuspectCount(3).to_string(), "3 suspects found, expected 4");
        assert_eq!(
            BindError::CameraCount(2).to_string(),
            "expected scene to have exactly one camera, but it has 2"
        );
    }
}
