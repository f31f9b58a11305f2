/// Play session: owns the per-frame state and drives one interrogation.
///
/// ## Frame order (one `update` call)
///   1. Retire finished cues so their slots can fire again.
///   2. Move the player (unless the outcome has frozen movement):
///      stride → project onto the player's basis → resolve collisions.
///      Proximity hits start cues as a side effect. The head always takes
///      the new facing, even when the body is blocked.
///   3. Put the audio listener on the camera.
///   4. Reset per-frame button transition counts.
///
/// Arrest is decided on key press, against the player position left by the
/// previous frame. Its event is queued and handed out by the next `update`.

use glam::Vec3;
use tracing::{debug, info};

use crate::config::{Rules, Tuning};
use crate::domain::collision::{self, CueGroup, Obstacles, WallBox};
use crate::domain::controls::{Control, Controls};
use crate::domain::motion::{self, Facing};
use crate::domain::outcome::Outcome;
use crate::scene::{NodeId, Scene};
use super::audio::{AudioBackend, SampleBank};
use super::bindings::{BindError, Bindings, EVIDENCE_COUNT, SUSPECT_COUNT};
use super::cues::CueManager;
use super::event::GameEvent;

pub struct Session<P> {
    bindings: Bindings,
    rules: Rules,
    tuning: Tuning,
    controls: Controls,
    cues: CueManager<P>,
    outcome: Outcome,
    facing: Facing,
    pending: Vec<GameEvent>,
}

impl<P> Session<P> {
    pub fn new(
        scene: &Scene,
        rules: Rules,
        tuning: Tuning,
        samples: &SampleBank,
    ) -> Result<Session<P>, BindError> {
        let bindings = Bindings::resolve(scene)?;
        if rules.culprit >= SUSPECT_COUNT {
            return Err(BindError::CulpritOutOfRange(rules.culprit));
        }
        if rules.crime_recording >= EVIDENCE_COUNT {
            return Err(BindError::CrimeRecordingOutOfRange(rules.crime_recording));
        }

        info!(
            scene = %scene.name,
            walls = bindings.walls.len(),
            freeze = ?rules.freeze,
            "session started"
        );

        Ok(Session {
            bindings,
            rules,
            tuning,
            controls: Controls::new(),
            cues: CueManager::new(samples),
            outcome: Outcome::InProgress,
            facing: Facing::default(),
            pending: Vec::new(),
        })
    }

    // ── Input ──

    /// Returns true if the key is one of ours.
    pub fn key_down(&mut self, scene: &Scene, control: Option<Control>) -> bool {
        let Some(control) = control else { return false };
        self.controls.key_down(control);
        if control == Control::Arrest {
            self.arrest(scene);
        }
        true
    }

    pub fn key_up(&mut self, control: Option<Control>) -> bool {
        let Some(control) = control else { return false };
        self.controls.key_up(control);
        true
    }

    fn arrest(&mut self, scene: &Scene) {
        if self.outcome.is_terminal() { return; }

        let player = scene.position(self.bindings.player);
        let suspects: Vec<Vec3> = self.bindings.suspects.iter().map(|&id| scene.position(id)).collect();
        let arrest = self.outcome.attempt_arrest(
            player,
            &suspects,
            self.tuning.radii.suspect_speak,
            self.rules.culprit,
        );

        match arrest {
            Some(a) => {
                info!(suspect = a.suspect, outcome = ?a.outcome, "arrest made");
                self.pending.push(GameEvent::Arrested { suspect: a.suspect, outcome: a.outcome });
            }
            None => {
                debug!("arrest pressed with nobody in range");
                self.pending.push(GameEvent::ArrestMissed);
            }
        }
    }

    // ── Frame ──

    pub fn update<B>(&mut self, scene: &mut Scene, audio: &mut B, elapsed: f32) -> Vec<GameEvent>
    where
        B: AudioBackend<Playback = P>,
    {
        let mut events = std::mem::take(&mut self.pending);

        let retired = self.cues.retire_finished(audio);
        if retired > 0 {
            debug!(retired, "cues finished");
        }

        if self.outcome.allows_movement(self.rules.freeze) {
            self.step_player(scene, audio, elapsed, &mut events);
        }

        let camera = scene.get(self.bindings.camera);
        audio.set_listener(camera.position, camera.right());

        self.controls.end_frame();
        events
    }

    fn step_player<B>(&mut self, scene: &mut Scene, audio: &mut B, elapsed: f32, events: &mut Vec<GameEvent>)
    where
        B: AudioBackend<Playback = P>,
    {
        let stride = motion::stride(&self.controls, self.tuning.player_speed, elapsed);
        let player = scene.get(self.bindings.player);
        let candidate = motion::project(player.position, player.right(), player.up(), stride.displacement);

        let obstacles = self.obstacles(scene);
        let cues = &mut self.cues;
        let crime_recording = self.rules.crime_recording;
        let blocked = collision::resolve(candidate, &obstacles, &self.tuning.radii, |group, index| {
            let emitter = match group {
                CueGroup::Alibi => obstacles.suspects[index],
                CueGroup::Recording => obstacles.evidence[index],
            };
            if !cues.trigger(audio, group, index, emitter) { return; }
            events.push(GameEvent::CueStarted { group, index });
            if group == CueGroup::Recording && index == crime_recording {
                info!(index, "crime recording heard");
                events.push(GameEvent::CrimeRecordingHeard);
            }
        });

        if !blocked {
            scene.get_mut(self.bindings.player).position = candidate;
        }
        scene.get_mut(self.bindings.player_head).rotation = stride.facing.rotation();
        self.facing = stride.facing;
    }

    /// Snapshot of everything the player can bump into, in binding order.
    fn obstacles(&self, scene: &Scene) -> Obstacles {
        let at = |ids: &[NodeId]| -> Vec<Vec3> { ids.iter().map(|&id| scene.position(id)).collect() };
        Obstacles {
            suspects: at(&self.bindings.suspects),
            evidence: at(&self.bindings.evidence),
            walls: self
                .bindings
                .walls
                .iter()
                .map(|&id| {
                    let wall = scene.get(id);
                    WallBox { center: wall.position, half: wall.scale }
                })
                .collect(),
        }
    }

    // ── Queries ──

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn status_line(&self) -> &'static str {
        self.outcome.status_line()
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn cue_active(&self, group: CueGroup, index: usize) -> bool {
        self.cues.is_active(group, index)
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }
}
