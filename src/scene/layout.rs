/// Room layouts: plain-text maps that build a `Scene`.
///
/// ## Format
///   ```
///   @ Room Name
///   <map rows>
///   ```
///
/// The `@` header line is optional. Every character of a map row is one
/// world unit; row 0 is the northernmost row.
///
/// ## Glyph legend:
///   '#' = Wall                   'P' = Player (head added on top)
///   '1'-'9' = Suspect, by digit  'a'-'z' = Evidence, by letter
///   'C' = Camera                 '.' / ' ' = Floor
///
/// Horizontal runs of '#' collapse into a single wall node whose scale is
/// the run's half-extents. Role counts are *not* checked here; that is the
/// job of `sim::bindings`, so a layout with three suspects still loads.

use std::path::Path;

use glam::Vec3;
use thiserror::Error;

use super::{Role, Scene, Transform};

const HEAD_HEIGHT: f32 = 0.8;
const CAMERA_HEIGHT: f32 = 12.0;
const WALL_HALF_DEPTH: f32 = 0.5;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("layout has no map rows")]
    Empty,
    #[error("unknown glyph '{glyph}' at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },
    #[error("glyph '{0}' appears more than once")]
    DuplicateGlyph(char),
    #[error("failed to read layout {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The room shipped with the game.
pub const DEFAULT_ROOM: &str = "\
@ The Conservatory
##############################
#            #               #
#   1        #        2      #
#            #               #
#     a           b          #
#            #               #
######  ######### ############
#                            #
#  3    c       C      d   4 #
#                            #
#        P          e        #
#                            #
##############################
";

pub fn load_default() -> Result<Scene, SceneError> {
    parse(DEFAULT_ROOM)
}

pub fn load_file(path: &Path) -> Result<Scene, SceneError> {
    let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&text)
}

/// Parse a layout into a scene. Nodes are inserted player first, then
/// player head, suspects (by digit), evidence (by letter), walls, cameras.
pub fn parse(text: &str) -> Result<Scene, SceneError> {
    let mut name = String::from("Untitled Room");
    let mut rows: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim_end();
        if let Some(header) = line.strip_prefix('@') {
            name = header.trim().to_string();
            continue;
        }
        if rows.is_empty() && line.is_empty() {
            continue;
        }
        rows.push(line);
    }
    while rows.last().map_or(false, |r| r.is_empty()) {
        rows.pop();
    }
    if rows.is_empty() {
        return Err(SceneError::Empty);
    }

    let height = rows.len();
    let cell_center = |row: usize, col: usize| {
        Vec3::new(col as f32 + 0.5, (height - 1 - row) as f32 + 0.5, 0.0)
    };

    let mut players = vec![];
    let mut suspects: Vec<(char, Vec3)> = vec![];
    let mut evidence: Vec<(char, Vec3)> = vec![];
    let mut cameras = vec![];
    let mut walls = vec![];

    for (row, line) in rows.iter().enumerate() {
        let mut run_start: Option<usize> = None;
        let chars: Vec<char> = line.chars().collect();

        for (col, &ch) in chars.iter().enumerate() {
            if ch == '#' {
                if run_start.is_none() {
                    run_start = Some(col);
                }
                continue;
            }
            if let Some(start) = run_start.take() {
                walls.push(wall_run(row, start, col, height));
            }
            match ch {
                ' ' | '.' => {}
                'P' => players.push(cell_center(row, col)),
                'C' => cameras.push(cell_center(row, col)),
                '1'..='9' => push_unique(&mut suspects, ch, cell_center(row, col))?,
                'a'..='z' => push_unique(&mut evidence, ch, cell_center(row, col))?,
                _ => return Err(SceneError::UnknownGlyph { glyph: ch, row, col }),
            }
        }
        if let Some(start) = run_start {
            walls.push(wall_run(row, start, chars.len(), height));
        }
    }

    suspects.sort_by_key(|(c, _)| *c);
    evidence.sort_by_key(|(c, _)| *c);

    let mut scene = Scene::new(name);
    for (i, pos) in players.into_iter().enumerate() {
        let suffix = if i == 0 { String::new() } else { format!(".{i}") };
        let player = scene.add(Transform::new(format!("Player{suffix}"), Role::Player, pos));
        scene.add(
            Transform::new(format!("PlayerHead{suffix}"), Role::PlayerHead, Vec3::Z * HEAD_HEIGHT)
                .with_parent(player),
        );
    }
    for (glyph, pos) in suspects {
        scene.add(Transform::new(format!("Suspect{glyph}"), Role::Suspect, pos));
    }
    for (glyph, pos) in evidence {
        scene.add(Transform::new(format!("Evidence{glyph}"), Role::Evidence, pos));
    }
    for (i, (pos, half)) in walls.into_iter().enumerate() {
        scene.add(Transform::new(format!("Wall{i}"), Role::Wall, pos).with_scale(half));
    }
    for (i, pos) in cameras.into_iter().enumerate() {
        scene.add(Transform::new(format!("Camera{i}"), Role::Camera, pos + Vec3::Z * CAMERA_HEIGHT));
    }

    Ok(scene)
}

/// Wall covering columns `start..end` of `row`: (centre, half-extents).
fn wall_run(row: usize, start: usize, end: usize, height: usize) -> (Vec3, Vec3) {
    let half_x = (end - start) as f32 / 2.0;
    let center = Vec3::new(start as f32 + half_x, (height - 1 - row) as f32 + 0.5, 0.0);
    (center, Vec3::new(half_x, 0.5, WALL_HALF_DEPTH))
}

fn push_unique(list: &mut Vec<(char, Vec3)>, glyph: char, pos: Vec3) -> Result<(), SceneError> {
    if list.iter().any(|(c, _)| *c == glyph) {
        return Err(SceneError::DuplicateGlyph(glyph));
    }
    list.push((glyph, pos));
    Ok(())
}
