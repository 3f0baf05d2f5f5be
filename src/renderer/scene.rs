//! World state to character grid
//!
//! Heights in the simulation count rows up from the base road; the screen
//! counts rows down from the top. `row_of` converts between the two.

use super::frame::{Frame, Tint};
use crate::consts::{CAR_H, ENEMY_H, ENEMY_HOVER};
use crate::highscores::HighScores;
use crate::sim::{GamePhase, GameState, Layout, ObstacleKind};

pub const ROAD_CH: char = '█';
pub const BEDROCK_CH: char = '▒';
pub const CONE_CH: char = '▲';
pub const SHOT_CH: char = '•';

pub const CAR_ART: [&str; CAR_H] = [r"  _n_ ", r"=[___]", r" o  o "];
pub const ENEMY_ART: [&str; ENEMY_H] = [r" /\ ^ /\ ", r"<(o_o_o)>", r"  ^ ^ ^  "];

const KEY_HELP: &str = "[↑] jump  [space] shoot  [→] turbo  [P] pause  [Q] quit";

/// Screen row of the cell resting on height `h`
pub fn row_of(layout: &Layout, h: f32) -> i32 {
    layout.ground_row() as i32 - 1 - h.round() as i32
}

/// Draw the whole scene into `frame`
pub fn draw(state: &GameState, highscores: &HighScores, frame: &mut Frame) {
    let layout = state.layout;
    frame.reset(layout.width, layout.height);

    draw_road(state, frame);
    draw_obstacles(state, frame);

    for shot in &state.projectiles {
        let x = shot.pos.x.floor() as i32;
        frame.set(x, row_of(&layout, shot.pos.y), SHOT_CH, Tint::Shot);
    }

    let player = &state.player;
    let top = row_of(&layout, player.y) - (CAR_H as i32 - 1);
    frame.put_art(player.x as i32, top, &CAR_ART, Tint::Car);

    draw_hud(state, frame);
    draw_banner(state, highscores, frame);
}

fn draw_road(state: &GameState, frame: &mut Frame) {
    let ground_row = state.layout.ground_row() as i32;
    let mut pit = vec![false; state.course.width()];
    for obstacle in &state.obstacles {
        if let ObstacleKind::Pit { width } = obstacle.kind {
            let start = obstacle.x.round() as i32;
            for col in start..start + width as i32 {
                if let Some(cell) = usize::try_from(col).ok().and_then(|c| pit.get_mut(c)) {
                    *cell = true;
                }
            }
        }
    }

    for (x, elev) in state.course.iter().enumerate() {
        let col = x as i32;
        frame.set(col, ground_row + 1, BEDROCK_CH, Tint::Bedrock);
        if pit[x] {
            continue;
        }
        // Filled column from the base road up to the surface; risers show as walls
        for k in 0..=elev as i32 {
            frame.set(col, ground_row - k, ROAD_CH, Tint::Road);
        }
    }
}

fn draw_obstacles(state: &GameState, frame: &mut Frame) {
    let layout = state.layout;
    for obstacle in &state.obstacles {
        let x = obstacle.x.round() as i32;
        let base = obstacle.base as f32;
        match obstacle.kind {
            ObstacleKind::Cone => {
                frame.set(x, row_of(&layout, base), CONE_CH, Tint::Cone);
            }
            ObstacleKind::Enemy { .. } => {
                let top = row_of(&layout, base + ENEMY_HOVER) - (ENEMY_H as i32 - 1);
                frame.put_art(x, top, &ENEMY_ART, Tint::Enemy);
            }
            // Drawn as part of the road
            ObstacleKind::Pit { .. } | ObstacleKind::Step { .. } => {}
        }
    }
}

fn draw_hud(state: &GameState, frame: &mut Frame) {
    let boost = if state.turbo { "  BOOST" } else { "" };
    let hud = format!(
        "SCORE {}  DIST {}  SPEED {:.1}  LIVES {}{boost}   {KEY_HELP}",
        state.score,
        state.distance,
        state.scroll_speed(),
        state.lives,
    );
    let row = state.layout.height as i32 - 1;
    frame.put_str(0, row, &hud, Tint::Hud);
}

fn draw_banner(state: &GameState, highscores: &HighScores, frame: &mut Frame) {
    let mid = state.layout.height as i32 / 3;
    match state.phase {
        GamePhase::SafeStart => {
            frame.put_centered(mid, "GET READY", Tint::Banner);
        }
        GamePhase::Paused => {
            frame.put_centered(mid, "PAUSED", Tint::Banner);
            frame.put_centered(mid + 1, "[P] resume  [Q] quit", Tint::Hud);
        }
        GamePhase::GameOver => {
            frame.put_centered(mid, "GAME OVER", Tint::Banner);
            let summary = format!(
                "total {}  (score {} + distance {})",
                state.total(),
                state.score,
                state.distance
            );
            frame.put_centered(mid + 1, &summary, Tint::Hud);
            frame.put_centered(mid + 2, "[R] restart  [Q] quit", Tint::Hud);
            if !highscores.is_empty() {
                frame.put_centered(mid + 4, "BEST RUNS", Tint::Banner);
                for (i, run) in highscores.entries.iter().enumerate() {
                    let line = format!("{}. {:>7}  seed {}", i + 1, run.total, run.seed);
                    frame.put_centered(mid + 5 + i as i32, &line, Tint::Hud);
                }
            }
        }
        GamePhase::Playing => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::highscores::RunRecord;

    fn state() -> GameState {
        GameState::new(Config::default(), 1, Layout::new(80, 24))
    }

    fn render(state: &GameState, highscores: &HighScores) -> Frame {
        let mut frame = Frame::new(1, 1);
        draw(state, highscores, &mut frame);
        frame
    }

    fn find_row(frame: &Frame, text: &str) -> Option<u16> {
        (0..frame.height()).find(|&y| frame.row_string(y).contains(text))
    }

    #[test]
    fn test_car_rests_on_road() {
        let state = state();
        let frame = render(&state, &HighScores::new());
        let ground_row = state.layout.ground_row();
        assert_eq!(frame.width(), 80);
        assert!(frame.row_string(ground_row).chars().all(|c| c == ROAD_CH));
        let wheels = frame.row_string(ground_row - 1);
        let x = state.player.x as usize;
        assert_eq!(&wheels.chars().skip(x).take(6).collect::<String>(), CAR_ART[2]);
    }

    #[test]
    fn test_pit_is_a_gap_in_the_road() {
        let mut state = state();
        state.spawn_obstacle(ObstacleKind::Pit { width: 4 }, 40.0, 0, 0);
        let frame = render(&state, &HighScores::new());
        let ground_row = state.layout.ground_row() as i32;
        assert_eq!(frame.get(39, ground_row).map(|g| g.ch), Some(ROAD_CH));
        assert_eq!(frame.get(40, ground_row).map(|g| g.ch), Some(' '));
        assert_eq!(frame.get(43, ground_row).map(|g| g.ch), Some(' '));
        assert_eq!(frame.get(44, ground_row).map(|g| g.ch), Some(ROAD_CH));
        assert_eq!(frame.get(40, ground_row + 1).map(|g| g.ch), Some(BEDROCK_CH));
    }

    #[test]
    fn test_cone_and_enemy_positions() {
        let mut state = state();
        state.spawn_obstacle(ObstacleKind::Cone, 30.0, 0, 0);
        state.spawn_obstacle(ObstacleKind::Enemy { sway: 1.0 }, 50.0, 0, 0);
        let frame = render(&state, &HighScores::new());
        let ground_row = state.layout.ground_row() as i32;
        assert_eq!(frame.get(30, ground_row - 1).map(|g| g.ch), Some(CONE_CH));
        // The fly's bottom row hovers one row above the road
        assert_eq!(frame.get(52, ground_row - 2).map(|g| g.ch), Some('^'));
        assert!(frame.row_string((ground_row - 3) as u16).contains(ENEMY_ART[1]));
    }

    #[test]
    fn test_hud_shows_counters() {
        let mut state = state();
        state.score = 50;
        state.distance = 123;
        state.turbo = true;
        let frame = render(&state, &HighScores::new());
        let hud = frame.row_string(23);
        assert!(hud.starts_with("SCORE 50  DIST 123  SPEED 60.0  LIVES 3  BOOST"));
    }

    #[test]
    fn test_banners_follow_phase() {
        let mut state = state();
        let frame = render(&state, &HighScores::new());
        assert!(find_row(&frame, "GET READY").is_some());

        state.phase = GamePhase::Paused;
        let frame = render(&state, &HighScores::new());
        assert!(find_row(&frame, "PAUSED").is_some());

        state.phase = GamePhase::Playing;
        let frame = render(&state, &HighScores::new());
        assert!(find_row(&frame, "PAUSED").is_none());
        assert!(find_row(&frame, "GET READY").is_none());
    }

    #[test]
    fn test_game_over_lists_best_runs() {
        let mut state = state();
        state.phase = GamePhase::GameOver;
        let mut highscores = HighScores::new();
        highscores.add_run(RunRecord {
            total: 4321,
            score: 100,
            distance: 4221,
            seed: 9,
        });
        let frame = render(&state, &highscores);
        assert!(find_row(&frame, "GAME OVER").is_some());
        assert!(find_row(&frame, "BEST RUNS").is_some());
        assert!(find_row(&frame, "1.    4321  seed 9").is_some());
    }
}
