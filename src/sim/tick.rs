//! Fixed timestep simulation tick
//!
//! Advances the run by exactly one step. Given the same seed and the same
//! input stream, every run plays out identically.

use super::collision::{Contact, Hit, player_hit, projectile_hits};
use super::state::{GameEvent, GamePhase, GameState, ObstacleKind};
use crate::consts::GROUND_EPSILON;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Jump (only takes effect on the ground)
    pub jump: bool,
    /// Fire (rate limited)
    pub shoot: bool,
    /// Turbo held
    pub turbo: bool,
    /// Pause toggle
    pub pause: bool,
    /// Start a new run (only from GameOver)
    pub restart: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::SafeStart | GamePhase::Playing => {
                state.resume_phase = state.phase;
                state.set_phase(GamePhase::Paused);
                return;
            }
            GamePhase::Paused => {
                let resume = state.resume_phase;
                state.set_phase(resume);
            }
            GamePhase::GameOver => {}
        }
    }

    match state.phase {
        GamePhase::Paused => return,
        GamePhase::GameOver => {
            if input.restart {
                state.restart();
            }
            return;
        }
        GamePhase::SafeStart | GamePhase::Playing => {}
    }

    state.time_ticks += 1;
    let suppressed = state.phase == GamePhase::SafeStart;

    // Difficulty ramp
    if state.phase == GamePhase::Playing {
        state.playing_ticks += 1;
        let every = state.config.ticks_for(state.config.speed_up_every_sec).max(1) as u64;
        if state.playing_ticks % every == 0 {
            state.speed += state.config.speed_step;
            state.events.push(GameEvent::SpeedUp { speed: state.speed });
            log::debug!("Speed up to {:.1} cols/s", state.speed);
        }
    }

    // Controls
    state.turbo = input.turbo;
    if input.jump && state.physics.jump(&mut state.player) {
        state.events.push(GameEvent::Jumped);
    }
    state.player.fire_cooldown = state.player.fire_cooldown.saturating_sub(1);
    if input.shoot && state.player.fire_cooldown == 0 {
        state.spawn_projectile();
        state.player.fire_cooldown = state.config.ticks_for(state.config.bullet_cooldown_sec);
    }

    let scrolled = scroll(state, dt, suppressed);

    // Flies sway back and forth
    let shimmy = state.config.enemy_shimmy;
    for obstacle in &mut state.obstacles {
        if let ObstacleKind::Enemy { sway } = &mut obstacle.kind {
            obstacle.x += shimmy * *sway;
            *sway = -*sway;
        }
    }

    let bullet_speed = state.config.bullet_speed;
    let width = state.layout.width;
    for shot in &mut state.projectiles {
        shot.advance(bullet_speed, dt);
    }
    state.projectiles.retain(|p| !p.is_off_field(width));
    state.obstacles.retain(|o| o.right() > 0.0);

    // Physics runs against the already scrolled course
    let ground = state.ground_under_player();
    if let Some(impact_vy) = state.physics.integrate(&mut state.player, ground, dt) {
        state.events.push(GameEvent::Landed { impact_vy });
    }

    // Shots vs flies
    for (shot_id, enemy_id) in projectile_hits(&state.projectiles, &state.obstacles) {
        state.projectiles.retain(|p| p.id != shot_id);
        state.obstacles.retain(|o| o.id != enemy_id);
        let points = state.config.enemy_score;
        state.score += points;
        state.events.push(GameEvent::EnemyDestroyed {
            id: enemy_id,
            points,
        });
    }

    // Buggy vs hazards and terrain
    let ground = state.ground_under_player();
    if let Some(hit) = player_hit(&state.player, &state.obstacles, ground, scrolled) {
        apply_hit(state, hit);
        if state.phase == GamePhase::GameOver {
            return;
        }
    }

    state.normalize_order();

    if state.phase == GamePhase::SafeStart {
        state.safe_ticks = state.safe_ticks.saturating_sub(1);
        if state.safe_ticks == 0 {
            state.set_phase(GamePhase::Playing);
        }
    }

    check_invariants(state);
}

/// Move the world left by the whole columns accumulated this step; returns
/// the columns moved
fn scroll(state: &mut GameState, dt: f32, suppressed: bool) -> f32 {
    let speed = state.scroll_speed();
    state.scroll_acc += speed * dt;
    let cols = state.scroll_acc.floor();
    if cols < 1.0 {
        return 0.0;
    }
    state.scroll_acc -= cols;
    let n = cols as usize;

    state.course.shift(n);
    for obstacle in &mut state.obstacles {
        obstacle.x -= cols;
    }

    let first = state.course.width() as f32;
    for k in 0..n {
        let spawn = state.spawner.next_column(speed, suppressed);
        state.course.push(spawn.elev);
        if let Some(kind) = spawn.obstacle {
            state.spawn_obstacle(kind, first + k as f32, spawn.elev, spawn.column);
        }
    }
    state.distance += n as u64;
    cols
}

/// Charge a life for a contact and reset the field when it was lethal
fn apply_hit(state: &mut GameState, hit: Hit) {
    state.lives = state.lives.saturating_sub(1);
    state.events.push(GameEvent::LifeLost {
        cause: hit.hazard,
        lives_left: state.lives,
    });
    log::info!(
        "Life lost to {:?} ({:?}), {} left",
        hit.hazard,
        hit.contact,
        state.lives
    );

    if hit.contact == Contact::Damaging {
        if let Some(id) = hit.obstacle {
            state.obstacles.retain(|o| o.id != id);
            state.events.push(GameEvent::ConeHit { id });
        }
    }

    if state.lives == 0 {
        state.set_phase(GamePhase::GameOver);
        return;
    }

    if hit.contact == Contact::Lethal {
        respawn(state);
    }
}

/// Clear the field and put the buggy back down where its rear wheel was
fn respawn(state: &mut GameState) {
    let elev = state.course.elevation(state.player.rear_cell());
    let speed = state.scroll_speed();
    state.obstacles.clear();
    state.projectiles.clear();
    state.course.level(elev);
    state.spawner.reset_after_respawn(elev, speed);
    state.player.land(elev as f32);
    state.scroll_acc = 0.0;
}

/// Runtime invariants: asserted in debug builds, repaired in release builds
fn check_invariants(state: &mut GameState) {
    let ground = state.ground_under_player();
    let grounded_off_surface =
        state.player.is_grounded() && (state.player.y - ground).abs() > GROUND_EPSILON;
    debug_assert!(
        !grounded_off_surface,
        "grounded player at y={} over ground {ground}",
        state.player.y
    );
    if grounded_off_surface {
        log::warn!(
            "Grounded player at y={} over ground {ground}, clamping",
            state.player.y
        );
        state.player.land(ground);
    }

    let max_x = state.layout.width as f32;
    let out_of_bounds = state.player.x < 0.0 || state.player.x >= max_x;
    debug_assert!(!out_of_bounds, "player column {} off field", state.player.x);
    if out_of_bounds {
        log::warn!("Player column {} off field, clamping", state.player.x);
        state.player.x = state.layout.car_x(state.config.car_x_fraction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::consts::CAR_W;
    use crate::sim::collision::Hazard;
    use crate::sim::course::Course;
    use crate::sim::state::Layout;
    use proptest::prelude::*;

    fn layout() -> Layout {
        Layout::new(80, 24)
    }

    /// No random hazards, straight into Playing
    fn quiet_config() -> Config {
        Config {
            safe_start_sec: 0.0,
            pit_rate: 0.0,
            cone_rate: 0.0,
            enemy_rate: 0.0,
            step_rate: 0.0,
            ..Default::default()
        }
    }

    fn busy_config() -> Config {
        Config {
            pit_rate: 0.2,
            step_rate: 0.2,
            cone_rate: 0.2,
            enemy_rate: 0.2,
            ..Default::default()
        }
    }

    fn run(state: &mut GameState, input: &TickInput, ticks: usize) -> Vec<GameEvent> {
        let dt = state.config.dt();
        let mut events = Vec::new();
        for _ in 0..ticks {
            tick(state, input, dt);
            events.extend(state.events.iter().copied());
        }
        events
    }

    fn count_life_lost(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::LifeLost { .. }))
            .count()
    }

    #[test]
    fn test_tick_pause() {
        let mut state = GameState::new(Config::default(), 12345, layout());
        assert_eq!(state.phase, GamePhase::SafeStart);
        run(&mut state, &TickInput::default(), 5);
        let ticks = state.time_ticks;

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        run(&mut state, &pause, 1);
        assert_eq!(state.phase, GamePhase::Paused);

        run(&mut state, &TickInput::default(), 10);
        assert_eq!(state.time_ticks, ticks);

        // Unpause resumes the interrupted phase
        run(&mut state, &pause, 1);
        assert_eq!(state.phase, GamePhase::SafeStart);
        assert_eq!(state.time_ticks, ticks + 1);
    }

    #[test]
    fn test_safe_start_expires() {
        let mut state = GameState::new(busy_config(), 7, layout());
        run(&mut state, &TickInput::default(), 59);
        assert_eq!(state.phase, GamePhase::SafeStart);
        assert!(state.obstacles.is_empty());
        run(&mut state, &TickInput::default(), 1);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_jump_on_empty_course() {
        let mut state = GameState::new(quiet_config(), 1, layout());
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        let events = run(&mut state, &jump, 1);
        assert!(events.contains(&GameEvent::Jumped));
        assert!(!state.player.is_grounded());

        let mut ticks = 1;
        while !state.player.is_grounded() {
            run(&mut state, &TickInput::default(), 1);
            ticks += 1;
            assert!(ticks <= 29, "buggy never came down");
        }
        assert_eq!(state.player.y, 0.0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_pit_ahead_without_jumping_costs_one_life() {
        let mut state = GameState::new(quiet_config(), 1, layout());
        let x = state.player.x + CAR_W as f32 + 2.0;
        state.spawn_obstacle(ObstacleKind::Pit { width: 4 }, x, 0, 0);

        let events = run(&mut state, &TickInput::default(), 10);
        assert_eq!(count_life_lost(&events), 1);
        assert!(events.contains(&GameEvent::LifeLost {
            cause: Hazard::Pit,
            lives_left: 2
        }));
        assert_eq!(state.lives, 2);
        assert!(state.obstacles.is_empty());
        assert!(state.player.is_grounded());

        let events = run(&mut state, &TickInput::default(), 120);
        assert_eq!(count_life_lost(&events), 0);
        assert_eq!(state.lives, 2);
    }

    #[test]
    fn test_jumping_clears_a_pit() {
        let mut state = GameState::new(quiet_config(), 1, layout());
        let x = state.player.x + CAR_W as f32 + 2.0;
        state.spawn_obstacle(ObstacleKind::Pit { width: 9 }, x, 0, 0);
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        let mut events = run(&mut state, &jump, 1);
        events.extend(run(&mut state, &TickInput::default(), 60));
        assert_eq!(count_life_lost(&events), 0);
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn test_cone_hit_costs_life_without_reset() {
        let mut state = GameState::new(quiet_config(), 1, layout());
        let x = state.player.x + CAR_W as f32 + 2.0;
        let cone = state.spawn_obstacle(ObstacleKind::Cone, x, 0, 0);
        let enemy = state.spawn_obstacle(ObstacleKind::Enemy { sway: 1.0 }, 70.0, 0, 0);

        let events = run(&mut state, &TickInput::default(), 6);
        assert!(events.contains(&GameEvent::ConeHit { id: cone }));
        assert_eq!(state.lives, 2);
        // The rest of the field is left alone
        assert!(state.obstacles.iter().any(|o| o.id == enemy));
    }

    #[test]
    fn test_shooting_enemy_scores_once() {
        let mut state = GameState::new(quiet_config(), 1, layout());
        let enemy = state.spawn_obstacle(ObstacleKind::Enemy { sway: 1.0 }, 50.0, 0, 0);
        let shoot = TickInput {
            shoot: true,
            ..Default::default()
        };
        let mut events = run(&mut state, &shoot, 1);
        events.extend(run(&mut state, &TickInput::default(), 40));

        let destroyed: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyDestroyed { .. }))
            .collect();
        assert_eq!(
            destroyed,
            vec![&GameEvent::EnemyDestroyed {
                id: enemy,
                points: 25
            }]
        );
        assert_eq!(state.score, 25);
        assert_eq!(state.lives, 3);
        assert!(state.obstacles.is_empty());
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_fire_rate_is_limited() {
        let mut state = GameState::new(quiet_config(), 1, layout());
        let shoot = TickInput {
            shoot: true,
            ..Default::default()
        };
        let events = run(&mut state, &shoot, 9);
        let fired = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Fired { .. }))
            .count();
        assert_eq!(fired, 3);
    }

    #[test]
    fn test_cone_hit_at_high_speed() {
        let mut state = GameState::new(quiet_config(), 1, layout());
        // 20 columns per tick
        state.speed = 600.0;
        let x = state.player.x + CAR_W as f32 + 2.0;
        let cone = state.spawn_obstacle(ObstacleKind::Cone, x, 0, 0);

        let events = run(&mut state, &TickInput::default(), 1);
        assert!(events.contains(&GameEvent::ConeHit { id: cone }));
        assert_eq!(state.lives, 2);
    }

    #[test]
    fn test_lives_exhausted_ends_run_once() {
        let config = Config {
            lives: 1,
            ..quiet_config()
        };
        let mut state = GameState::new(config, 1, layout());
        let x = state.player.x + CAR_W as f32 + 2.0;
        state.spawn_obstacle(ObstacleKind::Pit { width: 4 }, x, 0, 0);

        let events = run(&mut state, &TickInput::default(), 30);
        let game_overs = events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    GameEvent::PhaseChanged {
                        to: GamePhase::GameOver,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(game_overs, 1);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.lives, 0);

        // Frozen until restart
        let frozen_ticks = state.time_ticks;
        let frozen_distance = state.distance;
        let jump = TickInput {
            jump: true,
            shoot: true,
            pause: true,
            ..Default::default()
        };
        run(&mut state, &jump, 20);
        assert_eq!(state.time_ticks, frozen_ticks);
        assert_eq!(state.distance, frozen_distance);
        assert_eq!(state.phase, GamePhase::GameOver);

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        run(&mut state, &restart, 1);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives, 1);
        assert_eq!(state.distance, 0);
    }

    #[test]
    fn test_speed_ramps_while_playing() {
        let config = Config {
            speed_up_every_sec: 1.0,
            ..quiet_config()
        };
        let mut state = GameState::new(config, 1, layout());
        let events = run(&mut state, &TickInput::default(), 30);
        assert_eq!(state.speed, 31.5);
        assert!(events.contains(&GameEvent::SpeedUp { speed: 31.5 }));
    }

    #[test]
    fn test_turbo_scrolls_faster() {
        let mut slow = GameState::new(quiet_config(), 1, layout());
        let mut fast = GameState::new(quiet_config(), 1, layout());
        let turbo = TickInput {
            turbo: true,
            ..Default::default()
        };
        run(&mut slow, &TickInput::default(), 30);
        run(&mut fast, &turbo, 30);
        assert!(fast.distance > slow.distance + 25);
    }

    #[test]
    fn test_driving_into_a_riser_is_lethal() {
        let mut state = GameState::new(quiet_config(), 1, layout());
        // Raise the far part of the course by one level behind a riser
        let riser = state.player.x as usize + CAR_W + 3;
        let width = state.course.width();
        let mut course = Course::flat(riser, 0);
        for _ in riser..width {
            course.push(1);
        }
        state.course = course;
        state.spawner.elev = 1;
        state.spawn_obstacle(ObstacleKind::Step { from: 0, to: 1 }, riser as f32, 1, 0);

        let events = run(&mut state, &TickInput::default(), 6);
        assert!(events.contains(&GameEvent::LifeLost {
            cause: Hazard::Step,
            lives_left: 2
        }));
        assert!(state.player.is_grounded());
        assert_eq!(state.player.y, 0.0);
    }

    #[test]
    fn test_nothing_spawns_during_safe_start() {
        let mut state = GameState::new(busy_config(), 11, layout());
        let safe_ticks = state.safe_ticks as u64;
        let dt = state.config.dt();
        let mut spawned = 0;
        for _ in 0..600 {
            tick(&mut state, &TickInput::default(), dt);
            for event in &state.events {
                if let GameEvent::Spawned { .. } = event {
                    assert!(state.time_ticks > safe_ticks);
                    spawned += 1;
                }
            }
            if state.phase == GamePhase::GameOver {
                break;
            }
        }
        assert!(spawned > 0);
    }

    fn input_strategy() -> impl Strategy<Value = TickInput> {
        (any::<bool>(), any::<bool>(), any::<bool>(), 0u8..40).prop_map(
            |(jump, shoot, turbo, pause)| TickInput {
                jump,
                shoot,
                turbo,
                pause: pause == 0,
                restart: false,
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_determinism(seed in any::<u64>(), inputs in prop::collection::vec(input_strategy(), 1..400)) {
            let mut a = GameState::new(busy_config(), seed, layout());
            let mut b = GameState::new(busy_config(), seed, layout());
            let dt = a.config.dt();
            for input in &inputs {
                tick(&mut a, input, dt);
                tick(&mut b, input, dt);
                prop_assert_eq!(a.score, b.score);
                prop_assert_eq!(a.lives, b.lives);
                prop_assert_eq!(a.phase, b.phase);
                prop_assert_eq!(a.distance, b.distance);
                prop_assert_eq!(&a.obstacles, &b.obstacles);
                prop_assert_eq!(&a.events, &b.events);
            }
        }

        #[test]
        fn test_grounded_player_rests_on_course(seed in any::<u64>(), inputs in prop::collection::vec(input_strategy(), 1..400)) {
            let mut state = GameState::new(busy_config(), seed, layout());
            let dt = state.config.dt();
            for input in &inputs {
                tick(&mut state, input, dt);
                if state.phase != GamePhase::GameOver && state.player.is_grounded() {
                    let ground = state.ground_under_player();
                    prop_assert!((state.player.y - ground).abs() <= GROUND_EPSILON);
                }
            }
        }

        #[test]
        fn test_spawns_keep_min_spacing(seed in any::<u64>(), turbo in any::<bool>()) {
            let config = Config {
                lives: 255,
                ..busy_config()
            };
            let spacing = config.min_spacing(config.base_speed) as u64;
            let mut state = GameState::new(config, seed, layout());
            let dt = state.config.dt();
            let input = TickInput { turbo, ..Default::default() };
            let mut last_end: Option<u64> = None;
            for _ in 0..1500 {
                tick(&mut state, &input, dt);
                for event in &state.events {
                    if let GameEvent::Spawned { kind, column, .. } = *event {
                        if let Some(end) = last_end {
                            prop_assert!(column - end > spacing);
                        }
                        last_end = Some(column + kind.span() as u64 - 1);
                    }
                }
                if state.phase == GamePhase::GameOver {
                    break;
                }
            }
        }
    }
}
