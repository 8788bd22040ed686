use std::f32::consts::{PI, TAU};

use ::rand::Rng;
use macroquad::prelude::*;

use crate::agent::{Emotion, EyeAgent, Personality};
use crate::config::{self, SimulationConfig};
use crate::entity::{EntityArena, EntityId, GemColor, RarityTag};
use crate::particles::ParticleSystem;
use crate::physics;
use crate::spatial_hash::SpatialHash;

/// What an agent sees of another body during its scan.
#[derive(Clone, Copy, Debug)]
pub struct Seen {
    pub id: EntityId,
    pub pos: Vec2,
    pub color: GemColor,
    pub fascinating: bool,
}

/// Outcome of the social pass over an agent's neighborhood.
#[derive(Clone, Copy, Debug, Default)]
pub struct Social {
    pub force: Vec2,
    /// Nearest same-or-complementary neighbor.
    pub kin: Option<EntityId>,
    /// Nearest glowing or super-eye neighbor.
    pub fascination: Option<(EntityId, Vec2)>,
}

/// Tally of notable transitions in one behavior pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BehaviorReport {
    pub agents: usize,
    pub became_angry: usize,
    pub fell_asleep: usize,
    pub got_bored: usize,
    pub angry_pushes: usize,
}

/// Shortest signed angle, wrapped into [-π, π].
pub fn wrap_angle(a: f32) -> f32 {
    (a + PI).rem_euclid(TAU) - PI
}

/// Smooth pseudo-noise: three detuned sine waves.
pub fn wander_noise(t: f32) -> f32 {
    t.sin() + (2.2 * t + 5.5).sin() * 0.5 + (1.2 * t + 3.0).sin() * 0.2
}

/// Agent-local time in noise units (ms × 0.002).
fn agent_time(tick: u64, noise_offset: f32) -> f32 {
    let ms = tick as f32 * config::FIXED_DT * 1000.0;
    (ms + noise_offset) * 0.002
}

pub fn scan_range(personality: Personality, config: &SimulationConfig) -> f32 {
    config::BASE_SCAN_RANGE * config.global_scale * personality.scan_range_multiplier()
}

/// Personality-driven pushes and pulls from the neighborhood.
pub fn social_force(
    pos: Vec2,
    mass: f32,
    color: GemColor,
    personality: Personality,
    neighbors: &[Seen],
) -> Social {
    let complementary = color.complementary();
    let mut social = Social::default();
    let mut nearest_kin = f32::MAX;
    let mut nearest_glow = f32::MAX;
    let mut nearest_rival: Option<(f32, Vec2)> = None;

    for n in neighbors {
        let delta = n.pos - pos;
        let dist = delta.length();
        if dist < 1e-3 {
            continue;
        }
        let dir = delta / dist;
        let kin = n.color == color || n.color == complementary;

        if kin && dist < nearest_kin {
            nearest_kin = dist;
            social.kin = Some(n.id);
        }
        if n.fascinating && dist < nearest_glow {
            nearest_glow = dist;
            social.fascination = Some((n.id, n.pos));
        }

        if personality == Personality::Shy {
            if dist < config::SHY_FLEE_RADIUS {
                let urgency = 1.0 - dist / config::SHY_FLEE_RADIUS;
                social.force -= dir * config::SHY_FLEE_ACCEL * urgency * mass;
            }
            continue;
        }

        if n.color == color {
            social.force += dir * config::SAME_COLOR_ATTRACT_ACCEL * mass;
        } else if n.color == complementary {
            let stretch = dist - config::COMPLEMENTARY_IDEAL_DISTANCE;
            social.force += dir * stretch * config::COMPLEMENTARY_SPRING * mass;
        } else if personality == Personality::Aggressive
            && nearest_rival.map_or(true, |(d, _)| dist < d)
        {
            nearest_rival = Some((dist, dir));
        }
    }

    if let Some((_, dir)) = nearest_rival {
        social.force += dir * config::AGGRESSIVE_CHASE_ACCEL * mass;
    }
    social
}

/// Body state the motor needs.
#[derive(Clone, Copy, Debug)]
pub struct MotorInput {
    pub pos: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub mass: f32,
    pub super_eye: bool,
    pub tick: u64,
    /// Position of the fascination target, if staring at one.
    pub target: Option<Vec2>,
}

/// Steering torque plus forward thrust. None while the emotion suppresses
/// swimming.
pub fn motor_force(agent: &EyeAgent, input: &MotorInput) -> Option<(f32, Vec2)> {
    if matches!(
        agent.emotion,
        Emotion::Sleep | Emotion::Angry | Emotion::Scared
    ) {
        return None;
    }

    let t = agent_time(input.tick, agent.noise_offset);
    let wander = wander_noise(t);
    let speed = input.velocity.length();

    let closing = input
        .target
        .filter(|target| target.distance(input.pos) > config::FASCINATION_CLOSING_DISTANCE);
    let heading = if let Some(target) = closing {
        (target - input.pos).to_angle()
    } else if speed > config::MOVING_SPEED {
        input.velocity.to_angle() + wander * 0.5
    } else {
        wander * PI
    };

    let turn_factor = if input.super_eye {
        config::SUPER_EYE_TURN_FACTOR
    } else {
        1.0
    };
    let torque = wrap_angle(heading - input.angle) * config::TURN_GAIN * input.mass * turn_factor;

    let phase = (input.tick as f32 * config::KICK_FREQUENCY + agent.noise_offset).sin();
    let thrust = if phase > 0.0 {
        Vec2::from_angle(input.angle)
            * config::MOTOR_THRUST
            * input.mass
            * agent.personality.thrust_multiplier()
            * agent.emotion.mood_multiplier()
            * phase
    } else {
        Vec2::ZERO
    };

    Some((torque, thrust))
}

/// Run one tick of perception, emotion and motor control for every free eye.
pub fn update_agents(
    arena: &mut EntityArena,
    spatial: &SpatialHash,
    config: &SimulationConfig,
    tick: u64,
    particles: &mut ParticleSystem,
    rng: &mut impl Rng,
) -> BehaviorReport {
    let mut report = BehaviorReport::default();

    let agent_ids: Vec<EntityId> = arena
        .iter_ids()
        .filter(|(_, e)| e.is_free() && e.agent().is_some())
        .map(|(id, _)| id)
        .collect();

    for id in agent_ids {
        let Some(entity) = arena.get(id) else { continue };
        let Some(agent) = entity.agent() else { continue };
        let pos = entity.pos;
        let velocity = entity.velocity;
        let angle = entity.angle;
        let mass = entity.mass;
        let color = entity.color;
        let super_eye = entity.rarity == RarityTag::SuperEye;
        let personality = agent.personality;

        let range = scan_range(personality, config);
        let neighbors: Vec<Seen> = spatial
            .query_radius_excluding(pos, range, id.index, arena)
            .into_iter()
            .filter_map(|idx| {
                let other_id = arena.id_at(idx as usize)?;
                let other = arena.get(other_id)?;
                other.is_free().then_some(Seen {
                    id: other_id,
                    pos: other.pos,
                    color: other.color,
                    fascinating: other.rarity.is_glowing(),
                })
            })
            .collect();

        let Some(entity) = arena.get_mut(id) else { continue };
        let Some(agent) = entity.agent_mut() else { continue };
        report.agents += 1;

        agent.tick_emotion();
        if agent.update_stuck(velocity.length()) {
            report.became_angry += 1;
            tracing::debug!(index = id.index, "eye got stuck and angry");
        }

        if agent.is_asleep() {
            continue;
        }

        let social = social_force(pos, mass, color, personality, &neighbors);
        agent.attention = social.kin;

        if agent.cooldown_timer > 0 {
            agent.cooldown_timer -= 1;
            agent.clear_fascination();
        } else if let Some((target, _)) = social.fascination {
            if agent.fascinate(target) {
                report.got_bored += 1;
            }
        } else {
            agent.lose_interest();
        }

        if agent.emotion == Emotion::Normal
            && !agent.is_fascinated
            && rng.gen_bool(personality.sleep_chance())
        {
            agent.fall_asleep();
            report.fell_asleep += 1;
            continue;
        }

        let target = if agent.is_fascinated {
            social.fascination.map(|(_, p)| p)
        } else {
            None
        };
        let motor = motor_force(
            agent,
            &MotorInput {
                pos,
                velocity,
                angle,
                mass,
                super_eye,
                tick,
                target,
            },
        );
        let emotion = agent.emotion;

        let mut force = social.force;
        let mut torque = 0.0;
        if let Some((t, thrust)) = motor {
            torque = t;
            force += thrust;
        }
        if emotion == Emotion::Scared {
            let jitter = vec2(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            force += jitter * config::SCARED_JITTER_ACCEL * mass;
        }
        entity.apply_force(force);
        entity.apply_torque(torque);

        if emotion == Emotion::Angry && rng.gen_bool(config::ANGRY_PUSH_CHANCE) {
            physics::push_outward(
                arena,
                pos,
                Some(config::ANGRY_PUSH_RADIUS),
                config::ANGRY_PUSH_ACCEL,
                Some(id),
            );
            particles.spawn(pos, color, false, rng);
            report.angry_pushes += 1;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::tests::{test_eye, test_gem};
    use crate::entity::Entity;
    use ::rand::SeedableRng;
    use proptest::prelude::*;
    use rand_chacha::ChaCha8Rng;

    struct Rig {
        arena: EntityArena,
        spatial: SpatialHash,
        particles: ParticleSystem,
        rng: ChaCha8Rng,
        config: SimulationConfig,
        tick: u64,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                arena: EntityArena::new(8),
                spatial: SpatialHash::new(Vec2::ZERO, 1000.0, 1000.0, 64.0),
                particles: ParticleSystem::new(),
                rng: ChaCha8Rng::seed_from_u64(11),
                config: SimulationConfig::default(),
                tick: 0,
            }
        }

        fn spawn(&mut self, e: Entity) -> EntityId {
            self.arena.spawn(e).unwrap()
        }

        fn step(&mut self) -> BehaviorReport {
            self.spatial.rebuild(&self.arena);
            let report = update_agents(
                &mut self.arena,
                &self.spatial,
                &self.config,
                self.tick,
                &mut self.particles,
                &mut self.rng,
            );
            self.tick += 1;
            report
        }

        /// Keep motionless eyes from turning angry in long calm runs.
        fn calm_stuck_counters(&mut self) {
            for entity in self.arena.entities.iter_mut().flatten() {
                if let Some(agent) = entity.agent_mut() {
                    agent.stuck_counter = 0;
                }
            }
        }

        fn agent(&self, id: EntityId) -> &EyeAgent {
            self.arena.get(id).unwrap().agent().unwrap()
        }
    }

    fn glowing(pos: Vec2) -> Entity {
        let mut g = test_gem(pos, GemColor::GREEN);
        g.rarity = RarityTag::Glowing;
        g
    }

    #[test]
    fn eye_fixates_on_nearest_glowing_neighbor() {
        let mut rig = Rig::new();
        let eye = rig.spawn(test_eye(vec2(500.0, 500.0), GemColor::RED, Personality::Curious));
        rig.spawn(glowing(vec2(700.0, 500.0)));
        let near = rig.spawn(glowing(vec2(600.0, 500.0)));

        rig.step();

        let agent = rig.agent(eye);
        assert!(agent.is_fascinated);
        assert_eq!(agent.fascinated_target, Some(near));
        assert_eq!(agent.fascinated_timer, 1);
    }

    #[test]
    fn glowing_gems_in_the_tray_are_ignored() {
        let mut rig = Rig::new();
        let eye = rig.spawn(test_eye(vec2(500.0, 500.0), GemColor::RED, Personality::Curious));
        let mut tray = glowing(vec2(550.0, 500.0));
        tray.set_static(true);
        tray.category = crate::entity::Category::GemSupply;
        rig.spawn(tray);

        rig.step();

        assert!(!rig.agent(eye).is_fascinated);
    }

    #[test]
    fn boredom_clears_fascination_and_sets_cooldown_once() {
        let mut rig = Rig::new();
        let eye = rig.spawn(test_eye(vec2(500.0, 500.0), GemColor::RED, Personality::Aggressive));
        rig.spawn(glowing(vec2(600.0, 500.0)));
        let threshold = Personality::Aggressive.boredom_threshold();

        let mut cooldown_sets = 0;
        let mut bored_reports = 0;
        for i in 0..threshold + 50 {
            let before = rig.agent(eye).cooldown_timer;
            bored_reports += rig.step().got_bored;
            let agent = rig.agent(eye);
            if agent.cooldown_timer == config::FASCINATION_COOLDOWN && before == 0 {
                cooldown_sets += 1;
            }
            if i + 1 < threshold {
                assert!(agent.is_fascinated, "still fascinated at tick {i}");
            }
        }

        let agent = rig.agent(eye);
        assert_eq!(cooldown_sets, 1);
        assert_eq!(bored_reports, 1);
        assert!(!agent.is_fascinated);
        assert_eq!(agent.fascinated_target, None);
        assert_eq!(agent.cooldown_timer, config::FASCINATION_COOLDOWN - 50);
    }

    #[test]
    fn losing_the_target_clears_fascination_without_cooldown() {
        let mut rig = Rig::new();
        let eye = rig.spawn(test_eye(vec2(500.0, 500.0), GemColor::RED, Personality::Curious));
        let glow = rig.spawn(glowing(vec2(600.0, 500.0)));
        for _ in 0..5 {
            rig.step();
        }
        assert!(rig.agent(eye).is_fascinated);

        rig.arena.get_mut(glow).unwrap().pos = vec2(990.0, 990.0);
        rig.step();

        let agent = rig.agent(eye);
        assert!(!agent.is_fascinated);
        assert_eq!(agent.fascinated_timer, 4);
        assert_eq!(agent.cooldown_timer, 0);
    }

    #[test]
    fn sleeping_eye_applies_no_force() {
        let mut rig = Rig::new();
        let eye = rig.spawn(test_eye(vec2(500.0, 500.0), GemColor::RED, Personality::Lazy));
        rig.spawn(test_gem(vec2(520.0, 500.0), GemColor::RED));
        rig.spawn(glowing(vec2(560.0, 500.0)));
        rig.arena.get_mut(eye).unwrap().agent_mut().unwrap().fall_asleep();

        rig.step();

        let e = rig.arena.get(eye).unwrap();
        assert_eq!(e.force, Vec2::ZERO);
        assert_eq!(e.torque, 0.0);
        assert!(!e.agent().unwrap().is_fascinated);
    }

    #[test]
    fn stuck_eye_turns_angry_during_update() {
        let mut rig = Rig::new();
        let mut eye = test_eye(vec2(500.0, 500.0), GemColor::RED, Personality::Curious);
        eye.agent_mut().unwrap().stuck_counter = config::STUCK_THRESHOLD;
        let eye = rig.spawn(eye);

        let report = rig.step();

        assert_eq!(report.became_angry, 1);
        assert_eq!(rig.agent(eye).emotion, Emotion::Angry);
    }

    #[test]
    fn angry_eye_eventually_shoves_its_neighbors() {
        let mut rig = Rig::new();
        let eye = rig.spawn(test_eye(vec2(500.0, 500.0), GemColor::RED, Personality::Curious));
        let bystander = rig.spawn(test_gem(vec2(600.0, 500.0), GemColor::BLUE));

        let mut pushes = 0;
        for _ in 0..1000 {
            rig.arena
                .get_mut(eye)
                .unwrap()
                .agent_mut()
                .unwrap()
                .set_emotion(Emotion::Angry, config::ANGRY_DURATION);
            pushes += rig.step().angry_pushes;
            if pushes > 0 {
                break;
            }
        }

        assert!(pushes > 0);
        assert!(rig.arena.get(bystander).unwrap().force.x > 0.0);
        assert!(rig.particles.count() > 0);
    }

    #[test]
    fn shy_eyes_flee_close_neighbors() {
        let neighbors = [Seen {
            id: EntityId {
                index: 1,
                generation: 0,
            },
            pos: vec2(40.0, 0.0),
            color: GemColor::RED,
            fascinating: false,
        }];
        let social = social_force(Vec2::ZERO, 1.0, GemColor::RED, Personality::Shy, &neighbors);
        assert!(social.force.x < 0.0);
    }

    #[test]
    fn complementary_neighbors_settle_at_the_ideal_distance() {
        let seen = |x: f32| Seen {
            id: EntityId {
                index: 1,
                generation: 0,
            },
            pos: vec2(x, 0.0),
            color: GemColor::CYAN,
            fascinating: false,
        };
        let far = social_force(Vec2::ZERO, 1.0, GemColor::RED, Personality::Curious, &[seen(200.0)]);
        let close = social_force(Vec2::ZERO, 1.0, GemColor::RED, Personality::Curious, &[seen(50.0)]);
        assert!(far.force.x > 0.0);
        assert!(close.force.x < 0.0);
        assert_eq!(far.kin.map(|id| id.index), Some(1));
    }

    #[test]
    fn aggressive_eyes_chase_other_colors() {
        let neighbors = [Seen {
            id: EntityId {
                index: 1,
                generation: 0,
            },
            pos: vec2(0.0, 100.0),
            color: GemColor::GREEN,
            fascinating: false,
        }];
        let aggressive = social_force(Vec2::ZERO, 1.0, GemColor::RED, Personality::Aggressive, &neighbors);
        let curious = social_force(Vec2::ZERO, 1.0, GemColor::RED, Personality::Curious, &neighbors);
        assert!(aggressive.force.y > 0.0);
        assert_eq!(curious.force, Vec2::ZERO);
    }

    #[test]
    fn scared_and_angry_eyes_do_not_swim() {
        let input = MotorInput {
            pos: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angle: 0.0,
            mass: 1.0,
            super_eye: false,
            tick: 10,
            target: None,
        };
        let mut agent = EyeAgent::new(Personality::Hyper, 0.0);
        assert!(motor_force(&agent, &input).is_some());
        agent.scare();
        assert!(motor_force(&agent, &input).is_none());
        agent.set_emotion(Emotion::Angry, 10);
        assert!(motor_force(&agent, &input).is_none());
    }

    #[test]
    fn fascinated_eye_steers_toward_a_distant_target() {
        let agent = EyeAgent::new(Personality::Curious, 0.0);
        let input = MotorInput {
            pos: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angle: 0.0,
            mass: 1.0,
            super_eye: false,
            tick: 0,
            target: Some(vec2(0.0, 200.0)),
        };
        let (torque, _) = motor_force(&agent, &input).unwrap();
        assert!(torque > 0.0);

        let super_input = MotorInput {
            super_eye: true,
            ..input
        };
        let (super_torque, _) = motor_force(&agent, &super_input).unwrap();
        assert!((super_torque - torque * config::SUPER_EYE_TURN_FACTOR).abs() < 1e-6);
    }

    #[test]
    fn tired_eyes_kick_weaker() {
        let mut agent = EyeAgent::new(Personality::Curious, 0.0);
        let input = MotorInput {
            pos: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angle: 0.0,
            mass: 1.0,
            super_eye: false,
            tick: 20,
            target: None,
        };
        let (_, fresh) = motor_force(&agent, &input).unwrap();
        agent.set_emotion(Emotion::Tired, 100);
        let (_, tired) = motor_force(&agent, &input).unwrap();
        assert!(fresh.length() > 0.0);
        assert!((tired.length() - fresh.length() * config::TIRED_MOOD).abs() < 1e-6);
    }

    #[test]
    fn lazy_eyes_doze_off_far_more_than_hyper_ones() {
        let mut rig = Rig::new();
        let mut lazy = Vec::new();
        let mut hyper = Vec::new();
        for i in 0..8 {
            let x = 100.0 + i as f32 * 100.0;
            lazy.push(rig.spawn(test_eye(vec2(x, 200.0), GemColor::RED, Personality::Lazy)));
            hyper.push(rig.spawn(test_eye(vec2(x, 800.0), GemColor::BLUE, Personality::Hyper)));
        }

        let mut lazy_slept = vec![false; lazy.len()];
        let mut hyper_slept = vec![false; hyper.len()];
        let mut reported = 0;
        for _ in 0..3000 {
            rig.calm_stuck_counters();
            reported += rig.step().fell_asleep;
            for (slept, id) in lazy_slept.iter_mut().zip(&lazy) {
                *slept |= rig.agent(*id).is_asleep();
            }
            for (slept, id) in hyper_slept.iter_mut().zip(&hyper) {
                *slept |= rig.agent(*id).is_asleep();
            }
        }

        let lazy_count = lazy_slept.iter().filter(|&&s| s).count();
        let hyper_count = hyper_slept.iter().filter(|&&s| s).count();
        assert!(lazy_count >= 6, "only {lazy_count} lazy eyes slept");
        assert!(hyper_count < lazy_count);
        assert!(reported >= lazy_count + hyper_count);
    }

    #[test]
    fn falling_asleep_starts_a_full_nap() {
        let mut rig = Rig::new();
        let eye = rig.spawn(test_eye(vec2(500.0, 500.0), GemColor::RED, Personality::Lazy));

        let mut report = BehaviorReport::default();
        for _ in 0..5000 {
            rig.calm_stuck_counters();
            rig.arena.get_mut(eye).unwrap().force = Vec2::ZERO;
            report = rig.step();
            if report.fell_asleep > 0 {
                break;
            }
        }

        assert_eq!(report.fell_asleep, 1);
        let agent = rig.agent(eye);
        assert_eq!(agent.emotion, Emotion::Sleep);
        assert_eq!(agent.sleep_counter, config::SLEEP_DURATION);
        let e = rig.arena.get(eye).unwrap();
        assert_eq!(e.force, Vec2::ZERO);
    }

    #[test]
    fn fascinated_or_upset_eyes_never_fall_asleep() {
        let mut rig = Rig::new();
        let staring = rig.spawn(test_eye(vec2(300.0, 300.0), GemColor::RED, Personality::Lazy));
        rig.spawn(glowing(vec2(350.0, 300.0)));
        let tired = rig.spawn(test_eye(vec2(800.0, 800.0), GemColor::BLUE, Personality::Lazy));

        let mut naps = 0;
        for _ in 0..Personality::Lazy.boredom_threshold() - 1 {
            rig.arena
                .get_mut(tired)
                .unwrap()
                .agent_mut()
                .unwrap()
                .set_emotion(Emotion::Tired, config::TIRED_DURATION);
            naps += rig.step().fell_asleep;
            assert!(rig.agent(staring).is_fascinated);
        }

        assert_eq!(naps, 0);
        assert!(!rig.agent(staring).is_asleep());
        assert!(!rig.agent(tired).is_asleep());
    }

    #[test]
    fn thrust_follows_personality() {
        let input = MotorInput {
            pos: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angle: 0.0,
            mass: 1.0,
            super_eye: false,
            tick: 20,
            target: None,
        };
        let thrust = |personality| {
            let agent = EyeAgent::new(personality, 0.0);
            motor_force(&agent, &input).unwrap().1.length()
        };
        let base = thrust(Personality::Curious);
        assert!(base > 0.0);
        assert!((thrust(Personality::Shy) - base).abs() < 1e-6);
        assert!((thrust(Personality::Lazy) - base * 0.5).abs() < 1e-6);
        assert!((thrust(Personality::Hyper) - base * 1.5).abs() < 1e-6);
        assert!((thrust(Personality::Aggressive) - base * 1.2).abs() < 1e-6);
    }

    #[test]
    fn scan_range_scales_with_personality_and_gem_size() {
        let mut config = SimulationConfig::default();
        assert_eq!(scan_range(Personality::Hyper, &config), config::BASE_SCAN_RANGE);
        assert_eq!(
            scan_range(Personality::Curious, &config),
            config::BASE_SCAN_RANGE * 1.5
        );

        config.global_scale = 2.0;
        assert_eq!(
            scan_range(Personality::Lazy, &config),
            config::BASE_SCAN_RANGE * 2.0 * 0.6
        );
    }

    #[test]
    fn short_sighted_eyes_miss_what_curious_ones_see() {
        let mut rig = Rig::new();
        let curious = rig.spawn(test_eye(vec2(200.0, 500.0), GemColor::RED, Personality::Curious));
        let lazy = rig.spawn(test_eye(vec2(800.0, 500.0), GemColor::RED, Personality::Lazy));
        // 200px: inside the curious range (375), outside the lazy one (150).
        rig.spawn(glowing(vec2(200.0, 700.0)));
        rig.spawn(glowing(vec2(800.0, 700.0)));

        rig.step();

        assert!(rig.agent(curious).is_fascinated);
        assert!(!rig.agent(lazy).is_fascinated);
    }

    #[test]
    fn scared_eyes_jitter_without_swimming() {
        let mut rig = Rig::new();
        let mut eye = test_eye(vec2(500.0, 500.0), GemColor::RED, Personality::Hyper);
        eye.agent_mut().unwrap().scare();
        let eye = rig.spawn(eye);

        rig.step();

        let e = rig.arena.get(eye).unwrap();
        assert_eq!(e.agent().unwrap().emotion, Emotion::Scared);
        assert!(e.force.length() > 0.0);
        assert!(e.force.length() <= config::SCARED_JITTER_ACCEL * e.mass * 2.0_f32.sqrt() + 1e-6);
        assert_eq!(e.torque, 0.0);
    }

    proptest! {
        #[test]
        fn wrapped_angles_stay_in_half_turn(a in -100.0f32..100.0) {
            let w = wrap_angle(a);
            prop_assert!(w >= -PI - 1e-4 && w <= PI + 1e-4);
            prop_assert!(((a - w) / TAU - ((a - w) / TAU).round()).abs() < 1e-3);
        }
    }
}
