use ::rand::seq::SliceRandom;
use ::rand::Rng;
use macroquad::prelude::*;

use crate::agent::{Behavior, EyeAgent, Personality};
use crate::config::{self, SimulationConfig};
use crate::entity::{Category, Entity, GemColor, RarityTag, ShapeKind};

/// Draw a gem size favoring small gems: `1/size` is uniform between
/// `1/MIN_GEM_SIZE` and `1/MAX_GEM_SIZE`.
pub fn sample_size(rng: &mut impl Rng) -> f32 {
    let u: f32 = rng.gen();
    inverse_square_size(u)
}

fn inverse_square_size(u: f32) -> f32 {
    let inv_min = 1.0 / config::MIN_GEM_SIZE;
    let inv_max = 1.0 / config::MAX_GEM_SIZE;
    1.0 / (inv_min + u * (inv_max - inv_min))
}

fn roll_rarity(rng: &mut impl Rng, allow_special: bool) -> RarityTag {
    if allow_special && rng.gen_bool(config::SUPER_RARE_CHANCE) {
        return RarityTag::SuperEye;
    }
    let eye = allow_special && rng.gen_bool(config::EYE_CHANCE);
    let glowing = rng.gen_bool(config::GLOWING_CHANCE);
    if eye {
        RarityTag::Eye
    } else if glowing {
        RarityTag::Glowing
    } else if rng.gen_bool(config::ROD_CHANCE) {
        RarityTag::Rod
    } else if rng.gen_bool(config::CROSS_CHANCE) {
        RarityTag::Cross
    } else {
        RarityTag::Normal
    }
}

/// Build a new gem at `pos`.
///
/// Tray gems are static and wear an oversized grab sensor. Free gems are
/// scaled by the configured global scale. With `allow_special` false no eye
/// or super-eye can come out.
pub fn create_entity(
    pos: Vec2,
    in_tray: bool,
    allow_special: bool,
    config: &SimulationConfig,
    rng: &mut impl Rng,
) -> Entity {
    let rarity = roll_rarity(rng, allow_special);

    let mut size = sample_size(rng);
    if rarity == RarityTag::SuperEye {
        size *= config::SUPER_EYE_SIZE_FACTOR;
    }
    if !in_tray {
        size *= config.global_scale;
    }

    let shape = match rarity {
        RarityTag::Rod => ShapeKind::Rectangle,
        RarityTag::Cross => ShapeKind::Cross,
        _ => ShapeKind::Polygon {
            sides: rng.gen_range(config::MIN_POLYGON_SIDES..=config::MAX_POLYGON_SIDES),
        },
    };

    let color = if rarity == RarityTag::SuperEye {
        GemColor::GOLD
    } else {
        *GemColor::PALETTE.choose(rng).unwrap_or(&GemColor::WHITE)
    };

    let density = if rarity.is_eye() || rarity.is_glowing() {
        config::BASE_DENSITY * config::HEAVY_DENSITY_FACTOR
    } else {
        config::BASE_DENSITY
    };

    let mut entity = Entity::new(pos, shape, size, color, density);
    entity.rarity = rarity;
    entity.angle = rng.gen_range(0.0..std::f32::consts::TAU);

    if rarity.is_eye() {
        let personality = *Personality::ALL
            .choose(rng)
            .unwrap_or(&Personality::Curious);
        entity.behavior = Behavior::EyeAgent(EyeAgent::new(
            personality,
            rng.gen_range(0.0..1000.0),
        ));
    }

    if in_tray {
        entity.set_static(true);
        entity.category = Category::GemSupply;
        entity.grab_sensor = Some(
            (entity.collision_radius() * config::GRAB_SENSOR_FACTOR)
                .max(config::GRAB_SENSOR_MIN_RADIUS),
        );
    }

    entity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Emotion;
    use ::rand::SeedableRng;
    use proptest::prelude::*;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn suppressed_specials_never_produce_eyes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = SimulationConfig::default();
        for _ in 0..10_000 {
            let gem = create_entity(Vec2::ZERO, false, false, &config, &mut rng);
            assert!(!gem.rarity.is_eye());
            assert!(gem.agent().is_none());
        }
    }

    #[test]
    fn eyes_start_calm_with_zeroed_counters() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let config = SimulationConfig::default();
        let mut seen = 0;
        for _ in 0..50_000 {
            let gem = create_entity(Vec2::ZERO, false, true, &config, &mut rng);
            if let Some(agent) = gem.agent() {
                assert!(gem.rarity.is_eye());
                assert_eq!(agent.emotion, Emotion::Normal);
                assert_eq!(agent.emotion_timer, 0);
                assert_eq!(agent.sleep_counter, 0);
                assert_eq!(agent.stuck_counter, 0);
                assert_eq!(agent.cooldown_timer, 0);
                assert_eq!(agent.fascinated_timer, 0);
                assert_eq!(agent.glow_timer, 0);
                assert!(!agent.is_fascinated);
                seen += 1;
            }
        }
        assert!(seen > 0, "expected at least one eye in 50k rolls");
    }

    #[test]
    fn super_eyes_are_gold_and_doubled() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let config = SimulationConfig::default();
        let found = (0..200_000)
            .map(|_| create_entity(Vec2::ZERO, false, true, &config, &mut rng))
            .find(|g| g.rarity == RarityTag::SuperEye);
        if let Some(gem) = found {
            assert_eq!(gem.color, GemColor::GOLD);
            assert!(gem.size >= config::MIN_GEM_SIZE * config::SUPER_EYE_SIZE_FACTOR - 1e-3);
            assert!(gem.agent().is_some());
        }
    }

    #[test]
    fn tray_gems_are_static_supply_with_sensor() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let config = SimulationConfig {
            global_scale: 3.0,
            ..Default::default()
        };
        let gem = create_entity(vec2(10.0, 20.0), true, false, &config, &mut rng);
        assert!(gem.is_static);
        assert_eq!(gem.category, Category::GemSupply);
        let sensor = gem.grab_sensor.unwrap();
        assert!(sensor > gem.collision_radius());
        // Tray gems are not pre-scaled.
        assert!(gem.size <= config::MAX_GEM_SIZE + 1e-3);
    }

    #[test]
    fn glowing_gems_are_five_times_denser() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let config = SimulationConfig::default();
        let gem = (0..10_000)
            .map(|_| create_entity(Vec2::ZERO, false, false, &config, &mut rng))
            .find(|g| g.rarity == RarityTag::Glowing)
            .unwrap();
        let density = gem.mass / gem.area;
        assert!((density - config::BASE_DENSITY * config::HEAVY_DENSITY_FACTOR).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn sampled_sizes_stay_in_range(u in 0.0f32..=1.0) {
            let size = inverse_square_size(u);
            prop_assert!(size >= config::MIN_GEM_SIZE - 1e-3);
            prop_assert!(size <= config::MAX_GEM_SIZE + 1e-3);
        }

        #[test]
        fn rarity_rolls_respect_allow_special(seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for _ in 0..64 {
                prop_assert!(!roll_rarity(&mut rng, false).is_eye());
            }
        }
    }
}
