use crate::config;
use crate::entity::EntityId;

/// Temperament assigned at creation. Never changes afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Personality {
    Curious,
    Shy,
    Aggressive,
    Lazy,
    Hyper,
}

impl Personality {
    pub const ALL: [Personality; 5] = [
        Personality::Curious,
        Personality::Shy,
        Personality::Aggressive,
        Personality::Lazy,
        Personality::Hyper,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Personality::Curious => "curious",
            Personality::Shy => "shy",
            Personality::Aggressive => "aggressive",
            Personality::Lazy => "lazy",
            Personality::Hyper => "hyper",
        }
    }

    /// Scales the base neighbor scan radius.
    pub fn scan_range_multiplier(self) -> f32 {
        match self {
            Personality::Curious => 1.5,
            Personality::Shy => 0.8,
            Personality::Aggressive => 1.2,
            Personality::Lazy => 0.6,
            Personality::Hyper => 1.0,
        }
    }

    /// Ticks of continuous fascination before the eye gets bored.
    pub fn boredom_threshold(self) -> u32 {
        match self {
            Personality::Curious => 900,
            Personality::Lazy => 480,
            Personality::Shy => 360,
            Personality::Hyper => 240,
            Personality::Aggressive => 120,
        }
    }

    /// Per-tick probability of dozing off while calm.
    pub fn sleep_chance(self) -> f64 {
        match self {
            Personality::Lazy => 0.002,
            Personality::Hyper => 0.000_05,
            _ => 0.0005,
        }
    }

    /// Scales the motor kick.
    pub fn thrust_multiplier(self) -> f32 {
        match self {
            Personality::Lazy => 0.5,
            Personality::Hyper => 1.5,
            Personality::Aggressive => 1.2,
            _ => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Emotion {
    #[default]
    Normal,
    Angry,
    Tired,
    Scared,
    Sleep,
    Surprised,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Normal,
        Emotion::Angry,
        Emotion::Tired,
        Emotion::Scared,
        Emotion::Sleep,
        Emotion::Surprised,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Emotion::Normal => "normal",
            Emotion::Angry => "angry",
            Emotion::Tired => "tired",
            Emotion::Scared => "scared",
            Emotion::Sleep => "sleep",
            Emotion::Surprised => "surprised",
        }
    }

    /// Thrust multiplier for the motor kick.
    pub fn mood_multiplier(self) -> f32 {
        match self {
            Emotion::Tired | Emotion::Scared => config::TIRED_MOOD,
            _ => 1.0,
        }
    }
}

/// Per-entity state of an animate eye.
#[derive(Clone, Debug, PartialEq)]
pub struct EyeAgent {
    pub personality: Personality,
    pub emotion: Emotion,
    /// Remaining ticks of a timed emotion (angry, tired, scared, surprised).
    pub emotion_timer: u32,
    /// Remaining ticks of the current nap.
    pub sleep_counter: u32,
    pub stuck_counter: u32,
    pub cooldown_timer: u32,
    pub fascinated_timer: u32,
    pub glow_timer: u32,
    pub is_fascinated: bool,
    pub fascinated_target: Option<EntityId>,
    /// Nearest same-or-complementary neighbor from the last scan; the pupil looks at it.
    pub attention: Option<EntityId>,
    pub noise_offset: f32,
}

impl EyeAgent {
    pub fn new(personality: Personality, noise_offset: f32) -> Self {
        Self {
            personality,
            emotion: Emotion::Normal,
            emotion_timer: 0,
            sleep_counter: 0,
            stuck_counter: 0,
            cooldown_timer: 0,
            fascinated_timer: 0,
            glow_timer: 0,
            is_fascinated: false,
            fascinated_target: None,
            attention: None,
            noise_offset,
        }
    }

    pub fn set_emotion(&mut self, emotion: Emotion, duration: u32) {
        self.emotion = emotion;
        match emotion {
            Emotion::Sleep => {
                self.sleep_counter = duration;
                self.emotion_timer = 0;
            }
            Emotion::Normal => {
                self.sleep_counter = 0;
                self.emotion_timer = 0;
            }
            _ => {
                self.sleep_counter = 0;
                self.emotion_timer = duration;
            }
        }
    }

    pub fn is_asleep(&self) -> bool {
        self.emotion == Emotion::Sleep
    }

    pub fn is_glowing(&self) -> bool {
        self.glow_timer > 0
    }

    /// Advance the timed emotions by one tick.
    pub fn tick_emotion(&mut self) {
        self.glow_timer = self.glow_timer.saturating_sub(1);

        match self.emotion {
            Emotion::Normal => {}
            Emotion::Sleep => {
                self.sleep_counter = self.sleep_counter.saturating_sub(1);
                if self.sleep_counter == 0 {
                    self.set_emotion(Emotion::Normal, 0);
                }
            }
            Emotion::Angry => {
                self.emotion_timer = self.emotion_timer.saturating_sub(1);
                if self.emotion_timer == 0 {
                    self.set_emotion(Emotion::Tired, config::TIRED_DURATION);
                }
            }
            Emotion::Tired => {
                self.emotion_timer = self.emotion_timer.saturating_sub(1);
                if self.emotion_timer == 0 {
                    self.set_emotion(Emotion::Normal, 0);
                    self.stuck_counter = 0;
                }
            }
            Emotion::Scared | Emotion::Surprised => {
                self.emotion_timer = self.emotion_timer.saturating_sub(1);
                if self.emotion_timer == 0 {
                    self.set_emotion(Emotion::Normal, 0);
                }
            }
        }
    }

    /// Track how long the eye has been barely moving. Returns true when this
    /// tick pushed it over the edge into anger.
    pub fn update_stuck(&mut self, speed: f32) -> bool {
        if self.is_asleep() {
            return false;
        }
        if speed < config::STUCK_SPEED {
            self.stuck_counter += 1;
        } else {
            self.stuck_counter = self.stuck_counter.saturating_sub(config::STUCK_DECAY);
        }

        let calm = !matches!(
            self.emotion,
            Emotion::Angry | Emotion::Tired | Emotion::Scared
        );
        if self.stuck_counter > config::STUCK_THRESHOLD && calm {
            self.clear_fascination();
            self.set_emotion(Emotion::Angry, config::ANGRY_DURATION);
            return true;
        }
        false
    }

    pub fn fall_asleep(&mut self) {
        self.clear_fascination();
        self.set_emotion(Emotion::Sleep, config::SLEEP_DURATION);
    }

    pub fn clear_fascination(&mut self) {
        self.is_fascinated = false;
        self.fascinated_target = None;
    }

    /// Stare at `target` for another tick. Returns true if this tick exhausted
    /// the eye's patience.
    pub fn fascinate(&mut self, target: EntityId) -> bool {
        self.is_fascinated = true;
        self.fascinated_target = Some(target);
        self.fascinated_timer += 1;
        if self.fascinated_timer >= self.personality.boredom_threshold() {
            self.become_bored();
            return true;
        }
        false
    }

    pub fn lose_interest(&mut self) {
        self.clear_fascination();
        self.fascinated_timer = self.fascinated_timer.saturating_sub(1);
    }

    pub fn become_bored(&mut self) {
        self.clear_fascination();
        self.fascinated_timer = 0;
        self.cooldown_timer = config::FASCINATION_COOLDOWN;
        if !matches!(self.emotion, Emotion::Angry | Emotion::Scared) {
            self.set_emotion(Emotion::Tired, config::TIRED_DURATION);
        }
    }

    /// Reward for eating a glowing gem.
    pub fn power_up(&mut self) {
        self.set_emotion(Emotion::Surprised, config::SURPRISED_DURATION);
        self.glow_timer = config::GLOW_DURATION;
    }

    pub fn scare(&mut self) {
        self.clear_fascination();
        self.set_emotion(Emotion::Scared, config::SCARED_DURATION);
    }

    pub fn calm(&mut self) {
        self.set_emotion(Emotion::Normal, 0);
    }

    /// Drop references to an entity that no longer exists.
    pub fn forget(&mut self, id: EntityId) {
        if self.fascinated_target == Some(id) {
            self.clear_fascination();
        }
        if self.attention == Some(id) {
            self.attention = None;
        }
    }
}

/// Behavior payload carried by every entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Behavior {
    #[default]
    Inert,
    EyeAgent(EyeAgent),
}

impl Behavior {
    pub fn as_agent(&self) -> Option<&EyeAgent> {
        match self {
            Behavior::EyeAgent(agent) => Some(agent),
            Behavior::Inert => None,
        }
    }

    pub fn as_agent_mut(&mut self) -> Option<&mut EyeAgent> {
        match self {
            Behavior::EyeAgent(agent) => Some(agent),
            Behavior::Inert => None,
        }
    }
}
