use clap::Parser;
use collide2d::CollisionConfig;

/// Settings for a headless run.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub width: f32,
    pub height: f32,
    /// Fixed tick length in seconds.
    pub dt: f32,
    pub ticks: u32,
    pub seed: u64,
    pub lives: u32,
    pub initial_asteroids: u32,
    pub max_asteroids: usize,
    pub asteroid_spawn_interval: f32,
    /// Shots per second.
    pub fire_rate: f32,
    pub bullet_speed: f32,
    pub bullet_lifetime: f32,
    pub ship_turn_rate: f32,
    /// Seconds a respawned ship ignores asteroid contacts.
    pub respawn_grace: f32,
    pub collision: CollisionConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            dt: 1.0 / 60.0,
            ticks: 3600,
            seed: 0x0a57_e201d,
            lives: 3,
            initial_asteroids: 4,
            max_asteroids: 10,
            asteroid_spawn_interval: 5.0,
            fire_rate: 5.0,
            bullet_speed: 400.0,
            bullet_lifetime: 2.0,
            ship_turn_rate: 1.5,
            respawn_grace: 2.0,
            collision: CollisionConfig::default(),
        }
    }
}

/// Command-line overrides for a headless run.
#[derive(Parser, Debug)]
#[command(name = "asteroids_demo")]
#[command(about = "Headless asteroids run driven by the collide2d collision core")]
pub struct DemoArgs {
    /// Seed for asteroid placement and headings
    #[arg(long)]
    pub seed: Option<u64>,
    /// Number of fixed ticks to simulate
    #[arg(long)]
    pub ticks: Option<u32>,
    /// Separation tolerance for the narrow phase
    #[arg(long)]
    pub epsilon: Option<f32>,
}

impl From<DemoArgs> for DemoConfig {
    fn from(args: DemoArgs) -> Self {
        let mut config = Self::default();
        if let Some(seed) = args.seed {
            config.seed = seed;
        }
        if let Some(ticks) = args.ticks {
            config.ticks = ticks;
        }
        if let Some(epsilon) = args.epsilon {
            config.collision = config.collision.with_epsilon(epsilon);
        }
        config
    }
}
