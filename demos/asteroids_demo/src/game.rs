use anyhow::{Context, Result};
use collide2d::{
    CollisionEvent, CollisionSystem, EntityId, PolygonCollider, Transform, Vec2, World,
};

use crate::config::DemoConfig;
use crate::entities::{
    asteroid_collider, bullet_collider, ship_collider, AsteroidSize, Kind, Lifetime, Velocity,
};

/// Final tally of a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub ticks: u32,
    pub score: u32,
    pub lives: u32,
    pub shots_fired: u32,
    pub asteroids_destroyed: u32,
}

/// Headless asteroids: an autopiloted ship spins and fires while asteroids drift.
pub struct AsteroidsGame {
    config: DemoConfig,
    world: World,
    collisions: CollisionSystem,
    rng: fastrand::Rng,

    ship: Option<EntityId>,
    score: u32,
    lives: u32,
    game_over: bool,
    shots_fired: u32,
    asteroids_destroyed: u32,

    // Timing
    shoot_cooldown: f32,
    asteroid_spawn_timer: f32,
    /// Seconds left during which asteroid contacts leave the ship alone.
    invulnerable: f32,
}

impl AsteroidsGame {
    pub fn new(config: DemoConfig) -> Result<Self> {
        let collisions = CollisionSystem::with_config(config.collision.clone());
        let rng = fastrand::Rng::with_seed(config.seed);
        let lives = config.lives;

        let mut game = Self {
            config,
            world: World::new(),
            collisions,
            rng,
            ship: None,
            score: 0,
            lives,
            game_over: false,
            shots_fired: 0,
            asteroids_destroyed: 0,
            shoot_cooldown: 0.0,
            asteroid_spawn_timer: 0.0,
            invulnerable: 0.0,
        };

        game.spawn_ship()?;
        for _ in 0..game.config.initial_asteroids {
            game.spawn_asteroid(AsteroidSize::Large, None)?;
        }
        Ok(game)
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    fn center(&self) -> Vec2 {
        Vec2::new(self.config.width * 0.5, self.config.height * 0.5)
    }

    fn spawn_ship(&mut self) -> Result<()> {
        let ship = self.world.spawn();
        self.world.insert(ship, Transform::new(self.center()));
        self.world.insert(
            ship,
            Velocity {
                linear: Vec2::ZERO,
                angular: self.config.ship_turn_rate,
            },
        );
        self.world.insert(ship, Kind::Ship);
        self.world.insert(ship, ship_collider()?);
        self.ship = Some(ship);
        log::debug!("Ship spawned as {ship}");
        Ok(())
    }

    fn spawn_asteroid(&mut self, size: AsteroidSize, position: Option<Vec2>) -> Result<EntityId> {
        let (w, h) = (self.config.width, self.config.height);
        let pos = match position {
            Some(pos) => pos,
            // Spawn at an edge of the arena
            None => match self.rng.u8(0..4) {
                0 => Vec2::new(0.0, self.rng.f32() * h),
                1 => Vec2::new(w, self.rng.f32() * h),
                2 => Vec2::new(self.rng.f32() * w, 0.0),
                _ => Vec2::new(self.rng.f32() * w, h),
            },
        };

        let heading = self.rng.f32() * std::f32::consts::TAU;
        let spin = if self.rng.bool() { 1.0 } else { -1.0 };
        let sides = self.rng.u32(7..12);

        let asteroid = self.world.spawn();
        self.world.insert(asteroid, Transform::new(pos));
        self.world.insert(
            asteroid,
            Velocity {
                linear: Vec2::from_angle(heading) * size.speed(),
                angular: spin * 0.5,
            },
        );
        self.world.insert(asteroid, Kind::Asteroid(size));
        self.world.insert(asteroid, asteroid_collider(size, sides)?);
        Ok(asteroid)
    }

    fn fire(&mut self) -> Result<()> {
        let Some(ship) = self.ship else {
            return Ok(());
        };
        let (position, rotation) = self
            .world
            .get::<Transform>(ship)
            .map(|t| (t.position, t.rotation))
            .context("ship has no transform")?;

        let direction = Vec2::from_angle(rotation);
        let bullet = self.world.spawn();
        self.world.insert(
            bullet,
            Transform::new(position + direction * 25.0).with_rotation(rotation),
        );
        self.world.insert(
            bullet,
            Velocity {
                linear: direction * self.config.bullet_speed,
                angular: 0.0,
            },
        );
        self.world.insert(bullet, Lifetime(self.config.bullet_lifetime));
        self.world.insert(bullet, Kind::Bullet);
        self.world.insert(bullet, bullet_collider()?);

        self.shots_fired += 1;
        self.shoot_cooldown = 1.0 / self.config.fire_rate;
        Ok(())
    }

    /// Move every entity by its velocity and wrap it around the arena.
    fn integrate(&mut self, dt: f32) {
        let (w, h) = (self.config.width, self.config.height);
        for entity in self.world.entities_with::<Velocity>() {
            let Some(velocity) = self.world.get::<Velocity>(entity).copied() else {
                continue;
            };
            if let Some(transform) = self.world.get_mut::<Transform>(entity) {
                transform.translate(velocity.linear * dt);
                transform.rotation += velocity.angular * dt;

                let p = &mut transform.position;
                if p.x < 0.0 {
                    p.x = w;
                } else if p.x > w {
                    p.x = 0.0;
                }
                if p.y < 0.0 {
                    p.y = h;
                } else if p.y > h {
                    p.y = 0.0;
                }
            }
        }
    }

    fn expire_bullets(&mut self, dt: f32) {
        let mut expired = Vec::new();
        for entity in self.world.entities_with::<Lifetime>() {
            if let Some(Lifetime(left)) = self.world.get_mut::<Lifetime>(entity) {
                *left -= dt;
                if *left <= 0.0 {
                    expired.push(entity);
                }
            }
        }
        for entity in expired {
            self.world.despawn(entity);
        }
    }

    fn kind(&self, entity: EntityId) -> Option<Kind> {
        self.world.get::<Kind>(entity).copied()
    }

    fn destroy_asteroid(&mut self, asteroid: EntityId, size: AsteroidSize) -> Result<()> {
        let position = self
            .world
            .get::<Transform>(asteroid)
            .map(|t| t.position)
            .context("asteroid has no transform")?;
        self.world.despawn(asteroid);
        self.asteroids_destroyed += 1;

        if let Some(fragment) = size.split() {
            for _ in 0..2 {
                self.spawn_asteroid(fragment, Some(position))?;
            }
        }
        Ok(())
    }

    fn handle_event(&mut self, event: &CollisionEvent) -> Result<()> {
        let (a, b) = event.entities();
        // An earlier event this tick may already have removed one side.
        if !self.world.is_alive(a) || !self.world.is_alive(b) {
            return Ok(());
        }

        match (self.kind(a), self.kind(b)) {
            (Some(Kind::Bullet), Some(Kind::Asteroid(size)))
            | (Some(Kind::Asteroid(size)), Some(Kind::Bullet)) => {
                let (bullet, asteroid) = if self.kind(a) == Some(Kind::Bullet) {
                    (a, b)
                } else {
                    (b, a)
                };
                self.world.despawn(bullet);
                self.destroy_asteroid(asteroid, size)?;
                self.score += size.points();
                log::debug!("Asteroid {asteroid} destroyed, score {}", self.score);
            }
            (Some(Kind::Ship), Some(Kind::Asteroid(size)))
            | (Some(Kind::Asteroid(size)), Some(Kind::Ship)) => {
                let (ship, asteroid) = if self.kind(a) == Some(Kind::Ship) {
                    (a, b)
                } else {
                    (b, a)
                };
                if self.invulnerable > 0.0 {
                    log::trace!("Ship {ship} shrugged off {asteroid} while respawning");
                    return Ok(());
                }
                self.destroy_asteroid(asteroid, size)?;
                self.world.despawn(ship);
                self.ship = None;
                self.lives = self.lives.saturating_sub(1);
                log::info!(
                    "Ship hit at depth {:.2}, {} lives left",
                    event.info().depth(),
                    self.lives
                );

                if self.lives == 0 {
                    self.game_over = true;
                    log::info!("Game over");
                } else {
                    self.spawn_ship()?;
                    self.invulnerable = self.config.respawn_grace;
                }
            }
            (ka, kb) => log::warn!("Unexpected collision between {ka:?} and {kb:?}"),
        }
        Ok(())
    }

    /// Advance the game by one fixed tick.
    pub fn update(&mut self) -> Result<()> {
        if self.game_over {
            return Ok(());
        }
        let dt = self.config.dt;

        if self.shoot_cooldown > 0.0 {
            self.shoot_cooldown -= dt;
        }
        if self.invulnerable > 0.0 {
            self.invulnerable -= dt;
        }
        self.asteroid_spawn_timer += dt;

        let asteroid_count = self
            .world
            .query::<Kind>()
            .iter()
            .filter(|(_, kind)| matches!(kind, Kind::Asteroid(_)))
            .count();
        if self.asteroid_spawn_timer >= self.config.asteroid_spawn_interval
            && asteroid_count < self.config.max_asteroids
        {
            self.spawn_asteroid(AsteroidSize::Large, None)?;
            self.asteroid_spawn_timer = 0.0;
        }

        if self.shoot_cooldown <= 0.0 {
            self.fire()?;
        }

        self.integrate(dt);
        self.expire_bullets(dt);

        // Transforms are final for the tick; place colliders and test pairs.
        self.collisions.step(&mut self.world, dt);
        for event in &self.collisions.drain_events() {
            self.handle_event(event)?;
            if self.game_over {
                break;
            }
        }
        Ok(())
    }

    pub fn run(mut self) -> Result<Summary> {
        let mut ticks = 0;
        while ticks < self.config.ticks && !self.is_over() {
            self.update()?;
            ticks += 1;
        }

        let summary = Summary {
            ticks,
            score: self.score,
            lives: self.lives,
            shots_fired: self.shots_fired,
            asteroids_destroyed: self.asteroids_destroyed,
        };
        log::info!(
            "Finished after {} ticks with {} colliders alive",
            ticks,
            self.world.query::<PolygonCollider>().len()
        );
        Ok(summary)
    }
}
