use anyhow::Result;
use collide2d::{
    Collider, CollisionEvent, CollisionSystem, EntityId, PolygonCollider, Shapes, Transform,
    Vec2, World,
};

const DT: f32 = 1.0 / 60.0;

const PLAYER: u8 = 0;
const ENEMY: u8 = 1;
const PLAYER_SHOT: u8 = 2;

fn spawn(world: &mut World, position: Vec2, collider: PolygonCollider) -> EntityId {
    let e = world.spawn();
    world.insert(e, Transform::new(position));
    world.insert(e, collider);
    e
}

fn move_to(world: &mut World, entity: EntityId, position: Vec2) {
    if let Some(t) = world.get_mut::<Transform>(entity) {
        t.position = position;
    }
}

#[test]
fn shape_follows_transform_without_lag() -> Result<()> {
    let mut world = World::new();
    let e = spawn(
        &mut world,
        Vec2::ZERO,
        PolygonCollider::new(Shapes::centered_rectangle(1.0, 1.0)?),
    );
    let mut system = CollisionSystem::new();
    system.step(&mut world, DT);

    for i in 1..=20 {
        let target = Vec2::new(i as f32 * 0.37, -(i as f32) * 1.5);
        move_to(&mut world, e, target);
        system.step(&mut world, DT);

        let collider = world.get::<PolygonCollider>(e).expect("collider");
        assert_eq!(collider.shape().position(), target);
    }
    Ok(())
}

#[test]
fn child_collider_follows_parent() -> Result<()> {
    let mut world = World::new();
    let ship = world.spawn();
    world.insert(ship, Transform::new(Vec2::new(100.0, 50.0)));

    let turret = world.spawn();
    world.insert(turret, Transform::new(Vec2::new(0.0, -10.0)).with_parent(ship));
    world.insert(
        turret,
        PolygonCollider::new(Shapes::centered_rectangle(2.0, 2.0)?),
    );

    let mut system = CollisionSystem::new();
    system.step(&mut world, DT);
    move_to(&mut world, ship, Vec2::new(120.0, 50.0));
    system.step(&mut world, DT);

    let collider = world.get::<PolygonCollider>(turret).expect("collider");
    assert_eq!(collider.shape().position(), Vec2::new(120.0, 40.0));
    Ok(())
}

#[test]
fn projectile_hits_enemy_only_when_it_arrives() -> Result<()> {
    let mut world = World::new();
    let enemy = spawn(
        &mut world,
        Vec2::new(0.0, 10.0),
        PolygonCollider::new(Shapes::centered_rectangle(4.0, 4.0)?)
            .with_layers(&[ENEMY])?
            .with_mask(&[PLAYER])?,
    );
    let shot = spawn(
        &mut world,
        Vec2::ZERO,
        PolygonCollider::sensor(Shapes::axis_aligned_rectangle(-0.25, -0.5, 0.5, 1.0)?)
            .with_layers(&[PLAYER_SHOT])?
            .with_mask(&[ENEMY])?,
    );

    let mut system = CollisionSystem::new();
    let mut hit_at = None;
    for tick in 0..20 {
        move_to(&mut world, shot, Vec2::new(0.0, tick as f32));
        system.step(&mut world, DT);
        let events = system.drain_events();
        if let Some(event) = events.iter().find(|e| e.involves(shot)) {
            assert!(event.is_trigger());
            assert_eq!(event.other(shot), Some(enemy));
            hit_at = Some(tick);
            break;
        }
    }

    // Enemy spans y in [8, 12]; the shot's top edge reaches 8 at y = 7.5.
    assert_eq!(hit_at, Some(8));
    Ok(())
}

#[test]
fn gameplay_gates_with_the_filter_before_testing_geometry() -> Result<()> {
    let mut world = World::new();
    let player = spawn(
        &mut world,
        Vec2::ZERO,
        PolygonCollider::new(Shapes::centered_rectangle(1.0, 1.0)?).with_layers(&[PLAYER])?,
    );
    let friendly_shot = spawn(
        &mut world,
        Vec2::new(0.2, 0.0),
        PolygonCollider::sensor(Shapes::centered_rectangle(0.2, 0.2)?)
            .with_layers(&[PLAYER_SHOT])?
            .with_mask(&[ENEMY])?,
    );

    let system = CollisionSystem::new();
    system.sync(&mut world, DT);

    let a = world.get::<PolygonCollider>(player).expect("player");
    let b = world.get::<PolygonCollider>(friendly_shot).expect("shot");

    // The shapes overlap, but correct usage never asks the narrow phase.
    assert!(!a.can_collide_with(b));
    assert!(!b.can_collide_with(a));
    assert!(a.detect_collision(b).collision());

    assert!(system.detect(&world).is_empty());
    Ok(())
}

#[test]
fn despawned_entities_drop_out_of_detection() -> Result<()> {
    let mut world = World::new();
    let collider = || -> Result<PolygonCollider> {
        Ok(PolygonCollider::new(Shapes::circle(1.0)?)
            .with_layers(&[ENEMY])?
            .with_mask(&[ENEMY])?)
    };
    let a = spawn(&mut world, Vec2::ZERO, collider()?);
    let b = spawn(&mut world, Vec2::new(1.0, 0.0), collider()?);
    let c = spawn(&mut world, Vec2::new(-1.5, 0.0), collider()?);

    let mut system = CollisionSystem::new();
    system.step(&mut world, DT);
    let pairs: Vec<_> = system.drain_events().iter().map(CollisionEvent::entities).collect();
    assert_eq!(pairs, vec![(a, b), (a, c)]);

    world.despawn(a);
    system.step(&mut world, DT);
    assert!(system.drain_events().is_empty());
    assert!(!world.is_alive(a));
    Ok(())
}

#[test]
fn identical_worlds_produce_identical_events() -> Result<()> {
    fn build(seed: u64) -> Result<World> {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut world = World::new();
        for _ in 0..40 {
            let position = Vec2::new(rng.f32() * 20.0, rng.f32() * 20.0);
            let layer = rng.u8(0..4);
            let watch = rng.u8(0..4);
            let collider = PolygonCollider::with_passive(
                Shapes::regular_polygon(rng.u32(3..9), 0.5 + rng.f32())?,
                rng.bool(),
            )
            .with_layers(&[layer])?
            .with_mask(&[watch])?;
            spawn(&mut world, position, collider);
        }
        Ok(world)
    }

    let mut first = build(7)?;
    let mut second = build(7)?;
    let mut system = CollisionSystem::new();

    system.step(&mut first, DT);
    let a = system.drain_events();
    system.step(&mut second, DT);
    let b = system.drain_events();

    assert!(!a.is_empty());
    assert_eq!(a, b);
    for event in &a {
        let (x, y) = event.entities();
        assert!(x < y);
    }
    Ok(())
}
