use invaders::compute::check_collision;
use invaders::entities::*;

// ── Entity ────────────────────────────────────────────────────────────────────

#[test]
fn entity_size_comes_from_sprite() {
    let ship = Entity::new(10, 20, SpriteType::Ship, Tint::Green);
    assert_eq!((ship.width(), ship.height()), (26, 16));
    let bullet = Entity::new(0, 0, SpriteType::Bullet, Tint::White);
    assert_eq!((bullet.width(), bullet.height()), (6, 10));
    let special = Entity::new(0, 0, SpriteType::EnemyShipSpecial, Tint::Red);
    assert_eq!((special.width(), special.height()), (32, 14));
}

#[test]
fn entity_size_survives_sprite_swap() {
    let mut e = Entity::new(0, 0, SpriteType::EnemyShipA1, Tint::White);
    e.sprite = SpriteType::Explosion;
    assert_eq!((e.width(), e.height()), (24, 16));
}

#[test]
fn entity_center_and_translate() {
    let mut e = Entity::new(20, 100, SpriteType::EnemyShipC1, Tint::White);
    assert_eq!((e.center_x(), e.center_y()), (32, 108));
    e.translate(-8, 20);
    assert_eq!((e.x, e.y), (12, 120));
}

// ── Bullets ───────────────────────────────────────────────────────────────────

#[test]
fn bullet_fired_from_is_centred() {
    let b = Bullet::fired_from(100, 50, 6, Direction::Up, BulletOwner::Player(PlayerSlot::One));
    assert_eq!(b.entity.x, 97);
    assert_eq!(b.entity.center_x(), 100);
    assert_eq!(b.entity.y, 50);
    assert_eq!(b.entity.sprite, SpriteType::Bullet);
}

#[test]
fn bullet_direction_sets_velocity_sign() {
    let mut up = Bullet::fired_from(0, 200, 6, Direction::Up, BulletOwner::Player(PlayerSlot::Two));
    let mut down = Bullet::fired_from(0, 200, 4, Direction::Down, BulletOwner::Enemy);
    assert_eq!(up.velocity(), -6);
    assert_eq!(down.velocity(), 4);
    up.advance();
    down.advance();
    assert_eq!(up.entity.y, 194);
    assert_eq!(down.entity.y, 204);
    assert_eq!(down.entity.sprite, SpriteType::EnemyBullet);
}

#[test]
fn bullet_owner_ids() {
    assert_eq!(BulletOwner::Enemy.id(), 0);
    assert_eq!(BulletOwner::Player(PlayerSlot::One).id(), 1);
    assert_eq!(BulletOwner::Player(PlayerSlot::Two).id(), 2);
    assert_eq!(PlayerSlot::Two.index(), 1);
}

// ── Collision ─────────────────────────────────────────────────────────────────

#[test]
fn collision_is_symmetric() {
    let member = Entity::new(100, 100, SpriteType::EnemyShipB1, Tint::White);
    for dx in (-40..=40).step_by(3) {
        for dy in (-30..=30).step_by(3) {
            let bullet = Entity::new(100 + dx, 100 + dy, SpriteType::Bullet, Tint::White);
            assert_eq!(
                check_collision(&bullet, &member),
                check_collision(&member, &bullet),
                "asymmetric at offset ({dx}, {dy})"
            );
        }
    }
}

#[test]
fn touching_edges_do_not_collide() {
    let a = Entity::new(0, 0, SpriteType::EnemyShipA1, Tint::White);
    let beside = Entity::new(24, 0, SpriteType::EnemyShipA1, Tint::White);
    let below = Entity::new(0, 16, SpriteType::EnemyShipA1, Tint::White);
    assert!(!check_collision(&a, &beside));
    assert!(!check_collision(&a, &below));

    let overlapping = Entity::new(23, 0, SpriteType::EnemyShipA1, Tint::White);
    assert!(check_collision(&a, &overlapping));
}

#[test]
fn bullet_inside_member_half_extents_collides() {
    // member centre (32, 108); bullet centre (40, 115): |dx| 8 < 15, |dy| 7 < 13
    let member = Entity::new(20, 100, SpriteType::EnemyShipC1, Tint::White);
    let bullet = Entity::new(37, 110, SpriteType::Bullet, Tint::White);
    assert!(check_collision(&bullet, &member));

    // |dx| 15 is not < 15
    let grazing = Entity::new(44, 103, SpriteType::Bullet, Tint::White);
    assert!(!check_collision(&grazing, &member));
}

// ── GameState ─────────────────────────────────────────────────────────────────

#[test]
fn game_state_next_level_keeps_progress() {
    let s = GameState::new(2, 450, 2, 30, 12);
    let next = s.next_level();
    assert_eq!(next, GameState::new(3, 450, 2, 30, 12));
    assert_eq!(s.level, 2);
}

#[test]
fn game_state_initial_and_accuracy() {
    let s = GameState::initial(3);
    assert_eq!(s, GameState::new(1, 0, 3, 0, 0));
    assert!(s.is_alive());
    assert_eq!(s.accuracy(), 0.0);
    assert_eq!(GameState::new(1, 0, 0, 20, 5).accuracy(), 25.0);
    assert!(!GameState::new(1, 0, 0, 20, 5).is_alive());
}
