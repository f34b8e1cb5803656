//! Kinematic World
//!
//! Lock-step point-mass simulator. Each vehicle moves along its heading;
//! throttle and brake map linearly onto the blueprint's acceleration and
//! deceleration limits, and speed never goes negative.

use tracing::{debug, info, warn};

use crate::{
    ActorId, Color, SimError, Simulator, Transform, Vector3, VehicleControl, WeatherParameters,
    WorldSettings,
};

/// Rolling resistance applied to every moving vehicle (m/s^2)
const ROLLING_RESISTANCE: f64 = 0.3;

/// Minimum spacing between spawn locations (m)
const SPAWN_CLEARANCE_M: f64 = 1.0;

/// Static description of a spawnable actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blueprint {
    /// Blueprint id (e.g. `vehicle.audi.tt`)
    pub id: &'static str,
    /// Bounding box half extents (m)
    pub extent: Vector3,
    /// Acceleration at full throttle (m/s^2)
    pub max_accel: f64,
    /// Deceleration at full brake (m/s^2)
    pub max_decel: f64,
}

/// Blueprint library
pub const BLUEPRINTS: &[Blueprint] = &[
    Blueprint {
        id: "vehicle.audi.tt",
        extent: Vector3 { x: 2.09, y: 0.99, z: 0.69 },
        max_accel: 5.0,
        max_decel: 9.0,
    },
    Blueprint {
        id: "vehicle.tesla.model3",
        extent: Vector3 { x: 2.40, y: 1.08, z: 0.74 },
        max_accel: 4.5,
        max_decel: 9.0,
    },
    Blueprint {
        id: "vehicle.bh.crossbike",
        extent: Vector3 { x: 0.74, y: 0.43, z: 0.54 },
        max_accel: 2.0,
        max_decel: 5.0,
    },
    Blueprint {
        id: "walker.pedestrian.0001",
        extent: Vector3 { x: 0.19, y: 0.19, z: 0.93 },
        max_accel: 1.5,
        max_decel: 3.0,
    },
];

fn find_blueprint(id: &str) -> Option<&'static Blueprint> {
    BLUEPRINTS.iter().find(|bp| bp.id == id)
}

#[derive(Debug, Clone)]
struct Actor {
    id: ActorId,
    blueprint: &'static Blueprint,
    transform: Transform,
    speed: f64,
    control: VehicleControl,
}

impl Actor {
    fn is_vehicle(&self) -> bool {
        self.blueprint.id.contains("vehicle")
    }

    fn step(&mut self, dt: f64) {
        let drag = if self.speed > 0.0 { ROLLING_RESISTANCE } else { 0.0 };
        let accel = self.control.throttle.clamp(0.0, 1.0) * self.blueprint.max_accel
            - self.control.brake.clamp(0.0, 1.0) * self.blueprint.max_decel
            - drag;
        self.speed = (self.speed + accel * dt).max(0.0);
        let forward = self.transform.rotation.forward();
        self.transform.location = self.transform.location + forward * (self.speed * dt);
    }
}

/// Point-mass lock-step simulator
pub struct KinematicWorld {
    map: Option<String>,
    settings: WorldSettings,
    weather: WeatherParameters,
    actors: Vec<Actor>,
    next_id: u32,
    frame: u64,
    elapsed: f64,
    spectator: Transform,
    debug_draws: u64,
}

impl KinematicWorld {
    /// Create an empty session with no world loaded
    pub fn new() -> Self {
        Self {
            map: None,
            settings: WorldSettings::default(),
            weather: WeatherParameters::default(),
            actors: Vec::new(),
            next_id: 1,
            frame: 0,
            elapsed: 0.0,
            spectator: Transform::default(),
            debug_draws: 0,
        }
    }

    /// Force the current speed of an actor along its heading
    pub fn set_speed(&mut self, actor: ActorId, speed: f64) -> Result<(), SimError> {
        let actor = self.actor_mut(actor)?;
        actor.speed = speed.max(0.0);
        Ok(())
    }

    /// Name of the loaded map
    pub fn map(&self) -> Option<&str> {
        self.map.as_deref()
    }

    /// Current frame number
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated seconds since the world was loaded
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Current world settings
    pub fn settings(&self) -> WorldSettings {
        self.settings
    }

    /// Current weather
    pub fn weather(&self) -> WeatherParameters {
        self.weather
    }

    /// Last spectator transform
    pub fn spectator(&self) -> Transform {
        self.spectator
    }

    /// Number of debug boxes drawn so far
    pub fn debug_draw_count(&self) -> u64 {
        self.debug_draws
    }

    /// Number of live actors
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    fn actor(&self, id: ActorId) -> Result<&Actor, SimError> {
        self.actors
            .iter()
            .find(|a| a.id == id)
            .ok_or(SimError::ActorNotFound(id))
    }

    fn actor_mut(&mut self, id: ActorId) -> Result<&mut Actor, SimError> {
        self.actors
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(SimError::ActorNotFound(id))
    }
}

impl Default for KinematicWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator for KinematicWorld {
    fn load_world(&mut self, map: &str) -> Result<(), SimError> {
        if map.trim().is_empty() {
            return Err(SimError::Session("empty map name".to_string()));
        }
        info!("Loading world {}", map);
        self.map = Some(map.to_string());
        self.actors.clear();
        self.frame = 0;
        self.elapsed = 0.0;
        Ok(())
    }

    fn apply_settings(&mut self, settings: WorldSettings) -> Result<(), SimError> {
        if !settings.fixed_delta_seconds.is_finite() || settings.fixed_delta_seconds <= 0.0 {
            return Err(SimError::InvalidSettings(format!(
                "fixed_delta_seconds must be positive, got {}",
                settings.fixed_delta_seconds
            )));
        }
        info!(
            "World settings: synchronous={} dt={}s",
            settings.synchronous_mode, settings.fixed_delta_seconds
        );
        self.settings = settings;
        Ok(())
    }

    fn set_weather(&mut self, weather: WeatherParameters) {
        debug!("Weather set: {:?}", weather);
        self.weather = weather;
    }

    fn destroy_vehicles(&mut self) -> usize {
        let before = self.actors.len();
        self.actors.retain(|a| !a.is_vehicle());
        before - self.actors.len()
    }

    fn spawn_vehicle(&mut self, blueprint: &str, transform: Transform) -> Result<ActorId, SimError> {
        if self.map.is_none() {
            return Err(SimError::Session("no world loaded".to_string()));
        }
        let bp = find_blueprint(blueprint)
            .ok_or_else(|| SimError::BlueprintNotFound(blueprint.to_string()))?;

        if let Some(other) = self
            .actors
            .iter()
            .find(|a| a.transform.location.distance(&transform.location) < SPAWN_CLEARANCE_M)
        {
            warn!("Spawn of {} collides with actor {}", blueprint, other.id);
            return Err(SimError::SpawnFailed {
                blueprint: blueprint.to_string(),
                reason: format!("location occupied by actor {}", other.id),
            });
        }

        let id = ActorId(self.next_id);
        self.next_id += 1;
        self.actors.push(Actor {
            id,
            blueprint: bp,
            transform,
            speed: 0.0,
            control: VehicleControl::default(),
        });
        info!("Spawned {} as actor {}", blueprint, id);
        Ok(id)
    }

    fn tick(&mut self) -> Result<u64, SimError> {
        if self.map.is_none() {
            return Err(SimError::Session("no world loaded".to_string()));
        }
        let dt = self.settings.fixed_delta_seconds;
        for actor in &mut self.actors {
            actor.step(dt);
        }
        self.frame += 1;
        self.elapsed += dt;
        Ok(self.frame)
    }

    fn velocity(&self, actor: ActorId) -> Result<Vector3, SimError> {
        let actor = self.actor(actor)?;
        Ok(actor.transform.rotation.forward() * actor.speed)
    }

    fn transform(&self, actor: ActorId) -> Result<Transform, SimError> {
        Ok(self.actor(actor)?.transform)
    }

    fn type_id(&self, actor: ActorId) -> Result<String, SimError> {
        Ok(self.actor(actor)?.blueprint.id.to_string())
    }

    fn apply_control(&mut self, actor: ActorId, control: VehicleControl) -> Result<(), SimError> {
        self.actor_mut(actor)?.control = control;
        Ok(())
    }

    fn set_spectator_transform(&mut self, transform: Transform) {
        self.spectator = transform;
    }

    fn draw_bounding_box(
        &mut self,
        actor: ActorId,
        color: Color,
        life_time: f64,
    ) -> Result<(), SimError> {
        let actor = self.actor(actor)?;
        let e = actor.blueprint.extent;
        let corners: Vec<Vector3> = [
            (-e.x, -e.y, -e.z),
            (e.x, -e.y, -e.z),
            (e.x, e.y, -e.z),
            (-e.x, e.y, -e.z),
            (-e.x, -e.y, e.z),
            (e.x, -e.y, e.z),
            (e.x, e.y, e.z),
            (-e.x, e.y, e.z),
        ]
        .iter()
        .map(|&(x, y, z)| actor.transform.transform_point(Vector3::new(x, y, z)))
        .collect();
        debug!(
            "Bounding box of {} ({:?}, {}s): {:?}",
            actor.id, color, life_time, corners
        );
        self.debug_draws += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{distance, speed, Rotation};
    use proptest::prelude::*;

    fn loaded_world() -> KinematicWorld {
        let mut world = KinematicWorld::new();
        world.load_world("Town03").unwrap();
        world
    }

    fn at(x: f64) -> Transform {
        Transform::new(Vector3::new(x, 7.8, 0.27), Rotation::default())
    }

    #[test]
    fn test_spawn_requires_world() {
        let mut world = KinematicWorld::new();
        assert!(matches!(
            world.spawn_vehicle("vehicle.audi.tt", at(0.0)),
            Err(SimError::Session(_))
        ));
    }

    #[test]
    fn test_unknown_blueprint() {
        let mut world = loaded_world();
        assert!(matches!(
            world.spawn_vehicle("vehicle.does.not_exist", at(0.0)),
            Err(SimError::BlueprintNotFound(_))
        ));
    }

    #[test]
    fn test_spawn_collision_rejected() {
        let mut world = loaded_world();
        world.spawn_vehicle("vehicle.audi.tt", at(10.0)).unwrap();
        assert!(matches!(
            world.spawn_vehicle("vehicle.tesla.model3", at(10.5)),
            Err(SimError::SpawnFailed { .. })
        ));
    }

    #[test]
    fn test_destroy_vehicles_keeps_walkers() {
        let mut world = loaded_world();
        world.spawn_vehicle("vehicle.audi.tt", at(0.0)).unwrap();
        world.spawn_vehicle("vehicle.tesla.model3", at(20.0)).unwrap();
        world.spawn_vehicle("walker.pedestrian.0001", at(40.0)).unwrap();

        assert_eq!(world.destroy_vehicles(), 2);
        assert_eq!(world.actor_count(), 1);
    }

    #[test]
    fn test_throttle_closes_distance() {
        let mut world = loaded_world();
        let ego = world.spawn_vehicle("vehicle.audi.tt", at(80.0)).unwrap();
        let lead = world.spawn_vehicle("vehicle.tesla.model3", at(126.0)).unwrap();
        world.apply_control(ego, VehicleControl::new(0.5, 0.0)).unwrap();
        world.apply_control(lead, VehicleControl::full_brake()).unwrap();

        let start = distance(&world, ego, lead).unwrap();
        for _ in 0..40 {
            world.tick().unwrap();
        }
        assert!(speed(&world, ego).unwrap() > 0.0);
        assert_eq!(speed(&world, lead).unwrap(), 0.0);
        assert!(distance(&world, ego, lead).unwrap() < start);
        assert_eq!(world.frame(), 40);
        assert!((world.elapsed() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_settings() {
        let mut world = loaded_world();
        let settings = WorldSettings {
            synchronous_mode: true,
            fixed_delta_seconds: 0.0,
        };
        assert!(world.apply_settings(settings).is_err());
    }

    #[test]
    fn test_bounding_box_drawn() {
        let mut world = loaded_world();
        let lead = world.spawn_vehicle("vehicle.tesla.model3", at(0.0)).unwrap();
        world.draw_bounding_box(lead, Color::ORANGE, 0.1).unwrap();
        assert_eq!(world.debug_draw_count(), 1);
        assert!(world.draw_bounding_box(ActorId(99), Color::GREEN, 0.1).is_err());
    }

    proptest! {
        #[test]
        fn braking_never_reverses(initial in 0.0f64..40.0, brake in 0.0f64..=1.0, ticks in 1usize..200) {
            let mut world = loaded_world();
            let car = world.spawn_vehicle("vehicle.audi.tt", at(0.0)).unwrap();
            world.set_speed(car, initial).unwrap();
            world.apply_control(car, VehicleControl::new(0.0, brake)).unwrap();

            let mut last_x = world.transform(car).unwrap().location.x;
            for _ in 0..ticks {
                world.tick().unwrap();
                let x = world.transform(car).unwrap().location.x;
                prop_assert!(x >= last_x);
                prop_assert!(speed(&world, car).unwrap() >= 0.0);
                last_x = x;
            }
        }
    }
}
