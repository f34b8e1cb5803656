//! Simulator Session
//!
//! The scenario talks to the vehicle simulator only through the
//! [`Simulator`] trait: world loading, lock-step ticking, actor spawning,
//! vehicle control, spectator placement and debug drawing.
//!
//! [`KinematicWorld`] is a point-mass implementation used for headless runs
//! and tests.

mod error;
mod types;
mod world;

pub use error::SimError;
pub use types::{
    ActorId, Color, Rotation, Transform, Vector3, VehicleControl, WeatherParameters,
    WorldSettings,
};
pub use world::{Blueprint, KinematicWorld, BLUEPRINTS};

/// A lock-step vehicle simulator session
pub trait Simulator {
    /// Load a map by name, dropping every actor of the previous world
    fn load_world(&mut self, map: &str) -> Result<(), SimError>;

    /// Apply world settings (synchronous mode, fixed timestep)
    fn apply_settings(&mut self, settings: WorldSettings) -> Result<(), SimError>;

    /// Set the weather for the current world
    fn set_weather(&mut self, weather: WeatherParameters);

    /// Destroy every vehicle actor, returning how many were removed
    fn destroy_vehicles(&mut self) -> usize;

    /// Spawn a vehicle from a blueprint id at a transform
    fn spawn_vehicle(&mut self, blueprint: &str, transform: Transform) -> Result<ActorId, SimError>;

    /// Advance the simulation by one fixed timestep, returning the frame number
    fn tick(&mut self) -> Result<u64, SimError>;

    /// Current velocity of an actor (m/s)
    fn velocity(&self, actor: ActorId) -> Result<Vector3, SimError>;

    /// Current transform of an actor
    fn transform(&self, actor: ActorId) -> Result<Transform, SimError>;

    /// Blueprint type id of an actor (e.g. `vehicle.audi.tt`)
    fn type_id(&self, actor: ActorId) -> Result<String, SimError>;

    /// Apply a throttle/brake command to a vehicle
    fn apply_control(&mut self, actor: ActorId, control: VehicleControl) -> Result<(), SimError>;

    /// Move the spectator camera
    fn set_spectator_transform(&mut self, transform: Transform);

    /// Draw the bounding box of an actor for `life_time` seconds
    fn draw_bounding_box(
        &mut self,
        actor: ActorId,
        color: Color,
        life_time: f64,
    ) -> Result<(), SimError>;
}

/// Speed of an actor (Euclidean norm of its velocity, m/s)
pub fn speed<S: Simulator + ?Sized>(sim: &S, actor: ActorId) -> Result<f64, SimError> {
    Ok(sim.velocity(actor)?.norm())
}

/// Distance between the locations of two actors (m)
pub fn distance<S: Simulator + ?Sized>(sim: &S, a: ActorId, b: ActorId) -> Result<f64, SimError> {
    let a = sim.transform(a)?.location;
    let b = sim.transform(b)?.location;
    Ok(a.distance(&b))
}
