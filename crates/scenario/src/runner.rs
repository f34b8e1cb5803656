//! Scenario Runner
//!
//! Owns every resource of one run: the simulator session, the controller
//! link, the data logger and the HUD. All exit paths (tick limit, Ctrl-C,
//! loop error, drop) converge on [`Scenario::teardown`].

use aeb_control::{AebController, Measurement, ObstacleType, TtcReading};
use hud::{HudMetrics, HudRenderer};
use sim_world::{ActorId, Color, SimError, Simulator, Transform, VehicleControl};
use std::time::Duration;
use telemetry_bridge::{BridgeError, BridgeListener, ControlResponse, TelemetryBridge};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use visualizer::DataLogger;

use crate::config::ScenarioConfig;
use crate::ScenarioError;

/// Lifetime of the lead vehicle debug box (seconds)
const DEBUG_BOX_LIFETIME_S: f64 = 0.1;

const MPS_TO_KMH: f64 = 3.6;

/// Why the loop ended without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Ctrl-C
    Interrupted,
    /// Configured tick limit reached
    TickLimit(u64),
}

/// The spawned vehicle pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vehicles {
    pub ego: ActorId,
    pub lead: ActorId,
}

/// What happened during one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub frame: u64,
    pub measurement: Measurement,
    pub ttc: TtcReading,
    /// Whether a controller response was applied this tick
    pub response: Option<ControlResponse>,
    pub ego_control: VehicleControl,
    /// True only on the tick the collision was first detected
    pub collision_detected: bool,
    pub aeb_active: bool,
}

/// One AEB car-to-car run
pub struct Scenario<S: Simulator> {
    config: ScenarioConfig,
    sim: S,
    controller: AebController,
    logger: DataLogger,
    hud: HudRenderer,
    bridge: Option<TelemetryBridge>,
    vehicles: Option<Vehicles>,
    obstacle: Option<ObstacleType>,
    ticks: u64,
    torn_down: bool,
}

impl<S: Simulator> Scenario<S> {
    pub fn new(config: ScenarioConfig, sim: S) -> Self {
        let controller = AebController::new(config.control.clone());
        let logger = DataLogger::new(config.visualizer.clone());
        let hud = HudRenderer::new(config.hud.clone());
        Self {
            config,
            sim,
            controller,
            logger,
            hud,
            bridge: None,
            vehicles: None,
            obstacle: None,
            ticks: 0,
            torn_down: false,
        }
    }

    /// Load the world, configure it and spawn both vehicles
    pub fn start(&mut self) -> Result<Vehicles, ScenarioError> {
        self.setup_world().map_err(|e| {
            error!("Scenario setup failed: {}", e);
            ScenarioError::Sim(e)
        })
    }

    fn setup_world(&mut self) -> Result<Vehicles, SimError> {
        let sim_config = &self.config.simulation;
        info!("Loading {}...", sim_config.town);
        self.sim.load_world(&sim_config.town)?;
        self.sim.apply_settings(sim_config.world)?;
        self.sim.set_weather(sim_config.weather);
        info!("Weather set: {:?}", sim_config.weather);

        let removed = self.sim.destroy_vehicles();
        debug!("Removed {} pre-existing vehicles", removed);

        let ego = self
            .sim
            .spawn_vehicle(&sim_config.ego.blueprint, sim_config.ego.transform)?;
        let lead = self
            .sim
            .spawn_vehicle(&sim_config.lead.blueprint, sim_config.lead.transform)?;

        let vehicles = Vehicles { ego, lead };
        self.vehicles = Some(vehicles);
        info!(
            "Scenario 1 ready: ego {} ({}), lead {} ({})",
            ego, sim_config.ego.blueprint, lead, sim_config.lead.blueprint
        );
        Ok(vehicles)
    }

    /// Hand over the controller connection
    pub fn attach_bridge(&mut self, bridge: TelemetryBridge) {
        info!("Controller link attached ({})", bridge.peer());
        self.bridge = Some(bridge);
    }

    /// Wait for the controller, then run until Ctrl-C, the tick limit or a
    /// fatal error. Teardown always runs before returning.
    pub async fn run(&mut self, listener: BridgeListener) -> Result<StopReason, ScenarioError> {
        let interrupted = async {
            if tokio::signal::ctrl_c().await.is_err() {
                warn!("Ctrl-C handler unavailable");
                std::future::pending::<()>().await;
            }
        };

        let result = tokio::select! {
            _ = interrupted => {
                info!("Stop requested by user");
                Ok(StopReason::Interrupted)
            }
            result = self.connect_and_drive(listener) => result,
        };

        match &result {
            Ok(reason) => info!("Scenario stopped: {:?}", reason),
            Err(e) => error!("Scenario loop failed: {}", e),
        }
        self.teardown();
        result
    }

    async fn connect_and_drive(
        &mut self,
        listener: BridgeListener,
    ) -> Result<StopReason, ScenarioError> {
        if let Ok(addr) = listener.local_addr() {
            info!("Waiting for controller on {}", addr);
        }
        let bridge = listener.accept().await?;
        self.attach_bridge(bridge);
        info!("=== SCENARIO 1 RUNNING ===");
        self.drive().await
    }

    /// Tick until the limit is reached or a tick fails
    pub async fn drive(&mut self) -> Result<StopReason, ScenarioError> {
        let mut pacing = self
            .config
            .simulation
            .frame_rate_hz
            .filter(|hz| hz.is_finite() && *hz > 0.0)
            .map(|hz| {
                let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / hz));
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                interval
            });

        loop {
            if let Some(limit) = self.config.simulation.max_ticks {
                if self.ticks >= limit {
                    return Ok(StopReason::TickLimit(limit));
                }
            }
            self.tick().await?;
            if let Some(interval) = pacing.as_mut() {
                interval.tick().await;
            }
        }
    }

    /// Run one control-loop iteration
    pub async fn tick(&mut self) -> Result<TickReport, ScenarioError> {
        let vehicles = self.vehicles.ok_or(ScenarioError::NotStarted)?;
        if self.bridge.is_none() {
            return Err(BridgeError::NotConnected.into());
        }

        let frame = self.sim.tick()?;

        let measurement = Measurement::read(&self.sim, vehicles.ego, vehicles.lead)?;
        self.obstacle = Some(ObstacleType::classify(&self.sim.type_id(vehicles.lead)?));
        let ttc = self.controller.observe(&measurement);

        let response = self.exchange(&measurement).await?;
        self.controller.apply_response(response);

        let lead_control = self.controller.lead_command();
        self.sim.apply_control(vehicles.lead, lead_control)?;
        let ego_control = self.controller.ego_command();
        self.sim.apply_control(vehicles.ego, ego_control)?;

        let collision_detected = self.controller.check_collision(measurement.distance);

        let state = self.controller.state();
        let aeb_active = state.aeb_status.is_active();
        self.logger.add_data(
            measurement.distance,
            ttc.held,
            measurement.ego_speed,
            measurement.front_speed,
            aeb_active,
        );

        self.hud.draw(&HudMetrics {
            speed_kmh: measurement.ego_speed * MPS_TO_KMH,
            distance: measurement.distance,
            throttle: ego_control.throttle,
            brake: ego_control.brake,
            ttc: ttc.held,
            collision: state.collision.occurred(),
            aeb_status: state.aeb_status,
            fcw_active: state.fcw_active,
            obstacle: self.obstacle,
        });

        self.sim
            .draw_bounding_box(vehicles.lead, Color::ORANGE, DEBUG_BOX_LIFETIME_S)?;
        let ego_transform = self.sim.transform(vehicles.ego)?;
        self.sim.set_spectator_transform(Transform::new(
            ego_transform.location + self.config.simulation.spectator_offset,
            self.config.simulation.spectator_rotation,
        ));

        self.ticks += 1;
        Ok(TickReport {
            frame,
            measurement,
            ttc,
            response,
            ego_control,
            collision_detected,
            aeb_active,
        })
    }

    /// Send this tick's sample and collect the answer. A non-fatal send
    /// error skips the receive; fatal link errors are returned.
    async fn exchange(
        &mut self,
        measurement: &Measurement,
    ) -> Result<Option<ControlResponse>, ScenarioError> {
        let bridge = self.bridge.as_mut().ok_or(BridgeError::NotConnected)?;
        match bridge.send_sample(&measurement.sample()).await {
            Ok(()) => Ok(bridge.receive_response().await?),
            Err(e) if e.is_fatal() => Err(e.into()),
            Err(e) => {
                warn!("Skipping controller exchange this tick: {}", e);
                Ok(None)
            }
        }
    }

    /// Release everything: save plots, close the link, remove the vehicles
    /// and write the last HUD frame. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        info!("Cleaning up resources...");

        let started = self.vehicles.take().is_some();
        if started {
            match self.logger.persist() {
                Ok([png, svg]) => debug!("Plots at {} and {}", png.display(), svg.display()),
                Err(e) => error!("Failed to save plots: {}", e),
            }
        }

        if let Some(bridge) = self.bridge.as_mut() {
            bridge.close();
        }

        // Also clears a vehicle left behind by a half-finished start
        let removed = self.sim.destroy_vehicles();
        info!("Destroyed {} vehicles", removed);

        if started {
            if let Some(path) = &self.config.hud.snapshot_path {
                if let Err(e) = self.hud.snapshot(path) {
                    warn!("Failed to write HUD snapshot: {}", e);
                }
            }
        }
        info!("Cleanup complete");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn vehicles(&self) -> Option<Vehicles> {
        self.vehicles
    }

    /// Completed ticks
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn obstacle(&self) -> Option<ObstacleType> {
        self.obstacle
    }

    pub fn controller(&self) -> &AebController {
        &self.controller
    }

    pub fn logger(&self) -> &DataLogger {
        &self.logger
    }

    pub fn hud(&self) -> &HudRenderer {
        &self.hud
    }

    pub fn bridge(&self) -> Option<&TelemetryBridge> {
        self.bridge.as_ref()
    }

    pub fn sim(&self) -> &S {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }
}

impl<S: Simulator> Drop for Scenario<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
