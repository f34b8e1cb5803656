//! HUD text lines

use aeb_control::{AebStatus, ObstacleType};

pub const WHITE: [u8; 3] = [255, 255, 255];
pub const YELLOW: [u8; 3] = [255, 255, 0];
pub const GREEN: [u8; 3] = [0, 255, 0];
pub const RED: [u8; 3] = [255, 0, 0];
pub const ORANGE: [u8; 3] = [255, 165, 0];
pub const CYAN: [u8; 3] = [0, 255, 255];

/// Values displayed on the HUD for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudMetrics {
    /// Ego speed (km/h)
    pub speed_kmh: f64,
    /// Distance to the lead vehicle (m)
    pub distance: f64,
    pub throttle: f64,
    pub brake: f64,
    /// Held time to collision (s)
    pub ttc: f64,
    pub collision: bool,
    pub aeb_status: AebStatus,
    pub fcw_active: bool,
    /// Obstacle ahead, `None` until classified
    pub obstacle: Option<ObstacleType>,
}

impl Default for HudMetrics {
    fn default() -> Self {
        Self {
            speed_kmh: 0.0,
            distance: 0.0,
            throttle: 0.0,
            brake: 0.0,
            ttc: f64::INFINITY,
            collision: false,
            aeb_status: AebStatus::Inactive,
            fcw_active: false,
            obstacle: None,
        }
    }
}

/// One rendered line and its RGB color
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudLine {
    pub text: String,
    pub color: [u8; 3],
}

impl HudLine {
    fn new(text: impl Into<String>, color: [u8; 3]) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

fn ttc_color(ttc: f64) -> [u8; 3] {
    if ttc < 2.0 {
        RED
    } else if ttc < 5.0 {
        YELLOW
    } else {
        GREEN
    }
}

/// Build the HUD lines, top to bottom
pub fn hud_lines(m: &HudMetrics) -> Vec<HudLine> {
    let obstacle = m.obstacle.map(|o| o.as_str()).unwrap_or("NONE");

    vec![
        HudLine::new("AEB SCENARIO 1 - VEHICLE-TO-VEHICLE", WHITE),
        HudLine::new("=".repeat(35), WHITE),
        HudLine::new(format!("SPEED: {:.1} km/h", m.speed_kmh), WHITE),
        HudLine::new(
            format!("DISTANCE: {:.1} m", m.distance),
            if m.distance < 10.0 { YELLOW } else { WHITE },
        ),
        HudLine::new(
            format!("THROTTLE: {:.2}", m.throttle),
            if m.throttle < 0.1 { GREEN } else { YELLOW },
        ),
        HudLine::new(
            format!("BRAKE: {:.2}", m.brake),
            if m.brake > 0.1 { RED } else { WHITE },
        ),
        HudLine::new(format!("TTC: {:.2} s", m.ttc), ttc_color(m.ttc)),
        HudLine::new(
            format!("AEB: {}", m.aeb_status),
            if m.aeb_status.is_active() { RED } else { GREEN },
        ),
        if m.fcw_active {
            HudLine::new("FCW: ACTIVE", ORANGE)
        } else {
            HudLine::new("FCW: INACTIVE", WHITE)
        },
        HudLine::new(format!("OBSTACLE: {obstacle}"), YELLOW),
        if m.collision {
            HudLine::new("STATUS: COLLISION!", RED)
        } else {
            HudLine::new("STATUS: MONITORING", GREEN)
        },
        HudLine::new("GRAPHS: REAL-TIME PLOTTING", CYAN),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_order_and_text() {
        let lines = hud_lines(&HudMetrics {
            speed_kmh: 36.04,
            distance: 23.456,
            throttle: 0.3,
            brake: 0.2,
            ttc: 3.14159,
            obstacle: Some(ObstacleType::Vehicle),
            ..Default::default()
        });
        let text: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            text,
            vec![
                "AEB SCENARIO 1 - VEHICLE-TO-VEHICLE",
                "===================================",
                "SPEED: 36.0 km/h",
                "DISTANCE: 23.5 m",
                "THROTTLE: 0.30",
                "BRAKE: 0.20",
                "TTC: 3.14 s",
                "AEB: INACTIVE",
                "FCW: INACTIVE",
                "OBSTACLE: VEHICLE",
                "STATUS: MONITORING",
                "GRAPHS: REAL-TIME PLOTTING",
            ]
        );
    }

    #[test]
    fn test_alert_colors() {
        let lines = hud_lines(&HudMetrics {
            distance: 4.0,
            throttle: 0.0,
            brake: 1.0,
            ttc: 1.5,
            collision: true,
            aeb_status: AebStatus::Active,
            fcw_active: true,
            ..Default::default()
        });
        assert_eq!(lines[3].color, YELLOW);
        assert_eq!(lines[4].color, GREEN);
        assert_eq!(lines[5].color, RED);
        assert_eq!(lines[6].color, RED);
        assert_eq!(lines[7].color, RED);
        assert_eq!(lines[8], HudLine::new("FCW: ACTIVE", ORANGE));
        assert_eq!(lines[10], HudLine::new("STATUS: COLLISION!", RED));
    }

    #[test]
    fn test_ttc_bands() {
        assert_eq!(ttc_color(1.99), RED);
        assert_eq!(ttc_color(2.0), YELLOW);
        assert_eq!(ttc_color(4.99), YELLOW);
        assert_eq!(ttc_color(5.0), GREEN);
        assert_eq!(ttc_color(f64::INFINITY), GREEN);
    }

    #[test]
    fn test_defaults_before_first_tick() {
        let lines = hud_lines(&HudMetrics::default());
        assert_eq!(lines[6].text, "TTC: inf s");
        assert_eq!(lines[9].text, "OBSTACLE: NONE");
        assert_eq!(lines[7].color, GREEN);
    }
}
