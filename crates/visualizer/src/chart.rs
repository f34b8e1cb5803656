//! Four-panel scenario chart

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::colors::full_palette::PURPLE;
use ring_buffer::MetricWindows;
use std::error::Error;
use std::ops::Range;
use std::path::Path;
use tracing::warn;

use crate::VisualizerError;

pub const FIGURE_TITLE: &str = "AEB Scenario 1 \u{2013} Real-time C2C Analysis";

// Sizes at 100 DPI; scaled by dpi / 100 when rendering
const FONT_SIZE_TITLE: f64 = 24.0;
const FONT_SIZE_CAPTION: f64 = 16.0;
const FONT_SIZE_AXIS: f64 = 12.0;
const FONT_SIZE_LEGEND: f64 = 12.0;
const LINE_WIDTH: f64 = 2.0;
const DASH_SEGMENTS: usize = 40;

/// One plotted line
#[derive(Debug, Clone)]
pub struct PanelSeries {
    pub data: Vec<(f64, f64)>,
    pub label: String,
    pub color: RGBColor,
    pub stroke_width: f64,
}

/// Horizontal dashed reference line
#[derive(Debug, Clone)]
pub struct Threshold {
    pub y: f64,
    pub label: String,
    pub color: RGBColor,
}

/// One subplot
#[derive(Debug, Clone)]
pub struct Panel {
    pub title: String,
    pub title_color: RGBColor,
    pub y_label: String,
    pub y_range: Range<f64>,
    pub series: Vec<PanelSeries>,
    pub threshold: Option<Threshold>,
    pub legend: bool,
}

/// Everything needed to draw the figure once
#[derive(Debug, Clone)]
pub struct ChartView {
    pub x_range: Range<f64>,
    pub panels: Vec<Panel>,
}

/// Widen `default` so every finite value fits, with 5% headroom
fn fit_range(default: Range<f64>, values: impl Iterator<Item = f64>) -> Range<f64> {
    let (mut lo, mut hi) = (default.start, default.end);
    let mut widened = false;
    for v in values.filter(|v| v.is_finite()) {
        if v < lo {
            lo = v;
            widened = true;
        }
        if v > hi {
            hi = v;
            widened = true;
        }
    }
    if widened {
        let pad = (hi - lo).abs().max(1e-6) * 0.05;
        lo -= pad;
        hi += pad;
    }
    lo..hi
}

/// Turn samples into a step trace that holds each value until the next sample
fn step_points(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(points.len() * 2);
    for (i, &(x, y)) in points.iter().enumerate() {
        if i > 0 {
            out.push((x, points[i - 1].1));
        }
        out.push((x, y));
    }
    out
}

impl ChartView {
    /// Build the view of the most recent `window_secs` seconds
    pub fn from_windows(windows: &MetricWindows, window_secs: f64) -> Self {
        let samples = windows.samples();
        let t_max = windows.latest_time().unwrap_or(0.0);
        let x_range = (t_max - window_secs).max(0.0)..t_max + 2.0;

        let visible: Vec<_> = samples
            .iter()
            .filter(|s| s.time >= x_range.start)
            .collect();
        let line = |f: fn(&ring_buffer::MetricSample) -> f64| -> Vec<(f64, f64)> {
            visible.iter().map(|s| (s.time, f(*s))).collect()
        };

        let distance = line(|s| s.distance);
        let ttc = line(|s| s.ttc);
        let ego = line(|s| s.ego_speed);
        let front = line(|s| s.front_speed);
        let aeb = step_points(&line(|s| s.aeb));

        let panels = vec![
            Panel {
                title: "C2C Distance".to_string(),
                title_color: BLUE,
                y_label: "Distance (m)".to_string(),
                y_range: fit_range(0.0..50.0, distance.iter().map(|p| p.1)),
                series: vec![PanelSeries {
                    data: distance,
                    label: "Distance".to_string(),
                    color: BLUE,
                    stroke_width: LINE_WIDTH,
                }],
                threshold: Some(Threshold {
                    y: 5.0,
                    label: "Danger threshold".to_string(),
                    color: RED,
                }),
                legend: true,
            },
            Panel {
                title: "Time to Collision (TTC)".to_string(),
                title_color: GREEN,
                y_label: "TTC (s)".to_string(),
                y_range: fit_range(0.0..10.0, ttc.iter().map(|p| p.1)),
                series: vec![PanelSeries {
                    data: ttc,
                    label: "TTC".to_string(),
                    color: GREEN,
                    stroke_width: LINE_WIDTH,
                }],
                threshold: Some(Threshold {
                    y: 2.0,
                    label: "Critical TTC".to_string(),
                    color: RED,
                }),
                legend: true,
            },
            Panel {
                title: "Vehicle Speeds".to_string(),
                title_color: PURPLE,
                y_label: "Speed (km/h)".to_string(),
                y_range: fit_range(
                    0.0..100.0,
                    ego.iter().chain(front.iter()).map(|p| p.1),
                ),
                series: vec![
                    PanelSeries {
                        data: ego,
                        label: "Ego Speed".to_string(),
                        color: RED,
                        stroke_width: LINE_WIDTH,
                    },
                    PanelSeries {
                        data: front,
                        label: "Front Speed".to_string(),
                        color: BLUE,
                        stroke_width: LINE_WIDTH,
                    },
                ],
                threshold: None,
                legend: true,
            },
            Panel {
                title: "AEB Status".to_string(),
                title_color: RED,
                y_label: "AEB Active".to_string(),
                y_range: -0.5..1.5,
                series: vec![PanelSeries {
                    data: aeb,
                    label: "AEB Active".to_string(),
                    color: BLACK,
                    stroke_width: LINE_WIDTH * 1.5,
                }],
                threshold: None,
                legend: false,
            },
        ];

        Self { x_range, panels }
    }
}

fn scaled(size: f64, scale: f64) -> u32 {
    (size * scale).round().max(1.0) as u32
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    x_range: &Range<f64>,
    x_desc: Option<&str>,
    scale: f64,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let caption_font = ("sans-serif", scaled(FONT_SIZE_CAPTION, scale))
        .into_font()
        .color(&panel.title_color);
    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, caption_font)
        .margin(scaled(5.0, scale))
        .x_label_area_size(scaled(if x_desc.is_some() { 40.0 } else { 25.0 }, scale))
        .y_label_area_size(scaled(55.0, scale))
        .build_cartesian_2d(x_range.clone(), panel.y_range.clone())?;

    let mut mesh = chart.configure_mesh();
    mesh.y_desc(panel.y_label.as_str())
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.15))
        .label_style(("sans-serif", scaled(FONT_SIZE_AXIS, scale)));
    if let Some(desc) = x_desc {
        mesh.x_desc(desc);
    }
    mesh.draw()?;

    if let Some(threshold) = &panel.threshold {
        let style = threshold.color.mix(0.7).stroke_width(scaled(1.5, scale));
        let span = x_range.end - x_range.start;
        let dash = span / (DASH_SEGMENTS as f64 * 2.0);
        for i in 0..DASH_SEGMENTS {
            let x0 = x_range.start + i as f64 * 2.0 * dash;
            let segment = chart.draw_series(LineSeries::new(
                vec![(x0, threshold.y), (x0 + dash, threshold.y)],
                style,
            ))?;
            if i == 0 {
                let legend_style = style;
                segment.label(threshold.label.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], legend_style)
                });
            }
        }
    }

    for s in &panel.series {
        let style = s.color.stroke_width(scaled(s.stroke_width, scale));
        let series = chart.draw_series(LineSeries::new(s.data.iter().copied(), style))?;
        if panel.legend {
            series
                .label(s.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }
    }

    if panel.legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", scaled(FONT_SIZE_LEGEND, scale)))
            .draw()?;
    }
    Ok(())
}

/// Draw the whole figure onto any plotters backend
pub fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    view: &ChartView,
    scale: f64,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let body = root.titled(
        FIGURE_TITLE,
        ("sans-serif", scaled(FONT_SIZE_TITLE, scale)).into_font().color(&BLACK),
    )?;
    let areas = body.split_evenly((view.panels.len().max(1), 1));
    let last = view.panels.len().saturating_sub(1);
    for (i, (panel, area)) in view.panels.iter().zip(areas.iter()).enumerate() {
        let x_desc = if i == last { Some("Time (s)") } else { None };
        draw_panel(area, panel, &view.x_range, x_desc, scale)?;
    }
    Ok(())
}

/// Draw the traces and thresholds only, with no text at all. Needs no font,
/// so it still works on hosts without a usable sans-serif face.
pub fn draw_unlabelled<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    view: &ChartView,
    scale: f64,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let areas = root.split_evenly((view.panels.len().max(1), 1));
    for (panel, area) in view.panels.iter().zip(areas.iter()) {
        let mut chart = ChartBuilder::on(area)
            .margin(scaled(10.0, scale))
            .build_cartesian_2d(view.x_range.clone(), panel.y_range.clone())?;

        if let Some(threshold) = &panel.threshold {
            let style = threshold.color.mix(0.7).stroke_width(scaled(1.5, scale));
            chart.draw_series(LineSeries::new(
                vec![(view.x_range.start, threshold.y), (view.x_range.end, threshold.y)],
                style,
            ))?;
        }
        for s in &panel.series {
            let style = s.color.stroke_width(scaled(s.stroke_width, scale));
            chart.draw_series(LineSeries::new(s.data.iter().copied(), style))?;
        }
    }
    Ok(())
}

fn render_err(e: Box<dyn Error>) -> VisualizerError {
    VisualizerError::Render(e.to_string())
}

/// Full figure, or the unlabelled one when text cannot be laid out
fn draw_or_fallback<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    view: &ChartView,
    scale: f64,
) -> Result<(), VisualizerError>
where
    DB::ErrorType: 'static,
{
    if let Err(e) = draw_figure(root, view, scale) {
        warn!("Chart text unavailable ({}), drawing without labels", e);
        draw_unlabelled(root, view, scale).map_err(render_err)?;
    }
    Ok(())
}

/// Render the figure to a PNG file
pub fn render_png(
    path: &Path,
    view: &ChartView,
    size: (u32, u32),
    scale: f64,
) -> Result<(), VisualizerError> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    draw_or_fallback(&root, view, scale)?;
    root.present()
        .map_err(|e| VisualizerError::Render(e.to_string()))
}

/// Render the figure to an SVG file
pub fn render_svg(
    path: &Path,
    view: &ChartView,
    size: (u32, u32),
    scale: f64,
) -> Result<(), VisualizerError> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    draw_or_fallback(&root, view, scale)?;
    root.present()
        .map_err(|e| VisualizerError::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring_buffer::MetricSample;

    fn windows_until(t_end: f64) -> MetricWindows {
        let mut windows = MetricWindows::new(2000);
        let mut t = 0.0;
        while t <= t_end {
            windows.push(MetricSample {
                time: t,
                distance: 46.0 - t,
                ttc: 10.0,
                ego_speed: 30.0,
                front_speed: 0.0,
                aeb: if t > 20.0 { 1.0 } else { 0.0 },
            });
            t += 0.5;
        }
        windows
    }

    #[test]
    fn test_window_slides() {
        let view = ChartView::from_windows(&windows_until(40.0), 30.0);
        assert_eq!(view.x_range, 10.0..42.0);
        assert!(view.panels[0].series[0]
            .data
            .iter()
            .all(|&(t, _)| t >= 10.0));
    }

    #[test]
    fn test_window_starts_at_zero() {
        let view = ChartView::from_windows(&windows_until(5.0), 30.0);
        assert_eq!(view.x_range, 0.0..7.0);
        assert_eq!(view.panels.len(), 4);
    }

    #[test]
    fn test_step_trace() {
        let steps = step_points(&[(0.0, 0.0), (1.0, 1.0), (2.0, 1.0)]);
        assert_eq!(
            steps,
            vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (2.0, 1.0), (2.0, 1.0)]
        );
    }

    #[test]
    fn test_unlabelled_figure_draws_traces() {
        let view = ChartView::from_windows(&windows_until(10.0), 30.0);
        let (w, h) = (200u32, 400u32);
        let mut buf = vec![0u8; (w * h * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
            draw_unlabelled(&root, &view, 1.0).unwrap();
            root.present().unwrap();
        }
        let white = buf.chunks(3).filter(|p| p == &[255, 255, 255]).count();
        assert!(white > 0);
        assert!(white < (w * h) as usize);
    }

    #[test]
    fn test_fit_range_widens_for_outliers() {
        assert_eq!(fit_range(0.0..50.0, [10.0, 20.0].into_iter()), 0.0..50.0);
        let r = fit_range(0.0..50.0, [-2.0, 60.0].into_iter());
        assert!(r.start < -2.0 && r.end > 60.0);
    }
}
