//! Sunrise Sunset
//!
//! A 24-hour band split into day and night lobes by a wave that crosses the
//! horizon at sunrise and sunset. Elapsed hours are coloured, the rest of
//! today is dimmed. Press near a boundary and drag to move it.

mod drawing;
mod ui;

use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};

use chrono_tz::Tz;
use log::{info, trace, warn};
use nannou::prelude::*;
use nannou::winit::event::{TouchPhase as WinitTouchPhase, WindowEvent};
use nannou_egui::{self, Egui};
use serde::{Deserialize, Serialize};
use sunrise_shared::{
    compute_wall_clock, format_clock, parse_timezone, system_timezone, BoundaryChange,
    BoundaryController, CancelPolicy, FrameStatus, PointerEvent, PointerPhase, WallClock,
};

use crate::drawing::{Palette, WidgetLayout};

const VIEW_NAME: &str = "sunrise_sunset";
const DEFAULT_TZ: &str = "America/Los_Angeles";
const CONTROL_PANEL_HEIGHT: f32 = 120.0;

/// Keep drawing at full rate for this long after the last input
const INPUT_GRACE: Duration = Duration::from_secs(2);

fn main() {
    env_logger::init();
    nannou::app(model).update(update).run();
}

/// Toast notification for committed changes and errors
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub created: Instant,
    pub duration_secs: f32,
}

impl Toast {
    pub fn new(message: String, duration_secs: f32) -> Self {
        Self {
            message,
            created: Instant::now(),
            duration_secs,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created.elapsed().as_secs_f32() > self.duration_secs
    }

    pub fn alpha(&self) -> f32 {
        let elapsed = self.created.elapsed().as_secs_f32();
        if elapsed > self.duration_secs - 0.5 {
            // Fade out in last 0.5s
            ((self.duration_secs - elapsed) / 0.5).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

/// Startup configuration. Boundaries moved by the user are not written back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct Config {
    zone_id: String,
    initial_sunrise_ms: i64,
    initial_sunset_ms: i64,
    sunrise_color: [u8; 3],
    sunset_color: [u8; 3],
    future_color: [u8; 3],
    future_alpha: u8,
    cancel_policy: CancelPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            zone_id: system_timezone()
                .map(|tz| tz.name().to_string())
                .unwrap_or_else(|| DEFAULT_TZ.to_string()),
            initial_sunrise_ms: 6 * 3_600_000,
            initial_sunset_ms: 18 * 3_600_000,
            sunrise_color: [255, 183, 77],
            sunset_color: [57, 73, 171],
            future_color: [200, 205, 215],
            future_alpha: 40,
            cancel_policy: CancelPolicy::Commit,
        }
    }
}

impl Config {
    fn palette(&self) -> Palette {
        Palette {
            sunrise: self.sunrise_color,
            sunset: self.sunset_color,
            future: self.future_color,
            future_alpha: self.future_alpha,
        }
    }
}

/// Application state
pub struct Model {
    /// Boundary animation and gesture state
    pub controller: BoundaryController,
    /// Changes committed by drags, fed by the controller's listener
    changes: Receiver<BoundaryChange>,

    /// Zone the current hour is read in
    pub zone: Tz,
    pub wall_clock: WallClock,

    pub palette: Palette,
    pub animate_presets: bool,

    /// Left button went down on the widget and has not been released
    pub mouse_dragging: bool,
    /// Touch currently driving the gesture; other fingers are ignored
    pub active_touch: Option<u64>,
    pub last_input: Instant,
    /// Whether frames are currently requested at full rate
    pub fast_frames: bool,

    pub toasts: Vec<Toast>,

    /// egui integration
    egui: Egui,
}

impl Model {
    pub fn show_toast(&mut self, message: String) {
        self.toasts.push(Toast::new(message, 2.5));
    }

    pub fn prune_toasts(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    /// Forward a pointer event in window coordinates to the controller
    fn forward_pointer(&mut self, app: &App, phase: PointerPhase, x: f32) {
        let layout = WidgetLayout::calculate(app.window_rect(), CONTROL_PANEL_HEIGHT);
        let event = PointerEvent::new(phase, layout.to_surface_x(x), layout.width);
        let response = self.controller.handle_pointer(event);
        if response.exclusive {
            trace!("Pointer {:?} claimed by the widget", phase);
        }

        // Grab feedback must not wait for the idle frame rate
        self.last_input = Instant::now();
        self.request_frames(app, true);
    }

    /// Level-triggered frame scheduling: full rate while anything moves
    fn request_frames(&mut self, app: &App, fast: bool) {
        if fast == self.fast_frames {
            return;
        }
        self.fast_frames = fast;
        if fast {
            app.set_loop_mode(LoopMode::RefreshSync);
        } else {
            // The hour still needs to advance while idle
            app.set_loop_mode(LoopMode::rate_fps(1.0));
        }
    }

    /// Drain committed changes delivered through the listener
    fn drain_changes(&mut self) {
        let changes: Vec<BoundaryChange> = self.changes.try_iter().collect();
        for change in changes {
            let message = match change {
                BoundaryChange::Sunrise(millis) => format!("Sunrise set to {}", format_clock(millis)),
                BoundaryChange::Sunset(millis) => format!("Sunset set to {}", format_clock(millis)),
            };
            info!("{}", message);
            self.show_toast(message);
        }
    }

    fn apply_preset(&mut self, preset: ui::Preset) {
        info!("Applying preset {}", preset.name);
        self.controller.set_day_start(preset.sunrise_ms, self.animate_presets);
        self.controller.set_day_end(preset.sunset_ms, self.animate_presets);
    }
}

fn load_or_seed_config() -> Config {
    match sunrise_shared::load_config::<Config>(VIEW_NAME) {
        Ok(Some(config)) => config,
        Ok(None) => {
            let config = Config::default();
            if let Err(e) = sunrise_shared::save_config(VIEW_NAME, &config) {
                warn!("Failed to write default config: {}", e);
            }
            config
        }
        Err(e) => {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }
    }
}

fn model(app: &App) -> Model {
    let window_id = app
        .new_window()
        .title("Sunrise Sunset")
        .size(1000, 520)
        .min_size(640, 400)
        .view(view)
        .key_pressed(key_pressed)
        .mouse_pressed(mouse_pressed)
        .mouse_released(mouse_released)
        .mouse_moved(mouse_moved)
        .raw_event(raw_window_event)
        .build()
        .unwrap();

    let window = app.window(window_id).unwrap();
    let egui = Egui::from_window(&window);

    let config = load_or_seed_config();

    let mut toasts = Vec::new();
    let zone = match parse_timezone(&config.zone_id) {
        Ok(tz) => tz,
        Err(e) => {
            warn!("{}", e);
            toasts.push(Toast::new(format!("{}. Using {}.", e, DEFAULT_TZ), 4.0));
            DEFAULT_TZ.parse().unwrap_or(chrono_tz::UTC)
        }
    };

    let (tx, changes) = channel();
    let mut controller = BoundaryController::new().with_cancel_policy(config.cancel_policy);
    controller.set_day_start(config.initial_sunrise_ms, false);
    controller.set_day_end(config.initial_sunset_ms, false);
    controller.set_listener(Box::new(tx));

    info!(
        "Starting with sunrise {} and sunset {} in {}",
        format_clock(controller.day_start_millis()),
        format_clock(controller.day_end_millis()),
        zone.name()
    );

    Model {
        controller,
        changes,
        zone,
        wall_clock: compute_wall_clock(zone),
        palette: config.palette(),
        animate_presets: true,
        mouse_dragging: false,
        active_touch: None,
        last_input: Instant::now(),
        fast_frames: true,
        toasts,
        egui,
    }
}

fn update(app: &App, model: &mut Model, update: Update) {
    // Advance both boundaries before anything reads them this frame
    let status = model.controller.tick();

    model.wall_clock = compute_wall_clock(model.zone);
    model.drain_changes();
    model.prune_toasts();

    model.egui.set_elapsed_time(update.since_start);
    let ctx = model.egui.begin_frame();
    let ui_result = ui::draw_control_panel(
        &ctx,
        &model.controller,
        &model.wall_clock,
        model.zone.name(),
        &mut model.palette,
        &mut model.animate_presets,
    );
    drop(ctx);

    if let Some(preset) = ui_result.apply_preset {
        model.apply_preset(preset);
    }
    if let Some(policy) = ui_result.cancel_policy {
        model.controller.set_cancel_policy(policy);
    }

    let busy = needs_fast_frames(status, &model.controller, &model.toasts, model.last_input);
    model.request_frames(app, busy);
}

/// Full frame rate while anything moves, a drag is held or input is recent
fn needs_fast_frames(
    status: FrameStatus,
    controller: &BoundaryController,
    toasts: &[Toast],
    last_input: Instant,
) -> bool {
    !status.is_settled()
        || !controller.is_settled()
        || controller.claims_exclusive_gesture()
        || !toasts.is_empty()
        || last_input.elapsed() < INPUT_GRACE
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let window_rect = app.window_rect();
    let layout = WidgetLayout::calculate(window_rect, CONTROL_PANEL_HEIGHT);

    draw.background().color(drawing::colors::BACKGROUND);

    let geometry =
        model
            .controller
            .compute_geometry(layout.width, layout.height, model.wall_clock.hour24);

    drawing::draw_widget(&draw, &layout, &geometry, &model.palette);
    drawing::draw_now_marker(&draw, &layout, &geometry, model.wall_clock.day_fraction());
    drawing::draw_hour_ticks(&draw, &layout);
    drawing::draw_boundary_labels(&draw, &layout, &geometry, &model.controller);

    draw.text("SUNRISE · SUNSET")
        .x_y(0.0, window_rect.top() - 25.0)
        .color(drawing::colors::TEXT_PRIMARY)
        .font_size(18)
        .w(300.0);

    drawing::draw_toasts(&draw, window_rect, CONTROL_PANEL_HEIGHT, &model.toasts);

    draw.to_frame(app, &frame).unwrap();
    model.egui.draw_to_frame(&frame).unwrap();
}

fn key_pressed(app: &App, model: &mut Model, key: Key) {
    model.last_input = Instant::now();
    model.request_frames(app, true);

    match key {
        // 1-3 - apply presets
        Key::Key1 => model.apply_preset(ui::PRESETS[0]),
        Key::Key2 => model.apply_preset(ui::PRESETS[1]),
        Key::Key3 => model.apply_preset(ui::PRESETS[2]),

        // Escape - abandon the current drag
        Key::Escape => {
            if model.controller.claims_exclusive_gesture() {
                let x = app.mouse.x;
                model.forward_pointer(app, PointerPhase::Cancel, x);
                model.mouse_dragging = false;
                model.active_touch = None;
            }
        }

        _ => {}
    }
}

fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    if button != MouseButton::Left || model.active_touch.is_some() {
        return;
    }

    let pos = app.mouse.position();
    let layout = WidgetLayout::calculate(app.window_rect(), CONTROL_PANEL_HEIGHT);
    if layout.contains(pos.x, pos.y) {
        model.mouse_dragging = true;
        model.forward_pointer(app, PointerPhase::Down, pos.x);
    }
}

fn mouse_released(app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left && model.mouse_dragging {
        model.mouse_dragging = false;
        let x = app.mouse.x;
        model.forward_pointer(app, PointerPhase::Up, x);
    }
}

fn mouse_moved(app: &App, model: &mut Model, pos: Point2) {
    if model.mouse_dragging {
        model.forward_pointer(app, PointerPhase::Move, pos.x);
    }
}

fn raw_window_event(app: &App, model: &mut Model, event: &WindowEvent) {
    model.egui.handle_raw_event(event);

    match event {
        WindowEvent::Focused(false) => {
            // Losing focus mid-drag cancels the gesture
            if model.mouse_dragging || model.active_touch.is_some() {
                let x = app.mouse.x;
                model.forward_pointer(app, PointerPhase::Cancel, x);
                model.mouse_dragging = false;
                model.active_touch = None;
            }
        }
        WindowEvent::Touch(touch) => {
            let window_rect = app.window_rect();
            let layout = WidgetLayout::calculate(window_rect, CONTROL_PANEL_HEIGHT);

            // Convert touch position to nannou coordinates
            let pos_x = touch.location.x as f32 - window_rect.w() / 2.0;
            let pos_y = window_rect.h() / 2.0 - touch.location.y as f32;

            match touch.phase {
                WinitTouchPhase::Started => {
                    if model.active_touch.is_none()
                        && !model.mouse_dragging
                        && layout.contains(pos_x, pos_y)
                    {
                        model.active_touch = Some(touch.id);
                        model.forward_pointer(app, PointerPhase::Down, pos_x);
                    }
                }
                WinitTouchPhase::Moved => {
                    if model.active_touch == Some(touch.id) {
                        model.forward_pointer(app, PointerPhase::Move, pos_x);
                    }
                }
                WinitTouchPhase::Ended => {
                    if model.active_touch == Some(touch.id) {
                        model.active_touch = None;
                        model.forward_pointer(app, PointerPhase::Up, pos_x);
                    }
                }
                WinitTouchPhase::Cancelled => {
                    if model.active_touch == Some(touch.id) {
                        model.active_touch = None;
                        model.forward_pointer(app, PointerPhase::Cancel, pos_x);
                    }
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_parse() {
        let config = Config::default();
        assert!(config.initial_sunrise_ms < config.initial_sunset_ms);
        assert_eq!(config.cancel_policy, CancelPolicy::Commit);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str("zone_id = \"Europe/Berlin\"\nfuture_alpha = 80\n").unwrap();
        assert_eq!(config.zone_id, "Europe/Berlin");
        assert_eq!(config.future_alpha, 80);
        assert_eq!(config.initial_sunrise_ms, 6 * 3_600_000);
    }

    #[test]
    fn test_cancel_policy_from_toml() {
        let config: Config = toml::from_str("cancel_policy = \"Revert\"\n").unwrap();
        assert_eq!(config.cancel_policy, CancelPolicy::Revert);
    }

    #[test]
    fn test_toast_fades_out() {
        let mut toast = Toast::new("Sunrise set to 06:00".to_string(), 2.5);
        assert_eq!(toast.alpha(), 1.0);
        assert!(!toast.is_expired());
        toast.created = Instant::now() - Duration::from_secs(3);
        assert!(toast.is_expired());
        assert_eq!(toast.alpha(), 0.0);
    }

    #[test]
    fn test_press_on_settled_widget_needs_fast_frames() {
        let mut controller = BoundaryController::new();
        let idle = Instant::now() - INPUT_GRACE * 2;
        let status = controller.tick();
        assert!(!needs_fast_frames(status, &controller, &[], idle));

        // A press moves nothing yet, but the held drag keeps frames coming
        let response = controller.handle_pointer(PointerEvent::new(PointerPhase::Down, 250.0, 1000.0));
        assert!(!response.redraw);
        let status = controller.tick();
        assert!(needs_fast_frames(status, &controller, &[], idle));
        assert!(needs_fast_frames(status, &controller, &[], Instant::now()));
    }
}
