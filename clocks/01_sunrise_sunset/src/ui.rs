//! UI module for the Sunrise Sunset view
//!
//! Bottom control panel: readouts, host-side presets that drive the
//! programmatic setters, colour pickers and the cancel policy.

use nannou_egui::egui;
use sunrise_shared::{format_clock, BoundaryController, CancelPolicy, WallClock};

use crate::drawing::Palette;

const HOUR_MS: i64 = 3_600_000;
const MINUTE_MS: i64 = 60_000;

/// A sunrise/sunset pair the host can apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub sunrise_ms: i64,
    pub sunset_ms: i64,
}

pub const PRESETS: [Preset; 3] = [
    Preset {
        name: "Equinox",
        sunrise_ms: 6 * HOUR_MS,
        sunset_ms: 18 * HOUR_MS,
    },
    Preset {
        name: "Midsummer",
        sunrise_ms: 4 * HOUR_MS + 30 * MINUTE_MS,
        sunset_ms: 21 * HOUR_MS + 30 * MINUTE_MS,
    },
    Preset {
        name: "Midwinter",
        sunrise_ms: 8 * HOUR_MS + 30 * MINUTE_MS,
        sunset_ms: 15 * HOUR_MS + 30 * MINUTE_MS,
    },
];

/// Result of control panel interactions
#[derive(Default)]
pub struct ControlPanelResult {
    /// Apply a preset through the host setters
    pub apply_preset: Option<Preset>,
    /// Cancel policy toggled
    pub cancel_policy: Option<CancelPolicy>,
}

/// Draw the control panel (bottom)
pub fn draw_control_panel(
    ctx: &egui::Context,
    controller: &BoundaryController,
    wall_clock: &WallClock,
    zone_name: &str,
    palette: &mut Palette,
    animate_presets: &mut bool,
) -> ControlPanelResult {
    let mut result = ControlPanelResult::default();

    egui::TopBottomPanel::bottom("control_panel")
        .resizable(false)
        .min_height(100.0)
        .show(ctx, |ui| {
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                // Readouts
                ui.vertical(|ui| {
                    ui.heading("Today");
                    ui.label(
                        egui::RichText::new(wall_clock.format_time())
                            .size(20.0)
                            .color(egui::Color32::from_rgb(225, 228, 238)),
                    );
                    ui.label(
                        egui::RichText::new(format!("{} ({})", zone_name, wall_clock.tz_abbrev))
                            .size(12.0)
                            .color(egui::Color32::from_rgb(140, 148, 168)),
                    );
                    ui.label(format!(
                        "Sunrise {}  ·  Sunset {}",
                        format_clock(controller.day_start_millis()),
                        format_clock(controller.day_end_millis()),
                    ));
                });

                ui.separator();

                // Host presets
                ui.vertical(|ui| {
                    ui.heading("Presets");
                    ui.horizontal(|ui| {
                        for preset in PRESETS {
                            let hover = format!(
                                "{} – {}",
                                format_clock(preset.sunrise_ms),
                                format_clock(preset.sunset_ms)
                            );
                            if ui.button(preset.name).on_hover_text(hover).clicked() {
                                result.apply_preset = Some(preset);
                            }
                        }
                    });
                    ui.checkbox(animate_presets, "Animate")
                        .on_hover_text("Ease into presets instead of jumping");
                });

                ui.separator();

                // Colours
                ui.vertical(|ui| {
                    ui.heading("Colours");
                    ui.horizontal(|ui| {
                        ui.label("Sunrise");
                        ui.color_edit_button_srgb(&mut palette.sunrise);
                        ui.label("Sunset");
                        ui.color_edit_button_srgb(&mut palette.sunset);
                        ui.label("Future");
                        ui.color_edit_button_srgb(&mut palette.future);
                    });
                    ui.add(
                        egui::Slider::new(&mut palette.future_alpha, 0..=255)
                            .text("Future opacity"),
                    );
                });

                ui.separator();

                // Gesture behaviour
                ui.vertical(|ui| {
                    ui.heading("Gestures");
                    let mut revert = controller.cancel_policy() == CancelPolicy::Revert;
                    if ui
                        .checkbox(&mut revert, "Revert cancelled drags")
                        .on_hover_text("A cancelled drag restores the boundary instead of committing it")
                        .changed()
                    {
                        result.cancel_policy = Some(if revert {
                            CancelPolicy::Revert
                        } else {
                            CancelPolicy::Commit
                        });
                    }
                });
            });
        });

    result
}
