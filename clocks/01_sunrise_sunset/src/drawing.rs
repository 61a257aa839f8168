//! Drawing module for the Sunrise Sunset view
//!
//! Maps the widget's surface coordinates onto the nannou window and paints
//! the partition regions, hour ticks, boundary labels and toasts.

use nannou::prelude::*;
use sunrise_shared::{format_clock, BoundaryController, DayGeometry, DragState, Fill, Point};

/// Samples per quadratic segment when flattening the wave
const CURVE_SAMPLES: usize = 48;

/// Color palette for the view chrome
pub mod colors {
    use nannou::prelude::*;

    /// Window background
    pub const BACKGROUND: Srgb<u8> = Srgb {
        red: 18,
        green: 20,
        blue: 28,
        standard: std::marker::PhantomData,
    };

    /// Primary text
    pub const TEXT_PRIMARY: Srgb<u8> = Srgb {
        red: 225,
        green: 228,
        blue: 238,
        standard: std::marker::PhantomData,
    };

    /// Secondary text
    pub const TEXT_SECONDARY: Srgb<u8> = Srgb {
        red: 140,
        green: 148,
        blue: 168,
        standard: std::marker::PhantomData,
    };

    /// Hour ticks and the horizon line
    pub fn grid() -> Srgba<u8> {
        srgba(120, 128, 150, 90)
    }

    /// Outline of the boundary being dragged
    pub fn drag_marker() -> Srgba<u8> {
        srgba(255, 255, 255, 160)
    }
}

/// User-selectable fill colours
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub sunrise: [u8; 3],
    pub sunset: [u8; 3],
    pub future: [u8; 3],
    pub future_alpha: u8,
}

impl Palette {
    fn fill_color(&self, fill: Fill) -> Srgba<u8> {
        match fill {
            Fill::Sunrise => srgba(self.sunrise[0], self.sunrise[1], self.sunrise[2], 255),
            Fill::Sunset => srgba(self.sunset[0], self.sunset[1], self.sunset[2], 255),
            Fill::Future => srgba(
                self.future[0],
                self.future[1],
                self.future[2],
                self.future_alpha,
            ),
        }
    }
}

/// Placement of the widget surface inside the window
#[derive(Debug, Clone, Copy)]
pub struct WidgetLayout {
    /// Left edge of the surface (x coordinate)
    pub left: f32,
    /// Top edge of the surface (y coordinate)
    pub top: f32,
    /// Width of the surface
    pub width: f32,
    /// Height of the surface
    pub height: f32,
}

impl WidgetLayout {
    /// Calculate layout from window dimensions, leaving room for the bottom panel
    pub fn calculate(window_rect: Rect, panel_height: f32) -> Self {
        let margin = 40.0;
        let left = window_rect.left() + margin;
        let right = window_rect.right() - margin;
        let top = window_rect.top() - margin - 50.0; // Leave room for title
        let bottom = window_rect.bottom() + panel_height + margin + 30.0; // Hour labels

        Self {
            left,
            top,
            width: (right - left).max(0.0),
            height: (top - bottom).max(0.0),
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left
            && x <= self.left + self.width
            && y <= self.top
            && y >= self.top - self.height
    }

    /// Window x coordinate to surface x (measured from the left edge)
    pub fn to_surface_x(&self, x: f32) -> f32 {
        x - self.left
    }

    /// Surface point (y down) to window point (y up)
    pub fn to_window(&self, p: Point) -> Point2 {
        pt2(self.left + p.x, self.top - p.y)
    }

    fn bottom(&self) -> f32 {
        self.top - self.height
    }
}

/// Paint the partitioned widget
pub fn draw_widget(draw: &Draw, layout: &WidgetLayout, geometry: &DayGeometry, palette: &Palette) {
    for region in geometry.partition(CURVE_SAMPLES) {
        let points: Vec<Point2> = region.points.iter().map(|p| layout.to_window(*p)).collect();
        draw.polygon()
            .points(points)
            .color(palette.fill_color(region.fill));
    }

    // Horizon
    let y = layout.top - geometry.midline();
    draw.line()
        .start(pt2(layout.left, y))
        .end(pt2(layout.left + layout.width, y))
        .color(colors::grid())
        .weight(1.0);

    // Now
    let now_x = layout.left + geometry.split_x();
    draw.line()
        .start(pt2(now_x, layout.top))
        .end(pt2(now_x, layout.bottom()))
        .color(colors::grid())
        .weight(1.0);
}

/// Surface x of an instant in the day, pinned to the right edge after 23:00
pub fn day_fraction_to_x(fraction: f64, width: f32) -> f32 {
    let hour_width = width / 23.0;
    ((fraction * 24.0) as f32 * hour_width).clamp(0.0, width)
}

/// Dot on the horizon at the current minute
pub fn draw_now_marker(draw: &Draw, layout: &WidgetLayout, geometry: &DayGeometry, fraction: f64) {
    let x = layout.left + day_fraction_to_x(fraction, layout.width);
    let y = layout.top - geometry.midline();
    draw.ellipse()
        .x_y(x, y)
        .radius(4.0)
        .color(colors::TEXT_PRIMARY);
}

/// Hour ticks and labels under the surface
pub fn draw_hour_ticks(draw: &Draw, layout: &WidgetLayout) {
    let bottom = layout.bottom();
    let hour_width = layout.width / 23.0;

    for hour in 0..24u32 {
        let x = layout.left + hour as f32 * hour_width;
        let tick = if hour % 3 == 0 { 8.0 } else { 4.0 };
        draw.line()
            .start(pt2(x, bottom))
            .end(pt2(x, bottom - tick))
            .color(colors::grid())
            .weight(1.0);

        if hour % 3 == 0 {
            draw.text(&format!("{:02}", hour))
                .x_y(x, bottom - 20.0)
                .color(colors::TEXT_SECONDARY)
                .font_size(11)
                .w(40.0);
        }
    }
}

/// Sunrise and sunset labels where the wave crosses the horizon
pub fn draw_boundary_labels(
    draw: &Draw,
    layout: &WidgetLayout,
    geometry: &DayGeometry,
    controller: &BoundaryController,
) {
    let segments = geometry.curve().segments();
    let label_y = layout.top + 14.0;

    let sunrise_x = layout.left + segments[0].end.x;
    let sunset_x = layout.left + segments[1].end.x;

    let labels = [
        (sunrise_x, format!("↑ {}", format_clock(controller.day_start_millis()))),
        (sunset_x, format!("↓ {}", format_clock(controller.day_end_millis()))),
    ];

    for (x, text) in labels {
        if x < layout.left || x > layout.left + layout.width {
            continue;
        }
        draw.text(&text)
            .x_y(x, label_y)
            .color(colors::TEXT_PRIMARY)
            .font_size(12)
            .w(80.0);
    }

    // Outline the boundary under the pointer
    let dragged_x = match controller.drag_state() {
        DragState::DraggingStart { .. } => Some(sunrise_x),
        DragState::DraggingEnd { .. } => Some(sunset_x),
        DragState::Idle => None,
    };
    if let Some(x) = dragged_x {
        draw.line()
            .start(pt2(x, layout.top))
            .end(pt2(x, layout.bottom()))
            .color(colors::drag_marker())
            .weight(2.0);
    }
}

pub fn draw_toasts(draw: &Draw, window_rect: Rect, panel_height: f32, toasts: &[crate::Toast]) {
    let toast_width = 260.0;
    let toast_height = 36.0;
    let padding = 8.0;
    let start_y = window_rect.bottom() + panel_height + 70.0;

    for (i, toast) in toasts.iter().enumerate() {
        let y = start_y + (i as f32) * (toast_height + padding);
        let alpha = (toast.alpha() * 220.0) as u8;

        draw.rect()
            .x_y(0.0, y)
            .w_h(toast_width, toast_height)
            .color(srgba(40u8, 45u8, 55u8, alpha));

        let text_alpha = (toast.alpha() * 255.0) as u8;
        draw.text(&toast.message)
            .x_y(0.0, y)
            .color(srgba(220u8, 225u8, 235u8, text_alpha))
            .font_size(13)
            .w(toast_width - 20.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> WidgetLayout {
        WidgetLayout {
            left: -115.0,
            top: 50.0,
            width: 230.0,
            height: 100.0,
        }
    }

    #[test]
    fn test_surface_round_trip() {
        let layout = layout();
        let window = layout.to_window(Point::new(30.0, 20.0));
        assert_eq!(window, pt2(-85.0, 30.0));
        assert_eq!(layout.to_surface_x(window.x), 30.0);
    }

    #[test]
    fn test_contains() {
        let layout = layout();
        assert!(layout.contains(0.0, 0.0));
        assert!(layout.contains(-115.0, 50.0));
        assert!(!layout.contains(120.0, 0.0));
        assert!(!layout.contains(0.0, -60.0));
    }

    #[test]
    fn test_calculate_reserves_panel() {
        let window = Rect::from_w_h(1000.0, 600.0);
        let layout = WidgetLayout::calculate(window, 120.0);
        assert_eq!(layout.width, 920.0);
        assert!(layout.top - layout.height > window.bottom() + 120.0);
    }

    #[test]
    fn test_now_marker_position() {
        assert_eq!(day_fraction_to_x(0.0, 230.0), 0.0);
        assert!((day_fraction_to_x(0.5, 230.0) - 120.0).abs() < 1e-4);
        // 23:30 lies past the last hour width
        assert_eq!(day_fraction_to_x(23.5 / 24.0, 230.0), 230.0);
    }

    #[test]
    fn test_future_fill_uses_alpha() {
        let palette = Palette {
            sunrise: [1, 2, 3],
            sunset: [4, 5, 6],
            future: [7, 8, 9],
            future_alpha: 40,
        };
        assert_eq!(palette.fill_color(Fill::Future), srgba(7, 8, 9, 40));
        assert_eq!(palette.fill_color(Fill::Sunrise), srgba(1, 2, 3, 255));
    }
}
