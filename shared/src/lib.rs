//! Core of the sunrise/sunset day widget
//!
//! Animated day boundaries, the drag gesture state machine, and the geometry
//! a renderer paints each frame. Nothing here draws; a host forwards pointer
//! events in and paints the shapes that come out.

pub mod animated;
pub mod boundaries;
pub mod config;
pub mod day_fraction;
pub mod geometry;
pub mod time_engine;

pub use animated::AnimatedScalar;
pub use boundaries::{
    BoundaryChange, BoundaryController, BoundaryListener, CancelPolicy, DragState, FrameStatus,
    PointerEvent, PointerPhase, PointerResponse, DAY_END, DAY_START, TARGET_RANGE,
};
pub use config::{load_config, save_config, ConfigError};
pub use day_fraction::{format_clock, fraction_to_millis, millis_to_fraction, DAY_LENGTH_MS};
pub use geometry::{ClipCurve, CurveSegment, DayGeometry, Fill, FillRect, Point, Region, Span};
pub use time_engine::{compute_wall_clock, parse_timezone, system_timezone, WallClock};
