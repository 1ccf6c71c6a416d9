//! Phone Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert die Traits für die Hardware-Kollaborateure (Audio, Speicher,
//! Farb-Ausgabe) und die komplette Koordinations-Logik des Telefon-Spielzeugs:
//! Entprellung, Wiedergabe-Zustandsmaschine, Status-Anzeige und den
//! Steuer-Zyklus.

#![no_std]

#[macro_use]
mod fmt;

pub mod button;
pub mod color;
pub mod coordinator;
pub mod indicator;
pub mod logic;
pub mod playback;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use button::{DEBOUNCE_WINDOW_MS, DebouncedButton};
pub use color::{ColorOutput, UniformColors};
pub use coordinator::{CycleReport, DeviceCoordinator};
pub use indicator::{IndicatorStyle, StatusIndicator};
pub use logic::{
    Dispatch, Transition, WavData, apply_level, breathing_level, dim, find_pcm16_data,
    resolve_press, transition,
};
pub use playback::{DEFAULT_OUTPUT_LEVEL, MAX_OUTPUT_LEVEL, PlaybackEngine};
pub use traits::{
    AudioError, AudioPipeline, ColorGenerator, ColorWriter, OutputError, PlayError, Storage,
};
pub use types::{
    ButtonAction, ButtonId, Color, DeviceState, Edge, I2sRoute, Level, SessionStatus, TrackRef,
};
