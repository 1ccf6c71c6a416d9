//! Status-Anzeige: DeviceState → Farbe
//!
//! Unabhängig von der physischen Ausgabe. Zustand gibt es nur für die
//! Tanz-Farbe (einmal pro Kadenz neu) und das Fehler-Blinken.

use rgb::RGB8;

use crate::logic::breathing_level;
use crate::traits::ColorGenerator;
use crate::types::{Color, DeviceState};

/// Intervall in ms, in dem die Tanz-Farbe wechselt
pub const DANCE_CADENCE_MS: u64 = 100;

pub const OFF: Color = RGB8 { r: 0, g: 0, b: 0 };

/// Feste Farbe im USB-Modus
pub const USB_TRANSFER_COLOR: Color = RGB8 { r: 0, g: 0, b: 32 };

/// Wiedergabe-Farbe im Solid-Stil
pub const SOLID_PLAYING_COLOR: Color = RGB8 { r: 0, g: 32, b: 0 };

/// Fehler-Blinken: rot an, dann aus
pub const ERROR_COLOR: Color = RGB8 { r: 255, g: 0, b: 0 };
pub const ERROR_BLINK_ON_MS: u64 = 200;
pub const ERROR_BLINK_OFF_MS: u64 = 200;

/// Darstellungs-Stil der Anzeige
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndicatorStyle {
    /// Atmendes Blau im Leerlauf, Zufallsfarben bei Wiedergabe
    Animated,
    /// Eine feste Farbe pro Zustand (Leerlauf = aus)
    Solid,
}

pub struct StatusIndicator<G> {
    style: IndicatorStyle,
    generator: G,
    /// Zeitpunkt und Wert der aktuellen Tanz-Farbe
    dance: Option<(u64, Color)>,
    /// Start des laufenden Fehler-Blinkens
    error_since: Option<u64>,
}

impl<G: ColorGenerator> StatusIndicator<G> {
    pub fn new(style: IndicatorStyle, generator: G) -> Self {
        Self {
            style,
            generator,
            dance: None,
            error_since: None,
        }
    }

    pub fn style(&self) -> IndicatorStyle {
        self.style
    }

    /// Startet das Fehler-Blinken (neu), nicht-blockierend
    pub fn signal_error(&mut self, now_ms: u64) {
        self.error_since = Some(now_ms);
    }

    pub fn is_signaling_error(&self) -> bool {
        self.error_since.is_some()
    }

    /// Farbe für `state` zum Zeitpunkt `now_ms`
    ///
    /// Ein laufendes Fehler-Blinken überdeckt die Zustands-Farbe. Ein
    /// Zustandswechsel wirkt sofort, ohne Überblendung.
    pub fn render(&mut self, state: DeviceState, now_ms: u64) -> Color {
        if let Some(color) = self.error_overlay(now_ms) {
            return color;
        }

        if state != DeviceState::Playing {
            self.dance = None;
        }

        match (self.style, state) {
            (IndicatorStyle::Animated, DeviceState::Idle) => RGB8 {
                r: 0,
                g: 0,
                b: breathing_level(now_ms),
            },
            (IndicatorStyle::Animated, DeviceState::Playing) => self.dance_color(now_ms),
            (IndicatorStyle::Solid, DeviceState::Idle) => OFF,
            (IndicatorStyle::Solid, DeviceState::Playing) => SOLID_PLAYING_COLOR,
            (_, DeviceState::UsbTransfer) => USB_TRANSFER_COLOR,
        }
    }

    /// Zufallsfarbe, höchstens einmal pro [`DANCE_CADENCE_MS`] neu
    fn dance_color(&mut self, now_ms: u64) -> Color {
        match self.dance {
            Some((since, color)) if now_ms.saturating_sub(since) < DANCE_CADENCE_MS => color,
            _ => {
                let color = self.generator.next_color();
                self.dance = Some((now_ms, color));
                color
            }
        }
    }

    fn error_overlay(&mut self, now_ms: u64) -> Option<Color> {
        let since = self.error_since?;
        let elapsed = now_ms.saturating_sub(since);

        if elapsed < ERROR_BLINK_ON_MS {
            Some(ERROR_COLOR)
        } else if elapsed < ERROR_BLINK_ON_MS + ERROR_BLINK_OFF_MS {
            Some(OFF)
        } else {
            self.error_since = None;
            None
        }
    }
}
