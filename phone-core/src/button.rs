//! Entprellung eines einzelnen Tasters
//!
//! Wandelt verrauschte Roh-Pegel in genau eine bestätigte Flanke pro
//! stabilem Wechsel um. Keine Fehlerfälle: ein offener Pin wird einfach
//! normal entprellt.

use crate::types::{Edge, Level};

/// Mindestdauer in ms, die ein Roh-Pegel stabil sein muss
pub const DEBOUNCE_WINDOW_MS: u64 = 50;

/// Entprellter Taster (aktiv low, interner Pull-up)
#[derive(Debug, Clone, Copy)]
pub struct DebouncedButton {
    pin: u8,
    /// Bestätigter Pegel
    confirmed: Level,
    /// Zuletzt gelesener Roh-Pegel
    last_reading: Level,
    /// Zeitpunkt der letzten Roh-Änderung
    last_change_ms: u64,
}

impl DebouncedButton {
    /// Erstellt einen losgelassenen Taster für `pin`
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            confirmed: Level::High,
            last_reading: Level::High,
            last_change_ms: 0,
        }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn is_pressed(&self) -> bool {
        self.confirmed == Level::Low
    }

    /// Verarbeitet einen Roh-Pegel zum Zeitpunkt `now_ms`
    ///
    /// Eine Änderung des Roh-Pegels startet nur das Zeitfenster neu. Erst wenn
    /// der Pegel länger als [`DEBOUNCE_WINDOW_MS`] stabil ist und vom
    /// bestätigten Pegel abweicht, wird er übernommen und die Flanke gemeldet.
    pub fn poll(&mut self, reading: Level, now_ms: u64) -> Option<Edge> {
        if reading != self.last_reading {
            self.last_reading = reading;
            self.last_change_ms = now_ms;
        }

        let stable_for = now_ms.saturating_sub(self.last_change_ms);
        if stable_for > DEBOUNCE_WINDOW_MS && self.last_reading != self.confirmed {
            self.confirmed = self.last_reading;
            return Some(match self.confirmed {
                Level::Low => Edge::Pressed,
                Level::High => Edge::Released,
            });
        }

        None
    }
}
