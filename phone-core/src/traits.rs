//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für Hardware-Zugriff
//! ohne konkrete Implementierung.

use crate::types::{Color, I2sRoute, TrackRef};

/// Fehler-Typ für Farb-Ausgaben
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    WriteFailed,
}

/// Fehler der Audio-Pipeline
///
/// Werden nur geloggt: die Engine bleibt optimistisch im Zustand PLAYING,
/// bis die Pipeline selbst meldet dass sie nicht mehr streamt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioError {
    /// Titel existiert nicht auf dem Speicher
    TrackNotFound,
    /// Datei ist kein abspielbares Format
    UnsupportedFormat,
    /// Lesefehler oder Speicher nicht gemountet
    Storage,
    /// Fehler beim Übertragen an den I2S-Ausgang
    Stream,
}

/// Fehler für Wiedergabe-Anfragen, die die Zustandsmaschine ablehnt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayError {
    /// Leerer Titel-Pfad
    EmptyTrack,
    /// Im USB-Modus ist keine Wiedergabe erlaubt
    UsbTransferActive,
}

/// Trait für Farb-Ausgaben (PWM-LEDs oder SmartLED-Strip)
///
/// # Implementierungen
/// - **Production:** PwmRgbWriter (LEDC + MOSFETs), RmtLedWriter (WS2812 via RMT)
/// - **Testing:** MockWriter (in-memory Mock)
pub trait ColorWriter {
    /// Schreibt eine RGB-Farbe sofort auf die Hardware
    ///
    /// Das ist ein Seiteneffekt, kein Setter: jeder Aufruf erzeugt einen
    /// Hardware-Zugriff.
    ///
    /// # Fehlerbehandlung
    /// Gibt `OutputError::WriteFailed` zurück wenn Hardware-Zugriff fehlschlägt
    fn write(&mut self, color: Color) -> Result<(), OutputError>;
}

/// Zwei Ausgaben zeigen dieselbe Farbe
///
/// Beide werden immer beschrieben, der erste Fehler wird zurückgegeben.
impl<A: ColorWriter, B: ColorWriter> ColorWriter for (A, B) {
    fn write(&mut self, color: Color) -> Result<(), OutputError> {
        let first = self.0.write(color);
        let second = self.1.write(color);
        first.and(second)
    }
}

/// Trait für die Streaming-Audio-Pipeline (I2S + Decoder)
pub trait AudioPipeline {
    /// Setzt das I2S Pin-Routing
    fn set_route(&mut self, route: &I2sRoute);

    /// Öffnet eine neue Session für den Titel
    ///
    /// Eine laufende Session wird dabei implizit beendet.
    fn connect(&mut self, track: TrackRef) -> Result<(), AudioError>;

    /// Beendet die laufende Session und verwirft gepufferte Daten
    ///
    /// Muss auch ohne laufende Session sicher aufrufbar sein.
    fn disconnect_session(&mut self);

    /// Überträgt den nächsten Audio-Block (begrenzte Arbeit pro Aufruf)
    fn pump(&mut self) -> Result<(), AudioError>;

    /// `true` solange die Session Audio liefert
    fn is_streaming(&self) -> bool;

    /// Setzt die Ausgangs-Lautstärke (0..=MAX_OUTPUT_LEVEL)
    fn set_output_level(&mut self, level: u8);
}

/// Trait für den Datenspeicher (SD-Karte)
pub trait Storage {
    /// Versucht den Speicher einzubinden, nur beim Start aufgerufen
    fn mount(&mut self) -> bool;
}

/// Strategie für die zufälligen "Tanz"-Farben
pub trait ColorGenerator {
    fn next_color(&mut self) -> Color;
}
