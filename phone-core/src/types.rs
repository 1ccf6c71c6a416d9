//! Core Types für das Telefon-Spielzeug
//!
//! Datenstrukturen ohne Hardware-Dependencies

use rgb::RGB8;

use crate::traits::PlayError;

/// Farbe eines Indikators: 8 Bit pro Kanal, kein Alpha, keine Gamma-Korrektur
pub type Color = RGB8;

/// Geräte-Zustand - einzige Quelle für die Status-Anzeige
///
/// Genau ein Wert ist zu jedem Zeitpunkt aktiv. Übergänge entstehen nur
/// durch Aktionen der [`PlaybackEngine`](crate::PlaybackEngine) (play/stop)
/// oder durch den expliziten Wechsel in den USB-Modus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    #[default]
    Idle,
    Playing,
    UsbTransfer,
}

/// Roher Pegel eines Eingangs
///
/// Taster hängen an internen Pull-ups: gedrückt = `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

/// Bestätigter Flankenwechsel eines Tasters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Pressed,
    Released,
}

/// Index eines Tasters (0..N-1), fest einem Pin zugeordnet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonId(pub usize);

impl ButtonId {
    /// Nummer wie sie auf dem Gehäuse steht (1-basiert)
    pub fn label(self) -> usize {
        self.0 + 1
    }
}

/// Referenz auf einen abspielbaren Titel (Pfad auf der SD-Karte)
///
/// Ob der Titel existiert wird erst beim Abspielen geprüft. Garantiert ist
/// nur, dass der Pfad nicht leer ist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackRef(&'static str);

impl TrackRef {
    /// Erstellt eine TrackRef, `None` bei leerem Pfad
    pub const fn new(path: &'static str) -> Option<Self> {
        if path.is_empty() {
            None
        } else {
            Some(Self(path))
        }
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl core::convert::TryFrom<&'static str> for TrackRef {
    type Error = PlayError;

    fn try_from(path: &'static str) -> Result<Self, Self::Error> {
        Self::new(path).ok_or(PlayError::EmptyTrack)
    }
}

/// I2S Pin-Routing für die Audio-Pipeline
///
/// Wird einmal beim Erstellen der Engine gesetzt und danach nicht mehr verändert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2sRoute {
    /// Bit clock (SCK)
    pub bclk: u8,
    /// Word select (WS)
    pub lrc: u8,
    /// Daten zum DAC
    pub dout: u8,
    /// Master clock, optional
    pub mclk: Option<u8>,
}

/// Feste Aktion eines Tasters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    /// Spielt einen festen Titel ab
    Play(TrackRef),
    /// Stoppt die Wiedergabe
    Stop,
    /// Taster wird gepollt, hat aber keine Funktion
    Unassigned,
}

/// Ergebnis von [`PlaybackEngine::update`](crate::PlaybackEngine::update)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionStatus {
    /// Keine Wiedergabe aktiv, update() war ein No-op
    Inactive,
    /// Pipeline liefert weiterhin Audio
    Streaming,
    /// Pipeline streamt nicht mehr (Titelende oder Fehler)
    Ended,
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for TrackRef {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for I2sRoute {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "I2sRoute {{ bclk: {}, lrc: {}, dout: {}, mclk: {} }}",
            self.bclk,
            self.lrc,
            self.dout,
            self.mclk
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ButtonAction {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ButtonAction::Play(track) => defmt::write!(fmt, "Play({})", track),
            ButtonAction::Stop => defmt::write!(fmt, "Stop"),
            ButtonAction::Unassigned => defmt::write!(fmt, "Unassigned"),
        }
    }
}
