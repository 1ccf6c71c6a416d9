//! Wiedergabe-Engine
//!
//! Besitzt die eine Wiedergabe-Session des Geräts (es gibt nur einen
//! Audio-Ausgang) und kapselt die Audio-Pipeline. Alle Übergänge laufen
//! über [`transition`](crate::logic::transition).

use crate::logic::{Transition, transition};
use crate::traits::{AudioPipeline, PlayError};
use crate::types::{DeviceState, I2sRoute, SessionStatus, TrackRef};

/// Höchste Lautstärke-Stufe der Pipeline
pub const MAX_OUTPUT_LEVEL: u8 = 21;

/// Lautstärke beim Start
pub const DEFAULT_OUTPUT_LEVEL: u8 = 21;

/// Interner Zustand: PLAYING trägt die Session, alle anderen Zustände nicht
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Idle,
    Playing { track: TrackRef },
    UsbTransfer,
}

impl EngineState {
    fn device_state(self) -> DeviceState {
        match self {
            EngineState::Idle => DeviceState::Idle,
            EngineState::Playing { .. } => DeviceState::Playing,
            EngineState::UsbTransfer => DeviceState::UsbTransfer,
        }
    }
}

/// Die Wiedergabe-Engine
///
/// Wird genau einmal erstellt und vom
/// [`DeviceCoordinator`](crate::DeviceCoordinator) besessen. Keine Methode
/// blockiert, außer [`update`](Self::update), das begrenzte Streaming-Arbeit
/// erledigt.
pub struct PlaybackEngine<P> {
    pipeline: P,
    route: I2sRoute,
    state: EngineState,
    level: u8,
}

impl<P: AudioPipeline> PlaybackEngine<P> {
    /// Erstellt die Engine und konfiguriert Routing und Lautstärke der Pipeline
    pub fn new(mut pipeline: P, route: I2sRoute) -> Self {
        pipeline.set_route(&route);
        pipeline.set_output_level(DEFAULT_OUTPUT_LEVEL);
        info!("Audio initialized: {}", route);

        Self {
            pipeline,
            route,
            state: EngineState::Idle,
            level: DEFAULT_OUTPUT_LEVEL,
        }
    }

    /// Startet den Titel sofort (kein Queueing)
    ///
    /// Eine laufende Session wird durch `connect` ersetzt. Schlägt `connect`
    /// fehl, bleibt die Engine trotzdem in PLAYING: das nächste
    /// [`update`](Self::update) sieht dann eine Pipeline, die nicht streamt.
    pub fn play(&mut self, track: TrackRef) -> Result<(), PlayError> {
        if transition(self.current_state(), Transition::Play).is_none() {
            return Err(PlayError::UsbTransferActive);
        }

        if let Err(e) = self.pipeline.connect(track) {
            warn!("Could not open {}: {}", track, e);
        }
        self.state = EngineState::Playing { track };
        Ok(())
    }

    /// Stoppt die Wiedergabe, Zustand danach immer IDLE (auch aus dem USB-Modus)
    ///
    /// Der Stop-Aufruf an die Pipeline erfolgt immer, auch im Leerlauf, damit
    /// gepufferte Daten verworfen werden. Idempotent.
    pub fn stop(&mut self) {
        self.pipeline.disconnect_session();
        self.settle(transition(self.current_state(), Transition::Stop));
    }

    /// Einmal pro Zyklus aufrufen: pumpt Audio, nur in PLAYING
    pub fn update(&mut self) -> SessionStatus {
        if !self.is_active() {
            return SessionStatus::Inactive;
        }

        if let Err(e) = self.pipeline.pump() {
            warn!("Audio pump failed: {}", e);
        }

        if self.pipeline.is_streaming() {
            SessionStatus::Streaming
        } else {
            SessionStatus::Ended
        }
    }

    /// Wechselt in den USB-Modus, eine laufende Session wird beendet
    pub fn enter_usb_transfer(&mut self) {
        if self.is_active() {
            self.pipeline.disconnect_session();
        }
        self.settle(transition(self.current_state(), Transition::EnterUsbTransfer));
    }

    /// Verlässt den USB-Modus, `false` wenn die Engine nicht darin war
    pub fn exit_usb_transfer(&mut self) -> bool {
        match transition(self.current_state(), Transition::ExitUsbTransfer) {
            Some(next) => {
                self.settle(Some(next));
                true
            }
            None => false,
        }
    }

    pub fn current_state(&self) -> DeviceState {
        self.state.device_state()
    }

    /// `true` nur in PLAYING
    pub fn is_active(&self) -> bool {
        matches!(self.state, EngineState::Playing { .. })
    }

    /// Titel der aktiven Session
    pub fn current_track(&self) -> Option<TrackRef> {
        match self.state {
            EngineState::Playing { track } => Some(track),
            _ => None,
        }
    }

    pub fn route(&self) -> &I2sRoute {
        &self.route
    }

    /// Setzt die Lautstärke, begrenzt auf [`MAX_OUTPUT_LEVEL`]
    pub fn set_volume(&mut self, level: u8) {
        self.level = level.min(MAX_OUTPUT_LEVEL);
        self.pipeline.set_output_level(self.level);
    }

    pub fn volume(&self) -> u8 {
        self.level
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut P {
        &mut self.pipeline
    }

    /// Übernimmt einen Zustand ohne Session (Idle oder UsbTransfer)
    fn settle(&mut self, next: Option<DeviceState>) {
        match next {
            Some(DeviceState::Idle) => self.state = EngineState::Idle,
            Some(DeviceState::UsbTransfer) => self.state = EngineState::UsbTransfer,
            // PLAYING entsteht nur in play(), dort mit Session
            Some(DeviceState::Playing) | None => {}
        }
    }
}
