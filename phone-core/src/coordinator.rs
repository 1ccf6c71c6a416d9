//! Geräte-Koordinator: der Steuer-Zyklus
//!
//! Besitzt Taster, Wiedergabe-Engine, Anzeige und Farb-Ausgabe. Pro Zyklus
//! in fester Reihenfolge:
//!
//! 1. alle Taster pollen, pro Druck-Flanke höchstens eine Aktion (Index-Reihenfolge)
//! 2. `PlaybackEngine::update()` - immer
//! 3. Anzeige-Farbe aus dem aktuellen Zustand rendern und ausgeben
//!
//! Damit zeigt die Anzeige am Ende eines Zyklus bereits den Zustand nach
//! den Aktionen desselben Zyklus (höchstens ein Zyklus Latenz).

use crate::button::DebouncedButton;
use crate::color::ColorOutput;
use crate::indicator::StatusIndicator;
use crate::logic::{Dispatch, resolve_press};
use crate::playback::PlaybackEngine;
use crate::traits::{AudioPipeline, ColorGenerator, ColorWriter, Storage};
use crate::types::{ButtonAction, ButtonId, Color, DeviceState, Edge, Level, SessionStatus};

/// Was in einem Zyklus passiert ist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Zustand am Ende des Zyklus
    pub state: DeviceState,
    /// Gerenderte Anzeige-Farbe
    pub color: Color,
    /// Anzahl bestätigter Druck-Flanken
    pub presses: usize,
    /// Ergebnis des Audio-Updates
    pub session: SessionStatus,
}

pub struct DeviceCoordinator<P, W, G, const N: usize> {
    buttons: [DebouncedButton; N],
    actions: [ButtonAction; N],
    engine: PlaybackEngine<P>,
    indicator: StatusIndicator<G>,
    output: ColorOutput<W>,
    storage_available: bool,
}

impl<P, W, G, const N: usize> DeviceCoordinator<P, W, G, N>
where
    P: AudioPipeline,
    W: ColorWriter,
    G: ColorGenerator,
{
    /// Erstellt den Koordinator und bindet den Speicher ein
    ///
    /// `mount()` wird genau hier einmal aufgerufen, das Ergebnis gilt bis
    /// zum nächsten Neustart.
    pub fn new<S: Storage>(
        pins: [u8; N],
        actions: [ButtonAction; N],
        engine: PlaybackEngine<P>,
        indicator: StatusIndicator<G>,
        output: ColorOutput<W>,
        storage: &mut S,
    ) -> Self {
        let storage_available = storage.mount();
        if storage_available {
            info!("Initializing SD card... OK.");
        } else {
            error!("Initializing SD card... FAILED! Make sure SD card is inserted and wired correctly.");
        }

        Self {
            buttons: pins.map(DebouncedButton::new),
            actions,
            engine,
            indicator,
            output,
            storage_available,
        }
    }

    /// Führt einen Steuer-Zyklus aus
    ///
    /// `levels[i]` ist der Roh-Pegel von Taster `i` zu Zeitpunkt `now_ms`.
    pub fn run_cycle(&mut self, now_ms: u64, levels: &[Level; N]) -> CycleReport {
        // (1) Taster
        let mut presses = 0;
        for (index, level) in levels.iter().enumerate() {
            let id = ButtonId(index);
            match self.buttons[index].poll(*level, now_ms) {
                Some(Edge::Pressed) => {
                    info!(
                        "Button {} pressed (GPIO {})",
                        id.label(),
                        self.buttons[index].pin()
                    );
                    presses += 1;
                    self.dispatch(id, now_ms);
                }
                Some(Edge::Released) => {
                    info!("Button {} released", id.label());
                }
                None => {}
            }
        }

        // (2) Audio
        let session = self.engine.update();
        if session == SessionStatus::Ended {
            info!("Playback finished");
            self.engine.stop();
        }

        // (3) Anzeige
        let state = self.engine.current_state();
        let color = self.indicator.render(state, now_ms);
        if let Err(e) = self.output.set_color(color) {
            error!("Failed to write indicator color: {}", e);
        }

        CycleReport {
            state,
            color,
            presses,
            session,
        }
    }

    fn dispatch(&mut self, id: ButtonId, now_ms: u64) {
        match resolve_press(self.actions[id.0], self.storage_available) {
            Dispatch::Play(track) => {
                info!("-> Playing {}", track);
                if let Err(e) = self.engine.play(track) {
                    warn!("Play rejected: {}", e);
                }
            }
            Dispatch::Stop => {
                info!("-> Stop");
                self.engine.stop();
            }
            Dispatch::StorageError => {
                error!("Error: No SD Card found. Cannot play music.");
                self.indicator.signal_error(now_ms);
            }
            Dispatch::Ignore => {}
        }
    }

    /// Externer Modus-Wechsel in den USB-Transfer
    pub fn enter_usb_transfer(&mut self) {
        info!("Entering USB transfer mode");
        self.engine.enter_usb_transfer();
    }

    pub fn exit_usb_transfer(&mut self) -> bool {
        info!("Leaving USB transfer mode");
        self.engine.exit_usb_transfer()
    }

    pub fn state(&self) -> DeviceState {
        self.engine.current_state()
    }

    pub fn storage_available(&self) -> bool {
        self.storage_available
    }

    pub fn button(&self, id: ButtonId) -> Option<&DebouncedButton> {
        self.buttons.get(id.0)
    }

    pub fn engine(&self) -> &PlaybackEngine<P> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PlaybackEngine<P> {
        &mut self.engine
    }

    pub fn indicator(&self) -> &StatusIndicator<G> {
        &self.indicator
    }

    pub fn output(&self) -> &ColorOutput<W> {
        &self.output
    }
}
