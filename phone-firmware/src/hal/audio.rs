// Audio-Pipeline: WAV von der SD-Karte → I2S-Verstärker
//
// Pro Session läuft ein zirkulärer DMA-Transfer über AUDIO_DMA_SIZE Bytes.
// connect() startet ihn, disconnect_session() verwirft ihn (I2S stoppt).
// pump() füllt nur so viel nach, wie available() meldet, und wartet nie
// auf den DMA. Der Zyklus muss den Ring schneller füllen als er abläuft.

use defmt::{info, warn};
use embedded_sdmmc::RawFile;
use esp_hal::Blocking;
use esp_hal::i2s::master::{I2sTx, I2sWriteDmaTransfer};
use phone_core::{
    AudioError, AudioPipeline, I2sRoute, MAX_OUTPUT_LEVEL, TrackRef, apply_level,
    find_pcm16_data,
};

use crate::config::{AUDIO_BLOCK_SIZE, AUDIO_DMA_SIZE};
use crate::hal::sd_card::SdVolume;

/// Bytes am Dateianfang, in denen `fmt ` und `data` liegen müssen
const WAV_SCAN_LEN: usize = 512;

/// Ein Stereo-Frame: 2 Kanäle * 16 Bit
const FRAME_BYTES: usize = 4;

pub type AudioDmaBuffer = [u8; AUDIO_DMA_SIZE];

type AudioTransfer = I2sWriteDmaTransfer<'static, &'static mut AudioDmaBuffer>;

/// Offene Datei, Leseposition steht im data-Chunk
#[derive(Clone, Copy)]
struct Session {
    file: RawFile,
    /// Noch nicht gelesene Bytes des data-Chunks
    remaining: u32,
}

pub struct SdAudioPipeline<'a> {
    volume: &'a SdVolume,
    tx: &'static mut I2sTx<'static, Blocking>,
    buffer: &'static mut AudioDmaBuffer,
    transfer: Option<AudioTransfer>,
    session: Option<Session>,
    route: Option<I2sRoute>,
    level: u8,
}

impl<'a> SdAudioPipeline<'a> {
    /// `tx` ist bereits mit den Pins aus `config::I2S_ROUTE` gebaut
    pub fn new(
        volume: &'a SdVolume,
        tx: &'static mut I2sTx<'static, Blocking>,
        buffer: &'static mut AudioDmaBuffer,
    ) -> Self {
        Self {
            volume,
            tx,
            buffer,
            transfer: None,
            session: None,
            route: None,
            level: MAX_OUTPUT_LEVEL,
        }
    }

    pub fn route(&self) -> Option<&I2sRoute> {
        self.route.as_ref()
    }

    fn close_session(&mut self) {
        if let Some(session) = self.session.take() {
            self.volume.close(session.file);
        }
    }

    /// Öffnet den Titel und setzt die Leseposition auf den data-Chunk
    fn open_track(&self, track: TrackRef) -> Result<Session, AudioError> {
        let file = self.volume.open(track.as_str())?;

        let mut header = [0u8; WAV_SCAN_LEN];
        let data = match self.volume.read(file, &mut header) {
            Ok(read) => find_pcm16_data(&header[..read]),
            Err(e) => {
                self.volume.close(file);
                return Err(e);
            }
        };

        let Some(data) = data else {
            self.volume.close(file);
            return Err(AudioError::UnsupportedFormat);
        };

        if let Err(e) = self.volume.seek(file, data.offset) {
            self.volume.close(file);
            return Err(e);
        }

        info!("WAV data: offset={}, {} bytes", data.offset, data.len);
        Ok(Session {
            file,
            remaining: data.len,
        })
    }

    /// Startet einen neuen zirkulären Transfer, der Ring beginnt mit Stille
    fn start_output(&mut self) -> Result<(), AudioError> {
        self.stop_output();
        self.buffer.fill(0);

        // SAFETY: `tx` und `buffer` sind 'static. Solange der Transfer lebt,
        // werden sie nur über ihn benutzt. stop_output() verwirft ihn vor
        // jedem neuen Start.
        let (tx, buffer) = unsafe {
            (
                &mut *core::ptr::from_mut(self.tx),
                &mut *core::ptr::from_mut(self.buffer),
            )
        };

        let transfer = tx.write_dma_circular(buffer).map_err(|e| {
            warn!("I2S DMA start failed: {}", defmt::Debug2Format(&e));
            AudioError::Stream
        })?;
        self.transfer = Some(transfer);
        Ok(())
    }

    /// Verwirft den Transfer, Drop stoppt den I2S-Ausgang
    fn stop_output(&mut self) {
        self.transfer = None;
    }
}

impl AudioPipeline for SdAudioPipeline<'_> {
    fn set_route(&mut self, route: &I2sRoute) {
        // Pins sind beim Bau von I2sTx schon vergeben
        info!(
            "I2S route: BCLK={}, LRC={}, DOUT={}",
            route.bclk, route.lrc, route.dout
        );
        self.route = Some(*route);
    }

    fn connect(&mut self, track: TrackRef) -> Result<(), AudioError> {
        self.close_session();
        self.stop_output();

        let session = self.open_track(track)?;
        self.session = Some(session);
        if let Err(e) = self.start_output() {
            self.close_session();
            return Err(e);
        }
        Ok(())
    }

    fn disconnect_session(&mut self) {
        self.close_session();
        self.stop_output();
    }

    fn pump(&mut self) -> Result<(), AudioError> {
        let Some(session) = self.session else {
            return Ok(());
        };

        // Rest kleiner als ein Frame: Titel ist zu Ende
        if session.remaining < FRAME_BYTES as u32 {
            self.close_session();
            return Ok(());
        }

        let volume = self.volume;
        let level = self.level;
        let Some(transfer) = self.transfer.as_mut() else {
            return Err(AudioError::Stream);
        };

        let available = match transfer.available() {
            Ok(available) => available,
            Err(e) => {
                warn!("I2S DMA underrun: {}", defmt::Debug2Format(&e));
                self.start_output()?;
                return Err(AudioError::Stream);
            }
        };

        // Nur ganze Frames, höchstens ein Block pro Zyklus
        let want = available
            .min(AUDIO_BLOCK_SIZE)
            .min(session.remaining as usize);
        let want = want - want % FRAME_BYTES;
        if want == 0 {
            return Ok(());
        }

        // None: es wurde nichts gelesen (Ring-Segment kleiner als ein Frame)
        let mut read: Result<Option<usize>, AudioError> = Ok(None);
        let pushed = transfer.push_with(|buf| {
            let len = want.min(buf.len());
            let len = len - len % FRAME_BYTES;
            if len == 0 {
                return 0;
            }

            match volume.read(session.file, &mut buf[..len]) {
                Ok(n) => {
                    apply_level(&mut buf[..n], level);
                    // Angebrochenes Frame am Dateiende mit Stille auffüllen
                    let padded = n.next_multiple_of(FRAME_BYTES).min(len);
                    buf[n..padded].fill(0);
                    read = Ok(Some(n));
                    padded
                }
                Err(e) => {
                    read = Err(e);
                    0
                }
            }
        });

        match read {
            Ok(Some(0)) => {
                // Dateiende vor dem Ende des data-Chunks
                self.close_session();
                return Ok(());
            }
            Ok(Some(n)) => {
                if let Some(session) = self.session.as_mut() {
                    session.remaining = session.remaining.saturating_sub(n as u32);
                }
            }
            Ok(None) => {}
            Err(e) => {
                self.close_session();
                return Err(e);
            }
        }

        if let Err(e) = pushed {
            warn!("I2S DMA push failed: {}", defmt::Debug2Format(&e));
            self.start_output()?;
            return Err(AudioError::Stream);
        }
        Ok(())
    }

    fn is_streaming(&self) -> bool {
        self.session.is_some()
    }

    fn set_output_level(&mut self, level: u8) {
        self.level = level.min(MAX_OUTPUT_LEVEL);
    }
}
