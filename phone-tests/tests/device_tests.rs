//! Integration Tests für die Geräte-Koordination
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen Mock-Implementierungen
//! für Audio-Pipeline, Speicher und Farb-Ausgabe.

use phone_core::indicator::{ERROR_COLOR, OFF, USB_TRANSFER_COLOR};
use phone_core::logic::BREATH_PERIOD_MS;
use phone_core::{
    AudioError, AudioPipeline, ButtonAction, ButtonId, Color, ColorGenerator, ColorOutput,
    ColorWriter, DeviceCoordinator, DeviceState, Edge, I2sRoute, IndicatorStyle, Level,
    OutputError, PlaybackEngine, SessionStatus, StatusIndicator, Storage, TrackRef,
    UniformColors,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rgb::RGB8;

// ============================================================================
// Mocks
// ============================================================================

#[derive(Default)]
pub struct MockPipeline {
    pub route: Option<I2sRoute>,
    pub connects: Vec<&'static str>,
    pub disconnects: usize,
    pub pumps: usize,
    pub session: Option<&'static str>,
    pub level: Option<u8>,
    /// Simuliere einen nicht existierenden Titel beim nächsten connect()
    pub fail_next_connect: bool,
}

impl MockPipeline {
    /// Simuliert das Ende des Titels
    pub fn finish_track(&mut self) {
        self.session = None;
    }
}

impl AudioPipeline for MockPipeline {
    fn set_route(&mut self, route: &I2sRoute) {
        self.route = Some(*route);
    }

    fn connect(&mut self, track: TrackRef) -> Result<(), AudioError> {
        self.connects.push(track.as_str());
        if self.fail_next_connect {
            self.fail_next_connect = false;
            self.session = None;
            return Err(AudioError::TrackNotFound);
        }
        self.session = Some(track.as_str());
        Ok(())
    }

    fn disconnect_session(&mut self) {
        self.disconnects += 1;
        self.session = None;
    }

    fn pump(&mut self) -> Result<(), AudioError> {
        self.pumps += 1;
        Ok(())
    }

    fn is_streaming(&self) -> bool {
        self.session.is_some()
    }

    fn set_output_level(&mut self, level: u8) {
        self.level = Some(level);
    }
}

#[derive(Default)]
pub struct MockWriter {
    pub colors: Vec<Color>,
    pub fail_next_write: bool,
}

impl ColorWriter for MockWriter {
    fn write(&mut self, color: Color) -> Result<(), OutputError> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(OutputError::WriteFailed);
        }
        self.colors.push(color);
        Ok(())
    }
}

pub struct MockStorage {
    pub available: bool,
    pub mounts: usize,
}

impl MockStorage {
    pub fn new(available: bool) -> Self {
        Self {
            available,
            mounts: 0,
        }
    }
}

impl Storage for MockStorage {
    fn mount(&mut self) -> bool {
        self.mounts += 1;
        self.available
    }
}

/// Deterministische "Zufalls"-Farben: 1, 2, 3, ... im Grün-Kanal
#[derive(Default)]
pub struct SequenceColors(u8);

impl ColorGenerator for SequenceColors {
    fn next_color(&mut self) -> Color {
        self.0 = self.0.wrapping_add(1);
        RGB8 {
            r: 1,
            g: self.0,
            b: 1,
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

const BUTTONS: usize = 9;
const PINS: [u8; BUTTONS] = [0, 1, 2, 3, 4, 5, 6, 7, 9];
const ROUTE: I2sRoute = I2sRoute {
    bclk: 19,
    lrc: 20,
    dout: 21,
    mclk: None,
};
const TRACK_A: &str = "/file1.mp3";
const CYCLE_MS: u64 = 5;

type Coordinator<G> = DeviceCoordinator<MockPipeline, MockWriter, G, BUTTONS>;

fn actions() -> [ButtonAction; BUTTONS] {
    let mut actions = [ButtonAction::Unassigned; BUTTONS];
    actions[0] = ButtonAction::Play(TrackRef::new(TRACK_A).unwrap());
    actions[1] = ButtonAction::Stop;
    actions
}

fn coordinator_with<G: ColorGenerator>(storage: &mut MockStorage, colors: G) -> Coordinator<G> {
    DeviceCoordinator::new(
        PINS,
        actions(),
        PlaybackEngine::new(MockPipeline::default(), ROUTE),
        StatusIndicator::new(IndicatorStyle::Animated, colors),
        ColorOutput::new(MockWriter::default()),
        storage,
    )
}

fn coordinator(storage_available: bool) -> Coordinator<SequenceColors> {
    coordinator_with(
        &mut MockStorage::new(storage_available),
        SequenceColors::default(),
    )
}

fn levels_with(pressed: Option<usize>) -> [Level; BUTTONS] {
    let mut levels = [Level::High; BUTTONS];
    if let Some(index) = pressed {
        levels[index] = Level::Low;
    }
    levels
}

/// Drückt `button` ab `start_ms` für 60 ms und lässt 60 ms los.
/// Gibt den nächsten freien Zeitpunkt zurück.
fn tap<G: ColorGenerator>(coordinator: &mut Coordinator<G>, button: usize, start_ms: u64) -> u64 {
    let mut now = start_ms;
    while now < start_ms + 60 {
        coordinator.run_cycle(now, &levels_with(Some(button)));
        now += CYCLE_MS;
    }
    while now < start_ms + 120 {
        coordinator.run_cycle(now, &levels_with(None));
        now += CYCLE_MS;
    }
    now
}

fn distinct(colors: &[Color]) -> usize {
    let mut seen: Vec<Color> = Vec::new();
    for color in colors {
        if !seen.contains(color) {
            seen.push(*color);
        }
    }
    seen.len()
}

// ============================================================================
// Tests: DebouncedButton
// ============================================================================

#[test]
fn test_one_edge_per_stable_press_despite_bounce() {
    let mut button = phone_core::DebouncedButton::new(7);
    // (Pegel, Dauer in ms): Prellen kürzer als das Fenster vor jedem Wechsel
    let script = [
        (Level::High, 100),
        (Level::Low, 3),
        (Level::High, 2),
        (Level::Low, 8),
        (Level::High, 1),
        (Level::Low, 200), // Druck 1
        (Level::High, 4),
        (Level::Low, 6),
        (Level::High, 150), // Loslassen
        (Level::Low, 30),   // zu kurz
        (Level::High, 100),
        (Level::Low, 51),
        (Level::High, 2),
        (Level::Low, 120), // Druck 2
        (Level::High, 100),
    ];

    let mut now = 0;
    let mut pressed = 0;
    let mut released = 0;
    for (level, duration) in script {
        for _ in 0..duration {
            match button.poll(level, now) {
                Some(Edge::Pressed) => pressed += 1,
                Some(Edge::Released) => released += 1,
                None => {}
            }
            now += 1;
        }
    }

    assert_eq!(pressed, 2);
    assert_eq!(released, 2);
}

#[test]
fn test_scenario_glitch_then_hold_starts_playback() {
    let mut coordinator = coordinator(true);
    // low, low, high (Glitch 5 ms), dann low gehalten
    let script = [
        (0, Level::Low),
        (5, Level::Low),
        (10, Level::High),
        (15, Level::Low),
    ];

    let mut presses = Vec::new();
    for t in (0..=80).step_by(5) {
        let level = script
            .iter()
            .rev()
            .find(|(since, _)| *since <= t)
            .map(|(_, level)| *level)
            .unwrap();
        let mut levels = levels_with(None);
        levels[0] = level;
        let report = coordinator.run_cycle(t, &levels);
        if report.presses > 0 {
            presses.push(t);
        }
    }

    // Stabil ab 15 ms, bestätigt beim ersten Poll mehr als 50 ms später
    assert_eq!(presses, vec![70]);
    assert_eq!(coordinator.engine().pipeline().connects, vec![TRACK_A]);
    assert_eq!(coordinator.state(), DeviceState::Playing);
}

// ============================================================================
// Tests: PlaybackEngine
// ============================================================================

#[test]
fn test_engine_applies_route_and_level() {
    let engine = PlaybackEngine::new(MockPipeline::default(), ROUTE);
    assert_eq!(engine.pipeline().route, Some(ROUTE));
    assert_eq!(engine.pipeline().level, Some(phone_core::DEFAULT_OUTPUT_LEVEL));
    assert_eq!(engine.route(), &ROUTE);
}

#[test]
fn test_stop_is_idempotent() {
    let mut engine = PlaybackEngine::new(MockPipeline::default(), ROUTE);
    engine.play(TrackRef::new(TRACK_A).unwrap()).unwrap();

    engine.stop();
    assert_eq!(engine.current_state(), DeviceState::Idle);
    engine.stop();
    assert_eq!(engine.current_state(), DeviceState::Idle);

    // Genau ein Hardware-Stop pro Aufruf
    assert_eq!(engine.pipeline().disconnects, 2);
}

#[test]
fn test_playing_iff_session_active() {
    let mut engine = PlaybackEngine::new(MockPipeline::default(), ROUTE);
    let track = TrackRef::new(TRACK_A).unwrap();

    let check = |engine: &PlaybackEngine<MockPipeline>| {
        assert_eq!(
            engine.current_state() == DeviceState::Playing,
            engine.pipeline().session.is_some()
        );
        assert_eq!(engine.is_active(), engine.current_track().is_some());
    };

    check(&engine);
    engine.play(track).unwrap();
    check(&engine);
    engine.play(track).unwrap();
    check(&engine);
    engine.update();
    check(&engine);
    engine.stop();
    check(&engine);
    engine.play(track).unwrap();
    engine.enter_usb_transfer();
    check(&engine);
    engine.exit_usb_transfer();
    check(&engine);
}

#[test]
fn test_play_replaces_running_session() {
    let mut engine = PlaybackEngine::new(MockPipeline::default(), ROUTE);
    let track = TrackRef::new(TRACK_A).unwrap();

    engine.play(track).unwrap();
    engine.play(track).unwrap();

    assert_eq!(engine.pipeline().connects.len(), 2);
    assert_eq!(engine.current_state(), DeviceState::Playing);
}

#[test]
fn test_unreachable_track_stays_playing_until_update() {
    let mut engine = PlaybackEngine::new(MockPipeline::default(), ROUTE);
    engine.pipeline_mut().fail_next_connect = true;

    engine.play(TrackRef::new("/missing.mp3").unwrap()).unwrap();
    assert_eq!(engine.current_state(), DeviceState::Playing);
    assert_eq!(engine.update(), SessionStatus::Ended);
}

// ============================================================================
// Tests: DeviceCoordinator
// ============================================================================

#[test]
fn test_storage_mounted_once() {
    let mut storage = MockStorage::new(true);
    let mut coordinator = coordinator_with(&mut storage, SequenceColors::default());
    tap(&mut coordinator, 0, 0);

    assert_eq!(storage.mounts, 1);
    assert!(coordinator.storage_available());
}

#[test]
fn test_stop_button_returns_to_idle() {
    let mut coordinator = coordinator(true);
    let now = tap(&mut coordinator, 0, 0);
    assert_eq!(coordinator.state(), DeviceState::Playing);

    tap(&mut coordinator, 1, now);
    assert_eq!(coordinator.state(), DeviceState::Idle);
    assert_eq!(coordinator.engine().pipeline().disconnects, 1);
}

#[test]
fn test_unassigned_buttons_are_inert() {
    let mut coordinator = coordinator(true);
    let mut now = 0;
    for button in 2..BUTTONS {
        now = tap(&mut coordinator, button, now);
    }

    assert_eq!(coordinator.state(), DeviceState::Idle);
    assert!(coordinator.engine().pipeline().connects.is_empty());
    assert_eq!(coordinator.engine().pipeline().disconnects, 0);
}

#[test]
fn test_release_edge_triggers_nothing() {
    let mut coordinator = coordinator(true);
    let now = tap(&mut coordinator, 0, 0);
    let connects = coordinator.engine().pipeline().connects.len();

    // weitere Zyklen ohne Druck: nur die Loslass-Flanke lag dazwischen
    for t in (now..now + 200).step_by(CYCLE_MS as usize) {
        coordinator.run_cycle(t, &levels_with(None));
    }
    assert_eq!(coordinator.engine().pipeline().connects.len(), connects);
    assert!(!coordinator.button(ButtonId(0)).unwrap().is_pressed());
}

#[test]
fn test_indicator_reflects_play_in_same_cycle() {
    let mut coordinator = coordinator(true);
    let mut now = 0;
    let report = loop {
        let report = coordinator.run_cycle(now, &levels_with(Some(0)));
        if report.presses > 0 {
            break report;
        }
        now += CYCLE_MS;
    };

    assert_eq!(report.state, DeviceState::Playing);
    assert_eq!(report.session, SessionStatus::Streaming);
    // Tanz-Farbe statt Atmen: erster Wert der Sequenz
    assert_eq!(report.color, RGB8 { r: 1, g: 1, b: 1 });
    assert_eq!(coordinator.output().last_color(), Some(report.color));
}

#[test]
fn test_track_end_returns_to_idle() {
    let mut coordinator = coordinator(true);
    let now = tap(&mut coordinator, 0, 0);
    coordinator.engine_mut().pipeline_mut().finish_track();

    let report = coordinator.run_cycle(now, &levels_with(None));
    assert_eq!(report.session, SessionStatus::Ended);
    assert_eq!(report.state, DeviceState::Idle);
    assert_eq!(report.color.r, 0);
    assert_eq!(report.color.g, 0);
}

#[test]
fn test_pump_called_every_cycle_while_playing() {
    let mut coordinator = coordinator(true);
    let now = tap(&mut coordinator, 0, 0);
    let pumps = coordinator.engine().pipeline().pumps;

    for t in (now..now + 50).step_by(CYCLE_MS as usize) {
        coordinator.run_cycle(t, &levels_with(None));
    }
    assert_eq!(coordinator.engine().pipeline().pumps, pumps + 10);
}

#[test]
fn test_scenario_no_storage_blinks_error() {
    let mut coordinator = coordinator(false);
    assert!(!coordinator.storage_available());

    let mut now = 0;
    let press_at = loop {
        let report = coordinator.run_cycle(now, &levels_with(Some(0)));
        if report.presses > 0 {
            break now;
        }
        now += CYCLE_MS;
    };

    let mut colors = Vec::new();
    for t in (press_at..press_at + 400).step_by(CYCLE_MS as usize) {
        let levels = if t < press_at + 30 {
            levels_with(Some(0))
        } else {
            levels_with(None)
        };
        colors.push((t - press_at, coordinator.run_cycle(t, &levels).color));
    }

    assert!(coordinator.engine().pipeline().connects.is_empty());
    assert_eq!(coordinator.state(), DeviceState::Idle);
    for (elapsed, color) in colors {
        if elapsed < 200 {
            assert_eq!(color, ERROR_COLOR, "at +{elapsed} ms");
        } else {
            assert_eq!(color, OFF, "at +{elapsed} ms");
        }
    }

    // danach wieder Atmen
    let color = coordinator.run_cycle(press_at + 400, &levels_with(None)).color;
    assert_eq!(color.r, 0);
}

#[test]
fn test_no_storage_blocks_stop_button_too() {
    let mut coordinator = coordinator(false);
    tap(&mut coordinator, 1, 0);

    assert_eq!(coordinator.engine().pipeline().disconnects, 0);
    assert!(coordinator.indicator().is_signaling_error());
}

#[test]
fn test_usb_transfer_blocks_play_button() {
    let mut coordinator = coordinator(true);
    let now = tap(&mut coordinator, 0, 0);
    coordinator.enter_usb_transfer();
    assert_eq!(coordinator.state(), DeviceState::UsbTransfer);

    let now = tap(&mut coordinator, 0, now);
    assert_eq!(coordinator.engine().pipeline().connects.len(), 1);

    let report = coordinator.run_cycle(now, &levels_with(None));
    assert_eq!(report.color, USB_TRANSFER_COLOR);

    assert!(coordinator.exit_usb_transfer());
    assert_eq!(coordinator.state(), DeviceState::Idle);
}

#[test]
fn test_stop_button_leaves_usb_transfer() {
    let mut coordinator = coordinator(true);
    coordinator.enter_usb_transfer();

    let now = tap(&mut coordinator, 1, 0);
    let now = tap(&mut coordinator, 1, now);
    assert_eq!(coordinator.state(), DeviceState::Idle);

    // Danach ist Wiedergabe wieder erlaubt
    tap(&mut coordinator, 0, now);
    assert_eq!(coordinator.state(), DeviceState::Playing);
}

#[test]
fn test_output_failure_does_not_stop_loop() {
    let writer = MockWriter {
        colors: Vec::new(),
        fail_next_write: true,
    };
    let mut coordinator: Coordinator<SequenceColors> = DeviceCoordinator::new(
        PINS,
        actions(),
        PlaybackEngine::new(MockPipeline::default(), ROUTE),
        StatusIndicator::new(IndicatorStyle::Solid, SequenceColors::default()),
        ColorOutput::new(writer),
        &mut MockStorage::new(true),
    );

    // Erster Schreibversuch schlägt fehl, der Zyklus läuft trotzdem durch
    let report = coordinator.run_cycle(0, &levels_with(None));
    assert_eq!(report.state, DeviceState::Idle);
    assert_eq!(coordinator.output().last_color(), None);

    // Nächster Zyklus schreibt dieselbe Farbe erneut
    coordinator.run_cycle(CYCLE_MS, &levels_with(None));
    assert_eq!(coordinator.output().writer().colors, vec![OFF]);

    tap(&mut coordinator, 0, 2 * CYCLE_MS);
    assert_eq!(coordinator.state(), DeviceState::Playing);
}

// ============================================================================
// Tests: StatusIndicator
// ============================================================================

#[test]
fn test_scenario_dance_cadence() {
    let mut indicator = StatusIndicator::new(
        IndicatorStyle::Animated,
        UniformColors::new(StdRng::seed_from_u64(7)),
    );

    let rendered: Vec<Color> = (0..10)
        .map(|i| indicator.render(DeviceState::Playing, i * 20))
        .collect();

    assert!(distinct(&rendered) <= 2);
}

#[test]
fn test_dance_cadence_from_play_edge() {
    let mut storage = MockStorage::new(true);
    let colors = UniformColors::new(StdRng::seed_from_u64(7));
    let mut coordinator = coordinator_with(&mut storage, colors);

    let mut now = 0;
    let press_at = loop {
        if coordinator.run_cycle(now, &levels_with(Some(0))).presses > 0 {
            break now;
        }
        now += CYCLE_MS;
    };

    let rendered: Vec<Color> = (0..10)
        .map(|i| {
            coordinator
                .run_cycle(press_at + i * 20, &levels_with(None))
                .color
        })
        .collect();

    assert_eq!(coordinator.state(), DeviceState::Playing);
    assert!(distinct(&rendered) <= 2);
}

#[test]
fn test_scenario_breathing_periodic_and_smooth() {
    let mut indicator = StatusIndicator::new(IndicatorStyle::Animated, SequenceColors::default());
    let at = |indicator: &mut StatusIndicator<SequenceColors>, t: u64| {
        indicator.render(DeviceState::Idle, t).b
    };

    assert_eq!(at(&mut indicator, 0), at(&mut indicator, BREATH_PERIOD_MS));

    // steigt bis zum Viertel der Periode, fällt bis zu drei Vierteln
    let quarter = BREATH_PERIOD_MS / 4;
    let mut previous = at(&mut indicator, 0);
    for t in (10..=quarter).step_by(10) {
        let level = at(&mut indicator, t);
        assert!(level >= previous, "rising at {t}");
        previous = level;
    }
    for t in (quarter + 10..=3 * quarter).step_by(10) {
        let level = at(&mut indicator, t);
        assert!(level <= previous, "falling at {t}");
        previous = level;
    }
    assert!(at(&mut indicator, quarter) > at(&mut indicator, 0));
    assert!(at(&mut indicator, 3 * quarter) < at(&mut indicator, 0));
}

#[test]
fn test_uniform_colors_are_seed_deterministic() {
    let mut a = UniformColors::new(StdRng::seed_from_u64(42));
    let mut b = UniformColors::new(StdRng::seed_from_u64(42));
    let first: Vec<Color> = (0..5).map(|_| a.next_color()).collect();
    let second: Vec<Color> = (0..5).map(|_| b.next_color()).collect();

    assert_eq!(first, second);
    assert!(distinct(&first) > 1);
}

#[test]
fn test_mock_writer_fail() {
    let mut mock = MockWriter::default();
    mock.fail_next_write = true;

    let result = mock.write(RGB8 { r: 10, g: 0, b: 0 });
    assert_eq!(result, Err(OutputError::WriteFailed));
    assert!(mock.colors.is_empty());

    mock.write(RGB8 { r: 0, g: 10, b: 0 }).unwrap();
    assert_eq!(mock.colors, vec![RGB8 { r: 0, g: 10, b: 0 }]);
}
