//! Software stand-ins for the board peripherals, plus an [`Operator`] that
//! plays through them the way a person at the keypad would.

use std::collections::{BTreeMap, VecDeque};
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::{
    segment, Axis, CellMap, Coord, DigitPosition, KeyMatrix, Phase, SegmentDisplay, Surface,
    TriggerAction, AXIS_TOGGLE_KEY, BOARD_SIZE,
};
use crate::serial::{InMemorySerial, SerialSource};

use super::{KernelHandle, KernelReport, Peripherals, SharedState, TurnReport};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Output line with observable level and toggle count. Clones share state.
#[derive(Debug, Clone)]
pub struct SimPin {
    high: Arc<AtomicBool>,
    toggles: Arc<AtomicU32>,
}

impl SimPin {
    pub fn new(high: bool) -> Self {
        Self {
            high: Arc::new(AtomicBool::new(high)),
            toggles: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn is_high(&self) -> bool {
        self.high.load(Ordering::Acquire)
    }

    pub fn toggles(&self) -> u32 {
        self.toggles.load(Ordering::Acquire)
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high.store(false, Ordering::Release);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.high.store(true, Ordering::Release);
        Ok(())
    }
}

impl StatefulOutputPin for SimPin {
    fn is_set_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.is_high())
    }

    fn is_set_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.is_high())
    }

    fn toggle(&mut self) -> Result<(), Infallible> {
        self.high.fetch_xor(true, Ordering::AcqRel);
        self.toggles.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

/// Keypad whose keys are tapped from software. Each tap holds the key
/// down for exactly one full scan. Clones share the tap queue.
#[derive(Debug, Clone, Default)]
pub struct SimKeypad {
    taps: Arc<Mutex<VecDeque<u8>>>,
    held: Option<u8>,
    driven: usize,
}

impl SimKeypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one press of `key` (1–9).
    pub fn tap(&self, key: u8) {
        lock(&self.taps).push_back(key);
    }

    /// Taps not yet seen by a scan.
    pub fn pending(&self) -> usize {
        lock(&self.taps).len()
    }
}

impl KeyMatrix for SimKeypad {
    fn drive(&mut self, line: usize) {
        if line == 0 {
            // a new scan begins
            self.held = lock(&self.taps).pop_front();
        }
        self.driven = line;
    }

    fn sense(&mut self, line: usize) -> bool {
        self.held == Some((self.driven + 1 + 3 * line) as u8)
    }
}

/// Text surface keeping every drawn item by pixel position.
#[derive(Debug, Clone, Default)]
pub struct TextSurface {
    items: Arc<Mutex<BTreeMap<(u8, u8), String>>>,
}

impl TextSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Screen contents, one line per pixel row in use, items left to right.
    pub fn text(&self) -> String {
        let items = lock(&self.items);
        let mut lines: Vec<String> = Vec::new();
        let mut current: Option<u8> = None;
        for ((y, _x), item) in items.iter() {
            if current != Some(*y) {
                lines.push(String::new());
                current = Some(*y);
            }
            if let Some(line) = lines.last_mut() {
                line.push_str(item);
            }
        }
        lines.join("\n")
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text().contains(needle)
    }

    /// Board rows as drawn by the board screen, top to bottom.
    pub fn board_rows(&self) -> Vec<String> {
        let items = lock(&self.items);
        let mut rows = vec![String::new(); BOARD_SIZE as usize];
        for ((y, x), item) in items.iter() {
            let row = (*y / crate::core::render::CELL_PIXELS) as usize;
            if *x >= crate::core::render::BOARD_LEFT && item.len() == 1 && row < rows.len() {
                rows[row].push_str(item);
            }
        }
        rows
    }
}

impl Surface for TextSurface {
    fn clear(&mut self) {
        lock(&self.items).clear();
    }

    fn draw_char(&mut self, x: u8, y: u8, glyph: char) {
        lock(&self.items).insert((y, x), glyph.to_string());
    }

    fn draw_str(&mut self, x: u8, y: u8, text: &str) {
        lock(&self.items).insert((y, x), text.to_string());
    }
}

/// Digit display latching the last pattern written to each position.
#[derive(Debug, Clone, Default)]
pub struct SegmentLog {
    latched: Arc<Mutex<[Option<u8>; 4]>>,
    lit: Arc<Mutex<Option<DigitPosition>>>,
}

impl SegmentLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(position: DigitPosition) -> usize {
        match position {
            DigitPosition::First => 0,
            DigitPosition::Second => 1,
            DigitPosition::Third => 2,
            DigitPosition::Fourth => 3,
        }
    }

    /// Last pattern shown on `position`.
    pub fn pattern(&self, position: DigitPosition) -> Option<u8> {
        lock(&self.latched)[Self::index(position)]
    }

    /// Last digit shown on `position`, decoded.
    pub fn digit(&self, position: DigitPosition) -> Option<u8> {
        self.pattern(position).and_then(segment::decode)
    }

    /// Digit currently lit, if any.
    pub fn lit(&self) -> Option<DigitPosition> {
        *lock(&self.lit)
    }
}

impl SegmentDisplay for SegmentLog {
    fn show(&mut self, position: DigitPosition, pattern: u8) {
        lock(&self.latched)[Self::index(position)] = Some(pattern);
        *lock(&self.lit) = Some(position);
    }

    fn blank(&mut self) {
        *lock(&self.lit) = None;
    }
}

/// Simulated board as handed to [`spawn_kernel`](super::spawn_kernel).
pub type SimPeripherals<R = InMemorySerial> =
    Peripherals<SimKeypad, TextSurface, SegmentLog, SimPin, SimPin, R>;

/// Observation clones of a simulated board.
#[derive(Debug, Clone)]
pub struct SimProbes {
    pub keypad: SimKeypad,
    pub surface: TextSurface,
    pub digits: SegmentLog,
    pub led: SimPin,
    pub buzzer: SimPin,
}

/// Builds a simulated board; outputs start at their idle (high) level.
pub fn sim_board<R: SerialSource>(serial: R) -> (SimPeripherals<R>, SimProbes) {
    let probes = SimProbes {
        keypad: SimKeypad::new(),
        surface: TextSurface::new(),
        digits: SegmentLog::new(),
        led: SimPin::new(true),
        buzzer: SimPin::new(true),
    };
    let peripherals = Peripherals {
        keypad: probes.keypad.clone(),
        surface: probes.surface.clone(),
        digits: probes.digits.clone(),
        led: probes.led.clone(),
        buzzer: probes.buzzer.clone(),
        serial,
    };
    (peripherals, probes)
}

/// Every board cell in random order.
pub fn shuffled_cells<R: Rng + ?Sized>(rng: &mut R) -> Vec<Coord> {
    let mut cells: Vec<Coord> = (0..BOARD_SIZE)
        .flat_map(|y| (0..BOARD_SIZE).filter_map(move |x| Coord::new(x, y)))
        .collect();
    cells.shuffle(rng);
    cells
}

/// A map with `ships` ship cells at random positions (capped at the board).
pub fn random_map<R: Rng + ?Sized>(rng: &mut R, ships: usize) -> CellMap {
    let mut map = CellMap::new();
    for cell in shuffled_cells(rng).into_iter().take(ships) {
        let (row, col) = cell.row_col();
        let _ = map.set(row, col);
    }
    map
}

/// Drives a running kernel through the simulated keypad and button,
/// waiting on published state between steps like a person watching the
/// display.
pub struct Operator {
    handle: KernelHandle,
    keypad: SimKeypad,
    step_timeout: Duration,
}

impl Operator {
    pub fn new(handle: KernelHandle, keypad: SimKeypad) -> Self {
        Self {
            handle,
            keypad,
            step_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    pub fn shared(&self) -> &Arc<SharedState> {
        self.handle.shared()
    }

    pub fn into_handle(self) -> KernelHandle {
        self.handle
    }

    /// Polls shared state until `ready` holds.
    pub async fn wait_until<F>(&self, what: &str, ready: F) -> anyhow::Result<()>
    where
        F: Fn(&SharedState) -> bool,
    {
        let shared = self.handle.shared().clone();
        let wait = async {
            while !ready(&shared) {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        };
        tokio::time::timeout(self.step_timeout, wait)
            .await
            .map_err(|_| anyhow::anyhow!("Timed out waiting for {}", what))
    }

    /// Next report matching `pick`, skipping the rest.
    async fn expect_report<T, F>(&mut self, what: &str, pick: F) -> anyhow::Result<T>
    where
        F: Fn(KernelReport) -> Option<T>,
    {
        let timeout = self.step_timeout;
        let handle = &mut self.handle;
        let wait = async {
            while let Some(report) = handle.next_report().await {
                if let Some(found) = pick(report) {
                    return Ok(found);
                }
            }
            Err(anyhow::anyhow!("Kernel stopped while waiting for {}", what))
        };
        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| anyhow::anyhow!("Timed out waiting for {}", what))?
    }

    async fn trigger(&mut self, expected: TriggerAction) -> anyhow::Result<()> {
        self.handle.press_button()?;
        let action = self
            .expect_report("trigger", |r| match r {
                KernelReport::Trigger(action) => Some(action),
                _ => None,
            })
            .await?;
        if action != expected {
            return Err(anyhow::anyhow!(
                "Button press did {:?}, expected {:?}",
                action,
                expected
            ));
        }
        Ok(())
    }

    /// Waits for the map and presses the button to start play.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.wait_until("map", |s| s.phase() == Phase::AwaitingStart)
            .await?;
        self.trigger(TriggerAction::Started).await
    }

    async fn tap_and_wait<F>(&self, key: u8, what: &str, ready: F) -> anyhow::Result<()>
    where
        F: Fn(&SharedState) -> bool,
    {
        self.keypad.tap(key);
        self.wait_until(what, ready).await
    }

    /// Keys in both coordinates of `target`.
    pub async fn enter(&self, target: Coord) -> anyhow::Result<()> {
        let (x_key, y_key) = (target.x() + 1, target.y() + 1);
        if self.shared().cursor().axis != Axis::X {
            self.tap_and_wait(AXIS_TOGGLE_KEY, "X axis", |s| s.cursor().axis == Axis::X)
                .await?;
        }
        self.tap_and_wait(x_key, "X digit", |s| s.cursor().x == Some(x_key))
            .await?;
        self.tap_and_wait(AXIS_TOGGLE_KEY, "Y axis", |s| s.cursor().axis == Axis::Y)
            .await?;
        self.tap_and_wait(y_key, "Y digit", |s| s.cursor().y == Some(y_key))
            .await
    }

    /// Enters `target`, confirms and waits for the resolved turn.
    pub async fn fire(&mut self, target: Coord) -> anyhow::Result<TurnReport> {
        self.enter(target).await?;
        self.trigger(TriggerAction::TurnQueued).await?;
        self.expect_report("turn", |r| match r {
            KernelReport::Turn(turn) => Some(turn),
            _ => None,
        })
        .await
    }

    /// Fires at distinct random cells until the game ends.
    pub async fn autoplay<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> anyhow::Result<Vec<TurnReport>> {
        let mut turns = Vec::new();
        for target in shuffled_cells(rng) {
            let report = self.fire(target).await?;
            turns.push(report);
            if report.outcome.is_terminal() {
                return Ok(turns);
            }
        }
        Err(anyhow::anyhow!("Ran out of cells after {} turns", turns.len()))
    }

    /// Confirms after a finished game to play again on the same map.
    pub async fn reset(&mut self) -> anyhow::Result<()> {
        self.trigger(TriggerAction::Reset).await
    }

    /// Stops the kernel and returns its final session.
    pub async fn shutdown(self) -> anyhow::Result<crate::core::GameSession> {
        self.handle.shutdown().await
    }
}
