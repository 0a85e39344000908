//! The foreground loop.
//!
//! A cooperative poll replaces the busy-waits of a bare-metal main loop:
//! each iteration either handles one queued event or runs one poll step
//! (load detection, keypad scan), then resolves a pending turn and
//! republishes the session for the interrupt tasks.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::config::KernelConfig;
use crate::core::{
    render, scan, Coord, Debouncer, GameSession, KeyMatrix, Phase, ShotOutcome, Surface,
    TriggerAction,
};

use super::shared::SharedState;
use super::tasks::KernelEvent;

/// Observable milestones of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum KernelReport {
    /// All 64 map cells arrived.
    MapLoaded { ship_cells: usize },
    /// A confirm press was handled.
    Trigger(TriggerAction),
    /// A turn was resolved.
    Turn(TurnReport),
}

/// One resolved turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TurnReport {
    pub turn: u8,
    pub target: Coord,
    pub outcome: ShotOutcome,
}

pub struct Kernel<K, S> {
    session: GameSession,
    shared: Arc<SharedState>,
    keypad: K,
    surface: S,
    debouncer: Debouncer,
    events: mpsc::Receiver<KernelEvent>,
    reports: mpsc::UnboundedSender<KernelReport>,
    config: KernelConfig,
    started: Instant,
}

impl<K: KeyMatrix, S: Surface> Kernel<K, S> {
    pub fn new(
        keypad: K,
        surface: S,
        shared: Arc<SharedState>,
        events: mpsc::Receiver<KernelEvent>,
        reports: mpsc::UnboundedSender<KernelReport>,
        config: KernelConfig,
    ) -> Self {
        let config = config.normalized();
        Self {
            session: GameSession::new(),
            shared,
            keypad,
            surface,
            debouncer: Debouncer::new(config.key_debounce.as_millis() as u64),
            events,
            reports,
            config,
            started: Instant::now(),
        }
    }

    /// Runs until a shutdown event arrives or every event sender is gone.
    /// Returns the final session.
    pub async fn run(mut self) -> anyhow::Result<GameSession> {
        info!("Foreground loop started");

        render::title_screen(&mut self.surface);
        self.shared.publish_session(&self.session);

        let mut poll = interval(self.config.poll_period);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(KernelEvent::Trigger) => self.handle_trigger(),
                    Some(KernelEvent::Shutdown) | None => break,
                },
                _ = poll.tick() => self.poll()?,
            }
            self.resolve_pending_turn();
            self.shared.publish_session(&self.session);
        }

        info!("Foreground loop stopped in {:?}", self.session.phase());
        Ok(self.session)
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn poll(&mut self) -> anyhow::Result<()> {
        match self.session.phase() {
            Phase::Loading => self.check_loaded(),
            Phase::Playing => {
                self.scan_keypad();
                Ok(())
            }
            Phase::AwaitingStart | Phase::GameOver(_) => Ok(()),
        }
    }

    fn check_loaded(&mut self) -> anyhow::Result<()> {
        if self.shared.map_complete() {
            let ships = self.shared.ship_map();
            self.session.load_map(ships);
            render::map_loaded_screen(&mut self.surface);
            self.report(KernelReport::MapLoaded {
                ship_cells: ships.count_ones(),
            });
            return Ok(());
        }
        if let Some(limit) = self.config.load_timeout {
            if self.started.elapsed() > limit {
                return Err(anyhow::anyhow!(
                    "Map incomplete after {:?}: {} of 64 cells received",
                    limit,
                    self.shared.bytes_loaded()
                ));
            }
        }
        Ok(())
    }

    fn scan_keypad(&mut self) {
        let key = scan(&mut self.keypad);
        if key == 0 {
            return;
        }
        let now = self.now_ms();
        if !self.debouncer.accept(now) {
            return;
        }
        if self.session.press_key(key) {
            debug!("Key {} -> cursor {:?}", key, self.session.cursor());
        }
    }

    fn handle_trigger(&mut self) {
        // a press can race the final map byte; pick the map up first
        if self.session.phase() == Phase::Loading && self.shared.map_complete() {
            if let Err(e) = self.check_loaded() {
                warn!("{}", e);
            }
        }
        let action = self.session.on_trigger();
        match action {
            TriggerAction::Started => {
                info!("Game started");
                render::board_screen(&mut self.surface, self.session.ships(), self.session.shots());
            }
            TriggerAction::Reset => {
                info!("Game reset");
                render::board_screen(&mut self.surface, self.session.ships(), self.session.shots());
            }
            TriggerAction::TurnQueued => debug!("Turn queued"),
            TriggerAction::Ignored => debug!("Trigger ignored in {:?}", self.session.phase()),
        }
        self.report(KernelReport::Trigger(action));
    }

    fn resolve_pending_turn(&mut self) {
        let (target, outcome) = match self.session.take_pending_turn() {
            None => return,
            Some(Ok(resolved)) => resolved,
            Some(Err(e)) => {
                warn!("Turn discarded: {}", e);
                return;
            }
        };
        let turn = self.session.turns();
        info!(
            "Turn {}: ({}, {}) -> {:?}",
            turn,
            target.x(),
            target.y(),
            outcome
        );
        match outcome {
            ShotOutcome::Hit => {
                render::board_screen(&mut self.surface, self.session.ships(), self.session.shots());
                self.shared.arm_blink();
            }
            ShotOutcome::Miss => {}
            ShotOutcome::Win | ShotOutcome::Loss => {
                if let Phase::GameOver(result) = self.session.phase() {
                    render::game_over_screen(&mut self.surface, result);
                }
                self.shared.arm_beep();
            }
        }
        self.report(KernelReport::Turn(TurnReport {
            turn,
            target,
            outcome,
        }));
    }

    /// Publishes the session, then the report, so a listener reacting to
    /// the report never reads older shared state.
    fn report(&self, report: KernelReport) {
        self.shared.publish_session(&self.session);
        // nobody listening is fine
        let _ = self.reports.send(report);
    }
}
