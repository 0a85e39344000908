//! Task wiring for the kernel on a tokio runtime.
//!
//! The foreground loop and the four interrupt contexts each run as their
//! own task. [`spawn_kernel`] starts them all and hands back a
//! [`KernelHandle`] for feeding button edges and observing the session.

#![cfg(feature = "std")]

pub mod kernel;
pub mod shared;
pub mod sim;
pub mod tasks;

use std::sync::Arc;

use embedded_hal::digital::StatefulOutputPin;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::KernelConfig;
use crate::core::{GameSession, KeyMatrix, SegmentDisplay, Surface};
use crate::serial::SerialSource;

pub use kernel::{Kernel, KernelReport, TurnReport};
pub use shared::SharedState;
pub use tasks::KernelEvent;

/// Button edges queued before the trigger task drops them.
const EDGE_QUEUE: usize = 4;

/// Everything the kernel drives.
pub struct Peripherals<K, S, D, L, B, R> {
    pub keypad: K,
    pub surface: S,
    pub digits: D,
    pub led: L,
    pub buzzer: B,
    pub serial: R,
}

/// Control and observation side of a running kernel.
pub struct KernelHandle {
    shared: Arc<SharedState>,
    edges: mpsc::Sender<()>,
    events: mpsc::Sender<KernelEvent>,
    reports: mpsc::UnboundedReceiver<KernelReport>,
    foreground: JoinHandle<anyhow::Result<GameSession>>,
    interrupts: Vec<JoinHandle<()>>,
}

/// Starts the foreground loop and all interrupt tasks.
pub fn spawn_kernel<K, S, D, L, B, R>(
    peripherals: Peripherals<K, S, D, L, B, R>,
    config: KernelConfig,
) -> KernelHandle
where
    K: KeyMatrix + Send + 'static,
    S: Surface + Send + 'static,
    D: SegmentDisplay + Send + 'static,
    L: StatefulOutputPin + Send + 'static,
    B: StatefulOutputPin + Send + 'static,
    R: SerialSource + 'static,
{
    let config = config.normalized();
    let shared = Arc::new(SharedState::new());
    let (event_tx, event_rx) = mpsc::channel(config.event_queue);
    let (edge_tx, edge_rx) = mpsc::channel(EDGE_QUEUE);
    let (report_tx, report_rx) = mpsc::unbounded_channel();

    let interrupts = vec![
        tokio::spawn(tasks::serial_task(peripherals.serial, shared.clone())),
        tokio::spawn(tasks::display_task(
            peripherals.digits,
            shared.clone(),
            config.display_period,
        )),
        tokio::spawn(tasks::feedback_task(
            peripherals.led,
            peripherals.buzzer,
            shared.clone(),
            config.feedback_period,
        )),
        tokio::spawn(tasks::trigger_task(
            edge_rx,
            event_tx.clone(),
            config.button_debounce,
        )),
    ];

    let kernel = Kernel::new(
        peripherals.keypad,
        peripherals.surface,
        shared.clone(),
        event_rx,
        report_tx,
        config,
    );
    let foreground = tokio::spawn(kernel.run());

    KernelHandle {
        shared,
        edges: edge_tx,
        events: event_tx,
        reports: report_rx,
        foreground,
        interrupts,
    }
}

impl KernelHandle {
    pub fn shared(&self) -> &Arc<SharedState> {
        &self.shared
    }

    /// Delivers one rising edge of the confirm button.
    pub fn press_button(&self) -> anyhow::Result<()> {
        self.edges
            .try_send(())
            .map_err(|e| anyhow::anyhow!("Button edge dropped: {}", e))
    }

    /// Next milestone, or `None` once the foreground loop has stopped.
    pub async fn next_report(&mut self) -> Option<KernelReport> {
        self.reports.recv().await
    }

    /// Stops every task and returns the final session.
    pub async fn shutdown(self) -> anyhow::Result<GameSession> {
        // the loop may already have stopped on its own
        let _ = self.events.send(KernelEvent::Shutdown).await;
        let finished = self.foreground.await;
        for task in &self.interrupts {
            task.abort();
        }
        let session = finished??;
        Ok(session)
    }
}
