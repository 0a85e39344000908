//! One task per interrupt context.
//!
//! Each task runs to completion per event, never blocks on another task and
//! talks to the foreground loop only through [`SharedState`] or the event
//! queue.

use std::sync::Arc;
use std::time::Duration;

use embedded_hal::digital::StatefulOutputPin;
use log::{debug, info, trace, warn};
use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::core::{BoardLoader, DigitMux, FeedbackDriver, SegmentDisplay};
use crate::serial::SerialSource;

use super::shared::SharedState;

/// Events delivered to the foreground loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelEvent {
    /// Debounced rising edge of the confirm button.
    Trigger,
    /// Stop the foreground loop.
    Shutdown,
}

/// Serial receive context: feeds every byte to the loader.
pub async fn serial_task<R: SerialSource>(mut source: R, shared: Arc<SharedState>) {
    info!("Serial task started");

    let mut loader = BoardLoader::new();
    loop {
        match source.read_byte().await {
            Ok(Some(byte)) => {
                if loader.feed(byte) {
                    shared.publish_loader(&loader);
                    if loader.is_complete() {
                        debug!("serial: all {} map cells received", loader.accepted());
                    }
                }
            }
            Ok(None) => {
                debug!("serial: line closed after {} cells", loader.accepted());
                break;
            }
            Err(e) => {
                warn!("serial: read error: {}", e);
                break;
            }
        }
    }
}

/// Display tick context: lights one digit per period.
pub async fn display_task<D: SegmentDisplay>(
    mut display: D,
    shared: Arc<SharedState>,
    period: Duration,
) {
    info!("Display task started");

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut mux = DigitMux::new();
    loop {
        ticker.tick().await;
        mux.tick(&shared.display_snapshot()).apply(&mut display);
    }
}

/// Feedback tick context: advances the blink and beep sequences.
pub async fn feedback_task<L, B>(
    mut led: L,
    mut buzzer: B,
    shared: Arc<SharedState>,
    period: Duration,
) where
    L: StatefulOutputPin,
    B: StatefulOutputPin,
{
    info!("Feedback task started");

    if led.set_high().is_err() || buzzer.set_high().is_err() {
        warn!("feedback: could not park outputs at idle level");
    }
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut driver = FeedbackDriver::new();
    loop {
        ticker.tick().await;
        if shared.blink_armed() {
            driver.blink.arm();
        }
        if shared.beep_armed() {
            driver.beep.arm();
        }
        let (blink_done, beep_done) = driver.tick(&mut led, &mut buzzer);
        if blink_done {
            trace!("feedback: blink finished");
            shared.finish_blink();
        }
        if beep_done {
            trace!("feedback: beep finished");
            shared.finish_beep();
        }
    }
}

/// Button edge context: filters bounces and forwards confirm presses.
pub async fn trigger_task(
    mut edges: mpsc::Receiver<()>,
    events: mpsc::Sender<KernelEvent>,
    debounce: Duration,
) {
    info!("Trigger task started");

    let mut last: Option<Instant> = None;
    while edges.recv().await.is_some() {
        let now = Instant::now();
        if let Some(prev) = last {
            if now.duration_since(prev) < debounce {
                trace!("trigger: bounce suppressed");
                continue;
            }
        }
        last = Some(now);
        if events.try_send(KernelEvent::Trigger).is_err() {
            warn!("Event queue full, dropping trigger");
        }
    }
}
