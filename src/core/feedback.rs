//! Self-terminating LED and buzzer sequences.
//!
//! A sequence toggles its output once per feedback tick until its budget of
//! toggles is spent, then parks the output at the idle (high) level. The
//! LED and buzzer are both active low, so idle means off.

use embedded_hal::digital::StatefulOutputPin;

use super::config::{BEEP_BUDGET, BLINK_BUDGET};

/// Peripheral a sequence drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum FeedbackTarget {
    Led,
    Buzzer,
}

/// One bounded toggle sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackSequence {
    target: FeedbackTarget,
    budget: u8,
    ticks: u8,
    active: bool,
}

impl FeedbackSequence {
    pub const fn new(target: FeedbackTarget, budget: u8) -> Self {
        Self {
            target,
            budget,
            ticks: 0,
            active: false,
        }
    }

    /// Hit blink on the LED.
    pub const fn blink() -> Self {
        Self::new(FeedbackTarget::Led, BLINK_BUDGET)
    }

    /// End-of-game beep on the buzzer.
    pub const fn beep() -> Self {
        Self::new(FeedbackTarget::Buzzer, BEEP_BUDGET)
    }

    pub fn target(&self) -> FeedbackTarget {
        self.target
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Toggles performed in the current run.
    pub fn ticks(&self) -> u8 {
        self.ticks
    }

    /// Starts a run. Arming a running sequence just lets it continue.
    pub fn arm(&mut self) {
        self.active = true;
    }

    /// Advances one tick. Returns `true` when this tick finished the run.
    pub fn tick<P: StatefulOutputPin + ?Sized>(&mut self, pin: &mut P) -> bool {
        if !self.active {
            return false;
        }
        if let Err(e) = pin.toggle() {
            log::warn!("feedback: toggling {:?} failed: {:?}", self.target, e);
        }
        self.ticks += 1;
        if self.ticks < self.budget {
            return false;
        }
        if let Err(e) = pin.set_high() {
            log::warn!("feedback: parking {:?} failed: {:?}", self.target, e);
        }
        self.active = false;
        self.ticks = 0;
        true
    }
}

/// Blink and beep, ticked together but tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackDriver {
    pub blink: FeedbackSequence,
    pub beep: FeedbackSequence,
}

impl Default for FeedbackDriver {
    fn default() -> Self {
        Self {
            blink: FeedbackSequence::blink(),
            beep: FeedbackSequence::beep(),
        }
    }
}

impl FeedbackDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks both sequences. Returns which of them finished on this tick.
    pub fn tick<L, B>(&mut self, led: &mut L, buzzer: &mut B) -> (bool, bool)
    where
        L: StatefulOutputPin + ?Sized,
        B: StatefulOutputPin + ?Sized,
    {
        (self.blink.tick(led), self.beep.tick(buzzer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorType, OutputPin};

    #[derive(Default)]
    struct Line {
        high: bool,
        toggles: u32,
    }

    impl ErrorType for Line {
        type Error = Infallible;
    }

    impl OutputPin for Line {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }
    }

    impl StatefulOutputPin for Line {
        fn is_set_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.high)
        }
        fn is_set_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.high)
        }
        fn toggle(&mut self) -> Result<(), Infallible> {
            self.high = !self.high;
            self.toggles += 1;
            Ok(())
        }
    }

    #[test]
    fn idle_sequence_leaves_pin_alone() {
        let mut seq = FeedbackSequence::blink();
        let mut led = Line::default();
        assert!(!seq.tick(&mut led));
        assert_eq!(led.toggles, 0);
    }

    #[test]
    fn blink_drives_led_and_beep_drives_buzzer() {
        assert_eq!(FeedbackSequence::blink().target(), FeedbackTarget::Led);
        assert_eq!(FeedbackSequence::beep().target(), FeedbackTarget::Buzzer);
        let driver = FeedbackDriver::new();
        assert_eq!(driver.blink.target(), FeedbackTarget::Led);
        assert_eq!(driver.beep.target(), FeedbackTarget::Buzzer);
    }

    #[test]
    fn blink_runs_six_toggles_then_parks_high() {
        let mut seq = FeedbackSequence::blink();
        let mut led = Line {
            high: true,
            toggles: 0,
        };
        seq.arm();
        for _ in 0..5 {
            assert!(!seq.tick(&mut led));
        }
        assert!(seq.tick(&mut led));
        assert_eq!(led.toggles, 6);
        assert!(led.high);
        assert!(!seq.is_active());
        assert_eq!(seq.ticks(), 0);
    }

    #[test]
    fn rearming_mid_run_does_not_restart() {
        let mut seq = FeedbackSequence::beep();
        let mut buzzer = Line::default();
        seq.arm();
        seq.tick(&mut buzzer);
        seq.tick(&mut buzzer);
        seq.arm();
        assert_eq!(seq.ticks(), 2);
        let mut finished_after = 0;
        while seq.is_active() {
            seq.tick(&mut buzzer);
            finished_after += 1;
        }
        assert_eq!(finished_after, BEEP_BUDGET - 2);
    }
}
