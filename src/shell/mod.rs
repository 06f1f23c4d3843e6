//! Splash shell state machine.
//!
//! The shell owns the preloader percentage, the lifecycle [`Stage`] and the two
//! scripted fault flags. Time is a logical millisecond clock: the browser driver
//! (see `web`) feeds it `performance.now()` relative to mount, tests feed it
//! whatever they like.
//!
//! Each behaviour is a named timer slot in a [`TimerSet`]. After every state
//! change the shell runs a reconcile pass that arms the slots whose condition
//! now holds and cancels those whose condition no longer does, so a callback can
//! never fire against state it was not armed for.
//!
//! Timeline with the default config:
//! - t = 0..1500: `Progress` ticks every 30 ms, +2 each
//! - t = 1500: percent hits 100, stage moves to `Fading`
//! - t = 1900: `Reveal` fires, stage moves to `Content`
//! - t = 16900: `Fault` fires, error on
//! - t = 31900: `Recover` fires, error off, recovered on; repeats every 15 s

pub mod view;

use crate::config::{ConfigError, SplashConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Stage {
    Loading,
    Fading,
    Content,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ShellState {
    /// Raw counter; may pass 100 with a step that does not divide it. Clamp
    /// when displaying.
    pub percent: u32,
    pub stage: Stage,
    pub error: bool,
    /// Set at the first recovery and never cleared.
    pub recovered: bool,
}

impl Default for ShellState {
    fn default() -> Self {
        Self { percent: 0, stage: Stage::Loading, error: false, recovered: false }
    }
}

impl ShellState {
    pub fn display_percent(&self) -> u32 {
        self.percent.min(100)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    Progress,
    Reveal,
    Fault,
    Recover,
}

impl TimerKind {
    /// Declaration order; also the tie-break when two timers share a deadline.
    pub const ALL: [TimerKind; 4] =
        [TimerKind::Progress, TimerKind::Reveal, TimerKind::Fault, TimerKind::Recover];

    fn slot(self) -> usize {
        self as usize
    }

    /// Whether this timer should be pending for `state`.
    fn wanted(self, state: &ShellState) -> bool {
        match self {
            TimerKind::Progress => state.stage == Stage::Loading && state.percent < 100,
            TimerKind::Reveal => state.stage == Stage::Fading,
            TimerKind::Fault => state.stage == Stage::Content && !state.error,
            TimerKind::Recover => state.stage == Stage::Content && state.error,
        }
    }

    fn delay(self, config: &SplashConfig) -> f64 {
        match self {
            TimerKind::Progress => config.progress_interval_ms,
            TimerKind::Reveal => config.reveal_delay_ms,
            TimerKind::Fault => config.fault_delay_ms,
            TimerKind::Recover => config.recover_delay_ms,
        }
    }
}

/// One optional deadline per [`TimerKind`]. Cancelling a timer is clearing its
/// slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimerSet {
    deadlines: [Option<f64>; 4],
}

impl TimerSet {
    pub fn arm(&mut self, kind: TimerKind, at: f64) {
        self.deadlines[kind.slot()] = Some(at);
    }

    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.deadlines[kind.slot()].take().is_some()
    }

    pub fn cancel_all(&mut self) {
        self.deadlines = [None; 4];
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<f64> {
        self.deadlines[kind.slot()]
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.deadline(kind).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.iter().all(Option::is_none)
    }

    /// Earliest pending deadline.
    pub fn earliest(&self) -> Option<f64> {
        self.next().map(|(_, at)| at)
    }

    fn next(&self) -> Option<(TimerKind, f64)> {
        TimerKind::ALL
            .iter()
            .filter_map(|k| self.deadline(*k).map(|at| (*k, at)))
            .fold(None, |best, cur| match best {
                Some((_, at)) if at <= cur.1 => best,
                _ => Some(cur),
            })
    }
}

pub struct Shell {
    config: SplashConfig,
    state: ShellState,
    timers: TimerSet,
    now: f64,
    mounted: bool,
}

impl Shell {
    /// Mount a shell at logical time 0. Rejects configs that fail
    /// [`SplashConfig::validate`].
    pub fn new(config: SplashConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut shell = Self {
            config,
            state: ShellState::default(),
            timers: TimerSet::default(),
            now: 0.0,
            mounted: true,
        };
        shell.reconcile(0.0);
        Ok(shell)
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn timers(&self) -> &TimerSet {
        &self.timers
    }

    pub fn config(&self) -> &SplashConfig {
        &self.config
    }

    /// Logical time reached by the last [`Shell::advance`].
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Earliest pending deadline, `None` once unmounted.
    pub fn next_deadline(&self) -> Option<f64> {
        if self.mounted { self.timers.earliest() } else { None }
    }

    /// Fire every timer due at or before `now`, in deadline order. Follow-up
    /// timers are armed relative to the deadline that fired them, so the
    /// schedule does not drift with callback latency. Returns whether the state
    /// changed.
    pub fn advance(&mut self, now: f64) -> bool {
        if !self.mounted || !now.is_finite() {
            return false;
        }
        let before = self.state.clone();
        while let Some((kind, at)) = self.timers.next() {
            if at > now {
                break;
            }
            self.timers.cancel(kind);
            self.fire(kind, at);
            self.reconcile(at);
        }
        if now > self.now {
            self.now = now;
        }
        self.state != before
    }

    /// Cancel every pending timer; later [`Shell::advance`] calls are no-ops.
    pub fn unmount(&mut self) {
        self.timers.cancel_all();
        self.mounted = false;
    }

    fn fire(&mut self, kind: TimerKind, at: f64) {
        let prev = self.state.clone();
        match kind {
            TimerKind::Progress => {
                self.state.percent += self.config.progress_step;
            }
            TimerKind::Reveal => {
                self.state.stage = Stage::Content;
                log::info!("splash content revealed at {at}ms");
            }
            TimerKind::Fault => {
                self.state.error = true;
                log::info!("scripted fault raised at {at}ms");
            }
            TimerKind::Recover => {
                self.state.error = false;
                self.state.recovered = true;
                log::info!("scripted fault cleared at {at}ms");
            }
        }
        check_transition(&prev, &self.state);
    }

    /// Effect pass: apply immediate transitions, then line the timer slots up
    /// with the new state.
    fn reconcile(&mut self, now: f64) {
        if self.state.stage == Stage::Loading && self.state.percent >= 100 {
            let prev = self.state.clone();
            self.state.stage = Stage::Fading;
            log::info!("preloader complete at {now}ms, fading overlay");
            check_transition(&prev, &self.state);
        }
        for kind in TimerKind::ALL {
            let wanted = kind.wanted(&self.state);
            if wanted && !self.timers.is_armed(kind) {
                self.timers.arm(kind, later_than(now, kind.delay(&self.config)));
            } else if !wanted && self.timers.cancel(kind) {
                log::debug!("{kind:?} timer cancelled at {now}ms");
            }
        }
    }
}

/// `now + delay`, bumped to the next representable instant when the sum rounds
/// back to `now`. A re-armed timer always lands strictly after the one that
/// armed it, so [`Shell::advance`] terminates.
fn later_than(now: f64, delay: f64) -> f64 {
    let at = now + delay;
    if at > now {
        at
    } else if now == 0.0 {
        f64::from_bits(1)
    } else if now > 0.0 {
        f64::from_bits(now.to_bits() + 1)
    } else {
        f64::from_bits(now.to_bits() - 1)
    }
}

/// Whether `next` is a legal successor of `prev`:
/// - stage never moves backwards
/// - percent never decreases, and only changes while loading
/// - the error flag only changes in `Content`
/// - `recovered` never clears, and only sets together with an error true→false edge
pub fn is_legal_transition(prev: &ShellState, next: &ShellState) -> bool {
    let stage_ok = next.stage >= prev.stage;
    let percent_ok = next.percent == prev.percent
        || (next.percent > prev.percent && prev.stage == Stage::Loading);
    let error_ok = next.error == prev.error
        || (prev.stage == Stage::Content && next.stage == Stage::Content);
    let recovered_ok = match (prev.recovered, next.recovered) {
        (true, false) => false,
        (false, true) => prev.error && !next.error,
        _ => true,
    };
    stage_ok && percent_ok && error_ok && recovered_ok
}

fn check_transition(prev: &ShellState, next: &ShellState) {
    debug_assert!(is_legal_transition(prev, next), "illegal shell transition {prev:?} -> {next:?}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shell() -> Shell {
        Shell::new(SplashConfig::default()).unwrap()
    }

    #[test]
    fn test_fresh_shell_arms_progress_only() {
        let s = shell();
        assert_eq!(s.state(), &ShellState::default());
        assert_eq!(s.timers().deadline(TimerKind::Progress), Some(30.0));
        for kind in [TimerKind::Reveal, TimerKind::Fault, TimerKind::Recover] {
            assert!(!s.timers().is_armed(kind), "{kind:?} armed too early");
        }
    }

    #[test]
    fn test_progress_ticks_by_step() {
        let mut s = shell();
        assert!(!s.advance(29.0));
        assert_eq!(s.state().percent, 0);
        assert!(s.advance(30.0));
        assert_eq!(s.state().percent, 2);
        assert_eq!(s.timers().deadline(TimerKind::Progress), Some(60.0));
        s.advance(95.0);
        assert_eq!(s.state().percent, 6);
    }

    #[test]
    fn test_fifty_ticks_fade_then_reveal() {
        let mut s = shell();
        s.advance(1470.0);
        assert_eq!(s.state().percent, 98);
        assert_eq!(s.state().stage, Stage::Loading);

        s.advance(1500.0);
        assert_eq!(s.state().percent, 100);
        assert_eq!(s.state().stage, Stage::Fading);
        assert!(!s.timers().is_armed(TimerKind::Progress));
        assert_eq!(s.timers().deadline(TimerKind::Reveal), Some(1900.0));

        s.advance(1899.0);
        assert_eq!(s.state().stage, Stage::Fading);
        s.advance(1900.0);
        assert_eq!(s.state().stage, Stage::Content);
        assert_eq!(s.timers().deadline(TimerKind::Fault), Some(16_900.0));
        assert!(!s.state().error);
    }

    #[test]
    fn test_error_waits_full_delay_after_content() {
        let mut s = shell();
        s.advance(16_899.0);
        assert_eq!(s.state().stage, Stage::Content);
        assert!(!s.state().error);
        s.advance(16_900.0);
        assert!(s.state().error);
        assert!(!s.state().recovered);
        assert!(!s.timers().is_armed(TimerKind::Fault));
        assert_eq!(s.timers().deadline(TimerKind::Recover), Some(31_900.0));
    }

    #[test]
    fn test_recovery_sets_flag_and_loop_repeats() {
        let mut s = shell();
        s.advance(31_900.0);
        assert_eq!(
            s.state(),
            &ShellState { percent: 100, stage: Stage::Content, error: false, recovered: true }
        );
        s.advance(46_900.0);
        assert!(s.state().error);
        assert!(s.state().recovered);
        s.advance(61_900.0);
        assert!(!s.state().error);
        assert!(s.state().recovered);
    }

    #[test]
    fn test_large_jump_replays_in_order() {
        let mut stepped = shell();
        let mut t = 0.0;
        while t <= 100_000.0 {
            stepped.advance(t);
            t += 10.0;
        }
        let mut jumped = shell();
        jumped.advance(100_000.0);
        assert_eq!(jumped.state(), stepped.state());
        assert_eq!(jumped.timers(), stepped.timers());
    }

    #[test]
    fn test_unmount_freezes_state() {
        let mut s = shell();
        s.advance(600.0);
        let frozen = s.state().clone();
        s.unmount();
        assert!(s.timers().is_empty());
        assert_eq!(s.next_deadline(), None);
        assert!(!s.advance(1_000_000.0));
        assert_eq!(s.state(), &frozen);
    }

    #[test]
    fn test_overshooting_step_still_fades() {
        let cfg = SplashConfig { progress_step: 3, ..SplashConfig::default() };
        let mut s = Shell::new(cfg).unwrap();
        s.advance(34.0 * 30.0);
        assert_eq!(s.state().percent, 102);
        assert_eq!(s.state().display_percent(), 100);
        assert_eq!(s.state().stage, Stage::Fading);
    }

    #[test]
    fn test_rejects_unvalidated_config() {
        let cfg = SplashConfig {
            fault_delay_ms: 1e-20,
            recover_delay_ms: 1e-20,
            ..SplashConfig::default()
        };
        assert!(matches!(Shell::new(cfg), Err(ConfigError::Delay { .. })));
        let cfg = SplashConfig { reveal_delay_ms: f64::NAN, ..SplashConfig::default() };
        assert!(Shell::new(cfg).is_err());
    }

    #[test]
    fn test_rearm_always_moves_forward() {
        assert_eq!(later_than(100.0, 30.0), 130.0);
        // 1e-20 vanishes next to 2000 and 1e20 swallows a 1ms delay.
        for (now, delay) in [(2_000.0, 1e-20), (1e20, 1.0), (0.0, 0.0), (0.0, -5.0)] {
            let at = later_than(now, delay);
            assert!(at > now, "{now} + {delay} re-armed at {at}");
        }
    }

    #[test]
    fn test_non_finite_now_is_ignored() {
        let mut s = shell();
        assert!(!s.advance(f64::INFINITY));
        assert!(!s.advance(f64::NAN));
        assert_eq!(s.state(), &ShellState::default());
        assert_eq!(s.now(), 0.0);
    }

    #[test]
    fn test_accessors_track_clock_and_mount() {
        let mut s = shell();
        assert_eq!(s.config(), &SplashConfig::default());
        assert!(s.is_mounted());
        s.advance(45.0);
        assert_eq!(s.now(), 45.0);
        // The clock never runs backwards.
        s.advance(10.0);
        assert_eq!(s.now(), 45.0);
        s.unmount();
        assert!(!s.is_mounted());
    }

    #[test]
    fn test_timer_set_tie_breaks_by_declaration() {
        let mut t = TimerSet::default();
        t.arm(TimerKind::Recover, 10.0);
        t.arm(TimerKind::Reveal, 10.0);
        t.arm(TimerKind::Fault, 20.0);
        assert_eq!(t.next(), Some((TimerKind::Reveal, 10.0)));
        assert!(t.cancel(TimerKind::Reveal));
        assert!(!t.cancel(TimerKind::Reveal));
        assert_eq!(t.next(), Some((TimerKind::Recover, 10.0)));
        t.cancel_all();
        assert_eq!(t.earliest(), None);
    }

    #[test]
    fn test_illegal_transitions_are_detected() {
        let content = ShellState { percent: 100, stage: Stage::Content, ..ShellState::default() };
        let back = ShellState { stage: Stage::Fading, ..content.clone() };
        assert!(!is_legal_transition(&content, &back));

        let loading = ShellState::default();
        let early_error = ShellState { error: true, ..loading.clone() };
        assert!(!is_legal_transition(&loading, &early_error));

        let spurious = ShellState { recovered: true, ..content.clone() };
        assert!(!is_legal_transition(&content, &spurious));

        let percent_after = ShellState { percent: 102, ..content.clone() };
        assert!(!is_legal_transition(&content, &percent_after));
    }
}
