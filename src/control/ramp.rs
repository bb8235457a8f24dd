//! Backlight ramp controller.
//!
//! Moves a bounded intensity value toward a moving target over a fixed
//! wall-clock budget.  The transition is constant-*time*, not constant-rate:
//! the budget is divided evenly across however many steps the path needs, so
//! a full-scale sweep and a two-step nudge both settle in roughly
//! `transition_budget`.
//!
//! ## Preemption by value
//!
//! There is no cancellation signal.  A worker re-reads `target` after every
//! step and replans from its current position when the target moved — the
//! divergence is bounded by one step.  Retargeting restarts the per-step
//! pacing for the remaining distance, so an interrupted-then-redirected
//! ramp can take longer than one budget in total.  Setting the target to
//! the current value makes the worker exit on its next check.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::app::ports::IntensitySink;
use crate::control::lock;
use crate::drivers::task_pin::{self, Core};
use crate::error::ActuatorError;

/// Worker liveness, guarded by the same lock as the ramp state.  A new
/// worker is spawned only on the `Idle → Running` transition; the worker
/// flips it back just before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerState {
    Idle,
    Running,
}

struct RampState<S> {
    current: i32,
    /// `None` when no ramp is requested or the last one has settled.
    target: Option<i32>,
    worker: WorkerState,
    sink: S,
}

struct Shared<S> {
    min: i32,
    max: i32,
    budget: Duration,
    state: Mutex<RampState<S>>,
}

impl<S: IntensitySink> Shared<S> {
    /// The per-step primitive: validate, then mutate `current` and mirror
    /// it to the sink.  Rejection leaves `current` untouched.
    fn write_locked(&self, state: &mut RampState<S>, value: i32) -> Result<(), ActuatorError> {
        if value < self.min || value > self.max {
            return Err(ActuatorError::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            });
        }
        state.current = value;
        state.sink.write(value);
        Ok(())
    }
}

/// Controller for one bounded intensity output.
///
/// Cheap to clone handles are not provided; the service owns the single
/// instance and the worker thread holds the only other reference.
pub struct RampController<S: IntensitySink + Send + 'static> {
    shared: Arc<Shared<S>>,
}

impl<S: IntensitySink + Send + 'static> RampController<S> {
    /// Take ownership of the sink.  `current` starts at the midpoint of
    /// the configured range and is written to the sink immediately, so the
    /// hardware and the controller agree from the first instant.
    pub fn new(sink: S, min: i32, max: i32, budget: Duration) -> Result<Self, crate::error::Error> {
        if min > max {
            return Err(crate::error::Error::Config(
                "min_brightness must not exceed max_brightness",
            ));
        }

        let midpoint = min + (max - min) / 2;
        let shared = Arc::new(Shared {
            min,
            max,
            budget,
            state: Mutex::new(RampState {
                current: midpoint,
                target: None,
                worker: WorkerState::Idle,
                sink,
            }),
        });

        {
            let mut state = lock(&shared.state);
            state.sink.write(midpoint);
        }

        Ok(Self { shared })
    }

    /// Set the intensity synchronously, bypassing the ramp.  Fails with
    /// [`ActuatorError::OutOfRange`] for values outside `[min, max]`,
    /// leaving `current` unchanged.
    pub fn set_immediate(&self, value: i32) -> Result<(), ActuatorError> {
        let mut state = lock(&self.shared.state);
        self.shared.write_locked(&mut state, value)
    }

    /// Record a new ramp target and ensure a worker is driving toward it.
    ///
    /// No up-front range validation: an out-of-range target surfaces as a
    /// deferred range error inside the worker once the path crosses the
    /// boundary, which is logged and terminates the worker at the limit.
    pub fn set_target_smooth(&self, value: i32) {
        let mut state = lock(&self.shared.state);
        if state.current == value {
            // Already there — also tells an active worker to exit.
            state.target = None;
            return;
        }
        state.target = Some(value);
        if state.worker == WorkerState::Idle {
            state.worker = WorkerState::Running;
            let shared = Arc::clone(&self.shared);
            // Detached: the worker announces its own exit via WorkerState.
            let _ = task_pin::spawn_on_core(Core::App, 5, 8, "backlight\0", move || {
                ramp_worker(&shared);
            });
        }
        // A running worker picks the new target up on its next step.
    }

    /// Last value written to the sink.
    pub fn current(&self) -> i32 {
        lock(&self.shared.state).current
    }

    /// Pending target, if a ramp is outstanding.
    pub fn target(&self) -> Option<i32> {
        lock(&self.shared.state).target
    }

    /// Whether a worker thread is currently driving a transition.
    pub fn is_ramping(&self) -> bool {
        lock(&self.shared.state).worker == WorkerState::Running
    }

    pub fn min(&self) -> i32 {
        self.shared.min
    }

    pub fn max(&self) -> i32 {
        self.shared.max
    }
}

/// Inclusive step count (the path re-walks `from`) and per-step pace for one
/// planned transition.  Widened to u64/u128 so a full-range i32 sweep cannot
/// wrap the step count or divide the budget by zero.
fn plan(from: i32, goal: i32, budget: Duration) -> (u64, Duration) {
    let steps = u64::from(goal.abs_diff(from)) + 1;
    let pace = Duration::from_nanos((budget.as_nanos() / u128::from(steps)) as u64);
    (steps, pace)
}

fn ramp_worker<S: IntensitySink>(shared: &Shared<S>) {
    loop {
        // Plan the next monotonic path under the lock.
        let (from, goal) = {
            let mut state = lock(&shared.state);
            match state.target {
                Some(t) if t != state.current => (state.current, t),
                _ => {
                    state.target = None;
                    state.worker = WorkerState::Idle;
                    return;
                }
            }
        };

        let (steps, pace) = plan(from, goal, shared.budget);
        let ascending = goal > from;

        log::debug!("backlight: ramping {from} -> {goal} ({steps} steps)");

        let mut value = from;
        loop {
            {
                let mut state = lock(&shared.state);
                if let Err(e) = shared.write_locked(&mut state, value) {
                    // Deferred failure for an unvalidated target: there is
                    // no caller context to receive it, so log and stop at
                    // the boundary.
                    log::error!("backlight: ramp aborted — {e}");
                    state.target = None;
                    state.worker = WorkerState::Idle;
                    return;
                }
            }
            std::thread::sleep(pace);

            let retargeted = lock(&shared.state).target != Some(goal);
            if retargeted || value == goal {
                break;
            }
            value += if ascending { 1 } else { -1 };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    struct FakeBacklight(Arc<AtomicI32>);

    impl IntensitySink for FakeBacklight {
        fn write(&mut self, value: i32) {
            self.0.store(value, Ordering::SeqCst);
        }
    }

    fn controller(min: i32, max: i32) -> (RampController<FakeBacklight>, Arc<AtomicI32>) {
        let last = Arc::new(AtomicI32::new(-1));
        let ctl = RampController::new(
            FakeBacklight(Arc::clone(&last)),
            min,
            max,
            Duration::from_millis(50),
        )
        .unwrap();
        (ctl, last)
    }

    #[test]
    fn construction_writes_midpoint() {
        let (ctl, last) = controller(0, 255);
        assert_eq!(ctl.current(), 127);
        assert_eq!(last.load(Ordering::SeqCst), 127);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let last = Arc::new(AtomicI32::new(-1));
        let result = RampController::new(
            FakeBacklight(Arc::clone(&last)),
            10,
            0,
            Duration::from_millis(50),
        );
        assert!(result.is_err());
    }

    #[test]
    fn immediate_write_in_range() {
        let (ctl, last) = controller(0, 255);
        ctl.set_immediate(40).unwrap();
        assert_eq!(ctl.current(), 40);
        assert_eq!(last.load(Ordering::SeqCst), 40);
    }

    #[test]
    fn immediate_write_out_of_range_leaves_state() {
        let (ctl, last) = controller(0, 255);
        let err = ctl.set_immediate(300).unwrap_err();
        assert_eq!(
            err,
            ActuatorError::OutOfRange {
                value: 300,
                min: 0,
                max: 255
            }
        );
        assert_eq!(ctl.current(), 127);
        assert_eq!(last.load(Ordering::SeqCst), 127);
    }

    #[test]
    fn plan_divides_budget_evenly_across_inclusive_path() {
        let (steps, pace) = plan(0, 255, Duration::from_millis(512));
        assert_eq!(steps, 256);
        assert_eq!(pace, Duration::from_millis(2));
    }

    #[test]
    fn plan_survives_full_range_extremes() {
        let (steps, pace) = plan(i32::MIN, i32::MAX, Duration::from_millis(500));
        assert_eq!(steps, 1u64 << 32);
        assert_eq!(pace, Duration::ZERO);
    }

    #[test]
    fn target_equal_to_current_spawns_no_worker() {
        let (ctl, _) = controller(0, 255);
        ctl.set_target_smooth(127);
        assert!(!ctl.is_ramping());
        assert_eq!(ctl.target(), None);
    }
}
