//! Cross-fade between background images
//!
//! The old image fades out, the staged image is swapped in, then it
//! fades in: `Idle -> FadingOut -> FadingIn -> Idle`. Frames are fed in
//! through `advance`, which reports the swap and the end of the fade.

use std::time::{Duration, Instant};

/// Length of each fade phase
pub const FADE_DURATION: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    FadingOut { started: Instant },
    FadingIn { started: Instant },
}

/// Result of advancing the animation to a new frame
#[derive(Debug, Clone, PartialEq)]
pub enum Step<T> {
    /// Still animating (or idle)
    Continue,
    /// Fade-out finished: display this value, fade-in has started
    Swap(T),
    /// Fade-in finished: back to idle
    Finished,
}

#[derive(Debug, Clone)]
pub struct Transition<T> {
    phase: Phase,
    staged: Option<T>,
    duration: Duration,
    opacity: f32,
}

impl<T> Default for Transition<T> {
    fn default() -> Self {
        Self::new(FADE_DURATION)
    }
}

impl<T> Transition<T> {
    pub fn new(duration: Duration) -> Self {
        Self {
            phase: Phase::Idle,
            staged: None,
            duration,
            opacity: 1.0,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Opacity of the displayed image at the last frame
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Stage `next` for display.
    ///
    /// During a fade-out the staged value is replaced. During a fade-in
    /// the fade reverses from the current opacity, so the picture never
    /// jumps.
    pub fn begin(&mut self, next: T, now: Instant) {
        self.staged = Some(next);

        match self.phase {
            Phase::Idle => {
                self.phase = Phase::FadingOut { started: now };
                self.opacity = 1.0;
            }
            Phase::FadingOut { .. } => {}
            Phase::FadingIn { .. } => {
                let faded_in = self.progress(now);
                let remaining = self.duration.mul_f32(1.0 - faded_in);
                self.phase = Phase::FadingOut {
                    started: now.checked_sub(remaining).unwrap_or(now),
                };
                self.opacity = faded_in;
            }
        }
    }

    /// Move the animation to `now`
    pub fn advance(&mut self, now: Instant) -> Step<T> {
        let progress = self.progress(now);

        match self.phase {
            Phase::Idle => Step::Continue,
            Phase::FadingOut { .. } => {
                if progress < 1.0 {
                    self.opacity = 1.0 - progress;
                    return Step::Continue;
                }

                match self.staged.take() {
                    Some(next) => {
                        self.phase = Phase::FadingIn { started: now };
                        self.opacity = 0.0;
                        Step::Swap(next)
                    }
                    None => {
                        self.phase = Phase::Idle;
                        self.opacity = 1.0;
                        Step::Finished
                    }
                }
            }
            Phase::FadingIn { .. } => {
                if progress < 1.0 {
                    self.opacity = progress;
                    return Step::Continue;
                }

                self.phase = Phase::Idle;
                self.opacity = 1.0;
                Step::Finished
            }
        }
    }

    /// Fraction of the current phase elapsed, in 0..=1
    fn progress(&self, now: Instant) -> f32 {
        let started = match self.phase {
            Phase::Idle => return 1.0,
            Phase::FadingOut { started } | Phase::FadingIn { started } => started,
        };

        if self.duration.is_zero() {
            return 1.0;
        }

        let elapsed = now.saturating_duration_since(started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_full_cycle_swaps_once() {
        let start = Instant::now();
        let mut transition = Transition::new(ms(400));

        transition.begin("next", start);
        assert!(matches!(transition.phase, Phase::FadingOut { .. }));

        assert_eq!(transition.advance(start + ms(200)), Step::Continue);
        assert!((transition.opacity() - 0.5).abs() < 0.01);

        assert_eq!(transition.advance(start + ms(400)), Step::Swap("next"));
        assert_eq!(transition.opacity(), 0.0);
        assert!(matches!(transition.phase, Phase::FadingIn { .. }));

        assert_eq!(transition.advance(start + ms(600)), Step::Continue);
        assert!((transition.opacity() - 0.5).abs() < 0.01);

        assert_eq!(transition.advance(start + ms(800)), Step::Finished);
        assert_eq!(transition.phase, Phase::Idle);
        assert_eq!(transition.opacity(), 1.0);
        assert_eq!(transition.advance(start + ms(900)), Step::Continue);
    }

    #[test]
    fn test_restage_during_fade_out_keeps_latest() {
        let start = Instant::now();
        let mut transition = Transition::new(ms(400));

        transition.begin(1, start);
        transition.advance(start + ms(100));
        transition.begin(2, start + ms(150));

        assert_eq!(transition.advance(start + ms(400)), Step::Swap(2));
    }

    #[test]
    fn test_restage_during_fade_in_reverses_smoothly() {
        let start = Instant::now();
        let mut transition = Transition::new(ms(400));

        transition.begin(1, start);
        assert_eq!(transition.advance(start + ms(400)), Step::Swap(1));
        transition.advance(start + ms(700));
        let before = transition.opacity();
        assert!((before - 0.75).abs() < 0.01);

        transition.begin(2, start + ms(700));
        assert!(matches!(transition.phase, Phase::FadingOut { .. }));
        assert_eq!(transition.advance(start + ms(700)), Step::Continue);
        assert!((transition.opacity() - before).abs() < 0.01);

        assert_eq!(transition.advance(start + ms(1_000)), Step::Swap(2));
    }

    #[test]
    fn test_idle_does_nothing() {
        let mut transition: Transition<u8> = Transition::default();
        assert!(!transition.is_animating());
        assert_eq!(transition.advance(Instant::now()), Step::Continue);
        assert_eq!(transition.opacity(), 1.0);
    }
}
