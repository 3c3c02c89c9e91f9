//! Time source abstraction
//!
//! Header search is bounded by wall-clock time, so the protocol needs a
//! monotonic clock. Firmware typically backs this with a hardware timer.

/// Monotonic millisecond clock
pub trait Clock {
    /// Milliseconds since an arbitrary fixed epoch
    ///
    /// Must never go backwards.
    fn now_ms(&self) -> u64;

    /// Milliseconds elapsed since `start` (a previous `now_ms` reading)
    fn elapsed_ms(&self, start: u64) -> u64 {
        self.now_ms().saturating_sub(start)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Host clock backed by `std::time::Instant`
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    epoch: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    pub fn new() -> Self {
        Self {
            epoch: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct Stepping(Cell<u64>);

    impl Clock for Stepping {
        fn now_ms(&self) -> u64 {
            let now = self.0.get();
            self.0.set(now + 5);
            now
        }
    }

    #[test]
    fn test_elapsed_since_start() {
        let clock = Stepping(Cell::new(100));
        let start = clock.now_ms();
        assert_eq!(start, 100);
        assert_eq!(clock.elapsed_ms(start), 5);
    }

    #[test]
    fn test_elapsed_saturates() {
        let clock = Stepping(Cell::new(10));
        assert_eq!(clock.elapsed_ms(1_000), 0);
    }
}
