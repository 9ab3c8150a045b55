//! # Admission Control
//!
//! A counting gate over in-flight calls; calls beyond the limit are
//! rejected immediately rather than queued.

use core::{
    num::NonZeroUsize,
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::{PMResult, PiecemealError, concurrency::threads::est_max_parallelism};

/// In-flight calls allowed per unit of available parallelism, by default.
pub const DEFAULT_IN_FLIGHT_PER_THREAD: usize = 4;

/// The default in-flight limit.
pub fn default_admission_limit() -> NonZeroUsize {
    NonZeroUsize::new(est_max_parallelism() * DEFAULT_IN_FLIGHT_PER_THREAD)
        .unwrap_or(NonZeroUsize::MIN)
}

/// A gate bounding concurrent calls.
#[derive(Debug)]
pub struct AdmissionGate {
    in_flight: AtomicUsize,
    limit: usize,
}

impl AdmissionGate {
    /// Create a gate admitting at most `limit` concurrent calls.
    pub fn new(limit: NonZeroUsize) -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            limit: limit.get(),
        }
    }

    /// The in-flight limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The current number of admitted calls.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Admit a call, or reject it with [`PiecemealError::Overloaded`].
    ///
    /// The call stays admitted until the returned permit is dropped.
    pub fn try_acquire(&self) -> PMResult<AdmissionPermit<'_>> {
        let mut current = self.in_flight.load(Ordering::Acquire);
        loop {
            if current >= self.limit {
                log::warn!(
                    "admission rejected: {current} calls in flight, limit is {}",
                    self.limit
                );
                return Err(PiecemealError::Overloaded {
                    in_flight: current,
                    limit: self.limit,
                });
            }
            match self.in_flight.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
        Ok(AdmissionPermit { gate: self })
    }
}

impl Default for AdmissionGate {
    fn default() -> Self {
        Self::new(default_admission_limit())
    }
}

/// An admitted call; releases its slot on drop.
#[derive(Debug)]
pub struct AdmissionPermit<'a> {
    gate: &'a AdmissionGate,
}

impl Drop for AdmissionPermit<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn test_limit() {
        let gate = AdmissionGate::new(NonZeroUsize::new(2).unwrap());
        let a = gate.try_acquire().unwrap();
        let b = gate.try_acquire().unwrap();
        assert_eq!(gate.in_flight(), 2);

        match gate.try_acquire() {
            Err(PiecemealError::Overloaded { in_flight, limit }) => {
                assert_eq!((in_flight, limit), (2, 2));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(gate.in_flight(), 2);

        drop(a);
        let _c = gate.try_acquire().unwrap();
        drop(b);
        assert_eq!(gate.in_flight(), 1);
    }

    #[test]
    fn test_default_limit() {
        assert!(default_admission_limit().get() >= DEFAULT_IN_FLIGHT_PER_THREAD);
        assert_eq!(AdmissionGate::default().in_flight(), 0);
    }

    #[test]
    fn test_threads_never_exceed_limit() {
        let gate = Arc::new(AdmissionGate::new(NonZeroUsize::new(3).unwrap()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = gate.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        if let Ok(_permit) = gate.try_acquire() {
                            assert!(gate.in_flight() <= 3);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(gate.in_flight(), 0);
    }
}
