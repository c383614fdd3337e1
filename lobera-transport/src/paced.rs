//! Paced transport layer
//!
//! `PacedTransport` wraps a raw `ControlChannel` and holds every request
//! back until the settle time declared by the previous requests has
//! passed. The firmware persists each table before it accepts the next
//! command; requests that arrive early leave it in an inconsistent state.
//!
//! Two independent deadlines are tracked. Every completed request pushes
//! both forward by the cooldown the caller declared for it:
//!
//! ```text
//! next_read  = max(next_read,  done + cooldown.read)
//! next_write = max(next_write, done + cooldown.write)
//! ```
//!
//! Requests are never reordered, retried or issued concurrently.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::TransportError;
use crate::protocol::req;
use crate::types::Cooldown;
use crate::ControlChannel;

/// Time source used for pacing
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall clock, blocks the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Virtual clock that advances only when slept on
///
/// Lets tests run multi-second write sequences instantly while still
/// observing exactly when each request would have been issued.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    elapsed: Cell<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
        }
    }

    /// Virtual time since the clock was created
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }

    /// Move time forward without sleeping
    pub fn advance(&self, duration: Duration) {
        self.elapsed.set(self.elapsed.get() + duration);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

impl<K: Clock + ?Sized> Clock for Rc<K> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// A channel wrapper that enforces the firmware's settle times
pub struct PacedTransport<C, K = SystemClock> {
    inner: C,
    clock: K,
    next_read: Instant,
    next_write: Instant,
}

impl<C: ControlChannel> PacedTransport<C> {
    /// Wrap a channel, pacing on the wall clock
    pub fn new(inner: C) -> Self {
        Self::with_clock(inner, SystemClock)
    }
}

impl<C: ControlChannel, K: Clock> PacedTransport<C, K> {
    /// Wrap a channel with an explicit time source
    pub fn with_clock(inner: C, clock: K) -> Self {
        let now = clock.now();
        Self {
            inner,
            clock,
            next_read: now,
            next_write: now,
        }
    }

    /// Access the wrapped channel
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Mutable access to the wrapped channel (bypasses pacing)
    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Unwrap into the raw channel
    pub fn into_inner(self) -> C {
        self.inner
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Earliest instant the next read may start
    pub fn next_read(&self) -> Instant {
        self.next_read
    }

    /// Earliest instant the next write may start
    pub fn next_write(&self) -> Instant {
        self.next_write
    }

    /// Paced IN transfer
    ///
    /// Blocks until the read deadline, performs the transfer, then applies
    /// `cooldown` to both deadlines.
    pub fn read(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        size: usize,
        cooldown: Cooldown,
    ) -> Result<Vec<u8>, TransportError> {
        self.wait_until(self.next_read);
        debug!(
            "Read {} (0x{:02X}) value=0x{:04X} index=0x{:04X} size={}",
            req::read_name(request),
            request,
            value,
            index,
            size
        );
        let result = self.inner.receive(request, value, index, size);
        self.settle(cooldown);
        result
    }

    /// Paced OUT transfer
    ///
    /// Fails with `ShortTransfer` if the device accepted fewer bytes than
    /// `payload` holds.
    pub fn write(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        payload: &[u8],
        cooldown: Cooldown,
    ) -> Result<(), TransportError> {
        self.wait_until(self.next_write);
        debug!(
            "Write {} (0x{:02X}) value=0x{:04X} index=0x{:04X} len={}",
            req::write_name(request),
            request,
            value,
            index,
            payload.len()
        );
        let result = self.inner.send(request, value, index, payload);
        // The device may have acted on a failed transfer too
        self.settle(cooldown);

        let written = result?;
        if written != payload.len() {
            return Err(TransportError::ShortTransfer {
                request,
                expected: payload.len(),
                actual: written,
            });
        }
        Ok(())
    }

    fn wait_until(&self, deadline: Instant) {
        let now = self.clock.now();
        if now < deadline {
            let wait = deadline - now;
            trace!("Pacing: sleeping {}ms", wait.as_millis());
            self.clock.sleep(wait);
        }
    }

    fn settle(&mut self, cooldown: Cooldown) {
        let done = self.clock.now();
        self.next_read = self.next_read.max(done + cooldown.read);
        self.next_write = self.next_write.max(done + cooldown.write);
    }
}
