use std::fmt::Display;

/// Observable state of an adapter's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never opened.
    Unopened,
    /// An open was attempted and the engine refused it. Terminal for the instance.
    Failed,
    /// Holding a live native handle.
    Open,
    /// Closed explicitly. Terminal for the instance.
    Closed,
}

enum Slot<H> {
    Unopened,
    Failed,
    Open(H),
    Closed,
}

/// Owns an adapter's native handle and enforces `Unopened → Open → Closed`.
///
/// The handle exists exactly while the state is `Open`. It is released once, either by
/// [`Lifecycle::close`] or when the lifecycle is dropped.
pub(crate) struct Lifecycle<H> {
    slot: Slot<H>,
    name: String,
}

impl<H> Lifecycle<H> {
    pub(crate) fn new() -> Self {
        Self {
            slot: Slot::Unopened,
            name: String::new(),
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        match self.slot {
            Slot::Unopened => ConnectionState::Unopened,
            Slot::Failed => ConnectionState::Failed,
            Slot::Open(_) => ConnectionState::Open,
            Slot::Closed => ConnectionState::Closed,
        }
    }

    pub(crate) fn is_ready(&self) -> bool {
        matches!(self.slot, Slot::Open(_))
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Run `connect` if and only if nothing was attempted yet.
    ///
    /// Failure is swallowed (logged at `warn`) and leaves the instance permanently unready.
    /// Returns readiness after the call.
    pub(crate) fn open_with<E, F>(&mut self, name: impl Into<String>, connect: F) -> bool
    where
        E: Display,
        F: FnOnce() -> Result<H, E>,
    {
        if !matches!(self.slot, Slot::Unopened) {
            tracing::debug!(database = %self.name, state = ?self.state(), "open ignored");
            return self.is_ready();
        }

        self.name = name.into();
        match connect() {
            Ok(handle) => {
                tracing::debug!(database = %self.name, "connection opened");
                self.slot = Slot::Open(handle);
                true
            }
            Err(err) => {
                tracing::warn!(database = %self.name, error = %err, "failed to open connection");
                self.slot = Slot::Failed;
                false
            }
        }
    }

    pub(crate) fn handle(&self) -> Option<&H> {
        if let Slot::Open(handle) = &self.slot {
            Some(handle)
        } else {
            None
        }
    }

    /// Move the handle out for release. `None` (and no state change) unless currently open.
    pub(crate) fn close(&mut self) -> Option<H> {
        if !self.is_ready() {
            return None;
        }
        match std::mem::replace(&mut self.slot, Slot::Closed) {
            Slot::Open(handle) => {
                tracing::debug!(database = %self.name, "connection closed");
                Some(handle)
            }
            other => {
                self.slot = other;
                None
            }
        }
    }
}

impl<H> Default for Lifecycle<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Handle(Rc<Cell<u32>>);

    impl Drop for Handle {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn open_then_close_releases_once() {
        let released = Rc::new(Cell::new(0));
        let mut lc = Lifecycle::new();
        let r = released.clone();
        assert!(lc.open_with("db", || Ok::<_, String>(Handle(r))));
        assert_eq!(lc.state(), ConnectionState::Open);
        assert_eq!(lc.name(), "db");

        drop(lc.close());
        assert_eq!(released.get(), 1);
        assert!(lc.close().is_none());
        drop(lc);
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn drop_while_open_releases() {
        let released = Rc::new(Cell::new(0));
        let mut lc = Lifecycle::new();
        let r = released.clone();
        lc.open_with("db", || Ok::<_, String>(Handle(r)));
        drop(lc);
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn failed_open_is_terminal() {
        let mut lc: Lifecycle<u8> = Lifecycle::new();
        assert!(!lc.open_with("db", || Err("refused")));
        assert_eq!(lc.state(), ConnectionState::Failed);

        let mut called = false;
        assert!(!lc.open_with("db", || {
            called = true;
            Ok::<_, String>(1)
        }));
        assert!(!called);
        assert!(lc.handle().is_none());
    }

    #[test]
    fn close_on_unopened_is_noop() {
        let mut lc: Lifecycle<u8> = Lifecycle::new();
        assert!(lc.close().is_none());
        assert!(lc.close().is_none());
        assert_eq!(lc.state(), ConnectionState::Unopened);
        assert!(!lc.is_ready());
    }

    #[test]
    fn closed_is_terminal() {
        let mut lc: Lifecycle<u8> = Lifecycle::new();
        lc.open_with("db", || Ok::<_, String>(1));
        assert_eq!(lc.close(), Some(1));
        assert!(!lc.open_with("db", || Ok::<_, String>(2)));
        assert_eq!(lc.state(), ConnectionState::Closed);
    }
}
