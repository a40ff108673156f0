use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Run state of a session, stored in an `AtomicU8`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    /// No run in progress; `start` allowed
    Idle = 0,
    /// Emitter running
    Active = 1,
    /// Stop requested, emitter has not yet exited
    Stopping = 2,
}

impl RunState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Active,
            2 => Self::Stopping,
            _ => Self::Idle,
        }
    }
}

/// Shared view of one session's liveness, handed to the run task.
///
/// All transitions are compare-and-set, so concurrent start/stop/disconnect
/// handlers cannot start two runs or lose a stop.
#[derive(Debug)]
pub struct SessionHandle {
    id: String,
    connected: AtomicBool,
    state: AtomicU8,
}

impl SessionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            connected: AtomicBool::new(true),
            state: AtomicU8::new(RunState::Idle as u8),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// True while the client is connected and the current run has not been stopped
    pub fn is_live(&self) -> bool {
        self.is_connected() && self.state() == RunState::Active
    }

    /// Idle → Active. Returns false if a run is already in progress.
    pub fn try_begin(&self) -> bool {
        self.is_connected() && self.transition(RunState::Idle, RunState::Active)
    }

    /// Active → Stopping. Returns false if nothing was running.
    pub fn request_stop(&self) -> bool {
        self.transition(RunState::Active, RunState::Stopping)
    }

    /// Mark the client gone and stop any active run
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.request_stop();
    }

    /// Called by the run task as its last action
    pub fn finish(&self) {
        self.state.store(RunState::Idle as u8, Ordering::SeqCst);
    }

    fn transition(&self, from: RunState, to: RunState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight() {
        let handle = SessionHandle::new("s");
        assert!(handle.try_begin());
        assert!(!handle.try_begin());
        assert!(handle.is_live());

        assert!(handle.request_stop());
        assert!(!handle.is_live());
        assert!(!handle.try_begin(), "stopping run still occupies the session");

        handle.finish();
        assert!(handle.try_begin());
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let handle = SessionHandle::new("s");
        assert!(!handle.request_stop());
        assert_eq!(handle.state(), RunState::Idle);
    }

    #[test]
    fn test_disconnect_blocks_new_runs() {
        let handle = SessionHandle::new("s");
        assert!(handle.try_begin());
        handle.disconnect();
        assert!(!handle.is_live());
        handle.finish();
        assert!(!handle.try_begin());
    }
}
