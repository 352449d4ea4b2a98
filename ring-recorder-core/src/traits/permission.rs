use std::thread;
use std::time::{Duration, Instant};

/// Host capability answering whether microphone access is allowed.
///
/// Desktop hosts usually return `true` unconditionally; mobile hosts surface
/// an OS prompt from `request`.
pub trait PermissionGate: Send + Sync {
    fn is_granted(&self) -> bool;

    /// Ask the user for access. Must not block on the answer.
    fn request(&self);
}

/// Request permission once and poll until it is granted or `timeout` elapses.
///
/// Returns whether access was granted.
pub fn wait_for_permission(gate: &dyn PermissionGate, timeout: Duration, interval: Duration) -> bool {
    if gate.is_granted() {
        return true;
    }

    log::info!("requesting microphone permission");
    gate.request();

    let started = Instant::now();
    while started.elapsed() < timeout {
        thread::sleep(interval);
        if gate.is_granted() {
            log::info!("microphone permission granted after {:?}", started.elapsed());
            return true;
        }
    }

    log::warn!("microphone permission not granted within {:?}", timeout);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Grants access after a fixed number of checks.
    struct CountingGate {
        checks: AtomicUsize,
        grant_after: usize,
        requests: AtomicUsize,
    }

    impl PermissionGate for CountingGate {
        fn is_granted(&self) -> bool {
            self.checks.fetch_add(1, Ordering::SeqCst) + 1 > self.grant_after
        }

        fn request(&self) {
            self.requests.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn already_granted_skips_request() {
        let gate = CountingGate {
            checks: AtomicUsize::new(0),
            grant_after: 0,
            requests: AtomicUsize::new(0),
        };
        assert!(wait_for_permission(&gate, Duration::from_millis(50), Duration::from_millis(1)));
        assert_eq!(gate.requests.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn granted_while_waiting() {
        let gate = CountingGate {
            checks: AtomicUsize::new(0),
            grant_after: 3,
            requests: AtomicUsize::new(0),
        };
        assert!(wait_for_permission(&gate, Duration::from_secs(5), Duration::from_millis(1)));
        assert_eq!(gate.requests.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn times_out_when_never_granted() {
        let gate = CountingGate {
            checks: AtomicUsize::new(0),
            grant_after: usize::MAX,
            requests: AtomicUsize::new(0),
        };
        assert!(!wait_for_permission(&gate, Duration::from_millis(20), Duration::from_millis(5)));
    }
}
