use std::sync::atomic::{AtomicBool, Ordering};

use crate::logging::{log, obj, v_str, Domain, Level};

/// A page component constructed once at startup. Events reaching a detached
/// component are dropped.
pub trait Component {
    fn name(&self) -> &'static str;
    fn attach(&self);
    fn dispose(&self);
    fn is_attached(&self) -> bool;
}

#[derive(Debug, Default)]
pub struct Lifecycle {
    attached: AtomicBool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if it was already attached.
    pub fn attach(&self) -> bool {
        !self.attached.swap(true, Ordering::SeqCst)
    }

    /// Returns false if it was already detached.
    pub fn dispose(&self) -> bool {
        self.attached.swap(false, Ordering::SeqCst)
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Guard for event handlers; logs the drop.
    pub fn accepts(&self, domain: Domain, component: &str, event: &str) -> bool {
        if self.is_attached() {
            return true;
        }
        log(
            Level::Debug,
            domain,
            "event_dropped",
            obj(&[("component", v_str(component)), ("event", v_str(event))]),
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_dispose_idempotent() {
        let l = Lifecycle::new();
        assert!(!l.is_attached());
        assert!(l.attach());
        assert!(!l.attach());
        assert!(l.accepts(Domain::Nav, "nav", "click"));
        assert!(l.dispose());
        assert!(!l.dispose());
        assert!(!l.accepts(Domain::Nav, "nav", "click"));
    }
}
