#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnState::Disconnected => "disconnected",
            ConnState::Connecting => "connecting",
            ConnState::Connected => "connected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnEvent {
    Dial,
    Opened,
    DialFailed,
    /// Socket closed or errored after it was open.
    Dropped,
    Dispose,
}

#[derive(Debug, Clone)]
pub struct TransitionError {
    pub msg: String,
}

/// Connection lifecycle of the push channel plus its failed-dial counter.
#[derive(Debug, Clone)]
pub struct Connection {
    pub state: ConnState,
    pub failed_dials: u32,
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection {
    pub fn new() -> Self {
        Self {
            state: ConnState::Disconnected,
            failed_dials: 0,
        }
    }
}

pub fn apply_event(conn: &mut Connection, event: ConnEvent) -> Result<(), TransitionError> {
    match (conn.state, event) {
        (ConnState::Disconnected, ConnEvent::Dial) => {
            conn.state = ConnState::Connecting;
            Ok(())
        }
        (ConnState::Connecting, ConnEvent::Opened) => {
            conn.state = ConnState::Connected;
            conn.failed_dials = 0;
            Ok(())
        }
        (ConnState::Connecting, ConnEvent::DialFailed) => {
            conn.state = ConnState::Disconnected;
            conn.failed_dials += 1;
            Ok(())
        }
        (ConnState::Connected, ConnEvent::Dropped) => {
            conn.state = ConnState::Disconnected;
            Ok(())
        }
        (_, ConnEvent::Dispose) => {
            conn.state = ConnState::Disconnected;
            Ok(())
        }
        (state, event) => Err(TransitionError {
            msg: format!("invalid transition {:?} on {:?}", event, state),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_cycle() {
        let mut c = Connection::new();
        apply_event(&mut c, ConnEvent::Dial).unwrap();
        assert_eq!(c.state, ConnState::Connecting);
        apply_event(&mut c, ConnEvent::Opened).unwrap();
        assert_eq!(c.state, ConnState::Connected);
        apply_event(&mut c, ConnEvent::Dropped).unwrap();
        assert_eq!(c.state, ConnState::Disconnected);
        apply_event(&mut c, ConnEvent::Dial).unwrap();
        assert_eq!(c.state, ConnState::Connecting);
    }

    #[test]
    fn test_failed_dials_count_until_open() {
        let mut c = Connection::new();
        for _ in 0..3 {
            apply_event(&mut c, ConnEvent::Dial).unwrap();
            apply_event(&mut c, ConnEvent::DialFailed).unwrap();
        }
        assert_eq!(c.failed_dials, 3);
        apply_event(&mut c, ConnEvent::Dial).unwrap();
        apply_event(&mut c, ConnEvent::Opened).unwrap();
        assert_eq!(c.failed_dials, 0);
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let mut c = Connection::new();
        assert!(apply_event(&mut c, ConnEvent::Opened).is_err());
        assert!(apply_event(&mut c, ConnEvent::Dropped).is_err());
        apply_event(&mut c, ConnEvent::Dial).unwrap();
        assert!(apply_event(&mut c, ConnEvent::Dial).is_err());
        assert_eq!(c.state, ConnState::Connecting);
    }

    #[test]
    fn test_dispose_from_any_state() {
        let mut c = Connection::new();
        apply_event(&mut c, ConnEvent::Dial).unwrap();
        apply_event(&mut c, ConnEvent::Opened).unwrap();
        apply_event(&mut c, ConnEvent::Dispose).unwrap();
        assert_eq!(c.state, ConnState::Disconnected);
    }
}
