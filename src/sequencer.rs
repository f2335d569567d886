//! Per-stream sequence numbers for page regions that several async sources
//! write to. A ticket is taken when a request is issued or a push arrives;
//! on a replace-style stream a ticket older than the last applied one is
//! discarded.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Verification,
    Payment,
    Stats,
}

impl Stream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stream::Verification => "verification",
            Stream::Payment => "payment",
            Stream::Stats => "stats",
        }
    }

    /// Append-style streams keep every write; nothing supersedes a prepend.
    pub fn is_append(&self) -> bool {
        matches!(self, Stream::Payment)
    }

    fn idx(&self) -> usize {
        match self {
            Stream::Verification => 0,
            Stream::Payment => 1,
            Stream::Stats => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub stream: Stream,
    pub seq: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    issued: [u64; 3],
    applied: [u64; 3],
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&mut self, stream: Stream) -> Ticket {
        let i = stream.idx();
        self.issued[i] += 1;
        Ticket {
            stream,
            seq: self.issued[i],
        }
    }

    /// Returns whether the write carrying `ticket` should reach the page, and
    /// records it as applied when it does.
    pub fn admit(&mut self, ticket: Ticket) -> bool {
        let i = ticket.stream.idx();
        if ticket.seq > self.applied[i] {
            self.applied[i] = ticket.seq;
            return true;
        }
        ticket.stream.is_append()
    }

    pub fn last_applied(&self, stream: Stream) -> u64 {
        self.applied[stream.idx()]
    }
}
