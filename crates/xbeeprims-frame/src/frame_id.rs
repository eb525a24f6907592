use std::sync::atomic::{AtomicU8, Ordering};

/// Hands out frame ids for request/response correlation.
///
/// Ids run 1..=255 and wrap back to 1; 0 is never assigned. The counter is
/// atomic, so one allocator can be shared behind an `Arc` by several
/// encoders writing to the same radio.
#[derive(Debug, Default)]
pub struct FrameIdAllocator {
    last: AtomicU8,
}

fn advance(id: u8) -> u8 {
    if id == u8::MAX {
        1
    } else {
        id + 1
    }
}

impl FrameIdAllocator {
    /// A fresh allocator whose first id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// An allocator whose first id is `first` (0 is treated as 1).
    pub fn starting_at(first: u8) -> Self {
        Self {
            last: AtomicU8::new(first.max(1) - 1),
        }
    }

    /// Assign the next id.
    pub fn next_id(&self) -> u8 {
        match self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |id| Some(advance(id)))
        {
            Ok(prev) | Err(prev) => advance(prev),
        }
    }

    /// The most recently assigned id, or 0 if none has been assigned yet.
    pub fn last_id(&self) -> u8 {
        self.last.load(Ordering::Acquire)
    }
}
