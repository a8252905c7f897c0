//! Paced delivery of streamed text.
//!
//! Networks deliver text in bursts. [`ResponseAnimator`] buffers what has
//! arrived and releases it frame by frame, roughly one sixtieth of the
//! backlog per frame and at least one character, so a large burst still
//! reads like typing. The caller owns the clock: it calls
//! [`ResponseAnimator::tick`] once per frame and [`ResponseAnimator::finish`]
//! when the response is over.

/// Divisor applied to the backlog on every frame.
pub const FRAME_DIVISOR: usize = 60;

/// One frame of paced output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationFrame {
    /// All text delivered so far, including this frame.
    pub text: String,
    /// Text released by this frame alone.
    pub delta: String,
}

/// Buffers incoming text and releases it at a bounded pace.
#[derive(Debug, Clone, Default)]
pub struct ResponseAnimator {
    delivered: String,
    pending: String,
    finished: bool,
}

impl ResponseAnimator {
    /// Create an empty animator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue newly received text. Ignored once finished.
    pub fn push(&mut self, text: &str) {
        if !self.finished {
            self.pending.push_str(text);
        }
    }

    /// Release the next slice of pending text, if any.
    pub fn tick(&mut self) -> Option<AnimationFrame> {
        if self.finished || self.pending.is_empty() {
            return None;
        }

        let remaining = self.pending.chars().count();
        let count = ((remaining + FRAME_DIVISOR / 2) / FRAME_DIVISOR).max(1);
        let split = self
            .pending
            .char_indices()
            .nth(count)
            .map_or(self.pending.len(), |(pos, _)| pos);

        let delta: String = self.pending.drain(..split).collect();
        self.delivered.push_str(&delta);
        Some(AnimationFrame {
            text: self.delivered.clone(),
            delta,
        })
    }

    /// Flush everything still pending and mark the animator finished.
    ///
    /// Returns the complete text on the first call and `None` afterwards.
    pub fn finish(&mut self) -> Option<String> {
        if self.finished {
            return None;
        }
        self.finished = true;
        let rest = std::mem::take(&mut self.pending);
        self.delivered.push_str(&rest);
        Some(self.delivered.clone())
    }

    /// Whether [`finish`](Self::finish) has run.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Text already released to the caller.
    #[must_use]
    pub fn delivered(&self) -> &str {
        &self.delivered
    }

    /// Text received but not yet released.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Everything received so far, released or not.
    #[must_use]
    pub fn full_text(&self) -> String {
        let mut text = self.delivered.clone();
        text.push_str(&self.pending);
        text
    }
}
