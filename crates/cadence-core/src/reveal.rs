use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealTick {
    /// One more character is visible and more remain.
    Advanced,
    Finished,
    Cancelled,
}

/// Character-by-character reveal of precomputed text.
#[derive(Debug, Clone)]
pub struct TextReveal {
    full_text: String,
    revealed_bytes: usize,
    cancelled: bool,
}

impl TextReveal {
    pub fn new(full_text: impl Into<String>) -> Self {
        Self {
            full_text: full_text.into(),
            revealed_bytes: 0,
            cancelled: false,
        }
    }

    pub fn tick(&mut self) -> RevealTick {
        if self.cancelled {
            return RevealTick::Cancelled;
        }

        let Some(next) = self.full_text[self.revealed_bytes..].chars().next() else {
            return RevealTick::Finished;
        };
        self.revealed_bytes += next.len_utf8();
        trace!(revealed_bytes = self.revealed_bytes, "reveal tick");

        if self.is_finished() {
            RevealTick::Finished
        } else {
            RevealTick::Advanced
        }
    }

    pub fn revealed(&self) -> &str {
        &self.full_text[..self.revealed_bytes]
    }

    pub fn is_finished(&self) -> bool {
        self.revealed_bytes >= self.full_text.len()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }
}

/// One panel's reveal slot. Starting a new reveal cancels the running one,
/// so at most one producer is ever live per panel.
#[derive(Debug, Default)]
pub struct RevealPanel {
    current: Option<TextReveal>,
    generation: u64,
}

impl RevealPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the generation number of the new reveal.
    pub fn start(&mut self, text: impl Into<String>) -> u64 {
        if let Some(mut previous) = self.current.take()
            && !previous.is_finished()
        {
            previous.cancel();
            debug!(
                generation = self.generation,
                revealed = previous.revealed().chars().count(),
                "cancelled running reveal"
            );
        }

        self.generation += 1;
        self.current = Some(TextReveal::new(text));
        debug!(generation = self.generation, "started reveal");
        self.generation
    }

    /// Advances the live reveal; `None` when nothing has been started.
    pub fn tick(&mut self) -> Option<RevealTick> {
        self.current.as_mut().map(TextReveal::tick)
    }

    pub fn close(&mut self) {
        if let Some(reveal) = self.current.as_mut() {
            reveal.cancel();
            debug!(generation = self.generation, "closed reveal panel");
        }
    }

    pub fn revealed(&self) -> Option<&str> {
        self.current.as_ref().map(TextReveal::revealed)
    }

    pub fn is_running(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|reveal| !reveal.is_finished() && !reveal.is_cancelled())
    }
}
