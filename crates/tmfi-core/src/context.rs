//! Run Context: per-record state shared by the stages of one run

#[derive(Debug, Clone)]
pub struct RunContext {
    pub trace_id: String,
    /// Re-run deterministic stages on a copy and compare output hashes
    pub verify_determinism: bool,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            verify_determinism: false,
        }
    }

    pub fn verifying_determinism(mut self) -> Self {
        self.verify_determinism = true;
        self
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
