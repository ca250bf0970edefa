// src/progress.rs
/// Status reporting for multi-step runs (fetch → merge → save).
/// The CLI prints these; library callers can pass [`NullProgress`].
pub trait Progress {
    /// Called at the start with the number of sets to process.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One set finished.
    fn item_done(&mut self, _set_key: &str) {}

    /// One set failed; the run stops after this.
    fn item_failed(&mut self, _set_key: &str, _err: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

pub struct NullProgress;
impl Progress for NullProgress {}
