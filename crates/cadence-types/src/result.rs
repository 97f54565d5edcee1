use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a single scenario step, and the accumulated outcome of a run.
///
/// A result with `continues = false` is terminal: the runner stops the run
/// immediately and no further scenario executes. Non-terminal results are
/// merged step by step (see [`RunResult::merge`]), which lets several
/// scenarios incrementally enrich one shared outcome while any single
/// scenario can still end the run unilaterally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// False means terminal; true means keep going.
    pub continues: bool,
    /// Status/outcome code, if the step decided one.
    pub code: Option<u16>,
    /// Diagnostic messages accumulated across steps.
    pub messages: Vec<String>,
    /// Output payload produced so far.
    pub output: Option<Value>,
}

impl RunResult {
    /// A non-terminal result carrying nothing; the run keeps going.
    pub fn advance() -> Self {
        Self {
            continues: true,
            code: None,
            messages: Vec::new(),
            output: None,
        }
    }

    /// A terminal result with the given outcome code; the run stops.
    pub fn halt(code: u16) -> Self {
        Self {
            continues: false,
            code: Some(code),
            messages: Vec::new(),
            output: None,
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }

    pub fn with_output(mut self, output: Value) -> Self {
        self.output = Some(output);
        self
    }

    /// Is this result terminal for the run?
    pub fn is_terminal(&self) -> bool {
        !self.continues
    }

    /// Merge a newly produced result into the accumulated one.
    ///
    /// - `continues` comes from the new result: the newest step decides
    ///   whether the run stops.
    /// - `code` and `output` are right-biased: the new value wins only when
    ///   present, otherwise the accumulated value carries over.
    /// - `messages` are appended in order, never replaced.
    pub fn merge(previous: Option<RunResult>, next: RunResult) -> RunResult {
        match previous {
            None => next,
            Some(prev) => {
                let mut messages = prev.messages;
                messages.extend(next.messages);
                RunResult {
                    continues: next.continues,
                    code: next.code.or(prev.code),
                    messages,
                    output: next.output.or(prev.output),
                }
            }
        }
    }
}
