use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use cadence_types::{Principal, RunId, RunResult};

use crate::error::EngineError;
use crate::state::StateBag;

/// Per-request mutable holder passed by reference through one run.
///
/// Created once per inbound request by the calling collaborator, never
/// shared across concurrent runs, discarded after the caller consumes the
/// final [`RunResult`]. The correlation id is generated at construction and
/// immutable for the lifetime of the run.
pub struct RunContext {
    run_id: RunId,
    principal: Option<Principal>,
    operation: Option<String>,
    resource: Option<String>,
    input: Value,
    state: StateBag,
    events: Vec<Value>,
    result: Option<RunResult>,
}

impl RunContext {
    pub fn new(input: Value) -> Self {
        Self {
            run_id: RunId::new(),
            principal: None,
            operation: None,
            resource: None,
            input,
            state: StateBag::new(),
            events: Vec::new(),
            result: None,
        }
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Caller identity, read-only to scenarios.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// The raw input payload.
    pub fn input(&self) -> &Value {
        &self.input
    }

    /// Deserialize the input payload into the shape a scenario accepts.
    ///
    /// The input envelope is inspected once at the boundary of whatever
    /// consumes it; scenarios that accept different shapes deserialize
    /// independently.
    pub fn input_as<T: DeserializeOwned>(&self) -> Result<T, EngineError> {
        serde_json::from_value(self.input.clone())
            .map_err(|err| EngineError::Input(err.to_string()))
    }

    /// Store a value in the per-run state bag. Set-once per tag.
    pub fn put<T: Send + Sync + 'static>(
        &mut self,
        tag: &'static str,
        value: T,
    ) -> Result<(), EngineError> {
        self.state.put(tag, value)
    }

    /// Read a value a prior phase published. Missing or mistyped slots error.
    pub fn get<T: 'static>(&self, tag: &str) -> Result<&T, EngineError> {
        self.state.get(tag)
    }

    /// Guard-friendly read: `None` instead of an error.
    pub fn try_get<T: 'static>(&self, tag: &str) -> Option<&T> {
        self.state.try_get(tag)
    }

    pub fn state(&self) -> &StateBag {
        &self.state
    }

    /// Append a domain event to the run's event log.
    ///
    /// The runner never reads events except to decide whether to flush them
    /// to the configured publisher after the phase loop.
    pub fn emit<E: Serialize>(&mut self, event: E) -> Result<(), EngineError> {
        let value =
            serde_json::to_value(event).map_err(|err| EngineError::Serialization(err.to_string()))?;
        self.events.push(value);
        Ok(())
    }

    /// Events appended so far, in emission order.
    pub fn events(&self) -> &[Value] {
        &self.events
    }

    /// Merge a newly produced result into the accumulated one.
    pub fn apply(&mut self, next: RunResult) {
        self.result = Some(RunResult::merge(self.result.take(), next));
    }

    /// The accumulated result, if any step has produced one.
    pub fn result(&self) -> Option<&RunResult> {
        self.result.as_ref()
    }

    /// Has the run been terminated by a terminal result?
    pub fn is_terminal(&self) -> bool {
        self.result.as_ref().is_some_and(|r| r.is_terminal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builders_set_labels_and_principal() {
        let ctx = RunContext::new(json!({}))
            .with_principal(Principal::authenticated("jane"))
            .with_operation("submit")
            .with_resource("applications");
        assert_eq!(ctx.operation(), Some("submit"));
        assert_eq!(ctx.resource(), Some("applications"));
        assert!(ctx.principal().unwrap().is_authenticated());
    }

    #[test]
    fn input_as_deserializes_the_envelope() {
        #[derive(serde::Deserialize)]
        struct Payload {
            name: String,
        }
        let ctx = RunContext::new(json!({"name": "jane"}));
        let payload: Payload = ctx.input_as().unwrap();
        assert_eq!(payload.name, "jane");
    }

    #[test]
    fn input_as_rejects_mismatched_shapes() {
        #[derive(serde::Deserialize, Debug)]
        #[allow(dead_code)]
        struct Payload {
            count: u32,
        }
        let ctx = RunContext::new(json!({"count": "not a number"}));
        let err = ctx.input_as::<Payload>().unwrap_err();
        assert!(matches!(err, EngineError::Input(_)));
    }

    #[test]
    fn apply_merges_into_accumulated_result() {
        let mut ctx = RunContext::new(json!({}));
        assert!(ctx.result().is_none());
        assert!(!ctx.is_terminal());

        ctx.apply(RunResult::advance().with_code(200).with_message("looked up"));
        assert!(!ctx.is_terminal());

        ctx.apply(RunResult::halt(401));
        assert!(ctx.is_terminal());
        let result = ctx.result().unwrap();
        assert_eq!(result.code, Some(401));
        assert_eq!(result.messages, vec!["looked up"]);
    }

    #[test]
    fn emit_appends_in_order() {
        let mut ctx = RunContext::new(json!({}));
        ctx.emit(json!({"kind": "first"})).unwrap();
        ctx.emit(json!({"kind": "second"})).unwrap();
        assert_eq!(ctx.events().len(), 2);
        assert_eq!(ctx.events()[0]["kind"], "first");
        assert_eq!(ctx.events()[1]["kind"], "second");
    }

    #[test]
    fn state_round_trip_through_context() {
        let mut ctx = RunContext::new(json!({}));
        ctx.put("limit", 18u8).unwrap();
        assert_eq!(*ctx.get::<u8>("limit").unwrap(), 18);
        assert!(ctx.try_get::<u8>("absent").is_none());
    }
}
