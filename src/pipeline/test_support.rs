use crate::error::{LlmError, StoreError};
use crate::llm::{HarmBlockThreshold, HarmCategory, Provider, ProviderFuture, StructuredRequest};
use crate::store::{ConversationStore, ConversationTurn, NewTurn, StoreFuture};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub flow: &'static str,
    pub model: String,
    pub prompt: String,
    pub block_none_dangerous_content: bool,
}

/// Provider that answers each flow from a queue of canned responses.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    responses: Mutex<HashMap<&'static str, VecDeque<Result<String, LlmError>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, flow: &'static str, body: &str) {
        self.push(flow, Ok(body.to_string()));
    }

    pub(crate) fn fail(&self, flow: &'static str, error: LlmError) {
        self.push(flow, Err(error));
    }

    fn push(&self, flow: &'static str, response: Result<String, LlmError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(flow)
            .or_default()
            .push_back(response);
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn flows(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|c| c.flow).collect()
    }
}

impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate_structured<'a>(
        &'a self,
        request: StructuredRequest<'a>,
    ) -> ProviderFuture<'a, String> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(RecordedCall {
                flow: request.flow,
                model: request.model.to_string(),
                prompt: request.prompt.to_string(),
                block_none_dangerous_content: request.safety_settings.iter().any(|s| {
                    s.category == HarmCategory::DangerousContent
                        && s.threshold == HarmBlockThreshold::BlockNone
                }),
            });
            self.responses
                .lock()
                .unwrap()
                .get_mut(request.flow)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| {
                    Err(LlmError::Request {
                        provider: "scripted".into(),
                        message: format!("no scripted response for {}", request.flow),
                    })
                })
        })
    }
}

/// Conversation store whose every operation fails.
pub(crate) struct FailingStore;

impl ConversationStore for FailingStore {
    fn append_turn<'a>(&'a self, _turn: NewTurn<'a>) -> StoreFuture<'a, ConversationTurn> {
        Box::pin(async { Err(StoreError::Write("disk I/O error".into())) })
    }

    fn turns_for_user<'a>(&'a self, _user_id: &'a str) -> StoreFuture<'a, Vec<ConversationTurn>> {
        Box::pin(async { Err(StoreError::Query("disk I/O error".into())) })
    }

    fn delete_user_turns<'a>(&'a self, _user_id: &'a str) -> StoreFuture<'a, u64> {
        Box::pin(async { Err(StoreError::Delete("commit failed".into())) })
    }
}
