use super::engine::TeraEngine;
use crate::error::PromptError;
use tera::Context;

const CLASSIFY_SENTIMENT_TEMPLATE: &str = "\
You are a mental health assistant. Analyze the sentiment of the following user message. \
The possible sentiments are: happy, sad, anxious, stressed, neutral. \
If the user expresses thoughts of self-harm or suicide, or any other indication of severe distress, \
set the sentiment to \"severe_distress\" and isDistress to true. Otherwise set isDistress to false.

Message: {{ message }}";

const SUPPORTIVE_REPLY_TEMPLATE: &str = "\
You are a mental health support chatbot. Your tone should be empathetic and understanding. \
Generate a short, supportive reply (one or two sentences) to the user's message, based on its sentiment.

User Message: {{ user_message }}
Sentiment: {{ sentiment }}

Never judge or dismiss the user's feelings.";

const PROCESS_MESSAGE_TEMPLATE: &str = "\
You are a mental health assistant. Your tone should be empathetic and understanding.
Analyze the following user message and generate a response.

You must perform three tasks:
1. Analyze Sentiment: determine the sentiment of the message. The possible sentiments are: \
happy, sad, anxious, stressed, neutral. If the user expresses thoughts of self-harm, suicide, \
or any other indication of severe emotional crisis, set the sentiment to \"severe_distress\".
2. Detect Distress: if the sentiment is \"severe_distress\", set isDistress to true. Otherwise set it to false.
3. Generate Reply: if the sentiment is sad, anxious or stressed, write a short, supportive reply \
(one or two sentences) in aiMessage. For happy, neutral or severe_distress return an empty string; \
a helpline is shown separately for severe distress.

Never judge or dismiss the user's feelings.

Message: {{ message }}";

const REFER_USER_TEMPLATE: &str = "\
You are an AI assistant designed to detect severe distress in user messages.

Analyze the following message and determine if the user is in severe distress and needs immediate help.

Message: {{ message }}

shouldRefer must be true if the user expresses thoughts of self-harm, suicide, or severe emotional crisis. \
When shouldRefer is true, referralMessage should point the user to a professional helpline. \
Otherwise shouldRefer is false and referralMessage is an empty string.";

pub const CLASSIFY_SENTIMENT: &str = "classify_sentiment";
pub const SUPPORTIVE_REPLY: &str = "supportive_reply";
pub const PROCESS_MESSAGE: &str = "process_message";
pub const REFER_USER: &str = "refer_user_in_distress";

/// Prompts for every model flow, registered once and rendered per call.
pub struct PromptLibrary {
    engine: TeraEngine,
}

impl PromptLibrary {
    pub fn new() -> Result<Self, PromptError> {
        let mut engine = TeraEngine::new();
        engine.add_template(CLASSIFY_SENTIMENT, CLASSIFY_SENTIMENT_TEMPLATE)?;
        engine.add_template(SUPPORTIVE_REPLY, SUPPORTIVE_REPLY_TEMPLATE)?;
        engine.add_template(PROCESS_MESSAGE, PROCESS_MESSAGE_TEMPLATE)?;
        engine.add_template(REFER_USER, REFER_USER_TEMPLATE)?;
        Ok(Self { engine })
    }

    pub fn classify_sentiment(&self, message: &str) -> Result<String, PromptError> {
        let mut ctx = Context::new();
        ctx.insert("message", message);
        self.engine.render(CLASSIFY_SENTIMENT, &ctx)
    }

    pub fn supportive_reply(&self, sentiment: &str, user_message: &str) -> Result<String, PromptError> {
        let mut ctx = Context::new();
        ctx.insert("sentiment", sentiment);
        ctx.insert("user_message", user_message);
        self.engine.render(SUPPORTIVE_REPLY, &ctx)
    }

    pub fn process_message(&self, message: &str) -> Result<String, PromptError> {
        let mut ctx = Context::new();
        ctx.insert("message", message);
        self.engine.render(PROCESS_MESSAGE, &ctx)
    }

    pub fn refer_user_in_distress(&self, message: &str) -> Result<String, PromptError> {
        let mut ctx = Context::new();
        ctx.insert("message", message);
        self.engine.render(REFER_USER, &ctx)
    }
}
