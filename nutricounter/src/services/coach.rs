//! AI health coach
//!
//! Floating chat assistant scoped to workout and diet plans. Keeps the
//! conversation history and embeds the user's profile and BMI in the
//! system instruction of every request. Chat failures never surface as
//! errors; the coach answers with a fixed fallback line instead.

use serde::Serialize;

use crate::ai::{Content, InferenceClient};
use crate::store::models::Profile;

/// Model turn appended when the inference call fails.
pub const COACH_FALLBACK_MESSAGE: &str =
    "I'm having trouble connecting right now. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

/// Conversation state of the coach panel.
pub struct HealthCoach {
    client: InferenceClient,
    messages: Vec<ChatMessage>,
    pending: bool,
}

impl HealthCoach {
    pub fn new(client: InferenceClient) -> Self {
        Self {
            client,
            messages: Vec::new(),
            pending: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether a reply is in flight; sends are no-ops while it is.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Push the opening greeting the first time the panel opens.
    /// BMI-aware when the profile is filled in.
    pub fn open(&mut self, bmi: Option<f64>) {
        if !self.messages.is_empty() {
            return;
        }

        let text = match bmi {
            Some(bmi) => format!(
                "Hello! I'm your AI Health Coach. Based on your current BMI of {:.1}, \
                 I can help you generate a personalized workout or diet plan. \
                 What would you like to focus on?",
                bmi
            ),
            None => "Hello! I'm your AI Health Coach. Once you've entered your details \
                     in the settings, I can generate personalized workout and diet plans \
                     for you. How can I help today?"
                .to_string(),
        };

        self.messages.push(ChatMessage {
            role: ChatRole::Model,
            text,
        });
    }

    /// Send one user message and wait for the coach's reply.
    ///
    /// No-op for empty input or while a reply is pending. Returns the
    /// reply text, which is the fallback line when the call failed.
    pub async fn send(
        &mut self,
        input: &str,
        profile: &Profile,
        bmi: Option<f64>,
    ) -> Option<&str> {
        let input = input.trim();
        if input.is_empty() || self.pending {
            return None;
        }

        self.messages.push(ChatMessage {
            role: ChatRole::User,
            text: input.to_string(),
        });
        self.pending = true;

        let history: Vec<Content> = self
            .messages
            .iter()
            .map(|message| match message.role {
                ChatRole::User => Content::user(message.text.clone()),
                ChatRole::Model => Content::model(message.text.clone()),
            })
            .collect();

        let reply = match self
            .client
            .generate_chat(history, &Self::system_instruction(profile, bmi))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Coach request failed: {}", e);
                COACH_FALLBACK_MESSAGE.to_string()
            }
        };

        self.pending = false;
        self.messages.push(ChatMessage {
            role: ChatRole::Model,
            text: reply,
        });

        self.messages.last().map(|message| message.text.as_str())
    }

    fn system_instruction(profile: &Profile, bmi: Option<f64>) -> String {
        let provided = |value: &str| {
            if value.trim().is_empty() {
                "Not provided".to_string()
            } else {
                value.to_string()
            }
        };

        format!(
            r#"You are an expert AI Health Coach. Your ONLY purpose is to provide workout and diet plans.
You MUST strictly refuse to answer any questions not related to fitness, workouts, diet, nutrition, or health.
If the user asks about anything else (e.g., coding, history, opinions), you MUST politely decline by saying something like, "I'm sorry, but I can only assist with creating workout and diet plans."

Here is the user's data for context. Use it to personalize your recommendations:
- Age: {}
- Gender: {}
- Height: {} cm
- Weight: {} kg
- Calculated BMI: {}
- Stated Goal: {} weight

Based on this context and the conversation history, respond to the user's latest message.

IMPORTANT: Do not use any Markdown formatting, especially no asterisks for bolding (like **word**), no hashes for headings (like # Title), and no dashes for lists."#,
            provided(&profile.age),
            profile.gender.as_str(),
            provided(&profile.height_cm),
            provided(&profile.weight_kg),
            bmi.map(|bmi| format!("{:.1}", bmi))
                .unwrap_or_else(|| "Not provided".to_string()),
            profile.goal.as_str()
        )
    }
}
