//! Personalised evacuation guidance.
//!
//! `GeminiGuidance` asks a hosted model for a plan constrained to a JSON
//! schema. When that fails for any reason the caller substitutes
//! [`fallback_plan`], a built-in table that covers every household profile.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use firewiser_core::enums::HouseholdProfile;

use crate::config::ServiceConfig;
use crate::error::ServiceError;

const SYSTEM_INSTRUCTION: &str = "You are the FIREWISER Hyper-Personalized Guidance Engine. \
Your sole function is to act as a reliable, machine-readable policy engine. You MUST ingest the \
user's demographic profile and output a single, strict JSON object that adheres precisely to the \
provided JSON schema. DO NOT output any prose, markdown, or explanation outside of the JSON object.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub item: String,
    /// 1 is most urgent.
    pub priority: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidancePlan {
    pub profile: String,
    pub evacuation_checklist: Vec<ChecklistItem>,
    pub psychological_coaching_messages: Vec<String>,
}

impl GuidancePlan {
    /// Reject plans that parsed but carry nothing usable.
    pub fn validate(self) -> Result<Self, ServiceError> {
        if self.profile.trim().is_empty() {
            return Err(ServiceError::Schema("empty profile".into()));
        }
        if self.evacuation_checklist.is_empty() {
            return Err(ServiceError::Schema("empty evacuation checklist".into()));
        }
        Ok(self)
    }

    /// Checklist sorted by priority, stable for equal priorities.
    pub fn checklist_by_priority(&self) -> Vec<&ChecklistItem> {
        let mut items: Vec<&ChecklistItem> = self.evacuation_checklist.iter().collect();
        items.sort_by_key(|item| item.priority);
        items
    }

    /// First coaching message, or a generic one.
    pub fn headline(&self) -> &str {
        self.psychological_coaching_messages
            .first()
            .map(String::as_str)
            .unwrap_or("Stay calm and follow your plan.")
    }
}

pub trait GuidanceProvider {
    fn generate(
        &self,
        profile: HouseholdProfile,
    ) -> impl Future<Output = Result<GuidancePlan, ServiceError>> + Send;
}

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiGuidance {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiGuidance {
    pub fn new(client: reqwest::Client, config: &ServiceConfig) -> Self {
        Self {
            client,
            api_key: config.guidance_api_key.clone(),
            model: config.guidance_model.clone(),
            base_url: config.guidance_base_url.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl GuidanceProvider for GeminiGuidance {
    async fn generate(&self, profile: HouseholdProfile) -> Result<GuidancePlan, ServiceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ServiceError::MissingCredentials("guidance"))?;

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request_body(profile))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                service: "guidance",
                status: status.as_u16(),
            });
        }
        let body: Value = response.json().await?;
        parse_response(&body)
    }
}

/// Request body with the response schema the plan must follow.
pub fn request_body(profile: HouseholdProfile) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        "contents": [{
            "role": "user",
            "parts": [{
                "text": format!(
                    "Generate the evacuation guidance for the following user profile: {}",
                    profile.label()
                )
            }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "profile": { "type": "STRING" },
                    "evacuation_checklist": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "item": { "type": "STRING" },
                                "priority": { "type": "INTEGER" }
                            },
                            "required": ["item", "priority"]
                        }
                    },
                    "psychological_coaching_messages": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" }
                    }
                },
                "required": ["profile", "evacuation_checklist", "psychological_coaching_messages"]
            }
        }
    })
}

/// Extract and validate the plan from a `generateContent` response.
pub fn parse_response(body: &Value) -> Result<GuidancePlan, ServiceError> {
    let text = body
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .ok_or_else(|| ServiceError::Schema("no candidate text".into()))?;
    let plan: GuidancePlan =
        serde_json::from_str(text.trim()).map_err(|e| ServiceError::Schema(e.to_string()))?;
    plan.validate()
}

/// Generate a plan, substituting the built-in one on any failure.
/// The flag is true when the fallback was used.
pub async fn generate_or_fallback<G: GuidanceProvider>(
    provider: &G,
    profile: HouseholdProfile,
    timeout: std::time::Duration,
) -> (GuidancePlan, bool) {
    match crate::error::with_timeout(timeout, provider.generate(profile)).await {
        Ok(plan) => (plan, false),
        Err(err) => {
            log::warn!("Guidance generation failed for {profile:?}, using built-in plan: {err}");
            (fallback_plan(profile), true)
        }
    }
}

fn plan(profile: HouseholdProfile, checklist: &[(&str, u32)], coaching: &[&str]) -> GuidancePlan {
    GuidancePlan {
        profile: profile.label().to_string(),
        evacuation_checklist: checklist
            .iter()
            .map(|&(item, priority)| ChecklistItem {
                item: item.to_string(),
                priority,
            })
            .collect(),
        psychological_coaching_messages: coaching.iter().map(|m| m.to_string()).collect(),
    }
}

/// Built-in guidance for `profile`.
pub fn fallback_plan(profile: HouseholdProfile) -> GuidancePlan {
    match profile {
        HouseholdProfile::Parent => plan(
            profile,
            &[
                ("Gather the children and keep them within arm's reach", 1),
                ("Pack medications, formula and diapers for 72 hours", 2),
                ("Grab IDs, birth certificates and insurance papers", 3),
                ("Bring a comfort item for each child", 4),
                ("Load water and snacks into the car", 5),
            ],
            &[
                "Your calm sets the tone. Speak slowly and give the kids one simple job each.",
                "You have a plan and a route. Follow it one step at a time.",
            ],
        ),
        HouseholdProfile::Elderly => plan(
            profile,
            &[
                ("Take all prescription medications and a list of doses", 1),
                ("Bring glasses, hearing aids and spare batteries", 2),
                ("Call a neighbour or relative and tell them you are leaving", 3),
                ("Grab IDs, Medicare card and insurance papers", 4),
                ("Wear sturdy shoes and long sleeves", 5),
            ],
            &[
                "There is time to do this safely. Move steadily, not quickly.",
                "Help is available. Accepting a ride is the right call.",
            ],
        ),
        HouseholdProfile::PetOwner => plan(
            profile,
            &[
                ("Put leashes on dogs and cats into carriers now", 1),
                ("Pack pet food, water and bowls for 72 hours", 2),
                ("Bring vaccination records and a recent photo of each pet", 3),
                ("Take your own medications and IDs", 4),
                ("Leave a note on the door listing any pet you could not find", 5),
            ],
            &[
                "Your animals follow your energy. Keep your voice low and steady.",
                "If a pet hides, do not wait for it. Responders check homes after evacuation.",
            ],
        ),
        HouseholdProfile::MobilityImpaired => plan(
            profile,
            &[
                ("Contact your evacuation helper or call for assisted transport", 1),
                ("Pack mobility aids, chargers and spare batteries", 2),
                ("Take medications and medical equipment", 3),
                ("Grab IDs and a written list of care needs", 4),
                ("Wait near an exit where responders can see you", 5),
            ],
            &[
                "Asking for help early is the strongest move you can make.",
                "Responders prioritise assisted evacuations. Stay reachable by phone.",
            ],
        ),
    }
}
