use tera::{Context, Tera};

use super::{TutorRequest, TutorialContent, TutorialError};

const PROMPT_TEMPLATE: &str = r#"You are an expert tutor teaching mental models and structured decision-making.
Create a {{ level }} level tutorial about "{{ topic }}".
{% if progress %}
The learner's progress so far: {{ progress }}
Build on what they already know and do not repeat completed material.
{% endif %}
Respond with a single JSON object and nothing else, using exactly these fields:
{
  "title": "string",
  "introduction": "string",
  "sections": [{"heading": "string", "content": "string", "example": "string"}],
  "exercises": [{"question": "string", "hint": "string"}],
  "keyTakeaways": ["string"],
  "estimatedMinutes": 10
}"#;

pub fn build_prompt(request: &TutorRequest) -> Result<String, TutorialError> {
    let mut context = Context::new();
    context.insert("level", request.level.trim());
    context.insert("topic", request.topic.trim());

    let progress = if request.user_progress.is_null() {
        String::new()
    } else {
        request.user_progress.to_string()
    };
    context.insert("progress", &progress);

    Tera::one_off(PROMPT_TEMPLATE, &context, false)
        .map_err(|e| TutorialError::InvalidRequest(format!("Failed to render prompt: {}", e)))
}

/// Remove a surrounding markdown code fence, if any
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening fence line
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse the model reply, tolerating code fences and prose around the object
pub fn parse_tutorial(reply: &str) -> Result<TutorialContent, TutorialError> {
    let body = strip_code_fence(reply);

    match serde_json::from_str::<TutorialContent>(body) {
        Ok(content) => Ok(content),
        Err(first_err) => {
            let (Some(start), Some(end)) = (body.find('{'), body.rfind('}')) else {
                return Err(TutorialError::InvalidReply(first_err.to_string()));
            };
            if end <= start {
                return Err(TutorialError::InvalidReply(first_err.to_string()));
            }
            serde_json::from_str(&body[start..=end])
                .map_err(|e| TutorialError::InvalidReply(e.to_string()))
        }
    }
}

/// Stable module id for a topic and level, e.g. `first-principles-beginner`
pub fn module_id(topic: &str, level: &str) -> String {
    let slug = |s: &str| {
        s.trim()
            .to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    };
    format!("{}-{}", slug(topic), slug(level))
}
