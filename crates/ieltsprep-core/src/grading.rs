//! Essay grading prompt and examiner reply parsing.
//!
//! The examiner is a text-generation endpoint. We send a fixed instruction
//! with the essay embedded and expect a JSON object back, possibly wrapped in
//! markdown fences.

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Highest band the examiner may award.
pub const MAX_BAND: f64 = 9.0;

/// An essay ready to be graded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssayRequest {
    pub essay: String,
    pub word_count: usize,
}

impl EssayRequest {
    /// The full instruction sent to the examiner.
    pub fn prompt(&self) -> String {
        grading_prompt(&self.essay, self.word_count)
    }
}

/// The examiner's verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssayAssessment {
    pub score: f64,
    pub feedback: String,
}

/// Build the examiner instruction for an essay.
pub fn grading_prompt(essay: &str, word_count: usize) -> String {
    format!(
        r#"You are a professional IELTS Writing Examiner.
Evaluate this Task 2 essay strictly according to the official IELTS criteria:
1. Task Response
2. Coherence and Cohesion
3. Lexical Resource
4. Grammatical Range and Accuracy

ESSAY DATA:
- Word Count: {word_count}
- Essay Text: "{essay}"

STRICT RULES:
- Penalty for length: If words < 150, maximum score is 5.0. If words < 250, penalize Task Response.
- Be highly critical. Band 9.0 is only for perfect, native-level academic writing.
- Provide feedback only in English.

Return ONLY a valid JSON:
{{ "score": number, "feedback": "2-sentence professional critique in English." }}"#
    )
}

/// Remove a markdown code fence around a JSON payload.
///
/// The opening fence may carry any language tag (`json`, `JSON`, `json5`).
pub fn strip_code_fences(text: &str) -> String {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text.to_string();
    };
    let body = match rest.split_once('\n') {
        Some((tag, body)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => body,
        _ => rest,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim().to_string()
}

/// Parse the examiner's reply into an assessment.
pub fn parse_assessment(reply: &str) -> Result<EssayAssessment, ServiceError> {
    let cleaned = strip_code_fences(reply);
    let assessment: EssayAssessment = serde_json::from_str(&cleaned)
        .map_err(|e| ServiceError::MalformedResponse(format!("examiner reply: {e}")))?;

    if !assessment.score.is_finite() || !(0.0..=MAX_BAND).contains(&assessment.score) {
        return Err(ServiceError::MalformedResponse(format!(
            "score {} is outside the band range",
            assessment.score
        )));
    }

    Ok(assessment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_essay_and_count() {
        let prompt = grading_prompt("Universities matter.", 2);
        assert!(prompt.contains("Word Count: 2"));
        assert!(prompt.contains("\"Universities matter.\""));
        assert!(prompt.contains(r#"{ "score": number"#));
    }

    #[test]
    fn parse_plain_json() {
        let a = parse_assessment(r#"{"score": 6.5, "feedback": "Solid."}"#).unwrap();
        assert_eq!(a.score, 6.5);
        assert_eq!(a.feedback, "Solid.");
    }

    #[test]
    fn parse_fenced_json() {
        let reply = "```json\n{\"score\": 5, \"feedback\": \"Too short.\"}\n```\n";
        let a = parse_assessment(reply).unwrap();
        assert_eq!(a.score, 5.0);
    }

    #[test]
    fn fence_language_tag_is_ignored() {
        let payload = r#"{"score": 6, "feedback": "Ok."}"#;
        for tag in ["", "json", "JSON", "Json", "json5"] {
            let reply = format!("```{tag}\n{payload}\n```");
            assert_eq!(strip_code_fences(&reply), payload, "tag {tag:?}");
        }
        assert_eq!(strip_code_fences(&format!("```{payload}```")), payload);
        assert_eq!(strip_code_fences(&format!("  {payload}\n")), payload);
    }

    #[test]
    fn parse_rejects_prose() {
        let err = parse_assessment("I think this is a 6.").unwrap_err();
        assert!(matches!(err, ServiceError::MalformedResponse(_)));
    }

    #[test]
    fn parse_rejects_missing_fields() {
        assert!(parse_assessment(r#"{"score": 6}"#).is_err());
    }

    #[test]
    fn parse_rejects_out_of_range_score() {
        assert!(parse_assessment(r#"{"score": 12, "feedback": "?"}"#).is_err());
        assert!(parse_assessment(r#"{"score": -1, "feedback": "?"}"#).is_err());
    }
}
