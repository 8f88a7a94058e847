use crate::eeat::{ClassifierError, EeatAssessment, EeatRequest};

/// Keeps at most `max_words` whitespace-separated words of `text`
pub fn truncate_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds the classification prompt for one page
pub fn build_prompt(request: &EeatRequest) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "Analyze this web page content for Google's E-E-A-T quality signals \
         (Experience, Expertise, Authoritativeness, Trustworthiness).\n\n",
    );
    prompt.push_str(&format!("URL: {}\n", request.url));
    if let Some(title) = &request.title {
        prompt.push_str(&format!("Title: {}\n", title));
    }
    prompt.push_str("\nContent:\n");
    prompt.push_str(&request.text);
    prompt.push_str("\n\n");

    prompt.push_str(
        "Score each dimension from 0 to 100 and list the concrete signals you found. \
         Also judge how likely the text is unedited AI-generated content.\n\n",
    );
    prompt.push_str("Return ONLY valid JSON in exactly this shape:\n");
    prompt.push_str(
        r#"{
  "experience": {"score": 0, "signals": []},
  "expertise": {"score": 0, "signals": []},
  "authoritativeness": {"score": 0, "signals": []},
  "trustworthiness": {"score": 0, "signals": []},
  "overallScore": 0,
  "summary": "",
  "aiContentRisk": "low"
}"#,
    );
    prompt.push('\n');

    prompt
}

/// Pulls the JSON object out of a model reply
///
/// Models sometimes wrap the object in a Markdown code fence or add a
/// sentence around it. Returns the fenced body when there is a fence,
/// otherwise the span from the first `{` to the last `}`.
pub fn extract_json(reply: &str) -> &str {
    let trimmed = reply.trim();

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        let body = match after.find("```") {
            Some(end) => &after[..end],
            None => after,
        };
        return body.trim();
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// Parses a model reply into an [`EeatAssessment`]
pub fn parse_assessment(reply: &str) -> Result<EeatAssessment, ClassifierError> {
    serde_json::from_str(extract_json(reply))
        .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eeat::AiContentRisk;

    const REPLY: &str = r#"{
        "experience": {"score": 70, "signals": ["first-hand photos"]},
        "expertise": {"score": 80, "signals": []},
        "authoritativeness": {"score": 60, "signals": []},
        "trustworthiness": {"score": 90, "signals": ["contact page"]},
        "overallScore": 76,
        "summary": "Solid",
        "aiContentRisk": "medium"
    }"#;

    #[test]
    fn test_truncate_words() {
        assert_eq!(truncate_words("one  two\nthree four", 3), "one two three");
        assert_eq!(truncate_words("short", 10), "short");
        assert_eq!(truncate_words("", 10), "");
    }

    #[test]
    fn test_prompt_contains_page_and_shape() {
        let request = EeatRequest {
            url: "https://example.com/guide".to_string(),
            title: Some("The Guide".to_string()),
            text: "Body text here".to_string(),
        };
        let prompt = build_prompt(&request);
        assert!(prompt.contains("URL: https://example.com/guide"));
        assert!(prompt.contains("Title: The Guide"));
        assert!(prompt.contains("Body text here"));
        assert!(prompt.contains("Return ONLY valid JSON"));
        assert!(prompt.contains("aiContentRisk"));
    }

    #[test]
    fn test_parse_plain_reply() {
        let assessment = parse_assessment(REPLY).unwrap();
        assert_eq!(assessment.expertise.score, 80.0);
        assert_eq!(assessment.overall_score, Some(76.0));
        assert_eq!(assessment.ai_content_risk, AiContentRisk::Medium);
    }

    #[test]
    fn test_parse_fenced_reply() {
        let fenced = format!("Here you go:\n```json\n{}\n```\nHope that helps.", REPLY);
        let assessment = parse_assessment(&fenced).unwrap();
        assert_eq!(assessment.trustworthiness.signals, vec!["contact page".to_string()]);

        let bare_fence = format!("```\n{}\n```", REPLY);
        assert!(parse_assessment(&bare_fence).is_ok());
    }

    #[test]
    fn test_parse_reply_with_surrounding_prose() {
        let reply = format!("Assessment follows. {} End.", REPLY);
        assert!(parse_assessment(&reply).is_ok());
    }

    #[test]
    fn test_garbage_reply_is_invalid() {
        let err = parse_assessment("I cannot assess this page.").unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidResponse(_)));

        let err = parse_assessment(r#"{"experience": 5}"#).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidResponse(_)));
    }
}
