// Shared prompt fragments. Each feature that calls the model keeps its own
// prompts.rs alongside it and appends these where needed.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction that keeps the model from inventing facts about the candidate.
pub const GROUNDING_INSTRUCTION: &str = "\
    Base every statement on the candidate and job data provided. \
    Do NOT infer skills, employers, or credentials that are not present in the data. \
    If the data does not support a claim, omit it.";

/// Substitutes `{name}` placeholders in one left-to-right pass. Inserted values
/// are never rescanned, so data that happens to contain a placeholder stays
/// literal. Braces that do not name a variable are copied through.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let hit = vars.iter().find_map(|(name, value)| {
            tail.strip_prefix('{')
                .and_then(|t| t.strip_prefix(*name))
                .and_then(|t| t.strip_prefix('}'))
                .map(|after| (*value, after))
        });
        match hit {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_replaces_each_placeholder() {
        let filled = fill_template("{a} and {b} and {a}", &[("a", "1"), ("b", "2")]);
        assert_eq!(filled, "1 and 2 and 1");
    }

    #[test]
    fn test_fill_template_keeps_unknown_braces() {
        let filled = fill_template(r#"{"score": 0, "x": {name}}"#, &[("name", "7")]);
        assert_eq!(filled, r#"{"score": 0, "x": 7}"#);
    }

    #[test]
    fn test_fill_template_does_not_rescan_inserted_values() {
        let filled = fill_template(
            "R: {resume_json}\nJ: {job_json}",
            &[("resume_json", "mentions {job_json}"), ("job_json", "JOB")],
        );
        assert_eq!(filled, "R: mentions {job_json}\nJ: JOB");
    }
}
