//! JSON utility functions for model output.

/// Deserialize JSON with basic repair for common malformations.
///
/// If the initial parse fails, attempts to fix trailing commas and
/// single quotes before retrying. The original error is returned when the
/// repaired text does not parse either.
pub fn unmarshal_json<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, serde_json::Error> {
    match serde_json::from_slice(data) {
        Ok(v) => Ok(v),
        Err(e) => {
            let s = String::from_utf8_lossy(data);
            let fixed = repair_json(&s);
            match serde_json::from_str(&fixed) {
                Ok(v) => Ok(v),
                Err(_) => Err(e),
            }
        }
    }
}

/// Locate the JSON object embedded in free-form model output.
///
/// Returns the slice from the first `{` to the last `}` inclusive, or the
/// whole input when no such span exists.
pub fn extract_json_object(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}

fn repair_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape_next = false;
    let chars: Vec<char> = s.chars().collect();

    for i in 0..chars.len() {
        let ch = chars[i];

        if escape_next {
            result.push(ch);
            escape_next = false;
            continue;
        }

        if ch == '\\' && in_string {
            result.push(ch);
            escape_next = true;
            continue;
        }

        if ch == '"' {
            in_string = !in_string;
            result.push(ch);
            continue;
        }

        if !in_string && ch == '\'' {
            result.push('"');
            continue;
        }

        if !in_string && ch == ',' {
            // Skip trailing commas before } or ]
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }

        result.push(ch);
    }

    result
}
