/// Checkpoint artifact name for a session: `<session>.csv`.
pub fn checkpoint_filename(session: &str) -> String {
    format!("{}.csv", sanitize(session))
}

/// Per-id series artifact name: `<session>_<detailId>.csv`. The recovery
/// planner matches these names against the output directory, so the scheme
/// must stay deterministic.
pub fn series_filename(session: &str, detail_id: &str) -> String {
    format!("{}_{}.csv", sanitize(session), sanitize(detail_id))
}

/// Windows-safe filename component: forbidden characters become `_`,
/// repeated underscores collapse.
fn sanitize(input: &str) -> String {
    let mut cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "session".to_string();
    }
    // Collapse multiple underscores
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    compacted
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_names_are_deterministic() {
        assert_eq!(
            series_filename("FR_BORDER_CTA_01_01_2020_01_02_2020", "22WX-1"),
            "FR_BORDER_CTA_01_01_2020_01_02_2020_22WX-1.csv"
        );
        assert_eq!(
            checkpoint_filename("FR_BORDER_CTA_01_01_2020_01_02_2020"),
            "FR_BORDER_CTA_01_01_2020_01_02_2020.csv"
        );
    }

    #[test]
    fn forbidden_characters_are_replaced() {
        assert_eq!(series_filename("a/b", "c:d"), "a_b_c_d.csv");
    }
}
