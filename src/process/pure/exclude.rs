// Exclude-list parsing

/// Split an exclude list the way a shell would split words.
///
/// `Agent.exe "Battle.net Helper.exe"` yields two names. Unbalanced quotes
/// fall back to plain whitespace splitting.
pub fn parse_exclude_list(value: &str) -> Vec<String> {
    match shlex::split(value) {
        Some(words) => words.into_iter().filter(|w| !w.is_empty()).collect(),
        None => {
            tracing::warn!(value, "Unbalanced quotes in exclude list, splitting on whitespace");
            value.split_whitespace().map(str::to_string).collect()
        }
    }
}

pub fn is_excluded(name: &str, exclude: &[String]) -> bool {
    exclude.iter().any(|e| e == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_names_stay_whole() {
        let list = parse_exclude_list(r#"Agent.exe SystemSurvey.exe "Battle.net Helper.exe""#);
        assert_eq!(list, vec!["Agent.exe", "SystemSurvey.exe", "Battle.net Helper.exe"]);
    }

    #[test]
    fn empty_list() {
        assert!(parse_exclude_list("").is_empty());
        assert!(parse_exclude_list("   ").is_empty());
    }

    #[test]
    fn unbalanced_quotes_fall_back() {
        let list = parse_exclude_list(r#"Agent.exe "Broken"#);
        assert_eq!(list, vec!["Agent.exe", "\"Broken"]);
    }

    #[test]
    fn exact_match_only() {
        let list = vec!["Agent.exe".to_string()];
        assert!(is_excluded("Agent.exe", &list));
        assert!(!is_excluded("agent.exe", &list));
    }
}
