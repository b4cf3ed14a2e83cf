use crate::review::AiReview;

/// Every remote backend gets the same sectioned prompt so one parser can
/// handle all of their replies.
pub fn review_prompt(code: &str) -> String {
    format!(
        "Review this Python code and provide:\n\
         1. A brief summary of what the code does\n\
         2. 3-5 specific improvement suggestions (be concise)\n\
         3. Any potential bugs or issues\n\
         4. A code quality rating (1-10)\n\
         5. An overall recommendation\n\
         \n\
         Code to review:\n\
         ```python\n\
         {code}\n\
         ```\n\
         \n\
         Format your response as follows:\n\
         SUMMARY: [brief summary]\n\
         SUGGESTIONS: [bullet points]\n\
         ISSUES: [bullet points]\n\
         QUALITY_RATING: [1-10]\n\
         RECOMMENDATION: [brief recommendation]"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Suggestions,
    Issues,
}

/// Keywords marking a free-text line as issue-like when the model ignored
/// the requested sections.
const ISSUE_KEYWORDS: &[&str] = &["error", "bug", "vulnerab", "exception", "undefined"];

/// Parses a model reply into a structured review. Follows the labelled
/// sections when present; otherwise falls back to line heuristics so
/// free-form local-model output still yields something useful.
pub fn parse_review(text: &str, model_used: &str) -> AiReview {
    let mut summary = String::new();
    let mut suggestions = Vec::new();
    let mut issues = Vec::new();
    let mut quality_rating = String::new();
    let mut recommendation = String::new();
    let mut section = Section::None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("SUMMARY:") {
            summary = rest.trim().to_string();
            section = Section::None;
        } else if let Some(rest) = line.strip_prefix("SUGGESTIONS:") {
            let inline = rest.trim();
            if !inline.is_empty() {
                suggestions.push(inline.to_string());
            }
            section = Section::Suggestions;
        } else if let Some(rest) = line.strip_prefix("ISSUES:") {
            let inline = rest.trim();
            if !inline.is_empty() {
                issues.push(inline.to_string());
            }
            section = Section::Issues;
        } else if let Some(rest) = line.strip_prefix("QUALITY_RATING:") {
            quality_rating = rest.trim().to_string();
            section = Section::None;
        } else if let Some(rest) = line.strip_prefix("RECOMMENDATION:") {
            recommendation = rest.trim().to_string();
            section = Section::None;
        } else if let Some(bullet) = line.strip_prefix("- ").or_else(|| line.strip_prefix("• ")) {
            match section {
                Section::Issues => issues.push(bullet.trim().to_string()),
                _ => suggestions.push(bullet.trim().to_string()),
            }
        } else {
            match section {
                Section::Suggestions => suggestions.push(line.to_string()),
                Section::Issues => issues.push(line.to_string()),
                Section::None => {
                    if summary.is_empty() {
                        summary = line.to_string();
                    } else if is_issue_like(line) {
                        issues.push(line.to_string());
                    }
                }
            }
        }
    }

    dedup(&mut suggestions);
    dedup(&mut issues);

    AiReview {
        summary,
        suggestions,
        issues,
        quality_rating: if quality_rating.is_empty() {
            "N/A".to_string()
        } else {
            quality_rating
        },
        recommendation,
        model_used: model_used.to_string(),
    }
}

fn is_issue_like(line: &str) -> bool {
    let lower = line.to_lowercase();
    ISSUE_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

fn dedup(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}
