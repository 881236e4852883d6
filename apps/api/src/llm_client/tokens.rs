//! Token and cost estimation, plus token-bounded text chunking.
//!
//! Estimates use the usual ~4 characters per token heuristic. Good enough for
//! budgeting and logs, not for billing.

const CHARS_PER_TOKEN: usize = 4;

/// USD per 1K tokens as (prompt, completion), matched by model-name prefix.
/// Longer prefixes come first so `gpt-4-turbo` is not priced as `gpt-4`.
const PRICING: &[(&str, f64, f64)] = &[
    ("gpt-4o-mini", 0.000_15, 0.000_6),
    ("gpt-4o", 0.005, 0.015),
    ("gpt-4-turbo", 0.01, 0.03),
    ("gpt-4-1106", 0.01, 0.03),
    ("gpt-4-0125", 0.01, 0.03),
    ("gpt-4", 0.03, 0.06),
    ("gpt-3.5-turbo", 0.000_5, 0.001_5),
];

pub fn estimate_tokens(text: &str) -> usize {
    estimate_tokens_for_chars(text.chars().count())
}

pub fn estimate_tokens_for_chars(chars: usize) -> usize {
    chars.div_ceil(CHARS_PER_TOKEN)
}

/// Estimated USD cost of one call, or `None` for a model not in the price table.
pub fn estimate_cost_usd(model: &str, prompt_tokens: u32, completion_tokens: u32) -> Option<f64> {
    let model = model.to_ascii_lowercase();
    PRICING
        .iter()
        .find(|(prefix, _, _)| model.starts_with(prefix))
        .map(|(_, prompt, completion)| {
            (prompt_tokens as f64 / 1000.0) * prompt + (completion_tokens as f64 / 1000.0) * completion
        })
}

/// The longest suffix of `text` within `max_tokens`, cut on a char boundary.
pub fn tail_within(text: &str, max_tokens: usize) -> &str {
    let max_chars = max_tokens * CHARS_PER_TOKEN;
    let total = text.chars().count();
    if total <= max_chars {
        return text;
    }
    match text.char_indices().nth(total - max_chars) {
        Some((start, _)) => &text[start..],
        None => "",
    }
}

/// Splits `text` into chunks of at most `max_tokens` estimated tokens.
///
/// Paragraphs (blank-line separated) are packed greedily; a paragraph that is
/// itself over the limit is hard-split on char boundaries. Blank paragraphs are dropped.
pub fn chunk_text(text: &str, max_tokens: usize) -> Vec<String> {
    let max_chars = max_tokens.max(1) * CHARS_PER_TOKEN;
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        let paragraph_chars = paragraph.chars().count();

        if paragraph_chars > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = paragraph.chars().collect();
            chunks.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            continue;
        }

        let joined_chars = current.chars().count() + 2 + paragraph_chars;
        if !current.is_empty() && joined_chars > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_cost_uses_longest_matching_prefix() {
        let turbo = estimate_cost_usd("gpt-4-turbo-preview", 1000, 1000).unwrap();
        assert!((turbo - 0.04).abs() < 1e-9);
        let base = estimate_cost_usd("gpt-4", 1000, 0).unwrap();
        assert!((base - 0.03).abs() < 1e-9);
        assert!(estimate_cost_usd("llama-3", 10, 10).is_none());
    }

    #[test]
    fn test_tail_within_cuts_on_char_boundary() {
        assert_eq!(tail_within("short", 10), "short");
        assert_eq!(tail_within("abcdefghij", 2), "cdefghij");
        assert_eq!(tail_within("ééééé", 1), "éééé");
        assert_eq!(tail_within("abc", 0), "");
    }

    #[test]
    fn test_chunk_text_packs_paragraphs() {
        let text = "aaaa\n\nbbbb\n\ncccc";
        // 3 tokens = 12 chars: "aaaa\n\nbbbb" is 10 chars, adding "cccc" would be 16
        let chunks = chunk_text(text, 3);
        assert_eq!(chunks, vec!["aaaa\n\nbbbb".to_string(), "cccc".to_string()]);
    }

    #[test]
    fn test_chunk_text_hard_splits_long_paragraph() {
        let text = "x".repeat(10);
        let chunks = chunk_text(&text, 1);
        assert_eq!(chunks, vec!["xxxx", "xxxx", "xx"]);
    }

    #[test]
    fn test_chunk_text_preserves_content_order() {
        let text = "one\n\n\n\ntwo\n\nthree";
        let chunks = chunk_text(text, 1000);
        assert_eq!(chunks, vec!["one\n\ntwo\n\nthree"]);
        assert!(chunk_text("   \n\n  ", 10).is_empty());
    }
}
