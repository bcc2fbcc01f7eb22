/// Extract a word-boundary-aligned snippet around the first occurrence of
/// any of `terms` in `content`, scanning terms in the order given.
///
/// Matching is case-insensitive raw substring containment against the
/// original text, not a re-tokenized match, so the highlighted span can
/// disagree with the stemmed term that actually scored the document. That
/// imprecision is accepted; the snippet is display-only.
pub fn highlight(content: &str, terms: &[String], window: usize) -> String {
    let hit = terms
        .iter()
        .filter(|t| !t.is_empty())
        .find_map(|t| find_ignore_case(content, t));

    let (pos, match_len) = match hit {
        Some(hit) => hit,
        None => {
            // No term present: fall back to the head of the content.
            if content.chars().count() > 200 {
                let head: String = content.chars().take(200).collect();
                return format!("{head}...");
            }
            return content.to_string();
        }
    };

    let bytes = content.as_bytes();
    let mut start = pos.saturating_sub(window);
    let mut end = (pos + match_len + window).min(content.len());

    // Snap outward to the nearest space so words are never cut mid-token.
    if start > 0 {
        while start > 0 && bytes[start] != b' ' {
            start -= 1;
        }
        if bytes[start] == b' ' {
            start += 1;
        }
    }
    if end < content.len() {
        while end < content.len() && bytes[end] != b' ' {
            end += 1;
        }
    }

    let mut snippet = content[start..end].to_string();
    if start > 0 {
        snippet.insert_str(0, "...");
    }
    if end < content.len() {
        snippet.push_str("...");
    }
    snippet
}

/// Case-insensitive substring search returning the byte offset and matched
/// byte length within `content`. Works char-by-char so multi-byte input
/// never produces an offset inside a character.
fn find_ignore_case(content: &str, needle: &str) -> Option<(usize, usize)> {
    let needle_chars: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle_chars.is_empty() {
        return None;
    }
    for (offset, _) in content.char_indices() {
        if let Some(len) = match_at(&content[offset..], &needle_chars) {
            return Some((offset, len));
        }
    }
    None
}

fn match_at(haystack: &str, needle: &[char]) -> Option<usize> {
    let mut rest = needle;
    let mut len = 0;
    for c in haystack.chars() {
        if rest.is_empty() {
            break;
        }
        for lc in c.to_lowercase() {
            match rest.split_first() {
                Some((&n, tail)) if n == lc => rest = tail,
                // Mismatch, or the needle ended inside this character's
                // case folding; either way this offset does not match.
                _ => return None,
            }
        }
        len += c.len_utf8();
    }
    if rest.is_empty() {
        Some(len)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn snippet_is_word_aligned_with_ellipses() {
        let content = "A quick brown fox jumps over the lazy dog";
        let snippet = highlight(content, &terms(&["fox"]), 10);
        assert_eq!(snippet, "...quick brown fox jumps over...");
    }

    #[test]
    fn match_at_start_has_no_leading_ellipsis() {
        let content = "fox jumps high";
        assert_eq!(highlight(content, &terms(&["fox"]), 50), "fox jumps high");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let content = "The Fox ran";
        let snippet = highlight(content, &terms(&["fox"]), 50);
        assert!(snippet.contains("Fox"));
    }

    #[test]
    fn terms_are_scanned_in_order() {
        let content = "the dog chased the fox";
        let snippet = highlight(content, &terms(&["fox", "dog"]), 0);
        assert!(snippet.contains("fox"));
    }

    #[test]
    fn no_match_returns_short_content_verbatim() {
        assert_eq!(highlight("short text", &terms(&["zebra"]), 50), "short text");
    }

    #[test]
    fn no_match_truncates_long_content_to_200_chars() {
        let content = "x".repeat(250);
        let snippet = highlight(&content, &terms(&["zebra"]), 50);
        assert_eq!(snippet.len(), 203);
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn empty_terms_fall_back_to_head() {
        assert_eq!(highlight("some text", &[], 50), "some text");
    }

    #[test]
    fn multibyte_content_never_splits_characters() {
        let content = "préambule du café noir après la pluie et le beau temps encore";
        let snippet = highlight(content, &terms(&["café"]), 5);
        assert!(snippet.contains("café"));
        // A snapped boundary inside a multi-byte char would have panicked.
    }
}
