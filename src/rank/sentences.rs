//! Sentence segmentation

const TERMINATORS: &[char] = &['.', '!', '?', '。'];

/// Split on line breaks and after sentence terminators followed by
/// whitespace. Empty pieces are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    for line in text.lines() {
        let mut current = String::new();
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            current.push(c);
            let at_boundary = TERMINATORS.contains(&c)
                && chars.peek().map_or(true, |next| next.is_whitespace());
            if at_boundary {
                push_trimmed(&mut sentences, &current);
                current.clear();
            }
        }
        push_trimmed(&mut sentences, &current);
    }
    sentences
}

fn push_trimmed(out: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}
