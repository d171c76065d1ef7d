//! Display titles derived from basenames.

/// Characters that separate words in a basename.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '-' || c == '_'
}

/// Turn a basename into a display title.
///
/// A single leading underscore is dropped, the first character is
/// uppercased, and every run of whitespace, `-` or `_` followed by a word
/// character becomes one space plus that character uppercased. No other
/// character changes case.
///
/// ```
/// use collections_tree_core::title_case;
///
/// assert_eq!(title_case("my-first_post"), "My First Post");
/// assert_eq!(title_case("_draft"), "Draft");
/// ```
pub fn title_case(basename: &str) -> String {
    let trimmed = basename.strip_prefix('_').unwrap_or(basename);
    let mut out = String::with_capacity(trimmed.len());
    let mut chars = trimmed.chars().peekable();

    if let Some(&first) = chars.peek()
        && first.is_ascii_alphabetic()
    {
        out.push(first.to_ascii_uppercase());
        chars.next();
    }

    while let Some(c) = chars.next() {
        if !is_separator(c) {
            out.push(c);
            continue;
        }

        let mut run = String::from(c);
        while let Some(&next) = chars.peek() {
            if !is_separator(next) {
                break;
            }
            run.push(next);
            chars.next();
        }

        match chars.peek() {
            Some(&word) if word.is_alphanumeric() => {
                out.push(' ');
                out.push(word.to_ascii_uppercase());
                chars.next();
            }
            // Trailing or dangling separators stay as they were.
            _ => out.push_str(&run),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_boundaries() {
        assert_eq!(title_case("my-first_post"), "My First Post");
        assert_eq!(title_case("hello   world"), "Hello World");
        assert_eq!(title_case("a--_b"), "A B");
    }

    #[test]
    fn test_leading_underscore() {
        assert_eq!(title_case("_draft"), "Draft");
        assert_eq!(title_case("__init"), " Init");
    }

    #[test]
    fn test_case_is_otherwise_preserved() {
        assert_eq!(title_case("iPhone-tips"), "IPhone Tips");
        assert_eq!(title_case("README"), "README");
        assert_eq!(title_case("post-2024"), "Post 2024");
    }

    #[test]
    fn test_dangling_separators() {
        assert_eq!(title_case("draft-"), "Draft-");
        assert_eq!(title_case(""), "");
        assert_eq!(title_case("_"), "");
    }
}
