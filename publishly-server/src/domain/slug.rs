/// Lowercases `input` and collapses every run of non-alphanumeric characters
/// into a single `-`, with no leading or trailing separator.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn collapses_punctuation_and_whitespace() {
        assert_eq!(
            slugify("  Designing for Focus: A World   Full of Distractions! "),
            "designing-for-focus-a-world-full-of-distractions"
        );
    }

    #[test]
    fn keeps_digits_and_unicode_letters() {
        assert_eq!(slugify("React 19 -- Über"), "react-19-über");
    }

    #[test]
    fn symbols_only_gives_empty_slug() {
        assert_eq!(slugify("?!* --"), "");
    }
}
