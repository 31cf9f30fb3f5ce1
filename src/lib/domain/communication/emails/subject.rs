//! Subject line normalization

/// Normalizes a raw subject into its display form.
///
/// Runs of whitespace collapse into a single space, leading and trailing
/// whitespace is removed, and the first alphabetic character is uppercased.
/// Empty input gives empty output.
pub fn sanitize(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    match collapsed.char_indices().find(|(_, c)| c.is_alphabetic()) {
        Some((index, first)) => {
            let mut subject = String::with_capacity(collapsed.len());
            subject.push_str(&collapsed[..index]);
            subject.extend(first.to_uppercase());
            subject.push_str(&collapsed[index + first.len_utf8()..]);
            subject
        }
        None => collapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBJECTS: &[&str] = &[
        "",
        " ",
        "\t\n",
        "  hello world  ",
        "hello\t\tworld\nagain",
        "Already Capitalized",
        "3 little pigs",
        "  ...and then  ",
        "élan vital",
        "straße",
        "ßtraße",
        "日本語 subject",
        "hello WORLD",
    ];

    #[test]
    fn test_sanitize_trims_and_capitalizes() {
        assert_eq!(sanitize("  hello world  "), "Hello world");
    }

    #[test]
    fn test_sanitize_collapses_inner_whitespace() {
        assert_eq!(sanitize("hello\t\tworld\n  again"), "Hello world again");
    }

    #[test]
    fn test_sanitize_empty_input() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   \n\t"), "");
    }

    #[test]
    fn test_sanitize_capitalizes_first_alphabetic_character() {
        assert_eq!(sanitize("3 little pigs"), "3 Little pigs");
        assert_eq!(sanitize("...and then"), "...And then");
    }

    #[test]
    fn test_sanitize_leaves_the_rest_of_the_subject_alone() {
        assert_eq!(sanitize("hello WORLD"), "Hello WORLD");
        assert_eq!(sanitize("iPhone order"), "IPhone order");
    }

    #[test]
    fn test_sanitize_non_ascii() {
        assert_eq!(sanitize("élan vital"), "Élan vital");
    }

    #[test]
    fn test_sanitize_has_no_outer_or_double_whitespace() {
        for subject in SUBJECTS {
            let sanitized = sanitize(subject);

            assert_eq!(sanitized, sanitized.trim(), "input: {subject:?}");
            assert!(!sanitized.contains("  "), "input: {subject:?}");
            assert!(
                !sanitized.contains(['\t', '\n', '\r']),
                "input: {subject:?}"
            );
        }
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for subject in SUBJECTS {
            let once = sanitize(subject);

            assert_eq!(sanitize(&once), once, "input: {subject:?}");
        }
    }
}
