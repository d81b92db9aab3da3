/// Classification of a single passage position against the typed input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharacterState {
    Correct,
    Incorrect,
    Cursor,
    Pending,
}

/// Positional comparison of `typed` against `passage`.
///
/// Returns one state per passage character. Typed characters past the end of
/// the passage have no counterpart and are not reported.
pub fn classify(passage: &[char], typed: &[char]) -> Vec<CharacterState> {
    passage
        .iter()
        .enumerate()
        .map(|(idx, expected)| match typed.get(idx) {
            Some(c) if c == expected => CharacterState::Correct,
            Some(_) => CharacterState::Incorrect,
            None if idx == typed.len() => CharacterState::Cursor,
            None => CharacterState::Pending,
        })
        .collect()
}

/// Number of typed positions matching the passage.
pub fn correct_count(passage: &[char], typed: &[char]) -> usize {
    passage
        .iter()
        .zip(typed.iter())
        .filter(|(expected, actual)| expected == actual)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use CharacterState::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_classify_untyped_passage() {
        let states = classify(&chars("cat"), &[]);
        assert_eq!(states, vec![Cursor, Pending, Pending]);
    }

    #[test]
    fn test_classify_mixed_input() {
        let states = classify(&chars("cat"), &chars("cax"));
        assert_eq!(states, vec![Correct, Correct, Incorrect]);
    }

    #[test]
    fn test_classify_marks_cursor_after_typed_prefix() {
        let states = classify(&chars("hello"), &chars("hx"));
        assert_eq!(states, vec![Correct, Incorrect, Cursor, Pending, Pending]);
    }

    #[test]
    fn test_classify_every_prefix() {
        let passage = chars("the quick fox");
        for len in 0..=passage.len() {
            let typed = &passage[..len];
            let states = classify(&passage, typed);
            assert_eq!(states.len(), passage.len());
            assert!(states[..len].iter().all(|s| *s == Correct));
            if len < passage.len() {
                assert_eq!(states[len], Cursor);
            }
        }
    }

    #[test]
    fn test_classify_typed_longer_than_passage() {
        let states = classify(&chars("ab"), &chars("abcd"));
        assert_eq!(states, vec![Correct, Correct]);
    }

    #[test]
    fn test_correct_count() {
        assert_eq!(correct_count(&chars("cat"), &chars("cax")), 2);
        assert_eq!(correct_count(&chars("cat"), &[]), 0);
    }

    #[test]
    fn test_correct_count_ignores_overflow() {
        assert_eq!(correct_count(&chars("ab"), &chars("abab")), 2);
    }

    #[test]
    fn test_multibyte_characters_compare_per_char() {
        let passage = chars("köpek");
        assert_eq!(correct_count(&passage, &chars("kop")), 2);
        assert_eq!(classify(&passage, &chars("kö"))[2], Cursor);
    }
}
