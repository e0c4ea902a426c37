/// Punctuation stripped before answers are compared.
const STRIPPED: [char; 6] = ['!', '?', '¡', '¿', '.', ','];

/// Canonicalize a free-text answer for comparison: lowercase, drop the
/// punctuation set above and trim surrounding whitespace. Two answers are
/// equivalent iff their normalized forms are equal.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !STRIPPED.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        assert_eq!(normalize("Hund!"), "hund");
        assert_eq!(normalize("hund"), "hund");
        assert_eq!(normalize("¿Qué?"), "qué");
        assert_eq!(normalize("  el perro.  "), "el perro");
    }

    #[test]
    fn test_idempotent() {
        for s in ["Hund!", "  ¡Hola!  ", "the dog", "A, B, C."] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_inner_whitespace_is_kept() {
        assert_eq!(normalize("Ett hus"), "ett hus");
    }

    #[test]
    fn test_equivalence_is_case_and_punctuation_insensitive() {
        assert_eq!(normalize("Hund!"), normalize("hund"));
        assert_eq!(normalize("el perro"), normalize("El perro."));
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("?!.,"), "");
    }
}
