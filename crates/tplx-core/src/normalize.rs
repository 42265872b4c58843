/// Named string->string normalizers, applied left to right (§4.7). Unknown
/// names are silently ignored.
pub fn apply_normalizers(text: &str, names: &[String]) -> String {
    let mut s = text.to_string();
    for name in names {
        s = apply_one(&s, name);
    }
    s
}

fn apply_one(s: &str, name: &str) -> String {
    match name {
        "trim" => s.trim().to_string(),
        "toUpper" => s.to_uppercase(),
        "toLower" => s.to_lowercase(),
        "removeSpaces" => s.chars().filter(|&c| c != ' ').collect(),
        "keepDigits" => s.chars().filter(|c| c.is_ascii_digit()).collect(),
        _ => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_strips_whitespace() {
        assert_eq!(apply_normalizers("  hi  ", &["trim".to_string()]), "hi");
    }

    #[test]
    fn chain_applies_left_to_right() {
        let names = vec!["trim".to_string(), "toUpper".to_string()];
        assert_eq!(apply_normalizers("  hola  ", &names), "HOLA");
    }

    #[test]
    fn remove_spaces_keeps_other_whitespace() {
        assert_eq!(apply_normalizers("a b\tc", &["removeSpaces".to_string()]), "ab\tc");
    }

    #[test]
    fn keep_digits_strips_everything_else() {
        assert_eq!(apply_normalizers("1,234.56 EUR", &["keepDigits".to_string()]), "123456");
    }

    #[test]
    fn unknown_normalizer_is_ignored() {
        assert_eq!(apply_normalizers("hi", &["bogus".to_string()]), "hi");
    }

    #[test]
    fn trim_is_idempotent() {
        let once = apply_normalizers("  x  ", &["trim".to_string()]);
        let twice = apply_normalizers(&once, &["trim".to_string()]);
        assert_eq!(once, twice);
    }

    #[test]
    fn to_upper_is_idempotent() {
        let once = apply_normalizers("AbC", &["toUpper".to_string()]);
        let twice = apply_normalizers(&once, &["toUpper".to_string()]);
        assert_eq!(once, twice);
    }
}
