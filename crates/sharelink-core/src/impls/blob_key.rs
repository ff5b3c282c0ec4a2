//! Blob key issuing: random prefix + sanitized name tail.

use ulid::Ulid;

use crate::domain::BlobKey;

const MAX_NAME_LEN: usize = 64;

/// Random key decorated with a filesystem-safe tail of `suggested_name`.
pub(crate) fn issue_key(suggested_name: &str) -> BlobKey {
    let prefix = Ulid::from(rand::random::<u128>());
    let name = sanitize_name(suggested_name);
    if name.is_empty() {
        BlobKey::new(prefix.to_string())
    } else {
        BlobKey::new(format!("{prefix}-{name}"))
    }
}

/// Produce a filesystem-safe file name component.
///
/// - ASCII alphanumerics plus `-`, `_`, `.` are kept; everything else becomes `_`.
/// - Runs of `_` and `.` collapse; leading/trailing dots and underscores are trimmed.
/// - The tail (which carries the extension) is kept when the name is too long.
pub(crate) fn sanitize_name(value: &str) -> String {
    let base = value.rsplit(['/', '\\']).next().unwrap_or(value);
    let mut out = String::with_capacity(base.len());
    let mut last: Option<char> = None;

    for ch in base.chars() {
        let mapped = if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' {
            ch
        } else {
            '_'
        };
        if (mapped == '_' || mapped == '.') && last == Some(mapped) {
            continue;
        }
        out.push(mapped);
        last = Some(mapped);
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    if trimmed.len() <= MAX_NAME_LEN {
        return trimmed.to_string();
    }
    let tail = &trimmed[trimmed.len() - MAX_NAME_LEN..];
    tail.trim_start_matches(['.', '_']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("report.pdf", "report.pdf")]
    #[case::spaces("my photo (1).png", "my_photo_1_.png")]
    #[case::traversal("../../etc/passwd", "passwd")]
    #[case::windows_path("C:\\Users\\me\\notes.txt", "notes.txt")]
    #[case::dots_only("...", "")]
    #[case::unicode("résumé.docx", "r_sum_.docx")]
    #[case::hidden(".env", "env")]
    fn sanitize_name_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_name(input), expected);
    }

    #[test]
    fn sanitize_name_keeps_extension_when_truncating() {
        let long = format!("{}.tar.gz", "a".repeat(200));
        let out = sanitize_name(&long);
        assert!(out.len() <= MAX_NAME_LEN);
        assert!(out.ends_with(".tar.gz"));
    }

    #[test]
    fn issued_keys_are_safe() {
        let key = issue_key("../../x y.png");
        assert!(key.as_str().ends_with("-x_y.png"));
        assert!(!key.as_str().contains('/'));
        assert_eq!(issue_key("").as_str().len(), 26);
    }
}
