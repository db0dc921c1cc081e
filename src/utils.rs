//! Common utility functions shared across the codebase.

use std::sync::OnceLock;

use regex::Regex;

/// Checks if the text contains at least one CJK ideograph (U+4E00..U+9FFF).
///
/// This is the predicate every extractor uses to decide whether a literal
/// is worth reporting.
///
/// # Examples
///
/// ```
/// use kiwi::utils::contains_chinese;
///
/// assert!(contains_chinese("提交"));
/// assert!(contains_chinese("submit 提交"));
/// assert!(!contains_chinese("submit"));
/// assert!(!contains_chinese("123"));
/// assert!(!contains_chinese(""));
/// ```
pub fn contains_chinese(text: &str) -> bool {
    text.chars().any(is_chinese_char)
}

/// True for code points in U+4E00..U+9FFF.
pub fn is_chinese_char(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Regex matching one maximal run of CJK ideographs.
pub fn chinese_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\u{4e00}-\u{9fff}]+").unwrap())
}

/// Blanks out `//` and `/* */` comments in a source slice, preserving length.
///
/// Used before testing markup text children for Chinese, so a literal that
/// appears only inside a comment is never reported. Replacement keeps byte
/// offsets valid for everything outside the comment.
pub fn blank_comments(slice: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/|//[^\n]*").unwrap());
    let mut out = slice.to_string();
    let ranges: Vec<(usize, usize)> = re.find_iter(slice).map(|m| (m.start(), m.end())).collect();
    for (start, end) in ranges {
        out.replace_range(start..end, &" ".repeat(end - start));
    }
    out
}

/// Normalizes a translator token to camelCase.
///
/// Splits on whitespace, hyphens, underscores and any other non-alphanumeric
/// separator; the first word is lowercased, the rest are capitalized.
///
/// # Examples
///
/// ```
/// use kiwi::utils::camel_case;
///
/// assert_eq!(camel_case("ti jiao"), "tiJiao");
/// assert_eq!(camel_case("Submit"), "submit");
/// assert_eq!(camel_case("user-name_field"), "userNameField");
/// ```
pub fn camel_case(text: &str) -> String {
    let mut out = String::new();
    for (i, word) in text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .enumerate()
    {
        if i == 0 {
            out.push_str(&word.to_lowercase());
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(&chars.as_str().to_lowercase());
            }
        }
    }
    out
}

/// Turns escaped `\n` sequences captured from source text into real newlines.
///
/// Extractors report the raw source slice, so a string literal written as
/// `"第一行\n第二行"` carries a backslash-n. The catalog stores (and the
/// value lookup compares) the cooked form.
pub fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}
