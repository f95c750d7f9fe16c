//! Message text formatting
//!
//! Turns raw chat text into the markup rendered by a [`View`](crate::view::View).
//! The rules run in a fixed order over the whole string:
//!
//! 1. Fenced code blocks (optionally tagged with a language)
//! 2. Inline code spans
//! 3. `**bold**`
//! 4. `*italic*`
//! 5. `- ` bullet lines
//! 6. Blank-line paragraph breaks
//! 7. Bare `http(s)://` links
//!
//! Code is HTML-escaped, both fenced and inline. Once a code span has been
//! rendered it is shielded from the later rules, so `a*b*c` inside a code
//! block stays literal.
//!
//! Formatting is not idempotent: feeding markup back through
//! [`format_message_text`] escapes it again. Callers format raw text once.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Language class used when a code block carries no tag
pub const PLAINTEXT_LANGUAGE: &str = "plaintext";

/// Opening and closing marker of a fenced code block
pub const CODE_FENCE: &str = "```";

// Private-use code points that bracket the index of a shielded span.
const SHIELD_OPEN: char = '\u{E000}';
const SHIELD_CLOSE: char = '\u{E001}';

struct Rules {
    fence: Regex,
    inline_code: Regex,
    bold: Regex,
    italic: Regex,
    bullet: Regex,
    link: Regex,
    language_tag: Regex,
    shielded: Regex,
}

fn rules() -> &'static Rules {
    static RULES: OnceLock<Rules> = OnceLock::new();
    RULES.get_or_init(|| Rules {
        fence: Regex::new(r"(?s)```(.*?)```").expect("Invalid regex pattern"),
        inline_code: Regex::new(r"`([^`]+)`").expect("Invalid regex pattern"),
        bold: Regex::new(r"\*\*(.+?)\*\*").expect("Invalid regex pattern"),
        italic: Regex::new(r"\*(.+?)\*").expect("Invalid regex pattern"),
        bullet: Regex::new(r"(?m)^- (.+)$").expect("Invalid regex pattern"),
        link: Regex::new(r#"(https?://[^\s<"\x{E000}]+)"#).expect("Invalid regex pattern"),
        language_tag: Regex::new(r"^\w[\w+#.-]*$").expect("Invalid regex pattern"),
        shielded: Regex::new(r"\x{E000}(\d+)\x{E001}").expect("Invalid regex pattern"),
    })
}

/// A fenced code block split into its language tag and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Language tag from the opening line, if one was present
    pub language: Option<String>,
    /// Code content with surrounding whitespace trimmed (not escaped)
    pub code: String,
}

impl CodeBlock {
    /// Split the text between a pair of fences into tag and body
    ///
    /// The first line is a language tag when it is a single identifier-like
    /// token with no whitespace and more content follows it on later lines.
    ///
    /// # Examples
    ///
    /// ```
    /// use sofi_chat::formatter::CodeBlock;
    ///
    /// let block = CodeBlock::parse("python\nprint(1)\n");
    /// assert_eq!(block.language.as_deref(), Some("python"));
    /// assert_eq!(block.code, "print(1)");
    ///
    /// let untagged = CodeBlock::parse("ls -la");
    /// assert_eq!(untagged.language, None);
    /// ```
    pub fn parse(inner: &str) -> Self {
        if let Some((first_line, rest)) = inner.split_once('\n') {
            let candidate = first_line.trim_end_matches('\r');
            if rules().language_tag.is_match(candidate) {
                return Self {
                    language: Some(candidate.to_string()),
                    code: rest.trim().to_string(),
                };
            }
        }

        Self {
            language: None,
            code: inner.trim().to_string(),
        }
    }

    /// Language class for rendering, `plaintext` when untagged
    pub fn language_or_plaintext(&self) -> &str {
        self.language.as_deref().unwrap_or(PLAINTEXT_LANGUAGE)
    }

    /// Render as a `<pre><code>` element with escaped content
    pub fn to_markup(&self) -> String {
        format!(
            "<pre><code class=\"language-{}\">{}</code></pre>",
            self.language_or_plaintext(),
            escape_html(&self.code)
        )
    }
}

/// Escape text for safe inclusion in markup
///
/// # Examples
///
/// ```
/// use sofi_chat::formatter::escape_html;
///
/// assert_eq!(escape_html("<b>&</b>"), "&lt;b&gt;&amp;&lt;/b&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Reverse of [`escape_html`] for the entities it produces
pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Format raw message text into markup
///
/// # Arguments
///
/// * `text` - Raw text as typed by the user or returned by the backend
///
/// # Returns
///
/// Markup with code blocks, inline code, emphasis, bullets, paragraph
/// breaks and links applied
///
/// # Examples
///
/// ```
/// use sofi_chat::formatter::format_message_text;
///
/// let markup = format_message_text("Hello **world**!");
/// assert_eq!(markup, "Hello <strong>world</strong>!");
/// ```
pub fn format_message_text(text: &str) -> String {
    let rules = rules();
    let mut shielded: Vec<String> = Vec::new();

    let input: String = text
        .chars()
        .filter(|c| *c != SHIELD_OPEN && *c != SHIELD_CLOSE)
        .collect();

    let result = rules
        .fence
        .replace_all(&input, |caps: &Captures| {
            shield(&mut shielded, CodeBlock::parse(&caps[1]).to_markup())
        })
        .into_owned();

    let result = rules
        .inline_code
        .replace_all(&result, |caps: &Captures| {
            shield(
                &mut shielded,
                format!("<code>{}</code>", escape_html(&caps[1])),
            )
        })
        .into_owned();

    let result = rules
        .bold
        .replace_all(&result, "<strong>${1}</strong>")
        .into_owned();
    let result = rules.italic.replace_all(&result, "<em>${1}</em>").into_owned();
    let result = rules.bullet.replace_all(&result, "• ${1}").into_owned();
    let result = result.replace("\n\n", "<br><br>");
    let result = rules
        .link
        .replace_all(
            &result,
            "<a href=\"${1}\" target=\"_blank\" rel=\"noopener noreferrer\">${1}</a>",
        )
        .into_owned();

    if shielded.is_empty() {
        return result;
    }

    rules
        .shielded
        .replace_all(&result, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| shielded.get(i).cloned())
                .unwrap_or_default()
        })
        .into_owned()
}

fn shield(shielded: &mut Vec<String>, markup: String) -> String {
    shielded.push(markup);
    format!("{}{}{}", SHIELD_OPEN, shielded.len() - 1, SHIELD_CLOSE)
}
