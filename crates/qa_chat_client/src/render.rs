//! Reply text → markup. Control characters are dropped and HTML optionally
//! escaped, then four ordered substitutions (bold, italic, code, line break).

use regex::Regex;
use std::sync::OnceLock;

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold pattern"))
}

fn italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*(.*?)\*").expect("valid italic pattern"))
}

fn code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`(.*?)`").expect("valid code pattern"))
}

/// Opening/closing markers for each substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub strong: (&'static str, &'static str),
    pub emphasis: (&'static str, &'static str),
    pub code: (&'static str, &'static str),
    pub line_break: &'static str,
    pub escape_html: bool,
}

impl Dialect {
    pub const HTML: Dialect = Dialect {
        strong: ("<strong>", "</strong>"),
        emphasis: ("<em>", "</em>"),
        code: ("<code>", "</code>"),
        line_break: "<br>",
        escape_html: true,
    };

    pub const ANSI: Dialect = Dialect {
        strong: ("\x1b[1m", "\x1b[22m"),
        emphasis: ("\x1b[3m", "\x1b[23m"),
        code: ("\x1b[36m", "\x1b[39m"),
        line_break: "\n",
        escape_html: false,
    };

    /// Drops the markers, keeping only the text.
    pub const PLAIN: Dialect = Dialect {
        strong: ("", ""),
        emphasis: ("", ""),
        code: ("", ""),
        line_break: "\n",
        escape_html: false,
    };
}

/// Turns raw message text into display markup. Must be pure.
pub trait Renderer: Send + Sync {
    fn format(&self, text: &str) -> String;
}

/// Regex-driven renderer parameterised by a [`Dialect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkupRenderer {
    dialect: Dialect,
}

impl MarkupRenderer {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// HTML markup; `escape` controls escaping of the source text.
    pub fn html(escape: bool) -> Self {
        Self::new(Dialect {
            escape_html: escape,
            ..Dialect::HTML
        })
    }

    pub fn ansi() -> Self {
        Self::new(Dialect::ANSI)
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }
}

impl Default for MarkupRenderer {
    fn default() -> Self {
        Self::html(true)
    }
}

impl Renderer for MarkupRenderer {
    fn format(&self, text: &str) -> String {
        let d = &self.dialect;
        let visible = strip_controls(text);
        let source = if d.escape_html {
            escape_html(&visible)
        } else {
            visible
        };
        let wrap = |re: &Regex, input: &str, (open, close): (&str, &str)| {
            re.replace_all(input, |caps: &regex::Captures<'_>| {
                format!("{}{}{}", open, &caps[1], close)
            })
            .into_owned()
        };
        let out = wrap(bold_re(), &source, d.strong);
        let out = wrap(italic_re(), &out, d.emphasis);
        let out = wrap(code_re(), &out, d.code);
        out.replace('\n', d.line_break)
    }
}

/// Escapes `& < >` for insertion as HTML element content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Drops C0/C1 control characters (ESC, BEL, CSI, ...) except `\n` and `\t`.
pub fn strip_controls(text: &str) -> String {
    text.chars()
        .filter(|&c| c == '\n' || c == '\t' || !c.is_control())
        .collect()
}

/// Formats with the default escaping HTML renderer.
pub fn format(text: &str) -> String {
    MarkupRenderer::default().format(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_unchanged() {
        for s in [
            "",
            "hello world",
            "what is 2 + 2?",
            "tabs\tand spaces",
            "what's up, \"friend\"",
        ] {
            assert_eq!(format(s), s);
        }
    }

    #[test]
    fn four_substitutions() {
        assert_eq!(format("**a**"), "<strong>a</strong>");
        assert_eq!(format("*a*"), "<em>a</em>");
        assert_eq!(format("`a`"), "<code>a</code>");
        assert_eq!(format("a\nb"), "a<br>b");
    }

    #[test]
    fn matching_is_non_greedy() {
        assert_eq!(
            format("**a** and **b**"),
            "<strong>a</strong> and <strong>b</strong>"
        );
        assert_eq!(format("*x* *y*"), "<em>x</em> <em>y</em>");
    }

    #[test]
    fn bold_runs_before_italic() {
        assert_eq!(format("**bold** *it*"), "<strong>bold</strong> <em>it</em>");
    }

    #[test]
    fn spans_do_not_cross_newlines() {
        assert_eq!(format("*a\nb*"), "*a<br>b*");
    }

    #[test]
    fn html_is_escaped_before_substitution() {
        assert_eq!(
            format("<script>**x**</script>"),
            "&lt;script&gt;<strong>x</strong>&lt;/script&gt;"
        );
        assert_eq!(MarkupRenderer::html(false).format("<b>*x*</b>"), "<b><em>x</em></b>");
    }

    #[test]
    fn format_is_deterministic() {
        let text = "**a** `b` *c*\nd";
        assert_eq!(format(text), format(text));
    }

    #[test]
    fn ansi_dialect_keeps_newlines_and_angle_brackets() {
        let out = MarkupRenderer::ansi().format("**a** <b>\nc");
        assert_eq!(out, "\x1b[1ma\x1b[22m <b>\nc");
    }

    #[test]
    fn terminal_control_sequences_are_dropped() {
        let hostile = "\x1b[2J\x1b]0;pwned\x07hi\u{9b}31m";
        for renderer in [
            MarkupRenderer::ansi(),
            MarkupRenderer::new(Dialect::PLAIN),
            MarkupRenderer::default(),
        ] {
            let out = renderer.format(hostile);
            assert!(!out.contains('\x1b'), "{out:?}");
            assert!(!out.contains('\x07'), "{out:?}");
            assert!(!out.contains('\u{9b}'), "{out:?}");
        }
        assert_eq!(MarkupRenderer::ansi().format(hostile), "[2J]0;pwnedhi31m");
    }

    #[test]
    fn control_stripping_keeps_newlines_and_tabs() {
        assert_eq!(strip_controls("a\tb\nc\r\x00"), "a\tb\nc");
    }

    #[test]
    fn quotes_are_not_escaped() {
        assert_eq!(format("it's \"*fine*\""), "it's \"<em>fine</em>\"");
    }

    #[test]
    fn plain_dialect_strips_markers() {
        let out = MarkupRenderer::new(Dialect::PLAIN).format("**a** *b* `c`\nd");
        assert_eq!(out, "a b c\nd");
    }
}
