use morel::{Finder, Syntax};

/// Marker id of `#{`, which escapes the interpolated value.
const ESCAPED: usize = 0;
/// Marker id of `!{`, which renders the value unescaped.
const UNESCAPED: usize = 1;

/// Rewrites `#{expr}` and `!{expr}` inside text into variable directives.
///
/// A backslash before the marker keeps the marker as literal text. The
/// expression ends at the first `}` on the same line, a marker without one
/// is left untouched.
pub struct Interpolator {
    finder: Finder,
}

impl Interpolator {
    /// Create a new [`Interpolator`].
    pub fn new() -> Self {
        let syntax = Syntax::new(vec![(ESCAPED, "#{".into()), (UNESCAPED, "!{".into())]);

        Self {
            finder: Finder::new(syntax),
        }
    }

    /// Interpolate `text`, wrapping expressions in `start` and `end`.
    ///
    /// `escape` forces the escape filter on or off, `None` lets the marker
    /// decide.
    pub fn interpolate(&self, text: &str, escape: Option<bool>, start: &str, end: &str) -> String {
        let mut output = String::with_capacity(text.len());
        let mut cursor = 0;

        while cursor < text.len() {
            let Some((id, begin, marker_end)) = self.finder.next(text, cursor) else {
                break;
            };
            let close = match text[marker_end..].find(['}', '\n']) {
                Some(n) if text[marker_end + n..].starts_with('}') => marker_end + n,
                _ => {
                    output.push_str(&text[cursor..marker_end]);
                    cursor = marker_end;
                    continue;
                }
            };

            if text[cursor..begin].ends_with('\\') {
                output.push_str(&text[cursor..begin - 1]);
                output.push_str(&text[begin..=close]);
            } else {
                let filter = match (escape, id) {
                    (Some(true), _) | (None, ESCAPED) => "|escape",
                    _ => "",
                };
                output.push_str(&text[cursor..begin]);
                output.push_str(start);
                output.push_str(&text[marker_end..close]);
                output.push_str(filter);
                output.push_str(end);
            }
            cursor = close + 1;
        }
        output.push_str(&text[cursor..]);

        output
    }
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Interpolator;

    fn interpolate(text: &str, escape: Option<bool>) -> String {
        Interpolator::new().interpolate(text, escape, "{{", "}}")
    }

    #[test]
    fn test_no_markers() {
        assert_eq!(interpolate("hello there", None), "hello there");
    }

    #[test]
    fn test_escaped_and_unescaped() {
        assert_eq!(
            interpolate("hi #{user.name}, !{greeting}!", None),
            "hi {{user.name|escape}}, {{greeting}}!"
        );
    }

    #[test]
    fn test_forced_escape() {
        assert_eq!(interpolate("!{raw}", Some(true)), "{{raw|escape}}");
        assert_eq!(interpolate("#{safe}", Some(false)), "{{safe}}");
    }

    #[test]
    fn test_backslash_keeps_marker() {
        assert_eq!(interpolate(r"cost \#{price}", None), "cost #{price}");
    }

    #[test]
    fn test_unclosed_marker() {
        assert_eq!(interpolate("a #{b\n} #{c}", None), "a #{b\n} {{c|escape}}");
        assert_eq!(interpolate("tail #{", None), "tail #{");
    }
}
