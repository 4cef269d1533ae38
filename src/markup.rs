/// A piece of message text with its display treatment already decided.
///
/// Messages are never injected into a markup sink as raw text; the renderer
/// styles each segment on its own, so markup-significant characters in the
/// message body stay inert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    Emphasis(String),
}

/// Split message text into plain and emphasized segments.
///
/// Emphasis spans are delimited by a single `*` on each side with a non-empty,
/// star-free interior (the `\*([^*]+)\*` rule). The scan is a single left-to-
/// right pass over non-overlapping matches; anything unmatched, including a
/// dangling `*`, stays literal. Spans may cross newlines.
pub fn parse(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i < text.len() {
        if text.as_bytes()[i] != b'*' {
            // '*' is ASCII, so skipping whole chars keeps us on boundaries
            i += text[i..].chars().next().map_or(1, char::len_utf8);
            continue;
        }
        match text[i + 1..].find('*') {
            // Adjacent stars have an empty interior: the first star is
            // literal and the second gets re-examined as an opener.
            Some(0) => i += 1,
            Some(gap) => {
                if plain_start < i {
                    segments.push(Segment::Plain(text[plain_start..i].to_string()));
                }
                segments.push(Segment::Emphasis(text[i + 1..i + 1 + gap].to_string()));
                i = i + 1 + gap + 1;
                plain_start = i;
            }
            // No closing star anywhere: the rest is literal.
            None => break,
        }
    }

    if plain_start < text.len() {
        segments.push(Segment::Plain(text[plain_start..].to_string()));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(t: &str) -> Segment {
        Segment::Plain(t.to_string())
    }

    fn emph(t: &str) -> Segment {
        Segment::Emphasis(t.to_string())
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(parse("no stars"), vec![plain("no stars")]);
    }

    #[test]
    fn empty_text_yields_no_segments() {
        assert_eq!(parse(""), Vec::new());
    }

    #[test]
    fn single_span_drops_the_stars() {
        assert_eq!(parse("*bold*"), vec![emph("bold")]);
        let visible: String = parse("*bold*")
            .into_iter()
            .map(|s| match s {
                Segment::Plain(t) | Segment::Emphasis(t) => t,
            })
            .collect();
        assert!(!visible.contains('*'));
    }

    #[test]
    fn alternating_spans_leave_the_middle_literal() {
        assert_eq!(parse("*a*b*c*"), vec![emph("a"), plain("b"), emph("c")]);
    }

    #[test]
    fn unterminated_star_stays_literal() {
        assert_eq!(parse("*unterminated"), vec![plain("*unterminated")]);
    }

    #[test]
    fn surrounding_text_is_preserved() {
        assert_eq!(
            parse("Hello *world*!"),
            vec![plain("Hello "), emph("world"), plain("!")]
        );
    }

    #[test]
    fn double_stars_match_like_the_single_star_rule() {
        // The second star opens a span; the outer pair stays literal.
        assert_eq!(
            parse("**bold**"),
            vec![plain("*"), emph("bold"), plain("*")]
        );
    }

    #[test]
    fn span_may_cross_newlines() {
        assert_eq!(
            parse("see *line\nbreak* here"),
            vec![plain("see "), emph("line\nbreak"), plain(" here")]
        );
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        assert_eq!(
            parse("héllo *wörld* ✓"),
            vec![plain("héllo "), emph("wörld"), plain(" ✓")]
        );
    }

    #[test]
    fn lone_star_is_literal() {
        assert_eq!(parse("a * b"), vec![plain("a * b")]);
    }
}
