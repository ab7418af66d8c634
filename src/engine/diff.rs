/// One step of a character-level edit script from `actual` to `expected`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiffOp {
    Equal(char),
    /// Present only in the user's text.
    Delete(char),
    /// Present only in the expected text.
    Insert(char),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanKind {
    Equal,
    Delete,
    Insert,
    /// A blank that was answered correctly; shown muted.
    Unchanged,
}

impl SpanKind {
    fn tags(self) -> Option<(&'static str, &'static str)> {
        match self {
            SpanKind::Equal => None,
            SpanKind::Delete => Some(("<del>", "</del>")),
            SpanKind::Insert => Some(("<ins>", "</ins>")),
            SpanKind::Unchanged => Some(("<eq>", "</eq>")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffSpan {
    pub kind: SpanKind,
    pub text: String,
}

/// Longest-common-subsequence edit script over chars.
///
/// At a divergence deletions are emitted before insertions.
pub fn diff_ops(actual: &str, expected: &str) -> Vec<DiffOp> {
    let a: Vec<char> = actual.chars().collect();
    let e: Vec<char> = expected.chars().collect();
    let (n, m) = (a.len(), e.len());

    // lcs[i][j] = LCS length of a[i..] and e[j..]
    let mut lcs = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if a[i] == e[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == e[j] {
            ops.push(DiffOp::Equal(a[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            ops.push(DiffOp::Delete(a[i]));
            i += 1;
        } else {
            ops.push(DiffOp::Insert(e[j]));
            j += 1;
        }
    }
    ops.extend(a[i..].iter().map(|&c| DiffOp::Delete(c)));
    ops.extend(e[j..].iter().map(|&c| DiffOp::Insert(c)));
    ops
}

/// Group an edit script into runs of the same kind.
pub fn spans(ops: &[DiffOp]) -> Vec<DiffSpan> {
    let mut out: Vec<DiffSpan> = Vec::new();
    for op in ops {
        let (kind, ch) = match *op {
            DiffOp::Equal(c) => (SpanKind::Equal, c),
            DiffOp::Delete(c) => (SpanKind::Delete, c),
            DiffOp::Insert(c) => (SpanKind::Insert, c),
        };
        match out.last_mut() {
            Some(last) if last.kind == kind => last.text.push(ch),
            _ => out.push(DiffSpan {
                kind,
                text: ch.to_string(),
            }),
        }
    }
    out
}

const LT_ESCAPE: &str = "&lt;";
const AMP_ESCAPE: &str = "&amp;";

fn starts_tag(rest: &str) -> bool {
    TAGS.iter().any(|(tag, _)| rest.starts_with(tag))
}

fn starts_escape(rest: &str) -> bool {
    rest.starts_with(LT_ESCAPE) || rest.starts_with(AMP_ESCAPE)
}

/// Copy `text` into markup. Only a `<` that would read as a tag and an `&`
/// that would read as an escape are escaped, so plain text stays as is.
fn push_escaped(out: &mut String, text: &str) {
    for (i, ch) in text.char_indices() {
        let rest = &text[i..];
        match ch {
            '<' if starts_tag(rest) => out.push_str(LT_ESCAPE),
            '&' if starts_escape(rest) => out.push_str(AMP_ESCAPE),
            _ => out.push(ch),
        }
    }
}

pub fn write_span(out: &mut String, kind: SpanKind, text: &str) {
    match kind.tags() {
        Some((open, close)) => {
            out.push_str(open);
            push_escaped(out, text);
            out.push_str(close);
        }
        None => push_escaped(out, text),
    }
}

/// Render the diff of `actual` against `expected` as inline markup.
pub fn render_diff(actual: &str, expected: &str) -> String {
    let mut out = String::new();
    for span in spans(&diff_ops(actual, expected)) {
        write_span(&mut out, span.kind, &span.text);
    }
    out
}

const TAGS: &[(&str, Option<SpanKind>)] = &[
    ("<del>", Some(SpanKind::Delete)),
    ("</del>", None),
    ("<ins>", Some(SpanKind::Insert)),
    ("</ins>", None),
    ("<eq>", Some(SpanKind::Unchanged)),
    ("</eq>", None),
];

/// Split rendered markup back into styled spans. Unknown `<` sequences are
/// treated as text; `&lt;` and `&amp;` decode to `<` and `&`.
pub fn parse_markup(markup: &str) -> Vec<DiffSpan> {
    let mut out: Vec<DiffSpan> = Vec::new();
    let mut kind = SpanKind::Equal;
    let mut buf = String::new();
    let mut rest = markup;

    'outer: while let Some(ch) = rest.chars().next() {
        if ch == '&' {
            let decoded = [(LT_ESCAPE, '<'), (AMP_ESCAPE, '&')]
                .into_iter()
                .find_map(|(escape, ch)| rest.strip_prefix(escape).map(|after| (after, ch)));
            if let Some((after, ch)) = decoded {
                buf.push(ch);
                rest = after;
                continue;
            }
        }
        if ch == '<' {
            for (tag, next) in TAGS {
                if let Some(after) = rest.strip_prefix(tag) {
                    if !buf.is_empty() {
                        out.push(DiffSpan {
                            kind,
                            text: std::mem::take(&mut buf),
                        });
                    }
                    kind = next.unwrap_or(SpanKind::Equal);
                    rest = after;
                    continue 'outer;
                }
            }
        }
        buf.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    if !buf.is_empty() {
        out.push(DiffSpan { kind, text: buf });
    }
    out
}
