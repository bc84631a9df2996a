use crate::inline::InlineRange;
use crate::introspect::LineEntry;

/// Inclusive source line span of a method body.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LineSpan {
    pub start: i32,
    pub end: i32,
}

/// Smallest and largest line among entries that are positive and outside
/// every inline range. `None` when no entry qualifies.
pub fn analyze(lines: &[LineEntry], inline_ranges: &[InlineRange]) -> Option<LineSpan> {
    let mut start = 0;
    let mut end = 0;

    for entry in lines {
        let line = entry.line_number;
        if line <= 0 {
            continue;
        }
        if inline_ranges.iter().any(|r| r.contains(entry.start_location)) {
            continue;
        }
        if start == 0 {
            start = line;
            end = line;
        } else {
            start = start.min(line);
            end = end.max(line);
        }
    }

    (start > 0).then_some(LineSpan { start, end })
}
