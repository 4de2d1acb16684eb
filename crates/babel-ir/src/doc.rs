//! Documentation string normalization.

/// Unwrap soft line breaks in a documentation block.
///
/// The text is trimmed first. A lone newline becomes a single space, which
/// rejoins hard-wrapped prose; a run of N newlines becomes N-1 newlines, so
/// paragraph breaks survive as single newlines.
pub fn doc_unwrap(raw_doc: Option<&str>) -> Option<String> {
    let raw_doc = raw_doc?;
    let mut doc = String::with_capacity(raw_doc.len());
    let mut newlines = 0usize;

    for c in raw_doc.trim().chars() {
        if c == '\n' {
            newlines += 1;
            if newlines > 1 {
                doc.push(c);
            }
        } else {
            if newlines == 1 {
                doc.push(' ');
            }
            newlines = 0;
            doc.push(c);
        }
    }

    Some(doc)
}
