use xi_rope::Rope;

/// One source line, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRef {
    /// Zero-based line number.
    pub number: usize,
    pub text: String,
}

/// Returns an iterator over the rope's lines with their line numbers.
///
/// Uses `lines_raw` and trims the terminator itself so `\r\n` files come out
/// the same as `\n` files.
pub fn numbered_lines(rope: &Rope) -> impl Iterator<Item = LineRef> + '_ {
    rope.lines_raw(..).enumerate().map(|(number, line)| LineRef {
        number,
        text: line.trim_end_matches(['\r', '\n']).to_string(),
    })
}
