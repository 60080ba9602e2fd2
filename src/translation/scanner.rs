/// End (exclusive) of the ASCII digit run starting at `start`, if there is at least one digit.
pub(super) fn scan_digits(bytes: &[u8], start: usize) -> Option<usize> {
    let mut idx = start;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    if idx == start { None } else { Some(idx) }
}
