//! Raw HTTP response parsing.
//!
//! The stream transport reads whole responses off the wire. Splitting the
//! raw bytes into header block and body, skipping informational legs, and
//! reading the status code at its fixed byte offsets is fragile enough to
//! live in one place where tests can hit it directly.

/// Byte offset of the three-digit status code in a status line
/// (`HTTP/x.y NNN ...`).
const STATUS_OFFSET: usize = 9;

/// Byte offset of the human-readable remainder after the status code.
const MESSAGE_OFFSET: usize = 13;

/// Split a raw response into header block and body.
///
/// Responses may carry informational legs (for example a `100 Continue`
/// header block) before the real header/body pair. Every leading block
/// whose status is informational is discarded, however many there are, so
/// the returned pair is always the final one.
///
/// Returns `None` when no blank-line separator is present at all.
pub fn split_response(raw: &[u8]) -> Option<(&[u8], &[u8])> {
    let (mut header, mut body) = split_at_blank_line(raw)?;
    while status_code(first_line(header)).is_some_and(|code| (100..200).contains(&code)) {
        let (next_header, next_body) = split_at_blank_line(body)?;
        header = next_header;
        body = next_body;
    }
    Some((header, body))
}

/// First line of a header block, without the line terminator.
pub fn first_line(block: &[u8]) -> &[u8] {
    match block.windows(2).position(|w| w == b"\r\n") {
        Some(end) => &block[..end],
        None => block,
    }
}

/// Status code of a status line, read at the fixed offset convention:
/// bytes 9..12 hold the three digits.
///
/// # Examples
///
/// ```
/// use ferry_fetch::core::status_code;
///
/// assert_eq!(status_code(b"HTTP/1.1 200 OK"), Some(200));
/// assert_eq!(status_code(b"HTTP/1.0 404 Not Found"), Some(404));
/// assert_eq!(status_code(b"garbage"), None);
/// ```
pub fn status_code(line: &[u8]) -> Option<u16> {
    let digits = line.get(STATUS_OFFSET..STATUS_OFFSET + 3)?;
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// Remainder of a status line after the code (byte 13 onward), used as the
/// failure message for non-success statuses.
pub fn status_message(line: &[u8]) -> String {
    line.get(MESSAGE_OFFSET..)
        .map(|rest| String::from_utf8_lossy(rest).into_owned())
        .unwrap_or_default()
}

fn split_at_blank_line(raw: &[u8]) -> Option<(&[u8], &[u8])> {
    raw.windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|at| (&raw[..at], &raw[at + 4..]))
}
