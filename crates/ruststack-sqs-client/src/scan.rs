//! Line-oriented tag scanning of queue responses.
//!
//! Responses are read one line at a time and matched against literal tags.
//! Nothing here parses XML: a tag split across lines is not recognized,
//! except for `<Body>` content, which may span any number of lines.

use ruststack_iobuf::{IoBuf, IoBufResult};
use tracing::trace;

const QUEUE_URL_OPEN: &[u8] = b"<QueueUrl>";
const QUEUE_URL_CLOSE: &[u8] = b"</QueueUrl>";
const VISIBILITY_TIMEOUT_PREFIX: &[u8] = b"<Name>VisibilityTimeout</Name><Value>";
const MESSAGE_COUNT_PREFIX: &[u8] = b"<Name>ApproximateNumberOfMessages</Name><Value>";
const RECEIPT_OPEN: &[u8] = b"<ReceiptHandle>";
const RECEIPT_CLOSE: &[u8] = b"</ReceiptHandle>";
const BODY_OPEN: &[u8] = b"<Body>";
const BODY_CLOSE: &[u8] = b"</Body>";

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Content between `open` and `close` on one line, if both are present.
fn between<'l>(line: &'l [u8], open: &[u8], close: &[u8]) -> Option<&'l [u8]> {
    let start = find(line, open)? + open.len();
    let len = find(&line[start..], close)?;
    Some(&line[start..start + len])
}

/// Leading decimal digits after `prefix`, or `None` when the prefix is
/// absent. Digits that do not fit count as absent.
fn number_after(line: &[u8], prefix: &[u8]) -> Option<u64> {
    let start = find(line, prefix)? + prefix.len();
    let digits = line[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    std::str::from_utf8(&line[start..start + digits])
        .ok()?
        .parse()
        .ok()
}

/// Append every `<QueueUrl>` in `response` to `out`, one per line.
/// Returns how many were found.
pub fn collect_queue_urls(response: &mut IoBuf<'_>, out: &mut IoBuf<'_>) -> IoBufResult<usize> {
    let mut line = Vec::new();
    let mut found = 0;
    while response.read_full_line(&mut line) > 0 {
        if let Some(url) = between(&line, QUEUE_URL_OPEN, QUEUE_URL_CLOSE) {
            out.append(url)?;
            out.append(b"\n")?;
            found += 1;
        }
    }
    Ok(found)
}

/// Attributes returned by `GetQueueAttributes`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueAttributes {
    /// Seconds a received message stays hidden from other readers.
    pub visibility_timeout: Option<u64>,
    /// Approximate number of visible messages.
    pub approximate_messages: Option<u64>,
}

/// Extract the visibility timeout and message count from `response`.
/// The last occurrence of each wins.
pub fn scan_queue_attributes(response: &mut IoBuf<'_>) -> QueueAttributes {
    let mut attributes = QueueAttributes::default();
    let mut line = Vec::new();
    while response.read_full_line(&mut line) > 0 {
        if let Some(timeout) = number_after(&line, VISIBILITY_TIMEOUT_PREFIX) {
            attributes.visibility_timeout = Some(timeout);
        }
        if let Some(count) = number_after(&line, MESSAGE_COUNT_PREFIX) {
            attributes.approximate_messages = Some(count);
        }
    }
    attributes
}

/// Where the message scanner is within a `ReceiveMessage` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Looking for the receipt handle and the start of the body.
    Scanning,
    /// Copying body lines until `</Body>`.
    InsideBody,
    /// The body has been copied; later lines are ignored.
    Done,
}

/// State machine extracting the first message from a `ReceiveMessage`
/// response.
#[derive(Debug)]
pub struct MessageScanner {
    state: ScanState,
    receipt: Option<String>,
}

impl Default for MessageScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageScanner {
    /// A scanner at the start of a response.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ScanState::Scanning,
            receipt: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Receipt handle seen so far.
    #[must_use]
    pub fn receipt(&self) -> Option<&str> {
        self.receipt.as_deref()
    }

    /// Consume the scanner, returning the receipt handle.
    #[must_use]
    pub fn into_receipt(self) -> Option<String> {
        self.receipt
    }

    /// Feed one response line, appending body bytes to `body`.
    pub fn feed(&mut self, line: &[u8], body: &mut IoBuf<'_>) -> IoBufResult<ScanState> {
        match self.state {
            ScanState::Done => {}
            ScanState::InsideBody => self.copy_body(line, body)?,
            ScanState::Scanning => {
                let mut rest = line;
                if let Some(start) = find(line, RECEIPT_OPEN).map(|i| i + RECEIPT_OPEN.len()) {
                    let tail = &line[start..];
                    let (handle, after) = match find(tail, RECEIPT_CLOSE) {
                        Some(end) => (&tail[..end], &tail[end + RECEIPT_CLOSE.len()..]),
                        None => (tail.trim_ascii_end(), &[][..]),
                    };
                    self.receipt = Some(String::from_utf8_lossy(handle).into_owned());
                    rest = after;
                }
                if let Some(start) = find(rest, BODY_OPEN) {
                    self.transition(ScanState::InsideBody);
                    self.copy_body(&rest[start + BODY_OPEN.len()..], body)?;
                }
            }
        }
        Ok(self.state)
    }

    fn copy_body(&mut self, chunk: &[u8], body: &mut IoBuf<'_>) -> IoBufResult<()> {
        match find(chunk, BODY_CLOSE) {
            Some(end) => {
                body.append(&chunk[..end])?;
                self.transition(ScanState::Done);
            }
            None => body.append(chunk)?,
        }
        Ok(())
    }

    fn transition(&mut self, next: ScanState) {
        trace!(from = ?self.state, to = ?next, "message scanner transition");
        self.state = next;
    }
}

/// Run a [`MessageScanner`] over `response`, appending the first message
/// body to `body`. Returns the receipt handle.
pub fn scan_message(response: &mut IoBuf<'_>, body: &mut IoBuf<'_>) -> IoBufResult<Option<String>> {
    let mut scanner = MessageScanner::new();
    let mut line = Vec::new();
    while response.read_full_line(&mut line) > 0 {
        if scanner.feed(&line, body)? == ScanState::Done {
            break;
        }
    }
    Ok(scanner.into_receipt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(text: &str) -> IoBuf<'static> {
        let mut buf = IoBuf::new();
        buf.append_str(text).unwrap();
        buf
    }

    fn text_of(buf: &IoBuf<'_>) -> String {
        String::from_utf8(buf.to_vec()).unwrap()
    }

    #[test]
    fn test_should_collect_queue_urls_one_per_line() {
        let mut response = buffer_with(
            "<ListQueuesResponse><ListQueuesResult>\n\
             <QueueUrl>http://queue.amazonaws.com/123/alpha</QueueUrl>\n\
             <QueueUrl>http://queue.amazonaws.com/123/beta</QueueUrl>\n\
             </ListQueuesResult></ListQueuesResponse>\n",
        );
        let mut out = IoBuf::new();
        assert_eq!(collect_queue_urls(&mut response, &mut out).unwrap(), 2);
        assert_eq!(
            text_of(&out),
            "http://queue.amazonaws.com/123/alpha\nhttp://queue.amazonaws.com/123/beta\n"
        );
    }

    #[test]
    fn test_should_skip_unterminated_queue_url() {
        let mut response = buffer_with("<QueueUrl>http://q/1/half\n");
        let mut out = IoBuf::new();
        assert_eq!(collect_queue_urls(&mut response, &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_should_scan_queue_attributes() {
        let mut response = buffer_with(
            "<GetQueueAttributesResult>\n\
             <Attribute><Name>VisibilityTimeout</Name><Value>30</Value></Attribute>\n\
             <Attribute><Name>ApproximateNumberOfMessages</Name><Value>7</Value></Attribute>\n\
             </GetQueueAttributesResult>\n",
        );
        assert_eq!(
            scan_queue_attributes(&mut response),
            QueueAttributes {
                visibility_timeout: Some(30),
                approximate_messages: Some(7),
            }
        );
    }

    #[test]
    fn test_should_leave_missing_attributes_unset() {
        let mut response = buffer_with("<Error><Code>AccessDenied</Code></Error>\n");
        assert_eq!(scan_queue_attributes(&mut response), QueueAttributes::default());
    }

    #[test]
    fn test_should_extract_single_line_message() {
        let mut response = buffer_with(
            "<ReceiveMessageResult><Message><MessageId>m1</MessageId>\
             <ReceiptHandle>rh+1/2=</ReceiptHandle><MD5OfBody>x</MD5OfBody>\
             <Body>hello world</Body></Message></ReceiveMessageResult>\n",
        );
        let mut body = IoBuf::new();
        let receipt = scan_message(&mut response, &mut body).unwrap();
        assert_eq!(receipt.as_deref(), Some("rh+1/2="));
        assert_eq!(text_of(&body), "hello world");
    }

    #[test]
    fn test_should_carry_body_across_lines() {
        let mut response = buffer_with(
            "<Message><ReceiptHandle>abc</ReceiptHandle><Body>first line\n\
             second line\n\
             last</Body></Message>\n\
             <Message><ReceiptHandle>ignored</ReceiptHandle><Body>no</Body></Message>\n",
        );
        let mut body = IoBuf::new();
        let receipt = scan_message(&mut response, &mut body).unwrap();
        assert_eq!(receipt.as_deref(), Some("abc"));
        assert_eq!(text_of(&body), "first line\nsecond line\nlast");
    }

    #[test]
    fn test_should_track_scanner_states() {
        let mut scanner = MessageScanner::new();
        let mut body = IoBuf::new();
        assert_eq!(scanner.state(), ScanState::Scanning);
        assert_eq!(
            scanner.feed(b"<ReceiptHandle>r</ReceiptHandle>\n", &mut body).unwrap(),
            ScanState::Scanning
        );
        assert_eq!(scanner.receipt(), Some("r"));
        assert_eq!(scanner.feed(b"<Body>a\n", &mut body).unwrap(), ScanState::InsideBody);
        assert_eq!(scanner.feed(b"b</Body>\n", &mut body).unwrap(), ScanState::Done);
        assert_eq!(scanner.feed(b"<Body>late</Body>\n", &mut body).unwrap(), ScanState::Done);
        assert_eq!(text_of(&body), "a\nb");
    }

    #[test]
    fn test_should_return_none_for_empty_queue() {
        let mut response = buffer_with("<ReceiveMessageResult/>\n");
        let mut body = IoBuf::new();
        assert_eq!(scan_message(&mut response, &mut body).unwrap(), None);
        assert!(body.is_empty());
    }
}
