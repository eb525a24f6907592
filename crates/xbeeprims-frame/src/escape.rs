//! Byte escaping for API mode 2.
//!
//! Every reserved byte after the leading start marker is replaced with
//! `ESCAPE, byte ^ 0x20`. The first byte is always copied verbatim.

use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::{needs_escape, ESCAPE, ESCAPE_WITH};

/// Escape a complete frame (start marker through checksum).
pub fn escape(frame: &[u8]) -> Bytes {
    let Some((&first, rest)) = frame.split_first() else {
        return Bytes::new();
    };

    let extra = rest.iter().filter(|b| needs_escape(**b)).count();
    let mut out = BytesMut::with_capacity(frame.len() + extra);
    out.put_u8(first);
    for &byte in rest {
        if needs_escape(byte) {
            out.put_u8(ESCAPE);
            out.put_u8(byte ^ ESCAPE_WITH);
        } else {
            out.put_u8(byte);
        }
    }
    out.freeze()
}

/// Remove escaping from a complete frame. The inverse of [`escape`].
///
/// A trailing lone escape marker is dropped.
pub fn unescape(frame: &[u8]) -> Bytes {
    let Some((&first, rest)) = frame.split_first() else {
        return Bytes::new();
    };

    let mut out = BytesMut::with_capacity(frame.len());
    out.put_u8(first);
    let mut pending = false;
    for &byte in rest {
        if pending {
            out.put_u8(byte ^ ESCAPE_WITH);
            pending = false;
        } else if byte == ESCAPE {
            pending = true;
        } else {
            out.put_u8(byte);
        }
    }
    out.freeze()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::constants::START_BYTE;

    #[test]
    fn escapes_reserved_bytes_after_first() {
        let frame = [0x7E, 0x00, 0x07, 0x8B, 0x7D, 0x7E, 0x11, 0x13, 0x00];
        let escaped = escape(&frame);
        assert_eq!(
            escaped.as_ref(),
            &[0x7E, 0x00, 0x07, 0x8B, 0x7D, 0x5D, 0x7D, 0x5E, 0x7D, 0x31, 0x7D, 0x33, 0x00]
        );
    }

    #[test]
    fn leaves_plain_frames_untouched() {
        let frame = [0x7E, 0x00, 0x04, 0x08, 0x52, 0x4E, 0x4A, 0x0D];
        assert_eq!(escape(&frame).as_ref(), &frame);
    }

    #[test]
    fn empty_input() {
        assert!(escape(&[]).is_empty());
        assert!(unescape(&[]).is_empty());
    }

    #[test]
    fn unescape_inverts_known_frame() {
        let wire = [0x7E, 0x00, 0x07, 0x8B, 0x7D, 0x5D, 0x2A, 0x6A, 0x00, 0x00, 0x00, 0x63];
        assert_eq!(
            unescape(&wire).as_ref(),
            &[0x7E, 0x00, 0x07, 0x8B, 0x7D, 0x2A, 0x6A, 0x00, 0x00, 0x00, 0x63]
        );
    }

    proptest! {
        #[test]
        fn unescape_inverts_escape(frame in proptest::collection::vec(any::<u8>(), 0..256)) {
            let escaped = escape(&frame);
            let round = unescape(&escaped);
            prop_assert_eq!(round.as_ref(), frame.as_slice());
        }

        #[test]
        fn leading_byte_is_never_escaped(rest in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut frame = vec![START_BYTE];
            frame.extend_from_slice(&rest);
            let escaped = escape(&frame);
            prop_assert_eq!(escaped[0], START_BYTE);
            prop_assert!(!escaped[1..].contains(&START_BYTE));
        }
    }
}
