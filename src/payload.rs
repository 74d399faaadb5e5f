//! Deterministic payload generation.
//!
//! The transfer buffer is filled with a repeating run of printable ASCII so
//! that captures are visually inspectable and generation stays CPU-cheap.
//! No random source is involved; repeated calls produce identical bytes.

const FIRST: u8 = b'A';
const LAST_PRINTABLE: u8 = 0x7e; // '~', the top of printable ASCII

/// Fill a buffer of `len` bytes with the repeating pattern.
///
/// Byte 0 is `'A'`; each subsequent byte increments, wrapping back to `'A'`
/// whenever the next value would fall outside printable ASCII (32..=126).
pub fn generate(len: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(len);
    let mut b = FIRST;
    for _ in 0..len {
        buf.push(b);
        b = if b >= LAST_PRINTABLE { FIRST } else { b + 1 };
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_and_determinism() {
        for n in [0usize, 1, 7, 95, 4096] {
            let a = generate(n);
            assert_eq!(a.len(), n);
            assert_eq!(a, generate(n));
        }
    }

    #[test]
    fn test_first_bytes() {
        assert_eq!(generate(5), b"ABCDE");
        assert_eq!(generate(1)[0], b'A');
    }

    #[test]
    fn test_wraps_at_printable_boundary() {
        // 'A' is 65 and '~' is 126, so the cycle length is 62. Index 61
        // holds '~' and index 62 wraps back to 'A'.
        let buf = generate(95);
        assert_eq!(buf[61], b'~');
        assert_eq!(buf[62], b'A');
        assert!(buf.iter().all(|&b| (0x20..=0x7e).contains(&b)));
    }

    #[test]
    fn test_every_byte_printable_in_large_buffer() {
        let buf = generate(12288);
        assert!(buf.iter().all(|&b| b.is_ascii_graphic()));
    }
}
