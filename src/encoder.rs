use crate::hash::{self, Digest, DIGEST_LEN};
use crate::pool::BufferPool;

/// Longest UTF-8 encoding of a single code point.
pub const MAX_UTF8_BYTES_PER_CHAR: usize = 4;

/// Upper bound on the UTF-8 length of `text`, counted per code point.
pub fn max_utf8_len(text: &str) -> usize {
    text.chars().count().saturating_mul(MAX_UTF8_BYTES_PER_CHAR)
}

/// Encodes `text` into `dest` and returns the number of bytes written.
///
/// Panics if `dest` is too short; size it with [`max_utf8_len`].
pub fn encode_utf8_into(text: &str, dest: &mut [u8]) -> usize {
    let mut written = 0;
    for ch in text.chars() {
        written += ch.encode_utf8(&mut dest[written..]).len();
    }
    written
}

/// Computes the MD5 digest of UTF-8 text using pooled scratch memory and the
/// calling thread's cached [`hash::Md5Engine`].
#[derive(Debug, Clone, Copy)]
pub struct HexDigestEncoder<'p> {
    pool: &'p BufferPool,
}

impl HexDigestEncoder<'static> {
    pub fn global() -> Self {
        Self::with_pool(BufferPool::global())
    }
}

impl Default for HexDigestEncoder<'static> {
    fn default() -> Self {
        Self::global()
    }
}

impl<'p> HexDigestEncoder<'p> {
    pub fn with_pool(pool: &'p BufferPool) -> Self {
        Self { pool }
    }

    /// Writes the digest of `text` into the first [`DIGEST_LEN`] bytes of
    /// `dest` and returns the number of bytes written.
    ///
    /// # Panics
    ///
    /// Panics if `dest` is shorter than [`DIGEST_LEN`]. The scratch buffer is
    /// returned to the pool before the panic propagates.
    pub fn digest_into(&self, text: &str, dest: &mut [u8]) -> usize {
        let dest_len = dest.len();
        let mut scratch = self.pool.lease(max_utf8_len(text));
        let len = encode_utf8_into(text, &mut scratch);

        let written = hash::with_engine(|engine| engine.try_compute(&scratch[..len], dest));
        let Some(written) = written else {
            panic!("digest destination holds {dest_len} bytes, md5 needs {DIGEST_LEN}");
        };
        written
    }

    pub fn digest(&self, text: &str) -> Digest {
        let mut out = [0u8; DIGEST_LEN];
        self.digest_into(text, &mut out);
        Digest::from(out)
    }

    /// Returns the 32-character lowercase hex digest of `text`.
    pub fn digest_hex(&self, text: &str) -> String {
        self.digest(text).to_hex()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};

    use rand::Rng;
    use rayon::prelude::*;

    use super::*;
    use crate::hash::{HEX_ALPHABET, HEX_LEN};

    fn oracle(text: &str) -> String {
        format!("{:x}", md5_oracle::compute(text.as_bytes()))
    }

    fn random_text<R: Rng>(rng: &mut R) -> String {
        let len = rng.random_range(0..300);
        (0..len).map(|_| rng.random::<char>()).collect()
    }

    #[test]
    fn test_known_vectors() {
        let pool = BufferPool::new();
        let encoder = HexDigestEncoder::with_pool(&pool);
        assert_eq!(encoder.digest_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(encoder.digest_hex("abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(
            encoder.digest_hex("The quick brown fox jumps over the lazy dog"),
            "9e107d9d372bb6826bd81d3542a419d6"
        );
    }

    #[test]
    fn test_matches_oracle() {
        let mut rng = rand::rng();
        let encoder = HexDigestEncoder::global();
        for _ in 0..200 {
            let text = random_text(&mut rng);
            let hex = encoder.digest_hex(&text);

            assert_eq!(hex.len(), HEX_LEN);
            assert!(hex.bytes().all(|c| HEX_ALPHABET.contains(&c)));
            assert_eq!(hex, oracle(&text));
        }
    }

    #[test]
    fn test_deterministic() {
        let encoder = HexDigestEncoder::global();
        let text = "ünïcödé and 🦀 crabs";
        let first = encoder.digest_hex(text);
        for _ in 0..10 {
            assert_eq!(encoder.digest_hex(text), first);
        }
        assert_eq!(encoder.digest(text).to_string(), first);
    }

    #[test]
    fn test_utf8_bound() {
        for text in ["", "ascii", "ñ", "€uro", "𝄞 clef", "🦀🦀🦀", "mixed ü € 𝄞"] {
            let bound = max_utf8_len(text);
            assert!(bound >= text.len(), "bound {} < {} for {:?}", bound, text.len(), text);

            let mut buf = vec![0u8; bound];
            let written = encode_utf8_into(text, &mut buf);
            assert_eq!(written, text.len());
            assert_eq!(&buf[..written], text.as_bytes());
        }
    }

    #[test]
    fn test_only_written_bytes_are_hashed() {
        // the scratch buffer is four times longer than "abc"; trailing zeros
        // must not end up in the digest
        let pool = BufferPool::new();
        let encoder = HexDigestEncoder::with_pool(&pool);
        assert_eq!(encoder.digest_hex("abc"), oracle("abc"));
        assert_ne!(encoder.digest_hex("abc"), oracle("abc\0\0\0\0\0\0\0\0\0"));
    }

    #[test]
    #[should_panic]
    fn test_encode_into_short_buffer() {
        let mut buf = [0u8; 3];
        encode_utf8_into("🦀", &mut buf);
    }

    #[test]
    fn test_lease_returned() {
        let pool = BufferPool::new();
        let encoder = HexDigestEncoder::with_pool(&pool);
        for text in ["", "abc", "🦀 crab"] {
            encoder.digest_hex(text);
            assert_eq!(pool.stats().leased, 0);
        }
        assert_eq!(pool.stats().pooled, 1);
    }

    #[test]
    fn test_undersized_destination_panics_and_releases() {
        let pool = BufferPool::new();
        let encoder = HexDigestEncoder::with_pool(&pool);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut short = [0u8; DIGEST_LEN / 2];
            encoder.digest_into("abc", &mut short)
        }));
        assert!(result.is_err());

        let stats = pool.stats();
        assert_eq!(stats.leased, 0);
        assert_eq!(stats.pooled, 1);

        // the thread's engine is still clean afterwards
        assert_eq!(encoder.digest_hex("abc"), oracle("abc"));
    }

    #[test]
    fn test_concurrent_threads() {
        let pool = BufferPool::new();
        let inputs: Vec<String> = (0..16).map(|i| format!("input #{i} {}", "ü".repeat(i))).collect();

        std::thread::scope(|s| {
            for input in &inputs {
                let pool = &pool;
                s.spawn(move || {
                    let encoder = HexDigestEncoder::with_pool(pool);
                    let expected = oracle(input);
                    let same = oracle("shared");
                    for _ in 0..500 {
                        assert_eq!(encoder.digest_hex(input), expected);
                        assert_eq!(encoder.digest_hex("shared"), same);
                    }
                });
            }
        });

        assert_eq!(pool.stats().leased, 0);
    }

    #[test]
    fn test_concurrent_rayon() {
        let mut rng = rand::rng();
        let inputs: Vec<String> = (0..1000).map(|_| random_text(&mut rng)).collect();

        let actual: Vec<String> = inputs.par_iter().map(|s| crate::digest_hex(s)).collect();
        let expected: Vec<String> = inputs.iter().map(|s| oracle(s)).collect();
        assert_eq!(actual, expected);
    }
}
