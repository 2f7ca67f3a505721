use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;

use md5::digest::Output;
use md5::Digest as _;
use md5::Md5;

use crate::error::ParseDigestError;

/// Size in bytes of an MD5 digest.
pub const DIGEST_LEN: usize = 16;

/// Length of the hex rendering of a digest.
pub const HEX_LEN: usize = DIGEST_LEN * 2;

pub const HEX_ALPHABET: &[u8; 16] = b"0123456789abcdef";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, std::hash::Hash)]
pub struct Digest {
    inner: [u8; DIGEST_LEN],
}

impl Digest {
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.inner
    }

    /// Writes the lowercase hex form into `out`, high nibble first.
    pub fn encode_hex_into(&self, out: &mut [u8; HEX_LEN]) {
        for (byte, pair) in self.inner.iter().zip(out.chunks_exact_mut(2)) {
            pair[0] = HEX_ALPHABET[(byte >> 4) as usize];
            pair[1] = HEX_ALPHABET[(byte & 0xf) as usize];
        }
    }

    pub fn to_hex(&self) -> String {
        let mut hex = [0u8; HEX_LEN];
        self.encode_hex_into(&mut hex);

        let mut s = String::with_capacity(HEX_LEN);
        s.extend(hex.iter().map(|&c| c as char));
        s
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(inner: [u8; DIGEST_LEN]) -> Self {
        Self { inner }
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hex = [0u8; HEX_LEN];
        self.encode_hex_into(&mut hex);
        for &c in hex.iter() {
            fmt::Write::write_char(f, c as char)?;
        }
        Ok(())
    }
}

impl FromStr for Digest {
    type Err = ParseDigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseDigestError::InvalidToken(s.to_string()));
        }
        if s.len() != HEX_LEN {
            return Err(ParseDigestError::InvalidLength(s.len()));
        }

        let mut inner = [0u8; DIGEST_LEN];
        for (i, byte) in inner.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)?;
        }
        Ok(Self { inner })
    }
}

/// Digests `contents` with a freshly constructed hasher.
pub fn md5_contents<T: AsRef<[u8]>>(contents: T) -> [u8; DIGEST_LEN] {
    Md5::digest(contents.as_ref()).into()
}

pub fn md5_string(h: [u8; DIGEST_LEN]) -> String {
    let mut s = String::new();
    for byte in h.iter() {
        s.push_str(&format!("{:02x}", byte));
    }
    s
}

/// A reusable MD5 hasher.
///
/// The hasher is reset after every successful [`Md5Engine::try_compute`], so a
/// single engine can serve any number of sequential calls. It must not be
/// driven by two callers at once; see [`with_engine`] for the per-thread
/// instance.
#[derive(Debug, Clone, Default)]
pub struct Md5Engine {
    hasher: Md5,
}

impl Md5Engine {
    pub fn new() -> Self {
        Self { hasher: Md5::new() }
    }

    /// Digests `data` into the first [`DIGEST_LEN`] bytes of `dest`.
    ///
    /// Returns the number of bytes written, or `None` when `dest` is shorter
    /// than [`DIGEST_LEN`]. On `None` the engine state is left untouched.
    pub fn try_compute(&mut self, data: &[u8], dest: &mut [u8]) -> Option<usize> {
        let dest = dest.get_mut(..DIGEST_LEN)?;
        self.hasher.update(data);
        self.hasher
            .finalize_into_reset(Output::<Md5>::from_mut_slice(dest));
        Some(DIGEST_LEN)
    }
}

thread_local! {
    static ENGINE: RefCell<Md5Engine> = {
        log::debug!("creating md5 engine for {:?}", std::thread::current().id());
        RefCell::new(Md5Engine::new())
    };
}

/// Runs `f` with the calling thread's engine, creating it on first use.
///
/// Panics if `f` calls `with_engine` again on the same thread.
pub fn with_engine<R>(f: impl FnOnce(&mut Md5Engine) -> R) -> R {
    ENGINE.with(|engine| f(&mut engine.borrow_mut()))
}
