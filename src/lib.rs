pub mod commands;
pub mod encoder;
pub mod error;
pub mod hash;
pub mod pool;
pub mod variants;

#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;

pub use crate::encoder::HexDigestEncoder;
pub use crate::error::*;
pub use crate::hash::{Digest, DIGEST_LEN, HEX_LEN};
pub use crate::pool::BufferPool;
pub use crate::variants::Variant;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

/// Returns the lowercase hex MD5 digest of the UTF-8 encoding of `text`.
///
/// Scratch memory comes from [`BufferPool::global`] and the hasher is cached
/// per thread, so repeated calls allocate only the returned string.
///
/// ```
/// assert_eq!(md5hex::digest_hex("abc"), "900150983cd24fb0d6963f7d28e17f72");
/// ```
pub fn digest_hex(text: &str) -> String {
    HexDigestEncoder::global().digest_hex(text)
}
