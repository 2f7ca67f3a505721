//! The hex digest helper written several ways, from the allocating baseline to
//! [`HexDigestEncoder`]. Every variant returns the same string for the same
//! input; they differ only in where buffers and the hasher come from.

use std::fmt;
use std::sync::{Mutex, OnceLock, PoisonError};

use md5::Digest as _;
use md5::Md5;

use crate::encoder::{self, HexDigestEncoder};
use crate::hash::{self, Md5Engine, DIGEST_LEN, HEX_ALPHABET};
use crate::pool::BufferPool;

/// Inputs whose UTF-8 bound fits here are encoded on the stack.
pub const STACK_INPUT_LIMIT: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Variant {
    /// Copies the input, hashes with a new hasher, formats each byte
    Allocating,
    /// Hex digits from a lookup table
    LookupTable,
    /// Input encoded into a pooled scratch buffer
    PooledInput,
    /// Digest written into a stack array
    StackOutput,
    /// One hasher for the whole process behind a mutex
    SharedEngine,
    /// One hasher per thread
    ThreadLocalEngine,
    /// Small inputs encoded on the stack
    StackInput,
    /// HexDigestEncoder
    Encoder,
}

impl Variant {
    pub const ALL: [Variant; 8] = [
        Variant::Allocating,
        Variant::LookupTable,
        Variant::PooledInput,
        Variant::StackOutput,
        Variant::SharedEngine,
        Variant::ThreadLocalEngine,
        Variant::StackInput,
        Variant::Encoder,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Allocating => "allocating",
            Variant::LookupTable => "lookup-table",
            Variant::PooledInput => "pooled-input",
            Variant::StackOutput => "stack-output",
            Variant::SharedEngine => "shared-engine",
            Variant::ThreadLocalEngine => "thread-local-engine",
            Variant::StackInput => "stack-input",
            Variant::Encoder => "encoder",
        }
    }

    pub fn digest_hex(self, text: &str) -> String {
        match self {
            Variant::Allocating => allocating(text),
            Variant::LookupTable => lookup_table(text),
            Variant::PooledInput => pooled_input(text),
            Variant::StackOutput => stack_output(text),
            Variant::SharedEngine => shared_engine(text),
            Variant::ThreadLocalEngine => thread_local_engine(text),
            Variant::StackInput => stack_input(text),
            Variant::Encoder => HexDigestEncoder::global().digest_hex(text),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn hex_from_table(digest: &[u8]) -> String {
    let mut s = String::with_capacity(digest.len() * 2);
    for byte in digest {
        s.push(HEX_ALPHABET[(byte >> 4) as usize] as char);
        s.push(HEX_ALPHABET[(byte & 0xf) as usize] as char);
    }
    s
}

fn check_written(written: Option<usize>) {
    assert_eq!(written, Some(DIGEST_LEN), "md5 destination must hold {DIGEST_LEN} bytes");
}

pub fn allocating(text: &str) -> String {
    let bytes = text.as_bytes().to_vec();
    let digest: [u8; DIGEST_LEN] = Md5::digest(&bytes).into();
    hash::md5_string(digest)
}

pub fn lookup_table(text: &str) -> String {
    hex_from_table(&Md5::digest(text.as_bytes()))
}

pub fn pooled_input(text: &str) -> String {
    let mut scratch = BufferPool::global().lease(encoder::max_utf8_len(text));
    let len = encoder::encode_utf8_into(text, &mut scratch);
    hex_from_table(&Md5::digest(&scratch[..len]))
}

pub fn stack_output(text: &str) -> String {
    let mut scratch = BufferPool::global().lease(encoder::max_utf8_len(text));
    let len = encoder::encode_utf8_into(text, &mut scratch);

    let mut out = [0u8; DIGEST_LEN];
    check_written(Md5Engine::new().try_compute(&scratch[..len], &mut out));
    hex_from_table(&out)
}

fn shared() -> &'static Mutex<Md5Engine> {
    static ENGINE: OnceLock<Mutex<Md5Engine>> = OnceLock::new();
    ENGINE.get_or_init(|| Mutex::new(Md5Engine::new()))
}

pub fn shared_engine(text: &str) -> String {
    let mut scratch = BufferPool::global().lease(encoder::max_utf8_len(text));
    let len = encoder::encode_utf8_into(text, &mut scratch);

    let mut out = [0u8; DIGEST_LEN];
    let written = shared()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .try_compute(&scratch[..len], &mut out);
    check_written(written);
    hex_from_table(&out)
}

pub fn thread_local_engine(text: &str) -> String {
    let mut scratch = BufferPool::global().lease(encoder::max_utf8_len(text));
    let len = encoder::encode_utf8_into(text, &mut scratch);

    let mut out = [0u8; DIGEST_LEN];
    check_written(hash::with_engine(|engine| engine.try_compute(&scratch[..len], &mut out)));
    hex_from_table(&out)
}

pub fn stack_input(text: &str) -> String {
    let bound = encoder::max_utf8_len(text);
    let mut out = [0u8; DIGEST_LEN];

    let written = if bound <= STACK_INPUT_LIMIT {
        let mut stack = [0u8; STACK_INPUT_LIMIT];
        let len = encoder::encode_utf8_into(text, &mut stack[..bound]);
        hash::with_engine(|engine| engine.try_compute(&stack[..len], &mut out))
    } else {
        let mut scratch = BufferPool::global().lease(bound);
        let len = encoder::encode_utf8_into(text, &mut scratch);
        hash::with_engine(|engine| engine.try_compute(&scratch[..len], &mut out))
    };
    check_written(written);
    hex_from_table(&out)
}
