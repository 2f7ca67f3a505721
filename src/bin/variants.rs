use std::io;
use std::io::Read;

use md5hex::Variant;

fn main() -> io::Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    let mut text = String::new();
    input.read_to_string(&mut text)?;

    for variant in Variant::ALL {
        println!("{:<20}: {}", variant.name(), variant.digest_hex(&text));
    }
    Ok(())
}
