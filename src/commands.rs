use std::io::{self, BufRead, BufWriter, Write};

use anyhow::bail;
use clap::Args;
use rayon::prelude::*;

use crate::encoder::HexDigestEncoder;
use crate::hash::Digest;
use crate::variants::Variant;

fn inputs_or_stdin(inputs: &[String]) -> anyhow::Result<Vec<String>> {
    if !inputs.is_empty() {
        return Ok(inputs.to_vec());
    }

    let mut lines = Vec::new();
    for line in io::stdin().lock().lines() {
        lines.push(line?);
    }
    Ok(lines)
}

#[derive(Args, Debug)]
pub struct HashCommand {
    /// Text to hash; lines are read from stdin when omitted
    #[clap(value_name = "text")]
    inputs: Vec<String>,

    /// Implementation used to compute the digests
    #[clap(short, long, default_value_t = Variant::Encoder)]
    variant: Variant,

    /// Hash inputs on all cores
    #[clap(long)]
    parallel: bool,
}

impl HashCommand {
    pub fn run(&self) -> anyhow::Result<()> {
        let inputs = inputs_or_stdin(&self.inputs)?;
        let variant = self.variant;

        let digests: Vec<String> = if self.parallel {
            inputs.par_iter().map(|s| variant.digest_hex(s)).collect()
        } else {
            inputs.iter().map(|s| variant.digest_hex(s)).collect()
        };
        log::info!("hashed {} inputs with {}", inputs.len(), variant);

        let stdout = io::stdout().lock();
        let mut stdout = BufWriter::new(stdout);
        for (digest, input) in digests.iter().zip(&inputs) {
            writeln!(&mut stdout, "{} {}", digest, input)?;
        }
        stdout.flush()?;

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Text to hash
    text: String,

    /// Expected digest as 32 hex digits
    #[clap(value_name = "digest")]
    expected: Digest,
}

impl CheckCommand {
    pub fn run(&self) -> anyhow::Result<()> {
        let actual = HexDigestEncoder::global().digest(&self.text);
        if actual != self.expected {
            bail!("digest mismatch: expected {}, got {}", self.expected, actual);
        }

        println!("OK {}", actual);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct CompareCommand {
    /// Text to hash; lines are read from stdin when omitted
    #[clap(value_name = "text")]
    inputs: Vec<String>,
}

impl CompareCommand {
    pub fn run(&self) -> anyhow::Result<()> {
        let inputs = inputs_or_stdin(&self.inputs)?;

        let mut mismatches = 0;
        for input in &inputs {
            let expected = Variant::Encoder.digest_hex(input);
            for variant in Variant::ALL {
                let actual = variant.digest_hex(input);
                log::debug!("{:>20} {} {:?}", variant, actual, input);
                if actual != expected {
                    log::error!(
                        "{} disagrees on {:?}: {} != {}",
                        variant,
                        input,
                        actual,
                        expected
                    );
                    mismatches += 1;
                }
            }
        }

        if mismatches > 0 {
            bail!("{} mismatching digests", mismatches);
        }
        println!(
            "{} variants agree on {} inputs",
            Variant::ALL.len(),
            inputs.len()
        );
        Ok(())
    }
}
