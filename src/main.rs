use std::io::{self, prelude::*};

use huffdecode::{Checks, CodeTable};
use tracing_subscriber::EnvFilter;

/// Reads a code table followed by an encoded message from stdin, and writes
/// the decoded message to stdout.
///
/// `--strict` rejects a message that ends partway through a codeword.
/// `--lenient` accepts code tables that aren't prefix-free.
fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut checks = Checks::default();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--strict" => checks.insert(Checks::COMPLETE_STREAM),
            "--lenient" => checks.remove(Checks::PREFIX_FREE),
            other => {
                let msg = format!("unrecognized argument: {other}");
                return Err(io::Error::new(io::ErrorKind::InvalidInput, msg));
            }
        }
    }

    let mut input = io::stdin().lock();
    let tree = CodeTable::read(&mut input)?.build(checks)?;

    let mut stdout = io::stdout().lock();
    io::copy(&mut huffdecode::decode(&tree, input), &mut stdout)?;
    writeln!(stdout)?;

    Ok(())
}
