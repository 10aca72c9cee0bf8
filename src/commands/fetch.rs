use crate::error::Result;
use crate::request::Execute;
use crate::target::Target;
use std::io::Write;

/// Run the single-shot mode - print the raw response verbatim
pub fn run<E: Execute>(executor: &E, target: &Target) -> Result<()> {
    let response = executor.execute(target)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_response(&mut out, response.raw())?;
    out.flush()?;

    Ok(())
}

fn write_response<W: Write>(out: &mut W, raw: &[u8]) -> Result<()> {
    out.write_all(raw)?;
    out.write_all(b"\n")?;
    Ok(())
}
