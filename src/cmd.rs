use crate::context::Context;
use crate::error::Error;
use crate::result::Result;
use log::{debug, info, warn};
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::thread;

/// Render a command line the way it is logged
pub fn display(program: &str, args: &[String]) -> String {
    let mut line = String::from(program);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Execute a command, forwarding its output to the log, and return its exit code
///
/// stderr is drained on its own thread so a child writing heavily to both
/// streams cannot block on a full pipe.
pub fn execute(ctx: &Context, program: &str, args: &[String]) -> Result<i32> {
    if ctx.verbose {
        info!("Executing: {}", display(program, args));
    }

    let mut child = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let verbose = ctx.verbose;
    let stderr = child.stderr.take().map(|stderr| {
        thread::spawn(move || {
            let reader = BufReader::new(stderr);
            for line in reader.lines().map_while(|l| l.ok()) {
                if verbose {
                    warn!("{}", line);
                } else {
                    debug!("{}", line);
                }
            }
        })
    });

    if let Some(stdout) = child.stdout.take() {
        let reader = BufReader::new(stdout);
        for line in reader.lines().map_while(|l| l.ok()) {
            if verbose {
                info!("{}", line);
            } else {
                debug!("{}", line);
            }
        }
    }

    let drained = stderr.map_or(true, |handle| handle.join().is_ok());
    let status = child.wait()?;
    if !drained {
        return Err(Error::custom(format!("stderr reader of {} panicked", program)));
    }

    let code = status.code().unwrap_or(-1);
    debug!("Exit code {}", code);

    Ok(code)
}
