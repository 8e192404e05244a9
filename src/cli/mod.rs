//! Argument handling shared by the command-line tools.

use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;

/// Result of parsing a command line.
#[derive(Debug)]
pub enum ParseOutcome<P> {
    /// Arguments parsed.
    Parsed(P),
    /// Help or version text was requested; print it and exit 0.
    Informational(String),
    /// Bad arguments; print these lines to stderr and exit 1.
    Usage(Vec<String>),
}

/// Parses `args` (program name first) without exiting.
pub fn parse_from<P, I, T>(args: I) -> ParseOutcome<P>
where
    P: Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let program = args
        .first()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    match P::try_parse_from(&args) {
        Ok(parsed) => ParseOutcome::Parsed(parsed),
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                ParseOutcome::Informational(e.to_string())
            }
            _ => ParseOutcome::Usage(usage_lines(&program, &e.to_string())),
        },
    }
}

/// Parses the process arguments, exiting on help or bad usage.
pub fn parse_or_exit<P: Parser>() -> P {
    match parse_from(std::env::args_os()) {
        ParseOutcome::Parsed(parsed) => parsed,
        ParseOutcome::Informational(text) => {
            print!("{}", text);
            std::process::exit(0);
        }
        ParseOutcome::Usage(lines) => {
            for line in lines {
                eprintln!("{}", line);
            }
            std::process::exit(1);
        }
    }
}

fn usage_lines(program: &str, rendered: &str) -> Vec<String> {
    let reason = rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error:")
        .trim();
    vec![
        format!("{}: {}", program, reason),
        format!("{}: Try --help for usage details.", program),
    ]
}
