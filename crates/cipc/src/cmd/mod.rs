use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;
use crate::value::{parse_call_id, parse_method_id, parse_object_id, ArgValue, ValueKind};

pub mod call;
pub mod inspect;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve an echo endpoint that replies with each request's arguments.
    Serve(ServeArgs),
    /// Send one request and print the response.
    Call(CallArgs),
    /// Decode a hex-encoded message.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args, format),
        Command::Call(args) => call::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Socket path to bind.
    pub path: PathBuf,
    /// Exit after the first peer disconnects.
    #[arg(long)]
    pub once: bool,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Socket path to connect to.
    pub path: PathBuf,
    /// Method id (decimal or 0x hex).
    #[arg(long, value_parser = parse_method_id)]
    pub method: u32,
    /// Object id (decimal or 0x hex).
    #[arg(long, default_value = "0", value_parser = parse_object_id)]
    pub object: u64,
    /// Call id echoed back by the server.
    #[arg(long, default_value = "1", value_parser = parse_call_id)]
    pub call_id: u16,
    /// Typed argument as TYPE:VALUE (e.g. u32:42, str:hello). Repeatable.
    #[arg(long = "arg", value_name = "TYPE:VALUE")]
    pub args: Vec<ArgValue>,
    /// Decode the return value as this type.
    #[arg(long, value_name = "TYPE")]
    pub returns: Option<ValueKind>,
    /// Read and write timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Message bytes as hex.
    pub hex: String,
    /// Decode the payload as this type.
    #[arg(long, value_name = "TYPE")]
    pub decode: Option<ValueKind>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    if millis {
        Ok(Duration::from_millis(value))
    } else {
        Ok(Duration::from_secs(value))
    }
}
