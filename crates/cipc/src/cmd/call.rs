use cipc_channel::{Channel, FrameConfig, UnixChannel};
use cipc_msg::Message;

use crate::cmd::{parse_duration, CallArgs};
use crate::exit::{channel_error, message_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_message, MessageOutput, OutputFormat};
use crate::value::{ArgValue, ValueKind};

pub fn run(args: CallArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let config = FrameConfig::default()
        .with_read_timeout(Some(timeout))
        .with_write_timeout(Some(timeout));

    let request = build_request(&args)?;
    tracing::debug!(
        call_id = args.call_id,
        method_id = args.method,
        object_id = args.object,
        size = request.len(),
        "sending request"
    );

    let mut channel = UnixChannel::connect(&args.path)
        .and_then(|channel| channel.with_config(config))
        .map_err(|err| channel_error("connect failed", err))?;
    let reply = channel
        .call(&request)
        .map_err(|err| channel_error("call failed", err))?;
    channel.close();

    let value = match args.returns {
        Some(kind) => Some(decode_return(&reply, kind)?),
        None => None,
    };
    let out = MessageOutput::new(&reply, value.as_ref())
        .map_err(|err| message_error("invalid reply", err))?;
    print_message(&out, format);

    Ok(SUCCESS)
}

fn build_request(args: &CallArgs) -> CliResult<Message> {
    args.args
        .iter()
        .fold(
            Message::request(args.call_id, args.method, args.object),
            |builder, value| builder.arg(value),
        )
        .build()
        .map_err(|err| message_error("failed to build request", err))
}

pub(crate) fn decode_return(reply: &Message, kind: ValueKind) -> CliResult<ArgValue> {
    let data = reply
        .return_value()
        .map_err(|err| message_error("invalid reply", err))?;
    ArgValue::decode_as(kind, &mut data.reader()).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("cannot decode return value as {}: {err}", kind.name()),
        )
    })
}
