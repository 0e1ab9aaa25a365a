use cipc_msg::{Message, MessageType};

use crate::cmd::InspectArgs;
use crate::exit::{message_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_message, MessageOutput, OutputFormat};
use crate::value::{ArgValue, ValueKind};

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex(&args.hex)
        .map_err(|err| CliError::new(USAGE, format!("invalid hex input: {err}")))?;
    let message = parse(&bytes)?;

    let value = match args.decode {
        Some(kind) => Some(decode_payload(&message, kind)?),
        None => None,
    };
    let out = MessageOutput::new(&message, value.as_ref())
        .map_err(|err| message_error("invalid message", err))?;
    print_message(&out, format);

    Ok(SUCCESS)
}

/// Decode hex text, ignoring a leading `0x` and whitespace, `:` or `_`
/// separators.
fn parse_hex(input: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let input = input.trim();
    let input = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    let digits: String = input
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != ':' && *c != '_')
        .collect();
    hex::decode(digits)
}

fn parse(bytes: &[u8]) -> CliResult<Message> {
    let message =
        Message::copy_from_slice(bytes).map_err(|err| message_error("invalid message", err))?;
    message
        .validate()
        .map_err(|err| message_error("invalid message", err))?;
    Ok(message)
}

fn decode_payload(message: &Message, kind: ValueKind) -> CliResult<ArgValue> {
    let payload = match message.message_type() {
        Ok(MessageType::Request) => message.args_data(),
        _ => message.return_value(),
    }
    .map_err(|err| message_error("invalid message", err))?;
    ArgValue::decode_as(kind, &mut payload.reader()).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("cannot decode payload as {}: {err}", kind.name()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_input_accepts_separators() {
        assert_eq!(
            parse_hex("0x43 02:cd_AB").unwrap(),
            vec![0x43, 0x02, 0xCD, 0xAB]
        );
        assert!(parse_hex("430").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn parses_valid_response() {
        let message = parse(&[0x43, 0x02, 0x07, 0x00, 0x2A]).unwrap();
        assert_eq!(message.call_id(), 7);
        assert_eq!(
            decode_payload(&message, ValueKind::U8).unwrap(),
            ArgValue::U8(42)
        );
    }

    #[test]
    fn bad_preamble_is_invalid_data() {
        let err = parse(&[0x44, 0x02, 0x07, 0x00]).unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn truncated_request_is_invalid_data() {
        let err = parse(&[0x43, 0x01, 0x07, 0x00, 0x01]).unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn request_payload_decoded_from_args() {
        let request = Message::build_request(1, 2, 3, &("abc",)).unwrap();
        let message = parse(request.as_bytes()).unwrap();
        assert_eq!(
            decode_payload(&message, ValueKind::Str).unwrap(),
            ArgValue::Str("abc".to_string())
        );
    }
}
