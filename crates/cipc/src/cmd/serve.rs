use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use cipc_channel::{Channel, Response, ShutdownHandle, UnixChannel};
use cipc_msg::Message;

use crate::cmd::ServeArgs;
use crate::exit::{channel_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: ServeArgs, _format: OutputFormat) -> CliResult<i32> {
    let mut channel =
        UnixChannel::bind(&args.path).map_err(|err| channel_error("bind failed", err))?;

    let stop = Arc::new(AtomicBool::new(false));
    let current = Arc::new(Mutex::new(channel.shutdown_handle()));
    install_ctrlc_handler(Arc::clone(&stop), Arc::clone(&current))?;

    while !stop.load(Ordering::SeqCst) {
        match channel.accept(&mut echo) {
            Ok(()) if channel.is_closed() => break,
            Ok(()) => {
                tracing::info!(path = %args.path.display(), "peer session finished");
                if args.once {
                    break;
                }
            }
            Err(err) if args.once => return Err(channel_error("session failed", err)),
            Err(err) => {
                tracing::warn!(error = %err, "peer session failed, rebinding");
                // The failed session closed the listener.
                drop(channel);
                channel = UnixChannel::bind(&args.path)
                    .map_err(|err| channel_error("rebind failed", err))?;
                if let Ok(mut handle) = current.lock() {
                    *handle = channel.shutdown_handle();
                }
            }
        }
    }

    Ok(SUCCESS)
}

/// Reply with the request's argument bytes under the same call id.
fn echo(message: &Message, response: &mut Response) {
    let payload = match message.args_data() {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(call_id = message.call_id(), error = %err, "unreadable payload");
            return;
        }
    };

    tracing::info!(
        call_id = message.call_id(),
        method_id = message.method_id().ok(),
        size = payload.len(),
        "echoing request"
    );

    match Message::build_response_encoded(message.call_id(), payload.as_bytes()) {
        Ok(reply) => response.set(reply),
        Err(err) => tracing::warn!(error = %err, "failed to build reply"),
    }
}

fn install_ctrlc_handler(
    stop: Arc<AtomicBool>,
    current: Arc<Mutex<ShutdownHandle>>,
) -> CliResult<()> {
    ctrlc::set_handler(move || {
        stop.store(true, Ordering::SeqCst);
        if let Ok(handle) = current.lock() {
            handle.shutdown();
        }
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
