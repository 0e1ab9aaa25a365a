//! Minimal echo server: serves one peer and replies with each request's
//! arguments.
//!
//! Run with:
//!   cargo run --example echo-server
//!
//! In another terminal:
//!   cargo run --features cli -- call /tmp/cipc-echo-<pid>/echo.sock \
//!     --method 1 --arg str:hello --returns str

use std::fs;

use cipc::{Channel, Message, UnixChannel};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sock_dir = std::env::temp_dir().join(format!("cipc-echo-{}", std::process::id()));
    fs::create_dir_all(&sock_dir)?;
    let sock_path = sock_dir.join("echo.sock");

    let mut server = UnixChannel::bind(&sock_path)?;
    eprintln!("Listening on {}", sock_path.display());

    // Serve until the peer disconnects.
    server.accept(&mut |request, response| {
        let args = match request.args_data() {
            Ok(args) => args,
            Err(e) => {
                eprintln!("Dropping non-request message: {e}");
                return;
            }
        };
        eprintln!(
            "call_id={} method={:?} {} bytes",
            request.call_id(),
            request.method_id().ok(),
            args.len()
        );
        if let Ok(reply) = Message::build_response_encoded(request.call_id(), args.as_bytes()) {
            response.set(reply);
        }
    })?;

    drop(server);
    let _ = fs::remove_dir_all(&sock_dir);
    Ok(())
}
