use super::commands::{ListenCommand, PublishCommand};
use crate::config::PublisherConfig;
use crate::constants::endpoints;
use crate::events::{parse_event, JsonPayloadFormatter, LifecycleEvent};
use crate::listener::RunListener;
use crate::publisher::Publisher;
use crate::settings::SharedSettings;
use crate::transport;
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// Run a publisher fed by JSON lines on stdin until stdin closes.
pub async fn handle_publish(cmd: PublishCommand) -> Result<()> {
    let config = PublisherConfig::load(&cmd.config).context("Failed to load configuration")?;
    let settings = Arc::new(SharedSettings::from_config(&config));
    let publisher =
        Publisher::start(&config, settings.clone()).context("Failed to start publisher")?;
    let current = settings.snapshot();
    let listener = RunListener::new(publisher, settings, JsonPayloadFormatter);

    info!(
        port = current.port,
        globally_enabled = current.globally_enabled,
        "reading lifecycle events from stdin"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<LifecycleEvent>(line) {
            Ok(event) => listener.dispatch(&event),
            Err(e) => warn!(error = %e, "ignoring malformed event line"),
        }
    }

    if !drain(listener.publisher(), Duration::from_millis(cmd.drain_ms)).await {
        warn!(
            outstanding = listener.publisher().stats().outstanding(),
            "drain period elapsed with events still in flight"
        );
    }

    info!(stats = ?listener.publisher().stats(), "stdin closed, exiting");
    Ok(())
}

/// Wait until the worker has finished every accepted event, up to `timeout`.
///
/// An empty queue is not enough: the last event leaves the queue before it
/// is sent. Returns whether everything was finished in time.
pub async fn drain(publisher: &Publisher, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if publisher.stats().outstanding() == 0 {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Print events from a publisher until `count` is reached or Ctrl-C.
pub async fn handle_listen(cmd: ListenCommand) -> Result<()> {
    let endpoint = endpoints::connect(&cmd.host, cmd.port);
    let stop = Arc::new(AtomicBool::new(false));

    let worker_stop = stop.clone();
    let mut task = tokio::task::spawn_blocking(move || {
        receive_loop(&endpoint, &cmd.prefix, cmd.count, &worker_stop)
    });

    tokio::select! {
        res = &mut task => res.context("listener task panicked")?,
        _ = tokio::signal::ctrl_c() => {
            stop.store(true, Ordering::Relaxed);
            task.await.context("listener task panicked")?
        }
    }
}

fn receive_loop(endpoint: &str, prefix: &str, count: Option<usize>, stop: &AtomicBool) -> Result<()> {
    let ctx = transport::global_context();
    let socket = transport::open_subscriber(&ctx, endpoint, prefix)
        .with_context(|| format!("Failed to subscribe to {}", endpoint))?;
    socket.set_rcvtimeo(200)?;

    info!(endpoint, prefix, "listening for events");

    let mut received = 0usize;
    while !stop.load(Ordering::Relaxed) {
        match socket.recv_bytes(0) {
            Ok(bytes) => {
                let Some(message) = event_message(&bytes) else {
                    continue;
                };
                println!("{}", message);
                received += 1;
                if count.is_some_and(|c| received >= c) {
                    break;
                }
            }
            Err(zmq::Error::EAGAIN) => continue,
            Err(e) => return Err(e).context("Failed to receive event"),
        }
    }

    Ok(())
}

/// Decode a received frame, rejecting anything without an event name.
fn event_message(bytes: &[u8]) -> Option<String> {
    let message = String::from_utf8_lossy(bytes);
    match parse_event(&message) {
        Some((name, _)) => {
            debug!(event = name, len = bytes.len(), "received event");
            Some(message.into_owned())
        }
        None => {
            warn!(len = bytes.len(), "ignoring message without event name");
            None
        }
    }
}
