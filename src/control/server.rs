use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Context;

use crate::control::protocol::{Request, Response, read_frame, send_message};
use crate::foundation::error::{FlightError, FlightResult};
use crate::stage::{Stage, Target};

const ACCEPT_POLL: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF: Duration = Duration::from_millis(200);
const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Listens for control connections and applies each request to a [`Stage`].
///
/// Every connection carries exactly one request and one response and is served on its own
/// thread, so slow clients never hold up each other or the render loop.
pub struct ControlServer {
    addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for ControlServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlServer")
            .field("addr", &self.addr)
            .finish_non_exhaustive()
    }
}

impl ControlServer {
    /// Bind `addr` and start accepting on a background thread.
    pub fn bind<A: ToSocketAddrs>(addr: A, stage: Arc<Stage>) -> FlightResult<Self> {
        let listener = TcpListener::bind(addr).context("binding control socket")?;
        listener
            .set_nonblocking(true)
            .context("setting control listener non-blocking")?;
        let addr = listener.local_addr().context("reading control address")?;
        let shutdown = Arc::new(AtomicBool::new(false));
        let worker = thread::Builder::new()
            .name("control-accept".to_string())
            .spawn({
                let shutdown = Arc::clone(&shutdown);
                move || accept_loop(listener, stage, shutdown)
            })
            .context("spawning control accept thread")?;
        tracing::info!(%addr, "control server listening");
        Ok(Self {
            addr,
            shutdown,
            worker: Some(worker),
        })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting and wait for the accept thread. In-flight connections finish on their own.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!("control accept thread panicked");
        }
    }
}

impl Drop for ControlServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn accept_loop(listener: TcpListener, stage: Arc<Stage>, shutdown: Arc<AtomicBool>) {
    while !shutdown.load(Ordering::Acquire) {
        match listener.accept() {
            Ok((conn, peer)) => {
                let stage = Arc::clone(&stage);
                let spawned = thread::Builder::new()
                    .name("control-conn".to_string())
                    .spawn(move || {
                        if let Err(err) = serve_connection(conn, &stage) {
                            tracing::warn!(%peer, error = %err, "control connection failed");
                        }
                    });
                if let Err(err) = spawned {
                    tracing::error!(%peer, error = %err, "could not spawn control handler");
                }
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
            Err(err) => {
                tracing::warn!(error = %err, "control accept error");
                thread::sleep(ACCEPT_BACKOFF);
            }
        }
    }
    tracing::debug!("control server stopped");
}

fn serve_connection(mut conn: TcpStream, stage: &Stage) -> FlightResult<()> {
    conn.set_nonblocking(false)?;
    conn.set_read_timeout(Some(IO_TIMEOUT))?;
    conn.set_write_timeout(Some(IO_TIMEOUT))?;

    let response = match read_frame(&mut conn)
        .and_then(|bytes| serde_json::from_slice::<Request>(&bytes).map_err(FlightError::from))
    {
        Ok(request) => dispatch(stage, request),
        Err(err) => {
            tracing::debug!(error = %err, "rejected control request");
            Response::failed(&err)
        }
    };
    send_message(&mut conn, &response)
}

/// Apply one request to `stage`. Failures become `failed` responses, never panics.
pub fn dispatch(stage: &Stage, request: Request) -> Response {
    let command = request.command();
    tracing::debug!(command, "control request");
    let outcome = match request {
        Request::ListEntities => stage.list_entities().map(|entities| {
            Response::ok(format!("{} entities", entities.len())).with_entities(entities)
        }),
        Request::AddEntity => stage
            .add_entity()
            .map(|name| Response::ok(format!("added {name}")).with_name(name)),
        Request::RemoveEntity { name } => stage
            .remove_entity(&name)
            .map(|()| Response::ok(format!("removed {name}"))),
        Request::SetRunning { name, running } => stage
            .set_running(Target::parse(&name), running)
            .map(|()| Response::ok(format!("{name} running = {running}"))),
        Request::SetEffectRangeVisible { name, visible } => stage
            .set_effect_range_visible(Target::parse(&name), visible)
            .map(|()| Response::ok(format!("{name} effect range visible = {visible}"))),
        Request::SetSpeed { name, speed } => stage
            .set_speed(&name, speed)
            .map(|v| Response::ok(format!("{name} speed = {v}")).with_value(v)),
        Request::SetEmissionRate { name, rate } => stage
            .set_emission_rate(Target::parse(&name), rate)
            .map(|v| Response::ok(format!("{name} emission rate = {v}")).with_value(v)),
        Request::ResetDistance { name } => stage
            .reset_distance(&name)
            .map(|()| Response::ok(format!("{name} distance reset"))),
        Request::RegeneratePath { checkpoints } => {
            let rebuilt = match checkpoints {
                Some(points) => stage.regenerate_path(&points),
                None => stage.randomize_path(),
            };
            rebuilt.map(|()| Response::ok("path regenerated"))
        }
        Request::UpdateEntity { name, speed, color } => stage
            .update_entity(&name, speed, color)
            .map(|v| Response::ok(format!("{name} updated")).with_value(v)),
    };
    outcome.unwrap_or_else(|err| {
        if err.is_recoverable() {
            tracing::debug!(command, error = %err, "control request refused");
        } else {
            tracing::warn!(command, error = %err, "control request failed");
        }
        Response::failed(&err)
    })
}

#[cfg(test)]
#[path = "../../tests/unit/control/server.rs"]
mod tests;
