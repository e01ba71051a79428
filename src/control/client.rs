use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use anyhow::Context;

use crate::control::protocol::{Request, Response, recv_message, send_message};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{FlightError, FlightResult};
use crate::motion::state::EntityInfo;

/// Client for a [`crate::control::ControlServer`]; opens one connection per call.
#[derive(Clone, Debug)]
pub struct ControlClient {
    addr: SocketAddr,
    timeout: Duration,
}

impl ControlClient {
    /// Client for `addr` with a 5 s connect and I/O timeout.
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            timeout: Duration::from_secs(5),
        }
    }

    /// Resolve `addr` (e.g. `"127.0.0.1:37123"`) and build a client for its first address.
    pub fn resolve<A: ToSocketAddrs>(addr: A) -> FlightResult<Self> {
        let addr = addr
            .to_socket_addrs()
            .context("resolving control address")?
            .next()
            .ok_or_else(|| FlightError::protocol("control address resolved to nothing"))?;
        Ok(Self::new(addr))
    }

    /// Replace the connect and I/O timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send one request and return the raw response, successful or not.
    pub fn call(&self, request: &Request) -> FlightResult<Response> {
        let mut conn = TcpStream::connect_timeout(&self.addr, self.timeout)
            .with_context(|| format!("connecting to control server at {}", self.addr))?;
        conn.set_read_timeout(Some(self.timeout))?;
        conn.set_write_timeout(Some(self.timeout))?;
        send_message(&mut conn, request)?;
        recv_message(&mut conn)
    }

    fn call_ok(&self, request: &Request) -> FlightResult<Response> {
        self.call(request)?.into_result()
    }

    pub fn list_entities(&self) -> FlightResult<Vec<EntityInfo>> {
        Ok(self
            .call_ok(&Request::ListEntities)?
            .entities
            .unwrap_or_default())
    }

    pub fn add_entity(&self) -> FlightResult<String> {
        self.call_ok(&Request::AddEntity)?
            .name
            .ok_or_else(|| FlightError::protocol("add_entity response carried no name"))
    }

    pub fn remove_entity(&self, name: &str) -> FlightResult<()> {
        self.call_ok(&Request::RemoveEntity { name: name.into() })
            .map(drop)
    }

    pub fn set_running(&self, name: &str, running: bool) -> FlightResult<()> {
        self.call_ok(&Request::SetRunning {
            name: name.into(),
            running,
        })
        .map(drop)
    }

    pub fn set_effect_range_visible(&self, name: &str, visible: bool) -> FlightResult<()> {
        self.call_ok(&Request::SetEffectRangeVisible {
            name: name.into(),
            visible,
        })
        .map(drop)
    }

    /// Returns the speed the server stored after clamping.
    pub fn set_speed(&self, name: &str, speed: f64) -> FlightResult<f64> {
        let resp = self.call_ok(&Request::SetSpeed {
            name: name.into(),
            speed,
        })?;
        Ok(resp.value.unwrap_or(speed))
    }

    /// Returns the rate the server stored after clamping.
    pub fn set_emission_rate(&self, name: &str, rate: f64) -> FlightResult<f64> {
        let resp = self.call_ok(&Request::SetEmissionRate {
            name: name.into(),
            rate,
        })?;
        Ok(resp.value.unwrap_or(rate))
    }

    pub fn reset_distance(&self, name: &str) -> FlightResult<()> {
        self.call_ok(&Request::ResetDistance { name: name.into() })
            .map(drop)
    }

    /// `None` asks the server for a random path.
    pub fn regenerate_path(&self, checkpoints: Option<Vec<[f64; 2]>>) -> FlightResult<()> {
        self.call_ok(&Request::RegeneratePath { checkpoints })
            .map(drop)
    }

    pub fn update_entity(&self, name: &str, speed: f64, color: Rgba8) -> FlightResult<f64> {
        let resp = self.call_ok(&Request::UpdateEntity {
            name: name.into(),
            speed,
            color,
        })?;
        Ok(resp.value.unwrap_or(speed))
    }
}
