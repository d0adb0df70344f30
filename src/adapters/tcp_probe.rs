use crate::domain::model::Endpoint;
use crate::domain::ports::Probe;
use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Opens and immediately drops a TCP connection. Name resolution failures count as
/// "not ready", since container DNS entries often appear after the container starts.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    connect_timeout: Duration,
}

impl TcpProbe {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn probe(&self, endpoint: &Endpoint) -> io::Result<()> {
        let connect = TcpStream::connect((endpoint.host.as_str(), endpoint.port));

        match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!(
                    "connection to {} timed out after {:?}",
                    endpoint, self.connect_timeout
                ),
            )),
        }
    }
}
