// Docker container enumeration and stats via bollard

pub mod stats;

use bollard::Docker;
use bollard::models::{ContainerStatsResponse, ContainerSummary};
use bollard::query_parameters::{ListContainersOptions, StatsOptions};
use futures_util::StreamExt;
use std::collections::HashMap;
use std::future::Future;
use tracing::info;

/// Seconds bollard waits on the daemon socket before giving up on a request.
const DOCKER_CLIENT_TIMEOUT_SECS: u64 = 120;

#[cfg(windows)]
pub const DEFAULT_SOCKET: &str = "//./pipe/docker_engine";
#[cfg(not(windows))]
pub const DEFAULT_SOCKET: &str = "/var/run/docker.sock";

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("docker api: {0}")]
    Docker(#[from] bollard::errors::Error),
    #[error("no stats returned for container {id}")]
    EmptyStats { id: String },
}

/// What the collector needs from a container runtime.
pub trait ContainerRuntime: Send + Sync + 'static {
    /// Running containers, in the order the runtime reports them.
    fn list_active_containers(
        &self,
    ) -> impl Future<Output = Result<Vec<ContainerSummary>, RuntimeError>> + Send;

    /// One non-streaming stats sample for a container.
    fn container_stats(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<ContainerStatsResponse, RuntimeError>> + Send;
}

pub struct DockerRepo {
    docker: Docker,
}

impl DockerRepo {
    /// Connect over a Unix socket or Windows named pipe. `None` selects the
    /// platform default.
    pub fn connect(socket: Option<&str>) -> anyhow::Result<Self> {
        let path = socket.unwrap_or(DEFAULT_SOCKET);
        let docker = Docker::connect_with_socket(
            path,
            DOCKER_CLIENT_TIMEOUT_SECS,
            bollard::API_DEFAULT_VERSION,
        )?;
        info!(socket = %path, "Connecting to Docker");
        Ok(Self { docker })
    }
}

impl ContainerRuntime for DockerRepo {
    async fn list_active_containers(&self) -> Result<Vec<ContainerSummary>, RuntimeError> {
        let mut filters = HashMap::new();
        filters.insert("status".to_string(), vec!["running".to_string()]);

        let options = ListContainersOptions {
            all: false,
            filters: Some(filters),
            ..Default::default()
        };
        Ok(self.docker.list_containers(Some(options)).await?)
    }

    async fn container_stats(&self, id: &str) -> Result<ContainerStatsResponse, RuntimeError> {
        let options = StatsOptions {
            stream: false,
            ..Default::default()
        };
        let mut stream = self.docker.stats(id, Some(options));
        match stream.next().await {
            Some(result) => Ok(result?),
            None => Err(RuntimeError::EmptyStats { id: id.to_string() }),
        }
    }
}
