//! The shared store client.
//!
//! One handle per process, built from [`StoreConfig`] at startup and cloned
//! into every request handler. The underlying client multiplexes all
//! in-flight requests over its own connection; this layer holds no locks
//! and performs no retries of its own beyond the client's reconnect policy.

use fred::prelude::*;
use fred::types::{ClusterHash, CustomCommand};
use tracing::{debug, error, info};

use redbridge_common::{BatchMode, Command, CommandResult, Error, ReplyValue, Result};

use crate::config::{parse_sentinel_list, StoreConfig};
use crate::value::from_redis_value;

/// Shared handle to the backing store.
///
/// Cheap to clone; all clones share one connection task.
#[derive(Clone)]
pub struct StoreClient {
    inner: RedisClient,
}

impl StoreClient {
    /// Build and connect a client from configuration.
    ///
    /// Fails fast on a malformed sentinel list or an unreachable store so
    /// the process never serves traffic with a broken topology.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let server = if config.uses_sentinel() {
            let raw = config.sentinels.as_deref().unwrap_or_default();
            let hosts = parse_sentinel_list(raw)?;
            info!(
                sentinels = hosts.len(),
                master = %config.sentinel_master,
                "connecting through sentinel"
            );
            ServerConfig::Sentinel {
                hosts,
                service_name: config.sentinel_master.clone(),
                username: None,
                password: config.sentinel_password.clone(),
            }
        } else {
            info!(host = %config.host, port = config.port, "connecting to store");
            ServerConfig::new_centralized(config.host.clone(), config.port)
        };

        let redis_config = RedisConfig {
            server,
            database: Some(config.database),
            password: config.password.clone(),
            fail_fast: true,
            ..RedisConfig::default()
        };

        let mut builder = Builder::from_config(redis_config);
        builder.with_performance_config(|perf| {
            perf.auto_pipeline = config.auto_pipelining;
        });
        builder.set_policy(ReconnectPolicy::new_exponential(0, 100, 30_000, 2));

        let client = builder
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;
        client
            .init()
            .await
            .map_err(|e| Error::Store(e.to_string()))?;

        Ok(Self { inner: client })
    }

    /// Wrap an existing client. Test seam; the running service only ever
    /// constructs through [`StoreClient::connect`].
    #[must_use]
    pub fn from_client(inner: RedisClient) -> Self {
        Self { inner }
    }

    /// Execute a single generic command and convert its reply.
    pub async fn run(&self, command: &Command) -> Result<ReplyValue> {
        debug!(command = %command.name, args = command.args.len(), "dispatching command");
        let reply: RedisValue = self
            .inner
            .custom(custom(&command.name), to_args(&command.args))
            .await
            .map_err(|e| Error::Store(e.to_string()))?;
        Ok(from_redis_value(reply))
    }

    /// Execute an ordered batch as one round trip.
    ///
    /// Results come back in submission order, one per command. In pipeline
    /// mode a failed command surfaces in its own slot without disturbing
    /// its siblings; in transaction mode the store's atomicity applies and
    /// any failure fails the whole batch.
    pub async fn run_batch(
        &self,
        commands: &[Command],
        mode: BatchMode,
    ) -> Result<Vec<CommandResult>> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }

        match mode {
            BatchMode::Pipeline => {
                let pipeline = self.inner.pipeline();
                for command in commands {
                    let _: () = pipeline
                        .custom(custom(&command.name), to_args(&command.args))
                        .await
                        .map_err(|e| batch_failure(mode, &e))?;
                }
                let replies = pipeline.try_all::<RedisValue>().await;
                Ok(replies
                    .into_iter()
                    .map(|reply| match reply {
                        Ok(value) => CommandResult::ok(from_redis_value(value)),
                        Err(e) => CommandResult::err(e.to_string()),
                    })
                    .collect())
            }
            BatchMode::Transaction => {
                let trx = self.inner.multi();
                for command in commands {
                    let _: () = trx
                        .custom(custom(&command.name), to_args(&command.args))
                        .await
                        .map_err(|e| batch_failure(mode, &e))?;
                }
                let replies: Vec<RedisValue> =
                    trx.exec(true).await.map_err(|e| batch_failure(mode, &e))?;
                Ok(replies
                    .into_iter()
                    .map(|value| CommandResult::ok(from_redis_value(value)))
                    .collect())
            }
        }
    }

    /// Close the connection. Called once on shutdown.
    pub async fn disconnect(&self) {
        if let Err(e) = self.inner.quit().await {
            error!("error closing store connection: {}", e);
        }
    }
}

fn custom(name: &str) -> CustomCommand {
    CustomCommand::new(name.to_string(), ClusterHash::FirstKey, false)
}

fn to_args(args: &[String]) -> Vec<RedisValue> {
    args.iter()
        .map(|arg| RedisValue::String(arg.as_str().into()))
        .collect()
}

fn batch_failure(mode: BatchMode, cause: &RedisError) -> Error {
    error!(mode = mode.as_str(), "batch execution failed: {}", cause);
    match mode {
        BatchMode::Pipeline => Error::PipelineFailed,
        BatchMode::Transaction => Error::TransactionFailed,
    }
}
