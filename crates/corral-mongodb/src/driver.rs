//! Driver seam between the database handle and the MongoDB client
//!
//! [`Driver`] captures the capability set the handle consumes: asynchronous
//! connect/disconnect, a readable connection state, and get-or-register model
//! resolution. [`MongoDriver`] implements it over `mongodb::Client`; tests
//! inject their own implementation through `DatabaseOptions::driver`.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bson::{doc, Bson, Document as BsonDocument};
use corral_common::BoxError;
use mongodb::options::{ClientOptions, ServerApi, ServerApiVersion};
use mongodb::Client;
use parking_lot::RwLock;
use tracing::debug;

use crate::model::{Model, ModelRegistry, Schema};

/// Connection lifecycle states, mirroring the driver's ready flag
///
/// Discriminants match the conventional readyState encoding; any non-zero
/// state counts as ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connected = 1,
    Connecting = 2,
    Disconnecting = 3,
}

impl ConnectionState {
    /// True for any state other than `Disconnected`
    pub fn is_ready(self) -> bool {
        self != ConnectionState::Disconnected
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connected,
            2 => ConnectionState::Connecting,
            3 => ConnectionState::Disconnecting,
            _ => ConnectionState::Disconnected,
        }
    }
}

/// Capability set consumed by [`crate::MongoDatabase`]
///
/// Errors cross this seam as boxed driver errors; translation into
/// `DatabaseError` happens (only where the contract says so) on the handle
/// side.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Establishes the connection for the given URL and merged options
    async fn connect(&self, url: &str, options: &BsonDocument) -> Result<(), BoxError>;

    /// Tears the connection down
    async fn disconnect(&self) -> Result<(), BoxError>;

    /// Current connection state, read fresh on every call
    fn connection_state(&self) -> ConnectionState;

    /// Returns the model registered under `name`, registering it first when
    /// a schema is supplied
    fn register_or_get_model(&self, name: &str, schema: Option<Schema>) -> Result<Model, BoxError>;
}

/// Production [`Driver`] over the official MongoDB client
///
/// Holds at most one live client. The model registry is owned here, one
/// table per driver instance.
#[derive(Default)]
pub struct MongoDriver {
    client: RwLock<Option<Client>>,
    state: AtomicU8,
    registry: ModelRegistry,
}

impl MongoDriver {
    /// Creates a disconnected driver
    pub fn new() -> Self {
        Self::default()
    }

    /// A clone of the live client, if connected
    pub fn client(&self) -> Option<Client> {
        self.client.read().clone()
    }

    /// The default database named in the connection URL, if connected
    pub fn database(&self) -> Option<mongodb::Database> {
        self.client.read().as_ref().and_then(Client::default_database)
    }

    /// The registry backing model resolution
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    async fn build_client(url: &str, options: &BsonDocument) -> Result<Client, BoxError> {
        let mut client_options = ClientOptions::parse(url).await?;
        apply_connect_options(&mut client_options, options)?;

        // Pin the stable server API for compatibility
        let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
        client_options.server_api = Some(server_api);

        let client = Client::with_options(client_options)?;

        // The client connects lazily; ping so an unreachable server fails
        // the connect call instead of the first query
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database("admin"));
        database.run_command(doc! { "ping": 1 }).await?;

        Ok(client)
    }
}

#[async_trait]
impl Driver for MongoDriver {
    async fn connect(&self, url: &str, options: &BsonDocument) -> Result<(), BoxError> {
        self.set_state(ConnectionState::Connecting);
        match Self::build_client(url, options).await {
            Ok(client) => {
                *self.client.write() = Some(client);
                self.set_state(ConnectionState::Connected);
                Ok(())
            }
            Err(err) => {
                self.set_state(ConnectionState::Disconnected);
                Err(err)
            }
        }
    }

    async fn disconnect(&self) -> Result<(), BoxError> {
        let client = self.client.write().take();
        if let Some(client) = client {
            self.set_state(ConnectionState::Disconnecting);
            client.shutdown().await;
        }
        self.set_state(ConnectionState::Disconnected);
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn register_or_get_model(&self, name: &str, schema: Option<Schema>) -> Result<Model, BoxError> {
        self.registry
            .register_or_get(name, schema)
            .map_err(Into::into)
    }
}

/// Applies recognized pass-through options onto the parsed client options
///
/// The legacy reconnect trio (`autoReconnect`, `reconnectTries`,
/// `reconnectInterval`) is accepted for compatibility but not mapped; the
/// driver's pool reconnects on its own.
fn apply_connect_options(
    target: &mut ClientOptions,
    options: &BsonDocument,
) -> Result<(), BoxError> {
    for (key, value) in options {
        match key.as_str() {
            "appName" => {
                target.app_name = Some(bson_to_string(key, value)?);
            }
            "minPoolSize" => {
                target.min_pool_size = Some(bson_to_u32(key, value)?);
            }
            "maxPoolSize" => {
                target.max_pool_size = Some(bson_to_u32(key, value)?);
            }
            "connectTimeoutMS" => {
                target.connect_timeout = Some(bson_to_millis(key, value)?);
            }
            "serverSelectionTimeoutMS" => {
                target.server_selection_timeout = Some(bson_to_millis(key, value)?);
            }
            "heartbeatFrequencyMS" => {
                target.heartbeat_freq = Some(bson_to_millis(key, value)?);
            }
            "autoReconnect" | "reconnectTries" | "reconnectInterval" => {}
            other => {
                debug!(option = other, "ignoring unrecognized connect option");
            }
        }
    }
    Ok(())
}

fn bson_to_string(key: &str, value: &Bson) -> Result<String, BoxError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| format!("connect option \"{key}\" must be a string, got {value}").into())
}

fn bson_to_u32(key: &str, value: &Bson) -> Result<u32, BoxError> {
    let n = bson_to_i64(key, value)?;
    u32::try_from(n)
        .map_err(|_| format!("connect option \"{key}\" is out of range: {n}").into())
}

fn bson_to_millis(key: &str, value: &Bson) -> Result<Duration, BoxError> {
    let n = bson_to_i64(key, value)?;
    let millis = u64::try_from(n)
        .map_err(|_| -> BoxError { format!("connect option \"{key}\" is out of range: {n}").into() })?;
    Ok(Duration::from_millis(millis))
}

fn bson_to_i64(key: &str, value: &Bson) -> Result<i64, BoxError> {
    match value {
        Bson::Int32(v) => Ok(i64::from(*v)),
        Bson::Int64(v) => Ok(*v),
        Bson::Double(v) if v.fract() == 0.0 => Ok(*v as i64),
        _ => Err(format!("connect option \"{key}\" must be numeric, got {value}").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_readiness() {
        assert!(!ConnectionState::Disconnected.is_ready());
        assert!(ConnectionState::Connected.is_ready());
        assert!(ConnectionState::Connecting.is_ready());
        assert!(ConnectionState::Disconnecting.is_ready());
    }

    #[test]
    fn test_connection_state_roundtrip() {
        for state in [
            ConnectionState::Disconnected,
            ConnectionState::Connected,
            ConnectionState::Connecting,
            ConnectionState::Disconnecting,
        ] {
            assert_eq!(ConnectionState::from_u8(state as u8), state);
        }
        assert_eq!(ConnectionState::from_u8(42), ConnectionState::Disconnected);
    }

    #[test]
    fn test_new_driver_starts_disconnected() {
        let driver = MongoDriver::new();
        assert_eq!(driver.connection_state(), ConnectionState::Disconnected);
        assert!(driver.client().is_none());
    }

    #[tokio::test]
    async fn test_connect_with_malformed_url_fails_and_stays_disconnected() {
        let driver = MongoDriver::new();
        let result = driver.connect("definitely not a url", &doc! {}).await;
        assert!(result.is_err());
        assert_eq!(driver.connection_state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_disconnect_without_connect_is_a_noop() {
        let driver = MongoDriver::new();
        driver.disconnect().await.unwrap();
        assert_eq!(driver.connection_state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_apply_connect_options_numeric_coercion() {
        let mut target = ClientOptions::default();
        let options = doc! {
            "appName": "corral-test",
            "maxPoolSize": 20,
            "minPoolSize": 5i64,
            "connectTimeoutMS": 10_000,
            "serverSelectionTimeoutMS": 30_000.0,
        };
        apply_connect_options(&mut target, &options).unwrap();
        assert_eq!(target.app_name.as_deref(), Some("corral-test"));
        assert_eq!(target.max_pool_size, Some(20));
        assert_eq!(target.min_pool_size, Some(5));
        assert_eq!(target.connect_timeout, Some(Duration::from_secs(10)));
        assert_eq!(
            target.server_selection_timeout,
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_apply_connect_options_rejects_wrong_types() {
        let mut target = ClientOptions::default();
        let err = apply_connect_options(&mut target, &doc! { "maxPoolSize": "lots" }).unwrap_err();
        assert!(err.to_string().contains("maxPoolSize"));

        let err = apply_connect_options(&mut target, &doc! { "appName": 7 }).unwrap_err();
        assert!(err.to_string().contains("appName"));
    }

    #[test]
    fn test_apply_connect_options_accepts_reconnect_trio() {
        let mut target = ClientOptions::default();
        let options = doc! {
            "autoReconnect": true,
            "reconnectTries": 10,
            "reconnectInterval": 1000,
        };
        // Accepted for compatibility; nothing on ClientOptions to map them to
        apply_connect_options(&mut target, &options).unwrap();
    }
}
