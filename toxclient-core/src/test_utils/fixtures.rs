//! Test fixtures: clients wired to an inspectable local engine

use std::sync::Arc;

use crate::client::Client;
use crate::config::ClientConfig;
use crate::engine::{
    EngineError, EngineOptions, EngineRequest, EngineResponse, LocalEngine, NetworkEngine,
};
use crate::identity::{Address, SecretKey};

/// A client together with the engine behind it, so tests can inject
/// notifications and mutate engine state directly
pub fn client_with_engine(config: ClientConfig) -> (Client, Arc<LocalEngine>) {
    let options = config.engine_options().expect("valid engine options");
    let engine = Arc::new(LocalEngine::new(&options));
    let shared = engine.clone();
    let client = Client::with_factory(config, move |_: &EngineOptions| {
        Ok::<_, EngineError>(shared.clone() as Arc<dyn NetworkEngine>)
    })
    .expect("client creation");
    (client, engine)
}

/// Client over a local engine that has no secret key
pub fn public_only_client() -> Client {
    let factory = |options: &EngineOptions| -> Result<Arc<dyn NetworkEngine>, EngineError> {
        let donor = LocalEngine::new(options);
        let public_key = match donor.invoke(EngineRequest::GetKeys)? {
            EngineResponse::Keys(keys) => *keys.public_key(),
            other => return Err(EngineError::Failure(format!("unexpected {}", other.variant()))),
        };
        Ok(Arc::new(LocalEngine::public_only(options, public_key)))
    };
    Client::with_factory(ClientConfig::default(), factory).expect("client creation")
}

/// Deterministic address of another peer
pub fn peer_address(seed: u8) -> Address {
    let engine = LocalEngine::with_secret_key(
        &EngineOptions::default(),
        SecretKey::from_bytes([seed; 32]),
    );
    match engine.invoke(EngineRequest::GetAddress) {
        Ok(EngineResponse::Address(address)) => address,
        other => panic!("unexpected address response: {:?}", other),
    }
}
