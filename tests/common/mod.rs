//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use wallet_server::blockchain::{BlockchainError, BlockchainResult, ChainGateway};
use wallet_server::store::{UserStore, WalletStore};
use wallet_server::{HttpServer, ServerConfig, Shutdown};

/// In-memory chain: balances per address, instant confirmation.
#[derive(Default)]
pub struct MockGateway {
    pub balances: DashMap<Pubkey, u64>,
    pub offline: AtomicBool,
    /// Delay after a transfer lands, before it is reported back.
    pub transfer_delay_ms: AtomicU64,
    submitted: AtomicU64,
}

impl MockGateway {
    pub fn fund(&self, address: &Pubkey, lamports: u64) {
        *self.balances.entry(*address).or_insert(0) += lamports;
    }

    pub fn balance(&self, address: &Pubkey) -> u64 {
        self.balances.get(address).map(|b| *b).unwrap_or(0)
    }

    fn next_signature(&self) -> Signature {
        let n = self.submitted.fetch_add(1, Ordering::SeqCst) + 1;
        let mut bytes = [0u8; 64];
        bytes[..8].copy_from_slice(&n.to_le_bytes());
        Signature::from(bytes)
    }

    fn check_online(&self) -> BlockchainResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(BlockchainError::Rpc("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainGateway for MockGateway {
    async fn get_balance(&self, address: &Pubkey) -> BlockchainResult<u64> {
        self.check_online()?;
        Ok(self.balance(address))
    }

    async fn transfer(
        &self,
        sender: &Keypair,
        recipient: &Pubkey,
        lamports: u64,
    ) -> BlockchainResult<Signature> {
        self.check_online()?;
        let from = sender.pubkey();
        let available = self.balance(&from);
        if available < lamports {
            return Err(BlockchainError::TransactionFailed(
                "insufficient lamports".into(),
            ));
        }
        self.balances.insert(from, available - lamports);
        self.fund(recipient, lamports);
        let signature = self.next_signature();

        let delay = self.transfer_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        Ok(signature)
    }

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> BlockchainResult<Signature> {
        self.check_online()?;
        self.fund(address, lamports);
        Ok(self.next_signature())
    }

    async fn is_healthy(&self) -> bool {
        !self.offline.load(Ordering::SeqCst)
    }
}

pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.auth.bcrypt_cost = 4;
    config.rate_limit.enabled = false;
    config.storage.flush_interval_secs = 0;
    config
}

/// A running server plus what tests need to poke at it.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub gateway: Arc<MockGateway>,
    pub users: UserStore,
    pub wallets: WalletStore,
    pub shutdown: Shutdown,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (u16, Value) {
        let mut req = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        read(req.send().await.unwrap()).await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (u16, Value) {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        read(req.send().await.unwrap()).await
    }

    pub async fn patch(&self, path: &str, token: Option<&str>, body: Value) -> (u16, Value) {
        let mut req = self.client.patch(self.url(path)).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        read(req.send().await.unwrap()).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> (u16, Value) {
        let mut req = self.client.delete(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        read(req.send().await.unwrap()).await
    }

    /// Sign up and log in; returns the session token.
    pub async fn register_and_login(&self, username: &str, password: &str) -> String {
        let (status, _) = self
            .post(
                "/auth/signup",
                None,
                json!({ "username": username, "password": password }),
            )
            .await;
        assert_eq!(status, 201, "signup of {} failed", username);

        let (status, body) = self
            .post(
                "/auth/login",
                None,
                json!({ "username": username, "password": password }),
            )
            .await;
        assert_eq!(status, 200, "login of {} failed", username);
        body["token"].as_str().unwrap().to_string()
    }

    /// Stop the server and wait for it to drain.
    pub async fn stop(self) {
        self.shutdown.trigger();
        self.handle.await.unwrap();
    }
}

pub async fn read(res: reqwest::Response) -> (u16, Value) {
    let status = res.status().as_u16();
    let text = res.text().await.unwrap();
    let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
    (status, body)
}

pub async fn start_server() -> TestServer {
    start_server_with(test_config(), UserStore::new(None), WalletStore::new(None)).await
}

pub async fn start_server_with(
    config: ServerConfig,
    users: UserStore,
    wallets: WalletStore,
) -> TestServer {
    let gateway = Arc::new(MockGateway::default());
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, gateway.clone(), users.clone(), wallets.clone());
    let server_shutdown = shutdown.clone();
    let handle = tokio::spawn(async move {
        server.run(listener, &server_shutdown).await.unwrap();
    });

    TestServer {
        addr,
        client: reqwest::Client::builder().no_proxy().build().unwrap(),
        gateway,
        users,
        wallets,
        shutdown,
        handle,
    }
}
