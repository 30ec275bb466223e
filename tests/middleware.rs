mod common;

use common::{read, start_server, start_server_with, test_config};
use serde_json::json;
use solana_sdk::signature::{Keypair, Signer};
use std::sync::atomic::Ordering;
use std::time::Duration;
use wallet_server::blockchain::wallet::secret_to_hex;
use wallet_server::store::{UserStore, WalletStore};

const SOL: u64 = 1_000_000_000;

#[tokio::test]
async fn test_oversized_body_is_rejected_with_json() {
    let mut config = test_config();
    config.listener.max_body_size = 1024;
    let server = start_server_with(config, UserStore::new(None), WalletStore::new(None)).await;

    let (status, body) = server
        .post(
            "/auth/signup",
            None,
            json!({ "username": "a".repeat(4096), "password": "password1" }),
        )
        .await;
    assert_eq!(status, 413);
    assert!(body["error"].is_string());
    assert!(server.users.is_empty());

    // Small bodies still go through.
    server.register_and_login("alice", "password1").await;

    server.stop().await;
}

#[tokio::test]
async fn test_timed_out_transfer_is_still_recorded() {
    let mut config = test_config();
    config.listener.request_timeout_secs = 1;
    let server = start_server_with(config, UserStore::new(None), WalletStore::new(None)).await;
    let alice = server.register_and_login("alice", "password1").await;

    let sender = Keypair::new();
    let recipient = Keypair::new().pubkey().to_string();
    for address in [sender.pubkey().to_string(), recipient.clone()] {
        let (status, _) = server
            .post("/auth/wallets", Some(&alice), json!({ "publicKey": address }))
            .await;
        assert_eq!(status, 201);
    }
    server.gateway.fund(&sender.pubkey(), 2 * SOL);
    let (status, _) = server
        .post(
            "/auth/deposit",
            Some(&alice),
            json!({ "walletAddress": sender.pubkey().to_string(), "amount": 2 }),
        )
        .await;
    assert_eq!(status, 200);

    server.gateway.transfer_delay_ms.store(2000, Ordering::SeqCst);
    let (status, body) = server
        .post(
            "/api/send-transaction",
            Some(&alice),
            json!({
                "senderPrivateKey": secret_to_hex(&sender),
                "recipientAddress": recipient,
                "amount": 1,
            }),
        )
        .await;
    assert_eq!(status, 408);
    assert_eq!(body["error"], "Request timed out");

    // The chain accepted the transfer; the ledger catches up once it reports back.
    assert_eq!(server.gateway.balance(&sender.pubkey()), SOL);
    tokio::time::sleep(Duration::from_millis(2500)).await;
    let transfers = server.wallets.transfers();
    assert_eq!(transfers.len(), 1);
    assert!(transfers[0].signature.is_some());
    assert_eq!(server.wallets.get(&recipient).unwrap().balance_lamports, SOL);

    server.stop().await;
}

#[tokio::test]
async fn test_request_id_on_error_responses() {
    let server = start_server().await;

    let res = server
        .client
        .get(server.url("/auth/dashboard"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
    assert!(res.headers().contains_key("x-request-id"));

    let res = server
        .client
        .get(server.url("/no/such/route"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    assert!(res.headers().contains_key("x-request-id"));

    let res = server
        .client
        .post(server.url("/auth/login"))
        .header("x-request-id", "trace-me-123")
        .json(&json!({ "username": "nobody", "password": "password1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-me-123");
    let (status, body) = read(res).await;
    assert_eq!(status, 401);
    assert!(body["error"].is_string());

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_json_gets_error_body() {
    let server = start_server().await;

    let res = server
        .client
        .post(server.url("/auth/signup"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    let (status, body) = read(res).await;
    assert_eq!(status, 400);
    assert!(body["error"].is_string());

    server.stop().await;
}
