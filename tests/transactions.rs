mod common;

use common::{start_server, TestServer};
use serde_json::json;
use solana_sdk::signature::{Keypair, Signer};
use std::sync::atomic::Ordering;
use wallet_server::blockchain::wallet::secret_to_hex;

const SOL: u64 = 1_000_000_000;

async fn register_wallet(server: &TestServer, token: &str) -> String {
    let address = Keypair::new().pubkey().to_string();
    let (status, body) = server
        .post("/auth/wallets", Some(token), json!({ "publicKey": address }))
        .await;
    assert_eq!(status, 201);
    assert_eq!(body["address"], address);
    address
}

async fn deposit(server: &TestServer, token: &str, address: &str, amount: f64) {
    let (status, _) = server
        .post(
            "/auth/deposit",
            Some(token),
            json!({ "walletAddress": address, "amount": amount }),
        )
        .await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_register_and_list_wallets() {
    let server = start_server().await;
    let alice = server.register_and_login("alice", "password1").await;
    let bob = server.register_and_login("bob", "password1").await;

    let address = register_wallet(&server, &alice).await;

    // Same owner again is fine; another owner is refused.
    let (status, _) = server
        .post("/auth/wallets", Some(&alice), json!({ "publicKey": address }))
        .await;
    assert_eq!(status, 201);
    let (status, _) = server
        .post("/auth/wallets", Some(&bob), json!({ "publicKey": address }))
        .await;
    assert_eq!(status, 409);

    let (status, _) = server
        .post("/auth/wallets", Some(&alice), json!({ "publicKey": "not-base58!" }))
        .await;
    assert_eq!(status, 400);

    let (_, body) = server.get("/auth/wallets", Some(&alice)).await;
    assert_eq!(body["wallets"].as_array().unwrap().len(), 1);
    let (_, body) = server.get("/auth/wallets", Some(&bob)).await;
    assert!(body["wallets"].as_array().unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_ledger_transfer() {
    let server = start_server().await;
    let alice = server.register_and_login("alice", "password1").await;
    let bob = server.register_and_login("bob", "password1").await;
    let from = register_wallet(&server, &alice).await;
    let to = register_wallet(&server, &bob).await;

    deposit(&server, &alice, &from, 2.0).await;

    let (status, body) = server
        .post(
            "/auth/send-transaction",
            Some(&alice),
            json!({
                "senderAddress": from,
                "recipientAddress": to,
                "amount": 0.5,
                "signature": "sig-1",
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Transaction completed successfully");
    assert_eq!(body["transaction"]["amountLamports"], SOL / 2);
    assert_eq!(body["transaction"]["signature"], "sig-1");

    assert_eq!(server.wallets.get(&from).unwrap().balance_lamports, 3 * SOL / 2);
    assert_eq!(server.wallets.get(&to).unwrap().balance_lamports, SOL / 2);

    // Newest first: send, then the deposit.
    let (status, body) = server
        .get(&format!("/auth/wallet/{}/transactions", from), Some(&alice))
        .await;
    assert_eq!(status, 200);
    let kinds: Vec<_> = body["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds, vec!["send", "deposit"]);

    let (_, body) = server
        .get(&format!("/auth/wallet/{}/transactions", to), Some(&bob))
        .await;
    assert_eq!(body["transactions"][0]["type"], "receive");
    assert_eq!(body["transactions"][0]["counterpartyAddress"], from);

    server.stop().await;
}

#[tokio::test]
async fn test_ledger_transfer_errors() {
    let server = start_server().await;
    let alice = server.register_and_login("alice", "password1").await;
    let bob = server.register_and_login("bob", "password1").await;
    let from = register_wallet(&server, &alice).await;
    let to = register_wallet(&server, &bob).await;
    let unknown = Keypair::new().pubkey().to_string();
    deposit(&server, &alice, &from, 1.0).await;

    let transfer = |sender: &str, recipient: &str, amount: f64| {
        json!({ "senderAddress": sender, "recipientAddress": recipient, "amount": amount })
    };

    let (status, _) = server
        .post("/auth/send-transaction", Some(&alice), transfer(&unknown, &to, 0.1))
        .await;
    assert_eq!(status, 404);

    let (status, _) = server
        .post("/auth/send-transaction", Some(&alice), transfer(&from, &unknown, 0.1))
        .await;
    assert_eq!(status, 404);

    // Bob cannot spend from Alice's wallet.
    let (status, _) = server
        .post("/auth/send-transaction", Some(&bob), transfer(&from, &to, 0.1))
        .await;
    assert_eq!(status, 403);

    let (status, body) = server
        .post("/auth/send-transaction", Some(&alice), transfer(&from, &to, 5.0))
        .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("Insufficient balance"));

    let (status, _) = server
        .post("/auth/send-transaction", Some(&alice), transfer(&from, &to, 0.0))
        .await;
    assert_eq!(status, 400);

    let (status, _) = server
        .post("/auth/send-transaction", None, transfer(&from, &to, 0.1))
        .await;
    assert_eq!(status, 401);

    // Nothing moved.
    assert_eq!(server.wallets.get(&from).unwrap().balance_lamports, SOL);
    assert_eq!(server.wallets.get(&to).unwrap().balance_lamports, 0);

    let (status, _) = server
        .get(&format!("/auth/wallet/{}/transactions", unknown), Some(&alice))
        .await;
    assert_eq!(status, 404);

    server.stop().await;
}

#[tokio::test]
async fn test_deposit_requires_ownership() {
    let server = start_server().await;
    let alice = server.register_and_login("alice", "password1").await;
    let bob = server.register_and_login("bob", "password1").await;
    let address = register_wallet(&server, &alice).await;

    let (status, _) = server
        .post(
            "/auth/deposit",
            Some(&bob),
            json!({ "walletAddress": address, "amount": 1 }),
        )
        .await;
    assert_eq!(status, 403);

    let (status, body) = server
        .post(
            "/auth/deposit",
            Some(&alice),
            json!({ "walletAddress": address, "amount": "1.5" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["wallet"]["balanceLamports"], 3 * SOL / 2);

    server.stop().await;
}

#[tokio::test]
async fn test_transfer_list_and_delete() {
    let server = start_server().await;
    let alice = server.register_and_login("alice", "password1").await;
    let bob = server.register_and_login("bob", "password1").await;
    let carol = server.register_and_login("carol", "password1").await;
    let from = register_wallet(&server, &alice).await;
    let to = register_wallet(&server, &bob).await;
    deposit(&server, &alice, &from, 1.0).await;

    for amount in [0.1, 0.2] {
        let (status, _) = server
            .post(
                "/auth/send-transaction",
                Some(&alice),
                json!({ "senderAddress": from, "recipientAddress": to, "amount": amount }),
            )
            .await;
        assert_eq!(status, 200);
    }

    let (_, body) = server.get("/auth/transactions", Some(&bob)).await;
    let list = body["transactions"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["amountLamports"], SOL / 5);
    let id = list[0]["id"].as_str().unwrap().to_string();

    let (_, body) = server.get("/auth/transactions", Some(&carol)).await;
    assert!(body["transactions"].as_array().unwrap().is_empty());

    // Carol is not a party to the transfer.
    let (status, _) = server
        .delete(&format!("/auth/transaction/{}", id), Some(&carol))
        .await;
    assert_eq!(status, 404);

    let (status, _) = server
        .delete(&format!("/auth/transaction/{}", id), Some(&bob))
        .await;
    assert_eq!(status, 200);
    let (status, _) = server
        .delete(&format!("/auth/transaction/{}", id), Some(&bob))
        .await;
    assert_eq!(status, 404);
    let (status, _) = server
        .delete("/auth/transaction/not-a-uuid", Some(&bob))
        .await;
    assert_eq!(status, 404);

    let (_, body) = server.get("/auth/transactions", Some(&alice)).await;
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);

    // Wallet logs keep both sends.
    assert_eq!(server.wallets.history(&from).unwrap().len(), 3);

    server.stop().await;
}

#[tokio::test]
async fn test_check_balance() {
    let server = start_server().await;
    let address = Keypair::new().pubkey();
    server.gateway.fund(&address, 2_500_000_000);

    let (status, body) = server
        .post(
            "/auth/check-balance",
            None,
            json!({ "walletAddress": address.to_string() }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["lamports"], 2_500_000_000u64);
    assert_eq!(body["balance"], 2.5);

    let (status, _) = server
        .post("/auth/check-balance", None, json!({ "walletAddress": "xyz" }))
        .await;
    assert_eq!(status, 400);

    server.gateway.offline.store(true, Ordering::SeqCst);
    let (status, _) = server
        .post(
            "/auth/check-balance",
            None,
            json!({ "walletAddress": address.to_string() }),
        )
        .await;
    assert_eq!(status, 502);
    let (_, body) = server.get("/health", None).await;
    assert_eq!(body["chain_reachable"], false);

    server.stop().await;
}

#[tokio::test]
async fn test_on_chain_transfer_is_mirrored_in_ledger() {
    let server = start_server().await;
    let alice = server.register_and_login("alice", "password1").await;
    let bob = server.register_and_login("bob", "password1").await;

    let sender = Keypair::new();
    let (status, _) = server
        .post(
            "/auth/wallets",
            Some(&alice),
            json!({ "publicKey": sender.pubkey().to_string() }),
        )
        .await;
    assert_eq!(status, 201);
    let recipient = register_wallet(&server, &bob).await;

    server.gateway.fund(&sender.pubkey(), 3 * SOL);
    deposit(&server, &alice, &sender.pubkey().to_string(), 3.0).await;

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
    assert_eq!(status, 200);
    assert_eq!(body["lamports"], SOL);
    assert!(body["transferId"].is_string());
    let signature = body["signature"].as_str().unwrap().to_string();

    assert_eq!(server.gateway.balance(&sender.pubkey()), 2 * SOL);
    let entry = &server.wallets.history(&recipient).unwrap()[0];
    assert_eq!(entry.signature.as_deref(), Some(signature.as_str()));
    assert_eq!(server.wallets.get(&recipient).unwrap().balance_lamports, SOL);

    server.stop().await;
}

#[tokio::test]
async fn test_on_chain_transfer_errors() {
    let server = start_server().await;
    let alice = server.register_and_login("alice", "password1").await;
    let sender = Keypair::new();
    let recipient = Keypair::new().pubkey().to_string();

    // JSON byte array form, as browser clients send it.
    let secret_array = serde_json::to_value(sender.to_bytes().to_vec()).unwrap();
    let (status, body) = server
        .post(
            "/api/send-transaction",
            Some(&alice),
            json!({ "senderPrivateKey": secret_array, "recipientAddress": recipient, "amount": 1 }),
        )
        .await;
    assert_eq!(status, 502);
    assert!(body["error"].as_str().unwrap().contains("Transaction failed"));

    let (status, _) = server
        .post(
            "/api/send-transaction",
            Some(&alice),
            json!({ "senderPrivateKey": "bogus", "recipientAddress": recipient, "amount": 1 }),
        )
        .await;
    assert_eq!(status, 400);

    let (status, body) = server
        .post(
            "/api/send-transaction",
            Some(&alice),
            json!({ "recipientAddress": recipient, "amount": 1 }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "senderPrivateKey is required");

    // Unregistered wallets move on chain but leave the ledger alone.
    server.gateway.fund(&sender.pubkey(), SOL);
    let (status, body) = server
        .post(
            "/api/send-transaction",
            Some(&alice),
            json!({ "senderPrivateKey": secret_to_hex(&sender), "recipientAddress": recipient, "amount": 0.25 }),
        )
        .await;
    assert_eq!(status, 200);
    assert!(body["transferId"].is_null());
    assert_eq!(server.wallets.wallet_count(), 0);

    server.stop().await;
}

#[tokio::test]
async fn test_airdrop() {
    let server = start_server().await;
    let alice = server.register_and_login("alice", "password1").await;
    let address = Keypair::new().pubkey();

    let (status, body) = server
        .post(
            "/api/airdrop",
            Some(&alice),
            json!({ "walletAddress": address.to_string(), "amount": 2 }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["lamports"], 2 * SOL);
    assert_eq!(server.gateway.balance(&address), 2 * SOL);

    server.stop().await;
}
