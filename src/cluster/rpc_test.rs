use std::time::Duration;

use serde_json::json;
use serde_json::Value;

use crate::rpc::parse_hex_quantity;
use crate::rpc::parse_response;
use crate::rpc::parse_tx_status;
use crate::rpc::parse_u64;
use crate::rpc::request_body;
use crate::wei_to_nano_avax;
use crate::Chain;
use crate::Error;
use crate::JsonRpcClient;
use crate::NodeApi;
use crate::RpcError;
use crate::TxStatus;
use crate::UserPass;

#[test]
fn test_request_body_envelope() {
    let body = request_body("avm.getBalance", json!({ "address": "X-custom1" }));

    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["id"], 1);
    assert_eq!(body["method"], "avm.getBalance");
    assert_eq!(body["params"]["address"], "X-custom1");
}

#[test]
fn test_parse_response_extracts_result() {
    let body = json!({ "jsonrpc": "2.0", "id": 1, "result": { "address": "P-custom1" } });

    let result: Value = parse_response("platform.importKey", body).unwrap();

    assert_eq!(result["address"], "P-custom1");
}

#[test]
fn test_parse_response_surfaces_server_error() {
    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": { "code": -32000, "message": "user already exists" }
    });

    let err = parse_response::<Value>("keystore.createUser", body).unwrap_err();

    match err {
        Error::Rpc(RpcError::Server { method, code, message }) => {
            assert_eq!(method, "keystore.createUser");
            assert_eq!(code, -32000);
            assert_eq!(message, "user already exists");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_parse_response_without_result_is_decode_error() {
    let err = parse_response::<Value>("info.getNodeID", json!({ "id": 1 })).unwrap_err();

    assert!(matches!(err, Error::Rpc(RpcError::Decode { .. })));
}

#[test]
fn test_parse_numbers() {
    assert_eq!(parse_u64("avm.getBalance", "300000000000000000").unwrap(), 300_000_000_000_000_000);
    assert!(parse_u64("avm.getBalance", "-1").is_err());

    let wei = parse_hex_quantity("eth_getBalance", "0x3b9aca00").unwrap();
    assert_eq!(wei, 1_000_000_000);
    assert_eq!(wei_to_nano_avax(wei), 1);
    assert!(parse_hex_quantity("eth_getBalance", "0xnope").is_err());
}

#[test]
fn test_parse_tx_status_shapes() {
    assert_eq!(
        parse_tx_status("platform.getTxStatus", &json!({ "status": "Committed" })).unwrap(),
        TxStatus::Committed
    );
    assert_eq!(
        parse_tx_status("avm.getTxStatus", &json!("Accepted")).unwrap(),
        TxStatus::Accepted
    );
    assert_eq!(
        parse_tx_status("avm.getTxStatus", &json!({ "status": "Weird" })).unwrap(),
        TxStatus::Unknown("Weird".to_string())
    );
    assert!(parse_tx_status("avm.getTxStatus", &json!({})).is_err());
}

#[tokio::test]
async fn test_c_chain_has_no_address_listing() {
    let client = JsonRpcClient::new("http://127.0.0.1:1", Duration::from_millis(50)).unwrap();
    let user = UserPass::new("u", "p");

    let err = client.list_addresses(Chain::C, &user).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Rpc(RpcError::Unsupported { chain: Chain::C, .. })
    ));
}

#[tokio::test]
async fn test_c_chain_txs_are_not_issued_through_avax_api() {
    let client = JsonRpcClient::new("http://127.0.0.1:1", Duration::from_millis(50)).unwrap();

    let err = client.issue_tx(Chain::C, &[0u8; 4]).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Rpc(RpcError::Unsupported {
            method: "issueTx",
            chain: Chain::C
        })
    ));
}

#[tokio::test]
async fn test_unreachable_node_is_transport_error() {
    let client = JsonRpcClient::new("http://127.0.0.1:1", Duration::from_millis(200)).unwrap();

    let err = client.get_node_id().await.unwrap_err();

    assert!(matches!(err, Error::Rpc(RpcError::Transport { .. })));
}
