//! JSON-RPC 2.0 client for a single node.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use serde_json::Value;
use tracing::trace;

use crate::constants::AVAX_SYMBOL;
use crate::constants::C_CHAIN_AVAX_PATH;
use crate::constants::C_CHAIN_RPC_PATH;
use crate::constants::INFO_PATH;
use crate::constants::KEYSTORE_PATH;
use crate::constants::P_CHAIN_PATH;
use crate::constants::X_CHAIN_PATH;
use crate::encoding::hex_encode_with_checksum;
use crate::utxo::decode_hex_utxos;
use crate::wei_to_nano_avax;
use crate::AddValidatorRequest;
use crate::Blockchain;
use crate::BlockchainStatus;
use crate::Chain;
use crate::CreateBlockchainRequest;
use crate::CreateSubnetRequest;
use crate::NodeApi;
use crate::Result;
use crate::RpcError;
use crate::SendRequest;
use crate::Subnet;
use crate::TxStatus;
use crate::UserPass;
use crate::Utxo;

/// Page size for `getUTXOs`
const UTXO_PAGE_LIMIT: u32 = 1024;

#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    uri: String,
    http: reqwest::Client,
}

impl JsonRpcClient {
    /// `uri` is the node base URI, e.g. `http://127.0.0.1:9650`.
    pub fn new(
        uri: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let uri = uri.into();
        let http = reqwest::Client::builder().timeout(timeout).build().map_err(|source| {
            RpcError::Transport {
                method: "client".to_string(),
                endpoint: uri.clone(),
                source,
            }
        })?;
        Ok(Self { uri, http })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    async fn call<R: DeserializeOwned>(
        &self,
        path: &str,
        method: &str,
        params: Value,
    ) -> Result<R> {
        let endpoint = format!("{}{}", self.uri, path);
        trace!(%endpoint, method, "rpc call");

        let transport = |source: reqwest::Error| RpcError::Transport {
            method: method.to_string(),
            endpoint: endpoint.clone(),
            source,
        };
        let body: Value = self
            .http
            .post(&endpoint)
            .json(&request_body(method, params))
            .send()
            .await
            .map_err(transport)?
            .json()
            .await
            .map_err(transport)?;

        parse_response(method, body)
    }
}

pub(crate) fn request_body(
    method: &str,
    params: Value,
) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params,
    })
}

pub(crate) fn parse_response<R: DeserializeOwned>(
    method: &str,
    mut body: Value,
) -> Result<R> {
    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        return Err(RpcError::Server {
            method: method.to_string(),
            code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }
        .into());
    }

    let result = body.get_mut("result").map(Value::take).ok_or_else(|| RpcError::Decode {
        method: method.to_string(),
        reason: "missing result".to_string(),
    })?;
    serde_json::from_value(result).map_err(|e| {
        RpcError::Decode {
            method: method.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Avalanche APIs render 64-bit numbers as decimal strings.
pub(crate) fn parse_u64(
    method: &str,
    value: &str,
) -> Result<u64> {
    value.parse().map_err(|_| {
        RpcError::Decode {
            method: method.to_string(),
            reason: format!("{value:?} is not an integer"),
        }
        .into()
    })
}

/// `0x`-prefixed hex quantity (EVM wei)
pub(crate) fn parse_hex_quantity(
    method: &str,
    value: &str,
) -> Result<u128> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    u128::from_str_radix(digits, 16).map_err(|_| {
        RpcError::Decode {
            method: method.to_string(),
            reason: format!("{value:?} is not a hex quantity"),
        }
        .into()
    })
}

/// `getTxStatus` returns `{"status": ..}` on current nodes and a bare string on old ones.
pub(crate) fn parse_tx_status(
    method: &str,
    result: &Value,
) -> Result<TxStatus> {
    let status = match result {
        Value::String(s) => s.as_str(),
        other => other.get("status").and_then(Value::as_str).ok_or_else(|| RpcError::Decode {
            method: method.to_string(),
            reason: "missing status".to_string(),
        })?,
    };
    Ok(TxStatus::parse(status))
}

fn chain_api(chain: Chain) -> (&'static str, &'static str) {
    match chain {
        Chain::X => (X_CHAIN_PATH, "avm"),
        Chain::P => (P_CHAIN_PATH, "platform"),
        Chain::C => (C_CHAIN_AVAX_PATH, "avax"),
    }
}

fn credentials(user: &UserPass) -> serde_json::Map<String, Value> {
    let mut params = serde_json::Map::new();
    params.insert("username".into(), json!(user.username));
    params.insert("password".into(), json!(user.password));
    params
}

fn unsupported(
    method: &'static str,
    chain: Chain,
) -> crate::Error {
    RpcError::Unsupported { method, chain }.into()
}

#[derive(Deserialize)]
struct AddressReply {
    address: String,
}

#[derive(Deserialize)]
struct AddressesReply {
    addresses: Vec<String>,
}

#[derive(Deserialize)]
struct BalanceReply {
    balance: String,
}

#[derive(Deserialize)]
struct TxIdReply {
    #[serde(rename = "txID")]
    tx_id: String,
}

#[derive(Deserialize)]
struct UtxosReply {
    utxos: Vec<String>,
}

#[derive(Deserialize)]
struct SuccessReply {
    success: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubnetReply {
    id: String,
    #[serde(default)]
    control_keys: Vec<String>,
    #[serde(default)]
    threshold: String,
}

#[derive(Deserialize)]
struct SubnetsReply {
    subnets: Vec<SubnetReply>,
}

#[derive(Deserialize)]
struct BlockchainReply {
    id: String,
    name: String,
    #[serde(rename = "subnetID")]
    subnet_id: String,
    #[serde(rename = "vmID")]
    vm_id: String,
}

#[derive(Deserialize)]
struct BlockchainsReply {
    blockchains: Vec<BlockchainReply>,
}

#[derive(Deserialize)]
struct StatusReply {
    status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BootstrappedReply {
    is_bootstrapped: bool,
}

#[derive(Deserialize)]
struct AssetReply {
    #[serde(rename = "assetID")]
    asset_id: String,
}

#[derive(Deserialize)]
struct BlockchainIdReply {
    #[serde(rename = "blockchainID")]
    blockchain_id: String,
}

#[derive(Deserialize)]
struct NodeIdReply {
    #[serde(rename = "nodeID")]
    node_id: String,
}

#[async_trait]
impl NodeApi for JsonRpcClient {
    async fn create_user(
        &self,
        user: &UserPass,
    ) -> Result<()> {
        let method = "keystore.createUser";
        let reply: SuccessReply = self
            .call(KEYSTORE_PATH, method, Value::Object(credentials(user)))
            .await?;
        if !reply.success {
            return Err(RpcError::Refused {
                method: method.to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn import_key(
        &self,
        chain: Chain,
        user: &UserPass,
        private_key: &str,
    ) -> Result<String> {
        let (path, ns) = chain_api(chain);
        let mut params = credentials(user);
        params.insert("privateKey".into(), json!(private_key));
        let reply: AddressReply = self
            .call(path, &format!("{ns}.importKey"), Value::Object(params))
            .await?;
        Ok(reply.address)
    }

    async fn create_address(
        &self,
        chain: Chain,
        user: &UserPass,
    ) -> Result<String> {
        if chain == Chain::C {
            return Err(unsupported("createAddress", chain));
        }
        let (path, ns) = chain_api(chain);
        let reply: AddressReply = self
            .call(path, &format!("{ns}.createAddress"), Value::Object(credentials(user)))
            .await?;
        Ok(reply.address)
    }

    async fn list_addresses(
        &self,
        chain: Chain,
        user: &UserPass,
    ) -> Result<Vec<String>> {
        if chain == Chain::C {
            return Err(unsupported("listAddresses", chain));
        }
        let (path, ns) = chain_api(chain);
        let reply: AddressesReply = self
            .call(path, &format!("{ns}.listAddresses"), Value::Object(credentials(user)))
            .await?;
        Ok(reply.addresses)
    }

    async fn get_balance(
        &self,
        chain: Chain,
        address: &str,
    ) -> Result<u64> {
        match chain {
            Chain::X => {
                let method = "avm.getBalance";
                let reply: BalanceReply = self
                    .call(
                        X_CHAIN_PATH,
                        method,
                        json!({ "address": address, "assetID": AVAX_SYMBOL }),
                    )
                    .await?;
                parse_u64(method, &reply.balance)
            }
            Chain::P => {
                let method = "platform.getBalance";
                let reply: BalanceReply = self
                    .call(P_CHAIN_PATH, method, json!({ "address": address }))
                    .await?;
                parse_u64(method, &reply.balance)
            }
            Chain::C => {
                let method = "eth_getBalance";
                let wei: String = self
                    .call(C_CHAIN_RPC_PATH, method, json!([address, "latest"]))
                    .await?;
                Ok(wei_to_nano_avax(parse_hex_quantity(method, &wei)?))
            }
        }
    }

    async fn send(
        &self,
        request: &SendRequest,
    ) -> Result<String> {
        let mut params = credentials(&request.user);
        params.insert("from".into(), json!(request.from));
        params.insert("changeAddr".into(), json!(request.change_addr));
        params.insert("amount".into(), json!(request.amount));
        params.insert("assetID".into(), json!(AVAX_SYMBOL));
        params.insert("to".into(), json!(request.to));
        params.insert("memo".into(), json!(request.memo));
        let reply: TxIdReply = self.call(X_CHAIN_PATH, "avm.send", Value::Object(params)).await?;
        Ok(reply.tx_id)
    }

    async fn get_utxos(
        &self,
        chain: Chain,
        addresses: &[String],
        source: Option<Chain>,
    ) -> Result<Vec<Utxo>> {
        if chain == Chain::C {
            return Err(unsupported("getUTXOs", chain));
        }
        let (path, ns) = chain_api(chain);
        let method = format!("{ns}.getUTXOs");
        let mut params = serde_json::Map::new();
        params.insert("addresses".into(), json!(addresses));
        params.insert("limit".into(), json!(UTXO_PAGE_LIMIT));
        params.insert("encoding".into(), json!("hex"));
        if let Some(source) = source {
            params.insert("sourceChain".into(), json!(source.alias()));
        }
        let reply: UtxosReply = self.call(path, &method, Value::Object(params)).await?;
        decode_hex_utxos(&reply.utxos).map_err(|e| {
            RpcError::Decode {
                method,
                reason: e.to_string(),
            }
            .into()
        })
    }

    async fn issue_tx(
        &self,
        chain: Chain,
        tx: &[u8],
    ) -> Result<String> {
        if chain == Chain::C {
            return Err(unsupported("issueTx", chain));
        }
        let (path, ns) = chain_api(chain);
        let method = format!("{ns}.issueTx");
        let params = json!({ "tx": hex_encode_with_checksum(tx), "encoding": "hex" });
        let reply: TxIdReply = self.call(path, &method, params).await?;
        Ok(reply.tx_id)
    }

    async fn get_tx_status(
        &self,
        chain: Chain,
        tx_id: &str,
    ) -> Result<TxStatus> {
        let (path, ns) = chain_api(chain);
        let method = format!("{ns}.getTxStatus");
        let params = match chain {
            Chain::P => json!({ "txID": tx_id, "includeReason": true }),
            _ => json!({ "txID": tx_id }),
        };
        let result: Value = self.call(path, &method, params).await?;
        parse_tx_status(&method, &result)
    }

    async fn create_subnet(
        &self,
        request: &CreateSubnetRequest,
    ) -> Result<String> {
        let mut params = credentials(&request.user);
        params.insert("from".into(), json!(request.from));
        params.insert("changeAddr".into(), json!(request.change_addr));
        params.insert("controlKeys".into(), json!(request.control_keys));
        params.insert("threshold".into(), json!(request.threshold));
        let reply: TxIdReply = self
            .call(P_CHAIN_PATH, "platform.createSubnet", Value::Object(params))
            .await?;
        Ok(reply.tx_id)
    }

    async fn get_subnets(&self) -> Result<Vec<Subnet>> {
        let method = "platform.getSubnets";
        let reply: SubnetsReply = self.call(P_CHAIN_PATH, method, json!({ "ids": [] })).await?;
        reply
            .subnets
            .into_iter()
            .map(|s| -> Result<Subnet> {
                let threshold = if s.threshold.is_empty() {
                    0
                } else {
                    parse_u64(method, &s.threshold)? as u32
                };
                Ok(Subnet {
                    id: s.id,
                    control_keys: s.control_keys,
                    threshold,
                })
            })
            .collect()
    }

    async fn add_subnet_validator(
        &self,
        request: &AddValidatorRequest,
    ) -> Result<String> {
        let mut params = credentials(&request.user);
        params.insert("from".into(), json!(request.from));
        params.insert("changeAddr".into(), json!(request.change_addr));
        params.insert("nodeID".into(), json!(request.node_id));
        params.insert("subnetID".into(), json!(request.subnet_id));
        params.insert("startTime".into(), json!(request.start_time.to_string()));
        params.insert("endTime".into(), json!(request.end_time.to_string()));
        params.insert("weight".into(), json!(request.weight.to_string()));
        let reply: TxIdReply = self
            .call(P_CHAIN_PATH, "platform.addSubnetValidator", Value::Object(params))
            .await?;
        Ok(reply.tx_id)
    }

    async fn create_blockchain(
        &self,
        request: &CreateBlockchainRequest,
    ) -> Result<String> {
        let mut params = credentials(&request.user);
        params.insert("from".into(), json!(request.from));
        params.insert("changeAddr".into(), json!(request.change_addr));
        params.insert("subnetID".into(), json!(request.subnet_id));
        params.insert("vmID".into(), json!(request.vm_id));
        params.insert("fxIDs".into(), json!(request.fx_ids));
        params.insert("name".into(), json!(request.name));
        params.insert("genesisData".into(), json!(hex_encode_with_checksum(&request.genesis)));
        params.insert("encoding".into(), json!("hex"));
        let reply: TxIdReply = self
            .call(P_CHAIN_PATH, "platform.createBlockchain", Value::Object(params))
            .await?;
        Ok(reply.tx_id)
    }

    async fn get_blockchains(&self) -> Result<Vec<Blockchain>> {
        let reply: BlockchainsReply = self
            .call(P_CHAIN_PATH, "platform.getBlockchains", json!({}))
            .await?;
        Ok(reply
            .blockchains
            .into_iter()
            .map(|b| Blockchain {
                id: b.id,
                name: b.name,
                subnet_id: b.subnet_id,
                vm_id: b.vm_id,
            })
            .collect())
    }

    async fn get_blockchain_status(
        &self,
        blockchain_id: &str,
    ) -> Result<BlockchainStatus> {
        let reply: StatusReply = self
            .call(
                P_CHAIN_PATH,
                "platform.getBlockchainStatus",
                json!({ "blockchainID": blockchain_id }),
            )
            .await?;
        Ok(BlockchainStatus::parse(&reply.status))
    }

    async fn is_bootstrapped(
        &self,
        chain: &str,
    ) -> Result<bool> {
        let reply: BootstrappedReply = self
            .call(INFO_PATH, "info.isBootstrapped", json!({ "chain": chain }))
            .await?;
        Ok(reply.is_bootstrapped)
    }

    async fn get_asset_id(
        &self,
        alias: &str,
    ) -> Result<String> {
        let reply: AssetReply = self
            .call(X_CHAIN_PATH, "avm.getAssetDescription", json!({ "assetID": alias }))
            .await?;
        Ok(reply.asset_id)
    }

    async fn get_blockchain_id(
        &self,
        alias: &str,
    ) -> Result<String> {
        let reply: BlockchainIdReply = self
            .call(INFO_PATH, "info.getBlockchainID", json!({ "alias": alias }))
            .await?;
        Ok(reply.blockchain_id)
    }

    async fn get_node_id(&self) -> Result<String> {
        let reply: NodeIdReply = self.call(INFO_PATH, "info.getNodeID", json!({})).await?;
        Ok(reply.node_id)
    }
}
