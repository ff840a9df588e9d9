//! In-memory fleet for orchestration tests.
//!
//! Every [`FakeNode`] shares one [`FakeLedger`]. Transactions take effect at
//! once but only report their final status after `tx_delay`; keystore
//! addresses are only listed after `address_delay`. Each RPC is appended to a
//! trace as `"<node>:<method>"`.
//!
//! UTXOs are owned by short addresses. Raw export/import txs are decoded,
//! their signatures recovered and their inputs looked up and consumed, so a
//! tx built from the wrong inputs or signed by the wrong key is rejected.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::Digest;
use sha2::Sha256;
use tokio::time::Instant;

use crate::constants::EWOQ_C_ADDRESS;
use crate::constants::EWOQ_PRIVATE_KEY;
use crate::constants::EWOQ_P_ADDRESS;
use crate::constants::EWOQ_P_GENESIS_BALANCE;
use crate::constants::EWOQ_X_ADDRESS;
use crate::constants::EWOQ_X_GENESIS_BALANCE;
use crate::constants::EXPECTED_SUBNET_ID;
use crate::constants::LOCAL_NETWORK_ID;
use crate::encoding::cb58_encode;
use crate::test_utils::decode_signed_tx;
use crate::test_utils::DecodedTx;
use crate::test_utils::TxKind;
use crate::tx::TransferInput;
use crate::tx::TransferOutput;
use crate::tx::PLATFORM_CHAIN_ID;
use crate::AddValidatorRequest;
use crate::Blockchain;
use crate::BlockchainStatus;
use crate::Chain;
use crate::ClusterError;
use crate::ClusterLauncher;
use crate::CreateBlockchainRequest;
use crate::CreateSubnetRequest;
use crate::LaunchSpec;
use crate::Network;
use crate::NodeApi;
use crate::NodeSpec;
use crate::PrivateKey;
use crate::Result;
use crate::RpcError;
use crate::SendRequest;
use crate::Subnet;
use crate::TxStatus;
use crate::UserPass;
use crate::Utxo;

pub const FAKE_AVAX_ASSET: [u8; 32] = [0xAA; 32];
pub const FAKE_X_CHAIN: [u8; 32] = [0x58; 32];
pub const FAKE_C_CHAIN: [u8; 32] = [0x43; 32];
pub const FAKE_TX_FEE: u64 = 1_000_000;

pub fn fake_avax_asset_id() -> String {
    cb58_encode(&FAKE_AVAX_ASSET)
}

/// Timing and fixture knobs of the fake ledger.
#[derive(Debug, Clone)]
pub struct FakeLedgerConfig {
    pub tx_delay: Duration,
    pub address_delay: Duration,
    /// Time from blockchain creation until it reports `Validating`
    pub validating_after: Duration,
    /// Time from blockchain creation until it is bootstrapped; `None` = never
    pub bootstrap_after: Option<Duration>,
    pub subnet_id: String,
    /// The genesis key maps to a foreign address on this node and chain
    pub genesis_mismatch: Option<(String, Chain)>,
}

impl Default for FakeLedgerConfig {
    fn default() -> Self {
        Self {
            tx_delay: Duration::from_secs(2),
            address_delay: Duration::from_secs(1),
            validating_after: Duration::from_secs(3),
            bootstrap_after: Some(Duration::from_secs(5)),
            subnet_id: EXPECTED_SUBNET_ID.to_string(),
            genesis_mismatch: None,
        }
    }
}

#[derive(Debug)]
struct FakeTx {
    chain: Chain,
    visible_at: Instant,
}

#[derive(Debug)]
struct FakeChain {
    chain: Blockchain,
    created: Instant,
}

#[derive(Default)]
struct LedgerState {
    users: HashSet<(String, String)>,
    /// (node, user, chain) -> (address, listed from)
    keystores: HashMap<(String, String, Chain), Vec<(String, Instant)>>,
    x_utxos: Vec<Utxo>,
    /// Outputs exported from the X-chain, waiting to be imported on P
    atomic_utxos: Vec<Utxo>,
    p_balances: HashMap<[u8; 20], u64>,
    c_balances: HashMap<String, u64>,
    txs: HashMap<String, FakeTx>,
    subnets: Vec<(Subnet, Instant)>,
    blockchains: Vec<FakeChain>,
    next_id: u64,
    trace: Vec<String>,
}

fn owned_by(
    utxo: &Utxo,
    owners: &[[u8; 20]],
) -> bool {
    utxo.addresses.iter().any(|a| owners.contains(a))
}

fn shorts_of(addresses: &[String]) -> Vec<[u8; 20]> {
    addresses.iter().filter_map(|a| short_of(a)).collect()
}

fn utxo_from(
    tx_id: &str,
    output_index: usize,
    output: &TransferOutput,
) -> Utxo {
    Utxo {
        tx_id: tx_id.to_string(),
        output_index: output_index as u32,
        asset_id: cb58_encode(&output.asset_id),
        amount: output.amount,
        locktime: output.locktime,
        threshold: output.threshold,
        addresses: output.addresses.clone(),
    }
}

impl LedgerState {
    fn next_id(
        &mut self,
        prefix: &str,
    ) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn x_balance(
        &self,
        address: &str,
    ) -> u64 {
        let owners: Vec<_> = short_of(address).into_iter().collect();
        self.x_utxos.iter().filter(|u| owned_by(u, &owners)).map(|u| u.amount).sum()
    }

    fn p_balance(
        &self,
        address: &str,
    ) -> u64 {
        short_of(address).and_then(|s| self.p_balances.get(&s).copied()).unwrap_or_default()
    }

    /// Fresh unlocked X output for `owner`.
    fn utxo(
        &mut self,
        amount: u64,
        owner: [u8; 20],
    ) -> Utxo {
        let seed = self.next_id("utxo");
        Utxo {
            tx_id: cb58_encode(&Sha256::digest(seed.as_bytes())),
            output_index: 0,
            asset_id: fake_avax_asset_id(),
            amount,
            locktime: 0,
            threshold: 1,
            addresses: vec![owner],
        }
    }

    /// Consumes every X output owned by `from`, returning their sum.
    fn spend_x(
        &mut self,
        from: &[String],
        needed: u64,
        method: &str,
    ) -> Result<u64> {
        let owners = shorts_of(from);
        let available: u64 =
            self.x_utxos.iter().filter(|u| owned_by(u, &owners)).map(|u| u.amount).sum();
        if available < needed {
            return Err(server_error(method, "insufficient funds"));
        }
        self.x_utxos.retain(|u| !owned_by(u, &owners));
        Ok(available)
    }

    fn apply_export(
        &mut self,
        tx: &DecodedTx,
        tx_id: &str,
    ) -> Result<()> {
        const METHOD: &str = "avm.issueTx";
        if tx.blockchain_id != FAKE_X_CHAIN || tx.other_chain != PLATFORM_CHAIN_ID {
            return Err(server_error(METHOD, "wrong chain"));
        }
        let consumed = check_inputs(&self.x_utxos, tx, &tx.inputs, METHOD)?;
        let produced: u64 = tx.outputs.iter().chain(&tx.exported).map(|o| o.amount).sum();
        if consumed != produced + FAKE_TX_FEE {
            return Err(server_error(METHOD, "inputs and outputs do not balance"));
        }

        remove_spent(&mut self.x_utxos, &tx.inputs);
        for (i, output) in tx.outputs.iter().enumerate() {
            self.x_utxos.push(utxo_from(tx_id, i, output));
        }
        for (i, output) in tx.exported.iter().enumerate() {
            self.atomic_utxos.push(utxo_from(tx_id, tx.outputs.len() + i, output));
        }
        Ok(())
    }

    fn apply_import(
        &mut self,
        tx: &DecodedTx,
    ) -> Result<()> {
        const METHOD: &str = "platform.issueTx";
        if tx.blockchain_id != PLATFORM_CHAIN_ID || tx.other_chain != FAKE_X_CHAIN {
            return Err(server_error(METHOD, "wrong chain"));
        }
        // the fake P-chain tracks balances, not UTXOs
        if !tx.inputs.is_empty() {
            return Err(server_error(METHOD, "unexpected P-chain inputs"));
        }
        let consumed = check_inputs(&self.atomic_utxos, tx, &tx.imported, METHOD)?;
        let produced: u64 = tx.outputs.iter().map(|o| o.amount).sum();
        if consumed != produced + FAKE_TX_FEE {
            return Err(server_error(METHOD, "inputs and outputs do not balance"));
        }

        remove_spent(&mut self.atomic_utxos, &tx.imported);
        for output in &tx.outputs {
            for owner in &output.addresses {
                *self.p_balances.entry(*owner).or_default() += output.amount;
            }
        }
        Ok(())
    }
}

fn spends(
    input: &TransferInput,
    utxo: &Utxo,
) -> bool {
    utxo.tx_id == cb58_encode(&input.tx_id) && utxo.output_index == input.output_index
}

/// Sums the UTXOs in `pool` that `inputs` spend, checking that each exists,
/// matches its input and carries a signature from its owner.
fn check_inputs(
    pool: &[Utxo],
    tx: &DecodedTx,
    inputs: &[TransferInput],
    method: &str,
) -> Result<u64> {
    if inputs.len() != tx.credentials.len() {
        return Err(server_error(method, "wrong number of credentials"));
    }
    let mut total = 0u64;
    for (input, signatures) in inputs.iter().zip(&tx.credentials) {
        let Some(utxo) = pool.iter().find(|u| spends(input, u)) else {
            return Err(server_error(method, "missing utxo"));
        };
        if utxo.amount != input.amount || utxo.asset_id != cb58_encode(&input.asset_id) {
            return Err(server_error(method, "input does not match utxo"));
        }
        if input.sig_indices.len() != signatures.len() {
            return Err(server_error(method, "wrong number of signatures"));
        }
        for (index, signature) in input.sig_indices.iter().zip(signatures) {
            let owner = utxo.addresses.get(*index as usize);
            if owner.is_none() || tx.signer(signature).as_ref() != owner {
                return Err(server_error(method, "signature does not match utxo owner"));
            }
        }
        total += utxo.amount;
    }
    Ok(total)
}

fn remove_spent(
    pool: &mut Vec<Utxo>,
    inputs: &[TransferInput],
) {
    pool.retain(|u| !inputs.iter().any(|i| spends(i, u)));
}

pub struct FakeLedger {
    config: FakeLedgerConfig,
    state: Mutex<LedgerState>,
}

impl FakeLedger {
    pub fn new(config: FakeLedgerConfig) -> Arc<Self> {
        let mut state = LedgerState::default();
        let ewoq = ewoq_short();
        let genesis = state.utxo(EWOQ_X_GENESIS_BALANCE, ewoq);
        state.x_utxos.push(genesis);
        state.p_balances.insert(ewoq, EWOQ_P_GENESIS_BALANCE);
        Arc::new(Self {
            config,
            state: Mutex::new(state),
        })
    }

    pub fn trace(&self) -> Vec<String> {
        self.state.lock().trace.clone()
    }

    pub fn trace_contains(
        &self,
        entry: &str,
    ) -> bool {
        self.state.lock().trace.iter().any(|t| t.ends_with(entry))
    }

    pub fn x_balance(
        &self,
        address: &str,
    ) -> u64 {
        self.state.lock().x_balance(address)
    }

    pub fn p_balance(
        &self,
        address: &str,
    ) -> u64 {
        self.state.lock().p_balance(address)
    }

    /// Adds a UTXO to the X-chain as if some earlier tx had produced it.
    pub fn seed_x_utxo(
        &self,
        utxo: Utxo,
    ) {
        self.state.lock().x_utxos.push(utxo);
    }

    fn record(
        &self,
        node: &str,
        method: &str,
    ) {
        self.state.lock().trace.push(format!("{node}:{method}"));
    }

    fn register_tx(
        &self,
        state: &mut LedgerState,
        tx_id: String,
        chain: Chain,
    ) -> String {
        state.txs.insert(
            tx_id.clone(),
            FakeTx {
                chain,
                visible_at: Instant::now() + self.config.tx_delay,
            },
        );
        tx_id
    }

    fn issue_tx(
        &self,
        state: &mut LedgerState,
        chain: Chain,
    ) -> String {
        let tx_id = state.next_id("tx");
        self.register_tx(state, tx_id, chain)
    }
}

fn ewoq_short() -> [u8; 20] {
    PrivateKey::from_encoded(EWOQ_PRIVATE_KEY)
        .and_then(|key| key.short_address())
        .expect("ewoq key")
}

/// Short address behind a key, or behind an arbitrary seed for addresses the
/// keystore generates.
fn short_for(private_key: &str) -> [u8; 20] {
    match PrivateKey::from_encoded(private_key).and_then(|key| key.short_address()) {
        Ok(short) => short,
        Err(_) => {
            let digest = Sha256::digest(private_key.as_bytes());
            let mut short = [0u8; 20];
            short.copy_from_slice(&digest[..20]);
            short
        }
    }
}

/// Inverse of [`fake_address`].
pub fn short_of(address: &str) -> Option<[u8; 20]> {
    if [EWOQ_X_ADDRESS, EWOQ_P_ADDRESS, EWOQ_C_ADDRESS].contains(&address) {
        return Some(ewoq_short());
    }
    let encoded = ["X-local1", "P-local1", "0x"].iter().find_map(|p| address.strip_prefix(*p))?;
    hex::decode(encoded).ok()?.try_into().ok()
}

/// Address a key maps to. The genesis key maps to the fixture addresses.
pub fn fake_address(
    chain: Chain,
    private_key: &str,
) -> String {
    if private_key == EWOQ_PRIVATE_KEY {
        return match chain {
            Chain::X => EWOQ_X_ADDRESS,
            Chain::P => EWOQ_P_ADDRESS,
            Chain::C => EWOQ_C_ADDRESS,
        }
        .to_string();
    }
    let short = hex::encode(short_for(private_key));
    match chain {
        Chain::C => format!("0x{short}"),
        _ => format!("{chain}-local1{short}"),
    }
}

fn server_error(
    method: &str,
    message: &str,
) -> crate::Error {
    RpcError::Server {
        method: method.to_string(),
        code: -32000,
        message: message.to_string(),
    }
    .into()
}

pub struct FakeNode {
    name: String,
    ledger: Arc<FakeLedger>,
}

impl FakeNode {
    pub fn new(
        name: impl Into<String>,
        ledger: Arc<FakeLedger>,
    ) -> Self {
        Self {
            name: name.into(),
            ledger,
        }
    }

    fn require_user(
        &self,
        state: &LedgerState,
        user: &UserPass,
        method: &str,
    ) -> Result<()> {
        if state.users.contains(&(self.name.clone(), user.username.clone())) {
            return Ok(());
        }
        Err(server_error(method, "incorrect password or user does not exist"))
    }

    fn add_to_keystore(
        &self,
        state: &mut LedgerState,
        user: &UserPass,
        chain: Chain,
        address: &str,
    ) {
        let visible = Instant::now() + self.ledger.config.address_delay;
        let entries = state
            .keystores
            .entry((self.name.clone(), user.username.clone(), chain))
            .or_default();
        if !entries.iter().any(|(a, _)| a == address) {
            entries.push((address.to_string(), visible));
        }
    }
}

#[async_trait]
impl NodeApi for FakeNode {
    async fn create_user(
        &self,
        user: &UserPass,
    ) -> Result<()> {
        self.ledger.record(&self.name, "create_user");
        let mut state = self.ledger.state.lock();
        if !state.users.insert((self.name.clone(), user.username.clone())) {
            return Err(server_error("keystore.createUser", "user already exists"));
        }
        Ok(())
    }

    async fn import_key(
        &self,
        chain: Chain,
        user: &UserPass,
        private_key: &str,
    ) -> Result<String> {
        let label = if private_key == EWOQ_PRIVATE_KEY { "genesis" } else { "wallet" };
        self.ledger.record(&self.name, &format!("import_key:{label}"));
        let mut state = self.ledger.state.lock();
        self.require_user(&state, user, "importKey")?;

        let mismatch = self.ledger.config.genesis_mismatch.as_ref();
        let address = match mismatch {
            Some((node, c)) if *node == self.name && *c == chain && label == "genesis" => {
                fake_address(chain, "someone-else")
            }
            _ => fake_address(chain, private_key),
        };
        self.add_to_keystore(&mut state, user, chain, &address);
        Ok(address)
    }

    async fn create_address(
        &self,
        chain: Chain,
        user: &UserPass,
    ) -> Result<String> {
        self.ledger.record(&self.name, "create_address");
        let mut state = self.ledger.state.lock();
        self.require_user(&state, user, "createAddress")?;
        let seed = state.next_id(&self.name);
        let address = fake_address(chain, &seed);
        self.add_to_keystore(&mut state, user, chain, &address);
        Ok(address)
    }

    async fn list_addresses(
        &self,
        chain: Chain,
        user: &UserPass,
    ) -> Result<Vec<String>> {
        self.ledger.record(&self.name, "list_addresses");
        let state = self.ledger.state.lock();
        self.require_user(&state, user, "listAddresses")?;
        let now = Instant::now();
        Ok(state
            .keystores
            .get(&(self.name.clone(), user.username.clone(), chain))
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(_, visible)| *visible <= now)
                    .map(|(a, _)| a.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_balance(
        &self,
        chain: Chain,
        address: &str,
    ) -> Result<u64> {
        self.ledger.record(&self.name, "get_balance");
        let state = self.ledger.state.lock();
        Ok(match chain {
            Chain::X => state.x_balance(address),
            Chain::P => state.p_balance(address),
            Chain::C => state.c_balances.get(address).copied().unwrap_or_default(),
        })
    }

    async fn send(
        &self,
        request: &SendRequest,
    ) -> Result<String> {
        self.ledger.record(&self.name, "send");
        let mut state = self.ledger.state.lock();
        self.require_user(&state, &request.user, "avm.send")?;
        let needed = request.amount + FAKE_TX_FEE;
        let spent = state.spend_x(&request.from, needed, "avm.send")?;

        let to = short_of(&request.to).ok_or_else(|| server_error("avm.send", "bad address"))?;
        let change_addr = short_of(&request.change_addr)
            .ok_or_else(|| server_error("avm.send", "bad change address"))?;
        let out = state.utxo(request.amount, to);
        state.x_utxos.push(out);
        let change = state.utxo(spent - needed, change_addr);
        state.x_utxos.push(change);
        Ok(self.ledger.issue_tx(&mut state, Chain::X))
    }

    async fn get_utxos(
        &self,
        chain: Chain,
        addresses: &[String],
        source: Option<Chain>,
    ) -> Result<Vec<Utxo>> {
        self.ledger.record(&self.name, "get_utxos");
        let state = self.ledger.state.lock();
        let pool = match (chain, source) {
            (Chain::X, None) => &state.x_utxos,
            (Chain::P, Some(Chain::X)) => &state.atomic_utxos,
            _ => {
                return Err(RpcError::Unsupported {
                    method: "getUTXOs",
                    chain,
                }
                .into())
            }
        };
        let owners = shorts_of(addresses);
        Ok(pool.iter().filter(|u| owned_by(u, &owners)).cloned().collect())
    }

    async fn issue_tx(
        &self,
        chain: Chain,
        tx: &[u8],
    ) -> Result<String> {
        let method = match chain {
            Chain::X => "avm.issueTx",
            Chain::P => "platform.issueTx",
            Chain::C => {
                return Err(RpcError::Unsupported {
                    method: "issueTx",
                    chain,
                }
                .into())
            }
        };
        let decoded = decode_signed_tx(tx).map_err(|e| server_error(method, &e.to_string()))?;
        let kind = match decoded.kind {
            TxKind::Export => "export",
            TxKind::Import => "import",
        };
        self.ledger.record(&self.name, &format!("issue_tx:{kind}"));
        if decoded.network_id != LOCAL_NETWORK_ID {
            return Err(server_error(method, "wrong network id"));
        }

        let tx_id = cb58_encode(&Sha256::digest(tx));
        let mut state = self.ledger.state.lock();
        match (chain, decoded.kind) {
            (Chain::X, TxKind::Export) => state.apply_export(&decoded, &tx_id)?,
            (Chain::P, TxKind::Import) => state.apply_import(&decoded)?,
            _ => return Err(server_error(method, "tx issued on the wrong chain")),
        }
        Ok(self.ledger.register_tx(&mut state, tx_id, chain))
    }

    async fn get_tx_status(
        &self,
        chain: Chain,
        tx_id: &str,
    ) -> Result<TxStatus> {
        self.ledger.record(&self.name, "get_tx_status");
        let state = self.ledger.state.lock();
        Ok(match state.txs.get(tx_id) {
            Some(tx) if tx.chain == chain && tx.visible_at <= Instant::now() => {
                chain.final_status()
            }
            Some(_) => TxStatus::Processing,
            None => TxStatus::Unknown("Unknown".to_string()),
        })
    }

    async fn create_subnet(
        &self,
        request: &CreateSubnetRequest,
    ) -> Result<String> {
        self.ledger.record(&self.name, "create_subnet");
        let mut state = self.ledger.state.lock();
        self.require_user(&state, &request.user, "platform.createSubnet")?;
        let id = self.ledger.config.subnet_id.clone();
        let visible = Instant::now() + self.ledger.config.tx_delay;
        state.txs.insert(
            id.clone(),
            FakeTx {
                chain: Chain::P,
                visible_at: visible,
            },
        );
        state.subnets.push((
            Subnet {
                id: id.clone(),
                control_keys: request.control_keys.clone(),
                threshold: request.threshold,
            },
            visible,
        ));
        Ok(id)
    }

    async fn get_subnets(&self) -> Result<Vec<Subnet>> {
        self.ledger.record(&self.name, "get_subnets");
        let state = self.ledger.state.lock();
        let now = Instant::now();
        Ok(state.subnets.iter().filter(|(_, v)| *v <= now).map(|(s, _)| s.clone()).collect())
    }

    async fn add_subnet_validator(
        &self,
        request: &AddValidatorRequest,
    ) -> Result<String> {
        self.ledger.record(&self.name, "add_subnet_validator");
        let mut state = self.ledger.state.lock();
        self.require_user(&state, &request.user, "platform.addSubnetValidator")?;
        if !state.subnets.iter().any(|(s, _)| s.id == request.subnet_id) {
            return Err(server_error("platform.addSubnetValidator", "unknown subnet"));
        }
        Ok(self.ledger.issue_tx(&mut state, Chain::P))
    }

    async fn create_blockchain(
        &self,
        request: &CreateBlockchainRequest,
    ) -> Result<String> {
        self.ledger.record(&self.name, "create_blockchain");
        let mut state = self.ledger.state.lock();
        self.require_user(&state, &request.user, "platform.createBlockchain")?;
        let tx_id = self.ledger.issue_tx(&mut state, Chain::P);
        state.blockchains.push(FakeChain {
            chain: Blockchain {
                id: tx_id.clone(),
                name: request.name.clone(),
                subnet_id: request.subnet_id.clone(),
                vm_id: request.vm_id.clone(),
            },
            created: Instant::now(),
        });
        Ok(tx_id)
    }

    async fn get_blockchains(&self) -> Result<Vec<Blockchain>> {
        self.ledger.record(&self.name, "get_blockchains");
        let state = self.ledger.state.lock();
        Ok(state.blockchains.iter().map(|b| b.chain.clone()).collect())
    }

    async fn get_blockchain_status(
        &self,
        blockchain_id: &str,
    ) -> Result<BlockchainStatus> {
        self.ledger.record(&self.name, "get_blockchain_status");
        let state = self.ledger.state.lock();
        let validating_after = self.ledger.config.validating_after;
        Ok(match state.blockchains.iter().find(|b| b.chain.id == blockchain_id) {
            Some(b) if b.created + validating_after <= Instant::now() => {
                BlockchainStatus::Validating
            }
            Some(_) => BlockchainStatus::Created,
            None => BlockchainStatus::Unknown("Unknown".to_string()),
        })
    }

    async fn is_bootstrapped(
        &self,
        chain: &str,
    ) -> Result<bool> {
        self.ledger.record(&self.name, "is_bootstrapped");
        if matches!(chain, "X" | "P" | "C") {
            return Ok(true);
        }
        let state = self.ledger.state.lock();
        let Some(after) = self.ledger.config.bootstrap_after else {
            return Ok(false);
        };
        Ok(state
            .blockchains
            .iter()
            .any(|b| b.chain.id == chain && b.created + after <= Instant::now()))
    }

    async fn get_asset_id(
        &self,
        _alias: &str,
    ) -> Result<String> {
        self.ledger.record(&self.name, "get_asset_id");
        Ok(fake_avax_asset_id())
    }

    async fn get_blockchain_id(
        &self,
        alias: &str,
    ) -> Result<String> {
        self.ledger.record(&self.name, "get_blockchain_id");
        match alias {
            "X" => Ok(cb58_encode(&FAKE_X_CHAIN)),
            "C" => Ok(cb58_encode(&FAKE_C_CHAIN)),
            other => Err(server_error("info.getBlockchainID", &format!("unknown alias {other}"))),
        }
    }

    async fn get_node_id(&self) -> Result<String> {
        self.ledger.record(&self.name, "get_node_id");
        Ok(format!("NodeID-fake-{}", self.name))
    }
}

pub struct FakeNetwork {
    ledger: Arc<FakeLedger>,
    node_count: usize,
    healthy_at: Instant,
    stops: AtomicUsize,
}

impl FakeNetwork {
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn wait_healthy(&self) -> Result<()> {
        tokio::time::sleep_until(self.healthy_at).await;
        Ok(())
    }

    async fn list_nodes(&self) -> Result<Vec<NodeSpec>> {
        Ok((0..self.node_count)
            .map(|i| {
                let name = format!("node{}", i + 1);
                NodeSpec {
                    node_id: format!("NodeID-fake-{name}"),
                    uri: format!("http://127.0.0.1:{}", 9650 + 2 * i),
                    client: Arc::new(FakeNode::new(name.clone(), self.ledger.clone())),
                    name,
                }
            })
            .collect())
    }

    async fn stop(&self) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out one [`FakeNetwork`] per launch and keeps it for inspection.
pub struct FakeLauncher {
    ledger: Arc<FakeLedger>,
    healthy_after: Duration,
    launch_delay: Duration,
    fail: bool,
    launched: Mutex<Option<Arc<FakeNetwork>>>,
    specs: Mutex<Vec<LaunchSpec>>,
}

impl FakeLauncher {
    fn build(
        ledger: Arc<FakeLedger>,
        healthy_after: Duration,
        launch_delay: Duration,
        fail: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            ledger,
            healthy_after,
            launch_delay,
            fail,
            launched: Mutex::new(None),
            specs: Mutex::new(Vec::new()),
        })
    }

    pub fn new(
        ledger: Arc<FakeLedger>,
        healthy_after: Duration,
    ) -> Arc<Self> {
        Self::build(ledger, healthy_after, Duration::ZERO, false)
    }

    /// Launch itself takes `launch_delay`.
    pub fn slow(
        ledger: Arc<FakeLedger>,
        launch_delay: Duration,
    ) -> Arc<Self> {
        Self::build(ledger, Duration::ZERO, launch_delay, false)
    }

    pub fn failing(ledger: Arc<FakeLedger>) -> Arc<Self> {
        Self::build(ledger, Duration::ZERO, Duration::ZERO, true)
    }

    pub fn network(&self) -> Option<Arc<FakeNetwork>> {
        self.launched.lock().clone()
    }

    pub fn last_spec(&self) -> Option<LaunchSpec> {
        self.specs.lock().last().cloned()
    }
}

#[async_trait]
impl ClusterLauncher for FakeLauncher {
    async fn launch(
        &self,
        spec: &LaunchSpec,
    ) -> Result<Arc<dyn Network>> {
        self.specs.lock().push(spec.clone());
        tokio::time::sleep(self.launch_delay).await;

        if self.fail {
            return Err(ClusterError::Launch {
                node: "node1".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such binary"),
            }
            .into());
        }

        let network = Arc::new(FakeNetwork {
            ledger: self.ledger.clone(),
            node_count: spec.node_count,
            healthy_at: Instant::now() + self.healthy_after,
            stops: AtomicUsize::new(0),
        });
        *self.launched.lock() = Some(network.clone());
        Ok(network)
    }
}
