// -
// Units

/// 1 AVAX expressed in its smallest denomination (nAVAX)
pub const NANO_AVAX_PER_AVAX: u64 = 1_000_000_000;

/// 1 milliAVAX, the static fee charged by the local network
pub const MILLI_AVAX: u64 = 1_000_000;

/// EVM balances are reported in wei; 1 nAVAX = 1e9 wei
pub const WEI_PER_NANO_AVAX: u128 = 1_000_000_000;

// -
// Local network fixture

/// Network id of the local network
pub const LOCAL_NETWORK_ID: u32 = 1337;

pub const DEFAULT_HTTP_PORT: u16 = 9650;

/// Pre-funded genesis key shipped with every local network
pub const EWOQ_PRIVATE_KEY: &str = "PrivateKey-ewoqjP7PxY4yr3iLTpLisriqt94hdyDFNgchSxGGztUrTXtNN";
pub const EWOQ_X_ADDRESS: &str = "X-custom18jma8ppw3nhx5r4ap8clazz0dps7rv5u9xde7p";
pub const EWOQ_P_ADDRESS: &str = "P-custom18jma8ppw3nhx5r4ap8clazz0dps7rv5u9xde7p";
pub const EWOQ_C_ADDRESS: &str = "0x8db97C7cEcE249c2b98bDC0226Cc4C2A57BF52FC";

/// Genesis balances of the funded identity on a fresh local network
pub const EWOQ_X_GENESIS_BALANCE: u64 = 300_000_000_000_000_000;
pub const EWOQ_P_GENESIS_BALANCE: u64 = 30_000_000_000_000_000;

/// Subnet id produced by the first subnet tx signed by the genesis key
pub const EXPECTED_SUBNET_ID: &str = "24tZhrm8j8GCJRE9PomW8FaeqbgGS4UAQjJnqqn8pq5NwYSYV1";

pub const DEFAULT_VM_ID: &str = "tGas3T58KzdjLHhBDMnH2TvrddhqTji5iZAMZ3RXs2NLpSnhH";

pub const PRIVATE_KEY_PREFIX: &str = "PrivateKey-";
pub const NODE_ID_PREFIX: &str = "NodeID-";

/// Asset symbol accepted by the X-chain APIs in place of the AVAX asset id
pub const AVAX_SYMBOL: &str = "AVAX";

// -
// Endpoints

pub const HEALTH_PATH: &str = "/ext/health";
pub const INFO_PATH: &str = "/ext/info";
pub const KEYSTORE_PATH: &str = "/ext/keystore";
pub const X_CHAIN_PATH: &str = "/ext/bc/X";
pub const P_CHAIN_PATH: &str = "/ext/bc/P";
pub const C_CHAIN_AVAX_PATH: &str = "/ext/bc/C/avax";
pub const C_CHAIN_RPC_PATH: &str = "/ext/bc/C/rpc";

// -
// Files

pub const RUNNER_LOG_FILE: &str = "runner.log";
pub const LOGS_DIR_PREFIX: &str = "runnerlogs";
pub const STAKER_FILE_PREFIX: &str = "staker";

// -
// Local fleet

/// Delay between two rounds of `/ext/health` checks
pub const HEALTH_PROBE_INTERVAL_MS: u64 = 1_000;
pub const NODE_NAME_PREFIX: &str = "node";
pub const NODE_CONFIG_FILE: &str = "config.json";
