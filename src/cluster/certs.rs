use std::path::Path;
use std::path::PathBuf;

use rcgen::generate_simple_self_signed;
use rcgen::CertifiedKey;
use ripemd::Ripemd160;
use sha2::Digest;
use sha2::Sha256;
use tracing::debug;

use crate::constants::NODE_ID_PREFIX;
use crate::constants::STAKER_FILE_PREFIX;
use crate::encoding::encode_prefixed;
use crate::file_io::write_with_mode;
use crate::file_io::OWNER_RO;
use crate::ClusterError;
use crate::Result;

/// Staking identity written to disk for one node.
#[derive(Debug, Clone)]
pub struct StakingCert {
    pub key_path: PathBuf,
    pub cert_path: PathBuf,
    pub node_id: String,
}

/// `NodeID-` + cb58(ripemd160(sha256(cert DER)))
pub fn node_id_from_cert_der(der: &[u8]) -> String {
    let short_id = Ripemd160::digest(Sha256::digest(der));
    encode_prefixed(&short_id, NODE_ID_PREFIX)
}

/// Generates a self-signed staking key pair and writes both files read-only.
pub fn write_staking_key_pair(
    key_path: &Path,
    cert_path: &Path,
) -> Result<StakingCert> {
    let subject_alt_names = vec!["localhost".to_string()];
    let CertifiedKey { cert, key_pair } = generate_simple_self_signed(subject_alt_names)
        .map_err(|e| ClusterError::Certificate(e.to_string()))?;

    write_with_mode(cert_path, cert.pem().as_bytes(), OWNER_RO).map_err(|source| {
        ClusterError::Prepare {
            path: cert_path.to_path_buf(),
            source,
        }
    })?;
    write_with_mode(key_path, key_pair.serialize_pem().as_bytes(), OWNER_RO).map_err(|source| {
        ClusterError::Prepare {
            path: key_path.to_path_buf(),
            source,
        }
    })?;

    let node_id = node_id_from_cert_der(cert.der());
    debug!(?cert_path, %node_id, "wrote staking key pair");

    Ok(StakingCert {
        key_path: key_path.to_path_buf(),
        cert_path: cert_path.to_path_buf(),
        node_id,
    })
}

/// Writes `stakerN.key` / `stakerN.crt` (1-based) for `count` nodes under `dir`.
pub fn write_staking_certs(
    dir: &Path,
    count: usize,
) -> Result<Vec<StakingCert>> {
    (1..=count)
        .map(|n| {
            write_staking_key_pair(
                &dir.join(format!("{STAKER_FILE_PREFIX}{n}.key")),
                &dir.join(format!("{STAKER_FILE_PREFIX}{n}.crt")),
            )
        })
        .collect()
}
