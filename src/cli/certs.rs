use std::path::Path;

use avax_tester::certs::write_staking_certs;
use avax_tester::file_io::reset_dir;
use avax_tester::ClusterError;
use avax_tester::Result;
use tracing::info;

/// Clears `dir` and writes `stakerN.key` / `stakerN.crt` for every node.
pub fn create(
    dir: &Path,
    nodes: usize,
) -> Result<()> {
    reset_dir(dir).map_err(|source| ClusterError::Prepare {
        path: dir.to_path_buf(),
        source,
    })?;
    let certs = write_staking_certs(dir, nodes)?;
    info!("wrote {} staking key pairs to {}", certs.len(), dir.display());

    for cert in &certs {
        println!(
            "--staking-tls-key-file={} --staking-tls-cert-file={}  # {}",
            cert.key_path.display(),
            cert.cert_path.display(),
            cert.node_id
        );
    }
    if let Some(first) = certs.first() {
        println!("\nbootstrap id: {}", first.node_id);
    }
    Ok(())
}
