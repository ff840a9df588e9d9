use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use crate::StakingCert;

/// Shell prelude of the script written by `local create`.
pub const BASH_HEADER: &str = "#!/bin/bash\nset -e\nset -x\n\n\n";

/// Info API call appended to the generated script.
pub const CURL_EXAMPLE: &str = r#"
# use this to test API
curl -X POST --data '{
	"jsonrpc":"2.0",
	"id"     :1,
	"method" :"info.peers"
}' \
-H 'content-type:application/json;' \
127.0.0.1:9650/ext/info

"#;

/// Where a non-beacon node finds the first node.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub ip: String,
    pub node_id: String,
}

/// Command line of one node process.
///
/// Rendered either as an argument vector for the local supervisor or as a
/// multi-line shell command for the generated script.
#[derive(Debug, Clone)]
pub struct NodeCommand {
    pub name: String,
    pub node_id: String,
    pub binary: PathBuf,
    pub http_port: u16,
    pub staking_port: u16,
    args: Vec<(&'static str, String)>,
}

impl NodeCommand {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        binary: &Path,
        network_id: &str,
        log_level: &str,
        http_port: u16,
        staking_port: u16,
        node_count: usize,
        db_dir: &Path,
        cert: &StakingCert,
        bootstrap: Option<&Bootstrap>,
    ) -> Self {
        let quorum = (node_count / 2).max(1);
        let args = vec![
            ("log-level", log_level.to_string()),
            ("network-id", network_id.to_string()),
            ("public-ip", "127.0.0.1".to_string()),
            ("http-port", http_port.to_string()),
            ("snow-sample-size", quorum.to_string()),
            ("snow-quorum-size", quorum.to_string()),
            ("db-dir", db_dir.display().to_string()),
            ("staking-enabled", "true".to_string()),
            ("staking-port", staking_port.to_string()),
            ("bootstrap-ips", bootstrap.map(|b| b.ip.clone()).unwrap_or_default()),
            ("bootstrap-ids", bootstrap.map(|b| b.node_id.clone()).unwrap_or_default()),
            ("staking-tls-key-file", cert.key_path.display().to_string()),
            ("staking-tls-cert-file", cert.cert_path.display().to_string()),
        ];

        Self {
            name: name.into(),
            node_id: cert.node_id.clone(),
            binary: binary.to_path_buf(),
            http_port,
            staking_port,
            args,
        }
    }

    /// Appends `--key=value`.
    pub fn arg(
        mut self,
        key: &'static str,
        value: impl Into<String>,
    ) -> Self {
        self.args.push((key, value.into()));
        self
    }

    /// `--key=value` pairs in order.
    pub fn to_args(&self) -> Vec<String> {
        self.args.iter().map(|(k, v)| format!("--{k}={v}")).collect()
    }

    pub fn uri(&self) -> String {
        format!("http://127.0.0.1:{}", self.http_port)
    }
}

impl fmt::Display for NodeCommand {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "# commands for {}, {}", self.name, self.node_id)?;
        writeln!(f, "kill -9 $(lsof -t -i:{})", self.http_port)?;
        writeln!(f, "kill -9 $(lsof -t -i:{})", self.staking_port)?;
        write!(f, "{}", self.binary.display())?;
        for arg in self.to_args() {
            write!(f, " \\\n{arg}")?;
        }
        writeln!(f)
    }
}

/// Full script for `local create`: header, one numbered block per node, curl example.
pub fn render_script(commands: &[NodeCommand]) -> String {
    let mut script = BASH_HEADER.to_string();
    for (i, cmd) in commands.iter().enumerate() {
        script.push_str(&format!("# [{:02}]\n{}\n\n", i + 1, cmd));
    }
    script.push_str(CURL_EXAMPLE);
    script
}
