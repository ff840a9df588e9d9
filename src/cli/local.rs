use std::path::Path;

use avax_tester::certs::write_staking_certs;
use avax_tester::command::render_script;
use avax_tester::command::Bootstrap;
use avax_tester::command::NodeCommand;
use avax_tester::constants::DEFAULT_HTTP_PORT;
use avax_tester::constants::EWOQ_P_GENESIS_BALANCE;
use avax_tester::constants::EWOQ_X_GENESIS_BALANCE;
use avax_tester::constants::NODE_NAME_PREFIX;
use avax_tester::file_io::reset_dir;
use avax_tester::file_io::write_with_mode;
use avax_tester::util::random_name;
use avax_tester::Chain;
use avax_tester::ClusterError;
use avax_tester::Error;
use avax_tester::FixtureMismatch;
use avax_tester::JsonRpcClient;
use avax_tester::NodeApi;
use avax_tester::OutputError;
use avax_tester::Poller;
use avax_tester::Result;
use avax_tester::RunnerConfig;
use avax_tester::SendRequest;
use avax_tester::UserPass;
use futures::future::try_join_all;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::wait_for_signal;

const SCRIPT_MODE: u32 = 0o777;

/// Writes fresh certs and a script that starts `nodes` nodes by hand.
pub fn create(
    nodes: usize,
    binary: &Path,
    db_dir: &Path,
    certs_dir: &Path,
    cmd_output_path: &Path,
) -> Result<()> {
    for dir in [db_dir, certs_dir] {
        reset_dir(dir).map_err(|source| ClusterError::Prepare {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let certs = write_staking_certs(certs_dir, nodes)?;

    let mut commands = Vec::with_capacity(nodes);
    let mut bootstrap: Option<Bootstrap> = None;
    for (index, cert) in certs.iter().enumerate() {
        let name = format!("{NODE_NAME_PREFIX}{}", index + 1);
        let http_port = DEFAULT_HTTP_PORT + (index as u16) * 2;
        let command = NodeCommand::new(
            name.clone(),
            binary,
            "local",
            "INFO",
            http_port,
            http_port + 1,
            nodes,
            &db_dir.join(&name),
            cert,
            bootstrap.as_ref(),
        );
        if bootstrap.is_none() {
            bootstrap = Some(Bootstrap {
                ip: format!("127.0.0.1:{}", command.staking_port),
                node_id: cert.node_id.clone(),
            });
        }
        commands.push(command);
    }

    let script = render_script(&commands);
    write_with_mode(cmd_output_path, script.as_bytes(), SCRIPT_MODE).map_err(|source| {
        OutputError::Io {
            path: cmd_output_path.to_path_buf(),
            source,
        }
    })?;
    info!("wrote {} node commands to {}", commands.len(), cmd_output_path.display());

    println!("cat {}", cmd_output_path.display());
    println!("{script}");
    Ok(())
}

struct Host {
    uri: String,
    client: JsonRpcClient,
    user: UserPass,
}

/// Imports the genesis key on every host, checks its addresses and balances,
/// then sends `amount` to a fresh X address on each host and waits for it.
pub async fn transfer(
    api_hosts: &[String],
    amount: u64,
) -> Result<()> {
    let config = RunnerConfig::new()?.validate()?;
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        on_signal.cancel();
    });
    let poller = Poller::new(
        config.poll.check_interval(),
        config.poll.tx_confirm_timeout(),
        cancel,
    );

    let hosts: Vec<Host> = api_hosts
        .iter()
        .map(|uri| -> Result<Host> {
            Ok(Host {
                uri: uri.clone(),
                client: JsonRpcClient::new(uri.clone(), config.cluster.rpc_timeout())?,
                user: UserPass::new(random_name(10), config.fixture.password.clone()),
            })
        })
        .collect::<Result<_>>()?;

    try_join_all(hosts.iter().map(|host| prepare_host(host, &config, &poller))).await?;

    for host in &hosts {
        send_to_fresh_address(host, &config, &poller, amount).await?;
    }
    info!("transfer smoke test passed on {} hosts", hosts.len());
    Ok(())
}

async fn prepare_host(
    host: &Host,
    config: &RunnerConfig,
    poller: &Poller,
) -> Result<()> {
    let client = &host.client;
    client.create_user(&host.user).await?;
    info!(host = %host.uri, username = %host.user.username, "created user");

    for chain in Chain::ALL {
        let address = client
            .import_key(chain, &host.user, &config.fixture.genesis_private_key)
            .await?;
        let expected = config.fixture.expected_address(chain);
        if address != expected {
            return Err(FixtureMismatch::GenesisAddress {
                chain,
                node: host.uri.clone(),
                got: address,
                expected: expected.to_string(),
            }
            .into());
        }

        if chain != Chain::C {
            let user = &host.user;
            let expected = expected.to_string();
            let expected = &expected;
            let what = format!("{chain}-chain address on {}", host.uri);
            poller
                .poll_until(&what, move || async move {
                    let listed = client.list_addresses(chain, user).await?;
                    Ok(listed.iter().any(|a| a == expected).then_some(()))
                })
                .await?;
        }
    }

    let genesis_balances = [
        (Chain::X, EWOQ_X_GENESIS_BALANCE),
        (Chain::P, EWOQ_P_GENESIS_BALANCE),
    ];
    for (chain, expected) in genesis_balances {
        let balance = client.get_balance(chain, config.fixture.expected_address(chain)).await?;
        if balance != expected {
            return Err(Error::Fatal(format!(
                "unexpected {chain}-chain genesis balance {balance} on {} (expected {expected})",
                host.uri
            )));
        }
        info!(host = %host.uri, %chain, balance, "genesis balance");
    }
    Ok(())
}

async fn send_to_fresh_address(
    host: &Host,
    config: &RunnerConfig,
    poller: &Poller,
    amount: u64,
) -> Result<()> {
    let client = &host.client;
    let to = client.create_address(Chain::X, &host.user).await?;
    let from = config.fixture.expected_x_address.clone();

    let request = SendRequest {
        user: host.user.clone(),
        from: vec![from.clone()],
        change_addr: from,
        to: to.clone(),
        amount,
        memo: String::new(),
    };
    let tx_id = client.send(&request).await?;
    info!(host = %host.uri, %to, amount, %tx_id, "issued transfer");

    let tx = tx_id.as_str();
    let want = Chain::X.final_status();
    let want = &want;
    let what = format!("transfer {tx_id} on {}", host.uri);
    poller
        .poll_until(&what, move || async move {
            Ok((&client.get_tx_status(Chain::X, tx).await? == want).then_some(()))
        })
        .await?;

    let to_ref = to.as_str();
    let received = poller
        .poll_until(&format!("balance of {to}"), move || async move {
            let balance = client.get_balance(Chain::X, to_ref).await?;
            Ok((balance >= amount).then_some(balance))
        })
        .await?;
    info!(host = %host.uri, %to, received, "transfer confirmed");
    Ok(())
}
