use std::time::Duration;

use ethrpc::{chains, evaluate, EthApi};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let servers: Vec<String> = match args.as_slice() {
        [single] if single.parse::<u64>().is_ok() => {
            let chain_id: u64 = single.parse()?;
            let info = chains::lookup(chain_id)
                .ok_or_else(|| anyhow::anyhow!("unknown chain id {chain_id}"))?;
            println!("[evaluate] chain={} ({})", info.name, info.chain_id);
            info.rpc.clone()
        }
        [] => {
            eprintln!("usage: evaluate <chain-id | url...>");
            std::process::exit(2);
        }
        urls => urls.to_vec(),
    };

    let cancel = CancellationToken::new();
    let pool = tokio::time::timeout(Duration::from_secs(10), evaluate(&cancel, &servers)).await??;

    println!(
        "[evaluate] {} of {} endpoints responded",
        pool.len(),
        servers.len()
    );
    for (rank, endpoint) in pool.endpoints().iter().enumerate() {
        println!(
            "  #{rank} {} latency={:?} block={}",
            endpoint.host().map(url::Url::as_str).unwrap_or("-"),
            endpoint.latency().unwrap_or_default(),
            endpoint.block().unwrap_or_default(),
        );
    }

    let block = pool.block_number().await?;
    println!("[evaluate] current height via best endpoint: {block}");
    Ok(())
}
