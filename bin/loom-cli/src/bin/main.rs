//! Operator CLI for the LOOM transfer gateway and DPoS staking.

use action::{
    amount::{format_coin_amount, parse_coin_amount},
    claim::ClaimRewardsAction,
    deposit::DepositAction,
    dpos::{DelegateAction, RedelegateAction, UndelegateAction},
    mapping::MapAccountsAction,
    withdraw::SidechainWithdrawal,
    Action,
};
use alloy_primitives::U256;
use balance::{monitor::BalanceMonitor, BalanceQuery};
use clap::{Parser, Subcommand};
use dappchain::{types::LockTimeTier, Dpos, GatewayContract, TransferGateway};
use loom_cli::{
    cancel_on_interrupt, coin_balances, config::Config, output, parse_tier, session::Session,
    withdrawal_poller, write_key,
};
use tokio::sync::watch;
use tracing::{error, info};
use withdrawal::{WithdrawalPoller, WithdrawalRequest};

#[derive(Parser)]
#[command(name = "loom-cli")]
#[command(version, about = "LOOM transfer gateway and DPoS operator tool")]
struct Cli {
    /// Path to the configuration file (TOML, or JSON by extension)
    #[arg(short, long, default_value = "loom.toml", global = true)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Display the account's LOOM balances on both chains
    CoinBalance {
        /// Only query mainnet
        #[arg(long)]
        eth: bool,

        /// Account to query instead of the operator's; "gateway" for the mainnet gateway
        #[arg(short, long)]
        account: Option<String>,
    },

    /// Deposit LOOM into the mainnet transfer gateway
    Deposit {
        #[arg(value_parser = parse_coin_amount)]
        amount: U256,
    },

    /// Withdraw LOOM from the DAppChain to mainnet
    Withdraw {
        #[arg(value_parser = parse_coin_amount)]
        amount: U256,

        /// Seconds to wait for the oracle signature (0 waits forever)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Finish a withdrawal from its pending receipt
    ResumeWithdrawal {
        /// Seconds to wait for the oracle signature (0 waits forever)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Show the currently pending withdrawal receipt
    Receipt,

    /// Show the operator's mainnet and DAppChain addresses
    Accounts,

    /// Map the operator's DAppChain account to their mainnet account
    MapAccounts,

    /// Show the current DPoS validators
    ListValidators,

    /// Show the current DPoS candidates with their metadata
    ListCandidates,

    /// Show the delegations of every validator
    ListAllDelegations,

    /// Show the delegations of one validator
    ListDelegations { validator: String },

    /// Show the operator's delegations to all validators
    MyDelegations,

    /// Show the time until the next validator election
    TimeUntilElections,

    /// Show the delegations from a delegator to a validator
    CheckDelegations {
        #[arg(short, long)]
        validator: String,

        #[arg(short, long)]
        delegator: String,
    },

    /// Show the operator's unclaimed rewards
    CheckRewards,

    /// Claim the operator's delegation rewards
    ClaimRewards,

    /// Delegate LOOM to a validator
    Delegate {
        #[arg(value_parser = parse_coin_amount)]
        amount: U256,
        validator: String,
        /// Lock-time tier: 0 = 2 weeks, 1 = 3 months, 2 = 6 months, 3 = 1 year
        #[arg(value_parser = parse_tier)]
        tier: LockTimeTier,
        referrer: Option<String>,
    },

    /// Move a delegation to another validator
    Redelegate {
        #[arg(value_parser = parse_coin_amount)]
        amount: U256,
        former_validator: String,
        validator: String,
        index: u64,
    },

    /// Unbond a delegation
    Undelegate {
        #[arg(value_parser = parse_coin_amount)]
        amount: U256,
        validator: String,
        index: u64,
    },

    /// Resolve a DAppChain contract address by name
    Resolve { contract_name: String },

    /// Write a fresh private key to <prefix>_private_key
    GenKey { prefix: String },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Key generation needs neither a config file nor a network.
    if let Command::GenKey { prefix } = &cli.command {
        return gen_key(prefix);
    }

    let config = Config::from_file(&cli.config)?;
    let session = Session::load(config)?;

    if let Err(e) = run(cli.command, &session).await {
        error!("{e:#}");
        std::process::exit(1);
    }

    Ok(())
}

fn gen_key(prefix: &str) -> eyre::Result<()> {
    let (path, address) = write_key(".", prefix)?;
    println!("Wrote key for {address} to {}", path.display());
    Ok(())
}

/// Exit status of a process killed by SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Ctrl-C stops polling; a second Ctrl-C exits even mid-transaction.
fn cancel_on_ctrl_c() -> watch::Receiver<bool> {
    cancel_on_interrupt(
        || async { tokio::signal::ctrl_c().await.is_ok() },
        || std::process::exit(INTERRUPTED_EXIT_CODE),
    )
}

async fn run(command: Command, session: &Session) -> eyre::Result<()> {
    match command {
        Command::CoinBalance { eth, account } => {
            let network = session.network();
            let (mainnet_holder, sidechain_holder) = match account.as_deref() {
                None => (session.mainnet_address(), session.sidechain_address()),
                Some("gateway") => (
                    network.ethereum.gateway,
                    session.rpc().resolve(GatewayContract::NAME).await?,
                ),
                Some(other) => {
                    let holder = session.sidechain(other)?;
                    (holder.local, holder)
                }
            };

            let provider = session.provider().await?;
            let coin = if eth { None } else { Some(session.coin().await?) };
            let monitor = BalanceMonitor::new(provider, coin);

            let mainnet_query = BalanceQuery::ERC20Balance {
                token: network.ethereum.token,
                holder: mainnet_holder,
            };
            let sidechain_query = (!eth).then(|| BalanceQuery::CoinBalance {
                holder: sidechain_holder,
            });

            let (mainnet, sidechain) =
                coin_balances(&monitor, mainnet_query, sidechain_query).await?;
            if let Some(sidechain) = sidechain {
                println!("DAppChain: {}", format_coin_amount(sidechain.amount));
            }
            println!("Mainnet: {}", format_coin_amount(mainnet.amount));
        }

        Command::Deposit { amount } => {
            let mut mapping = MapAccountsAction::new(
                session.mapper().await?,
                session.eth_signer(),
                session.sidechain_address(),
            );
            let mut deposit = DepositAction::new(session.ethereum_gateway()?, amount);

            let result = loom_cli::deposit(&mut mapping, &mut deposit).await?;
            println!(
                "{} tokens deposited to Ethereum Gateway.",
                format_coin_amount(amount)
            );
            println!("Mainnet tx hash: {}", result.tx_hash);
        }

        Command::Withdraw { amount, timeout } => {
            withdraw(session, WithdrawalRequest::Withdraw(amount), timeout).await?;
        }

        Command::ResumeWithdrawal { timeout } => {
            withdraw(session, WithdrawalRequest::Resume, timeout).await?;
        }

        Command::Receipt => {
            let gateway = session.gateway().await?;
            match gateway
                .withdrawal_receipt(&session.sidechain_address())
                .await?
            {
                Some(receipt) => {
                    let ethereum = session.ethereum_gateway()?;
                    let nonce = ethereum.nonce().await?;
                    print!(
                        "{}",
                        output::receipt(
                            &receipt,
                            nonce,
                            ethereum.token(),
                            session.network().ethereum.gateway
                        )
                    );
                }
                None => println!("No pending receipt"),
            }
        }

        Command::Accounts => {
            println!("Mainnet: {}", session.mainnet_address());
            println!("DAppChain: {}", session.sidechain_address());
        }

        Command::MapAccounts => {
            let mut mapping = MapAccountsAction::new(
                session.mapper().await?,
                session.eth_signer(),
                session.sidechain_address(),
            );
            match mapping.ensure_mapped().await? {
                Some(result) => println!("{}\ntx hash: {}", mapping.description(), result.tx_hash),
                None => println!("{} is already mapped", session.sidechain_address()),
            }
        }

        Command::ListValidators => {
            let validators = session.dpos().await?.validators().await?;
            print!("{}", output::validators(&validators));
        }

        Command::ListCandidates => {
            let candidates = session.dpos().await?.candidates().await?;
            print!("{}", output::candidates(&candidates));
        }

        Command::ListAllDelegations => {
            let delegations = session.dpos().await?.all_delegations().await?;
            print!("{}", output::all_delegations(&delegations));
        }

        Command::ListDelegations { validator } => {
            let validator = session.sidechain(&validator)?;
            let delegations = session
                .dpos()
                .await?
                .validator_delegations(&validator)
                .await?;
            println!("Delegations of {validator}:");
            print!("{}", output::validator_delegations(&delegations));
        }

        Command::MyDelegations => {
            let delegations = session
                .dpos()
                .await?
                .delegator_delegations(&session.sidechain_address())
                .await?;
            print!("{}", output::delegator_delegations(&delegations));
        }

        Command::TimeUntilElections => {
            let seconds = session.dpos().await?.time_until_election().await?;
            println!("{seconds} seconds until the next election");
        }

        Command::CheckDelegations {
            validator,
            delegator,
        } => {
            let validator = session.sidechain(&validator)?;
            let delegator = session.sidechain(&delegator)?;
            let delegations = session
                .dpos()
                .await?
                .check_delegation(&validator, &delegator)
                .await?;
            println!("Delegated from {delegator} to {validator}");
            print!("{}", output::delegator_delegations(&delegations));
        }

        Command::CheckRewards => {
            let delegations = session
                .dpos()
                .await?
                .delegator_delegations(&session.sidechain_address())
                .await?;
            println!(
                "Unclaimed rewards: {}",
                format_coin_amount(delegations.unclaimed_rewards())
            );
        }

        Command::ClaimRewards => {
            let mut claim = ClaimRewardsAction::new(session.dpos().await?);
            let result = claim.execute().await?;
            println!(
                "Claimed {} LOOM, tx hash: {}",
                format_coin_amount(claim.claimed().unwrap_or_default()),
                result.tx_hash
            );
        }

        Command::Delegate {
            amount,
            validator,
            tier,
            referrer,
        } => {
            let mut delegate = DelegateAction::new(
                session.dpos().await?,
                session.coin().await?,
                session.sidechain(&validator)?,
                amount,
                tier,
                referrer,
            );
            let result = delegate.execute().await?;
            println!("{}\ntx hash: {}", delegate.description(), result.tx_hash);
        }

        Command::Redelegate {
            amount,
            former_validator,
            validator,
            index,
        } => {
            let mut redelegate = RedelegateAction::new(
                session.dpos().await?,
                session.sidechain(&former_validator)?,
                session.sidechain(&validator)?,
                amount,
                index,
            );
            let result = redelegate.execute().await?;
            println!("{}\ntx hash: {}", redelegate.description(), result.tx_hash);
        }

        Command::Undelegate {
            amount,
            validator,
            index,
        } => {
            let mut undelegate = UndelegateAction::new(
                session.dpos().await?,
                session.sidechain(&validator)?,
                amount,
                index,
            );
            let result = undelegate.execute().await?;
            println!("{}\ntx hash: {}", undelegate.description(), result.tx_hash);
        }

        Command::Resolve { contract_name } => {
            let address = session.rpc().resolve(&contract_name).await?;
            println!("{contract_name}: {address}");
        }

        Command::GenKey { prefix } => gen_key(&prefix)?,
    }

    Ok(())
}

async fn withdraw(
    session: &Session,
    request: WithdrawalRequest,
    timeout: Option<u64>,
) -> eyre::Result<()> {
    let ethereum = session.ethereum_gateway()?;
    let sidechain = SidechainWithdrawal::new(
        session.gateway().await?,
        session.coin().await?,
        session.sidechain_address(),
        session.mainnet_address(),
        ethereum.token(),
    );

    let config = session.config();
    let poller = withdrawal_poller(
        WithdrawalPoller::new(sidechain, ethereum),
        config.poll_interval(),
        config.withdrawal_timeout(timeout),
        cancel_on_ctrl_c(),
    );

    info!(?request, "Running withdrawal");
    let outcome = poller.run(request).await?;
    println!("{}", output::withdrawal_outcome(&outcome));

    Ok(())
}
