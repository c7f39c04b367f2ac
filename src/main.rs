//! Boost Account Simulation.
//!
//! Drives a single credit account through the full lifecycle: deposits, spending,
//! a market drop, a repayment and, if the numbers call for it, a liquidation.
//! Prices come from a fixed table so every run is reproducible.

use boost_core::*;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boost_core=info,boost_sim=info".into()),
        )
        .init();

    let params = load_params()?;
    tracing::info!(assets = params.assets.len(), "risk parameters loaded");

    println!("Boost Account Simulation\n");

    let oracle = StaticPriceOracle::new("fixed-table")
        .with_price(Asset::btc(), dec!(60000))
        .with_price(Asset::eth(), dec!(3000))
        .with_price(Asset::matic(), dec!(0.70))
        .with_price(Asset::usdc(), dec!(1));

    let config = EngineConfig {
        label: "User123".to_string(),
        ..Default::default()
    };
    let mut account = CreditAccount::with_config(config, params, oracle)?;

    step_1_add_collateral(&mut account)?;
    step_2_spend(&mut account);
    step_3_status(&mut account);
    step_4_price_drop(&mut account);
    step_5_repay(&mut account);
    step_6_liquidation(&mut account);

    println!("\nEnd of simulation. {} events recorded.", account.events().len());
    Ok(())
}

// BOOST_RISK_CONFIG points at a JSON risk regime; otherwise the default preset
fn load_params() -> Result<RiskParameters, Box<dyn std::error::Error>> {
    match std::env::var("BOOST_RISK_CONFIG") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)?;
            tracing::info!(%path, "loading risk parameters");
            Ok(RiskParameters::from_json(&json)?)
        }
        Err(_) => Ok(RiskParameters::default()),
    }
}

fn step_1_add_collateral(account: &mut CreditAccount<StaticPriceOracle>) -> Result<(), EngineError> {
    println!("Step 1: Add Collateral\n");

    account.add_collateral(&Asset::btc(), dec!(0.05))?;
    account.add_collateral(&Asset::eth(), dec!(1.0))?;
    account.add_collateral(&Asset::matic(), dec!(1500))?;
    account.add_collateral(&Asset::usdc(), dec!(300))?;

    if let Err(e) = account.add_collateral(&Asset::new("DOGE"), dec!(1000)) {
        println!("  DOGE deposit rejected: {}", e);
    }

    print_status(account);
    Ok(())
}

fn step_2_spend(account: &mut CreditAccount<StaticPriceOracle>) {
    println!("Step 2: Spend Using Credit\n");

    for amount in [dec!(800), dec!(400), dec!(10_000)] {
        match account.spend(amount) {
            Ok(state) => println!(
                "  Spent ${}: utilized ${}, available ${}, LTV {}",
                amount,
                state.utilized_credit_usd,
                state.available_credit_usd,
                percent(state.current_ltv)
            ),
            Err(e) => println!("  Spend of ${} failed: {}", amount, e),
        }
    }
    println!();
}

fn step_3_status(account: &mut CreditAccount<StaticPriceOracle>) {
    println!("Step 3: Status After Spending\n");
    account.revalue();
    print_status(account);
}

fn step_4_price_drop(account: &mut CreditAccount<StaticPriceOracle>) {
    println!("Step 4: Market Price Drop\n");

    for (asset, factor) in [
        (Asset::btc(), dec!(0.75)),
        (Asset::eth(), dec!(0.70)),
        (Asset::matic(), dec!(0.65)),
    ] {
        let dropped = account.prices().get(&asset) * factor;
        account.set_price(asset.clone(), dropped);
        println!("  {} now ${}", asset, dropped);
    }
    println!();

    account.reprice();
    print_status(account);
}

fn step_5_repay(account: &mut CreditAccount<StaticPriceOracle>) {
    println!("Step 5: Repay Some Credit\n");

    // the oracle still serves pre-drop prices; keep it in line with the simulated market
    for asset in [Asset::btc(), Asset::eth(), Asset::matic()] {
        let price = account.prices().get(&asset);
        account.oracle_mut().set_price(asset, price);
    }

    match account.repay(dec!(200)) {
        RepayOutcome::Repaid { amount, remaining } => {
            println!("  Repaid ${}, remaining debt ${}\n", amount, remaining)
        }
        RepayOutcome::NothingToRepay => println!("  Nothing to repay\n"),
    }
    print_status(account);
}

fn step_6_liquidation(account: &mut CreditAccount<StaticPriceOracle>) {
    println!("Step 6: Check and Potentially Liquidate\n");

    match account.liquidate_if_critical() {
        Some(result) => {
            for sell in &result.plan.sells {
                println!("  Sold {} {} for ${}", sell.quantity, sell.asset, sell.value);
            }
            println!(
                "  Liquidated ${}, remaining debt ${}\n",
                result.liquidated_value().round_dp(2),
                result.debt_after.round_dp(2)
            );
            print_status(account);
        }
        None => println!("  Liquidation threshold not reached ({}).", account.health()),
    }
}

fn print_status(account: &CreditAccount<StaticPriceOracle>) {
    let status = account.status();

    for row in &status.valuation.per_asset {
        println!(
            "  {} {} @ ${} = ${} (LTV {}, credit ${})",
            row.amount,
            row.asset,
            row.price,
            row.value.round_dp(2),
            percent(row.ltv_ratio),
            row.credit_contribution.round_dp(2)
        );
    }
    println!("  Total collateral: ${}", status.state.total_collateral_value_usd.round_dp(2));
    println!("  Max credit line: ${}", status.state.max_credit_line_usd.round_dp(2));
    println!("  Utilized credit: ${}", status.state.utilized_credit_usd.round_dp(2));
    println!("  Available credit: ${}", status.state.available_credit_usd.round_dp(2));
    println!("  LTV: {}, health: {}\n", percent(status.state.current_ltv), status.health);
}

fn percent(ratio: rust_decimal::Decimal) -> String {
    format!("{}%", (ratio * dec!(100)).round_dp(2))
}
