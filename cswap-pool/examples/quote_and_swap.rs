use cswap_pool::{Chain, PoolResult, Trader};

fn main() -> PoolResult<()> {
    let mut chain = Chain::sample()?;
    let lp = Trader::new("lp");
    let alice = Trader::new("alice");
    let (token0, token1) = (chain.token0(), chain.token1());

    chain.faucet(token0, lp.address(), 1_000_000_000)?;
    chain.faucet(token1, lp.address(), 300_000_000)?;
    chain.faucet(token0, alice.address(), 10_000_000)?;
    lp.approve_pool(&mut chain, token0, 600)?;
    lp.approve_pool(&mut chain, token1, 600)?;
    alice.approve_pool(&mut chain, token0, 600)?;

    let amount0 = chain.encrypt_input(1_000_000_000, lp.address());
    let amount1 = chain.encrypt_input(300_000_000, lp.address());
    chain.mint(lp.address(), &amount0, &amount1)?;

    let fill = alice.swap_exact_in(&mut chain, 10_000_000, token0, 100)?;
    println!(
        "expected {} (floor {}), received {}",
        fill.expected_out,
        fill.min_out,
        chain.decrypt(alice.address(), fill.receipt.amount_out)?
    );
    println!(
        "reserves now {} / {}",
        chain.decrypt(alice.address(), chain.encrypted_reserve0())?,
        chain.decrypt(alice.address(), chain.encrypted_reserve1())?
    );
    Ok(())
}
