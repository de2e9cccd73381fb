use cswap_pool::{min_out_for, plain_quote, Chain, Trader};
use proptest::prelude::*;

struct Seeded {
    chain: Chain,
    trader: Trader,
}

fn seeded(reserve0: u64, reserve1: u64, funding: u64) -> Seeded {
    let mut chain = Chain::sample().unwrap();
    let lp = Trader::new("lp");
    let trader = Trader::new("trader");
    let (token0, token1) = (chain.token0(), chain.token1());
    chain.faucet(token0, lp.address(), reserve0).unwrap();
    chain.faucet(token1, lp.address(), reserve1).unwrap();
    chain.faucet(token0, trader.address(), funding).unwrap();
    lp.approve_pool(&mut chain, token0, 60).unwrap();
    lp.approve_pool(&mut chain, token1, 60).unwrap();
    trader.approve_pool(&mut chain, token0, 60).unwrap();
    let amount0 = chain.encrypt_input(reserve0, lp.address());
    let amount1 = chain.encrypt_input(reserve1, lp.address());
    chain.mint(lp.address(), &amount0, &amount1).unwrap();
    Seeded { chain, trader }
}

fn reserves(chain: &Chain, who: &Trader) -> (u64, u64) {
    (
        chain
            .decrypt(who.address(), chain.encrypted_reserve0())
            .unwrap(),
        chain
            .decrypt(who.address(), chain.encrypted_reserve1())
            .unwrap(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn divided_quote_with_any_tolerance_always_settles(
        reserve0 in 1u64..=1_000_000_000,
        reserve1 in 1u64..=1_000_000_000,
        amount_in in 1u64..=1_000_000,
        slippage_bps in 0u64..=10_000,
    ) {
        let Seeded { mut chain, trader } = seeded(reserve0, reserve1, amount_in);
        let token0 = chain.token0();
        let fill = trader
            .swap_exact_in(&mut chain, amount_in, token0, slippage_bps)
            .unwrap();

        let (numerator, denominator) = plain_quote(amount_in, reserve0, reserve1);
        prop_assert_eq!(fill.expected_out, numerator / denominator);
        prop_assert_eq!(fill.min_out, min_out_for(fill.expected_out, slippage_bps));
        prop_assert_eq!(
            chain.decrypt(trader.address(), fill.receipt.amount_out).unwrap(),
            fill.expected_out
        );
        prop_assert_eq!(
            chain.decrypt(trader.address(), fill.receipt.amount_in).unwrap(),
            amount_in
        );
    }

    #[test]
    fn settled_swaps_never_shrink_the_product(
        reserve0 in 1u64..=1_000_000_000,
        reserve1 in 1u64..=1_000_000_000,
        amount_in in 1u64..=1_000_000,
    ) {
        let Seeded { mut chain, trader } = seeded(reserve0, reserve1, amount_in);
        let token0 = chain.token0();
        trader.swap_exact_in(&mut chain, amount_in, token0, 0).unwrap();

        let (after0, after1) = reserves(&chain, &trader);
        prop_assert_eq!(after0, reserve0 + amount_in);
        prop_assert!(
            u128::from(after0) * u128::from(after1)
                >= u128::from(reserve0) * u128::from(reserve1)
        );
    }

    #[test]
    fn floors_above_the_quote_change_nothing(
        reserve0 in 1u64..=1_000_000_000,
        reserve1 in 1u64..=1_000_000_000,
        amount_in in 1u64..=1_000_000,
        excess in 1u64..=1_000,
    ) {
        let Seeded { mut chain, trader } = seeded(reserve0, reserve1, amount_in);
        let token0 = chain.token0();
        let token1 = chain.token1();
        let expected = trader.quote(&mut chain, amount_in, token0).unwrap();
        trader
            .swap_with_floor(&mut chain, amount_in, token0, expected, expected + excess)
            .unwrap();

        prop_assert_eq!(reserves(&chain, &trader), (reserve0, reserve1));
        prop_assert_eq!(trader.balance(&chain, token0).unwrap(), amount_in);
        prop_assert_eq!(trader.balance(&chain, token1).unwrap(), 0);
    }

    #[test]
    fn swaps_beyond_the_balance_move_nothing(
        reserve0 in 1u64..=1_000_000_000,
        reserve1 in 1u64..=1_000_000_000,
        funding in 0u64..=1_000_000,
        shortfall in 1u64..=1_000_000,
    ) {
        let Seeded { mut chain, trader } = seeded(reserve0, reserve1, funding);
        let (token0, token1) = (chain.token0(), chain.token1());
        trader
            .swap_exact_in(&mut chain, funding + shortfall, token0, 0)
            .unwrap();

        prop_assert_eq!(reserves(&chain, &trader), (reserve0, reserve1));
        prop_assert_eq!(trader.balance(&chain, token0).unwrap(), funding);
        prop_assert_eq!(trader.balance(&chain, token1).unwrap(), 0);
    }

    #[test]
    fn every_stored_handle_stays_readable_by_the_pool(
        rounds in proptest::collection::vec((1u64..=100_000, any::<bool>(), 0u64..=500), 1..6),
    ) {
        let Seeded { mut chain, trader } = seeded(50_000_000, 80_000_000, 1_000_000);
        let (token0, token1) = (chain.token0(), chain.token1());
        chain.faucet(token1, trader.address(), 1_000_000).unwrap();
        trader.approve_pool(&mut chain, token1, 60).unwrap();

        for (amount_in, zero_for_one, slippage_bps) in rounds {
            let asset = if zero_for_one { token0 } else { token1 };
            trader
                .swap_exact_in(&mut chain, amount_in, asset, slippage_bps)
                .unwrap();
            prop_assert!(chain.audit_state_grants().is_empty());
        }
        let owner = chain.owner();
        prop_assert!(chain.decrypt(owner, chain.encrypted_reserve0()).is_ok());
        prop_assert!(chain
            .decrypt(cswap_fhe::Address::derive("outsider"), chain.encrypted_reserve0())
            .is_err());
    }
}
