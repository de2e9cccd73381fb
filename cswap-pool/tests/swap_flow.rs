use cswap_fhe::{Address, FheError, Handle};
use cswap_pool::{
    Chain, ErrorClass, PoolError, ReservePair, SwapRequest, Trader,
};
use cswap_token::TokenError;
use pretty_assertions::assert_eq;

const SEED0: u64 = 1_000_000_000;
const SEED1: u64 = 300_000_000;
const SWAP_IN: u64 = 10_000_000;
const EXPECTED_OUT: u64 = 2_961_474;
const TTL: u64 = 3_600;

struct World {
    chain: Chain,
    lp: Trader,
    alice: Trader,
}

impl World {
    fn token0(&self) -> Address {
        self.chain.token0()
    }

    fn token1(&self) -> Address {
        self.chain.token1()
    }

    fn reserves_for(&self, who: &Trader) -> (u64, u64) {
        (
            self.chain
                .decrypt(who.address(), self.chain.encrypted_reserve0())
                .unwrap(),
            self.chain
                .decrypt(who.address(), self.chain.encrypted_reserve1())
                .unwrap(),
        )
    }

    fn balances(&self, who: &Trader) -> (u64, u64) {
        (
            who.balance(&self.chain, self.token0()).unwrap(),
            who.balance(&self.chain, self.token1()).unwrap(),
        )
    }
}

fn fund(chain: &mut Chain, who: &Trader, token: Address, amount: u64) {
    chain.faucet(token, who.address(), amount).unwrap();
    who.approve_pool(chain, token, TTL).unwrap();
}

fn unseeded() -> World {
    let mut chain = Chain::sample().unwrap();
    let lp = Trader::new("lp");
    let alice = Trader::new("alice");
    let (token0, token1) = (chain.token0(), chain.token1());
    fund(&mut chain, &lp, token0, SEED0);
    fund(&mut chain, &lp, token1, SEED1);
    fund(&mut chain, &alice, token0, 100_000_000);
    World { chain, lp, alice }
}

fn seeded() -> World {
    let mut world = unseeded();
    let lp = world.lp.address();
    let amount0 = world.chain.encrypt_input(SEED0, lp);
    let amount1 = world.chain.encrypt_input(SEED1, lp);
    world.chain.mint(lp, &amount0, &amount1).unwrap();
    world
}

#[test]
fn mint_seeds_reserves_from_confirmed_deposits() {
    let world = seeded();
    assert_eq!(world.reserves_for(&world.lp), (SEED0, SEED1));
    assert_eq!(world.balances(&world.lp), (0, 0));
    assert!(world
        .chain
        .decrypt(world.alice.address(), world.chain.encrypted_reserve0())
        .is_err());
}

#[test]
fn second_mint_adds_exactly_the_deposit() {
    let mut world = seeded();
    let (token0, token1) = (world.token0(), world.token1());
    fund(&mut world.chain, &world.lp, token0, 5);
    fund(&mut world.chain, &world.lp, token1, 7);
    let lp = world.lp.address();
    let amount0 = world.chain.encrypt_input(5, lp);
    let amount1 = world.chain.encrypt_input(7, lp);
    world.chain.mint(lp, &amount0, &amount1).unwrap();
    assert_eq!(world.reserves_for(&world.lp), (SEED0 + 5, SEED1 + 7));
}

#[test]
fn mint_deposit_is_clamped_to_the_depositor_balance() {
    let mut world = seeded();
    let lp = world.lp.address();
    let amount0 = world.chain.encrypt_input(1, lp);
    let amount1 = world.chain.encrypt_input(1, lp);
    world.chain.mint(lp, &amount0, &amount1).unwrap();
    assert_eq!(world.reserves_for(&world.lp), (SEED0, SEED1));
}

#[test]
fn quoted_swap_with_one_percent_tolerance_settles() {
    let mut world = seeded();
    let token0 = world.token0();
    let fill = world
        .alice
        .swap_exact_in(&mut world.chain, SWAP_IN, token0, 100)
        .unwrap();

    assert_eq!(fill.expected_out, EXPECTED_OUT);
    assert_eq!(fill.min_out, 2_931_859);
    let alice = world.alice.address();
    assert_eq!(world.chain.decrypt(alice, fill.receipt.amount_in).unwrap(), SWAP_IN);
    assert_eq!(world.chain.decrypt(alice, fill.receipt.amount_out).unwrap(), EXPECTED_OUT);
    assert_eq!(
        world.reserves_for(&world.alice),
        (SEED0 + SWAP_IN, SEED1 - EXPECTED_OUT)
    );
    let owner = world.chain.owner();
    assert_eq!(
        world.chain.decrypt(owner, world.chain.encrypted_reserve1()).unwrap(),
        SEED1 - EXPECTED_OUT
    );
    assert_eq!(world.balances(&world.alice), (90_000_000, EXPECTED_OUT));
    assert!(world.chain.audit_state_grants().is_empty());
}

#[test]
fn swap_in_the_other_direction_credits_reserve1() {
    let mut world = seeded();
    let token1 = world.token1();
    let bob = Trader::new("bob");
    fund(&mut world.chain, &bob, token1, 3_000_000);
    let fill = bob
        .swap_exact_in(&mut world.chain, 3_000_000, token1, 50)
        .unwrap();
    let (reserve0, reserve1) = world.reserves_for(&bob);
    assert_eq!(reserve1, SEED1 + 3_000_000);
    assert_eq!(reserve0, SEED0 - fill.expected_out);
    assert_eq!(world.balances(&bob), (fill.expected_out, 0));
}

#[test]
fn floor_above_expected_is_a_zero_effect_success() {
    let mut world = seeded();
    let token0 = world.token0();
    let reserves_before = world.reserves_for(&world.lp);
    let balances_before = world.balances(&world.alice);

    let expected = world.alice.quote(&mut world.chain, SWAP_IN, token0).unwrap();
    let receipt = world
        .alice
        .swap_with_floor(&mut world.chain, SWAP_IN, token0, expected, expected + 1)
        .unwrap();

    let alice = world.alice.address();
    assert_eq!(world.chain.decrypt(alice, receipt.amount_in).unwrap(), 0);
    assert_eq!(world.chain.decrypt(alice, receipt.amount_out).unwrap(), 0);
    assert_eq!(world.reserves_for(&world.alice), reserves_before);
    assert_eq!(world.balances(&world.alice), balances_before);
    assert_eq!(world.chain.telemetry().peek().counter("pool.swap"), 1);
}

#[test]
fn quote_for_unknown_asset_is_rejected_without_mutation() {
    let mut world = seeded();
    let alice = world.alice.address();
    let stranger = Address::derive("token:cBTC");
    let amount = world.chain.encrypt_input(SWAP_IN, alice);
    let handles_before = world.chain.fhe().handle_count();

    let err = world
        .chain
        .get_amount_out(alice, &amount, stranger)
        .unwrap_err();
    assert_eq!(err, PoolError::InvalidToken(stranger));
    assert_eq!(err.class(), ErrorClass::Structural);
    assert_eq!(world.chain.fhe().handle_count(), handles_before);
    assert_eq!(
        world.chain.encrypted_numerator(alice),
        Err(PoolError::NoQuote(alice))
    );
}

#[test]
fn quotes_are_kept_apart_per_caller() {
    let mut world = seeded();
    let (token0, token1) = (world.token0(), world.token1());
    let bob = Trader::new("bob");
    let alice_expected = world.alice.quote(&mut world.chain, SWAP_IN, token0).unwrap();
    bob.quote(&mut world.chain, 1_000, token1).unwrap();

    let alice = world.alice.address();
    let numerator = world.chain.encrypted_numerator(alice).unwrap();
    let denominator = world.chain.encrypted_denominator(alice).unwrap();
    let numerator = world.chain.decrypt(alice, numerator).unwrap();
    let denominator = world.chain.decrypt(alice, denominator).unwrap();
    assert_eq!(numerator / denominator, alice_expected);
    let alice_numerator = world.chain.encrypted_numerator(alice).unwrap();
    assert!(world.chain.decrypt(bob.address(), alice_numerator).is_err());
}

#[test]
fn swap_before_any_mint_is_structural() {
    let mut world = unseeded();
    let token0 = world.token0();
    let err = world
        .alice
        .swap_with_floor(&mut world.chain, SWAP_IN, token0, 1, 0)
        .unwrap_err();
    assert_eq!(err, PoolError::UninitializedReserve);
    assert_eq!(world.chain.encrypted_reserve0(), Handle::UNSET);
}

#[test]
fn proof_for_another_user_aborts_the_swap() {
    let mut world = seeded();
    let token0 = world.token0();
    let alice = world.alice.address();
    let reserves_before = ReservePair {
        reserve0: world.chain.encrypted_reserve0(),
        reserve1: world.chain.encrypted_reserve1(),
    };
    let request = SwapRequest {
        amount_in: world.chain.encrypt_input(SWAP_IN, Address::derive("mallory")),
        expected_amount_out: world.chain.encrypt_input(EXPECTED_OUT, alice),
        min_amount_out: world.chain.encrypt_input(0, alice),
        asset_in: token0,
        recipient: alice,
    };
    let err = world.chain.swap(alice, &request).unwrap_err();
    assert!(matches!(err, PoolError::Fhe(FheError::InvalidProof(_))));
    assert_eq!(err.class(), ErrorClass::ProofVerification);
    assert_eq!(world.chain.pool().reserves(), reserves_before);
    assert_eq!(world.balances(&world.alice), (100_000_000, 0));
    assert_eq!(world.chain.fhe().acl().transient_len(), 0);
}

#[test]
fn expired_operator_aborts_the_swap() {
    let mut world = seeded();
    let token0 = world.token0();
    let expected = world.alice.quote(&mut world.chain, SWAP_IN, token0).unwrap();
    world.chain.advance_time(TTL + 1);

    let err = world
        .alice
        .swap_with_floor(&mut world.chain, SWAP_IN, token0, expected, 0)
        .unwrap_err();
    assert!(matches!(
        err,
        PoolError::Token(TokenError::OperatorExpired { .. })
    ));
    assert_eq!(err.class(), ErrorClass::AuthorizationExpiry);
    assert_eq!(world.reserves_for(&world.lp), (SEED0, SEED1));
    assert_eq!(world.balances(&world.alice), (100_000_000, 0));

    world.alice.approve_pool(&mut world.chain, token0, TTL).unwrap();
    world
        .alice
        .swap_with_floor(&mut world.chain, SWAP_IN, token0, expected, 0)
        .unwrap();
    assert_eq!(world.balances(&world.alice), (90_000_000, expected));
}

#[test]
fn operator_approval_is_valid_through_its_last_second() {
    let mut world = seeded();
    let token0 = world.token0();
    world.chain.advance_time(TTL);
    world
        .alice
        .swap_with_floor(&mut world.chain, 1_000, token0, 0, 0)
        .unwrap();
}

#[test]
fn unfunded_trader_receives_nothing() {
    let mut world = seeded();
    let token0 = world.token0();
    let carol = Trader::new("carol");
    carol.approve_pool(&mut world.chain, token0, TTL).unwrap();
    for _ in 0..5 {
        let receipt = carol
            .swap_with_floor(&mut world.chain, 100_000_000, token0, EXPECTED_OUT, 0)
            .unwrap();
        let carol_addr = carol.address();
        assert_eq!(world.chain.decrypt(carol_addr, receipt.amount_in).unwrap(), 0);
        assert_eq!(world.chain.decrypt(carol_addr, receipt.amount_out).unwrap(), 0);
    }
    assert_eq!(world.reserves_for(&carol), (SEED0, SEED1));
    assert_eq!(world.balances(&carol), (0, 0));
}

#[test]
fn partially_funded_trader_receives_nothing() {
    let mut world = seeded();
    let token0 = world.token0();
    let dave = Trader::new("dave");
    fund(&mut world.chain, &dave, token0, SWAP_IN - 1);
    let receipt = dave
        .swap_with_floor(&mut world.chain, SWAP_IN, token0, EXPECTED_OUT, 0)
        .unwrap();
    assert_eq!(world.chain.decrypt(dave.address(), receipt.amount_out).unwrap(), 0);
    assert_eq!(world.reserves_for(&dave), (SEED0, SEED1));
    assert_eq!(world.balances(&dave), (SWAP_IN - 1, 0));
}

#[test]
fn owner_reads_reserves_right_after_a_mint() {
    let world = seeded();
    let owner = world.chain.owner();
    let reserve0 = world.chain.encrypted_reserve0();
    let reserve1 = world.chain.encrypted_reserve1();
    assert_eq!(world.chain.decrypt(owner, reserve0).unwrap(), SEED0);
    assert_eq!(world.chain.decrypt(owner, reserve1).unwrap(), SEED1);
}

#[test]
fn telemetry_counts_commits_and_aborts() {
    let mut world = seeded();
    let token0 = world.token0();
    world.chain.telemetry().flush();
    world
        .alice
        .swap_exact_in(&mut world.chain, SWAP_IN, token0, 100)
        .unwrap();
    let alice = world.alice.address();
    let amount = world.chain.encrypt_input(1, alice);
    world
        .chain
        .get_amount_out(alice, &amount, Address::ZERO)
        .unwrap_err();

    let snapshot = world.chain.telemetry().flush();
    assert_eq!(snapshot.counter("pool.quote"), 1);
    assert_eq!(snapshot.counter("pool.swap"), 1);
    assert_eq!(snapshot.counter("pool.abort"), 1);
    assert_eq!(snapshot.counter("pool.mint"), 0);
}
