#![cfg(not(target_arch = "wasm32"))]

#[cfg(test)]
mod tests {
    use planet_engine::conservation::{check_invariants, check_transition, ship_balance, SHIP_TOLERANCE};
    use planet_engine::core_economy;
    use planet_engine::{adapter, count_arrival, peek, receive_spaceships, send};
    use planet_engine::{EconomyError, GameConfig, PlanetEconomyState};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const MAX: f64 = 259_200.0;
    const DAY: f64 = 86_400.0;

    fn fresh() -> PlanetEconomyState {
        GameConfig::default().genesis(0.0, 0.0)
    }

    fn assert_close(actual: f64, expected: f64, what: &str) {
        let tol = 1e-6 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tol,
            "{what}: expected {expected}, got {actual}"
        );
    }

    // ========== End-to-end scenarios ==========

    #[test]
    fn test_fresh_planet_saturates_at_cap() {
        let mut s = fresh();
        let mut last = s.num_spaceships;
        for day in 0..10 {
            s = peek(&s, DAY).expect("advance");
            assert!(s.num_spaceships >= last, "day {day}: dropped to {}", s.num_spaceships);
            assert!(s.num_spaceships <= MAX, "day {day}: overshot to {}", s.num_spaceships);
            last = s.num_spaceships;
        }
        assert_close(s.num_spaceships, MAX, "saturated count");
        assert_close(s.last_update, 10.0 * DAY, "clock");
    }

    #[test]
    fn test_full_departure_recovers() {
        let s = peek(&fresh(), 2.0 * DAY).expect("advance");
        let mut s = send(&s, DAY, MAX).expect("send");
        assert_eq!(s.num_spaceships, 0.0);
        assert_close(s.external_upkeep, MAX, "upkeep after send");
        assert_eq!(s.external_upkeep_duration, DAY);

        let depart_time = s.last_update;
        let mut last = s.num_spaceships;
        for _ in 0..8 {
            s = peek(&s, DAY / 2.0).expect("advance");
            assert!(s.num_spaceships >= last);
            last = s.num_spaceships;
            if s.last_update - depart_time >= DAY {
                assert_eq!(s.external_upkeep, 0.0, "debt outlived its window");
                assert_eq!(s.external_upkeep_duration, 0.0);
            }
        }
        assert_close(s.num_spaceships, MAX, "recovered count");
    }

    #[test]
    fn test_full_departure_half_day_steps() {
        let s = peek(&fresh(), 2.0 * DAY).expect("advance");
        let s = send(&s, DAY, MAX).expect("send");

        // first half day: the debt eats the whole capacity budget
        let s = peek(&s, DAY / 2.0).expect("advance");
        assert_eq!(s.num_spaceships, 0.0);
        assert_close(s.external_upkeep, MAX - 4320.0, "upkeep");
        assert_close(s.external_upkeep_duration, DAY / 2.0, "duration");

        // second half day: 93_312_000 of 11_197_440_000 capacity is free
        let s = peek(&s, DAY / 2.0).expect("advance");
        assert_close(s.num_spaceships, 360.0, "ships");
        assert_eq!(s.external_upkeep, 0.0);
    }

    #[test]
    fn test_split_departure_tracks_single_departure() {
        let base = peek(&fresh(), 2.0 * DAY).expect("advance");

        let mut single = send(&base, DAY, MAX).expect("single send");
        let split = send(&base, DAY, MAX / 2.0).expect("first half");
        let mut split = send(&split, 0.0, MAX / 2.0).expect("second half");

        assert_close(split.external_upkeep, single.external_upkeep, "merged upkeep");
        assert_close(split.external_upkeep_duration, single.external_upkeep_duration, "merged duration");

        for step in 0..8 {
            single = peek(&single, DAY / 2.0).expect("advance single");
            split = peek(&split, DAY / 2.0).expect("advance split");
            assert!(
                (single.num_spaceships - split.num_spaceships).abs() < 1.0,
                "step {step}: {} vs {}",
                single.num_spaceships,
                split.num_spaceships
            );
            assert!((single.external_upkeep - split.external_upkeep).abs() < 1.0);
        }
    }

    #[test]
    fn test_staggered_departure_stays_bounded() {
        let base = peek(&fresh(), 3.0 * DAY).expect("advance");
        let first = send(&base, 0.0, MAX / 2.0).expect("first");
        let second = send(&first, 3600.0, MAX / 2.0).expect("second");

        assert!(second.external_upkeep > 0.0);
        assert!(second.external_upkeep_duration <= DAY);
        assert!(check_invariants(&second).is_ok());

        let mut s = second;
        for _ in 0..4 {
            s = peek(&s, DAY / 2.0).expect("advance");
            check_invariants(&s).expect("invariants");
        }
        assert_eq!(s.external_upkeep, 0.0);
    }

    #[test]
    fn test_oversized_departure_rejected() {
        let s = peek(&fresh(), 3600.0).expect("advance");
        let err = send(&s, 0.0, 10_000.0).expect_err("should fail");
        assert!(matches!(err, EconomyError::InsufficientShips { .. }), "got {err}");

        let mut in_place = s;
        assert!(in_place.depart(0.0, 10_000.0).is_err());
        assert_eq!(in_place, s);
    }

    #[test]
    fn test_negative_advance_rejected() {
        let s = peek(&fresh(), 3600.0).expect("advance");
        assert_eq!(peek(&s, -1.0), Err(EconomyError::InvalidTimeTravel(-1.0)));

        let mut in_place = s;
        assert!(in_place.advance(-1.0).is_err());
        assert_eq!(in_place, s);
    }

    #[test]
    fn test_expired_window_arrival_is_noop() {
        let s = peek(&fresh(), DAY).expect("advance");
        let s = send(&s, 0.0, 1000.0).expect("send");
        // started two days before now: nothing left to redeem
        let start = s.last_update + 10.0 - 2.0 * DAY;
        let arrived = count_arrival(&s, 10.0, 1000.0, start).expect("arrival");
        assert_eq!(arrived, peek(&s, 10.0).expect("advance"));
    }

    #[test]
    fn test_zero_quantity_arrival_and_return_only_advance() {
        let s = peek(&fresh(), DAY).expect("advance");
        let s = send(&s, 0.0, 5000.0).expect("send");
        assert!(s.has_debt());

        let advanced = peek(&s, 600.0).expect("advance");
        let arrived = count_arrival(&s, 600.0, 0.0, s.last_update).expect("arrival");
        assert_eq!(arrived, advanced);
        let received = receive_spaceships(&s, 600.0, 0.0).expect("receive");
        assert_eq!(received, advanced);
    }

    #[test]
    fn test_arrival_restores_growth() {
        let s = peek(&fresh(), DAY).expect("advance");
        let departed = send(&s, 0.0, 50_000.0).expect("send");

        let throttled = peek(&departed, 3600.0).expect("advance");
        let redeemed = count_arrival(&departed, 0.0, 50_000.0, departed.last_update).expect("arrival");
        assert_eq!(redeemed.external_upkeep, 0.0);
        let free = peek(&redeemed, 3600.0).expect("advance");
        assert!(free.num_spaceships > throttled.num_spaceships);
    }

    #[test]
    fn test_gift_above_cap_decays_back() {
        let s = peek(&fresh(), 3.0 * DAY).expect("advance");
        let s = receive_spaceships(&s, 0.0, 10_000.0).expect("receive");
        assert_close(s.num_spaceships, MAX + 10_000.0, "after gift");
        let s = peek(&s, 3600.0).expect("advance");
        assert_close(s.num_spaceships, MAX + 10_000.0 - 1800.0, "after an hour");
        let s = peek(&s, DAY).expect("advance");
        assert_close(s.num_spaceships, MAX, "back at cap");
    }

    // ========== Property sweeps ==========

    enum Op {
        Advance(f64),
        Send(f64, f64),
        Arrive(f64, f64, f64),
        Receive(f64, f64),
    }

    fn random_op(rng: &mut ChaCha8Rng, s: &PlanetEconomyState) -> Op {
        let dt = rng.gen_range(0.0..DAY / 2.0);
        match rng.gen_range(0..4) {
            0 => Op::Advance(dt),
            1 => Op::Send(dt, rng.gen_range(0.0..=1.0) * s.num_spaceships),
            2 => Op::Arrive(dt, rng.gen_range(0.0..20_000.0), s.last_update - rng.gen_range(0.0..DAY * 1.5)),
            _ => Op::Receive(dt, rng.gen_range(0.0..30_000.0)),
        }
    }

    fn apply(s: &PlanetEconomyState, op: &Op) -> Result<PlanetEconomyState, EconomyError> {
        match *op {
            Op::Advance(dt) => peek(s, dt),
            Op::Send(dt, q) => send(s, dt, q),
            Op::Arrive(dt, q, start) => count_arrival(s, dt, q, start),
            Op::Receive(dt, q) => receive_spaceships(s, dt, q),
        }
    }

    #[test]
    fn test_random_sequences_keep_invariants() {
        for seed in 0..20u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut s = fresh();
            for step in 0..300 {
                let op = random_op(&mut rng, &s);
                let before = s;
                match apply(&s, &op) {
                    Ok(next) => s = next,
                    // a send sized before the advance can still exceed supply
                    // when the planet was decaying above cap
                    Err(EconomyError::InsufficientShips { .. }) => continue,
                    Err(e) => panic!("seed {seed} step {step}: {e}"),
                }
                check_transition(&before, &s)
                    .unwrap_or_else(|v| panic!("seed {seed} step {step}: {v}"));
            }
        }
    }

    #[test]
    fn test_departure_conserves_ships() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut s = peek(&fresh(), DAY).expect("advance");
        for _ in 0..200 {
            let dt = rng.gen_range(0.0..7200.0);
            let advanced = peek(&s, dt).expect("advance");
            let q = rng.gen_range(0.0..=0.5) * advanced.num_spaceships;
            let departed = send(&s, dt, q).expect("send");
            assert!(ship_balance(&advanced, &departed, q) <= SHIP_TOLERANCE);
            s = departed;
        }
    }

    #[test]
    fn test_pure_growth_never_overshoots() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut s = fresh();
        let mut last = 0.0;
        for _ in 0..500 {
            s = peek(&s, rng.gen_range(0.0..5000.0)).expect("advance");
            assert!(s.num_spaceships <= MAX);
            assert!(s.num_spaceships >= last);
            last = s.num_spaceships;
        }
    }

    #[test]
    fn test_zero_advance_is_idempotent() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut s = fresh();
        for _ in 0..100 {
            if let Ok(next) = apply(&s, &random_op(&mut rng, &s)) {
                s = next;
            }
            let same = peek(&s, 0.0).expect("advance");
            assert_eq!(same.num_spaceships, s.num_spaceships);
            assert_eq!(same.external_upkeep, s.external_upkeep);
            assert_eq!(same.external_upkeep_duration, s.external_upkeep_duration);
        }
    }

    #[test]
    fn test_float_tracks_fixed_point_reference() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut float = peek(&fresh(), DAY).expect("advance");
        let mut fixed = adapter::to_fixed(&float);
        for step in 0..200 {
            let dt = rng.gen_range(0.0..DAY / 4.0);
            if rng.gen_bool(0.3) {
                let q = (rng.gen_range(0.0..0.5) * float.num_spaceships).floor();
                float = send(&float, dt, q).expect("float send");
                fixed = core_economy::send(&fixed, adapter::to_decimal(dt), adapter::to_ships(q))
                    .expect("fixed send");
            } else {
                float = peek(&float, dt).expect("float advance");
                fixed = core_economy::peek(&fixed, adapter::to_decimal(dt)).expect("fixed advance");
            }
            let delta = adapter::cross_check(&float, &fixed);
            assert!(delta.max_ships() < 1e-3, "step {step}: drift {delta:?}");
        }
    }
}
