use game_core::energy::MIN_SPEED;
use game_core::{ActionCosts, ActionKind, EnergyLedger};
use proptest::prelude::*;

fn action_kind() -> impl Strategy<Value = ActionKind> {
    prop_oneof![
        Just(ActionKind::Move),
        Just(ActionKind::Attack),
        Just(ActionKind::Use),
        Just(ActionKind::Cast),
        Just(ActionKind::Wait),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]
    #[test]
    fn accrual_is_linear_in_ticks(speed in 10_u32..=400, ticks in 0_u32..60) {
        let mut ledger = EnergyLedger::new(speed);
        let per_tick = 1000 * speed / 100;
        for _ in 0..ticks {
            prop_assert_eq!(ledger.gain_energy(), per_tick);
        }
        prop_assert_eq!(ledger.energy(), per_tick * ticks);
    }

    #[test]
    fn spending_is_exact_or_a_no_op(
        start in 0_u32..5000,
        kinds in prop::collection::vec(action_kind(), 1..20)
    ) {
        let mut ledger = EnergyLedger::new(100);
        ledger.set_energy(start);
        let costs = ActionCosts::default();
        for kind in kinds {
            let before = ledger.energy();
            let affordable = ledger.can_act(kind);
            let spent = ledger.spend_energy(kind);
            prop_assert_eq!(spent, affordable);
            if spent {
                prop_assert_eq!(ledger.energy(), before - costs.cost(kind));
            } else {
                prop_assert_eq!(ledger.energy(), before, "a denied spend must not touch energy");
            }
        }
    }

    #[test]
    fn speed_modifiers_never_drop_below_the_floor(
        base in 10_u32..=300,
        deltas in prop::collection::vec(-500_i32..500, 0..10)
    ) {
        let mut ledger = EnergyLedger::new(base);
        for delta in deltas {
            ledger.modify_speed(delta);
            prop_assert!(ledger.current_speed() >= MIN_SPEED);
            let expected = (i64::from(base) + i64::from(delta)).max(i64::from(MIN_SPEED));
            prop_assert_eq!(i64::from(ledger.current_speed()), expected);
        }
        ledger.reset_speed();
        prop_assert_eq!(ledger.current_speed(), base);
    }

    #[test]
    fn estimate_covers_the_real_wait(speed in 10_u32..=400, start in 0_u32..3000) {
        let mut ledger = EnergyLedger::new(speed);
        ledger.set_energy(start);
        let estimate = ledger.turns_to_next_action(ActionKind::Cast);
        for _ in 0..estimate {
            ledger.gain_energy();
        }
        prop_assert!(ledger.can_act(ActionKind::Cast));
    }
}
