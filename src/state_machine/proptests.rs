//! Property-based tests for the dutch-pay flow
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::{BillSplit, FlowStep};
use super::transition::*;
use super::*;
use proptest::prelude::*;
use std::time::Duration;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> FlowContext {
    FlowContext::default()
}

const KOREAN_COUNTS: [&str; 10] = [
    "한", "두", "세", "네", "다섯", "여섯", "일곱", "여덟", "아홉", "열",
];

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_split() -> impl Strategy<Value = BillSplit> {
    (0u64..10_000_000, 1u32..20).prop_map(|(total, people)| {
        BillSplit::new(total, people).expect("people is never zero here")
    })
}

fn arb_friends() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[민수지훈영희철서연준]{2,3}", 1..6)
}

fn arb_active_state() -> impl Strategy<Value = DutchPayState> {
    prop_oneof![
        Just(DutchPayState::AskingPeople),
        arb_split().prop_map(|split| DutchPayState::AskingFriends { split }),
        (arb_split(), arb_friends())
            .prop_map(|(split, friends)| DutchPayState::Confirming { split, friends }),
        (arb_split(), arb_friends())
            .prop_map(|(split, friends)| DutchPayState::Completed { split, friends }),
    ]
}

/// Text that never contains an affirmative word
fn arb_non_affirmative() -> impl Strategy<Value = String> {
    "[아니싫어잠깐취소 a-z0-9]{0,20}".prop_filter("must not affirm", |s| !is_affirmative(s))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// amount_per_person = floor(total / people) for digit headcounts
    #[test]
    fn prop_amount_per_person_floors(people in 1u32..50, total in 0u64..100_000_000) {
        let text = format!("{people}명 {total}원");
        let result = transition(&DutchPayState::AskingPeople, &test_context(), Event::user_input(text)).unwrap();
        let split = result.new_state.split().copied().unwrap();
        prop_assert_eq!(split.number_of_people, people);
        prop_assert_eq!(split.total_amount, total);
        prop_assert_eq!(split.amount_per_person, total / u64::from(people));
    }

    /// Korean number words map to 1..=10
    #[test]
    fn prop_korean_counts(index in 0usize..10, man in 1u64..100) {
        let text = format!("{} 명 {man}만원", KOREAN_COUNTS[index]);
        let split = parse_bill(&text).unwrap();
        prop_assert_eq!(split.number_of_people as usize, index + 1);
        prop_assert_eq!(split.total_amount, man * 10_000);
    }

    /// Stalls never touch state and never emit effects
    #[test]
    fn prop_confirming_only_advances_on_affirmative(
        split in arb_split(),
        friends in arb_friends(),
        text in arb_non_affirmative(),
    ) {
        let state = DutchPayState::Confirming { split, friends };
        let result = transition(&state, &test_context(), Event::user_input(text));
        prop_assert_eq!(result.unwrap_err(), TransitionError::AwaitingConfirmation);
    }

    /// Every kept friend name is longer than one char and contains Hangul
    #[test]
    fn prop_friend_names_are_hangul(text in "[민수지훈 ,a-z응네좋아]{0,30}") {
        for name in parse_friend_names(&text) {
            prop_assert!(name.chars().count() > 1);
            prop_assert!(crate::intent::contains_hangul(&name));
        }
    }

    /// Confirming always enters Completed with one transfer per friend, staggered
    /// delays, and a reset that fires after the last transfer
    #[test]
    fn prop_confirmation_schedules_every_friend(
        split in arb_split(),
        friends in arb_friends(),
        step_ms in 1u64..5_000,
        buffer_ms in 0u64..2_000,
    ) {
        let context = FlowContext::new(Duration::from_millis(step_ms), Duration::from_millis(buffer_ms));
        let state = DutchPayState::Confirming { split, friends: friends.clone() };
        let result = transition(&state, &context, Event::user_input("네")).unwrap();

        prop_assert_eq!(result.new_state.step(), FlowStep::Completed);

        let mut last_transfer = Duration::ZERO;
        let mut receivers = Vec::new();
        let mut reset = None;
        for effect in &result.effects {
            match effect {
                Effect::ScheduleTransfer { receiver, amount, delay } => {
                    prop_assert_eq!(*amount, split.amount_per_person);
                    prop_assert!(*delay > last_transfer);
                    last_transfer = *delay;
                    receivers.push(receiver.clone());
                }
                Effect::ScheduleReset { delay } => reset = Some(*delay),
                Effect::Reply { .. } => prop_assert!(false, "confirmation does not reply"),
            }
        }
        prop_assert_eq!(receivers, friends);
        prop_assert!(reset.unwrap() > last_transfer);
    }

    /// Once active, user input never returns the flow to Initial; only the
    /// reset timer does
    #[test]
    fn prop_user_input_never_deactivates(state in arb_active_state(), text in "[가-힣0-9 ,]{0,20}") {
        if let Ok(result) = transition(&state, &test_context(), Event::user_input(text)) {
            prop_assert!(result.new_state.is_active());
        }
    }
}
