//! Pure state transition function for the dutch-pay flow

use super::state::BillSplit;
use super::{DutchPayState, Effect, Event, FlowContext};
use crate::chat::format_won;
use crate::intent::contains_hangul;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

pub const ASK_PEOPLE_PROMPT: &str = "몇 분이서 총 얼마 나왔나요?";

static PEOPLE_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+|한|두|세|네|다섯|여섯|일곱|여덟|아홉|열)\s*명")
        .expect("people count pattern is valid")
});

static AMOUNT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*(만)?").expect("amount pattern is valid"));

static ACKNOWLEDGEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"응|네|좋아").expect("acknowledgement pattern is valid"));

static NAME_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",|\s+").expect("separator pattern is valid"));

const AFFIRMATIVES: [&str; 3] = ["네", "응", "좋아"];

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: DutchPayState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: DutchPayState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Reasons the flow did not advance. The state is left untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Headcount or total amount missing from input")]
    MissingPeopleOrAmount,
    #[error("No participant names found in input")]
    NoFriendNames,
    #[error("Waiting for the user to confirm the transfers")]
    AwaitingConfirmation,
    #[error("Transfers are still being processed")]
    TransfersInFlight,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs this always produces the same outputs; timers and
/// network sends are described by the returned effects, never performed.
pub fn transition(
    state: &DutchPayState,
    context: &FlowContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        (DutchPayState::Initial, Event::UserInput { .. }) => {
            Ok(TransitionResult::new(DutchPayState::AskingPeople)
                .with_effect(Effect::reply(ASK_PEOPLE_PROMPT)))
        }

        (DutchPayState::AskingPeople, Event::UserInput { text }) => {
            let split = parse_bill(&text).ok_or(TransitionError::MissingPeopleOrAmount)?;
            let reply = format!(
                "1인당 {}원씩이네요. 연락처에서 함께 식사하신 분들을 찾아볼까요?",
                format_won(split.amount_per_person)
            );
            Ok(TransitionResult::new(DutchPayState::AskingFriends { split })
                .with_effect(Effect::reply(reply)))
        }

        (DutchPayState::AskingFriends { split }, Event::UserInput { text }) => {
            let friends = parse_friend_names(&text);
            if friends.is_empty() {
                return Err(TransitionError::NoFriendNames);
            }
            let reply = format!(
                "{} 님께 각각 {}원씩 송금하시겠습니까?",
                friends.join(", "),
                format_won(split.amount_per_person)
            );
            Ok(TransitionResult::new(DutchPayState::Confirming {
                split: *split,
                friends,
            })
            .with_effect(Effect::reply(reply)))
        }

        (DutchPayState::Confirming { split, friends }, Event::UserInput { text }) => {
            if !is_affirmative(&text) {
                return Err(TransitionError::AwaitingConfirmation);
            }
            let transfers = friends
                .iter()
                .enumerate()
                .map(|(index, friend)| Effect::ScheduleTransfer {
                    receiver: friend.clone(),
                    amount: split.amount_per_person,
                    delay: context.transfer_delay(index),
                });
            Ok(TransitionResult::new(DutchPayState::Completed {
                split: *split,
                friends: friends.clone(),
            })
            .with_effects(transfers)
            .with_effect(Effect::ScheduleReset {
                delay: context.reset_delay(friends.len()),
            }))
        }

        (DutchPayState::Completed { .. }, Event::UserInput { .. }) => {
            Err(TransitionError::TransfersInFlight)
        }

        (DutchPayState::Completed { .. }, Event::ResetTimeout) => {
            Ok(TransitionResult::new(DutchPayState::Initial))
        }

        (state, Event::ResetTimeout) => Err(TransitionError::InvalidTransition(format!(
            "reset timer fired in {:?} step",
            state.step()
        ))),
    }
}

/// Pull a headcount and total amount out of one utterance.
///
/// The amount is the first digit run that is not part of the headcount
/// token, scaled ×10,000 when followed by "만".
pub fn parse_bill(text: &str) -> Option<BillSplit> {
    let people = PEOPLE_COUNT.captures(text)?;
    let people_span = people.get(0)?.range();
    let number_of_people = people_count(people.get(1)?.as_str())?;

    let amount = AMOUNT_TOKEN
        .captures_iter(text)
        .find(|caps| caps.get(0).is_some_and(|m| !people_span.contains(&m.start())))?;
    let base: u64 = amount.get(1)?.as_str().parse().ok()?;
    let total_amount = if amount.get(2).is_some() {
        base.checked_mul(10_000)?
    } else {
        base
    };

    BillSplit::new(total_amount, number_of_people)
}

fn people_count(token: &str) -> Option<u32> {
    let count = match token {
        "한" => 1,
        "두" => 2,
        "세" => 3,
        "네" => 4,
        "다섯" => 5,
        "여섯" => 6,
        "일곱" => 7,
        "여덟" => 8,
        "아홉" => 9,
        "열" => 10,
        digits => digits.parse().ok()?,
    };
    Some(count)
}

/// Names of the people who shared the bill.
///
/// The first acknowledgement word is dropped, then the rest is split on
/// commas and whitespace; tokens longer than one character that contain a
/// Hangul syllable are kept.
pub fn parse_friend_names(text: &str) -> Vec<String> {
    let stripped = ACKNOWLEDGEMENT.replace(text, "");
    NAME_SEPARATOR
        .split(stripped.trim())
        .filter(|name| name.chars().count() > 1 && contains_hangul(name))
        .map(str::to_string)
        .collect()
}

pub fn is_affirmative(text: &str) -> bool {
    AFFIRMATIVES.iter().any(|word| text.contains(word))
}
