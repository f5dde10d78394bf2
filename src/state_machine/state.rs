//! Dutch-pay flow state types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Flat step name, for rendering and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    Initial,
    AskingPeople,
    AskingFriends,
    Confirming,
    Completed,
}

/// A bill split evenly between `number_of_people`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillSplit {
    pub total_amount: u64,
    pub number_of_people: u32,
    /// `floor(total_amount / number_of_people)`
    pub amount_per_person: u64,
}

impl BillSplit {
    /// Returns `None` for a headcount of zero.
    pub fn new(total_amount: u64, number_of_people: u32) -> Option<Self> {
        let amount_per_person = total_amount.checked_div(u64::from(number_of_people))?;
        Some(Self {
            total_amount,
            number_of_people,
            amount_per_person,
        })
    }
}

/// Dutch-pay conversation state
///
/// Each variant carries exactly the slots collected so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum DutchPayState {
    /// No flow running
    #[default]
    Initial,

    /// Waiting for headcount and total amount
    AskingPeople,

    /// Waiting for the names of the people who shared the bill
    AskingFriends { split: BillSplit },

    /// Waiting for the user to approve the per-person transfers
    Confirming {
        split: BillSplit,
        friends: Vec<String>,
    },

    /// Transfers scheduled; the flow resets once they have had time to settle
    Completed {
        split: BillSplit,
        friends: Vec<String>,
    },
}

impl DutchPayState {
    pub fn is_active(&self) -> bool {
        !matches!(self, DutchPayState::Initial)
    }

    pub fn step(&self) -> FlowStep {
        match self {
            DutchPayState::Initial => FlowStep::Initial,
            DutchPayState::AskingPeople => FlowStep::AskingPeople,
            DutchPayState::AskingFriends { .. } => FlowStep::AskingFriends,
            DutchPayState::Confirming { .. } => FlowStep::Confirming,
            DutchPayState::Completed { .. } => FlowStep::Completed,
        }
    }

    pub fn split(&self) -> Option<&BillSplit> {
        match self {
            DutchPayState::AskingFriends { split }
            | DutchPayState::Confirming { split, .. }
            | DutchPayState::Completed { split, .. } => Some(split),
            DutchPayState::Initial | DutchPayState::AskingPeople => None,
        }
    }

    pub fn friends(&self) -> &[String] {
        match self {
            DutchPayState::Confirming { friends, .. } | DutchPayState::Completed { friends, .. } => {
                friends
            }
            _ => &[],
        }
    }
}

/// Timing that the flow bakes into the effects it emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowContext {
    /// Stagger between consecutive transfers (also the lead-in before the first)
    pub step_delay: Duration,
    /// Slack after the last transfer before the flow resets
    pub settle_buffer: Duration,
}

impl Default for FlowContext {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(1000),
            settle_buffer: Duration::from_millis(500),
        }
    }
}

impl FlowContext {
    pub fn new(step_delay: Duration, settle_buffer: Duration) -> Self {
        Self {
            step_delay,
            settle_buffer,
        }
    }

    /// Delay before the transfer at `index` is sent: one lead-in step, then
    /// `index + 1` steps.
    pub fn transfer_delay(&self, index: usize) -> Duration {
        self.step_delay
            .saturating_add(self.step_delay.saturating_mul(steps(index.saturating_add(1))))
    }

    /// Delay before the flow returns to `Initial` after scheduling `count`
    /// transfers.
    pub fn reset_delay(&self, count: usize) -> Duration {
        self.step_delay
            .saturating_add(self.step_delay.saturating_mul(steps(count)))
            .saturating_add(self.settle_buffer)
    }
}

fn steps(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
