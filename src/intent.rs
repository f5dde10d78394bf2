//! Regex-based intent classification for free-text transfer requests

use regex::Regex;
use std::sync::LazyLock;

const DUTCH_PAY_KEYWORDS: [&str; 3] = ["더치페이", "나눠서", "같이 내"];

/// Tried in order; the first pattern that matches wins.
static TRANSFER_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        // "김민수에게 5만원 보내줘"
        Regex::new(r"([가-힣]+)(?:에게|한테)\s*([0-9]+(?:만|천)?원?)?\s*(?:보내|송금|전송)")
            .expect("name-first transfer pattern is valid"),
        // Amount-first order. Every match here is also a match of the pattern
        // above, so this one never wins and "5만원 김민수에게 보내줘" comes out
        // with amount 0.
        Regex::new(r"([0-9]+(?:만|천)?원?)?\s*([가-힣]+)(?:에게|한테)\s*(?:보내|송금|전송)")
            .expect("amount-first transfer pattern is valid"),
    ]
});

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit pattern is valid"));

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Start the bill-splitting dialogue
    DutchPay,
    /// Send `amount` won to `receiver`
    RegularTransfer { receiver: String, amount: u64 },
}

/// Classify a chat turn. Returns `None` for anything unrecognized.
pub fn parse_intent(text: &str) -> Option<Intent> {
    if DUTCH_PAY_KEYWORDS.iter().any(|k| text.contains(k)) {
        return Some(Intent::DutchPay);
    }

    for pattern in TRANSFER_PATTERNS.iter() {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };
        let first = caps.get(1).map_or("", |m| m.as_str());
        let second = caps.get(2).map_or("", |m| m.as_str());

        // Whichever capture holds Hangul is the name, wherever it sits.
        let (receiver, amount_text) = if contains_hangul(first) {
            (first, second)
        } else {
            (second, first)
        };

        if !receiver.is_empty() {
            return Some(Intent::RegularTransfer {
                receiver: receiver.to_string(),
                amount: parse_scaled_amount(amount_text),
            });
        }
    }

    None
}

/// First digit run of `text`, scaled by a "만" (×10,000) or "천" (×1,000)
/// marker anywhere in it. Missing or oversized numbers yield 0.
pub fn parse_scaled_amount(text: &str) -> u64 {
    let Some(base) = DIGITS.find(text).and_then(|m| m.as_str().parse::<u64>().ok()) else {
        return 0;
    };

    if text.contains('만') {
        base.saturating_mul(10_000)
    } else if text.contains('천') {
        base.saturating_mul(1_000)
    } else {
        base
    }
}

/// Precomposed Hangul syllable (가..힣)
pub fn is_hangul_syllable(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

pub fn contains_hangul(text: &str) -> bool {
    text.chars().any(is_hangul_syllable)
}
