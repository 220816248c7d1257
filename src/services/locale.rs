//! Ukrainian renderings used on invoices: long-form dates and amounts in words.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

const MONTHS_GENITIVE: [&str; 12] = [
    "січня",
    "лютого",
    "березня",
    "квітня",
    "травня",
    "червня",
    "липня",
    "серпня",
    "вересня",
    "жовтня",
    "листопада",
    "грудня",
];

const UNITS_MASCULINE: [&str; 10] = [
    "", "один", "два", "три", "чотири", "п'ять", "шість", "сім", "вісім", "дев'ять",
];

const UNITS_FEMININE: [&str; 10] = [
    "", "одна", "дві", "три", "чотири", "п'ять", "шість", "сім", "вісім", "дев'ять",
];

const TEENS: [&str; 10] = [
    "десять",
    "одинадцять",
    "дванадцять",
    "тринадцять",
    "чотирнадцять",
    "п'ятнадцять",
    "шістнадцять",
    "сімнадцять",
    "вісімнадцять",
    "дев'ятнадцять",
];

const TENS: [&str; 10] = [
    "", "", "двадцять", "тридцять", "сорок", "п'ятдесят", "шістдесят", "сімдесят", "вісімдесят",
    "дев'яносто",
];

const HUNDREDS: [&str; 10] = [
    "", "сто", "двісті", "триста", "чотириста", "п'ятсот", "шістсот", "сімсот", "вісімсот",
    "дев'ятсот",
];

#[derive(Clone, Copy, PartialEq)]
enum Gender {
    Masculine,
    Feminine,
}

/// Noun forms for 1, 2-4 and 5+ items, plus grammatical gender.
struct Noun {
    one: &'static str,
    few: &'static str,
    many: &'static str,
    gender: Gender,
}

const HRYVNIA: Noun = Noun { one: "гривня", few: "гривні", many: "гривень", gender: Gender::Feminine };
const KOPECK: Noun = Noun { one: "копійка", few: "копійки", many: "копійок", gender: Gender::Feminine };

// Scales from the largest down, applied to groups of three digits.
const SCALES: [Noun; 6] = [
    Noun { one: "квінтильйон", few: "квінтильйони", many: "квінтильйонів", gender: Gender::Masculine },
    Noun { one: "квадрильйон", few: "квадрильйони", many: "квадрильйонів", gender: Gender::Masculine },
    Noun { one: "трильйон", few: "трильйони", many: "трильйонів", gender: Gender::Masculine },
    Noun { one: "мільярд", few: "мільярди", many: "мільярдів", gender: Gender::Masculine },
    Noun { one: "мільйон", few: "мільйони", many: "мільйонів", gender: Gender::Masculine },
    Noun { one: "тисяча", few: "тисячі", many: "тисяч", gender: Gender::Feminine },
];

fn plural(n: u64, noun: &Noun) -> &'static str {
    let last_two = n % 100;
    let last = n % 10;
    if (11..=14).contains(&last_two) {
        noun.many
    } else if last == 1 {
        noun.one
    } else if (2..=4).contains(&last) {
        noun.few
    } else {
        noun.many
    }
}

fn push_triplet(words: &mut Vec<&'static str>, n: u64, gender: Gender) {
    let hundreds = (n / 100) as usize;
    let rest = n % 100;
    if hundreds > 0 {
        words.push(HUNDREDS[hundreds]);
    }
    if (10..20).contains(&rest) {
        words.push(TEENS[(rest - 10) as usize]);
        return;
    }
    let tens = (rest / 10) as usize;
    let units = (rest % 10) as usize;
    if tens > 0 {
        words.push(TENS[tens]);
    }
    if units > 0 {
        let table = match gender {
            Gender::Masculine => &UNITS_MASCULINE,
            Gender::Feminine => &UNITS_FEMININE,
        };
        words.push(table[units]);
    }
}

/// Spells out a whole number in words, agreeing with the gender of the counted noun.
fn integer_in_words(n: u64, gender: Gender) -> String {
    if n == 0 {
        return "нуль".to_string();
    }

    let mut words = Vec::new();
    let mut divisor = 1_000_000_000_000_000_000u64;
    let mut remainder = n;
    for scale in &SCALES {
        let group = remainder / divisor;
        remainder %= divisor;
        divisor /= 1000;
        if group == 0 {
            continue;
        }
        push_triplet(&mut words, group, scale.gender);
        words.push(plural(group, scale));
    }
    push_triplet(&mut words, remainder, gender);

    words.join(" ")
}

/// Amount in hryvnias spelled out for an invoice, e.g. `п'ятсот гривень`.
/// Kopecks are written as two digits and only when non-zero.
/// Returns `None` for amounts too large to spell out.
pub fn amount_in_words(amount: Decimal) -> Option<String> {
    let amount = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let whole = amount.trunc();
    let kopecks = ((amount - whole) * Decimal::ONE_HUNDRED).to_u64()?;
    let hryvnias = whole.to_u64()?;

    let mut text = format!(
        "{} {}",
        integer_in_words(hryvnias, HRYVNIA.gender),
        plural(hryvnias, &HRYVNIA)
    );
    if kopecks > 0 {
        text.push_str(&format!(" {kopecks:02} {}", plural(kopecks, &KOPECK)));
    }
    Some(text)
}

/// Long calendar form used on Ukrainian documents, e.g. `7 червня 2025 р.`
pub fn format_long_date(date: NaiveDate) -> String {
    format!(
        "{} {} {} р.",
        date.day(),
        MONTHS_GENITIVE[date.month0() as usize],
        date.year()
    )
}

/// Resolves a relative date word against `today`. Empty input means today.
pub fn resolve_relative_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let normalized = text.trim().trim_end_matches('.').to_lowercase();
    match normalized.as_str() {
        "" | "сьогодні" | "сьогоднішня дата" | "сьогоднішньою датою" => Some(today),
        "завтра" => Some(today + Duration::days(1)),
        "вчора" | "учора" => Some(today - Duration::days(1)),
        "післязавтра" => Some(today + Duration::days(2)),
        "позавчора" => Some(today - Duration::days(2)),
        _ => None,
    }
}

/// Replaces relative or empty dates with the long form; anything else is kept verbatim.
pub fn normalize_date(text: &str, today: NaiveDate) -> String {
    match resolve_relative_date(text, today) {
        Some(date) => format_long_date(date),
        None => text.to_string(),
    }
}
