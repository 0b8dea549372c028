// src/sentiment.rs
//! Lexicon and rule based compound sentiment in [-1.0, 1.0].
//!
//! Valences come from `sentiment_lexicon.json` (roughly -4..=4 per word).
//! Rules on top of the lexicon:
//! - boosters/dampeners up to three tokens before a word scale it,
//! - a negator up to three tokens before a word flips and damps it,
//! - an ALL CAPS word in otherwise mixed-case text gets extra weight,
//! - clauses before "but" count half, clauses after count one and a half,
//! - `!` and repeated `?` push the total further from zero.
//!
//! The summed valence is squashed with `x / sqrt(x^2 + 15)`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid sentiment lexicon")
});

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)[\w'’]+").expect("word regex"));

/// Shared analyzer; built on first use, read-only afterwards.
static ANALYZER: Lazy<SentimentAnalyzer> = Lazy::new(SentimentAnalyzer::new);

const BOOST_INCR: f64 = 0.293;
const BOOST_DECR: f64 = -0.293;
const CAPS_INCR: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const NORMALIZE_ALPHA: f64 = 15.0;
const EXCLAIM_WEIGHT: f64 = 0.292;
const QUESTION_WEIGHT: f64 = 0.18;

/// Compound score of `text` using the process-wide analyzer.
pub fn score(text: &str) -> f64 {
    ANALYZER.score(text)
}

#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    lexicon: &'static HashMap<String, f64>,
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

struct Token<'a> {
    raw: &'a str,
    lower: String,
}

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self { lexicon: &LEXICON }
    }

    #[inline]
    fn valence(&self, w: &str) -> Option<f64> {
        self.lexicon.get(w).copied()
    }

    /// Compound polarity; 0.0 for empty or sentiment-free text.
    pub fn score(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return 0.0;
        }
        let caps_differential = is_caps_differential(&tokens);

        let mut valences = Vec::with_capacity(tokens.len());
        for (i, tok) in tokens.iter().enumerate() {
            if booster(&tok.lower).is_some() {
                valences.push(0.0);
                continue;
            }
            let Some(base) = self.valence(&tok.lower) else {
                valences.push(0.0);
                continue;
            };

            let mut v = base;
            if caps_differential && is_all_caps(tok.raw) {
                v += CAPS_INCR.copysign(v);
            }

            for k in 1..=3 {
                if i < k {
                    break;
                }
                let prev = &tokens[i - k];
                if self.valence(&prev.lower).is_some() {
                    continue;
                }
                if let Some(b) = booster(&prev.lower) {
                    let mut scalar = if v < 0.0 { -b } else { b };
                    if caps_differential && is_all_caps(prev.raw) {
                        scalar += CAPS_INCR.copysign(v);
                    }
                    v += match k {
                        1 => scalar,
                        2 => scalar * 0.95,
                        _ => scalar * 0.9,
                    };
                }
                if is_negator(&prev.lower) {
                    v *= NEGATION_SCALAR;
                }
            }

            valences.push(v);
        }

        apply_but_rule(&tokens, &mut valences);
        compound(&valences, text)
    }
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_matches(|c| c == '\'' || c == '’'))
        .filter(|t| !t.is_empty())
        .map(|raw| Token {
            raw,
            lower: raw.to_lowercase().replace('’', "'"),
        })
        .collect()
}

fn is_all_caps(w: &str) -> bool {
    w.chars().any(char::is_alphabetic) && !w.chars().any(char::is_lowercase)
}

/// Emphasis by capitals only counts when the text is not shouting throughout.
fn is_caps_differential(tokens: &[Token<'_>]) -> bool {
    let caps = tokens.iter().filter(|t| is_all_caps(t.raw)).count();
    caps > 0 && caps < tokens.len()
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "none"
            | "nope"
            | "nor"
            | "neither"
            | "nothing"
            | "nowhere"
            | "cannot"
            | "without"
            | "rarely"
            | "seldom"
            | "despite"
    ) || tok.ends_with("n't")
}

fn booster(tok: &str) -> Option<f64> {
    match tok {
        "absolutely" | "amazingly" | "completely" | "considerably" | "decidedly"
        | "deeply" | "enormously" | "entirely" | "especially" | "exceptionally"
        | "extremely" | "fabulously" | "greatly" | "highly" | "hugely" | "incredibly"
        | "intensely" | "majorly" | "more" | "most" | "particularly" | "purely"
        | "quite" | "really" | "remarkably" | "so" | "substantially" | "thoroughly"
        | "totally" | "tremendously" | "truly" | "unbelievably" | "utterly" | "very" => {
            Some(BOOST_INCR)
        }
        "almost" | "barely" | "hardly" | "kinda" | "less" | "little" | "marginally"
        | "occasionally" | "partly" | "scarcely" | "slightly" | "somewhat" | "sorta" => {
            Some(BOOST_DECR)
        }
        _ => None,
    }
}

fn apply_but_rule(tokens: &[Token<'_>], valences: &mut [f64]) {
    let Some(pivot) = tokens.iter().position(|t| t.lower == "but") else {
        return;
    };
    for (i, v) in valences.iter_mut().enumerate() {
        if i < pivot {
            *v *= 0.5;
        } else if i > pivot {
            *v *= 1.5;
        }
    }
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclaims = text.chars().filter(|&c| c == '!').count().min(4) as f64;
    let questions = text.chars().filter(|&c| c == '?').count();
    let question_amp = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * QUESTION_WEIGHT,
        _ => 0.96,
    };
    exclaims * EXCLAIM_WEIGHT + question_amp
}

fn compound(valences: &[f64], text: &str) -> f64 {
    let mut sum: f64 = valences.iter().sum();
    if sum == 0.0 {
        return 0.0;
    }
    let emphasis = punctuation_emphasis(text);
    sum += emphasis.copysign(sum);
    (sum / (sum * sum + NORMALIZE_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_neutral_are_zero() {
        assert_eq!(score(""), 0.0);
        assert_eq!(score("   \n\t"), 0.0);
        assert_eq!(score("The release ships on Tuesday."), 0.0);
    }

    #[test]
    fn polarity_orders_as_expected() {
        let neg = score("terrible awful horrible");
        let pos = score("wonderful amazing great");
        assert!(neg < 0.0, "neg = {neg}");
        assert!(pos > 0.0, "pos = {pos}");
    }

    #[test]
    fn negation_flips_sign() {
        assert!(score("this is good") > 0.0);
        assert!(score("this is not good") < 0.0);
        assert!(score("this isn't good") < 0.0);
    }

    #[test]
    fn boosters_and_emphasis_increase_magnitude() {
        let plain = score("the docs are good");
        assert!(score("the docs are very good") > plain);
        assert!(score("the docs are good!!!") > plain);
        assert!(score("the docs are GOOD") > plain);
        assert!(score("the docs are slightly good") < plain);
    }

    #[test]
    fn but_shifts_weight_to_the_second_clause() {
        assert!(score("the idea is great but the code is bad") < 0.0);
        assert!(score("the code is bad but the idea is great") > 0.0);
    }

    #[test]
    fn stays_bounded() {
        let rant = "horrible awful terrible worst hate disgusting ".repeat(200);
        let praise = "AMAZING wonderful great love excellent best ".repeat(200) + "!!!!!!";
        let n = score(&rant);
        let p = score(&praise);
        assert!((-1.0..=1.0).contains(&n) && n < -0.99);
        assert!((-1.0..=1.0).contains(&p) && p > 0.99);
    }

    #[test]
    fn deterministic() {
        let t = "I really like this, but the onboarding is confusing.";
        assert_eq!(score(t), score(t));
        assert_eq!(SentimentAnalyzer::new().score(t), score(t));
    }
}
