//! Coin amounts
//!
//! A [`Coin`] is a denomination with an unsigned amount. A [`Coins`] list
//! is well formed when every denomination is valid and the list is sorted
//! by denomination without repeats.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::TransactionError;

/// A single denomination and amount
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    #[serde(with = "decimal")]
    pub amount: u128,
    pub denom: String,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// Build a coin from a decimal amount string
    ///
    /// # Errors
    /// `InvalidAmount` when the string is not a plain unsigned integer.
    pub fn parse(denom: impl Into<String>, amount: &str) -> Result<Self, TransactionError> {
        Ok(Self::new(denom, parse_amount(amount)?))
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Parse an unsigned decimal amount
pub fn parse_amount(amount: &str) -> Result<u128, TransactionError> {
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TransactionError::InvalidAmount(format!(
            "malformed amount {amount:?}"
        )));
    }
    amount
        .parse()
        .map_err(|_| TransactionError::InvalidAmount(format!("amount {amount} out of range")))
}

/// Valid denominations: 3 to 128 characters, a letter first, then letters,
/// digits or `/`
pub fn is_valid_denom(denom: &str) -> bool {
    let bytes = denom.as_bytes();
    (3..=128).contains(&bytes.len())
        && bytes[0].is_ascii_alphabetic()
        && bytes[1..]
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'/')
}

/// An ordered list of coins
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Coins(Vec<Coin>);

impl Coins {
    /// Sort by denomination; validity is checked by [`Coins::validate`]
    pub fn new(mut coins: Vec<Coin>) -> Self {
        coins.sort_by(|a, b| a.denom.cmp(&b.denom));
        Self(coins)
    }

    /// Keep the given order (as received over the wire)
    pub fn from_unsorted(coins: Vec<Coin>) -> Self {
        Self(coins)
    }

    pub fn single(denom: impl Into<String>, amount: u128) -> Self {
        Self(vec![Coin::new(denom, amount)])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coin> {
        self.0.iter()
    }

    /// Amount held in `denom`
    pub fn amount_of(&self, denom: &str) -> u128 {
        self.0
            .iter()
            .filter(|c| c.denom == denom)
            .map(|c| c.amount)
            .sum()
    }

    /// Check the list is non-empty, sorted, free of repeats, and that
    /// every coin has a valid denomination and a strictly positive amount
    pub fn validate(&self) -> Result<(), TransactionError> {
        if self.0.is_empty() {
            return Err(TransactionError::InvalidAmount("no coins".into()));
        }
        for coin in &self.0 {
            if !is_valid_denom(&coin.denom) {
                return Err(TransactionError::InvalidAmount(format!(
                    "invalid denomination {:?}",
                    coin.denom
                )));
            }
            if !coin.is_positive() {
                return Err(TransactionError::InvalidAmount(format!(
                    "amount of {} must be positive",
                    coin.denom
                )));
            }
        }
        for pair in self.0.windows(2) {
            if pair[0].denom >= pair[1].denom {
                return Err(TransactionError::InvalidAmount(format!(
                    "coins not sorted or repeated at {}",
                    pair[1].denom
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, coin) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{coin}")?;
        }
        Ok(())
    }
}

impl Serialize for Coins {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Coins {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Coin>::deserialize(deserializer).map(Self::from_unsorted)
    }
}

/// Per-denomination totals across several coin lists
pub fn totals<'a>(
    lists: impl IntoIterator<Item = &'a Coins>,
) -> Result<BTreeMap<&'a str, u128>, TransactionError> {
    let mut sums: BTreeMap<&str, u128> = BTreeMap::new();
    for coins in lists {
        for coin in coins.iter() {
            let entry = sums.entry(coin.denom.as_str()).or_insert(0);
            *entry = entry
                .checked_add(coin.amount)
                .ok_or_else(|| TransactionError::InvalidAmount("total overflows".into()))?;
        }
    }
    Ok(sums)
}

/// u128 amounts travel as decimal strings
mod decimal {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_amount(&s).map_err(serde::de::Error::custom)
    }
}
