//! Transaction fee

use serde_json::{Map, Value};

use super::coin::Coins;

/// Largest gas limit a transaction may request
pub const MAX_GAS_WANTED: u64 = (1 << 63) - 1;

/// Fee paid and gas requested by a transaction
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StdFee {
    pub amount: Coins,
    pub gas: u64,
}

impl StdFee {
    pub fn new(gas: u64, amount: Coins) -> Self {
        Self { amount, gas }
    }

    /// JSON form: gas as a decimal string, left out when zero
    pub fn to_json(&self) -> Value {
        let mut value = Map::new();
        value.insert("amount".into(), serde_json::json!(self.amount));
        if self.gas != 0 {
            value.insert("gas".into(), Value::String(self.gas.to_string()));
        }
        Value::Object(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let fee = StdFee::new(2_000_000, Coins::single("hbc", 1_000_000_000_000));
        assert_eq!(
            fee.to_json().to_string(),
            r#"{"amount":[{"amount":"1000000000000","denom":"hbc"}],"gas":"2000000"}"#
        );
    }

    #[test]
    fn test_zero_gas_and_empty_amount() {
        let fee = StdFee::default();
        assert_eq!(fee.to_json().to_string(), r#"{"amount":[]}"#);
    }

    #[test]
    fn test_max_gas() {
        assert_eq!(MAX_GAS_WANTED, i64::MAX as u64);
    }
}
