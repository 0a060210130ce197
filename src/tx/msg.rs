//! Transfer messages
//!
//! The closed set of message kinds a transaction can carry. Each variant
//! knows its own canonical JSON layout, basic validation, and the
//! addresses that must sign it.

use serde_json::{json, Map, Value};

use super::coin::{totals, Coins};
use super::{canonical, TransactionError};
use crate::address::Address;

/// Route shared by all transfer messages
pub const ROUTE_BANK: &str = "bank";

/// Single-input, single-output transfer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MsgSend {
    pub from_address: Address,
    pub to_address: Address,
    pub amount: Coins,
}

impl MsgSend {
    pub fn new(from_address: Address, to_address: Address, amount: Coins) -> Self {
        Self {
            from_address,
            to_address,
            amount,
        }
    }

    pub fn validate_basic(&self) -> Result<(), TransactionError> {
        if self.from_address.is_empty() {
            return Err(TransactionError::MissingSenderAddress);
        }
        if self.to_address.is_empty() {
            return Err(TransactionError::MissingRecipientAddress);
        }
        self.amount.validate()
    }

    fn value(&self) -> Value {
        let mut value = Map::new();
        insert_address(&mut value, "from_address", &self.from_address);
        insert_address(&mut value, "to_address", &self.to_address);
        value.insert("amount".into(), json!(self.amount));
        Value::Object(value)
    }
}

/// One side of a multi-send
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Input {
    pub address: Address,
    pub coins: Coins,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Output {
    pub address: Address,
    pub coins: Coins,
}

impl Input {
    pub fn new(address: Address, coins: Coins) -> Self {
        Self { address, coins }
    }

    pub fn validate_basic(&self) -> Result<(), TransactionError> {
        if self.address.is_empty() {
            return Err(TransactionError::MissingSenderAddress);
        }
        self.coins.validate()
    }

    fn value(&self) -> Value {
        let mut value = Map::new();
        insert_address(&mut value, "address", &self.address);
        value.insert("coins".into(), json!(self.coins));
        Value::Object(value)
    }
}

impl Output {
    pub fn new(address: Address, coins: Coins) -> Self {
        Self { address, coins }
    }

    pub fn validate_basic(&self) -> Result<(), TransactionError> {
        if self.address.is_empty() {
            return Err(TransactionError::MissingRecipientAddress);
        }
        self.coins.validate()
    }

    fn value(&self) -> Value {
        let mut value = Map::new();
        insert_address(&mut value, "address", &self.address);
        value.insert("coins".into(), json!(self.coins));
        Value::Object(value)
    }
}

/// Multi-input, multi-output transfer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MsgMultiSend {
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
}

impl MsgMultiSend {
    pub fn new(inputs: Vec<Input>, outputs: Vec<Output>) -> Self {
        Self { inputs, outputs }
    }

    /// Checks formatting only, not that the inputs actually hold the funds
    pub fn validate_basic(&self) -> Result<(), TransactionError> {
        if self.inputs.is_empty() {
            return Err(TransactionError::NoInputs);
        }
        if self.outputs.is_empty() {
            return Err(TransactionError::NoOutputs);
        }
        for input in &self.inputs {
            input.validate_basic()?;
        }
        for output in &self.outputs {
            output.validate_basic()?;
        }

        let total_in = totals(self.inputs.iter().map(|i| &i.coins))?;
        let total_out = totals(self.outputs.iter().map(|o| &o.coins))?;
        if total_in != total_out {
            return Err(TransactionError::InputOutputMismatch);
        }
        Ok(())
    }

    fn value(&self) -> Value {
        json!({
            "inputs": self.inputs.iter().map(Input::value).collect::<Vec<_>>(),
            "outputs": self.outputs.iter().map(Output::value).collect::<Vec<_>>(),
        })
    }
}

/// Every message kind a transaction may carry
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Msg {
    Send(MsgSend),
    MultiSend(MsgMultiSend),
}

impl Msg {
    pub fn route(&self) -> &'static str {
        ROUTE_BANK
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Msg::Send(_) => "send",
            Msg::MultiSend(_) => "multisend",
        }
    }

    /// Registered codec name, the `type` tag of the JSON form
    pub fn amino_name(&self) -> &'static str {
        match self {
            Msg::Send(_) => "hbtcchain/transfer/MsgSend",
            Msg::MultiSend(_) => "hbtcchain/transfer/MsgMultiSend",
        }
    }

    pub fn validate_basic(&self) -> Result<(), TransactionError> {
        match self {
            Msg::Send(msg) => msg.validate_basic(),
            Msg::MultiSend(msg) => msg.validate_basic(),
        }
    }

    /// Addresses that must sign, in a deterministic order
    pub fn signers(&self) -> Vec<Address> {
        match self {
            Msg::Send(msg) => vec![msg.from_address.clone()],
            Msg::MultiSend(msg) => msg.inputs.iter().map(|i| i.address.clone()).collect(),
        }
    }

    /// Every address whose balance the message touches
    pub fn involved_addresses(&self) -> Vec<Address> {
        match self {
            Msg::Send(msg) => vec![msg.from_address.clone(), msg.to_address.clone()],
            Msg::MultiSend(msg) => msg
                .inputs
                .iter()
                .map(|i| i.address.clone())
                .chain(msg.outputs.iter().map(|o| o.address.clone()))
                .collect(),
        }
    }

    /// Tagged JSON form: `{"type": <amino name>, "value": {...}}`
    pub fn to_json(&self) -> Value {
        let value = match self {
            Msg::Send(msg) => msg.value(),
            Msg::MultiSend(msg) => msg.value(),
        };
        json!({ "type": self.amino_name(), "value": value })
    }

    /// Canonical bytes of this message alone
    pub fn sign_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        canonical::value_to_vec(self.to_json())
    }
}

impl From<MsgSend> for Msg {
    fn from(msg: MsgSend) -> Self {
        Msg::Send(msg)
    }
}

impl From<MsgMultiSend> for Msg {
    fn from(msg: MsgMultiSend) -> Self {
        Msg::MultiSend(msg)
    }
}

/// Empty addresses are left out of the JSON form
fn insert_address(map: &mut Map<String, Value>, key: &str, address: &Address) {
    if !address.is_empty() {
        map.insert(key.into(), Value::String(address.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::coin::Coin;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    const FROM: &str = "HBCTeUXgzx8eenRXmd6ztAJe4xdQmjMFUV4t";
    const TO: &str = "HBCgKep1AQKT1x9KhsDUThyRzkRMkYYoCGT8";

    #[test]
    fn test_send_sign_bytes() {
        let msg = Msg::from(MsgSend::new(addr(FROM), addr(TO), Coins::single("hbc", 104416451)));
        let bytes = msg.sign_bytes().unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            format!(
                r#"{{"type":"hbtcchain/transfer/MsgSend","value":{{"amount":[{{"amount":"104416451","denom":"hbc"}}],"from_address":"{FROM}","to_address":"{TO}"}}}}"#
            )
        );
        assert_eq!(msg.route(), "bank");
        assert_eq!(msg.type_name(), "send");
    }

    #[test]
    fn test_send_validation() {
        let ok = MsgSend::new(addr(FROM), addr(TO), Coins::single("hbc", 1));
        assert!(ok.validate_basic().is_ok());

        let mut missing_from = ok.clone();
        missing_from.from_address = Address::empty();
        assert_eq!(
            missing_from.validate_basic(),
            Err(TransactionError::MissingSenderAddress)
        );

        let mut missing_to = ok.clone();
        missing_to.to_address = Address::empty();
        assert_eq!(
            missing_to.validate_basic(),
            Err(TransactionError::MissingRecipientAddress)
        );

        let mut zero = ok.clone();
        zero.amount = Coins::single("hbc", 0);
        assert!(matches!(
            zero.validate_basic(),
            Err(TransactionError::InvalidAmount(_))
        ));

        let mut empty = ok;
        empty.amount = Coins::default();
        assert!(matches!(
            empty.validate_basic(),
            Err(TransactionError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_empty_address_omitted_from_json() {
        let msg = Msg::from(MsgSend::new(Address::empty(), addr(TO), Coins::single("hbc", 1)));
        let json = msg.to_json();
        assert!(json["value"].get("from_address").is_none());
        assert_eq!(json["value"]["to_address"], TO);
    }

    #[test]
    fn test_multisend_balances_per_denom() {
        let inputs = vec![
            Input::new(addr(FROM), Coins::new(vec![Coin::new("hbc", 10), Coin::new("usdt", 2)])),
            Input::new(addr(TO), Coins::single("hbc", 5)),
        ];
        let outputs = vec![
            Output::new(addr(TO), Coins::single("hbc", 15)),
            Output::new(addr(FROM), Coins::single("usdt", 2)),
        ];
        let msg = MsgMultiSend::new(inputs.clone(), outputs);
        assert!(msg.validate_basic().is_ok());

        let skewed = MsgMultiSend::new(
            inputs,
            vec![Output::new(addr(TO), Coins::new(vec![Coin::new("hbc", 14), Coin::new("usdt", 3)]))],
        );
        assert_eq!(
            skewed.validate_basic(),
            Err(TransactionError::InputOutputMismatch)
        );
    }

    #[test]
    fn test_multisend_structure_errors() {
        let coins = Coins::single("hbc", 1);
        assert_eq!(
            MsgMultiSend::new(vec![], vec![Output::new(addr(TO), coins.clone())]).validate_basic(),
            Err(TransactionError::NoInputs)
        );
        assert_eq!(
            MsgMultiSend::new(vec![Input::new(addr(FROM), coins.clone())], vec![]).validate_basic(),
            Err(TransactionError::NoOutputs)
        );
        assert_eq!(
            MsgMultiSend::new(
                vec![Input::new(Address::empty(), coins.clone())],
                vec![Output::new(addr(TO), coins.clone())]
            )
            .validate_basic(),
            Err(TransactionError::MissingSenderAddress)
        );
        assert_eq!(
            MsgMultiSend::new(
                vec![Input::new(addr(FROM), coins.clone())],
                vec![Output::new(Address::empty(), coins)]
            )
            .validate_basic(),
            Err(TransactionError::MissingRecipientAddress)
        );
    }

    #[test]
    fn test_signers_and_involved_addresses() {
        let msg = Msg::from(MsgMultiSend::new(
            vec![
                Input::new(addr(FROM), Coins::single("hbc", 1)),
                Input::new(addr(FROM), Coins::single("hbc", 1)),
            ],
            vec![Output::new(addr(TO), Coins::single("hbc", 2))],
        ));
        assert_eq!(msg.signers(), vec![addr(FROM), addr(FROM)]);
        assert_eq!(msg.involved_addresses(), vec![addr(FROM), addr(FROM), addr(TO)]);
        assert_eq!(msg.type_name(), "multisend");
    }
}
