use crate::imports::*;

/// Protocol identifier pushed ahead of the operation payload.
pub const PROTOCOL_TAG: &[u8] = b"kasplex";

pub const PROTOCOL: &str = "krc-20";

pub const TRANSFER_OPERATION: &str = "transfer";

/// A KRC20 token transfer intent. It is embedded in the redeem script of a commit
/// output and published on chain when the reveal transaction spends that output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Token amount in the token's smallest units
    pub amount: u128,
    pub recipient: String,
    /// Token ticker, KRC20 tokens are addressed by it
    pub ticker: String,
}

// Keys are declared alphabetically so the compact JSON is canonical.
#[derive(Serialize)]
struct TransferOperation<'a> {
    amt: String,
    op: &'a str,
    p: &'a str,
    tick: &'a str,
    to: &'a str,
}

impl Envelope {
    pub fn new<R: Into<String>, T: Into<String>>(amount: u128, recipient: R, ticker: T) -> Self {
        Self { amount, recipient: recipient.into(), ticker: ticker.into() }
    }

    /// The operation indexers read from the revealed script:
    /// `{"amt":"…","op":"transfer","p":"krc-20","tick":"…","to":"…"}`.
    pub fn to_json(&self) -> Result<String> {
        let operation = TransferOperation {
            amt: self.amount.to_string(),
            op: TRANSFER_OPERATION,
            p: PROTOCOL,
            tick: &self.ticker,
            to: &self.recipient,
        };
        Ok(serde_json::to_string(&operation)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_json() {
        let envelope = Envelope::new(100_000_000, "kaspa:qyptjw50kqcp6a7xmx8juv0xvmgtmem4fvlte88clt2kafas863narspv9sj34u", "GGMF");
        assert_eq!(
            envelope.to_json().unwrap(),
            r#"{"amt":"100000000","op":"transfer","p":"krc-20","tick":"GGMF","to":"kaspa:qyptjw50kqcp6a7xmx8juv0xvmgtmem4fvlte88clt2kafas863narspv9sj34u"}"#
        );
    }

    #[test]
    fn test_envelope_json_escapes_input() {
        let envelope = Envelope::new(u128::MAX, "kaspa:\"x\"", "T");
        let json = envelope.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["to"], "kaspa:\"x\"");
        assert_eq!(value["amt"], u128::MAX.to_string());
    }
}
