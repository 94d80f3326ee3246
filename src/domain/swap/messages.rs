//! Unsigned chain message descriptors in Terra Amino JSON shape

use serde::{Deserialize, Serialize};

use crate::shared::types::AssetRef;

/// Asset tag in the terraswap wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetInfo {
    NativeToken { denom: String },
    Token { contract_addr: String },
}

impl From<&AssetRef> for AssetInfo {
    fn from(asset: &AssetRef) -> Self {
        match asset {
            AssetRef::Native { denom } => AssetInfo::NativeToken { denom: denom.clone() },
            AssetRef::Contract { address } => AssetInfo::Token {
                contract_addr: address.clone(),
            },
        }
    }
}

/// Asset with an attached quantity; amounts travel as strings on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub info: AssetInfo,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

/// Execute payload for a terraswap pair contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairExecuteMsg {
    Swap { offer_asset: Asset },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgExecuteContract {
    pub sender: String,
    pub contract: String,
    pub execute_msg: PairExecuteMsg,
    pub coins: Vec<Coin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSend {
    pub from_address: String,
    pub to_address: String,
    pub amount: Vec<Coin>,
}

/// An unsigned message, serialized the way the external signer expects
/// Terra Classic Amino JSON: `{ "type": ..., "value": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ChainMsg {
    #[serde(rename = "wasm/MsgExecuteContract")]
    ExecuteContract(MsgExecuteContract),
    #[serde(rename = "bank/MsgSend")]
    Send(MsgSend),
}

impl ChainMsg {
    /// Contract address the message targets, when it targets one.
    pub fn contract_address(&self) -> Option<&str> {
        match self {
            ChainMsg::ExecuteContract(msg) => Some(&msg.contract),
            ChainMsg::Send(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_contract_serializes_in_amino_shape() {
        let msg = ChainMsg::ExecuteContract(MsgExecuteContract {
            sender: "terra1sender".into(),
            contract: "terra1pool".into(),
            execute_msg: PairExecuteMsg::Swap {
                offer_asset: Asset {
                    info: AssetInfo::NativeToken { denom: "uluna".into() },
                    amount: "991500".into(),
                },
            },
            coins: vec![Coin {
                denom: "uluna".into(),
                amount: "991500".into(),
            }],
        });

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "wasm/MsgExecuteContract",
                "value": {
                    "sender": "terra1sender",
                    "contract": "terra1pool",
                    "execute_msg": {
                        "swap": {
                            "offer_asset": {
                                "info": { "native_token": { "denom": "uluna" } },
                                "amount": "991500"
                            }
                        }
                    },
                    "coins": [ { "denom": "uluna", "amount": "991500" } ]
                }
            })
        );
    }

    #[test]
    fn bank_send_serializes_in_amino_shape() {
        let msg = ChainMsg::Send(MsgSend {
            from_address: "terra1sender".into(),
            to_address: "terra1commission".into(),
            amount: vec![Coin {
                denom: "uluna".into(),
                amount: "8500".into(),
            }],
        });

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "bank/MsgSend");
        assert_eq!(json["value"]["to_address"], "terra1commission");
        assert_eq!(msg.contract_address(), None);
    }

    #[test]
    fn contract_address_points_at_the_pool() {
        let msg = ChainMsg::ExecuteContract(MsgExecuteContract {
            sender: "terra1sender".into(),
            contract: "terra1pool".into(),
            execute_msg: PairExecuteMsg::Swap {
                offer_asset: Asset {
                    info: AssetInfo::NativeToken { denom: "uluna".into() },
                    amount: "1".into(),
                },
            },
            coins: vec![],
        });
        assert_eq!(msg.contract_address(), Some("terra1pool"));
    }

    #[test]
    fn contract_token_tags_as_token_info() {
        let info = AssetInfo::from(&AssetRef::contract("terra1cw20"));
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            serde_json::json!({ "token": { "contract_addr": "terra1cw20" } })
        );
    }
}
