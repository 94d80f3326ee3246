use diesel::prelude::{Identifiable, Insertable, Queryable};

use super::schema::swaps;

#[derive(Queryable, Insertable, Identifiable, Debug, Clone)]
#[diesel(table_name = swaps, primary_key(txhash))]
pub struct SwapRow {
    pub txhash: String,
    pub wallet_address: String,
    pub network: String,
    pub status: String,
    pub timestamp: i64,
    pub swap_type: String,
    pub fee: f64,
    pub fee_rate: f64,
    pub fee_currency: String,
    pub network_fee: f64,
    pub network_fee_currency: String,
    pub currency: String,
    pub from_token: String,
    pub from_token_amount: f64,
    pub from_token_decimals: i32,
    pub from_token_symbol: String,
    pub from_token_price: f64,
    pub to_token: String,
    pub to_token_amount: f64,
    pub to_token_decimals: i32,
    pub to_token_symbol: String,
    pub to_token_price: f64,
    pub contract_address: String,
    pub provider: String,
    pub slippage: f64,
    pub created_at: i64,
}
