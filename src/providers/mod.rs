pub mod eastmoney;
pub mod holdings_api;
