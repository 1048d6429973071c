//! Static ticker directory and the default screener universe
//!
//! The directory is a curated static map; the screener universe is an
//! explicit, ordered subset of it. Callers pass the universe into the
//! orchestrator rather than the orchestrator discovering symbols itself.

use crate::types::TickerInfo;

/// symbol -> (name, exchange, sector, industry)
static TICKER_DIRECTORY: phf::Map<&'static str, (&'static str, &'static str, &'static str, &'static str)> = phf::phf_map! {
    // US - Technology
    "AAPL" => ("Apple Inc", "NASDAQ", "Technology", "Consumer Electronics"),
    "MSFT" => ("Microsoft", "NASDAQ", "Technology", "Software"),
    "GOOGL" => ("Alphabet Class A", "NASDAQ", "Communication", "Internet"),
    "AMZN" => ("Amazon.com", "NASDAQ", "Consumer Cyclical", "Internet Retail"),
    "NVDA" => ("NVIDIA", "NASDAQ", "Technology", "Semiconductors"),
    "META" => ("Meta Platforms", "NASDAQ", "Communication", "Internet"),
    "TSLA" => ("Tesla", "NASDAQ", "Consumer Cyclical", "Auto"),
    "NFLX" => ("Netflix", "NASDAQ", "Communication", "Entertainment"),
    "AMD" => ("Advanced Micro Devices", "NASDAQ", "Technology", "Semiconductors"),
    "INTC" => ("Intel", "NASDAQ", "Technology", "Semiconductors"),
    "ORCL" => ("Oracle", "NYSE", "Technology", "Software"),
    "CRM" => ("Salesforce", "NYSE", "Technology", "Software"),
    "ADBE" => ("Adobe", "NASDAQ", "Technology", "Software"),
    "AVGO" => ("Broadcom", "NASDAQ", "Technology", "Semiconductors"),
    "QCOM" => ("QUALCOMM", "NASDAQ", "Technology", "Semiconductors"),

    // US - Finance
    "JPM" => ("JPMorgan Chase", "NYSE", "Financial Services", "Banks"),
    "BAC" => ("Bank of America", "NYSE", "Financial Services", "Banks"),
    "V" => ("Visa", "NYSE", "Financial Services", "Credit Services"),
    "MA" => ("Mastercard", "NYSE", "Financial Services", "Credit Services"),
    "GS" => ("Goldman Sachs", "NYSE", "Financial Services", "Investment Banking"),

    // US - Consumer
    "WMT" => ("Walmart", "NYSE", "Consumer Defensive", "Discount Stores"),
    "HD" => ("Home Depot", "NYSE", "Consumer Cyclical", "Home Improvement"),
    "MCD" => ("McDonald's", "NYSE", "Consumer Cyclical", "Restaurants"),
    "KO" => ("Coca-Cola", "NYSE", "Consumer Defensive", "Beverages"),
    "COST" => ("Costco", "NASDAQ", "Consumer Defensive", "Discount Stores"),

    // US - Healthcare & Energy
    "JNJ" => ("Johnson & Johnson", "NYSE", "Healthcare", "Pharmaceuticals"),
    "UNH" => ("UnitedHealth", "NYSE", "Healthcare", "Insurance"),
    "LLY" => ("Eli Lilly", "NYSE", "Healthcare", "Pharmaceuticals"),
    "XOM" => ("Exxon Mobil", "NYSE", "Energy", "Oil & Gas"),
    "CVX" => ("Chevron", "NYSE", "Energy", "Oil & Gas"),

    // Indonesia
    "BBCA.JK" => ("Bank Central Asia", "IDX", "Financial Services", "Banks"),
    "BBRI.JK" => ("Bank Rakyat Indonesia", "IDX", "Financial Services", "Banks"),
    "BMRI.JK" => ("Bank Mandiri", "IDX", "Financial Services", "Banks"),
    "TLKM.JK" => ("Telkom Indonesia", "IDX", "Communication", "Telecom"),
    "ASII.JK" => ("Astra International", "IDX", "Consumer Cyclical", "Auto Dealers"),
    "GOTO.JK" => ("GoTo Gojek Tokopedia", "IDX", "Technology", "Internet"),
    "UNVR.JK" => ("Unilever Indonesia", "IDX", "Consumer Defensive", "Personal Products"),
    "ANTM.JK" => ("Aneka Tambang", "IDX", "Materials", "Mining"),

    // UK / Asia
    "AZN.L" => ("AstraZeneca", "LSE", "Healthcare", "Pharmaceuticals"),
    "SHEL.L" => ("Shell plc", "LSE", "Energy", "Oil & Gas"),
    "BABA" => ("Alibaba", "NYSE", "Consumer Cyclical", "Internet Retail"),
    "0700.HK" => ("Tencent", "HKEX", "Communication", "Internet"),
    "7203.T" => ("Toyota Motor", "TSE", "Consumer Cyclical", "Auto"),
    "6758.T" => ("Sony Group", "TSE", "Technology", "Electronics"),
    "D05.SI" => ("DBS Group", "SGX", "Financial Services", "Banks"),
};

/// Symbols screened by default, in encounter order
const DEFAULT_UNIVERSE: &[&str] = &[
    "NVDA", "AMD", "TSLA", "AAPL", "MSFT", "GOOGL", "META", "AMZN", "BBCA.JK", "BBRI.JK",
    "BMRI.JK", "TLKM.JK", "ASII.JK", "GOTO.JK", "LLY", "JPM", "V", "MA",
];

/// Look up a directory record by symbol
pub fn lookup(symbol: &str) -> Option<TickerInfo> {
    TICKER_DIRECTORY
        .get(symbol)
        .map(|&(name, exchange, sector, industry)| TickerInfo {
            symbol: symbol.to_string(),
            name: name.to_string(),
            exchange: exchange.to_string(),
            sector: sector.to_string(),
            industry: industry.to_string(),
        })
}

/// Full directory, sorted by symbol for a stable wire order
pub fn directory() -> Vec<TickerInfo> {
    let mut symbols: Vec<&&str> = TICKER_DIRECTORY.keys().collect();
    symbols.sort();
    symbols.into_iter().filter_map(|s| lookup(s)).collect()
}

/// The curated default screener universe
pub fn default_universe() -> Vec<TickerInfo> {
    DEFAULT_UNIVERSE.iter().filter_map(|s| lookup(s)).collect()
}
