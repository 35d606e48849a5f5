use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use westcambios_error::error::MarketError;

const TIMEOUT_SECS: u64 = 30;
const DEFAULT_MARKET_URL: &str = "https://p2p.binance.com";
const ADV_SEARCH_PATH: &str = "bapi/c2c/v2/friendly/c2c/adv/search";
const SUCCESS_CODE: &str = "000000";

/// The public endpoint rejects page sizes above 20.
pub const MAX_ROWS: u32 = 20;

/// Search payload for the p2p advert endpoint. Field names follow the
/// exchange wire format.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvertSearchRequest {
    pub fiat: String,
    pub page: u32,
    pub rows: u32,
    pub trade_type: String,
    pub asset: String,
    pub countries: Vec<String>,
    pub pro_merchant_ads: bool,
    pub shield_merchant_ads: bool,
    pub filter_type: String,
    pub periods: Vec<serde_json::Value>,
    pub additional_kyc_verify_filter: u32,
    pub publisher_type: Option<String>,
    pub pay_types: Vec<String>,
    pub classifies: Vec<String>,
    pub traded_with: bool,
    pub followed: bool,
}

impl AdvertSearchRequest {
    pub fn new(
        fiat: &str,
        page: u32,
        rows: u32,
        trade_type: &str,
        asset: &str,
    ) -> Result<Self, MarketError> {
        if rows > MAX_ROWS {
            return Err(MarketError::TooManyRows);
        }

        Ok(AdvertSearchRequest {
            fiat: fiat.to_string(),
            page,
            rows,
            trade_type: trade_type.to_string(),
            asset: asset.to_string(),
            countries: vec![],
            pro_merchant_ads: false,
            shield_merchant_ads: false,
            filter_type: "tradable".to_string(),
            periods: vec![],
            additional_kyc_verify_filter: 0,
            publisher_type: None,
            pay_types: vec![],
            classifies: vec![
                "mass".to_string(),
                "profession".to_string(),
                "fiat_trade".to_string(),
            ],
            traded_with: false,
            followed: false,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdvertSearchResponse {
    pub code: String,
    #[serde(default)]
    pub data: Option<Vec<AdvertEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdvertEntry {
    pub adv: Advert,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Advert {
    pub price: String,
}

/// Aggregated prices for one fiat/asset pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairPrice {
    pub fiat: String,
    pub asset: String,
    pub trade_type: String,
    pub prices: Vec<f64>,
    pub average_price: f64,
    pub median_price: f64,
}

#[derive(Debug, Clone)]
pub struct BinanceP2pClient {
    client: Client,
    base_url: String,
}

impl BinanceP2pClient {
    pub fn new(base_url: Option<String>) -> Result<Self, MarketError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(TIMEOUT_SECS))
            .default_headers(headers)
            .build()
            .map_err(|e| MarketError::Error(format!("Failed to create client with error: {}", e)))?;

        Ok(BinanceP2pClient {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_MARKET_URL.to_string()),
        })
    }

    async fn search_adverts(
        &self,
        request: &AdvertSearchRequest,
    ) -> Result<AdvertSearchResponse, MarketError> {
        let url = format!("{}/{}", self.base_url, ADV_SEARCH_PATH);

        debug!(
            "Searching {} adverts for {}/{}",
            request.trade_type, request.asset, request.fiat
        );

        self.client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| MarketError::Error(format!("Failed to send request with error: {}", e)))?
            .json::<AdvertSearchResponse>()
            .await
            .map_err(|e| MarketError::BadResponse(format!("{}", e)))
    }

    /// Extract advert prices from a search response. Fails when the
    /// exchange signals an error code or a price does not parse.
    pub fn collect_prices(response: &AdvertSearchResponse) -> Result<Vec<f64>, MarketError> {
        if response.code != SUCCESS_CODE {
            return Err(MarketError::BadResponse(format!(
                "exchange returned code {}",
                response.code
            )));
        }

        let entries = response.data.as_deref().unwrap_or_default();
        let mut prices = Vec::with_capacity(entries.len());

        for entry in entries {
            let price = entry.adv.price.parse::<f64>().map_err(|e| {
                MarketError::BadResponse(format!("unparseable price {}: {}", entry.adv.price, e))
            })?;
            prices.push(price);
        }

        Ok(prices)
    }

    pub async fn get_pair(
        &self,
        fiat: &str,
        asset: &str,
        trade_type: &str,
        rows: u32,
    ) -> Result<PairPrice, MarketError> {
        let request = AdvertSearchRequest::new(fiat, 1, rows, trade_type, asset)?;
        let response = self.search_adverts(&request).await?;
        let prices = Self::collect_prices(&response)?;

        let median_price = median(&prices).ok_or(MarketError::EmptyPrices)?;
        let average_price = mean(&prices).ok_or(MarketError::EmptyPrices)?;

        info!("Collected {} {} prices for {}", prices.len(), asset, fiat);

        Ok(PairPrice {
            fiat: fiat.to_string(),
            asset: asset.to_string(),
            trade_type: trade_type.to_string(),
            prices,
            average_price,
            median_price,
        })
    }

    /// First page of USDT sell offers priced in bolivars.
    pub async fn get_usdt_ves_pair(&self) -> Result<PairPrice, MarketError> {
        self.get_pair("VES", "USDT", "BUY", MAX_ROWS).await
    }
}

pub fn median(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }

    let mut sorted = prices.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

pub fn mean(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }

    Some(prices.iter().sum::<f64>() / prices.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request = AdvertSearchRequest::new("VES", 1, 20, "BUY", "USDT").unwrap();
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["fiat"], "VES");
        assert_eq!(value["tradeType"], "BUY");
        assert_eq!(value["rows"], 20);
        assert_eq!(value["proMerchantAds"], false);
        assert_eq!(value["filterType"], "tradable");
        assert_eq!(value["additionalKycVerifyFilter"], 0);
        assert_eq!(value["publisherType"], serde_json::Value::Null);
        assert_eq!(
            value["classifies"],
            serde_json::json!(["mass", "profession", "fiat_trade"])
        );
    }

    #[test]
    fn test_request_rejects_too_many_rows() {
        let result = AdvertSearchRequest::new("VES", 1, 21, "BUY", "USDT");
        assert!(matches!(result, Err(MarketError::TooManyRows)));
    }

    #[test]
    fn test_collect_prices() {
        let response: AdvertSearchResponse = serde_json::from_value(serde_json::json!({
            "code": "000000",
            "data": [
                {"adv": {"price": "35.5"}},
                {"adv": {"price": "36.0"}}
            ]
        }))
        .unwrap();

        let prices = BinanceP2pClient::collect_prices(&response).unwrap();
        assert_eq!(prices, vec![35.5, 36.0]);
    }

    #[test]
    fn test_collect_prices_rejects_error_code() {
        let response: AdvertSearchResponse = serde_json::from_value(serde_json::json!({
            "code": "100001",
            "data": []
        }))
        .unwrap();

        assert!(BinanceP2pClient::collect_prices(&response).is_err());
    }

    #[test]
    fn test_median_and_mean() {
        let prices = vec![100.0, 102.0, 101.0, 103.0, 104.0];

        assert_eq!(median(&prices), Some(102.0));
        assert_eq!(mean(&prices), Some(102.0));
    }

    #[test]
    fn test_median_even_count() {
        let prices = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(median(&prices), Some(2.5));
    }

    #[test]
    fn test_median_and_mean_empty() {
        assert_eq!(median(&[]), None);
        assert_eq!(mean(&[]), None);
    }

    #[tokio::test]
    async fn test_get_pair() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bapi/c2c/v2/friendly/c2c/adv/search")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "code": "000000",
                    "data": [
                        {"adv": {"price": "35.0"}},
                        {"adv": {"price": "37.0"}},
                        {"adv": {"price": "36.0"}}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = BinanceP2pClient::new(Some(server.url())).unwrap();
        let pair = client.get_usdt_ves_pair().await.unwrap();

        mock.assert_async().await;
        assert_eq!(pair.prices.len(), 3);
        assert_eq!(pair.average_price, 36.0);
        assert_eq!(pair.median_price, 36.0);
        assert_eq!(pair.fiat, "VES");
        assert_eq!(pair.asset, "USDT");
    }

    #[tokio::test]
    async fn test_get_pair_empty_data() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bapi/c2c/v2/friendly/c2c/adv/search")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::json!({"code": "000000", "data": []}).to_string())
            .create_async()
            .await;

        let client = BinanceP2pClient::new(Some(server.url())).unwrap();
        let result = client.get_usdt_ves_pair().await;

        assert!(matches!(result, Err(MarketError::EmptyPrices)));
    }
}
