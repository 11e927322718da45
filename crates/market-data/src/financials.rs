use crate::error::MarketDataError;
use crate::responses::FinancialsEnvelope;
use configuration::FinancialsSettings;
use core_types::FinancialSnapshot;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use std::time::Duration;

/// The fields requested from the income-statement endpoint, in provider
/// naming. Kept in one place because the extraction below looks them up by
/// these exact names.
const INCOME_FIELDS: &str = "revenue,n_income,grossprofit_margin,roe,debt_to_assets,current_ratio";

/// A client for the financial-statements API: a single POST endpoint that
/// takes an api name, a token, and a field list, and answers with positional
/// rows.
#[derive(Clone)]
pub struct FinancialsClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl FinancialsClient {
    pub fn new(settings: &FinancialsSettings) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build reqwest client"),
            base_url: settings.base_url.clone(),
            token: settings.token.clone(),
        }
    }

    /// Fetches the most recent income-statement row for a security and
    /// reduces it to the headline figures. A security with no rows yields an
    /// empty snapshot, not an error; unlisted or newly listed codes are an
    /// ordinary case.
    pub async fn financial_snapshot(
        &self,
        code: &str,
    ) -> Result<FinancialSnapshot, MarketDataError> {
        let body = json!({
            "api_name": "income",
            "token": self.token,
            "params": { "ts_code": code },
            "fields": INCOME_FIELDS,
        });

        let envelope: FinancialsEnvelope = self
            .client
            .post(&self.base_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if envelope.code != 0 {
            return Err(MarketDataError::Api(
                envelope
                    .msg
                    .unwrap_or_else(|| "unspecified provider error".to_string()),
            ));
        }

        let table = match envelope.data {
            Some(table) => table,
            None => return Ok(FinancialSnapshot::default()),
        };
        let row = match table.items.first() {
            Some(row) => row,
            None => return Ok(FinancialSnapshot::default()),
        };

        Ok(snapshot_from(&table.fields, row))
    }
}

/// Builds a snapshot from one positional row, tolerating missing columns and
/// null cells.
pub fn snapshot_from(fields: &[String], row: &[Value]) -> FinancialSnapshot {
    let cell = |name: &str| -> Option<Decimal> {
        let index = fields.iter().position(|f| f == name)?;
        decimal_cell(row.get(index)?)
    };

    FinancialSnapshot {
        revenue: cell("revenue"),
        net_profit: cell("n_income"),
        gross_margin: cell("grossprofit_margin"),
        roe: cell("roe"),
        debt_ratio: cell("debt_to_assets"),
        current_ratio: cell("current_ratio"),
    }
}

/// Converts one JSON cell to a `Decimal`. Providers send numbers and numeric
/// strings interchangeably; anything else is treated as absent.
fn decimal_cell(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s).ok(),
        _ => None,
    }
}
