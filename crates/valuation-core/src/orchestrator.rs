//! Orchestrator (C9, spec §4.9): wires the Truncator, Extractor, numeric
//! engine, Analyst, and Cache Manager into the four façade operations
//! (spec §6). This is the only place that sees every component's error
//! type and the only place that folds them into `CoreError`.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};
use valuation_analyst::AnalystError;
use valuation_cache::{CacheManager, CacheTtls, SqliteStore};
use valuation_extraction::ExtractionError;
use valuation_llm::LlmClient;
use valuation_numeric::NumericError;
use valuation_types::{CacheStage, CoreError, InvestmentMemo, StandardizedValuationInput, ValuationResult};

use crate::config::Config;
use crate::convert;
use crate::documents;

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(60);
const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
enum ExtractionStageError {
    #[error(transparent)]
    Cache(#[from] valuation_cache::CacheError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

#[derive(Debug, Error)]
enum ValuationStageError {
    #[error(transparent)]
    Cache(#[from] valuation_cache::CacheError),
    #[error(transparent)]
    Numeric(#[from] NumericError),
}

#[derive(Debug, Error)]
enum AnalysisStageError {
    #[error(transparent)]
    Cache(#[from] valuation_cache::CacheError),
    #[error(transparent)]
    Analyst(#[from] AnalystError),
}

pub enum RefreshScope {
    Extraction,
    Valuation,
    Analysis,
}

/// Ties the Cache Manager, the LLM client, and the pure numeric engine
/// together behind the four operations spec §6 requires of the façade.
pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    cache: CacheManager,
    data_dir: String,
    tax_rate: rust_decimal::Decimal,
    default_equity_risk_premium: rust_decimal::Decimal,
}

impl Orchestrator {
    pub async fn connect(config: &Config, llm: Arc<dyn LlmClient>) -> Result<Self, CoreError> {
        let database_url = format!("sqlite://{}/cache.sqlite3?mode=rwc", config.cache_dir);
        let store = SqliteStore::connect(&database_url)
            .await
            .map_err(|e| CoreError::InvalidInputs(format!("cache store unavailable: {e}")))?;
        let ttls = CacheTtls {
            extraction_secs: config.extraction_cache_ttl_secs,
            valuation_secs: config.valuation_cache_ttl_secs,
            analysis_secs: config.analysis_cache_ttl_secs,
            price_secs: 30,
        };
        Ok(Self::new(
            store,
            ttls,
            llm,
            config.data_dir.clone(),
            config.tax_rate,
            config.equity_risk_premium_default,
        ))
    }

    pub fn new(
        store: SqliteStore,
        ttls: CacheTtls,
        llm: Arc<dyn LlmClient>,
        data_dir: String,
        tax_rate: rust_decimal::Decimal,
        default_equity_risk_premium: rust_decimal::Decimal,
    ) -> Self {
        Self {
            llm,
            cache: CacheManager::new(store, ttls),
            data_dir,
            tax_rate,
            default_equity_risk_premium,
        }
    }

    async fn load_and_truncate(
        &self,
        ticker: &str,
    ) -> Result<(valuation_types::TruncatedSource, String), CoreError> {
        let doc = documents::load(&self.data_dir, ticker)
            .await
            .ok_or_else(|| CoreError::UnknownTicker(ticker.to_string()))?;

        let (truncated, degraded) =
            valuation_extraction::truncate(&doc).map_err(convert::from_extraction)?;
        if !degraded.is_empty() {
            debug!(ticker, ?degraded, "truncation degraded but did not fail");
        }

        let truncated_json =
            serde_json::to_value(&truncated).map_err(|e| CoreError::InvalidInputs(e.to_string()))?;
        let key = valuation_cache::extraction_key(ticker, &truncated_json);
        Ok((truncated, key))
    }

    /// Cache-lookup extraction; on miss, run the Extractor under the key's
    /// single-flight lock (spec §4.9 step 3).
    async fn extraction(&self, ticker: &str) -> Result<StandardizedValuationInput, CoreError> {
        let (truncated, key) = self.load_and_truncate(ticker).await?;
        self.extraction_with_key(ticker, &truncated, &key).await
    }

    async fn extraction_with_key(
        &self,
        ticker: &str,
        truncated: &valuation_types::TruncatedSource,
        key: &str,
    ) -> Result<StandardizedValuationInput, CoreError> {
        let llm = self.llm.clone();
        let ticker_owned = ticker.to_string();
        let truncated_owned = truncated.clone();
        let default_equity_risk_premium = self.default_equity_risk_premium;

        let result: Result<StandardizedValuationInput, ExtractionStageError> = self
            .cache
            .get_or_compute(key, CacheStage::Extraction, move || async move {
                let svi = tokio::time::timeout(
                    EXTRACTION_TIMEOUT,
                    valuation_extraction::extract(
                        llm.as_ref(),
                        &ticker_owned,
                        &truncated_owned,
                        default_equity_risk_premium,
                    ),
                )
                .await
                .map_err(|_| ExtractionError::ExtractionFailed("extraction timed out".to_string()))??;
                Ok(svi)
            })
            .await;

        result.map_err(|e| match e {
            ExtractionStageError::Cache(c) => convert::from_cache_during_extraction(c),
            ExtractionStageError::Extraction(ex) => convert::from_extraction(ex),
        })
    }

    /// Cache-lookup valuation (derived from SVI); on miss, run
    /// WACC -> DCF -> Graham -> Composite (spec §4.9 step 4).
    async fn valuation_for(&self, svi: &StandardizedValuationInput) -> Result<ValuationResult, CoreError> {
        let svi_json = serde_json::to_value(svi).map_err(|e| CoreError::InvalidInputs(e.to_string()))?;
        let key = valuation_cache::valuation_key(&svi_json);
        let svi_owned = svi.clone();
        let tax_rate = self.tax_rate;

        let result: Result<ValuationResult, ValuationStageError> = self
            .cache
            .get_or_compute(&key, CacheStage::Valuation, move || async move {
                Ok(valuation_numeric::run_valuation(&svi_owned, tax_rate)?)
            })
            .await;

        result.map_err(|e| match e {
            ValuationStageError::Cache(c) => convert::from_cache_during_valuation(c),
            ValuationStageError::Numeric(n) => convert::from_numeric(n),
        })
    }

    pub async fn get_valuation(&self, ticker: &str) -> Result<ValuationResult, CoreError> {
        let svi = self.extraction(ticker).await?;
        self.valuation_for(&svi).await
    }

    pub async fn refresh_valuation(&self, ticker: &str) -> Result<ValuationResult, CoreError> {
        self.refresh(ticker, RefreshScope::Extraction).await?;
        self.get_valuation(ticker).await
    }

    pub async fn get_analysis(&self, ticker: &str) -> Result<InvestmentMemo, CoreError> {
        let svi = self.extraction(ticker).await?;
        let valuation = self.valuation_for(&svi).await?;
        self.analysis_for(&svi, &valuation).await
    }

    pub async fn refresh_analysis(&self, ticker: &str) -> Result<InvestmentMemo, CoreError> {
        self.refresh(ticker, RefreshScope::Analysis).await?;
        self.get_analysis(ticker).await
    }

    async fn analysis_for(
        &self,
        svi: &StandardizedValuationInput,
        valuation: &ValuationResult,
    ) -> Result<InvestmentMemo, CoreError> {
        let svi_json = serde_json::to_value(svi).map_err(|e| CoreError::InvalidInputs(e.to_string()))?;
        let valuation_key = valuation_cache::valuation_key(&svi_json);
        let key = valuation_cache::analysis_key(&svi_json, &valuation_key);

        let llm = self.llm.clone();
        let svi_owned = svi.clone();
        let valuation_owned = valuation.clone();

        let result: Result<InvestmentMemo, AnalysisStageError> = self
            .cache
            .get_or_compute(&key, CacheStage::Analysis, move || async move {
                let memo = tokio::time::timeout(
                    ANALYSIS_TIMEOUT,
                    valuation_analyst::analyze(llm.as_ref(), &svi_owned, &valuation_owned, None),
                )
                .await
                .map_err(|_| AnalystError::AnalysisFailed("analysis timed out".to_string()))??;
                Ok(memo)
            })
            .await;

        result.map_err(|e| match e {
            AnalysisStageError::Cache(c) => convert::from_cache_during_analysis(c),
            AnalysisStageError::Analyst(a) => convert::from_analyst(a),
        })
    }

    /// Invalidates the keys for `scope` in dependency order: extraction
    /// invalidates valuation and analysis; valuation invalidates analysis
    /// (spec §4.9). The extraction/valuation fingerprints themselves are
    /// content-addressed, so invalidating "extraction" really means
    /// removing whatever valuation/analysis entries were derived from the
    /// *current* cached extraction, before that extraction is recomputed.
    pub async fn refresh(&self, ticker: &str, scope: RefreshScope) -> Result<(), CoreError> {
        info!(ticker, "refresh requested");

        let (truncated, extraction_key) = self.load_and_truncate(ticker).await?;

        let downstream_keys = |svi: &StandardizedValuationInput| -> Result<(String, String), CoreError> {
            let svi_json =
                serde_json::to_value(svi).map_err(|e| CoreError::InvalidInputs(e.to_string()))?;
            let valuation_key = valuation_cache::valuation_key(&svi_json);
            let analysis_key = valuation_cache::analysis_key(&svi_json, &valuation_key);
            Ok((valuation_key, analysis_key))
        };

        match scope {
            RefreshScope::Extraction => {
                if let Some(svi) = self
                    .cache
                    .get::<StandardizedValuationInput>(&extraction_key)
                    .await
                    .map_err(convert::from_cache_during_extraction)?
                {
                    let (valuation_key, analysis_key) = downstream_keys(&svi)?;
                    self.cache
                        .invalidate_many(&[&valuation_key, &analysis_key])
                        .await
                        .map_err(convert::from_cache_during_extraction)?;
                }
                self.cache
                    .invalidate(&extraction_key)
                    .await
                    .map_err(convert::from_cache_during_extraction)?;
                let _ = self.extraction_with_key(ticker, &truncated, &extraction_key).await?;
            }
            RefreshScope::Valuation => {
                let svi = self.extraction(ticker).await?;
                let (valuation_key, analysis_key) = downstream_keys(&svi)?;
                self.cache
                    .invalidate(&analysis_key)
                    .await
                    .map_err(convert::from_cache_during_valuation)?;
                self.cache
                    .invalidate(&valuation_key)
                    .await
                    .map_err(convert::from_cache_during_valuation)?;
                let _ = self.valuation_for(&svi).await?;
            }
            RefreshScope::Analysis => {
                let svi = self.extraction(ticker).await?;
                let (_, analysis_key) = downstream_keys(&svi)?;
                self.cache
                    .invalidate(&analysis_key)
                    .await
                    .map_err(convert::from_cache_during_analysis)?;
            }
        }

        Ok(())
    }
}
