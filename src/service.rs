// Request handling: validation, base selection and dataset lookup around the engine

use log::info;
use serde::Serialize;

use crate::advisor::{Recommendation, RecommendationEngine};
use crate::dataset::DatasetProvider;
use crate::errors::AdvisorError;
use crate::scenario::{BaseCatalog, ScenarioDescription, SystemBase, UserQuery};

/// Outcome of one request together with the context it was computed in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice {
    pub query: UserQuery,
    pub base: SystemBase,
    pub recommendation: Recommendation,
    /// Text summary of the first matched scenario
    pub scenario_description: Option<String>,
}

pub struct Advisor<P: DatasetProvider> {
    catalog: BaseCatalog,
    provider: P,
    engine: RecommendationEngine,
}

impl<P: DatasetProvider> Advisor<P> {
    pub fn new(catalog: BaseCatalog, provider: P, engine: RecommendationEngine) -> Self {
        Self {
            catalog,
            provider,
            engine,
        }
    }

    pub fn catalog(&self) -> &BaseCatalog {
        &self.catalog
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Normalize and validate `query`, pick its base and run the pipeline on that base's snapshot.
    ///
    /// Invalid or inconsistent queries are rejected before any dataset is read.
    pub fn advise(&mut self, query: &UserQuery) -> Result<Advice, AdvisorError> {
        let query = query.clone().normalized();
        query.validate()?;

        let base = SystemBase::select(query.voltage_kv);
        info!("Using {} for a {:.1} kV system", base, query.voltage_kv);
        let profile = self.catalog.profile(base);
        let datasets = self.provider.snapshot(profile)?;

        let recommendation = self.engine.recommend(&query, profile, &datasets)?;
        let scenario_description = recommendation
            .scenario()
            .and_then(|scenario| scenario.indices.first())
            .and_then(|index| datasets.scenarios().get(*index))
            .map(|record| ScenarioDescription::new(record, &query).to_string());

        Ok(Advice {
            query,
            base,
            recommendation,
            scenario_description,
        })
    }
}
