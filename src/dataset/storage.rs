// File-based dataset provider with a per-base snapshot cache

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use super::{DatasetProvider, Datasets, load_parameter_table, load_simulation_tables};
use crate::errors::AdvisorError;
use crate::scenario::{BaseProfile, SystemBase};

/// Reads the CSV sources of a base from a data directory.
///
/// Loaded snapshots are cached per base and handed out as shared, immutable
/// `Arc<Datasets>`, so concurrent readers never observe a partially loaded table.
pub struct CsvDatasetProvider {
    /// Directory holding the CSV sources of every base
    data_dir: PathBuf,
    /// Snapshots loaded so far
    cache: HashMap<SystemBase, Arc<Datasets>>,
}

impl CsvDatasetProvider {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            cache: HashMap::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Drop every cached snapshot, forcing the next request to reload from disk.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    pub fn is_cached(&self, base: SystemBase) -> bool {
        self.cache.contains_key(&base)
    }

    fn load_from_files(&self, profile: &BaseProfile) -> Result<Datasets, AdvisorError> {
        let files = &profile.files;
        let parameters = load_parameter_table(&self.data_dir.join(&files.parameters))?;
        let (scenarios, metrics) = load_simulation_tables(
            &self.data_dir.join(&files.features),
            &self.data_dir.join(&files.metrics),
        )?;
        Datasets::new(scenarios, metrics, parameters)
    }
}

impl DatasetProvider for CsvDatasetProvider {
    fn snapshot(&mut self, profile: &BaseProfile) -> Result<Arc<Datasets>, AdvisorError> {
        if let Some(datasets) = self.cache.get(&profile.base) {
            debug!("Using cached datasets for {}", profile.base);
            return Ok(Arc::clone(datasets));
        }

        info!("Loading datasets for {} from {:?}", profile.base, self.data_dir);
        let datasets = Arc::new(self.load_from_files(profile)?);
        self.cache.insert(profile.base, Arc::clone(&datasets));
        Ok(datasets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::BaseCatalog;
    use std::fs;
    use tempfile::TempDir;

    fn write_medium_voltage_base(dir: &Path) {
        fs::write(
            dir.join("results_MT_DT.csv"),
            "Ajustes,DF_th,TD,Vblock,tdropout\n#1,0.5,0.2,,\n#17,1.0,0.1,,\n",
        )
        .unwrap();
        fs::write(
            dir.join("X_dados_MT.csv"),
            "NomeCenario,Pgd,Vn,H,TipoGD,VB,RS,TecAt,CR,Cgd\nS0,300000,13800,2,0,0,4,3,1,1\n",
        )
        .unwrap();
        fs::write(
            dir.join("Metricas_Y_MT.csv"),
            "NomeCenario,BAC_Ajuste_1,FNR_Ajuste_1,FPR_Ajuste_1\nS0,95,1,1\n",
        )
        .unwrap();
    }

    #[test]
    fn test_snapshot_is_cached_per_base() {
        let temp_dir = TempDir::new().unwrap();
        write_medium_voltage_base(temp_dir.path());
        let catalog = BaseCatalog::builtin();
        let profile = catalog.profile(SystemBase::MediumVoltage);

        let mut provider = CsvDatasetProvider::new(temp_dir.path().to_path_buf());
        assert!(!provider.is_cached(SystemBase::MediumVoltage));

        let first = provider.snapshot(profile).unwrap();
        assert_eq!(first.scenarios().len(), 1);
        assert_eq!(first.parameter_count(), 2);
        assert!(provider.is_cached(SystemBase::MediumVoltage));

        // Removing the files does not affect the cached snapshot
        fs::remove_file(temp_dir.path().join("X_dados_MT.csv")).unwrap();
        let second = provider.snapshot(profile).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        provider.invalidate();
        assert!(provider.snapshot(profile).is_err());
    }

    #[test]
    fn test_missing_base_files_fail_to_load() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = BaseCatalog::builtin();
        let mut provider = CsvDatasetProvider::new(temp_dir.path().to_path_buf());

        let result = provider.snapshot(catalog.profile(SystemBase::HighVoltage));
        assert!(matches!(result, Err(AdvisorError::DatasetOpen { .. })));
        assert!(!provider.is_cached(SystemBase::HighVoltage));
    }
}
