#![allow(dead_code)]

use property_pricer::{
    ArtifactCell, CsvDataset, LocalStorage, ModelMetadata, PredictionRequest, PricingPipeline,
    ServiceConfig,
};
use std::path::Path;
use tempfile::TempDir;

/// `TreeEnsembleRegressor` averaging two stumps over the 8 features:
/// area <= 100 -> 400k else 900k; pierwotny -> 500k, wtórny -> 300k.
pub const MODEL_ONNX: &[u8] = include_bytes!("../fixtures/price_model.onnx");

pub const ENCODERS_JSON: &str = r#"{
  "Heating": ["elektryczne", "gazowe", "inne", "kominkowe\ngazowe", "kotłownia", "miejskie", "pompa ciepła", "węglowe"],
  "Building material": ["beton", "beton komórkowy", "cegła", "drewno", "inny", "keramzyt", "pustak", "silikat", "wielka płyta", "żelbet"],
  "Building type": ["apartamentowiec", "bliźniak", "blok", "dom wolnostojący", "kamienica", "loft", "plomba", "szeregowiec", "wolnostojący"],
  "Market": ["pierwotny", "wtórny"],
  "voivodeship": ["dolnośląskie", "kujawsko-pomorskie", "lubelskie", "lubuskie", "mazowieckie", "małopolskie", "opolskie", "podkarpackie", "podlaskie", "pomorskie", "warmińsko-mazurskie", "wielkopolskie", "zachodniopomorskie", "łódzkie", "śląskie", "świętokrzyskie"]
}"#;

pub const FEATURES_JSON: &str = r#"["Area (m²)", "Number of rooms", "year_const", "Heating", "Building material", "Building type", "Market", "voivodeship"]"#;

pub const DATASET_CSV: &str = "Price,Area (m²),Number of rooms,year_const,Heating,voivodeship,city,district
100000,40,2,1990,gazowe,małopolskie,Kraków,Podgórze
200000,60,3,2001,miejskie,małopolskie,Kraków,Nowa Huta
300000,80,4,2010,gazowe,małopolskie,Kraków,Podgórze
900000,120,5,2020,pompa ciepła,mazowieckie,Warszawa,Wawer
";

pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "models/price_model.onnx", MODEL_ONNX);
        write(dir.path(), "models/label_encoders.json", ENCODERS_JSON);
        write(dir.path(), "models/features.json", FEATURES_JSON);
        write(dir.path(), "data/processed/data_processed.csv", DATASET_CSV);
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative: &str, content: impl AsRef<[u8]>) {
        write(self.dir.path(), relative, content);
    }

    pub fn remove(&self, relative: &str) {
        std::fs::remove_file(self.dir.path().join(relative)).unwrap();
    }

    pub fn config(&self) -> ServiceConfig {
        ServiceConfig {
            base_dir: self.path().to_string_lossy().into_owned(),
            ..ServiceConfig::default()
        }
    }

    pub async fn pipeline(
        &self,
    ) -> property_pricer::Result<PricingPipeline<CsvDataset<LocalStorage>>> {
        let config = self.config();
        let storage = LocalStorage::new(config.base_dir.clone());
        let cell = ArtifactCell::new(storage.clone(), config.artifact_paths());
        let dataset = CsvDataset::new(storage, config.dataset_path());
        PricingPipeline::initialize(&cell, dataset, ModelMetadata::default()).await
    }
}

fn write(base: &Path, relative: &str, content: impl AsRef<[u8]>) {
    let path = base.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

pub fn sample_request() -> PredictionRequest {
    PredictionRequest {
        area: 85.0,
        rooms: 3,
        year_constructed: 2015,
        heating: "gazowe".to_string(),
        building_material: "cegła".to_string(),
        building_type: "blok".to_string(),
        market: "wtórny".to_string(),
        voivodeship: "mazowieckie".to_string(),
        city: None,
        district: None,
    }
}
