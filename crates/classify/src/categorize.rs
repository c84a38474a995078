use extract::{Category, Rarity, SpeciesRecord};
use serde::{Deserialize, Serialize};

/// Common sightings split by organism type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CommonBuckets {
    pub fish: Vec<SpeciesRecord>,
    pub corals: Vec<SpeciesRecord>,
    pub crabs: Vec<SpeciesRecord>,
    pub other: Vec<SpeciesRecord>,
}

/// Batch results grouped for the dive log.
///
/// Buckets overlap: a dangerous record also shows up under its rarity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategorizedBundle {
    pub new: Vec<SpeciesRecord>,
    pub rare: Vec<SpeciesRecord>,
    pub dangerous: Vec<SpeciesRecord>,
    pub common: CommonBuckets,
}

pub fn categorize(records: &[SpeciesRecord]) -> CategorizedBundle {
    let mut bundle = CategorizedBundle::default();

    for record in records {
        if record.is_dangerous() {
            bundle.dangerous.push(record.clone());
        }

        match record.rarity {
            Some(Rarity::New) => bundle.new.push(record.clone()),
            Some(Rarity::Rare) => bundle.rare.push(record.clone()),
            Some(Rarity::Common) => {
                let bucket = match record.category {
                    Some(Category::Fish) => &mut bundle.common.fish,
                    Some(Category::Coral) => &mut bundle.common.corals,
                    Some(Category::Crab) => &mut bundle.common.crabs,
                    Some(Category::Other) => &mut bundle.common.other,
                    None => continue,
                };
                bucket.push(record.clone());
            }
            None => {}
        }
    }

    bundle
}
