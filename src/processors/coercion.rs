use crate::error::Result;
use crate::models::UtcDataset;

/// Convert every remaining raw token to a number. Missing values stay missing.
pub fn coerce_numbers(mut dataset: UtcDataset) -> Result<UtcDataset> {
    for locations in dataset.values_mut() {
        for params in locations.values_mut() {
            let fields = std::mem::take(&mut params.fields);
            params.fields = fields
                .into_iter()
                .map(|(name, field)| field.coerce().map(|field| (name, field)))
                .collect::<Result<_>>()?;
        }
    }
    Ok(dataset)
}
