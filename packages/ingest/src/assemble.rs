//! Builds destination records from parser output.

use parcel_loader_address::ParsedAddress;
use parcel_loader_property_models::PropertyRecord;

/// Flattens a parsed address into a [`PropertyRecord`].
///
/// Components the parser did not produce become empty strings.
#[must_use]
pub fn assemble_record(
    account_num: &str,
    tencode: &str,
    source_address: &str,
    parsed: ParsedAddress,
    owners: &str,
) -> PropertyRecord {
    let ParsedAddress {
        street_address,
        address,
        street,
        unit,
    } = parsed;

    PropertyRecord {
        account_num: account_num.to_string(),
        source_address: source_address.to_string(),
        tencode: tencode.to_string(),
        owners: owners.to_string(),
        address_low: address.low_num,
        address_low_suffix: address.low_suffix.unwrap_or_default(),
        address_low_fractional: address.low_fractional.unwrap_or_default(),
        address_high: address
            .high_num_full
            .map(|high| high.to_string())
            .unwrap_or_default(),
        street_predir: street.predir.unwrap_or_default(),
        street_name: street.name,
        street_suffix: street.suffix.unwrap_or_default(),
        street_postdir: street.postdir.unwrap_or_default(),
        unit_num: unit.num.unwrap_or_default(),
        unit_type: unit.kind.unwrap_or_default(),
        street_address,
    }
}
