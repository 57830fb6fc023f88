//! Value equality for addresses and persons.
//!
//! Comparison is field by field and byte for byte: no case folding, no
//! whitespace trimming. Surrogate ids never take part.

use crate::model::{AddressValue, PersonValue};

/// `true` iff street, street number, zip code, city and country all match.
pub fn addresses_equal(a: &AddressValue, b: &AddressValue) -> bool {
  a.street == b.street
    && a.street_number == b.street_number
    && a.zip_code == b.zip_code
    && a.city == b.city
    && a.country == b.country
}

/// `true` iff the scalar fields match and the addresses are value-equal.
pub fn persons_equal(p: &PersonValue, q: &PersonValue) -> bool {
  p.first_name == q.first_name
    && p.last_name == q.last_name
    && p.birthdate == q.birthdate
    && p.gender == q.gender
    && addresses_equal(&p.address, &q.address)
}
