//! Pure operations on a user's address list.
//!
//! Invariant maintained by every operation here: at most one address is the
//! default, and a non-empty list keeps exactly one default once any address
//! has been marked default. Callers re-encode and persist the returned list
//! (see the module docs on the read-modify-write cycle).

use chrono::Utc;

use saffron_lane_core::AddressId;

use crate::models::user::{Address, NewAddress};

/// Append a new address, minting its id and creation timestamp.
///
/// The first address of a list always becomes the default. When the new
/// address is marked default, every sibling is demoted in the same update.
#[must_use]
pub fn add(mut list: Vec<Address>, new: NewAddress) -> Vec<Address> {
    let make_default = new.is_default || list.is_empty();
    if make_default {
        demote_all(&mut list);
    }

    list.push(Address {
        id: AddressId::generate(),
        full_name: new.full_name,
        address_line1: new.address_line1,
        address_line2: new.address_line2,
        city: new.city,
        state: new.state,
        postal_code: new.postal_code,
        country: new.country,
        phone: new.phone,
        is_default: make_default,
        created_at: Utc::now(),
    });
    list
}

/// Replace the fields of an existing address in place.
///
/// `id` and `created_at` are preserved. Promoting an address to default
/// demotes its siblings; an update cannot clear the flag - promote another
/// address instead. Returns `None` when the id is not in the list.
#[must_use]
pub fn update(mut list: Vec<Address>, id: &AddressId, new: NewAddress) -> Option<Vec<Address>> {
    if !list.iter().any(|address| &address.id == id) {
        return None;
    }

    if new.is_default {
        demote_all(&mut list);
    }

    if let Some(address) = list.iter_mut().find(|address| &address.id == id) {
        address.full_name = new.full_name;
        address.address_line1 = new.address_line1;
        address.address_line2 = new.address_line2;
        address.city = new.city;
        address.state = new.state;
        address.postal_code = new.postal_code;
        address.country = new.country;
        address.phone = new.phone;
        if new.is_default {
            address.is_default = true;
        }
    }

    Some(list)
}

/// Remove an address; an absent id is a no-op.
///
/// Removing the default promotes the first remaining address, so the list
/// keeps a default while non-empty.
#[must_use]
pub fn remove(mut list: Vec<Address>, id: &AddressId) -> Vec<Address> {
    let removed_default = list
        .iter()
        .any(|address| &address.id == id && address.is_default);

    list.retain(|address| &address.id != id);

    if removed_default && let Some(first) = list.first_mut() {
        first.is_default = true;
    }

    list
}

/// Promote one address to default, demoting all siblings.
///
/// Returns `None` when the id is not in the list.
#[must_use]
pub fn set_default(mut list: Vec<Address>, id: &AddressId) -> Option<Vec<Address>> {
    if !list.iter().any(|address| &address.id == id) {
        return None;
    }

    for address in &mut list {
        address.is_default = &address.id == id;
    }
    Some(list)
}

fn demote_all(list: &mut [Address]) {
    for address in list {
        address.is_default = false;
    }
}
