//! Parties domain module (customers and their address references).
//!
//! Pure domain logic: partner records, the customer details an external
//! system supplies, and the criteria used to match an existing partner.
//! No IO, no HTTP, no storage.

pub mod geo;
pub mod partner;

pub use geo::{Country, CountryState};
pub use partner::{
    ContactInfo, CustomerDetails, NewPartner, Partner, PartnerMatch, PersonalDetails,
    PostalAddress,
};
