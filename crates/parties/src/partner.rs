use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use intake_core::json::{JsonObject, optional_text};
use intake_core::{CountryId, DomainError, DomainResult, Entity, PartnerId, StateId};

/// Contact information for a partner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub fax: Option<String>,
}

/// Postal address with resolved country/state references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub state_id: Option<StateId>,
    pub country_id: Option<CountryId>,
}

/// Personal fields kept on customer records for downstream reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub spouse_date_of_birth: Option<NaiveDate>,
    pub wedding_anniversary: Option<NaiveDate>,
    pub nationality: Option<String>,
}

/// Field set for a partner that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPartner {
    pub name: String,
    pub contact: ContactInfo,
    pub address: PostalAddress,
    pub personal: PersonalDetails,
}

impl NewPartner {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(())
    }
}

/// A persisted partner (customer) record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
    pub contact: ContactInfo,
    pub address: PostalAddress,
    pub personal: PersonalDetails,
}

impl Partner {
    pub fn from_new(id: PartnerId, new: NewPartner) -> Self {
        Self {
            id,
            name: new.name,
            contact: new.contact,
            address: new.address,
            personal: new.personal,
        }
    }
}

impl Entity for Partner {
    type Id = PartnerId;

    fn id(&self) -> PartnerId {
        self.id
    }
}

/// Lookup criteria for an existing partner: exact email OR exact mobile.
///
/// Only the fields that were supplied take part in the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerMatch {
    pub email: Option<String>,
    pub mobile: Option<String>,
}

impl PartnerMatch {
    /// Build criteria from contact info; `None` when there is nothing to match on.
    pub fn from_contact(contact: &ContactInfo) -> Option<Self> {
        if contact.email.is_none() && contact.mobile.is_none() {
            return None;
        }
        Some(Self {
            email: contact.email.clone(),
            mobile: contact.mobile.clone(),
        })
    }

    pub fn matches(&self, partner: &Partner) -> bool {
        let email_hit = self.email.is_some() && self.email == partner.contact.email;
        let mobile_hit = self.mobile.is_some() && self.mobile == partner.contact.mobile;
        email_hit || mobile_hit
    }
}

/// Customer details as supplied by the calling system.
///
/// Country and state are plain names here; they are resolved against the
/// reference tables before a [`NewPartner`] is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub spouse_date_of_birth: Option<NaiveDate>,
    pub wedding_anniversary: Option<NaiveDate>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub nationality: Option<String>,
    pub zipcode: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
}

impl CustomerDetails {
    /// Read the customer fields from a request body.
    pub fn from_json(obj: &JsonObject) -> DomainResult<Self> {
        Ok(Self {
            first_name: optional_text(obj, "FirstName")?,
            last_name: optional_text(obj, "LastName")?,
            gender: optional_text(obj, "Gender")?,
            date_of_birth: optional_date(obj, "DateOfBirth")?,
            spouse_date_of_birth: optional_date(obj, "SpouseDateOfBirth")?,
            wedding_anniversary: optional_date(obj, "WeddingAnniversary")?,
            address: optional_text(obj, "Address")?,
            city: optional_text(obj, "City")?,
            state: optional_text(obj, "State")?,
            country: optional_text(obj, "Country")?,
            nationality: optional_text(obj, "Nationality")?,
            zipcode: optional_text(obj, "Zipcode")?,
            phone: optional_text(obj, "Phone")?,
            mobile: optional_text(obj, "Mobile")?,
            fax: optional_text(obj, "Fax")?,
            email: optional_text(obj, "Email")?,
        })
    }

    /// "First Last", skipping whichever part is missing.
    pub fn display_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn contact(&self) -> ContactInfo {
        ContactInfo {
            email: self.email.clone(),
            phone: self.phone.clone(),
            mobile: self.mobile.clone(),
            fax: self.fax.clone(),
        }
    }

    pub fn match_criteria(&self) -> Option<PartnerMatch> {
        PartnerMatch::from_contact(&self.contact())
    }

    pub fn to_new_partner(
        &self,
        country_id: Option<CountryId>,
        state_id: Option<StateId>,
    ) -> NewPartner {
        NewPartner {
            name: self.display_name(),
            contact: self.contact(),
            address: PostalAddress {
                street: self.address.clone(),
                city: self.city.clone(),
                zip: self.zipcode.clone(),
                state_id,
                country_id,
            },
            personal: PersonalDetails {
                gender: self.gender.clone(),
                date_of_birth: self.date_of_birth,
                spouse_date_of_birth: self.spouse_date_of_birth,
                wedding_anniversary: self.wedding_anniversary,
                nationality: self.nationality.clone(),
            },
        }
    }
}

fn optional_date(obj: &JsonObject, key: &str) -> DomainResult<Option<NaiveDate>> {
    optional_text(obj, key)?
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| {
                DomainError::invalid_value(format!("\"{key}\" must be a YYYY-MM-DD date: {e}"))
            })
        })
        .transpose()
}
