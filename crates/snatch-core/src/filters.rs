//! Filter composer: structured key→value filters kept apart from free text.
//!
//! [`Filters`] is an immutable value: every update returns a fresh mapping so
//! callers can compare old and new with `==` to detect a change. The set of
//! keys it accepts is fixed by the [`EntityType`] it was created for; setting
//! a key from the other vocabulary is rejected with
//! [`FilterError::OutOfVocabulary`].

use crate::types::EntityType;
use serde::Serialize;
use std::collections::BTreeMap;

/// Every structured filter key, across both entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKey {
    // Credential vocabulary
    Domain,
    Username,
    Software,
    StealerName,
    // System vocabulary
    Country,
    IpAddress,
    ComputerName,
}

const CREDENTIAL_KEYS: &[FilterKey] = &[
    FilterKey::Domain,
    FilterKey::Username,
    FilterKey::Software,
    FilterKey::StealerName,
];

const SYSTEM_KEYS: &[FilterKey] = &[FilterKey::Country, FilterKey::IpAddress, FilterKey::ComputerName];

impl FilterKey {
    /// The keys valid for `entity`, in display order.
    pub fn vocabulary(entity: EntityType) -> &'static [FilterKey] {
        match entity {
            EntityType::Credential => CREDENTIAL_KEYS,
            EntityType::System => SYSTEM_KEYS,
        }
    }

    pub fn entity(self) -> EntityType {
        match self {
            FilterKey::Domain | FilterKey::Username | FilterKey::Software | FilterKey::StealerName => {
                EntityType::Credential
            }
            FilterKey::Country | FilterKey::IpAddress | FilterKey::ComputerName => EntityType::System,
        }
    }

    /// Query parameter understood by the record service.
    pub fn wire_name(self) -> &'static str {
        match self {
            FilterKey::Domain => "domain",
            FilterKey::Username => "username",
            FilterKey::Software => "software",
            FilterKey::StealerName => "stealer_name",
            FilterKey::Country => "country",
            FilterKey::IpAddress => "ip_address",
            FilterKey::ComputerName => "computer_name",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterKey::Domain => "Domain",
            FilterKey::Username => "Username",
            FilterKey::Software => "Software",
            FilterKey::StealerName => "Stealer",
            FilterKey::Country => "Country",
            FilterKey::IpAddress => "IP Address",
            FilterKey::ComputerName => "Computer Name",
        }
    }

    /// Example value shown as a placeholder in the filter panel.
    pub fn placeholder(self) -> &'static str {
        match self {
            FilterKey::Domain => "e.g. google.com",
            FilterKey::Username => "e.g. john@example.com",
            FilterKey::Software => "e.g. Chrome, Firefox",
            FilterKey::StealerName => "e.g. RedLine, Raccoon",
            FilterKey::Country => "e.g. US, RU",
            FilterKey::IpAddress => "e.g. 192.168.1.1",
            FilterKey::ComputerName => "e.g. DESKTOP-ABC123",
        }
    }
}

impl std::str::FromStr for FilterKey {
    type Err = FilterError;

    /// Accepts the wire name, the camel-case name and a few short aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        let parsed = match key.as_str() {
            "domain" => FilterKey::Domain,
            "username" | "user" => FilterKey::Username,
            "software" => FilterKey::Software,
            "stealer_name" | "stealername" | "stealer" => FilterKey::StealerName,
            "country" => FilterKey::Country,
            "ip_address" | "ipaddress" | "ip" => FilterKey::IpAddress,
            "computer_name" | "computername" | "computer" => FilterKey::ComputerName,
            _ => return Err(FilterError::UnknownKey(s.trim().to_string())),
        };
        Ok(parsed)
    }
}

impl std::fmt::Display for FilterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("filter `{key}` does not apply to {entity}")]
    OutOfVocabulary { key: FilterKey, entity: EntityType },
    #[error("unknown filter key: {0}")]
    UnknownKey(String),
}

/// Structured filters for one entity type. Values are never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Filters {
    #[serde(skip)]
    entity: EntityType,
    #[serde(flatten)]
    values: BTreeMap<FilterKey, String>,
}

impl Filters {
    /// An empty mapping for `entity`.
    pub fn new(entity: EntityType) -> Self {
        Self { entity, values: BTreeMap::new() }
    }

    pub fn entity(&self) -> EntityType {
        self.entity
    }

    /// Return a copy with `key` set to `value`. A blank value clears the key.
    pub fn set(&self, key: FilterKey, value: &str) -> Result<Filters, FilterError> {
        self.check(key)?;
        let mut next = self.clone();
        let value = value.trim();
        if value.is_empty() {
            next.values.remove(&key);
        } else {
            next.values.insert(key, value.to_string());
        }
        Ok(next)
    }

    /// Return a copy without `key`.
    pub fn clear(&self, key: FilterKey) -> Result<Filters, FilterError> {
        self.check(key)?;
        let mut next = self.clone();
        next.values.remove(&key);
        Ok(next)
    }

    /// Return an empty mapping for the same entity type.
    pub fn cleared(&self) -> Filters {
        Filters::new(self.entity)
    }

    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterKey, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn check(&self, key: FilterKey) -> Result<(), FilterError> {
        if key.entity() == self.entity {
            Ok(())
        } else {
            Err(FilterError::OutOfVocabulary { key, entity: self.entity })
        }
    }
}
