// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Cars,
    Bookings,
    Users,
}

impl Resource {
    pub const ALL: [Self; 3] = [Self::Cars, Self::Bookings, Self::Users];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cars => "cars",
            Self::Bookings => "bookings",
            Self::Users => "users",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cars" => Some(Self::Cars),
            "bookings" => Some(Self::Bookings),
            "users" => Some(Self::Users),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Cars => "Cars",
            Self::Bookings => "Bookings",
            Self::Users => "Users",
        }
    }

    pub const fn path(self) -> &'static str {
        self.as_str()
    }

    pub const fn collection_key(self) -> &'static str {
        self.as_str()
    }

    pub const fn preferred_columns(self) -> &'static [&'static str] {
        match self {
            Self::Cars => &[
                "id",
                "make",
                "model",
                "year",
                "category",
                "daily_rate",
                "status",
                "location",
            ],
            Self::Bookings => &[
                "id",
                "car_id",
                "customer",
                "pickup_date",
                "return_date",
                "total_cost",
                "status",
            ],
            Self::Users => &["id", "name", "email", "role"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Customer,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Customer => "customer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "staff" => Some(Self::Staff),
            "customer" => Some(Self::Customer),
            _ => None,
        }
    }

    pub const fn can_view(self, resource: Resource) -> bool {
        match self {
            Self::Admin => true,
            Self::Staff => !matches!(resource, Resource::Users),
            Self::Customer => matches!(resource, Resource::Cars),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}
