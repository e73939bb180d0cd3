use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Session timeout the Service Layer applies when the login response omits one
pub const DEFAULT_SESSION_TIMEOUT_MINUTES: i64 = 30;

/// Database server flavour behind a company database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    #[serde(rename = "HANA")]
    Hana,
    #[serde(rename = "MSSQL")]
    Mssql,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl Environment {
    /// Maps the `Type` column of a configured database
    pub fn from_db_type(db_type: &str) -> Self {
        if db_type == "HANADB" {
            Environment::Hana
        } else if db_type.contains("MSSQL") {
            Environment::Mssql
        } else {
            Environment::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Hana => "HANA",
            Environment::Mssql => "MSSQL",
            Environment::Unknown => "UNKNOWN",
        }
    }

    /// Environments the login page offers
    pub fn supported() -> [Environment; 2] {
        [Environment::Hana, Environment::Mssql]
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A company database as listed by `/api/databases`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub name: String,
    pub description: String,
    pub environment: Environment,
}

/// Body of `POST /Login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginPayload {
    #[serde(rename = "UserName")]
    pub user_name: String,
    #[serde(rename = "Password")]
    pub password: String,
    #[serde(rename = "CompanyDB")]
    pub company_db: String,
}

/// Successful response of `POST /Login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "SessionId")]
    pub session_id: String,
    #[serde(rename = "Version", default)]
    pub version: Option<String>,
    #[serde(rename = "SessionTimeout", default)]
    pub session_timeout: Option<i64>,
}

impl LoginResponse {
    pub fn timeout_minutes(&self) -> i64 {
        self.session_timeout.unwrap_or(DEFAULT_SESSION_TIMEOUT_MINUTES)
    }
}

/// OData collection envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ODataCollection<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// `Branches` entity as returned by the Service Layer
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Branch {
    pub code: Option<Value>,
    pub name: Option<String>,
    pub disabled: Option<Value>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Branch as exposed to the web client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BranchView {
    pub code: Option<Value>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub disabled: Option<Value>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl From<Branch> for BranchView {
    fn from(branch: Branch) -> Self {
        Self {
            code: branch.code,
            description: branch.name.clone(),
            name: branch.name,
            disabled: branch.disabled,
            address: branch.street,
            city: branch.city,
            country: branch.country,
        }
    }
}

/// `Warehouses` entity as returned by the Service Layer
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Warehouse {
    pub warehouse_code: Option<String>,
    pub warehouse_name: Option<String>,
    pub location: Option<Value>,
    pub inactive: Option<Value>,
    pub locked: Option<Value>,
    pub street: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub bin_activat: Option<Value>,
}

/// Warehouse as exposed to the web client, using the legacy `OWHS` column names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarehouseView {
    #[serde(rename = "WhsCode")]
    pub whs_code: Option<String>,
    #[serde(rename = "WhsName")]
    pub whs_name: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<Value>,
    #[serde(rename = "Inactive")]
    pub inactive: Option<Value>,
    #[serde(rename = "Locked")]
    pub locked: Option<Value>,
    #[serde(rename = "Address")]
    pub address: Option<String>,
    #[serde(rename = "Country")]
    pub country: Option<String>,
    #[serde(rename = "City")]
    pub city: Option<String>,
    #[serde(rename = "BinActivat")]
    pub bin_activat: Option<Value>,
}

impl From<Warehouse> for WarehouseView {
    fn from(wh: Warehouse) -> Self {
        Self {
            whs_code: wh.warehouse_code,
            whs_name: wh.warehouse_name,
            location: wh.location,
            inactive: wh.inactive,
            locked: wh.locked,
            address: wh.street,
            country: wh.country,
            city: wh.city,
            bin_activat: wh.bin_activat,
        }
    }
}

/// Read-only resources the gateway re-exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    BusinessPartners,
    Items,
    SalesOrders,
    Locations,
    Branches,
    Warehouses,
}

impl Resource {
    /// Service Layer entity set name
    pub fn entity(&self) -> &'static str {
        match self {
            Resource::BusinessPartners => "BusinessPartners",
            Resource::Items => "Items",
            Resource::SalesOrders => "Orders",
            Resource::Locations => "Locations",
            Resource::Branches => "Branches",
            Resource::Warehouses => "Warehouses",
        }
    }

    /// Path and query appended to the Service Layer base URL
    pub fn query(&self) -> &'static str {
        match self {
            Resource::BusinessPartners => {
                "BusinessPartners?$select=CardCode,CardName,CardType,Valid,CurrentAccountBalance,Currency&$top=50"
            }
            Resource::Items => "Items?$select=ItemCode,ItemName,ItemType,Valid,QuantityOnStock&$top=50",
            Resource::SalesOrders => {
                "Orders?$select=DocEntry,DocNum,CardCode,CardName,DocDate,DocTotal,DocumentStatus&$top=50"
            }
            Resource::Locations => "Locations?$top=100",
            Resource::Branches => "Branches?$top=100",
            Resource::Warehouses => "Warehouses?$top=100",
        }
    }

    /// Human-readable name used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            Resource::BusinessPartners => "business partners",
            Resource::Items => "items",
            Resource::SalesOrders => "sales orders",
            Resource::Locations => "locations",
            Resource::Branches => "branches",
            Resource::Warehouses => "warehouses",
        }
    }
}
