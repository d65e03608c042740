//! Record structs and validated enums for the database layer.
//!
//! Row structs derive `Serialize` so the presentation layer receives plain
//! structured records across the collaborator boundary. Statuses are stored
//! as text for compatibility with databases written by the original tool;
//! the typed write path only ever produces canonical spellings, and the
//! `*::from_store` parsers tag anything else as unknown instead of rejecting
//! it, so legacy rows round-trip unchanged.

use serde::{Serialize, Serializer};

/// Canonical contact attribute names, in storage order. This is the union of
/// the v1 and v3 field sets; import mapping, export, and the column migration
/// all key off this list.
pub const CONTACT_FIELDS: &[&str] = &[
    "name",
    "phone",
    "email",
    "source",
    "interest",
    "status",
    "tags",
    "assigned",
    "notes",
    "action_needed",
    "action_taken",
    "username",
    "password",
    "date",
    "country",
    "province",
    "city",
];

/// A row from the `contacts` table.
///
/// `password` is stored and returned in cleartext for parity with the data
/// this tool inherits; it is explicitly not confidential storage.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub source: String,
    pub interest: String,
    pub status: String,
    pub tags: String,
    pub assigned: String,
    pub notes: String,
    pub action_needed: String,
    pub action_taken: String,
    pub username: String,
    pub password: String,
    pub date: String,
    pub country: String,
    pub province: String,
    pub city: String,
    pub created_at: String,
}

impl Contact {
    /// Look up a field value by canonical name. Used by template rendering.
    pub fn field(&self, name: &str) -> Option<&str> {
        let v = match name {
            "id" => return None, // numeric; templates use text fields only
            "name" => &self.name,
            "phone" => &self.phone,
            "email" => &self.email,
            "source" => &self.source,
            "interest" => &self.interest,
            "status" => &self.status,
            "tags" => &self.tags,
            "assigned" => &self.assigned,
            "notes" => &self.notes,
            "action_needed" => &self.action_needed,
            "action_taken" => &self.action_taken,
            "username" => &self.username,
            "password" => &self.password,
            "date" => &self.date,
            "country" => &self.country,
            "province" => &self.province,
            "city" => &self.city,
            "created_at" => &self.created_at,
            _ => return None,
        };
        Some(v)
    }

    /// Parse the stored status through the validated enum (tagging policy).
    pub fn status_parsed(&self) -> ContactStatus {
        ContactStatus::from_store(&self.status)
    }
}

/// Field payload for inserting or fully replacing a contact. Unset fields
/// default to empty strings, which the store treats as present-but-blank.
#[derive(Debug, Clone, Default)]
pub struct NewContact {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub source: String,
    pub interest: String,
    pub status: ContactStatus,
    pub tags: String,
    pub assigned: String,
    pub notes: String,
    pub action_needed: String,
    pub action_taken: String,
    pub username: String,
    pub password: String,
    pub date: String,
    pub country: String,
    pub province: String,
    pub city: String,
}

/// Composable contact search filter. All criteria AND together; an empty
/// criterion is a no-op.
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    /// Case-insensitive substring over name, phone, email, interest, notes,
    /// action_needed, and action_taken.
    pub query: String,
    /// Exact status match when set.
    pub status: Option<ContactStatus>,
    /// Substring match within the tags field.
    pub tag: String,
}

/// A row from the `orders` table, with the owning contact's display name
/// joined in for listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRow {
    pub id: i64,
    pub contact_id: i64,
    pub contact_name: Option<String>,
    pub product: String,
    pub quantity: i64,
    pub amount: f64,
    pub status: String,
    pub pop_url: String,
    pub notes: String,
    pub created_at: String,
}

/// Field payload for appending an order. Orders are an append-only ledger:
/// there is no update or delete path.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub contact_id: i64,
    pub product: String,
    pub quantity: i64,
    pub amount: f64,
    pub status: OrderStatus,
    pub pop_url: String,
    pub notes: String,
}

impl NewOrder {
    pub fn new(contact_id: i64) -> Self {
        Self {
            contact_id,
            product: String::new(),
            quantity: 1,
            amount: 0.0,
            status: OrderStatus::Pending,
            pop_url: String::new(),
            notes: String::new(),
        }
    }
}

/// A row from the `campaigns` table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: i64,
    pub date: String,
    pub channel: String,
    pub name: String,
    pub audience: String,
    pub message: String,
    pub outcome: String,
    pub notes: String,
}

/// Field payload for appending a campaign. An empty `date` becomes the
/// insertion timestamp.
#[derive(Debug, Clone, Default)]
pub struct NewCampaign {
    pub date: String,
    pub channel: Channel,
    pub name: String,
    pub audience: String,
    pub message: String,
    pub outcome: CampaignOutcome,
    pub notes: String,
}

/// A row from the `activities` table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: i64,
    pub contact_id: Option<i64>,
    pub activity_date: String,
    pub kind: String,
    pub summary: String,
    pub details: String,
}

/// Field payload for appending an activity. `contact_id` is nullable —
/// orphan activities are permitted. An empty `activity_date` becomes the
/// insertion timestamp.
#[derive(Debug, Clone, Default)]
pub struct NewActivity {
    pub contact_id: Option<i64>,
    pub activity_date: String,
    /// Stored in the `type` column; e.g. "whatsapp", "call", "email".
    pub kind: String,
    pub summary: String,
    pub details: String,
}

/// Dashboard counters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_contacts: i64,
    pub customers: i64,
    pub hot: i64,
    pub orders: i64,
    /// Sum of order amounts with status Paid, Shipped, or Delivered.
    pub revenue: f64,
}

// ---------------------------------------------------------------------------
// Validated enums
// ---------------------------------------------------------------------------

/// Contact pipeline status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactStatus {
    New,
    Warm,
    Hot,
    Customer,
    Inactive,
    /// Out-of-set value found in the store; raw text preserved verbatim.
    Unknown(String),
}

impl Default for ContactStatus {
    fn default() -> Self {
        Self::New
    }
}

impl ContactStatus {
    pub const KNOWN: &'static [&'static str] = &["New", "Warm", "Hot", "Customer", "Inactive"];

    pub fn as_str(&self) -> &str {
        match self {
            Self::New => "New",
            Self::Warm => "Warm",
            Self::Hot => "Hot",
            Self::Customer => "Customer",
            Self::Inactive => "Inactive",
            Self::Unknown(s) => s,
        }
    }

    /// Parse a stored value. Known spellings match case-insensitively;
    /// anything else is tagged as unknown, with a warning for non-empty text.
    pub fn from_store(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "new" => Self::New,
            "warm" => Self::Warm,
            "hot" => Self::Hot,
            "customer" => Self::Customer,
            "inactive" => Self::Inactive,
            _ => {
                if !raw.trim().is_empty() {
                    log::warn!("Unknown contact status in store: {:?}", raw);
                }
                Self::Unknown(raw.to_string())
            }
        }
    }
}

/// Order fulfilment status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Unknown(String),
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl OrderStatus {
    pub const KNOWN: &'static [&'static str] = &["Pending", "Paid", "Shipped", "Delivered"];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Unknown(s) => s,
        }
    }

    pub fn from_store(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "paid" => Self::Paid,
            "shipped" => Self::Shipped,
            "delivered" => Self::Delivered,
            _ => {
                if !raw.trim().is_empty() {
                    log::warn!("Unknown order status in store: {:?}", raw);
                }
                Self::Unknown(raw.to_string())
            }
        }
    }
}

/// Outbound campaign channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    WhatsApp,
    Facebook,
    TikTok,
    Email,
    YouTube,
    /// The catch-all channel; also carries any out-of-set stored text.
    Other(String),
}

impl Default for Channel {
    fn default() -> Self {
        Self::WhatsApp
    }
}

impl Channel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::WhatsApp => "WhatsApp",
            Self::Facebook => "Facebook",
            Self::TikTok => "TikTok",
            Self::Email => "Email",
            Self::YouTube => "YouTube",
            Self::Other(s) => {
                if s.is_empty() {
                    "Other"
                } else {
                    s
                }
            }
        }
    }

    pub fn from_store(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "whatsapp" => Self::WhatsApp,
            "facebook" => Self::Facebook,
            "tiktok" => Self::TikTok,
            "email" => Self::Email,
            "youtube" => Self::YouTube,
            _ => Self::Other(raw.to_string()),
        }
    }
}

/// Campaign outcome. The empty string is a legitimate member of the set
/// ("not yet recorded"), so it maps to `None` rather than unknown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CampaignOutcome {
    #[default]
    None,
    Sent,
    Replied,
    Converted,
    Bounced,
    Seen,
    Unknown(String),
}

impl CampaignOutcome {
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "",
            Self::Sent => "Sent",
            Self::Replied => "Replied",
            Self::Converted => "Converted",
            Self::Bounced => "Bounced",
            Self::Seen => "Seen",
            Self::Unknown(s) => s,
        }
    }

    pub fn from_store(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => Self::None,
            "sent" => Self::Sent,
            "replied" => Self::Replied,
            "converted" => Self::Converted,
            "bounced" => Self::Bounced,
            "seen" => Self::Seen,
            _ => {
                log::warn!("Unknown campaign outcome in store: {:?}", raw);
                Self::Unknown(raw.to_string())
            }
        }
    }
}

macro_rules! serialize_as_str {
    ($($ty:ty),+) => {
        $(impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        })+
    };
}

serialize_as_str!(ContactStatus, OrderStatus, Channel, CampaignOutcome);
