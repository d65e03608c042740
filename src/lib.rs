//! Local-first CRM core: contacts, orders, campaigns, and activities in a
//! single SQLite file, with spreadsheet import/export and WhatsApp deep-link
//! generation.
//!
//! The presentation layer is an external collaborator: it calls the
//! repository, import, export, and messaging APIs here and renders what
//! comes back — plain serializable records, counts, identifiers, and URLs.
//! Nothing UI-shaped crosses this boundary in either direction.

pub mod db;
pub mod error;
pub mod export;
pub mod import;
pub mod tabular;
pub mod whatsapp;

pub use db::{
    Activity, Campaign, CampaignOutcome, Channel, Contact, ContactFilter, ContactStatus, CrmDb,
    Kpis, MigrationReport, NewActivity, NewCampaign, NewContact, NewOrder, OrderRow, OrderStatus,
};
pub use error::CrmError;
pub use export::{export_contacts, export_contacts_to_path};
pub use import::{import_contacts, import_contacts_from_path, ColumnMapping, Dedupe, ImportSummary};
pub use tabular::Table;
pub use whatsapp::{render_template, wa_link, wa_link_for_contact};
