//! SQL statements, loaded from `sql/*.sql`.

pub(crate) const SCHEMA: &str = include_str!("../sql/schema.sql");
pub(crate) const NEXT_SEQUENCE: &str = include_str!("../sql/next_sequence.sql");
pub(crate) const INSERT_FRAGMENT: &str = include_str!("../sql/insert_fragment.sql");
pub(crate) const SELECT_FRAGMENTS: &str = include_str!("../sql/select_fragments.sql");
pub(crate) const DELETE_FRAGMENTS: &str = include_str!("../sql/delete_fragments.sql");
pub(crate) const DELETE_FRAGMENTS_THROUGH: &str =
    include_str!("../sql/delete_fragments_through.sql");
pub(crate) const UPSERT_SETTING: &str = include_str!("../sql/upsert_setting.sql");
pub(crate) const SELECT_SETTING: &str = include_str!("../sql/select_setting.sql");
pub(crate) const DELETE_SETTINGS: &str = include_str!("../sql/delete_settings.sql");
pub(crate) const INSERT_DOCUMENT: &str = include_str!("../sql/insert_document.sql");
pub(crate) const SELECT_DOCUMENTS: &str = include_str!("../sql/select_documents.sql");
pub(crate) const DELETE_DOCUMENTS: &str = include_str!("../sql/delete_documents.sql");
